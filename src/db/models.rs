use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Expense {
    pub id: i64,
    pub user_id: i64,
    pub amount: Decimal,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

/// Insert payload; `id` is assigned by the store.
#[derive(Debug, Clone)]
pub struct NewExpense {
    pub user_id: i64,
    pub amount: Decimal,
    pub category: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Decimal,
}
