pub mod memory;
pub mod models;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub use memory::MemoryStore;
use models::{CategoryTotal, Expense, NewExpense};

/// Durable CRUD over expense records plus the two aggregations the
/// statistics commands need.
#[async_trait]
pub trait ExpenseStore: Send + Sync {
    async fn create(&self, expense: NewExpense) -> anyhow::Result<Expense>;

    /// Most recent first, at most `limit` rows.
    async fn recent(&self, user_id: i64, limit: i64) -> anyhow::Result<Vec<Expense>>;

    /// Every expense of the user, oldest first.
    async fn all_for_user(&self, user_id: i64) -> anyhow::Result<Vec<Expense>>;

    async fn get(&self, id: i64) -> anyhow::Result<Option<Expense>>;

    /// Overwrites the amount, and the category when given.
    /// Returns `false` when no row has this id.
    async fn update(
        &self,
        id: i64,
        amount: Decimal,
        category: Option<&str>,
    ) -> anyhow::Result<bool>;

    /// Hard delete by id. Returns the number of rows removed.
    async fn delete(&self, id: i64) -> anyhow::Result<u64>;

    /// Sum of amounts for one category since `since`. No rows sums to zero.
    async fn sum_category_since(
        &self,
        user_id: i64,
        category: &str,
        since: DateTime<Utc>,
    ) -> anyhow::Result<Decimal>;

    /// Per-category totals since `since`, largest first.
    async fn category_totals_since(
        &self,
        user_id: i64,
        since: DateTime<Utc>,
    ) -> anyhow::Result<Vec<CategoryTotal>>;
}

#[derive(Debug, Clone)]
pub struct Database {
    pub pool: PgPool,
}

impl Database {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS expenses (
                id BIGSERIAL PRIMARY KEY,
                user_id BIGINT NOT NULL,
                amount NUMERIC NOT NULL,
                category TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )"#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_expenses_user ON expenses(user_id, created_at DESC)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl ExpenseStore for Database {
    async fn create(&self, expense: NewExpense) -> anyhow::Result<Expense> {
        let row = sqlx::query_as::<_, Expense>(
            r#"
            INSERT INTO expenses (user_id, amount, category, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(expense.user_id)
        .bind(expense.amount)
        .bind(&expense.category)
        .bind(expense.created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn recent(&self, user_id: i64, limit: i64) -> anyhow::Result<Vec<Expense>> {
        let rows = sqlx::query_as::<_, Expense>(
            "SELECT * FROM expenses WHERE user_id = $1 ORDER BY created_at DESC, id DESC LIMIT $2",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn all_for_user(&self, user_id: i64) -> anyhow::Result<Vec<Expense>> {
        let rows = sqlx::query_as::<_, Expense>(
            "SELECT * FROM expenses WHERE user_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get(&self, id: i64) -> anyhow::Result<Option<Expense>> {
        let row = sqlx::query_as::<_, Expense>("SELECT * FROM expenses WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update(
        &self,
        id: i64,
        amount: Decimal,
        category: Option<&str>,
    ) -> anyhow::Result<bool> {
        let result = sqlx::query(
            "UPDATE expenses SET amount = $2, category = COALESCE($3, category) WHERE id = $1",
        )
        .bind(id)
        .bind(amount)
        .bind(category)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: i64) -> anyhow::Result<u64> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn sum_category_since(
        &self,
        user_id: i64,
        category: &str,
        since: DateTime<Utc>,
    ) -> anyhow::Result<Decimal> {
        let row: (Decimal,) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(amount), 0) FROM expenses
            WHERE user_id = $1 AND category = $2 AND created_at >= $3
            "#,
        )
        .bind(user_id)
        .bind(category)
        .bind(since)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.0)
    }

    async fn category_totals_since(
        &self,
        user_id: i64,
        since: DateTime<Utc>,
    ) -> anyhow::Result<Vec<CategoryTotal>> {
        let rows = sqlx::query_as::<_, CategoryTotal>(
            r#"
            SELECT category, SUM(amount) AS total FROM expenses
            WHERE user_id = $1 AND created_at >= $2
            GROUP BY category
            ORDER BY total DESC
            "#,
        )
        .bind(user_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
