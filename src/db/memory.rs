use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::sync::Mutex;

use super::models::{CategoryTotal, Expense, NewExpense};
use super::ExpenseStore;

/// In-process store with the same ordering and aggregation rules as the
/// Postgres one. Used by the test suites.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    rows: Vec<Expense>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ExpenseStore for MemoryStore {
    async fn create(&self, expense: NewExpense) -> anyhow::Result<Expense> {
        let mut inner = self.inner.lock().await;
        inner.next_id += 1;
        let row = Expense {
            id: inner.next_id,
            user_id: expense.user_id,
            amount: expense.amount,
            category: expense.category,
            created_at: expense.created_at,
        };
        inner.rows.push(row.clone());
        Ok(row)
    }

    async fn recent(&self, user_id: i64, limit: i64) -> anyhow::Result<Vec<Expense>> {
        let inner = self.inner.lock().await;
        let mut rows: Vec<Expense> = inner
            .rows
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        rows.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(rows)
    }

    async fn all_for_user(&self, user_id: i64) -> anyhow::Result<Vec<Expense>> {
        let inner = self.inner.lock().await;
        let mut rows: Vec<Expense> = inner
            .rows
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by_key(|e| (e.created_at, e.id));
        Ok(rows)
    }

    async fn get(&self, id: i64) -> anyhow::Result<Option<Expense>> {
        let inner = self.inner.lock().await;
        Ok(inner.rows.iter().find(|e| e.id == id).cloned())
    }

    async fn update(
        &self,
        id: i64,
        amount: Decimal,
        category: Option<&str>,
    ) -> anyhow::Result<bool> {
        let mut inner = self.inner.lock().await;
        match inner.rows.iter_mut().find(|e| e.id == id) {
            Some(row) => {
                row.amount = amount;
                if let Some(category) = category {
                    row.category = category.to_string();
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: i64) -> anyhow::Result<u64> {
        let mut inner = self.inner.lock().await;
        let before = inner.rows.len();
        inner.rows.retain(|e| e.id != id);
        Ok((before - inner.rows.len()) as u64)
    }

    async fn sum_category_since(
        &self,
        user_id: i64,
        category: &str,
        since: DateTime<Utc>,
    ) -> anyhow::Result<Decimal> {
        let inner = self.inner.lock().await;
        inner
            .rows
            .iter()
            .filter(|e| e.user_id == user_id && e.category == category && e.created_at >= since)
            .try_fold(Decimal::ZERO, |acc, e| acc.checked_add(e.amount))
            .ok_or_else(|| anyhow::anyhow!("sum of category {} overflows", category))
    }

    async fn category_totals_since(
        &self,
        user_id: i64,
        since: DateTime<Utc>,
    ) -> anyhow::Result<Vec<CategoryTotal>> {
        let inner = self.inner.lock().await;
        let mut totals: HashMap<&str, Decimal> = HashMap::new();
        for e in inner
            .rows
            .iter()
            .filter(|e| e.user_id == user_id && e.created_at >= since)
        {
            let total = totals.entry(e.category.as_str()).or_default();
            *total = total
                .checked_add(e.amount)
                .ok_or_else(|| anyhow::anyhow!("total of category {} overflows", e.category))?;
        }

        let mut out: Vec<CategoryTotal> = totals
            .into_iter()
            .map(|(category, total)| CategoryTotal {
                category: category.to_string(),
                total,
            })
            .collect();
        out.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.category.cmp(&b.category)));
        Ok(out)
    }
}
