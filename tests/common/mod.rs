//! Shared fixtures for the integration tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use expense_tracker_bot::db::models::{CategoryTotal, Expense, NewExpense};
use expense_tracker_bot::db::ExpenseStore;

/// Store whose every query fails.
pub struct DownStore;

#[async_trait]
impl ExpenseStore for DownStore {
    async fn create(&self, _: NewExpense) -> anyhow::Result<Expense> {
        anyhow::bail!("db down")
    }
    async fn recent(&self, _: i64, _: i64) -> anyhow::Result<Vec<Expense>> {
        anyhow::bail!("db down")
    }
    async fn all_for_user(&self, _: i64) -> anyhow::Result<Vec<Expense>> {
        anyhow::bail!("db down")
    }
    async fn get(&self, _: i64) -> anyhow::Result<Option<Expense>> {
        anyhow::bail!("db down")
    }
    async fn update(&self, _: i64, _: Decimal, _: Option<&str>) -> anyhow::Result<bool> {
        anyhow::bail!("db down")
    }
    async fn delete(&self, _: i64) -> anyhow::Result<u64> {
        anyhow::bail!("db down")
    }
    async fn sum_category_since(
        &self,
        _: i64,
        _: &str,
        _: DateTime<Utc>,
    ) -> anyhow::Result<Decimal> {
        anyhow::bail!("db down")
    }
    async fn category_totals_since(
        &self,
        _: i64,
        _: DateTime<Utc>,
    ) -> anyhow::Result<Vec<CategoryTotal>> {
        anyhow::bail!("db down")
    }
}
