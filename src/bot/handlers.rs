use std::str::FromStr;

use chrono::Utc;
use rust_decimal::Decimal;
use teloxide::prelude::*;
use teloxide::types::Me;

use crate::bot::commands::is_for_other_bot;
use crate::bot::period::Period;
use crate::bot::{render, AppState, HandlerResult};
use crate::cache::{self, LIST_TTL};
use crate::db::models::NewExpense;

pub const DEFAULT_CATEGORY: &str = "other";
pub const LIST_LIMIT: i64 = 10;

pub const UNKNOWN_COMMAND: &str = "Unknown command. Use /help for the list of commands.";

/// Fallback for anything the command filter did not recognise. Commands
/// addressed to another bot get no reply.
pub async fn handle_message(bot: Bot, msg: Message, me: Me) -> HandlerResult {
    if msg.from.is_none() {
        return Ok(());
    }
    if let Some(text) = msg.text() {
        if is_for_other_bot(text, me.username()) {
            tracing::debug!(chat_id = msg.chat.id.0, "Ignoring command for another bot");
            return Ok(());
        }
    }
    crate::bot::send_reply(&bot, msg.chat.id, UNKNOWN_COMMAND.to_string()).await;
    Ok(())
}

fn parse_amount(s: &str) -> Option<Decimal> {
    Decimal::from_str(s).ok()
}

// ── /add ───────────────────────────────────────────────────────────

pub async fn add(state: &AppState, user_id: i64, args: &str) -> String {
    let parts: Vec<&str> = args.split_whitespace().collect();
    let Some(raw_amount) = parts.first() else {
        return "Format: /add 500 food".to_string();
    };
    let Some(amount) = parse_amount(raw_amount) else {
        return "Amount format error".to_string();
    };
    let category = if parts.len() > 1 {
        parts[1..].join(" ")
    } else {
        DEFAULT_CATEGORY.to_string()
    };

    let new = NewExpense {
        user_id,
        amount,
        category,
        created_at: Utc::now(),
    };
    let expense = match state.store.create(new).await {
        Ok(e) => e,
        Err(e) => {
            tracing::error!(user_id, error = %e, "Failed to save expense");
            return "Failed to save expense".to_string();
        }
    };

    cache::invalidate_user(state.cache.as_ref(), user_id).await;

    format!(
        "✅ Added: {} {} to category «{}»",
        render::money(expense.amount),
        render::CURRENCY,
        expense.category
    )
}

// ── /list ──────────────────────────────────────────────────────────

pub async fn list(state: &AppState, user_id: i64) -> String {
    let key = cache::list_key(user_id);
    match state.cache.get(&key).await {
        Ok(Some(cached)) => {
            crate::telemetry::record_cache_lookup(true);
            return cached;
        }
        Ok(None) => crate::telemetry::record_cache_lookup(false),
        Err(e) => tracing::warn!(key = %key, error = %e, "Failed to read cache"),
    }

    let expenses = match state.store.recent(user_id, LIST_LIMIT).await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!(user_id, error = %e, "DB error in list");
            return "Failed to fetch data".to_string();
        }
    };

    if expenses.is_empty() {
        return "🗒 Expense list is empty".to_string();
    }

    let output = render::expense_list(&expenses);
    if let Err(e) = state.cache.set(&key, &output, LIST_TTL).await {
        tracing::warn!(key = %key, error = %e, "Failed to write cache");
    }
    output
}

// ── /stats_category ────────────────────────────────────────────────

pub async fn stats_category(state: &AppState, user_id: i64, args: &str) -> String {
    let mut parts = args.split_whitespace();
    let Some(category) = parts.next() else {
        return "Format: /stats_category <category> [week/month]".to_string();
    };
    let period = Period::from_arg(parts.next());
    let since = period.start(Utc::now());

    let total = match state.store.sum_category_since(user_id, category, since).await {
        Ok(t) => t,
        Err(e) => {
            tracing::error!(user_id, category, error = %e, "DB error in stats_category");
            return "Failed to fetch category stats".to_string();
        }
    };

    // An empty window and a window summing to zero read the same.
    if total.is_zero() {
        return format!("📊 No data for category «{}» in the selected period", category);
    }

    render::category_total(category, period, total)
}

// ── /top_categories ────────────────────────────────────────────────

pub async fn top_categories(state: &AppState, user_id: i64, args: &str) -> String {
    let arg = args.trim();
    let period = Period::from_arg((!arg.is_empty()).then_some(arg));
    let since = period.start(Utc::now());

    let totals = match state.store.category_totals_since(user_id, since).await {
        Ok(t) => t,
        Err(e) => {
            tracing::error!(user_id, error = %e, "DB error in top_categories");
            return "Failed to fetch stats".to_string();
        }
    };

    if totals.is_empty() {
        return format!("📊 No data for {}", period.as_str());
    }

    render::top_categories(period, &totals)
}

// ── /export ────────────────────────────────────────────────────────

pub async fn export(state: &AppState, user_id: i64) -> String {
    let expenses = match state.store.all_for_user(user_id).await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!(user_id, error = %e, "DB error in export");
            return "Failed to fetch data for export".to_string();
        }
    };

    if expenses.is_empty() {
        return "No expenses to export".to_string();
    }

    match render::export_csv(&expenses) {
        Ok(csv) => format!("Expense export:\n{}", csv),
        Err(e) => {
            tracing::error!(user_id, error = %e, "Failed to build CSV");
            "Failed to build export".to_string()
        }
    }
}

// ── /clear_cache ───────────────────────────────────────────────────

pub async fn clear_cache(state: &AppState, user_id: i64) -> String {
    let pattern = cache::user_pattern(user_id);
    match state.cache.delete_pattern(&pattern).await {
        Ok(removed) => tracing::info!(user_id, removed, "Cleared user cache"),
        Err(e) => tracing::error!(pattern = %pattern, error = %e, "Failed to scan cache"),
    }
    "Cache cleared".to_string()
}

// ── /edit ──────────────────────────────────────────────────────────

pub async fn edit(state: &AppState, user_id: i64, args: &str) -> String {
    let parts: Vec<&str> = args.split_whitespace().collect();
    if parts.len() < 2 {
        return "Format: /edit <id> <amount> [category]".to_string();
    }
    let Ok(id) = parts[0].parse::<i64>() else {
        return "Invalid ID format".to_string();
    };
    let Some(amount) = parse_amount(parts[1]) else {
        return "Invalid amount format".to_string();
    };
    let category = (parts.len() > 2).then(|| parts[2..].join(" "));

    let expense = match state.store.get(id).await {
        Ok(Some(e)) => e,
        Ok(None) => return "Record not found".to_string(),
        Err(e) => {
            tracing::error!(id, error = %e, "DB error loading expense for edit");
            return "Failed to load record".to_string();
        }
    };

    if expense.user_id != user_id {
        tracing::warn!(id, user_id, owner = expense.user_id, "Edit refused for non-owner");
        return "No access to edit this record".to_string();
    }

    match state.store.update(id, amount, category.as_deref()).await {
        Ok(true) => {}
        Ok(false) => return "Record not found".to_string(),
        Err(e) => {
            tracing::error!(id, error = %e, "DB update error in edit");
            return "Failed to update record".to_string();
        }
    }

    cache::invalidate_user(state.cache.as_ref(), user_id).await;

    "✅ Record updated".to_string()
}

// ── /delete ────────────────────────────────────────────────────────

/// Deletes by id for whoever asks. The list cache is left alone and may
/// show the removed row until it expires.
pub async fn delete(state: &AppState, args: &str) -> String {
    let Ok(id) = args.trim().parse::<i64>() else {
        return "Format: /delete <id>".to_string();
    };

    match state.store.delete(id).await {
        Ok(0) => "❌ Record not found".to_string(),
        Ok(_) => "✅ Record deleted".to_string(),
        Err(e) => {
            tracing::error!(id, error = %e, "DB delete error");
            "Failed to delete record".to_string()
        }
    }
}
