use std::fmt::Write;

use rust_decimal::Decimal;

use crate::bot::render::{money, CURRENCY};
use crate::db::models::Expense;

pub fn render(user_id: i64, expenses: &[Expense]) -> String {
    // The sum of stored amounts can exceed the Decimal range.
    let total = expenses
        .iter()
        .try_fold(Decimal::ZERO, |acc, e| acc.checked_add(e.amount))
        .map(|t| format!("{} {}", money(t), CURRENCY))
        .unwrap_or_else(|| "unavailable (too large)".to_string());

    let mut rows = String::new();
    for e in expenses {
        let _ = writeln!(
            rows,
            "      <tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            e.id,
            e.created_at.format("%Y-%m-%d %H:%M"),
            money(e.amount),
            escape(&e.category)
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>Expenses of user {user_id}</title>
</head>
<body>
  <h1>Expenses of user {user_id}</h1>
  <p>Records: {count}. Total: {total}</p>
  <table>
    <thead>
      <tr><th>ID</th><th>Date</th><th>Amount</th><th>Category</th></tr>
    </thead>
    <tbody>
{rows}    </tbody>
  </table>
</body>
</html>
"#,
        user_id = user_id,
        count = expenses.len(),
        total = total,
        rows = rows,
    )
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
