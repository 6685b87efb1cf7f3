use std::fmt::Write;

use rust_decimal::Decimal;

use crate::bot::period::Period;
use crate::db::models::{CategoryTotal, Expense};

pub const CURRENCY: &str = "руб.";

/// Two decimal places, rounded.
pub fn money(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(2))
}

/// `[id] DD.MM HH:MM - amount руб. (category)` per line, newest first as given.
pub fn expense_list(expenses: &[Expense]) -> String {
    let mut out = String::from("📝 Recent expenses:\n\n");
    for e in expenses {
        let _ = writeln!(
            out,
            "[{}] {} - {} {} ({})",
            e.id,
            e.created_at.format("%d.%m %H:%M"),
            money(e.amount),
            CURRENCY,
            e.category
        );
    }
    out
}

pub fn category_total(category: &str, period: Period, total: Decimal) -> String {
    format!(
        "📊 Category «{}» for {}:\n{} {}",
        category,
        period.as_str(),
        money(total),
        CURRENCY
    )
}

pub fn top_categories(period: Period, totals: &[CategoryTotal]) -> String {
    let mut out = format!("🏆 Top categories for {}:\n\n", period.as_str());
    for (rank, t) in totals.iter().enumerate() {
        let _ = writeln!(out, "{}. {}: {} {}", rank + 1, t.category, money(t.total), CURRENCY);
    }
    out
}

/// CSV with an `ID,Date,Amount,Category` header and one row per expense.
pub fn export_csv(expenses: &[Expense]) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["ID", "Date", "Amount", "Category"])?;
    for e in expenses {
        writer.write_record([
            e.id.to_string(),
            e.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            money(e.amount),
            e.category.clone(),
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("CSV flush failed: {}", e.error()))?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn expense(id: i64, amount: Decimal, category: &str) -> Expense {
        Expense {
            id,
            user_id: 1,
            amount,
            category: category.to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap(),
        }
    }

    #[test]
    fn test_list_line_format() {
        let text = expense_list(&[expense(17, dec!(150.5), "groceries")]);
        assert_eq!(
            text,
            "📝 Recent expenses:\n\n[17] 05.03 14:07 - 150.50 руб. (groceries)\n"
        );
    }

    #[test]
    fn test_csv_header_and_rows() {
        let csv = export_csv(&[expense(1, dec!(10), "food"), expense(2, dec!(-3.456), "a, b")])
            .unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "ID,Date,Amount,Category");
        assert_eq!(lines[1], "1,2024-03-05 14:07:09,10.00,food");
        assert!(lines[2].starts_with("2,2024-03-05 14:07:09,-3.46,"));
        assert!(lines[2].ends_with("\"a, b\""));
    }

    #[test]
    fn test_top_categories_keeps_given_order() {
        let totals = vec![
            CategoryTotal { category: "b".into(), total: dec!(300) },
            CategoryTotal { category: "a".into(), total: dec!(100) },
        ];
        let text = top_categories(Period::Month, &totals);
        assert_eq!(
            text,
            "🏆 Top categories for month:\n\n1. b: 300.00 руб.\n2. a: 100.00 руб.\n"
        );
    }
}
