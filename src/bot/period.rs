use chrono::{DateTime, Duration, Months, Utc};

/// Aggregation window for the statistics commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    #[default]
    Week,
    Month,
}

impl Period {
    /// Exactly `month` selects a month; anything else, including nothing, is a week.
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg.map(str::trim) {
            Some("month") => Period::Month,
            _ => Period::Week,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Week => "week",
            Period::Month => "month",
        }
    }

    /// Start of the `[start, now]` window.
    pub fn start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Period::Week => now - Duration::days(7),
            Period::Month => now
                .checked_sub_months(Months::new(1))
                .unwrap_or_else(|| now - Duration::days(30)),
        }
    }
}
