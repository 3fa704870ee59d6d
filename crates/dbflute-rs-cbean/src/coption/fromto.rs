//! From-to option for date range conditions.

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::ckey::ConditionKey;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Period {
    Day,
    Month,
    Year,
}

/// Chooses the operators of a from-to condition and normalizes its dates.
///
/// By default the from-date is compared with `>=` and the to-date with
/// `<=`. The `compare_as_*` modes truncate the from-date to the start of its
/// period and move the to-date to the start of the next period, compared
/// with `<`, so `compare_as_date` with from = to = 2024-03-05 13:45 selects
/// the whole of March 5th.
///
/// ```
/// use chrono::NaiveDate;
/// use dbflute_rs_cbean::ckey::ConditionKey;
/// use dbflute_rs_cbean::coption::FromToOption;
/// use dbflute_rs_cbean::value::Value;
///
/// let option = FromToOption::new().compare_as_month();
/// let to = Value::from(NaiveDate::from_ymd_opt(2024, 12, 17).unwrap());
/// assert_eq!(
///     option.filter_to(to),
///     Value::from(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap())
/// );
/// assert_eq!(option.to_key(), ConditionKey::LessThan);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FromToOption {
    greater_than: bool,
    less_than: bool,
    period: Option<Period>,
}

impl FromToOption {
    /// `from >= x and to <= y`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Compares the from-date with `>`.
    #[must_use]
    pub const fn greater_than(mut self) -> Self {
        self.greater_than = true;
        self
    }

    /// Compares the to-date with `<`.
    #[must_use]
    pub const fn less_than(mut self) -> Self {
        self.less_than = true;
        self
    }

    /// Day granularity.
    #[must_use]
    pub const fn compare_as_date(mut self) -> Self {
        self.period = Some(Period::Day);
        self
    }

    /// Month granularity.
    #[must_use]
    pub const fn compare_as_month(mut self) -> Self {
        self.period = Some(Period::Month);
        self
    }

    /// Year granularity.
    #[must_use]
    pub const fn compare_as_year(mut self) -> Self {
        self.period = Some(Period::Year);
        self
    }

    /// Operator for the from-date.
    pub const fn from_key(&self) -> ConditionKey {
        if self.greater_than {
            ConditionKey::GreaterThan
        } else {
            ConditionKey::GreaterEqual
        }
    }

    /// Operator for the to-date.
    pub const fn to_key(&self) -> ConditionKey {
        if self.less_than || self.period.is_some() {
            ConditionKey::LessThan
        } else {
            ConditionKey::LessEqual
        }
    }

    /// Truncates the from-date to its period start.
    pub fn filter_from(&self, from: Value) -> Value {
        match self.period {
            Some(period) => map_date(from, |d| period_start(d, period)),
            None => from,
        }
    }

    /// Moves the to-date to the start of the following period.
    pub fn filter_to(&self, to: Value) -> Value {
        match self.period {
            Some(period) => map_date(to, |d| next_period_start(d, period)),
            None => to,
        }
    }
}

fn period_start(date: NaiveDate, period: Period) -> NaiveDate {
    match period {
        Period::Day => Some(date),
        Period::Month => date.with_day(1),
        Period::Year => date.with_day(1).and_then(|d| d.with_month(1)),
    }
    .unwrap_or(date)
}

fn next_period_start(date: NaiveDate, period: Period) -> NaiveDate {
    let start = period_start(date, period);
    match period {
        Period::Day => start.succ_opt(),
        Period::Month => start.checked_add_months(Months::new(1)),
        Period::Year => start.checked_add_months(Months::new(12)),
    }
    .unwrap_or(start)
}

/// Applies a date transformation; time parts are reset to midnight.
/// Non-date values pass through unchanged.
fn map_date(value: Value, f: impl Fn(NaiveDate) -> NaiveDate) -> Value {
    match value {
        Value::Date(d) => Value::Date(f(d)),
        Value::DateTime(dt) => Value::DateTime(midnight(f(dt.date()))),
        Value::DateTimeTz(dt) => {
            Value::DateTimeTz(Utc.from_utc_datetime(&midnight(f(dt.date_naive()))))
        }
        other => other,
    }
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(chrono::NaiveTime::MIN)
}
