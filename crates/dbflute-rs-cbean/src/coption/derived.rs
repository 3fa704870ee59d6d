//! Options for derived-referrer aggregates.

use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
enum Step {
    Coalesce(Value),
    Round(i32),
    Trunc(i32),
}

/// Post-processing applied to a derived aggregate expression, in order.
///
/// ```
/// use dbflute_rs_cbean::coption::DerivedReferrerOption;
///
/// let option = DerivedReferrerOption::new().coalesce(0).round(2);
/// assert_eq!(
///     option.filter_function("max(sub.CONTENT_LENGTH)"),
///     "round(coalesce(max(sub.CONTENT_LENGTH), 0), 2)"
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedReferrerOption {
    steps: Vec<Step>,
}

impl DerivedReferrerOption {
    /// An option that leaves the expression untouched.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces a null aggregate (no referrer rows) with `value`.
    #[must_use]
    pub fn coalesce(mut self, value: impl Into<Value>) -> Self {
        self.steps.push(Step::Coalesce(value.into()));
        self
    }

    /// Rounds to `scale` decimal places.
    #[must_use]
    pub fn round(mut self, scale: i32) -> Self {
        self.steps.push(Step::Round(scale));
        self
    }

    /// Truncates to `scale` decimal places.
    #[must_use]
    pub fn trunc(mut self, scale: i32) -> Self {
        self.steps.push(Step::Trunc(scale));
        self
    }

    /// Whether any step is registered.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Wraps `expression` with every registered step.
    pub fn filter_function(&self, expression: &str) -> String {
        self.steps.iter().fold(expression.to_string(), |expr, step| match step {
            Step::Coalesce(v) => format!("coalesce({expr}, {})", v.to_sql_literal()),
            Step::Round(scale) => format!("round({expr}, {scale})"),
            Step::Trunc(scale) => format!("trunc({expr}, {scale})"),
        })
    }
}
