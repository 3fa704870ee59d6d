//! Arithmetic on the right-hand column of a column query.

use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Plus,
    Minus,
    Multiply,
    Divide,
}

impl Operator {
    const fn symbol(self) -> &'static str {
        match self {
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
        }
    }
}

/// Ordered calculation steps, each wrapping the previous expression.
///
/// ```
/// use dbflute_rs_cbean::coption::ColumnCalculation;
///
/// let calc = ColumnCalculation::new().plus(1).multiply(2);
/// assert_eq!(calc.apply("dfloc.DEPTH"), "((dfloc.DEPTH + 1) * 2)");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnCalculation {
    steps: Vec<(Operator, Value)>,
}

impl ColumnCalculation {
    /// Creates an empty calculation.
    pub fn new() -> Self {
        Self::default()
    }

    /// `+ value`
    #[must_use]
    pub fn plus(self, value: impl Into<Value>) -> Self {
        self.push(Operator::Plus, value.into())
    }

    /// `- value`
    #[must_use]
    pub fn minus(self, value: impl Into<Value>) -> Self {
        self.push(Operator::Minus, value.into())
    }

    /// `* value`
    #[must_use]
    pub fn multiply(self, value: impl Into<Value>) -> Self {
        self.push(Operator::Multiply, value.into())
    }

    /// `/ value`
    #[must_use]
    pub fn divide(self, value: impl Into<Value>) -> Self {
        self.push(Operator::Divide, value.into())
    }

    fn push(mut self, op: Operator, value: Value) -> Self {
        self.steps.push((op, value));
        self
    }

    /// Whether no step is registered.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Whether every operand is numeric.
    pub fn has_only_numeric_operands(&self) -> bool {
        self.steps.iter().all(|(_, v)| v.is_numeric())
    }

    /// Renders the calculation around `column`.
    pub fn apply(&self, column: &str) -> String {
        self.steps.iter().fold(column.to_string(), |expr, (op, v)| {
            format!("({expr} {} {})", op.symbol(), v.to_sql_literal())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        let calc = ColumnCalculation::new();
        assert!(calc.is_empty());
        assert_eq!(calc.apply("c"), "c");
    }

    #[test]
    fn test_operators() {
        let calc = ColumnCalculation::new().minus(3).divide(2.5);
        assert_eq!(calc.apply("c"), "((c - 3) / 2.5)");
        assert!(calc.has_only_numeric_operands());
    }

    #[test]
    fn test_non_numeric_operand() {
        assert!(!ColumnCalculation::new().plus("x").has_only_numeric_operands());
    }
}
