//! Records of conditions that were rejected and skipped.

use std::fmt;

use dbflute_rs_core::CBeanError;

use crate::ckey::ConditionKey;
use crate::value::Value;

/// A condition whose value was null, empty, or of the wrong shape.
///
/// In the default mode the condition is dropped and this record is kept on
/// the bean; in checked mode the same fields are raised as
/// [`CBeanError::InvalidQueryRegistered`].
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidQueryInfo {
    /// Bind location of the query node (e.g. `conditionQuery`).
    pub location: String,
    /// Column DB name.
    pub column: String,
    /// Operator the value was offered to.
    pub key: ConditionKey,
    /// The rejected value.
    pub value: Value,
}

impl InvalidQueryInfo {
    /// Converts the record to the error raised in checked mode.
    pub fn to_error(&self) -> CBeanError {
        CBeanError::InvalidQueryRegistered {
            location: self.location.clone(),
            column: self.column.clone(),
            key: self.key.key_name().to_string(),
            value: self.value.to_string(),
        }
    }
}

impl fmt::Display for InvalidQueryInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} {} {}",
            self.location, self.column, self.key, self.value
        )
    }
}
