//! Raw result rows handed back by the execution layer.
//!
//! The executor returns [`Row`]s; callers map them to entities through
//! [`FromValue`] conversions inside the mapping closure they pass to
//! `select_list` / `select_page`.

use dbflute_rs_core::{CBeanError, CBeanResult};

use crate::value::Value;

/// A single result row: ordered column names and values.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    /// Creates a new row from column names and values.
    ///
    /// # Panics
    ///
    /// Panics if the number of columns does not match the number of values.
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        assert_eq!(
            columns.len(),
            values.len(),
            "Row column count must match value count"
        );
        Self { columns, values }
    }

    /// Builds a row from `(column, value)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let (columns, values) = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .unzip();
        Self { columns, values }
    }

    /// Returns the column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Gets a typed value by column name (case-insensitive).
    pub fn get<T: FromValue>(&self, column: &str) -> CBeanResult<T> {
        let value = self.get_value(column).ok_or_else(|| {
            CBeanError::ExecutionError(format!("Column '{column}' not found in row"))
        })?;
        T::from_value(value)
    }

    /// Returns a reference to the raw value of a column.
    pub fn get_value(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(column))
            .map(|idx| &self.values[idx])
    }
}

/// Conversion from a [`Value`] to a concrete Rust type.
pub trait FromValue: Sized {
    /// Attempts to convert a value reference to this type.
    fn from_value(value: &Value) -> CBeanResult<Self>;
}

fn unexpected(expected: &str, value: &Value) -> CBeanError {
    CBeanError::ExecutionError(format!("Expected {expected}, got {value:?}"))
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> CBeanResult<Self> {
        value.as_int().ok_or_else(|| unexpected("Int", value))
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> CBeanResult<Self> {
        let i = i64::from_value(value)?;
        Self::try_from(i).map_err(|e| {
            CBeanError::ExecutionError(format!("Int value out of i32 range: {e}"))
        })
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> CBeanResult<Self> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| unexpected("String", value))
    }
}

impl FromValue for chrono::NaiveDateTime {
    fn from_value(value: &Value) -> CBeanResult<Self> {
        match value {
            Value::DateTime(dt) => Ok(*dt),
            _ => Err(unexpected("DateTime", value)),
        }
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> CBeanResult<Self> {
        Ok(value.clone())
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> CBeanResult<Self> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}
