//! Condition and bind values.
//!
//! The [`Value`] enum carries every value a condition can hold: the operand
//! of a comparison, the element list of an in-scope, the pattern of a
//! like-search, and the rows coming back from the executor.

use std::fmt;

/// A backend-agnostic representation of a database value.
///
/// # Examples
///
/// ```
/// use dbflute_rs_cbean::value::Value;
///
/// let v = Value::from(42_i64);
/// assert_eq!(v, Value::Int(42));
/// assert!(v.is_numeric());
///
/// let v = Value::from("");
/// assert!(v.is_empty_string());
/// ```
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    /// SQL NULL.
    Null,
    /// A boolean value.
    Bool(bool),
    /// A 64-bit signed integer.
    Int(i64),
    /// A 64-bit floating-point number.
    Float(f64),
    /// A UTF-8 string.
    String(String),
    /// Raw binary data.
    Bytes(Vec<u8>),
    /// A date without time.
    Date(chrono::NaiveDate),
    /// A date and time without timezone.
    DateTime(chrono::NaiveDateTime),
    /// A date and time with UTC timezone.
    DateTimeTz(chrono::DateTime<chrono::Utc>),
    /// A time without date.
    Time(chrono::NaiveTime),
    /// A UUID value.
    Uuid(uuid::Uuid),
    /// A JSON value.
    Json(serde_json::Value),
    /// A list of values (in-scope operands).
    List(Vec<Value>),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Self::Date(d) => write!(f, "{d}"),
            Self::DateTime(dt) => write!(f, "{dt}"),
            Self::DateTimeTz(dt) => write!(f, "{dt}"),
            Self::Time(t) => write!(f, "{t}"),
            Self::Uuid(u) => write!(f, "{u}"),
            Self::Json(j) => write!(f, "{j}"),
            Self::List(vals) => {
                write!(f, "[")?;
                for (i, v) in vals.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "]")
            }
        }
    }
}

// ── From implementations ───────────────────────────────────────────────

macro_rules! value_from {
    ($($source:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$source> for Value {
                fn from(v: $source) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

value_from! {
    bool => Bool,
    i64 => Int,
    f64 => Float,
    String => String,
    Vec<u8> => Bytes,
    chrono::NaiveDate => Date,
    chrono::NaiveDateTime => DateTime,
    chrono::DateTime<chrono::Utc> => DateTimeTz,
    chrono::NaiveTime => Time,
    uuid::Uuid => Uuid,
    serde_json::Value => Json,
    Vec<Value> => List,
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Self::Null,
        }
    }
}

impl Value {
    /// Returns `true` if this value is `Null`.
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` for a zero-length string.
    pub fn is_empty_string(&self) -> bool {
        matches!(self, Self::String(s) if s.is_empty())
    }

    /// Returns `true` if the value is null or an empty string.
    pub fn is_null_or_empty(&self) -> bool {
        self.is_null() || self.is_empty_string()
    }

    /// Returns `true` for integer and float values.
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float(_))
    }

    /// Attempts to extract an integer value.
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Attempts to extract a string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Attempts to extract the element slice of a list.
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(vals) => Some(vals),
            _ => None,
        }
    }

    /// Renders the value as an inline SQL literal.
    ///
    /// Used where a bind parameter is not available, such as the
    /// `case when` ranks of a manual order or a coalesce default.
    pub fn to_sql_literal(&self) -> String {
        match self {
            Self::Null => "null".to_string(),
            Self::Bool(b) => b.to_string(),
            Self::Int(i) => i.to_string(),
            Self::Float(v) => v.to_string(),
            Self::List(vals) => {
                let parts: Vec<String> = vals.iter().map(Self::to_sql_literal).collect();
                format!("({})", parts.join(", "))
            }
            other => format!("'{}'", other.to_string().replace('\'', "''")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_integers() {
        assert_eq!(Value::from(42_i32), Value::Int(42));
        assert_eq!(Value::from(42_i64), Value::Int(42));
    }

    #[test]
    fn test_from_string() {
        assert_eq!(Value::from("hello"), Value::String("hello".to_string()));
        assert_eq!(
            Value::from("hello".to_string()),
            Value::String("hello".to_string())
        );
    }

    #[test]
    fn test_from_option() {
        let some_val: Option<i64> = Some(42);
        assert_eq!(Value::from(some_val), Value::Int(42));
        let none_val: Option<i64> = None;
        assert_eq!(Value::from(none_val), Value::Null);
    }

    #[test]
    fn test_from_chrono_datetime() {
        let dt = chrono::NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap();
        assert_eq!(Value::from(dt), Value::DateTime(dt));
    }

    #[test]
    fn test_display_list() {
        let list = Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        assert_eq!(list.to_string(), "[1, 2, 3]");
    }

    #[test]
    fn test_null_and_empty() {
        assert!(Value::Null.is_null_or_empty());
        assert!(Value::from("").is_null_or_empty());
        assert!(!Value::from(" ").is_empty_string());
        assert!(!Value::Int(0).is_null_or_empty());
    }

    #[test]
    fn test_is_numeric() {
        assert!(Value::Int(1).is_numeric());
        assert!(Value::Float(1.5).is_numeric());
        assert!(!Value::from("1").is_numeric());
    }

    #[test]
    fn test_sql_literal_quotes() {
        assert_eq!(Value::from("WDL").to_sql_literal(), "'WDL'");
        assert_eq!(Value::from("it's").to_sql_literal(), "'it''s'");
        assert_eq!(Value::Int(7).to_sql_literal(), "7");
        assert_eq!(Value::Null.to_sql_literal(), "null");
    }

    #[test]
    fn test_as_list() {
        let v = Value::List(vec![Value::Int(1)]);
        assert_eq!(v.as_list().map(<[Value]>::len), Some(1));
        assert!(Value::Int(1).as_list().is_none());
    }
}
