//! Comparison operators and their registration rules.
//!
//! [`ConditionKey`] is the stateless strategy for one operator: it decides
//! whether a value may be registered against the column's current
//! [`ConditionValue`], writes the value into it, and builds the clause text.

use std::fmt;

use crate::cvalue::ConditionValue;
use crate::sqlclause::fragment::SqlFragment;
use crate::value::Value;

/// A comparison operator usable in a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConditionKey {
    /// `=`
    Equal,
    /// `<>`
    NotEqual,
    /// `>`
    GreaterThan,
    /// `<`
    LessThan,
    /// `>=`
    GreaterEqual,
    /// `<=`
    LessEqual,
    /// `in (...)`
    InScope,
    /// `not in (...)`
    NotInScope,
    /// `like ...`
    LikeSearch,
    /// `not like ...`
    NotLikeSearch,
    /// `is null`
    IsNull,
    /// `is not null`
    IsNotNull,
}

/// Outcome of [`ConditionKey::is_valid_registration`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// The value can be registered.
    Valid,
    /// The value is null, empty, or of the wrong shape for the operator.
    Invalid,
    /// The same value is already registered; nothing to do.
    Duplicate,
    /// A different value is registered for a single-value key; the bound
    /// value is replaced without adding another clause.
    Override,
}

impl ConditionKey {
    /// Every key, in declaration order.
    pub const ALL: [Self; 12] = [
        Self::Equal,
        Self::NotEqual,
        Self::GreaterThan,
        Self::LessThan,
        Self::GreaterEqual,
        Self::LessEqual,
        Self::InScope,
        Self::NotInScope,
        Self::LikeSearch,
        Self::NotLikeSearch,
        Self::IsNull,
        Self::IsNotNull,
    ];

    /// The key name used in bind locations (e.g. `greaterThan`).
    pub const fn key_name(self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::NotEqual => "notEqual",
            Self::GreaterThan => "greaterThan",
            Self::LessThan => "lessThan",
            Self::GreaterEqual => "greaterEqual",
            Self::LessEqual => "lessEqual",
            Self::InScope => "inScope",
            Self::NotInScope => "notInScope",
            Self::LikeSearch => "likeSearch",
            Self::NotLikeSearch => "notLikeSearch",
            Self::IsNull => "isNull",
            Self::IsNotNull => "isNotNull",
        }
    }

    /// The SQL operand.
    pub const fn operand(self) -> &'static str {
        match self {
            Self::Equal => "=",
            Self::NotEqual => "<>",
            Self::GreaterThan => ">",
            Self::LessThan => "<",
            Self::GreaterEqual => ">=",
            Self::LessEqual => "<=",
            Self::InScope => "in",
            Self::NotInScope => "not in",
            Self::LikeSearch => "like",
            Self::NotLikeSearch => "not like",
            Self::IsNull => "is null",
            Self::IsNotNull => "is not null",
        }
    }

    /// Finds a key by name, ignoring case and underscores
    /// (`greaterThan`, `GREATER_THAN`).
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized: String = name
            .chars()
            .filter(|c| *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        Self::ALL
            .into_iter()
            .find(|k| k.key_name().to_ascii_lowercase() == normalized)
    }

    /// `is null` / `is not null`: no operand value.
    pub const fn is_null_key(self) -> bool {
        matches!(self, Self::IsNull | Self::IsNotNull)
    }

    /// `in` / `not in`: the value is a list.
    pub const fn is_list_key(self) -> bool {
        matches!(self, Self::InScope | Self::NotInScope)
    }

    /// `like` / `not like`.
    pub const fn is_like_key(self) -> bool {
        matches!(self, Self::LikeSearch | Self::NotLikeSearch)
    }

    /// Single-value comparisons (`=`, `<>`, `>`, `<`, `>=`, `<=`).
    pub const fn is_comparison(self) -> bool {
        !(self.is_list_key() || self.is_like_key() || self.is_null_key())
    }

    /// Keys that keep every registration instead of a single value.
    pub const fn is_multi_valued(self) -> bool {
        self.is_list_key() || self.is_like_key()
    }

    /// Decides whether `value` may be registered for this key.
    ///
    /// Null values are never valid. Empty strings are valid only when
    /// `allow_empty_string` is set. Lists must contain at least one
    /// non-null element; like-search needs a string. A single-value key that
    /// already holds a value yields [`Registration::Duplicate`] for the same
    /// value and [`Registration::Override`] for a different one.
    pub fn is_valid_registration(
        self,
        cvalue: &ConditionValue,
        value: &Value,
        allow_empty_string: bool,
    ) -> Registration {
        if self.is_null_key() {
            return if cvalue.has(self) {
                Registration::Duplicate
            } else {
                Registration::Valid
            };
        }
        if value.is_null() || (value.is_empty_string() && !allow_empty_string) {
            return Registration::Invalid;
        }
        if self.is_list_key() {
            let usable = value.as_list().is_some_and(|vals| {
                vals.iter()
                    .any(|v| !v.is_null() && (allow_empty_string || !v.is_empty_string()))
            });
            return if usable {
                Registration::Valid
            } else {
                Registration::Invalid
            };
        }
        if self.is_like_key() {
            return if value.as_str().is_some() {
                Registration::Valid
            } else {
                Registration::Invalid
            };
        }
        if matches!(value, Value::List(_)) {
            return Registration::Invalid;
        }
        match cvalue.get(self) {
            Some(existing) if existing == value => Registration::Duplicate,
            Some(_) => Registration::Override,
            None => Registration::Valid,
        }
    }

    /// Writes the value into the condition value and returns its bind
    /// location (none for null keys).
    pub fn setup_condition_value(
        self,
        cvalue: &mut ConditionValue,
        value: Value,
        column_location: &str,
    ) -> Option<String> {
        if self.is_null_key() {
            cvalue.set_null(self);
            None
        } else if self.is_multi_valued() {
            Some(cvalue.push_multi(self, value, column_location))
        } else {
            Some(cvalue.set_fixed(self, value, column_location))
        }
    }

    /// Builds `column operand bind[rear_option]`.
    ///
    /// List keys wrap the bind in parentheses; null keys have no bind.
    pub fn build_clause(
        self,
        column: &str,
        location: Option<&str>,
        value: Value,
        rear_option: &str,
    ) -> SqlFragment {
        let head = SqlFragment::text(format!("{column} {}", self.operand()));
        match location {
            None => head,
            Some(loc) if self.is_list_key() => head
                .with_text(" (")
                .with_bind(loc, value)
                .with_text(")"),
            Some(loc) => head
                .with_text(" ")
                .with_bind(loc, value)
                .with_text(rear_option),
        }
    }
}

impl fmt::Display for ConditionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key_name())
    }
}

/// Removes null (and, unless allowed, empty-string) elements from an
/// in-scope list.
pub(crate) fn filter_list_elements(values: Vec<Value>, allow_empty_string: bool) -> Vec<Value> {
    values
        .into_iter()
        .filter(|v| !v.is_null() && (allow_empty_string || !v.is_empty_string()))
        .collect()
}
