//! Accumulated condition state of one column.
//!
//! A [`ConditionValue`] is created the first time a column of a query node
//! receives a condition. Single-value keys (`equal`, `greaterThan`, ...) keep
//! one value each; list and like-search keys keep every registration, and
//! null keys are flags. The location returned on registration is the bind
//! path the clause refers to.

use std::collections::{BTreeMap, BTreeSet};

use crate::ckey::ConditionKey;
use crate::value::Value;

/// Condition values of a single column, keyed by operator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionValue {
    fixed: BTreeMap<ConditionKey, Value>,
    multi: BTreeMap<ConditionKey, Vec<Value>>,
    scoped: BTreeMap<ConditionKey, Vec<Value>>,
    nulls: BTreeSet<ConditionKey>,
    last_key: Option<ConditionKey>,
}

impl ConditionValue {
    /// Creates an empty condition value.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value of a single-value key.
    pub fn get(&self, key: ConditionKey) -> Option<&Value> {
        self.fixed.get(&key)
    }

    /// Returns every value registered for a list or like-search key.
    pub fn get_list(&self, key: ConditionKey) -> &[Value] {
        self.multi.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns the values a single-value key received inside or-scopes.
    pub fn get_scoped(&self, key: ConditionKey) -> &[Value] {
        self.scoped.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns `true` if the key has at least one registration.
    pub fn has(&self, key: ConditionKey) -> bool {
        self.fixed.contains_key(&key) || self.multi.contains_key(&key) || self.nulls.contains(&key)
    }

    /// The key registered most recently.
    pub const fn last_key(&self) -> Option<ConditionKey> {
        self.last_key
    }

    /// Total number of registrations across all keys.
    pub fn registered_count(&self) -> usize {
        self.fixed.len()
            + self.multi.values().map(Vec::len).sum::<usize>()
            + self.scoped.values().map(Vec::len).sum::<usize>()
            + self.nulls.len()
    }

    /// Returns `true` if nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.registered_count() == 0
    }

    /// Stores a single-value key and returns its bind location.
    pub(crate) fn set_fixed(&mut self, key: ConditionKey, value: Value, column_location: &str) -> String {
        self.fixed.insert(key, value);
        self.last_key = Some(key);
        format!("{column_location}.{}", key.key_name())
    }

    /// Appends to a list or like-search key and returns the indexed bind location.
    pub(crate) fn push_multi(&mut self, key: ConditionKey, value: Value, column_location: &str) -> String {
        let values = self.multi.entry(key).or_default();
        let index = values.len();
        values.push(value);
        self.last_key = Some(key);
        format!("{column_location}.{}{index}", key.key_name())
    }

    /// Records a single-value key registered inside an or-scope. Such
    /// values never override the fixed slot; each gets an indexed location.
    pub(crate) fn push_scoped(&mut self, key: ConditionKey, value: Value, column_location: &str) -> String {
        let values = self.scoped.entry(key).or_default();
        let index = values.len();
        values.push(value);
        self.last_key = Some(key);
        format!("{column_location}.{}{index}", key.key_name())
    }

    /// Flags a null key.
    pub(crate) fn set_null(&mut self, key: ConditionKey) {
        self.nulls.insert(key);
        self.last_key = Some(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_location() {
        let mut cv = ConditionValue::new();
        let loc = cv.set_fixed(ConditionKey::Equal, Value::Int(3), "conditionQuery.id");
        assert_eq!(loc, "conditionQuery.id.equal");
        assert_eq!(cv.get(ConditionKey::Equal), Some(&Value::Int(3)));
        assert_eq!(cv.last_key(), Some(ConditionKey::Equal));
    }

    #[test]
    fn test_multi_locations_are_indexed() {
        let mut cv = ConditionValue::new();
        let a = cv.push_multi(ConditionKey::LikeSearch, Value::from("a%"), "conditionQuery.url");
        let b = cv.push_multi(ConditionKey::LikeSearch, Value::from("b%"), "conditionQuery.url");
        assert_eq!(a, "conditionQuery.url.likeSearch0");
        assert_eq!(b, "conditionQuery.url.likeSearch1");
        assert_eq!(cv.get_list(ConditionKey::LikeSearch).len(), 2);
        assert!(cv.get_list(ConditionKey::InScope).is_empty());
    }

    #[test]
    fn test_counts() {
        let mut cv = ConditionValue::new();
        assert!(cv.is_empty());
        cv.set_null(ConditionKey::IsNull);
        cv.set_fixed(ConditionKey::GreaterThan, Value::Int(1), "x");
        assert_eq!(cv.registered_count(), 2);
        assert!(cv.has(ConditionKey::IsNull));
        assert!(!cv.has(ConditionKey::IsNotNull));
    }

    #[test]
    fn test_scoped_values_leave_fixed_slot() {
        let mut cv = ConditionValue::new();
        cv.set_fixed(ConditionKey::Equal, Value::Int(5), "conditionQuery.depth");
        let a = cv.push_scoped(ConditionKey::Equal, Value::Int(0), "conditionQuery.depth");
        let b = cv.push_scoped(ConditionKey::Equal, Value::Int(1), "conditionQuery.depth");
        assert_eq!(a, "conditionQuery.depth.equal0");
        assert_eq!(b, "conditionQuery.depth.equal1");
        assert_eq!(cv.get(ConditionKey::Equal), Some(&Value::Int(5)));
        assert_eq!(cv.get_scoped(ConditionKey::Equal), &[Value::Int(0), Value::Int(1)]);
        assert_eq!(cv.registered_count(), 3);
    }
}
