//! String-addressed conditions for callers without compile-time knowledge
//! of the table, such as configuration-driven filters.
//!
//! Column names, operator names and dotted relation paths are resolved
//! against table metadata. A name that does not resolve fails with
//! [`CBeanError::DynamicInvocationFailure`] carrying the attempted path and
//! the typed operation it stood for (`setUrl_Equal`,
//! `queryAccessResultDataAsOne`, `addOrderBy_CreateTime_Desc`).
//!
//! # Examples
//!
//! ```
//! use dbflute_rs_cbean::cbean::ConditionBean;
//! use dbflute_rs_cbean::dynamic::DynamicQueryTarget;
//! use dbflute_rs_cbean::tables::CRAWLER_TABLES;
//! use dbflute_rs_cbean::value::Value;
//!
//! let mut cb = ConditionBean::new(&CRAWLER_TABLES, "ACCESS_RESULT").unwrap();
//! let mut query = cb.query();
//! query.set_condition("sessionId", "equal", Value::from("s1")).unwrap();
//! query
//!     .foreign_query("accessResultDataAsOne")
//!     .unwrap()
//!     .set_condition("transformerName", "prefixSearch", Value::from("html"))
//!     .unwrap();
//!
//! let err = query.set_condition("NO_SUCH", "equal", Value::from(1)).unwrap_err();
//! assert_eq!(err.kind(), "dynamic_invocation_failure");
//! ```

use dbflute_rs_core::{CBeanError, CBeanResult};

use crate::ckey::ConditionKey;
use crate::cquery::{init_cap, ConditionQuery};
use crate::value::Value;

/// Operator name of a prefix search, which has no [`ConditionKey`] of its own.
const PREFIX_SEARCH: &str = "prefixSearch";

/// A query node that accepts conditions by name.
pub trait DynamicQueryTarget {
    /// The target returned for a foreign relation.
    type Foreign<'s>: DynamicQueryTarget
    where
        Self: 's;

    /// Registers `column operator value`. Operator names follow the
    /// condition keys (`equal`, `greaterThan`, `inScope`, `isNull`, ...)
    /// plus `prefixSearch`; case and underscores are ignored.
    fn set_condition(&mut self, column: &str, operator: &str, value: Value) -> CBeanResult<()>;

    /// Navigates a dotted foreign-property path.
    fn foreign_query(&mut self, property_path: &str) -> CBeanResult<Self::Foreign<'_>>;

    /// Adds an order-by element.
    fn add_order_by(&mut self, column: &str, ascending: bool) -> CBeanResult<()>;

    /// Reads the value registered for `column` under `operator`.
    fn registered_value(&self, column: &str, operator: &str) -> CBeanResult<Option<Value>>;
}

fn failure(path: &str, method: String, reason: impl Into<String>) -> CBeanError {
    CBeanError::DynamicInvocationFailure {
        path: path.to_string(),
        method,
        reason: reason.into(),
    }
}

/// Converts lookup failures into invocation failures; other errors pass.
fn resolve_failure(path: &str, method: String, err: CBeanError) -> CBeanError {
    match err {
        CBeanError::ColumnNotFound { .. } | CBeanError::RelationNotFound { .. } => {
            failure(path, method, err.to_string())
        }
        other => other,
    }
}

fn is_prefix_search(operator: &str) -> bool {
    operator.replace('_', "").eq_ignore_ascii_case(PREFIX_SEARCH)
}

impl ConditionQuery<'_> {
    fn column_method_name(&self, column: &str) -> String {
        self.table()
            .find_column(column)
            .map_or_else(|| init_cap(column), |c| init_cap(c.property_name))
    }
}

impl DynamicQueryTarget for ConditionQuery<'_> {
    type Foreign<'s> = ConditionQuery<'s> where Self: 's;

    fn set_condition(&mut self, column: &str, operator: &str, value: Value) -> CBeanResult<()> {
        let column_method = self.column_method_name(column);
        if is_prefix_search(operator) {
            let method = format!("set{column_method}_PrefixSearch");
            return self
                .set_prefix_search(column, value)
                .map(|_| ())
                .map_err(|e| resolve_failure(column, method, e));
        }
        let Some(key) = ConditionKey::from_name(operator) else {
            return Err(failure(
                column,
                format!("set{column_method}_{}", init_cap(operator)),
                format!("unknown condition operator: {operator}"),
            ));
        };
        let method = format!("set{column_method}_{}", init_cap(key.key_name()));
        self.set_by_key(column, key, value)
            .map(|_| ())
            .map_err(|e| resolve_failure(column, method, e))
    }

    fn foreign_query(&mut self, property_path: &str) -> CBeanResult<ConditionQuery<'_>> {
        let mut node = self.node_id();
        let cb = self.bean_mut();
        for property in property_path.split('.') {
            node = cb
                .ensure_foreign(node, property)
                .map_err(|e| resolve_failure(property_path, format!("query{}", init_cap(property)), e))?;
        }
        Ok(ConditionQuery::new(cb, node))
    }

    fn add_order_by(&mut self, column: &str, ascending: bool) -> CBeanResult<()> {
        let direction = if ascending { "Asc" } else { "Desc" };
        let method = format!("addOrderBy_{}_{direction}", self.column_method_name(column));
        self.register_order_by(column, ascending).map_err(|e| resolve_failure(column, method, e))
    }

    fn registered_value(&self, column: &str, operator: &str) -> CBeanResult<Option<Value>> {
        let column_method = self.column_method_name(column);
        let Some(key) = ConditionKey::from_name(operator) else {
            return Err(failure(
                column,
                format!("get{column_method}_{}", init_cap(operator)),
                format!("unknown condition operator: {operator}"),
            ));
        };
        if self.table().find_column(column).is_none() {
            return Err(failure(
                column,
                format!("get{column_method}_{}", init_cap(key.key_name())),
                format!("no column {column} in {}", self.table().table_db_name),
            ));
        }
        Ok(ConditionQuery::condition_value(self, column).and_then(|cv| cv.get(key).cloned()))
    }
}
