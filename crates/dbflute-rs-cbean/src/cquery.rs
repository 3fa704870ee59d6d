//! Condition queries: one node of a condition bean's query graph.
//!
//! Every table position a bean can address (the base table, each navigated
//! relation, the base-table inline view, each join ON clause) is a
//! [`QueryNode`] stored in the bean's arena and addressed by index. A
//! relation node keeps its parent's index instead of a reference, so the
//! graph never forms ownership cycles.
//!
//! [`ConditionQuery`] is the handle callers use: a mutable borrow of the
//! bean plus a node index. Condition setters validate the value against the
//! operator, record it in the column's [`ConditionValue`], and register a
//! where-tree node into the clause target of the node.
//!
//! # Examples
//!
//! ```
//! use dbflute_rs_cbean::cbean::ConditionBean;
//! use dbflute_rs_cbean::coption::LikeSearchOption;
//! use dbflute_rs_cbean::tables::CRAWLER_TABLES;
//! use dbflute_rs_core::BindStyle;
//!
//! let mut cb = ConditionBean::new(&CRAWLER_TABLES, "ACCESS_RESULT").unwrap();
//! cb.query()
//!     .set_equal("SESSION_ID", "s1").unwrap()
//!     .set_like_search("URL", "http://", LikeSearchOption::new().like_prefix()).unwrap();
//! cb.query().query_foreign("accessResultDataAsOne").unwrap()
//!     .set_equal("TRANSFORMER_NAME", "fessXpathTransformer").unwrap();
//!
//! let sql = cb.to_select_sql().unwrap();
//! assert!(sql.sql.contains("where dfloc.SESSION_ID = ? and dfloc.URL like ? escape '|'"));
//! assert!(sql.sql.contains("left outer join ACCESS_RESULT_DATA dfrel_0 on dfloc.ID = dfrel_0.ID"));
//! ```

use std::collections::BTreeMap;

use dbflute_rs_core::{CBeanError, CBeanResult};
use tracing::{debug, warn};

use crate::cbean::ConditionBean;
use crate::ckey::{self, ConditionKey, Registration};
use crate::coption::{FromToOption, LikeSearchOption};
use crate::cvalue::ConditionValue;
use crate::invalid::InvalidQueryInfo;
use crate::meta::TableMeta;
use crate::sqlclause::{JoinInfo, NullsOrder, OrderByElement, WhereNode, WhereTarget};
use crate::value::Value;

/// Index of a node in a bean's arena.
pub(crate) type NodeId = usize;

/// The role of a query node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeKind {
    Base,
    Relation,
    Inline,
    OnClause,
}

/// Link from a relation node back to where it was navigated from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RelationLink {
    pub(crate) parent: NodeId,
    pub(crate) foreign_property: &'static str,
    pub(crate) join_index: usize,
}

/// One table position in the query graph.
#[derive(Debug, Clone)]
pub(crate) struct QueryNode {
    pub(crate) table: &'static TableMeta,
    pub(crate) kind: NodeKind,
    pub(crate) alias: String,
    pub(crate) location: String,
    pub(crate) relation_path: String,
    pub(crate) nest_level: usize,
    pub(crate) relation: Option<RelationLink>,
    pub(crate) target: WhereTarget,
    pub(crate) condition_values: BTreeMap<&'static str, ConditionValue>,
    pub(crate) foreign_children: BTreeMap<&'static str, NodeId>,
    pub(crate) inline_child: Option<NodeId>,
    pub(crate) sub_query_count: usize,
}

impl QueryNode {
    pub(crate) fn base(table: &'static TableMeta, alias: String, location: String) -> Self {
        Self {
            table,
            kind: NodeKind::Base,
            alias,
            location,
            relation_path: String::new(),
            nest_level: 0,
            relation: None,
            target: WhereTarget::Where,
            condition_values: BTreeMap::new(),
            foreign_children: BTreeMap::new(),
            inline_child: None,
            sub_query_count: 0,
        }
    }
}

/// `accessResultDataAsOne` -> `AccessResultDataAsOne`
pub(crate) fn init_cap(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ── Node management ────────────────────────────────────────────────────

impl ConditionBean {
    /// Returns the node for `property` under `parent`, registering the join
    /// the first time the relation is navigated.
    pub(crate) fn ensure_foreign(&mut self, parent: NodeId, property: &str) -> CBeanResult<NodeId> {
        let (table, kind, parent_alias, parent_location, parent_path, parent_level) = {
            let node = &self.nodes[parent];
            (
                node.table,
                node.kind,
                node.alias.clone(),
                node.location.clone(),
                node.relation_path.clone(),
                node.nest_level,
            )
        };
        if matches!(kind, NodeKind::Inline | NodeKind::OnClause) {
            return Err(CBeanError::IllegalConditionBeanOperation(format!(
                "relations cannot be navigated from an inline query: {parent_location}.{property}"
            )));
        }
        let (relation_no, foreign) = table.foreign(property)?;
        if let Some(&child) = self.nodes[parent].foreign_children.get(foreign.property_name) {
            return Ok(child);
        }
        let foreign_table = self.registry.table(foreign.foreign_table)?;
        let relation_path = format!("{parent_path}_{relation_no}");
        let alias = self.relation_alias(&relation_path);
        let join_index = self.clause.add_join(JoinInfo {
            table: foreign_table,
            alias: alias.clone(),
            local_alias: parent_alias,
            relation_path: relation_path.clone(),
            foreign_property: foreign.property_name,
            column_pairs: foreign.column_pairs,
            inner: false,
            on_conditions: Vec::new(),
        });
        let node = QueryNode {
            table: foreign_table,
            kind: NodeKind::Relation,
            alias,
            location: format!(
                "{parent_location}.conditionQuery{}",
                init_cap(foreign.property_name)
            ),
            relation_path,
            nest_level: parent_level + 1,
            relation: Some(RelationLink {
                parent,
                foreign_property: foreign.property_name,
                join_index,
            }),
            target: WhereTarget::Where,
            condition_values: BTreeMap::new(),
            foreign_children: BTreeMap::new(),
            inline_child: None,
            sub_query_count: 0,
        };
        self.nodes.push(node);
        let id = self.nodes.len() - 1;
        self.nodes[parent].foreign_children.insert(foreign.property_name, id);
        Ok(id)
    }

    /// Returns the inline node of a base or relation node.
    pub(crate) fn ensure_inline(&mut self, owner: NodeId) -> CBeanResult<NodeId> {
        if let Some(id) = self.nodes[owner].inline_child {
            return Ok(id);
        }
        let owner_node = &self.nodes[owner];
        let (kind, alias, location, target) = match (owner_node.kind, &owner_node.relation) {
            (NodeKind::Base, _) => (
                NodeKind::Inline,
                self.clause.inline_alias().to_string(),
                format!("{}.inlineQuery", owner_node.location),
                WhereTarget::BaseInline,
            ),
            (NodeKind::Relation, Some(link)) => (
                NodeKind::OnClause,
                owner_node.alias.clone(),
                format!("{}.onClauseQuery", owner_node.location),
                WhereTarget::JoinOn(link.join_index),
            ),
            _ => {
                return Err(CBeanError::IllegalConditionBeanOperation(format!(
                    "an inline query has no inline query of its own: {}",
                    owner_node.location
                )))
            }
        };
        let node = QueryNode {
            table: owner_node.table,
            kind,
            alias,
            location,
            relation_path: owner_node.relation_path.clone(),
            nest_level: owner_node.nest_level,
            relation: owner_node.relation.clone(),
            target,
            condition_values: BTreeMap::new(),
            foreign_children: BTreeMap::new(),
            inline_child: None,
            sub_query_count: 0,
        };
        self.nodes.push(node);
        let id = self.nodes.len() - 1;
        self.nodes[owner].inline_child = Some(id);
        Ok(id)
    }

    /// Navigates a dotted relation path from the base node.
    pub(crate) fn ensure_relation_path(&mut self, path: &str) -> CBeanResult<NodeId> {
        let mut node = 0;
        for property in path.split('.').filter(|p| !p.is_empty()) {
            node = self.ensure_foreign(node, property)?;
        }
        Ok(node)
    }

    /// Records a rejected condition, or raises it in checked mode.
    pub(crate) fn handle_invalid_query(&mut self, info: InvalidQueryInfo) -> CBeanResult<()> {
        if self.check_invalid_query {
            return Err(info.to_error());
        }
        debug!(invalid = %info, "invalid query skipped");
        self.invalid_queries.push(info);
        Ok(())
    }
}

// ── ConditionQuery ─────────────────────────────────────────────────────

/// A handle on one query node of a [`ConditionBean`].
#[derive(Debug)]
pub struct ConditionQuery<'a> {
    cb: &'a mut ConditionBean,
    node: NodeId,
}

impl<'a> ConditionQuery<'a> {
    pub(crate) fn new(cb: &'a mut ConditionBean, node: NodeId) -> Self {
        Self { cb, node }
    }

    fn node(&self) -> &QueryNode {
        &self.cb.nodes[self.node]
    }

    /// The table of this node.
    pub fn table(&self) -> &'static TableMeta {
        self.node().table
    }

    /// SQL alias of this node's table, e.g. `dfloc` or `dfrel_0`.
    pub fn alias(&self) -> &str {
        &self.node().alias
    }

    /// Bind location prefix, e.g. `conditionQuery.conditionQueryAccessResultDataAsOne`.
    pub fn location(&self) -> &str {
        &self.node().location
    }

    /// Relation path from the base table, e.g. `_0`; empty for the base node.
    pub fn relation_path(&self) -> &str {
        &self.node().relation_path
    }

    /// Relation depth from the base table.
    pub fn nest_level(&self) -> usize {
        self.node().nest_level
    }

    /// Whether this is the base-table node.
    pub fn is_base_query(&self) -> bool {
        self.node().kind == NodeKind::Base
    }

    /// Foreign property this node was navigated through, if any.
    pub fn foreign_property(&self) -> Option<&'static str> {
        self.node().relation.as_ref().map(|link| link.foreign_property)
    }

    /// The recorded condition state of a column, if any.
    pub fn condition_value(&self, column: &str) -> Option<&ConditionValue> {
        let column = self.node().table.find_column(column)?;
        self.node().condition_values.get(column.db_name)
    }

    pub(crate) const fn node_id(&self) -> NodeId {
        self.node
    }

    pub(crate) fn bean_mut(&mut self) -> &mut ConditionBean {
        &mut *self.cb
    }

    // -- navigation -------------------------------------------------------

    /// Navigates to a foreign relation, registering a left outer join.
    pub fn query_foreign(&mut self, property: &str) -> CBeanResult<ConditionQuery<'_>> {
        let child = self.cb.ensure_foreign(self.node, property)?;
        Ok(ConditionQuery::new(self.cb, child))
    }

    /// The base-table inline view: conditions narrow the base table before
    /// joins apply. Only valid on the base query.
    pub fn inline(&mut self) -> CBeanResult<ConditionQuery<'_>> {
        if self.node().kind != NodeKind::Base {
            return Err(CBeanError::IllegalConditionBeanOperation(format!(
                "inline() is only available on the base query: {}",
                self.node().location
            )));
        }
        let inline = self.cb.ensure_inline(self.node)?;
        Ok(ConditionQuery::new(self.cb, inline))
    }

    /// The join ON clause of this relation. Only valid on relation queries.
    pub fn on(&mut self) -> CBeanResult<ConditionQuery<'_>> {
        if self.node().kind != NodeKind::Relation {
            return Err(CBeanError::IllegalConditionBeanOperation(format!(
                "on() is only available on relation queries: {}",
                self.node().location
            )));
        }
        let on = self.cb.ensure_inline(self.node)?;
        Ok(ConditionQuery::new(self.cb, on))
    }

    /// Switches this relation's join to an inner join.
    pub fn inner_join(&mut self) -> CBeanResult<&mut Self> {
        let join_index = match (&self.node().relation, self.node().kind) {
            (Some(link), NodeKind::Relation) => link.join_index,
            _ => {
                return Err(CBeanError::IllegalConditionBeanOperation(format!(
                    "inner join is only available on relation queries: {}",
                    self.node().location
                )))
            }
        };
        self.cb.clause.make_inner_join(join_index);
        Ok(self)
    }

    // -- conditions -------------------------------------------------------

    /// `column = value`
    pub fn set_equal(&mut self, column: &str, value: impl Into<Value>) -> CBeanResult<&mut Self> {
        self.register(column, ConditionKey::Equal, value.into(), None)?;
        Ok(self)
    }

    /// `column <> value`
    pub fn set_not_equal(&mut self, column: &str, value: impl Into<Value>) -> CBeanResult<&mut Self> {
        self.register(column, ConditionKey::NotEqual, value.into(), None)?;
        Ok(self)
    }

    /// `column > value`
    pub fn set_greater_than(&mut self, column: &str, value: impl Into<Value>) -> CBeanResult<&mut Self> {
        self.register(column, ConditionKey::GreaterThan, value.into(), None)?;
        Ok(self)
    }

    /// `column < value`
    pub fn set_less_than(&mut self, column: &str, value: impl Into<Value>) -> CBeanResult<&mut Self> {
        self.register(column, ConditionKey::LessThan, value.into(), None)?;
        Ok(self)
    }

    /// `column >= value`
    pub fn set_greater_equal(&mut self, column: &str, value: impl Into<Value>) -> CBeanResult<&mut Self> {
        self.register(column, ConditionKey::GreaterEqual, value.into(), None)?;
        Ok(self)
    }

    /// `column <= value`
    pub fn set_less_equal(&mut self, column: &str, value: impl Into<Value>) -> CBeanResult<&mut Self> {
        self.register(column, ConditionKey::LessEqual, value.into(), None)?;
        Ok(self)
    }

    /// `column in (...)`. Null elements are dropped; a list longer than the
    /// in-scope limit is split into several `in` conditions joined by `or`.
    pub fn set_in_scope<V: Into<Value>>(
        &mut self,
        column: &str,
        values: impl IntoIterator<Item = V>,
    ) -> CBeanResult<&mut Self> {
        let list = Value::List(values.into_iter().map(Into::into).collect());
        self.register(column, ConditionKey::InScope, list, None)?;
        Ok(self)
    }

    /// `column not in (...)`, split into `and`-joined chunks past the limit.
    pub fn set_not_in_scope<V: Into<Value>>(
        &mut self,
        column: &str,
        values: impl IntoIterator<Item = V>,
    ) -> CBeanResult<&mut Self> {
        let list = Value::List(values.into_iter().map(Into::into).collect());
        self.register(column, ConditionKey::NotInScope, list, None)?;
        Ok(self)
    }

    /// `column like value`, refined by the option.
    pub fn set_like_search(
        &mut self,
        column: &str,
        value: impl Into<Value>,
        option: LikeSearchOption,
    ) -> CBeanResult<&mut Self> {
        self.register(column, ConditionKey::LikeSearch, value.into(), Some(option))?;
        Ok(self)
    }

    /// `column not like value`
    pub fn set_not_like_search(
        &mut self,
        column: &str,
        value: impl Into<Value>,
        option: LikeSearchOption,
    ) -> CBeanResult<&mut Self> {
        self.register(column, ConditionKey::NotLikeSearch, value.into(), Some(option))?;
        Ok(self)
    }

    /// `column like 'value%' escape '|'`
    pub fn set_prefix_search(&mut self, column: &str, value: impl Into<Value>) -> CBeanResult<&mut Self> {
        self.set_like_search(column, value, LikeSearchOption::new().like_prefix())
    }

    /// `column is null`
    pub fn set_is_null(&mut self, column: &str) -> CBeanResult<&mut Self> {
        self.register(column, ConditionKey::IsNull, Value::Null, None)?;
        Ok(self)
    }

    /// `column is not null`
    pub fn set_is_not_null(&mut self, column: &str) -> CBeanResult<&mut Self> {
        self.register(column, ConditionKey::IsNotNull, Value::Null, None)?;
        Ok(self)
    }

    /// A range with independent ends. A null end is skipped; when both
    /// ends are null the from-side goes through invalid-query handling.
    pub fn set_from_to(
        &mut self,
        column: &str,
        from: impl Into<Value>,
        to: impl Into<Value>,
        option: FromToOption,
    ) -> CBeanResult<&mut Self> {
        let (from, to) = (from.into(), to.into());
        if !from.is_null() || to.is_null() {
            self.register(column, option.from_key(), option.filter_from(from), None)?;
        }
        if !to.is_null() {
            self.register(column, option.to_key(), option.filter_to(to), None)?;
        }
        Ok(self)
    }

    /// Registers a condition by operator. List keys expect a [`Value::List`].
    pub fn set_by_key(
        &mut self,
        column: &str,
        key: ConditionKey,
        value: impl Into<Value>,
    ) -> CBeanResult<&mut Self> {
        let option = key.is_like_key().then(LikeSearchOption::new);
        self.register(column, key, value.into(), option)?;
        Ok(self)
    }

    fn cvalue_mut(&mut self, db_name: &'static str) -> &mut ConditionValue {
        self.cb.nodes[self.node]
            .condition_values
            .entry(db_name)
            .or_default()
    }

    fn register(
        &mut self,
        column_name: &str,
        key: ConditionKey,
        value: Value,
        like_option: Option<LikeSearchOption>,
    ) -> CBeanResult<()> {
        self.cb.purpose.assert_query()?;
        let (table, alias, location, target) = {
            let node = self.node();
            (node.table, node.alias.clone(), node.location.clone(), node.target)
        };
        let column = table.column(column_name)?;
        let column_location = format!("{location}.{}", column.property_name);
        let real_column = format!("{alias}.{}", column.db_name);
        let allow_empty = self.cb.allow_empty_string_query;

        let in_or_scope = self.cb.clause.or_scope_state().is_or_scope();
        let registration = match key.is_valid_registration(self.cvalue_mut(column.db_name), &value, allow_empty) {
            // every registration inside an or-scope is its own branch
            Registration::Duplicate | Registration::Override if in_or_scope => Registration::Valid,
            other => other,
        };
        match registration {
            Registration::Invalid => {
                return self.cb.handle_invalid_query(InvalidQueryInfo {
                    location,
                    column: column.db_name.to_string(),
                    key,
                    value,
                });
            }
            Registration::Duplicate => {
                debug!(column = %real_column, %key, "duplicate condition skipped");
                return Ok(());
            }
            Registration::Override => {
                let bind = key.setup_condition_value(self.cvalue_mut(column.db_name), value.clone(), &column_location);
                if let Some(path) = bind {
                    self.cb.clause.override_bind(&path, &value);
                }
                warn!(column = %real_column, %key, value = %value, "condition value overridden");
                return Ok(());
            }
            Registration::Valid => {}
        }

        let node = if key.is_list_key() {
            self.build_in_scope(key, value, &real_column, &column_location, column.db_name)
        } else if key.is_like_key() {
            let option = like_option
                .unwrap_or_default()
                .with_default_escape(self.cb.like_search_escape);
            match self.build_like_search(key, &value, &option, &real_column, &column_location, column.db_name)? {
                Some(node) => node,
                None => {
                    return self.cb.handle_invalid_query(InvalidQueryInfo {
                        location,
                        column: column.db_name.to_string(),
                        key,
                        value,
                    });
                }
            }
        } else {
            let cvalue = self.cvalue_mut(column.db_name);
            let bind = if in_or_scope && !key.is_null_key() {
                Some(cvalue.push_scoped(key, value.clone(), &column_location))
            } else {
                key.setup_condition_value(cvalue, value.clone(), &column_location)
            };
            WhereNode::Leaf(key.build_clause(&real_column, bind.as_deref(), value, ""))
        };
        self.cb.clause.register(target, node);
        Ok(())
    }

    fn build_in_scope(
        &mut self,
        key: ConditionKey,
        value: Value,
        real_column: &str,
        column_location: &str,
        db_name: &'static str,
    ) -> WhereNode {
        let allow_empty = self.cb.allow_empty_string_query;
        let elements = match value {
            Value::List(elements) => ckey::filter_list_elements(elements, allow_empty),
            other => vec![other],
        };
        let limit = self.cb.in_scope_limit;
        let chunk_size = if limit > 0 { limit } else { elements.len().max(1) };
        let chunks: Vec<Vec<Value>> = elements.chunks(chunk_size).map(<[Value]>::to_vec).collect();
        if chunks.len() > 1 {
            debug!(
                column = real_column,
                size = elements.len(),
                limit,
                chunks = chunks.len(),
                "in-scope list split"
            );
        }
        let leaves: Vec<WhereNode> = chunks
            .into_iter()
            .map(|chunk| {
                let chunk = Value::List(chunk);
                let bind = key.setup_condition_value(self.cvalue_mut(db_name), chunk.clone(), column_location);
                WhereNode::Leaf(key.build_clause(real_column, bind.as_deref(), chunk, ""))
            })
            .collect();
        match key {
            ConditionKey::NotInScope => WhereNode::and(leaves),
            _ => WhereNode::or(leaves),
        }
    }

    fn build_like_search(
        &mut self,
        key: ConditionKey,
        value: &Value,
        option: &LikeSearchOption,
        real_column: &str,
        column_location: &str,
        db_name: &'static str,
    ) -> CBeanResult<Option<WhereNode>> {
        let Some(text) = value.as_str() else {
            return Ok(None);
        };
        if option.is_split() && option.is_as_or_split() && self.cb.clause.or_scope_state().is_and_part() {
            return Err(CBeanError::OrScopeQueryAndPartUnsupported(format!(
                "or-split like-search is not supported inside an and-part: {real_column}"
            )));
        }
        let tokens = option.split_values(text);
        if tokens.is_empty() {
            return Ok(None);
        }
        if tokens.len() > 1 {
            debug!(column = real_column, tokens = tokens.len(), or_split = option.is_as_or_split(), "like-search split");
        }
        let rear = option.rear_option();
        let leaves: Vec<WhereNode> = tokens
            .iter()
            .map(|token| {
                let real = Value::from(option.generate_real_value(token));
                let bind = key.setup_condition_value(self.cvalue_mut(db_name), real.clone(), column_location);
                WhereNode::Leaf(key.build_clause(real_column, bind.as_deref(), real, &rear))
            })
            .collect();
        Ok(Some(if option.is_as_or_split() {
            WhereNode::or(leaves)
        } else {
            WhereNode::and(leaves)
        }))
    }

    // -- order by ---------------------------------------------------------

    /// Adds `column asc` to the order-by clause.
    pub fn add_order_by_asc(&mut self, column: &str) -> CBeanResult<&mut Self> {
        self.register_order_by(column, true)?;
        Ok(self)
    }

    /// Adds `column desc` to the order-by clause.
    pub fn add_order_by_desc(&mut self, column: &str) -> CBeanResult<&mut Self> {
        self.register_order_by(column, false)?;
        Ok(self)
    }

    pub(crate) fn register_order_by(&mut self, column_name: &str, ascending: bool) -> CBeanResult<()> {
        self.cb.purpose.assert_order_by()?;
        let node = self.node();
        if matches!(node.kind, NodeKind::Inline | NodeKind::OnClause) {
            return Err(CBeanError::IllegalConditionBeanOperation(format!(
                "order-by is not available on an inline query: {}",
                node.location
            )));
        }
        let column = node.table.column(column_name)?;
        let element = OrderByElement::new(
            format!("{}.{}", node.alias, column.db_name),
            format!("{}{}", column.db_name, node.relation_path),
            ascending,
        );
        self.cb.clause.order_by_mut().add(element);
        Ok(())
    }

    /// Puts nulls first for the most recent order-by element.
    pub fn with_nulls_first(&mut self) -> CBeanResult<&mut Self> {
        self.set_nulls(NullsOrder::First)?;
        Ok(self)
    }

    /// Puts nulls last for the most recent order-by element.
    pub fn with_nulls_last(&mut self) -> CBeanResult<&mut Self> {
        self.set_nulls(NullsOrder::Last)?;
        Ok(self)
    }

    fn set_nulls(&mut self, nulls: NullsOrder) -> CBeanResult<()> {
        let element = self.cb.clause.order_by_mut().last_mut().ok_or_else(|| {
            CBeanError::IllegalConditionBeanOperation(
                "nulls ordering requires a preceding order-by".to_string(),
            )
        })?;
        element.nulls = Some(nulls);
        Ok(())
    }

    /// Ranks the most recent order-by element by the position of its value
    /// in `values`; unlisted values sort after every listed one.
    pub fn with_manual_order<V: Into<Value>>(
        &mut self,
        values: impl IntoIterator<Item = V>,
    ) -> CBeanResult<&mut Self> {
        if self.cb.clause.has_union() {
            return Err(CBeanError::IllegalConditionBeanOperation(
                "Manual Order with Union is unavailable".to_string(),
            ));
        }
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        let element = self.cb.clause.order_by_mut().last_mut().ok_or_else(|| {
            CBeanError::IllegalConditionBeanOperation(
                "manual order requires a preceding order-by".to_string(),
            )
        })?;
        element.manual_values = values;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::CRAWLER_TABLES;
    use dbflute_rs_core::{BindStyle, CBeanSettings};

    fn bean(table: &str) -> ConditionBean {
        ConditionBean::with_settings(&CRAWLER_TABLES, table, &CBeanSettings::default()).unwrap()
    }

    fn where_sql(cb: &ConditionBean) -> String {
        cb.to_select_sql().unwrap().sql
    }

    #[test]
    fn test_init_cap() {
        assert_eq!(init_cap("accessResult"), "AccessResult");
        assert_eq!(init_cap(""), "");
    }

    #[test]
    fn test_equal_and_bind_location() {
        let mut cb = bean("URL_QUEUE");
        cb.query().set_equal("sessionId", "s1").unwrap();
        let sql = cb.to_select_sql().unwrap();
        assert!(sql.sql.ends_with("from URL_QUEUE dfloc where dfloc.SESSION_ID = ?"));
        assert_eq!(sql.bind_paths(), vec!["conditionQuery.sessionId.equal"]);
    }

    #[test]
    fn test_unknown_column() {
        let mut cb = bean("URL_QUEUE");
        let err = cb.query().set_equal("NO_SUCH", 1).unwrap_err();
        assert_eq!(err.kind(), "column_not_found");
    }

    #[test]
    fn test_null_value_recorded_as_invalid() {
        let mut cb = bean("URL_QUEUE");
        cb.query().set_equal("URL", Value::Null).unwrap();
        assert!(!cb.has_where_clause());
        assert_eq!(cb.invalid_query_list().len(), 1);
        assert_eq!(cb.invalid_query_list()[0].key, ConditionKey::Equal);
    }

    #[test]
    fn test_checked_mode_raises() {
        let mut cb = bean("URL_QUEUE");
        cb.check_invalid_query();
        let err = cb.query().set_equal("URL", "").unwrap_err();
        assert_eq!(err.kind(), "invalid_query_registered");
    }

    #[test]
    fn test_duplicate_and_override() {
        let mut cb = bean("URL_QUEUE");
        cb.query().set_equal("DEPTH", 1).unwrap();
        cb.query().set_equal("DEPTH", 1).unwrap();
        cb.query().set_equal("DEPTH", 2).unwrap();
        let sql = cb.to_select_sql().unwrap();
        assert_eq!(sql.sql.matches("DEPTH = ?").count(), 1);
        assert_eq!(sql.values(), vec![&Value::Int(2)]);
    }

    #[test]
    fn test_in_scope_split_by_limit() {
        let settings = CBeanSettings {
            in_scope_limit: 2,
            ..CBeanSettings::default()
        };
        let mut cb = ConditionBean::with_settings(&CRAWLER_TABLES, "URL_QUEUE", &settings).unwrap();
        cb.query().set_in_scope("ID", [1, 2, 3]).unwrap();
        cb.query().set_not_in_scope("DEPTH", [4, 5, 6]).unwrap();
        let sql = where_sql(&cb);
        assert!(sql.contains("where (dfloc.ID in (?, ?) or dfloc.ID in (?)) and dfloc.DEPTH not in (?, ?) and dfloc.DEPTH not in (?)"));
    }

    #[test]
    fn test_in_scope_drops_null_elements() {
        let mut cb = bean("URL_QUEUE");
        cb.query()
            .set_in_scope("ID", vec![Value::Int(1), Value::Null, Value::Int(3)])
            .unwrap();
        let sql = cb.to_select_sql().unwrap();
        assert!(sql.sql.ends_with("dfloc.ID in (?, ?)"));
    }

    #[test]
    fn test_like_split_and() {
        let mut cb = bean("ACCESS_RESULT");
        cb.query()
            .set_like_search("URL", "foo bar", LikeSearchOption::new().like_contain().split_by_space())
            .unwrap();
        let sql = cb.to_select_sql().unwrap();
        assert!(sql.sql.contains(
            "where dfloc.URL like ? escape '|' and dfloc.URL like ? escape '|'"
        ));
        assert_eq!(sql.values(), vec![&Value::from("%foo%"), &Value::from("%bar%")]);
    }

    #[test]
    fn test_like_or_split() {
        let mut cb = bean("ACCESS_RESULT");
        cb.query()
            .set_like_search(
                "URL",
                "foo bar",
                LikeSearchOption::new().like_prefix().split_by_space().as_or_split(),
            )
            .unwrap();
        assert!(where_sql(&cb).contains("where (dfloc.URL like ? escape '|' or dfloc.URL like ? escape '|')"));
    }

    #[test]
    fn test_like_blank_split_is_invalid() {
        let mut cb = bean("ACCESS_RESULT");
        cb.query()
            .set_like_search("URL", "   ", LikeSearchOption::new().split_by_space())
            .unwrap();
        assert_eq!(cb.invalid_query_list().len(), 1);
    }

    #[test]
    fn test_from_to_with_date_option() {
        let mut cb = bean("ACCESS_RESULT");
        let from = chrono::NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let to = chrono::NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        cb.query()
            .set_from_to("CREATE_TIME", from, to, FromToOption::new().compare_as_date())
            .unwrap();
        let sql = cb.to_select_sql().unwrap();
        assert!(sql.sql.contains("dfloc.CREATE_TIME >= ? and dfloc.CREATE_TIME < ?"));
        assert_eq!(
            sql.values()[1],
            &Value::from(chrono::NaiveDate::from_ymd_opt(2024, 3, 10).unwrap())
        );
    }

    #[test]
    fn test_from_to_null_end_skipped() {
        let mut cb = bean("ACCESS_RESULT");
        cb.query()
            .set_from_to("CREATE_TIME", Value::Null, Value::from(5), FromToOption::new())
            .unwrap();
        assert!(where_sql(&cb).ends_with("where dfloc.CREATE_TIME <= ?"));
        assert!(cb.invalid_query_list().is_empty());
    }

    #[test]
    fn test_is_null() {
        let mut cb = bean("URL_QUEUE");
        cb.query().set_is_null("PARENT_URL").unwrap().set_is_null("PARENT_URL").unwrap();
        assert!(where_sql(&cb).ends_with("where dfloc.PARENT_URL is null"));
    }

    #[test]
    fn test_relation_location_and_alias() {
        let mut cb = bean("ACCESS_RESULT");
        let mut cq = cb.query();
        let mut rel = cq.query_foreign("accessResultDataAsOne").unwrap();
        assert_eq!(rel.alias(), "dfrel_0");
        assert_eq!(rel.relation_path(), "_0");
        assert_eq!(rel.nest_level(), 1);
        assert_eq!(rel.location(), "conditionQuery.conditionQueryAccessResultDataAsOne");
        rel.set_equal("ENCODING", "UTF-8").unwrap();
        let sql = cb.to_select_sql().unwrap();
        assert_eq!(
            sql.bind_paths(),
            vec!["conditionQuery.conditionQueryAccessResultDataAsOne.encoding.equal"]
        );
        assert!(sql.sql.contains("where dfrel_0.ENCODING = ?"));
    }

    #[test]
    fn test_relation_registered_once() {
        let mut cb = bean("ACCESS_RESULT");
        cb.query().query_foreign("accessResultDataAsOne").unwrap();
        cb.query().query_foreign("accessResultDataAsOne").unwrap();
        assert_eq!(cb.clause().joins().len(), 1);
    }

    #[test]
    fn test_inner_join_and_on_clause() {
        let mut cb = bean("ACCESS_RESULT");
        cb.query()
            .query_foreign("accessResultDataAsOne")
            .unwrap()
            .inner_join()
            .unwrap()
            .on()
            .unwrap()
            .set_equal("TRANSFORMER_NAME", "t")
            .unwrap();
        let sql = where_sql(&cb);
        assert!(sql.contains(
            "inner join ACCESS_RESULT_DATA dfrel_0 on dfloc.ID = dfrel_0.ID and dfrel_0.TRANSFORMER_NAME = ?"
        ));
        assert!(!cb.has_where_clause());
        assert!(cb.query().inner_join().is_err());
        assert!(cb.query().on().is_err());
    }

    #[test]
    fn test_inline_view() {
        let mut cb = bean("ACCESS_RESULT");
        cb.query().inline().unwrap().set_equal("STATUS", 0).unwrap();
        let sql = cb.to_select_sql().unwrap();
        assert!(sql.sql.contains(
            "from (select * from ACCESS_RESULT dfinlineloc where dfinlineloc.STATUS = ?) dfloc"
        ));
        assert_eq!(sql.bind_paths(), vec!["conditionQuery.inlineQuery.status.equal"]);
    }

    #[test]
    fn test_order_by_with_nulls() {
        let mut cb = bean("ACCESS_RESULT");
        cb.query()
            .add_order_by_desc("LAST_MODIFIED")
            .unwrap()
            .with_nulls_last()
            .unwrap();
        cb.query()
            .query_foreign("accessResultDataAsOne")
            .unwrap()
            .add_order_by_asc("ENCODING")
            .unwrap();
        assert!(where_sql(&cb).ends_with(
            "order by dfloc.LAST_MODIFIED desc nulls last, dfrel_0.ENCODING asc"
        ));
    }

    #[test]
    fn test_nulls_without_order_by() {
        let mut cb = bean("ACCESS_RESULT");
        assert!(cb.query().with_nulls_first().is_err());
    }

    #[test]
    fn test_set_by_key_uses_bind_style() {
        let settings = CBeanSettings {
            bind_style: BindStyle::Numbered,
            ..CBeanSettings::default()
        };
        let mut cb = ConditionBean::with_settings(&CRAWLER_TABLES, "URL_FILTER", &settings).unwrap();
        cb.query()
            .set_by_key("FILTER_TYPE", ConditionKey::NotEqual, "I")
            .unwrap()
            .set_by_key("ID", ConditionKey::InScope, vec![Value::Int(1), Value::Int(2)])
            .unwrap();
        assert!(where_sql(&cb).ends_with("where dfloc.FILTER_TYPE <> $1 and dfloc.ID in ($2, $3)"));
    }

    #[test]
    fn test_comparison_setters() {
        let mut cb = bean("URL_QUEUE");
        assert!(cb.query().is_base_query());
        cb.query()
            .set_not_equal("METHOD", "HEAD")
            .unwrap()
            .set_greater_than("DEPTH", 0)
            .unwrap()
            .set_less_than("DEPTH", 5)
            .unwrap()
            .set_greater_equal("ID", 10)
            .unwrap()
            .set_less_equal("ID", 20)
            .unwrap()
            .set_is_not_null("PARENT_URL")
            .unwrap()
            .set_not_like_search("URL", "%.gif", LikeSearchOption::new())
            .unwrap();
        let sql = where_sql(&cb);
        assert!(sql.contains(
            "where dfloc.METHOD <> ? and dfloc.DEPTH > ? and dfloc.DEPTH < ? \
             and dfloc.ID >= ? and dfloc.ID <= ? and dfloc.PARENT_URL is not null"
        ));
        assert!(sql.contains("dfloc.URL not like ?"));
        assert!(cb.query().query_foreign("NO_SUCH").is_err());
    }
}
