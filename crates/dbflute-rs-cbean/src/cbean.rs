//! The condition bean: root of a query graph for one table.
//!
//! A [`ConditionBean`] owns the arena of query nodes, the structured SQL
//! clause, the purpose that gates its operations, paging state, union
//! partners, free parameters and invalid-query bookkeeping. Conditions are
//! added through [`query()`](ConditionBean::query), columns through
//! [`specify()`](ConditionBean::specify), and statements are rendered with
//! [`to_select_sql`](ConditionBean::to_select_sql) /
//! [`to_count_sql`](ConditionBean::to_count_sql) or executed through a
//! [`SelectExecutor`].
//!
//! Paging methods come from the [`PagingBean`] trait.
//!
//! # Examples
//!
//! ```
//! use dbflute_rs_cbean::cbean::ConditionBean;
//! use dbflute_rs_cbean::paging::PagingBean;
//! use dbflute_rs_cbean::tables::CRAWLER_TABLES;
//!
//! let mut cb = ConditionBean::new(&CRAWLER_TABLES, "URL_QUEUE").unwrap();
//! cb.query().set_equal("SESSION_ID", "s1").unwrap();
//! cb.or_scope_query(|cb| {
//!     cb.query().set_equal("DEPTH", 0)?;
//!     cb.query().set_is_null("PARENT_URL")?;
//!     Ok(())
//! })
//! .unwrap();
//! cb.query().add_order_by_asc("CREATE_TIME").unwrap();
//! cb.paging(20, 2).unwrap();
//!
//! let sql = cb.to_select_sql().unwrap().sql;
//! assert!(sql.ends_with(
//!     "where dfloc.SESSION_ID = ? and (dfloc.DEPTH = ? or dfloc.PARENT_URL is null) \
//!      order by dfloc.CREATE_TIME asc limit 20 offset 20"
//! ));
//! ```

use std::collections::BTreeMap;

use dbflute_rs_core::logging::{query_span, SelectKind};
use dbflute_rs_core::{BindStyle, CBeanError, CBeanResult, CBeanSettings, SETTINGS};
use tracing::debug;

use crate::ckey::ConditionKey;
use crate::coption::ColumnCalculation;
use crate::cquery::{ConditionQuery, NodeId, QueryNode};
use crate::cvalue::ConditionValue;
use crate::executor::{ExecutorPagingHandler, SelectExecutor};
use crate::invalid::InvalidQueryInfo;
use crate::meta::{MetaRegistry, TableMeta};
use crate::paging::{ListResultBean, PagingBean, PagingInvoker, PagingResultBean, ResultBeanBuilder};
use crate::purpose::QueryPurpose;
use crate::row::Row;
use crate::specify::Specification;
use crate::sqlclause::{BoundSql, SpecifiedColumn, SqlClause, SqlFragment, WhereNode, WhereTarget};
use crate::subquery::{aggregate, assert_comparison, DerivedFunction};
use crate::value::Value;

/// Column alias of a scalar select's single result column.
pub const SCALAR_VALUE_ALIAS: &str = "SCALAR_VALUE";

/// State of a bean when a scope opened.
#[derive(Debug)]
struct ScopeSnapshot {
    condition_values: Vec<BTreeMap<&'static str, ConditionValue>>,
    invalid_queries: usize,
    sub_query_identities: usize,
}

/// Root query builder for one table.
#[derive(Debug, Clone)]
pub struct ConditionBean {
    pub(crate) registry: &'static MetaRegistry,
    pub(crate) table: &'static TableMeta,
    pub(crate) purpose: QueryPurpose,
    pub(crate) sub_query_level: usize,
    pub(crate) location: String,
    pub(crate) nodes: Vec<QueryNode>,
    pub(crate) clause: SqlClause,
    pub(crate) bind_style: BindStyle,
    pub(crate) in_scope_limit: usize,
    pub(crate) like_search_escape: char,
    pub(crate) check_invalid_query: bool,
    pub(crate) allow_empty_string_query: bool,
    pub(crate) safety_max_result_size: usize,
    pub(crate) count_later: bool,
    pub(crate) paging_reselect: bool,
    pub(crate) paging: bool,
    pub(crate) invalid_queries: Vec<InvalidQueryInfo>,
    pub(crate) free_parameters: BTreeMap<String, Value>,
    pub(crate) sub_query_identities: Vec<String>,
    pub(crate) selected_relations: Vec<String>,
}

impl ConditionBean {
    /// Creates a bean for `table` using the global settings.
    pub fn new(registry: &'static MetaRegistry, table: &str) -> CBeanResult<Self> {
        Self::with_settings(registry, table, &SETTINGS.get_or_default())
    }

    /// Creates a bean for `table` using explicit settings.
    pub fn with_settings(
        registry: &'static MetaRegistry,
        table: &str,
        settings: &CBeanSettings,
    ) -> CBeanResult<Self> {
        let meta = registry.table(table)?;
        let mut cb = Self::create(registry, meta, QueryPurpose::NormalUse, 0, "conditionQuery".to_string());
        cb.bind_style = settings.bind_style;
        cb.in_scope_limit = settings.in_scope_limit;
        cb.like_search_escape = settings.like_search_escape;
        cb.check_invalid_query = settings.check_invalid_query;
        cb.allow_empty_string_query = settings.allow_empty_string_query;
        cb.safety_max_result_size = settings.safety_max_result_size;
        cb.count_later = settings.count_later;
        cb.paging_reselect = settings.paging_reselect;
        Ok(cb)
    }

    fn create(
        registry: &'static MetaRegistry,
        table: &'static TableMeta,
        purpose: QueryPurpose,
        sub_query_level: usize,
        location: String,
    ) -> Self {
        let (base_alias, inline_alias) = if sub_query_level == 0 {
            ("dfloc".to_string(), "dfinlineloc".to_string())
        } else {
            (
                format!("dfsublocal_{sub_query_level}"),
                format!("dfinlinesublocal_{sub_query_level}"),
            )
        };
        let defaults = CBeanSettings::default();
        Self {
            registry,
            table,
            purpose,
            sub_query_level,
            nodes: vec![QueryNode::base(table, base_alias.clone(), location.clone())],
            location,
            clause: SqlClause::new(table, base_alias, inline_alias),
            bind_style: defaults.bind_style,
            in_scope_limit: defaults.in_scope_limit,
            like_search_escape: defaults.like_search_escape,
            check_invalid_query: defaults.check_invalid_query,
            allow_empty_string_query: defaults.allow_empty_string_query,
            safety_max_result_size: defaults.safety_max_result_size,
            count_later: defaults.count_later,
            paging_reselect: defaults.paging_reselect,
            paging: true,
            invalid_queries: Vec::new(),
            free_parameters: BTreeMap::new(),
            sub_query_identities: Vec::new(),
            selected_relations: Vec::new(),
        }
    }

    /// A bean for a sub-query or union partner, inheriting this bean's modes.
    pub(crate) fn sub_bean(&self, table: &'static TableMeta, purpose: QueryPurpose, location: String) -> Self {
        let level = if purpose == QueryPurpose::UnionQuery {
            self.sub_query_level
        } else {
            self.sub_query_level + 1
        };
        let mut sub = Self::create(self.registry, table, purpose, level, location);
        sub.bind_style = self.bind_style;
        sub.in_scope_limit = self.in_scope_limit;
        sub.like_search_escape = self.like_search_escape;
        sub.check_invalid_query = self.check_invalid_query;
        sub.allow_empty_string_query = self.allow_empty_string_query;
        sub
    }

    pub(crate) fn relation_alias(&self, relation_path: &str) -> String {
        if self.sub_query_level == 0 {
            format!("dfrel{relation_path}")
        } else {
            format!("dfsub{}rel{relation_path}", self.sub_query_level)
        }
    }

    pub(crate) fn single_specified(&self, usage: &str) -> CBeanResult<SpecifiedColumn> {
        match self.clause.specified() {
            [one] => Ok(one.clone()),
            other => Err(CBeanError::SpecifyColumnInvalid(format!(
                "{usage} needs exactly one specified column of {} but found {}",
                self.table.table_db_name,
                other.len()
            ))),
        }
    }

    // ── Accessors ──────────────────────────────────────────────────────

    /// The base table.
    pub const fn table(&self) -> &'static TableMeta {
        self.table
    }

    /// The metadata registry relations are resolved against.
    pub const fn registry(&self) -> &'static MetaRegistry {
        self.registry
    }

    /// The current purpose.
    pub const fn purpose(&self) -> QueryPurpose {
        self.purpose
    }

    /// Switches the purpose, e.g. before handing the bean to an update or
    /// insert-select command that only accepts certain operations.
    pub fn set_purpose(&mut self, purpose: QueryPurpose) {
        self.purpose = purpose;
    }

    /// Sub-query nesting level (0 for a top-level bean).
    pub const fn sub_query_level(&self) -> usize {
        self.sub_query_level
    }

    pub(crate) fn location(&self) -> &str {
        &self.location
    }

    /// The structured clause.
    pub const fn clause(&self) -> &SqlClause {
        &self.clause
    }

    /// Placeholder style of rendered statements.
    pub const fn bind_style(&self) -> BindStyle {
        self.bind_style
    }

    /// Changes the placeholder style.
    pub fn set_bind_style(&mut self, bind_style: BindStyle) {
        self.bind_style = bind_style;
    }

    /// Conditions that were skipped because their value was invalid.
    pub fn invalid_query_list(&self) -> &[InvalidQueryInfo] {
        &self.invalid_queries
    }

    /// `{property}[{level}]` of every sub-query registered under this bean,
    /// nested ones included.
    pub fn sub_query_identities(&self) -> &[String] {
        &self.sub_query_identities
    }

    /// Adds a named parameter for outside-SQL style callers.
    pub fn add_free_parameter(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.free_parameters.insert(key.into(), value.into());
    }

    /// Named free parameters.
    pub const fn free_parameters(&self) -> &BTreeMap<String, Value> {
        &self.free_parameters
    }

    // ── Query building ─────────────────────────────────────────────────

    /// The base-table condition query.
    pub fn query(&mut self) -> ConditionQuery<'_> {
        ConditionQuery::new(self, 0)
    }

    /// Column specification on the base table.
    pub fn specify(&mut self) -> CBeanResult<Specification<'_>> {
        self.purpose.assert_specify()?;
        Ok(Specification::new(self, 0))
    }

    /// Adds the columns of a (dotted) foreign relation path to the select
    /// list. Every relation along the path is selected.
    pub fn setup_select(&mut self, relation_path: &str) -> CBeanResult<()> {
        self.purpose.assert_setup_select()?;
        if self.clause.has_union() {
            return Err(CBeanError::IllegalConditionBeanOperation(format!(
                "setup-select after union is unavailable: {relation_path}"
            )));
        }
        let mut node: NodeId = self.ensure_relation_path(relation_path)?;
        let mut joins = Vec::new();
        while let Some(link) = &self.nodes[node].relation {
            joins.push(link.join_index);
            node = link.parent;
        }
        for join_index in joins.into_iter().rev() {
            self.clause.select_join(join_index);
        }
        if !self.selected_relations.iter().any(|p| p == relation_path) {
            self.selected_relations.push(relation_path.to_string());
        }
        Ok(())
    }

    /// Checks invalid queries strictly: a null, empty or badly shaped
    /// condition value raises [`CBeanError::InvalidQueryRegistered`].
    ///
    /// Without this call the bean is permissive: an invalid condition is
    /// silently dropped and only recorded in
    /// [`invalid_query_list`](Self::invalid_query_list). A dropped condition
    /// widens the query, so a forgotten value can select (or, through a
    /// where-scoped update, touch) far more rows than intended.
    pub fn check_invalid_query(&mut self) {
        self.check_invalid_query = true;
    }

    /// Treats empty strings as valid condition values.
    pub fn allow_empty_string_query(&mut self) {
        self.allow_empty_string_query = true;
    }

    /// Splits in-scope lists longer than `limit` (0 disables splitting).
    pub fn set_in_scope_limit(&mut self, limit: usize) {
        self.in_scope_limit = limit;
    }

    /// Derives the all-record count from a short last page when possible.
    pub fn enable_count_later(&mut self) {
        self.count_later = true;
    }

    /// Keeps an empty page as is instead of re-selecting the last page.
    pub fn disable_paging_reselect(&mut self) {
        self.paging_reselect = false;
    }

    // ── Or-scope ───────────────────────────────────────────────────────

    /// Registers the conditions added in `f` as one `or` group.
    pub fn or_scope_query<F>(&mut self, f: F) -> CBeanResult<()>
    where
        F: FnOnce(&mut Self) -> CBeanResult<()>,
    {
        self.clause.begin_or_scope()?;
        let snapshot = self.scope_snapshot();
        match f(self) {
            Ok(()) => self.clause.end_or_scope(),
            Err(e) => {
                self.clause.abort_or_scope();
                self.restore_scope_snapshot(snapshot);
                Err(e)
            }
        }
    }

    /// Inside an or-scope, registers the conditions added in `f` as one
    /// `and`-joined branch of the `or` group.
    pub fn or_scope_query_and_part<F>(&mut self, f: F) -> CBeanResult<()>
    where
        F: FnOnce(&mut Self) -> CBeanResult<()>,
    {
        self.clause.begin_and_part()?;
        let snapshot = self.scope_snapshot();
        match f(self) {
            Ok(()) => self.clause.end_and_part(),
            Err(e) => {
                self.clause.abort_and_part();
                self.restore_scope_snapshot(snapshot);
                Err(e)
            }
        }
    }

    fn scope_snapshot(&self) -> ScopeSnapshot {
        ScopeSnapshot {
            condition_values: self.nodes.iter().map(|n| n.condition_values.clone()).collect(),
            invalid_queries: self.invalid_queries.len(),
            sub_query_identities: self.sub_query_identities.len(),
        }
    }

    /// Drops every condition value and bookkeeping entry registered since
    /// `snapshot`, so an aborted scope leaves no trace.
    fn restore_scope_snapshot(&mut self, snapshot: ScopeSnapshot) {
        let mut saved = snapshot.condition_values.into_iter();
        for node in &mut self.nodes {
            node.condition_values = saved.next().unwrap_or_default();
        }
        self.invalid_queries.truncate(snapshot.invalid_queries);
        self.sub_query_identities.truncate(snapshot.sub_query_identities);
    }

    // ── Union ──────────────────────────────────────────────────────────

    /// `... union select ... from <partner>`
    pub fn union<F>(&mut self, f: F) -> CBeanResult<()>
    where
        F: FnOnce(&mut Self) -> CBeanResult<()>,
    {
        self.register_union(false, f)
    }

    /// `... union all select ... from <partner>`
    pub fn union_all<F>(&mut self, f: F) -> CBeanResult<()>
    where
        F: FnOnce(&mut Self) -> CBeanResult<()>,
    {
        self.register_union(true, f)
    }

    fn register_union<F>(&mut self, all: bool, f: F) -> CBeanResult<()>
    where
        F: FnOnce(&mut Self) -> CBeanResult<()>,
    {
        self.purpose.assert_union()?;
        if self.clause.order_by().has_manual_order() {
            return Err(CBeanError::IllegalConditionBeanOperation(
                "Manual Order with Union is unavailable".to_string(),
            ));
        }
        let mut partner = self.sub_bean(self.table, QueryPurpose::UnionQuery, self.location.clone());
        for path in &self.selected_relations {
            partner.ensure_relation_path(path)?;
        }
        f(&mut partner)?;

        let number = self.clause.union_count() + 1;
        let (map, name) = if all {
            ("unionAllQueryMap", "unionAllQuery")
        } else {
            ("unionQueryMap", "unionQuery")
        };
        let mut from_where = partner.clause.from_where();
        from_where.rebase_binds(
            &format!("{}.", self.location),
            &format!("{}.{map}.{name}{number}.", self.location),
        );
        self.clause
            .add_union(from_where, all, partner.clause.has_where_clause());
        self.invalid_queries.append(&mut partner.invalid_queries);
        self.sub_query_identities.append(&mut partner.sub_query_identities);
        Ok(())
    }

    /// Whether the statement has a where clause. With unions, the bean and
    /// every partner must each have one.
    pub fn has_where_clause(&self) -> bool {
        self.clause.has_where_clause() && self.clause.all_unions_have_where()
    }

    /// Whether any order-by is registered.
    pub fn has_order_by_clause(&self) -> bool {
        self.clause.has_order_by_clause()
    }

    /// Whether any union partner is registered.
    pub fn has_union_query(&self) -> bool {
        self.clause.has_union()
    }

    // ── Column query ───────────────────────────────────────────────────

    /// `left op right`, comparing two specified columns. An optional
    /// calculation applies to the right column, which must then be numeric.
    pub fn column_query<L, R>(
        &mut self,
        left: L,
        key: ConditionKey,
        right: R,
        calculation: Option<ColumnCalculation>,
    ) -> CBeanResult<()>
    where
        L: FnOnce(&mut Specification<'_>) -> CBeanResult<()>,
        R: FnOnce(&mut Specification<'_>) -> CBeanResult<()>,
    {
        self.purpose.assert_query()?;
        assert_comparison(key)?;
        let saved_purpose = self.purpose;
        let saved_specified = self.clause.take_specified();
        self.purpose = QueryPurpose::ColumnQuery;
        let sides = self.specify_column_query_sides(left, right);
        self.purpose = saved_purpose;
        self.clause.restore_specified(saved_specified);
        let (left, right) = sides?;

        let right_expression = match calculation.filter(|c| !c.is_empty()) {
            Some(calc) => {
                if !right.column.column_type.is_numeric() || !calc.has_only_numeric_operands() {
                    return Err(CBeanError::ColumnQueryCalculationUnsupported(format!(
                        "calculation needs a numeric column and operands: {}",
                        right.real_name()
                    )));
                }
                calc.apply(&right.real_name())
            }
            None => right.real_name(),
        };
        let frag = SqlFragment::text(format!(
            "{} {} {right_expression}",
            left.real_name(),
            key.operand()
        ));
        self.clause.register(WhereTarget::Where, WhereNode::Leaf(frag));
        Ok(())
    }

    fn specify_column_query_sides<L, R>(
        &mut self,
        left: L,
        right: R,
    ) -> CBeanResult<(SpecifiedColumn, SpecifiedColumn)>
    where
        L: FnOnce(&mut Specification<'_>) -> CBeanResult<()>,
        R: FnOnce(&mut Specification<'_>) -> CBeanResult<()>,
    {
        left(&mut Specification::new(self, 0))?;
        let left_column = self.single_specified("column query (left)")?;
        self.clause.take_specified();
        right(&mut Specification::new(self, 0))?;
        let right_column = self.single_specified("column query (right)")?;
        self.clause.take_specified();
        Ok((left_column, right_column))
    }

    // ── Rendering ──────────────────────────────────────────────────────

    /// The select statement, with order-by and fetch scope when effective.
    pub fn to_select_sql(&self) -> CBeanResult<BoundSql> {
        Ok(self.clause.select_statement()?.to_bound(self.bind_style))
    }

    /// The count statement.
    pub fn to_count_sql(&self) -> BoundSql {
        self.clause.count_statement().to_bound(self.bind_style)
    }

    /// `select fn(col) as SCALAR_VALUE from ...` over the column specified
    /// in `f`, which may also add conditions.
    pub fn to_scalar_sql<F>(&mut self, function: DerivedFunction, f: F) -> CBeanResult<BoundSql>
    where
        F: FnOnce(&mut Self) -> CBeanResult<()>,
    {
        let saved_purpose = self.purpose;
        let saved_specified = self.clause.take_specified();
        self.purpose = QueryPurpose::ScalarSelect;
        let result = f(self).and_then(|()| aggregate(self, function, "scalar select"));
        self.purpose = saved_purpose;
        self.clause.restore_specified(saved_specified);
        let (_, expression) = result?;
        let frag = SqlFragment::text(format!("select {expression} as {SCALAR_VALUE_ALIAS} "))
            .with_fragment(self.clause.from_where());
        Ok(frag.to_bound(self.bind_style))
    }

    /// Description of the order-by clause for result beans.
    pub fn order_by_description(&self) -> String {
        self.clause.order_by().render(false)
    }

    // ── Execution ──────────────────────────────────────────────────────

    fn select_span(&self, kind: SelectKind) -> tracing::span::EnteredSpan {
        query_span(self.table.table_db_name, self.purpose.name(), kind).entered()
    }

    /// Counts the rows the bean selects.
    pub fn select_count<X>(&self, executor: &X) -> CBeanResult<usize>
    where
        X: SelectExecutor + ?Sized,
    {
        let _span = self.select_span(SelectKind::Count);
        let sql = self.to_count_sql();
        debug!(sql = %sql, "select count");
        executor.select_count(&sql)
    }

    /// Selects every row, mapping each with `mapper`.
    ///
    /// With a safety size configured and no fetch scope, at most one row
    /// past the size is fetched, and exceeding it raises
    /// [`CBeanError::DangerousResultSize`].
    pub fn select_list<E, X, F>(&mut self, executor: &X, mut mapper: F) -> CBeanResult<ListResultBean<E>>
    where
        X: SelectExecutor + ?Sized,
        F: FnMut(&Row) -> CBeanResult<E>,
    {
        let _span = self.select_span(SelectKind::List);
        let safety = self.safety_max_result_size;
        let sql = if safety > 0 && !self.clause.fetch().is_effective() {
            let saved = *self.clause.fetch();
            self.clause.fetch_mut().fetch_first(safety + 1);
            let sql = self.to_select_sql();
            *self.clause.fetch_mut() = saved;
            sql?
        } else {
            self.to_select_sql()?
        };
        debug!(sql = %sql, "select list");
        let rows = executor.select_list(&sql)?;
        if safety > 0 && rows.len() > safety {
            return Err(CBeanError::DangerousResultSize {
                safety_max_result_size: safety,
                result_size: rows.len(),
            });
        }
        let list = rows.iter().map(&mut mapper).collect::<CBeanResult<Vec<E>>>()?;
        Ok(ResultBeanBuilder::new(self.table.table_db_name).build_list_result(list, self.order_by_description()))
    }

    /// Selects one page through the paging invoker. Call
    /// [`PagingBean::paging`] first.
    pub fn select_page<E, X, F>(&mut self, executor: &X, mapper: F) -> CBeanResult<PagingResultBean<E>>
    where
        X: SelectExecutor + ?Sized,
        F: FnMut(&Row) -> CBeanResult<E>,
    {
        let table = self.table.table_db_name;
        let _span = self.select_span(SelectKind::Page);
        let mut handler = ExecutorPagingHandler::new(self, executor, mapper);
        PagingInvoker::new(table).invoke_paging(&mut handler)
    }

    /// Selects an aggregate of one specified column.
    pub fn select_scalar<X, F>(&mut self, executor: &X, function: DerivedFunction, f: F) -> CBeanResult<Value>
    where
        X: SelectExecutor + ?Sized,
        F: FnOnce(&mut Self) -> CBeanResult<()>,
    {
        let _span = self.select_span(SelectKind::Scalar);
        let sql = self.to_scalar_sql(function, f)?;
        debug!(sql = %sql, "select scalar");
        let rows = executor.select_list(&sql)?;
        Ok(rows
            .first()
            .and_then(|row| row.get_value(SCALAR_VALUE_ALIAS))
            .cloned()
            .unwrap_or(Value::Null))
    }
}

impl PagingBean for ConditionBean {
    fn fetch_first(&mut self, fetch_size: usize) {
        self.clause.fetch_mut().fetch_first(fetch_size);
    }

    fn fetch_page(&mut self, page_number: usize) {
        self.clause.fetch_mut().fetch_page(page_number);
    }

    fn fetch_size(&self) -> usize {
        self.clause.fetch().fetch_size()
    }

    fn fetch_page_number(&self) -> usize {
        self.clause.fetch().fetch_page_number()
    }

    fn is_fetch_scope_effective(&self) -> bool {
        self.clause.fetch().is_effective()
    }

    fn set_paging(&mut self, paging: bool) {
        self.paging = paging;
        if paging {
            self.clause.fetch_mut().make_effective();
            self.clause.make_order_by_effective();
        } else {
            self.clause.fetch_mut().ignore();
            self.clause.ignore_order_by();
        }
    }

    fn is_paging(&self) -> bool {
        self.paging
    }

    fn is_count_later(&self) -> bool {
        self.count_later
    }

    fn can_paging_reselect(&self) -> bool {
        self.paging_reselect
    }

    fn safety_max_result_size(&self) -> usize {
        self.safety_max_result_size
    }

    fn check_safety_result(&mut self, safety_max_result_size: usize) {
        self.safety_max_result_size = safety_max_result_size;
    }

    fn order_by_description(&self) -> String {
        Self::order_by_description(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::CRAWLER_TABLES;

    fn bean(table: &str) -> ConditionBean {
        ConditionBean::with_settings(&CRAWLER_TABLES, table, &CBeanSettings::default()).unwrap()
    }

    #[test]
    fn test_unknown_table() {
        let err = ConditionBean::new(&CRAWLER_TABLES, "NO_TABLE").unwrap_err();
        assert_eq!(err.kind(), "table_not_found");
    }

    #[test]
    fn test_plain_select_and_count() {
        let cb = bean("URL_FILTER");
        assert_eq!(
            cb.to_select_sql().unwrap().sql,
            "select dfloc.ID as ID, dfloc.SESSION_ID as SESSION_ID, dfloc.URL as URL, \
             dfloc.FILTER_TYPE as FILTER_TYPE, dfloc.CREATE_TIME as CREATE_TIME from URL_FILTER dfloc"
        );
        assert_eq!(cb.to_count_sql().sql, "select count(*) from URL_FILTER dfloc");
        assert!(!cb.has_where_clause());
    }

    #[test]
    fn test_or_scope_with_and_part() {
        let mut cb = bean("URL_QUEUE");
        cb.or_scope_query(|cb| {
            cb.query().set_equal("DEPTH", 0)?;
            cb.or_scope_query_and_part(|cb| {
                cb.query().set_equal("DEPTH", 1)?;
                cb.query().set_equal("METHOD", "GET")?;
                Ok(())
            })
        })
        .unwrap();
        assert!(cb
            .to_select_sql()
            .unwrap()
            .sql
            .ends_with("where (dfloc.DEPTH = ? or (dfloc.DEPTH = ? and dfloc.METHOD = ?))"));
        assert_eq!(
            cb.to_select_sql().unwrap().values(),
            vec![&Value::Int(0), &Value::Int(1), &Value::from("GET")]
        );
    }

    #[test]
    fn test_failed_or_scope_leaves_no_condition_values() {
        let mut cb = bean("ACCESS_RESULT");
        let err = cb
            .or_scope_query(|cb| {
                cb.query().set_equal("STATUS", 1)?;
                cb.query().exists_referrer("accessResultDataList", |sub| {
                    sub.query().set_equal("ENCODING", "UTF-8")?;
                    Ok(())
                })?;
                Err(CBeanError::IllegalConditionBeanOperation("stop".to_string()))
            })
            .unwrap_err();
        assert_eq!(err.kind(), "illegal_condition_bean_operation");
        assert!(cb.sub_query_identities().is_empty());

        cb.query().set_equal("STATUS", 1).unwrap();
        cb.query().set_equal("STATUS", 2).unwrap();
        let sql = cb.to_select_sql().unwrap();
        assert!(sql.sql.ends_with("where dfloc.STATUS = ?"));
        assert_eq!(sql.values(), vec![&Value::Int(2)]);
        assert!(cb.invalid_query_list().is_empty());
    }

    #[test]
    fn test_failed_and_part_keeps_or_branches() {
        let mut cb = bean("URL_QUEUE");
        cb.or_scope_query(|cb| {
            cb.query().set_equal("DEPTH", 0)?;
            let failed = cb.or_scope_query_and_part(|cb| {
                cb.query().set_equal("METHOD", "GET")?;
                Err(CBeanError::IllegalConditionBeanOperation("stop".to_string()))
            });
            assert!(failed.is_err());
            cb.query().set_equal("DEPTH", 1)?;
            Ok(())
        })
        .unwrap();
        let sql = cb.to_select_sql().unwrap();
        assert!(sql.sql.ends_with("where (dfloc.DEPTH = ? or dfloc.DEPTH = ?)"));
        assert_eq!(sql.values(), vec![&Value::Int(0), &Value::Int(1)]);
    }

    #[test]
    fn test_or_scope_errors_restore_state() {
        let mut cb = bean("URL_QUEUE");
        let err = cb.or_scope_query(|cb| cb.or_scope_query(|_| Ok(()))).unwrap_err();
        assert_eq!(err.kind(), "or_scope_query_nested");
        assert!(cb.or_scope_query_and_part(|_| Ok(())).is_err());
        cb.query().set_equal("DEPTH", 3).unwrap();
        assert!(cb.to_select_sql().unwrap().sql.ends_with("where dfloc.DEPTH = ?"));
    }

    #[test]
    fn test_nested_and_part_rejected() {
        let mut cb = bean("URL_QUEUE");
        let err = cb
            .or_scope_query(|cb| cb.or_scope_query_and_part(|cb| cb.or_scope_query_and_part(|_| Ok(()))))
            .unwrap_err();
        assert_eq!(err.kind(), "or_scope_query_and_part_unsupported");
    }

    #[test]
    fn test_or_split_like_inside_and_part() {
        use crate::coption::LikeSearchOption;
        let mut cb = bean("ACCESS_RESULT");
        let err = cb
            .or_scope_query(|cb| {
                cb.or_scope_query_and_part(|cb| {
                    cb.query().set_like_search(
                        "URL",
                        "a b",
                        LikeSearchOption::new().like_contain().split_by_space().as_or_split(),
                    )?;
                    Ok(())
                })
            })
            .unwrap_err();
        assert_eq!(err.kind(), "or_scope_query_and_part_unsupported");

        let mut cb = bean("ACCESS_RESULT");
        cb.or_scope_query(|cb| {
            cb.or_scope_query_and_part(|cb| {
                cb.query().set_like_search(
                    "URL",
                    "a b",
                    LikeSearchOption::new().like_contain().split_by_space(),
                )?;
                Ok(())
            })
        })
        .unwrap();
    }

    #[test]
    fn test_setup_select_nested_path() {
        let mut cb = bean("ACCESS_RESULT_DATA");
        cb.setup_select("accessResult.accessResultDataAsOne").unwrap();
        assert_eq!(cb.clause().selected_joins(), &[0, 1]);
        let sql = cb.to_select_sql().unwrap().sql;
        assert!(sql.contains("dfrel_0.URL as URL_0"));
        assert!(sql.contains("dfrel_0_0.ENCODING as ENCODING_0_0"));
        assert!(sql.contains(
            "left outer join ACCESS_RESULT dfrel_0 on dfloc.ID = dfrel_0.ID \
             left outer join ACCESS_RESULT_DATA dfrel_0_0 on dfrel_0.ID = dfrel_0_0.ID"
        ));
    }

    #[test]
    fn test_setup_select_after_union_rejected() {
        let mut cb = bean("ACCESS_RESULT");
        cb.union(|_| Ok(())).unwrap();
        assert!(cb.setup_select("accessResultDataAsOne").is_err());
    }

    #[test]
    fn test_union_rebases_binds() {
        let mut cb = bean("ACCESS_RESULT");
        cb.setup_select("accessResultDataAsOne").unwrap();
        cb.query().set_equal("STATUS", 0).unwrap();
        cb.union_all(|u| {
            u.query().set_equal("STATUS", 1)?;
            Ok(())
        })
        .unwrap();
        let sql = cb.to_select_sql().unwrap();
        assert_eq!(
            sql.bind_paths(),
            vec![
                "conditionQuery.status.equal",
                "conditionQuery.unionAllQueryMap.unionAllQuery1.status.equal"
            ]
        );
        assert!(sql.sql.contains(
            " union all select dfloc.ID as ID,"
        ));
        assert!(sql.sql.ends_with(
            "from ACCESS_RESULT dfloc left outer join ACCESS_RESULT_DATA dfrel_0 \
             on dfloc.ID = dfrel_0.ID where dfloc.STATUS = ?"
        ));
        assert!(cb.has_where_clause());
        assert!(cb.to_count_sql().sql.starts_with("select count(*) from (select dfloc.ID as ID"));
        assert!(cb.to_count_sql().sql.ends_with(") dfmain"));
    }

    #[test]
    fn test_union_partner_rejects_specify() {
        let mut cb = bean("ACCESS_RESULT");
        let err = cb
            .union(|u| {
                u.specify()?;
                Ok(())
            })
            .unwrap_err();
        assert_eq!(err.kind(), "illegal_purpose");
    }

    #[test]
    fn test_manual_order_and_union_exclusive() {
        let mut cb = bean("ACCESS_RESULT");
        cb.query()
            .add_order_by_asc("METHOD")
            .unwrap()
            .with_manual_order(["WDL", "FML", "PRV"])
            .unwrap();
        assert!(cb.union(|_| Ok(())).is_err());

        let mut cb = bean("ACCESS_RESULT");
        cb.union(|_| Ok(())).unwrap();
        let err = cb
            .query()
            .add_order_by_asc("METHOD")
            .unwrap()
            .with_manual_order(["WDL"])
            .unwrap_err();
        assert_eq!(err.kind(), "illegal_condition_bean_operation");
    }

    #[test]
    fn test_column_query() {
        let mut cb = bean("URL_QUEUE");
        cb.column_query(
            |left| {
                left.column("DEPTH")?;
                Ok(())
            },
            ConditionKey::LessThan,
            |right| {
                right.column("ID")?;
                Ok(())
            },
            Some(ColumnCalculation::new().plus(1)),
        )
        .unwrap();
        assert!(cb
            .to_select_sql()
            .unwrap()
            .sql
            .ends_with("where dfloc.DEPTH < (dfloc.ID + 1)"));
        assert_eq!(cb.purpose(), QueryPurpose::NormalUse);
        assert!(cb.clause().specified().is_empty());
    }

    #[test]
    fn test_column_query_calculation_on_text() {
        let mut cb = bean("URL_QUEUE");
        let err = cb
            .column_query(
                |left| {
                    left.column("URL")?;
                    Ok(())
                },
                ConditionKey::Equal,
                |right| {
                    right.column("PARENT_URL")?;
                    Ok(())
                },
                Some(ColumnCalculation::new().plus(1)),
            )
            .unwrap_err();
        assert_eq!(err.kind(), "column_query_calculation_unsupported");
    }

    #[test]
    fn test_column_query_needs_one_column_per_side() {
        let mut cb = bean("URL_QUEUE");
        let err = cb
            .column_query(
                |left| {
                    left.column("URL")?.column("PARENT_URL")?;
                    Ok(())
                },
                ConditionKey::Equal,
                |_| Ok(()),
                None,
            )
            .unwrap_err();
        assert_eq!(err.kind(), "specify_column_invalid");
        assert_eq!(cb.purpose(), QueryPurpose::NormalUse);
    }

    #[test]
    fn test_scalar_sql() {
        let mut cb = bean("ACCESS_RESULT");
        let sql = cb
            .to_scalar_sql(DerivedFunction::Avg, |cb| {
                cb.specify()?.column("EXECUTION_TIME")?;
                cb.query().set_equal("SESSION_ID", "s1")?;
                Ok(())
            })
            .unwrap();
        assert_eq!(
            sql.sql,
            "select avg(dfloc.EXECUTION_TIME) as SCALAR_VALUE from ACCESS_RESULT dfloc \
             where dfloc.SESSION_ID = ?"
        );
    }

    #[test]
    fn test_paging_bean_impl() {
        let mut cb = bean("URL_QUEUE");
        assert!(!cb.is_fetch_scope_effective());
        let err = cb.paging(0, 1).unwrap_err();
        assert_eq!(err.kind(), "paging_page_size_not_plus");
        cb.paging(10, 3).unwrap();
        assert_eq!(cb.fetch_size(), 10);
        assert_eq!(cb.fetch_page_number(), 3);
        cb.query().add_order_by_asc("ID").unwrap();
        cb.set_paging(false);
        assert!(!cb.to_select_sql().unwrap().sql.contains("limit"));
        assert!(!cb.to_select_sql().unwrap().sql.contains("order by"));
        cb.set_paging(true);
        assert!(cb.to_select_sql().unwrap().sql.ends_with("order by dfloc.ID asc limit 10 offset 20"));
    }

    #[test]
    fn test_free_parameters() {
        let mut cb = bean("URL_QUEUE");
        cb.add_free_parameter("sessionId", "s1");
        assert_eq!(cb.free_parameters().get("sessionId"), Some(&Value::from("s1")));
    }
}
