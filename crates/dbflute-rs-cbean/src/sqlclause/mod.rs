//! The structured SQL clause a condition bean accumulates.
//!
//! A [`SqlClause`] holds every piece of the final statement as structured
//! data: the where list (a tree of [`WhereNode`]s per clause target), the
//! base-table inline view, the outer joins with their ON conditions, the
//! select list (base columns, setup-selected relations, derived columns),
//! order-by elements, union partners and the fetch scope. Rendering into SQL
//! text happens only when a statement is requested, and bind parameters
//! travel inside [`SqlFragment`]s so they keep their location paths.
//!
//! Or-scope grouping is handled here: while an or-scope is open, registered
//! conditions are buffered per [`WhereTarget`] and folded into one `or`
//! node per target when the scope closes.

pub mod fragment;
pub mod orderby;
pub mod orscope;

use std::collections::BTreeMap;
use std::mem;

use dbflute_rs_core::{CBeanError, CBeanResult};

use crate::meta::{ColumnInfo, TableMeta};
use crate::value::Value;

pub use fragment::{BindParam, BoundSql, SqlFragment, SqlPart};
pub use orderby::{NullsOrder, OrderByClause, OrderByElement};
pub use orscope::OrScopeState;

// ── Where tree ─────────────────────────────────────────────────────────

/// A node of a where tree.
#[derive(Debug, Clone, PartialEq)]
pub enum WhereNode {
    /// A single condition.
    Leaf(SqlFragment),
    /// All children must hold.
    And(Vec<WhereNode>),
    /// Any child must hold.
    Or(Vec<WhereNode>),
}

impl WhereNode {
    /// Builds a node from children, collapsing a single child.
    pub fn and(mut children: Vec<Self>) -> Self {
        if children.len() == 1 {
            children.remove(0)
        } else {
            Self::And(children)
        }
    }

    /// Builds an `or` node, collapsing a single child.
    pub fn or(mut children: Vec<Self>) -> Self {
        if children.len() == 1 {
            children.remove(0)
        } else {
            Self::Or(children)
        }
    }

    /// Renders the node. `or` nodes are parenthesized; `and` nodes are
    /// parenthesized when they appear inside an `or`.
    pub fn to_fragment(&self) -> SqlFragment {
        match self {
            Self::Leaf(frag) => frag.clone(),
            Self::And(children) => {
                SqlFragment::join(children.iter().map(Self::to_fragment), " and ")
            }
            Self::Or(children) => SqlFragment::join(
                children.iter().map(|child| match child {
                    Self::And(_) => child.to_fragment().wrap("(", ")"),
                    _ => child.to_fragment(),
                }),
                " or ",
            )
            .wrap("(", ")"),
        }
    }

    fn for_each_fragment(&mut self, f: &mut impl FnMut(&mut SqlFragment)) {
        match self {
            Self::Leaf(frag) => f(frag),
            Self::And(children) | Self::Or(children) => {
                for child in children {
                    child.for_each_fragment(f);
                }
            }
        }
    }
}

/// The clause a condition is registered into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WhereTarget {
    /// The main where clause.
    Where,
    /// The where clause of the base-table inline view.
    BaseInline,
    /// The ON clause of the join at this index.
    JoinOn(usize),
}

// ── Joins and selects ──────────────────────────────────────────────────

/// An outer (or inner) join of a foreign table.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinInfo {
    /// Foreign table.
    pub table: &'static TableMeta,
    /// Alias of the foreign table, e.g. `dfrel_0`.
    pub alias: String,
    /// Alias of the table the relation starts from.
    pub local_alias: String,
    /// Relation path, e.g. `_0` or `_0_1`.
    pub relation_path: String,
    /// Foreign property name.
    pub foreign_property: &'static str,
    /// `(local column, foreign column)` pairs.
    pub column_pairs: &'static [(&'static str, &'static str)],
    /// Inner join instead of left outer join.
    pub inner: bool,
    /// Extra ON conditions.
    pub on_conditions: Vec<WhereNode>,
}

/// A column explicitly specified for selection or column comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecifiedColumn {
    /// Alias of the table the column belongs to.
    pub table_alias: String,
    /// Relation path of that table (empty for the base table).
    pub relation_path: String,
    /// The column.
    pub column: &'static ColumnInfo,
}

impl SpecifiedColumn {
    /// `alias.COLUMN`
    pub fn real_name(&self) -> String {
        format!("{}.{}", self.table_alias, self.column.db_name)
    }
}

/// A union partner.
#[derive(Debug, Clone, PartialEq)]
struct UnionClause {
    from_where: SqlFragment,
    all: bool,
    has_where: bool,
}

// ── Fetch scope ────────────────────────────────────────────────────────

/// Row window of a select: fetch size, page number and start index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FetchScope {
    fetch_size: usize,
    fetch_page_number: usize,
    fetch_start_index: usize,
    effective: bool,
}

impl FetchScope {
    /// Limits the select to `fetch_size` rows and makes the scope effective.
    pub fn fetch_first(&mut self, fetch_size: usize) {
        self.fetch_size = fetch_size;
        if self.fetch_page_number == 0 {
            self.fetch_page_number = 1;
        }
        self.effective = true;
    }

    /// Skips `fetch_start_index` rows, then fetches `fetch_size`.
    pub fn fetch_scope(&mut self, fetch_start_index: usize, fetch_size: usize) {
        self.fetch_start_index = fetch_start_index;
        self.fetch_first(fetch_size);
    }

    /// Moves to a page; numbers below 1 are treated as 1.
    pub fn fetch_page(&mut self, fetch_page_number: usize) {
        self.fetch_page_number = fetch_page_number.max(1);
        self.effective = true;
    }

    /// Fetch size (0 when unset).
    pub const fn fetch_size(&self) -> usize {
        self.fetch_size
    }

    /// Current page number (1-based).
    pub const fn fetch_page_number(&self) -> usize {
        if self.fetch_page_number == 0 {
            1
        } else {
            self.fetch_page_number
        }
    }

    /// Start index given by `fetch_scope`.
    pub const fn fetch_start_index(&self) -> usize {
        self.fetch_start_index
    }

    /// Zero-based index of the first row of the current page.
    pub const fn page_start_index(&self) -> usize {
        self.fetch_start_index + self.fetch_size * (self.fetch_page_number() - 1)
    }

    /// Zero-based index one past the last row of the current page.
    pub const fn page_end_index(&self) -> usize {
        self.page_start_index() + self.fetch_size
    }

    /// Whether the scope is set and not suspended.
    pub const fn is_effective(&self) -> bool {
        self.effective && self.fetch_size > 0
    }

    /// Suspends the scope without forgetting it.
    pub fn ignore(&mut self) {
        self.effective = false;
    }

    /// Resumes a suspended scope.
    pub fn make_effective(&mut self) {
        if self.fetch_size > 0 {
            self.effective = true;
        }
    }

    /// `limit n offset m` suffix, empty when not effective.
    pub fn render(&self) -> String {
        if !self.is_effective() {
            return String::new();
        }
        match self.page_start_index() {
            0 => format!("limit {}", self.fetch_size),
            offset => format!("limit {} offset {offset}", self.fetch_size),
        }
    }
}

// ── Clause ─────────────────────────────────────────────────────────────

/// Structured statement state of one condition bean.
#[derive(Debug, Clone)]
pub struct SqlClause {
    table: &'static TableMeta,
    base_alias: String,
    inline_alias: String,
    where_list: Vec<WhereNode>,
    base_inline_list: Vec<WhereNode>,
    joins: Vec<JoinInfo>,
    or_state: OrScopeState,
    or_terms: BTreeMap<WhereTarget, Vec<WhereNode>>,
    and_part_terms: BTreeMap<WhereTarget, Vec<WhereNode>>,
    selected_joins: Vec<usize>,
    specified: Vec<SpecifiedColumn>,
    derived_columns: Vec<(SqlFragment, String)>,
    order_by: OrderByClause,
    order_by_effective: bool,
    unions: Vec<UnionClause>,
    fetch: FetchScope,
}

impl SqlClause {
    /// Creates an empty clause for `table` with the given base alias.
    pub fn new(table: &'static TableMeta, base_alias: impl Into<String>, inline_alias: impl Into<String>) -> Self {
        Self {
            table,
            base_alias: base_alias.into(),
            inline_alias: inline_alias.into(),
            where_list: Vec::new(),
            base_inline_list: Vec::new(),
            joins: Vec::new(),
            or_state: OrScopeState::Normal,
            or_terms: BTreeMap::new(),
            and_part_terms: BTreeMap::new(),
            selected_joins: Vec::new(),
            specified: Vec::new(),
            derived_columns: Vec::new(),
            order_by: OrderByClause::default(),
            order_by_effective: true,
            unions: Vec::new(),
            fetch: FetchScope::default(),
        }
    }

    /// Base table.
    pub const fn table(&self) -> &'static TableMeta {
        self.table
    }

    /// Alias of the base table (`dfloc` at top level).
    pub fn base_alias(&self) -> &str {
        &self.base_alias
    }

    /// Alias used inside the base-table inline view.
    pub fn inline_alias(&self) -> &str {
        &self.inline_alias
    }

    // -- where ------------------------------------------------------------

    /// Registers a condition, honoring the or-scope state.
    pub fn register(&mut self, target: WhereTarget, node: WhereNode) {
        match self.or_state {
            OrScopeState::Normal => self.target_list_mut(target).push(node),
            OrScopeState::OrScopeOpen => self.or_terms.entry(target).or_default().push(node),
            OrScopeState::OrScopeAndPartOpen => {
                self.and_part_terms.entry(target).or_default().push(node);
            }
        }
    }

    fn target_list_mut(&mut self, target: WhereTarget) -> &mut Vec<WhereNode> {
        match target {
            WhereTarget::JoinOn(i) if i < self.joins.len() => &mut self.joins[i].on_conditions,
            WhereTarget::Where | WhereTarget::JoinOn(_) => &mut self.where_list,
            WhereTarget::BaseInline => &mut self.base_inline_list,
        }
    }

    /// Whether the main where clause has at least one condition.
    pub fn has_where_clause(&self) -> bool {
        !self.where_list.is_empty()
    }

    /// Whether the base-table inline view has a condition.
    pub fn has_base_inline_where(&self) -> bool {
        !self.base_inline_list.is_empty()
    }

    /// Current or-scope state.
    pub const fn or_scope_state(&self) -> OrScopeState {
        self.or_state
    }

    /// Opens an or-scope.
    pub fn begin_or_scope(&mut self) -> CBeanResult<()> {
        self.or_state = self.or_state.begin_or_scope()?;
        Ok(())
    }

    /// Opens an and-part in the current or-scope.
    pub fn begin_and_part(&mut self) -> CBeanResult<()> {
        self.or_state = self.or_state.begin_and_part()?;
        Ok(())
    }

    /// Closes the and-part, adding its conditions as one `or` branch per target.
    pub fn end_and_part(&mut self) -> CBeanResult<()> {
        self.or_state = self.or_state.end_and_part()?;
        for (target, terms) in mem::take(&mut self.and_part_terms) {
            self.or_terms
                .entry(target)
                .or_default()
                .push(WhereNode::and(terms));
        }
        Ok(())
    }

    /// Closes the or-scope, registering one `or` node per target.
    pub fn end_or_scope(&mut self) -> CBeanResult<()> {
        self.or_state = self.or_state.end_or_scope()?;
        for (target, terms) in mem::take(&mut self.or_terms) {
            self.target_list_mut(target).push(WhereNode::or(terms));
        }
        Ok(())
    }

    /// Drops an unfinished and-part.
    pub(crate) fn abort_and_part(&mut self) {
        self.and_part_terms.clear();
        if self.or_state.is_and_part() {
            self.or_state = OrScopeState::OrScopeOpen;
        }
    }

    /// Drops an unfinished or-scope.
    pub(crate) fn abort_or_scope(&mut self) {
        self.and_part_terms.clear();
        self.or_terms.clear();
        self.or_state = OrScopeState::Normal;
    }

    /// Replaces the value of every bind at `path`, in every clause.
    pub fn override_bind(&mut self, path: &str, value: &Value) -> bool {
        let mut replaced = false;
        self.for_each_fragment(&mut |frag| replaced |= frag.override_bind(path, value));
        replaced
    }

    fn for_each_fragment(&mut self, f: &mut impl FnMut(&mut SqlFragment)) {
        let lists = self
            .where_list
            .iter_mut()
            .chain(self.base_inline_list.iter_mut())
            .chain(self.joins.iter_mut().flat_map(|j| j.on_conditions.iter_mut()))
            .chain(self.or_terms.values_mut().flatten())
            .chain(self.and_part_terms.values_mut().flatten());
        for node in lists {
            node.for_each_fragment(f);
        }
        for (frag, _) in &mut self.derived_columns {
            f(frag);
        }
    }

    // -- joins ------------------------------------------------------------

    /// Adds a join and returns its index.
    pub fn add_join(&mut self, join: JoinInfo) -> usize {
        self.joins.push(join);
        self.joins.len() - 1
    }

    /// Returns the joins.
    pub fn joins(&self) -> &[JoinInfo] {
        &self.joins
    }

    /// Switches a join to inner join.
    pub fn make_inner_join(&mut self, join_index: usize) {
        if let Some(join) = self.joins.get_mut(join_index) {
            join.inner = true;
        }
    }

    // -- select -----------------------------------------------------------

    /// Adds a joined table's columns to the select list.
    pub fn select_join(&mut self, join_index: usize) {
        if !self.selected_joins.contains(&join_index) {
            self.selected_joins.push(join_index);
        }
    }

    /// Indexes of setup-selected joins.
    pub fn selected_joins(&self) -> &[usize] {
        &self.selected_joins
    }

    /// Records a specified column.
    pub fn add_specified(&mut self, column: SpecifiedColumn) {
        if !self.specified.contains(&column) {
            self.specified.push(column);
        }
    }

    /// Returns the specified columns.
    pub fn specified(&self) -> &[SpecifiedColumn] {
        &self.specified
    }

    /// Takes the specified columns out, leaving none.
    pub fn take_specified(&mut self) -> Vec<SpecifiedColumn> {
        mem::take(&mut self.specified)
    }

    /// Restores previously taken specified columns.
    pub fn restore_specified(&mut self, specified: Vec<SpecifiedColumn>) {
        self.specified = specified;
    }

    /// Adds a derived column `(fragment) as alias`.
    pub fn add_derived_column(&mut self, fragment: SqlFragment, alias: impl Into<String>) {
        self.derived_columns.push((fragment, alias.into()));
    }

    /// Aliases of derived columns.
    pub fn derived_aliases(&self) -> impl Iterator<Item = &str> {
        self.derived_columns.iter().map(|(_, alias)| alias.as_str())
    }

    fn specified_for(&self, alias: &str) -> Vec<&'static ColumnInfo> {
        self.specified
            .iter()
            .filter(|s| s.table_alias == alias)
            .map(|s| s.column)
            .collect()
    }

    /// Selected columns as `(table alias, column, select alias)`, in
    /// select-list order. A table with specified columns selects only those.
    fn selected_columns(&self) -> Vec<(&str, &'static ColumnInfo, String)> {
        let columns_of = |alias: &str, table: &'static TableMeta| -> Vec<&'static ColumnInfo> {
            let specified = self.specified_for(alias);
            if specified.is_empty() {
                table.columns.iter().collect()
            } else {
                specified
            }
        };
        let mut selected: Vec<(&str, &'static ColumnInfo, String)> = columns_of(&self.base_alias, self.table)
            .into_iter()
            .map(|c| (self.base_alias.as_str(), c, c.db_name.to_string()))
            .collect();
        for join in self.selected_joins.iter().filter_map(|&i| self.joins.get(i)) {
            selected.extend(
                columns_of(&join.alias, join.table)
                    .into_iter()
                    .map(|c| (join.alias.as_str(), c, format!("{}{}", c.db_name, join.relation_path))),
            );
        }
        selected
    }

    /// `select ...` with aliases `COL` for the base table and `COL_n` for
    /// relations.
    pub fn select_clause(&self) -> SqlFragment {
        let mut items: Vec<SqlFragment> = self
            .selected_columns()
            .into_iter()
            .map(|(table_alias, column, alias)| {
                SqlFragment::text(format!("{table_alias}.{} as {alias}", column.db_name))
            })
            .collect();
        for (frag, alias) in &self.derived_columns {
            items.push(frag.clone().with_text(&format!(" as {alias}")));
        }
        SqlFragment::text("select ").with_fragment(SqlFragment::join(items, ", "))
    }

    /// Select aliases in select-list order, for union order-by.
    fn select_aliases(&self) -> Vec<String> {
        let mut aliases: Vec<String> = self
            .selected_columns()
            .into_iter()
            .map(|(_, _, alias)| alias)
            .collect();
        aliases.extend(self.derived_aliases().map(str::to_string));
        aliases
    }

    // -- from / where -----------------------------------------------------

    /// `from TABLE alias` (or the inline view) followed by the joins.
    pub fn from_clause(&self) -> SqlFragment {
        let mut frag = if self.base_inline_list.is_empty() {
            SqlFragment::text(format!("from {} {}", self.table.table_db_name, self.base_alias))
        } else {
            SqlFragment::text(format!(
                "from (select * from {} {} where ",
                self.table.table_db_name, self.inline_alias
            ))
            .with_fragment(Self::join_and(&self.base_inline_list))
            .with_text(&format!(") {}", self.base_alias))
        };
        for join in &self.joins {
            let keyword = if join.inner { "inner join" } else { "left outer join" };
            let pairs: Vec<String> = join
                .column_pairs
                .iter()
                .map(|(local, foreign)| {
                    format!("{}.{local} = {}.{foreign}", join.local_alias, join.alias)
                })
                .collect();
            frag.push_text(&format!(
                " {keyword} {} {} on {}",
                join.table.table_db_name,
                join.alias,
                pairs.join(" and ")
            ));
            if !join.on_conditions.is_empty() {
                frag.push_text(" and ");
                frag.append(Self::join_and(&join.on_conditions));
            }
        }
        frag
    }

    fn join_and(nodes: &[WhereNode]) -> SqlFragment {
        SqlFragment::join(nodes.iter().map(WhereNode::to_fragment), " and ")
    }

    /// The where conditions joined with `and`, without the keyword.
    pub fn where_conditions(&self) -> SqlFragment {
        Self::join_and(&self.where_list)
    }

    /// ` where ...`, prefixed by `first` when given; empty when nothing applies.
    pub fn where_clause(&self, first: Option<SqlFragment>) -> SqlFragment {
        let mut parts: Vec<SqlFragment> = first.into_iter().collect();
        parts.extend(self.where_list.iter().map(WhereNode::to_fragment));
        if parts.is_empty() {
            SqlFragment::new()
        } else {
            SqlFragment::text(" where ").with_fragment(SqlFragment::join(parts, " and "))
        }
    }

    /// `from ... where ...`
    pub fn from_where(&self) -> SqlFragment {
        self.from_clause().with_fragment(self.where_clause(None))
    }

    // -- order by ---------------------------------------------------------

    /// The order-by clause.
    pub fn order_by(&self) -> &OrderByClause {
        &self.order_by
    }

    /// Mutable order-by clause.
    pub fn order_by_mut(&mut self) -> &mut OrderByClause {
        &mut self.order_by
    }

    /// Whether any order-by element is registered.
    pub fn has_order_by_clause(&self) -> bool {
        !self.order_by.is_empty()
    }

    /// Suspends order-by rendering.
    pub fn ignore_order_by(&mut self) {
        self.order_by_effective = false;
    }

    /// Resumes order-by rendering.
    pub fn make_order_by_effective(&mut self) {
        self.order_by_effective = true;
    }

    /// Renders the order-by clause. With unions every element must resolve
    /// to a select alias.
    pub fn order_by_clause(&self) -> CBeanResult<String> {
        if !self.order_by_effective || self.order_by.is_empty() {
            return Ok(String::new());
        }
        if self.unions.is_empty() {
            return Ok(self.order_by.render(false));
        }
        let aliases = self.select_aliases();
        for element in self.order_by.elements() {
            if !aliases.contains(&element.select_alias) {
                return Err(CBeanError::IllegalConditionBeanOperation(format!(
                    "the order-by column {} is not in the select clause of the union query",
                    element.column_full_name
                )));
            }
        }
        Ok(self.order_by.render(true))
    }

    // -- union ------------------------------------------------------------

    /// Adds a union partner's `from ... where ...`.
    pub fn add_union(&mut self, from_where: SqlFragment, all: bool, has_where: bool) {
        self.unions.push(UnionClause {
            from_where,
            all,
            has_where,
        });
    }

    /// Whether any union partner exists.
    pub fn has_union(&self) -> bool {
        !self.unions.is_empty()
    }

    /// Number of union partners.
    pub fn union_count(&self) -> usize {
        self.unions.len()
    }

    /// Whether every union partner has a where clause.
    pub fn all_unions_have_where(&self) -> bool {
        self.unions.iter().all(|u| u.has_where)
    }

    fn union_clause(&self, select: &SqlFragment) -> SqlFragment {
        let mut frag = SqlFragment::new();
        for union in &self.unions {
            frag.push_text(if union.all { " union all " } else { " union " });
            frag.append(select.clone());
            frag.push_text(" ");
            frag.append(union.from_where.clone());
        }
        frag
    }

    // -- fetch ------------------------------------------------------------

    /// The fetch scope.
    pub const fn fetch(&self) -> &FetchScope {
        &self.fetch
    }

    /// Mutable fetch scope.
    pub fn fetch_mut(&mut self) -> &mut FetchScope {
        &mut self.fetch
    }

    // -- statements -------------------------------------------------------

    /// The full select statement.
    pub fn select_statement(&self) -> CBeanResult<SqlFragment> {
        let select = self.select_clause();
        let mut frag = select
            .clone()
            .with_text(" ")
            .with_fragment(self.from_where())
            .with_fragment(self.union_clause(&select));
        let order_by = self.order_by_clause()?;
        if !order_by.is_empty() {
            frag.push_text(" ");
            frag.push_text(&order_by);
        }
        let fetch = self.fetch.render();
        if !fetch.is_empty() {
            frag.push_text(" ");
            frag.push_text(&fetch);
        }
        Ok(frag)
    }

    /// The count statement; order-by and fetch scope never apply.
    pub fn count_statement(&self) -> SqlFragment {
        if self.unions.is_empty() {
            return SqlFragment::text("select count(*) ").with_fragment(self.from_where());
        }
        let select = self.select_clause();
        SqlFragment::text("select count(*) from (")
            .with_fragment(select.clone())
            .with_text(" ")
            .with_fragment(self.from_where())
            .with_fragment(self.union_clause(&select))
            .with_text(") dfmain")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::{ACCESS_RESULT, ACCESS_RESULT_DATA};
    use dbflute_rs_core::BindStyle;

    fn leaf(text: &str) -> WhereNode {
        WhereNode::Leaf(SqlFragment::text(text))
    }

    fn clause() -> SqlClause {
        SqlClause::new(&ACCESS_RESULT, "dfloc", "dfinlineloc")
    }

    #[test]
    fn test_where_node_rendering() {
        let node = WhereNode::Or(vec![
            leaf("a = 1"),
            WhereNode::And(vec![leaf("b = 2"), leaf("c = 3")]),
        ]);
        assert_eq!(node.to_fragment().to_string(), "(a = 1 or (b = 2 and c = 3))");
        assert_eq!(WhereNode::or(vec![leaf("x")]), leaf("x"));
    }

    #[test]
    fn test_or_scope_groups_per_target() {
        let mut c = clause();
        c.register(WhereTarget::Where, leaf("w0"));
        c.begin_or_scope().unwrap();
        c.register(WhereTarget::Where, leaf("w1"));
        c.register(WhereTarget::Where, leaf("w2"));
        c.register(WhereTarget::BaseInline, leaf("i1"));
        c.begin_and_part().unwrap();
        c.register(WhereTarget::Where, leaf("a1"));
        c.register(WhereTarget::Where, leaf("a2"));
        c.end_and_part().unwrap();
        c.end_or_scope().unwrap();
        assert_eq!(
            c.where_clause(None).to_string(),
            " where w0 and (w1 or w2 or (a1 and a2))"
        );
        assert!(c.has_base_inline_where());
        assert_eq!(
            c.from_clause().to_string(),
            "from (select * from ACCESS_RESULT dfinlineloc where i1) dfloc"
        );
    }

    #[test]
    fn test_abort_or_scope_discards_terms() {
        let mut c = clause();
        c.begin_or_scope().unwrap();
        c.register(WhereTarget::Where, leaf("w1"));
        c.abort_or_scope();
        assert_eq!(c.or_scope_state(), OrScopeState::Normal);
        assert!(!c.has_where_clause());
    }

    #[test]
    fn test_join_rendering() {
        let mut c = clause();
        let i = c.add_join(JoinInfo {
            table: &ACCESS_RESULT_DATA,
            alias: "dfrel_0".to_string(),
            local_alias: "dfloc".to_string(),
            relation_path: "_0".to_string(),
            foreign_property: "accessResultDataAsOne",
            column_pairs: &[("ID", "ID")],
            inner: false,
            on_conditions: Vec::new(),
        });
        c.register(WhereTarget::JoinOn(i), leaf("dfrel_0.ENCODING = 'UTF-8'"));
        c.make_inner_join(i);
        assert_eq!(
            c.from_clause().to_string(),
            "from ACCESS_RESULT dfloc inner join ACCESS_RESULT_DATA dfrel_0 \
             on dfloc.ID = dfrel_0.ID and dfrel_0.ENCODING = 'UTF-8'"
        );
        c.select_join(i);
        let select = c.select_clause().to_string();
        assert!(select.starts_with("select dfloc.ID as ID, dfloc.SESSION_ID as SESSION_ID"));
        assert!(select.ends_with("dfrel_0.ENCODING as ENCODING_0"));
    }

    #[test]
    fn test_fetch_scope() {
        let mut fetch = FetchScope::default();
        assert!(!fetch.is_effective());
        fetch.fetch_first(20);
        fetch.fetch_page(3);
        assert_eq!(fetch.page_start_index(), 40);
        assert_eq!(fetch.page_end_index(), 60);
        assert_eq!(fetch.render(), "limit 20 offset 40");
        fetch.fetch_page(0);
        assert_eq!(fetch.fetch_page_number(), 1);
        assert_eq!(fetch.render(), "limit 20");
        fetch.ignore();
        assert_eq!(fetch.render(), "");
        fetch.make_effective();
        assert!(fetch.is_effective());
    }

    #[test]
    fn test_count_statement_ignores_order_and_fetch() {
        let mut c = clause();
        c.order_by_mut().add(OrderByElement::new("dfloc.ID", "ID", true));
        c.fetch_mut().fetch_first(10);
        let bound = c.count_statement().to_bound(BindStyle::Question);
        assert_eq!(bound.sql, "select count(*) from ACCESS_RESULT dfloc");
        let select = c.select_statement().unwrap().to_bound(BindStyle::Question);
        assert!(select.sql.ends_with("from ACCESS_RESULT dfloc order by dfloc.ID asc limit 10"));
    }

    #[test]
    fn test_union_order_by_uses_alias() {
        let mut c = clause();
        c.order_by_mut().add(OrderByElement::new("dfloc.URL", "URL", false));
        c.add_union(SqlFragment::text("from ACCESS_RESULT dfloc"), true, false);
        let sql = c.select_statement().unwrap().to_string();
        assert!(sql.contains(" union all select dfloc.ID as ID"));
        assert!(sql.ends_with("order by URL desc"));
        assert!(!c.all_unions_have_where());

        c.order_by_mut().add(OrderByElement::new("dfrel_0.ENCODING", "ENCODING_0", true));
        assert!(c.select_statement().is_err());
    }

    #[test]
    fn test_union_order_by_follows_relation_specified_columns() {
        let mut c = clause();
        let i = c.add_join(JoinInfo {
            table: &ACCESS_RESULT_DATA,
            alias: "dfrel_0".to_string(),
            local_alias: "dfloc".to_string(),
            relation_path: "_0".to_string(),
            foreign_property: "accessResultDataAsOne",
            column_pairs: &[("ID", "ID")],
            inner: false,
            on_conditions: Vec::new(),
        });
        c.select_join(i);
        c.add_specified(SpecifiedColumn {
            table_alias: "dfrel_0".to_string(),
            relation_path: "_0".to_string(),
            column: ACCESS_RESULT_DATA.column("ENCODING").unwrap(),
        });
        c.add_union(SqlFragment::text("from ACCESS_RESULT dfloc"), false, false);
        assert_eq!(
            c.select_aliases().into_iter().filter(|a| a.ends_with("_0")).collect::<Vec<_>>(),
            ["ENCODING_0"]
        );

        c.order_by_mut().add(OrderByElement::new("dfrel_0.ENCODING", "ENCODING_0", true));
        let sql = c.select_statement().unwrap().to_string();
        assert!(sql.contains("dfrel_0.ENCODING as ENCODING_0 from"));
        assert!(sql.ends_with("order by ENCODING_0 asc"));

        c.order_by_mut().add(OrderByElement::new("dfrel_0.DATA", "DATA_0", true));
        assert!(c.select_statement().is_err());
    }

    #[test]
    fn test_override_bind_reaches_joins() {
        let mut c = clause();
        c.register(
            WhereTarget::Where,
            WhereNode::Leaf(SqlFragment::text("dfloc.URL = ").with_bind("q.url.equal", Value::from("a"))),
        );
        assert!(c.override_bind("q.url.equal", &Value::from("b")));
        let bound = c.where_clause(None).to_bound(BindStyle::Question);
        assert_eq!(bound.values(), vec![&Value::from("b")]);
    }
}
