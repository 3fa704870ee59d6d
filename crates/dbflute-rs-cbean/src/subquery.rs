//! Correlated sub-queries.
//!
//! Each registration opens a fresh [`ConditionBean`] for the sub-query
//! table, one nest level below the outer bean, with its own purpose and a
//! bind location rooted under the outer node. The caller fills it through a
//! closure; the result is rendered and attached to the outer query as one
//! of:
//!
//! - `exists (select ...)` / `not exists (select ...)`
//! - `outer.COL in (select ...)` / `not in`
//! - `(select fn(...) ...) op ?` (derived referrer as a condition)
//! - `outer.COL op (select fn(...) ...)` (scalar condition)
//! - `(select fn(...) ...) as ALIAS` in the select list (derived referrer
//!   as a specified column)
//!
//! Invalid queries and sub-query identities recorded by the inner bean are
//! carried up to the outer bean.

use std::fmt;

use dbflute_rs_core::{CBeanError, CBeanResult};

use crate::cbean::ConditionBean;
use crate::ckey::ConditionKey;
use crate::coption::DerivedReferrerOption;
use crate::cquery::{init_cap, ConditionQuery};
use crate::invalid::InvalidQueryInfo;
use crate::meta::TableMeta;
use crate::purpose::QueryPurpose;
use crate::specify::Specification;
use crate::sqlclause::{SpecifiedColumn, SqlFragment, WhereNode};
use crate::value::Value;

/// Aggregate applied to the specified column of a sub-query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivedFunction {
    /// `count(col)`
    Count,
    /// `count(distinct col)`
    CountDistinct,
    /// `max(col)`
    Max,
    /// `min(col)`
    Min,
    /// `sum(col)`, numeric columns only
    Sum,
    /// `avg(col)`, numeric columns only
    Avg,
}

impl DerivedFunction {
    /// Renders the aggregate around a column.
    pub fn expression(self, column: &str) -> String {
        match self {
            Self::Count => format!("count({column})"),
            Self::CountDistinct => format!("count(distinct {column})"),
            Self::Max => format!("max({column})"),
            Self::Min => format!("min({column})"),
            Self::Sum => format!("sum({column})"),
            Self::Avg => format!("avg({column})"),
        }
    }

    const fn requires_numeric(self) -> bool {
        matches!(self, Self::Sum | Self::Avg)
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::CountDistinct => "countDistinct",
            Self::Max => "max",
            Self::Min => "min",
            Self::Sum => "sum",
            Self::Avg => "avg",
        }
    }
}

impl fmt::Display for DerivedFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The relation a sub-query correlates through.
struct Correlation {
    table: &'static TableMeta,
    property: &'static str,
    /// `(outer column, sub-query column)`
    pairs: &'static [(&'static str, &'static str)],
}

impl Correlation {
    fn referrer(cb: &ConditionBean, outer: &'static TableMeta, property: &str) -> CBeanResult<Self> {
        let referrer = outer.referrer(property)?;
        Ok(Self {
            table: cb.registry.table(referrer.referrer_table)?,
            property: referrer.property_name,
            pairs: referrer.column_pairs,
        })
    }

    fn referrer_or_foreign(cb: &ConditionBean, outer: &'static TableMeta, property: &str) -> CBeanResult<Self> {
        if outer.find_referrer(property).is_some() {
            return Self::referrer(cb, outer, property);
        }
        let (_, foreign) = outer.foreign(property)?;
        Ok(Self {
            table: cb.registry.table(foreign.foreign_table)?,
            property: foreign.property_name,
            pairs: foreign.column_pairs,
        })
    }

    fn single_pair(&self) -> CBeanResult<(&'static str, &'static str)> {
        match self.pairs {
            [pair] => Ok(*pair),
            _ => Err(CBeanError::IllegalConditionBeanOperation(format!(
                "in-scope relation does not support compound keys: {}",
                self.property
            ))),
        }
    }

    fn local_property(&self, outer: &'static TableMeta) -> &'static str {
        self.pairs
            .first()
            .and_then(|(local, _)| outer.find_column(local))
            .map_or(self.property, |c| c.property_name)
    }

    fn condition(&self, outer_alias: &str, sub_alias: &str) -> SqlFragment {
        let parts: Vec<String> = self
            .pairs
            .iter()
            .map(|(outer, sub)| format!("{sub_alias}.{sub} = {outer_alias}.{outer}"))
            .collect();
        SqlFragment::text(parts.join(" and "))
    }
}

/// Checks that an operator compares against a single value.
pub(crate) fn assert_comparison(key: ConditionKey) -> CBeanResult<()> {
    if !key.is_comparison() {
        return Err(CBeanError::IllegalConditionBeanOperation(format!(
            "sub-query comparison requires a single-value operator: {key}"
        )));
    }
    Ok(())
}

pub(crate) fn aggregate(sub: &ConditionBean, function: DerivedFunction, usage: &str) -> CBeanResult<(SpecifiedColumn, String)> {
    let specified = sub.single_specified(usage)?;
    if function.requires_numeric() && !specified.column.column_type.is_numeric() {
        return Err(CBeanError::SpecifyColumnTypeUnmatched(format!(
            "{function} needs a numeric column: {} is {:?}",
            specified.real_name(),
            specified.column.column_type
        )));
    }
    let expression = function.expression(&specified.real_name());
    Ok((specified, expression))
}

// ── Sub-bean lifecycle ─────────────────────────────────────────────────

impl ConditionBean {
    /// Creates the inner bean of a sub-query opened from `node`.
    fn open_sub_query(
        &mut self,
        node: usize,
        table: &'static TableMeta,
        purpose: QueryPurpose,
        name: &str,
    ) -> Self {
        let outer = &mut self.nodes[node];
        outer.sub_query_count += 1;
        let location = format!("{}.{name}{}", outer.location, outer.sub_query_count);
        self.sub_bean(table, purpose, location)
    }

    /// Runs the caller's closure on the inner bean and carries its
    /// bookkeeping up to this bean.
    fn fill_sub_query<F>(&mut self, mut sub: Self, identity: String, f: F) -> CBeanResult<Self>
    where
        F: FnOnce(&mut Self) -> CBeanResult<()>,
    {
        f(&mut sub)?;
        self.sub_query_identities.push(identity);
        self.sub_query_identities.append(&mut sub.sub_query_identities);
        self.invalid_queries.append(&mut sub.invalid_queries);
        Ok(sub)
    }

    /// `from T sub ... where <correlation> and ...`
    fn sub_query_from_where(sub: &Self, correlation: Option<SqlFragment>) -> SqlFragment {
        sub.clause
            .from_clause()
            .with_fragment(sub.clause.where_clause(correlation))
    }
}

// ── Query side ─────────────────────────────────────────────────────────

impl ConditionQuery<'_> {
    /// `exists (select ... from REFERRER where <correlation> and ...)`
    pub fn exists_referrer<F>(&mut self, referrer: &str, f: F) -> CBeanResult<&mut Self>
    where
        F: FnOnce(&mut ConditionBean) -> CBeanResult<()>,
    {
        self.register_exists(referrer, false, f)?;
        Ok(self)
    }

    /// `not exists (select ... from REFERRER where <correlation> and ...)`
    pub fn not_exists_referrer<F>(&mut self, referrer: &str, f: F) -> CBeanResult<&mut Self>
    where
        F: FnOnce(&mut ConditionBean) -> CBeanResult<()>,
    {
        self.register_exists(referrer, true, f)?;
        Ok(self)
    }

    fn register_exists<F>(&mut self, referrer: &str, not: bool, f: F) -> CBeanResult<()>
    where
        F: FnOnce(&mut ConditionBean) -> CBeanResult<()>,
    {
        let node = self.node_id();
        let cb = self.bean_mut();
        cb.purpose.assert_query()?;
        let (outer_table, outer_alias, target) = {
            let n = &cb.nodes[node];
            (n.table, n.alias.clone(), n.target)
        };
        let correlation = Correlation::referrer(cb, outer_table, referrer)?;
        let kind = if not { "NotExistsReferrer" } else { "ExistsReferrer" };
        let name = format!(
            "{}_{kind}_{}",
            correlation.local_property(outer_table),
            init_cap(correlation.property)
        );
        let sub = cb.open_sub_query(node, correlation.table, QueryPurpose::ExistsReferrer, &name);
        let identity = format!("{}[{}]", correlation.property, sub.sub_query_level);
        let sub = cb.fill_sub_query(sub, identity, f)?;

        let sub_alias = sub.clause.base_alias().to_string();
        let select_column = correlation
            .pairs
            .first()
            .map_or_else(|| "*".to_string(), |(_, r)| format!("{sub_alias}.{r}"));
        let frag = SqlFragment::text(format!(
            "{}exists (select {select_column} ",
            if not { "not " } else { "" }
        ))
        .with_fragment(ConditionBean::sub_query_from_where(
            &sub,
            Some(correlation.condition(&outer_alias, &sub_alias)),
        ))
        .with_text(")");
        cb.clause.register(target, WhereNode::Leaf(frag));
        Ok(())
    }

    /// `outer.COL in (select sub.COL from RELATION where ...)`, through a
    /// referrer or a foreign relation with a single-column key.
    pub fn in_scope_relation<F>(&mut self, property: &str, f: F) -> CBeanResult<&mut Self>
    where
        F: FnOnce(&mut ConditionBean) -> CBeanResult<()>,
    {
        self.register_in_scope_relation(property, false, f)?;
        Ok(self)
    }

    /// `outer.COL not in (select sub.COL from RELATION where ...)`
    pub fn not_in_scope_relation<F>(&mut self, property: &str, f: F) -> CBeanResult<&mut Self>
    where
        F: FnOnce(&mut ConditionBean) -> CBeanResult<()>,
    {
        self.register_in_scope_relation(property, true, f)?;
        Ok(self)
    }

    fn register_in_scope_relation<F>(&mut self, property: &str, not: bool, f: F) -> CBeanResult<()>
    where
        F: FnOnce(&mut ConditionBean) -> CBeanResult<()>,
    {
        let node = self.node_id();
        let cb = self.bean_mut();
        cb.purpose.assert_query()?;
        let (outer_table, outer_alias, target) = {
            let n = &cb.nodes[node];
            (n.table, n.alias.clone(), n.target)
        };
        let correlation = Correlation::referrer_or_foreign(cb, outer_table, property)?;
        let (local, remote) = correlation.single_pair()?;
        let kind = if not { "NotInScopeRelation" } else { "InScopeRelation" };
        let name = format!(
            "{}_{kind}_{}",
            correlation.local_property(outer_table),
            init_cap(correlation.property)
        );
        let sub = cb.open_sub_query(node, correlation.table, QueryPurpose::InScopeRelation, &name);
        let identity = format!("{}[{}]", correlation.property, sub.sub_query_level);
        let sub = cb.fill_sub_query(sub, identity, f)?;

        let sub_alias = sub.clause.base_alias().to_string();
        let frag = SqlFragment::text(format!(
            "{outer_alias}.{local} {}in (select {sub_alias}.{remote} ",
            if not { "not " } else { "" }
        ))
        .with_fragment(ConditionBean::sub_query_from_where(&sub, None))
        .with_text(")");
        cb.clause.register(target, WhereNode::Leaf(frag));
        Ok(())
    }

    /// `(select fn(sub.COL) from REFERRER where <correlation> and ...) op ?`
    ///
    /// The closure must specify exactly one column of the referrer. A null
    /// `value` goes through invalid-query handling without running it.
    pub fn derived_referrer<F>(
        &mut self,
        referrer: &str,
        function: DerivedFunction,
        key: ConditionKey,
        value: impl Into<Value>,
        option: DerivedReferrerOption,
        f: F,
    ) -> CBeanResult<&mut Self>
    where
        F: FnOnce(&mut ConditionBean) -> CBeanResult<()>,
    {
        let value = value.into();
        let node = self.node_id();
        let cb = self.bean_mut();
        cb.purpose.assert_query()?;
        assert_comparison(key)?;
        let (outer_table, outer_alias, outer_location, target) = {
            let n = &cb.nodes[node];
            (n.table, n.alias.clone(), n.location.clone(), n.target)
        };
        let correlation = Correlation::referrer(cb, outer_table, referrer)?;
        if value.is_null() {
            cb.handle_invalid_query(InvalidQueryInfo {
                location: outer_location,
                column: correlation.property.to_string(),
                key,
                value,
            })?;
            return Ok(self);
        }
        let name = format!(
            "{}_QueryDerivedReferrer_{}",
            correlation.local_property(outer_table),
            init_cap(correlation.property)
        );
        let sub = cb.open_sub_query(node, correlation.table, QueryPurpose::DerivedReferrer, &name);
        let parameter_path = format!("{}Parameter", sub.location());
        let identity = format!("{}[{}]", correlation.property, sub.sub_query_level);
        let sub = cb.fill_sub_query(sub, identity, f)?;
        let (_, expression) = aggregate(&sub, function, "derived referrer")?;

        let sub_alias = sub.clause.base_alias().to_string();
        let frag = SqlFragment::text(format!("(select {} ", option.filter_function(&expression)))
            .with_fragment(ConditionBean::sub_query_from_where(
                &sub,
                Some(correlation.condition(&outer_alias, &sub_alias)),
            ))
            .with_text(&format!(") {} ", key.operand()))
            .with_bind(parameter_path, value);
        cb.clause.register(target, WhereNode::Leaf(frag));
        Ok(self)
    }

    /// `outer.COL op (select fn(sub.COL) from SAME_TABLE where ...)`
    ///
    /// The closure specifies the compared column; `max`, `min`, `sum` and
    /// `avg` are supported.
    pub fn scalar_condition<F>(
        &mut self,
        function: DerivedFunction,
        key: ConditionKey,
        f: F,
    ) -> CBeanResult<&mut Self>
    where
        F: FnOnce(&mut ConditionBean) -> CBeanResult<()>,
    {
        if matches!(function, DerivedFunction::Count | DerivedFunction::CountDistinct) {
            return Err(CBeanError::IllegalConditionBeanOperation(format!(
                "scalar condition does not support {function}"
            )));
        }
        let node = self.node_id();
        let cb = self.bean_mut();
        cb.purpose.assert_query()?;
        assert_comparison(key)?;
        let (table, outer_alias, target) = {
            let n = &cb.nodes[node];
            (n.table, n.alias.clone(), n.target)
        };
        let sub = cb.open_sub_query(node, table, QueryPurpose::ScalarCondition, "scalarCondition");
        let identity = format!("{}[{}]", table.table_property_name, sub.sub_query_level);
        let sub = cb.fill_sub_query(sub, identity, f)?;
        let (specified, expression) = aggregate(&sub, function, "scalar condition")?;

        let frag = SqlFragment::text(format!(
            "{outer_alias}.{} {} (select {expression} ",
            specified.column.db_name,
            key.operand()
        ))
        .with_fragment(ConditionBean::sub_query_from_where(&sub, None))
        .with_text(")");
        cb.clause.register(target, WhereNode::Leaf(frag));
        Ok(self)
    }
}

// ── Specify side ───────────────────────────────────────────────────────

impl Specification<'_> {
    /// Adds `(select fn(sub.COL) from REFERRER where <correlation> ...) as ALIAS`
    /// to the select list.
    pub fn derived_referrer<F>(
        &mut self,
        referrer: &str,
        function: DerivedFunction,
        alias: &str,
        option: DerivedReferrerOption,
        f: F,
    ) -> CBeanResult<&mut Self>
    where
        F: FnOnce(&mut ConditionBean) -> CBeanResult<()>,
    {
        let node = self.node;
        let cb = &mut *self.cb;
        let (outer_table, outer_alias) = {
            let n = &cb.nodes[node];
            (n.table, n.alias.clone())
        };
        let correlation = Correlation::referrer(cb, outer_table, referrer)?;
        let name = format!(
            "{}_SpecifyDerivedReferrer_{}",
            correlation.local_property(outer_table),
            init_cap(correlation.property)
        );
        let sub = cb.open_sub_query(node, correlation.table, QueryPurpose::DerivedReferrer, &name);
        let identity = format!("{}[{}]", correlation.property, sub.sub_query_level);
        let sub = cb.fill_sub_query(sub, identity, f)?;
        let (_, expression) = aggregate(&sub, function, "derived referrer")?;

        let sub_alias = sub.clause.base_alias().to_string();
        let frag = SqlFragment::text(format!("(select {} ", option.filter_function(&expression)))
            .with_fragment(ConditionBean::sub_query_from_where(
                &sub,
                Some(correlation.condition(&outer_alias, &sub_alias)),
            ))
            .with_text(")");
        cb.clause.add_derived_column(frag, alias);
        Ok(self)
    }
}
