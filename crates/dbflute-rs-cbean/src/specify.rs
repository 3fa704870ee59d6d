//! Column specification.
//!
//! `specify()` narrows the select list to chosen columns, declares the
//! single column a sub-query aggregates, and picks the two sides of a
//! column query. Purposes that allow only one column reject a second.

use dbflute_rs_core::{CBeanError, CBeanResult};

use crate::cbean::ConditionBean;
use crate::cquery::NodeId;
use crate::sqlclause::SpecifiedColumn;

/// A handle for specifying columns of one query node.
#[derive(Debug)]
pub struct Specification<'a> {
    pub(crate) cb: &'a mut ConditionBean,
    pub(crate) node: NodeId,
}

impl<'a> Specification<'a> {
    pub(crate) fn new(cb: &'a mut ConditionBean, node: NodeId) -> Self {
        Self { cb, node }
    }

    /// Specifies a column of this node's table.
    pub fn column(&mut self, name: &str) -> CBeanResult<&mut Self> {
        let node = &self.cb.nodes[self.node];
        let column = node.table.column(name)?;
        let specified = SpecifiedColumn {
            table_alias: node.alias.clone(),
            relation_path: node.relation_path.clone(),
            column,
        };
        if self.cb.purpose.is_specify_column_limit_one()
            && self.cb.clause.specified().iter().any(|s| *s != specified)
        {
            return Err(CBeanError::SpecifyColumnInvalid(format!(
                "only one column can be specified for {}: {}",
                self.cb.purpose,
                specified.real_name()
            )));
        }
        self.cb.clause.add_specified(specified);
        Ok(self)
    }

    /// Moves to a foreign relation, registering its join if needed.
    pub fn specify_foreign(&mut self, property: &str) -> CBeanResult<Specification<'_>> {
        let child = self.cb.ensure_foreign(self.node, property)?;
        Ok(Specification::new(self.cb, child))
    }
}
