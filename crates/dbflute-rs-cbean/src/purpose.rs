//! What a condition bean is being built for.
//!
//! Each [`QueryPurpose`] carries a fixed capability set. A bean created for
//! a sub-query or a union partner refuses operations that make no sense in
//! that position (ordering inside an exists sub-query, setup-select on a
//! union partner, a second specified column in a derived aggregate), and
//! the refusal is an [`CBeanError::IllegalPurpose`] naming both sides.

use std::fmt;

use dbflute_rs_core::{CBeanError, CBeanResult};

/// The context a condition bean is used in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QueryPurpose {
    /// A top-level select.
    #[default]
    NormalUse,
    /// A union or union-all partner.
    UnionQuery,
    /// The body of an `exists` sub-query.
    ExistsReferrer,
    /// The body of an `in (select ...)` sub-query.
    InScopeRelation,
    /// A derived-referrer aggregate (specify or query).
    DerivedReferrer,
    /// A scalar select (`max`, `sum`, ... over the table).
    ScalarSelect,
    /// The body of a scalar-condition sub-query.
    ScalarCondition,
    /// Column specification for a column query.
    ColumnQuery,
    /// Where-scope of a varying update.
    VaryingUpdate,
    /// Column specification of a specified update.
    SpecifiedUpdate,
    /// Source query of an insert-select.
    QueryInsert,
}

/// Capability flags of a purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct Capability {
    no_setup_select: bool,
    no_specify: bool,
    no_query: bool,
    no_order_by: bool,
    no_union: bool,
    specify_column_limit_one: bool,
}

impl QueryPurpose {
    const fn capability(self) -> Capability {
        let none = Capability {
            no_setup_select: false,
            no_specify: false,
            no_query: false,
            no_order_by: false,
            no_union: false,
            specify_column_limit_one: false,
        };
        match self {
            Self::NormalUse => none,
            Self::UnionQuery => Capability {
                no_setup_select: true,
                no_specify: true,
                no_order_by: true,
                no_union: true,
                ..none
            },
            Self::ExistsReferrer => Capability {
                no_setup_select: true,
                no_specify: true,
                no_order_by: true,
                no_union: true,
                ..none
            },
            Self::InScopeRelation | Self::DerivedReferrer | Self::ScalarCondition => Capability {
                no_setup_select: true,
                no_order_by: true,
                no_union: true,
                specify_column_limit_one: true,
                ..none
            },
            Self::ScalarSelect => Capability {
                no_setup_select: true,
                no_order_by: true,
                specify_column_limit_one: true,
                ..none
            },
            Self::ColumnQuery => Capability {
                no_setup_select: true,
                no_query: true,
                no_order_by: true,
                no_union: true,
                specify_column_limit_one: true,
                ..none
            },
            Self::VaryingUpdate => Capability {
                no_setup_select: true,
                no_specify: true,
                no_order_by: true,
                no_union: true,
                ..none
            },
            Self::SpecifiedUpdate => Capability {
                no_setup_select: true,
                no_query: true,
                no_order_by: true,
                no_union: true,
                ..none
            },
            Self::QueryInsert => Capability {
                no_setup_select: true,
                no_order_by: true,
                no_union: true,
                ..none
            },
        }
    }

    /// Stable name used in error messages.
    pub const fn name(self) -> &'static str {
        match self {
            Self::NormalUse => "NormalUse",
            Self::UnionQuery => "UnionQuery",
            Self::ExistsReferrer => "ExistsReferrer",
            Self::InScopeRelation => "InScopeRelation",
            Self::DerivedReferrer => "DerivedReferrer",
            Self::ScalarSelect => "ScalarSelect",
            Self::ScalarCondition => "ScalarCondition",
            Self::ColumnQuery => "ColumnQuery",
            Self::VaryingUpdate => "VaryingUpdate",
            Self::SpecifiedUpdate => "SpecifiedUpdate",
            Self::QueryInsert => "QueryInsert",
        }
    }

    /// Whether at most one column may be specified.
    pub const fn is_specify_column_limit_one(self) -> bool {
        self.capability().specify_column_limit_one
    }

    /// Whether the bean is a sub-query body.
    pub const fn is_sub_query(self) -> bool {
        matches!(
            self,
            Self::ExistsReferrer
                | Self::InScopeRelation
                | Self::DerivedReferrer
                | Self::ScalarCondition
        )
    }

    /// Fails unless setup-select is allowed.
    pub fn assert_setup_select(self) -> CBeanResult<()> {
        self.check(self.capability().no_setup_select, "setupSelect")
    }

    /// Fails unless specify is allowed.
    pub fn assert_specify(self) -> CBeanResult<()> {
        self.check(self.capability().no_specify, "specify")
    }

    /// Fails unless query is allowed.
    pub fn assert_query(self) -> CBeanResult<()> {
        self.check(self.capability().no_query, "query")
    }

    /// Fails unless order-by is allowed.
    pub fn assert_order_by(self) -> CBeanResult<()> {
        self.check(self.capability().no_order_by, "orderBy")
    }

    /// Fails unless union is allowed.
    pub fn assert_union(self) -> CBeanResult<()> {
        self.check(self.capability().no_union, "union")
    }

    fn check(self, denied: bool, operation: &str) -> CBeanResult<()> {
        if denied {
            Err(CBeanError::IllegalPurpose {
                purpose: self.name().to_string(),
                operation: operation.to_string(),
            })
        } else {
            Ok(())
        }
    }
}

impl fmt::Display for QueryPurpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
