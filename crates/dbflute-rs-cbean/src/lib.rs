//! # dbflute-rs-cbean
//!
//! Condition-bean query composition and paging for crawler persistence.
//! A [`ConditionBean`](cbean::ConditionBean) is the per-table root of a
//! query graph; [`ConditionQuery`](cquery::ConditionQuery) handles set
//! conditions on the base table or on joined relations, and the bean
//! renders the accumulated [`SqlClause`](sqlclause::SqlClause) into SQL
//! with located bind parameters.
//!
//! ## Architecture
//!
//! Query nodes live in an arena owned by the bean and are addressed by
//! index, so relation handles never outlive or alias the bean. Conditions
//! are kept structured (where trees per clause target, joins, order-by
//! elements, union partners) until a statement is requested. Sub-queries
//! and union partners are separate beans whose rendered fragments are
//! merged back with their bind paths rebased.
//!
//! Execution sits behind the [`SelectExecutor`](executor::SelectExecutor)
//! trait; the [`PagingInvoker`](paging::PagingInvoker) coordinates count
//! and fetch for page selects.
//!
//! ## Module Overview
//!
//! - [`value`] / [`row`] - Bind values and result rows
//! - [`meta`] / [`tables`] - Table metadata and the crawler schema
//! - [`ckey`] / [`cvalue`] / [`coption`] - Operators, registered values, options
//! - [`purpose`] - Purpose gating of bean operations
//! - [`sqlclause`] - The structured clause and SQL fragments
//! - [`cquery`] / [`specify`] / [`subquery`] - Conditions, column specification, sub-queries
//! - [`cbean`] - The condition bean, or-scopes, unions and column queries
//! - [`dynamic`] - String-addressed conditions
//! - [`paging`] - Paging beans, the paging invoker, result beans and navigation
//! - [`executor`] - The execution boundary
//!
//! # Examples
//!
//! ```
//! use dbflute_rs_cbean::prelude::*;
//!
//! let mut cb = ConditionBean::new(&CRAWLER_TABLES, "ACCESS_RESULT").unwrap();
//! cb.setup_select("accessResultDataAsOne").unwrap();
//! cb.query().set_equal("SESSION_ID", "s1").unwrap();
//! cb.query()
//!     .exists_referrer("accessResultDataList", |sub| {
//!         sub.query().set_equal("TRANSFORMER_NAME", "htmlTransformer")?;
//!         Ok(())
//!     })
//!     .unwrap();
//! let sql = cb.to_select_sql().unwrap();
//! assert_eq!(sql.bind_paths()[0], "conditionQuery.sessionId.equal");
//! ```

#![allow(clippy::too_many_lines)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::format_push_string)]
#![allow(clippy::result_large_err)]

pub mod cbean;
pub mod ckey;
pub mod coption;
pub mod cquery;
pub mod cvalue;
pub mod dynamic;
pub mod executor;
pub mod invalid;
pub mod meta;
pub mod paging;
pub mod purpose;
pub mod row;
pub mod specify;
pub mod sqlclause;
pub mod subquery;
pub mod tables;
pub mod value;

// Re-export the most commonly used types at the crate root.
pub use cbean::ConditionBean;
pub use ckey::ConditionKey;
pub use coption::{ColumnCalculation, DerivedReferrerOption, FromToOption, LikeSearchOption};
pub use cquery::ConditionQuery;
pub use dynamic::DynamicQueryTarget;
pub use executor::SelectExecutor;
pub use invalid::InvalidQueryInfo;
pub use meta::{ColumnInfo, ColumnType, ForeignInfo, MetaRegistry, ReferrerInfo, TableMeta};
pub use paging::{
    ListResultBean, PageGroupOption, PageRangeOption, PagingBean, PagingInvoker, PagingResultBean,
    SimplePagingBean,
};
pub use purpose::QueryPurpose;
pub use row::{FromValue, Row};
pub use specify::Specification;
pub use sqlclause::{BoundSql, SqlClause};
pub use subquery::DerivedFunction;
pub use value::Value;

/// Everything needed to build and run condition beans.
pub mod prelude {
    pub use crate::cbean::ConditionBean;
    pub use crate::ckey::ConditionKey;
    pub use crate::coption::{ColumnCalculation, DerivedReferrerOption, FromToOption, LikeSearchOption};
    pub use crate::dynamic::DynamicQueryTarget;
    pub use crate::executor::SelectExecutor;
    pub use crate::paging::{
        ListResultBean, PageGroupOption, PageRangeOption, PagingBean, PagingResultBean,
    };
    pub use crate::purpose::QueryPurpose;
    pub use crate::row::Row;
    pub use crate::subquery::DerivedFunction;
    pub use crate::tables::CRAWLER_TABLES;
    pub use crate::value::Value;
    pub use dbflute_rs_core::{CBeanError, CBeanResult, CBeanSettings};
}
