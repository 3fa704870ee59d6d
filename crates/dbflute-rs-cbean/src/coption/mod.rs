//! Options refining how a condition is registered or rendered.
//!
//! - [`LikeSearchOption`] - wildcard placement, escaping, token splitting
//! - [`FromToOption`] - operator choice and date truncation for ranges
//! - [`DerivedReferrerOption`] - post-processing of derived aggregates
//! - [`ColumnCalculation`] - arithmetic on the right side of a column query

pub mod calc;
pub mod derived;
pub mod fromto;
pub mod like;

pub use calc::ColumnCalculation;
pub use derived::DerivedReferrerOption;
pub use fromto::FromToOption;
pub use like::LikeSearchOption;
