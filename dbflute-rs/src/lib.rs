//! # dbflute-rs
//!
//! Condition-bean query composition and paging for crawler persistence.
//!
//! This is the meta-crate that re-exports all sub-crates for convenient access.
//! You can depend on `dbflute-rs` to get the whole engine, or depend on
//! individual crates for finer-grained control.
//!
//! # Examples
//!
//! ```
//! use dbflute_rs::prelude::*;
//!
//! let mut cb = ConditionBean::new(&CRAWLER_TABLES, "URL_QUEUE").unwrap();
//! cb.query().set_equal("SESSION_ID", "s1").unwrap();
//! cb.query().add_order_by_asc("ID").unwrap();
//! cb.paging(100, 1).unwrap();
//! assert!(cb.to_select_sql().unwrap().sql.ends_with("order by dfloc.ID asc limit 100"));
//! ```

/// Error types, settings, and logging.
pub use dbflute_rs_core as core;

/// Condition beans, sub-queries, unions, and paging.
pub use dbflute_rs_cbean as cbean;

/// Commonly used types from every sub-crate.
pub mod prelude {
    pub use dbflute_rs_cbean::prelude::*;
    pub use dbflute_rs_core::logging::setup_logging;
    pub use dbflute_rs_core::SETTINGS;
}
