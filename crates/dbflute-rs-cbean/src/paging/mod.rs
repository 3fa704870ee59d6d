//! Paging: the paging-bean contract, the paging invoker, result beans and
//! page navigation.
//!
//! A page select is a count plus a fetch of one window of rows. The
//! [`PagingInvoker`] decides their order (count first, or fetch first in
//! count-later mode), applies the safety size and re-selects the last page
//! when the requested one is beyond it.

pub mod bean;
pub mod invoker;
pub mod navi;
pub mod result;

pub use bean::{PagingBean, SimplePagingBean};
pub use invoker::{PagingHandler, PagingInvoker};
pub use navi::{PageGroup, PageGroupOption, PageRange, PageRangeOption};
pub use result::{ListResultBean, PagingResultBean, ResultBeanBuilder};
