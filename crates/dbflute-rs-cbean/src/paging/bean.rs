//! The paging contract shared by condition beans and parameter beans.

use std::collections::BTreeMap;

use dbflute_rs_core::{CBeanError, CBeanResult, CBeanSettings, SETTINGS};

use crate::sqlclause::FetchScope;
use crate::value::Value;

/// A bean that can be paged by the [`PagingInvoker`](super::PagingInvoker).
///
/// Implementors hold a fetch scope (size + page number) and a paging flag
/// that the invoker switches off while counting, so one bean renders both
/// the count and the page select.
pub trait PagingBean {
    /// Limits the select to `fetch_size` rows.
    fn fetch_first(&mut self, fetch_size: usize);

    /// Moves to `page_number` (1-based; lower numbers mean 1).
    fn fetch_page(&mut self, page_number: usize);

    /// Sets page size and page number together.
    ///
    /// A page size of zero or less raises
    /// [`CBeanError::PagingPageSizeNotPlus`]; a page number below 1 means
    /// the first page.
    fn paging(&mut self, page_size: i64, page_number: i64) -> CBeanResult<()> {
        if page_size <= 0 {
            return Err(CBeanError::PagingPageSizeNotPlus { page_size });
        }
        let size = usize::try_from(page_size).unwrap_or(usize::MAX);
        let number = usize::try_from(page_number).unwrap_or(1);
        self.fetch_first(size);
        self.fetch_page(number);
        Ok(())
    }

    /// Page size (0 when unset).
    fn fetch_size(&self) -> usize;

    /// Current page number (1-based).
    fn fetch_page_number(&self) -> usize;

    /// Whether a fetch scope is set and not suspended.
    fn is_fetch_scope_effective(&self) -> bool;

    /// `false` suspends fetch scope and order-by (count mode), `true`
    /// restores them.
    fn set_paging(&mut self, paging: bool);

    /// Whether the bean is in paging mode.
    fn is_paging(&self) -> bool;

    /// Whether the invoker may derive the count from a short last page.
    fn is_count_later(&self) -> bool;

    /// Whether an empty page beyond the last one is re-selected.
    fn can_paging_reselect(&self) -> bool;

    /// The record count above which paging fails (0 = unchecked).
    fn safety_max_result_size(&self) -> usize;

    /// Sets the safety size.
    fn check_safety_result(&mut self, safety_max_result_size: usize);

    /// Order-by description carried into result beans.
    fn order_by_description(&self) -> String {
        String::new()
    }
}

/// A standalone [`PagingBean`] for outside-SQL style parameter beans.
///
/// # Examples
///
/// ```
/// use dbflute_rs_cbean::paging::{PagingBean, SimplePagingBean};
///
/// let mut pmb = SimplePagingBean::new();
/// pmb.add_parameter("sessionId", "s1");
/// pmb.paging(20, 3).unwrap();
/// assert_eq!(pmb.fetch_page_number(), 3);
/// assert_eq!(pmb.page_start_index(), 40);
/// ```
#[derive(Debug, Clone)]
pub struct SimplePagingBean {
    fetch: FetchScope,
    parameters: BTreeMap<String, Value>,
    order_by: String,
    count_later: bool,
    paging_reselect: bool,
    safety_max_result_size: usize,
    paging: bool,
}

impl Default for SimplePagingBean {
    fn default() -> Self {
        Self::from_settings(&CBeanSettings::default())
    }
}

impl SimplePagingBean {
    /// Creates a bean from the global settings.
    pub fn new() -> Self {
        Self::from_settings(&SETTINGS.get_or_default())
    }

    /// Creates a bean from explicit settings.
    pub fn from_settings(settings: &CBeanSettings) -> Self {
        Self {
            fetch: FetchScope::default(),
            parameters: BTreeMap::new(),
            order_by: String::new(),
            count_later: settings.count_later,
            paging_reselect: settings.paging_reselect,
            safety_max_result_size: settings.safety_max_result_size,
            paging: true,
        }
    }

    /// Adds a named parameter.
    pub fn add_parameter(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.parameters.insert(key.into(), value.into());
    }

    /// Named parameters.
    pub const fn parameters(&self) -> &BTreeMap<String, Value> {
        &self.parameters
    }

    /// Sets the order-by description reported in results.
    pub fn set_order_by_description(&mut self, order_by: impl Into<String>) {
        self.order_by = order_by.into();
    }

    /// Zero-based index of the first row of the current page.
    pub const fn page_start_index(&self) -> usize {
        self.fetch.page_start_index()
    }

    /// Zero-based index one past the last row of the current page.
    pub const fn page_end_index(&self) -> usize {
        self.fetch.page_end_index()
    }

    /// Enables count-later derivation.
    pub fn enable_count_later(&mut self) {
        self.count_later = true;
    }

    /// Disables re-selecting an empty page.
    pub fn disable_paging_reselect(&mut self) {
        self.paging_reselect = false;
    }
}

impl PagingBean for SimplePagingBean {
    fn fetch_first(&mut self, fetch_size: usize) {
        self.fetch.fetch_first(fetch_size);
    }

    fn fetch_page(&mut self, page_number: usize) {
        self.fetch.fetch_page(page_number);
    }

    fn fetch_size(&self) -> usize {
        self.fetch.fetch_size()
    }

    fn fetch_page_number(&self) -> usize {
        self.fetch.fetch_page_number()
    }

    fn is_fetch_scope_effective(&self) -> bool {
        self.fetch.is_effective()
    }

    fn set_paging(&mut self, paging: bool) {
        self.paging = paging;
        if paging {
            self.fetch.make_effective();
        } else {
            self.fetch.ignore();
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
        self.order_by.clone()
    }
}
