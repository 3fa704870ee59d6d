//! Result beans returned by list and page selects.

use serde::Serialize;

use dbflute_rs_core::CBeanResult;

use super::bean::PagingBean;
use super::navi::{PageGroup, PageGroupOption, PageRange, PageRangeOption};

/// The rows of a list select with their count and ordering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListResultBean<E> {
    table_db_name: String,
    selected_list: Vec<E>,
    all_record_count: usize,
    order_by_description: String,
}

impl<E> ListResultBean<E> {
    /// Table the rows were selected from.
    pub fn table_db_name(&self) -> &str {
        &self.table_db_name
    }

    /// The selected entities.
    pub fn selected_list(&self) -> &[E] {
        &self.selected_list
    }

    /// Consumes the bean, returning the entities.
    pub fn into_list(self) -> Vec<E> {
        self.selected_list
    }

    /// Number of records (the list length for a list select).
    pub const fn all_record_count(&self) -> usize {
        self.all_record_count
    }

    /// The order-by the rows were selected with.
    pub fn order_by_description(&self) -> &str {
        &self.order_by_description
    }

    pub fn len(&self) -> usize {
        self.selected_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected_list.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.selected_list.iter()
    }

    /// Converts every entity, keeping the metadata.
    pub fn map_list<R>(self, f: impl FnMut(E) -> R) -> ListResultBean<R> {
        ListResultBean {
            table_db_name: self.table_db_name,
            selected_list: self.selected_list.into_iter().map(f).collect(),
            all_record_count: self.all_record_count,
            order_by_description: self.order_by_description,
        }
    }
}

impl<E> IntoIterator for ListResultBean<E> {
    type Item = E;
    type IntoIter = std::vec::IntoIter<E>;

    fn into_iter(self) -> Self::IntoIter {
        self.selected_list.into_iter()
    }
}

impl<'a, E> IntoIterator for &'a ListResultBean<E> {
    type Item = &'a E;
    type IntoIter = std::slice::Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.selected_list.iter()
    }
}

/// One page of rows with the all-record count and page metadata.
///
/// # Examples
///
/// ```
/// use dbflute_rs_cbean::paging::{PagingBean, ResultBeanBuilder, SimplePagingBean};
///
/// let mut pmb = SimplePagingBean::default();
/// pmb.paging(20, 3).unwrap();
/// let page = ResultBeanBuilder::new("URL_QUEUE").build_paging_result(&pmb, 47, vec![0; 7]);
/// assert_eq!(page.all_page_count(), 3);
/// assert!(page.is_exist_pre_page());
/// assert!(!page.is_exist_next_page());
/// assert_eq!(page.current_start_record_number(), 41);
/// assert_eq!(page.current_end_record_number(), 47);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PagingResultBean<E> {
    table_db_name: String,
    selected_list: Vec<E>,
    all_record_count: usize,
    order_by_description: String,
    page_size: usize,
    current_page_number: usize,
}

impl<E> PagingResultBean<E> {
    /// Table the rows were selected from.
    pub fn table_db_name(&self) -> &str {
        &self.table_db_name
    }

    /// The entities of the current page.
    pub fn selected_list(&self) -> &[E] {
        &self.selected_list
    }

    /// Consumes the bean, returning the entities.
    pub fn into_list(self) -> Vec<E> {
        self.selected_list
    }

    /// Records matching the condition, across all pages.
    pub const fn all_record_count(&self) -> usize {
        self.all_record_count
    }

    /// The order-by the rows were selected with.
    pub fn order_by_description(&self) -> &str {
        &self.order_by_description
    }

    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    pub const fn current_page_number(&self) -> usize {
        self.current_page_number
    }

    pub fn len(&self) -> usize {
        self.selected_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected_list.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.selected_list.iter()
    }

    /// Number of pages; an empty result still has one page.
    pub const fn all_page_count(&self) -> usize {
        all_page_count(self.all_record_count, self.page_size)
    }

    pub const fn is_first_page(&self) -> bool {
        self.current_page_number <= 1
    }

    pub const fn is_last_page(&self) -> bool {
        self.current_page_number >= self.all_page_count()
    }

    /// Whether a previous page exists.
    pub const fn is_exist_pre_page(&self) -> bool {
        self.all_record_count > 0 && self.current_page_number > 1
    }

    /// Whether a next page exists.
    pub const fn is_exist_next_page(&self) -> bool {
        self.all_record_count > 0 && self.current_page_number < self.all_page_count()
    }

    /// 1-based record number of the first row of the page.
    pub const fn current_start_record_number(&self) -> usize {
        (self.current_page_number - 1) * self.page_size + 1
    }

    /// 1-based record number of the last row of the page.
    pub fn current_end_record_number(&self) -> usize {
        (self.current_start_record_number() + self.selected_list.len()).saturating_sub(1)
    }

    /// The page group holding the current page.
    pub fn page_group(&self, option: PageGroupOption) -> CBeanResult<PageGroup> {
        PageGroup::new(self.current_page_number, self.all_page_count(), option)
    }

    /// The page range around the current page.
    pub fn page_range(&self, option: PageRangeOption) -> CBeanResult<PageRange> {
        PageRange::new(self.current_page_number, self.all_page_count(), option)
    }

    /// Converts every entity, keeping the page metadata.
    pub fn map_list<R>(self, f: impl FnMut(E) -> R) -> PagingResultBean<R> {
        PagingResultBean {
            table_db_name: self.table_db_name,
            selected_list: self.selected_list.into_iter().map(f).collect(),
            all_record_count: self.all_record_count,
            order_by_description: self.order_by_description,
            page_size: self.page_size,
            current_page_number: self.current_page_number,
        }
    }
}

impl<E> IntoIterator for PagingResultBean<E> {
    type Item = E;
    type IntoIter = std::vec::IntoIter<E>;

    fn into_iter(self) -> Self::IntoIter {
        self.selected_list.into_iter()
    }
}

pub(crate) const fn all_page_count(all_record_count: usize, page_size: usize) -> usize {
    if all_record_count == 0 || page_size == 0 {
        1
    } else {
        all_record_count.div_ceil(page_size)
    }
}

/// Builds result beans for one table.
#[derive(Debug, Clone)]
pub struct ResultBeanBuilder {
    table_db_name: String,
}

impl ResultBeanBuilder {
    pub fn new(table_db_name: impl Into<String>) -> Self {
        Self {
            table_db_name: table_db_name.into(),
        }
    }

    /// A list result whose record count is the list length.
    pub fn build_list_result<E>(&self, list: Vec<E>, order_by_description: String) -> ListResultBean<E> {
        ListResultBean {
            table_db_name: self.table_db_name.clone(),
            all_record_count: list.len(),
            selected_list: list,
            order_by_description,
        }
    }

    /// A paging result taking page size and number from `bean`.
    pub fn build_paging_result<E, B>(&self, bean: &B, all_record_count: usize, list: Vec<E>) -> PagingResultBean<E>
    where
        B: PagingBean + ?Sized,
    {
        PagingResultBean {
            table_db_name: self.table_db_name.clone(),
            selected_list: list,
            all_record_count,
            order_by_description: bean.order_by_description(),
            page_size: bean.fetch_size(),
            current_page_number: bean.fetch_page_number(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paging::SimplePagingBean;

    fn page(size: i64, number: i64, count: usize, rows: usize) -> PagingResultBean<usize> {
        let mut pmb = SimplePagingBean::default();
        pmb.paging(size, number).unwrap();
        ResultBeanBuilder::new("ACCESS_RESULT").build_paging_result(&pmb, count, (0..rows).collect())
    }

    #[test]
    fn test_empty_result_has_one_page() {
        let page = page(20, 1, 0, 0);
        assert_eq!(page.all_page_count(), 1);
        assert!(!page.is_exist_pre_page());
        assert!(!page.is_exist_next_page());
        assert!(page.is_first_page());
        assert!(page.is_last_page());
        assert_eq!(page.current_start_record_number(), 1);
        assert_eq!(page.current_end_record_number(), 0);
    }

    #[test]
    fn test_last_page_numbers() {
        let page = page(20, 3, 47, 7);
        assert_eq!(page.all_page_count(), 3);
        assert!(!page.is_exist_next_page());
        assert!(page.is_exist_pre_page());
        assert_eq!(page.current_start_record_number(), 41);
        assert_eq!(page.current_end_record_number(), 47);
    }

    #[test]
    fn test_middle_page() {
        let page = page(10, 2, 35, 10);
        assert_eq!(page.all_page_count(), 4);
        assert!(page.is_exist_pre_page());
        assert!(page.is_exist_next_page());
        assert_eq!(page.current_end_record_number(), 20);
    }

    #[test]
    fn test_navigation_from_result() {
        let page = page(10, 12, 250, 10);
        let group = page.page_group(PageGroupOption::new(10)).unwrap();
        assert_eq!(group.group_start_page(), 11);
        let range = page.page_range(PageRangeOption::new(3)).unwrap();
        assert_eq!(range.page_number_list(), &[9, 10, 11, 12, 13, 14, 15]);
    }

    #[test]
    fn test_map_list_keeps_metadata() {
        let page = page(10, 2, 15, 5).map_list(|n| n.to_string());
        assert_eq!(page.all_record_count(), 15);
        assert_eq!(page.current_page_number(), 2);
        assert_eq!(page.selected_list()[0], "0");
    }

    #[test]
    fn test_list_result() {
        let list = ResultBeanBuilder::new("URL_FILTER").build_list_result(vec!["a", "b"], "ID asc".to_string());
        assert_eq!(list.all_record_count(), 2);
        assert_eq!(list.table_db_name(), "URL_FILTER");
        assert_eq!(list.order_by_description(), "ID asc");
        let lengths: Vec<usize> = list.map_list(str::len).into_iter().collect();
        assert_eq!(lengths, vec![1, 1]);
    }

    #[test]
    fn test_serializes_to_json() {
        let page = page(10, 1, 1, 1);
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["all_record_count"], 1);
        assert_eq!(json["selected_list"][0], 0);
    }
}
