//! Count-then-fetch orchestration of one page select.

use dbflute_rs_core::{CBeanError, CBeanResult};
use tracing::debug;

use super::bean::PagingBean;
use super::result::{all_page_count, PagingResultBean, ResultBeanBuilder};

/// The two executions paging needs: a count and a page fetch.
pub trait PagingHandler<E> {
    /// The bean carrying the fetch scope.
    type Bean: PagingBean + ?Sized;

    /// The paging bean.
    fn paging_bean(&mut self) -> &mut Self::Bean;

    /// Counts all records, ignoring the fetch scope.
    fn count(&mut self) -> CBeanResult<usize>;

    /// Fetches the current page.
    fn paging(&mut self) -> CBeanResult<Vec<E>>;
}

/// Runs a [`PagingHandler`] and builds the [`PagingResultBean`].
#[derive(Debug, Clone)]
pub struct PagingInvoker {
    table_db_name: String,
}

impl PagingInvoker {
    pub fn new(table_db_name: impl Into<String>) -> Self {
        Self {
            table_db_name: table_db_name.into(),
        }
    }

    /// Selects one page.
    ///
    /// The bean leaves in paging mode whether or not the select succeeds.
    pub fn invoke_paging<E, H>(&self, handler: &mut H) -> CBeanResult<PagingResultBean<E>>
    where
        H: PagingHandler<E>,
    {
        if !handler.paging_bean().is_fetch_scope_effective() {
            return Err(CBeanError::PagingStatusInvalid(format!(
                "the fetch scope of {} is not effective: call paging() before a page select",
                self.table_db_name
            )));
        }
        let result = self.do_invoke_paging(handler);
        handler.paging_bean().set_paging(true);
        result
    }

    fn do_invoke_paging<E, H>(&self, handler: &mut H) -> CBeanResult<PagingResultBean<E>>
    where
        H: PagingHandler<E>,
    {
        let (page_size, page_number, safety, count_later, reselect) = {
            let bean = handler.paging_bean();
            (
                bean.fetch_size(),
                bean.fetch_page_number(),
                bean.safety_max_result_size(),
                bean.is_count_later(),
                bean.can_paging_reselect(),
            )
        };

        let (all_record_count, list) = if count_later {
            let list = handler.paging()?;
            let rows = list.len();
            let count = if rows < page_size && !(page_number > 1 && rows == 0) {
                let derived = (page_number - 1) * page_size + rows;
                debug!(
                    table = %self.table_db_name,
                    page_number,
                    rows,
                    derived,
                    "last page reached, count derived without count query"
                );
                derived
            } else {
                handler.count()?
            };
            check_safety(safety, count)?;
            (count, list)
        } else {
            let count = handler.count()?;
            check_safety(safety, count)?;
            if count == 0 {
                (0, Vec::new())
            } else {
                (count, handler.paging()?)
            }
        };

        if reselect && all_record_count > 0 && list.is_empty() {
            let last_page = all_page_count(all_record_count, page_size);
            debug!(
                table = %self.table_db_name,
                page_number,
                last_page,
                "page beyond the last one, re-selecting the last page"
            );
            handler.paging_bean().fetch_page(last_page);
            let count = handler.count()?;
            check_safety(safety, count)?;
            let list = handler.paging()?;
            return Ok(self.build(handler, count, list));
        }
        Ok(self.build(handler, all_record_count, list))
    }

    fn build<E, H>(&self, handler: &mut H, all_record_count: usize, list: Vec<E>) -> PagingResultBean<E>
    where
        H: PagingHandler<E>,
    {
        ResultBeanBuilder::new(self.table_db_name.as_str()).build_paging_result(
            &*handler.paging_bean(),
            all_record_count,
            list,
        )
    }
}

fn check_safety(safety_max_result_size: usize, all_record_count: usize) -> CBeanResult<()> {
    if safety_max_result_size > 0 && all_record_count > safety_max_result_size {
        return Err(CBeanError::PagingOverSafetySize {
            safety_max_result_size,
            all_record_count,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paging::SimplePagingBean;

    /// Pages over `total` numbered records, counting executions.
    struct FakeHandler {
        bean: SimplePagingBean,
        total: usize,
        counts: usize,
        fetches: Vec<usize>,
    }

    impl FakeHandler {
        fn new(total: usize, size: i64, page: i64) -> Self {
            let mut bean = SimplePagingBean::default();
            bean.paging(size, page).unwrap();
            Self {
                bean,
                total,
                counts: 0,
                fetches: Vec::new(),
            }
        }
    }

    impl PagingHandler<usize> for FakeHandler {
        type Bean = SimplePagingBean;

        fn paging_bean(&mut self) -> &mut SimplePagingBean {
            &mut self.bean
        }

        fn count(&mut self) -> CBeanResult<usize> {
            self.counts += 1;
            Ok(self.total)
        }

        fn paging(&mut self) -> CBeanResult<Vec<usize>> {
            self.fetches.push(self.bean.fetch_page_number());
            let start = self.bean.page_start_index().min(self.total);
            let end = self.bean.page_end_index().min(self.total);
            Ok((start..end).collect())
        }
    }

    fn invoke(handler: &mut FakeHandler) -> CBeanResult<PagingResultBean<usize>> {
        PagingInvoker::new("URL_QUEUE").invoke_paging(handler)
    }

    #[test]
    fn test_requires_fetch_scope() {
        let mut handler = FakeHandler::new(10, 10, 1);
        handler.bean = SimplePagingBean::default();
        let err = invoke(&mut handler).unwrap_err();
        assert_eq!(err.kind(), "paging_status_invalid");
        assert!(handler.bean.is_paging());
    }

    #[test]
    fn test_zero_count_skips_fetch() {
        let mut handler = FakeHandler::new(0, 20, 1);
        let page = invoke(&mut handler).unwrap();
        assert!(page.is_empty());
        assert_eq!(page.all_page_count(), 1);
        assert!(handler.fetches.is_empty());
        assert_eq!(handler.counts, 1);
    }

    #[test]
    fn test_normal_page() {
        let mut handler = FakeHandler::new(47, 20, 3);
        let page = invoke(&mut handler).unwrap();
        assert_eq!(page.all_record_count(), 47);
        assert_eq!(page.len(), 7);
        assert_eq!(page.current_start_record_number(), 41);
        assert_eq!(handler.counts, 1);
    }

    #[test]
    fn test_count_later_derives_count() {
        let mut handler = FakeHandler::new(17, 10, 2);
        handler.bean.enable_count_later();
        let page = invoke(&mut handler).unwrap();
        assert_eq!(page.all_record_count(), 17);
        assert_eq!(handler.counts, 0);
    }

    #[test]
    fn test_count_later_full_page_counts() {
        let mut handler = FakeHandler::new(30, 10, 2);
        handler.bean.enable_count_later();
        let page = invoke(&mut handler).unwrap();
        assert_eq!(page.all_record_count(), 30);
        assert_eq!(handler.counts, 1);
    }

    #[test]
    fn test_count_later_empty_page_beyond_first_counts() {
        let mut handler = FakeHandler::new(15, 10, 4);
        handler.bean.enable_count_later();
        let page = invoke(&mut handler).unwrap();
        assert_eq!(page.current_page_number(), 2);
        assert_eq!(page.all_record_count(), 15);
        assert_eq!(handler.fetches, vec![4, 2]);
    }

    #[test]
    fn test_reselect_last_page() {
        let mut handler = FakeHandler::new(25, 10, 7);
        let page = invoke(&mut handler).unwrap();
        assert_eq!(page.current_page_number(), 3);
        assert_eq!(page.len(), 5);
        assert_eq!(handler.counts, 2);
        assert_eq!(handler.fetches, vec![7, 3]);
    }

    #[test]
    fn test_reselect_disabled() {
        let mut handler = FakeHandler::new(25, 10, 7);
        handler.bean.disable_paging_reselect();
        let page = invoke(&mut handler).unwrap();
        assert!(page.is_empty());
        assert_eq!(page.current_page_number(), 7);
        assert!(!page.is_exist_next_page());
    }

    #[test]
    fn test_safety_size() {
        let mut handler = FakeHandler::new(101, 10, 1);
        handler.bean.check_safety_result(100);
        let err = invoke(&mut handler).unwrap_err();
        assert!(matches!(
            err,
            CBeanError::PagingOverSafetySize {
                safety_max_result_size: 100,
                all_record_count: 101,
            }
        ));
        assert!(handler.fetches.is_empty());
    }

    #[test]
    fn test_safety_size_with_derived_count() {
        let mut handler = FakeHandler::new(105, 10, 11);
        handler.bean.enable_count_later();
        handler.bean.check_safety_result(100);
        let err = invoke(&mut handler).unwrap_err();
        assert!(err.is_paging_error());
        assert_eq!(handler.counts, 0);
    }
}
