//! The boundary to statement execution.
//!
//! The engine never talks to a database. A [`SelectExecutor`] receives a
//! rendered [`BoundSql`] and returns a count or raw [`Row`]s; the caller's
//! mapping closure turns rows into entities.

use dbflute_rs_core::CBeanResult;
use tracing::debug;

use crate::cbean::ConditionBean;
use crate::paging::{PagingBean, PagingHandler};
use crate::row::Row;
use crate::sqlclause::BoundSql;

/// Executes rendered selects.
pub trait SelectExecutor {
    /// Runs a count statement.
    fn select_count(&self, sql: &BoundSql) -> CBeanResult<usize>;

    /// Runs a select statement.
    fn select_list(&self, sql: &BoundSql) -> CBeanResult<Vec<Row>>;
}

/// Pages a [`ConditionBean`] through a [`SelectExecutor`].
pub struct ExecutorPagingHandler<'a, X: ?Sized, F> {
    cb: &'a mut ConditionBean,
    executor: &'a X,
    mapper: F,
}

impl<'a, X: ?Sized, F> ExecutorPagingHandler<'a, X, F> {
    pub fn new(cb: &'a mut ConditionBean, executor: &'a X, mapper: F) -> Self {
        Self { cb, executor, mapper }
    }
}

impl<X, F, E> PagingHandler<E> for ExecutorPagingHandler<'_, X, F>
where
    X: SelectExecutor + ?Sized,
    F: FnMut(&Row) -> CBeanResult<E>,
{
    type Bean = ConditionBean;

    fn paging_bean(&mut self) -> &mut ConditionBean {
        &mut *self.cb
    }

    fn count(&mut self) -> CBeanResult<usize> {
        self.cb.set_paging(false);
        let count = self.cb.select_count(self.executor);
        self.cb.set_paging(true);
        count
    }

    fn paging(&mut self) -> CBeanResult<Vec<E>> {
        let sql = self.cb.to_select_sql()?;
        debug!(sql = %sql, "select page");
        let rows = self.executor.select_list(&sql)?;
        rows.iter().map(&mut self.mapper).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::CRAWLER_TABLES;
    use crate::value::Value;
    use dbflute_rs_core::CBeanSettings;
    use std::cell::RefCell;

    #[derive(Default)]
    struct Recording {
        statements: RefCell<Vec<String>>,
    }

    impl SelectExecutor for Recording {
        fn select_count(&self, sql: &BoundSql) -> CBeanResult<usize> {
            self.statements.borrow_mut().push(sql.sql.clone());
            Ok(3)
        }

        fn select_list(&self, sql: &BoundSql) -> CBeanResult<Vec<Row>> {
            self.statements.borrow_mut().push(sql.sql.clone());
            Ok(vec![Row::from_pairs([("ID", Value::from(1_i64))])])
        }
    }

    #[test]
    fn test_count_runs_without_fetch_and_order() {
        let mut cb = ConditionBean::with_settings(&CRAWLER_TABLES, "URL_FILTER", &CBeanSettings::default()).unwrap();
        cb.query().add_order_by_desc("ID").unwrap();
        cb.paging(2, 1).unwrap();
        let executor = Recording::default();
        let mut handler = ExecutorPagingHandler::new(&mut cb, &executor, |row: &Row| row.get::<i64>("ID"));
        assert_eq!(PagingHandler::<i64>::count(&mut handler).unwrap(), 3);
        assert_eq!(PagingHandler::<i64>::paging(&mut handler).unwrap(), vec![1]);
        let statements = executor.statements.borrow();
        assert_eq!(statements[0], "select count(*) from URL_FILTER dfloc");
        assert!(statements[1].ends_with("order by dfloc.ID desc limit 2"));
    }
}
