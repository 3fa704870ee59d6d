//! Integration tests for list, page and scalar selects.
//!
//! A recording executor stands in for the database: it serves a fixed
//! number of numbered rows, honors the `limit`/`offset` suffix of the
//! rendered statement, and records every statement it receives.

use std::sync::Mutex;

use dbflute_rs_cbean::prelude::*;
use dbflute_rs_cbean::sqlclause::BoundSql;

// ── Fake executor ─────────────────────────────────────────────────────

struct RecordingExecutor {
    total: usize,
    statements: Mutex<Vec<String>>,
}

impl RecordingExecutor {
    fn new(total: usize) -> Self {
        Self {
            total,
            statements: Mutex::new(Vec::new()),
        }
    }

    fn statements(&self) -> Vec<String> {
        self.statements.lock().unwrap().clone()
    }

    fn count_statements(&self) -> usize {
        self.statements()
            .iter()
            .filter(|sql| sql.starts_with("select count(*)"))
            .count()
    }

    fn window(sql: &str) -> (usize, Option<usize>) {
        let number_after = |keyword: &str| {
            sql.find(keyword).and_then(|i| {
                sql[i + keyword.len()..]
                    .split_whitespace()
                    .next()
                    .and_then(|n| n.parse::<usize>().ok())
            })
        };
        (number_after(" offset ").unwrap_or(0), number_after(" limit "))
    }
}

impl SelectExecutor for RecordingExecutor {
    fn select_count(&self, sql: &BoundSql) -> CBeanResult<usize> {
        self.statements.lock().unwrap().push(sql.sql.clone());
        Ok(self.total)
    }

    fn select_list(&self, sql: &BoundSql) -> CBeanResult<Vec<Row>> {
        self.statements.lock().unwrap().push(sql.sql.clone());
        let (offset, limit) = Self::window(&sql.sql);
        let end = limit.map_or(self.total, |l| (offset + l).min(self.total));
        Ok((offset.min(end)..end)
            .map(|i| {
                let id = i64::try_from(i + 1).unwrap();
                Row::from_pairs([
                    ("ID", Value::from(id)),
                    ("URL", Value::from(format!("http://example.com/{id}"))),
                ])
            })
            .collect())
    }
}

#[derive(Debug, Clone, PartialEq)]
struct UrlQueue {
    id: i64,
    url: String,
}

fn map_row(row: &Row) -> CBeanResult<UrlQueue> {
    Ok(UrlQueue {
        id: row.get("ID")?,
        url: row.get("URL")?,
    })
}

fn bean() -> ConditionBean {
    let mut cb = ConditionBean::with_settings(&CRAWLER_TABLES, "URL_QUEUE", &CBeanSettings::default()).unwrap();
    cb.query().set_equal("SESSION_ID", "crawl-1").unwrap();
    cb.query().add_order_by_asc("ID").unwrap();
    cb
}

// ── Page selects ──────────────────────────────────────────────────────

#[test]
fn test_zero_records() {
    let executor = RecordingExecutor::new(0);
    let mut cb = bean();
    cb.paging(20, 1).unwrap();
    let page = cb.select_page(&executor, map_row).unwrap();
    assert!(page.is_empty());
    assert_eq!(page.all_record_count(), 0);
    assert_eq!(page.all_page_count(), 1);
    assert!(!page.is_exist_pre_page());
    assert!(!page.is_exist_next_page());
    assert_eq!(executor.statements().len(), 1);
}

#[test]
fn test_last_page_of_three() {
    let executor = RecordingExecutor::new(47);
    let mut cb = bean();
    cb.paging(20, 3).unwrap();
    let page = cb.select_page(&executor, map_row).unwrap();
    assert_eq!(page.all_page_count(), 3);
    assert!(!page.is_exist_next_page());
    assert!(page.is_exist_pre_page());
    assert_eq!(page.current_start_record_number(), 41);
    assert_eq!(page.current_end_record_number(), 47);
    assert_eq!(page.selected_list()[0].id, 41);
    assert_eq!(page.order_by_description(), "order by dfloc.ID asc");

    let statements = executor.statements();
    assert_eq!(
        statements[0],
        "select count(*) from URL_QUEUE dfloc where dfloc.SESSION_ID = ?"
    );
    assert!(statements[1].ends_with("order by dfloc.ID asc limit 20 offset 40"));
    assert!(cb.is_paging());
    assert!(cb.to_select_sql().unwrap().sql.ends_with("limit 20 offset 40"));
}

#[test]
fn test_count_later_skips_count_on_last_page() {
    let executor = RecordingExecutor::new(17);
    let mut cb = bean();
    cb.enable_count_later();
    cb.paging(10, 2).unwrap();
    let page = cb.select_page(&executor, map_row).unwrap();
    assert_eq!(page.len(), 7);
    assert_eq!(page.all_record_count(), 17);
    assert_eq!(executor.count_statements(), 0);
}

#[test]
fn test_count_later_counts_on_full_page() {
    let executor = RecordingExecutor::new(40);
    let mut cb = bean();
    cb.enable_count_later();
    cb.paging(10, 2).unwrap();
    let page = cb.select_page(&executor, map_row).unwrap();
    assert_eq!(page.all_record_count(), 40);
    assert_eq!(executor.count_statements(), 1);
}

#[test]
fn test_page_beyond_last_is_reselected() {
    let executor = RecordingExecutor::new(25);
    let mut cb = bean();
    cb.paging(10, 9).unwrap();
    let page = cb.select_page(&executor, map_row).unwrap();
    assert_eq!(page.current_page_number(), 3);
    assert_eq!(page.len(), 5);
    assert_eq!(executor.count_statements(), 2);
    let range = page.page_range(PageRangeOption::new(1)).unwrap();
    assert_eq!(range.page_number_list(), &[2, 3]);
}

#[test]
fn test_paging_safety_size() {
    let executor = RecordingExecutor::new(101);
    let settings = CBeanSettings {
        safety_max_result_size: 100,
        ..CBeanSettings::default()
    };
    let mut cb = ConditionBean::with_settings(&CRAWLER_TABLES, "URL_QUEUE", &settings).unwrap();
    cb.paging(10, 1).unwrap();
    let err = cb.select_page(&executor, map_row).unwrap_err();
    assert!(matches!(
        err,
        CBeanError::PagingOverSafetySize {
            safety_max_result_size: 100,
            all_record_count: 101,
        }
    ));
    assert_eq!(executor.statements().len(), 1);
    assert!(cb.is_paging());
}

#[test]
fn test_page_select_without_paging() {
    let executor = RecordingExecutor::new(5);
    let mut cb = bean();
    let err = cb.select_page(&executor, map_row).unwrap_err();
    assert_eq!(err.kind(), "paging_status_invalid");
    assert!(executor.statements().is_empty());
}

#[test]
fn test_mapper_error_propagates() {
    let executor = RecordingExecutor::new(5);
    let mut cb = bean();
    cb.paging(10, 1).unwrap();
    let err = cb
        .select_page(&executor, |row: &Row| row.get::<i64>("URL"))
        .unwrap_err();
    assert_eq!(err.kind(), "execution_error");
}

// ── List selects ──────────────────────────────────────────────────────

#[test]
fn test_select_list() {
    let executor = RecordingExecutor::new(3);
    let mut cb = bean();
    let list = cb.select_list(&executor, map_row).unwrap();
    assert_eq!(list.all_record_count(), 3);
    assert_eq!(list.table_db_name(), "URL_QUEUE");
    assert_eq!(list.selected_list()[2].url, "http://example.com/3");
    assert!(!executor.statements()[0].contains("limit"));
}

#[test]
fn test_select_list_safety_size() {
    let executor = RecordingExecutor::new(11);
    let settings = CBeanSettings {
        safety_max_result_size: 10,
        ..CBeanSettings::default()
    };
    let mut cb = ConditionBean::with_settings(&CRAWLER_TABLES, "URL_QUEUE", &settings).unwrap();
    let err = cb.select_list(&executor, map_row).unwrap_err();
    assert!(matches!(
        err,
        CBeanError::DangerousResultSize {
            safety_max_result_size: 10,
            result_size: 11,
        }
    ));
    assert!(executor.statements()[0].ends_with("limit 11"));
    assert!(!cb.is_fetch_scope_effective());

    let executor = RecordingExecutor::new(10);
    let list = cb.select_list(&executor, map_row).unwrap();
    assert_eq!(list.len(), 10);
}

#[test]
fn test_select_count() {
    let executor = RecordingExecutor::new(42);
    let cb = bean();
    assert_eq!(cb.select_count(&executor).unwrap(), 42);
    assert_eq!(
        executor.statements(),
        vec!["select count(*) from URL_QUEUE dfloc where dfloc.SESSION_ID = ?".to_string()]
    );
}

#[test]
fn test_select_scalar() {
    struct ScalarExecutor;

    impl SelectExecutor for ScalarExecutor {
        fn select_count(&self, _sql: &BoundSql) -> CBeanResult<usize> {
            Ok(0)
        }

        fn select_list(&self, sql: &BoundSql) -> CBeanResult<Vec<Row>> {
            assert!(sql.sql.starts_with("select max(dfloc.DEPTH) as SCALAR_VALUE from URL_QUEUE dfloc"));
            Ok(vec![Row::from_pairs([("SCALAR_VALUE", Value::from(4_i64))])])
        }
    }

    let mut cb = bean();
    let max = cb
        .select_scalar(&ScalarExecutor, DerivedFunction::Max, |cb| {
            cb.specify()?.column("DEPTH")?;
            Ok(())
        })
        .unwrap();
    assert_eq!(max, Value::Int(4));
}
