//! Metadata for the crawler persistence schema.
//!
//! Four tables back the crawler: `ACCESS_RESULT` (one row per fetched URL),
//! `ACCESS_RESULT_DATA` (the transformed body of an access result, sharing
//! its primary key), `URL_QUEUE` (pending URLs per session) and `URL_FILTER`
//! (include/exclude patterns per session).
//!
//! # Examples
//!
//! ```
//! use dbflute_rs_cbean::tables::{self, CRAWLER_TABLES};
//!
//! let meta = CRAWLER_TABLES.table("access_result").unwrap();
//! assert_eq!(meta.table_db_name, tables::ACCESS_RESULT.table_db_name);
//! ```

use once_cell::sync::Lazy;

use crate::meta::{ColumnInfo, ColumnType, ForeignInfo, MetaRegistry, ReferrerInfo, TableMeta};

// ── ACCESS_RESULT ──────────────────────────────────────────────────────

static ACCESS_RESULT_COLUMNS: [ColumnInfo; 13] = [
    ColumnInfo::new("ID", "id", ColumnType::BigInt).primary(),
    ColumnInfo::new("SESSION_ID", "sessionId", ColumnType::Varchar).not_null(),
    ColumnInfo::new("RULE_ID", "ruleId", ColumnType::Varchar),
    ColumnInfo::new("URL", "url", ColumnType::Varchar).not_null(),
    ColumnInfo::new("PARENT_URL", "parentUrl", ColumnType::Varchar),
    ColumnInfo::new("STATUS", "status", ColumnType::Integer).not_null(),
    ColumnInfo::new("HTTP_STATUS_CODE", "httpStatusCode", ColumnType::Integer).not_null(),
    ColumnInfo::new("METHOD", "method", ColumnType::Varchar).not_null(),
    ColumnInfo::new("MIME_TYPE", "mimeType", ColumnType::Varchar).not_null(),
    ColumnInfo::new("CONTENT_LENGTH", "contentLength", ColumnType::BigInt).not_null(),
    ColumnInfo::new("EXECUTION_TIME", "executionTime", ColumnType::Integer).not_null(),
    ColumnInfo::new("LAST_MODIFIED", "lastModified", ColumnType::Timestamp).not_null(),
    ColumnInfo::new("CREATE_TIME", "createTime", ColumnType::Timestamp).not_null(),
];

static ACCESS_RESULT_FOREIGNS: [ForeignInfo; 1] = [ForeignInfo {
    property_name: "accessResultDataAsOne",
    foreign_table: "ACCESS_RESULT_DATA",
    column_pairs: &[("ID", "ID")],
    one_to_one: true,
}];

static ACCESS_RESULT_REFERRERS: [ReferrerInfo; 1] = [ReferrerInfo {
    property_name: "accessResultDataList",
    referrer_table: "ACCESS_RESULT_DATA",
    column_pairs: &[("ID", "ID")],
}];

/// One fetched URL and its HTTP outcome.
pub static ACCESS_RESULT: TableMeta = TableMeta {
    table_db_name: "ACCESS_RESULT",
    table_property_name: "accessResult",
    columns: &ACCESS_RESULT_COLUMNS,
    foreign_infos: &ACCESS_RESULT_FOREIGNS,
    referrer_infos: &ACCESS_RESULT_REFERRERS,
};

// ── ACCESS_RESULT_DATA ─────────────────────────────────────────────────

static ACCESS_RESULT_DATA_COLUMNS: [ColumnInfo; 4] = [
    ColumnInfo::new("ID", "id", ColumnType::BigInt).primary(),
    ColumnInfo::new("TRANSFORMER_NAME", "transformerName", ColumnType::Varchar).not_null(),
    ColumnInfo::new("DATA", "data", ColumnType::Blob),
    ColumnInfo::new("ENCODING", "encoding", ColumnType::Varchar),
];

static ACCESS_RESULT_DATA_FOREIGNS: [ForeignInfo; 1] = [ForeignInfo {
    property_name: "accessResult",
    foreign_table: "ACCESS_RESULT",
    column_pairs: &[("ID", "ID")],
    one_to_one: false,
}];

/// Transformed content of an access result.
pub static ACCESS_RESULT_DATA: TableMeta = TableMeta {
    table_db_name: "ACCESS_RESULT_DATA",
    table_property_name: "accessResultData",
    columns: &ACCESS_RESULT_DATA_COLUMNS,
    foreign_infos: &ACCESS_RESULT_DATA_FOREIGNS,
    referrer_infos: &[],
};

// ── URL_QUEUE ──────────────────────────────────────────────────────────

static URL_QUEUE_COLUMNS: [ColumnInfo; 8] = [
    ColumnInfo::new("ID", "id", ColumnType::BigInt).primary(),
    ColumnInfo::new("SESSION_ID", "sessionId", ColumnType::Varchar).not_null(),
    ColumnInfo::new("METHOD", "method", ColumnType::Varchar).not_null(),
    ColumnInfo::new("URL", "url", ColumnType::Varchar).not_null(),
    ColumnInfo::new("PARENT_URL", "parentUrl", ColumnType::Varchar),
    ColumnInfo::new("DEPTH", "depth", ColumnType::Integer).not_null(),
    ColumnInfo::new("LAST_MODIFIED", "lastModified", ColumnType::Timestamp),
    ColumnInfo::new("CREATE_TIME", "createTime", ColumnType::Timestamp).not_null(),
];

/// URLs waiting to be crawled.
pub static URL_QUEUE: TableMeta = TableMeta {
    table_db_name: "URL_QUEUE",
    table_property_name: "urlQueue",
    columns: &URL_QUEUE_COLUMNS,
    foreign_infos: &[],
    referrer_infos: &[],
};

// ── URL_FILTER ─────────────────────────────────────────────────────────

static URL_FILTER_COLUMNS: [ColumnInfo; 5] = [
    ColumnInfo::new("ID", "id", ColumnType::BigInt).primary(),
    ColumnInfo::new("SESSION_ID", "sessionId", ColumnType::Varchar).not_null(),
    ColumnInfo::new("URL", "url", ColumnType::Varchar).not_null(),
    ColumnInfo::new("FILTER_TYPE", "filterType", ColumnType::Varchar).not_null(),
    ColumnInfo::new("CREATE_TIME", "createTime", ColumnType::Timestamp).not_null(),
];

/// Include/exclude URL patterns of a crawl session.
pub static URL_FILTER: TableMeta = TableMeta {
    table_db_name: "URL_FILTER",
    table_property_name: "urlFilter",
    columns: &URL_FILTER_COLUMNS,
    foreign_infos: &[],
    referrer_infos: &[],
};

/// Registry of every crawler table.
pub static CRAWLER_TABLES: Lazy<MetaRegistry> = Lazy::new(|| {
    let mut registry = MetaRegistry::new();
    registry.register(&ACCESS_RESULT);
    registry.register(&ACCESS_RESULT_DATA);
    registry.register(&URL_QUEUE);
    registry.register(&URL_FILTER);
    registry
});
