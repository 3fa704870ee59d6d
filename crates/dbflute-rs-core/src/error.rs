//! Core error types for the dbflute-rs condition-bean engine.
//!
//! Every failure the query builder can raise is a variant of [`CBeanError`].
//! All of them are caller errors (bad query construction, bad paging input,
//! an unknown column in a dynamic path); none is transient, so no retry
//! policy exists in this layer.

use thiserror::Error;

/// The primary error type for the condition-bean engine.
///
/// Variants are grouped by the concern that raises them: condition
/// registration, purpose gating, or-scope grouping, paging, dynamic
/// invocation, metadata lookup, and the execution boundary.
///
/// # Examples
///
/// ```
/// use dbflute_rs_core::error::CBeanError;
///
/// let err = CBeanError::PagingPageSizeNotPlus { page_size: 0 };
/// assert_eq!(err.kind(), "paging_page_size_not_plus");
/// assert!(err.is_paging_error());
/// ```
#[derive(Error, Debug)]
pub enum CBeanError {
    // ── Condition registration ───────────────────────────────────────

    /// A condition was registered with a null, empty, or badly shaped
    /// value while "check invalid query" mode was enabled.
    #[error(
        "Invalid query registered: location={location} column={column} key={key} value={value}"
    )]
    InvalidQueryRegistered {
        /// Bind location of the rejected condition.
        location: String,
        /// Real column name (alias-qualified).
        column: String,
        /// Condition key name (e.g. `equal`).
        key: String,
        /// Display form of the rejected value.
        value: String,
    },

    // ── Purpose gating ───────────────────────────────────────────────

    /// The operation is not permitted for the bean's query purpose.
    #[error("Illegal operation '{operation}' for condition-bean purpose {purpose}")]
    IllegalPurpose {
        /// Name of the current purpose.
        purpose: String,
        /// The attempted operation.
        operation: String,
    },

    // ── Or-scope query ───────────────────────────────────────────────

    /// An and-part was nested too deep, or an or-split like-search was
    /// requested inside an open and-part.
    #[error("Or-scope query and-part unsupported: {0}")]
    OrScopeQueryAndPartUnsupported(String),

    /// An and-part (or an or-scope close) was requested without an open or-scope.
    #[error("Or-scope query is not opened: {0}")]
    OrScopeQueryNotOpened(String),

    /// An or-scope query was opened inside another one.
    #[error("Or-scope query cannot be nested: {0}")]
    OrScopeQueryNested(String),

    // ── Paging ───────────────────────────────────────────────────────

    /// Paging was invoked on a bean whose fetch scope is not effective.
    #[error("Paging status invalid: {0}")]
    PagingStatusInvalid(String),

    /// The all-record count exceeded the configured safety size during paging.
    #[error(
        "Paging over safety size: safetyMaxResultSize={safety_max_result_size} allRecordCount={all_record_count}"
    )]
    PagingOverSafetySize {
        /// The configured safety maximum.
        safety_max_result_size: usize,
        /// The counted (or derived) all-record count.
        all_record_count: usize,
    },

    /// A list select returned more rows than the configured safety size.
    #[error(
        "Dangerous result size: safetyMaxResultSize={safety_max_result_size} resultSize={result_size}"
    )]
    DangerousResultSize {
        /// The configured safety maximum.
        safety_max_result_size: usize,
        /// The number of rows actually fetched (at least maximum + 1).
        result_size: usize,
    },

    /// `paging()` was called with a non-positive page size.
    #[error("Page size for paging should not be minus or zero: pageSize={page_size}")]
    PagingPageSizeNotPlus {
        /// The rejected page size.
        page_size: i64,
    },

    /// Page navigation was requested with an unusable option.
    #[error("Illegal page navigation: {0}")]
    IllegalPageNavigation(String),

    // ── Dynamic invocation ───────────────────────────────────────────

    /// A string-addressed condition, order-by, or relation could not be resolved.
    #[error("Dynamic invocation failed: path={path} method={method}: {reason}")]
    DynamicInvocationFailure {
        /// The attempted column or property path.
        path: String,
        /// The resolved operation name.
        method: String,
        /// Why resolution failed.
        reason: String,
    },

    // ── Metadata ─────────────────────────────────────────────────────

    /// No table with the given name is registered.
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// The table has no column with the given name.
    #[error("Column not found: {table}.{column}")]
    ColumnNotFound {
        /// Table DB name.
        table: String,
        /// Requested column name.
        column: String,
    },

    /// The table has no foreign or referrer relation with the given property.
    #[error("Relation not found: {table}.{property}")]
    RelationNotFound {
        /// Table DB name.
        table: String,
        /// Requested relation property.
        property: String,
    },

    // ── Specify / column query ───────────────────────────────────────

    /// A sub-query or column query needs exactly one specified column.
    #[error("Invalid column specification: {0}")]
    SpecifyColumnInvalid(String),

    /// A specified column has a type the function cannot use.
    #[error("Specified column type unmatched: {0}")]
    SpecifyColumnTypeUnmatched(String),

    /// A column-query calculation was requested on a non-numeric operand.
    #[error("Column query calculation unsupported: {0}")]
    ColumnQueryCalculationUnsupported(String),

    /// Any other misuse of the condition-bean API.
    #[error("Illegal condition-bean operation: {0}")]
    IllegalConditionBeanOperation(String),

    // ── Execution boundary ───────────────────────────────────────────

    /// An executor or row-mapping failure.
    #[error("Execution error: {0}")]
    ExecutionError(String),

    // ── Configuration ────────────────────────────────────────────────

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    // ── IO ───────────────────────────────────────────────────────────

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl CBeanError {
    /// Returns a stable short code for this error kind.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidQueryRegistered { .. } => "invalid_query_registered",
            Self::IllegalPurpose { .. } => "illegal_purpose",
            Self::OrScopeQueryAndPartUnsupported(_) => "or_scope_query_and_part_unsupported",
            Self::OrScopeQueryNotOpened(_) => "or_scope_query_not_opened",
            Self::OrScopeQueryNested(_) => "or_scope_query_nested",
            Self::PagingStatusInvalid(_) => "paging_status_invalid",
            Self::PagingOverSafetySize { .. } => "paging_over_safety_size",
            Self::DangerousResultSize { .. } => "dangerous_result_size",
            Self::PagingPageSizeNotPlus { .. } => "paging_page_size_not_plus",
            Self::IllegalPageNavigation(_) => "illegal_page_navigation",
            Self::DynamicInvocationFailure { .. } => "dynamic_invocation_failure",
            Self::TableNotFound(_) => "table_not_found",
            Self::ColumnNotFound { .. } => "column_not_found",
            Self::RelationNotFound { .. } => "relation_not_found",
            Self::SpecifyColumnInvalid(_) => "specify_column_invalid",
            Self::SpecifyColumnTypeUnmatched(_) => "specify_column_type_unmatched",
            Self::ColumnQueryCalculationUnsupported(_) => "column_query_calculation_unsupported",
            Self::IllegalConditionBeanOperation(_) => "illegal_condition_bean_operation",
            Self::ExecutionError(_) => "execution_error",
            Self::ConfigurationError(_) => "configuration_error",
            Self::IoError(_) => "io_error",
        }
    }

    /// Returns `true` for the paging family of errors.
    pub const fn is_paging_error(&self) -> bool {
        matches!(
            self,
            Self::PagingStatusInvalid(_)
                | Self::PagingOverSafetySize { .. }
                | Self::PagingPageSizeNotPlus { .. }
        )
    }
}

/// A convenience type alias for `Result<T, CBeanError>`.
pub type CBeanResult<T> = Result<T, CBeanError>;
