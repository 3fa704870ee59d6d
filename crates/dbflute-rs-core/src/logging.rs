//! Tracing setup and per-select spans.
//!
//! Every select a condition bean runs (count, list, page, scalar) executes
//! inside a [`query_span`] carrying the base table and the bean's purpose,
//! so the `sql` events emitted beneath it can be told apart when several
//! beans run at once.

use tracing_subscriber::EnvFilter;

use crate::settings::CBeanSettings;

/// Filter used when `log_level` is not a valid directive.
const FALLBACK_DIRECTIVE: &str = "info";

/// The kind of select a span covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectKind {
    /// `select count(*)`
    Count,
    /// A full list select.
    List,
    /// Count plus one page of rows.
    Page,
    /// An aggregate over one column.
    Scalar,
}

impl SelectKind {
    /// Lower-case name recorded on the span.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::List => "list",
            Self::Page => "page",
            Self::Scalar => "scalar",
        }
    }
}

/// Builds the event filter from `settings.log_level`.
///
/// An unparsable directive falls back to `info` instead of failing.
pub fn log_filter(settings: &CBeanSettings) -> EnvFilter {
    EnvFilter::try_new(&settings.log_level).unwrap_or_else(|_| EnvFilter::new(FALLBACK_DIRECTIVE))
}

/// Installs the global subscriber.
///
/// Debug settings get the pretty format with source locations; otherwise
/// events are JSON lines. A second call leaves the first subscriber in
/// place.
pub fn setup_logging(settings: &CBeanSettings) {
    use tracing_subscriber::fmt;

    let builder = fmt::Subscriber::builder()
        .with_env_filter(log_filter(settings))
        .with_target(true);
    let installed = if settings.debug {
        builder.with_file(true).with_line_number(true).pretty().try_init()
    } else {
        builder.json().try_init()
    };
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

/// Opens the span for one select against `table_db_name`.
///
/// `purpose` is the name of the bean's query purpose (`NormalUse` for a
/// top-level bean).
///
/// # Examples
///
/// ```
/// use dbflute_rs_core::logging::{query_span, SelectKind};
///
/// let _span = query_span("ACCESS_RESULT", "NormalUse", SelectKind::Page).entered();
/// tracing::debug!(sql = "select count(*) from ACCESS_RESULT dfloc", "select count");
/// ```
pub fn query_span(table_db_name: &str, purpose: &str, kind: SelectKind) -> tracing::Span {
    tracing::info_span!(
        "select",
        table = table_db_name,
        purpose = purpose,
        kind = kind.as_str()
    )
}
