//! Settings for the condition-bean engine.
//!
//! [`CBeanSettings`] holds the process-wide defaults that every new condition
//! bean starts from (in-scope split limit, invalid-query policy, paging
//! behavior, bind placeholder style). [`LazySettings`] is a globally
//! accessible, set-once container for them.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// Placeholder style used when a clause is rendered to SQL text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindStyle {
    /// JDBC-style `?` placeholders.
    #[default]
    Question,
    /// PostgreSQL-style `$1`, `$2`, ... placeholders.
    Numbered,
    /// Two-way SQL comments: `/*pmb.conditionQuery.url.equal*/null`.
    TwoWay,
}

impl fmt::Display for BindStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Question => "question",
            Self::Numbered => "numbered",
            Self::TwoWay => "two_way",
        };
        f.write_str(name)
    }
}

impl FromStr for BindStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "question" | "?" => Ok(Self::Question),
            "numbered" | "$" => Ok(Self::Numbered),
            "two_way" | "twoway" | "two-way" => Ok(Self::TwoWay),
            other => Err(format!("unknown bind style: {other}")),
        }
    }
}

/// Defaults applied to every newly created condition bean.
///
/// # Examples
///
/// ```
/// use dbflute_rs_core::settings::CBeanSettings;
///
/// let s = CBeanSettings::default();
/// assert_eq!(s.in_scope_limit, 0);
/// assert!(!s.check_invalid_query);
/// assert!(s.paging_reselect);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CBeanSettings {
    /// Maximum element count of one `in (...)` list; 0 means unlimited.
    pub in_scope_limit: usize,
    /// Raise on invalid (null, empty) condition values instead of skipping them.
    pub check_invalid_query: bool,
    /// Treat empty strings as legal condition values.
    pub allow_empty_string_query: bool,
    /// Safety maximum for list selects and paging counts; 0 disables the check.
    pub safety_max_result_size: usize,
    /// Fetch before counting during paging.
    pub count_later: bool,
    /// Re-select the last page when a requested page is beyond the end.
    pub paging_reselect: bool,
    /// Escape character for like-search options that escape by default.
    pub like_search_escape: char,
    /// Placeholder style of rendered SQL.
    pub bind_style: BindStyle,
    /// Tracing filter directive (e.g. "info", "dbflute_rs_cbean=debug").
    pub log_level: String,
    /// Human-readable logging instead of JSON.
    pub debug: bool,
    /// Free-form extension values.
    pub extra: HashMap<String, serde_json::Value>,
}

impl Default for CBeanSettings {
    fn default() -> Self {
        Self {
            in_scope_limit: 0,
            check_invalid_query: false,
            allow_empty_string_query: false,
            safety_max_result_size: 0,
            count_later: false,
            paging_reselect: true,
            like_search_escape: '|',
            bind_style: BindStyle::Question,
            log_level: "info".to_string(),
            debug: false,
            extra: HashMap::new(),
        }
    }
}

/// A lazily-initialized, globally-accessible settings container.
///
/// Call [`configure`](LazySettings::configure) once at startup. Condition
/// beans read their defaults through
/// [`get_or_default`](LazySettings::get_or_default), so an unconfigured
/// process simply runs with [`CBeanSettings::default`].
pub struct LazySettings {
    inner: OnceLock<CBeanSettings>,
}

impl Default for LazySettings {
    fn default() -> Self {
        Self::new()
    }
}

impl LazySettings {
    /// Creates a new, unconfigured `LazySettings`.
    pub const fn new() -> Self {
        Self {
            inner: OnceLock::new(),
        }
    }

    /// Configures the global settings. Must be called at most once.
    ///
    /// # Panics
    ///
    /// Panics if settings have already been configured.
    pub fn configure(&self, settings: CBeanSettings) {
        self.inner
            .set(settings)
            .expect("Settings have already been configured");
    }

    /// Returns a reference to the configured settings.
    ///
    /// # Panics
    ///
    /// Panics if settings have not been configured.
    pub fn get(&self) -> &CBeanSettings {
        self.inner
            .get()
            .expect("Settings have not been configured. Call SETTINGS.configure() first.")
    }

    /// Returns a copy of the configured settings, or the defaults.
    pub fn get_or_default(&self) -> CBeanSettings {
        self.inner.get().cloned().unwrap_or_default()
    }

    /// Returns `true` if settings have been configured.
    pub fn is_configured(&self) -> bool {
        self.inner.get().is_some()
    }
}

/// The global settings instance.
pub static SETTINGS: LazySettings = LazySettings::new();
