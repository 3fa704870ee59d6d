//! Or-scope grouping state.

use dbflute_rs_core::{CBeanError, CBeanResult};

/// Where the bean stands in or-scope grouping.
///
/// ```text
/// Normal --begin_or_scope--> OrScopeOpen --begin_and_part--> OrScopeAndPartOpen
///   ^                          |    ^                              |
///   +-------end_or_scope-------+    +---------end_and_part---------+
/// ```
///
/// Every other transition is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrScopeState {
    /// Conditions combine with `and`.
    #[default]
    Normal,
    /// Conditions combine with `or`.
    OrScopeOpen,
    /// Conditions combine with `and` inside one `or` branch.
    OrScopeAndPartOpen,
}

impl OrScopeState {
    /// Opens an or-scope.
    pub fn begin_or_scope(self) -> CBeanResult<Self> {
        match self {
            Self::Normal => Ok(Self::OrScopeOpen),
            Self::OrScopeOpen | Self::OrScopeAndPartOpen => Err(CBeanError::OrScopeQueryNested(
                "an or-scope query is already open".to_string(),
            )),
        }
    }

    /// Opens an and-part inside the current or-scope.
    pub fn begin_and_part(self) -> CBeanResult<Self> {
        match self {
            Self::OrScopeOpen => Ok(Self::OrScopeAndPartOpen),
            Self::Normal => Err(CBeanError::OrScopeQueryNotOpened(
                "and-part requires an open or-scope query".to_string(),
            )),
            Self::OrScopeAndPartOpen => Err(CBeanError::OrScopeQueryAndPartUnsupported(
                "and-part cannot be nested in another and-part".to_string(),
            )),
        }
    }

    /// Closes the current and-part.
    pub fn end_and_part(self) -> CBeanResult<Self> {
        match self {
            Self::OrScopeAndPartOpen => Ok(Self::OrScopeOpen),
            Self::Normal | Self::OrScopeOpen => Err(CBeanError::OrScopeQueryNotOpened(
                "no and-part is open".to_string(),
            )),
        }
    }

    /// Closes the current or-scope.
    pub fn end_or_scope(self) -> CBeanResult<Self> {
        match self {
            Self::OrScopeOpen => Ok(Self::Normal),
            Self::Normal => Err(CBeanError::OrScopeQueryNotOpened(
                "no or-scope query is open".to_string(),
            )),
            Self::OrScopeAndPartOpen => Err(CBeanError::OrScopeQueryAndPartUnsupported(
                "the and-part must be closed before the or-scope".to_string(),
            )),
        }
    }

    /// Whether an or-scope (with or without an and-part) is open.
    pub const fn is_or_scope(self) -> bool {
        !matches!(self, Self::Normal)
    }

    /// Whether an and-part is open.
    pub const fn is_and_part(self) -> bool {
        matches!(self, Self::OrScopeAndPartOpen)
    }
}
