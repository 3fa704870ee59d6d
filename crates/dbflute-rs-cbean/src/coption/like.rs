//! Like-search option.

use std::fmt;

/// Where the `%` wildcard goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wildcard {
    Prefix,
    Suffix,
    Contain,
}

/// How a search string is split into tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SplitBy {
    Space,
    SpaceContainsDoubleByte,
    PipeLine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CaseConversion {
    Upper,
    Lower,
}

/// Refines a like-search condition.
///
/// `like_prefix`, `like_suffix` and `like_contain` place the wildcard and
/// turn on escaping by pipe line, so literal `%` and `_` in the value match
/// themselves. Split modes turn one value into several like-conditions,
/// combined with `and` unless [`as_or_split`](Self::as_or_split) is set.
///
/// # Examples
///
/// ```
/// use dbflute_rs_cbean::coption::LikeSearchOption;
///
/// let option = LikeSearchOption::new().like_contain();
/// assert_eq!(option.generate_real_value("100%"), "%100|%%");
/// assert_eq!(option.rear_option(), " escape '|'");
///
/// let option = LikeSearchOption::new().like_prefix().split_by_space();
/// assert_eq!(option.split_values("seasar  robot"), vec!["seasar", "robot"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LikeSearchOption {
    wildcard: Option<Wildcard>,
    escape: Option<char>,
    escape_chosen: bool,
    split: Option<SplitBy>,
    split_limit: usize,
    as_or_split: bool,
    case: Option<CaseConversion>,
}

impl LikeSearchOption {
    /// Creates an option with no wildcard, no escape and no split.
    pub fn new() -> Self {
        Self::default()
    }

    /// `value%`
    #[must_use]
    pub const fn like_prefix(mut self) -> Self {
        self.wildcard = Some(Wildcard::Prefix);
        self.auto_escape()
    }

    /// `%value`
    #[must_use]
    pub const fn like_suffix(mut self) -> Self {
        self.wildcard = Some(Wildcard::Suffix);
        self.auto_escape()
    }

    /// `%value%`
    #[must_use]
    pub const fn like_contain(mut self) -> Self {
        self.wildcard = Some(Wildcard::Contain);
        self.auto_escape()
    }

    const fn auto_escape(mut self) -> Self {
        if !self.escape_chosen {
            self.escape = Some('|');
        }
        self
    }

    /// Escapes with `|`.
    #[must_use]
    pub const fn escape_by_pipe_line(self) -> Self {
        self.escape_by('|')
    }

    /// Escapes with `@`.
    #[must_use]
    pub const fn escape_by_at_mark(self) -> Self {
        self.escape_by('@')
    }

    /// Escapes with `/`.
    #[must_use]
    pub const fn escape_by_slash(self) -> Self {
        self.escape_by('/')
    }

    /// Escapes with `\`.
    #[must_use]
    pub const fn escape_by_back_slash(self) -> Self {
        self.escape_by('\\')
    }

    /// Escapes with an arbitrary character.
    #[must_use]
    pub const fn escape_by(mut self, escape: char) -> Self {
        self.escape = Some(escape);
        self.escape_chosen = true;
        self
    }

    /// Disables escaping.
    #[must_use]
    pub const fn not_escape(mut self) -> Self {
        self.escape = None;
        self.escape_chosen = true;
        self
    }

    /// Splits by half-width space.
    #[must_use]
    pub const fn split_by_space(mut self) -> Self {
        self.split = Some(SplitBy::Space);
        self
    }

    /// Splits by half-width and full-width (U+3000) space.
    #[must_use]
    pub const fn split_by_space_contains_double_byte(mut self) -> Self {
        self.split = Some(SplitBy::SpaceContainsDoubleByte);
        self
    }

    /// Splits by `|`.
    #[must_use]
    pub const fn split_by_pipe_line(mut self) -> Self {
        self.split = Some(SplitBy::PipeLine);
        self
    }

    /// Keeps at most `limit` tokens (0 means unlimited).
    #[must_use]
    pub const fn limit_split(mut self, limit: usize) -> Self {
        self.split_limit = limit;
        self
    }

    /// Combines split tokens with `or` instead of `and`.
    #[must_use]
    pub const fn as_or_split(mut self) -> Self {
        self.as_or_split = true;
        self
    }

    /// Upper-cases the value before matching.
    #[must_use]
    pub const fn to_upper_case(mut self) -> Self {
        self.case = Some(CaseConversion::Upper);
        self
    }

    /// Lower-cases the value before matching.
    #[must_use]
    pub const fn to_lower_case(mut self) -> Self {
        self.case = Some(CaseConversion::Lower);
        self
    }

    /// Whether a split mode is set.
    pub const fn is_split(&self) -> bool {
        self.split.is_some()
    }

    /// Whether split tokens are or-combined.
    pub const fn is_as_or_split(&self) -> bool {
        self.as_or_split
    }

    /// The escape character, if escaping is on.
    pub const fn escape_char(&self) -> Option<char> {
        self.escape
    }

    /// Replaces the automatic escape character of a wildcard option.
    ///
    /// Used to apply the configured default escape. An escape picked with
    /// [`escape_by`](Self::escape_by) or [`not_escape`](Self::not_escape)
    /// is kept as is.
    #[must_use]
    pub const fn with_default_escape(mut self, escape: char) -> Self {
        if self.escape.is_some() && !self.escape_chosen {
            self.escape = Some(escape);
        }
        self
    }

    /// Splits a value into trimmed, non-empty tokens.
    ///
    /// Without a split mode the whole value is the single token.
    pub fn split_values(&self, value: &str) -> Vec<String> {
        let Some(split) = self.split else {
            return vec![value.to_string()];
        };
        let tokens = value.split(|c: char| match split {
            SplitBy::Space => c == ' ',
            SplitBy::SpaceContainsDoubleByte => c == ' ' || c == '\u{3000}',
            SplitBy::PipeLine => c == '|',
        });
        let tokens = tokens
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        if self.split_limit > 0 {
            tokens.take(self.split_limit).collect()
        } else {
            tokens.collect()
        }
    }

    /// Applies case conversion, escaping, and wildcard placement.
    pub fn generate_real_value(&self, value: &str) -> String {
        let mut real = match self.case {
            Some(CaseConversion::Upper) => value.to_uppercase(),
            Some(CaseConversion::Lower) => value.to_lowercase(),
            None => value.to_string(),
        };
        if let Some(esc) = self.escape {
            let mut escaped = String::with_capacity(real.len());
            for c in real.chars() {
                if c == esc || c == '%' || c == '_' {
                    escaped.push(esc);
                }
                escaped.push(c);
            }
            real = escaped;
        }
        match self.wildcard {
            Some(Wildcard::Prefix) => format!("{real}%"),
            Some(Wildcard::Suffix) => format!("%{real}"),
            Some(Wildcard::Contain) => format!("%{real}%"),
            None => real,
        }
    }

    /// The clause suffix, ` escape 'c'` when escaping is on.
    pub fn rear_option(&self) -> String {
        self.escape
            .map(|esc| format!(" escape '{esc}'"))
            .unwrap_or_default()
    }
}

impl fmt::Display for LikeSearchOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "like={:?}, escape={:?}, split={}, asOrSplit={}",
            self.wildcard,
            self.escape,
            self.is_split(),
            self.as_or_split
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_suffix_contain() {
        assert_eq!(LikeSearchOption::new().like_prefix().generate_real_value("ab"), "ab%");
        assert_eq!(LikeSearchOption::new().like_suffix().generate_real_value("ab"), "%ab");
        assert_eq!(LikeSearchOption::new().like_contain().generate_real_value("ab"), "%ab%");
    }

    #[test]
    fn test_escape_special_chars() {
        let option = LikeSearchOption::new().like_prefix();
        assert_eq!(option.generate_real_value("a_b|c%"), "a|_b||c|%%");
    }

    #[test]
    fn test_not_escape() {
        let option = LikeSearchOption::new().like_prefix().not_escape();
        assert_eq!(option.generate_real_value("a_b"), "a_b%");
        assert_eq!(option.rear_option(), "");
    }

    #[test]
    fn test_other_escape_chars() {
        assert_eq!(
            LikeSearchOption::new().like_prefix().escape_by_at_mark().rear_option(),
            " escape '@'"
        );
        assert_eq!(
            LikeSearchOption::new().escape_by_slash().generate_real_value("5%"),
            "5/%"
        );
        assert_eq!(
            LikeSearchOption::new().escape_by_back_slash().escape_char(),
            Some('\\')
        );
    }

    #[test]
    fn test_default_escape_only_when_escaping() {
        let option = LikeSearchOption::new().like_prefix().with_default_escape('#');
        assert_eq!(option.escape_char(), Some('#'));
        let option = LikeSearchOption::new().with_default_escape('#');
        assert_eq!(option.escape_char(), None);
    }

    #[test]
    fn test_default_escape_keeps_chosen_escape() {
        let option = LikeSearchOption::new()
            .like_prefix()
            .escape_by_at_mark()
            .with_default_escape('|');
        assert_eq!(option.escape_char(), Some('@'));
        assert_eq!(option.generate_real_value("100%"), "100@%%");

        let option = LikeSearchOption::new().escape_by_slash().like_contain();
        assert_eq!(option.with_default_escape('|').escape_char(), Some('/'));

        let option = LikeSearchOption::new().like_prefix().not_escape();
        assert_eq!(option.with_default_escape('|').escape_char(), None);
    }

    #[test]
    fn test_split_modes() {
        let by_space = LikeSearchOption::new().split_by_space();
        assert_eq!(by_space.split_values(" a  b "), vec!["a", "b"]);

        let double_byte = LikeSearchOption::new().split_by_space_contains_double_byte();
        assert_eq!(double_byte.split_values("a\u{3000}b c"), vec!["a", "b", "c"]);

        let pipe = LikeSearchOption::new().split_by_pipe_line();
        assert_eq!(pipe.split_values("a|b||c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_split_limit() {
        let option = LikeSearchOption::new().split_by_space().limit_split(2);
        assert_eq!(option.split_values("a b c d"), vec!["a", "b"]);
    }

    #[test]
    fn test_no_split_keeps_value() {
        let option = LikeSearchOption::new();
        assert!(!option.is_split());
        assert_eq!(option.split_values("a b"), vec!["a b"]);
    }

    #[test]
    fn test_case_conversion() {
        assert_eq!(
            LikeSearchOption::new().to_upper_case().generate_real_value("Http"),
            "HTTP"
        );
        assert_eq!(
            LikeSearchOption::new().to_lower_case().like_prefix().generate_real_value("Http"),
            "http%"
        );
    }
}
