//! SQL text with embedded, named bind parameters.
//!
//! Clauses stay as [`SqlFragment`]s (text runs interleaved with
//! [`BindParam`]s) until the whole statement is rendered, so sub-query and
//! union fragments can be moved between beans with their parameters intact.
//! Each parameter carries a dotted path such as
//! `conditionQuery.url.equal` that encodes where it was registered; union
//! partners get their paths rebased into a separate namespace before they
//! are merged.

use std::fmt;

use dbflute_rs_core::BindStyle;

use crate::value::Value;

/// A named bind parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct BindParam {
    /// Dotted location path (without the `pmb.` prefix).
    pub path: String,
    /// The bound value; a [`Value::List`] expands to one placeholder per element.
    pub value: Value,
}

/// One piece of a fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlPart {
    /// Literal SQL text.
    Text(String),
    /// A placeholder.
    Bind(BindParam),
}

/// A sequence of SQL text and bind parameters.
///
/// # Examples
///
/// ```
/// use dbflute_rs_cbean::sqlclause::fragment::SqlFragment;
/// use dbflute_rs_cbean::value::Value;
/// use dbflute_rs_core::BindStyle;
///
/// let frag = SqlFragment::text("dfloc.URL = ")
///     .with_bind("conditionQuery.url.equal", Value::from("http://a/"));
/// let bound = frag.to_bound(BindStyle::Numbered);
/// assert_eq!(bound.sql, "dfloc.URL = $1");
/// assert_eq!(bound.binds.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlFragment {
    parts: Vec<SqlPart>,
}

impl SqlFragment {
    /// Creates an empty fragment.
    pub const fn new() -> Self {
        Self { parts: Vec::new() }
    }

    /// Creates a fragment holding only text.
    pub fn text(text: impl Into<String>) -> Self {
        let mut frag = Self::new();
        frag.push_text(&text.into());
        frag
    }

    /// Appends text, merging with a trailing text run.
    pub fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(SqlPart::Text(last)) = self.parts.last_mut() {
            last.push_str(text);
        } else {
            self.parts.push(SqlPart::Text(text.to_string()));
        }
    }

    /// Appends a bind parameter.
    pub fn push_bind(&mut self, path: impl Into<String>, value: Value) {
        self.parts.push(SqlPart::Bind(BindParam {
            path: path.into(),
            value,
        }));
    }

    /// Appends another fragment.
    pub fn append(&mut self, other: Self) {
        for part in other.parts {
            match part {
                SqlPart::Text(t) => self.push_text(&t),
                SqlPart::Bind(b) => self.parts.push(SqlPart::Bind(b)),
            }
        }
    }

    /// Builder form of [`push_text`](Self::push_text).
    #[must_use]
    pub fn with_text(mut self, text: &str) -> Self {
        self.push_text(text);
        self
    }

    /// Builder form of [`push_bind`](Self::push_bind).
    #[must_use]
    pub fn with_bind(mut self, path: impl Into<String>, value: Value) -> Self {
        self.push_bind(path, value);
        self
    }

    /// Builder form of [`append`](Self::append).
    #[must_use]
    pub fn with_fragment(mut self, other: Self) -> Self {
        self.append(other);
        self
    }

    /// Surrounds the fragment with `open` and `close`.
    #[must_use]
    pub fn wrap(self, open: &str, close: &str) -> Self {
        Self::text(open).with_fragment(self).with_text(close)
    }

    /// Joins fragments with a separator.
    pub fn join(fragments: impl IntoIterator<Item = Self>, separator: &str) -> Self {
        let mut joined = Self::new();
        for (i, frag) in fragments.into_iter().enumerate() {
            if i > 0 {
                joined.push_text(separator);
            }
            joined.append(frag);
        }
        joined
    }

    /// Returns `true` if the fragment has no parts.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Returns the parts.
    pub fn parts(&self) -> &[SqlPart] {
        &self.parts
    }

    /// Iterates over the bind parameters in order.
    pub fn binds(&self) -> impl Iterator<Item = &BindParam> {
        self.parts.iter().filter_map(|p| match p {
            SqlPart::Bind(b) => Some(b),
            SqlPart::Text(_) => None,
        })
    }

    /// Rewrites bind paths starting with `from_prefix` to start with `to_prefix`.
    pub fn rebase_binds(&mut self, from_prefix: &str, to_prefix: &str) {
        for part in &mut self.parts {
            if let SqlPart::Bind(b) = part {
                if let Some(rest) = b.path.strip_prefix(from_prefix) {
                    b.path = format!("{to_prefix}{rest}");
                }
            }
        }
    }

    /// Replaces the value of every bind registered at `path`.
    ///
    /// Returns `true` if at least one bind was replaced.
    pub fn override_bind(&mut self, path: &str, value: &Value) -> bool {
        let mut replaced = false;
        for part in &mut self.parts {
            if let SqlPart::Bind(b) = part {
                if b.path == path {
                    b.value = value.clone();
                    replaced = true;
                }
            }
        }
        replaced
    }

    /// Renders the fragment with the given placeholder style.
    pub fn to_bound(&self, style: BindStyle) -> BoundSql {
        let mut bound = BoundSql::default();
        for part in &self.parts {
            match part {
                SqlPart::Text(t) => bound.sql.push_str(t),
                SqlPart::Bind(b) => bound.push_bind(style, b),
            }
        }
        bound
    }
}

impl fmt::Display for SqlFragment {
    /// Displays the fragment in two-way form, which keeps bind paths visible.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_bound(BindStyle::TwoWay).sql)
    }
}

/// A fully rendered statement: SQL text plus its ordered bind values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundSql {
    /// Rendered SQL text.
    pub sql: String,
    /// Bind parameters in placeholder order.
    pub binds: Vec<BindParam>,
}

impl BoundSql {
    /// Returns the bind values in placeholder order.
    pub fn values(&self) -> Vec<&Value> {
        self.binds.iter().map(|b| &b.value).collect()
    }

    /// Returns the bind paths in placeholder order.
    pub fn bind_paths(&self) -> Vec<&str> {
        self.binds.iter().map(|b| b.path.as_str()).collect()
    }

    fn push_bind(&mut self, style: BindStyle, bind: &BindParam) {
        match (style, &bind.value) {
            (BindStyle::TwoWay, Value::List(_)) => {
                self.sql.push_str(&format!("/*pmb.{}*/(null)", bind.path));
                self.binds.push(bind.clone());
            }
            (BindStyle::TwoWay, _) => {
                self.sql.push_str(&format!("/*pmb.{}*/null", bind.path));
                self.binds.push(bind.clone());
            }
            (_, Value::List(elements)) => {
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        self.sql.push_str(", ");
                    }
                    self.push_placeholder(style);
                    self.binds.push(BindParam {
                        path: format!("{}[{i}]", bind.path),
                        value: element.clone(),
                    });
                }
            }
            (_, _) => {
                self.push_placeholder(style);
                self.binds.push(bind.clone());
            }
        }
    }

    fn push_placeholder(&mut self, style: BindStyle) {
        match style {
            BindStyle::Numbered => {
                let n = self.binds.len() + 1;
                self.sql.push_str(&format!("${n}"));
            }
            BindStyle::Question | BindStyle::TwoWay => self.sql.push('?'),
        }
    }
}

impl fmt::Display for BoundSql {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn equal_fragment() -> SqlFragment {
        SqlFragment::text("dfloc.URL = ").with_bind("conditionQuery.url.equal", Value::from("u"))
    }

    #[test]
    fn test_text_runs_merge() {
        let frag = SqlFragment::text("a").with_text("b").with_text("");
        assert_eq!(frag.parts().len(), 1);
        assert_eq!(frag.to_bound(BindStyle::Question).sql, "ab");
    }

    #[test]
    fn test_question_style() {
        let bound = equal_fragment().to_bound(BindStyle::Question);
        assert_eq!(bound.sql, "dfloc.URL = ?");
        assert_eq!(bound.bind_paths(), vec!["conditionQuery.url.equal"]);
    }

    #[test]
    fn test_two_way_style() {
        let bound = equal_fragment().to_bound(BindStyle::TwoWay);
        assert_eq!(bound.sql, "dfloc.URL = /*pmb.conditionQuery.url.equal*/null");
    }

    #[test]
    fn test_list_expansion() {
        let frag = SqlFragment::text("dfloc.ID in (")
            .with_bind(
                "conditionQuery.id.inScope0",
                Value::List(vec![Value::Int(1), Value::Int(2)]),
            )
            .with_text(")");
        let numbered = frag.to_bound(BindStyle::Numbered);
        assert_eq!(numbered.sql, "dfloc.ID in ($1, $2)");
        assert_eq!(
            numbered.bind_paths(),
            vec!["conditionQuery.id.inScope0[0]", "conditionQuery.id.inScope0[1]"]
        );
        let two_way = frag.to_bound(BindStyle::TwoWay);
        assert_eq!(two_way.binds.len(), 1);
    }

    #[test]
    fn test_numbered_continues_across_fragments() {
        let frag = SqlFragment::join([equal_fragment(), equal_fragment()], " and ");
        let bound = frag.to_bound(BindStyle::Numbered);
        assert_eq!(bound.sql, "dfloc.URL = $1 and dfloc.URL = $2");
    }

    #[test]
    fn test_rebase_binds() {
        let mut frag = equal_fragment();
        frag.rebase_binds("conditionQuery.", "conditionQuery.unionQueryMap.unionQuery1.");
        assert_eq!(
            frag.binds().next().unwrap().path,
            "conditionQuery.unionQueryMap.unionQuery1.url.equal"
        );
    }

    #[test]
    fn test_override_bind() {
        let mut frag = equal_fragment();
        assert!(frag.override_bind("conditionQuery.url.equal", &Value::from("v")));
        assert!(!frag.override_bind("conditionQuery.url.notEqual", &Value::from("v")));
        assert_eq!(frag.binds().next().unwrap().value, Value::from("v"));
    }

    #[test]
    fn test_wrap() {
        let frag = SqlFragment::text("x").wrap("(", ")");
        assert_eq!(frag.to_string(), "(x)");
    }
}
