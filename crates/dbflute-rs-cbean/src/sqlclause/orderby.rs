//! Order-by elements.

use crate::value::Value;

/// Placement of nulls relative to other values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullsOrder {
    /// `nulls first`
    First,
    /// `nulls last`
    Last,
}

/// One order-by element.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderByElement {
    /// Qualified column, e.g. `dfrel_0.ENCODING`.
    pub column_full_name: String,
    /// Alias of the column in the select list, used when unions exist.
    pub select_alias: String,
    /// Ascending order.
    pub ascending: bool,
    /// Nulls placement, if any.
    pub nulls: Option<NullsOrder>,
    /// Manual rank list.
    pub manual_values: Vec<Value>,
}

impl OrderByElement {
    /// Creates an element without nulls handling or manual order.
    pub fn new(column_full_name: impl Into<String>, select_alias: impl Into<String>, ascending: bool) -> Self {
        Self {
            column_full_name: column_full_name.into(),
            select_alias: select_alias.into(),
            ascending,
            nulls: None,
            manual_values: Vec::new(),
        }
    }

    const fn direction(&self) -> &'static str {
        if self.ascending {
            "asc"
        } else {
            "desc"
        }
    }

    /// Renders the element against `column` (the full name or select alias).
    ///
    /// A manual order becomes a `case` expression ranking listed values by
    /// position; unlisted values get the rank after the last one. A null
    /// entry renders no branch but still takes its position.
    pub fn render(&self, column: &str) -> String {
        if !self.manual_values.is_empty() {
            let mut sql = String::from("case");
            for (index, value) in self.manual_values.iter().enumerate() {
                if value.is_null() {
                    continue;
                }
                sql.push_str(&format!(
                    " when {column} = {} then {index}",
                    value.to_sql_literal()
                ));
            }
            let rest = self.manual_values.len();
            sql.push_str(&format!(" else {rest} end {}", self.direction()));
            return sql;
        }
        let base = format!("{column} {}", self.direction());
        match self.nulls {
            Some(NullsOrder::First) => format!("{base} nulls first"),
            Some(NullsOrder::Last) => format!("{base} nulls last"),
            None => base,
        }
    }
}

/// The ordered list of order-by elements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderByClause {
    elements: Vec<OrderByElement>,
}

impl OrderByClause {
    /// Appends an element.
    pub fn add(&mut self, element: OrderByElement) {
        self.elements.push(element);
    }

    /// The most recently added element.
    pub fn last_mut(&mut self) -> Option<&mut OrderByElement> {
        self.elements.last_mut()
    }

    /// Returns the elements.
    pub fn elements(&self) -> &[OrderByElement] {
        &self.elements
    }

    /// Whether any manual order is registered.
    pub fn has_manual_order(&self) -> bool {
        self.elements.iter().any(|e| !e.manual_values.is_empty())
    }

    /// Whether no element is registered.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Removes every element.
    pub fn clear(&mut self) {
        self.elements.clear();
    }

    /// Renders `order by ...`; `use_alias` switches to select aliases.
    pub fn render(&self, use_alias: bool) -> String {
        if self.elements.is_empty() {
            return String::new();
        }
        let parts: Vec<String> = self
            .elements
            .iter()
            .map(|e| {
                if use_alias {
                    e.render(&e.select_alias)
                } else {
                    e.render(&e.column_full_name)
                }
            })
            .collect();
        format!("order by {}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_and_nulls() {
        let mut e = OrderByElement::new("dfloc.URL", "URL", true);
        assert_eq!(e.render("dfloc.URL"), "dfloc.URL asc");
        e.nulls = Some(NullsOrder::Last);
        e.ascending = false;
        assert_eq!(e.render("dfloc.URL"), "dfloc.URL desc nulls last");
    }

    #[test]
    fn test_manual_order() {
        let mut e = OrderByElement::new("dfloc.METHOD", "METHOD", true);
        e.manual_values = vec![Value::from("WDL"), Value::Null, Value::from("FML"), Value::from("PRV")];
        assert_eq!(
            e.render("dfloc.METHOD"),
            "case when dfloc.METHOD = 'WDL' then 0 when dfloc.METHOD = 'FML' then 2 \
             when dfloc.METHOD = 'PRV' then 3 else 4 end asc"
        );
    }

    #[test]
    fn test_clause_render() {
        let mut clause = OrderByClause::default();
        assert_eq!(clause.render(false), "");
        clause.add(OrderByElement::new("dfloc.ID", "ID", false));
        clause.add(OrderByElement::new("dfrel_0.ENCODING", "ENCODING_0", true));
        assert_eq!(clause.render(false), "order by dfloc.ID desc, dfrel_0.ENCODING asc");
        assert_eq!(clause.render(true), "order by ID desc, ENCODING_0 asc");
        assert!(!clause.has_manual_order());
    }
}
