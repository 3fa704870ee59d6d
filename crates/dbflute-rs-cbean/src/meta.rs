//! Table metadata used to resolve columns and relations.
//!
//! Every table a condition bean can address is described by a static
//! [`TableMeta`]: its columns, its foreign relations (many-to-one or
//! one-to-one, navigated with `query_foreign`), and its referrer relations
//! (one-to-many, used by exists/in-scope/derived sub-queries). A
//! [`MetaRegistry`] maps table names to metas; it is the explicit lookup that
//! replaces name-based method resolution for dynamic callers.

use std::collections::HashMap;

use dbflute_rs_core::{CBeanError, CBeanResult};

/// The SQL type category of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ColumnType {
    /// 32-bit integer.
    Integer,
    /// 64-bit integer.
    BigInt,
    /// Fixed-point number.
    Decimal,
    /// Bounded character data.
    Varchar,
    /// Unbounded character data.
    Text,
    /// Date and time.
    Timestamp,
    /// Date only.
    Date,
    /// Boolean flag.
    Boolean,
    /// Binary data.
    Blob,
}

impl ColumnType {
    /// Whether sum/avg and column calculations can apply to the column.
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::BigInt | Self::Decimal)
    }

    /// Whether the column holds a date or timestamp.
    pub const fn is_temporal(self) -> bool {
        matches!(self, Self::Timestamp | Self::Date)
    }
}

/// One column of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    /// Column name in the database (e.g. `HTTP_STATUS_CODE`).
    pub db_name: &'static str,
    /// Property name (e.g. `httpStatusCode`), used in bind locations.
    pub property_name: &'static str,
    /// SQL type category.
    pub column_type: ColumnType,
    /// Part of the primary key.
    pub primary_key: bool,
    /// Declared `NOT NULL`.
    pub not_null: bool,
}

impl ColumnInfo {
    /// Creates a nullable, non-key column.
    pub const fn new(
        db_name: &'static str,
        property_name: &'static str,
        column_type: ColumnType,
    ) -> Self {
        Self {
            db_name,
            property_name,
            column_type,
            primary_key: false,
            not_null: false,
        }
    }

    /// Marks the column as the (not-null) primary key.
    #[must_use]
    pub const fn primary(mut self) -> Self {
        self.primary_key = true;
        self.not_null = true;
        self
    }

    /// Marks the column as `NOT NULL`.
    #[must_use]
    pub const fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }
}

/// A many-to-one (or one-to-one) relation from this table to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignInfo {
    /// Relation property name (e.g. `accessResult`).
    pub property_name: &'static str,
    /// DB name of the foreign table.
    pub foreign_table: &'static str,
    /// `(local column, foreign column)` join pairs, by DB name.
    pub column_pairs: &'static [(&'static str, &'static str)],
    /// Whether the relation is one-to-one.
    pub one_to_one: bool,
}

/// A one-to-many relation from this table to a referrer table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferrerInfo {
    /// Relation property name (e.g. `accessResultDataList`).
    pub property_name: &'static str,
    /// DB name of the referrer table.
    pub referrer_table: &'static str,
    /// `(local column, referrer column)` pairs, by DB name.
    pub column_pairs: &'static [(&'static str, &'static str)],
}

/// Static description of one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMeta {
    /// Table name in the database.
    pub table_db_name: &'static str,
    /// Property-style table name (e.g. `accessResult`).
    pub table_property_name: &'static str,
    /// Columns in declaration order.
    pub columns: &'static [ColumnInfo],
    /// Foreign relations; the index is the relation number used in aliases.
    pub foreign_infos: &'static [ForeignInfo],
    /// Referrer relations.
    pub referrer_infos: &'static [ReferrerInfo],
}

/// Flexible name comparison: case-insensitive and underscore-insensitive,
/// so `HTTP_STATUS_CODE`, `httpStatusCode` and `HttpStatusCode` all match.
fn flexible_eq(a: &str, b: &str) -> bool {
    let normalize = |s: &str| -> String {
        s.chars()
            .filter(|c| *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect()
    };
    normalize(a) == normalize(b)
}

impl TableMeta {
    /// Finds a column by DB name or property name.
    pub fn find_column(&self, name: &str) -> Option<&'static ColumnInfo> {
        let columns: &'static [ColumnInfo] = self.columns;
        columns
            .iter()
            .find(|c| flexible_eq(c.db_name, name) || flexible_eq(c.property_name, name))
    }

    /// Finds a column or returns [`CBeanError::ColumnNotFound`].
    pub fn column(&self, name: &str) -> CBeanResult<&'static ColumnInfo> {
        self.find_column(name).ok_or_else(|| CBeanError::ColumnNotFound {
            table: self.table_db_name.to_string(),
            column: name.to_string(),
        })
    }

    /// Returns the primary-key columns.
    pub fn primary_keys(&self) -> impl Iterator<Item = &'static ColumnInfo> {
        let columns: &'static [ColumnInfo] = self.columns;
        columns.iter().filter(|c| c.primary_key)
    }

    /// Finds a foreign relation and its relation number.
    pub fn find_foreign(&self, property: &str) -> Option<(usize, &'static ForeignInfo)> {
        let foreign_infos: &'static [ForeignInfo] = self.foreign_infos;
        foreign_infos
            .iter()
            .enumerate()
            .find(|(_, f)| flexible_eq(f.property_name, property))
    }

    /// Finds a foreign relation or returns [`CBeanError::RelationNotFound`].
    pub fn foreign(&self, property: &str) -> CBeanResult<(usize, &'static ForeignInfo)> {
        self.find_foreign(property)
            .ok_or_else(|| self.relation_not_found(property))
    }

    /// Finds a referrer relation.
    pub fn find_referrer(&self, property: &str) -> Option<&'static ReferrerInfo> {
        let referrer_infos: &'static [ReferrerInfo] = self.referrer_infos;
        referrer_infos
            .iter()
            .find(|r| flexible_eq(r.property_name, property))
    }

    /// Finds a referrer relation or returns [`CBeanError::RelationNotFound`].
    pub fn referrer(&self, property: &str) -> CBeanResult<&'static ReferrerInfo> {
        self.find_referrer(property)
            .ok_or_else(|| self.relation_not_found(property))
    }

    fn relation_not_found(&self, property: &str) -> CBeanError {
        CBeanError::RelationNotFound {
            table: self.table_db_name.to_string(),
            property: property.to_string(),
        }
    }
}

/// Maps table names to their static metadata.
#[derive(Debug, Default, Clone)]
pub struct MetaRegistry {
    tables: HashMap<String, &'static TableMeta>,
}

impl MetaRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a table under its DB name.
    pub fn register(&mut self, meta: &'static TableMeta) {
        self.tables
            .insert(meta.table_db_name.to_ascii_uppercase(), meta);
    }

    /// Finds a table by DB name (case-insensitive) or property name.
    pub fn find(&self, name: &str) -> Option<&'static TableMeta> {
        self.tables.get(&name.to_ascii_uppercase()).copied().or_else(|| {
            self.tables
                .values()
                .copied()
                .find(|m| flexible_eq(m.table_property_name, name))
        })
    }

    /// Finds a table or returns [`CBeanError::TableNotFound`].
    pub fn table(&self, name: &str) -> CBeanResult<&'static TableMeta> {
        self.find(name)
            .ok_or_else(|| CBeanError::TableNotFound(name.to_string()))
    }

    /// Returns the number of registered tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns `true` if no tables are registered.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
