//! SQL text formatting.
//!
//! Values are inlined as literals: strings are single-quoted with embedded
//! quotes doubled, floats use the shortest representation that reads back
//! to the same bits.

use std::fmt::Write;

/// A value to inline into SQL text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SqlValue<'a> {
    Null,
    Integer(i64),
    Real(f64),
    Text(&'a str),
}

impl<'a> From<&'a str> for SqlValue<'a> {
    fn from(value: &'a str) -> Self {
        SqlValue::Text(value)
    }
}

impl From<f64> for SqlValue<'_> {
    fn from(value: f64) -> Self {
        SqlValue::Real(value)
    }
}

impl<'a> From<Option<&'a str>> for SqlValue<'a> {
    fn from(value: Option<&'a str>) -> Self {
        value.map_or(SqlValue::Null, SqlValue::Text)
    }
}

/// Quote a string literal, doubling embedded single quotes.
pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Render a value as a SQL literal. Non-finite floats become `NULL`.
pub fn format_value(value: SqlValue<'_>) -> String {
    match value {
        SqlValue::Null => "NULL".to_string(),
        SqlValue::Integer(v) => v.to_string(),
        SqlValue::Real(v) if v.is_finite() => format!("{:?}", v),
        SqlValue::Real(_) => "NULL".to_string(),
        SqlValue::Text(v) => quote(v),
    }
}

/// Multi-row `INSERT` builder with optional `ON CONFLICT ... DO NOTHING`.
#[derive(Debug, Clone)]
pub struct InsertQuery {
    table: String,
    columns: Vec<String>,
    rows: Vec<String>,
    conflict: Option<String>,
}

impl InsertQuery {
    pub fn new(table: &str, columns: &[&str]) -> Self {
        Self {
            table: table.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
            conflict: None,
        }
    }

    /// Skip rows that collide with an existing `column` value.
    pub fn on_conflict_do_nothing(mut self, column: &str) -> Self {
        self.conflict = Some(column.to_string());
        self
    }

    /// Append a row. Values are given in column order.
    pub fn row(&mut self, values: &[SqlValue<'_>]) {
        debug_assert_eq!(values.len(), self.columns.len());
        let mut rendered = String::from("(");
        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                rendered.push(',');
            }
            rendered.push_str(&format_value(*value));
        }
        rendered.push(')');
        self.rows.push(rendered);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The complete statement text.
    pub fn build(&self) -> String {
        let mut query = format!(
            "INSERT INTO {} ({}) VALUES\n{}",
            self.table,
            self.columns.join(", "),
            self.rows.join(",\n")
        );
        if let Some(column) = &self.conflict {
            let _ = write!(query, "\nON CONFLICT ({}) DO NOTHING", column);
        }
        query.push(';');
        query
    }
}
