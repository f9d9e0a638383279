//! SQL text builders.
//!
//! Every function here is pure: it validates identifiers, quotes them, and
//! returns the statement text with `?` placeholders for every value. Values are
//! never formatted into the text.

use super::query::FilterOp;
use super::schema::{quote_identifier, TableSchema};
use crate::core::{Result, SqlCrudError};

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

/// ``CREATE TABLE IF NOT EXISTS `t` (`c` TYPE, ..., PRIMARY KEY (`pk`))``
pub fn create_table(table: &str, schema: &TableSchema) -> Result<String> {
    let table = quote_identifier(table, "table")?;
    schema.validate()?;

    let mut parts = Vec::with_capacity(schema.columns.len() + 1);
    for column in &schema.columns {
        parts.push(format!(
            "{} {}",
            quote_identifier(&column.name, "column")?,
            column.declaration.trim()
        ));
    }
    let key = schema
        .primary_key
        .iter()
        .map(|k| quote_identifier(k, "primary key"))
        .collect::<Result<Vec<_>>>()?;
    parts.push(format!("PRIMARY KEY ({})", key.join(", ")));

    Ok(format!("CREATE TABLE IF NOT EXISTS {} ({})", table, parts.join(", ")))
}

/// ``INSERT INTO `t` (`a`, `b`) VALUES (?, ?)``
pub fn insert<'a, I>(table: &str, columns: I) -> Result<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let table = quote_identifier(table, "table")?;
    let columns = columns
        .into_iter()
        .map(|c| quote_identifier(c, "column"))
        .collect::<Result<Vec<_>>>()?;
    if columns.is_empty() {
        return Err(SqlCrudError::validation("Cannot insert a record with no columns"));
    }
    Ok(format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table,
        columns.join(", "),
        placeholders(columns.len())
    ))
}

/// ``SELECT * FROM `t` ``
pub fn select_all(table: &str) -> Result<String> {
    Ok(format!("SELECT * FROM {}", quote_identifier(table, "table")?))
}

/// ``SELECT * FROM `t` WHERE `f` <op> ?``
pub fn select_where(table: &str, field: &str, op: FilterOp) -> Result<String> {
    Ok(format!(
        "SELECT * FROM {} WHERE {} {} ?",
        quote_identifier(table, "table")?,
        quote_identifier(field, "column")?,
        op.as_sql()
    ))
}

/// ``DELETE FROM `t` WHERE `id` = ?``
pub fn delete_by_id(table: &str) -> Result<String> {
    Ok(format!(
        "DELETE FROM {} WHERE `id` = ?",
        quote_identifier(table, "table")?
    ))
}

/// ``UPDATE `t` SET `a` = ?, `b` = ? WHERE `id` = ?``
pub fn update_by_id(table: &str, fields: &[&str]) -> Result<String> {
    let table = quote_identifier(table, "table")?;
    if fields.is_empty() {
        return Err(SqlCrudError::validation("An update needs at least one field"));
    }
    let assignments = fields
        .iter()
        .map(|f| quote_identifier(f, "column").map(|q| format!("{} = ?", q)))
        .collect::<Result<Vec<_>>>()?;
    Ok(format!(
        "UPDATE {} SET {} WHERE `id` = ?",
        table,
        assignments.join(", ")
    ))
}
