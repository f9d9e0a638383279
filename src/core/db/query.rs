/// Query Execution Module
///
/// This module runs prepared statements against a connection and collects
/// their results. It also owns the comparison operators accepted by filtered
/// selects.

use super::value::{Record, Value};
use crate::core::{Result, SqlCrudError};
use rusqlite::{params_from_iter, Connection};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Comparison operators accepted by `select_data`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// `=`
    Eq,
    /// `>`
    Gt,
    /// `<`
    Lt,
    /// `>=`
    Ge,
    /// `<=`
    Le,
}

impl FilterOp {
    /// All accepted operators, in the order they are listed in error messages.
    pub const ALL: [FilterOp; 5] = [FilterOp::Eq, FilterOp::Gt, FilterOp::Lt, FilterOp::Ge, FilterOp::Le];

    pub fn as_sql(self) -> &'static str {
        match self {
            FilterOp::Eq => "=",
            FilterOp::Gt => ">",
            FilterOp::Lt => "<",
            FilterOp::Ge => ">=",
            FilterOp::Le => "<=",
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for FilterOp {
    type Err = SqlCrudError;

    fn from_str(s: &str) -> Result<Self> {
        FilterOp::ALL
            .into_iter()
            .find(|op| op.as_sql() == s)
            .ok_or_else(|| {
                let accepted: Vec<&str> = FilterOp::ALL.iter().map(|op| op.as_sql()).collect();
                SqlCrudError::validation(format!(
                    "Invalid filter '{}': expected one of {}",
                    s,
                    accepted.join(", ")
                ))
            })
    }
}

/// Represents the result of a SELECT
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    /// Column names from the query result
    pub columns: Vec<String>,
    /// Rows of typed values, in column order
    pub rows: Vec<Vec<Value>>,
    /// Number of rows returned
    pub row_count: usize,
}

impl QueryResult {
    /// Creates a new QueryResult from column names and row data
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let row_count = rows.len();
        QueryResult {
            columns,
            rows,
            row_count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Pairs every row with the column names.
    pub fn records(&self) -> Vec<Record> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .zip(row.iter().cloned())
                    .collect::<Record>()
            })
            .collect()
    }

    /// Renders rows as JSON objects keyed by column name.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        let mut objects = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            let mut object = serde_json::Map::new();
            for (column, value) in self.columns.iter().zip(row) {
                object.insert(column.clone(), serde_json::to_value(value)?);
            }
            objects.push(serde_json::Value::Object(object));
        }
        Ok(serde_json::Value::Array(objects))
    }
}

/// Statement execution over a borrowed connection.
///
/// Statements are taken from the connection's prepared-statement cache; that
/// cached statement plays the role of the cursor and is flushed when the
/// owning `DbConnection` closes.
pub struct QueryExecutor<'a> {
    connection: &'a Connection,
}

impl<'a> QueryExecutor<'a> {
    /// Creates a new QueryExecutor for the given connection
    pub fn new(connection: &'a Connection) -> Self {
        QueryExecutor { connection }
    }

    /// Runs a statement that returns no rows and reports how many rows changed.
    ///
    /// # Errors
    ///
    /// Returns `SqlCrudError::Database` if preparation or execution fails.
    pub fn execute<'p, P>(&self, sql: &str, params: P) -> Result<usize>
    where
        P: IntoIterator<Item = &'p Value>,
    {
        debug!(sql, "executing statement");
        let mut stmt = self.connection.prepare_cached(sql)?;
        Ok(stmt.execute(params_from_iter(params))?)
    }

    /// Runs a query and collects every row.
    ///
    /// # Errors
    ///
    /// Returns `SqlCrudError::Database` if the statement cannot be prepared
    /// (e.g. a missing table) or a row cannot be read.
    pub fn fetch_all<'p, P>(&self, sql: &str, params: P) -> Result<QueryResult>
    where
        P: IntoIterator<Item = &'p Value>,
    {
        debug!(sql, "running query");
        let mut stmt = self.connection.prepare_cached(sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let column_count = columns.len();

        let rows = stmt
            .query_map(params_from_iter(params), |row| {
                let mut values = Vec::with_capacity(column_count);
                for i in 0..column_count {
                    values.push(Value::from(row.get_ref(i)?));
                }
                Ok(values)
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(QueryResult::new(columns, rows))
    }
}
