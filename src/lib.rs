//! sqlcrud: typed CRUD helpers over a single SQLite connection.
//!
//! ```
//! use sqlcrud::{Crud, DbConnection, Record, TableSchema, Value};
//!
//! let mut db = DbConnection::new();
//! db.connect("localhost", "app", "secret", ":memory:").unwrap();
//!
//! let schema = TableSchema::new()
//!     .column("id", "INTEGER")
//!     .column("name", "TEXT")
//!     .primary_key("id");
//! db.create_table("people", &schema).unwrap();
//! db.insert_into("people", &Record::new().with("id", 1).with("name", "a")).unwrap();
//!
//! let found = db.select_data("people", "id", "=", 1).unwrap();
//! assert_eq!(found.rows, vec![vec![Value::Integer(1), Value::from("a")]]);
//! db.close_connection().unwrap();
//! ```

// Core infrastructure modules
pub mod core;

pub mod config;

#[cfg(test)]
mod test_utils;


pub use crate::core::db::{
    ColumnDef, ConnectOptions, ConnectParams, Crud, DbConnection, FilterOp, QueryResult, Record,
    TableSchema, TransactionScope, Value,
};
pub use crate::core::{Result, SqlCrudError};
