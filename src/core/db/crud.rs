/// CRUD Module
///
/// The data operations of sqlcrud. They live on the [`Crud`] trait so the same
/// calls work on a [`DbConnection`] (each call commits on its own) and on a
/// [`TransactionScope`] (everything commits or rolls back together).

use super::connection::DbConnection;
use super::query::{FilterOp, QueryExecutor, QueryResult};
use super::schema::TableSchema;
use super::statement;
use super::value::{Record, Value};
use crate::core::{Result, SqlCrudError};
use rusqlite::{Connection, Transaction};
use std::iter;
use tracing::{info, warn};

/// Table-level create, insert, select, update and delete helpers.
///
/// Implementors only provide [`Crud::connection`]. Every method validates its
/// input before preparing a statement, binds all values as parameters, and
/// returns failures instead of logging them away.
pub trait Crud {
    /// The connection statements run on.
    ///
    /// # Errors
    ///
    /// Returns `SqlCrudError::ConnectionClosed` when there is none.
    fn connection(&self) -> Result<&Connection>;

    /// Creates `table_name` unless it already exists.
    ///
    /// Calling this twice with the same arguments is harmless.
    fn create_table(&self, table_name: &str, schema: &TableSchema) -> Result<()> {
        let conn = self.connection()?;
        let sql = statement::create_table(table_name, schema)?;
        QueryExecutor::new(conn).execute(&sql, iter::empty())?;
        info!(table = table_name, "table created");
        Ok(())
    }

    /// Inserts one record, binding its values in column order.
    fn insert_into(&self, table_name: &str, record: &Record) -> Result<usize> {
        let conn = self.connection()?;
        let sql = statement::insert(table_name, record.columns())?;
        let inserted = QueryExecutor::new(conn).execute(&sql, record.values())?;
        info!(table = table_name, rows = inserted, "record inserted");
        Ok(inserted)
    }

    /// Inserts a batch of records with a single prepared statement.
    ///
    /// The batch must be non-empty and every record must list the same
    /// columns in the same order as the first one; otherwise nothing is
    /// inserted. Outside a [`TransactionScope`] the batch runs in its own
    /// transaction, so it lands completely or not at all.
    fn insert_many(&self, table_name: &str, records: &[Record]) -> Result<usize> {
        let conn = self.connection()?;
        let first = records
            .first()
            .ok_or_else(|| SqlCrudError::validation("insert_many needs at least one record"))?;
        if let Some((index, record)) = records
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, record)| !first.same_columns(record))
        {
            return Err(SqlCrudError::validation(format!(
                "Record {} has columns [{}] but the batch expects [{}]",
                index,
                record.columns().collect::<Vec<_>>().join(", "),
                first.columns().collect::<Vec<_>>().join(", ")
            )));
        }
        let sql = statement::insert(table_name, first.columns())?;

        let inserted = if conn.is_autocommit() {
            let tx = conn.unchecked_transaction()?;
            let inserted = insert_rows(&tx, &sql, records)?;
            tx.commit()?;
            inserted
        } else {
            insert_rows(conn, &sql, records)?
        };
        info!(table = table_name, rows = inserted, "batch inserted");
        Ok(inserted)
    }

    /// Returns every row of `table_name`.
    fn select_all_data(&self, table_name: &str) -> Result<QueryResult> {
        let conn = self.connection()?;
        let sql = statement::select_all(table_name)?;
        QueryExecutor::new(conn).fetch_all(&sql, iter::empty())
    }

    /// Returns the rows where `field <filter> value`.
    ///
    /// `filter` must be one of `=`, `>`, `<`, `>=`, `<=`.
    ///
    /// # Errors
    ///
    /// Any other operator is a `SqlCrudError::Validation` and no statement is
    /// prepared.
    fn select_data(
        &self,
        table_name: &str,
        field: &str,
        filter: &str,
        value: impl Into<Value>,
    ) -> Result<QueryResult> {
        self.connection()?;
        let op: FilterOp = filter.parse()?;
        self.select_where(table_name, field, op, value)
    }

    /// Typed form of [`Crud::select_data`].
    fn select_where(
        &self,
        table_name: &str,
        field: &str,
        op: FilterOp,
        value: impl Into<Value>,
    ) -> Result<QueryResult> {
        let conn = self.connection()?;
        let sql = statement::select_where(table_name, field, op)?;
        let value = value.into();
        QueryExecutor::new(conn).fetch_all(&sql, iter::once(&value))
    }

    /// Deletes the row whose `id` column equals `id`. The id is bound, never
    /// spliced into the statement.
    fn delete_where(&self, table_name: &str, id: impl Into<Value>) -> Result<usize> {
        let conn = self.connection()?;
        let sql = statement::delete_by_id(table_name)?;
        let id = id.into();
        let deleted = QueryExecutor::new(conn).execute(&sql, iter::once(&id))?;
        info!(table = table_name, rows = deleted, "rows deleted");
        Ok(deleted)
    }

    /// Sets `fields[i] = values[i]` on the row whose `id` column equals `id`.
    ///
    /// # Errors
    ///
    /// `SqlCrudError::Validation` if the two slices differ in length or are
    /// empty.
    fn update_where(
        &self,
        table_name: &str,
        id: impl Into<Value>,
        fields: &[&str],
        values: &[Value],
    ) -> Result<usize> {
        let conn = self.connection()?;
        if fields.len() != values.len() {
            return Err(SqlCrudError::validation(format!(
                "The number of fields ({}) and values ({}) must be the same",
                fields.len(),
                values.len()
            )));
        }
        let sql = statement::update_by_id(table_name, fields)?;
        let id = id.into();
        let updated = QueryExecutor::new(conn).execute(&sql, values.iter().chain(iter::once(&id)))?;
        info!(table = table_name, rows = updated, "rows updated");
        Ok(updated)
    }

    /// Single-field form of [`Crud::update_where`].
    fn update_field(
        &self,
        table_name: &str,
        id: impl Into<Value>,
        field: &str,
        value: impl Into<Value>,
    ) -> Result<usize> {
        self.update_where(table_name, id, &[field], &[value.into()])
    }
}

fn insert_rows(conn: &Connection, sql: &str, records: &[Record]) -> Result<usize> {
    let executor = QueryExecutor::new(conn);
    let mut inserted = 0;
    for record in records {
        inserted += executor.execute(sql, record.values())?;
    }
    Ok(inserted)
}

impl Crud for DbConnection {
    fn connection(&self) -> Result<&Connection> {
        DbConnection::connection(self)
    }
}

/// A transaction opened by [`DbConnection::transaction`].
///
/// Operations run through the scope are committed together when the closure
/// returns `Ok`, and rolled back when it returns `Err`.
pub struct TransactionScope<'c> {
    tx: Transaction<'c>,
}

impl Crud for TransactionScope<'_> {
    fn connection(&self) -> Result<&Connection> {
        Ok(&*self.tx)
    }
}

impl DbConnection {
    /// Runs `f` inside a transaction.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlcrud::{Crud, DbConnection, Record, TableSchema};
    ///
    /// let mut db = DbConnection::new();
    /// db.connect("", "", "", ":memory:").unwrap();
    /// let schema = TableSchema::new().column("id", "INTEGER").primary_key("id");
    /// db.create_table("t", &schema).unwrap();
    ///
    /// db.transaction(|tx| {
    ///     tx.insert_into("t", &Record::new().with("id", 1))?;
    ///     tx.insert_into("t", &Record::new().with("id", 2))
    /// })
    /// .unwrap();
    /// assert_eq!(db.select_all_data("t").unwrap().row_count, 2);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `SqlCrudError::ConnectionClosed` if not connected, the
    /// closure's own error after rolling back, or `SqlCrudError::Database` if
    /// the transaction cannot begin or commit.
    pub fn transaction<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&TransactionScope<'_>) -> Result<T>,
    {
        let conn = self.connection_mut()?;
        let scope = TransactionScope {
            tx: conn.transaction()?,
        };

        match f(&scope) {
            Ok(value) => {
                scope.tx.commit()?;
                info!("transaction committed");
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback_err) = scope.tx.rollback() {
                    warn!(error = %rollback_err, "rollback failed");
                }
                warn!(error = %e, "transaction rolled back");
                Err(e)
            }
        }
    }
}
