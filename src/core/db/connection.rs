/// Connection Management Module
///
/// This module provides the `DbConnection` type: one optional SQLite session,
/// opened by `connect` and released by `close_connection`.

use crate::core::{Result, SqlCrudError};
use rusqlite::Connection;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Parameters identifying the database to open.
///
/// SQLite is embedded, so only `database` (a file path, or `:memory:`) decides
/// what gets opened. The remaining fields are kept for reporting and for
/// callers that share one parameter set across backends.
#[derive(Clone, Default, PartialEq)]
pub struct ConnectParams {
    pub host: String,
    pub user: String,
    pub password: String,
    pub database: String,
}

impl ConnectParams {
    pub fn new(host: &str, user: &str, password: &str, database: &str) -> Self {
        ConnectParams {
            host: host.to_string(),
            user: user.to_string(),
            password: password.to_string(),
            database: database.to_string(),
        }
    }

    /// Parameters for a private in-memory database.
    pub fn in_memory() -> Self {
        ConnectParams {
            database: ":memory:".to_string(),
            ..Default::default()
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.database == ":memory:"
    }
}

impl fmt::Debug for ConnectParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectParams")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .finish()
    }
}

/// Session settings applied right after the connection opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectOptions {
    /// Enforce FOREIGN KEY constraints (`PRAGMA foreign_keys`)
    pub foreign_keys: bool,
    /// How long to wait on a locked database before failing
    pub busy_timeout: Option<Duration>,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        ConnectOptions {
            foreign_keys: true,
            busy_timeout: None,
        }
    }
}

/// Owns at most one open SQLite connection.
///
/// Every data operation (see the [`Crud`](super::crud::Crud) trait) fails with
/// [`SqlCrudError::ConnectionClosed`] while no connection is open.
///
/// `DbConnection` is `Send` but not `Sync`: it can move to another thread but
/// cannot be shared between threads without external locking. Use one
/// instance per worker.
#[derive(Debug, Default)]
pub struct DbConnection {
    connection: Option<Connection>,
    params: Option<ConnectParams>,
}

impl DbConnection {
    /// Creates a disconnected instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a session with default [`ConnectOptions`].
    ///
    /// If this instance is already connected, the previous connection is
    /// closed first. A failure to close it is returned and no new connection
    /// is opened.
    ///
    /// # Examples
    ///
    /// ```
    /// use sqlcrud::DbConnection;
    ///
    /// let mut db = DbConnection::new();
    /// db.connect("localhost", "app", "secret", ":memory:").unwrap();
    /// assert!(db.is_connected());
    /// ```
    pub fn connect(&mut self, host: &str, user: &str, password: &str, database: &str) -> Result<()> {
        self.connect_with(
            ConnectParams::new(host, user, password, database),
            ConnectOptions::default(),
        )
    }

    /// Opens a session from explicit parameters and options.
    ///
    /// # Errors
    ///
    /// Returns `SqlCrudError::Validation` if no database is named, and
    /// `SqlCrudError::Database` if the file cannot be opened or the session
    /// settings cannot be applied.
    pub fn connect_with(&mut self, params: ConnectParams, options: ConnectOptions) -> Result<()> {
        if params.database.trim().is_empty() {
            return Err(SqlCrudError::validation("A database name is required to connect"));
        }

        if self.is_connected() {
            warn!(
                database = %params.database,
                "connect called on an open connection; closing the previous session"
            );
            self.close_connection()?;
        }

        let conn = Connection::open(&params.database)?;
        conn.pragma_update(None, "foreign_keys", options.foreign_keys)?;
        if let Some(timeout) = options.busy_timeout {
            conn.busy_timeout(timeout)?;
        }

        info!(
            host = %params.host,
            user = %params.user,
            database = %params.database,
            "connected"
        );
        self.connection = Some(conn);
        self.params = Some(params);
        Ok(())
    }

    /// Releases the session.
    ///
    /// Cached statements are finalized before the connection itself is closed.
    /// Closing a disconnected instance is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `SqlCrudError::Database` if SQLite refuses to close the
    /// connection. The instance is disconnected either way.
    pub fn close_connection(&mut self) -> Result<()> {
        let params = self.params.take();
        let Some(conn) = self.connection.take() else {
            debug!("close_connection called without an open connection");
            return Ok(());
        };

        conn.flush_prepared_statement_cache();
        conn.close().map_err(|(_conn, e)| SqlCrudError::Database(e))?;

        if let Some(params) = params {
            info!(database = %params.database, "connection closed");
        }
        Ok(())
    }

    /// Checks if there's an active database connection
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Parameters of the current session, if connected.
    pub fn params(&self) -> Option<&ConnectParams> {
        self.params.as_ref()
    }

    /// Borrows the open connection.
    ///
    /// # Errors
    ///
    /// Returns `SqlCrudError::ConnectionClosed` if not connected.
    pub fn connection(&self) -> Result<&Connection> {
        self.connection.as_ref().ok_or(SqlCrudError::ConnectionClosed)
    }

    pub(crate) fn connection_mut(&mut self) -> Result<&mut Connection> {
        self.connection.as_mut().ok_or(SqlCrudError::ConnectionClosed)
    }
}
