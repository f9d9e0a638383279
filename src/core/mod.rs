/// Core Module for sqlcrud
///
/// This module contains the connection wrapper, the statement builders and
/// the shared error type. Everything the binary does goes through here.

pub mod db;
pub mod error;

// Re-export commonly used types for convenience
pub use error::{Result, SqlCrudError};
