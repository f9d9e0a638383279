/// Database Module
///
/// This module provides the data-access layer of sqlcrud, organized into
/// focused submodules.
///
/// ## Architecture
///
/// - **Values** (`value.rs`): scalar values and ordered records bound to statements
/// - **Schema** (`schema.rs`): table descriptors and identifier validation
/// - **Statements** (`statement.rs`): pure SQL text builders, no I/O
/// - **Queries** (`query.rs`): filter operators and row fetching
/// - **Connection Management** (`connection.rs`): the `DbConnection` lifecycle
/// - **CRUD** (`crud.rs`): the operations themselves and the transaction scope
///
/// ## Error Handling
///
/// All database operations use the `SqlCrudError` type. Validation happens
/// before a statement is prepared, so a rejected call never touches the driver.
pub mod connection;
pub mod crud;
pub mod query;
pub mod schema;
pub mod statement;
pub mod value;

pub use connection::*;
pub use crud::*;
pub use query::*;
pub use schema::*;
pub use value::*;
