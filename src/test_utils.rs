/// # Test Utilities Module
///
/// Fixtures shared by the crate's tests: isolated in-memory databases with a
/// standard schema, and helpers for asserting on `SqlCrudError` values.

use crate::core::db::{Crud, DbConnection, Record, TableSchema};
use crate::core::Result;

/// An isolated, connected in-memory database.
pub struct DatabaseFixture {
    pub name: String,
    pub db: DbConnection,
}

impl DatabaseFixture {
    /// Create a new connected test database with no tables
    pub fn new(name: &str) -> Result<Self> {
        let mut db = DbConnection::new();
        db.connect("localhost", "test", "test", ":memory:")?;

        Ok(DatabaseFixture {
            name: name.to_string(),
            db,
        })
    }

    /// Create fixture with the standard schema and sample rows
    pub fn with_sample_data(name: &str) -> Result<Self> {
        let fixture = Self::new(name)?;
        fixture.setup_standard_schema()?;
        fixture.populate_sample_data()?;
        Ok(fixture)
    }

    pub fn items_schema() -> TableSchema {
        TableSchema::new()
            .column("id", "INTEGER")
            .column("v", "TEXT")
            .primary_key("id")
    }

    pub fn people_schema() -> TableSchema {
        TableSchema::new()
            .column("id", "INTEGER")
            .column("name", "TEXT NOT NULL")
            .column("age", "INTEGER")
            .column("score", "REAL")
            .primary_key("id")
    }

    /// Set up standard test schema
    pub fn setup_standard_schema(&self) -> Result<()> {
        self.db.create_table("items", &Self::items_schema())?;
        self.db.create_table("people", &Self::people_schema())?;
        Ok(())
    }

    /// Populate `people` with three rows
    pub fn populate_sample_data(&self) -> Result<()> {
        let people = [
            (1, "alice", 28, 91.5),
            (2, "bob", 32, 78.0),
            (3, "charlie", 25, 85.25),
        ];
        let records: Vec<Record> = people
            .iter()
            .map(|(id, name, age, score)| {
                Record::new()
                    .with("id", *id)
                    .with("name", *name)
                    .with("age", *age)
                    .with("score", *score)
            })
            .collect();
        self.db.insert_many("people", &records)?;
        Ok(())
    }
}

/// Error testing utilities specific to SqlCrudError patterns
pub mod error_testing {
    use std::fmt::Display;

    /// Assert that `result` failed with a message containing `fragment`.
    pub fn assert_error_contains<T, E>(
        result: &std::result::Result<T, E>,
        fragment: &str,
        context: &str,
    ) where
        T: std::fmt::Debug,
        E: Display,
    {
        match result {
            Ok(value) => panic!("Expected an error but got Ok({:?}) in {}", value, context),
            Err(e) => {
                let error_str = e.to_string();
                assert!(
                    error_str.to_lowercase().contains(&fragment.to_lowercase()),
                    "Expected '{}' in error message '{}' context: {}",
                    fragment,
                    error_str,
                    context
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_has_sample_rows() {
        let fixture = DatabaseFixture::with_sample_data("fixture_self_test").unwrap();
        let people = fixture.db.select_all_data("people").unwrap();
        assert_eq!(people.row_count, 3);
        assert!(fixture.db.select_all_data("items").unwrap().is_empty());
        assert_eq!(fixture.name, "fixture_self_test");
    }
}
