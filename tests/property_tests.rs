//! Property-based tests for identifier validation and value binding
//!
//! These tests verify that:
//! - Only plain identifiers ever reach the generated SQL
//! - Bound values survive a write/read cycle unchanged, whatever they contain
//! - Deleting by a hostile id never removes unrelated rows

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use sqlcrud::core::db::schema::validate_identifier;
    use sqlcrud::core::db::statement;
    use sqlcrud::{Crud, DbConnection, Record, TableSchema, Value};

    /// `v` is declared BLOB so SQLite applies no type affinity to it.
    fn open_with_table() -> DbConnection {
        let mut db = DbConnection::new();
        db.connect("localhost", "test", "test", ":memory:").unwrap();
        let schema = TableSchema::new()
            .column("id", "INTEGER")
            .column("v", "BLOB")
            .primary_key("id");
        db.create_table("items", &schema).unwrap();
        db
    }

    fn arb_identifier() -> impl Strategy<Value = String> {
        "[a-zA-Z_][a-zA-Z0-9_]{0,29}".prop_map(|s: String| s)
    }

    fn arb_scalar() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<i64>().prop_map(Value::Integer),
            (-1.0e9f64..1.0e9f64).prop_map(Value::Real),
            any::<String>().prop_map(Value::Text),
            prop::collection::vec(any::<u8>(), 0..64).prop_map(Value::Blob),
        ]
    }

    proptest! {
        #[test]
        fn valid_identifiers_are_accepted(name in arb_identifier()) {
            prop_assert!(validate_identifier(&name, "column").is_ok());
            let sql = statement::select_all(&name).unwrap();
            prop_assert_eq!(sql, format!("SELECT * FROM `{}`", name));
        }

        #[test]
        fn identifiers_with_punctuation_are_rejected(
            prefix in arb_identifier(),
            bad in prop::sample::select(vec![' ', ';', '\'', '"', '`', '-', '(', ')', '.', ',', '*']),
            suffix in "[a-z]{0,5}",
        ) {
            let name = format!("{}{}{}", prefix, bad, suffix);
            prop_assert!(validate_identifier(&name, "table").is_err());
            prop_assert!(statement::insert("items", [name.as_str()]).is_err());
        }

        #[test]
        fn bound_values_round_trip(id in any::<i64>(), value in arb_scalar()) {
            let db = open_with_table();
            db.insert_into("items", &Record::new().with("id", id).with("v", value.clone())).unwrap();

            let found = db.select_data("items", "id", "=", id).unwrap();
            prop_assert_eq!(found.row_count, 1);
            prop_assert_eq!(&found.rows[0][1], &value);
        }

        #[test]
        fn hostile_delete_ids_only_match_themselves(hostile in "[0-9]{1,3}[ ']{1,2}(OR|or) ?'?1'?='?1'?") {
            let db = open_with_table();
            db.insert_many(
                "items",
                &[
                    Record::new().with("id", 1).with("v", "a"),
                    Record::new().with("id", 2).with("v", "b"),
                ],
            )
            .unwrap();

            let deleted = db.delete_where("items", hostile.as_str()).unwrap();
            prop_assert_eq!(deleted, 0);
            prop_assert_eq!(db.select_all_data("items").unwrap().row_count, 2);
        }
    }
}
