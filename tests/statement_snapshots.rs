//! Snapshots of the SQL text generated for each operation.

use sqlcrud::core::db::statement;
use sqlcrud::{FilterOp, TableSchema};

#[test]
fn create_table_statement() {
    let schema = TableSchema::new()
        .column("id", "INTEGER")
        .column("name", "VARCHAR(50) NOT NULL")
        .column("score", " REAL ")
        .primary_key("id");

    insta::assert_snapshot!(
        statement::create_table("people", &schema).unwrap(),
        @"CREATE TABLE IF NOT EXISTS `people` (`id` INTEGER, `name` VARCHAR(50) NOT NULL, `score` REAL, PRIMARY KEY (`id`))"
    );
}

#[test]
fn create_table_with_composite_key() {
    let schema = TableSchema::new()
        .column("post_id", "INTEGER")
        .column("tag_id", "INTEGER")
        .primary_key("post_id")
        .primary_key("tag_id");

    insta::assert_snapshot!(
        statement::create_table("post_tags", &schema).unwrap(),
        @"CREATE TABLE IF NOT EXISTS `post_tags` (`post_id` INTEGER, `tag_id` INTEGER, PRIMARY KEY (`post_id`, `tag_id`))"
    );
}

#[test]
fn insert_statement() {
    insta::assert_snapshot!(
        statement::insert("people", ["id", "name"]).unwrap(),
        @"INSERT INTO `people` (`id`, `name`) VALUES (?, ?)"
    );
}

#[test]
fn select_statements() {
    insta::assert_snapshot!(statement::select_all("people").unwrap(), @"SELECT * FROM `people`");
    insta::assert_snapshot!(
        statement::select_where("people", "age", FilterOp::Ge).unwrap(),
        @"SELECT * FROM `people` WHERE `age` >= ?"
    );
}

#[test]
fn delete_statement_binds_id() {
    insta::assert_snapshot!(
        statement::delete_by_id("people").unwrap(),
        @"DELETE FROM `people` WHERE `id` = ?"
    );
}

#[test]
fn update_statement() {
    insta::assert_snapshot!(
        statement::update_by_id("people", &["name", "age"]).unwrap(),
        @"UPDATE `people` SET `name` = ?, `age` = ? WHERE `id` = ?"
    );
}
