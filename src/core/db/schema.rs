/// Schema Module
///
/// Table descriptors supplied to `create_table`, and the identifier rules
/// applied to every table and column name before it is spliced into SQL.
/// Identifiers cannot be bound as parameters, so they are validated against
/// an allow-list pattern and then emitted quoted.

use crate::core::{Result, SqlCrudError};
use once_cell::sync::Lazy;
use regex::Regex;

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid")
});

/// Substrings that would let a type declaration escape its column definition.
const FORBIDDEN_IN_TYPE: &[&str] = &[";", "--", "/*", "*/", "\"", "`"];

/// Checks that `name` is a plain SQL identifier.
///
/// # Errors
///
/// Returns `SqlCrudError::Validation` naming the offending identifier and
/// what it was used for (`kind`, e.g. "table" or "column").
pub fn validate_identifier(name: &str, kind: &str) -> Result<()> {
    if IDENTIFIER.is_match(name) {
        Ok(())
    } else {
        Err(SqlCrudError::validation(format!(
            "Invalid {} name '{}': identifiers must match [A-Za-z_][A-Za-z0-9_]*",
            kind, name
        )))
    }
}

/// Validates `name` and returns it backtick-quoted, ready to splice into SQL.
///
/// Backticks rather than double quotes: SQLite reads an unknown double-quoted
/// name as a string literal, which would turn a misspelled column into a
/// silent constant.
pub fn quote_identifier(name: &str, kind: &str) -> Result<String> {
    validate_identifier(name, kind)?;
    Ok(format!("`{}`", name))
}

/// Checks a column type declaration such as `INTEGER NOT NULL` or `VARCHAR(20)`.
///
/// Commas are only allowed inside parentheses or single-quoted literals, and
/// parentheses and quotes must balance, so a declaration cannot close its
/// column and start another.
pub fn validate_type_declaration(column: &str, declaration: &str) -> Result<()> {
    if declaration.trim().is_empty() {
        return Err(SqlCrudError::validation(format!(
            "Column '{}' has an empty type declaration",
            column
        )));
    }
    if let Some(bad) = FORBIDDEN_IN_TYPE.iter().find(|bad| declaration.contains(*bad)) {
        return Err(SqlCrudError::validation(format!(
            "Type declaration for column '{}' contains forbidden sequence '{}'",
            column, bad
        )));
    }
    check_nesting(declaration).map_err(|problem| {
        SqlCrudError::validation(format!(
            "Type declaration for column '{}' {}",
            column, problem
        ))
    })
}

fn check_nesting(declaration: &str) -> std::result::Result<(), &'static str> {
    let mut depth = 0usize;
    let mut in_literal = false;
    for c in declaration.chars() {
        match c {
            '\'' => in_literal = !in_literal,
            _ if in_literal => {}
            '(' => depth += 1,
            ')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or("closes a parenthesis it never opened")?;
            }
            ',' if depth == 0 => return Err("contains a comma outside parentheses"),
            _ => {}
        }
    }
    if in_literal {
        Err("has an unterminated string literal")
    } else if depth > 0 {
        Err("has an unclosed parenthesis")
    } else {
        Ok(())
    }
}

/// A column declared in a [`TableSchema`].
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    /// Column name
    pub name: String,
    /// Type declaration spliced after the name (e.g. "TEXT NOT NULL")
    pub declaration: String,
}

/// Describes the table built by `create_table`.
///
/// Columns keep their declaration order. The primary key may span several
/// columns; each must be one of the declared columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableSchema {
    pub columns: Vec<ColumnDef>,
    pub primary_key: Vec<String>,
}

impl TableSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a column declaration.
    pub fn column(mut self, name: &str, declaration: &str) -> Self {
        self.columns.push(ColumnDef {
            name: name.to_string(),
            declaration: declaration.to_string(),
        });
        self
    }

    /// Adds `name` to the primary key.
    pub fn primary_key(mut self, name: &str) -> Self {
        self.primary_key.push(name.to_string());
        self
    }

    /// Checks every identifier and type declaration in the descriptor.
    ///
    /// # Errors
    ///
    /// Returns `SqlCrudError::Validation` if there are no columns, a column is
    /// declared twice, the primary key is empty or names an undeclared column,
    /// or any name or declaration fails the identifier rules.
    pub fn validate(&self) -> Result<()> {
        if self.columns.is_empty() {
            return Err(SqlCrudError::validation("A table needs at least one column"));
        }
        for (i, column) in self.columns.iter().enumerate() {
            validate_identifier(&column.name, "column")?;
            validate_type_declaration(&column.name, &column.declaration)?;
            if self.columns[..i].iter().any(|c| c.name == column.name) {
                return Err(SqlCrudError::validation(format!(
                    "Column '{}' is declared more than once",
                    column.name
                )));
            }
        }
        if self.primary_key.is_empty() {
            return Err(SqlCrudError::validation("A primary key column is required"));
        }
        for key in &self.primary_key {
            validate_identifier(key, "primary key")?;
            if !self.columns.iter().any(|c| &c.name == key) {
                return Err(SqlCrudError::validation(format!(
                    "Primary key '{}' is not one of the declared columns",
                    key
                )));
            }
        }
        Ok(())
    }
}
