//! Parameterized INSERT/UPDATE/DELETE generation.
//!
//! A [`StatementBuilder`] is created once per open destination and borrowed
//! by every record handler. Identifiers are emitted unquoted, so they must
//! already be lowercase; anything that would need quoting is rejected.

use sink_core::Value;
use thiserror::Error;

/// Parameter placeholder syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placeholder {
    /// `$1, $2, ...` as used by Materialize and PostgreSQL
    #[default]
    Dollar,
    /// `?, ?, ...`
    Question,
}

impl Placeholder {
    fn render(self, position: usize) -> String {
        match self {
            Self::Dollar => format!("${position}"),
            Self::Question => "?".to_string(),
        }
    }
}

/// Error type for statement generation.
#[derive(Error, Debug, PartialEq)]
pub enum BuildError {
    /// Table or column name that cannot be used unquoted
    #[error("invalid identifier '{0}'")]
    InvalidIdentifier(String),

    /// No columns to insert or set
    #[error("{0} statement has no columns")]
    NoColumns(&'static str),

    /// Column and value lists differ in length
    #[error("got {columns} columns but {values} values")]
    LengthMismatch { columns: usize, values: usize },
}

/// SQL text with its ordered arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub args: Vec<Value>,
}

/// Builds statements for one placeholder syntax.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatementBuilder {
    placeholder: Placeholder,
}

impl StatementBuilder {
    pub fn new(placeholder: Placeholder) -> Self {
        Self { placeholder }
    }

    /// `INSERT INTO table (c1, c2) VALUES ($1, $2)`
    pub fn insert(
        &self,
        table: &str,
        columns: &[String],
        values: Vec<Value>,
    ) -> Result<Statement, BuildError> {
        check_identifier(table)?;
        check_columns("insert", columns, &values)?;

        let placeholders: Vec<String> = (1..=values.len())
            .map(|i| self.placeholder.render(i))
            .collect();

        Ok(Statement {
            sql: format!(
                "INSERT INTO {table} ({}) VALUES ({})",
                columns.join(", "),
                placeholders.join(", ")
            ),
            args: values,
        })
    }

    /// `UPDATE table SET c1 = $1, c2 = $2 WHERE key = $3`
    pub fn update(
        &self,
        table: &str,
        columns: &[String],
        values: Vec<Value>,
        key_column: &str,
        key_value: Value,
    ) -> Result<Statement, BuildError> {
        check_identifier(table)?;
        check_identifier(key_column)?;
        check_columns("update", columns, &values)?;

        let assignments: Vec<String> = columns
            .iter()
            .enumerate()
            .map(|(i, column)| format!("{column} = {}", self.placeholder.render(i + 1)))
            .collect();
        let key_placeholder = self.placeholder.render(values.len() + 1);

        let mut args = values;
        args.push(key_value);

        Ok(Statement {
            sql: format!(
                "UPDATE {table} SET {} WHERE {key_column} = {key_placeholder}",
                assignments.join(", ")
            ),
            args,
        })
    }

    /// `DELETE FROM table WHERE key = $1`
    pub fn delete(
        &self,
        table: &str,
        key_column: &str,
        key_value: Value,
    ) -> Result<Statement, BuildError> {
        check_identifier(table)?;
        check_identifier(key_column)?;

        Ok(Statement {
            sql: format!(
                "DELETE FROM {table} WHERE {key_column} = {}",
                self.placeholder.render(1)
            ),
            args: vec![key_value],
        })
    }
}

fn check_columns(
    statement: &'static str,
    columns: &[String],
    values: &[Value],
) -> Result<(), BuildError> {
    if columns.is_empty() {
        return Err(BuildError::NoColumns(statement));
    }
    if columns.len() != values.len() {
        return Err(BuildError::LengthMismatch {
            columns: columns.len(),
            values: values.len(),
        });
    }
    columns.iter().try_for_each(|c| check_identifier(c))
}

// A schema-qualified name is checked part by part.
fn check_identifier(name: &str) -> Result<(), BuildError> {
    // Unquoted names fold to lowercase, so uppercase letters would need quoting
    let letter = |c: char| c.is_alphabetic() && !c.is_uppercase();
    let valid_part = |part: &str| {
        let mut chars = part.chars();
        matches!(chars.next(), Some(c) if letter(c) || c == '_')
            && chars.all(|c| letter(c) || c.is_ascii_digit() || c == '_' || c == '$')
    };

    if name.split('.').all(valid_part) {
        Ok(())
    } else {
        Err(BuildError::InvalidIdentifier(name.to_string()))
    }
}
