//! Statement builders.
//!
//! Every builder here is created from a [`Db`](crate::Db) and carries its
//! executor and comment. Builders are persistent: each chained call returns a
//! new value and the receiver can be reused.
//!
//! # Usage
//!
//! ```ignore
//! let foo = &db["foo"];
//!
//! let rows = db
//!     .select(&[&foo["id"], &foo["name"]])
//!     .from(foo)
//!     .where_(&foo["value"].gt(10))
//!     .limit(20)
//!     .await?;
//!
//! let inserted = db
//!     .insert_into(foo)
//!     .values(Record::new().set("name", "alice").set("value", 1))?
//!     .returning(&["id"])?
//!     .await?;
//!
//! let affected = db
//!     .update(foo)
//!     .set(&Record::new().set("name", "bob"))?
//!     .where_(&foo["id"].eq(id))
//!     .await?;
//! ```

mod delete;
mod insert;
mod record;
mod select;
mod truncate;
mod update;
mod values;
mod with;

#[cfg(test)]
mod tests;

pub use delete::DeleteQuery;
pub use insert::{InsertInto, InsertQuery, OnConflict};
pub use record::{IntoRecords, Record};
pub use select::{SelectKeys, SelectQuery, Selectable};
pub use truncate::TruncateQuery;
pub use update::{Update, UpdateQuery};
pub use with::{CteName, CteRefs, Materialization, With};

pub(crate) use values::values_table;

use crate::error::{QbError, QbResult};
use crate::expr::Operand;
use crate::int8::validate_int8_value;
use crate::naming::{wrap_quotes, wrap_quotes_extended};
use crate::table::Table;
use crate::token::Token;

/// Render a value bound to `column`, checking int8 range first.
///
/// With `group_expressions`, spliced expressions are parenthesized.
pub(crate) fn value_token(
    column: &str,
    data_type: &str,
    operand: &Operand,
    group_expressions: bool,
) -> QbResult<Token> {
    Ok(match operand {
        Operand::Value(value) => {
            validate_int8_value(column, data_type, value)?;
            Token::Parameter(value.clone())
        }
        Operand::Inline(inline) => Token::Inline(inline.clone()),
        Operand::Expr(expr) if group_expressions => Token::group(expr.tokens().to_vec()),
        Operand::Expr(expr) => Token::collection(expr.tokens().to_vec()),
        Operand::Query(tokens) => Token::group(tokens.clone()),
    })
}

/// `col = value, ...` for UPDATE and `DO UPDATE SET`. Absent entries are skipped.
pub(crate) fn set_list(table: &Table, values: &Record) -> QbResult<Token> {
    let assignments = values
        .present()
        .map(|(column, value)| {
            let target = table.column(column)?;
            Ok(Token::collection(vec![
                Token::String(target.snake_case_name()),
                Token::string("="),
                value_token(column, &target.definition().data_type, value, false)?,
            ]))
        })
        .collect::<QbResult<Vec<_>>>()?;
    if assignments.is_empty() {
        return Err(QbError::validation("SET must be setting at least one value."));
    }
    Ok(Token::separator(",", assignments))
}

/// `RETURNING col, col "alias"` plus the returned keys.
pub(crate) fn returning_tokens(
    table: &Table,
    columns: &[&str],
) -> QbResult<(Vec<Token>, Vec<String>)> {
    if columns.is_empty() {
        return Err(QbError::validation("RETURNING requires at least one column"));
    }
    let items = columns
        .iter()
        .map(|name| {
            let column = table.column(name)?;
            let snake = column.snake_case_name();
            Ok(if snake == wrap_quotes(name) {
                Token::String(snake)
            } else {
                Token::collection(vec![
                    Token::String(snake),
                    Token::String(wrap_quotes_extended(name)),
                ])
            })
        })
        .collect::<QbResult<Vec<_>>>()?;
    Ok((
        vec![Token::string("RETURNING"), Token::separator(",", items)],
        columns.iter().map(|c| c.to_string()).collect(),
    ))
}
