//! Inline `VALUES` lists usable as a table.

use super::record::Record;
use super::value_token;
use crate::error::{QbError, QbResult};
use crate::table::{Table, TableDefinition, TableSource};
use crate::token::Token;
use std::sync::Arc;

/// Build `(VALUES (...), ...) AS name ("col", ...)`.
///
/// The first row casts each value to its column's declared type so PostgreSQL
/// can type the remaining rows.
pub(crate) fn values_table(
    name: &str,
    definition: TableDefinition,
    rows: &[Record],
) -> QbResult<Table> {
    if rows.is_empty() {
        return Err(QbError::validation("VALUES requires at least one row"));
    }
    if definition.columns().is_empty() {
        return Err(QbError::validation("VALUES requires at least one column"));
    }

    let rendered = rows
        .iter()
        .enumerate()
        .map(|(index, row)| {
            let values = definition
                .columns()
                .iter()
                .map(|(column, column_definition)| {
                    let data_type = column_definition.data_type();
                    let value = match row.get(column) {
                        Some(Some(value)) => value_token(column, data_type, value, true)?,
                        Some(None) | None => {
                            return Err(QbError::validation(format!(
                                "VALUES row {index} has no value for column \"{column}\""
                            )));
                        }
                    };
                    Ok(if index == 0 {
                        Token::collection(vec![
                            value,
                            Token::string("::"),
                            Token::string(data_type),
                        ])
                    } else {
                        value
                    })
                })
                .collect::<QbResult<Vec<_>>>()?;
            Ok(Token::group(vec![Token::separator(",", values)]))
        })
        .collect::<QbResult<Vec<_>>>()?;

    let column_list = definition
        .columns()
        .iter()
        .map(|(column, _)| {
            Token::String(format!("\"{}\"", crate::naming::to_snake_case(column)))
        })
        .collect();

    let source = TableSource::Values {
        rows: Token::group(vec![
            Token::string("VALUES"),
            Token::separator(",", rendered),
        ]),
        column_list: Token::group(vec![Token::separator(",", column_list)]),
    };
    Ok(Table::with_source(
        name.to_string(),
        None,
        Arc::new(definition),
        source,
    ))
}
