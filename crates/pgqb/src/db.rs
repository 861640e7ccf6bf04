//! The database handle: declared tables plus the executor every builder runs on.

use crate::column::{ColumnDefinition, ColumnDefinitionFormat};
use crate::error::{QbError, QbResult};
use crate::functions::{CaseStatement, case};
use crate::index::IndexDefinitionFormat;
use crate::naming::to_snake_case;
use crate::qb::{
    DeleteQuery, InsertInto, IntoRecords, SelectQuery, Selectable, TruncateQuery, Update, With,
    values_table,
};
use crate::query::QueryExecutor;
use crate::table::{Table, TableDefinition};
use crate::token::Token;
use std::ops;
use std::sync::Arc;

/// Declared shape of one table, as reported by [`Db::table_definitions`].
#[derive(Debug, Clone, PartialEq)]
pub struct TableDefinitionInfo {
    /// Logical (declared) name.
    pub name: String,
    pub columns: Vec<(String, ColumnDefinitionFormat)>,
    pub indexes: Vec<(String, IndexDefinitionFormat)>,
}

/// Entry point for building statements.
///
/// Cheap to clone; clones share the executor and the table list.
pub struct Db<E> {
    executor: Arc<E>,
    comment: Vec<Token>,
    tables: Arc<Vec<(String, Table)>>,
}

impl<E> std::fmt::Debug for Db<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Db")
            .field("comment", &self.comment)
            .field("tables", &self.tables)
            .finish_non_exhaustive()
    }
}

impl<E> Clone for Db<E> {
    fn clone(&self) -> Self {
        Self {
            executor: Arc::clone(&self.executor),
            comment: self.comment.clone(),
            tables: Arc::clone(&self.tables),
        }
    }
}

/// Declare the tables of a database and the executor that runs its statements.
///
/// Table names are logical: `listItem` is stored as `list_item`. The order of
/// `tables` is kept by [`Db::table_definitions`].
///
/// # Example
/// ```ignore
/// let db = define_db(
///     [(
///         "foo",
///         TableDefinition::new([
///             ("id", uuid().primary_key().default("gen_random_uuid()")),
///             ("name", text().not_null()),
///         ]),
///     )],
///     client,
/// );
/// ```
pub fn define_db<I, S, E>(tables: I, executor: E) -> Db<E>
where
    I: IntoIterator<Item = (S, TableDefinition)>,
    S: Into<String>,
    E: QueryExecutor,
{
    let tables = tables
        .into_iter()
        .map(|(name, definition)| {
            let name = name.into();
            let table = Table::new(to_snake_case(&name), definition);
            (name, table)
        })
        .collect();
    Db {
        executor: Arc::new(executor),
        comment: Vec::new(),
        tables: Arc::new(tables),
    }
}

impl<E: QueryExecutor> Db<E> {
    pub fn executor(&self) -> &Arc<E> {
        &self.executor
    }

    /// Look up a table by its logical name.
    pub fn table(&self, name: &str) -> QbResult<&Table> {
        self.tables
            .iter()
            .find(|(logical, _)| logical == name)
            .map(|(_, table)| table)
            .ok_or_else(|| QbError::validation(format!("table \"{name}\" is not defined")))
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.iter().map(|(_, table)| table)
    }

    /// A handle whose statements start with `/*text*/`.
    pub fn comment(&self, text: &str) -> QbResult<Db<E>> {
        if text.contains("*/") {
            return Err(QbError::validation("comment must not contain \"*/\""));
        }
        Ok(Db {
            comment: vec![Token::String(format!("/*{text}*/"))],
            ..self.clone()
        })
    }

    pub fn select(&self, items: &[&dyn Selectable]) -> SelectQuery<E> {
        self.make_select(items, false)
    }

    pub fn select_distinct(&self, items: &[&dyn Selectable]) -> SelectQuery<E> {
        self.make_select(items, true)
    }

    fn make_select(&self, items: &[&dyn Selectable], distinct: bool) -> SelectQuery<E> {
        SelectQuery::new(
            Arc::clone(&self.executor),
            self.comment.clone(),
            Vec::new(),
            items,
            distinct,
        )
    }

    pub fn insert_into(&self, table: &Table) -> InsertInto<E> {
        InsertInto::new(Arc::clone(&self.executor), self.comment.clone(), table)
    }

    /// INSERT with an explicit column list. Unknown columns are rejected.
    pub fn insert_into_columns(&self, table: &Table, columns: &[&str]) -> QbResult<InsertInto<E>> {
        self.insert_into(table).with_columns(columns)
    }

    pub fn update(&self, table: &Table) -> Update<E> {
        Update::new(Arc::clone(&self.executor), self.comment.clone(), table)
    }

    pub fn delete_from(&self, table: &Table) -> DeleteQuery<E> {
        DeleteQuery::new(Arc::clone(&self.executor), self.comment.clone(), table)
    }

    pub fn truncate(&self, table: &Table) -> TruncateQuery<E> {
        TruncateQuery::new(Arc::clone(&self.executor), self.comment.clone(), table)
    }

    /// An inline `VALUES` list usable as a table in FROM, JOIN or USING.
    pub fn values<I, S>(&self, name: &str, columns: I, rows: impl IntoRecords) -> QbResult<Table>
    where
        I: IntoIterator<Item = (S, ColumnDefinition)>,
        S: Into<String>,
    {
        values_table(name, TableDefinition::new(columns), &rows.into_records())
    }

    pub fn with(&self) -> With {
        With::new()
    }

    /// Start a `CASE` expression; see [`case`].
    pub fn case(&self) -> CaseStatement {
        case()
    }

    /// Columns and indexes of every declared table, in declaration order.
    pub fn table_definitions(&self) -> Vec<TableDefinitionInfo> {
        self.tables
            .iter()
            .map(|(name, table)| {
                let definition = table.definition();
                TableDefinitionInfo {
                    name: name.clone(),
                    columns: definition
                        .columns()
                        .iter()
                        .map(|(column, def)| (column.clone(), def.definition().clone()))
                        .collect(),
                    indexes: definition.index_definitions(table.name()),
                }
            })
            .collect()
    }
}

impl<E: QueryExecutor> ops::Index<&str> for Db<E> {
    type Output = Table;

    fn index(&self, name: &str) -> &Table {
        match self.table(name) {
            Ok(table) => table,
            Err(_) => panic!("table \"{name}\" is not defined"),
        }
    }
}
