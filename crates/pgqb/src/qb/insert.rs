//! INSERT builder.

use super::record::{IntoRecords, Record};
use super::select::{SelectKeys, SelectQuery, Selectable};
use super::{returning_tokens, set_list, value_token};
use crate::error::{QbError, QbResult};
use crate::expr::{Expression, Operand};
use crate::naming::wrap_quotes;
use crate::query::{AffectedCount, Query, QueryExecutor, ResultKind, Rows, impl_query_plumbing};
use crate::table::Table;
use crate::token::{Token, Tokenable};
use std::marker::PhantomData;
use std::sync::Arc;

/// `INSERT INTO <table>`, waiting for its rows.
pub struct InsertInto<E> {
    executor: Arc<E>,
    comment: Vec<Token>,
    table: Table,
    columns: Option<Vec<String>>,
}

impl<E: QueryExecutor> InsertInto<E> {
    pub(crate) fn new(executor: Arc<E>, comment: Vec<Token>, table: &Table) -> Self {
        Self {
            executor,
            comment,
            table: table.clone(),
            columns: None,
        }
    }

    /// Restrict the statement to an explicit column list.
    pub(crate) fn with_columns(mut self, columns: &[&str]) -> QbResult<Self> {
        for column in columns {
            self.table.column(column)?;
        }
        self.columns = Some(columns.iter().map(|c| c.to_string()).collect());
        Ok(self)
    }

    fn head(&self, columns: &[String]) -> QbResult<Vec<Token>> {
        let names = columns
            .iter()
            .map(|c| Ok(Token::String(self.table.column(c)?.snake_case_name())))
            .collect::<QbResult<Vec<_>>>()?;
        Ok(vec![
            Token::string("INSERT INTO"),
            Token::String(wrap_quotes(self.table.relation_name())),
            Token::group(vec![Token::separator(",", names)]),
        ])
    }

    /// `VALUES (...), (...)`. Every row must provide a value for every column.
    ///
    /// Without an explicit column list the columns are the first row's keys.
    pub fn values(&self, rows: impl IntoRecords) -> QbResult<InsertQuery<E>> {
        let rows = rows.into_records();
        let Some(first) = rows.first() else {
            return Err(QbError::validation("INSERT requires at least one row"));
        };
        let columns = match &self.columns {
            Some(columns) => columns.clone(),
            None => first.keys().map(str::to_string).collect(),
        };
        if columns.is_empty() {
            return Err(QbError::validation("INSERT requires at least one column"));
        }

        let rendered = rows
            .iter()
            .map(|row| self.row_token(&columns, row))
            .collect::<QbResult<Vec<_>>>()?;

        let mut tokens = self.head(&columns)?;
        tokens.push(Token::string("VALUES"));
        tokens.push(Token::separator(",", rendered));
        Ok(self.query(tokens))
    }

    fn row_token(&self, columns: &[String], row: &Record) -> QbResult<Token> {
        let values = columns
            .iter()
            .map(|column| match row.get(column) {
                Some(Some(value)) => {
                    let data_type = &self.table.column(column)?.definition().data_type;
                    value_token(column, data_type, value, true)
                }
                Some(None) => Err(QbError::validation(format!(
                    "value for column \"{column}\" is absent"
                ))),
                None => Err(QbError::validation(format!(
                    "row is missing column \"{column}\""
                ))),
            })
            .collect::<QbResult<Vec<_>>>()?;
        Ok(Token::group(vec![Token::separator(",", values)]))
    }

    /// `DEFAULT VALUES`
    pub fn default_values(&self) -> InsertQuery<E> {
        self.query(vec![
            Token::string("INSERT INTO"),
            Token::String(wrap_quotes(self.table.relation_name())),
            Token::string("DEFAULT VALUES"),
        ])
    }

    /// `INSERT INTO <table> (<cols>) SELECT ...`.
    ///
    /// The column list is the explicit one, or else the names of `items`.
    pub fn select(&self, items: &[&dyn Selectable]) -> QbResult<SelectQuery<E>> {
        let columns = match &self.columns {
            Some(columns) => columns.clone(),
            None => items
                .iter()
                .flat_map(|item| match item.select_keys() {
                    SelectKeys::Named(keys) => keys,
                    SelectKeys::Star => Vec::new(),
                })
                .collect(),
        };
        let head = self.head(&columns)?;
        Ok(SelectQuery::new(
            Arc::clone(&self.executor),
            self.comment.clone(),
            head,
            items,
            false,
        ))
    }

    fn query(&self, tokens: Vec<Token>) -> InsertQuery<E> {
        InsertQuery {
            executor: Arc::clone(&self.executor),
            comment: self.comment.clone(),
            tokens,
            table: self.table.clone(),
            returning_keys: Vec::new(),
            kind: PhantomData,
        }
    }
}

/// A complete INSERT. Resolves to the affected count until
/// [`returning`](InsertQuery::returning) switches it to rows.
pub struct InsertQuery<E, K = AffectedCount> {
    executor: Arc<E>,
    comment: Vec<Token>,
    tokens: Vec<Token>,
    table: Table,
    returning_keys: Vec<String>,
    kind: PhantomData<K>,
}

impl<E, K> std::fmt::Debug for InsertQuery<E, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InsertQuery")
            .field("comment", &self.comment)
            .field("tokens", &self.tokens)
            .field("table", &self.table)
            .field("returning_keys", &self.returning_keys)
            .finish_non_exhaustive()
    }
}

impl<E, K> Clone for InsertQuery<E, K> {
    fn clone(&self) -> Self {
        Self {
            executor: Arc::clone(&self.executor),
            comment: self.comment.clone(),
            tokens: self.tokens.clone(),
            table: self.table.clone(),
            returning_keys: self.returning_keys.clone(),
            kind: PhantomData,
        }
    }
}

impl<E: QueryExecutor, K: ResultKind> InsertQuery<E, K> {
    fn append(&self, tail: impl IntoIterator<Item = Token>) -> Self {
        let mut tokens = self.tokens.clone();
        tokens.extend(tail);
        self.with_query_tokens(tokens)
    }

    /// `ON CONFLICT (<cols>)`; an empty list gives a bare `ON CONFLICT`.
    pub fn on_conflict(&self, columns: &[&str]) -> QbResult<OnConflict<E, K>> {
        let target = if columns.is_empty() {
            Token::Empty
        } else {
            let names = columns
                .iter()
                .map(|c| Ok(Token::String(self.table.column(c)?.snake_case_name())))
                .collect::<QbResult<Vec<_>>>()?;
            Token::group(vec![Token::separator(",", names)])
        };
        Ok(OnConflict {
            query: self.append([Token::string("ON CONFLICT"), target]),
        })
    }

    /// `ON CONFLICT ON CONSTRAINT <name>`
    pub fn on_conflict_on_constraint(&self, constraint: &str) -> OnConflict<E, K> {
        OnConflict {
            query: self.append([
                Token::string("ON CONFLICT ON CONSTRAINT"),
                Token::String(wrap_quotes(constraint)),
            ]),
        }
    }

    /// Condition on a `DO UPDATE SET` action.
    pub fn where_(&self, condition: &Expression) -> Self {
        self.append([Token::string("WHERE"), Token::collection(condition.to_tokens())])
    }

    /// `RETURNING <cols>`; the query now resolves to rows.
    pub fn returning(&self, columns: &[&str]) -> QbResult<InsertQuery<E, Rows>> {
        let (tail, keys) = returning_tokens(&self.table, columns)?;
        let mut tokens = self.tokens.clone();
        tokens.extend(tail);
        Ok(InsertQuery {
            executor: Arc::clone(&self.executor),
            comment: self.comment.clone(),
            tokens,
            table: self.table.clone(),
            returning_keys: keys,
            kind: PhantomData,
        })
    }
}

/// An INSERT with a conflict target, waiting for its action.
pub struct OnConflict<E, K> {
    query: InsertQuery<E, K>,
}

impl<E: QueryExecutor, K: ResultKind> OnConflict<E, K> {
    /// `DO NOTHING`
    pub fn do_nothing(&self) -> InsertQuery<E, K> {
        self.query.append([Token::string("DO NOTHING")])
    }

    /// `DO UPDATE SET col = value, ...`. Absent entries are skipped.
    pub fn do_update_set(&self, values: &Record) -> QbResult<InsertQuery<E, K>> {
        let assignments = set_list(&self.query.table, values)?;
        Ok(self
            .query
            .append([Token::string("DO UPDATE SET"), assignments]))
    }
}

impl<E: QueryExecutor, K: ResultKind> Query for InsertQuery<E, K> {
    type Executor = E;
    type Kind = K;

    fn executor(&self) -> &Arc<E> {
        &self.executor
    }

    fn comment_tokens(&self) -> &[Token] {
        &self.comment
    }

    fn to_query_tokens(&self) -> Vec<Token> {
        self.tokens.clone()
    }

    fn returning_keys(&self) -> Vec<String> {
        self.returning_keys.clone()
    }

    fn with_query_tokens(&self, tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            ..self.clone()
        }
    }
}

impl_query_plumbing!(InsertQuery<E, K>);

impl<E: QueryExecutor, K: ResultKind> From<&InsertQuery<E, K>> for Operand {
    fn from(query: &InsertQuery<E, K>) -> Self {
        Operand::Query(query.to_tokens())
    }
}
