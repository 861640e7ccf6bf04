//! UPDATE builder.

use super::record::Record;
use super::{returning_tokens, set_list};
use crate::error::QbResult;
use crate::expr::{Expression, Operand};
use crate::naming::wrap_quotes;
use crate::query::{AffectedCount, Query, QueryExecutor, ResultKind, Rows, impl_query_plumbing};
use crate::table::{FromSource, Table};
use crate::token::{Token, Tokenable};
use std::marker::PhantomData;
use std::sync::Arc;

/// `UPDATE <table>`, waiting for its `SET` list.
pub struct Update<E> {
    executor: Arc<E>,
    comment: Vec<Token>,
    table: Table,
}

impl<E: QueryExecutor> Update<E> {
    pub(crate) fn new(executor: Arc<E>, comment: Vec<Token>, table: &Table) -> Self {
        Self {
            executor,
            comment,
            table: table.clone(),
        }
    }

    /// `SET col = value, ...`. Absent entries are skipped; at least one must remain.
    pub fn set(&self, values: &Record) -> QbResult<UpdateQuery<E>> {
        let assignments = set_list(&self.table, values)?;
        Ok(UpdateQuery {
            executor: Arc::clone(&self.executor),
            comment: self.comment.clone(),
            tokens: vec![
                Token::string("UPDATE"),
                self.table.table_ref(),
                Token::string("SET"),
                assignments,
            ],
            table: self.table.clone(),
            returning_keys: Vec::new(),
            kind: PhantomData,
        })
    }
}

/// A complete UPDATE. Resolves to the affected count until
/// [`returning`](UpdateQuery::returning) switches it to rows.
pub struct UpdateQuery<E, K = AffectedCount> {
    executor: Arc<E>,
    comment: Vec<Token>,
    tokens: Vec<Token>,
    table: Table,
    returning_keys: Vec<String>,
    kind: PhantomData<K>,
}

impl<E, K> Clone for UpdateQuery<E, K> {
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

impl<E, K> std::fmt::Debug for UpdateQuery<E, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateQuery")
            .field("comment", &self.comment)
            .field("tokens", &self.tokens)
            .field("table", &self.table)
            .field("returning_keys", &self.returning_keys)
            .finish_non_exhaustive()
    }
}

impl<E: QueryExecutor, K: ResultKind> UpdateQuery<E, K> {
    fn append(&self, tail: impl IntoIterator<Item = Token>) -> Self {
        let mut tokens = self.tokens.clone();
        tokens.extend(tail);
        self.with_query_tokens(tokens)
    }

    pub fn from(&self, source: &impl FromSource) -> Self {
        self.append([Token::string("FROM"), Token::collection(source.to_tokens())])
    }

    pub fn where_(&self, condition: &Expression) -> Self {
        self.append([Token::string("WHERE"), Token::collection(condition.to_tokens())])
    }

    /// `WHERE CURRENT OF <cursor>`
    pub fn where_current_of(&self, cursor: &str) -> Self {
        self.append([
            Token::string("WHERE CURRENT OF"),
            Token::String(wrap_quotes(cursor)),
        ])
    }

    /// `RETURNING <cols>`; the query now resolves to rows.
    pub fn returning(&self, columns: &[&str]) -> QbResult<UpdateQuery<E, Rows>> {
        let (tail, keys) = returning_tokens(&self.table, columns)?;
        let mut tokens = self.tokens.clone();
        tokens.extend(tail);
        Ok(UpdateQuery {
            executor: Arc::clone(&self.executor),
            comment: self.comment.clone(),
            tokens,
            table: self.table.clone(),
            returning_keys: keys,
            kind: PhantomData,
        })
    }
}

impl<E: QueryExecutor, K: ResultKind> Query for UpdateQuery<E, K> {
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

impl_query_plumbing!(UpdateQuery<E, K>);

impl<E: QueryExecutor, K: ResultKind> From<&UpdateQuery<E, K>> for Operand {
    fn from(query: &UpdateQuery<E, K>) -> Self {
        Operand::Query(query.to_tokens())
    }
}
