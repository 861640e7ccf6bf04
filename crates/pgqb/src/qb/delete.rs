//! DELETE builder.

use super::returning_tokens;
use crate::error::QbResult;
use crate::expr::{Expression, Operand};
use crate::query::{AffectedCount, Query, QueryExecutor, ResultKind, Rows, impl_query_plumbing};
use crate::table::{FromSource, Table};
use crate::token::{Token, Tokenable};
use std::marker::PhantomData;
use std::sync::Arc;

/// A DELETE. Resolves to the affected count until
/// [`returning`](DeleteQuery::returning) switches it to rows.
pub struct DeleteQuery<E, K = AffectedCount> {
    executor: Arc<E>,
    comment: Vec<Token>,
    tokens: Vec<Token>,
    table: Table,
    returning_keys: Vec<String>,
    kind: PhantomData<K>,
}

impl<E, K> std::fmt::Debug for DeleteQuery<E, K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeleteQuery")
            .field("comment", &self.comment)
            .field("tokens", &self.tokens)
            .field("table", &self.table)
            .field("returning_keys", &self.returning_keys)
            .finish_non_exhaustive()
    }
}

impl<E, K> Clone for DeleteQuery<E, K> {
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

impl<E: QueryExecutor> DeleteQuery<E> {
    pub(crate) fn new(executor: Arc<E>, comment: Vec<Token>, table: &Table) -> Self {
        Self {
            executor,
            comment,
            tokens: vec![Token::string("DELETE FROM"), table.table_ref()],
            table: table.clone(),
            returning_keys: Vec::new(),
            kind: PhantomData,
        }
    }
}

impl<E: QueryExecutor, K: ResultKind> DeleteQuery<E, K> {
    fn append(&self, tail: impl IntoIterator<Item = Token>) -> Self {
        let mut tokens = self.tokens.clone();
        tokens.extend(tail);
        self.with_query_tokens(tokens)
    }

    /// `USING <source>, ...`
    pub fn using(&self, sources: &[&dyn FromSource]) -> Self {
        let items = sources
            .iter()
            .map(|s| Token::collection(s.to_tokens()))
            .collect();
        self.append([Token::string("USING"), Token::separator(",", items)])
    }

    pub fn where_(&self, condition: &Expression) -> Self {
        self.append([Token::string("WHERE"), Token::collection(condition.to_tokens())])
    }

    /// `RETURNING <cols>`; the query now resolves to rows.
    pub fn returning(&self, columns: &[&str]) -> QbResult<DeleteQuery<E, Rows>> {
        let (tail, keys) = returning_tokens(&self.table, columns)?;
        let mut tokens = self.tokens.clone();
        tokens.extend(tail);
        Ok(DeleteQuery {
            executor: Arc::clone(&self.executor),
            comment: self.comment.clone(),
            tokens,
            table: self.table.clone(),
            returning_keys: keys,
            kind: PhantomData,
        })
    }
}

impl<E: QueryExecutor, K: ResultKind> Query for DeleteQuery<E, K> {
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

impl_query_plumbing!(DeleteQuery<E, K>);

impl<E: QueryExecutor, K: ResultKind> From<&DeleteQuery<E, K>> for Operand {
    fn from(query: &DeleteQuery<E, K>) -> Self {
        Operand::Query(query.to_tokens())
    }
}
