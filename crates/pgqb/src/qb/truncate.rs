//! TRUNCATE builder.

use crate::naming::wrap_quotes;
use crate::query::{AffectedCount, Query, QueryExecutor, impl_query_plumbing};
use crate::table::Table;
use crate::token::Token;
use std::sync::Arc;

/// `TRUNCATE <table>` with its identity and cascade options.
pub struct TruncateQuery<E> {
    executor: Arc<E>,
    comment: Vec<Token>,
    tokens: Vec<Token>,
}

impl<E> Clone for TruncateQuery<E> {
    fn clone(&self) -> Self {
        Self {
            executor: Arc::clone(&self.executor),
            comment: self.comment.clone(),
            tokens: self.tokens.clone(),
        }
    }
}

impl<E: QueryExecutor> TruncateQuery<E> {
    pub(crate) fn new(executor: Arc<E>, comment: Vec<Token>, table: &Table) -> Self {
        Self {
            executor,
            comment,
            tokens: vec![
                Token::string("TRUNCATE"),
                Token::String(wrap_quotes(table.relation_name())),
            ],
        }
    }

    fn append(&self, keyword: &str) -> Self {
        let mut tokens = self.tokens.clone();
        tokens.push(Token::string(keyword));
        self.with_query_tokens(tokens)
    }

    pub fn restart_identity(&self) -> Self {
        self.append("RESTART IDENTITY")
    }

    pub fn continue_identity(&self) -> Self {
        self.append("CONTINUE IDENTITY")
    }

    pub fn cascade(&self) -> Self {
        self.append("CASCADE")
    }

    pub fn restrict(&self) -> Self {
        self.append("RESTRICT")
    }
}

impl<E: QueryExecutor> Query for TruncateQuery<E> {
    type Executor = E;
    type Kind = AffectedCount;

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
        Vec::new()
    }

    fn with_query_tokens(&self, tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            ..self.clone()
        }
    }
}

impl_query_plumbing!(TruncateQuery<E>);
