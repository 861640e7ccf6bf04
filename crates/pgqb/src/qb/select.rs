//! SELECT builder.

use crate::column::{Column, JoinType};
use crate::expr::{Expression, Operand};
use crate::naming::wrap_quotes;
use crate::query::{Query, QueryExecutor, Rows, impl_query_plumbing};
use crate::table::{FromItem, FromSource};
use crate::token::{Token, Tokenable};
use std::sync::Arc;

/// Output names contributed by a select item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectKeys {
    Named(Vec<String>),
    /// A bare `*`: names come from the FROM and JOIN sources.
    Star,
}

/// Anything that can appear in a SELECT list.
pub trait Selectable {
    fn select_token(&self) -> Token;
    fn select_keys(&self) -> SelectKeys;
}

impl Selectable for Column {
    fn select_token(&self) -> Token {
        Token::collection(self.to_tokens_with_alias(true))
    }

    fn select_keys(&self) -> SelectKeys {
        SelectKeys::Named(vec![self.column_name().to_string()])
    }
}

impl Selectable for Expression {
    fn select_token(&self) -> Token {
        Token::collection(self.to_tokens_with_alias(true))
    }

    fn select_keys(&self) -> SelectKeys {
        SelectKeys::Named(vec![self.name().to_string()])
    }
}

impl<E: QueryExecutor> Selectable for SelectQuery<E> {
    fn select_token(&self) -> Token {
        Token::group(self.to_tokens())
    }

    fn select_keys(&self) -> SelectKeys {
        SelectKeys::Named(self.returning_keys.iter().take(1).cloned().collect())
    }
}

/// A SELECT statement. Resolves to the executor's rows.
pub struct SelectQuery<E> {
    executor: Arc<E>,
    comment: Vec<Token>,
    tokens: Vec<Token>,
    list: Option<SelectList>,
    returning_keys: Vec<String>,
    includes_star: bool,
    sources: Vec<(String, JoinType)>,
}

/// The select list while a bare `*` can still grow with new sources.
#[derive(Debug, Clone)]
struct SelectList {
    /// Position of the list in `tokens`.
    index: usize,
    /// `None` marks a bare star.
    items: Vec<Option<Token>>,
    star_columns: Vec<Token>,
}

impl SelectList {
    fn render(&self) -> Token {
        let items = self
            .items
            .iter()
            .flat_map(|item| match item {
                Some(token) => vec![token.clone()],
                None if self.star_columns.is_empty() => vec![Token::string("*")],
                None => self.star_columns.clone(),
            })
            .collect();
        Token::separator(",", items)
    }
}

impl<E> std::fmt::Debug for SelectQuery<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectQuery")
            .field("comment", &self.comment)
            .field("tokens", &self.tokens)
            .field("list", &self.list)
            .field("returning_keys", &self.returning_keys)
            .field("includes_star", &self.includes_star)
            .field("sources", &self.sources)
            .finish_non_exhaustive()
    }
}

impl<E> Clone for SelectQuery<E> {
    fn clone(&self) -> Self {
        Self {
            executor: Arc::clone(&self.executor),
            comment: self.comment.clone(),
            tokens: self.tokens.clone(),
            list: self.list.clone(),
            returning_keys: self.returning_keys.clone(),
            includes_star: self.includes_star,
            sources: self.sources.clone(),
        }
    }
}

impl<E: QueryExecutor> SelectQuery<E> {
    pub(crate) fn new(
        executor: Arc<E>,
        comment: Vec<Token>,
        prefix: Vec<Token>,
        items: &[&dyn Selectable],
        distinct: bool,
    ) -> Self {
        let mut returning_keys = Vec::new();
        let mut includes_star = false;
        let mut list_items = Vec::with_capacity(items.len());
        for item in items {
            match item.select_keys() {
                SelectKeys::Named(keys) => {
                    returning_keys.extend(keys);
                    list_items.push(Some(item.select_token()));
                }
                SelectKeys::Star => {
                    includes_star = true;
                    list_items.push(None);
                }
            }
        }

        let mut tokens = prefix;
        tokens.push(Token::string(if distinct {
            "SELECT DISTINCT"
        } else {
            "SELECT"
        }));
        let list = SelectList {
            index: tokens.len(),
            items: list_items,
            star_columns: Vec::new(),
        };
        tokens.push(Token::Empty);

        Self {
            executor,
            comment,
            tokens,
            list: Some(list),
            returning_keys,
            includes_star,
            sources: Vec::new(),
        }
    }

    fn append(&self, tail: impl IntoIterator<Item = Token>) -> Self {
        let mut next = self.clone();
        next.tokens.extend(tail);
        next
    }

    fn add_source(&self, keyword: &str, source: &dyn FromSource, join_type: JoinType) -> Self {
        let mut next = self.append([
            Token::string(keyword),
            Token::collection(source.to_tokens()),
        ]);
        if next.includes_star {
            next.returning_keys.extend(source.column_names());
            if let Some(list) = &mut next.list {
                list.star_columns.extend(source.select_tokens());
            }
        }
        next.sources
            .push((source.source_name().to_string(), join_type));
        next
    }

    fn retag(mut self, join_type: JoinType) -> Self {
        for (_, existing) in &mut self.sources {
            *existing = existing.then(join_type);
        }
        self
    }

    pub fn from(&self, source: &impl FromSource) -> Self {
        self.add_source("FROM", source, JoinType::None)
    }

    /// How `source_name` entered this query, if it did.
    pub fn join_type(&self, source_name: &str) -> Option<JoinType> {
        self.sources
            .iter()
            .find(|(name, _)| name == source_name)
            .map(|(_, join_type)| *join_type)
    }

    /// `ON (<condition>)`
    pub fn on(&self, condition: &Expression) -> Self {
        self.append([Token::string("ON"), Token::group(condition.to_tokens())])
    }

    /// `USING (<col>, ...)` with unqualified column names.
    pub fn using(&self, columns: &[&Column]) -> Self {
        let names = columns
            .iter()
            .map(|c| Token::String(c.snake_case_name()))
            .collect();
        self.append([
            Token::string("USING"),
            Token::group(vec![Token::separator(",", names)]),
        ])
    }

    pub fn where_(&self, condition: &Expression) -> Self {
        self.append([Token::string("WHERE"), Token::collection(condition.to_tokens())])
    }

    fn list(&self, keyword: &str, items: &[&dyn Tokenable]) -> Self {
        let items = items
            .iter()
            .map(|item| Token::collection(item.to_tokens()))
            .collect();
        self.append([Token::string(keyword), Token::separator(",", items)])
    }

    pub fn group_by(&self, items: &[&dyn Tokenable]) -> Self {
        self.list("GROUP BY", items)
    }

    pub fn having(&self, conditions: &[&dyn Tokenable]) -> Self {
        self.list("HAVING", conditions)
    }

    pub fn order_by(&self, items: &[&dyn Tokenable]) -> Self {
        self.list("ORDER BY", items)
    }

    /// `LIMIT $n`
    pub fn limit(&self, count: i64) -> Self {
        self.append([Token::string("LIMIT"), Token::param(count)])
    }

    pub fn limit_all(&self) -> Self {
        self.append([Token::string("LIMIT ALL")])
    }

    pub fn offset(&self, start: i64) -> Self {
        self.append([Token::string("OFFSET"), Token::param(start)])
    }

    /// `FETCH FIRST $n ROWS ONLY`
    pub fn fetch(&self, count: i64) -> Self {
        self.append([
            Token::string("FETCH FIRST"),
            Token::param(count),
            Token::string("ROWS ONLY"),
        ])
    }

    pub fn for_update(&self) -> Self {
        self.append([Token::string("FOR UPDATE")])
    }

    pub fn for_no_key_update(&self) -> Self {
        self.append([Token::string("FOR NO KEY UPDATE")])
    }

    pub fn for_share(&self) -> Self {
        self.append([Token::string("FOR SHARE")])
    }

    pub fn for_key_share(&self) -> Self {
        self.append([Token::string("FOR KEY SHARE")])
    }

    /// Restrict a row lock to one source: `OF <name>`.
    pub fn of(&self, source: &impl FromSource) -> Self {
        self.append([
            Token::string("OF"),
            Token::String(wrap_quotes(source.source_name())),
        ])
    }

    pub fn nowait(&self) -> Self {
        self.append([Token::string("NOWAIT")])
    }

    pub fn skip_locked(&self) -> Self {
        self.append([Token::string("SKIP LOCKED")])
    }

    /// Use this query as a from-item: `(SELECT ...) AS "alias"`.
    pub fn as_(&self, alias: impl Into<String>) -> FromItem {
        let alias = alias.into();
        let tokens = vec![
            Token::group(self.to_tokens()),
            Token::string("AS"),
            Token::String(wrap_quotes(&alias)),
        ];
        FromItem::new(alias, &self.returning_keys, tokens)
    }
}

macro_rules! join_methods {
    ($($(#[$doc:meta])* $name:ident, $lateral:ident => $keyword:literal, $effect:ident;)*) => {
        impl<E: QueryExecutor> SelectQuery<E> {
            $(
                $(#[$doc])*
                pub fn $name(&self, source: &impl FromSource) -> Self {
                    join_methods!(@apply self, source, $keyword, $effect)
                }

                pub fn $lateral(&self, source: &impl FromSource) -> Self {
                    join_methods!(@apply self, source, concat!($keyword, " LATERAL"), $effect)
                }
            )*
        }
    };
    (@apply $self:ident, $source:ident, $keyword:expr, inner) => {
        $self.add_source($keyword, $source, JoinType::None)
    };
    (@apply $self:ident, $source:ident, $keyword:expr, left) => {
        $self.add_source($keyword, $source, JoinType::LeftJoin)
    };
    (@apply $self:ident, $source:ident, $keyword:expr, right) => {
        $self
            .clone()
            .retag(JoinType::LeftSideOfRightJoin)
            .add_source($keyword, $source, JoinType::None)
    };
    (@apply $self:ident, $source:ident, $keyword:expr, full) => {
        $self
            .clone()
            .retag(JoinType::FullJoin)
            .add_source($keyword, $source, JoinType::FullJoin)
    };
}

join_methods! {
    /// `JOIN <source>`
    join, join_lateral => "JOIN", inner;
    inner_join, inner_join_lateral => "INNER JOIN", inner;
    /// Columns of `source` become nullable.
    left_join, left_join_lateral => "LEFT JOIN", left;
    left_outer_join, left_outer_join_lateral => "LEFT OUTER JOIN", left;
    /// Columns of every earlier source become nullable.
    right_join, right_join_lateral => "RIGHT JOIN", right;
    right_outer_join, right_outer_join_lateral => "RIGHT OUTER JOIN", right;
    full_join, full_join_lateral => "FULL JOIN", full;
    full_outer_join, full_outer_join_lateral => "FULL OUTER JOIN", full;
    cross_join, cross_join_lateral => "CROSS JOIN", inner;
}

impl<E: QueryExecutor> Query for SelectQuery<E> {
    type Executor = E;
    type Kind = Rows;

    fn executor(&self) -> &Arc<E> {
        &self.executor
    }

    fn comment_tokens(&self) -> &[Token] {
        &self.comment
    }

    fn to_query_tokens(&self) -> Vec<Token> {
        let mut tokens = self.tokens.clone();
        if let Some(list) = &self.list {
            tokens[list.index] = list.render();
        }
        tokens
    }

    fn returning_keys(&self) -> Vec<String> {
        self.returning_keys.clone()
    }

    /// The new body is taken as final: a bare `*` no longer expands.
    fn with_query_tokens(&self, tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            list: None,
            ..self.clone()
        }
    }
}

impl_query_plumbing!(SelectQuery<E>);

impl<E: QueryExecutor> From<&SelectQuery<E>> for Operand {
    fn from(query: &SelectQuery<E>) -> Self {
        Operand::Query(query.to_tokens())
    }
}

impl<E: QueryExecutor> From<SelectQuery<E>> for Operand {
    fn from(query: SelectQuery<E>) -> Self {
        Operand::Query(query.to_tokens())
    }
}
