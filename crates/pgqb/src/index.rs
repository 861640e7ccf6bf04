//! Index definitions and `CREATE INDEX` rendering.
//!
//! Index keys are written against the columns a table hands to its index
//! callback. Those columns render unqualified and inline their literals, so
//! partial predicates come out as `WHERE (status = 'open')`.

use crate::column::Column;
use crate::expr::Expression;
use crate::naming::{to_snake_case, wrap_quotes};
use crate::token::{Token, Tokenable};
use serde::Serialize;

/// Index access method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexType {
    Btree,
    Hash,
    Gist,
    Spgist,
    Gin,
    Brin,
}

impl IndexType {
    pub fn as_str(self) -> &'static str {
        match self {
            IndexType::Btree => "btree",
            IndexType::Hash => "hash",
            IndexType::Gist => "gist",
            IndexType::Spgist => "spgist",
            IndexType::Gin => "gin",
            IndexType::Brin => "brin",
        }
    }
}

/// One key of an index: a plain column or a computed expression.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexKey {
    Column(Column),
    Expr(Expression),
}

impl From<&Column> for IndexKey {
    fn from(c: &Column) -> Self {
        IndexKey::Column(c.clone())
    }
}

impl From<Column> for IndexKey {
    fn from(c: Column) -> Self {
        IndexKey::Column(c)
    }
}

impl From<Expression> for IndexKey {
    fn from(e: Expression) -> Self {
        IndexKey::Expr(e)
    }
}

impl IndexKey {
    fn to_token(&self) -> Token {
        match self {
            IndexKey::Column(c) => Token::collection(c.to_tokens()),
            IndexKey::Expr(e) => Token::group(e.to_tokens()),
        }
    }
}

/// Immutable snapshot of an [`IndexDefinition`].
#[derive(Debug, Clone, PartialEq)]
pub struct IndexDefinitionFormat {
    pub index_type: IndexType,
    pub keys: Vec<IndexKey>,
    pub is_unique: bool,
    pub is_primary_key: bool,
    pub include: Vec<Column>,
    pub where_clause: Option<Expression>,
}

/// Index builder.
///
/// # Example
/// ```ignore
/// TableDefinition::new([("id", uuid()), ("name", text())])
///     .indexes(|c| vec![("fooName", btree([&c["name"]]).unique().include([&c["id"]]))]);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct IndexDefinition {
    format: IndexDefinitionFormat,
}

impl IndexDefinition {
    pub fn new<I, K>(index_type: IndexType, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<IndexKey>,
    {
        Self {
            format: IndexDefinitionFormat {
                index_type,
                keys: keys.into_iter().map(Into::into).collect(),
                is_unique: false,
                is_primary_key: false,
                include: Vec::new(),
                where_clause: None,
            },
        }
    }

    pub fn unique(mut self) -> Self {
        self.format.is_unique = true;
        self
    }

    /// Marks the index as the primary key. Implies `unique`.
    pub fn primary_key(mut self) -> Self {
        self.format.is_primary_key = true;
        self.format.is_unique = true;
        self
    }

    /// Non-key columns stored in the index (`INCLUDE (...)`).
    pub fn include<'a, I>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = &'a Column>,
    {
        self.format.include.extend(columns.into_iter().cloned());
        self
    }

    /// Partial index predicate.
    pub fn where_(mut self, predicate: Expression) -> Self {
        self.format.where_clause = Some(predicate);
        self
    }

    pub fn definition(&self) -> IndexDefinitionFormat {
        self.format.clone()
    }
}

pub fn btree<I, K>(keys: I) -> IndexDefinition
where
    I: IntoIterator<Item = K>,
    K: Into<IndexKey>,
{
    IndexDefinition::new(IndexType::Btree, keys)
}

pub fn gist<I, K>(keys: I) -> IndexDefinition
where
    I: IntoIterator<Item = K>,
    K: Into<IndexKey>,
{
    IndexDefinition::new(IndexType::Gist, keys)
}

pub fn gin<I, K>(keys: I) -> IndexDefinition
where
    I: IntoIterator<Item = K>,
    K: Into<IndexKey>,
{
    IndexDefinition::new(IndexType::Gin, keys)
}

/// A named index bound to its table.
#[derive(Debug, Clone, PartialEq)]
pub struct Index {
    name: String,
    table_name: String,
    definition: IndexDefinitionFormat,
}

impl Index {
    pub(crate) fn new(
        name: impl Into<String>,
        table_name: impl Into<String>,
        definition: IndexDefinitionFormat,
    ) -> Self {
        Self {
            name: name.into(),
            table_name: table_name.into(),
            definition,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn snake_case_name(&self) -> String {
        wrap_quotes(&to_snake_case(&self.name))
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn definition(&self) -> &IndexDefinitionFormat {
        &self.definition
    }
}

impl Tokenable for Index {
    fn to_tokens(&self) -> Vec<Token> {
        let def = &self.definition;
        let mut tokens = vec![
            Token::string(if def.is_unique {
                "CREATE UNIQUE INDEX"
            } else {
                "CREATE INDEX"
            }),
            Token::String(self.snake_case_name()),
            Token::string("ON"),
            Token::String(format!("public.{}", wrap_quotes(&self.table_name))),
            Token::string("USING"),
            Token::string(def.index_type.as_str()),
            Token::group(vec![Token::separator(
                ",",
                def.keys.iter().map(IndexKey::to_token).collect(),
            )]),
        ];

        if !def.include.is_empty() {
            tokens.push(Token::string("INCLUDE"));
            tokens.push(Token::group(vec![Token::separator(
                ",",
                def.include
                    .iter()
                    .map(|c| Token::collection(c.to_tokens()))
                    .collect(),
            )]));
        }

        if let Some(predicate) = &def.where_clause {
            tokens.push(Token::string("WHERE"));
            tokens.push(Token::group(predicate.to_tokens()));
        }

        tokens
    }
}
