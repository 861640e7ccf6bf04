//! Tables, aliased tables and other from-items.

use crate::column::{Column, ColumnDefinition, ColumnSet};
use crate::error::{QbError, QbResult};
use crate::expr::Expression;
use crate::index::{Index, IndexDefinition, IndexDefinitionFormat};
use crate::naming::wrap_quotes;
use crate::token::{TableRef, Token, Tokenable};
use std::fmt;
use std::ops;
use std::sync::Arc;

type IndexFn = dyn Fn(&ColumnSet) -> Vec<(String, IndexDefinition)> + Send + Sync;

/// Declared shape of a table: its columns and an optional index callback.
#[derive(Clone)]
pub struct TableDefinition {
    columns: Vec<(String, ColumnDefinition)>,
    indexes: Option<Arc<IndexFn>>,
}

impl TableDefinition {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = (S, ColumnDefinition)>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(|(n, d)| (n.into(), d)).collect(),
            indexes: None,
        }
    }

    /// Declare indexes against the table's unqualified columns.
    pub fn indexes<F, S>(mut self, define: F) -> Self
    where
        F: Fn(&ColumnSet) -> Vec<(S, IndexDefinition)> + Send + Sync + 'static,
        S: Into<String>,
    {
        let define: Arc<IndexFn> = Arc::new(move |columns: &ColumnSet| {
            define(columns)
                .into_iter()
                .map(|(name, def)| (name.into(), def))
                .collect()
        });
        self.indexes = Some(define);
        self
    }

    pub fn columns(&self) -> &[(String, ColumnDefinition)] {
        &self.columns
    }

    pub(crate) fn index_definitions(&self, table_name: &str) -> Vec<(String, IndexDefinitionFormat)> {
        let Some(define) = &self.indexes else {
            return Vec::new();
        };
        let bare = ColumnSet::new(
            table_name,
            self.columns
                .iter()
                .map(|(name, def)| Column::for_index(name.as_str(), table_name, def.definition()))
                .collect(),
        );
        define(&bare)
            .into_iter()
            .map(|(name, def)| (name, def.definition()))
            .collect()
    }
}

impl fmt::Debug for TableDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableDefinition")
            .field("columns", &self.columns)
            .field("indexes", &self.indexes.is_some())
            .finish()
    }
}

/// Where a table's rows come from.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TableSource {
    Declared,
    /// An inline `VALUES` list and its rendered column list.
    Values { rows: Token, column_list: Token },
}

/// A declared table, an aliased view of one, or a `VALUES` list.
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    original_name: Option<String>,
    columns: ColumnSet,
    definition: Arc<TableDefinition>,
    source: TableSource,
}

impl Table {
    pub fn new(name: impl Into<String>, definition: TableDefinition) -> Self {
        Self::with_source(name.into(), None, Arc::new(definition), TableSource::Declared)
    }

    pub(crate) fn with_source(
        name: String,
        original_name: Option<String>,
        definition: Arc<TableDefinition>,
        source: TableSource,
    ) -> Self {
        let columns = definition
            .columns
            .iter()
            .map(|(column, def)| Column::new(column.as_str(), name.as_str(), def.definition()))
            .collect();
        Self {
            columns: ColumnSet::new(name.as_str(), columns),
            name,
            original_name,
            definition,
            source,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The name before aliasing, if this table is an alias.
    pub fn original_name(&self) -> Option<&str> {
        self.original_name.as_deref()
    }

    /// The name of the underlying relation.
    pub fn relation_name(&self) -> &str {
        self.original_name.as_deref().unwrap_or(&self.name)
    }

    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    pub fn get(&self, column: &str) -> Option<&Column> {
        self.columns.get(column)
    }

    pub fn column(&self, column: &str) -> QbResult<&Column> {
        self.columns.column(column)
    }

    pub fn definition(&self) -> &TableDefinition {
        &self.definition
    }

    /// A new table with the same columns, all owned by `alias`.
    pub fn as_(&self, alias: impl Into<String>) -> Table {
        let alias = alias.into();
        let original_name = match self.source {
            TableSource::Declared => Some(self.relation_name().to_string()),
            TableSource::Values { .. } => None,
        };
        let columns = self.columns.iter().map(|c| c.rebind(alias.as_str())).collect();
        Table {
            columns: ColumnSet::new(alias.as_str(), columns),
            name: alias,
            original_name,
            definition: Arc::clone(&self.definition),
            source: self.source.clone(),
        }
    }

    /// Materialize the declared indexes.
    pub fn indexes(&self) -> Vec<Index> {
        let table_name = self.relation_name();
        self.definition
            .index_definitions(table_name)
            .into_iter()
            .map(|(name, def)| Index::new(name, table_name, def))
            .collect()
    }

    pub(crate) fn table_ref(&self) -> Token {
        Token::Table(TableRef {
            name: self.name.clone(),
            original_name: self.original_name.clone(),
        })
    }
}

impl Tokenable for Table {
    fn to_tokens(&self) -> Vec<Token> {
        match &self.source {
            TableSource::Declared => vec![self.table_ref()],
            TableSource::Values { rows, column_list } => vec![
                rows.clone(),
                Token::string("AS"),
                self.table_ref(),
                column_list.clone(),
            ],
        }
    }
}

impl ops::Index<&str> for Table {
    type Output = Column;

    fn index(&self, column: &str) -> &Column {
        &self.columns[column]
    }
}

/// A named result set that is not a declared table: a CTE or an aliased sub-select.
#[derive(Debug, Clone, PartialEq)]
pub struct FromItem {
    name: String,
    tokens: Vec<Token>,
    columns: Vec<Expression>,
}

impl FromItem {
    pub(crate) fn new(name: impl Into<String>, keys: &[String], tokens: Vec<Token>) -> Self {
        let name = name.into();
        let columns = keys
            .iter()
            .map(|key| {
                Expression::named(
                    vec![Token::String(format!("{}.{}", wrap_quotes(&name), wrap_quotes(key)))],
                    key.clone(),
                )
            })
            .collect();
        Self {
            name,
            tokens,
            columns,
        }
    }

    /// Reference to a CTE: renders as its bare name.
    pub(crate) fn cte(name: impl Into<String>, keys: &[String]) -> Self {
        let name = name.into();
        let tokens = vec![Token::Table(TableRef {
            name: name.clone(),
            original_name: None,
        })];
        Self::new(name, keys, tokens)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, key: &str) -> Option<&Expression> {
        self.columns.iter().find(|c| c.name() == key)
    }

    pub fn column(&self, key: &str) -> QbResult<&Expression> {
        self.get(key).ok_or_else(|| {
            QbError::validation(format!("column \"{key}\" does not exist on \"{}\"", self.name))
        })
    }

    pub fn columns(&self) -> &[Expression] {
        &self.columns
    }
}

impl Tokenable for FromItem {
    fn to_tokens(&self) -> Vec<Token> {
        self.tokens.clone()
    }
}

impl ops::Index<&str> for FromItem {
    type Output = Expression;

    fn index(&self, key: &str) -> &Expression {
        match self.get(key) {
            Some(column) => column,
            None => panic!("column \"{key}\" does not exist on \"{}\"", self.name),
        }
    }
}

/// Anything usable in FROM, JOIN, USING or UPDATE ... FROM.
pub trait FromSource: Tokenable {
    fn source_name(&self) -> &str;

    /// Output column names, in order.
    fn column_names(&self) -> Vec<String>;

    /// One select-list item per column, aliased where needed.
    fn select_tokens(&self) -> Vec<Token>;
}

impl FromSource for Table {
    fn source_name(&self) -> &str {
        &self.name
    }

    fn column_names(&self) -> Vec<String> {
        self.columns.names()
    }

    fn select_tokens(&self) -> Vec<Token> {
        self.columns
            .iter()
            .map(|c| Token::collection(c.to_tokens_with_alias(true)))
            .collect()
    }
}

impl FromSource for FromItem {
    fn source_name(&self) -> &str {
        &self.name
    }

    fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name().to_string()).collect()
    }

    fn select_tokens(&self) -> Vec<Token> {
        self.columns
            .iter()
            .map(|c| Token::collection(c.to_tokens_with_alias(true)))
            .collect()
    }
}
