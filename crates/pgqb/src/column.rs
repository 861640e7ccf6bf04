//! Column declarations and column references.

use crate::error::{QbError, QbResult};
use crate::expr::{Expression, Operand};
use crate::naming::{to_snake_case, wrap_quotes, wrap_quotes_extended};
use crate::token::{Token, Tokenable};
use serde::Serialize;
use std::ops::{Deref, Index};

/// Snapshot of a declared column, as reported by [`Db::table_definitions`](crate::Db::table_definitions).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDefinitionFormat {
    pub data_type: String,
    pub is_not_null: bool,
    pub is_primary_key: bool,
    pub is_unique: bool,
    pub default_expression: Option<String>,
    pub check_expression: Option<String>,
    pub references_table: Option<String>,
    pub references_column: Option<String>,
    pub references_self: bool,
    pub enum_values: Option<Vec<String>>,
}

/// Declaration of a single column.
///
/// # Example
/// ```ignore
/// use pgqb::column::{text, uuid};
///
/// let id = uuid().primary_key().default("gen_random_uuid()");
/// let name = text().not_null();
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct ColumnDefinition {
    format: ColumnDefinitionFormat,
}

impl ColumnDefinition {
    pub fn new(data_type: impl Into<String>) -> Self {
        Self {
            format: ColumnDefinitionFormat {
                data_type: data_type.into(),
                is_not_null: false,
                is_primary_key: false,
                is_unique: false,
                default_expression: None,
                check_expression: None,
                references_table: None,
                references_column: None,
                references_self: false,
                enum_values: None,
            },
        }
    }

    pub fn not_null(mut self) -> Self {
        self.format.is_not_null = true;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.format.is_primary_key = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.format.is_unique = true;
        self
    }

    /// SQL default expression, e.g. `now()`.
    #[allow(clippy::should_implement_trait)]
    pub fn default(mut self, expression: impl Into<String>) -> Self {
        self.format.default_expression = Some(expression.into());
        self
    }

    pub fn check(mut self, expression: impl Into<String>) -> Self {
        self.format.check_expression = Some(expression.into());
        self
    }

    pub fn references(mut self, table: impl Into<String>, column: impl Into<String>) -> Self {
        self.format.references_table = Some(table.into());
        self.format.references_column = Some(column.into());
        self
    }

    pub fn references_self(mut self, column: impl Into<String>) -> Self {
        self.format.references_self = true;
        self.format.references_column = Some(column.into());
        self
    }

    pub fn definition(&self) -> &ColumnDefinitionFormat {
        &self.format
    }

    pub fn data_type(&self) -> &str {
        &self.format.data_type
    }

    pub fn has_default(&self) -> bool {
        self.format.default_expression.is_some()
    }
}

pub fn data_type(name: impl Into<String>) -> ColumnDefinition {
    ColumnDefinition::new(name)
}

pub fn uuid() -> ColumnDefinition {
    ColumnDefinition::new("uuid")
}

pub fn text() -> ColumnDefinition {
    ColumnDefinition::new("text")
}

pub fn integer() -> ColumnDefinition {
    ColumnDefinition::new("integer")
}

pub fn int8() -> ColumnDefinition {
    ColumnDefinition::new("int8")
}

pub fn bigint() -> ColumnDefinition {
    ColumnDefinition::new("bigint")
}

pub fn numeric() -> ColumnDefinition {
    ColumnDefinition::new("numeric")
}

pub fn boolean() -> ColumnDefinition {
    ColumnDefinition::new("boolean")
}

pub fn jsonb() -> ColumnDefinition {
    ColumnDefinition::new("jsonb")
}

pub fn timestamp_with_time_zone() -> ColumnDefinition {
    ColumnDefinition::new("timestamp with time zone")
}

/// A column of a user-defined enum type.
pub fn enum_type<I, S>(name: impl Into<String>, values: I) -> ColumnDefinition
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut definition = ColumnDefinition::new(name);
    definition.format.enum_values = Some(values.into_iter().map(Into::into).collect());
    definition
}

/// How the owning table entered a SELECT.
///
/// Only recorded; it never changes rendering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JoinType {
    #[default]
    None,
    LeftJoin,
    LeftSideOfRightJoin,
    FullJoin,
}

impl JoinType {
    /// Combine with a later join. The left side of a right join keeps its tag.
    pub fn then(self, next: JoinType) -> JoinType {
        match self {
            JoinType::LeftSideOfRightJoin => self,
            _ => next,
        }
    }

    pub fn is_nullable(self) -> bool {
        self != JoinType::None
    }
}

/// A reference to a declared column of a table (or of an aliased table).
///
/// Dereferences to its [`Expression`], so all operators are available:
/// `foo["id"].eq(1)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    column_name: String,
    table_name: String,
    snake_name: String,
    definition: ColumnDefinitionFormat,
    join_type: JoinType,
    bare: bool,
    expr: Expression,
}

impl Column {
    pub(crate) fn new(
        column_name: impl Into<String>,
        table_name: impl Into<String>,
        definition: &ColumnDefinitionFormat,
    ) -> Self {
        Self::build(column_name.into(), table_name.into(), definition.clone(), false)
    }

    /// A column as written inside an index definition: unqualified, literal values.
    pub(crate) fn for_index(
        column_name: impl Into<String>,
        table_name: impl Into<String>,
        definition: &ColumnDefinitionFormat,
    ) -> Self {
        Self::build(column_name.into(), table_name.into(), definition.clone(), true)
    }

    fn build(
        column_name: String,
        table_name: String,
        definition: ColumnDefinitionFormat,
        bare: bool,
    ) -> Self {
        let snake_name = to_snake_case(&column_name);
        let token = if bare {
            wrap_quotes(&snake_name)
        } else {
            format!("{}.{}", wrap_quotes(&table_name), wrap_quotes(&snake_name))
        };
        let expr = Expression::named(vec![Token::String(token)], column_name.clone())
            .with_data_type(definition.data_type.clone())
            .with_not_null(definition.is_not_null)
            .with_inline_parameters(bare);
        Self {
            column_name,
            table_name,
            snake_name,
            definition,
            join_type: JoinType::None,
            bare,
            expr,
        }
    }

    /// Same column, owned by a differently named table.
    pub(crate) fn rebind(&self, table_name: impl Into<String>) -> Column {
        let mut column = Self::build(
            self.column_name.clone(),
            table_name.into(),
            self.definition.clone(),
            self.bare,
        );
        column.join_type = self.join_type;
        column
    }

    pub fn column_name(&self) -> &str {
        &self.column_name
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Quoted snake_case name for unqualified references (SET, RETURNING, column lists).
    pub fn snake_case_name(&self) -> String {
        wrap_quotes(&self.snake_name)
    }

    pub fn definition(&self) -> &ColumnDefinitionFormat {
        &self.definition
    }

    pub fn has_default(&self) -> bool {
        self.definition.default_expression.is_some()
    }

    pub fn join_type(&self) -> JoinType {
        self.join_type
    }

    pub fn with_join_type(&self, join_type: JoinType) -> Column {
        let mut column = self.clone();
        column.join_type = self.join_type.then(join_type);
        column
    }

    pub fn as_expression(&self) -> &Expression {
        &self.expr
    }

    // `eq` / `ne` must be inherent here, otherwise method lookup on a
    // column picks `PartialEq` before dereferencing to the expression.

    pub fn eq(&self, operand: impl Into<Operand>) -> Expression {
        self.expr.eq(operand)
    }

    pub fn ne(&self, operand: impl Into<Operand>) -> Expression {
        self.expr.ne(operand)
    }

    /// Select-list tokens: `table.snake_name "logicalName"` when the names differ.
    pub fn to_tokens_with_alias(&self, include_alias: bool) -> Vec<Token> {
        let mut tokens = self.expr.tokens().to_vec();
        if include_alias && self.snake_name != self.column_name {
            tokens.push(Token::String(wrap_quotes_extended(&self.column_name)));
        }
        tokens
    }
}

impl Deref for Column {
    type Target = Expression;

    fn deref(&self) -> &Expression {
        &self.expr
    }
}

impl Tokenable for Column {
    fn to_tokens(&self) -> Vec<Token> {
        self.expr.tokens().to_vec()
    }
}

impl From<&Column> for Operand {
    fn from(c: &Column) -> Self {
        Operand::Expr(c.expr.clone())
    }
}

impl From<Column> for Operand {
    fn from(c: Column) -> Self {
        Operand::Expr(c.expr)
    }
}

/// Columns of one table, in declaration order, addressable by logical name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnSet {
    table_name: String,
    columns: Vec<Column>,
}

impl ColumnSet {
    pub(crate) fn new(table_name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            table_name: table_name.into(),
            columns,
        }
    }

    pub fn get(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.column_name == name)
    }

    /// Look up a column, failing when the table does not declare it.
    pub fn column(&self, name: &str) -> QbResult<&Column> {
        self.get(name).ok_or_else(|| {
            QbError::validation(format!(
                "column \"{name}\" does not exist on \"{}\"",
                self.table_name
            ))
        })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Column> {
        self.columns.iter()
    }

    pub fn names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.column_name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl Index<&str> for ColumnSet {
    type Output = Column;

    fn index(&self, name: &str) -> &Column {
        match self.get(name) {
            Some(column) => column,
            None => panic!("column \"{name}\" does not exist on \"{}\"", self.table_name),
        }
    }
}

impl<'a> IntoIterator for &'a ColumnSet {
    type Item = &'a Column;
    type IntoIter = std::slice::Iter<'a, Column>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}
