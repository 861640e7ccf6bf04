//! Expression algebra.
//!
//! An [`Expression`] is a token sequence plus the metadata a SELECT list needs:
//! an output name, whether that name is an explicit alias, a data type and a
//! not-null flag. Every operator returns a new expression; receivers are never
//! modified, so partially built conditions can be shared freely.
//!
//! ```ignore
//! let cond = foo["value"].gt(10).and(foo["name"].ilike("%bar%"));
//! ```

use crate::error::{QbError, QbResult};
use crate::naming::wrap_quotes_extended;
use crate::token::{InlineValue, Token, Tokenable};
use crate::value::Value;

/// Output name PostgreSQL gives to an unnamed select item.
pub const DEFAULT_NAME: &str = "?column?";

/// The right-hand side of an operator.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Bound as `$N`, or inlined when the receiver renders literals.
    Value(Value),
    /// Always rendered as a literal.
    Inline(InlineValue),
    /// Spliced in as-is.
    Expr(Expression),
    /// A full statement, spliced in parentheses.
    Query(Vec<Token>),
}

macro_rules! impl_operand_from_value {
    ($($t:ty),*) => {
        $(impl From<$t> for Operand {
            fn from(v: $t) -> Self {
                Operand::Value(Value::from(v))
            }
        })*
    };
}

impl_operand_from_value!(
    i8, i16, i32, i64, u8, u16, u32, f32, f64, bool, &str, String, &String,
    serde_json::Value, uuid::Uuid, chrono::DateTime<chrono::Utc>
);

impl From<Value> for Operand {
    fn from(v: Value) -> Self {
        Operand::Value(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Operand {
    fn from(v: Option<T>) -> Self {
        Operand::Value(v.into())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Operand {
    fn from(v: Vec<T>) -> Self {
        Operand::Value(v.into())
    }
}

impl From<InlineValue> for Operand {
    fn from(v: InlineValue) -> Self {
        Operand::Inline(v)
    }
}

impl From<Expression> for Operand {
    fn from(e: Expression) -> Self {
        Operand::Expr(e)
    }
}

impl From<&Expression> for Operand {
    fn from(e: &Expression) -> Self {
        Operand::Expr(e.clone())
    }
}

/// A named, typed token sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    tokens: Vec<Token>,
    name: String,
    name_is_alias: bool,
    inline_parameters: bool,
    data_type: Option<String>,
    is_not_null: bool,
}

impl Expression {
    /// An unnamed expression (`?column?`).
    pub fn new(tokens: Vec<Token>) -> Self {
        Self::named(tokens, DEFAULT_NAME)
    }

    pub fn named(tokens: Vec<Token>, name: impl Into<String>) -> Self {
        Self {
            tokens,
            name: name.into(),
            name_is_alias: false,
            inline_parameters: false,
            data_type: None,
            is_not_null: false,
        }
    }

    pub fn with_data_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = Some(data_type.into());
        self
    }

    pub fn with_not_null(mut self, is_not_null: bool) -> Self {
        self.is_not_null = is_not_null;
        self
    }

    /// Render plain values as literals instead of parameters.
    pub fn with_inline_parameters(mut self, inline: bool) -> Self {
        self.inline_parameters = inline;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn name_is_alias(&self) -> bool {
        self.name_is_alias
    }

    pub fn data_type(&self) -> Option<&str> {
        self.data_type.as_deref()
    }

    /// Whether the value is known to be non-null.
    pub fn declared_not_null(&self) -> bool {
        self.is_not_null
    }

    pub fn inline_parameters(&self) -> bool {
        self.inline_parameters
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Tokens for a top-level select item.
    ///
    /// Aliases are always emitted. Default names are emitted only when they
    /// contain an uppercase letter, since PostgreSQL would fold them.
    pub fn to_tokens_with_alias(&self, include_alias: bool) -> Vec<Token> {
        let mut tokens = self.tokens.clone();
        if include_alias && (self.name_is_alias || self.name.chars().any(char::is_uppercase)) {
            tokens.push(Token::String(wrap_quotes_extended(&self.name)));
        }
        tokens
    }

    /// Rename the expression. Compound expressions are parenthesized first.
    pub fn as_(&self, alias: impl Into<String>) -> Expression {
        let tokens = if self.tokens.len() > 2 {
            vec![Token::group(self.tokens.clone())]
        } else {
            self.tokens.clone()
        };
        Expression {
            tokens,
            name: alias.into(),
            name_is_alias: true,
            inline_parameters: false,
            data_type: self.data_type.clone(),
            is_not_null: self.is_not_null,
        }
    }

    fn value_token(&self, value: Value) -> Token {
        if self.inline_parameters {
            Token::Inline(value.into())
        } else {
            Token::Parameter(value)
        }
    }

    fn operand_tokens(&self, operand: Operand) -> Vec<Token> {
        match operand {
            Operand::Value(value) => vec![self.value_token(value)],
            Operand::Inline(inline) => vec![Token::Inline(inline)],
            Operand::Expr(expr) => expr.tokens,
            Operand::Query(tokens) => vec![Token::group(tokens)],
        }
    }

    fn parenthesized(&self, operand: Operand) -> Token {
        match operand {
            Operand::Query(tokens) => Token::group(tokens),
            other => Token::group(self.operand_tokens(other)),
        }
    }

    /// `to_group` over the operand; sub-queries are grouped by their own length.
    fn grouped(&self, operand: Operand) -> Token {
        match operand {
            Operand::Query(tokens) => to_group(tokens),
            other => to_group(self.operand_tokens(other)),
        }
    }

    fn extend(&self, tail: impl IntoIterator<Item = Token>) -> Vec<Token> {
        let mut tokens = self.tokens.clone();
        tokens.extend(tail);
        tokens
    }

    fn binary(&self, operator: &str, operand: Operand) -> Vec<Token> {
        let operand = self.operand_tokens(operand);
        self.extend(std::iter::once(Token::string(operator)).chain(operand))
    }

    fn predicate(tokens: Vec<Token>) -> Expression {
        Expression::new(tokens).with_data_type("boolean").with_not_null(true)
    }

    fn arithmetic(&self, operator: &str, operand: Operand) -> Expression {
        let mut expr = Expression::new(self.binary(operator, operand));
        expr.data_type = self.data_type.clone();
        expr.is_not_null = self.is_not_null;
        expr
    }

    fn compare(&self, operator: &str, operand: impl Into<Operand>) -> Expression {
        Self::predicate(self.binary(operator, operand.into()))
    }

    fn combine(&self, operator: &str, operand: Operand) -> Expression {
        let grouped = self.grouped(operand);
        Self::predicate(self.extend([Token::string(operator), grouped]))
    }

    fn suffix(&self, keyword: &str) -> Vec<Token> {
        self.extend([Token::string(keyword)])
    }

    pub fn eq(&self, operand: impl Into<Operand>) -> Expression {
        self.compare("=", operand)
    }

    pub fn ne(&self, operand: impl Into<Operand>) -> Expression {
        self.compare("<>", operand)
    }

    pub fn gt(&self, operand: impl Into<Operand>) -> Expression {
        self.compare(">", operand)
    }

    pub fn gte(&self, operand: impl Into<Operand>) -> Expression {
        self.compare(">=", operand)
    }

    pub fn lt(&self, operand: impl Into<Operand>) -> Expression {
        self.compare("<", operand)
    }

    pub fn lte(&self, operand: impl Into<Operand>) -> Expression {
        self.compare("<=", operand)
    }

    pub fn like(&self, operand: impl Into<Operand>) -> Expression {
        self.compare("LIKE", operand)
    }

    pub fn ilike(&self, operand: impl Into<Operand>) -> Expression {
        self.compare("ILIKE", operand)
    }

    pub fn is_distinct_from(&self, operand: impl Into<Operand>) -> Expression {
        self.compare("IS DISTINCT FROM", operand)
    }

    pub fn is_not_distinct_from(&self, operand: impl Into<Operand>) -> Expression {
        self.compare("IS NOT DISTINCT FROM", operand)
    }

    fn membership<I, T>(&self, operator: &str, values: I) -> QbResult<Expression>
    where
        I: IntoIterator<Item = T>,
        T: Into<Operand>,
    {
        let items: Vec<Token> = values
            .into_iter()
            .map(|v| {
                let mut tokens = self.operand_tokens(v.into());
                if tokens.len() == 1 {
                    tokens.remove(0)
                } else {
                    Token::collection(tokens)
                }
            })
            .collect();
        if items.is_empty() {
            return Err(QbError::validation(format!(
                "{operator} requires at least one value"
            )));
        }
        Ok(Self::predicate(self.extend([
            Token::string(operator),
            Token::group(vec![Token::separator(",", items)]),
        ])))
    }

    /// `IN ($1, $2, ...)`. An empty list is rejected.
    pub fn in_list<I, T>(&self, values: I) -> QbResult<Expression>
    where
        I: IntoIterator<Item = T>,
        T: Into<Operand>,
    {
        self.membership("IN", values)
    }

    /// `NOT IN ($1, $2, ...)`. An empty list is rejected.
    pub fn not_in<I, T>(&self, values: I) -> QbResult<Expression>
    where
        I: IntoIterator<Item = T>,
        T: Into<Operand>,
    {
        self.membership("NOT IN", values)
    }

    /// `IN (<sub-query or expression>)`.
    pub fn in_query(&self, operand: impl Into<Operand>) -> Expression {
        let group = self.parenthesized(operand.into());
        Self::predicate(self.extend([Token::string("IN"), group]))
    }

    /// `NOT IN (<sub-query or expression>)`.
    pub fn not_in_query(&self, operand: impl Into<Operand>) -> Expression {
        let group = self.parenthesized(operand.into());
        Self::predicate(self.extend([Token::string("NOT IN"), group]))
    }

    fn between_with(
        &self,
        keyword: &str,
        low: impl Into<Operand>,
        high: impl Into<Operand>,
    ) -> Expression {
        let mut tail = vec![Token::string(keyword)];
        tail.extend(self.operand_tokens(low.into()));
        tail.push(Token::string("AND"));
        tail.extend(self.operand_tokens(high.into()));
        Self::predicate(self.extend(tail))
    }

    pub fn between(&self, low: impl Into<Operand>, high: impl Into<Operand>) -> Expression {
        self.between_with("BETWEEN", low, high)
    }

    pub fn between_symmetric(
        &self,
        low: impl Into<Operand>,
        high: impl Into<Operand>,
    ) -> Expression {
        self.between_with("BETWEEN SYMMETRIC", low, high)
    }

    pub fn plus(&self, operand: impl Into<Operand>) -> Expression {
        self.arithmetic("+", operand.into())
    }

    pub fn minus(&self, operand: impl Into<Operand>) -> Expression {
        self.arithmetic("-", operand.into())
    }

    pub fn multiply(&self, operand: impl Into<Operand>) -> Expression {
        self.arithmetic("*", operand.into())
    }

    pub fn divide(&self, operand: impl Into<Operand>) -> Expression {
        self.arithmetic("/", operand.into())
    }

    pub fn modulo(&self, operand: impl Into<Operand>) -> Expression {
        self.arithmetic("%", operand.into())
    }

    pub fn concat(&self, operand: impl Into<Operand>) -> Expression {
        Expression::new(self.binary("||", operand.into()))
            .with_data_type("text")
            .with_not_null(self.is_not_null)
    }

    pub fn and(&self, operand: impl Into<Operand>) -> Expression {
        self.combine("AND", operand.into())
    }

    pub fn or(&self, operand: impl Into<Operand>) -> Expression {
        self.combine("OR", operand.into())
    }

    pub fn and_exists(&self, operand: impl Into<Operand>) -> Expression {
        let group = self.grouped(operand.into());
        Self::predicate(self.extend([Token::string("AND EXISTS"), group]))
    }

    pub fn and_not_exists(&self, operand: impl Into<Operand>) -> Expression {
        let group = self.grouped(operand.into());
        Self::predicate(self.extend([Token::string("AND NOT EXISTS"), group]))
    }

    pub fn is_null(&self) -> Expression {
        Self::predicate(self.suffix("IS NULL"))
    }

    pub fn is_not_null(&self) -> Expression {
        Self::predicate(self.suffix("IS NOT NULL"))
    }

    fn ordering(&self, keyword: &str) -> Expression {
        let mut expr = Expression::new(self.suffix(keyword));
        expr.data_type = self.data_type.clone();
        expr
    }

    pub fn asc(&self) -> Expression {
        self.ordering("ASC")
    }

    pub fn desc(&self) -> Expression {
        self.ordering("DESC")
    }

    pub fn nulls_first(&self) -> Expression {
        self.ordering("NULLS FIRST")
    }

    pub fn nulls_last(&self) -> Expression {
        self.ordering("NULLS LAST")
    }

    /// Append an `ORDER BY` list, as used inside aggregate calls.
    pub fn order_by(&self, expressions: &[&Expression]) -> Expression {
        let items = expressions
            .iter()
            .map(|e| Token::collection(e.tokens.clone()))
            .collect();
        let mut expr = Expression::named(
            self.extend([Token::string("ORDER BY"), Token::separator(",", items)]),
            self.name.clone(),
        );
        expr.data_type = self.data_type.clone();
        expr.is_not_null = self.is_not_null;
        expr
    }
}

impl Tokenable for Expression {
    fn to_tokens(&self) -> Vec<Token> {
        self.tokens.clone()
    }
}

/// Parenthesize compound operands of boolean combinators, keep short ones flat.
pub(crate) fn to_group(tokens: Vec<Token>) -> Token {
    if tokens.len() > 3 {
        Token::group(tokens)
    } else {
        Token::collection(tokens)
    }
}
