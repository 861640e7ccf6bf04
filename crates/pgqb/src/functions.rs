//! SQL function helpers and select-list markers.

use crate::error::{QbError, QbResult};
use crate::expr::{Expression, Operand};
use crate::qb::{SelectKeys, Selectable};
use crate::table::FromSource;
use crate::token::{InlineValue, Token};
use crate::value::Value;

/// A `*` select item.
#[derive(Debug, Clone, PartialEq)]
pub struct Star {
    expanded: Option<(Token, Vec<String>)>,
}

/// All columns of every FROM / JOIN source, expanded and aliased.
pub fn star() -> Star {
    Star { expanded: None }
}

/// All columns of `source` (`foo.*`), expanded and aliased.
pub fn star_of(source: &impl FromSource) -> Star {
    Star {
        expanded: Some((
            Token::separator(",", source.select_tokens()),
            source.column_names(),
        )),
    }
}

impl Selectable for Star {
    fn select_token(&self) -> Token {
        match &self.expanded {
            Some((token, _)) => token.clone(),
            None => Token::string("*"),
        }
    }

    fn select_keys(&self) -> SelectKeys {
        match &self.expanded {
            Some((_, keys)) => SelectKeys::Named(keys.clone()),
            None => SelectKeys::Star,
        }
    }
}

fn operand_group(operand: Operand) -> Token {
    match operand {
        Operand::Value(value) => Token::group(vec![Token::Parameter(value)]),
        Operand::Inline(inline) => Token::group(vec![Token::Inline(inline)]),
        Operand::Expr(expr) => Token::group(expr.tokens().to_vec()),
        Operand::Query(tokens) => Token::group(tokens),
    }
}

/// `EXISTS (<sub-query>)`
pub fn exists(query: impl Into<Operand>) -> Expression {
    Expression::new(vec![Token::string("EXISTS"), operand_group(query.into())])
        .with_data_type("boolean")
        .with_not_null(true)
}

/// `NOT EXISTS (<sub-query>)`
pub fn not_exists(query: impl Into<Operand>) -> Expression {
    Expression::new(vec![Token::string("NOT EXISTS"), operand_group(query.into())])
        .with_data_type("boolean")
        .with_not_null(true)
}

fn operand_token(operand: Operand) -> Token {
    match operand {
        Operand::Value(value) => Token::Parameter(value),
        Operand::Inline(inline) => Token::Inline(inline),
        Operand::Expr(expr) => Token::collection(expr.tokens().to_vec()),
        Operand::Query(tokens) => Token::group(tokens),
    }
}

/// `function (<arguments>)` under the default output `name`.
fn call(function: &str, name: &str, arguments: Vec<Token>) -> Expression {
    Expression::named(vec![Token::string(function), Token::group(arguments)], name)
}

fn aggregate(function: &str, expression: &Expression) -> Expression {
    call(
        function,
        &function.to_ascii_lowercase(),
        expression.tokens().to_vec(),
    )
}

fn keep_data_type(result: Expression, expression: &Expression) -> Expression {
    match expression.data_type() {
        Some(data_type) => result.with_data_type(data_type),
        None => result,
    }
}

/// `COUNT(*)`
pub fn count_all() -> Expression {
    Expression::named(vec![Token::string("COUNT(*)")], "count")
        .with_data_type("int8")
        .with_not_null(true)
}

/// `COUNT (<expression>)`
pub fn count(expression: &Expression) -> Expression {
    aggregate("COUNT", expression)
        .with_data_type("int8")
        .with_not_null(true)
}

pub fn sum(expression: &Expression) -> Expression {
    aggregate("SUM", expression)
}

pub fn min(expression: &Expression) -> Expression {
    keep_data_type(aggregate("MIN", expression), expression)
}

pub fn max(expression: &Expression) -> Expression {
    keep_data_type(aggregate("MAX", expression), expression)
}

pub fn avg(expression: &Expression) -> Expression {
    aggregate("AVG", expression).with_data_type("numeric")
}

/// `array_agg (<expression>)`, selected as `"arrayAgg"`.
///
/// Order the elements with [`Expression::order_by`] on the argument.
pub fn array_agg(expression: &Expression) -> Expression {
    let agg = call("array_agg", "arrayAgg", expression.tokens().to_vec());
    match expression.data_type() {
        Some(data_type) => agg.with_data_type(format!("{data_type}[]")),
        None => agg,
    }
}

/// `string_agg (<expression>, <delimiter> [ORDER BY ...])`, selected as `"stringAgg"`.
pub fn string_agg(
    expression: &Expression,
    delimiter: impl Into<Operand>,
    order_by: &[&Expression],
) -> Expression {
    let mut tail = vec![operand_token(delimiter.into())];
    if !order_by.is_empty() {
        let items = order_by
            .iter()
            .map(|e| Token::collection(e.tokens().to_vec()))
            .collect();
        tail.push(Token::string("ORDER BY"));
        tail.push(Token::separator(",", items));
    }
    let arguments = Token::separator(
        ",",
        vec![
            Token::collection(expression.tokens().to_vec()),
            Token::collection(tail),
        ],
    );
    call("string_agg", "stringAgg", vec![arguments]).with_data_type("text")
}

pub fn bit_and(expression: &Expression) -> Expression {
    keep_data_type(
        call("bit_and", "bitAnd", expression.tokens().to_vec()),
        expression,
    )
}

pub fn bit_or(expression: &Expression) -> Expression {
    keep_data_type(
        call("bit_or", "bitOr", expression.tokens().to_vec()),
        expression,
    )
}

/// `ANY ($1)` with the values bound as one array parameter.
///
/// An empty list is allowed and matches nothing.
pub fn any<I, T>(values: I) -> Expression
where
    I: IntoIterator<Item = T>,
    T: Into<Value>,
{
    let array = Value::Array(values.into_iter().map(Into::into).collect());
    Expression::new(vec![
        Token::string("ANY"),
        Token::group(vec![Token::Parameter(array)]),
    ])
}

/// Parenthesize an expression as a whole: `(<expression>)`.
pub fn group(expression: &Expression) -> Expression {
    let grouped = Expression::named(
        vec![Token::group(expression.tokens().to_vec())],
        expression.name(),
    )
    .with_not_null(expression.declared_not_null());
    keep_data_type(grouped, expression)
}

/// Start a `CASE` expression.
///
/// ```ignore
/// let greatness = case()
///     .when(&foo["value"].gt(0))
///     .then("great")
///     .else_("not great")
///     .end()?
///     .as_("greatness");
/// ```
pub fn case() -> CaseStatement {
    CaseStatement::default()
}

/// A `CASE` expression under construction.
#[derive(Debug, Clone, Default, PartialEq)]
#[must_use]
pub struct CaseStatement {
    branches: Vec<Token>,
    otherwise: Option<Token>,
}

impl CaseStatement {
    pub fn when(self, condition: &Expression) -> CaseWhen {
        CaseWhen {
            statement: self,
            condition: Token::collection(condition.tokens().to_vec()),
        }
    }

    /// `ELSE <value>`. A later call replaces an earlier one.
    pub fn else_(mut self, value: impl Into<Operand>) -> Self {
        self.otherwise = Some(operand_token(value.into()));
        self
    }

    /// `CASE WHEN ... THEN ... [ELSE ...] END`. At least one branch is required.
    pub fn end(&self) -> QbResult<Expression> {
        if self.branches.is_empty() {
            return Err(QbError::validation("CASE requires at least one WHEN"));
        }
        let mut tokens = vec![Token::string("CASE")];
        tokens.extend(self.branches.iter().cloned());
        if let Some(otherwise) = &self.otherwise {
            tokens.push(Token::string("ELSE"));
            tokens.push(otherwise.clone());
        }
        tokens.push(Token::string("END"));
        Ok(Expression::named(tokens, "case"))
    }
}

/// A `WHEN` condition waiting for its `THEN` value.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct CaseWhen {
    statement: CaseStatement,
    condition: Token,
}

impl CaseWhen {
    pub fn then(self, value: impl Into<Operand>) -> CaseStatement {
        let mut statement = self.statement;
        statement.branches.push(Token::collection(vec![
            Token::string("WHEN"),
            self.condition,
            Token::string("THEN"),
            operand_token(value.into()),
        ]));
        statement
    }
}

/// A literal that is always written into the SQL text: `'value'::cast`.
///
/// Needed where parameters are not allowed, e.g. partial index predicates
/// comparing against an enum.
pub fn inline_value(value: impl Into<String>, cast: impl Into<String>) -> InlineValue {
    InlineValue::cast(value, cast)
}

/// Verbatim SQL text.
pub fn raw(sql: impl Into<String>) -> Expression {
    Expression::new(vec![Token::String(sql.into())])
}

/// Verbatim SQL fragments interleaved with bound values.
///
/// ```ignore
/// // (name, value) > ($1, $2)
/// raw("(name, value)").gt(raw_with(&["(", ",", ")"], ["Test".into(), 123.into()]));
/// ```
pub fn raw_with<I>(fragments: &[&str], values: I) -> Expression
where
    I: IntoIterator<Item = Operand>,
{
    let mut values = values.into_iter();
    let mut tokens = Vec::new();
    for (index, fragment) in fragments.iter().enumerate() {
        if !fragment.is_empty() {
            tokens.push(Token::string(*fragment));
        }
        if index + 1 < fragments.len() {
            if let Some(operand) = values.next() {
                tokens.push(operand_token(operand));
            }
        }
    }
    Expression::new(tokens)
}
