//! Token tree and the reduction engine.
//!
//! Every builder in this crate produces a `Vec<Token>`. Rendering walks the tree
//! depth-first, left to right, collecting text fragments and bind values:
//!
//! ```ignore
//! use pgqb::token::{reduce, Token};
//!
//! let tokens = vec![
//!     Token::string("SELECT"),
//!     Token::param(1),
//!     Token::string("IN"),
//!     Token::group(vec![Token::separator(",", vec![Token::param(2), Token::param(3)])]),
//! ];
//! let built = reduce(&tokens);
//! assert_eq!(built.text, "SELECT $1 IN ($2, $3)");
//! ```

use crate::naming::wrap_quotes;
use crate::value::Value;

/// A node in the intermediate representation of a SQL fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Literal SQL text, inserted verbatim.
    String(String),
    /// A bound value rendered as `$N`.
    Parameter(Value),
    /// A literal rendered directly into the text.
    Inline(InlineValue),
    /// Children wrapped in `open` / `close`, glued to the first and last fragment.
    Group {
        tokens: Vec<Token>,
        open: &'static str,
        close: &'static str,
    },
    /// Children joined by `separator`, glued to the end of each child but the last.
    Separator {
        separator: &'static str,
        tokens: Vec<Token>,
    },
    /// Children concatenated without delimiters.
    Collection(Vec<Token>),
    /// A table or from-item reference.
    Table(TableRef),
    /// Renders nothing.
    Empty,
}

impl Token {
    pub fn string(text: impl Into<String>) -> Self {
        Token::String(text.into())
    }

    pub fn param(value: impl Into<Value>) -> Self {
        Token::Parameter(value.into())
    }

    /// Parenthesized group.
    pub fn group(tokens: Vec<Token>) -> Self {
        Self::group_with(tokens, "(", ")")
    }

    pub fn group_with(tokens: Vec<Token>, open: &'static str, close: &'static str) -> Self {
        Token::Group { tokens, open, close }
    }

    pub fn separator(separator: &'static str, tokens: Vec<Token>) -> Self {
        Token::Separator { separator, tokens }
    }

    pub fn collection(tokens: Vec<Token>) -> Self {
        Token::Collection(tokens)
    }

    fn reduce_into(&self, state: &mut State) {
        match self {
            Token::String(text) => state.text.push(text.clone()),
            Token::Parameter(value) => {
                state.parameters.push(value.clone());
                state.text.push(format!("${}", state.parameters.len()));
            }
            Token::Inline(inline) => inline.reduce_into(state),
            Token::Group { tokens, open, close } => {
                let start = state.text.len();
                for token in tokens {
                    token.reduce_into(state);
                }
                if state.text.len() > start {
                    state.text[start].insert_str(0, open);
                    if let Some(last) = state.text.last_mut() {
                        last.push_str(close);
                    }
                }
            }
            Token::Separator { separator, tokens } => {
                let count = tokens.len();
                for (i, token) in tokens.iter().enumerate() {
                    let start = state.text.len();
                    token.reduce_into(state);
                    if i + 1 < count && state.text.len() > start {
                        if let Some(last) = state.text.last_mut() {
                            last.push_str(separator);
                        }
                    }
                }
            }
            Token::Collection(tokens) => {
                for token in tokens {
                    token.reduce_into(state);
                }
            }
            Token::Table(table) => state.text.push(table.render()),
            Token::Empty => {}
        }
    }
}

/// A literal that is written into the SQL text instead of being bound.
///
/// Text is not escaped. Only trusted values belong here.
#[derive(Debug, Clone, PartialEq)]
pub enum InlineValue {
    Null,
    Text(String),
    Number(String),
    Bool(bool),
    Jsonb(String),
    Cast { value: String, cast: String },
    Array(Vec<InlineValue>),
}

impl InlineValue {
    pub fn cast(value: impl Into<String>, cast: impl Into<String>) -> Self {
        InlineValue::Cast {
            value: value.into(),
            cast: cast.into(),
        }
    }

    fn reduce_into(&self, state: &mut State) {
        match self {
            InlineValue::Null => state.text.push("NULL".to_string()),
            InlineValue::Text(v) => state.text.push(format!("'{v}'")),
            InlineValue::Number(v) => state.text.push(v.clone()),
            InlineValue::Bool(v) => state.text.push(v.to_string()),
            InlineValue::Jsonb(v) => state.text.push(format!("'{v}'::jsonb")),
            InlineValue::Cast { value, cast } => state.text.push(format!("'{value}'::{cast}")),
            InlineValue::Array(values) => {
                let items = values.iter().cloned().map(Token::Inline).collect();
                Token::group_with(vec![Token::separator(",", items)], "{", "}")
                    .reduce_into(state);
            }
        }
    }
}

impl From<Value> for InlineValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => InlineValue::Null,
            Value::Bool(v) => InlineValue::Bool(v),
            Value::Int(v) => InlineValue::Number(v.to_string()),
            Value::Float(v) => InlineValue::Number(v.to_string()),
            Value::Text(v) => InlineValue::Text(v),
            Value::Json(v) => InlineValue::Jsonb(v.to_string()),
            Value::Uuid(v) => InlineValue::Text(v.to_string()),
            Value::Timestamp(v) => InlineValue::Text(v.to_rfc3339()),
            Value::Array(values) => {
                InlineValue::Array(values.into_iter().map(InlineValue::from).collect())
            }
        }
    }
}

/// The name under which a table or from-item appears in a FROM list.
///
/// An aliased table renders as `original alias`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub name: String,
    pub original_name: Option<String>,
}

impl TableRef {
    fn render(&self) -> String {
        match &self.original_name {
            Some(original) => format!("{} {}", wrap_quotes(original), wrap_quotes(&self.name)),
            None => wrap_quotes(&self.name),
        }
    }
}

/// Rendered SQL text and its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub text: String,
    pub parameters: Vec<Value>,
}

#[derive(Default)]
struct State {
    text: Vec<String>,
    parameters: Vec<Value>,
}

/// Flatten a token tree into SQL text and parameters.
///
/// The placeholder counter is local to this call and shared by the whole tree.
pub fn reduce(tokens: &[Token]) -> BuiltQuery {
    let mut state = State::default();
    for token in tokens {
        token.reduce_into(&mut state);
    }
    BuiltQuery {
        text: state.text.join(" "),
        parameters: state.parameters,
    }
}

/// Anything that can contribute tokens to a statement.
pub trait Tokenable {
    fn to_tokens(&self) -> Vec<Token>;

    /// Render without executing.
    fn to_sql(&self) -> BuiltQuery {
        reduce(&self.to_tokens())
    }
}

impl Tokenable for Vec<Token> {
    fn to_tokens(&self) -> Vec<Token> {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameters_are_numbered_across_nested_groups() {
        let tokens = vec![
            Token::string("a ="),
            Token::param(1),
            Token::string("AND"),
            Token::group(vec![
                Token::string("b ="),
                Token::param("x"),
                Token::string("OR"),
                Token::group(vec![Token::string("c ="), Token::param(true)]),
            ]),
        ];
        let built = reduce(&tokens);
        assert_eq!(built.text, "a = $1 AND (b = $2 OR (c = $3))");
        assert_eq!(
            built.parameters,
            vec![Value::Int(1), Value::Text("x".into()), Value::Bool(true)]
        );
    }

    #[test]
    fn separator_glues_to_each_child_but_last() {
        let tokens = vec![Token::group(vec![Token::separator(
            ",",
            vec![
                Token::collection(vec![Token::param(1), Token::string("::"), Token::string("text")]),
                Token::param(2),
            ],
        )])];
        assert_eq!(reduce(&tokens).text, "($1 :: text, $2)");
    }

    #[test]
    fn empty_group_renders_nothing() {
        let tokens = vec![
            Token::string("INSERT INTO foo"),
            Token::group(vec![Token::separator(",", vec![])]),
            Token::Empty,
            Token::string("DEFAULT VALUES"),
        ];
        assert_eq!(reduce(&tokens).text, "INSERT INTO foo DEFAULT VALUES");
    }

    #[test]
    fn inline_values_render_literals() {
        let tokens = vec![
            Token::Inline(InlineValue::Text("foo".into())),
            Token::Inline(InlineValue::from(Value::Int(25))),
            Token::Inline(InlineValue::Bool(false)),
            Token::Inline(InlineValue::cast("open", "open_status")),
            Token::Inline(InlineValue::from(Value::Json(serde_json::json!({"a": 1})))),
        ];
        let built = reduce(&tokens);
        assert_eq!(built.text, r#"'foo' 25 false 'open'::open_status '{"a":1}'::jsonb"#);
        assert!(built.parameters.is_empty());
    }

    #[test]
    fn inline_array_renders_brace_literal() {
        let tokens = vec![Token::Inline(InlineValue::from(Value::from(vec![1, 2, 3])))];
        assert_eq!(reduce(&tokens).text, "{1, 2, 3}");
    }

    #[test]
    fn table_ref_renders_original_and_alias() {
        let aliased = Token::Table(TableRef {
            name: "baZ".into(),
            original_name: Some("bar".into()),
        });
        let plain = Token::Table(TableRef {
            name: "user".into(),
            original_name: None,
        });
        assert_eq!(reduce(&[aliased, plain]).text, r#"bar "baZ" "user""#);
    }

    #[test]
    fn rendering_is_deterministic() {
        let tokens = vec![Token::string("x ="), Token::param(1)];
        assert_eq!(reduce(&tokens), reduce(&tokens));
    }
}
