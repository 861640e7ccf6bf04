//! Common table expressions.
//!
//! Each CTE becomes a [`FromItem`] that later CTEs and the final statement can
//! select from. The final statement keeps its own comment, which lands in front
//! of `WITH`.
//!
//! ```ignore
//! let query = db
//!     .with()
//!     .cte("a", &db.select(&[&bar["id"]]).from(bar))
//!     .cte_with("b", |refs| Ok(db.select(&[&refs["a"]["id"]]).from(&refs["a"])))?
//!     .query(|refs| Ok(db.select(&[&refs["b"]["id"]]).from(&refs["b"])))?;
//! ```

use crate::error::{QbError, QbResult};
use crate::naming::wrap_quotes;
use crate::query::Query;
use crate::table::FromItem;
use crate::token::{Token, Tokenable};
use std::ops;

/// Materialization hint for a CTE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Materialization {
    Materialized,
    NotMaterialized,
}

/// A CTE name with an optional materialization hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CteName {
    name: String,
    materialization: Option<Materialization>,
}

impl CteName {
    fn as_keyword(&self) -> &'static str {
        match self.materialization {
            None => "AS",
            Some(Materialization::Materialized) => "AS MATERIALIZED",
            Some(Materialization::NotMaterialized) => "AS NOT MATERIALIZED",
        }
    }
}

impl From<&str> for CteName {
    fn from(name: &str) -> Self {
        Self {
            name: name.to_string(),
            materialization: None,
        }
    }
}

impl From<String> for CteName {
    fn from(name: String) -> Self {
        Self {
            name,
            materialization: None,
        }
    }
}

impl From<(&str, Materialization)> for CteName {
    fn from((name, materialization): (&str, Materialization)) -> Self {
        Self {
            name: name.to_string(),
            materialization: Some(materialization),
        }
    }
}

/// The CTEs defined so far, by name.
#[derive(Debug, Clone, Default)]
pub struct CteRefs {
    items: Vec<FromItem>,
}

impl CteRefs {
    pub fn get(&self, name: &str) -> Option<&FromItem> {
        self.items.iter().find(|item| item.name() == name)
    }

    pub fn cte(&self, name: &str) -> QbResult<&FromItem> {
        self.get(name)
            .ok_or_else(|| QbError::validation(format!("CTE \"{name}\" is not defined")))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(FromItem::name)
    }
}

impl ops::Index<&str> for CteRefs {
    type Output = FromItem;

    fn index(&self, name: &str) -> &FromItem {
        match self.get(name) {
            Some(item) => item,
            None => panic!("CTE \"{name}\" is not defined"),
        }
    }
}

/// A `WITH` list under construction.
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct With {
    definitions: Vec<Token>,
    refs: CteRefs,
}

impl With {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a CTE built from an existing query.
    pub fn cte<Q: Query>(mut self, name: impl Into<CteName>, query: &Q) -> Self {
        let name = name.into();
        self.definitions.push(Token::collection(vec![
            Token::String(wrap_quotes(&name.name)),
            Token::string(name.as_keyword()),
            Token::group(query.to_tokens()),
        ]));
        self.refs
            .items
            .push(FromItem::cte(name.name, &query.returning_keys()));
        self
    }

    /// Add a CTE whose query reads from the CTEs defined before it.
    pub fn cte_with<Q, F>(self, name: impl Into<CteName>, define: F) -> QbResult<Self>
    where
        Q: Query,
        F: FnOnce(&CteRefs) -> QbResult<Q>,
    {
        let query = define(&self.refs)?;
        Ok(self.cte(name, &query))
    }

    /// Build the final statement and prefix it with the `WITH` list.
    pub fn query<Q, F>(self, build: F) -> QbResult<Q>
    where
        Q: Query,
        F: FnOnce(&CteRefs) -> QbResult<Q>,
    {
        if self.definitions.is_empty() {
            return Err(QbError::validation("WITH requires at least one CTE"));
        }
        let query = build(&self.refs)?;
        let mut tokens = vec![
            Token::string("WITH"),
            Token::separator(",", self.definitions),
        ];
        tokens.extend(query.to_query_tokens());
        Ok(query.with_query_tokens(tokens))
    }
}
