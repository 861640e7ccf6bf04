//! # pgqb
//!
//! A typed, composable SQL query builder for PostgreSQL.
//!
//! ## Features
//!
//! - **Declared schema**: tables and columns are declared once, columns are addressed by logical name
//! - **Parameterized by default**: values are bound as `$N`, identifiers are quoted only when needed
//! - **Composable**: expressions and statements are immutable values; sub-queries nest anywhere
//! - **Executor-agnostic**: any [`QueryExecutor`] runs the rendered SQL; `tokio_postgres::Client` works out of the box
//! - **Safe defaults**: UPDATE requires SET, IN requires values, int8 values are range-checked
//!
//! ## Usage
//!
//! ```ignore
//! use pgqb::prelude::*;
//!
//! let db = define_db(
//!     [(
//!         "foo",
//!         TableDefinition::new([
//!             ("id", uuid().primary_key().default("gen_random_uuid()")),
//!             ("name", text().not_null()),
//!             ("createDate", timestamp_with_time_zone().not_null().default("now()")),
//!         ]),
//!     )],
//!     client,
//! );
//! let foo = &db["foo"];
//!
//! // SELECT foo.id, foo.create_date "createDate" FROM foo WHERE foo.name = $1
//! let rows = db
//!     .select(&[&foo["id"], &foo["createDate"]])
//!     .from(foo)
//!     .where_(&foo["name"].eq("Test"))
//!     .await?;
//!
//! // UPDATE foo SET name = $1 WHERE foo.id = $2
//! let affected = db
//!     .update(foo)
//!     .set(&Record::new().set("name", "Other"))?
//!     .where_(&foo["id"].eq(id))
//!     .await?;
//! ```
//!
//! Every statement can also be rendered without running it:
//!
//! ```ignore
//! let built = db.select(&[&foo["id"]]).from(foo).to_sql();
//! assert_eq!(built.text, "SELECT foo.id FROM foo");
//! ```

pub mod column;
pub mod db;
pub mod error;
pub mod expr;
pub mod functions;
pub mod index;
pub mod int8;
pub mod naming;
pub mod qb;
pub mod query;
pub mod table;
pub mod token;
pub mod value;

#[cfg(feature = "postgres")]
pub mod client;

pub mod prelude;

pub use column::{Column, ColumnDefinition, ColumnDefinitionFormat, ColumnSet, JoinType};
pub use db::{Db, TableDefinitionInfo, define_db};
pub use error::{QbError, QbResult};
pub use expr::{Expression, Operand};
pub use functions::{
    CaseStatement, CaseWhen, Star, any, array_agg, avg, bit_and, bit_or, case, count, count_all,
    exists, group, inline_value, max, min, not_exists, raw, raw_with, star, star_of, string_agg,
    sum,
};
pub use index::{Index, IndexDefinition, IndexDefinitionFormat, IndexKey, IndexType};
pub use query::{
    AffectedCount, FnExecutor, Query, QueryExecutor, QueryOutput, QueryResult, ResultKind, Rows,
    executor_fn,
};
pub use table::{FromItem, FromSource, Table, TableDefinition};
pub use token::{BuiltQuery, InlineValue, Token, Tokenable};
pub use value::Value;

// Re-export qb module for easy access
pub use qb::{
    CteName, CteRefs, DeleteQuery, InsertInto, InsertQuery, IntoRecords, Materialization,
    OnConflict, Record, SelectQuery, Selectable, TruncateQuery, Update, UpdateQuery, With,
};
