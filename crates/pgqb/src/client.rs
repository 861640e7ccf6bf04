//! [`QueryExecutor`] for a plain `tokio_postgres::Client`.
//!
//! ```ignore
//! let (client, connection) = tokio_postgres::connect(&url, NoTls).await?;
//! tokio::spawn(connection);
//!
//! let db = define_db(tables, client);
//! let rows: Vec<tokio_postgres::Row> = db.select(&[&foo["id"]]).from(foo).await?;
//! ```

use crate::error::QbResult;
use crate::query::{QueryExecutor, QueryResult};
use crate::value::Value;
use futures_util::{TryStreamExt, pin_mut};
use tokio_postgres::Row;

impl QueryExecutor for tokio_postgres::Client {
    type Row = Row;

    async fn execute(&self, sql: &str, parameters: &[Value]) -> QbResult<QueryResult<Row>> {
        let stream = self.query_raw(sql, parameters.iter()).await?;
        pin_mut!(stream);

        let mut rows = Vec::new();
        while let Some(row) = stream.try_next().await? {
            rows.push(row);
        }
        // Statements without a command tag (rare) fall back to the row count.
        let affected_count = stream.rows_affected().unwrap_or(rows.len() as u64);

        Ok(QueryResult {
            rows,
            affected_count,
        })
    }
}
