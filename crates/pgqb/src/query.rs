//! The statement abstraction shared by every builder, and the executor seam.

use crate::error::QbResult;
use crate::token::{BuiltQuery, Token, Tokenable};
use crate::value::Value;
use std::future::Future;
use std::sync::Arc;

/// What an executor reports back for one statement.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult<R> {
    pub rows: Vec<R>,
    pub affected_count: u64,
}

/// Runs rendered SQL. Injected once through [`define_db`](crate::define_db).
///
/// Rows are passed through to the caller untouched. Errors are returned to the
/// awaiting caller as-is.
pub trait QueryExecutor: Send + Sync + 'static {
    type Row: Send + 'static;

    fn execute(
        &self,
        sql: &str,
        parameters: &[Value],
    ) -> impl Future<Output = QbResult<QueryResult<Self::Row>>> + Send;
}

/// Adapts an async closure `(sql, parameters) -> QueryResult` into a [`QueryExecutor`].
///
/// # Example
/// ```ignore
/// let db = define_db(tables, executor_fn(|sql: String, params: Vec<Value>| async move {
///     Ok::<_, QbError>(QueryResult { rows: Vec::<serde_json::Value>::new(), affected_count: 0 })
/// }));
/// ```
pub struct FnExecutor<F>(F);

pub fn executor_fn<F>(f: F) -> FnExecutor<F> {
    FnExecutor(f)
}

impl<F, Fut, R> QueryExecutor for FnExecutor<F>
where
    F: Fn(String, Vec<Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = QbResult<QueryResult<R>>> + Send,
    R: Send + 'static,
{
    type Row = R;

    fn execute(
        &self,
        sql: &str,
        parameters: &[Value],
    ) -> impl Future<Output = QbResult<QueryResult<R>>> + Send {
        (self.0)(sql.to_string(), parameters.to_vec())
    }
}

/// The shape a statement resolves to.
pub trait ResultKind: Send + Sync + 'static {
    type Output<R>;

    fn pick<R>(result: QueryResult<R>) -> Self::Output<R>;
}

/// Resolves to the returned rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rows;

/// Resolves to the number of affected rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct AffectedCount;

impl ResultKind for Rows {
    type Output<R> = Vec<R>;

    fn pick<R>(result: QueryResult<R>) -> Vec<R> {
        result.rows
    }
}

impl ResultKind for AffectedCount {
    type Output<R> = u64;

    fn pick<R>(result: QueryResult<R>) -> u64 {
        result.affected_count
    }
}

/// Output of executing query `Q`.
pub type QueryOutput<Q> = <<Q as Query>::Kind as ResultKind>::Output<
    <<Q as Query>::Executor as QueryExecutor>::Row,
>;

/// Base of every statement builder.
///
/// Builders are persistent values: each chained call returns a new query built
/// from [`Query::with_query_tokens`], and the receiver stays usable.
pub trait Query: Tokenable + Sized + Send + Sync {
    type Executor: QueryExecutor;
    type Kind: ResultKind;

    fn executor(&self) -> &Arc<Self::Executor>;

    /// Leading `/*comment*/` tokens.
    fn comment_tokens(&self) -> &[Token];

    /// The statement body, without comments.
    fn to_query_tokens(&self) -> Vec<Token>;

    /// Ordered names of the columns this statement yields.
    fn returning_keys(&self) -> Vec<String>;

    /// Same query (executor, comment, metadata) over a new body.
    fn with_query_tokens(&self, tokens: Vec<Token>) -> Self;

    /// Render and run the statement.
    fn execute(&self) -> impl Future<Output = QbResult<QueryOutput<Self>>> + Send {
        async move {
            let built = self.to_sql();
            let result = run(self.executor().as_ref(), built).await?;
            Ok(<Self::Kind as ResultKind>::pick(result))
        }
    }
}

pub(crate) fn full_tokens(comment: &[Token], body: Vec<Token>) -> Vec<Token> {
    let mut tokens = comment.to_vec();
    tokens.extend(body);
    tokens
}

async fn run<E: QueryExecutor>(executor: &E, built: BuiltQuery) -> QbResult<QueryResult<E::Row>> {
    tracing::debug!(
        target: "pgqb.sql",
        sql = %built.text,
        params = built.parameters.len(),
        "executing statement"
    );
    executor
        .execute(&built.text, &built.parameters)
        .await
        .inspect_err(|err| {
            tracing::warn!(target: "pgqb.sql", sql = %built.text, error = %err, "statement failed");
        })
}

/// Implements `Tokenable` and `IntoFuture` for a query type with `executor`,
/// `comment` and `tokens` fields.
macro_rules! impl_query_plumbing {
    ($ty:ident < E $(, $k:ident)? >) => {
        impl<E: $crate::query::QueryExecutor $(, $k: $crate::query::ResultKind)?>
            $crate::token::Tokenable for $ty<E $(, $k)?>
        {
            fn to_tokens(&self) -> Vec<$crate::token::Token> {
                $crate::query::full_tokens(
                    &self.comment,
                    $crate::query::Query::to_query_tokens(self),
                )
            }
        }

        impl<E: $crate::query::QueryExecutor $(, $k: $crate::query::ResultKind)?>
            ::std::future::IntoFuture for $ty<E $(, $k)?>
        {
            type Output = $crate::error::QbResult<$crate::query::QueryOutput<Self>>;
            type IntoFuture = ::futures_util::future::BoxFuture<'static, Self::Output>;

            fn into_future(self) -> Self::IntoFuture {
                Box::pin(async move { $crate::query::Query::execute(&self).await })
            }
        }
    };
}

pub(crate) use impl_query_plumbing;
