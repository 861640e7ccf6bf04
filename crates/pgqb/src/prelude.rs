//! Convenient imports for typical `pgqb` usage.
//!
//! ```ignore
//! use pgqb::prelude::*;
//! ```

pub use crate::column::{
    bigint, boolean, data_type, enum_type, int8, integer, jsonb, numeric, text,
    timestamp_with_time_zone, uuid,
};
pub use crate::index::{btree, gin, gist};
pub use crate::{
    Db, Expression, QbError, QbResult, Query, QueryExecutor, QueryResult, Record, TableDefinition,
    Tokenable, Value, any, array_agg, avg, bit_and, bit_or, case, count, count_all, define_db,
    executor_fn, exists, group, inline_value, max, min, not_exists, raw, star, star_of,
    string_agg, sum,
};
