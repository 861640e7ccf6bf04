//! Range guard for values bound to 64-bit integer columns.
//!
//! Many consumers of the rendered parameters (JSON encoders, JS clients behind an
//! executor) carry numbers as IEEE doubles, so an int8 value outside
//! `±(2^53 - 1)` would lose precision silently. Strings and nulls pass through;
//! arbitrary-precision `numeric` columns are not int8-class and are never checked.

use crate::error::{QbError, QbResult};
use crate::value::Value;

/// Largest integer a double represents exactly (`2^53 - 1`).
pub const MAX_SAFE_INTEGER: i64 = 9_007_199_254_740_991;
/// Smallest integer a double represents exactly.
pub const MIN_SAFE_INTEGER: i64 = -MAX_SAFE_INTEGER;

const INT8_TYPES: &[&str] = &["int8", "bigint", "bigserial", "serial8"];

pub fn is_int8_type(data_type: &str) -> bool {
    INT8_TYPES.contains(&data_type.trim().to_ascii_lowercase().as_str())
}

/// Check `value` against the safe range when `data_type` is int8-class.
///
/// `column` is the logical column name reported in the error.
pub fn validate_int8_value(column: &str, data_type: &str, value: &Value) -> QbResult<()> {
    if !is_int8_type(data_type) {
        return Ok(());
    }
    let in_range = match value {
        Value::Int(v) => (MIN_SAFE_INTEGER..=MAX_SAFE_INTEGER).contains(v),
        other => other
            .as_number()
            .is_none_or(|v| v >= MIN_SAFE_INTEGER as f64 && v <= MAX_SAFE_INTEGER as f64),
    };
    if in_range {
        Ok(())
    } else {
        Err(QbError::int8_out_of_range(column, value))
    }
}
