use crate::expr::Operand;

/// Column values for INSERT, UPDATE, ON CONFLICT and `VALUES` rows, keyed by
/// logical column name and kept in insertion order.
///
/// A key may be present without a value ([`Record::maybe`] with `None`). UPDATE
/// and `DO UPDATE SET` skip such keys; INSERT and `VALUES` reject them.
///
/// # Example
/// ```ignore
/// let row = Record::new()
///     .set("name", "Test")
///     .set("value", 123)
///     .maybe("bigValue", None::<i64>);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[must_use]
pub struct Record {
    entries: Vec<(String, Option<Operand>)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `column`, replacing an earlier entry with the same name.
    pub fn set(self, column: impl Into<String>, value: impl Into<Operand>) -> Self {
        self.put(column.into(), Some(value.into()))
    }

    /// Set `column` to `value`, or mark it absent when `value` is `None`.
    ///
    /// Use [`Record::set`] with `None::<T>` for SQL `NULL`.
    pub fn maybe<T: Into<Operand>>(self, column: impl Into<String>, value: Option<T>) -> Self {
        self.put(column.into(), value.map(Into::into))
    }

    fn put(mut self, column: String, value: Option<Operand>) -> Self {
        match self.entries.iter_mut().find(|(name, _)| *name == column) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((column, value)),
        }
        self
    }

    /// `None` when the key is missing, `Some(None)` when it is present but absent.
    pub fn get(&self, column: &str) -> Option<Option<&Operand>> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_ref())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Entries that carry a value, in insertion order.
    pub fn present(&self) -> impl Iterator<Item = (&str, &Operand)> {
        self.entries
            .iter()
            .filter_map(|(name, value)| value.as_ref().map(|v| (name.as_str(), v)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<Operand>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Record::new(), |record, (k, v)| record.set(k, v))
    }
}

/// One record or many, for INSERT and `VALUES`.
pub trait IntoRecords {
    fn into_records(self) -> Vec<Record>;
}

impl IntoRecords for Record {
    fn into_records(self) -> Vec<Record> {
        vec![self]
    }
}

impl IntoRecords for Vec<Record> {
    fn into_records(self) -> Vec<Record> {
        self
    }
}

impl<const N: usize> IntoRecords for [Record; N] {
    fn into_records(self) -> Vec<Record> {
        self.into()
    }
}
