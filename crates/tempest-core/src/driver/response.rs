use crate::stmt::{Value, ValueStream};

/// Update count reported for a batch entry that succeeded without a row
/// count.
pub const SUCCESS_NO_INFO: i64 = -2;

#[derive(Debug)]
pub struct Response {
    pub rows: Rows,

    /// Values of the generated key columns, one per inserted row. A single
    /// key column gives scalar values, several give records.
    pub generated_keys: Vec<Value>,
}

#[derive(Debug)]
pub enum Rows {
    /// Number of rows modified
    Count(u64),

    /// Update count per batch entry, in input order
    Batch(Vec<i64>),

    /// Result rows
    Values(ValueStream),
}

impl Response {
    pub fn count(count: u64) -> Self {
        Self {
            rows: Rows::Count(count),
            generated_keys: vec![],
        }
    }

    pub fn batch(counts: Vec<i64>) -> Self {
        Self {
            rows: Rows::Batch(counts),
            generated_keys: vec![],
        }
    }

    pub fn value_stream(values: impl Into<ValueStream>) -> Self {
        Self {
            rows: Rows::Values(values.into()),
            generated_keys: vec![],
        }
    }

    pub fn with_generated_keys(mut self, keys: Vec<Value>) -> Self {
        self.generated_keys = keys;
        self
    }
}

impl Rows {
    pub fn is_count(&self) -> bool {
        matches!(self, Self::Count(_))
    }

    pub fn into_values(self) -> crate::Result<ValueStream> {
        match self {
            Self::Values(values) => Ok(values),
            Self::Count(_) => crate::bail!("expected rows, the driver returned a count"),
            Self::Batch(_) => crate::bail!("expected rows, the driver returned batch counts"),
        }
    }

    pub fn into_count(self) -> crate::Result<u64> {
        match self {
            Self::Count(count) => Ok(count),
            Self::Values(_) => crate::bail!("expected a count, the driver returned rows"),
            Self::Batch(_) => crate::bail!("expected a count, the driver returned batch counts"),
        }
    }

    pub fn into_batch(self) -> crate::Result<Vec<i64>> {
        match self {
            Self::Batch(counts) => Ok(counts),
            Self::Count(_) => crate::bail!("expected batch counts, the driver returned a count"),
            Self::Values(_) => crate::bail!("expected batch counts, the driver returned rows"),
        }
    }
}
