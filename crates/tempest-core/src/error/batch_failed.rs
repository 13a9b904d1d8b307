use super::Error;

/// Error when a batch execution fails part way.
///
/// `completed` holds the update counts the driver reported for the entries
/// that ran before the failure, in input order. The driver error is kept as
/// the cause.
#[derive(Debug)]
pub(super) struct BatchFailedError {
    completed: Vec<i64>,
}

impl std::error::Error for BatchFailedError {}

impl core::fmt::Display for BatchFailedError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "batch failed after {} statements", self.completed.len())
    }
}

impl Error {
    /// Creates a batch failure wrapping `cause`.
    pub fn batch_failed(completed: Vec<i64>, cause: Error) -> Error {
        cause.context(Error::from(super::ErrorKind::BatchFailed(
            BatchFailedError { completed },
        )))
    }

    /// Returns `true` if this error is a batch failure.
    pub fn is_batch_failed(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::BatchFailed(_))
    }

    /// Update counts of the batch entries that completed before the failure.
    pub fn batch_completed(&self) -> Option<&[i64]> {
        match self.kind() {
            super::ErrorKind::BatchFailed(err) => Some(&err.completed),
            _ => None,
        }
    }
}
