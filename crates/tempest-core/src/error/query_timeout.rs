use super::Error;
use std::time::Duration;

/// Error when a statement does not complete within its configured timeout.
#[derive(Debug)]
pub(super) struct QueryTimeoutError {
    timeout: Duration,
}

impl std::error::Error for QueryTimeoutError {}

impl core::fmt::Display for QueryTimeoutError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "query timed out after {:?}", self.timeout)
    }
}

impl Error {
    /// Creates a query timeout error.
    pub fn query_timeout(timeout: Duration) -> Error {
        Error::from(super::ErrorKind::QueryTimeout(QueryTimeoutError { timeout }))
    }

    /// Returns `true` if this error is a query timeout.
    pub fn is_query_timeout(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::QueryTimeout(_))
    }
}
