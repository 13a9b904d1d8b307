use super::{Error, ErrorKind};

use std::error::Error as StdError;
use std::fmt;

/// A statement, transaction command or connection attempt rejected by the
/// database client (rusqlite, tokio-postgres, mysql_async).
#[derive(Debug)]
pub(super) struct DriverOperationFailed {
    pub(super) cause: Box<dyn StdError + Send + Sync>,
}

impl StdError for DriverOperationFailed {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.cause.as_ref())
    }
}

impl fmt::Display for DriverOperationFailed {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "database operation failed: {}", self.cause)?;

        let mut next = self.cause.source();
        while let Some(cause) = next {
            write!(f, ": {cause}")?;
            next = cause.source();
        }

        Ok(())
    }
}

impl Error {
    pub fn driver_operation_failed(err: impl StdError + Send + Sync + 'static) -> Error {
        Error::from(ErrorKind::DriverOperationFailed(DriverOperationFailed {
            cause: Box::new(err),
        }))
    }

    pub fn is_driver_operation_failed(&self) -> bool {
        matches!(self.kind(), ErrorKind::DriverOperationFailed(_))
    }

    /// The client library error behind a driver failure.
    pub fn driver_cause(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        match self.kind() {
            ErrorKind::DriverOperationFailed(err) => Some(err.cause.as_ref()),
            _ => None,
        }
    }
}
