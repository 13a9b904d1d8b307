use super::Error;

/// Error when a connection is used by a second operation while the first one
/// still holds it.
///
/// This is raised immediately. It never waits for the connection and is never
/// reported as a timeout.
#[derive(Debug)]
pub(super) struct ConcurrentUseError;

impl std::error::Error for ConcurrentUseError {}

impl core::fmt::Display for ConcurrentUseError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str("connection is already in use by another operation")
    }
}

impl Error {
    /// Creates a concurrent use error.
    pub fn concurrent_use() -> Error {
        Error::from(super::ErrorKind::ConcurrentUse(ConcurrentUseError))
    }

    /// Returns `true` if this error is a concurrent use error.
    pub fn is_concurrent_use(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::ConcurrentUse(_))
    }
}
