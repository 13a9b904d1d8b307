use super::Error;

/// Error when a version-checked update matches no row.
///
/// The row was either deleted or updated by someone else since it was read.
#[derive(Debug)]
pub(super) struct OptimisticLockError {
    context: Option<Box<str>>,
}

impl std::error::Error for OptimisticLockError {}

impl core::fmt::Display for OptimisticLockError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str("optimistic lock failure")?;
        if let Some(ref ctx) = self.context {
            write!(f, ": {}", ctx)?;
        }
        Ok(())
    }
}

impl Error {
    /// Creates an optimistic lock error.
    pub fn optimistic_lock(context: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::OptimisticLock(OptimisticLockError {
            context: Some(context.into().into()),
        }))
    }

    /// Returns `true` if this error is an optimistic lock error.
    pub fn is_optimistic_lock(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::OptimisticLock(_))
    }
}
