use super::Error;

/// Error when a query expected to return a row returns none.
#[derive(Debug)]
pub(super) struct NoResultError {
    context: Option<Box<str>>,
}

impl std::error::Error for NoResultError {}

impl core::fmt::Display for NoResultError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str("no result")?;
        if let Some(ref ctx) = self.context {
            write!(f, ": {}", ctx)?;
        }
        Ok(())
    }
}

impl Error {
    /// Creates a no result error.
    pub fn no_result(context: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::NoResult(NoResultError {
            context: Some(context.into().into()),
        }))
    }

    /// Returns `true` if this error is a no result error.
    pub fn is_no_result(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::NoResult(_))
    }
}
