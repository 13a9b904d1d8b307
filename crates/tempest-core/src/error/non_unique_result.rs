use super::Error;

/// Error when a query expected to return one row returns more.
///
/// Raised as soon as the second row is seen.
#[derive(Debug)]
pub(super) struct NonUniqueResultError {
    context: Option<Box<str>>,
}

impl std::error::Error for NonUniqueResultError {}

impl core::fmt::Display for NonUniqueResultError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str("non-unique result")?;
        if let Some(ref ctx) = self.context {
            write!(f, ": {}", ctx)?;
        }
        Ok(())
    }
}

impl Error {
    /// Creates a non-unique result error.
    pub fn non_unique_result(context: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::NonUniqueResult(NonUniqueResultError {
            context: Some(context.into().into()),
        }))
    }

    /// Returns `true` if this error is a non-unique result error.
    pub fn is_non_unique_result(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::NonUniqueResult(_))
    }
}
