use super::Error;

/// Error raised while building a model or compiling a template.
///
/// Covers unresolved table and column references, conflicting field
/// configuration, unsupported version column types and statements that would
/// render invalid SQL.
#[derive(Debug)]
pub(super) struct SqlTemplateError {
    message: Box<str>,
}

impl std::error::Error for SqlTemplateError {}

impl core::fmt::Display for SqlTemplateError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "sql template error: {}", self.message)
    }
}

impl Error {
    /// Creates a SQL template error.
    pub fn sql_template(message: impl Into<String>) -> Error {
        Error::from(super::ErrorKind::SqlTemplate(SqlTemplateError {
            message: message.into().into(),
        }))
    }

    /// Returns `true` if this error is a SQL template error.
    pub fn is_sql_template(&self) -> bool {
        matches!(self.kind(), super::ErrorKind::SqlTemplate(_))
    }
}
