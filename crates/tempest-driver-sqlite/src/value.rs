use rusqlite::{
    types::{ToSql, ToSqlOutput, Value as SqlValue, ValueRef},
    Row,
};
use tempest_core::stmt::Value as CoreValue;

#[derive(Debug)]
pub struct Value(CoreValue);

impl From<CoreValue> for Value {
    fn from(value: CoreValue) -> Self {
        Self(value)
    }
}

impl Value {
    pub fn into_inner(self) -> CoreValue {
        self.0
    }

    /// Reads the value at `index` of a row.
    ///
    /// SQLite has no column types; values come back as their storage class
    /// and the caller coerces them to the declared type.
    pub fn from_sql(row: &Row<'_>, index: usize) -> rusqlite::Result<Self> {
        let value = match row.get::<_, SqlValue>(index)? {
            SqlValue::Null => CoreValue::Null,
            SqlValue::Integer(value) => CoreValue::I64(value),
            SqlValue::Real(value) => CoreValue::F64(value),
            SqlValue::Text(value) => CoreValue::String(value),
            SqlValue::Blob(value) => CoreValue::Bytes(value),
        };

        Ok(Value(value))
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let integer = |v: i64| Ok(ToSqlOutput::Owned(SqlValue::Integer(v)));
        let text = |v: String| Ok(ToSqlOutput::Owned(SqlValue::Text(v)));

        match &self.0 {
            CoreValue::Bool(v) => integer(*v as i64),
            CoreValue::I16(v) => integer(*v as i64),
            CoreValue::I32(v) => integer(*v as i64),
            CoreValue::I64(v) => integer(*v),
            CoreValue::F64(v) => Ok(ToSqlOutput::Owned(SqlValue::Real(*v))),
            CoreValue::String(v) => Ok(ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes()))),
            CoreValue::Bytes(v) => Ok(ToSqlOutput::Borrowed(ValueRef::Blob(&v[..]))),
            CoreValue::Uuid(v) => text(v.to_string()),
            CoreValue::Json(v) => text(v.to_string()),
            CoreValue::Null => Ok(ToSqlOutput::Owned(SqlValue::Null)),
            value @ (CoreValue::Timestamp(_) | CoreValue::DateTime(_) | CoreValue::Date(_)) => {
                match value.to_temporal_text() {
                    Some(v) => text(v),
                    None => Err(unsupported(value)),
                }
            }
            value @ (CoreValue::Record(_) | CoreValue::List(_)) => Err(unsupported(value)),
        }
    }
}

fn unsupported(value: &CoreValue) -> rusqlite::Error {
    rusqlite::Error::ToSqlConversionFailure(Box::new(tempest_core::Error::type_conversion(
        value.clone(),
        "SQLite value",
    )))
}
