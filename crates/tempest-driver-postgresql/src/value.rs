use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use postgres::{
    types::{private::BytesMut, to_sql_checked, IsNull, ToSql, Type},
    Row,
};
use std::error::Error as StdError;
use tempest_core::{stmt::Value as CoreValue, Error, Result};

type BoxError = Box<dyn StdError + Sync + Send>;

#[derive(Debug)]
pub struct Value(CoreValue);

impl From<CoreValue> for Value {
    fn from(value: CoreValue) -> Self {
        Self(value)
    }
}

impl Value {
    /// Reads the value at `index` of a row, by the column's PostgreSQL type.
    pub fn from_sql(row: &Row, index: usize) -> Result<CoreValue> {
        let ty = row.columns()[index].type_().clone();

        macro_rules! get {
            ($t:ty, $f:expr) => {
                row.try_get::<_, Option<$t>>(index)
                    .map_err(Error::driver_operation_failed)?
                    .map($f)
            };
        }

        let value = match ty {
            Type::BOOL => get!(bool, CoreValue::Bool),
            Type::INT2 => get!(i16, CoreValue::I16),
            Type::INT4 => get!(i32, CoreValue::I32),
            Type::INT8 => get!(i64, CoreValue::I64),
            Type::FLOAT4 => get!(f32, |v| CoreValue::F64(v as f64)),
            Type::FLOAT8 => get!(f64, CoreValue::F64),
            Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => {
                get!(String, CoreValue::String)
            }
            Type::BYTEA => get!(Vec<u8>, CoreValue::Bytes),
            Type::UUID => get!(uuid::Uuid, CoreValue::Uuid),
            Type::TIMESTAMPTZ => get!(DateTime<Utc>, CoreValue::Timestamp),
            Type::TIMESTAMP => get!(NaiveDateTime, CoreValue::DateTime),
            Type::DATE => get!(NaiveDate, CoreValue::Date),
            Type::JSON | Type::JSONB => get!(serde_json::Value, CoreValue::Json),
            ty => {
                return Err(Error::unsupported_feature(format!(
                    "reading PostgreSQL columns of type `{ty}`"
                )))
            }
        };

        Ok(value.unwrap_or(CoreValue::Null))
    }
}

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> std::result::Result<IsNull, BoxError>
    where
        Self: Sized,
    {
        match &self.0 {
            CoreValue::Null => Ok(IsNull::Yes),
            CoreValue::Bool(value) => value.to_sql(ty, out),
            CoreValue::I16(value) => integer(*value as i64, ty, out),
            CoreValue::I32(value) => integer(*value as i64, ty, out),
            CoreValue::I64(value) => integer(*value, ty, out),
            CoreValue::F64(value) => match *ty {
                Type::FLOAT4 => (*value as f32).to_sql(ty, out),
                _ => value.to_sql(ty, out),
            },
            CoreValue::String(value) => value.to_sql(ty, out),
            CoreValue::Bytes(value) => value.to_sql(ty, out),
            CoreValue::Uuid(value) => match *ty {
                Type::UUID => value.to_sql(ty, out),
                _ => value.to_string().to_sql(ty, out),
            },
            CoreValue::Timestamp(value) => match *ty {
                Type::TIMESTAMP => value.naive_utc().to_sql(ty, out),
                _ => value.to_sql(ty, out),
            },
            CoreValue::DateTime(value) => match *ty {
                Type::TIMESTAMPTZ => value.and_utc().to_sql(ty, out),
                _ => value.to_sql(ty, out),
            },
            CoreValue::Date(value) => value.to_sql(ty, out),
            CoreValue::Json(value) => match *ty {
                Type::JSON | Type::JSONB => value.to_sql(ty, out),
                _ => value.to_string().to_sql(ty, out),
            },
            value @ (CoreValue::Record(_) | CoreValue::List(_)) => Err(Box::new(
                Error::type_conversion(value.clone(), "PostgreSQL parameter"),
            )),
        }
    }

    fn accepts(_: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

fn integer(value: i64, ty: &Type, out: &mut BytesMut) -> std::result::Result<IsNull, BoxError> {
    match *ty {
        Type::INT2 => i16::try_from(value)?.to_sql(ty, out),
        Type::INT4 => i32::try_from(value)?.to_sql(ty, out),
        Type::FLOAT8 => (value as f64).to_sql(ty, out),
        _ => value.to_sql(ty, out),
    }
}
