use super::{
    value_chrono::{parse_date, parse_datetime, parse_timestamp},
    Type, Value,
};
use crate::{Error, Result};

impl Value {
    /// Converts a value as returned by a driver into the declared column type.
    ///
    /// Drivers decode using the database's native representation: SQLite has
    /// only 64-bit integers and stores temporal values, UUIDs and JSON as text.
    /// Null is preserved for every type.
    pub fn coerce(self, ty: Type) -> Result<Value> {
        if self.is_null() || self.ty() == Some(ty) {
            return Ok(self);
        }

        if let Some(v) = self.as_i64() {
            return integer(v, ty).ok_or_else(|| Error::type_conversion(self, ty.name()));
        }

        let coerced = match (&self, ty) {
            (Value::Bool(v), Type::I16 | Type::I32 | Type::I64) => {
                return Value::I64(*v as i64).coerce(ty);
            }
            (Value::F64(v), Type::I64) if v.fract() == 0.0 => Some(Value::I64(*v as i64)),
            (Value::String(s), Type::Uuid) => Some(Value::Uuid(s.parse()?)),
            (Value::String(s), Type::Timestamp) => Some(Value::Timestamp(parse_timestamp(s)?)),
            (Value::String(s), Type::DateTime) => Some(Value::DateTime(parse_datetime(s)?)),
            (Value::String(s), Type::Date) => Some(Value::Date(parse_date(s)?)),
            (Value::String(s), Type::Json) => Some(Value::Json(serde_json::from_str(s)?)),
            (Value::String(s), Type::Bytes) => Some(Value::Bytes(s.as_bytes().to_vec())),
            (Value::Bytes(b), Type::Uuid) => Some(Value::Uuid(uuid::Uuid::from_slice(b)?)),
            (Value::Bytes(b), Type::String) => String::from_utf8(b.clone()).ok().map(Value::String),
            (Value::Bytes(b), Type::Json) => Some(Value::Json(serde_json::from_slice(b)?)),
            (Value::Json(v), Type::String) => Some(Value::String(v.to_string())),
            (Value::Uuid(v), Type::String) => Some(Value::String(v.to_string())),
            (Value::Timestamp(v), Type::DateTime) => Some(Value::DateTime(v.naive_utc())),
            (Value::DateTime(v), Type::Timestamp) => Some(Value::Timestamp(v.and_utc())),
            (Value::Timestamp(v), Type::Date) => Some(Value::Date(v.date_naive())),
            (Value::DateTime(v), Type::Date) => Some(Value::Date(v.date())),
            _ => None,
        };

        coerced.ok_or_else(|| Error::type_conversion(self, ty.name()))
    }
}

fn integer(v: i64, ty: Type) -> Option<Value> {
    match ty {
        Type::Bool => Some(Value::Bool(v != 0)),
        Type::I16 => i16::try_from(v).ok().map(Value::I16),
        Type::I32 => i32::try_from(v).ok().map(Value::I32),
        Type::I64 => Some(Value::I64(v)),
        Type::F64 => Some(Value::F64(v as f64)),
        _ => None,
    }
}
