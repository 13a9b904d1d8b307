use super::{Type, ValueRecord};
use crate::{Error, Result};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::hash::{Hash, Hasher};

#[derive(Debug, Default, Clone)]
pub enum Value {
    /// Boolean value
    Bool(bool),

    /// Signed 16-bit integer
    I16(i16),

    /// Signed 32-bit integer
    I32(i32),

    /// Signed 64-bit integer
    I64(i64),

    /// Double precision float
    F64(f64),

    /// String value
    String(String),

    /// Binary value
    Bytes(Vec<u8>),

    Uuid(uuid::Uuid),

    /// An instant in UTC
    Timestamp(DateTime<Utc>),

    /// A date and time without a zone
    DateTime(NaiveDateTime),

    Date(NaiveDate),

    /// A JSON document
    Json(serde_json::Value),

    /// Null value
    #[default]
    Null,

    /// Composite value: an inline record, a composite key or a whole row
    Record(ValueRecord),

    /// A list of values, used for `IN` lists
    List(Vec<Value>),
}

impl Value {
    pub const fn null() -> Self {
        Self::Null
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub const fn is_record(&self) -> bool {
        matches!(self, Self::Record(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    pub fn record_from_vec(fields: Vec<Self>) -> Self {
        ValueRecord::from_vec(fields).into()
    }

    pub fn list_from_vec(items: Vec<Self>) -> Self {
        Self::List(items)
    }

    /// The type of a scalar value, `None` for null and composite values.
    pub fn ty(&self) -> Option<Type> {
        Some(match self {
            Self::Bool(_) => Type::Bool,
            Self::I16(_) => Type::I16,
            Self::I32(_) => Type::I32,
            Self::I64(_) => Type::I64,
            Self::F64(_) => Type::F64,
            Self::String(_) => Type::String,
            Self::Bytes(_) => Type::Bytes,
            Self::Uuid(_) => Type::Uuid,
            Self::Timestamp(_) => Type::Timestamp,
            Self::DateTime(_) => Type::DateTime,
            Self::Date(_) => Type::Date,
            Self::Json(_) => Type::Json,
            Self::Null | Self::Record(_) | Self::List(_) => return None,
        })
    }

    pub(crate) fn variant_name(&self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Record(_) => "Record",
            Self::List(_) => "List",
            _ => self.ty().map(|ty| ty.name()).unwrap_or("Null"),
        }
    }

    /// Returns `true` if the value is the "not assigned yet" value of its
    /// type.
    ///
    /// A primary key holding its default value has not been generated by the
    /// database yet. Composite keys are default only when every component is.
    pub fn is_default(&self) -> bool {
        match self {
            Self::Null => true,
            Self::I16(v) => *v == 0,
            Self::I32(v) => *v == 0,
            Self::I64(v) => *v == 0,
            Self::F64(v) => *v == 0.0,
            Self::String(v) => v.is_empty(),
            Self::Bytes(v) => v.is_empty(),
            Self::Uuid(v) => v.is_nil(),
            Self::Record(record) => record.iter().all(Value::is_default),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::I16(v) => Some(v as i64),
            Self::I32(v) => Some(v as i64),
            Self::I64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&ValueRecord> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn into_record(self) -> Result<ValueRecord> {
        match self {
            Self::Record(record) => Ok(record),
            value => Err(Error::type_conversion(value, "Record")),
        }
    }

    pub fn into_list(self) -> Result<Vec<Value>> {
        match self {
            Self::List(items) => Ok(items),
            value => Err(Error::type_conversion(value, "List")),
        }
    }

    /// Follows `path` through nested records.
    ///
    /// Stops at the first null: a missing nested record makes every value
    /// below it null.
    pub fn entry(&self, path: &[usize]) -> Result<&Value> {
        let mut value = self;
        for &step in path {
            value = match value {
                Self::Null => return Ok(value),
                Self::Record(record) => record.get(step).ok_or_else(|| {
                    crate::err!("record has {} fields, no field at index {step}", record.len())
                })?,
                _ => return Err(Error::type_conversion(value.clone(), "Record")),
            };
        }
        Ok(value)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;

        match (self, other) {
            (Bool(a), Bool(b)) => a == b,
            (I16(a), I16(b)) => a == b,
            (I32(a), I32(b)) => a == b,
            (I64(a), I64(b)) => a == b,
            (F64(a), F64(b)) => a.to_bits() == b.to_bits(),
            (String(a), String(b)) => a == b,
            (Bytes(a), Bytes(b)) => a == b,
            (Uuid(a), Uuid(b)) => a == b,
            (Timestamp(a), Timestamp(b)) => a == b,
            (DateTime(a), DateTime(b)) => a == b,
            (Date(a), Date(b)) => a == b,
            (Json(a), Json(b)) => a == b,
            (Null, Null) => true,
            (Record(a), Record(b)) => a == b,
            (List(a), List(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        core::mem::discriminant(self).hash(state);

        match self {
            Self::Bool(v) => v.hash(state),
            Self::I16(v) => v.hash(state),
            Self::I32(v) => v.hash(state),
            Self::I64(v) => v.hash(state),
            Self::F64(v) => v.to_bits().hash(state),
            Self::String(v) => v.hash(state),
            Self::Bytes(v) => v.hash(state),
            Self::Uuid(v) => v.hash(state),
            Self::Timestamp(v) => v.hash(state),
            Self::DateTime(v) => v.hash(state),
            Self::Date(v) => v.hash(state),
            Self::Json(v) => v.to_string().hash(state),
            Self::Null => {}
            Self::Record(v) => v.hash(state),
            Self::List(v) => v.hash(state),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Self::String(value.clone())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Self::Bytes(value.to_vec())
    }
}

impl From<uuid::Uuid> for Value {
    fn from(value: uuid::Uuid) -> Self {
        Self::Uuid(value)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

impl From<ValueRecord> for Value {
    fn from(value: ValueRecord) -> Self {
        Self::Record(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Self::List(value)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => value.into(),
            None => Self::Null,
        }
    }
}

macro_rules! impl_try_from_value {
    ( $( $ty:ty => $variant:ident, )* ) => {
        $(
            impl TryFrom<Value> for $ty {
                type Error = Error;

                fn try_from(value: Value) -> Result<Self> {
                    match value.coerce(Type::$variant)? {
                        Value::$variant(v) => Ok(v),
                        value => Err(Error::type_conversion(value, stringify!($ty))),
                    }
                }
            }

            impl TryFrom<Value> for Option<$ty> {
                type Error = Error;

                fn try_from(value: Value) -> Result<Self> {
                    match value {
                        Value::Null => Ok(None),
                        value => <$ty>::try_from(value).map(Some),
                    }
                }
            }
        )*
    };
}

impl_try_from_value! {
    bool => Bool,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    f64 => F64,
    String => String,
    Vec<u8> => Bytes,
    uuid::Uuid => Uuid,
    DateTime<Utc> => Timestamp,
    NaiveDateTime => DateTime,
    NaiveDate => Date,
    serde_json::Value => Json,
}
