use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use mysql_async::prelude::ToValue;
use tempest_core::{stmt::Value as CoreValue, Error, Result};

#[derive(Debug)]
pub struct Value(CoreValue);

impl Value {
    /// Wraps a parameter value; composite values have no MySQL
    /// representation.
    pub fn new(value: CoreValue) -> Result<Self> {
        match value {
            CoreValue::Record(_) | CoreValue::List(_) => {
                Err(Error::type_conversion(value, "MySQL parameter"))
            }
            value => Ok(Self(value)),
        }
    }

    /// Converts a value read from a result row.
    ///
    /// Text and binary columns both arrive as bytes; valid UTF-8 reads as a
    /// string and the model's declared type coerces it further.
    pub fn from_sql(value: mysql_async::Value) -> Result<CoreValue> {
        use mysql_async::Value as My;

        Ok(match value {
            My::NULL => CoreValue::Null,
            My::Int(value) => CoreValue::I64(value),
            My::UInt(value) => match i64::try_from(value) {
                Ok(value) => CoreValue::I64(value),
                Err(_) => {
                    return Err(Error::type_conversion(
                        CoreValue::String(value.to_string()),
                        "I64",
                    ))
                }
            },
            My::Float(value) => CoreValue::F64(value as f64),
            My::Double(value) => CoreValue::F64(value),
            My::Bytes(bytes) => match String::from_utf8(bytes) {
                Ok(text) => CoreValue::String(text),
                Err(err) => CoreValue::Bytes(err.into_bytes()),
            },
            My::Date(year, month, day, hour, minute, second, micros) => {
                let date = NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32);
                let time = NaiveTime::from_hms_micro_opt(
                    hour as u32,
                    minute as u32,
                    second as u32,
                    micros,
                );

                match (date, time) {
                    (Some(date), Some(time)) => CoreValue::DateTime(date.and_time(time)),
                    _ => {
                        return Err(Error::unsupported_feature(format!(
                            "MySQL date {year:04}-{month:02}-{day:02} is out of range"
                        )))
                    }
                }
            }
            My::Time(..) => {
                return Err(Error::unsupported_feature("reading MySQL TIME columns"))
            }
        })
    }
}

impl ToValue for Value {
    fn to_value(&self) -> mysql_async::Value {
        match &self.0 {
            CoreValue::Null => mysql_async::Value::NULL,
            CoreValue::Bool(value) => value.to_value(),
            CoreValue::I16(value) => value.to_value(),
            CoreValue::I32(value) => value.to_value(),
            CoreValue::I64(value) => value.to_value(),
            CoreValue::F64(value) => value.to_value(),
            CoreValue::String(value) => value.to_value(),
            CoreValue::Bytes(value) => value.to_value(),
            CoreValue::Uuid(value) => value.to_string().to_value(),
            CoreValue::Timestamp(value) => date_time(&value.naive_utc()),
            CoreValue::DateTime(value) => date_time(value),
            CoreValue::Date(value) => mysql_async::Value::Date(
                value.year() as u16,
                value.month() as u8,
                value.day() as u8,
                0,
                0,
                0,
                0,
            ),
            CoreValue::Json(value) => value.to_string().to_value(),
            // Rejected by `Value::new`
            CoreValue::Record(_) | CoreValue::List(_) => mysql_async::Value::NULL,
        }
    }
}

fn date_time(value: &NaiveDateTime) -> mysql_async::Value {
    mysql_async::Value::Date(
        value.year() as u16,
        value.month() as u8,
        value.day() as u8,
        value.hour() as u8,
        value.minute() as u8,
        value.second() as u8,
        value.and_utc().timestamp_subsec_micros(),
    )
}
