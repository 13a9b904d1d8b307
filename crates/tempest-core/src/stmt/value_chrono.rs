use super::Value;
use crate::Result;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Text format used when temporal values are stored as strings.
pub(crate) const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

impl From<DateTime<Utc>> for Value {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Self::DateTime(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

pub(crate) fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Ok(ts.with_timezone(&Utc));
    }
    Ok(parse_datetime(s)?.and_utc())
}

pub(crate) fn parse_datetime(s: &str) -> Result<NaiveDateTime> {
    match NaiveDateTime::parse_from_str(s, DATETIME_FORMAT) {
        Ok(dt) => Ok(dt),
        Err(_) => Ok(NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")?),
    }
}

pub(crate) fn parse_date(s: &str) -> Result<NaiveDate> {
    Ok(NaiveDate::parse_from_str(s, DATE_FORMAT)?)
}

impl Value {
    /// Renders a temporal value in the text form used by databases without
    /// native temporal types.
    pub fn to_temporal_text(&self) -> Option<String> {
        match self {
            Self::Timestamp(v) => Some(v.naive_utc().format(DATETIME_FORMAT).to_string()),
            Self::DateTime(v) => Some(v.format(DATETIME_FORMAT).to_string()),
            Self::Date(v) => Some(v.format(DATE_FORMAT).to_string()),
            _ => None,
        }
    }
}
