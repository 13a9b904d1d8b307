/// Declared type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Bool,
    I16,
    I32,
    I64,
    F64,
    String,
    Bytes,
    Uuid,

    /// An instant, `chrono::DateTime<Utc>`
    Timestamp,

    /// A wall-clock date and time without a zone
    DateTime,

    Date,

    /// A JSON document stored in a single column
    Json,
}

impl Type {
    pub fn is_integer(&self) -> bool {
        matches!(self, Self::I16 | Self::I32 | Self::I64)
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer() || matches!(self, Self::F64)
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, Self::Timestamp | Self::DateTime | Self::Date)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Bool => "Bool",
            Self::I16 => "I16",
            Self::I32 => "I32",
            Self::I64 => "I64",
            Self::F64 => "F64",
            Self::String => "String",
            Self::Bytes => "Bytes",
            Self::Uuid => "Uuid",
            Self::Timestamp => "Timestamp",
            Self::DateTime => "DateTime",
            Self::Date => "Date",
            Self::Json => "Json",
        }
    }
}

impl core::fmt::Display for Type {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}
