use super::{Column, Field, FieldTy, ModelBuilder};
use crate::{
    stmt::{Value, ValueRecord},
    Error, Result,
};

use std::fmt;

/// Describes one persistent record type.
///
/// A model is built once, shared as `Arc<Model>` and never mutated. Its
/// `columns` are the declared fields expanded depth first: an inline field
/// contributes the inline model's columns and a foreign key contributes one
/// column per key column of its target, each at the position of the owning
/// field.
#[derive(Debug)]
pub struct Model {
    pub kind: ModelKind,

    /// Table or view, `None` for inline models
    pub table: Option<TableName>,

    /// Declared fields, in declaration order
    pub fields: Vec<Field>,

    /// Expanded columns
    pub columns: Vec<Column>,

    pub(super) primary_key: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    /// A record with identity and a mutable lifecycle
    Entity,

    /// A read model, possibly without a key
    Projection,

    /// A group of fields stored in the owning model's table
    Inline,
}

/// Possibly schema-qualified table name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableName {
    pub schema: Option<String>,
    pub name: String,
}

impl Model {
    pub fn builder(table: impl Into<TableName>) -> ModelBuilder {
        ModelBuilder::new(ModelKind::Entity, Some(table.into()))
    }

    pub fn projection(view: impl Into<TableName>) -> ModelBuilder {
        ModelBuilder::new(ModelKind::Projection, Some(view.into()))
    }

    pub fn inline() -> ModelBuilder {
        ModelBuilder::new(ModelKind::Inline, None)
    }

    /// Name used in diagnostics: the table name, or `<inline>`.
    pub fn name(&self) -> &str {
        self.table
            .as_ref()
            .map(|table| &table.name[..])
            .unwrap_or("<inline>")
    }

    pub fn table_name(&self) -> Result<&TableName> {
        self.table
            .as_ref()
            .ok_or_else(|| Error::sql_template("inline model has no table"))
    }

    pub fn is_entity(&self) -> bool {
        self.kind == ModelKind::Entity
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn primary_key_field(&self) -> Option<&Field> {
        self.primary_key.map(|index| &self.fields[index])
    }

    pub fn primary_key_columns(&self) -> impl Iterator<Item = &Column> + '_ {
        self.columns.iter().filter(|column| column.primary_key)
    }

    pub fn version_column(&self) -> Option<&Column> {
        self.columns.iter().find(|column| column.version)
    }

    /// The database generates the primary key.
    pub fn auto_generated_pk(&self) -> bool {
        self.primary_key_columns().any(Column::is_generated)
    }

    /// Returns the primary key held by `record`.
    pub fn key_value(&self, record: &ValueRecord) -> Result<Value> {
        let Some(index) = self.primary_key else {
            return Err(Error::sql_template(format!(
                "model `{}` has no primary key",
                self.name()
            )));
        };

        record.get(index).cloned().ok_or_else(|| {
            crate::err!(
                "record for `{}` has {} fields, expected {}",
                self.name(),
                record.len(),
                self.fields.len()
            )
        })
    }

    /// Splits a key value into one value per primary key column.
    pub fn key_column_values(&self, key: &Value) -> Result<Vec<Value>> {
        let Some(index) = self.primary_key else {
            return Err(Error::sql_template(format!(
                "model `{}` has no primary key",
                self.name()
            )));
        };

        self.primary_key_columns()
            .map(|column| {
                debug_assert_eq!(column.path[0], index);
                key.entry(&column.path[1..]).cloned()
            })
            .collect()
    }

    /// Extracts the value of every expanded column from a record, in column
    /// order.
    pub fn column_values(&self, record: &ValueRecord) -> Result<Vec<Value>> {
        self.columns
            .iter()
            .map(|column| self.column_value(record, column))
            .collect()
    }

    /// Extracts one column's value from a record by following the column's
    /// path.
    pub fn column_value(&self, record: &ValueRecord, column: &Column) -> Result<Value> {
        let (first, rest) = column
            .path
            .split_first()
            .ok_or_else(|| crate::err!("column `{}` has an empty path", column.name))?;

        let field = record.get(*first).ok_or_else(|| {
            crate::err!(
                "record for `{}` has {} fields, no field at index {first}",
                self.name(),
                record.len()
            )
        })?;

        let value = field.entry(rest)?.clone();

        if column.json {
            return Ok(match value {
                Value::Json(_) | Value::Null => value,
                Value::String(s) => Value::Json(serde_json::Value::String(s)),
                value => return Err(Error::type_conversion(value, "Json")),
            });
        }

        Ok(value)
    }

    /// Number of values a row selected for this model carries.
    pub fn select_width(&self) -> usize {
        self.fields
            .iter()
            .map(|field| match &field.ty {
                FieldTy::ForeignKey(fk) if !fk.lazy => fk.target.select_width(),
                _ => self
                    .columns
                    .iter()
                    .filter(|column| column.path[0] == field.index)
                    .count(),
            })
            .sum()
    }
}

impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.table == other.table && self.columns == other.columns
    }
}

impl Eq for Model {}

impl TableName {
    pub fn new(name: impl Into<String>) -> TableName {
        TableName {
            schema: None,
            name: name.into(),
        }
    }

    pub fn qualified(schema: impl Into<String>, name: impl Into<String>) -> TableName {
        TableName {
            schema: Some(schema.into()),
            name: name.into(),
        }
    }
}

impl From<&str> for TableName {
    fn from(value: &str) -> Self {
        TableName::new(value)
    }
}

impl From<String> for TableName {
    fn from(value: String) -> Self {
        TableName::new(value)
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(schema) = &self.schema {
            write!(f, "{schema}.")?;
        }
        f.write_str(&self.name)
    }
}
