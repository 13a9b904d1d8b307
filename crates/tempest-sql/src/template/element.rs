use super::Template;

use std::sync::Arc;
use tempest_core::{
    stmt::{Value, ValueRecord},
    Model,
};

/// A typed hole in a [`Template`].
///
/// Elements are resolved against their models and the dialect when the
/// template is compiled. Record-oriented elements expand to one placeholder
/// per column.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// A table, rendered with its alias in a SELECT
    Table(TableRef),

    /// A table followed by the joins of its eagerly loaded foreign keys
    From(TableRef),

    /// The alias of a table
    Alias(TableRef),

    /// A column qualified by its table's alias
    Column(ColumnRef),

    /// A value bound when the template is compiled
    Param(Param),

    /// A named value bound later, per execution or batch entry
    BindVar(String),

    /// A nested template
    Template(Template),

    /// SQL text copied verbatim
    Unsafe(String),

    /// The column list of a SELECT
    Select(Arc<Model>),

    /// The target and column list of an INSERT
    Insert(Arc<Model>),

    /// The row list of an INSERT
    Values(Arc<Model>, RecordSource),

    /// The target of an UPDATE
    Update(Arc<Model>),

    /// The assignments of an UPDATE
    Set(Arc<Model>, RecordSource),

    /// A key predicate
    Where(Arc<Model>, Predicate),

    /// The target of a DELETE
    Delete(Arc<Model>),

    /// A single-row SELECT of literal values, the source of a MERGE
    SourceRow(Arc<Model>, RecordSource),

    /// The next value of the model's version column
    VersionIncrement {
        model: Arc<Model>,
        qualifier: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRef {
    pub model: Arc<Model>,

    /// Explicit alias; generated when `None`
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRef {
    pub table: TableRef,

    /// Column name, or the name of a single-column field
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: Option<String>,
    pub value: Value,
}

/// Where the values of a record element come from.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordSource {
    /// Values known now, one record per row
    Records(Vec<ValueRecord>),

    /// One row whose values are bound per batch entry
    Deferred,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Matches the record's primary key, and its version when the model has
    /// one
    Record(ValueRecord),

    /// Matches one primary key value
    Id(Value),

    /// Matches any of the primary key values
    Ids(Vec<Value>),

    /// Like `Record`, with values bound per batch entry
    Deferred,
}

impl TableRef {
    pub fn new(model: &Arc<Model>) -> TableRef {
        TableRef {
            model: model.clone(),
            alias: None,
        }
    }
}

impl Param {
    pub fn positional(value: impl Into<Value>) -> Param {
        Param {
            name: None,
            value: value.into(),
        }
    }

    pub fn named(name: impl Into<String>, value: impl Into<Value>) -> Param {
        Param {
            name: Some(name.into()),
            value: value.into(),
        }
    }
}

impl From<Template> for Element {
    fn from(value: Template) -> Self {
        Element::Template(value)
    }
}

impl From<Param> for Element {
    fn from(value: Param) -> Self {
        Element::Param(value)
    }
}
