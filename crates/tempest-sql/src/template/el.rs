//! Element constructors.

use super::{ColumnRef, Element, Param, Predicate, RecordSource, TableRef};

use std::sync::Arc;
use tempest_core::{
    stmt::{Value, ValueRecord},
    Model,
};

pub fn table(model: &Arc<Model>) -> Element {
    Element::Table(TableRef::new(model))
}

pub fn table_as(model: &Arc<Model>, alias: impl Into<String>) -> Element {
    Element::Table(TableRef {
        model: model.clone(),
        alias: Some(alias.into()),
    })
}

pub fn from(model: &Arc<Model>) -> Element {
    Element::From(TableRef::new(model))
}

pub fn from_as(model: &Arc<Model>, alias: impl Into<String>) -> Element {
    Element::From(TableRef {
        model: model.clone(),
        alias: Some(alias.into()),
    })
}

pub fn alias(model: &Arc<Model>) -> Element {
    Element::Alias(TableRef::new(model))
}

pub fn column(model: &Arc<Model>, name: impl Into<String>) -> Element {
    Element::Column(ColumnRef {
        table: TableRef::new(model),
        name: name.into(),
    })
}

pub fn column_of(model: &Arc<Model>, alias: impl Into<String>, name: impl Into<String>) -> Element {
    Element::Column(ColumnRef {
        table: TableRef {
            model: model.clone(),
            alias: Some(alias.into()),
        },
        name: name.into(),
    })
}

pub fn param(value: impl Into<Value>) -> Element {
    Element::Param(Param::positional(value))
}

pub fn named_param(name: impl Into<String>, value: impl Into<Value>) -> Element {
    Element::Param(Param::named(name, value))
}

pub fn bind_var(name: impl Into<String>) -> Element {
    Element::BindVar(name.into())
}

/// SQL text that is copied into the statement without escaping.
pub fn unsafe_sql(sql: impl Into<String>) -> Element {
    Element::Unsafe(sql.into())
}

pub fn select(model: &Arc<Model>) -> Element {
    Element::Select(model.clone())
}

pub fn insert(model: &Arc<Model>) -> Element {
    Element::Insert(model.clone())
}

pub fn values(model: &Arc<Model>, records: Vec<ValueRecord>) -> Element {
    Element::Values(model.clone(), RecordSource::Records(records))
}

pub fn values_deferred(model: &Arc<Model>) -> Element {
    Element::Values(model.clone(), RecordSource::Deferred)
}

pub fn update(model: &Arc<Model>) -> Element {
    Element::Update(model.clone())
}

pub fn set(model: &Arc<Model>, record: ValueRecord) -> Element {
    Element::Set(model.clone(), RecordSource::Records(vec![record]))
}

pub fn set_deferred(model: &Arc<Model>) -> Element {
    Element::Set(model.clone(), RecordSource::Deferred)
}

pub fn where_record(model: &Arc<Model>, record: ValueRecord) -> Element {
    Element::Where(model.clone(), Predicate::Record(record))
}

pub fn where_id(model: &Arc<Model>, id: impl Into<Value>) -> Element {
    Element::Where(model.clone(), Predicate::Id(id.into()))
}

pub fn where_ids(model: &Arc<Model>, ids: Vec<Value>) -> Element {
    Element::Where(model.clone(), Predicate::Ids(ids))
}

pub fn where_deferred(model: &Arc<Model>) -> Element {
    Element::Where(model.clone(), Predicate::Deferred)
}

pub fn delete(model: &Arc<Model>) -> Element {
    Element::Delete(model.clone())
}

pub fn source_row(model: &Arc<Model>, record: ValueRecord) -> Element {
    Element::SourceRow(model.clone(), RecordSource::Records(vec![record]))
}

pub fn source_row_deferred(model: &Arc<Model>) -> Element {
    Element::SourceRow(model.clone(), RecordSource::Deferred)
}

pub fn version_increment(model: &Arc<Model>, qualifier: Option<&str>) -> Element {
    Element::VersionIncrement {
        model: model.clone(),
        qualifier: qualifier.map(str::to_string),
    }
}
