#![allow(dead_code)]

use std::sync::Arc;
use tempest_core::{
    schema::FieldDef,
    stmt::{Type, Value, ValueRecord},
    Model,
};
use tempest_sql::{Compiler, Dialect, Statement, Template};

pub fn compile(dialect: Dialect, template: &Template) -> Statement {
    Compiler::new(dialect).compile(template).unwrap()
}

pub fn record(values: impl IntoIterator<Item = Value>) -> ValueRecord {
    ValueRecord::from_vec(values.into_iter().collect())
}

pub fn address() -> Arc<Model> {
    Model::inline()
        .field(FieldDef::primitive("address", Type::String))
        .field(FieldDef::primitive("city", Type::String))
        .build()
        .unwrap()
}

pub fn owner() -> Arc<Model> {
    Model::builder("owner")
        .field(FieldDef::primitive("id", Type::I32).primary_key().auto_increment())
        .field(FieldDef::primitive("first_name", Type::String))
        .field(FieldDef::primitive("last_name", Type::String))
        .field(FieldDef::inline("address", address()))
        .field(FieldDef::primitive("telephone", Type::String).nullable())
        .build()
        .unwrap()
}

pub fn pet_type() -> Arc<Model> {
    Model::builder("pet_type")
        .field(FieldDef::primitive("id", Type::I32).primary_key().auto_increment())
        .field(FieldDef::primitive("name", Type::String))
        .build()
        .unwrap()
}

pub fn pet() -> Arc<Model> {
    Model::builder("pet")
        .field(FieldDef::primitive("id", Type::I32).primary_key().auto_increment())
        .field(FieldDef::primitive("name", Type::String))
        .field(FieldDef::primitive("birth_date", Type::Date))
        .field(FieldDef::foreign_key("type", pet_type()).columns(["type_id"]))
        .field(FieldDef::foreign_key("owner", owner()).nullable())
        .build()
        .unwrap()
}

pub fn vet() -> Arc<Model> {
    Model::builder("vet")
        .field(FieldDef::primitive("id", Type::I32).primary_key().auto_increment())
        .field(FieldDef::primitive("first_name", Type::String))
        .field(FieldDef::primitive("last_name", Type::String))
        .build()
        .unwrap()
}

pub fn vet_specialty() -> Arc<Model> {
    let pk = Model::inline()
        .field(FieldDef::primitive("vet_id", Type::I32))
        .field(FieldDef::primitive("specialty_id", Type::I32))
        .build()
        .unwrap();

    Model::builder("vet_specialty")
        .field(FieldDef::inline("id", pk).primary_key())
        .build()
        .unwrap()
}

/// A vet with an integer version column
pub fn versioned_vet() -> Arc<Model> {
    Model::builder("vet")
        .field(FieldDef::primitive("id", Type::I32).primary_key().auto_increment())
        .field(FieldDef::primitive("first_name", Type::String))
        .field(FieldDef::primitive("last_name", Type::String))
        .field(FieldDef::primitive("version", Type::I32).version())
        .build()
        .unwrap()
}

/// A visit whose version is a timestamp
pub fn visit() -> Arc<Model> {
    Model::builder("visit")
        .field(FieldDef::primitive("id", Type::I64).primary_key().auto_increment())
        .field(FieldDef::primitive("description", Type::String))
        .field(FieldDef::primitive("updated_at", Type::Timestamp).version())
        .build()
        .unwrap()
}

pub fn new_vet(first_name: &str, last_name: &str) -> ValueRecord {
    record([Value::Null, first_name.into(), last_name.into()])
}
