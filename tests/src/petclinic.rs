//! The petclinic domain used throughout the integration tests.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};
use tempest::{
    schema::FieldDef, Entity, Error, Model, Projection, Record, Ref, RefFactory, Result, Type,
    Value,
};

/// Builds a model once and hands out clones of it.
macro_rules! model {
    ($build:expr) => {{
        static MODEL: OnceLock<Arc<Model>> = OnceLock::new();
        MODEL
            .get_or_init(|| $build.build().expect("invalid petclinic model"))
            .clone()
    }};
}

/// Reads record fields in declaration order.
struct Fields(std::vec::IntoIter<Value>);

impl Fields {
    fn new(value: Value) -> Result<Fields> {
        Ok(Fields(value.into_record()?.into_vec().into_iter()))
    }

    fn value(&mut self) -> Result<Value> {
        self.0
            .next()
            .ok_or_else(|| tempest::err!("record has fewer fields than the model"))
    }

    fn next<T: TryFrom<Value, Error = Error>>(&mut self) -> Result<T> {
        self.value()?.try_into()
    }
}

fn key(r: &Option<Ref<impl Record>>) -> Value {
    r.as_ref().map_or(Value::Null, |r| r.id().clone())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PetType {
    pub id: i32,
    pub name: String,
}

impl PetType {
    pub fn new(name: &str) -> PetType {
        PetType {
            id: 0,
            name: name.to_string(),
        }
    }
}

impl Record for PetType {
    fn model() -> Arc<Model> {
        model!(Model::builder("pet_type")
            .field(FieldDef::primitive("id", Type::I32).primary_key().auto_increment())
            .field(FieldDef::primitive("name", Type::String)))
    }

    fn to_value(&self) -> Value {
        Value::record_from_vec(vec![self.id.into(), self.name.clone().into()])
    }

    fn from_value(value: Value, _: &RefFactory) -> Result<Self> {
        let mut fields = Fields::new(value)?;
        Ok(PetType {
            id: fields.next()?,
            name: fields.next()?,
        })
    }
}

impl Entity for PetType {
    type Id = i32;

    fn id(&self) -> i32 {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
}

impl Address {
    fn model() -> Arc<Model> {
        model!(Model::inline()
            .field(FieldDef::primitive("street", Type::String))
            .field(FieldDef::primitive("city", Type::String)))
    }

    fn to_value(&self) -> Value {
        Value::record_from_vec(vec![self.street.clone().into(), self.city.clone().into()])
    }

    fn from_value(value: Value) -> Result<Self> {
        let mut fields = Fields::new(value)?;
        Ok(Address {
            street: fields.next()?,
            city: fields.next()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Owner {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub address: Address,
    pub telephone: Option<String>,
}

impl Owner {
    pub fn new(first_name: &str, last_name: &str, city: &str) -> Owner {
        Owner {
            id: 0,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            address: Address {
                street: "110 W. Liberty St.".to_string(),
                city: city.to_string(),
            },
            telephone: None,
        }
    }
}

impl Record for Owner {
    fn model() -> Arc<Model> {
        model!(Model::builder("owner")
            .field(FieldDef::primitive("id", Type::I32).primary_key().auto_increment())
            .field(FieldDef::primitive("first_name", Type::String))
            .field(FieldDef::primitive("last_name", Type::String))
            .field(FieldDef::inline("address", Address::model()))
            .field(FieldDef::primitive("telephone", Type::String).nullable()))
    }

    fn to_value(&self) -> Value {
        Value::record_from_vec(vec![
            self.id.into(),
            self.first_name.clone().into(),
            self.last_name.clone().into(),
            self.address.to_value(),
            self.telephone.clone().into(),
        ])
    }

    fn from_value(value: Value, _: &RefFactory) -> Result<Self> {
        let mut fields = Fields::new(value)?;
        Ok(Owner {
            id: fields.next()?,
            first_name: fields.next()?,
            last_name: fields.next()?,
            address: Address::from_value(fields.value()?)?,
            telephone: fields.next()?,
        })
    }
}

impl Entity for Owner {
    type Id = i32;

    fn id(&self) -> i32 {
        self.id
    }
}

/// An owner read through a narrower view of the `owner` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerName {
    pub last_name: String,
}

impl Record for OwnerName {
    fn model() -> Arc<Model> {
        model!(Model::projection("owner")
            .field(FieldDef::primitive("id", Type::I32).primary_key())
            .field(FieldDef::primitive("last_name", Type::String)))
    }

    fn to_value(&self) -> Value {
        Value::record_from_vec(vec![Value::Null, self.last_name.clone().into()])
    }

    fn from_value(value: Value, _: &RefFactory) -> Result<Self> {
        let mut fields = Fields::new(value)?;
        fields.value()?;
        Ok(OwnerName {
            last_name: fields.next()?,
        })
    }
}

impl Projection for OwnerName {}

/// The pet type is read along with the pet; the owner is fetched on demand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pet {
    pub id: i32,
    pub name: String,
    pub birth_date: NaiveDate,
    pub pet_type: PetType,
    pub owner: Option<Ref<Owner>>,
}

impl Pet {
    pub fn new(name: &str, birth_date: NaiveDate, pet_type: &PetType, owner: &Owner) -> Pet {
        Pet {
            id: 0,
            name: name.to_string(),
            birth_date,
            pet_type: pet_type.clone(),
            owner: Some(Ref::new(owner.id)),
        }
    }
}

impl Record for Pet {
    fn model() -> Arc<Model> {
        model!(Model::builder("pet")
            .field(FieldDef::primitive("id", Type::I32).primary_key().auto_increment())
            .field(FieldDef::primitive("name", Type::String))
            .field(FieldDef::primitive("birth_date", Type::Date))
            .field(FieldDef::foreign_key("type", PetType::model()))
            .field(FieldDef::foreign_key("owner", Owner::model()).lazy().nullable()))
    }

    fn to_value(&self) -> Value {
        Value::record_from_vec(vec![
            self.id.into(),
            self.name.clone().into(),
            self.birth_date.into(),
            self.pet_type.to_value(),
            key(&self.owner),
        ])
    }

    fn from_value(value: Value, refs: &RefFactory) -> Result<Self> {
        let mut fields = Fields::new(value)?;
        Ok(Pet {
            id: fields.next()?,
            name: fields.next()?,
            birth_date: fields.next()?,
            pet_type: PetType::from_value(fields.value()?, refs)?,
            owner: refs.create(fields.value()?),
        })
    }
}

impl Entity for Pet {
    type Id = i32;

    fn id(&self) -> i32 {
        self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Visit {
    pub id: i32,
    pub pet: Ref<Pet>,
    pub visit_date: NaiveDate,
    pub description: String,
}

impl Record for Visit {
    fn model() -> Arc<Model> {
        model!(Model::builder("visit")
            .field(FieldDef::primitive("id", Type::I32).primary_key().auto_increment())
            .field(FieldDef::foreign_key("pet", Pet::model()).lazy())
            .field(FieldDef::primitive("visit_date", Type::Date))
            .field(FieldDef::primitive("description", Type::String)))
    }

    fn to_value(&self) -> Value {
        Value::record_from_vec(vec![
            self.id.into(),
            self.pet.id().clone(),
            self.visit_date.into(),
            self.description.clone().into(),
        ])
    }

    fn from_value(value: Value, refs: &RefFactory) -> Result<Self> {
        let mut fields = Fields::new(value)?;
        let id = fields.next()?;
        let pet = refs
            .create(fields.value()?)
            .ok_or_else(|| tempest::err!("visit {id} has no pet"))?;

        Ok(Visit {
            id,
            pet,
            visit_date: fields.next()?,
            description: fields.next()?,
        })
    }
}

impl Entity for Visit {
    type Id = i32;

    fn id(&self) -> i32 {
        self.id
    }
}

/// A specialty's key is assigned by the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specialty {
    pub id: i32,
    pub name: String,
}

impl Specialty {
    pub fn new(id: i32, name: &str) -> Specialty {
        Specialty {
            id,
            name: name.to_string(),
        }
    }
}

impl Record for Specialty {
    fn model() -> Arc<Model> {
        model!(Model::builder("specialty")
            .field(FieldDef::primitive("id", Type::I32).primary_key())
            .field(FieldDef::primitive("name", Type::String)))
    }

    fn to_value(&self) -> Value {
        Value::record_from_vec(vec![self.id.into(), self.name.clone().into()])
    }

    fn from_value(value: Value, _: &RefFactory) -> Result<Self> {
        let mut fields = Fields::new(value)?;
        Ok(Specialty {
            id: fields.next()?,
            name: fields.next()?,
        })
    }
}

impl Entity for Specialty {
    type Id = i32;

    fn id(&self) -> i32 {
        self.id
    }
}

/// A vet guarded by an integer version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionedVet {
    pub id: i32,
    pub name: String,
    pub version: i32,
}

impl VersionedVet {
    pub fn new(name: &str) -> VersionedVet {
        VersionedVet {
            id: 0,
            name: name.to_string(),
            version: 0,
        }
    }
}

impl Record for VersionedVet {
    fn model() -> Arc<Model> {
        model!(Model::builder("versioned_vet")
            .field(FieldDef::primitive("id", Type::I32).primary_key().auto_increment())
            .field(FieldDef::primitive("name", Type::String))
            .field(FieldDef::primitive("version", Type::I32).version()))
    }

    fn to_value(&self) -> Value {
        Value::record_from_vec(vec![
            self.id.into(),
            self.name.clone().into(),
            self.version.into(),
        ])
    }

    fn from_value(value: Value, _: &RefFactory) -> Result<Self> {
        let mut fields = Fields::new(value)?;
        Ok(VersionedVet {
            id: fields.next()?,
            name: fields.next()?,
            version: fields.next()?,
        })
    }
}

impl Entity for VersionedVet {
    type Id = i32;

    fn id(&self) -> i32 {
        self.id
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}
