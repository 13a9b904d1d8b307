//! JSON form of [`Ref`] values and tagged-variant decoding.
//!
//! A ref serializes as:
//!
//! * its key when not loaded: `7`, `"a1b2"`, `[1, 2]` for composite keys,
//! * `{"@entity": {...}}` when it holds an entity,
//! * `{"@id": 7, "@projection": {...}}` when it holds a projection, whose
//!   fields may not include the key.
//!
//! Deserializing through serde yields detached refs. [`ref_from_value`] and
//! [`ref_from_str`] take a [`RefFactory`] so the refs can fetch.

use crate::{Record, Ref, RefFactory};

use serde::{
    de::{self, DeserializeOwned},
    ser::{self, SerializeMap},
    Deserialize, Deserializer, Serialize, Serializer,
};
use serde_json::{Map, Value as Json};
use std::{collections::HashMap, fmt};
use tempest_core::{stmt::Value, Error, Result};

const ENTITY: &str = "@entity";
const ID: &str = "@id";
const PROJECTION: &str = "@projection";
const TYPE: &str = "@type";

impl<T: Record + Serialize> Serialize for Ref<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let id = key_to_json(self.id()).map_err(ser::Error::custom)?;

        match self.get() {
            None => id.serialize(serializer),
            Some(record) if T::model().is_entity() => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(ENTITY, record)?;
                map.end()
            }
            Some(record) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry(ID, &id)?;
                map.serialize_entry(PROJECTION, record)?;
                map.end()
            }
        }
    }
}

impl<'de, T: Record + DeserializeOwned> Deserialize<'de> for Ref<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let json = Json::deserialize(deserializer)?;
        ref_from_value(json, &RefFactory::detached())
            .map_err(de::Error::custom)?
            .ok_or_else(|| de::Error::custom("null is not a ref; use `Option<Ref<T>>`"))
    }
}

/// Reads a ref, attaching `refs` so it can fetch. JSON `null` reads as
/// `None`.
pub fn ref_from_value<T>(json: Json, refs: &RefFactory) -> Result<Option<Ref<T>>>
where
    T: Record + DeserializeOwned,
{
    let mut object = match json {
        Json::Null => return Ok(None),
        Json::Object(object) => object,
        key => return Ok(refs.create(key_from_json::<T>(key)?)),
    };

    let mut r = if let Some(record) = object.remove(ENTITY) {
        let record: T = serde_json::from_value(record)?;
        let id = T::model().key_value(&record.to_value().into_record()?)?;
        Ref::loaded(id, record)
    } else if let (Some(id), Some(record)) = (object.remove(ID), object.remove(PROJECTION)) {
        let id = key_from_json::<T>(id)?;
        Ref::loaded(id, serde_json::from_value(record)?)
    } else {
        return Err(tempest_core::err!(
            "expected a key, `{ENTITY}` or `{ID}` with `{PROJECTION}`; found object with {:?}",
            object.keys().collect::<Vec<_>>()
        ));
    };

    r.attach(refs);
    Ok(Some(r))
}

pub fn ref_from_str<T>(json: &str, refs: &RefFactory) -> Result<Option<Ref<T>>>
where
    T: Record + DeserializeOwned,
{
    ref_from_value(serde_json::from_str(json)?, refs)
}

/// The JSON form of a key value.
fn key_to_json(key: &Value) -> Result<Json> {
    Ok(match key {
        Value::Null => Json::Null,
        Value::Bool(v) => Json::Bool(*v),
        Value::I16(v) => Json::from(*v),
        Value::I32(v) => Json::from(*v),
        Value::I64(v) => Json::from(*v),
        Value::F64(v) => serde_json::Number::from_f64(*v)
            .map(Json::Number)
            .ok_or_else(|| Error::type_conversion(key.clone(), "JSON number"))?,
        Value::String(v) => Json::String(v.clone()),
        Value::Uuid(v) => Json::String(v.to_string()),
        Value::Json(v) => v.clone(),
        Value::Record(record) => Json::Array(
            record
                .iter()
                .map(key_to_json)
                .collect::<Result<Vec<_>>>()?,
        ),
        Value::Bytes(_)
        | Value::Timestamp(_)
        | Value::DateTime(_)
        | Value::Date(_)
        | Value::List(_) => return Err(Error::type_conversion(key.clone(), "JSON key")),
    })
}

/// Reads a key, converting it to the model's key column types.
fn key_from_json<T: Record>(json: Json) -> Result<Value> {
    let model = T::model();
    let columns: Vec<_> = model.primary_key_columns().collect();

    match (&columns[..], json) {
        ([column], json) => scalar_from_json(json)?.coerce(column.ty),
        (columns, Json::Array(items)) if columns.len() == items.len() => columns
            .iter()
            .zip(items)
            .map(|(column, item)| scalar_from_json(item)?.coerce(column.ty))
            .collect::<Result<Vec<_>>>()
            .map(Value::record_from_vec),
        (columns, json) => Err(tempest_core::err!(
            "`{}` has a key of {} columns; found {json}",
            model.name(),
            columns.len()
        )),
    }
}

fn scalar_from_json(json: Json) -> Result<Value> {
    Ok(match json {
        Json::Null => Value::Null,
        Json::Bool(v) => Value::Bool(v),
        Json::String(v) => Value::String(v),
        Json::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(v), _) => Value::I64(v),
            (None, Some(v)) => Value::F64(v),
            (None, None) => return Err(tempest_core::err!("number {n} is out of range")),
        },
        json => return Err(Error::type_conversion(Value::Json(json), "key")),
    })
}

type Decoder<T> = Box<dyn Fn(Json) -> Result<T> + Send + Sync>;

/// Decodes a closed set of variants tagged with an `@type` member.
///
/// Decoders are registered once at startup:
///
/// ```
/// use serde::Deserialize;
/// use tempest::json::Registry;
///
/// #[derive(Deserialize)]
/// struct Cat { name: String }
///
/// #[derive(Deserialize)]
/// struct Dog { name: String }
///
/// enum Pet { Cat(Cat), Dog(Dog) }
///
/// let mut registry = Registry::new();
/// registry.register("cat", Pet::Cat).register("dog", Pet::Dog);
///
/// let pet = registry.decode_str(r#"{"@type": "dog", "name": "Rex"}"#).unwrap();
/// assert!(matches!(pet, Pet::Dog(dog) if dog.name == "Rex"));
/// ```
pub struct Registry<T> {
    decoders: HashMap<String, Decoder<T>>,
}

impl<T: 'static> Registry<T> {
    pub fn new() -> Registry<T> {
        Registry {
            decoders: HashMap::new(),
        }
    }

    /// Registers the variant tagged `tag`, decoded as `V` and wrapped by
    /// `wrap`. A later registration of the same tag replaces the earlier one.
    pub fn register<V, F>(&mut self, tag: impl Into<String>, wrap: F) -> &mut Self
    where
        V: DeserializeOwned,
        F: Fn(V) -> T + Send + Sync + 'static,
    {
        self.decoders.insert(
            tag.into(),
            Box::new(move |json| Ok(wrap(serde_json::from_value(json)?))),
        );
        self
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> + '_ {
        self.decoders.keys().map(String::as_str)
    }

    pub fn decode(&self, json: Json) -> Result<T> {
        let Json::Object(mut object) = json else {
            return Err(tempest_core::err!("expected an object tagged with `{TYPE}`"));
        };

        let tag = match object.remove(TYPE) {
            Some(Json::String(tag)) => tag,
            Some(other) => {
                return Err(tempest_core::err!(
                    "`{TYPE}` must be a string; found {other}"
                ))
            }
            None => return Err(tempest_core::err!("object has no `{TYPE}` member")),
        };

        let decoder = self
            .decoders
            .get(&tag)
            .ok_or_else(|| tempest_core::err!("unknown `{TYPE}` {tag:?}"))?;

        decoder(Json::Object(object))
    }

    pub fn decode_str(&self, json: &str) -> Result<T> {
        self.decode(serde_json::from_str(json)?)
    }
}

impl<T: 'static> Default for Registry<T> {
    fn default() -> Self {
        Registry::new()
    }
}

impl<T> fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("tags", &self.decoders.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Builds a tagged object: the variant's fields plus `@type`.
pub fn tagged<V: Serialize>(tag: &str, variant: &V) -> Result<Json> {
    let mut object = match serde_json::to_value(variant)? {
        Json::Object(object) => object,
        other => {
            let mut object = Map::new();
            object.insert("value".to_string(), other);
            object
        }
    };
    object.insert(TYPE.to_string(), Json::String(tag.to_string()));
    Ok(object.into())
}
