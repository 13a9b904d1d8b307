use crate::RefFactory;

use std::sync::Arc;
use tempest_core::{stmt::Value, Error, Model, Result};

/// A Rust type stored as rows of a [`Model`].
///
/// Implementations are hand-written or generated. The value of a record is a
/// [`Value::Record`] holding one value per declared field, in declaration
/// order:
///
/// * primitive fields hold their scalar,
/// * inline fields hold the inline record,
/// * eager foreign keys hold the target's record,
/// * lazy foreign keys hold the target's key (see [`Ref`](crate::Ref)).
///
/// ```ignore
/// impl Record for Vet {
///     fn model() -> Arc<Model> {
///         static MODEL: OnceLock<Arc<Model>> = OnceLock::new();
///         MODEL.get_or_init(|| /* Model::builder("vet")... */).clone()
///     }
///     // ...
/// }
/// ```
pub trait Record: Sized + Send + Sync + 'static {
    /// The model, built once and shared.
    fn model() -> Arc<Model>;

    fn to_value(&self) -> Value;

    /// Rebuilds the record. `refs` attaches a fetcher to lazy foreign keys.
    fn from_value(value: Value, refs: &RefFactory) -> Result<Self>;
}

/// A record with identity.
pub trait Entity: Record {
    /// The primary key. Composite keys convert to and from
    /// [`Value::Record`].
    type Id: Into<Value> + TryFrom<Value, Error = Error> + Clone + Send;

    fn id(&self) -> Self::Id;
}

/// A read model, possibly without a key.
pub trait Projection: Record {}
