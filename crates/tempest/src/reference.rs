use crate::{Db, Record};

use std::{
    fmt,
    hash::{Hash, Hasher},
};
use tempest_core::{stmt::Value, Error, Result};
use tokio::sync::OnceCell;

/// A reference to a record by primary key, fetched at most once.
///
/// Equality and hashing use the key only, never the fetch state. A ref made
/// with [`Ref::of`] is loaded for good: [`unload`](Self::unload) has no
/// effect and nothing is ever fetched.
pub struct Ref<T> {
    id: Value,
    record: OnceCell<Option<T>>,
    db: Option<Db>,

    /// Created from a record rather than a key
    pinned: bool,
}

/// Creates refs that fetch through a database.
///
/// Passed explicitly to [`Record::from_value`] and the JSON entry points in
/// [`json`](crate::json).
#[derive(Debug, Clone, Default)]
pub struct RefFactory {
    db: Option<Db>,
}

impl RefFactory {
    pub fn new(db: Db) -> RefFactory {
        RefFactory { db: Some(db) }
    }

    /// A factory whose refs can never be fetched.
    pub fn detached() -> RefFactory {
        RefFactory::default()
    }

    /// A ref to the record keyed by `id`, or `None` for a null key.
    pub fn create<T: Record>(&self, id: impl Into<Value>) -> Option<Ref<T>> {
        let id = id.into();
        if id.is_null() {
            return None;
        }

        Some(Ref {
            id,
            record: OnceCell::new(),
            db: self.db.clone(),
            pinned: false,
        })
    }
}

impl<T: Record> Ref<T> {
    /// A detached ref; [`attach`](Self::attach) it before fetching.
    pub fn new(id: impl Into<Value>) -> Ref<T> {
        Ref {
            id: id.into(),
            record: OnceCell::new(),
            db: None,
            pinned: false,
        }
    }

    /// A ref to a record already at hand.
    pub fn of(record: T) -> Result<Ref<T>> {
        let value = record.to_value().into_record()?;
        let id = T::model().key_value(&value)?;

        Ok(Ref {
            id,
            record: OnceCell::new_with(Some(Some(record))),
            db: None,
            pinned: true,
        })
    }

    pub fn id(&self) -> &Value {
        &self.id
    }

    pub fn is_loaded(&self) -> bool {
        self.record.initialized()
    }

    /// The record if it was fetched and exists.
    pub fn get(&self) -> Option<&T> {
        self.record.get().and_then(Option::as_ref)
    }

    /// Fetches the record on first use and returns the cached one after.
    ///
    /// Fails with [`Error::no_result`] when no record has the key.
    pub async fn fetch(&self) -> Result<&T> {
        self.fetch_or_none().await?.ok_or_else(|| {
            Error::no_result(format!("`{}` with key {:?}", T::model().name(), self.id))
        })
    }

    /// Like [`fetch`](Self::fetch), with `None` when no record has the key.
    pub async fn fetch_or_none(&self) -> Result<Option<&T>> {
        let record = self
            .record
            .get_or_try_init(|| async {
                let Some(db) = &self.db else {
                    return Err(Error::unsupported_feature(format!(
                        "ref to `{}` with key {:?} has no database attached",
                        T::model().name(),
                        self.id
                    )));
                };

                db.select::<T>()
                    .where_id(self.id.clone())
                    .optional_result()
                    .await
            })
            .await?;

        Ok(record.as_ref())
    }

    /// Forgets the fetched record so the next fetch reads it again.
    pub fn unload(&mut self) {
        if !self.pinned {
            self.record = OnceCell::new();
        }
    }

    /// Lets a detached ref fetch through the factory's database.
    pub fn attach(&mut self, refs: &RefFactory) {
        if !self.pinned {
            self.db = refs.db.clone();
        }
    }

    pub(crate) fn loaded(id: Value, record: T) -> Ref<T> {
        Ref {
            id,
            record: OnceCell::new_with(Some(Some(record))),
            db: None,
            pinned: false,
        }
    }
}

impl<T> PartialEq for Ref<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Ref<T> {}

impl<T> Hash for Ref<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T: Clone> Clone for Ref<T> {
    fn clone(&self) -> Self {
        Ref {
            id: self.id.clone(),
            record: self.record.clone(),
            db: self.db.clone(),
            pinned: self.pinned,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.record.get() {
            Some(Some(record)) => f.debug_tuple("Ref").field(record).finish(),
            Some(None) => write!(f, "Ref({:?}, <missing>)", self.id),
            None => write!(f, "Ref({:?}, <not loaded>)", self.id),
        }
    }
}
