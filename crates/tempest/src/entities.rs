use crate::{Db, Entity, Query};

use std::{marker::PhantomData, sync::Arc};
use tempest_core::{
    driver::SUCCESS_NO_INFO,
    stmt::{Value, ValueRecord},
    Error, Model, Result,
};
use tempest_sql::{builder, template::RecordSource};
use tracing::{debug, warn};

/// Insert, update, delete and upsert for one entity type.
#[derive(Debug)]
pub struct Entities<E> {
    db: Db,
    model: Arc<Model>,
    _p: PhantomData<fn() -> E>,
}

/// Where an upsert sends an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Classification {
    /// The database generated the key already: update the row
    Update,

    /// No generated key yet, or a caller-assigned key: insert, resolving
    /// conflicts in the statement
    Insert,
}

impl<E: Entity> Entities<E> {
    pub(crate) fn new(db: Db) -> Entities<E> {
        Entities {
            db,
            model: E::model(),
            _p: PhantomData,
        }
    }

    pub async fn find_by_id(&self, id: E::Id) -> Result<Option<E>> {
        self.db.select::<E>().where_id(id).optional_result().await
    }

    /// Finds every entity with one of the keys, in no particular order.
    pub async fn find_by_ids<I>(&self, ids: I) -> Result<Vec<E>>
    where
        I: IntoIterator<Item = E::Id>,
    {
        self.db.select::<E>().where_ids(ids).result_list().await
    }

    pub async fn count(&self) -> Result<u64> {
        self.db
            .query(builder::count(&self.model))?
            .single_result::<u64>()
            .await
    }

    pub async fn insert(&self, entity: &E) -> Result<()> {
        self.insert_and_fetch_id(entity).await.map(|_| ())
    }

    /// Inserts the entity and returns its key, generated by the database
    /// when the model says so.
    pub async fn insert_and_fetch_id(&self, entity: &E) -> Result<E::Id> {
        let record = self.record(entity)?;
        self.check_no_generated_key(&record)?;

        let query = self.db.query(builder::insert(&self.model, vec![record]))?;
        let mut connection = self.db.lock()?;
        let (_, keys) = query.execute(&mut connection).await?;

        self.fetched_id(entity, keys)
    }

    /// Updates the row with the entity's key.
    ///
    /// With a version column the update also requires the version to be
    /// unchanged and fails with [`Error::optimistic_lock`] otherwise. An
    /// update that matches no row fails with [`Error::no_result`].
    pub async fn update(&self, entity: &E) -> Result<()> {
        let record = self.record(entity)?;
        let query = self.db.query(builder::update(&self.model, record))?;
        self.expect_one_row(&query, "update").await
    }

    pub async fn delete(&self, entity: &E) -> Result<()> {
        let record = self.record(entity)?;
        let query = self.db.query(builder::delete_record(&self.model, record))?;
        self.expect_one_row(&query, "delete").await
    }

    /// Deletes by key; returns whether a row was deleted.
    pub async fn delete_by_id(&self, id: E::Id) -> Result<bool> {
        let query = self.db.query(builder::delete(&self.model, id))?;
        Ok(query.execute_update().await? > 0)
    }

    /// Inserts the entity or updates its row.
    ///
    /// An entity whose database-generated key is already set is updated.
    /// Otherwise the entity is inserted with the dialect's conflict
    /// resolution, so a caller-assigned key that already exists updates the
    /// row instead.
    pub async fn upsert(&self, entity: &E) -> Result<()> {
        self.upsert_and_fetch_id(entity).await.map(|_| ())
    }

    pub async fn upsert_and_fetch_id(&self, entity: &E) -> Result<E::Id> {
        let record = self.record(entity)?;

        if self.classify(&record)? == Classification::Update {
            self.update(entity).await?;
            return Ok(entity.id());
        }

        let template = builder::upsert(
            self.db.dialect(),
            &self.model,
            RecordSource::Records(vec![record]),
        )?;

        let query = self.db.query(template)?;
        let mut connection = self.db.lock()?;
        let (_, keys) = query.execute(&mut connection).await?;

        self.fetched_id(entity, keys)
    }

    /// Upserts and reads the stored row back.
    pub async fn upsert_and_fetch(&self, entity: &E) -> Result<E> {
        let id = self.upsert_and_fetch_id(entity).await?;
        self.find_by_id(id).await?.ok_or_else(|| {
            Error::no_result(format!("`{}` after upsert", self.model.name()))
        })
    }

    /// Upserts every entity, using one batched statement for the updates and
    /// one for the inserts.
    pub async fn upsert_batch(&self, entities: &[E]) -> Result<()> {
        self.upsert_batch_and_fetch_ids(entities).await.map(|_| ())
    }

    /// Like [`upsert_batch`](Self::upsert_batch), returning the key of each
    /// entity in input order.
    pub async fn upsert_batch_and_fetch_ids(&self, entities: &[E]) -> Result<Vec<E::Id>> {
        let mut updates = vec![];
        let mut inserts = vec![];

        for (index, entity) in entities.iter().enumerate() {
            let record = self.record(entity)?;
            match self.classify(&record)? {
                Classification::Update => updates.push((index, record)),
                Classification::Insert => inserts.push((index, record)),
            }
        }

        debug!(
            table = self.model.name(),
            updates = updates.len(),
            inserts = inserts.len(),
            "batch upsert"
        );

        let mut ids: Vec<Option<E::Id>> = vec![None; entities.len()];

        if !updates.is_empty() {
            let query = self.db.query(builder::update_deferred(&self.model))?;
            self.run_batch(&query, &updates).await?;

            for (index, _) in &updates {
                ids[*index] = Some(entities[*index].id());
            }
        }

        if !inserts.is_empty() {
            let template = builder::upsert(self.db.dialect(), &self.model, RecordSource::Deferred)?;
            let query = self.db.query(template)?;
            let keys = self.run_batch(&query, &inserts).await?;

            if self.model.auto_generated_pk() {
                if keys.len() != inserts.len() {
                    return Err(Error::batch_failed(
                        vec![],
                        tempest_core::err!(
                            "Batch upsert failed: {} entities inserted, {} keys generated",
                            inserts.len(),
                            keys.len()
                        ),
                    ));
                }

                for ((index, _), key) in inserts.iter().zip(keys) {
                    ids[*index] = Some(<E::Id>::try_from(key)?);
                }
            } else {
                for (index, _) in &inserts {
                    ids[*index] = Some(entities[*index].id());
                }
            }
        }

        ids.into_iter()
            .map(|id| id.ok_or_else(|| tempest_core::err!("batch upsert lost an entity key")))
            .collect()
    }

    /// Executes one batch entry per record and checks every update count.
    async fn run_batch(
        &self,
        query: &Query,
        entries: &[(usize, ValueRecord)],
    ) -> Result<Vec<Value>> {
        let mut prepared = query.prepare()?;
        for (_, record) in entries {
            prepared.add_batch_bindings(tempest_sql::Bindings::record(record.clone()))?;
        }

        let counts = prepared.execute_batch().await?;
        let version_aware = query.statement().version_aware;

        for (i, &count) in counts.iter().enumerate() {
            match count {
                0 if version_aware => {
                    warn!(table = self.model.name(), entry = i, "optimistic lock failure in batch");
                    return Err(Error::optimistic_lock(format!(
                        "batch entry {i} of `{}`",
                        self.model.name()
                    )));
                }
                0 | 1 | 2 | SUCCESS_NO_INFO => {}
                count => {
                    warn!(
                        table = self.model.name(),
                        entry = i,
                        count,
                        "unexpected batch update count"
                    );
                    return Err(Error::batch_failed(
                        counts[..i].to_vec(),
                        tempest_core::err!("Batch upsert failed: entry {i} reported {count} rows"),
                    ));
                }
            }
        }

        Ok(prepared.generated_values().to_vec())
    }

    async fn expect_one_row(&self, query: &Query, action: &str) -> Result<()> {
        match query.execute_update().await? {
            0 => Err(Error::no_result(format!(
                "{action} of `{}` matched no row",
                self.model.name()
            ))),
            _ => Ok(()),
        }
    }

    fn record(&self, entity: &E) -> Result<ValueRecord> {
        entity.to_value().into_record()
    }

    /// Only a database-generated key tells an existing entity apart; any
    /// other entity goes through the insert path.
    fn classify(&self, record: &ValueRecord) -> Result<Classification> {
        if self.model.auto_generated_pk() && !self.model.key_value(record)?.is_default() {
            Ok(Classification::Update)
        } else {
            Ok(Classification::Insert)
        }
    }

    fn check_no_generated_key(&self, record: &ValueRecord) -> Result<()> {
        let key = self.model.key_value(record)?;
        if self.model.auto_generated_pk() && !key.is_default() {
            return Err(Error::sql_template(format!(
                "cannot insert `{}` with key {key:?}: the database generates it",
                self.model.name()
            )));
        }
        Ok(())
    }

    /// The entity's key after an insert: the single generated key when the
    /// database generates keys, the entity's own key otherwise.
    fn fetched_id(&self, entity: &E, keys: Vec<Value>) -> Result<E::Id> {
        if !self.model.auto_generated_pk() {
            return Ok(entity.id());
        }

        let mut keys = keys.into_iter();
        match (keys.next(), keys.next()) {
            (Some(key), None) => <E::Id>::try_from(key),
            (None, _) => Err(Error::no_result(format!(
                "generated key of `{}`",
                self.model.name()
            ))),
            (Some(_), Some(_)) => Err(Error::non_unique_result(format!(
                "generated key of `{}`",
                self.model.name()
            ))),
        }
    }
}
