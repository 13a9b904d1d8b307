use crate::{Db, FromRow, Query, Record, ResultStream};

use std::marker::PhantomData;
use tempest_core::{stmt::Value, Result};
use tempest_sql::{builder::SelectTemplate, Template};

/// A SELECT of one record type.
///
/// ```ignore
/// let owners = db
///     .select::<Owner>()
///     .filter(template!({el::column(&Owner::model(), "last_name")} " = " {"Davis"}))
///     .order_by(template!({el::column(&Owner::model(), "first_name")}))
///     .limit(10)
///     .result_list()
///     .await?;
/// ```
#[derive(Debug)]
pub struct Select<T> {
    db: Db,
    template: SelectTemplate,
    _p: PhantomData<fn() -> T>,
}

impl<T: Record + FromRow> Select<T> {
    pub(crate) fn new(db: Db) -> Select<T> {
        Select {
            db,
            template: SelectTemplate::new(&T::model()),
            _p: PhantomData,
        }
    }

    pub fn where_id(mut self, id: impl Into<Value>) -> Select<T> {
        self.template = self.template.where_id(id);
        self
    }

    pub fn where_ids<I>(mut self, ids: I) -> Select<T>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.template = self
            .template
            .where_ids(ids.into_iter().map(Into::into).collect());
        self
    }

    /// Adds a predicate; predicates are combined with `AND`.
    pub fn filter(mut self, filter: impl Into<Template>) -> Select<T> {
        self.template = self.template.filter(filter);
        self
    }

    pub fn order_by(mut self, order: impl Into<Template>) -> Select<T> {
        self.template = self.template.order_by(order);
        self
    }

    pub fn limit(mut self, limit: u64) -> Select<T> {
        self.template = self.template.limit(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Select<T> {
        self.template = self.template.offset(offset);
        self
    }

    pub fn to_template(&self) -> Template {
        self.template.to_template(self.db.dialect())
    }

    pub fn query(&self) -> Result<Query> {
        self.db.query(self.to_template())
    }

    pub async fn result_stream(&self) -> Result<ResultStream<T>> {
        self.query()?.result_stream().await
    }

    pub async fn result_list(&self) -> Result<Vec<T>> {
        self.query()?.result_list().await
    }

    pub async fn single_result(&self) -> Result<T> {
        self.query()?.single_result().await
    }

    pub async fn optional_result(&self) -> Result<Option<T>> {
        self.query()?.optional_result().await
    }
}
