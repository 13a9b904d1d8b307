use crate::{db::ConnectionGuard, Db, PreparedQuery, Record, RefFactory, ResultStream};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::{sync::Arc, time::Duration};
use tempest_core::{
    driver::operation::QuerySql,
    stmt::{Value, ValueRecord},
    Error, Result,
};
use tempest_sql::Statement;
use tracing::warn;

/// A compiled statement ready to run.
#[derive(Debug, Clone)]
pub struct Query {
    db: Db,
    statement: Arc<Statement>,
    timeout: Option<Duration>,
}

/// Types a result row converts into.
///
/// Records read the row through their model's select plan; scalars take the
/// first column; [`ValueRecord`] is the raw row.
pub trait FromRow: Sized + Send + 'static {
    fn from_row(row: ValueRecord, refs: &RefFactory) -> Result<Self>;
}

impl<T: Record> FromRow for T {
    fn from_row(row: ValueRecord, refs: &RefFactory) -> Result<Self> {
        let record = T::model().read(row)?;
        T::from_value(record.into(), refs)
    }
}

impl FromRow for ValueRecord {
    fn from_row(row: ValueRecord, _: &RefFactory) -> Result<Self> {
        Ok(row)
    }
}

macro_rules! impl_from_row_scalar {
    ( $( $ty:ty ),* $(,)? ) => {
        $(
            impl FromRow for $ty {
                fn from_row(row: ValueRecord, _: &RefFactory) -> Result<Self> {
                    <$ty>::try_from(first_column(row)?)
                }
            }
        )*
    };
}

impl_from_row_scalar!(
    bool,
    i16,
    i32,
    i64,
    f64,
    u32,
    u64,
    usize,
    String,
    Vec<u8>,
    uuid::Uuid,
    DateTime<Utc>,
    NaiveDateTime,
    NaiveDate,
    serde_json::Value,
    Option<bool>,
    Option<i16>,
    Option<i32>,
    Option<i64>,
    Option<f64>,
    Option<String>,
    Option<uuid::Uuid>,
    Option<DateTime<Utc>>,
    Option<NaiveDateTime>,
    Option<NaiveDate>,
);

fn first_column(row: ValueRecord) -> Result<Value> {
    row.into_vec()
        .into_iter()
        .next()
        .ok_or_else(|| tempest_core::err!("result row has no columns"))
}

impl Query {
    pub(crate) fn new(db: Db, statement: Statement) -> Query {
        let timeout = db.query_timeout();
        Query {
            db,
            statement: Arc::new(statement),
            timeout,
        }
    }

    pub fn statement(&self) -> &Statement {
        &self.statement
    }

    /// Fails the query with [`Error::query_timeout`] when the database takes
    /// longer than `timeout`.
    pub fn timeout(mut self, timeout: Duration) -> Query {
        self.timeout = Some(timeout);
        self
    }

    /// Streams the result rows.
    ///
    /// The stream holds the connection until it is exhausted, fails, or is
    /// closed or dropped.
    pub async fn result_stream<T: FromRow>(&self) -> Result<ResultStream<T>> {
        let params = self.statement.values()?;
        let mut connection = self.db.lock()?;

        let op = QuerySql {
            sql: self.statement.sql.clone(),
            params,
            returns_rows: true,
            generated_keys: vec![],
        };

        let values = self
            .db
            .exec(&mut connection, op.into(), self.timeout)
            .await?
            .rows
            .into_values()?;

        Ok(ResultStream::new(connection, values, self.db.refs()))
    }

    pub async fn result_list<T: FromRow>(&self) -> Result<Vec<T>> {
        self.result_stream().await?.collect().await
    }

    /// The only result row.
    ///
    /// Fails with [`Error::no_result`] when there is none and with
    /// [`Error::non_unique_result`] as soon as a second row arrives.
    pub async fn single_result<T: FromRow>(&self) -> Result<T> {
        match self.optional_result().await? {
            Some(value) => Ok(value),
            None => Err(Error::no_result(self.statement.sql.clone())),
        }
    }

    /// Like [`single_result`](Self::single_result), with `None` for an empty
    /// result.
    pub async fn optional_result<T: FromRow>(&self) -> Result<Option<T>> {
        let mut stream = self.result_stream::<T>().await?;

        let Some(first) = stream.next().await.transpose()? else {
            return Ok(None);
        };

        if stream.has_next().await? {
            return Err(Error::non_unique_result(self.statement.sql.clone()));
        }

        Ok(Some(first))
    }

    /// Runs a statement that does not return rows and reports the number of
    /// rows it changed.
    ///
    /// A version-checking statement that changes nothing fails with
    /// [`Error::optimistic_lock`]: the row was modified or removed since it
    /// was read.
    pub async fn execute_update(&self) -> Result<u64> {
        let mut connection = self.db.lock()?;
        let (count, _) = self.execute(&mut connection).await?;

        if count == 0 && self.statement.version_aware {
            warn!(sql = %self.statement.sql, "optimistic lock failure");
            return Err(Error::optimistic_lock(self.statement.sql.clone()));
        }

        Ok(count)
    }

    /// Runs the statement once, returning the update count and generated
    /// keys.
    pub(crate) async fn execute(
        &self,
        connection: &mut ConnectionGuard,
    ) -> Result<(u64, Vec<Value>)> {
        let op = QuerySql {
            sql: self.statement.sql.clone(),
            params: self.statement.values()?,
            returns_rows: false,
            generated_keys: self.statement.generated_keys.clone(),
        };

        let response = self.db.exec(connection, op.into(), self.timeout).await?;
        let count = response.rows.into_count()?;
        Ok((count, response.generated_keys))
    }

    /// Holds the connection for repeated execution, typically as a batch.
    pub fn prepare(&self) -> Result<PreparedQuery> {
        let connection = self.db.lock()?;
        Ok(PreparedQuery::new(
            self.db.clone(),
            self.statement.clone(),
            connection,
            self.timeout,
        ))
    }
}
