use crate::{db::ConnectionGuard, Db, Record};

use std::{fmt, sync::Arc, time::Duration};
use tempest_core::{
    driver::{
        operation::{Batch, QuerySql},
        SUCCESS_NO_INFO,
    },
    stmt::Value,
    Error, Result,
};
use tempest_sql::{Bindings, Statement};
use tracing::{debug, warn};

/// A statement holding the connection for repeated execution.
///
/// Batch entries are bound as they are added: a failed bind reports the
/// error and leaves the batch as it was. The connection is released by
/// [`close`](Self::close) or on drop.
pub struct PreparedQuery {
    db: Db,
    statement: Arc<Statement>,
    connection: ConnectionGuard,
    timeout: Option<Duration>,

    /// Bound parameter lists waiting for `execute_batch`
    batch: Vec<Vec<Value>>,

    /// Keys generated by the last execution
    generated_keys: Vec<Value>,
}

impl PreparedQuery {
    pub(crate) fn new(
        db: Db,
        statement: Arc<Statement>,
        connection: ConnectionGuard,
        timeout: Option<Duration>,
    ) -> PreparedQuery {
        PreparedQuery {
            db,
            statement,
            connection,
            timeout,
            batch: vec![],
            generated_keys: vec![],
        }
    }

    pub fn statement(&self) -> &Statement {
        &self.statement
    }

    /// Adds a batch entry whose deferred values are read from `record`.
    pub fn add_batch<T: Record>(&mut self, record: &T) -> Result<()> {
        let record = record.to_value().into_record()?;
        self.add_batch_bindings(Bindings::record(record))
    }

    pub fn add_batch_bindings(&mut self, bindings: Bindings) -> Result<()> {
        let values = self.statement.bind(&bindings)?;
        self.batch.push(values);
        Ok(())
    }

    pub fn batch_len(&self) -> usize {
        self.batch.len()
    }

    /// Runs the statement once with its compile-time parameters.
    pub async fn execute_update(&mut self) -> Result<u64> {
        let op = QuerySql {
            sql: self.statement.sql.clone(),
            params: self.statement.values()?,
            returns_rows: false,
            generated_keys: self.statement.generated_keys.clone(),
        };

        let response = self
            .db
            .exec(&mut self.connection, op.into(), self.timeout)
            .await?;
        self.generated_keys = response.generated_keys;
        response.rows.into_count()
    }

    /// Runs every batch entry and returns one update count per entry, in the
    /// order the entries were added. [`SUCCESS_NO_INFO`] marks an entry the
    /// driver did not count.
    ///
    /// The batch is emptied whether or not it succeeds. A failure reports
    /// the counts of the entries that completed through
    /// [`Error::batch_completed`].
    pub async fn execute_batch(&mut self) -> Result<Vec<i64>> {
        let params = std::mem::take(&mut self.batch);
        self.generated_keys.clear();

        if params.is_empty() {
            return Ok(vec![]);
        }

        let entries = params.len();
        let op = Batch {
            sql: self.statement.sql.clone(),
            params,
            generated_keys: self.statement.generated_keys.clone(),
        };

        let response = match self
            .db
            .exec(&mut self.connection, op.into(), self.timeout)
            .await
        {
            Ok(response) => response,
            Err(err) => {
                warn!(sql = %self.statement.sql, entries, %err, "batch failed");
                return Err(err);
            }
        };

        self.generated_keys = response.generated_keys;
        let counts = response.rows.into_batch()?;

        debug!(
            entries,
            no_info = counts.iter().filter(|&&count| count == SUCCESS_NO_INFO).count(),
            "batch executed"
        );

        Ok(counts)
    }

    /// Keys generated by the last execution, one per inserted row.
    pub fn generated_keys<K>(&self) -> Result<Vec<K>>
    where
        K: TryFrom<Value, Error = Error>,
    {
        self.generated_keys.iter().cloned().map(K::try_from).collect()
    }

    pub(crate) fn generated_values(&self) -> &[Value] {
        &self.generated_keys
    }

    /// Releases the connection. Pending batch entries are discarded.
    pub fn close(self) {}
}

impl fmt::Debug for PreparedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreparedQuery")
            .field("sql", &self.statement.sql)
            .field("batch", &self.batch.len())
            .finish()
    }
}
