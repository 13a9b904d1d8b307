mod builder;
pub use builder::Builder;

mod capture;
pub use capture::{CapturedSql, SqlCapture};

mod connect;

use crate::{Entities, Entity, FromRow, Query, Record, RefFactory, Select, Transaction};

use capture::Captures;
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};
use tempest_core::{
    driver::{operation, Connection, Operation, Response},
    Error, Result,
};
use tempest_sql::{Compiler, Dialect, Statement, Template};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

/// Exclusive access to the database connection.
pub(crate) type ConnectionGuard = OwnedMutexGuard<Box<dyn Connection>>;

/// A handle to one database connection.
///
/// Cloning is cheap; clones share the connection. The connection runs one
/// operation at a time: an operation started while another is executing, a
/// [`ResultStream`](crate::ResultStream) is open or a
/// [`PreparedQuery`](crate::PreparedQuery) is alive fails with
/// [`Error::concurrent_use`] instead of waiting.
#[derive(Clone)]
pub struct Db {
    shared: Arc<Shared>,
}

struct Shared {
    compiler: Compiler,

    connection: Arc<Mutex<Box<dyn Connection>>>,

    /// Default statement timeout
    query_timeout: Option<Duration>,

    captures: Captures,

    /// A transaction was dropped without commit or rollback
    rollback_pending: AtomicBool,
}

impl Db {
    pub fn builder() -> Builder {
        Builder::default()
    }

    pub fn dialect(&self) -> &Dialect {
        self.shared.compiler.dialect()
    }

    /// Compiles a template without executing it.
    pub fn compile(&self, template: &Template) -> Result<Statement> {
        self.shared.compiler.compile(template)
    }

    /// Compiles `template` into a query.
    pub fn query(&self, template: impl Into<Template>) -> Result<Query> {
        let statement = self.compile(&template.into())?;
        Ok(Query::new(self.clone(), statement))
    }

    pub fn entities<E: Entity>(&self) -> Entities<E> {
        Entities::new(self.clone())
    }

    pub fn select<T: Record + FromRow>(&self) -> Select<T> {
        Select::new(self.clone())
    }

    /// Factory for refs that fetch through this database.
    pub fn refs(&self) -> RefFactory {
        RefFactory::new(self.clone())
    }

    /// Records every statement sent to the driver while the capture is alive.
    pub fn capture(&self) -> SqlCapture {
        self.shared.captures.start()
    }

    pub async fn transaction(&self) -> Result<Transaction> {
        Transaction::begin(self.clone()).await
    }

    pub(crate) fn query_timeout(&self) -> Option<Duration> {
        self.shared.query_timeout
    }

    /// Takes the connection without waiting.
    pub(crate) fn lock(&self) -> Result<ConnectionGuard> {
        self.shared
            .connection
            .clone()
            .try_lock_owned()
            .map_err(|_| Error::concurrent_use())
    }

    /// Sends one operation to the driver on a locked connection.
    pub(crate) async fn exec(
        &self,
        connection: &mut ConnectionGuard,
        op: Operation,
        timeout: Option<Duration>,
    ) -> Result<Response> {
        if self.shared.rollback_pending.swap(false, Ordering::AcqRel) {
            debug!("rolling back abandoned transaction");
            connection.exec(operation::Transaction::Rollback.into()).await?;
        }

        self.shared.captures.record(&op);

        match timeout {
            Some(duration) => tokio::time::timeout(duration, connection.exec(op))
                .await
                .map_err(|_| Error::query_timeout(duration))?,
            None => connection.exec(op).await,
        }
    }

    pub(crate) fn schedule_rollback(&self) {
        self.shared.rollback_pending.store(true, Ordering::Release);
    }
}

impl std::fmt::Debug for Db {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Db")
            .field("dialect", self.dialect())
            .field("query_timeout", &self.shared.query_timeout)
            .finish()
    }
}
