use super::{capture::Captures, connect, Db, Shared};
use crate::Result;

use std::{
    sync::{atomic::AtomicBool, Arc},
    time::Duration,
};
use tempest_core::driver::Driver;
use tempest_sql::{Compiler, Dialect};
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug, Default)]
pub struct Builder {
    /// Quote every identifier, not only reserved words and names with special
    /// characters
    quote_identifiers: bool,

    query_timeout: Option<Duration>,
}

impl Builder {
    pub fn quote_identifiers(&mut self, quote: bool) -> &mut Self {
        self.quote_identifiers = quote;
        self
    }

    /// Default timeout for every statement; [`Query::timeout`](crate::Query::timeout)
    /// overrides it per query.
    pub fn query_timeout(&mut self, timeout: Duration) -> &mut Self {
        self.query_timeout = Some(timeout);
        self
    }

    /// Connects using a `sqlite:`, `postgresql://` or `mysql://` URL. Each
    /// backend requires its cargo feature.
    pub async fn connect(&mut self, url: &str) -> Result<Db> {
        let driver = connect::driver(url)?;
        self.build_with(driver.as_ref()).await
    }

    pub async fn build(&mut self, driver: impl Driver) -> Result<Db> {
        self.build_with(&driver).await
    }

    async fn build_with(&mut self, driver: &dyn Driver) -> Result<Db> {
        let dialect = Dialect::new(driver.flavor()).with_quote_all(self.quote_identifiers);
        let connection = driver.connect().await?;

        debug!(flavor = driver.flavor().name(), "connected");

        Ok(Db {
            shared: Arc::new(Shared {
                compiler: Compiler::new(dialect),
                connection: Arc::new(Mutex::new(connection)),
                query_timeout: self.query_timeout,
                captures: Captures::default(),
                rollback_pending: AtomicBool::new(false),
            }),
        })
    }
}
