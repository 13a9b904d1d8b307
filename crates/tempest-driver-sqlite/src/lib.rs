mod value;
pub(crate) use value::Value;

use rusqlite::{CachedStatement, Connection as RusqliteConnection, InterruptHandle};
use std::{
    fmt,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tempest_core::{
    async_trait,
    driver::{
        operation::{Batch, Operation, QuerySql, Transaction},
        Driver, Flavor, Response,
    },
    stmt::{self, ValueRecord},
    Error, Result,
};
use tracing::debug;
use url::Url;

#[derive(Debug)]
pub enum Sqlite {
    File(PathBuf),
    InMemory,
}

impl Sqlite {
    /// Create a new SQLite driver from a `sqlite:` connection URL
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url_str = url.into();
        let url = Url::parse(&url_str).map_err(|err| {
            Error::invalid_connection_url(format!("{err}; url={url_str}"))
        })?;

        if url.scheme() != "sqlite" {
            return Err(Error::invalid_connection_url(format!(
                "connection URL does not have a `sqlite` scheme; url={url_str}"
            )));
        }

        if url.path() == ":memory:" {
            Ok(Self::InMemory)
        } else {
            Ok(Self::File(PathBuf::from(url.path())))
        }
    }

    /// Create an in-memory SQLite database
    pub fn in_memory() -> Self {
        Self::InMemory
    }

    /// Open a SQLite database at the specified file path
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self::File(path.as_ref().to_path_buf())
    }
}

#[async_trait]
impl Driver for Sqlite {
    fn flavor(&self) -> Flavor {
        Flavor::Sqlite
    }

    async fn connect(&self) -> Result<Box<dyn tempest_core::Connection>> {
        let connection = match self {
            Sqlite::File(path) => Connection::open(path)?,
            Sqlite::InMemory => Connection::in_memory()?,
        };
        Ok(Box::new(connection))
    }
}

/// A SQLite connection.
///
/// Operations run on tokio's blocking pool. Dropping an unfinished `exec`
/// future, as a query timeout does, interrupts the running statement.
pub struct Connection {
    connection: Arc<Mutex<RusqliteConnection>>,
    interrupt: Arc<InterruptHandle>,
}

impl Connection {
    pub fn in_memory() -> Result<Self> {
        let connection =
            RusqliteConnection::open_in_memory().map_err(Error::driver_operation_failed)?;
        Ok(Self::new(connection))
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection =
            RusqliteConnection::open(path).map_err(Error::driver_operation_failed)?;
        Ok(Self::new(connection))
    }

    fn new(connection: RusqliteConnection) -> Self {
        let interrupt = Arc::new(connection.get_interrupt_handle());
        Self {
            connection: Arc::new(Mutex::new(connection)),
            interrupt,
        }
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection").finish_non_exhaustive()
    }
}

/// Interrupts the connection unless disarmed before being dropped.
struct InterruptOnDrop {
    handle: Option<Arc<InterruptHandle>>,
}

impl InterruptOnDrop {
    fn disarm(mut self) {
        self.handle = None;
    }
}

impl Drop for InterruptOnDrop {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            debug!("sqlite operation abandoned; interrupting");
            handle.interrupt();
        }
    }
}

fn run(connection: &RusqliteConnection, op: Operation) -> Result<Response> {
    match op {
        Operation::QuerySql(op) => query(connection, op),
        Operation::Batch(op) => batch(connection, op),
        Operation::Transaction(op) => transaction(connection, op),
    }
}

fn transaction(connection: &RusqliteConnection, op: Transaction) -> Result<Response> {
    let sql = match op {
        Transaction::Start => "BEGIN",
        Transaction::Commit => "COMMIT",
        Transaction::Rollback => "ROLLBACK",
    };

    connection
        .execute(sql, [])
        .map_err(Error::driver_operation_failed)?;
    Ok(Response::count(0))
}

fn query(connection: &RusqliteConnection, op: QuerySql) -> Result<Response> {
    let sql = with_returning(&op.sql, &op.generated_keys);
    let mut stmt = connection
        .prepare_cached(&sql)
        .map_err(Error::driver_operation_failed)?;

    let params = op.params.into_iter().map(Value::from).collect::<Vec<_>>();

    if op.returns_rows {
        let rows = query_rows(&mut stmt, &params).map_err(Error::driver_operation_failed)?;
        return Ok(Response::value_stream(rows));
    }

    let (count, keys) = execute(&mut stmt, &params, !op.generated_keys.is_empty())
        .map_err(Error::driver_operation_failed)?;

    Ok(Response::count(count as u64).with_generated_keys(keys))
}

fn batch(connection: &RusqliteConnection, op: Batch) -> Result<Response> {
    let sql = with_returning(&op.sql, &op.generated_keys);
    let mut stmt = connection
        .prepare_cached(&sql)
        .map_err(Error::driver_operation_failed)?;

    let returning = !op.generated_keys.is_empty();
    let mut counts = vec![];
    let mut generated = vec![];

    for params in op.params {
        let params = params.into_iter().map(Value::from).collect::<Vec<_>>();

        match execute(&mut stmt, &params, returning) {
            Ok((count, keys)) => {
                counts.push(count as i64);
                generated.extend(keys);
            }
            Err(err) => {
                return Err(Error::batch_failed(
                    counts,
                    Error::driver_operation_failed(err),
                ));
            }
        }
    }

    Ok(Response::batch(counts).with_generated_keys(generated))
}

#[async_trait]
impl tempest_core::driver::Connection for Connection {
    async fn exec(&mut self, op: Operation) -> Result<Response> {
        if let Some(sql) = op.sql() {
            debug!(sql, "sqlite exec");
        }

        let connection = self.connection.clone();
        let guard = InterruptOnDrop {
            handle: Some(self.interrupt.clone()),
        };

        let res = tokio::task::spawn_blocking(move || {
            let connection = connection
                .lock()
                .map_err(|_| tempest_core::err!("sqlite connection poisoned by a panic"))?;
            run(&connection, op)
        })
        .await;

        guard.disarm();
        res.map_err(Error::driver_operation_failed)?
    }
}

/// Appends a `RETURNING` clause reporting the generated key columns.
fn with_returning(sql: &str, generated_keys: &[String]) -> String {
    if generated_keys.is_empty() {
        return sql.to_string();
    }

    let columns = generated_keys
        .iter()
        .map(|name| format!("\"{}\"", name.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(", ");

    format!("{sql} RETURNING {columns}")
}

fn query_rows(
    stmt: &mut CachedStatement<'_>,
    params: &[Value],
) -> rusqlite::Result<Vec<ValueRecord>> {
    let width = stmt.column_count();
    let mut rows = stmt.query(rusqlite::params_from_iter(params.iter()))?;

    let mut ret = vec![];
    while let Some(row) = rows.next()? {
        let items = (0..width)
            .map(|index| Value::from_sql(row, index).map(Value::into_inner))
            .collect::<rusqlite::Result<Vec<_>>>()?;
        ret.push(ValueRecord::from_vec(items));
    }

    Ok(ret)
}

/// Runs a statement that does not produce result rows. With `returning`, the
/// statement reports generated keys, one row per affected row.
fn execute(
    stmt: &mut CachedStatement<'_>,
    params: &[Value],
    returning: bool,
) -> rusqlite::Result<(usize, Vec<stmt::Value>)> {
    if !returning {
        let count = stmt.execute(rusqlite::params_from_iter(params.iter()))?;
        return Ok((count, vec![]));
    }

    let keys = query_rows(stmt, params)?
        .into_iter()
        .map(|mut row| match row.len() {
            1 => row.fields.swap_remove(0),
            _ => stmt::Value::Record(row),
        })
        .collect::<Vec<_>>();

    Ok((keys.len(), keys))
}
