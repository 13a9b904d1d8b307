use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard, Weak},
};
use tempest_core::{driver::Operation, stmt::Value};

/// A statement as the driver received it.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedSql {
    pub sql: String,

    /// Parameter values; one list per execution, several for a batch
    pub parameters: Vec<Vec<Value>>,

    pub batch: bool,
}

/// Records the statements sent to the driver while it is alive.
///
/// Statements are kept in execution order. Dropping the capture stops
/// recording.
#[derive(Debug)]
pub struct SqlCapture {
    statements: Arc<Mutex<VecDeque<CapturedSql>>>,
}

/// The live captures of one database.
#[derive(Debug, Default)]
pub(super) struct Captures {
    active: Mutex<Vec<Weak<Mutex<VecDeque<CapturedSql>>>>>,
}

impl SqlCapture {
    /// Removes and returns the oldest recorded statement.
    pub fn pop(&self) -> Option<CapturedSql> {
        self.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Recorded statements, oldest first.
    pub fn statements(&self) -> Vec<CapturedSql> {
        self.lock().iter().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<CapturedSql>> {
        lock(&self.statements)
    }
}

impl Captures {
    pub(super) fn start(&self) -> SqlCapture {
        let statements = Arc::new(Mutex::new(VecDeque::new()));
        lock(&self.active).push(Arc::downgrade(&statements));
        SqlCapture { statements }
    }

    pub(super) fn record(&self, op: &Operation) {
        let captured = match op {
            Operation::QuerySql(op) => CapturedSql {
                sql: op.sql.clone(),
                parameters: vec![op.params.clone()],
                batch: false,
            },
            Operation::Batch(op) => CapturedSql {
                sql: op.sql.clone(),
                parameters: op.params.clone(),
                batch: true,
            },
            Operation::Transaction(_) => return,
        };

        let mut active = lock(&self.active);
        active.retain(|capture| match capture.upgrade() {
            Some(statements) => {
                lock(&statements).push_back(captured.clone());
                true
            }
            None => false,
        });
    }
}

/// Locks, ignoring poisoning.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
