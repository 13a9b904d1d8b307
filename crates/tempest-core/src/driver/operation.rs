use crate::stmt::Value;

#[derive(Debug, Clone)]
pub enum Operation {
    /// Execute one statement with one set of parameters
    QuerySql(QuerySql),

    /// Execute one statement once per parameter set
    Batch(Batch),

    /// Transaction control
    Transaction(Transaction),
}

#[derive(Debug, Clone)]
pub struct QuerySql {
    /// The SQL text, with placeholders in the driver's dialect
    pub sql: String,

    /// Positional parameters
    pub params: Vec<Value>,

    /// The statement produces rows to stream back, rather than a count.
    pub returns_rows: bool,

    /// Key columns the database generates, to be reported in the response.
    pub generated_keys: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Batch {
    pub sql: String,

    /// One parameter list per batch entry, in input order
    pub params: Vec<Vec<Value>>,

    pub generated_keys: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transaction {
    Start,
    Commit,
    Rollback,
}

impl Operation {
    pub fn sql(&self) -> Option<&str> {
        match self {
            Operation::QuerySql(op) => Some(&op.sql),
            Operation::Batch(op) => Some(&op.sql),
            Operation::Transaction(_) => None,
        }
    }
}

impl From<QuerySql> for Operation {
    fn from(value: QuerySql) -> Self {
        Self::QuerySql(value)
    }
}

impl From<Batch> for Operation {
    fn from(value: Batch) -> Self {
        Self::Batch(value)
    }
}

impl From<Transaction> for Operation {
    fn from(value: Transaction) -> Self {
        Self::Transaction(value)
    }
}
