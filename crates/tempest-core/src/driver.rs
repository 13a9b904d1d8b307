mod flavor;
pub use flavor::Flavor;

pub mod operation;
pub use operation::Operation;

mod response;
pub use response::{Response, Rows, SUCCESS_NO_INFO};

use crate::async_trait;

use std::fmt::Debug;

/// A database backend.
#[async_trait]
pub trait Driver: Debug + Send + Sync + 'static {
    /// SQL dialect spoken by the database.
    fn flavor(&self) -> Flavor;

    /// Opens a new connection.
    async fn connect(&self) -> crate::Result<Box<dyn Connection>>;
}

/// One open database connection.
///
/// A connection executes one operation at a time; callers serialize access.
#[async_trait]
pub trait Connection: Debug + Send + 'static {
    /// Execute a database operation
    async fn exec(&mut self, op: Operation) -> crate::Result<Response>;
}
