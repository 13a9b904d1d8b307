use crate::{Db, Result};

use tempest_core::driver::operation;
use tracing::debug;

/// An open transaction.
///
/// Statements issued through the [`Db`] while the transaction is open run
/// inside it. Dropping the transaction without [`commit`](Self::commit) or
/// [`rollback`](Self::rollback) rolls it back before the next operation.
#[derive(Debug)]
#[must_use = "a transaction is rolled back unless committed"]
pub struct Transaction {
    db: Db,
    finished: bool,
}

impl Transaction {
    pub(crate) async fn begin(db: Db) -> Result<Transaction> {
        let mut connection = db.lock()?;
        db.exec(&mut connection, operation::Transaction::Start.into(), None)
            .await?;

        Ok(Transaction {
            db,
            finished: false,
        })
    }

    pub async fn commit(mut self) -> Result<()> {
        self.finish(operation::Transaction::Commit).await
    }

    pub async fn rollback(mut self) -> Result<()> {
        self.finish(operation::Transaction::Rollback).await
    }

    async fn finish(&mut self, op: operation::Transaction) -> Result<()> {
        let mut connection = self.db.lock()?;
        self.finished = true;
        self.db.exec(&mut connection, op.into(), None).await?;
        Ok(())
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        if !self.finished {
            debug!("transaction dropped; rollback scheduled");
            self.db.schedule_rollback();
        }
    }
}
