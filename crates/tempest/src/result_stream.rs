use crate::{db::ConnectionGuard, FromRow, RefFactory};

use std::{
    fmt,
    marker::PhantomData,
    pin::Pin,
    task::{Context, Poll},
};
use tempest_core::{stmt::ValueStream, Result};
use tokio_stream::{Stream, StreamExt};

/// Result rows read on demand.
///
/// The stream holds the database connection until it ends, yields an error,
/// or is closed or dropped; other operations on the same database fail with
/// [`Error::concurrent_use`](crate::Error::concurrent_use) meanwhile.
pub struct ResultStream<T> {
    connection: Option<ConnectionGuard>,
    values: ValueStream,
    refs: RefFactory,
    _p: PhantomData<fn() -> T>,
}

impl<T: FromRow> ResultStream<T> {
    pub(crate) fn new(connection: ConnectionGuard, values: ValueStream, refs: RefFactory) -> Self {
        Self {
            connection: Some(connection),
            values,
            refs,
            _p: PhantomData,
        }
    }

    pub async fn next(&mut self) -> Option<Result<T>> {
        StreamExt::next(self).await
    }

    pub async fn collect(mut self) -> Result<Vec<T>> {
        let mut ret = vec![];
        while let Some(res) = self.next().await {
            ret.push(res?);
        }
        Ok(ret)
    }

    /// Releases the connection, discarding unread rows.
    pub fn close(mut self) {
        self.release();
    }

    /// Whether another row follows, without converting it.
    pub(crate) async fn has_next(&mut self) -> Result<bool> {
        match self.values.next().await {
            Some(Ok(_)) => Ok(true),
            Some(Err(err)) => {
                self.release();
                Err(err)
            }
            None => {
                self.release();
                Ok(false)
            }
        }
    }

    fn release(&mut self) {
        self.connection = None;
    }
}

impl<T: FromRow> Stream for ResultStream<T> {
    type Item = Result<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Result<T>>> {
        if self.connection.is_none() {
            return Poll::Ready(None);
        }

        let this = &mut *self;
        match Pin::new(&mut this.values).poll_next(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Some(Ok(row))) => {
                let res = T::from_row(row, &this.refs);
                if res.is_err() {
                    this.release();
                }
                Poll::Ready(Some(res))
            }
            Poll::Ready(Some(Err(err))) => {
                this.release();
                Poll::Ready(Some(Err(err)))
            }
            Poll::Ready(None) => {
                this.release();
                Poll::Ready(None)
            }
        }
    }
}

impl<T> fmt::Debug for ResultStream<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultStream")
            .field("open", &self.connection.is_some())
            .field("values", &self.values)
            .finish()
    }
}
