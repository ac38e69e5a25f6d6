//! Composable, single-resolution fallible computations.
//!
//! An [`Operation`] is a lazily driven future resolving to `Result<T, E>`. Stages are
//! chained with [`Operation::flat_map`]; a failed stage short-circuits every later
//! continuation. Callback-style collaborators are adapted with
//! [`Operation::from_async`], whose [`Completion`] handle can be resolved at most once.

use futures::future::{BoxFuture, FutureExt};
use std::{fmt, future::IntoFuture};
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::trace;

mod retry;
pub use retry::*;

/// Raised when a [`Completion`] handle is dropped without being resolved.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Operation completion handle was dropped without a result")]
pub struct AbandonedOperation;

/// One-shot handle handed to an [`Operation::from_async`] worker.
pub struct Completion<T, E> {
    sender: oneshot::Sender<Result<T, E>>,
}

impl<T, E> Completion<T, E> {
    /// Resolves the operation. Consumes the handle, so it can only happen once.
    pub fn complete(self, result: Result<T, E>) {
        if self.sender.send(result).is_err() {
            trace!("operation dropped before its completion was delivered");
        }
    }

    pub fn succeed(self, value: T) {
        self.complete(Ok(value))
    }

    pub fn fail(self, error: E) {
        self.complete(Err(error))
    }
}

impl<T, E> fmt::Debug for Completion<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion")
            .field("receiver_dropped", &self.sender.is_closed())
            .finish()
    }
}

/// A deferred computation producing either `T` or a typed error `E`.
///
/// Nothing runs until the operation is awaited. Each operation is consumed by the
/// stage that drives it, so it resolves exactly once.
#[must_use = "operations do nothing unless awaited"]
pub struct Operation<T, E> {
    future: BoxFuture<'static, Result<T, E>>,
}

impl<T, E> Operation<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// An operation that succeeds immediately with `value`.
    pub fn pure(value: T) -> Self {
        Self::from_result(Ok(value))
    }

    /// An operation that fails immediately with `error`.
    pub fn fail(error: E) -> Self {
        Self::from_result(Err(error))
    }

    pub fn from_result(result: Result<T, E>) -> Self {
        Self {
            future: futures::future::ready(result).boxed(),
        }
    }

    pub fn from_future<F>(future: F) -> Self
    where
        F: std::future::Future<Output = Result<T, E>> + Send + 'static,
    {
        Self {
            future: future.boxed(),
        }
    }

    /// Wraps a callback-style asynchronous call.
    ///
    /// The worker runs when the operation is first polled and receives a
    /// [`Completion`] it must resolve. If the worker drops the handle unresolved the
    /// operation fails with `E::from(AbandonedOperation)` instead of hanging.
    pub fn from_async<W>(worker: W) -> Self
    where
        W: FnOnce(Completion<T, E>) + Send + 'static,
        E: From<AbandonedOperation>,
    {
        Self::from_future(async move {
            let (sender, receiver) = oneshot::channel();
            worker(Completion { sender });
            receiver
                .await
                .unwrap_or_else(|_| Err(E::from(AbandonedOperation)))
        })
    }

    /// Chains a dependent stage.
    ///
    /// `f` runs only after this operation succeeds; a failure propagates unchanged and
    /// `f` is never invoked.
    pub fn flat_map<U, F>(self, f: F) -> Operation<U, E>
    where
        U: Send + 'static,
        F: FnOnce(T) -> Operation<U, E> + Send + 'static,
    {
        Operation::from_future(async move {
            let value = self.future.await?;
            f(value).await
        })
    }

    pub fn map<U, F>(self, f: F) -> Operation<U, E>
    where
        U: Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        Operation::from_future(async move { self.future.await.map(f) })
    }

    /// Transforms the error of a failed operation; successes pass through untouched.
    pub fn map_error<G, F>(self, f: F) -> Operation<T, G>
    where
        G: Send + 'static,
        F: FnOnce(E) -> G + Send + 'static,
    {
        Operation::from_future(async move { self.future.await.map_err(f) })
    }

    /// Drives the operation to its terminal outcome.
    pub async fn run(self) -> Result<T, E> {
        self.future.await
    }
}

impl<T, E> IntoFuture for Operation<T, E> {
    type Output = Result<T, E>;
    type IntoFuture = BoxFuture<'static, Result<T, E>>;

    fn into_future(self) -> Self::IntoFuture {
        self.future
    }
}

impl<T, E> fmt::Debug for Operation<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation").finish_non_exhaustive()
    }
}
