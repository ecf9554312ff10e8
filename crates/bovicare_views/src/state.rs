//! View lifetime.
//!
//! Every load runs under a [`ViewScope`]. Closing the scope (or dropping its
//! last handle) aborts loads still in flight and stops late results from
//! being applied.

use std::future::Future;

use tokio::sync::watch;

use crate::error::{ViewError, ViewResult};

#[derive(Debug)]
pub struct ViewScope {
    closed_tx: watch::Sender<bool>,
    closed_rx: watch::Receiver<bool>,
}

impl Default for ViewScope {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewScope {
    pub fn new() -> Self {
        let (closed_tx, closed_rx) = watch::channel(false);
        Self {
            closed_tx,
            closed_rx,
        }
    }

    /// Mark the view as gone. Idempotent.
    pub fn close(&self) {
        let _ = self.closed_tx.send(true);
    }

    pub fn is_live(&self) -> bool {
        !*self.closed_rx.borrow()
    }

    /// A handle that observes this scope from another task.
    pub fn token(&self) -> ScopeToken {
        ScopeToken {
            closed_rx: self.closed_rx.clone(),
        }
    }

    /// Run `fut` unless the scope closes first.
    pub async fn run<F, T>(&self, fut: F) -> ViewResult<T>
    where
        F: Future<Output = ViewResult<T>>,
    {
        self.token().run(fut).await
    }

    /// Apply `f` only while the scope is live.
    pub fn apply<T>(&self, f: impl FnOnce() -> T) -> ViewResult<T> {
        if self.is_live() {
            Ok(f())
        } else {
            Err(ViewError::Cancelled)
        }
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.close();
    }
}

/// Cloneable observer of a [`ViewScope`].
#[derive(Clone, Debug)]
pub struct ScopeToken {
    closed_rx: watch::Receiver<bool>,
}

impl ScopeToken {
    pub fn is_live(&self) -> bool {
        !*self.closed_rx.borrow()
    }

    /// Resolves once the scope is closed or dropped.
    pub async fn closed(&mut self) {
        // An error means the sender is gone, which also ends the scope.
        let _ = self.closed_rx.wait_for(|closed| *closed).await;
    }

    pub async fn run<F, T>(self, fut: F) -> ViewResult<T>
    where
        F: Future<Output = ViewResult<T>>,
    {
        if !self.is_live() {
            return Err(ViewError::Cancelled);
        }
        let mut watcher = self.clone();
        tokio::select! {
            res = fut => {
                if self.is_live() { res } else { Err(ViewError::Cancelled) }
            }
            _ = watcher.closed() => Err(ViewError::Cancelled),
        }
    }
}
