//! Cooperative cancellation
//!
//! A watch channel split into a handle (held by whoever may cancel) and a
//! token (held by the running computation). Cancellation is a one-way latch:
//! once signalled it stays signalled, and every clone of the token observes
//! it.

use tokio::sync::watch;

/// Create a linked handle/token pair.
#[must_use]
pub fn cancellation_pair() -> (CancellationHandle, CancellationToken) {
    let (tx, rx) = watch::channel(false);
    (CancellationHandle { tx }, CancellationToken { rx })
}

/// Sender side; cancels the computation holding the matching token.
#[derive(Debug)]
pub struct CancellationHandle {
    tx: watch::Sender<bool>,
}

impl CancellationHandle {
    /// Signal cancellation. Idempotent; dropped tokens are ignored.
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Receiver side; polled by the managed runtime.
#[derive(Clone, Debug)]
pub struct CancellationToken {
    rx: watch::Receiver<bool>,
}

impl CancellationToken {
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve when cancellation is signalled. If the handle is dropped
    /// without cancelling, this pends forever; the computation simply runs
    /// to completion.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        while !*rx.borrow_and_update() {
            if rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}
