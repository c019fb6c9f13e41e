//! Finalization scope
//!
//! Collects cleanup actions registered while a computation runs and drains
//! them when it ends, in reverse registration order. The runtime finalizes
//! the scope on every exit path: success, classified failure, defect and
//! cancellation alike.

use std::sync::{Arc, Mutex};

use futures::future::BoxFuture;

type Finalizer = Box<dyn FnOnce() -> BoxFuture<'static, ()> + Send>;

/// Handle to the current computation's finalizer stack.
#[derive(Clone, Default)]
pub struct Scope {
    finalizers: Arc<Mutex<Vec<Finalizer>>>,
}

impl Scope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a cleanup action. Actions run last-in first-out.
    pub fn defer<F, Fut>(&self, finalizer: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let mut finalizers = match self.finalizers.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        finalizers.push(Box::new(move || Box::pin(finalizer())));
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        match self.finalizers.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    /// Drain and run every registered finalizer, newest first. Finalizers
    /// registered while draining run in the same pass.
    pub async fn finalize(&self) {
        loop {
            // take one at a time so the lock is never held across an await
            let next = {
                let mut finalizers = match self.finalizers.lock() {
                    Ok(guard) => guard,
                    Err(poisoned) => poisoned.into_inner(),
                };
                finalizers.pop()
            };
            match next {
                Some(finalizer) => finalizer().await,
                None => break,
            }
        }
    }
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn finalizers_run_in_reverse_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let scope = Scope::new();

        for label in ["open-db", "open-file", "start-span"] {
            let order = Arc::clone(&order);
            scope.defer(move || async move {
                order.lock().unwrap().push(label);
            });
        }
        assert_eq!(scope.pending(), 3);

        scope.finalize().await;

        assert_eq!(scope.pending(), 0);
        assert_eq!(
            *order.lock().unwrap(),
            vec!["start-span", "open-file", "open-db"]
        );
    }

    #[tokio::test]
    async fn finalize_is_idempotent() {
        let count = Arc::new(AtomicUsize::new(0));
        let scope = Scope::new();
        let counted = Arc::clone(&count);
        scope.defer(move || async move {
            counted.fetch_add(1, Ordering::SeqCst);
        });

        scope.finalize().await;
        scope.finalize().await;

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
