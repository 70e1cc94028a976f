//! Single-flight coordination for an expensive, shared load.
//!
//! The embedding model is loaded at most once per process: the first
//! caller starts the load and publishes one shared in-flight future; every
//! concurrent caller awaits that same future instead of starting a
//! duplicate load. A failed load hands the same error to all subscribers,
//! moves the state to `Failed`, and clears the slot so a later call may
//! retry. A successful load is terminal: the completed future stays in the
//! slot as the handle, and `Ready` is never left.
//!
//! Cancellation of an in-flight load is not supported; dropping every
//! awaiter merely pauses the load until the next caller polls it again.

use std::sync::RwLock;

use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::debug;

use article_search_core::embedding::{EmbedError, ModelState};

type LoadFuture<T> = Shared<BoxFuture<'static, Result<T, EmbedError>>>;

/// A lazily loaded, shared value with an observable [`ModelState`].
pub struct SingleFlight<T: Clone> {
    state: RwLock<ModelState>,
    slot: tokio::sync::Mutex<Option<LoadFuture<T>>>,
}

impl<T: Clone + Send + Sync + 'static> SingleFlight<T> {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(ModelState::Unloaded),
            slot: tokio::sync::Mutex::new(None),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ModelState {
        *self.state.read().unwrap()
    }

    /// Await the loaded value, starting `load` only if no load is in
    /// flight and none has succeeded.
    ///
    /// `load` is invoked at most once per attempt; concurrent callers
    /// subscribe to the attempt already in flight.
    pub async fn get_or_load<F>(&self, load: F) -> Result<T, EmbedError>
    where
        F: FnOnce() -> BoxFuture<'static, Result<T, EmbedError>>,
    {
        let shared = {
            let mut slot = self.slot.lock().await;
            match slot.as_ref() {
                Some(in_flight) => in_flight.clone(),
                None => {
                    *self.state.write().unwrap() = ModelState::Loading;
                    debug!("starting shared load");
                    let in_flight = load().shared();
                    *slot = Some(in_flight.clone());
                    in_flight
                }
            }
        };

        let result = shared.await;
        match &result {
            Ok(_) => {
                *self.state.write().unwrap() = ModelState::Ready;
            }
            Err(_) => {
                // Clear the slot so a later call may retry, but only if it
                // still holds this completed failure — a concurrent retry
                // may already have installed a fresh attempt.
                let mut slot = self.slot.lock().await;
                if let Some(in_flight) = slot.as_ref() {
                    if matches!(in_flight.peek(), Some(Err(_))) {
                        *slot = None;
                        *self.state.write().unwrap() = ModelState::Failed;
                    }
                }
            }
        }
        result
    }
}

impl<T: Clone + Send + Sync + 'static> Default for SingleFlight<T> {
    fn default() -> Self {
        Self::new()
    }
}
