use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio_util::sync::CancellationToken;

/// In-flight command requests the frontend can cancel by id.
///
/// Every token is a child of `shutdown`, so exiting the app cancels them all.
/// Entries live only as long as their [`RequestGuard`].
pub struct RequestRegistry {
    shutdown: CancellationToken,
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    next_generation: u64,
    tokens: HashMap<String, (u64, CancellationToken)>,
}

impl RequestRegistry {
    pub fn new(shutdown: CancellationToken) -> Self {
        Self {
            shutdown,
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn shutdown(&self) -> &CancellationToken {
        &self.shutdown
    }

    /// Starts a request. With an id, the request can be cancelled through
    /// [`cancel`](Self::cancel) until the returned guard is dropped.
    pub fn begin(&self, request_id: Option<String>) -> RequestGuard<'_> {
        let token = self.shutdown.child_token();
        let entry = request_id.map(|id| {
            let mut inner = self.lock();
            inner.next_generation += 1;
            let generation = inner.next_generation;
            if inner
                .tokens
                .insert(id.clone(), (generation, token.clone()))
                .is_some()
            {
                tracing::debug!("[Requests] Request id {} reused while in flight", id);
            }
            (id, generation)
        });

        RequestGuard {
            registry: self,
            token,
            entry,
        }
    }

    /// Cancels the request registered under `request_id`. Returns false when
    /// no such request is in flight.
    pub fn cancel(&self, request_id: &str) -> bool {
        match self.lock().tokens.remove(request_id) {
            Some((_, token)) => {
                tracing::info!("[Requests] Cancelling request {}", request_id);
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn in_flight(&self) -> usize {
        self.lock().tokens.len()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Cancellation scope of one command call. Unregisters its id on drop.
pub struct RequestGuard<'a> {
    registry: &'a RequestRegistry,
    token: CancellationToken,
    entry: Option<(String, u64)>,
}

impl RequestGuard<'_> {
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Drop for RequestGuard<'_> {
    fn drop(&mut self) {
        if let Some((id, generation)) = self.entry.take() {
            let mut inner = self.registry.lock();
            // A reused id may now belong to a newer request.
            if inner
                .tokens
                .get(&id)
                .is_some_and(|(current, _)| *current == generation)
            {
                inner.tokens.remove(&id);
            }
        }
    }
}
