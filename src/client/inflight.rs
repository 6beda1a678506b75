//! Registry of outstanding network operations, keyed by request identity.
//!
//! The map is only reachable through [`InFlightRegistry::get_or_create`] and the
//! [`SlotGuard`] handed to the creator. The lock is never held across an `.await`.

use crate::request::RequestIdentity;
use crate::Result;
use bytes::Bytes;
use futures::future::{BoxFuture, Shared};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Shared outcome of one network operation: the 200 response body or a classified error.
pub(crate) type SharedOutcome = Shared<BoxFuture<'static, Result<Bytes>>>;

struct Slot {
    generation: u64,
    outcome: SharedOutcome,
}

#[derive(Default)]
struct Inner {
    slots: Mutex<HashMap<RequestIdentity, Slot>>,
    next_generation: AtomicU64,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, HashMap<RequestIdentity, Slot>> {
        // A panic while holding the lock cannot leave the map half-updated (single
        // insert/remove), so a poisoned lock is safe to keep using.
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Whether the caller started the operation or attached to one already running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Attachment {
    Created,
    Joined,
}

#[derive(Clone, Default)]
pub(crate) struct InFlightRegistry {
    inner: Arc<Inner>,
}

impl InFlightRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Atomically join the outstanding operation for `identity`, or start one.
    ///
    /// `launch` runs under the registry lock and must not block: it receives the guard
    /// that clears the slot and returns the shared outcome to register.
    pub(crate) fn get_or_create(
        &self,
        identity: &RequestIdentity,
        launch: impl FnOnce(SlotGuard) -> SharedOutcome,
    ) -> (SharedOutcome, Attachment) {
        let mut slots = self.inner.lock();
        if let Some(slot) = slots.get(identity) {
            return (slot.outcome.clone(), Attachment::Joined);
        }

        let generation = self.inner.next_generation.fetch_add(1, Ordering::Relaxed);
        let guard = SlotGuard {
            inner: Arc::clone(&self.inner),
            identity: identity.clone(),
            generation,
        };
        let outcome = launch(guard);
        slots.insert(
            identity.clone(),
            Slot {
                generation,
                outcome: outcome.clone(),
            },
        );
        (outcome, Attachment::Created)
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.lock().len()
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, identity: &RequestIdentity) -> bool {
        self.inner.lock().contains_key(identity)
    }
}

/// Owned by the network task; removes its registry slot when dropped.
///
/// Dropping happens on every exit path of the task (completion, cancellation, panic),
/// so an entry can never outlive its operation.
pub(crate) struct SlotGuard {
    inner: Arc<Inner>,
    identity: RequestIdentity,
    generation: u64,
}

impl Drop for SlotGuard {
    fn drop(&mut self) {
        let mut slots = self.inner.lock();
        if slots
            .get(&self.identity)
            .is_some_and(|slot| slot.generation == self.generation)
        {
            slots.remove(&self.identity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::JsonCodec;
    use crate::config::Credentials;
    use crate::endpoint::Endpoint;
    use crate::request::compile;
    use futures::FutureExt;

    fn identity(path: &str) -> RequestIdentity {
        let ep: Endpoint<()> = Endpoint::get(path);
        let creds = Credentials::new("sk-test", None).unwrap();
        RequestIdentity::of::<()>(&compile(&ep, &creds, &JsonCodec::new()).unwrap())
    }

    fn ready(body: &'static str) -> SharedOutcome {
        futures::future::ready(Ok(Bytes::from_static(body.as_bytes())))
            .boxed()
            .shared()
    }

    #[test]
    fn second_caller_joins_existing_slot() {
        let registry = InFlightRegistry::new();
        let id = identity("/v1/models");
        let mut guards = Vec::new();

        let (_, first) = registry.get_or_create(&id, |g| {
            guards.push(g);
            ready("a")
        });
        let (_, second) = registry.get_or_create(&id, |_| unreachable!("must join"));

        assert_eq!(first, Attachment::Created);
        assert_eq!(second, Attachment::Joined);
        assert_eq!(registry.len(), 1);

        drop(guards);
        assert!(!registry.contains(&id));
    }

    #[test]
    fn stale_guard_does_not_remove_newer_slot() {
        let registry = InFlightRegistry::new();
        let id = identity("/v1/models");

        let mut old = None;
        registry.get_or_create(&id, |g| {
            old = Some(g);
            ready("a")
        });
        // Simulate the slot having been replaced by a newer generation.
        registry.inner.lock().remove(&id);
        let mut new = None;
        registry.get_or_create(&id, |g| {
            new = Some(g);
            ready("b")
        });

        drop(old);
        assert!(registry.contains(&id));
        drop(new);
        assert!(!registry.contains(&id));
    }

    #[test]
    fn distinct_identities_do_not_share() {
        let registry = InFlightRegistry::new();
        let mut guards = Vec::new();
        let (_, a) = registry.get_or_create(&identity("/v1/models"), |g| {
            guards.push(g);
            ready("a")
        });
        let (_, b) = registry.get_or_create(&identity("/v1/models/x"), |g| {
            guards.push(g);
            ready("b")
        });
        assert_eq!((a, b), (Attachment::Created, Attachment::Created));
        assert_eq!(registry.len(), 2);
    }
}
