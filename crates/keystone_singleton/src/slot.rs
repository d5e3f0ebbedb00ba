//! The per-(type, scope) singleton cell.
//!
//! A [`Slot`] records which instance is canonical for one (service type,
//! scope key) pair. Two locks with distinct jobs:
//!
//! - `cell` — guards the record itself. Every writer, whether the accessor's
//!   lazy-create path or the activation-hook reconciliation, goes through
//!   its write lock, so a lost update between the two is impossible.
//! - `init` — serialises creators, so N concurrent first-accesses issue one
//!   host creation. The hook path never takes it; a host that dispatches
//!   activation hooks from inside `create_instance` therefore cannot
//!   deadlock against the accessor holding `init`.
//!
//! No host call happens under either lock's critical section except the
//! creation call itself, which runs under `init` only.

use std::sync::{Mutex, MutexGuard, PoisonError, RwLock};

use keystone_host::InstanceRef;

/// Outcome of offering a candidate instance to a slot.
#[derive(Debug)]
pub enum ClaimOutcome {
    /// The slot was empty and now holds the candidate.
    Claimed,
    /// The slot already held this exact instance.
    AlreadyHeld,
    /// The slot holds a different instance; the candidate is a duplicate
    /// and the held instance remains canonical (first claim wins).
    DuplicateOf(InstanceRef),
}

/// The mutable cell recording the current singleton instance for one
/// (type, scope) pair.
#[derive(Debug, Default)]
pub struct Slot {
    cell: RwLock<Option<InstanceRef>>,
    init: Mutex<()>,
}

impl Slot {
    /// Create an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the current record without touching the creation lock.
    #[must_use]
    pub fn get(&self) -> Option<InstanceRef> {
        self.cell
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Take the creation lock, serialising lazy-create attempts.
    pub(crate) fn lock_creator(&self) -> MutexGuard<'_, ()> {
        self.init.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Offer a candidate as the canonical instance.
    ///
    /// The critical section is a compare-and-record; callers issue any
    /// follow-up host calls (destroying a duplicate) after this returns.
    pub fn claim(&self, candidate: &InstanceRef) -> ClaimOutcome {
        let mut cell = self.cell.write().unwrap_or_else(PoisonError::into_inner);
        match &*cell {
            None => {
                *cell = Some(candidate.clone());
                ClaimOutcome::Claimed
            }
            Some(held) if held == candidate => ClaimOutcome::AlreadyHeld,
            Some(held) => ClaimOutcome::DuplicateOf(held.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use keystone_host::{InstanceId, ScopeKey, Service, ServiceTypeId};

    use super::*;

    #[derive(Debug, Default)]
    struct Probe;

    impl Service for Probe {
        fn type_name() -> &'static str {
            "Probe"
        }
    }

    fn probe_ref(id: u64) -> InstanceRef {
        InstanceRef::new(
            InstanceId::from_raw(id),
            ServiceTypeId::of::<Probe>(),
            ScopeKey::Process,
            Arc::new(Probe),
        )
    }

    #[test]
    fn test_empty_slot_reads_none() {
        let slot = Slot::new();
        assert!(slot.get().is_none());
    }

    #[test]
    fn test_first_claim_fills_slot() {
        let slot = Slot::new();
        let first = probe_ref(1);

        assert!(matches!(slot.claim(&first), ClaimOutcome::Claimed));
        assert_eq!(slot.get(), Some(first));
    }

    #[test]
    fn test_reclaim_same_instance_is_noop() {
        let slot = Slot::new();
        let first = probe_ref(1);

        slot.claim(&first);
        assert!(matches!(slot.claim(&first), ClaimOutcome::AlreadyHeld));
    }

    #[test]
    fn test_second_instance_is_duplicate_of_first() {
        let slot = Slot::new();
        let first = probe_ref(1);
        let second = probe_ref(2);

        slot.claim(&first);
        match slot.claim(&second) {
            ClaimOutcome::DuplicateOf(canonical) => assert_eq!(canonical, first),
            other => panic!("expected duplicate, got {other:?}"),
        }
        // The duplicate never displaces the original.
        assert_eq!(slot.get(), Some(first));
    }
}
