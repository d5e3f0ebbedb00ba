//! The singleton registry — slot lookup and double-checked acquisition.
//!
//! The registry maps `(ServiceTypeId, ScopeKey)` to independent [`Slot`]s.
//! Slots for different pairs share nothing, so unrelated singleton types
//! never serialise on each other.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, info, warn};

use keystone_host::{HookBus, HostRuntime, InstanceRef, ScopeKey, Service, ServiceTypeId};
use keystone_session::SessionRuntime;

use crate::error::SingletonError;
use crate::slot::{ClaimOutcome, Slot};

/// Registry of singleton slots, keyed by (service type, scope).
#[derive(Debug, Default)]
pub struct SingletonRegistry {
    slots: DashMap<(ServiceTypeId, ScopeKey), Arc<Slot>>,
}

impl SingletonRegistry {
    /// Create an empty registry.
    ///
    /// Registries are plain constructed objects — build one per test, or one
    /// per process, and pass it where it is needed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up (or lazily create) the slot for a (type, scope) pair.
    fn slot(&self, type_id: ServiceTypeId, scope: &ScopeKey) -> Arc<Slot> {
        self.slots
            .entry((type_id, *scope))
            .or_insert_with(|| Arc::new(Slot::new()))
            .clone()
    }

    /// Acquire the singleton of type `T` within `scope`.
    ///
    /// Repeated calls with the same scope key return the same instance;
    /// concurrent first calls issue exactly one host creation between them.
    ///
    /// # Errors
    ///
    /// Returns [`SingletonError::CreationFailed`] if the host declines to
    /// instantiate. The accessor never retries on its own.
    pub fn acquire<T: Service>(
        &self,
        host: &dyn HostRuntime,
        scope: &ScopeKey,
    ) -> Result<InstanceRef, SingletonError> {
        self.acquire_by_id(host, T::service_type_id(), scope)
    }

    /// Type-erased acquisition; see [`SingletonRegistry::acquire`].
    ///
    /// # Errors
    ///
    /// Returns [`SingletonError::CreationFailed`] if the host declines to
    /// instantiate.
    pub fn acquire_by_id(
        &self,
        host: &dyn HostRuntime,
        type_id: ServiceTypeId,
        scope: &ScopeKey,
    ) -> Result<InstanceRef, SingletonError> {
        let slot = self.slot(type_id, scope);

        // Fast path: an initialised slot costs one read lock, no creation
        // lock contention.
        if let Some(existing) = slot.get() {
            return Ok(existing);
        }

        // One creator at a time per slot. Activation-hook claims do not take
        // this lock, so a host firing hooks from inside create_instance
        // cannot deadlock us.
        let _creator = slot.lock_creator();

        // Another creator or a hook claim may have won between the unlocked
        // read and taking the creation lock.
        if let Some(existing) = slot.get() {
            return Ok(existing);
        }

        // Prefer adopting an instance the host already placed (e.g. initial
        // content) over creating a fresh one.
        let (candidate, created) = match host.find_existing(type_id, scope) {
            Some(found) => (found, false),
            None => {
                let built = host
                    .create_instance(type_id, scope)
                    .map_err(|source| SingletonError::CreationFailed { type_id, source })?;
                (built, true)
            }
        };

        match slot.claim(&candidate) {
            ClaimOutcome::Claimed => {
                debug!(%type_id, scope = %scope, instance = %candidate.id(), adopted = !created, "singleton initialised");
                Ok(candidate)
            }
            // Typically our own creation's activation hook already claimed it.
            ClaimOutcome::AlreadyHeld => Ok(candidate),
            ClaimOutcome::DuplicateOf(canonical) => {
                // An activation hook claimed a different instance while our
                // creation was in flight. First claim wins; our creation is
                // the duplicate.
                if created {
                    debug!(duplicate = %candidate.id(), canonical = %canonical.id(), "destroying instance from lost creation race");
                    host.destroy_instance(&candidate);
                }
                Ok(canonical)
            }
        }
    }

    /// Reconcile an activated instance against its slot.
    ///
    /// Invoked from the host's `on_create` hook for *every* activation,
    /// including instances the host created directly. An empty slot is
    /// claimed; an occupied slot means the newcomer is a duplicate and gets
    /// a destroy request, restoring the at-most-one invariant. The original
    /// claimant always survives.
    pub fn reconcile(&self, host: &dyn HostRuntime, instance: &InstanceRef) {
        let slot = self.slot(instance.type_id(), instance.scope());
        match slot.claim(instance) {
            ClaimOutcome::Claimed => {
                debug!(type_id = %instance.type_id(), scope = %instance.scope(), instance = %instance.id(), "singleton claimed by activation hook");
            }
            ClaimOutcome::AlreadyHeld => {}
            ClaimOutcome::DuplicateOf(canonical) => {
                warn!(duplicate = %instance.id(), canonical = %canonical.id(), "duplicate singleton activated; destroying newcomer");
                host.destroy_instance(instance);
            }
        }
    }

    /// Forget every slot belonging to an ended scope.
    ///
    /// Ending a session clears its session slot and all its scene slots.
    /// Only the slots are cleared — the fate of the instances themselves
    /// belongs to whoever tears the scope down. Returns the number of slots
    /// removed.
    pub fn clear_scope(&self, ended: &ScopeKey) -> usize {
        let before = self.slots.len();
        self.slots.retain(|key, _| !key.1.is_within(ended));
        let removed = before.saturating_sub(self.slots.len());
        if removed > 0 {
            info!(ended = %ended, removed, "scope torn down, slots cleared");
        }
        removed
    }

    /// Register the reconciliation hook with a host's lifecycle bus.
    pub fn attach_lifecycle(registry: &Arc<Self>, bus: &HookBus, host: Arc<dyn HostRuntime>) {
        let registry = Arc::clone(registry);
        bus.on_create(Arc::new(move |instance| {
            registry.reconcile(host.as_ref(), instance);
        }));
    }

    /// Register scope teardown with a session runtime.
    pub fn attach_teardown(registry: &Arc<Self>, session: &dyn SessionRuntime) {
        let registry = Arc::clone(registry);
        session.on_scope_teardown(Arc::new(move |ended| {
            registry.clear_scope(ended);
        }));
    }

    /// Number of live slots (occupied or mid-initialisation).
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Returns the instance currently recorded for a (type, scope) pair,
    /// without initialising anything.
    #[must_use]
    pub fn peek(&self, type_id: ServiceTypeId, scope: &ScopeKey) -> Option<InstanceRef> {
        self.slots
            .get(&(type_id, *scope))
            .and_then(|slot| slot.get())
    }
}
