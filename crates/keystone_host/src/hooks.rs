//! Lifecycle hook registration and dispatch.
//!
//! The host drives two hook points: `on_create`, fired once per instance
//! activation, and `on_update`, fired once per tick. Listeners are explicit
//! registered callbacks carrying the instance reference — there is no
//! inheritance-based override resolution.

use std::sync::{Arc, PoisonError, RwLock};

use crate::instance::InstanceRef;

/// A listener invoked once per instance activation.
pub type CreateListener = Arc<dyn Fn(&InstanceRef) + Send + Sync>;

/// A listener invoked once per host tick with `(tick_id, dt)`.
pub type UpdateListener = Arc<dyn Fn(u64, f64) + Send + Sync>;

/// Registration point and dispatcher for lifecycle hooks.
///
/// Dispatch order follows registration order. Listener lists are read-mostly;
/// a poisoned lock is recovered by taking the inner value, since listener
/// registration is idempotent from the bus's point of view.
#[derive(Default)]
pub struct HookBus {
    on_create: RwLock<Vec<CreateListener>>,
    on_update: RwLock<Vec<UpdateListener>>,
}

impl HookBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for instance activation.
    pub fn on_create(&self, listener: CreateListener) {
        self.on_create
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    /// Register a listener for per-tick updates.
    pub fn on_update(&self, listener: UpdateListener) {
        self.on_update
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    /// Fire the activation hook for an instance.
    pub fn emit_create(&self, instance: &InstanceRef) {
        let listeners = self
            .on_create
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for listener in &listeners {
            listener(instance);
        }
    }

    /// Fire the per-tick update hook.
    pub fn emit_update(&self, tick_id: u64, dt: f64) {
        let listeners = self
            .on_update
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for listener in &listeners {
            listener(tick_id, dt);
        }
    }

    /// Returns the number of registered activation listeners.
    #[must_use]
    pub fn create_listener_count(&self) -> usize {
        self.on_create
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl std::fmt::Debug for HookBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookBus")
            .field("create_listeners", &self.create_listener_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU64, Ordering};

    use crate::scope::ScopeKey;
    use crate::service::{Service, ServiceTypeId};
    use crate::{InstanceId, InstanceRef};

    use super::*;

    #[derive(Debug, Default)]
    struct Probe;

    impl Service for Probe {
        fn type_name() -> &'static str {
            "Probe"
        }
    }

    fn probe_ref() -> InstanceRef {
        InstanceRef::new(
            InstanceId::from_raw(7),
            ServiceTypeId::of::<Probe>(),
            ScopeKey::Process,
            Arc::new(Probe),
        )
    }

    #[test]
    fn test_create_listener_receives_instance() {
        let bus = HookBus::new();
        let seen = Arc::new(AtomicU64::new(0));
        let seen_by_listener = Arc::clone(&seen);
        bus.on_create(Arc::new(move |instance| {
            seen_by_listener.store(instance.id().id(), Ordering::SeqCst);
        }));

        bus.emit_create(&probe_ref());
        assert_eq!(seen.load(Ordering::SeqCst), 7);
    }

    #[test]
    fn test_all_listeners_fire_in_order() {
        let bus = HookBus::new();
        let calls = Arc::new(std::sync::Mutex::new(Vec::new()));
        for tag in ["first", "second"] {
            let calls = Arc::clone(&calls);
            bus.on_create(Arc::new(move |_| calls.lock().unwrap().push(tag)));
        }

        bus.emit_create(&probe_ref());
        assert_eq!(*calls.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_update_listener_receives_tick() {
        let bus = HookBus::new();
        let ticks = Arc::new(AtomicU64::new(0));
        let ticks_by_listener = Arc::clone(&ticks);
        bus.on_update(Arc::new(move |tick_id, _dt| {
            ticks_by_listener.store(tick_id, Ordering::SeqCst);
        }));

        bus.emit_update(42, 0.016);
        assert_eq!(ticks.load(Ordering::SeqCst), 42);
    }
}
