//! In-process host runtime.
//!
//! [`LocalHost`] is the reference [`HostRuntime`] implementation: it keeps
//! live instances in a concurrent table, allocates identities, fires the
//! activation hook once per instance, and drives per-tick updates. The demo
//! binary and the singleton tests both run against it.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use tracing::{debug, info};

use crate::hooks::HookBus;
use crate::instance::{InstanceAllocator, InstanceId, InstanceRef};
use crate::runtime::{HostError, HostRuntime};
use crate::scope::ScopeKey;
use crate::service::{Service, ServiceMeta, ServiceTypeId};

/// The in-process host runtime.
///
/// Service types are registered up front with a factory; instances can then
/// be created either directly via [`LocalHost::spawn`] (the host placing an
/// object on its own, e.g. initial content) or through the
/// [`HostRuntime::create_instance`] path the singleton accessor uses. Both
/// paths fire the activation hook exactly once.
#[derive(Debug)]
pub struct LocalHost {
    /// Registered service factories, keyed by type.
    metas: DashMap<ServiceTypeId, ServiceMeta>,
    /// All live instances, keyed by identity.
    instances: DashMap<InstanceId, InstanceRef>,
    /// Identity allocator.
    allocator: InstanceAllocator,
    /// Lifecycle hook dispatcher.
    hooks: HookBus,
    /// Optional cap on live instances (`None` = unbounded).
    capacity: Option<usize>,
    /// Number of instances ever built.
    created: AtomicU64,
    /// Number of instances destroyed.
    destroyed: AtomicU64,
    /// Tick counter.
    tick_id: AtomicU64,
}

impl LocalHost {
    /// Create a host with no instance cap.
    #[must_use]
    pub fn new() -> Self {
        Self {
            metas: DashMap::new(),
            instances: DashMap::new(),
            allocator: InstanceAllocator::new(),
            hooks: HookBus::new(),
            capacity: None,
            created: AtomicU64::new(0),
            destroyed: AtomicU64::new(0),
            tick_id: AtomicU64::new(0),
        }
    }

    /// Create a host that refuses to instantiate beyond `limit` live
    /// instances.
    #[must_use]
    pub fn with_capacity(limit: usize) -> Self {
        let mut host = Self::new();
        host.capacity = Some(limit);
        host
    }

    /// Register a default-constructible service type.
    pub fn register<T: Service + Default>(&self) {
        let meta = ServiceMeta::of::<T>();
        debug!(service = meta.name, type_id = %meta.type_id, "service registered");
        self.metas.insert(meta.type_id, meta);
    }

    /// Returns the lifecycle hook bus.
    #[must_use]
    pub fn hooks(&self) -> &HookBus {
        &self.hooks
    }

    /// Create an instance directly, outside the accessor path.
    ///
    /// This models the host placing an object on its own (initial scene
    /// content, editor placement). The activation hook fires before the call
    /// returns.
    ///
    /// # Errors
    ///
    /// Returns [`HostError`] if the type is unknown or the instance cap is
    /// reached.
    pub fn spawn(&self, type_id: ServiceTypeId, scope: &ScopeKey) -> Result<InstanceRef, HostError> {
        let instance = self.build(type_id, scope)?;
        self.hooks.emit_create(&instance);
        Ok(instance)
    }

    /// Build and record an instance without firing hooks.
    fn build(&self, type_id: ServiceTypeId, scope: &ScopeKey) -> Result<InstanceRef, HostError> {
        if let Some(limit) = self.capacity {
            let live = self.instances.len();
            if live >= limit {
                return Err(HostError::Exhausted { live });
            }
        }

        // Copy the descriptor out so no map guard is held across the factory
        // call.
        let (name, build_fn) = {
            let meta = self
                .metas
                .get(&type_id)
                .ok_or(HostError::UnknownService(type_id))?;
            (meta.name, meta.build_fn)
        };

        let id = self.allocator.allocate();
        let instance = InstanceRef::new(id, type_id, *scope, build_fn());
        self.instances.insert(id, instance.clone());
        self.created.fetch_add(1, Ordering::SeqCst);

        debug!(service = name, instance = %id, scope = %scope, "instance created");
        Ok(instance)
    }

    /// Advance the host by one tick, firing the update hook.
    ///
    /// Returns the new tick ID.
    pub fn tick(&self, dt: f64) -> u64 {
        let tick_id = self.tick_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.hooks.emit_update(tick_id, dt);
        tick_id
    }

    /// Returns the current tick counter.
    #[must_use]
    pub fn current_tick(&self) -> u64 {
        self.tick_id.load(Ordering::SeqCst)
    }

    /// Returns `true` if an instance is still live.
    #[must_use]
    pub fn contains(&self, id: InstanceId) -> bool {
        self.instances.contains_key(&id)
    }

    /// Number of live instances.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.instances.len()
    }

    /// Number of instances ever built.
    #[must_use]
    pub fn created_count(&self) -> u64 {
        self.created.load(Ordering::SeqCst)
    }

    /// Number of instances destroyed.
    #[must_use]
    pub fn destroyed_count(&self) -> u64 {
        self.destroyed.load(Ordering::SeqCst)
    }
}

impl Default for LocalHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HostRuntime for LocalHost {
    fn find_existing(&self, type_id: ServiceTypeId, scope: &ScopeKey) -> Option<InstanceRef> {
        // Lowest ID wins so repeated lookups are deterministic even while a
        // duplicate is still awaiting reconciliation.
        self.instances
            .iter()
            .filter(|entry| entry.type_id() == type_id && entry.scope() == scope)
            .min_by_key(|entry| entry.id())
            .map(|entry| entry.value().clone())
    }

    fn create_instance(
        &self,
        type_id: ServiceTypeId,
        scope: &ScopeKey,
    ) -> Result<InstanceRef, HostError> {
        let instance = self.build(type_id, scope)?;
        // Activation fires on the creation path too, exactly once.
        self.hooks.emit_create(&instance);
        Ok(instance)
    }

    fn destroy_instance(&self, instance: &InstanceRef) -> bool {
        if self.instances.remove(&instance.id()).is_some() {
            self.destroyed.fetch_add(1, Ordering::SeqCst);
            info!(instance = %instance.id(), type_id = %instance.type_id(), "instance destroyed");
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct MatchDirector;

    impl Service for MatchDirector {
        fn type_name() -> &'static str {
            "MatchDirector"
        }
    }

    #[derive(Debug, Default)]
    struct ScoreBoard;

    impl Service for ScoreBoard {
        fn type_name() -> &'static str {
            "ScoreBoard"
        }
    }

    #[test]
    fn test_spawn_registered_service() {
        let host = LocalHost::new();
        host.register::<MatchDirector>();

        let instance = host
            .spawn(MatchDirector::service_type_id(), &ScopeKey::Process)
            .unwrap();
        assert!(instance.id().is_valid());
        assert!(host.contains(instance.id()));
        assert_eq!(host.live_count(), 1);
        assert_eq!(host.created_count(), 1);
    }

    #[test]
    fn test_spawn_unknown_service_fails() {
        let host = LocalHost::new();
        let result = host.spawn(MatchDirector::service_type_id(), &ScopeKey::Process);
        assert!(matches!(result, Err(HostError::UnknownService(_))));
    }

    #[test]
    fn test_capacity_exhaustion() {
        let host = LocalHost::with_capacity(1);
        host.register::<MatchDirector>();

        host.spawn(MatchDirector::service_type_id(), &ScopeKey::Process)
            .unwrap();
        let result = host.spawn(MatchDirector::service_type_id(), &ScopeKey::Process);
        assert!(matches!(result, Err(HostError::Exhausted { live: 1 })));
    }

    #[test]
    fn test_find_existing_filters_by_type_and_scope() {
        let host = LocalHost::new();
        host.register::<MatchDirector>();
        host.register::<ScoreBoard>();

        let session = crate::SessionId::random();
        let in_session = ScopeKey::Session(session);

        let director = host
            .spawn(MatchDirector::service_type_id(), &in_session)
            .unwrap();
        host.spawn(ScoreBoard::service_type_id(), &in_session)
            .unwrap();

        let found = host
            .find_existing(MatchDirector::service_type_id(), &in_session)
            .unwrap();
        assert_eq!(found, director);
        assert!(
            host.find_existing(MatchDirector::service_type_id(), &ScopeKey::Process)
                .is_none()
        );
    }

    #[test]
    fn test_find_existing_prefers_lowest_id() {
        let host = LocalHost::new();
        host.register::<MatchDirector>();

        let first = host
            .spawn(MatchDirector::service_type_id(), &ScopeKey::Process)
            .unwrap();
        let _second = host
            .spawn(MatchDirector::service_type_id(), &ScopeKey::Process)
            .unwrap();

        let found = host
            .find_existing(MatchDirector::service_type_id(), &ScopeKey::Process)
            .unwrap();
        assert_eq!(found, first);
    }

    #[test]
    fn test_destroy_instance() {
        let host = LocalHost::new();
        host.register::<MatchDirector>();

        let instance = host
            .spawn(MatchDirector::service_type_id(), &ScopeKey::Process)
            .unwrap();
        assert!(host.destroy_instance(&instance));
        assert!(!host.contains(instance.id()));
        assert_eq!(host.destroyed_count(), 1);

        // A second destroy of the same instance is a no-op.
        assert!(!host.destroy_instance(&instance));
        assert_eq!(host.destroyed_count(), 1);
    }

    #[test]
    fn test_spawn_fires_activation_hook() {
        let host = LocalHost::new();
        host.register::<MatchDirector>();

        let fired = std::sync::Arc::new(AtomicU64::new(0));
        let fired_by_hook = std::sync::Arc::clone(&fired);
        host.hooks().on_create(std::sync::Arc::new(move |_| {
            fired_by_hook.fetch_add(1, Ordering::SeqCst);
        }));

        host.spawn(MatchDirector::service_type_id(), &ScopeKey::Process)
            .unwrap();
        host.create_instance(MatchDirector::service_type_id(), &ScopeKey::Process)
            .unwrap();
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_tick_advances_and_notifies() {
        let host = LocalHost::new();
        let last_tick = std::sync::Arc::new(AtomicU64::new(0));
        let last_tick_by_hook = std::sync::Arc::clone(&last_tick);
        host.hooks().on_update(std::sync::Arc::new(move |tick_id, _| {
            last_tick_by_hook.store(tick_id, Ordering::SeqCst);
        }));

        assert_eq!(host.tick(0.016), 1);
        assert_eq!(host.tick(0.016), 2);
        assert_eq!(last_tick.load(Ordering::SeqCst), 2);
    }
}
