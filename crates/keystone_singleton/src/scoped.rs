//! Scope policies — thin typed accessors over the registry.
//!
//! Each policy answers one question: which [`ScopeKey`] does an access made
//! *right now* belong to? Everything else — locking, creation, adoption,
//! reconciliation — is the registry's job. A policy never caches a key, so
//! an access racing a scene change simply lands in whichever scope is
//! current when the key is computed; stale scopes expire by key change.

use std::marker::PhantomData;
use std::sync::Arc;

use keystone_host::{HostRuntime, InstanceRef, ScopeKey, Service};
use keystone_session::SessionRuntime;

use crate::error::SingletonError;
use crate::registry::SingletonRegistry;

/// One instance of `T` per process, independent of networking.
pub struct ProcessScoped<T: Service> {
    registry: Arc<SingletonRegistry>,
    host: Arc<dyn HostRuntime>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Service> ProcessScoped<T> {
    /// Bind the accessor to a registry and host.
    #[must_use]
    pub fn new(registry: Arc<SingletonRegistry>, host: Arc<dyn HostRuntime>) -> Self {
        Self {
            registry,
            host,
            _marker: PhantomData,
        }
    }

    /// Acquire the process-wide singleton of `T`.
    ///
    /// # Errors
    ///
    /// Returns [`SingletonError::CreationFailed`] if the host declines to
    /// instantiate.
    pub fn get(&self) -> Result<InstanceRef, SingletonError> {
        self.registry
            .acquire::<T>(self.host.as_ref(), &ScopeKey::Process)
    }
}

/// One instance of `T` per networked session; survives scene changes.
pub struct SessionScoped<T: Service> {
    registry: Arc<SingletonRegistry>,
    host: Arc<dyn HostRuntime>,
    session: Arc<dyn SessionRuntime>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Service> SessionScoped<T> {
    /// Bind the accessor to a registry, host, and session runtime.
    #[must_use]
    pub fn new(
        registry: Arc<SingletonRegistry>,
        host: Arc<dyn HostRuntime>,
        session: Arc<dyn SessionRuntime>,
    ) -> Self {
        Self {
            registry,
            host,
            session,
            _marker: PhantomData,
        }
    }

    /// Acquire the singleton of `T` for the current session.
    ///
    /// # Errors
    ///
    /// Returns [`SingletonError::CreationFailed`] if the host declines to
    /// instantiate.
    pub fn get(&self) -> Result<InstanceRef, SingletonError> {
        let scope = ScopeKey::Session(self.session.current_session_id());
        self.registry.acquire::<T>(self.host.as_ref(), &scope)
    }
}

/// One instance of `T` per (session, scene) pair; expires on scene change.
pub struct SceneScoped<T: Service> {
    registry: Arc<SingletonRegistry>,
    host: Arc<dyn HostRuntime>,
    session: Arc<dyn SessionRuntime>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Service> SceneScoped<T> {
    /// Bind the accessor to a registry, host, and session runtime.
    #[must_use]
    pub fn new(
        registry: Arc<SingletonRegistry>,
        host: Arc<dyn HostRuntime>,
        session: Arc<dyn SessionRuntime>,
    ) -> Self {
        Self {
            registry,
            host,
            session,
            _marker: PhantomData,
        }
    }

    /// Acquire the singleton of `T` for the current (session, scene) pair.
    ///
    /// # Errors
    ///
    /// Returns [`SingletonError::CreationFailed`] if the host declines to
    /// instantiate.
    pub fn get(&self) -> Result<InstanceRef, SingletonError> {
        let scope = ScopeKey::SessionScene(
            self.session.current_session_id(),
            self.session.current_scene_id(),
        );
        self.registry.acquire::<T>(self.host.as_ref(), &scope)
    }
}
