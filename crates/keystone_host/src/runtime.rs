//! Host runtime surface consumed by the singleton accessor.

use crate::instance::InstanceRef;
use crate::scope::ScopeKey;
use crate::service::ServiceTypeId;

/// Errors the host runtime can surface when asked to create an instance.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// No factory is registered for the requested service type.
    #[error("no service registered for type {0}")]
    UnknownService(ServiceTypeId),

    /// The host refused to instantiate because its instance budget is spent.
    #[error("instance budget exhausted ({live} live)")]
    Exhausted {
        /// Number of live instances at the time of the refusal.
        live: usize,
    },
}

/// The lifecycle primitives the singleton accessor needs from a host.
///
/// Implementations must be callable from any thread. `create_instance` may
/// block; the accessor holds only the per-slot creation lock across the
/// call, so a slow creation stalls contenders for that one singleton and
/// nobody else.
pub trait HostRuntime: Send + Sync {
    /// Scope-filtered lookup of an already-live instance of the given type.
    ///
    /// When several candidates exist (a duplicate situation the lifecycle
    /// hook has not yet resolved), the lowest instance ID is returned so the
    /// choice is deterministic.
    fn find_existing(&self, type_id: ServiceTypeId, scope: &ScopeKey) -> Option<InstanceRef>;

    /// Create a brand-new instance of the given type within the scope.
    ///
    /// # Errors
    ///
    /// Returns [`HostError`] if the type is unknown or the host refuses to
    /// instantiate.
    fn create_instance(
        &self,
        type_id: ServiceTypeId,
        scope: &ScopeKey,
    ) -> Result<InstanceRef, HostError>;

    /// Irreversibly tear down an instance (used to eliminate duplicates).
    ///
    /// Returns `true` if the instance was live and has been destroyed.
    fn destroy_instance(&self, instance: &InstanceRef) -> bool;
}
