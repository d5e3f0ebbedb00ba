//! Instance identity and handles.
//!
//! An [`InstanceId`] is a lightweight `u64` identifier allocated by the host.
//! An [`InstanceRef`] pairs that identity with a shared handle to the live
//! service object. The host runtime owns instance lifetime — an
//! `InstanceRef` is a cached lookup, not an ownership claim.

use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::scope::ScopeKey;
use crate::service::{Service, ServiceTypeId};

/// A unique instance identifier.
///
/// Instance IDs are allocated by the host runtime and are unique for the
/// lifetime of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceId(pub u64);

impl InstanceId {
    /// The null / invalid instance sentinel.
    pub const INVALID: InstanceId = InstanceId(0);

    /// Create an instance ID from a raw `u64`.
    #[must_use]
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` identifier.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }

    /// Returns `true` if this is a valid (non-zero) instance ID.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Instance({})", self.0)
    }
}

/// Allocates monotonically increasing instance IDs.
///
/// Lives inside the host runtime and hands out IDs from any thread.
#[derive(Debug)]
pub struct InstanceAllocator {
    next_id: AtomicU64,
}

impl InstanceAllocator {
    /// Creates a new allocator. IDs start at 1 (0 is reserved for
    /// [`InstanceId::INVALID`]).
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
        }
    }

    /// Allocates a fresh instance ID.
    pub fn allocate(&self) -> InstanceId {
        InstanceId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the number of instance IDs allocated so far.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.next_id.load(Ordering::Relaxed) - 1
    }
}

impl Default for InstanceAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// A cheap, cloneable handle to a live service instance.
///
/// Equality compares instance identity only — two refs are equal exactly
/// when they point at the same host instance. The type-erased service object
/// is reached through [`InstanceRef::downcast`].
#[derive(Clone)]
pub struct InstanceRef {
    id: InstanceId,
    type_id: ServiceTypeId,
    scope: ScopeKey,
    service: Arc<dyn Any + Send + Sync>,
}

impl InstanceRef {
    /// Build a handle for a freshly created instance.
    #[must_use]
    pub fn new(
        id: InstanceId,
        type_id: ServiceTypeId,
        scope: ScopeKey,
        service: Arc<dyn Any + Send + Sync>,
    ) -> Self {
        Self {
            id,
            type_id,
            scope,
            service,
        }
    }

    /// Returns the instance identity.
    #[must_use]
    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// Returns the service type this instance belongs to.
    #[must_use]
    pub fn type_id(&self) -> ServiceTypeId {
        self.type_id
    }

    /// Returns the scope this instance lives in.
    #[must_use]
    pub fn scope(&self) -> &ScopeKey {
        &self.scope
    }

    /// Downcast the type-erased service object to its concrete type.
    ///
    /// Returns `None` if `T` is not the instance's actual type.
    #[must_use]
    pub fn downcast<T: Service>(&self) -> Option<Arc<T>> {
        Arc::downcast(Arc::clone(&self.service)).ok()
    }
}

impl PartialEq for InstanceRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for InstanceRef {}

impl std::fmt::Debug for InstanceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceRef")
            .field("id", &self.id)
            .field("type_id", &self.type_id)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct ScoreBoard;

    impl Service for ScoreBoard {
        fn type_name() -> &'static str {
            "ScoreBoard"
        }
    }

    fn make_ref(id: u64) -> InstanceRef {
        InstanceRef::new(
            InstanceId::from_raw(id),
            ScoreBoard::service_type_id(),
            ScopeKey::Process,
            Arc::new(ScoreBoard),
        )
    }

    #[test]
    fn test_allocator_starts_at_one() {
        let alloc = InstanceAllocator::new();
        assert_eq!(alloc.allocate(), InstanceId(1));
        assert_eq!(alloc.allocate(), InstanceId(2));
        assert_eq!(alloc.count(), 2);
    }

    #[test]
    fn test_invalid_sentinel() {
        assert!(!InstanceId::INVALID.is_valid());
        assert!(InstanceId::from_raw(1).is_valid());
    }

    #[test]
    fn test_equality_is_by_identity() {
        let a = make_ref(1);
        let b = make_ref(1);
        let c = make_ref(2);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_downcast_to_concrete_type() {
        let handle = make_ref(1);
        assert!(handle.downcast::<ScoreBoard>().is_some());
    }

    #[test]
    fn test_downcast_wrong_type_fails() {
        #[derive(Debug, Default)]
        struct Other;
        impl Service for Other {
            fn type_name() -> &'static str {
                "Other"
            }
        }

        let handle = make_ref(1);
        assert!(handle.downcast::<Other>().is_none());
    }
}
