//! Core [`Service`] trait and associated metadata.
//!
//! A service is any type the host runtime manages as a lifecycle-bound
//! component: the host instantiates it, activates it, drives it per tick,
//! and eventually destroys it. Services must be `Send + Sync + 'static` so
//! handles can be shared freely across threads.
//!
//! ## Type Identity
//!
//! [`ServiceTypeId`] is derived from the service's **string name** using the
//! FNV-1a 64-bit hash algorithm. This is deterministic and language-neutral —
//! any process in any language can compute the same ID for a given name.

use std::any::Any;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// FNV-1a 64-bit offset basis.
const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;

/// FNV-1a 64-bit prime.
const FNV_PRIME: u64 = 0x0100_0000_01b3;

/// Hash a byte string with FNV-1a 64-bit.
///
/// Shared by [`ServiceTypeId`] and scene identifiers so both derive identity
/// from names the same way.
pub(crate) const fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
        i += 1;
    }
    hash
}

/// A unique identifier for a service type, derived from its string name
/// using the FNV-1a 64-bit hash algorithm.
///
/// The ID is deterministic: any implementation that applies FNV-1a to the
/// same UTF-8 name bytes produces the same `ServiceTypeId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct ServiceTypeId(pub u64);

impl ServiceTypeId {
    /// Compute the [`ServiceTypeId`] from a service's string name.
    ///
    /// This is the **canonical** way to derive a `ServiceTypeId`.
    #[must_use]
    pub const fn from_name(name: &str) -> Self {
        Self(fnv1a_64(name.as_bytes()))
    }

    /// Compute the [`ServiceTypeId`] for a Rust service type `T`.
    #[must_use]
    pub fn of<T: Service>() -> Self {
        Self::from_name(T::type_name())
    }
}

impl std::fmt::Display for ServiceTypeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// The core service trait.
///
/// Every type the host runtime manages implements this trait. The trait
/// itself carries no behaviour beyond naming — lifecycle transitions are
/// delivered through the [`HookBus`](crate::hooks::HookBus), not through
/// inherited methods.
///
/// # Examples
///
/// ```rust
/// use keystone_host::Service;
///
/// #[derive(Debug, Default)]
/// struct MatchDirector {
///     round: u32,
/// }
///
/// impl Service for MatchDirector {
///     fn type_name() -> &'static str { "MatchDirector" }
/// }
/// ```
pub trait Service: Send + Sync + 'static {
    /// A human-readable name for this service type.
    fn type_name() -> &'static str;

    /// Returns the [`ServiceTypeId`] for this service.
    ///
    /// The default implementation hashes [`Service::type_name()`] with
    /// FNV-1a 64-bit.
    fn service_type_id() -> ServiceTypeId {
        ServiceTypeId::from_name(Self::type_name())
    }
}

/// Metadata the host needs to instantiate a service type.
///
/// Registered once per type with the host runtime; the factory is invoked
/// whenever the host creates a fresh instance, either directly or on behalf
/// of the singleton accessor.
#[derive(Clone)]
pub struct ServiceMeta {
    /// The unique type identifier.
    pub type_id: ServiceTypeId,
    /// The human-readable name of the service (e.g. `"MatchDirector"`).
    pub name: &'static str,
    /// Factory producing a fresh, type-erased instance.
    pub build_fn: fn() -> Arc<dyn Any + Send + Sync>,
}

impl ServiceMeta {
    /// Build the descriptor for a default-constructible service type.
    #[must_use]
    pub fn of<T: Service + Default>() -> Self {
        Self {
            type_id: T::service_type_id(),
            name: T::type_name(),
            build_fn: || Arc::new(T::default()),
        }
    }
}

impl std::fmt::Debug for ServiceMeta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceMeta")
            .field("type_id", &self.type_id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct MatchDirector {
        #[allow(dead_code)]
        round: u32,
    }

    impl Service for MatchDirector {
        fn type_name() -> &'static str {
            "MatchDirector"
        }
    }

    #[test]
    fn test_service_type_id_is_stable() {
        let id1 = MatchDirector::service_type_id();
        let id2 = MatchDirector::service_type_id();
        assert_eq!(id1, id2);
    }

    #[test]
    fn test_service_type_id_matches_from_name() {
        // The trait method and the standalone function must produce the same ID.
        assert_eq!(
            MatchDirector::service_type_id(),
            ServiceTypeId::from_name("MatchDirector")
        );
    }

    #[test]
    fn test_service_type_id_differs_between_names() {
        assert_ne!(
            ServiceTypeId::from_name("MatchDirector"),
            ServiceTypeId::from_name("ScoreBoard")
        );
    }

    #[test]
    fn test_fnv1a_known_vector() {
        // FNV-1a 64-bit of the empty string is the offset basis itself.
        assert_eq!(
            ServiceTypeId::from_name(""),
            ServiceTypeId(0xcbf2_9ce4_8422_2325)
        );
    }

    #[test]
    fn test_meta_builds_typed_instance() {
        let meta = ServiceMeta::of::<MatchDirector>();
        assert_eq!(meta.name, "MatchDirector");
        assert_eq!(meta.type_id, MatchDirector::service_type_id());

        let built = (meta.build_fn)();
        assert!(built.downcast_ref::<MatchDirector>().is_some());
    }
}
