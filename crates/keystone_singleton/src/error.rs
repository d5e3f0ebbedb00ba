//! Singleton-layer error types.

use keystone_host::{HostError, ServiceTypeId};

/// Errors surfaced to callers of the singleton accessor.
///
/// Duplicate instances and stale-scope access are recovered internally and
/// never surface; the only hard failure is the host refusing to create.
#[derive(Debug, thiserror::Error)]
pub enum SingletonError {
    /// The host declined or failed to create an instance. Callers must treat
    /// this as a hard failure — the accessor never retries on its own.
    #[error("failed to create singleton for type {type_id}: {source}")]
    CreationFailed {
        /// The service type that could not be instantiated.
        type_id: ServiceTypeId,
        /// The host's refusal.
        #[source]
        source: HostError,
    },
}
