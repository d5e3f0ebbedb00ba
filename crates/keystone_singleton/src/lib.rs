//! # keystone_singleton
//!
//! Lazy singleton access over the host lifecycle runtime: at most one live
//! instance of a service type per scope, created on first access or first
//! activation, whichever comes first, safe under concurrent access.
//!
//! This crate provides:
//!
//! - [`SingletonRegistry`] — the `(type, scope) → slot` map and the
//!   double-checked acquisition algorithm.
//! - [`Slot`] — the per-(type, scope) cell recording the current instance.
//! - Scope policies: [`ProcessScoped`], [`SessionScoped`], [`SceneScoped`].
//!
//! ## Acquisition
//!
//! ```rust
//! use std::sync::Arc;
//! use keystone_host::{LocalHost, Service};
//! use keystone_singleton::{ProcessScoped, SingletonRegistry};
//!
//! #[derive(Debug, Default)]
//! struct MatchDirector;
//!
//! impl Service for MatchDirector {
//!     fn type_name() -> &'static str { "MatchDirector" }
//! }
//!
//! let host = Arc::new(LocalHost::new());
//! host.register::<MatchDirector>();
//!
//! let registry = Arc::new(SingletonRegistry::new());
//! SingletonRegistry::attach_lifecycle(&registry, host.hooks(), Arc::clone(&host) as _);
//!
//! let director = ProcessScoped::<MatchDirector>::new(Arc::clone(&registry), host);
//! let first = director.get().unwrap();
//! let again = director.get().unwrap();
//! assert_eq!(first, again);
//! ```

pub mod error;
pub mod registry;
pub mod scoped;
pub mod slot;

pub use error::SingletonError;
pub use registry::SingletonRegistry;
pub use scoped::{ProcessScoped, SceneScoped, SessionScoped};
pub use slot::{ClaimOutcome, Slot};
