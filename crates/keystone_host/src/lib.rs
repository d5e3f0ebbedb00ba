//! # keystone_host
//!
//! The host side of the keystone helpers — defines what a service is, how
//! instances are identified, and the lifecycle runtime surface the singleton
//! accessor consumes.
//!
//! This crate provides:
//!
//! - [`Service`] trait — the contract all lifecycle-managed types satisfy.
//! - [`ServiceTypeId`] — FNV-1a derived, language-neutral type identifiers.
//! - [`InstanceId`] / [`InstanceRef`] — lightweight instance identity and a
//!   cheap cloneable handle to a live instance.
//! - [`ScopeKey`] — the lifetime domain an instance belongs to (process,
//!   session, or session+scene).
//! - [`HostRuntime`] trait — find/create/destroy primitives.
//! - [`HookBus`] — lifecycle hook registration and dispatch.
//! - [`LocalHost`] — the in-process host runtime implementation.

pub mod hooks;
pub mod instance;
pub mod local;
pub mod runtime;
pub mod scope;
pub mod service;

pub use hooks::{CreateListener, HookBus, UpdateListener};
pub use instance::{InstanceAllocator, InstanceId, InstanceRef};
pub use local::LocalHost;
pub use runtime::{HostError, HostRuntime};
pub use scope::{SceneId, ScopeKey, SessionId};
pub use service::{Service, ServiceMeta, ServiceTypeId};
