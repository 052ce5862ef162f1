//! otpsync-core - Core library for otpsync
//!
//! Keeps a local mirror of a remote one-time-password site registry in sync
//! through a request/response proxy, resolves site icons, and moves whole
//! registries in and out as portable documents.

pub mod config;
pub mod connection;
pub mod error;
pub mod icon;
pub mod models;
pub mod proxy;
pub mod reorder;
pub mod store;
pub mod transfer;
pub mod util;

pub use error::{Error, Result};
pub use models::{ConnectionConfig, Registry, SiteDraft, SiteEntry};
pub use store::{RegistryStore, UpsertOutcome};
