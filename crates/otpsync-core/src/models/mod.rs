//! Data models for otpsync

mod connection;
mod registry;
mod site;

pub use connection::ConnectionConfig;
pub use registry::Registry;
pub use site::{SiteDraft, SiteEntry};
