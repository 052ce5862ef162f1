pub mod add;
pub mod common;
pub mod completions;
pub mod config;
pub mod delete;
pub mod edit;
pub mod export;
pub mod icon;
pub mod import;
pub mod list;
pub mod reorder;
