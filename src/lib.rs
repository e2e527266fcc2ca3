//! Client for the Application Integration and Integration Connectors
//! management APIs.
//!
//! - [`gcp`] - credentials, HTTP execution and URL construction
//! - [`resource`] - paging, display-name lookup, export and import
//! - [`api`] - per-resource operations
//! - [`config`] - persisted preferences and per-invocation settings

pub mod api;
pub mod config;
pub mod error;
pub mod gcp;
pub mod output;
pub mod resource;
pub mod validate;

pub use error::{Error, Result};
