//! Application Integration and Connectors resources
//!
//! One module per resource type. Operations return the raw response body so
//! the caller decides whether to print, parse or persist it.

pub mod authconfigs;
pub mod certificates;
pub mod connections;
pub mod iam;
pub mod managedzones;
pub mod provision;
