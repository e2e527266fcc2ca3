//! Resource abstraction layer
//!
//! Every list endpoint in the Integrations and Connectors APIs answers with
//! the same envelope: an array of items under a collection-specific key plus
//! an optional `nextPageToken`. This module implements paging once and the
//! API modules describe their collections with a [`Collection`].
//!
//! # Architecture
//!
//! - [`collection`] - Collection descriptors and list query parameters
//! - [`fetcher`] - Page fetching, display-name lookup, export and import helpers
//!
//! # Example
//!
//! ```ignore
//! use integrationcli::api::authconfigs;
//! use integrationcli::resource::find;
//!
//! async fn lookup(client: &GcpClient) -> integrationcli::Result<String> {
//!     find(client, &authconfigs::collection(client), "prod-credentials").await
//! }
//! ```

mod collection;
mod fetcher;

pub use collection::{with_query, Collection, PageRequest, View};
pub use fetcher::{
    export, fetch_all, fetch_page, fetch_raw, find, read_export_dir, resource_id, short_id,
    strip_output_only, Page, ResourceSummary, EXPORT_PAGE_SIZE,
};
