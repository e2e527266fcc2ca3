//! Collection descriptors and list query parameters

use crate::error::{Error, Result};
use url::Url;

/// A listable API collection
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    /// Singular resource kind used in messages, e.g. `authConfig`
    pub kind: &'static str,
    /// JSON key holding the item array in list responses
    pub items_key: &'static str,
    /// Export file prefix: pages are written as `<prefix>_<N>.json`
    pub file_prefix: &'static str,
    /// Collection URL, without query string
    pub url: String,
}

impl Collection {
    /// URL of one member of the collection
    pub fn item_url(&self, id: &str) -> String {
        format!("{}/{}", self.url, urlencoding::encode(id))
    }
}

/// Server-side response shape selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum View {
    Basic,
    Full,
}

impl View {
    pub fn as_str(self) -> &'static str {
        match self {
            View::Basic => "BASIC",
            View::Full => "FULL",
        }
    }
}

/// Optional list parameters; unset or empty fields are left out of the query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageRequest {
    /// `None` lets the server pick its default page size
    pub page_size: Option<u32>,
    pub page_token: String,
    pub filter: String,
    pub order_by: String,
    pub view: Option<View>,
}

impl PageRequest {
    /// Query pairs in a stable order
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();

        if let Some(size) = self.page_size {
            pairs.push(("pageSize", size.to_string()));
        }
        if !self.page_token.is_empty() {
            pairs.push(("pageToken", self.page_token.clone()));
        }
        if !self.filter.is_empty() {
            pairs.push(("filter", self.filter.clone()));
        }
        if !self.order_by.is_empty() {
            pairs.push(("orderBy", self.order_by.clone()));
        }
        if let Some(view) = self.view {
            pairs.push(("view", view.as_str().to_string()));
        }

        pairs
    }
}

/// Append `pairs` to `base`, skipping empty values
///
/// No `?` is added when nothing survives.
pub fn with_query<K, V>(base: &str, pairs: &[(K, V)]) -> Result<String>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut url =
        Url::parse(base).map_err(|e| Error::validation(format!("invalid URL {base}: {e}")))?;

    let pairs: Vec<_> = pairs
        .iter()
        .filter(|(_, v)| !v.as_ref().is_empty())
        .collect();

    if !pairs.is_empty() {
        let mut query = url.query_pairs_mut();
        for (k, v) in pairs {
            query.append_pair(k.as_ref(), v.as_ref());
        }
    }

    Ok(url.to_string())
}
