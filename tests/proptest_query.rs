//! Property-based tests using proptest
//!
//! These tests verify query string construction, resource name parsing and
//! page envelope decoding using randomized inputs.

use integrationcli::resource::{short_id, with_query, Page, PageRequest, View};
use integrationcli::validate::Selector;
use proptest::prelude::*;
use serde_json::json;
use url::Url;

const BASE: &str = "https://integrations.googleapis.com/v1/projects/p/locations/us-central1/authConfigs";

fn arb_view() -> impl Strategy<Value = Option<View>> {
    prop_oneof![Just(None), Just(Some(View::Basic)), Just(Some(View::Full))]
}

/// Generate list requests with any mix of set and unset fields
fn arb_request() -> impl Strategy<Value = PageRequest> {
    (
        proptest::option::of(1u32..1000),
        ".{0,20}",
        ".{0,30}",
        "[a-zA-Z ]{0,20}",
        arb_view(),
    )
        .prop_map(|(page_size, page_token, filter, order_by, view)| PageRequest {
            page_size,
            page_token,
            filter,
            order_by,
            view,
        })
}

proptest! {
    /// Decoding the built URL gives back exactly the set parameters
    #[test]
    fn query_round_trips(request in arb_request()) {
        let url = with_query(BASE, &request.query_pairs()).unwrap();
        let parsed = Url::parse(&url).unwrap();

        let decoded: Vec<(String, String)> = parsed.query_pairs().into_owned().collect();
        let expected: Vec<(String, String)> = request
            .query_pairs()
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();

        prop_assert_eq!(decoded, expected);
        let base = Url::parse(BASE).unwrap();
        prop_assert_eq!(parsed.path(), base.path());
    }

    /// Unset fields never appear in the query string
    #[test]
    fn unset_fields_are_omitted(request in arb_request()) {
        let url = with_query(BASE, &request.query_pairs()).unwrap();
        let parsed = Url::parse(&url).unwrap();
        let keys: Vec<String> = parsed.query_pairs().map(|(k, _)| k.into_owned()).collect();

        prop_assert_eq!(keys.contains(&"pageSize".to_string()), request.page_size.is_some());
        prop_assert_eq!(keys.contains(&"pageToken".to_string()), !request.page_token.is_empty());
        prop_assert_eq!(keys.contains(&"filter".to_string()), !request.filter.is_empty());
        prop_assert_eq!(keys.contains(&"view".to_string()), request.view.is_some());
        prop_assert_eq!(url.contains('?'), !keys.is_empty());
    }

    /// The short ID is the last path segment and never contains a slash
    #[test]
    fn short_id_is_trailing_segment(
        segments in prop::collection::vec("[a-zA-Z0-9-]{1,12}", 1..8)
    ) {
        let name = segments.join("/");
        let id = short_id(&name);
        prop_assert_eq!(id, segments.last().unwrap().as_str());
        prop_assert!(!id.contains('/'));
    }

    /// Any non-empty token is kept verbatim, empty means last page
    #[test]
    fn page_token_kept_verbatim(token in ".{0,40}", count in 0usize..5) {
        let items: Vec<_> = (0..count).map(|i| json!({"name": format!("a/{i}")})).collect();
        let body = serde_json::to_vec(&json!({"authConfigs": items, "nextPageToken": token})).unwrap();

        let page = Page::parse(&body, "authConfigs").unwrap();
        prop_assert_eq!(page.items.len(), count);
        if token.is_empty() {
            prop_assert!(page.next_page_token.is_none());
        } else {
            prop_assert_eq!(page.next_page_token, Some(token));
        }
    }

    /// Selector accepts exactly one non-empty flag
    #[test]
    fn selector_requires_exactly_one(
        id in proptest::option::of("[a-z0-9]{0,8}"),
        name in proptest::option::of("[a-zA-Z ]{0,8}")
    ) {
        let result = Selector::from_flags(id.clone(), name.clone());
        let valid = match (&id, &name) {
            (Some(id), None) => !id.is_empty(),
            (None, Some(name)) => !name.is_empty(),
            _ => false,
        };
        prop_assert_eq!(result.is_ok(), valid);
        if let Err(err) = result {
            prop_assert!(err.is_validation());
        }
    }
}
