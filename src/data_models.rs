use serde::{Deserialize, Serialize};

/// Substituted whenever a strategy cannot extract a description.
pub const SNIPPET_PLACEHOLDER: &str = "No description available.";

/// The normalized result shape shared by every search strategy.
///
/// `image_url` and `relay_link` always serialize (as null when absent) so
/// callers can rely on a stable key set.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub title: String,
    pub link: String,
    pub snippet: String,
    pub image_url: Option<String>,
    pub relay_link: Option<String>,
}

impl SearchResult {
    pub fn new(
        title: String,
        link: String,
        snippet: String,
        image_url: Option<String>,
    ) -> SearchResult {
        let snippet = if snippet.trim().is_empty() {
            SNIPPET_PLACEHOLDER.to_string()
        } else {
            snippet
        };
        SearchResult {
            title,
            link,
            snippet,
            image_url,
            relay_link: None, // attached by the gateway in relay-enabled deployments
        }
    }
}

/// Deterministic relay link for a result link: the target URL encoded into
/// the fixed /proxy path template.
pub fn relay_link_for(link: &str) -> String {
    format!("/proxy?url={}", urlencoding::encode(link))
}
