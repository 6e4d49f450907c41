//! Address-bar mirroring.
//!
//! The URL is a one-way projection of the canonical query: the table writes
//! it, it never drives a fetch. Parameters are emitted in a fixed order
//! (`page`, page size, `search`, `ordering`, then filters by key) so the
//! same query always renders the same string.

use crate::address::AddressBar;
use crate::compose::CanonicalQuery;
use crate::config::TableConfig;
use tracing::debug;

/// Renders canonical queries as address-bar URLs and writes them with
/// replace semantics.
#[derive(Debug, Clone)]
pub struct UrlSynchronizer {
    path: Option<String>,
    default_page_size: u32,
    page_size_key: &'static str,
}

impl UrlSynchronizer {
    /// Creates a synchronizer for a table.
    pub fn new(config: &TableConfig) -> Self {
        Self {
            path: config.path.clone(),
            default_page_size: config.default_page_size,
            page_size_key: config.page_size_param.key(),
        }
    }

    /// The configured path, if it overrides the address bar's own.
    pub fn path_override(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// The path the query string is appended to when the address bar shows
    /// `current_url`.
    pub fn path_for<'a>(&'a self, current_url: &'a str) -> &'a str {
        self.path.as_deref().unwrap_or_else(|| url_path(current_url))
    }

    /// Renders the query string, without the leading `?`. Defaults are
    /// omitted, so the default view renders as the empty string.
    pub fn query_string(&self, query: &CanonicalQuery) -> String {
        let mut pairs: Vec<(&str, String)> = Vec::new();

        if query.page != 1 {
            pairs.push(("page", query.page.to_string()));
        }
        if query.limit != self.default_page_size {
            pairs.push((self.page_size_key, query.limit.to_string()));
        }
        if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("search", search.to_string()));
        }
        if let Some(ordering) = query.ordering() {
            pairs.push(("ordering", ordering));
        }
        for (key, value) in &query.filters {
            if self.is_reserved(key) {
                debug!(key = %key, "filter key collides with a reserved parameter; not mirrored");
                continue;
            }
            for v in value.query_values() {
                pairs.push((key.as_str(), v));
            }
        }

        pairs
            .iter()
            .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Renders the URL that replaces `current_url`: its path (unless
    /// overridden), the query string, and its fragment.
    pub fn href(&self, current_url: &str, query: &CanonicalQuery) -> String {
        let mut href = self.path_for(current_url).to_string();
        let qs = self.query_string(query);
        if !qs.is_empty() {
            href.push('?');
            href.push_str(&qs);
        }
        if let Some((_, fragment)) = current_url.split_once('#') {
            href.push('#');
            href.push_str(fragment);
        }
        href
    }

    /// Writes the query into the address bar unless the decoded URL is
    /// already there. Returns true if a write happened.
    pub fn sync(&self, bar: &dyn AddressBar, query: &CanonicalQuery) -> bool {
        let current = bar.current();
        let next = self.href(&current, query);
        if decode_component(&next) == decode_component(&current) {
            debug!(url = %current, "address bar already up to date");
            return false;
        }
        debug!(from = %current, to = %next, "replacing address bar URL");
        bar.replace(&next);
        true
    }

    fn is_reserved(&self, key: &str) -> bool {
        matches!(key, "page" | "search" | "ordering") || key == self.page_size_key
    }
}

/// The path part of a URL: everything before `?` or `#`, `/` when empty.
pub fn url_path(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    match &url[..end] {
        "" => "/",
        path => path,
    }
}

/// Splits a query string (leading `?` optional) into decoded key/value
/// pairs in order. `+` decodes to a space.
pub fn parse_query_string(query: &str) -> Vec<(String, String)> {
    let query = query.strip_prefix('?').unwrap_or(query);
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = decode_component(key);
            if key.is_empty() {
                return None;
            }
            Some((key, decode_component(value)))
        })
        .collect()
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}
