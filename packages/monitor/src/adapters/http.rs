//! HTTP-based source adapter.
//!
//! Fetches listings from a JSON search endpoint. Suitable for sources
//! that expose their search results as an API; JavaScript-heavy
//! marketplaces need a browser-backed adapter, which lives outside this
//! crate behind the same [`SourceAdapter`] trait.

use url::Url;

use crate::error::{FetchError, FetchResult};
use crate::traits::source::{FetchPage, SourceAdapter};
use crate::types::Listing;

const DEFAULT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// The wire shape of one search response.
#[derive(Debug, serde::Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<WireListing>,

    /// Optional explicit cursor for the next fetch
    #[serde(default)]
    next: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
struct WireListing {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    price: String,
    #[serde(default)]
    image: String,
    #[serde(default)]
    link: String,
}

/// Source adapter over an HTTP JSON search endpoint.
///
/// The search URL is a template; `{keyword}` is replaced with the
/// percent-encoded keyword. When a cursor is present it is used as the
/// request URL verbatim, mirroring sources that redirect the first
/// search to a canonical results URL worth re-using.
pub struct HttpSourceAdapter {
    client: reqwest::Client,
    search_url: String,
    user_agent: String,
}

impl HttpSourceAdapter {
    /// Create an adapter for the given search URL template.
    pub fn new(search_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(DEFAULT_TIMEOUT)
                .build()
                .expect("Failed to create HTTP client"),
            search_url: search_url.into(),
            user_agent: "listing-monitor/0.1".to_string(),
        }
    }

    /// Set a custom user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set a custom HTTP client (timeouts, proxies, ...).
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn request_url(&self, keyword: &str, cursor: Option<&str>) -> FetchResult<Url> {
        let raw = match cursor {
            Some(cursor) => cursor.to_string(),
            None => {
                let encoded: String =
                    url::form_urlencoded::byte_serialize(keyword.as_bytes()).collect();
                self.search_url.replace("{keyword}", &encoded)
            }
        };
        Url::parse(&raw).map_err(|_| FetchError::InvalidUrl { url: raw })
    }
}

#[async_trait::async_trait]
impl SourceAdapter for HttpSourceAdapter {
    async fn fetch(&self, keyword: &str, cursor: Option<&str>) -> FetchResult<FetchPage> {
        let url = self.request_url(keyword, cursor)?;
        let requested = url.to_string();

        let response = self
            .client
            .get(url)
            .header("User-Agent", &self.user_agent)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout {
                        keyword: keyword.to_string(),
                    }
                } else {
                    FetchError::Http(Box::new(e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http(Box::new(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("HTTP {status}"),
            ))));
        }

        // A redirected search URL is worth re-using as the cursor
        let final_url = response.url().to_string();

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Decode(Box::new(e)))?;

        let listings: Vec<Listing> = body
            .items
            .into_iter()
            .filter_map(|item| {
                if item.id.is_empty() {
                    // per-record extraction failure is tolerated
                    tracing::warn!(keyword = %keyword, "listing without id skipped");
                    return None;
                }
                Some(
                    Listing::new(item.id)
                        .with_name(item.name)
                        .with_price(item.price)
                        .with_image(item.image)
                        .with_link(item.link),
                )
            })
            .collect();

        let next_cursor = body.next.or_else(|| {
            (final_url != requested).then_some(final_url)
        });

        let mut page = FetchPage::new(listings);
        if let Some(cursor) = next_cursor {
            page = page.with_cursor(cursor);
        }
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_is_encoded_into_the_template() {
        let adapter = HttpSourceAdapter::new("https://example.test/search?keyword={keyword}");
        let url = adapter.request_url("クドわふたー", None).unwrap();
        assert!(url.as_str().starts_with("https://example.test/search?keyword=%E3%82%AF"));
    }

    #[test]
    fn cursor_overrides_the_template() {
        let adapter = HttpSourceAdapter::new("https://example.test/search?keyword={keyword}");
        let url = adapter
            .request_url("kw", Some("https://example.test/search?cid=42"))
            .unwrap();
        assert_eq!(url.as_str(), "https://example.test/search?cid=42");
    }

    #[test]
    fn unparseable_url_is_an_invalid_url_error() {
        let adapter = HttpSourceAdapter::new("not a url {keyword}");
        let err = adapter.request_url("kw", None).unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));
    }

    #[test]
    fn response_items_without_id_are_dropped() {
        let body: SearchResponse = serde_json::from_str(
            r#"{"items": [
                {"id": "m1", "name": "a", "price": "1000円"},
                {"name": "no id", "price": "500円"}
            ]}"#,
        )
        .unwrap();

        let with_ids: Vec<_> = body.items.iter().filter(|i| !i.id.is_empty()).collect();
        assert_eq!(with_ids.len(), 1);
        assert_eq!(body.next, None);
    }
}
