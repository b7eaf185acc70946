//! OSRS Wiki real-time prices client with caching and rate limiting.
//!
//! One cache entry per item id with a short TTL bounds call volume; the
//! governor rate limiter caps what still gets through. Both exist to keep
//! usage of the community API respectful.

use crate::error::{OracleError, Result};
use ge_arb_core::price::LatestPrice;
use ge_arb_core::traits::PriceOracle;
use governor::{Quota, RateLimiter};
use nonzero_ext::nonzero;
use parking_lot::RwLock;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};

// =============================================================================
// Constants
// =============================================================================

/// OSRS Wiki prices API base URL.
pub const WIKI_PRICES_URL: &str = "https://prices.runescape.wiki/api/v1/osrs";

/// Default identification header, as the API's usage policy requires.
pub const DEFAULT_USER_AGENT: &str = "ge-arb-tracker/0.1";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the wiki price client.
#[derive(Debug, Clone)]
pub struct WikiPriceClientConfig {
    /// Base URL for the API.
    pub base_url: String,

    /// User-Agent header sent with every request.
    pub user_agent: String,

    /// How long a fetched price stays valid.
    pub cache_ttl: Duration,

    /// Requests per minute limit.
    pub requests_per_minute: NonZeroU32,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for WikiPriceClientConfig {
    fn default() -> Self {
        Self {
            base_url: WIKI_PRICES_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            cache_ttl: Duration::from_secs(30),
            requests_per_minute: nonzero!(30u32),
            timeout_secs: 10,
        }
    }
}

impl WikiPriceClientConfig {
    /// Builds a configuration from loaded plugin settings.
    #[must_use]
    pub fn from_settings(settings: &ge_arb_core::config::OracleSettings) -> Self {
        Self {
            base_url: settings.base_url.clone(),
            user_agent: settings.user_agent.clone(),
            cache_ttl: Duration::from_secs(settings.cache_ttl_secs),
            timeout_secs: settings.timeout_secs,
            ..Default::default()
        }
    }

    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the User-Agent header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets the cache time-to-live.
    #[must_use]
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }
}

// =============================================================================
// API Response Types
// =============================================================================

/// Raw response from the `/latest` endpoint.
#[derive(Debug, Deserialize)]
struct RawLatestResponse {
    data: HashMap<String, RawLatestEntry>,
}

/// Per-item entry; any field may be null when the item has not traded
/// recently on that side.
#[derive(Debug, Deserialize)]
struct RawLatestEntry {
    high: Option<i32>,
    #[serde(rename = "highTime")]
    high_time: Option<i64>,
    low: Option<i32>,
    #[serde(rename = "lowTime")]
    low_time: Option<i64>,
}

// =============================================================================
// WikiPriceClient
// =============================================================================

/// Cached entry with its fetch time.
struct CachedPrice {
    price: LatestPrice,
    fetched_at: Instant,
}

/// Client for the OSRS Wiki real-time prices API.
///
/// Lookups consult the per-item cache before the network. The cache is
/// read-then-write and tolerates concurrent lookups racing to fill the same
/// entry; the worst case is an extra upstream call, never stale data beyond
/// the TTL.
pub struct WikiPriceClient {
    config: WikiPriceClientConfig,

    http: Client,

    rate_limiter: Arc<
        RateLimiter<
            governor::state::NotKeyed,
            governor::state::InMemoryState,
            governor::clock::DefaultClock,
        >,
    >,

    cache: RwLock<HashMap<i32, CachedPrice>>,
}

impl std::fmt::Debug for WikiPriceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WikiPriceClient")
            .field("base_url", &self.config.base_url)
            .field("cache_ttl", &self.config.cache_ttl)
            .finish_non_exhaustive()
    }
}

impl WikiPriceClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(config: WikiPriceClientConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| OracleError::Network(format!("failed to build HTTP client: {e}")))?;

        let quota = Quota::per_minute(config.requests_per_minute);
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        Ok(Self {
            config,
            http,
            rate_limiter,
            cache: RwLock::new(HashMap::new()),
        })
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Drops all cached prices.
    pub fn clear_cache(&self) {
        self.cache.write().clear();
    }

    /// Fetches the latest price for an item, consulting the cache first.
    ///
    /// # Errors
    /// Returns [`OracleError::NoData`] when the item has no recent trading
    /// activity, and network/API errors otherwise.
    pub async fn latest_price(&self, item_id: i32) -> Result<LatestPrice> {
        if let Some(cached) = self.cache.read().get(&item_id) {
            if cached.fetched_at.elapsed() < self.config.cache_ttl {
                tracing::debug!(item_id, "price cache hit");
                return Ok(cached.price.clone());
            }
        }

        self.rate_limiter.until_ready().await;

        let url = format!("{}/latest", self.config.base_url);
        tracing::debug!(item_id, "GET {}", url);

        let response = self
            .http
            .get(&url)
            .query(&[("id", item_id)])
            .header(reqwest::header::USER_AGENT, &self.config.user_agent)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(OracleError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OracleError::api(status.as_u16(), body));
        }

        let raw: RawLatestResponse = response.json().await?;
        let price = Self::entry_to_price(&raw, item_id)?;

        self.cache.write().insert(
            item_id,
            CachedPrice {
                price: price.clone(),
                fetched_at: Instant::now(),
            },
        );

        tracing::debug!(
            item_id,
            low = price.low,
            high = price.high,
            "fetched latest price"
        );

        Ok(price)
    }

    /// Maps the raw entry for `item_id` to a [`LatestPrice`], classifying
    /// missing items or null fields as no recent trading activity.
    fn entry_to_price(raw: &RawLatestResponse, item_id: i32) -> Result<LatestPrice> {
        let entry = raw
            .data
            .get(&item_id.to_string())
            .ok_or_else(|| OracleError::no_data(item_id))?;

        match (entry.high, entry.high_time, entry.low, entry.low_time) {
            (Some(high), Some(high_time), Some(low), Some(low_time)) => Ok(LatestPrice {
                item_id,
                high,
                high_time,
                low,
                low_time,
            }),
            _ => Err(OracleError::no_data(item_id)),
        }
    }
}

#[async_trait::async_trait]
impl PriceOracle for WikiPriceClient {
    async fn latest_price(&self, item_id: i32) -> anyhow::Result<LatestPrice> {
        Ok(WikiPriceClient::latest_price(self, item_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header_exists, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: String) -> WikiPriceClient {
        WikiPriceClient::new(WikiPriceClientConfig::default().with_base_url(base_url)).unwrap()
    }

    fn latest_body(item_id: i32) -> serde_json::Value {
        serde_json::from_str(&format!(
            r#"{{"data":{{"{item_id}":{{"high":2580000,"highTime":1772000000,"low":2500000,"lowTime":1772000100}}}}}}"#
        ))
        .unwrap()
    }

    #[tokio::test]
    async fn test_latest_price_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/latest"))
            .and(query_param("id", "4151"))
            .and(header_exists("user-agent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(latest_body(4151)))
            .mount(&mock_server)
            .await;

        let client = test_client(mock_server.uri());
        let price = client.latest_price(4151).await.unwrap();

        assert_eq!(price.item_id, 4151);
        assert_eq!(price.low, 2_500_000);
        assert_eq!(price.high, 2_580_000);
        assert_eq!(price.low_time, 1_772_000_100);
    }

    #[tokio::test]
    async fn test_missing_item_is_no_data() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/latest"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": {} })),
            )
            .mount(&mock_server)
            .await;

        let client = test_client(mock_server.uri());
        let err = client.latest_price(4151).await.unwrap_err();

        assert!(matches!(err, OracleError::NoData { item_id: 4151 }));
    }

    #[tokio::test]
    async fn test_null_fields_are_no_data() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/latest"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "data": {
                    "4151": { "high": 2_580_000, "highTime": 1_772_000_000_u64,
                              "low": null, "lowTime": null }
                }
            })))
            .mount(&mock_server)
            .await;

        let client = test_client(mock_server.uri());
        let err = client.latest_price(4151).await.unwrap_err();

        assert!(matches!(err, OracleError::NoData { .. }));
    }

    #[tokio::test]
    async fn test_rate_limit_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/latest"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&mock_server)
            .await;

        let client = test_client(mock_server.uri());
        let err = client.latest_price(4151).await.unwrap_err();

        assert!(matches!(err, OracleError::RateLimited));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_server_error_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/latest"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&mock_server)
            .await;

        let client = test_client(mock_server.uri());
        let err = client.latest_price(4151).await.unwrap_err();

        assert!(matches!(err, OracleError::Api { status_code: 500, .. }));
    }

    #[tokio::test]
    async fn test_cache_prevents_second_fetch() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/latest"))
            .respond_with(ResponseTemplate::new(200).set_body_json(latest_body(554)))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = test_client(mock_server.uri());
        let first = client.latest_price(554).await.unwrap();
        let second = client.latest_price(554).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_clear_cache_forces_refetch() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/latest"))
            .respond_with(ResponseTemplate::new(200).set_body_json(latest_body(554)))
            .expect(2)
            .mount(&mock_server)
            .await;

        let client = test_client(mock_server.uri());
        client.latest_price(554).await.unwrap();
        client.clear_cache();
        client.latest_price(554).await.unwrap();
    }
}
