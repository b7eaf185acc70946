//! REST client for the recommendation backend.
//!
//! Auth is bearer-token: `login` (or `register`) stores the token and every
//! later call attaches it. Failed responses are unwrapped into
//! [`BackendError::Api`] carrying the backend's `{"error": ...}` message so
//! callers can surface something readable.

use crate::error::{BackendError, Result};
use crate::types::{
    AuthResponse, RecommendationReply, TradeCreateRequest, TradeCreateResponse,
    TradeUpdateRequest, TradeUpdateResponse,
};
use ge_arb_core::trade::{ActiveTrade, NextAction, TradeStatus};
use ge_arb_core::traits::BackendApi;
use parking_lot::RwLock;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for the backend client.
#[derive(Debug, Clone)]
pub struct BackendClientConfig {
    /// Base URL for the API.
    pub base_url: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for BackendClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 30,
        }
    }
}

impl BackendClientConfig {
    /// Builds a configuration from loaded plugin settings.
    #[must_use]
    pub fn from_settings(settings: &ge_arb_core::config::BackendSettings) -> Self {
        Self {
            base_url: settings.api_url.clone(),
            timeout_secs: settings.timeout_secs,
        }
    }

    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

// =============================================================================
// BackendClient
// =============================================================================

/// Error body the backend returns on failed requests.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Client for the arbitrage backend REST API.
pub struct BackendClient {
    config: BackendClientConfig,

    http: Client,

    /// Bearer token captured at login.
    token: RwLock<Option<String>>,
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("base_url", &self.config.base_url)
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

impl BackendClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(config: BackendClientConfig) -> Result<Self> {
        let base_url = config.base_url.trim_end_matches('/').to_string();
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BackendError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            config: BackendClientConfig { base_url, ..config },
            http,
            token: RwLock::new(None),
        })
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Returns true once a bearer token is held.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.read().is_some()
    }

    /// Replaces the stored bearer token.
    pub fn set_token(&self, token: impl Into<String>) {
        *self.token.write() = Some(token.into());
    }

    /// Registers a new account and stores the returned token.
    ///
    /// # Errors
    /// Returns [`BackendError::Api`] with the backend's message on rejection.
    pub async fn register(&self, email: &str, password: &str) -> Result<AuthResponse> {
        let body = serde_json::json!({ "email": email, "password": password });
        let response: AuthResponse = self.post("/auth/register", &body, false).await?;
        self.set_token(response.token.clone());
        tracing::info!("registered and authenticated");
        Ok(response)
    }

    /// Logs in and stores the returned token.
    ///
    /// # Errors
    /// Returns [`BackendError::Api`] with the backend's message on rejection.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse> {
        let body = serde_json::json!({ "email": email, "password": password });
        let response: AuthResponse = self.post("/auth/login", &body, false).await?;
        self.set_token(response.token.clone());
        tracing::info!("login successful");
        Ok(response)
    }

    /// Fetches a recommendation, or a wait notice while a trade is active.
    ///
    /// # Errors
    /// Returns an error for auth or transport failures.
    pub async fn recommendation(
        &self,
        runescape_username: &str,
        available_gp: i64,
        available_ge_slots: u8,
    ) -> Result<RecommendationReply> {
        let url = format!("{}/recommendations", self.config.base_url);
        let request = self
            .http
            .get(&url)
            .query(&[
                ("runescape_username", runescape_username.to_string()),
                ("available_gp", available_gp.to_string()),
                ("available_ge_slots", available_ge_slots.to_string()),
            ])
            .bearer_auth(self.require_token()?);

        self.execute(request).await
    }

    /// Creates a trade record for a placed buy order.
    ///
    /// # Errors
    /// Returns an error for auth, transport, or backend rejection.
    pub async fn create_trade(
        &self,
        item_id: i32,
        buy_price: i32,
        buy_quantity: i32,
    ) -> Result<TradeCreateResponse> {
        let body = TradeCreateRequest {
            item_id,
            buy_price,
            buy_quantity,
        };
        let response: TradeCreateResponse = self
            .post("/trades/create", &serde_json::to_value(&body)?, true)
            .await?;

        tracing::info!(trade_id = response.trade_id, item_id, "trade created");
        Ok(response)
    }

    /// Reports a trade status change.
    ///
    /// # Errors
    /// Returns an error for auth, transport, or backend rejection.
    pub async fn update_trade(
        &self,
        trade_id: i64,
        status: TradeStatus,
        quantity_filled: i32,
    ) -> Result<TradeUpdateResponse> {
        let body = TradeUpdateRequest {
            status,
            quantity_filled,
        };
        let path = format!("/trades/{trade_id}/update");
        let response: TradeUpdateResponse =
            self.post(&path, &serde_json::to_value(&body)?, true).await?;

        tracing::info!(trade_id, status = %status, action = ?response.action, "trade updated");
        Ok(response)
    }

    /// Fetches the zero-or-one currently active trade.
    ///
    /// # Errors
    /// Returns an error for auth or transport failures.
    pub async fn active_trade(&self) -> Result<Option<ActiveTrade>> {
        let url = format!("{}/trades/active", self.config.base_url);
        let request = self.http.get(&url).bearer_auth(self.require_token()?);

        let trades: Vec<ActiveTrade> = self.execute(request).await?;
        Ok(trades.into_iter().next())
    }

    // ==================== HTTP helpers ====================

    fn require_token(&self) -> Result<String> {
        self.token
            .read()
            .clone()
            .ok_or(BackendError::NotAuthenticated)
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
        requires_auth: bool,
    ) -> Result<T> {
        let url = format!("{}{}", self.config.base_url, path);
        let mut request = self.http.post(&url).json(body);

        if requires_auth {
            request = request.bearer_auth(self.require_token()?);
        }

        self.execute(request).await
    }

    async fn execute<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // Prefer the backend's structured error message, fall back to
            // the raw body.
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            tracing::warn!(status = status.as_u16(), "backend request failed: {message}");
            return Err(BackendError::api(status.as_u16(), message));
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait::async_trait]
impl BackendApi for BackendClient {
    async fn create_trade(
        &self,
        item_id: i32,
        buy_price: i32,
        buy_quantity: i32,
    ) -> anyhow::Result<i64> {
        let response = BackendClient::create_trade(self, item_id, buy_price, buy_quantity).await?;
        Ok(response.trade_id)
    }

    async fn update_trade(
        &self,
        trade_id: i64,
        status: TradeStatus,
        quantity_filled: i32,
    ) -> anyhow::Result<NextAction> {
        let response =
            BackendClient::update_trade(self, trade_id, status, quantity_filled).await?;
        Ok(response.action)
    }

    async fn active_trade(&self) -> anyhow::Result<Option<ActiveTrade>> {
        Ok(BackendClient::active_trade(self).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: String) -> BackendClient {
        BackendClient::new(BackendClientConfig::default().with_base_url(base_url)).unwrap()
    }

    #[tokio::test]
    async fn test_login_stores_token() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .and(body_partial_json(serde_json::json!({
                "email": "user@example.com"
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "token": "tok-123" })),
            )
            .mount(&mock_server)
            .await;

        let client = test_client(mock_server.uri());
        assert!(!client.is_authenticated());

        let response = client.login("user@example.com", "hunter2").await.unwrap();
        assert_eq!(response.token, "tok-123");
        assert!(client.is_authenticated());
    }

    #[tokio::test]
    async fn test_login_failure_unwraps_error_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": "invalid credentials"
            })))
            .mount(&mock_server)
            .await;

        let client = test_client(mock_server.uri());
        let err = client.login("user@example.com", "wrong").await.unwrap_err();

        assert!(matches!(
            err,
            BackendError::Api { status_code: 401, ref message } if message == "invalid credentials"
        ));
    }

    #[tokio::test]
    async fn test_create_trade_sends_bearer_token() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/trades/create"))
            .and(header("authorization", "Bearer tok-123"))
            .and(body_partial_json(serde_json::json!({
                "item_id": 4151,
                "buy_price": 2_500_000,
                "buy_quantity": 1
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "trade_id": 42,
                "status": "buying",
                "item_id": 4151,
                "buy_price": 2_500_000,
                "buy_quantity": 1
            })))
            .mount(&mock_server)
            .await;

        let client = test_client(mock_server.uri());
        client.set_token("tok-123");

        let response = client.create_trade(4151, 2_500_000, 1).await.unwrap();
        assert_eq!(response.trade_id, 42);
        assert_eq!(response.status, TradeStatus::Buying);
    }

    #[tokio::test]
    async fn test_create_trade_without_login_fails_locally() {
        let mock_server = MockServer::start().await;
        let client = test_client(mock_server.uri());

        let err = client.create_trade(4151, 2_500_000, 1).await.unwrap_err();
        assert!(matches!(err, BackendError::NotAuthenticated));
    }

    #[tokio::test]
    async fn test_update_trade_posts_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/trades/42/update"))
            .and(body_partial_json(serde_json::json!({
                "status": "bought",
                "quantity_filled": 1
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "success": true,
                "trade": null,
                "action": "sell",
                "sell_price": 2_580_000
            })))
            .mount(&mock_server)
            .await;

        let client = test_client(mock_server.uri());
        client.set_token("tok-123");

        let response = client.update_trade(42, TradeStatus::Bought, 1).await.unwrap();
        assert_eq!(response.action, NextAction::Sell);
        assert_eq!(response.sell_price, Some(2_580_000));
    }

    #[tokio::test]
    async fn test_active_trade_empty_array_is_none() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/trades/active"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&mock_server)
            .await;

        let client = test_client(mock_server.uri());
        client.set_token("tok-123");

        assert!(client.active_trade().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_active_trade_returns_first_entry() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/trades/active"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
                "trade_id": 7,
                "item_id": 4151,
                "item_name": "Abyssal whip",
                "buy_price": 2_500_000,
                "sell_price": 2_580_000,
                "buy_quantity": 1,
                "status": "bought",
                "buy_quantity_filled": 1,
                "sell_quantity_filled": 0
            }])))
            .mount(&mock_server)
            .await;

        let client = test_client(mock_server.uri());
        client.set_token("tok-123");

        let trade = client.active_trade().await.unwrap().unwrap();
        assert_eq!(trade.trade_id, 7);
        assert_eq!(trade.status, TradeStatus::Bought);
    }

    #[tokio::test]
    async fn test_recommendation_sends_query_params() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/recommendations"))
            .and(query_param("runescape_username", "Zezima"))
            .and(query_param("available_gp", "10000000"))
            .and(query_param("available_ge_slots", "8"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "item_id": 554, "item_name": "Fire rune", "buy_price": 5,
                "sell_price": 6, "buy_quantity": 1000, "margin": 1,
                "ge_limit": 50000, "ml_score": 0.7, "expected_profit": 1000,
                "expected_roi_percent": 20.0, "volume_24h": 1000000
            })))
            .mount(&mock_server)
            .await;

        let client = test_client(mock_server.uri());
        client.set_token("tok-123");

        let reply = client.recommendation("Zezima", 10_000_000, 8).await.unwrap();
        assert!(matches!(
            reply,
            RecommendationReply::Ready(ref rec) if rec.item_id == 554
        ));
    }
}
