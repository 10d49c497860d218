//! Remote cache transport speaking the cache service's HTTP API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::info;

use crate::cache::{CacheClient, KeyTtl, ReconnectPolicy};
use crate::error::{CacheError, Result};
use crate::models::{
    DeletePatternResponse, DeleteResponse, ErrorResponse, ExistsResponse, FlushResponse,
    GetResponse, IncrRequest, IncrResponse, PatternRequest, SetRequest, TtlResponse,
};

/// Header carrying the admin token for `POST /flush`.
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Client for a remote cache service.
///
/// Only obtainable through [`HttpCache::connect`], so no command is ever sent
/// before the connection has been established once.
#[derive(Debug, Clone)]
pub struct HttpCache {
    client: Client,
    base_url: Url,
    admin_token: Option<String>,
    policy: ReconnectPolicy,
}

impl HttpCache {
    /// Connects to the cache service, probing `/health` under the backoff
    /// policy. Fails with `CacheError::Connection` once attempts run out.
    pub async fn connect(
        base_url: &str,
        policy: ReconnectPolicy,
        admin_token: Option<String>,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| CacheError::InvalidRequest(format!("invalid cache url '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(CacheError::InvalidRequest(format!(
                "cache url '{}' cannot be a base",
                base_url
            )));
        }

        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| CacheError::Connection(e.to_string()))?;

        let cache = Self {
            client,
            base_url,
            admin_token,
            policy,
        };

        let probe = &cache;
        probe
            .policy
            .retry("cache connect", move || async move {
                let response = probe.send(probe.client.get(probe.endpoint(&["health"])?)).await?;
                expect_success(response, "health").await.map(|_| ())
            })
            .await?;

        info!("Connected to cache service at {}", cache.base_url);
        Ok(cache)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CacheError::InvalidRequest(format!("{} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        request.send().await.map_err(transport_error)
    }

    async fn json<T: DeserializeOwned>(response: Response) -> Result<T> {
        response
            .json()
            .await
            .map_err(|e| CacheError::Serialization(e.to_string()))
    }
}

fn transport_error(err: reqwest::Error) -> CacheError {
    if err.is_connect() || err.is_timeout() || err.is_request() {
        CacheError::Connection(err.to_string())
    } else {
        CacheError::Command(err.to_string())
    }
}

/// Passes 2xx responses through and maps everything else to a `CacheError`.
async fn expect_success(response: Response, key: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .json::<ErrorResponse>()
        .await
        .map(|body| body.error)
        .unwrap_or_else(|_| status.to_string());

    Err(match status {
        StatusCode::NOT_FOUND => CacheError::NotFound(key.to_string()),
        StatusCode::BAD_REQUEST => CacheError::InvalidRequest(message),
        StatusCode::FORBIDDEN => CacheError::Forbidden(message),
        StatusCode::CONFLICT => CacheError::NotAnInteger(key.to_string()),
        StatusCode::SERVICE_UNAVAILABLE => CacheError::CacheFull(message),
        StatusCode::BAD_GATEWAY | StatusCode::GATEWAY_TIMEOUT => CacheError::Connection(message),
        _ => CacheError::Command(format!("{}: {}", status, message)),
    })
}

#[async_trait]
impl CacheClient for HttpCache {
    fn backend_name(&self) -> &'static str {
        "http"
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.policy
            .retry("cache get", move || async move {
                let response = self.send(self.client.get(self.endpoint(&["get", key])?)).await?;
                if response.status() == StatusCode::NOT_FOUND {
                    return Ok(None);
                }
                let body: GetResponse = Self::json(expect_success(response, key).await?).await?;
                Ok(Some(body.value))
            })
            .await
    }

    async fn set(&self, key: &str, value: String, ttl_secs: Option<u64>) -> Result<()> {
        let body = SetRequest {
            key: key.to_string(),
            value,
            ttl: ttl_secs,
        };
        let body = &body;
        self.policy
            .retry("cache set", move || async move {
                let request = self.client.put(self.endpoint(&["set"])?).json(body);
                expect_success(self.send(request).await?, key).await.map(|_| ())
            })
            .await
    }

    async fn del(&self, key: &str) -> Result<bool> {
        self.policy
            .retry("cache del", move || async move {
                let response = self.send(self.client.delete(self.endpoint(&["del", key])?)).await?;
                let body: DeleteResponse = Self::json(expect_success(response, key).await?).await?;
                Ok(body.deleted)
            })
            .await
    }

    async fn del_pattern(&self, pattern: &str) -> Result<usize> {
        let body = PatternRequest {
            pattern: pattern.to_string(),
        };
        let body = &body;
        self.policy
            .retry("cache del-pattern", move || async move {
                let request = self.client.post(self.endpoint(&["del-pattern"])?).json(body);
                let response = expect_success(self.send(request).await?, pattern).await?;
                let removed: DeletePatternResponse = Self::json(response).await?;
                Ok(removed.deleted)
            })
            .await
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        self.policy
            .retry("cache exists", move || async move {
                let response = self.send(self.client.get(self.endpoint(&["exists", key])?)).await?;
                let body: ExistsResponse = Self::json(expect_success(response, key).await?).await?;
                Ok(body.exists)
            })
            .await
    }

    async fn incr(&self, key: &str, ttl_on_create: Option<u64>) -> Result<i64> {
        let body = IncrRequest {
            key: key.to_string(),
            ttl: ttl_on_create,
        };
        let body = &body;
        // A retried INCR whose response was lost may count twice
        self.policy
            .retry("cache incr", move || async move {
                let request = self.client.post(self.endpoint(&["incr"])?).json(body);
                let response = expect_success(self.send(request).await?, key).await?;
                let counter: IncrResponse = Self::json(response).await?;
                Ok(counter.value)
            })
            .await
    }

    async fn ttl(&self, key: &str) -> Result<KeyTtl> {
        self.policy
            .retry("cache ttl", move || async move {
                let response = self.send(self.client.get(self.endpoint(&["ttl", key])?)).await?;
                let body: TtlResponse = Self::json(expect_success(response, key).await?).await?;
                Ok(KeyTtl::from_seconds(body.ttl))
            })
            .await
    }

    async fn flush(&self) -> Result<usize> {
        self.policy
            .retry("cache flush", move || async move {
                let mut request = self.client.post(self.endpoint(&["flush"])?);
                if let Some(token) = &self.admin_token {
                    request = request.header(ADMIN_TOKEN_HEADER, token);
                }
                let response = expect_success(self.send(request).await?, "*").await?;
                let body: FlushResponse = Self::json(response).await?;
                Ok(body.flushed)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_rejects_invalid_url() {
        let result = HttpCache::connect("not a url", ReconnectPolicy::default(), None).await;
        assert!(matches!(result, Err(CacheError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_connect_gives_up_on_unreachable_service() {
        // Bind then drop to obtain a port with nothing listening
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let policy = ReconnectPolicy {
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            max_attempts: 2,
        };
        let result = HttpCache::connect(&format!("http://{}", addr), policy, None).await;
        assert!(matches!(result, Err(CacheError::Connection(_))));
    }
}
