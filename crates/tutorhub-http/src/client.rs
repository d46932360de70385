//! Authenticated REST client

use std::{fmt, sync::Arc};

use reqwest::{header, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::{
    config::HttpConfig,
    error::{ApiError, Result},
    request::{ApiRequest, RequestBody},
    session::SessionProvider,
};

/// REST client bound to one backend base URL
///
/// Cloning is cheap; clones share the connection pool. A client built with
/// [`ApiClient::with_session`] attaches bearer tokens to `require_auth`
/// requests and recovers from a 401 with at most one refresh-then-retry.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ClientInner>,
    session: Option<Arc<dyn SessionProvider>>,
}

struct ClientInner {
    http: reqwest::Client,
    base_url: String,
    config: HttpConfig,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .field("authenticated", &self.session.is_some())
            .finish()
    }
}

impl ApiClient {
    /// Create an anonymous client for the given base URL
    pub fn new(config: HttpConfig, base_url: &str) -> Result<Self> {
        let parsed = base_url
            .parse::<url::Url>()
            .map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidUrl(format!(
                "{base_url}: unsupported scheme {}",
                parsed.scheme()
            )));
        }

        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .pool_idle_timeout(config.pool_idle_timeout)
            .redirect(if config.max_redirects > 0 {
                reqwest::redirect::Policy::limited(config.max_redirects)
            } else {
                reqwest::redirect::Policy::none()
            });

        if let Some(proxy_url) = &config.proxy {
            check_proxy(proxy_url)?;
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| ApiError::InvalidProxy(e.to_string()))?;
            builder = builder.proxy(proxy);
        }

        let http = builder
            .build()
            .map_err(|e| ApiError::BuildError(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http,
                base_url: base_url.trim_end_matches('/').to_string(),
                config,
            }),
            session: None,
        })
    }

    /// Client sharing this connection pool that authenticates through `provider`
    pub fn with_session(&self, provider: Arc<dyn SessionProvider>) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            session: Some(provider),
        }
    }

    /// Client sharing this connection pool without a session
    pub fn anonymous(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            session: None,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    pub fn config(&self) -> &HttpConfig {
        &self.inner.config
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Absolute URL of a request, query included
    pub fn url_for(&self, request: &ApiRequest) -> Result<url::Url> {
        let raw = format!("{}{}", self.inner.base_url, request.path);
        let mut url = raw
            .parse::<url::Url>()
            .map_err(|e| ApiError::InvalidUrl(format!("{raw}: {e}")))?;
        if !request.query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(request.query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        Ok(url)
    }

    /// Send a request and decode the JSON response
    pub async fn send<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T> {
        let response = self.send_raw(request).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|source| ApiError::Network { source })?;
        serde_json::from_slice(&bytes).map_err(|e| {
            warn!(path = %request.path, "Response decode failed: {e}");
            ApiError::Decode(e.to_string())
        })
    }

    /// Send a request and ignore the response body
    pub async fn send_empty(&self, request: &ApiRequest) -> Result<()> {
        self.send_raw(request).await.map(|_| ())
    }

    /// Fire a request without waiting for it; failures are only logged
    pub fn send_detached(&self, request: ApiRequest) -> JoinHandle<()> {
        let client = self.clone();
        tokio::spawn(async move {
            if let Err(e) = client.send_empty(&request).await {
                warn!(path = %request.path, "Detached request failed: {e}");
            }
        })
    }

    /// Perform the call with the single 401 refresh-and-retry
    async fn send_raw(&self, request: &ApiRequest) -> Result<Response> {
        let mut response = self.execute(request).await?;

        if response.status() == StatusCode::UNAUTHORIZED && request.require_auth {
            let refreshed = match &self.session {
                Some(session) => session.refresh_session().await,
                None => false,
            };

            if !refreshed {
                warn!(path = %request.path, "Session refresh failed, request rejected");
                if let Some(session) = &self.session {
                    session.on_unauthorized();
                }
                return Err(ApiError::unauthorized("Unauthorized"));
            }

            debug!(path = %request.path, "Retrying request after session refresh");
            response = self.execute(request).await?;
        }

        let status = response.status();
        if !status.is_success() {
            let body = response.json::<Value>().await.ok();
            debug!(path = %request.path, %status, "Request failed");
            return Err(ApiError::from_response(status, body));
        }

        Ok(response)
    }

    /// One network attempt
    async fn execute(&self, request: &ApiRequest) -> Result<Response> {
        let url = self.url_for(request)?;
        debug!("HTTP {} {}", request.method, url.path());

        let mut builder = self
            .inner
            .http
            .request(request.method.clone(), url)
            .header(header::ACCEPT, "application/json");

        if request.require_auth {
            let token = self
                .session
                .as_ref()
                .and_then(|s| s.access_token())
                .ok_or_else(|| ApiError::unauthorized("Not authenticated"))?;
            builder = builder.bearer_auth(token);
        }

        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Form(form) => builder.multipart(form.to_multipart()?),
        };

        builder
            .send()
            .await
            .map_err(|source| ApiError::Network { source })
    }
}

/// reqwest treats a bare word as a host name, so the scheme is checked here
fn check_proxy(proxy_url: &str) -> Result<()> {
    let parsed = proxy_url
        .parse::<url::Url>()
        .map_err(|e| ApiError::InvalidProxy(format!("{proxy_url}: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https" | "socks5" | "socks5h") {
        return Err(ApiError::InvalidProxy(format!(
            "{proxy_url}: unsupported scheme {}",
            parsed.scheme()
        )));
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(ApiError::InvalidProxy(format!("{proxy_url}: missing host")));
    }
    Ok(())
}
