//! HTTP transport implementation using reqwest.
//!
//! Implements the `HttpTransport` port. Relative request URLs are resolved
//! against the configured base URL, JSON bodies are encoded here, and the
//! client keeps a cookie jar so the refresh endpoint can read the
//! server-set refresh cookie.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use lyceum_application::{GatewayConfig, HttpClientError, HttpTransport};
use lyceum_domain::{Headers, HttpMethod, RequestSpec, ResponseSpec};
use reqwest::{Client, Method, Url};

const MAX_REDIRECTS: usize = 10;

/// HTTP transport backed by `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Client,
    base_url: String,
    timeout_ms: u64,
}

impl ReqwestHttpClient {
    /// Creates a transport for the API described by `config`.
    ///
    /// - follows up to 10 redirects
    /// - stores cookies across calls
    /// - applies `config.timeout_ms` to every call
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not absolute or the client
    /// cannot be created.
    pub fn new(config: &GatewayConfig) -> Result<Self, HttpClientError> {
        let client = Client::builder()
            .user_agent(concat!("lyceum/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .cookie_store(true)
            .build()
            .map_err(|e| HttpClientError::Other(e.to_string()))?;

        Self::with_client(client, config)
    }

    /// Creates a transport around an existing `reqwest::Client`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not absolute.
    pub fn with_client(client: Client, config: &GatewayConfig) -> Result<Self, HttpClientError> {
        Url::parse(&config.base_url)
            .map_err(|e| HttpClientError::InvalidUrl(format!("{e}: {}", config.base_url)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout_ms: config.timeout_ms,
        })
    }

    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    /// Resolves the request URL against the base URL and appends the
    /// query parameters.
    ///
    /// Absolute URLs are used as they are. Relative ones are appended to
    /// the base path, so `/students` against `http://host/api/v1` becomes
    /// `http://host/api/v1/students`.
    fn resolve_url(&self, request: &RequestSpec) -> Result<Url, HttpClientError> {
        let raw = request.url.trim();
        let joined = if raw.starts_with("http://") || raw.starts_with("https://") {
            raw.to_string()
        } else {
            format!("{}/{}", self.base_url, raw.trim_start_matches('/'))
        };

        let mut url =
            Url::parse(&joined).map_err(|e| HttpClientError::InvalidUrl(format!("{e}: {joined}")))?;

        if !request.params.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(request.params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        Ok(url)
    }

    fn map_error(error: &reqwest::Error, timeout_ms: u64) -> HttpClientError {
        if error.is_timeout() {
            return HttpClientError::Timeout { timeout_ms };
        }

        if error.is_builder() {
            return HttpClientError::InvalidUrl(error.to_string());
        }

        if error.is_connect() {
            let message = error.to_string();
            let lowered = message.to_lowercase();
            let host = error
                .url()
                .and_then(Url::host_str)
                .unwrap_or("unknown")
                .to_string();

            if lowered.contains("dns") || lowered.contains("resolve") {
                return HttpClientError::DnsError { host, message };
            }
            if lowered.contains("refused") {
                let port = error
                    .url()
                    .and_then(Url::port_or_known_default)
                    .unwrap_or(80);
                return HttpClientError::ConnectionRefused { host, port };
            }
            return HttpClientError::ConnectionFailed(message);
        }

        if error.is_redirect() {
            return HttpClientError::TooManyRedirects { max: MAX_REDIRECTS };
        }

        HttpClientError::Other(error.to_string())
    }
}

#[async_trait]
impl HttpTransport for ReqwestHttpClient {
    async fn execute(&self, request: &RequestSpec) -> Result<ResponseSpec, HttpClientError> {
        let url = self.resolve_url(request)?;
        let timeout_ms = self.timeout_ms;

        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method), url)
            .timeout(Duration::from_millis(timeout_ms));

        for header in request.headers.iter() {
            builder = builder.header(&header.name, &header.value);
        }

        if let Some(body) = &request.body {
            let bytes =
                serde_json::to_vec(body).map_err(|e| HttpClientError::InvalidBody(e.to_string()))?;
            if !request.headers.contains("content-type") {
                builder = builder.header("Content-Type", "application/json");
            }
            builder = builder.body(bytes);
        }

        let start = Instant::now();
        let response = builder
            .send()
            .await
            .map_err(|e| Self::map_error(&e, timeout_ms))?;

        let status = response.status().as_u16();
        let headers: Headers = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("<binary>").to_string()))
            .collect();

        let body = response
            .bytes()
            .await
            .map_err(|e| Self::map_error(&e, timeout_ms))?
            .to_vec();

        Ok(ResponseSpec::new(status, headers, body, start.elapsed()))
    }
}
