//! [`RemoteTaxService`] over the AvaTax REST v2 API.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, RETRY_AFTER};
use reqwest::{Method, RequestBuilder};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde_json::{json, Value};
use taxsvc::{Address, NormalizedRequest, RemoteTaxService, TaxError, TransactionCode};
use url::Url;

use crate::AvaTaxConfig;

/// Header AvaTax uses to identify the calling integration.
pub const CLIENT_HEADER: &str = "X-Avalara-Client";

/// Longest slice of a non-JSON error body kept in an error message.
const MAX_ERROR_BODY: usize = 200;

/// HTTP client for the four AvaTax calls the adapter needs.
///
/// Cheap to share: the inner `reqwest::Client` pools connections and the
/// configuration is behind an `Arc`.
#[derive(Debug, Clone)]
pub struct AvaTaxClient {
    http: reqwest::Client,
    config: Arc<AvaTaxConfig>,
    base_url: Url,
}

impl AvaTaxClient {
    /// Builds a client for `config`.
    ///
    /// # Errors
    ///
    /// [`TaxError::Unexpected`] if the base URL cannot carry a path, the client
    /// header contains characters not allowed in HTTP headers, or the TLS
    /// backend fails to initialise.
    pub fn new(config: Arc<AvaTaxConfig>) -> Result<Self, TaxError> {
        let base_url = config
            .base_url()
            .map_err(|e| TaxError::unexpected(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(TaxError::unexpected(format!(
                "AvaTax endpoint {base_url} cannot be used as a base URL"
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client_header = HeaderValue::from_str(&config.client_header())
            .map_err(|e| TaxError::unexpected(format!("invalid {CLIENT_HEADER} header: {e}")))?;
        headers.insert(CLIENT_HEADER, client_header);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| TaxError::unexpected(format!("failed to build HTTP client: {e}")))?;

        tracing::debug!(
            base_url = %base_url,
            environment = %config.environment,
            company = %config.company_code,
            "AvaTax client created"
        );
        Ok(Self {
            http,
            config,
            base_url,
        })
    }

    /// `base_url` followed by `segments`, each percent-encoded.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http.request(method, url).basic_auth(
            &self.config.account_id,
            Some(self.config.license_key.expose_secret()),
        )
    }

    async fn post_json<B>(
        &self,
        operation: &'static str,
        url: Url,
        body: &B,
    ) -> Result<Value, TaxError>
    where
        B: Serialize + ?Sized,
    {
        self.send(operation, self.request(Method::POST, url).json(body))
            .await
    }

    async fn send(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<Value, TaxError> {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        let retry_after = retry_after(response.headers());
        let text = response.text().await.map_err(transport_error)?;
        tracing::debug!(operation, status = status.as_u16(), "AvaTax responded");

        let parsed = serde_json::from_str::<Value>(&text);
        if status.is_success() {
            return match parsed {
                Ok(body) if body.is_object() => Ok(body),
                Ok(_) => Err(TaxError::unexpected(format!(
                    "AvaTax {operation} response is not a JSON object"
                ))),
                Err(e) => Err(TaxError::unexpected(format!(
                    "AvaTax {operation} response is not valid JSON: {e}"
                ))),
            };
        }

        match parsed {
            Ok(body) if body.is_object() => Err(TaxError::RemoteRejection {
                status: status.as_u16(),
                body,
                retry_after,
            }),
            _ => Err(TaxError::Unexpected {
                message: format!("AvaTax returned HTTP {status}: {}", truncate(&text)),
                transient: status.is_server_error(),
            }),
        }
    }
}

#[async_trait]
impl RemoteTaxService for AvaTaxClient {
    async fn create_or_adjust_transaction(
        &self,
        request: &NormalizedRequest,
    ) -> Result<Value, TaxError> {
        let url = self.endpoint(&["api", "v2", "transactions", "createoradjust"]);
        self.post_json("create_or_adjust_transaction", url, request)
            .await
    }

    async fn void_transaction(&self, code: &TransactionCode) -> Result<Value, TaxError> {
        let url = self.endpoint(&[
            "api",
            "v2",
            "companies",
            self.config.company_code.as_str(),
            "transactions",
            code.as_str(),
            "void",
        ]);
        self.post_json("void_transaction", url, &json!({"code": "DocVoided"}))
            .await
    }

    async fn resolve_address(&self, address: &Address) -> Result<Value, TaxError> {
        let url = self.endpoint(&["api", "v2", "addresses", "resolve"]);
        self.post_json("resolve_address", url, address).await
    }

    async fn ping(&self) -> Result<Value, TaxError> {
        let url = self.endpoint(&["api", "v2", "utilities", "ping"]);
        self.send("ping", self.request(Method::GET, url)).await
    }
}

fn transport_error(e: reqwest::Error) -> TaxError {
    TaxError::Unexpected {
        message: format!("request to AvaTax failed: {e}"),
        transient: e.is_timeout() || e.is_connect(),
    }
}

/// `Retry-After` in its delay-seconds form. HTTP-date values are ignored.
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

fn truncate(text: &str) -> String {
    text.chars().take(MAX_ERROR_BODY).collect()
}
