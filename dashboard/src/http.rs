use std::sync::Arc;

use basket_shared::{Basket, BasketsCreate, ErrorPayload, Order, OrdersCreate, Region};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::{api_connect_timeout, api_http_timeout};

pub const REGIONS_PATH: &str = "/api/regions";
pub const ORDERS_BATCH_PATH: &str = "/api/orders/batch";
pub const BASKETS_BATCH_PATH: &str = "/api/baskets/batch";

const TRANSPORT_STATUS: u16 = 500;
const TRANSPORT_STATUS_TEXT: &str = "Unknown error occurred";

/// Every failed request, whether the backend answered with a non-2xx status
/// or the request never completed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Fetch Error: {status} {status_text}")]
pub struct FetchError {
    pub status: u16,
    pub status_text: String,
    pub data: Option<ErrorPayload>,
}

impl FetchError {
    /// Network, DNS, timeout or decode failure, reported with a synthetic 500.
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: TRANSPORT_STATUS,
            status_text: TRANSPORT_STATUS_TEXT.to_string(),
            data: Some(ErrorPayload::message(message)),
        }
    }

    pub fn from_response(status: StatusCode, body: &[u8]) -> Self {
        Self {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            data: Some(ErrorPayload::from_body(body)),
        }
    }

    /// Server-provided message when there is one, otherwise the error itself.
    pub fn message(&self) -> String {
        self.data
            .as_ref()
            .and_then(ErrorPayload::describe)
            .unwrap_or_else(|| self.to_string())
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(error: reqwest::Error) -> Self {
        Self::transport(error.to_string())
    }
}

/// Thin JSON client for the basket backend. Cheap to clone; clones share the
/// connection pool and cookie jar.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Arc<str>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let request_timeout = api_http_timeout();
        let connect_timeout = api_connect_timeout();
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .user_agent("basket-dashboard/0.1")
            .default_headers(headers.clone())
            .cookie_store(true)
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .build()
            .or_else(|e| {
                warn!(
                    error = %e,
                    "failed to build configured HTTP client, retrying without custom user-agent"
                );
                reqwest::Client::builder()
                    .default_headers(headers)
                    .cookie_store(true)
                    .timeout(request_timeout)
                    .connect_timeout(connect_timeout)
                    .build()
            })?;

        let base_url: String = base_url.into();
        Ok(Self {
            http,
            base_url: Arc::from(base_url.trim_end_matches('/')),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn request<B>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response, FetchError>
    where
        B: Serialize + ?Sized,
    {
        let mut builder = self.http.request(method.clone(), self.url(path));
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            debug!(%method, path, status = status.as_u16(), "request succeeded");
            return Ok(response);
        }

        let body = response.bytes().await.unwrap_or_default();
        Err(FetchError::from_response(status, &body))
    }

    pub async fn get(&self, path: &str) -> Result<Response, FetchError> {
        self.request::<()>(Method::GET, path, None).await
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response, FetchError> {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn put<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response, FetchError> {
        self.request(Method::PUT, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Response, FetchError> {
        self.request::<()>(Method::DELETE, path, None).await
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        decode(self.get(path).await?).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, FetchError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        decode(self.post(path, body).await?).await
    }

    pub async fn fetch_regions(&self) -> Result<Vec<Region>, FetchError> {
        self.get_json(REGIONS_PATH).await
    }

    pub async fn create_orders(
        &self,
        regions: Vec<String>,
        count: Option<u32>,
    ) -> Result<Vec<Order>, FetchError> {
        self.post_json(ORDERS_BATCH_PATH, &OrdersCreate { regions, count })
            .await
    }

    pub async fn create_baskets(&self, orders: Vec<Order>) -> Result<Vec<Basket>, FetchError> {
        self.post_json(BASKETS_BATCH_PATH, &BasketsCreate { orders })
            .await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, FetchError> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes)
        .map_err(|e| FetchError::transport(format!("failed to decode response body: {e}")))
}
