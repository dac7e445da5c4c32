//! Verb-per-method JSON client producing `ApiResponse` envelopes.
//!
//! # Design
//! `JsonClient` holds a `ClientConfig` and a `Transport` and carries no
//! mutable state between calls. Every operation follows the same path:
//! resolve the target, encode the body (if any), perform exactly one round
//! trip, then branch on the status.
//!
//! - 2xx: operations with a response type decode the body case-insensitively
//!   into it; the others ignore the body.
//! - anything else: the body is never decoded; the envelope is returned with
//!   `succeeded == false` and no payload.
//!
//! A body that fails to decode on a 2xx is returned as
//! `ClientError::Deserialization`, never folded into a failed envelope.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::config::ClientConfig;
use crate::envelope::ApiResponse;
use crate::error::{ClientError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, ReqwestTransport, Transport};
use crate::json;

/// Async JSON client over a pluggable `Transport`.
///
/// Cloning is cheap when the transport is (`ReqwestTransport` shares its
/// connection pool). A single client may serve concurrent calls.
#[derive(Debug, Clone)]
pub struct JsonClient<T = ReqwestTransport> {
    config: ClientConfig,
    transport: T,
}

impl JsonClient<ReqwestTransport> {
    /// A reqwest-backed client resolving relative targets against `base_url`.
    pub fn new(base_url: &str) -> Self {
        Self::from_config(ClientConfig::new().with_base_url(base_url))
    }

    pub fn from_config(config: ClientConfig) -> Self {
        Self::with_transport(config, ReqwestTransport::new())
    }
}

impl<T: Transport> JsonClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// GET `url` and decode a 2xx body into `Resp`.
    pub async fn get<Resp: DeserializeOwned>(&self, url: &str) -> Result<ApiResponse<Resp>> {
        let request = HttpRequest::bodiless(HttpMethod::Get, self.config.resolve(url)?);
        self.send_expecting(request).await
    }

    /// Same contract as `get`; `name` labels the call in log output.
    pub async fn get_named<Resp: DeserializeOwned>(
        &self,
        name: &str,
        url: &str,
    ) -> Result<ApiResponse<Resp>> {
        debug!(call = name, url, "named GET");
        self.get(url).await
    }

    /// POST `body` as JSON. The response body is never decoded.
    pub async fn post_no_response<Req>(&self, url: &str, body: &Req) -> Result<ApiResponse<()>>
    where
        Req: Serialize + ?Sized,
    {
        let request = self.json_request(HttpMethod::Post, url, body)?;
        self.send_discarding(request).await
    }

    /// POST `body` as JSON and decode a 2xx body into `Resp`.
    pub async fn post_with_response<Req, Resp>(
        &self,
        url: &str,
        body: &Req,
    ) -> Result<ApiResponse<Resp>>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let request = self.json_request(HttpMethod::Post, url, body)?;
        self.send_expecting(request).await
    }

    /// PUT `body` as JSON. The response body is never decoded.
    pub async fn put<Req>(&self, url: &str, body: &Req) -> Result<ApiResponse<()>>
    where
        Req: Serialize + ?Sized,
    {
        let request = self.json_request(HttpMethod::Put, url, body)?;
        self.send_discarding(request).await
    }

    /// DELETE `url`. The response body is never decoded.
    pub async fn delete(&self, url: &str) -> Result<ApiResponse<()>> {
        let request = HttpRequest::bodiless(HttpMethod::Delete, self.config.resolve(url)?);
        self.send_discarding(request).await
    }

    fn json_request<Req>(&self, method: HttpMethod, url: &str, body: &Req) -> Result<HttpRequest>
    where
        Req: Serialize + ?Sized,
    {
        let url = self.config.resolve(url)?;
        let body = json::to_json(body).map_err(ClientError::Serialization)?;
        Ok(HttpRequest::json(method, url, body))
    }

    async fn send(&self, request: HttpRequest) -> Result<Arc<HttpResponse>> {
        let method = request.method;
        let url = request.url.clone();
        debug!(%method, %url, "dispatching request");

        let response = self.transport.execute(request).await?;
        debug!(
            %method,
            %url,
            status = response.status,
            succeeded = response.is_success(),
            content_type = response.header("content-type").unwrap_or_default(),
            "response received"
        );
        Ok(Arc::new(response))
    }

    async fn send_expecting<Resp: DeserializeOwned>(
        &self,
        request: HttpRequest,
    ) -> Result<ApiResponse<Resp>> {
        let raw = self.send(request).await?;
        if !raw.is_success() {
            return Ok(ApiResponse::failure(raw));
        }
        let payload = json::from_json(&raw.body).map_err(|source| {
            ClientError::Deserialization {
                status: raw.status,
                source,
            }
        })?;
        Ok(ApiResponse::success(Some(payload), raw))
    }

    async fn send_discarding(&self, request: HttpRequest) -> Result<ApiResponse<()>> {
        let raw = self.send(request).await?;
        if raw.is_success() {
            Ok(ApiResponse::success(None, raw))
        } else {
            Ok(ApiResponse::failure(raw))
        }
    }
}
