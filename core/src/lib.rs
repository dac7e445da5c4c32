//! Async JSON client that wraps every call in a uniform result envelope.
//!
//! # Overview
//! `JsonClient` issues GET/POST/PUT/DELETE requests, encodes request bodies as
//! JSON, decodes 2xx response bodies into caller-chosen types, and returns an
//! `ApiResponse` carrying the success flag, the optional payload, and the raw
//! response.
//!
//! # Design
//! - Two failure channels are kept apart. A non-2xx status is a normal
//!   outcome: `Ok(envelope)` with `succeeded() == false` and no payload. A 2xx
//!   body that does not decode is `Err(ClientError::Deserialization)`.
//! - The network sits behind the `Transport` trait. `ReqwestTransport` is the
//!   default; tests substitute an in-memory transport.
//! - Response field names are matched case-insensitively (see `json`).
//! - No retries, timeouts, or authentication are layered on top of the
//!   transport; configure the `reqwest::Client` for those.

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod http;
pub mod json;

pub use client::JsonClient;
pub use config::ClientConfig;
pub use envelope::ApiResponse;
pub use error::{ClientError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse, ReqwestTransport, Transport};
