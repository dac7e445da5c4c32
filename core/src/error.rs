//! Error types for the JSON client.
//!
//! # Design
//! A non-2xx status is NOT an error: it is reported through
//! `ApiResponse::succeeded`. `ClientError` only covers failures that leave the
//! caller without a meaningful envelope: the transport produced no response,
//! the request body could not be encoded, the target URL could not be
//! resolved, or a successful response carried a body that does not parse as
//! the requested type.

use thiserror::Error;

/// Errors returned by `JsonClient` operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The transport failed before a response was received.
    #[error("transport failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// A 2xx response body could not be deserialized into the expected type.
    #[error("deserialization of HTTP {status} response failed: {source}")]
    Deserialization {
        status: u16,
        #[source]
        source: serde_json::Error,
    },

    /// A relative target was given but no base URL is configured.
    #[error("cannot resolve relative target '{0}' without a base URL")]
    InvalidUrl(String),
}

pub type Result<T> = std::result::Result<T, ClientError>;
