//! The uniform result of every `JsonClient` call.
//!
//! # Design
//! `ApiResponse<T>` is built once per call and never mutated. The payload is
//! an explicit `Option<T>` rather than a type default: it is `Some` only when
//! the status was 2xx and the body decoded into `T`. Operations that never
//! decode a body (`delete`, `put`, `post_no_response`) use `T = ()` and always
//! carry `None`.
//!
//! The raw response is shared through an `Arc` so an envelope can be cloned
//! or handed to another task without copying the body. The body is decoded as
//! text only when `body_text` is called.

use std::sync::Arc;

use crate::http::HttpResponse;

#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    payload: Option<T>,
    succeeded: bool,
    raw: Option<Arc<HttpResponse>>,
}

impl<T> ApiResponse<T> {
    /// Envelope for a 2xx response whose body decoded into `payload`.
    pub(crate) fn success(payload: Option<T>, raw: Arc<HttpResponse>) -> Self {
        Self {
            payload,
            succeeded: true,
            raw: Some(raw),
        }
    }

    /// Envelope for a non-2xx response. The payload is always absent.
    pub(crate) fn failure(raw: Arc<HttpResponse>) -> Self {
        Self {
            payload: None,
            succeeded: false,
            raw: Some(raw),
        }
    }

    /// An envelope with no raw response attached, e.g. for stubbing a call.
    ///
    /// A failed envelope never carries a payload, so `payload` is dropped
    /// when `succeeded` is false.
    pub fn detached(succeeded: bool, payload: Option<T>) -> Self {
        Self {
            payload: if succeeded { payload } else { None },
            succeeded,
            raw: None,
        }
    }

    /// True iff the server answered with a 2xx status.
    pub fn succeeded(&self) -> bool {
        self.succeeded
    }

    pub fn payload(&self) -> Option<&T> {
        self.payload.as_ref()
    }

    pub fn into_payload(self) -> Option<T> {
        self.payload
    }

    /// HTTP status of the attached response.
    pub fn status(&self) -> Option<u16> {
        self.raw.as_ref().map(|raw| raw.status)
    }

    pub fn raw(&self) -> Option<&Arc<HttpResponse>> {
        self.raw.as_ref()
    }

    /// The raw response body as text, decoded on demand.
    ///
    /// Invalid UTF-8 sequences are replaced with U+FFFD. Returns an empty
    /// string when no response is attached.
    pub fn body_text(&self) -> String {
        match &self.raw {
            Some(raw) => String::from_utf8_lossy(&raw.body).into_owned(),
            None => String::new(),
        }
    }
}
