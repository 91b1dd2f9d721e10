//! The seam where the host performs I/O.

use std::sync::Arc;

use thiserror::Error;

use crate::http::{HttpRequest, HttpResponse};

/// The request never produced a response (DNS, refused connection, timeout).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Executes one request and returns whatever the server answered.
///
/// Non-2xx statuses are responses, not errors: implementations must hand
/// them back as `HttpResponse` so the client can normalize them.
pub trait Transport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}
