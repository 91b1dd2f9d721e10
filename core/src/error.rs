//! Error types for the marketplace API client and its normalization rules.
//!
//! # Design
//! Every failure carries the human-readable message the UI shows, so
//! `Display` is always that message. The variant still tells callers what
//! went wrong: no response at all, a rejection by the backend, a missing
//! credential, or a payload that could not be encoded/decoded.
//!
//! Rejections are normalized by an `ErrorPolicy`: a status-code override
//! wins, then a structured `message` from the body, then the operation's
//! fallback message.

use thiserror::Error;

use crate::http::HttpResponse;

/// Message used whenever an operation needs a bearer token and none resolves.
pub const MISSING_TOKEN_MESSAGE: &str = "No authentication token found";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    /// No response was received. `cause` keeps the transport's own error text.
    #[error("{message}")]
    Transport { message: String, cause: String },

    /// The backend answered with a non-2xx status.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// No bearer token was given and none is persisted.
    #[error("{}", MISSING_TOKEN_MESSAGE)]
    MissingToken,

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// A successful response body could not be decoded. `cause` keeps the
    /// decoder's own error text.
    #[error("{message}")]
    DeserializationError { message: String, cause: String },
}

impl ApiError {
    /// HTTP status of a rejection, if the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// What a failed response carried in its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorBody {
    /// A JSON object with a string `message` field.
    Structured { message: String },
    /// Anything else that is not blank: plain text, HTML, JSON without `message`.
    Unstructured(String),
    Empty,
}

impl ErrorBody {
    pub fn classify(body: &str) -> Self {
        if body.trim().is_empty() {
            return ErrorBody::Empty;
        }
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| value.get("message")?.as_str().map(str::to_string));
        match message {
            Some(message) => ErrorBody::Structured { message },
            None => ErrorBody::Unstructured(body.to_string()),
        }
    }
}

/// Per-operation rules turning a failure into a message.
#[derive(Debug, Clone, Copy)]
pub struct ErrorPolicy {
    fallback: &'static str,
    overrides: &'static [(u16, &'static str)],
}

impl ErrorPolicy {
    pub const fn new(fallback: &'static str) -> Self {
        Self {
            fallback,
            overrides: &[],
        }
    }

    pub const fn with_overrides(fallback: &'static str, overrides: &'static [(u16, &'static str)]) -> Self {
        Self { fallback, overrides }
    }

    pub fn fallback(&self) -> &'static str {
        self.fallback
    }

    pub fn message_for(&self, status: u16, body: &ErrorBody) -> String {
        if let Some((_, message)) = self.overrides.iter().find(|(code, _)| *code == status) {
            return message.to_string();
        }
        match body {
            ErrorBody::Structured { message } => message.clone(),
            ErrorBody::Unstructured(_) | ErrorBody::Empty => self.fallback.to_string(),
        }
    }

    /// Normalize a non-2xx response.
    pub fn reject(&self, response: &HttpResponse) -> ApiError {
        let body = ErrorBody::classify(&response.body);
        ApiError::Rejected {
            status: response.status,
            message: self.message_for(response.status, &body),
        }
    }

    /// Normalize a 2xx response whose body does not have the expected shape.
    pub fn undecodable(&self, cause: impl std::fmt::Display) -> ApiError {
        ApiError::DeserializationError {
            message: self.fallback.to_string(),
            cause: cause.to_string(),
        }
    }

    /// Normalize a failure where no response was received.
    pub fn transport(&self, cause: impl std::fmt::Display) -> ApiError {
        ApiError::Transport {
            message: self.fallback.to_string(),
            cause: cause.to_string(),
        }
    }
}

pub const CONTACT_POLICY: ErrorPolicy = ErrorPolicy::with_overrides(
    "Failed to send contact request",
    &[
        (400, "Invalid request data. Please check your information and try again."),
        (409, "A contact request already exists for this information."),
        (422, "Invalid data format. Please check your information and try again."),
    ],
);
pub const SUBSCRIBE_POLICY: ErrorPolicy = ErrorPolicy::new("Subscription failed");
pub const CHANGE_PASSWORD_POLICY: ErrorPolicy = ErrorPolicy::new("Change password failed");
pub const PROFILE_POLICY: ErrorPolicy = ErrorPolicy::new("Failed to check subscription status");
pub const CURRENT_SUBSCRIPTION_POLICY: ErrorPolicy = ErrorPolicy::new("Failed to fetch current subscription");
pub const USER_SUBSCRIPTIONS_POLICY: ErrorPolicy = ErrorPolicy::new("Failed to fetch subscriptions");
