//! Request and response DTOs for the marketplace API.
//!
//! # Design
//! Request payloads are typed and serialize to the backend's camelCase
//! field names. Response payloads the client only passes through to the
//! UI stay as `serde_json::Value`; the two responses the client branches on
//! (current subscription, profile) get small wrappers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Payload of a contact-us submission, sent verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// Plan subscription. The token travels in the `Authorization` header and is
/// never part of the serialized body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRequest {
    pub plan_name: String,
    pub plan_type: String,
    #[serde(skip)]
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// The user's current subscription.
///
/// Only a literal `"status": true` counts as subscribed; anything else
/// (missing, `null`, `"active"`, non-object body) collapses to the inactive
/// sentinel `{"status": false}`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CurrentSubscription {
    pub status: bool,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl CurrentSubscription {
    pub fn inactive() -> Self {
        Self::default()
    }

    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(mut fields) if fields.get("status") == Some(&Value::Bool(true)) => {
                fields.remove("status");
                Self {
                    status: true,
                    details: fields,
                }
            }
            _ => Self::inactive(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status
    }

    pub fn to_value(&self) -> Value {
        let mut fields = self.details.clone();
        fields.insert("status".to_string(), Value::Bool(self.status));
        Value::Object(fields)
    }
}

/// Profile returned by `/api/v1/users/profile`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl UserProfile {
    /// `isSubscribed` must be literally `true`.
    pub fn has_active_subscription(&self) -> bool {
        self.fields.get("isSubscribed") == Some(&Value::Bool(true))
    }
}
