//! Stateless HTTP request builder and response parser for the marketplace API.
//!
//! # Design
//! `PharmacyClient` holds only its `ClientConfig` and carries no mutable state
//! between calls. Each endpoint is split into a `build_*` method producing an
//! `HttpRequest` and a `parse_*` method consuming an `HttpResponse`. The
//! caller executes the round-trip in between, so the client stays
//! deterministic and free of I/O.
//!
//! Parse methods return only the decoded body. Non-2xx responses are turned
//! into `ApiError::Rejected` by the operation's `ErrorPolicy`.

use serde::Serialize;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::{
    ApiError, ErrorPolicy, CHANGE_PASSWORD_POLICY, CONTACT_POLICY, CURRENT_SUBSCRIPTION_POLICY,
    PROFILE_POLICY, SUBSCRIBE_POLICY, USER_SUBSCRIPTIONS_POLICY,
};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{ChangePasswordRequest, ContactRequest, CurrentSubscription, SubscriptionRequest, UserProfile};

pub const CHANGE_PASSWORD_PATH: &str = "/api/v1/auth/change-password";
pub const CONTACT_PATH: &str = "/api/v1/contact-us";
pub const SUBSCRIBE_PATH: &str = "/api/v1/paymob/subscribe";
pub const PROFILE_PATH: &str = "/api/v1/users/profile";
pub const CURRENT_SUBSCRIPTION_PATH: &str = "/user/current-subscription";
pub const USER_SUBSCRIPTIONS_PATH: &str = "/user/user-subscriptions";

#[derive(Debug, Clone, Default)]
pub struct PharmacyClient {
    config: ClientConfig,
}

impl PharmacyClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_config(ClientConfig::new(base_url))
    }

    pub fn with_config(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn build_contact(&self, input: &ContactRequest) -> Result<HttpRequest, ApiError> {
        self.post(CONTACT_PATH, None, input)
    }

    pub fn build_subscribe(&self, input: &SubscriptionRequest) -> Result<HttpRequest, ApiError> {
        self.post(SUBSCRIBE_PATH, Some(&input.token), input)
    }

    pub fn build_change_password(&self, input: &ChangePasswordRequest, token: &str) -> Result<HttpRequest, ApiError> {
        self.post(CHANGE_PASSWORD_PATH, Some(token), input)
    }

    pub fn build_profile(&self, token: &str) -> HttpRequest {
        self.get(PROFILE_PATH, token)
    }

    pub fn build_current_subscription(&self, token: &str) -> HttpRequest {
        self.get(CURRENT_SUBSCRIPTION_PATH, token)
    }

    pub fn build_user_subscriptions(&self, token: &str) -> HttpRequest {
        self.get(USER_SUBSCRIPTIONS_PATH, token)
    }

    pub fn parse_contact(&self, response: HttpResponse) -> Result<Value, ApiError> {
        check_status(&response, &CONTACT_POLICY)?;
        decode_payload(&response.body, &CONTACT_POLICY)
    }

    pub fn parse_subscribe(&self, response: HttpResponse) -> Result<Value, ApiError> {
        check_status(&response, &SUBSCRIBE_POLICY)?;
        decode_payload(&response.body, &SUBSCRIBE_POLICY)
    }

    pub fn parse_change_password(&self, response: HttpResponse) -> Result<Value, ApiError> {
        check_status(&response, &CHANGE_PASSWORD_POLICY)?;
        decode_payload(&response.body, &CHANGE_PASSWORD_POLICY)
    }

    pub fn parse_profile(&self, response: HttpResponse) -> Result<UserProfile, ApiError> {
        check_status(&response, &PROFILE_POLICY)?;
        serde_json::from_str(&response.body).map_err(|e| PROFILE_POLICY.undecodable(e))
    }

    /// Any body whose `status` is not literally `true` becomes the inactive
    /// sentinel, including an empty body.
    pub fn parse_current_subscription(&self, response: HttpResponse) -> Result<CurrentSubscription, ApiError> {
        check_status(&response, &CURRENT_SUBSCRIPTION_POLICY)?;
        decode_payload(&response.body, &CURRENT_SUBSCRIPTION_POLICY).map(CurrentSubscription::from_value)
    }

    /// Accepts a bare array or an object wrapping the array in `data`.
    pub fn parse_user_subscriptions(&self, response: HttpResponse) -> Result<Vec<Value>, ApiError> {
        check_status(&response, &USER_SUBSCRIPTIONS_POLICY)?;
        match decode_payload(&response.body, &USER_SUBSCRIPTIONS_POLICY)? {
            Value::Array(items) => Ok(items),
            Value::Object(mut fields) => match fields.remove("data") {
                Some(Value::Array(items)) => Ok(items),
                _ => Err(USER_SUBSCRIPTIONS_POLICY.undecodable("expected an array of subscriptions")),
            },
            Value::Null => Ok(Vec::new()),
            other => Err(USER_SUBSCRIPTIONS_POLICY.undecodable(format_args!(
                "expected an array of subscriptions, got {other}"
            ))),
        }
    }

    fn get(&self, path: &str, token: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: self.config.url(path),
            headers: self.headers(Some(token), false),
            body: None,
        }
    }

    fn post<B: Serialize>(&self, path: &str, token: Option<&str>, input: &B) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: self.config.url(path),
            headers: self.headers(token, true),
            body: Some(body),
        })
    }

    /// Default headers, minus `content-type` for requests without a body.
    fn headers(&self, token: Option<&str>, has_body: bool) -> Vec<(String, String)> {
        let mut headers: Vec<_> = self
            .config
            .default_headers()
            .iter()
            .filter(|(key, _)| has_body || !key.eq_ignore_ascii_case("content-type"))
            .cloned()
            .collect();
        if let Some(token) = token {
            headers.push(("authorization".to_string(), format!("Bearer {token}")));
        }
        headers
    }
}

fn check_status(response: &HttpResponse, policy: &ErrorPolicy) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(policy.reject(response))
}

/// Decode a success body; an empty body decodes to `null`.
fn decode_payload(body: &str, policy: &ErrorPolicy) -> Result<Value, ApiError> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body).map_err(|e| policy.undecodable(e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> PharmacyClient {
        PharmacyClient::new("http://localhost:3000")
    }

    fn body_of(req: &HttpRequest) -> Value {
        serde_json::from_str(req.body.as_deref().unwrap()).unwrap()
    }

    #[test]
    fn build_contact_has_no_authorization() {
        let input = ContactRequest {
            name: "Amal".to_string(),
            email: "amal@example.com".to_string(),
            message: "Do you deliver to Giza?".to_string(),
        };
        let req = client().build_contact(&input).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:3000/api/v1/contact-us");
        assert_eq!(req.header("authorization"), None);
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(
            body_of(&req),
            json!({"name": "Amal", "email": "amal@example.com", "message": "Do you deliver to Giza?"})
        );
    }

    #[test]
    fn build_subscribe_sends_bearer_token() {
        let input = SubscriptionRequest {
            plan_name: "Premium".to_string(),
            plan_type: "monthly".to_string(),
            token: "t".to_string(),
        };
        let req = client().build_subscribe(&input).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:3000/api/v1/paymob/subscribe");
        assert_eq!(req.header("authorization"), Some("Bearer t"));
        assert_eq!(body_of(&req), json!({"planName": "Premium", "planType": "monthly"}));
    }

    #[test]
    fn build_change_password_produces_correct_request() {
        let input = ChangePasswordRequest {
            current_password: "old-secret".to_string(),
            new_password: "new-secret".to_string(),
        };
        let req = client().build_change_password(&input, "abc").unwrap();
        assert_eq!(req.path, "http://localhost:3000/api/v1/auth/change-password");
        assert_eq!(req.header("authorization"), Some("Bearer abc"));
        assert_eq!(body_of(&req)["newPassword"], "new-secret");
    }

    #[test]
    fn build_reads_are_authorized_gets() {
        let c = client();
        for (req, path) in [
            (c.build_profile("abc"), "/api/v1/users/profile"),
            (c.build_current_subscription("abc"), "/user/current-subscription"),
            (c.build_user_subscriptions("abc"), "/user/user-subscriptions"),
        ] {
            assert_eq!(req.method, HttpMethod::Get);
            assert_eq!(req.path, format!("http://localhost:3000{path}"));
            assert_eq!(req.header("authorization"), Some("Bearer abc"));
            assert_eq!(req.header("accept"), Some("application/json"));
            assert_eq!(req.header("content-type"), None);
            assert!(req.body.is_none());
        }
    }

    #[test]
    fn parse_subscribe_returns_body_payload() {
        let response = HttpResponse::new(200, r#"{"paymentUrl":"https://pay.test/1","subscriptionId":"1"}"#);
        let payload = client().parse_subscribe(response).unwrap();
        assert_eq!(payload["paymentUrl"], "https://pay.test/1");
    }

    #[test]
    fn parse_subscribe_rejection_uses_backend_message() {
        let response = HttpResponse::new(401, r#"{"message":"Unauthorized"}"#);
        let err = client().parse_subscribe(response).unwrap_err();
        assert_eq!(err, ApiError::Rejected { status: 401, message: "Unauthorized".to_string() });
    }

    #[test]
    fn parse_contact_override_statuses() {
        let c = client();
        let cases = [
            (400, "Invalid request data. Please check your information and try again."),
            (409, "A contact request already exists for this information."),
            (422, "Invalid data format. Please check your information and try again."),
        ];
        for (status, expected) in cases {
            let response = HttpResponse::new(status, r#"{"message":"backend says no"}"#);
            assert_eq!(c.parse_contact(response).unwrap_err().to_string(), expected);
        }
    }

    #[test]
    fn parse_change_password_fallback() {
        let err = client().parse_change_password(HttpResponse::new(500, "")).unwrap_err();
        assert_eq!(err.to_string(), "Change password failed");
    }

    #[test]
    fn parse_current_subscription_empty_body_is_sentinel() {
        let sub = client().parse_current_subscription(HttpResponse::new(200, "")).unwrap();
        assert_eq!(sub, CurrentSubscription::inactive());
    }

    #[test]
    fn parse_user_subscriptions_accepts_wrapped_array() {
        let c = client();
        let bare = c.parse_user_subscriptions(HttpResponse::new(200, r#"[{"planName":"Basic"}]"#)).unwrap();
        let wrapped = c
            .parse_user_subscriptions(HttpResponse::new(200, r#"{"data":[{"planName":"Basic"}]}"#))
            .unwrap();
        assert_eq!(bare, wrapped);
        assert_eq!(bare.len(), 1);
    }

    #[test]
    fn parse_user_subscriptions_rejects_scalar() {
        let err = client().parse_user_subscriptions(HttpResponse::new(200, "42")).unwrap_err();
        assert_eq!(err.to_string(), "Failed to fetch subscriptions");
        assert!(matches!(err, ApiError::DeserializationError { ref cause, .. } if cause.contains("42")));
    }

    #[test]
    fn parse_profile_bad_json_uses_fallback() {
        let err = client().parse_profile(HttpResponse::new(200, "not json")).unwrap_err();
        assert_eq!(err.to_string(), "Failed to check subscription status");
        assert!(matches!(err, ApiError::DeserializationError { .. }));

        let err = client().parse_profile(HttpResponse::new(200, "")).unwrap_err();
        assert_eq!(err.to_string(), "Failed to check subscription status");
    }

    #[test]
    fn parse_contact_garbled_success_uses_fallback() {
        let err = client().parse_contact(HttpResponse::new(201, "<html>ok</html>")).unwrap_err();
        assert_eq!(err.to_string(), "Failed to send contact request");
    }
}
