//! API modules: one method per endpoint, wiring build, transport and parse.
//!
//! # Design
//! `PharmacyApi` owns a stateless `PharmacyClient` and a `Transport`. Each
//! method performs exactly one network call. A transport failure is
//! normalized with the same `ErrorPolicy` the parse step uses for
//! rejections, so callers always see the operation's message.

use log::{debug, warn};
use serde_json::Value;

use crate::client::PharmacyClient;
use crate::error::{
    ApiError, ErrorPolicy, CHANGE_PASSWORD_POLICY, CONTACT_POLICY, CURRENT_SUBSCRIPTION_POLICY,
    PROFILE_POLICY, SUBSCRIBE_POLICY, USER_SUBSCRIPTIONS_POLICY,
};
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;
use crate::types::{ChangePasswordRequest, ContactRequest, CurrentSubscription, SubscriptionRequest, UserProfile};

pub struct PharmacyApi<T> {
    client: PharmacyClient,
    transport: T,
}

impl<T: Transport> PharmacyApi<T> {
    pub fn new(client: PharmacyClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &PharmacyClient {
        &self.client
    }

    pub fn send_contact_request(&self, input: &ContactRequest) -> Result<Value, ApiError> {
        let request = self.client.build_contact(input)?;
        let response = self.round_trip(request, &CONTACT_POLICY)?;
        self.client.parse_contact(response)
    }

    pub fn subscribe_to_plan(&self, input: &SubscriptionRequest) -> Result<Value, ApiError> {
        let request = self.client.build_subscribe(input)?;
        let response = self.round_trip(request, &SUBSCRIBE_POLICY)?;
        self.client.parse_subscribe(response)
    }

    pub fn change_password(&self, input: &ChangePasswordRequest, token: &str) -> Result<Value, ApiError> {
        let request = self.client.build_change_password(input, token)?;
        let response = self.round_trip(request, &CHANGE_PASSWORD_POLICY)?;
        self.client.parse_change_password(response)
    }

    pub fn check_subscription_status(&self, token: &str) -> Result<UserProfile, ApiError> {
        let request = self.client.build_profile(token);
        let response = self.round_trip(request, &PROFILE_POLICY)?;
        self.client.parse_profile(response)
    }

    pub fn current_subscription(&self, token: &str) -> Result<CurrentSubscription, ApiError> {
        let request = self.client.build_current_subscription(token);
        let response = self.round_trip(request, &CURRENT_SUBSCRIPTION_POLICY)?;
        self.client.parse_current_subscription(response)
    }

    pub fn user_subscriptions(&self, token: &str) -> Result<Vec<Value>, ApiError> {
        let request = self.client.build_user_subscriptions(token);
        let response = self.round_trip(request, &USER_SUBSCRIPTIONS_POLICY)?;
        self.client.parse_user_subscriptions(response)
    }

    fn round_trip(&self, request: HttpRequest, policy: &ErrorPolicy) -> Result<HttpResponse, ApiError> {
        debug!("{} {}", request.method.as_str(), request.path);
        let response = self.transport.execute(request).map_err(|e| {
            warn!("no response ({}): {e}", policy.fallback());
            policy.transport(e)
        })?;
        if !response.is_success() {
            warn!("request rejected with status {}", response.status);
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::fake::ScriptedTransport;
    use serde_json::json;

    fn api(transport: ScriptedTransport) -> PharmacyApi<ScriptedTransport> {
        PharmacyApi::new(PharmacyClient::new("http://localhost:3000"), transport)
    }

    #[test]
    fn subscribe_to_plan_issues_one_authorized_post() {
        let api = api(ScriptedTransport::new().respond(200, r#"{"paymentUrl":"https://pay.test/9"}"#));
        let input = SubscriptionRequest {
            plan_name: "Premium".to_string(),
            plan_type: "monthly".to_string(),
            token: "t".to_string(),
        };
        let payload = api.subscribe_to_plan(&input).unwrap();
        assert_eq!(payload, json!({"paymentUrl": "https://pay.test/9"}));

        let requests = api.transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].path, "http://localhost:3000/api/v1/paymob/subscribe");
        assert_eq!(requests[0].header("authorization"), Some("Bearer t"));
        let body: Value = serde_json::from_str(requests[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"planName": "Premium", "planType": "monthly"}));
    }

    #[test]
    fn transport_failure_maps_to_operation_fallback() {
        let api = api(ScriptedTransport::new().fail("connection refused"));
        let err = api.change_password(
            &ChangePasswordRequest {
                current_password: "a".to_string(),
                new_password: "b".to_string(),
            },
            "t",
        );
        let err = err.unwrap_err();
        assert_eq!(err.to_string(), "Change password failed");
        assert!(matches!(err, ApiError::Transport { .. }));
    }

    #[test]
    fn contact_conflict_is_normalized() {
        let api = api(ScriptedTransport::new().respond(409, r#"{"message":"E11000 duplicate key"}"#));
        let err = api
            .send_contact_request(&ContactRequest {
                name: "Amal".to_string(),
                email: "amal@example.com".to_string(),
                message: "hi".to_string(),
            })
            .unwrap_err();
        assert_eq!(err.to_string(), "A contact request already exists for this information.");
    }

    #[test]
    fn check_subscription_status_reads_profile() {
        let api = api(ScriptedTransport::new().respond(200, r#"{"name":"Amal","isSubscribed":true}"#));
        let profile = api.check_subscription_status("t").unwrap();
        assert!(profile.has_active_subscription());
        assert_eq!(api.transport.requests()[0].path, "http://localhost:3000/api/v1/users/profile");
    }
}
