//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests, simulated responses,
//! and expected results or error messages. Comparing parsed JSON (not raw
//! strings) avoids false negatives from field-ordering differences.

use pharmacy_core::{ContactRequest, HttpMethod, HttpRequest, HttpResponse, PharmacyClient, SubscriptionRequest};
use serde_json::Value;

const BASE_URL: &str = "http://localhost:3000";

fn client() -> PharmacyClient {
    PharmacyClient::new(BASE_URL)
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        other => panic!("unknown method: {other}"),
    }
}

fn simulated(case: &Value) -> HttpResponse {
    let sim = &case["simulated_response"];
    HttpResponse::new(sim["status"].as_u64().unwrap() as u16, sim["body"].as_str().unwrap())
}

fn assert_request(name: &str, req: &HttpRequest, expected: &Value) {
    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(req.path, format!("{BASE_URL}{}", expected["path"].as_str().unwrap()), "{name}: path");
    assert_eq!(req.header("authorization"), expected["authorization"].as_str(), "{name}: authorization");
    assert_eq!(req.header("content-type"), Some("application/json"), "{name}: content-type");

    let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
    assert_eq!(body, expected["body"], "{name}: body");
}

fn assert_outcome<T: std::fmt::Debug>(
    name: &str,
    case: &Value,
    result: Result<T, pharmacy_core::ApiError>,
    to_json: impl Fn(T) -> Value,
) {
    match case.get("expected_error") {
        Some(expected) => {
            let err = result.unwrap_err();
            assert_eq!(err.to_string(), expected.as_str().unwrap(), "{name}: error message");
        }
        None => {
            let value = to_json(result.unwrap());
            assert_eq!(value, case["expected_result"], "{name}: parsed result");
        }
    }
}

// ---------------------------------------------------------------------------
// Contact
// ---------------------------------------------------------------------------

#[test]
fn contact_test_vectors() {
    let raw = include_str!("../../test-vectors/contact.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input: ContactRequest = serde_json::from_value(case["input"].clone()).unwrap();

        let req = c.build_contact(&input).unwrap();
        if let Some(expected_req) = case.get("expected_request") {
            assert_request(name, &req, expected_req);
        }

        assert_outcome(name, case, c.parse_contact(simulated(case)), |v| v);
    }
}

// ---------------------------------------------------------------------------
// Subscribe
// ---------------------------------------------------------------------------

#[test]
fn subscribe_test_vectors() {
    let raw = include_str!("../../test-vectors/subscribe.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let mut input: SubscriptionRequest = serde_json::from_value(case["input"].clone()).unwrap();
        input.token = case["token"].as_str().unwrap().to_string();

        let req = c.build_subscribe(&input).unwrap();
        assert_request(name, &req, &case["expected_request"]);

        assert_outcome(name, case, c.parse_subscribe(simulated(case)), |v| v);
    }
}

// ---------------------------------------------------------------------------
// Current subscription
// ---------------------------------------------------------------------------

#[test]
fn current_subscription_test_vectors() {
    let raw = include_str!("../../test-vectors/current_subscription.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();

        let req = c.build_current_subscription("t");
        assert_eq!(req.method, HttpMethod::Get, "{name}: method");
        assert!(req.body.is_none(), "{name}: body should be None");

        assert_outcome(name, case, c.parse_current_subscription(simulated(case)), |sub| sub.to_value());
    }
}
