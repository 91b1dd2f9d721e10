//! Text rendering of store state and payloads.

use pharmacy_core::{CurrentSubscription, SubscriptionState};
use serde_json::Value;

pub fn value(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

pub fn current_subscription(current: &CurrentSubscription) -> String {
    if !current.is_active() {
        return "No active subscription".to_string();
    }
    let plan = current.details.get("planName").and_then(Value::as_str).unwrap_or("unknown plan");
    match current.details.get("planType").and_then(Value::as_str) {
        Some(kind) => format!("Active: {plan} ({kind})"),
        None => format!("Active: {plan}"),
    }
}

pub fn history(subscriptions: &[Value]) -> String {
    if subscriptions.is_empty() {
        return "No subscriptions yet".to_string();
    }
    subscriptions
        .iter()
        .map(|s| {
            let field = |key: &str| s.get(key).and_then(Value::as_str).unwrap_or("-").to_string();
            format!("{:<12} {:<8} {}", field("planName"), field("planType"), field("status"))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Summary of the subscribe concern, as a result page would show it.
pub fn subscribe_outcome(state: &SubscriptionState) -> String {
    if let Some(error) = &state.error {
        return format!("Subscription failed: {error}");
    }
    match (&state.response, state.success) {
        (Some(response), true) => match response.get("paymentUrl").and_then(Value::as_str) {
            Some(url) => format!("Subscription created. Complete payment at {url}"),
            None => "Subscription created".to_string(),
        },
        _ => "No subscription request made".to_string(),
    }
}
