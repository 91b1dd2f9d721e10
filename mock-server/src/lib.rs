use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// Bearer token of the seeded demo account.
pub const DEMO_TOKEN: &str = "demo-token";
pub const DEMO_PASSWORD: &str = "pharmacy123";
pub const DEMO_EMAIL: &str = "owner@demo-pharmacy.test";

pub const PLAN_TYPES: [&str; 2] = ["monthly", "yearly"];
pub const MAX_CONTACT_MESSAGE: usize = 2000;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: Uuid,
    pub plan_name: String,
    pub plan_type: String,
    pub status: String,
    pub payment_url: String,
}

#[derive(Clone, Debug)]
pub struct User {
    pub name: String,
    pub email: String,
    pub password: String,
    pub subscriptions: Vec<Subscription>,
}

impl User {
    fn active_subscription(&self) -> Option<&Subscription> {
        self.subscriptions.iter().rev().find(|s| s.status == "active")
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Contact {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct Backend {
    pub contacts: Vec<Contact>,
    pub users: HashMap<String, User>,
}

impl Backend {
    /// One demo account, no subscriptions, no contacts.
    pub fn seeded() -> Self {
        let mut users = HashMap::new();
        users.insert(
            DEMO_TOKEN.to_string(),
            User {
                name: "Demo Pharmacy".to_string(),
                email: DEMO_EMAIL.to_string(),
                password: DEMO_PASSWORD.to_string(),
                subscriptions: Vec::new(),
            },
        );
        Self {
            contacts: Vec::new(),
            users,
        }
    }
}

#[derive(Deserialize)]
pub struct ContactInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeInput {
    #[serde(default)]
    pub plan_name: String,
    #[serde(default)]
    pub plan_type: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordInput {
    pub current_password: String,
    pub new_password: String,
}

pub type Db = Arc<RwLock<Backend>>;

type Failure = (StatusCode, Json<Value>);

fn failure(status: StatusCode, message: &str) -> Failure {
    (status, Json(json!({ "message": message })))
}

pub fn app() -> Router {
    app_with(Backend::seeded())
}

pub fn app_with(backend: Backend) -> Router {
    let db: Db = Arc::new(RwLock::new(backend));
    Router::new()
        .route("/api/v1/contact-us", post(create_contact))
        .route("/api/v1/auth/change-password", post(change_password))
        .route("/api/v1/paymob/subscribe", post(subscribe))
        .route("/api/v1/users/profile", get(profile))
        .route("/user/current-subscription", get(current_subscription))
        .route("/user/user-subscriptions", get(user_subscriptions))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn bearer(headers: &HeaderMap) -> Result<String, Failure> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| failure(StatusCode::UNAUTHORIZED, "Unauthorized"))
}

fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}

async fn create_contact(
    State(db): State<Db>,
    Json(input): Json<ContactInput>,
) -> Result<(StatusCode, Json<Value>), Failure> {
    let (name, email, message) = (input.name.trim(), input.email.trim(), input.message.trim());
    if name.is_empty() || email.is_empty() || message.is_empty() {
        return Err(failure(StatusCode::BAD_REQUEST, "Name, email and message are required"));
    }
    if !is_valid_email(email) {
        return Err(failure(StatusCode::UNPROCESSABLE_ENTITY, "Email is not valid"));
    }
    if message.len() > MAX_CONTACT_MESSAGE {
        return Err(failure(StatusCode::PAYLOAD_TOO_LARGE, "Message is too long"));
    }

    let mut backend = db.write().await;
    if backend.contacts.iter().any(|c| c.email.eq_ignore_ascii_case(email)) {
        return Err(failure(StatusCode::CONFLICT, "Contact request already submitted"));
    }
    let contact = Contact {
        id: Uuid::new_v4(),
        name: name.to_string(),
        email: email.to_string(),
        message: message.to_string(),
    };
    info!("contact request {} from {}", contact.id, contact.email);
    let id = contact.id;
    backend.contacts.push(contact);
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Thank you for contacting us", "id": id })),
    ))
}

async fn change_password(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<ChangePasswordInput>,
) -> Result<Json<Value>, Failure> {
    let token = bearer(&headers)?;
    let mut backend = db.write().await;
    let user = backend
        .users
        .get_mut(&token)
        .ok_or_else(|| failure(StatusCode::UNAUTHORIZED, "Unauthorized"))?;
    if user.password != input.current_password {
        return Err(failure(StatusCode::BAD_REQUEST, "Current password is incorrect"));
    }
    if input.new_password.chars().count() < 8 {
        return Err(failure(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Password must be at least 8 characters",
        ));
    }
    user.password = input.new_password;
    info!("password changed for {}", user.email);
    Ok(Json(json!({ "message": "Password changed successfully" })))
}

async fn subscribe(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<SubscribeInput>,
) -> Result<Json<Value>, Failure> {
    let token = bearer(&headers)?;
    if input.plan_name.trim().is_empty() {
        return Err(failure(StatusCode::BAD_REQUEST, "Plan name is required"));
    }
    if !PLAN_TYPES.contains(&input.plan_type.as_str()) {
        return Err(failure(StatusCode::BAD_REQUEST, "Invalid plan type"));
    }

    let mut backend = db.write().await;
    let user = backend
        .users
        .get_mut(&token)
        .ok_or_else(|| failure(StatusCode::UNAUTHORIZED, "Unauthorized"))?;
    for previous in user.subscriptions.iter_mut().filter(|s| s.status == "active") {
        previous.status = "cancelled".to_string();
    }
    let id = Uuid::new_v4();
    let subscription = Subscription {
        id,
        plan_name: input.plan_name.trim().to_string(),
        plan_type: input.plan_type,
        status: "active".to_string(),
        payment_url: format!("https://accept.paymob.com/api/acceptance/iframes/{id}"),
    };
    info!("{} subscribed to {} ({})", user.email, subscription.plan_name, subscription.plan_type);
    let payment_url = subscription.payment_url.clone();
    user.subscriptions.push(subscription);
    Ok(Json(json!({
        "message": "Subscription created",
        "subscriptionId": id,
        "paymentUrl": payment_url,
    })))
}

async fn profile(State(db): State<Db>, headers: HeaderMap) -> Result<Json<Value>, Failure> {
    let token = bearer(&headers)?;
    let backend = db.read().await;
    let user = backend
        .users
        .get(&token)
        .ok_or_else(|| failure(StatusCode::UNAUTHORIZED, "Unauthorized"))?;
    Ok(Json(json!({
        "name": user.name,
        "email": user.email,
        "isSubscribed": user.active_subscription().is_some(),
    })))
}

async fn current_subscription(State(db): State<Db>, headers: HeaderMap) -> Result<Json<Value>, Failure> {
    let token = bearer(&headers)?;
    let backend = db.read().await;
    let user = backend
        .users
        .get(&token)
        .ok_or_else(|| failure(StatusCode::UNAUTHORIZED, "Unauthorized"))?;
    let body = match user.active_subscription() {
        Some(s) => json!({
            "status": true,
            "subscriptionId": s.id,
            "planName": s.plan_name,
            "planType": s.plan_type,
        }),
        None => json!({ "message": "No active subscription" }),
    };
    Ok(Json(body))
}

async fn user_subscriptions(
    State(db): State<Db>,
    headers: HeaderMap,
) -> Result<Json<Vec<Subscription>>, Failure> {
    let token = bearer(&headers)?;
    let backend = db.read().await;
    let user = backend
        .users
        .get(&token)
        .ok_or_else(|| failure(StatusCode::UNAUTHORIZED, "Unauthorized"))?;
    Ok(Json(user.subscriptions.clone()))
}
