//! Subscription store: subscribe action, current subscription and history.
//!
//! # Design
//! State lives behind a mutex so the store can be shared between threads;
//! the lock is only held to read or write state, never across a request.
//! Each concern tracks its own loading flag and error, and every action
//! ends with its loading flag cleared.
//!
//! `fetch_current_subscription` has an in-flight guard: a call made while
//! another is running returns `Ok(None)` at once and issues no request.

use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{debug, warn};
use serde_json::Value;

use crate::api::PharmacyApi;
use crate::error::ApiError;
use crate::storage::{resolve_token, Storage};
use crate::transport::Transport;
use crate::types::{CurrentSubscription, SubscriptionRequest};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubscriptionState {
    pub loading: bool,
    pub error: Option<String>,
    pub success: bool,
    /// Payload of the last successful subscribe call.
    pub response: Option<Value>,
    pub current_subscription: CurrentSubscription,
    pub loading_current: bool,
    pub current_error: Option<String>,
    pub subscriptions: Vec<Value>,
    pub loading_subscriptions: bool,
    pub subscriptions_error: Option<String>,
}

pub struct SubscriptionStore<T, S> {
    api: PharmacyApi<T>,
    storage: S,
    state: Mutex<SubscriptionState>,
}

impl<T: Transport, S: Storage> SubscriptionStore<T, S> {
    pub fn new(api: PharmacyApi<T>, storage: S) -> Self {
        Self {
            api,
            storage,
            state: Mutex::new(SubscriptionState::default()),
        }
    }

    pub fn state(&self) -> SubscriptionState {
        self.lock().clone()
    }

    pub fn reset(&self) {
        *self.lock() = SubscriptionState::default();
    }

    pub fn subscribe(&self, plan_name: &str, plan_type: &str, token: Option<&str>) -> Result<Value, ApiError> {
        let Some(token) = resolve_token(&self.storage, token) else {
            let mut state = self.lock();
            state.error = Some(ApiError::MissingToken.to_string());
            state.success = false;
            return Err(ApiError::MissingToken);
        };

        {
            let mut state = self.lock();
            state.loading = true;
            state.error = None;
            state.success = false;
        }

        let request = SubscriptionRequest {
            plan_name: plan_name.to_string(),
            plan_type: plan_type.to_string(),
            token,
        };
        let result = self.api.subscribe_to_plan(&request);

        let mut state = self.lock();
        state.loading = false;
        match &result {
            Ok(payload) => {
                debug!("subscribed to {plan_name} ({plan_type})");
                state.response = Some(payload.clone());
                state.success = true;
            }
            Err(e) => {
                warn!("subscribe failed: {e}");
                state.error = Some(e.to_string());
                state.success = false;
            }
        }
        result
    }

    /// Fetch the current subscription; `Ok(None)` means the call was dropped
    /// because another fetch is still in flight.
    pub fn fetch_current_subscription(&self, token: Option<&str>) -> Result<Option<CurrentSubscription>, ApiError> {
        {
            let mut state = self.lock();
            if state.loading_current {
                debug!("current subscription fetch already in flight, dropping call");
                return Ok(None);
            }
            state.loading_current = true;
            state.current_error = None;
        }

        let result = match resolve_token(&self.storage, token) {
            Some(token) => self.api.current_subscription(&token),
            None => Err(ApiError::MissingToken),
        };

        let mut state = self.lock();
        state.loading_current = false;
        match result {
            Ok(current) => {
                state.current_subscription = current.clone();
                Ok(Some(current))
            }
            Err(e) => {
                warn!("current subscription fetch failed: {e}");
                state.current_subscription = CurrentSubscription::inactive();
                state.current_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Fetch the subscription history. On failure the list is emptied, not
    /// left stale.
    pub fn fetch_user_subscriptions(&self, token: Option<&str>) -> Result<Vec<Value>, ApiError> {
        {
            let mut state = self.lock();
            state.loading_subscriptions = true;
            state.subscriptions_error = None;
        }

        let result = match resolve_token(&self.storage, token) {
            Some(token) => self.api.user_subscriptions(&token),
            None => Err(ApiError::MissingToken),
        };

        let mut state = self.lock();
        state.loading_subscriptions = false;
        match &result {
            Ok(subscriptions) => state.subscriptions = subscriptions.clone(),
            Err(e) => {
                warn!("subscription history fetch failed: {e}");
                state.subscriptions = Vec::new();
                state.subscriptions_error = Some(e.to_string());
            }
        }
        result
    }

    /// Whether the profile reports an active subscription. Does not touch state.
    pub fn check_subscription_status(&self, token: Option<&str>) -> Result<bool, ApiError> {
        let token = resolve_token(&self.storage, token).ok_or(ApiError::MissingToken)?;
        let profile = self.api.check_subscription_status(&token)?;
        Ok(profile.has_active_subscription())
    }

    fn lock(&self) -> MutexGuard<'_, SubscriptionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
