//! Synchronous API client core for the pharmacy marketplace.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). A host plugs in a
//! `Transport` to run the round-trips and a `Storage` to persist client
//! state; the stores on top hold the state the UI renders.
//!
//! # Design
//! - `PharmacyClient` is stateless: it holds only its `ClientConfig`.
//! - Each endpoint is split into `build_*` and `parse_*`; `PharmacyApi`
//!   joins them through a `Transport`.
//! - Every failure is an `ApiError` whose `Display` is the message to show.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod storage;
pub mod store;
pub mod transport;
pub mod types;

pub use api::PharmacyApi;
pub use client::PharmacyClient;
pub use config::ClientConfig;
pub use error::{ApiError, ErrorBody, ErrorPolicy};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
pub use store::{AdvertiseStore, SubscriptionState, SubscriptionStore};
pub use transport::{Transport, TransportError};
pub use types::{ChangePasswordRequest, ContactRequest, CurrentSubscription, SubscriptionRequest, UserProfile};
