//! Client-side state stores.
//!
//! Each store is an explicit object built with its dependencies (API,
//! storage) injected, so tests substitute fakes directly.

pub mod advertise;
pub mod subscription;

pub use advertise::AdvertiseStore;
pub use subscription::{SubscriptionState, SubscriptionStore};
