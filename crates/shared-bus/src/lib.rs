//! # Shared Bus - Event Subscription Bus
//!
//! Fans recorded Bitswap messages and connection events out to every
//! registered subscriber.
//!
//! ## Delivery Model
//!
//! ```text
//!   transport layer
//!         │ publish()
//!         ▼
//! ┌────────────────────┐  try_send   ┌─────────┐   ┌──────────────┐
//! │SubscriptionRegistry│ ──────────→ │ queue S1│ → │ worker → S1  │
//! │  (membership lock) │ ──────────→ │ queue S2│ → │ worker → S2  │
//! └────────────────────┘             └─────────┘   └──────────────┘
//! ```
//!
//! - Publishing never waits on a subscriber: each subscription has its own
//!   bounded queue and its own delivery task.
//! - A subscriber that answers [`Delivery::Terminate`], or whose queue is
//!   full, is removed for good.
//! - The membership lock is never held across a notification call.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use publisher::{EventPublisher, SubscriptionRegistry};
pub use subscriber::{ChannelSubscriber, Delivery, EventStream, EventSubscriber, SubscriptionError};

/// Maximum events buffered per subscriber before it is considered stalled.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
