//! # Bitswap Monitor Runtime
//!
//! Plugin-facing facade of the monitor.
//!
//! ## Modular Structure
//!
//! - `api` - [`MonitoringApi`], [`RpcApi`] and the combined [`PluginApi`]
//! - `node` - [`MonitorNode`], wiring the subscription bus and the broadcast
//!   coordinator behind those traits
//! - `config` - [`MonitorConfig`] loaded from TOML and environment overrides
//! - `telemetry` - tracing subscriber setup
//!
//! ## Channels
//!
//! ```text
//! remote controller ──request/response──→ RpcApi        → BroadcastCoordinator
//! remote controller ←──── push stream ─── MonitoringApi ← SubscriptionRegistry
//!                                                              ↑
//!                                          transport layer ─ publish()
//! ```
//!
//! Serving these traits over the network is left to the embedding node.

pub mod api;
pub mod config;
pub mod node;
pub mod telemetry;

pub use api::{MonitoringApi, PluginApi, RpcApi};
pub use config::{ConfigError, MonitorConfig};
pub use node::MonitorNode;
pub use telemetry::init_tracing;
