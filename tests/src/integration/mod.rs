//! Cross-crate integration scenarios.

pub mod broadcast_flows;
pub mod monitoring_flows;
