//! Value objects for broadcast configuration.

use std::time::Duration;

/// Broadcast coordinator configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BroadcastConfig {
    /// Upper bound for a single send to a single peer.
    pub send_timeout: Duration,
}

impl BroadcastConfig {
    pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn with_send_timeout(send_timeout: Duration) -> Self {
        Self { send_timeout }
    }
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            send_timeout: Self::DEFAULT_SEND_TIMEOUT,
        }
    }
}
