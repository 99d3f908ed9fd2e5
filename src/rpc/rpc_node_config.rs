use crate::constants::{DEFAULT_RPC_PROTOCOL, DEFAULT_RPC_TIMEOUT_MS};
use std::time::Duration;

/// Construction-time options of an `RpcNode`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcNodeConfig {
    /// Distinguishes this RPC service from others sharing the same transport.
    pub protocol: String,

    /// Milliseconds to wait for a response. Negative waits forever.
    pub timeout_ms: i64,
}

impl Default for RpcNodeConfig {
    fn default() -> Self {
        Self {
            protocol: DEFAULT_RPC_PROTOCOL.to_string(),
            timeout_ms: DEFAULT_RPC_TIMEOUT_MS,
        }
    }
}

impl RpcNodeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = protocol.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: i64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// The response timeout, or `None` when it is disabled.
    pub fn timeout(&self) -> Option<Duration> {
        u64::try_from(self.timeout_ms).ok().map(Duration::from_millis)
    }
}
