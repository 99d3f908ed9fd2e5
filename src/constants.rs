// Node configuration defaults

/// Protocol identifier a node registers on its transport when none is configured.
///
/// Nodes sharing one transport substrate only exchange messages with peers
/// speaking the same protocol string.
pub const DEFAULT_RPC_PROTOCOL: &str = "/peer-rpc/1.0.0";

/// Milliseconds a request waits for its correlated response before it is
/// rejected with a timeout error. A negative value disables the watchdog.
pub const DEFAULT_RPC_TIMEOUT_MS: i64 = 5000;

// Error messages produced locally

/// Message carried by the error a call settles with when its watchdog fires.
pub const RPC_TIMEOUT_MESSAGE: &str = "timeout";

/// Message carried by the error pending calls settle with when the node stops.
pub const RPC_NODE_STOPPED_MESSAGE: &str = "node stopped";

/// Fallback message for handler failures that cannot be turned into text.
pub const RPC_UNKNOWN_ERROR_MESSAGE: &str = "unknown error";

/// Prefix of the message sent back when a request names an unregistered method.
pub const RPC_METHOD_NOT_FOUND_MESSAGE: &str = "method not found";

/// Message carried by the error a pending call settles with when its ID is
/// registered again before it settled (only possible after the counter wraps).
pub const RPC_CALL_SUPERSEDED_MESSAGE: &str = "call superseded";
