use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Error codes with a fixed meaning in this protocol.
///
/// `RpcError::code` is a plain `i32` so that codes chosen by remote handlers
/// travel unchanged; this enum only names the reserved ones.
#[repr(i32)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, TryFromPrimitive, IntoPrimitive)]
pub enum RpcErrorCode {
    /// Application-level failure raised by a handler, or a local timeout.
    Application = 0,

    /// The local transport could not deliver an outbound request.
    SendFailure = -32000,

    /// The local node was stopped while the call was still pending.
    NodeStopped = -32001,

    /// The remote node has no handler registered under the requested name.
    MethodNotFound = -32601,
}

impl RpcErrorCode {
    #[inline]
    pub fn value(self) -> i32 {
        self.into()
    }
}
