use crate::constants::{
    RPC_CALL_SUPERSEDED_MESSAGE, RPC_METHOD_NOT_FOUND_MESSAGE, RPC_NODE_STOPPED_MESSAGE, RPC_TIMEOUT_MESSAGE,
    RPC_UNKNOWN_ERROR_MESSAGE,
};
use crate::rpc::RpcErrorCode;
use bitcode::{Decode, Encode};
use std::any::Any;
use std::fmt;

/// The error half of an RPC outcome, both on the wire and locally.
///
/// Errors raised while *serving* a request travel back to the caller inside a
/// response. Errors raised while *issuing* a request (send failure, timeout,
/// shutdown) are produced locally with the same shape.
#[derive(Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
}

impl RpcError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// An application-level failure (code `0`).
    pub fn application(message: impl Into<String>) -> Self {
        Self::new(RpcErrorCode::Application.value(), message)
    }

    /// The error a call settles with when its watchdog fires.
    pub fn timeout() -> Self {
        Self::application(RPC_TIMEOUT_MESSAGE)
    }

    /// The transport refused or failed to deliver an outbound request.
    pub fn send_failure(message: impl Into<String>) -> Self {
        Self::new(RpcErrorCode::SendFailure.value(), message)
    }

    pub fn node_stopped() -> Self {
        Self::new(RpcErrorCode::NodeStopped.value(), RPC_NODE_STOPPED_MESSAGE)
    }

    /// A pending call whose ID was handed out again before it settled.
    pub fn superseded() -> Self {
        Self::application(RPC_CALL_SUPERSEDED_MESSAGE)
    }

    pub fn method_not_found(method_name: &str) -> Self {
        Self::new(
            RpcErrorCode::MethodNotFound.value(),
            format!("{RPC_METHOD_NOT_FOUND_MESSAGE}: {method_name}"),
        )
    }

    /// Returns the reserved code this error carries, if any.
    pub fn kind(&self) -> Option<RpcErrorCode> {
        RpcErrorCode::try_from(self.code).ok()
    }

    pub fn is_timeout(&self) -> bool {
        self.code == RpcErrorCode::Application.value() && self.message == RPC_TIMEOUT_MESSAGE
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RPC error {}: {}", self.code, self.message)
    }
}

impl std::error::Error for RpcError {}

/// The error type method handlers return.
///
/// Returning an `RpcError` (boxed) preserves its code on the wire; any other
/// error is sent back as an application error carrying its `Display` text.
pub type RpcHandlerError = Box<dyn std::error::Error + Send + Sync>;

/// A failure raised by a method handler, classified before it is put on the
/// wire.
pub enum RpcHandlerFailure {
    /// The handler returned an `RpcError`; code and message are kept.
    Structured(RpcError),

    /// The handler returned some other error.
    Generic(RpcHandlerError),

    /// The handler panicked; the payload is whatever was passed to `panic!`.
    Unclassified(Box<dyn Any + Send>),
}

impl From<RpcHandlerError> for RpcHandlerFailure {
    fn from(err: RpcHandlerError) -> Self {
        match err.downcast::<RpcError>() {
            Ok(rpc_error) => RpcHandlerFailure::Structured(*rpc_error),
            Err(other) => RpcHandlerFailure::Generic(other),
        }
    }
}

impl From<RpcHandlerFailure> for RpcError {
    fn from(failure: RpcHandlerFailure) -> Self {
        match failure {
            RpcHandlerFailure::Structured(rpc_error) => rpc_error,
            RpcHandlerFailure::Generic(err) => RpcError::application(err.to_string()),
            RpcHandlerFailure::Unclassified(payload) => {
                if let Some(message) = payload.downcast_ref::<&'static str>() {
                    RpcError::application(*message)
                } else if let Some(message) = payload.downcast_ref::<String>() {
                    RpcError::application(message.clone())
                } else if let Some(rpc_error) = payload.downcast_ref::<RpcError>() {
                    rpc_error.clone()
                } else {
                    RpcError::application(RPC_UNKNOWN_ERROR_MESSAGE)
                }
            }
        }
    }
}

impl fmt::Debug for RpcHandlerFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpcHandlerFailure::Structured(e) => f.debug_tuple("Structured").field(e).finish(),
            RpcHandlerFailure::Generic(e) => f.debug_tuple("Generic").field(e).finish(),
            RpcHandlerFailure::Unclassified(_) => f.write_str("Unclassified(..)"),
        }
    }
}
