use crate::rpc::RpcError;
use bitcode::{Decode, Encode};

/// A method invocation. Without an `id` it is a notification and is never
/// answered.
#[derive(Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct RpcRequest {
    /// Correlation ID; `None` marks a notification.
    pub id: Option<u64>,

    /// Name of the remote method to invoke.
    pub name: String,

    /// Schemaless, caller-encoded parameters.
    pub params: Option<Vec<u8>>,
}

impl RpcRequest {
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// The answer to an `RpcRequest` that carried an `id`.
///
/// At most one of `result` and `error` is present. A response without an
/// error is a success, even if the handler produced no result.
#[derive(Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub struct RpcResponse {
    /// The `id` of the request being answered.
    pub id: u64,
    pub result: Option<Vec<u8>>,
    pub error: Option<RpcError>,
}

impl RpcResponse {
    pub fn success(id: u64, result: Option<Vec<u8>>) -> Self {
        Self {
            id,
            result,
            error: None,
        }
    }

    pub fn failure(id: u64, error: RpcError) -> Self {
        Self {
            id,
            result: None,
            error: Some(error),
        }
    }

    /// Converts the response into the outcome the waiting caller sees.
    pub fn into_outcome(self) -> Result<Option<Vec<u8>>, RpcError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.result),
        }
    }
}

/// Every message exchanged between nodes is exactly one of these.
#[derive(Encode, Decode, Debug, Clone, PartialEq, Eq)]
pub enum RpcMessage {
    Request(RpcRequest),
    Response(RpcResponse),
}
