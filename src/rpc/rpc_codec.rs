use crate::rpc::{RpcError, RpcMessage, RpcRequest, RpcResponse};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum RpcDecodeError {
    /// The bytes are not a valid encoded `RpcMessage`.
    Malformed(String),

    /// A response carried both a result and an error.
    AmbiguousResponse { id: u64 },
}

impl fmt::Display for RpcDecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpcDecodeError::Malformed(reason) => write!(f, "malformed RPC message: {reason}"),
            RpcDecodeError::AmbiguousResponse { id } => {
                write!(f, "response {id} carries both a result and an error")
            }
        }
    }
}

impl std::error::Error for RpcDecodeError {}

/// Converts between the logical message schema and bytes.
///
/// Stateless; encoding is deterministic, so equal messages always produce
/// equal bytes.
pub struct RpcCodec;

impl RpcCodec {
    /// Encodes a request, or a notification when `id` is `None`.
    pub fn encode_request(name: &str, id: Option<u64>, params: Option<Vec<u8>>) -> Vec<u8> {
        Self::encode(&RpcMessage::Request(RpcRequest {
            id,
            name: name.to_string(),
            params,
        }))
    }

    /// Encodes a response. If both `result` and `error` are given, the error
    /// wins and the result is not carried.
    pub fn encode_response(id: u64, result: Option<Vec<u8>>, error: Option<RpcError>) -> Vec<u8> {
        let response = match error {
            Some(error) => RpcResponse::failure(id, error),
            None => RpcResponse::success(id, result),
        };

        Self::encode(&RpcMessage::Response(response))
    }

    pub fn encode(message: &RpcMessage) -> Vec<u8> {
        bitcode::encode(message)
    }

    pub fn decode(bytes: &[u8]) -> Result<RpcMessage, RpcDecodeError> {
        let message = bitcode::decode::<RpcMessage>(bytes)
            .map_err(|e| RpcDecodeError::Malformed(e.to_string()))?;

        if let RpcMessage::Response(response) = &message {
            if response.result.is_some() && response.error.is_some() {
                return Err(RpcDecodeError::AmbiguousResponse { id: response.id });
            }
        }

        Ok(message)
    }
}
