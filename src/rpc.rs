mod rpc_call_tracker;
mod rpc_codec;
mod rpc_error;
mod rpc_error_code;
mod rpc_message;
mod rpc_method_definition;
mod rpc_method_registry;
mod rpc_node;
mod rpc_node_config;

pub use rpc_call_tracker::{RpcCallOutcome, RpcCallTracker, RpcPendingCall};
pub use rpc_codec::{RpcCodec, RpcDecodeError};
pub use rpc_error::{RpcError, RpcHandlerError, RpcHandlerFailure};
pub use rpc_error_code::RpcErrorCode;
pub use rpc_message::{RpcMessage, RpcRequest, RpcResponse};
pub use rpc_method_definition::RpcMethodDefinition;
pub use rpc_method_registry::{RpcMethodHandler, RpcMethodRegistry, RpcMethodResult};
pub use rpc_node::RpcNode;
pub use rpc_node_config::RpcNodeConfig;
