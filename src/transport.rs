mod memory_transport;
mod rpc_transport;

pub use memory_transport::{MemoryNetwork, MemoryPeerId, MemoryTransport};
pub use rpc_transport::{RpcInboundHandler, RpcPeer, RpcTransport, RpcTransportError};
