use std::fmt::{self, Debug, Display};
use std::hash::Hash;
use std::sync::Arc;

/// Identity of a remote endpoint, as supplied by a transport.
///
/// Never constructed by the RPC layer; it is only compared, cloned, logged
/// and handed back to the transport.
pub trait RpcPeer: Clone + Eq + Hash + Debug + Display + Send + Sync + 'static {}
impl<T: Clone + Eq + Hash + Debug + Display + Send + Sync + 'static> RpcPeer for T {}

/// Callback a transport invokes once per inbound, fully reassembled message.
pub type RpcInboundHandler<P> = Arc<dyn Fn(Vec<u8>, P) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RpcTransportError {
    /// The transport was used before `start` (or after `stop`).
    NotStarted,

    /// `start` was called on a transport that is already running.
    AlreadyStarted,

    /// No route to the peer on the requested protocol.
    Unreachable(String),

    /// Any other failure reported by the underlying connection.
    Io(String),
}

impl Display for RpcTransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpcTransportError::NotStarted => write!(f, "transport is not started"),
            RpcTransportError::AlreadyStarted => write!(f, "transport is already started"),
            RpcTransportError::Unreachable(reason) => write!(f, "peer unreachable: {}", reason),
            RpcTransportError::Io(reason) => write!(f, "transport I/O error: {}", reason),
        }
    }
}

impl std::error::Error for RpcTransportError {}

/// The peer-addressed message substrate an `RpcNode` runs on.
///
/// Implementations own connection management and framing. The RPC layer only
/// hands them whole messages and expects whole messages back through the
/// callback registered with `on_message`.
#[async_trait::async_trait]
pub trait RpcTransport: Send + Sync + 'static {
    type Peer: RpcPeer;

    /// Starts accepting and delivering messages for `protocol`.
    async fn start(&self, protocol: &str) -> Result<(), RpcTransportError>;

    async fn stop(&self) -> Result<(), RpcTransportError>;

    /// Delivers `bytes` to `peer` as one message.
    async fn send(&self, peer: &Self::Peer, bytes: Vec<u8>) -> Result<(), RpcTransportError>;

    /// Sets the callback for inbound messages, replacing any previous one.
    fn on_message(&self, handler: RpcInboundHandler<Self::Peer>);
}
