//! In-process transport.
//!
//! Endpoints created from one `MemoryNetwork` exchange whole messages through
//! Tokio channels. Nothing leaves the process, there is no framing, and
//! delivery order per sender/receiver pair is FIFO. It exists so that nodes
//! can be wired together in tests, demos and benchmarks without sockets.

use super::{RpcInboundHandler, RpcTransport, RpcTransportError};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Peer identity on a `MemoryNetwork`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MemoryPeerId(Arc<str>);

impl MemoryPeerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<T> From<T> for MemoryPeerId
where
    T: Into<Arc<str>>,
{
    fn from(value: T) -> Self {
        MemoryPeerId(value.into())
    }
}

impl fmt::Display for MemoryPeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

struct Envelope {
    bytes: Vec<u8>,
    from: MemoryPeerId,
}

type RouteKey = (MemoryPeerId, String);

/// Routing table shared by every endpoint created from it.
///
/// An endpoint is reachable on a protocol only between its `start` and `stop`.
#[derive(Default)]
pub struct MemoryNetwork {
    routes: RwLock<HashMap<RouteKey, mpsc::UnboundedSender<Envelope>>>,
}

impl MemoryNetwork {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Creates a (stopped) endpoint that will be addressed as `peer_id`.
    pub fn endpoint(self: &Arc<Self>, peer_id: impl Into<MemoryPeerId>) -> MemoryTransport {
        MemoryTransport {
            network: self.clone(),
            local_peer: peer_id.into(),
            handler: Arc::new(Mutex::new(None)),
            running: Mutex::new(None),
        }
    }

    pub fn is_reachable(&self, peer: &MemoryPeerId, protocol: &str) -> bool {
        self.routes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&(peer.clone(), protocol.to_string()))
    }

    fn route(&self, peer: &MemoryPeerId, protocol: &str) -> Option<mpsc::UnboundedSender<Envelope>> {
        self.routes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(peer.clone(), protocol.to_string()))
            .cloned()
    }

    fn attach(
        &self,
        peer: &MemoryPeerId,
        protocol: &str,
        inbox: mpsc::UnboundedSender<Envelope>,
    ) -> bool {
        let mut routes = self.routes.write().unwrap_or_else(PoisonError::into_inner);
        let key = (peer.clone(), protocol.to_string());

        if routes.contains_key(&key) {
            return false;
        }
        routes.insert(key, inbox);
        true
    }

    fn detach(&self, peer: &MemoryPeerId, protocol: &str) {
        self.routes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&(peer.clone(), protocol.to_string()));
    }
}

struct RunningEndpoint {
    protocol: String,
    drain_task: JoinHandle<()>,
}

/// One endpoint on a `MemoryNetwork`.
pub struct MemoryTransport {
    network: Arc<MemoryNetwork>,
    local_peer: MemoryPeerId,
    handler: Arc<Mutex<Option<RpcInboundHandler<MemoryPeerId>>>>,
    running: Mutex<Option<RunningEndpoint>>,
}

impl MemoryTransport {
    pub fn local_peer(&self) -> &MemoryPeerId {
        &self.local_peer
    }

    pub fn is_running(&self) -> bool {
        self.running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn shutdown(&self) -> bool {
        let running = self
            .running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();

        match running {
            Some(running) => {
                self.network.detach(&self.local_peer, &running.protocol);
                running.drain_task.abort();
                true
            }
            None => false,
        }
    }
}

#[async_trait::async_trait]
impl RpcTransport for MemoryTransport {
    type Peer = MemoryPeerId;

    async fn start(&self, protocol: &str) -> Result<(), RpcTransportError> {
        let mut running = self.running.lock().unwrap_or_else(PoisonError::into_inner);
        if running.is_some() {
            return Err(RpcTransportError::AlreadyStarted);
        }

        let (inbox_tx, mut inbox_rx) = mpsc::unbounded_channel::<Envelope>();
        if !self.network.attach(&self.local_peer, protocol, inbox_tx) {
            return Err(RpcTransportError::Io(format!(
                "{} is already attached on {}",
                self.local_peer, protocol
            )));
        }

        let handler = self.handler.clone();
        let local_peer = self.local_peer.clone();
        let drain_task = tokio::spawn(async move {
            while let Some(envelope) = inbox_rx.recv().await {
                let current = handler
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .clone();

                match current {
                    Some(on_message) => on_message(envelope.bytes, envelope.from),
                    None => tracing::warn!(
                        "{} dropped a message from {}: no handler set",
                        local_peer,
                        envelope.from
                    ),
                }
            }
        });

        *running = Some(RunningEndpoint {
            protocol: protocol.to_string(),
            drain_task,
        });

        tracing::trace!("{} attached on {}", self.local_peer, protocol);
        Ok(())
    }

    async fn stop(&self) -> Result<(), RpcTransportError> {
        if self.shutdown() {
            tracing::trace!("{} detached", self.local_peer);
        }
        Ok(())
    }

    async fn send(&self, peer: &MemoryPeerId, bytes: Vec<u8>) -> Result<(), RpcTransportError> {
        let protocol = self
            .running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|running| running.protocol.clone())
            .ok_or(RpcTransportError::NotStarted)?;

        let unreachable = || RpcTransportError::Unreachable(format!("{} on {}", peer, protocol));

        let route = self.network.route(peer, &protocol).ok_or_else(unreachable)?;
        route
            .send(Envelope {
                bytes,
                from: self.local_peer.clone(),
            })
            .map_err(|_| unreachable())
    }

    fn on_message(&self, handler: RpcInboundHandler<MemoryPeerId>) {
        *self.handler.lock().unwrap_or_else(PoisonError::into_inner) = Some(handler);
    }
}

impl Drop for MemoryTransport {
    fn drop(&mut self) {
        self.shutdown();
    }
}
