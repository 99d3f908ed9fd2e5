use crate::rpc::{
    RpcCallTracker, RpcCodec, RpcError, RpcHandlerError, RpcHandlerFailure, RpcMessage,
    RpcMethodDefinition, RpcMethodHandler, RpcMethodRegistry, RpcMethodResult, RpcNodeConfig,
    RpcRequest, RpcResponse,
};
use crate::transport::{RpcInboundHandler, RpcTransport, RpcTransportError};
use crate::utils::IncrementU64Id;
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::Mutex;

/// The RPC orchestrator.
///
/// An `RpcNode` registers named methods that remote peers may invoke, calls
/// methods on remote peers and awaits their correlated results, and sends
/// fire-and-forget notifications. Every node is both a caller and a callee.
///
/// Cloning an `RpcNode` yields another handle to the same node.
///
/// ```no_run
/// use peer_rpc::rpc::{RpcNode, RpcNodeConfig};
/// use peer_rpc::transport::MemoryNetwork;
///
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// let network = MemoryNetwork::new();
/// let alice = RpcNode::new(network.endpoint("alice"), RpcNodeConfig::default());
/// let bob = RpcNode::new(network.endpoint("bob"), RpcNodeConfig::default());
///
/// bob.add_method("echo", |params, _sender| async move { Ok(params) });
///
/// alice.start().await?;
/// bob.start().await?;
///
/// let reply = alice.request(&"bob".into(), "echo", Some(b"hi".to_vec())).await?;
/// assert_eq!(reply, Some(b"hi".to_vec()));
/// # Ok(())
/// # }
/// ```
pub struct RpcNode<T: RpcTransport> {
    inner: Arc<RpcNodeInner<T>>,
}

impl<T: RpcTransport> Clone for RpcNode<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

struct RpcNodeInner<T: RpcTransport> {
    transport: T,
    config: RpcNodeConfig,
    method_registry: RpcMethodRegistry<T::Peer>,
    call_tracker: RpcCallTracker,
    message_ids: IncrementU64Id,
    // Serializes start/stop; `true` while running.
    running: Mutex<bool>,
}

impl<T: RpcTransport> RpcNode<T> {
    pub fn new(transport: T, config: RpcNodeConfig) -> Self {
        Self {
            inner: Arc::new(RpcNodeInner {
                transport,
                config,
                method_registry: RpcMethodRegistry::new(),
                call_tracker: RpcCallTracker::new(),
                message_ids: IncrementU64Id::new(),
                running: Mutex::new(false),
            }),
        }
    }

    pub fn config(&self) -> &RpcNodeConfig {
        &self.inner.config
    }

    /// The transport this node sends and receives through.
    pub fn transport(&self) -> &T {
        &self.inner.transport
    }

    /// Registers the inbound callback and starts the transport on the
    /// configured protocol. Calling it on a running node does nothing.
    ///
    /// Must be called from within a Tokio runtime; inbound messages are
    /// dispatched on that runtime.
    ///
    /// The inbound callback is installed before the transport starts so that
    /// no early message is missed. If the transport fails to start, the
    /// callback stays installed and the node stays stopped; a later `start`
    /// replaces it.
    pub async fn start(&self) -> Result<(), RpcTransportError> {
        let mut running = self.inner.running.lock().await;
        if *running {
            return Ok(());
        }

        let node = Arc::downgrade(&self.inner);
        let runtime = Handle::current();
        let on_message: RpcInboundHandler<T::Peer> =
            Arc::new(move |bytes: Vec<u8>, sender: T::Peer| {
                RpcNodeInner::accept_inbound(&node, &runtime, bytes, sender);
            });
        self.inner.transport.on_message(on_message);

        self.inner
            .transport
            .start(&self.inner.config.protocol)
            .await?;
        *running = true;

        tracing::info!("RPC node started on {}", self.inner.config.protocol);
        Ok(())
    }

    /// Stops the transport, then rejects every call still pending with the
    /// node-stopped error. Calling it on a stopped node does nothing.
    pub async fn stop(&self) -> Result<(), RpcTransportError> {
        let mut running = self.inner.running.lock().await;
        if !*running {
            return Ok(());
        }

        let stopped = self.inner.transport.stop().await;
        *running = false;

        let abandoned = self.inner.call_tracker.reject_all(RpcError::node_stopped());
        tracing::info!(
            "RPC node stopped on {} ({} pending calls rejected)",
            self.inner.config.protocol,
            abandoned
        );

        stopped
    }

    pub async fn is_started(&self) -> bool {
        *self.inner.running.lock().await
    }

    /// Registers `handler` under `method_name`, replacing any previous one.
    pub fn add_method<F, Fut>(&self, method_name: impl Into<String>, handler: F)
    where
        F: Fn(Option<Vec<u8>>, T::Peer) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = RpcMethodResult> + Send + 'static,
    {
        self.inner.method_registry.register(method_name, handler);
    }

    /// Registers a typed handler for the method `M` defines.
    ///
    /// Params that fail to decode are reported back to the caller as an
    /// application error.
    pub fn add_typed_method<M, F, Fut>(&self, handler: F)
    where
        M: RpcMethodDefinition + 'static,
        M::Input: Send + 'static,
        M::Output: Send + 'static,
        F: Fn(M::Input, T::Peer) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<M::Output, RpcHandlerError>> + Send + 'static,
    {
        let handler = Arc::new(handler);
        self.add_method(M::METHOD_NAME, move |params, sender| {
            let handler = handler.clone();
            async move {
                let input = M::decode_request(params.as_deref().unwrap_or(&[]))?;
                let output = handler(input, sender).await?;
                Ok::<_, RpcHandlerError>(Some(M::encode_response(output)?))
            }
        });
    }

    pub fn has_method(&self, method_name: &str) -> bool {
        self.inner.method_registry.contains(method_name)
    }

    /// Number of outbound calls still waiting for an outcome.
    pub fn pending_calls(&self) -> usize {
        self.inner.call_tracker.len()
    }

    /// Invokes `method_name` on `peer` and waits for the correlated outcome,
    /// for at most the configured timeout.
    pub async fn request(
        &self,
        peer: &T::Peer,
        method_name: &str,
        params: Option<Vec<u8>>,
    ) -> Result<Option<Vec<u8>>, RpcError> {
        self.request_with_timeout(peer, method_name, params, self.inner.config.timeout())
            .await
    }

    /// Like `request`, with a per-call timeout. `None` waits indefinitely.
    pub async fn request_with_timeout(
        &self,
        peer: &T::Peer,
        method_name: &str,
        params: Option<Vec<u8>>,
        timeout: Option<Duration>,
    ) -> Result<Option<Vec<u8>>, RpcError> {
        let id = self.inner.message_ids.next_id();
        let bytes = RpcCodec::encode_request(method_name, Some(id), params);

        // Track before sending so a fast response always finds its slot.
        let pending_call = self.inner.call_tracker.register(id);
        let _abandon = AbandonedCallGuard {
            call_tracker: &self.inner.call_tracker,
            id,
        };

        if let Err(err) = self.inner.transport.send(peer, bytes).await {
            tracing::debug!(
                "Request {} (`{}`) to {} could not be sent: {}",
                id,
                method_name,
                peer,
                err
            );
            return Err(RpcError::send_failure(err.to_string()));
        }

        if let Some(timeout) = timeout {
            self.inner.call_tracker.arm_timeout(id, timeout);
        }

        pending_call.await
    }

    /// Calls the method `M` defines, encoding `input` and decoding the result.
    pub async fn call_method<M>(
        &self,
        peer: &T::Peer,
        input: M::Input,
    ) -> Result<M::Output, RpcError>
    where
        M: RpcMethodDefinition,
    {
        let params = M::encode_request(input).map_err(|e| RpcError::application(e.to_string()))?;
        let result = self.request(peer, M::METHOD_NAME, Some(params)).await?;

        M::decode_response(result.as_deref().unwrap_or(&[]))
            .map_err(|e| RpcError::application(e.to_string()))
    }

    /// Sends a notification. Delivery failures are not reported.
    pub async fn notify(&self, peer: &T::Peer, method_name: &str, params: Option<Vec<u8>>) {
        let bytes = RpcCodec::encode_request(method_name, None, params);

        if let Err(err) = self.inner.transport.send(peer, bytes).await {
            tracing::debug!(
                "Notification `{}` to {} was not delivered: {}",
                method_name,
                peer,
                err
            );
        }
    }
}

impl<T: RpcTransport> RpcNodeInner<T> {
    fn accept_inbound(node: &Weak<Self>, runtime: &Handle, bytes: Vec<u8>, sender: T::Peer) {
        let Some(node) = node.upgrade() else {
            return;
        };

        // Each message gets its own task so slow handlers never hold up delivery.
        runtime.spawn(async move {
            node.dispatch(bytes, sender).await;
        });
    }

    async fn dispatch(&self, bytes: Vec<u8>, sender: T::Peer) {
        let message = match RpcCodec::decode(&bytes) {
            Ok(message) => message,
            Err(err) => {
                tracing::warn!("Dropped undecodable message from {}: {}", sender, err);
                return;
            }
        };

        match message {
            RpcMessage::Request(request) => self.handle_request(request, sender).await,
            RpcMessage::Response(response) => self.handle_response(response, &sender),
        }
    }

    async fn handle_request(&self, request: RpcRequest, sender: T::Peer) {
        let RpcRequest { id, name, params } = request;
        let handler = self.method_registry.lookup(&name);

        let Some(id) = id else {
            // Notifications are never answered, whatever happens.
            match handler {
                Some(handler) => {
                    if let Err(err) = invoke(handler, params, sender.clone()).await {
                        tracing::debug!(
                            "Notification handler `{}` from {} failed: {}",
                            name,
                            sender,
                            err
                        );
                    }
                }
                None => {
                    tracing::trace!("Ignored notification for unknown method `{}`", name);
                }
            }
            return;
        };

        let response = match handler {
            None => {
                tracing::debug!("Request {} from {} names unknown method `{}`", id, sender, name);
                RpcResponse::failure(id, RpcError::method_not_found(&name))
            }
            Some(handler) => match invoke(handler, params, sender.clone()).await {
                Ok(result) => RpcResponse::success(id, result),
                Err(err) => {
                    tracing::debug!("Handler `{}` failed for request {}: {}", name, id, err);
                    RpcResponse::failure(id, err)
                }
            },
        };

        let bytes = RpcCodec::encode(&RpcMessage::Response(response));
        if let Err(err) = self.transport.send(&sender, bytes).await {
            tracing::warn!("Response {} to {} could not be sent: {}", id, sender, err);
        }
    }

    fn handle_response(&self, response: RpcResponse, sender: &T::Peer) {
        let id = response.id;
        let settled = match response.into_outcome() {
            Ok(result) => self.call_tracker.resolve(id, result),
            Err(error) => self.call_tracker.reject(id, error),
        };

        if !settled {
            tracing::trace!("Discarded response {} from {}: no pending call", id, sender);
        }
    }
}

/// Stops tracking a call when its `request` future is dropped, whether it was
/// still sending or already waiting. Once the call has settled this does nothing.
struct AbandonedCallGuard<'a> {
    call_tracker: &'a RpcCallTracker,
    id: u64,
}

impl Drop for AbandonedCallGuard<'_> {
    fn drop(&mut self) {
        if self.call_tracker.discard(self.id) {
            tracing::trace!("RPC call {} abandoned by its caller", self.id);
        }
    }
}

/// Runs a handler to completion, turning its error or panic into an `RpcError`.
async fn invoke<P>(
    handler: RpcMethodHandler<P>,
    params: Option<Vec<u8>>,
    sender: P,
) -> Result<Option<Vec<u8>>, RpcError> {
    // The handler is called inside the guarded future so a panic before its
    // first poll is caught too.
    let guarded = AssertUnwindSafe(async move { handler(params, sender).await });

    match guarded.catch_unwind().await {
        Ok(Ok(result)) => Ok(result),
        Ok(Err(err)) => Err(RpcHandlerFailure::from(err).into()),
        Err(panic_payload) => Err(RpcHandlerFailure::Unclassified(panic_payload).into()),
    }
}
