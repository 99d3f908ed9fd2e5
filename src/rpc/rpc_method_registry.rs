use crate::rpc::RpcHandlerError;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};

/// What a method handler resolves to: an optional result payload, or an
/// error that is normalized and sent back to the caller.
pub type RpcMethodResult = Result<Option<Vec<u8>>, RpcHandlerError>;

/// A registered method, invoked with the request params and the sender's
/// peer identity.
pub type RpcMethodHandler<P> = Arc<
    dyn Fn(Option<Vec<u8>>, P) -> Pin<Box<dyn Future<Output = RpcMethodResult> + Send>>
        + Send
        + Sync,
>;

/// Maps method names to their handlers.
///
/// Registration only; a later registration under the same name replaces the
/// earlier one.
pub struct RpcMethodRegistry<P> {
    handlers: Mutex<HashMap<String, RpcMethodHandler<P>>>,
}

impl<P> Default for RpcMethodRegistry<P>
where
    P: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<P> RpcMethodRegistry<P>
where
    P: Send + 'static,
{
    pub fn new() -> Self {
        Self {
            handlers: Mutex::new(HashMap::new()),
        }
    }

    pub fn register<F, Fut>(&self, method_name: impl Into<String>, handler: F)
    where
        F: Fn(Option<Vec<u8>>, P) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = RpcMethodResult> + Send + 'static,
    {
        let wrapped = move |params: Option<Vec<u8>>, sender: P| {
            Box::pin(handler(params, sender)) as Pin<Box<dyn Future<Output = _> + Send>>
        };

        let method_name = method_name.into();
        let replaced = self
            .handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(method_name.clone(), Arc::new(wrapped));

        if replaced.is_some() {
            tracing::debug!("Replaced handler for method `{}`", method_name);
        }
    }

    pub fn lookup(&self, method_name: &str) -> Option<RpcMethodHandler<P>> {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(method_name)
            .cloned()
    }

    pub fn contains(&self, method_name: &str) -> bool {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(method_name)
    }

    pub fn len(&self) -> usize {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered method names, sorted.
    pub fn method_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }
}
