pub mod service_definition;

pub use service_definition::{Add, Echo, Mult};

use peer_rpc::rpc::{RpcMethodDefinition, RpcNode};
use peer_rpc::transport::RpcTransport;

/// Registers the handlers for every method in `service_definition`.
pub fn register_services<T: RpcTransport>(node: &RpcNode<T>) {
    node.add_typed_method::<Add, _, _>(|numbers, _sender| async move {
        Ok(numbers.iter().sum::<f64>())
    });

    node.add_typed_method::<Mult, _, _>(|numbers, _sender| async move {
        Ok(numbers.iter().product::<f64>())
    });

    node.add_typed_method::<Echo, _, _>(|bytes, sender| async move {
        tracing::debug!("{} echoed {} bytes", sender, bytes.len());
        Ok(bytes)
    });
}

/// Every method name this crate serves.
pub fn service_method_names() -> [&'static str; 3] {
    [Add::METHOD_NAME, Mult::METHOD_NAME, Echo::METHOD_NAME]
}
