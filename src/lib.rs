//! Peer-addressed RPC correlation over any message transport.
//!
//! An [`rpc::RpcNode`] registers named methods, calls methods on remote peers
//! and awaits their correlated results, and sends fire-and-forget
//! notifications. Bytes move through an [`transport::RpcTransport`]; the
//! crate ships an in-process [`transport::MemoryNetwork`] for tests and demos.

pub mod constants;
pub mod rpc;
pub mod transport;
pub mod utils;
