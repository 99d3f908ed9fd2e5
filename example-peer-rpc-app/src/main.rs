use example_peer_rpc_app::{Add, Echo, Mult, register_services};
use peer_rpc::rpc::{RpcMethodDefinition, RpcNode, RpcNodeConfig};
use peer_rpc::transport::{MemoryNetwork, MemoryPeerId};
use tokio::join;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let network = MemoryNetwork::new();

    let server = RpcNode::new(network.endpoint("server"), RpcNodeConfig::default());
    register_services(&server);
    server.start().await?;

    let client = RpcNode::new(
        network.endpoint("client"),
        RpcNodeConfig::default().with_timeout_ms(1_000),
    );
    client.start().await?;

    let server_id: MemoryPeerId = "server".into();

    // `join!` will await all responses before proceeding
    let (res1, res2, res3, res4) = join!(
        client.call_method::<Add>(&server_id, vec![1.0, 2.0, 3.0]),
        client.call_method::<Add>(&server_id, vec![8.0, 3.0, 7.0]),
        client.call_method::<Mult>(&server_id, vec![8.0, 3.0, 7.0]),
        client.call_method::<Echo>(&server_id, b"hello".to_vec())
    );

    println!("Result from first add(): {:?}", res1);
    println!("Result from second add(): {:?}", res2);
    println!("Result from first mult(): {:?}", res3);
    println!("Result from echo(): {:?}", res4.map(String::from_utf8));

    let missing = client.request(&server_id, "divide", None).await;
    println!("Result from divide(): {:?}", missing);

    // Notifications never produce a reply, so there is nothing to await but the send.
    client
        .notify(&server_id, Echo::METHOD_NAME, Some(b"fire and forget".to_vec()))
        .await;

    client.stop().await?;
    server.stop().await?;

    Ok(())
}
