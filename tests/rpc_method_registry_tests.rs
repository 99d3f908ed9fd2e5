use peer_rpc::rpc::{RpcError, RpcMethodRegistry};

#[tokio::test]
async fn lookup_returns_the_registered_handler() {
    let registry = RpcMethodRegistry::<String>::new();
    registry.register("greet", |params: Option<Vec<u8>>, sender: String| async move {
        let mut reply = format!("hello {sender}").into_bytes();
        reply.extend(params.unwrap_or_default());
        Ok(Some(reply))
    });

    let handler = registry.lookup("greet").expect("handler should be registered");
    let result = handler(Some(b"!".to_vec()), "alice".to_string()).await.unwrap();

    assert_eq!(result, Some(b"hello alice!".to_vec()));
    assert!(registry.lookup("missing").is_none());
}

#[tokio::test]
async fn last_registration_wins() {
    let registry = RpcMethodRegistry::<String>::new();
    registry.register("version", |_, _| async { Ok(Some(vec![1])) });
    registry.register("version", |_, _| async { Ok(Some(vec![2])) });

    assert_eq!(registry.len(), 1);

    let handler = registry.lookup("version").unwrap();
    assert_eq!(handler(None, String::new()).await.unwrap(), Some(vec![2]));
}

#[tokio::test]
async fn handlers_may_fail() {
    let registry = RpcMethodRegistry::<String>::new();
    registry.register("fail", |_, _| async {
        Err(RpcError::new(12, "refused").into())
    });

    let handler = registry.lookup("fail").unwrap();
    let err = handler(None, String::new()).await.unwrap_err();
    assert_eq!(err.to_string(), RpcError::new(12, "refused").to_string());
}

#[test]
fn names_are_listed_sorted() {
    let registry = RpcMethodRegistry::<String>::new();
    assert!(registry.is_empty());

    registry.register("mult", |_, _| async { Ok(None) });
    registry.register("add", |_, _| async { Ok(None) });

    assert!(registry.contains("add"));
    assert!(!registry.contains("sub"));
    assert_eq!(registry.method_names(), vec!["add".to_string(), "mult".to_string()]);
}
