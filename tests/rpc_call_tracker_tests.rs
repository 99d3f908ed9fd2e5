use peer_rpc::rpc::{RpcCallTracker, RpcError, RpcErrorCode};
use std::time::Duration;

#[tokio::test]
async fn resolve_fulfils_the_matching_call_only() {
    let tracker = RpcCallTracker::new();
    let first = tracker.create(1, None);
    let second = tracker.create(2, None);

    assert!(tracker.resolve(1, Some(b"one".to_vec())));
    assert_eq!(first.await, Ok(Some(b"one".to_vec())));

    assert!(tracker.contains(2));
    assert_eq!(tracker.len(), 1);

    assert!(tracker.reject(2, RpcError::new(5, "two failed")));
    assert_eq!(second.await, Err(RpcError::new(5, "two failed")));
    assert!(tracker.is_empty());
}

#[tokio::test]
async fn unknown_ids_are_ignored() {
    let tracker = RpcCallTracker::new();

    assert!(!tracker.resolve(99, None));
    assert!(!tracker.reject(99, RpcError::application("late")));
    assert!(!tracker.discard(99));
    assert!(tracker.is_empty());
}

#[tokio::test]
async fn only_the_first_settlement_takes_effect() {
    let tracker = RpcCallTracker::new();
    let call = tracker.create(3, None);

    assert!(tracker.resolve(3, None));
    assert!(!tracker.resolve(3, Some(vec![1])));
    assert!(!tracker.reject(3, RpcError::application("too late")));

    assert_eq!(call.await, Ok(None));
}

#[tokio::test]
async fn watchdog_rejects_with_timeout() {
    let tracker = RpcCallTracker::new();
    let call = tracker.create(7, Some(Duration::from_millis(50)));

    let outcome = call.await;
    assert_eq!(outcome, Err(RpcError::timeout()));
    assert_eq!(outcome.unwrap_err().code, 0);
    assert!(!tracker.contains(7));

    // A response arriving after the timeout finds nothing to settle.
    assert!(!tracker.resolve(7, Some(vec![1])));
}

#[tokio::test]
async fn settling_cancels_the_watchdog() {
    let tracker = RpcCallTracker::new();
    let call = tracker.create(8, Some(Duration::from_millis(30)));

    assert!(tracker.resolve(8, Some(vec![8])));
    assert_eq!(call.await, Ok(Some(vec![8])));

    // Re-using the id after settlement must not be hit by the old watchdog.
    let reused = tracker.create(8, None);
    tokio::time::sleep(Duration::from_millis(80)).await;
    assert!(tracker.contains(8));

    assert!(tracker.resolve(8, None));
    assert_eq!(reused.await, Ok(None));
}

#[tokio::test]
async fn negative_timeout_waits_until_settled() {
    let tracker = RpcCallTracker::new();
    let call = tracker.create(11, None);

    tokio::time::sleep(Duration::from_millis(60)).await;
    assert!(tracker.contains(11));

    tracker.resolve(11, Some(vec![11]));
    assert_eq!(call.await, Ok(Some(vec![11])));
}

#[tokio::test]
async fn arming_a_settled_call_is_a_no_op() {
    let tracker = RpcCallTracker::new();
    let call = tracker.register(12);

    assert!(tracker.resolve(12, None));
    assert!(!tracker.arm_timeout(12, Duration::from_millis(1)));
    assert_eq!(call.await, Ok(None));
}

#[tokio::test]
async fn arming_after_registration_times_out() {
    let tracker = RpcCallTracker::new();
    let call = tracker.register(13);

    assert!(tracker.arm_timeout(13, Duration::from_millis(20)));
    assert_eq!(call.await, Err(RpcError::timeout()));
}

#[tokio::test]
async fn timeouts_are_independent() {
    let tracker = RpcCallTracker::new();
    let short = tracker.create(20, Some(Duration::from_millis(20)));
    let long = tracker.create(21, Some(Duration::from_millis(5_000)));

    assert_eq!(short.await, Err(RpcError::timeout()));
    assert!(tracker.contains(21));

    tracker.resolve(21, Some(vec![21]));
    assert_eq!(long.await, Ok(Some(vec![21])));
}

#[tokio::test]
async fn reject_all_settles_every_pending_call() {
    let tracker = RpcCallTracker::new();
    let calls: Vec<_> = (0..5)
        .map(|id| tracker.create(id, Some(Duration::from_secs(5))))
        .collect();

    assert_eq!(tracker.reject_all(RpcError::node_stopped()), 5);
    assert!(tracker.is_empty());

    for call in calls {
        let err = call.await.unwrap_err();
        assert_eq!(err.kind(), Some(RpcErrorCode::NodeStopped));
    }
}

#[tokio::test]
async fn dropping_the_tracker_releases_waiters() {
    let tracker = RpcCallTracker::new();
    let call = tracker.create(30, Some(Duration::from_secs(5)));
    assert_eq!(call.id(), 30);

    drop(tracker);
    assert_eq!(call.await, Err(RpcError::node_stopped()));
}

#[tokio::test]
async fn discard_forgets_without_settling() {
    let tracker = RpcCallTracker::new();
    let _call = tracker.create(40, Some(Duration::from_millis(10)));

    assert!(tracker.discard(40));
    assert!(!tracker.contains(40));
    assert!(!tracker.resolve(40, None));
}

#[test]
fn arming_an_unknown_call_starts_no_watchdog() {
    // No runtime here: spawning a watchdog would panic.
    let tracker = RpcCallTracker::new();
    assert!(!tracker.arm_timeout(30, Duration::from_millis(1)));
    assert!(tracker.is_empty());
}

#[tokio::test]
async fn re_registering_a_pending_id_supersedes_the_earlier_call() {
    let tracker = RpcCallTracker::new();
    let first = tracker.create(40, Some(Duration::from_millis(5_000)));
    let second = tracker.register(40);

    let err = first.await.unwrap_err();
    assert_eq!(err, RpcError::superseded());
    assert_ne!(err.kind(), Some(RpcErrorCode::NodeStopped));

    assert_eq!(tracker.len(), 1);
    assert!(tracker.resolve(40, Some(vec![40])));
    assert_eq!(second.await, Ok(Some(vec![40])));
}
