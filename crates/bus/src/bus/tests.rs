use std::time::Duration;

use pretty_assertions::assert_eq;

use super::*;

fn text(payload: &Payload) -> &str {
	payload.downcast_ref::<String>().map(String::as_str).unwrap_or("<not a string>")
}

#[tokio::test]
async fn request_resolves_with_later_broadcast() {
	let bus = Bus::new();
	let request = bus.request("topic/a");
	assert_eq!(bus.pending_requests("topic/a"), 1);

	bus.broadcast("topic/a", String::from("late"));
	let payload = request.await;
	assert_eq!(text(&payload), "late");
	assert_eq!(bus.pending_requests("topic/a"), 0);
}

#[tokio::test]
async fn request_resolves_with_retained_value() {
	let bus = Bus::new();
	bus.broadcast("topic/a", String::from("first"));
	bus.broadcast("topic/a", String::from("second"));

	let payload = bus.request("topic/a").await;
	assert_eq!(text(&payload), "second");
}

#[tokio::test]
async fn every_pending_request_is_resolved() {
	let bus = Bus::new();
	let first = bus.request("topic/a");
	let second = bus.request("topic/a");
	bus.broadcast("topic/a", String::from("shared"));

	assert_eq!(text(&first.await), "shared");
	assert_eq!(text(&second.await), "shared");
}

#[tokio::test]
async fn dropped_requests_are_pruned() {
	let bus = Bus::new();
	drop(bus.request("topic/a"));
	drop(bus.request("topic/a"));
	assert_eq!(bus.pending_requests("topic/a"), 0);

	let _live = bus.request("topic/a");
	assert_eq!(bus.pending_requests("topic/a"), 1);
}

#[tokio::test]
async fn abandoned_requests_leave_no_waiters_behind() {
	let bus = Bus::new();
	let waiting = tokio::spawn(bus.request("topic/never"));
	tokio::task::yield_now().await;
	waiting.abort();
	let _ = waiting.await;

	assert_eq!(bus.pending_requests("topic/never"), 0);
	assert!(format!("{bus:?}").contains("pending: 0"));
}

#[tokio::test]
async fn unresolved_request_stays_pending() {
	let bus = Bus::new();
	let request = bus.request("never");
	let outcome = tokio::time::timeout(Duration::from_millis(20), request).await;
	assert!(outcome.is_err());
}

#[tokio::test]
async fn orphaned_request_stays_pending() {
	let bus = Bus::new();
	let request = bus.request("never");
	drop(bus);
	let outcome = tokio::time::timeout(Duration::from_millis(20), request).await;
	assert!(outcome.is_err());
}

#[tokio::test]
async fn emit_reaches_subscribers_without_retaining() {
	let bus = Bus::new();
	let mut rx = bus.subscribe("element/connected/x-a");
	let delivered = bus.emit("element/connected/x-a", Arc::new(String::from("ping")));
	assert_eq!(delivered, 1);

	let payload = rx.recv().await.expect("subscriber should receive the emit");
	assert_eq!(text(&payload), "ping");
	assert!(bus.retained("element/connected/x-a").is_none());
}

#[tokio::test]
async fn broadcast_reaches_subscribers() {
	let bus = Bus::new();
	let mut rx = bus.subscribe("topic/a");
	bus.broadcast("topic/a", String::from("value"));
	let payload = rx.recv().await.expect("subscriber should receive the broadcast");
	assert_eq!(text(&payload), "value");
}

#[test]
fn retract_version_ignores_newer_value() {
	let bus = Bus::new();
	let old = bus.broadcast("topic/a", String::from("old"));
	bus.broadcast("topic/a", String::from("new"));

	assert!(!bus.retract_version("topic/a", old));
	assert_eq!(bus.retained("topic/a").as_ref().map(text), Some("new"));
	assert!(bus.retract("topic/a").is_some());
	assert!(bus.retained("topic/a").is_none());
}

#[tokio::test]
async fn announcement_expires_after_ttl() {
	let bus = Bus::new();
	bus.announce("components/x-a", Arc::new(String::from("x-a")), Duration::from_millis(10))
		.expect("runtime is available");
	assert!(bus.retained("components/x-a").is_some());

	tokio::time::sleep(Duration::from_millis(60)).await;
	assert!(bus.retained("components/x-a").is_none());
}

#[tokio::test]
async fn announcement_expiry_keeps_newer_broadcast() {
	let bus = Bus::new();
	bus.announce("components/x-a", Arc::new(String::from("announced")), Duration::from_millis(10))
		.expect("runtime is available");
	bus.broadcast("components/x-a", String::from("replaced"));

	tokio::time::sleep(Duration::from_millis(60)).await;
	assert_eq!(bus.retained("components/x-a").as_ref().map(text), Some("replaced"));
}

#[test]
fn announcement_without_runtime_is_rejected() {
	let bus = Bus::new();
	let result = bus.announce("components/x-a", Arc::new(()), Duration::from_millis(10));
	assert_eq!(result, Err(BusError::NoRuntime));
	assert!(bus.retained("components/x-a").is_none());
}

#[test]
fn announcement_on_a_handle_works_outside_a_runtime() {
	let executor = tokio::runtime::Builder::new_multi_thread()
		.worker_threads(1)
		.enable_all()
		.build()
		.expect("runtime builds");
	let bus = Bus::new();
	let request = bus.request("components/x-b");

	bus.announce_on(executor.handle(), "components/x-b", Arc::new(String::from("x-b")), Duration::from_millis(10));
	assert!(bus.retained("components/x-b").is_some());
	assert_eq!(text(&executor.block_on(request)), "x-b");

	std::thread::sleep(Duration::from_millis(80));
	assert!(bus.retained("components/x-b").is_none());
}
