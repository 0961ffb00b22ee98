//! Presenter registration and binding races.

mod common;

use std::time::Duration;

use common::{Journal, decl, presenter, register, runtime, settle, slow_presenter, wait_until};
use pretty_assertions::assert_eq;
use shade_core::{BindOutcome, ConfigurationError, DuplicateIdError, IdKind, RegistrationError, Value, topics};

#[tokio::test]
async fn binding_waits_for_later_publication() {
	let (runtime, _host) = runtime();
	let journal = Journal::default();
	register(&runtime, decl("x-wait"));
	let element = runtime.create("x-wait").expect("registered");

	element.set_presenter("late");
	settle().await;
	assert_eq!(element.presenter(), "late");
	assert_eq!(element.property("presenter"), Some(Value::from("late")));
	assert!(element.presenter_pending());
	assert_eq!(element.bound_presenter(), None);
	assert_eq!(runtime.bus().pending_requests(&topics::presenter("late")), 1);

	runtime.register_presenter(presenter("late", &journal)).expect("free id");
	settle().await;
	assert_eq!(element.bound_presenter().as_deref(), Some("late"));
	assert!(!element.presenter_pending());
	assert_eq!(journal.entries(), vec!["connect:late"]);
}

#[tokio::test]
async fn binding_resolves_from_retained_publication() {
	let (runtime, _host) = runtime();
	let journal = Journal::default();
	runtime.register_presenter(presenter("early", &journal)).expect("free id");
	register(&runtime, decl("x-early"));
	let element = runtime.create("x-early").expect("registered");

	let task = element.bind_presenter("early").expect("non-empty id spawns a resolution");
	assert_eq!(task.await.ok(), Some(BindOutcome::Connected));
	assert_eq!(element.bound_presenter().as_deref(), Some("early"));
}

#[tokio::test]
async fn later_binding_wins_when_earlier_publishes_first() {
	let (runtime, _host) = runtime();
	let journal = Journal::default();
	register(&runtime, decl("x-race"));
	let element = runtime.create("x-race").expect("registered");

	element.set_presenter("p1");
	settle().await;
	element.set_presenter("p2");
	settle().await;

	runtime.register_presenter(presenter("p1", &journal)).expect("free id");
	settle().await;
	assert_eq!(element.bound_presenter(), None);

	runtime.register_presenter(presenter("p2", &journal)).expect("free id");
	settle().await;
	assert_eq!(element.bound_presenter().as_deref(), Some("p2"));
	assert_eq!(journal.entries(), vec!["connect:p2"]);
}

#[tokio::test]
async fn later_binding_wins_when_it_publishes_first() {
	let (runtime, _host) = runtime();
	let journal = Journal::default();
	register(&runtime, decl("x-race-rev"));
	let element = runtime.create("x-race-rev").expect("registered");

	element.set_presenter("p1");
	settle().await;
	element.set_presenter("p2");
	settle().await;

	runtime.register_presenter(presenter("p2", &journal)).expect("free id");
	settle().await;
	runtime.register_presenter(presenter("p1", &journal)).expect("free id");
	settle().await;

	assert_eq!(element.bound_presenter().as_deref(), Some("p2"));
	assert_eq!(journal.entries(), vec!["connect:p2"]);
}

#[tokio::test]
async fn rebinding_disconnects_the_previous_presenter() {
	let (runtime, _host) = runtime();
	let journal = Journal::default();
	runtime.register_presenter(presenter("a", &journal)).expect("free id");
	runtime.register_presenter(presenter("b", &journal)).expect("free id");
	register(&runtime, decl("x-swap"));
	let element = runtime.create("x-swap").expect("registered");

	element.set_presenter("a");
	settle().await;
	element.set_presenter("b");
	settle().await;
	element.set_presenter("");
	settle().await;

	assert_eq!(element.bound_presenter(), None);
	assert_eq!(element.property("presenter"), Some(Value::Null));
	assert_eq!(journal.entries(), vec!["connect:a", "disconnect:a", "connect:b", "disconnect:b"]);
}

#[tokio::test]
async fn destruction_disconnects_exactly_once() {
	let (runtime, _host) = runtime();
	let journal = Journal::default();
	runtime.register_presenter(presenter("p", &journal)).expect("free id");
	register(&runtime, decl("x-teardown"));
	let element = runtime.create("x-teardown").expect("registered");

	element.set_presenter("p");
	settle().await;
	assert_eq!(element.bound_presenter().as_deref(), Some("p"));

	element.disconnected();
	element.destroy();
	assert!(!element.unbind_presenter());
	assert_eq!(journal.count("disconnect:p"), 1);
	assert_eq!(element.bound_presenter(), None);
}

#[tokio::test]
async fn destruction_racing_a_pending_rebind_disconnects_once() {
	let (runtime, _host) = runtime();
	let journal = Journal::default();
	runtime.register_presenter(presenter("p", &journal)).expect("free id");
	register(&runtime, decl("x-rebind"));
	let element = runtime.create("x-rebind").expect("registered");

	element.set_presenter("p");
	settle().await;
	element.set_presenter("q");
	settle().await;
	assert!(element.presenter_pending());

	element.disconnected();
	runtime.register_presenter(presenter("q", &journal)).expect("free id");
	settle().await;

	assert_eq!(journal.entries(), vec!["connect:p", "disconnect:p"]);
	assert_eq!(element.bound_presenter(), None);
}

#[test]
fn destruction_waits_for_a_connect_in_progress() {
	let (runtime, _host) = runtime();
	let journal = Journal::default();
	runtime
		.register_presenter(slow_presenter("slow", Duration::from_millis(2), &journal))
		.expect("free id");
	register(&runtime, decl("x-slow-connect"));

	for _ in 0..25 {
		let element = runtime.create("x-slow-connect").expect("registered");
		let _resolution = element.bind_presenter("slow").expect("non-empty id spawns a resolution");
		wait_until(|| element.bound_presenter().is_some());
		element.destroy();
	}

	let entries = journal.entries();
	assert_eq!(entries.len(), 75);
	for cycle in entries.chunks(3) {
		assert_eq!(cycle, ["connect.start:slow", "connect.end:slow", "disconnect:slow"]);
	}
}

#[test]
fn presenter_attribute_binds_without_an_ambient_runtime() {
	let (runtime, _host) = runtime();
	let journal = Journal::default();
	runtime.register_presenter(presenter("plain", &journal)).expect("free id");
	register(&runtime, decl("x-plain-bind"));
	let element = runtime.create("x-plain-bind").expect("registered");

	element.set_presenter("plain");
	wait_until(|| element.bound_presenter().is_some());
	element.disconnected();

	assert_eq!(journal.entries(), vec!["connect:plain", "disconnect:plain"]);
}

#[tokio::test]
async fn destruction_discards_pending_resolution() {
	let (runtime, _host) = runtime();
	let journal = Journal::default();
	register(&runtime, decl("x-gone"));
	let element = runtime.create("x-gone").expect("registered");

	element.set_presenter("ghost");
	settle().await;
	element.destroy();
	runtime.register_presenter(presenter("ghost", &journal)).expect("free id");
	settle().await;

	assert_eq!(element.bound_presenter(), None);
	assert!(journal.entries().is_empty());
}

#[tokio::test]
async fn dropped_element_reports_element_gone() {
	let (runtime, _host) = runtime();
	let journal = Journal::default();
	register(&runtime, decl("x-dropped"));
	let element = runtime.create("x-dropped").expect("registered");

	let task = element.bind_presenter("orphan").expect("non-empty id spawns a resolution");
	drop(element);
	runtime.register_presenter(presenter("orphan", &journal)).expect("free id");

	let outcome = tokio::time::timeout(Duration::from_secs(1), task).await.expect("resolution finishes");
	assert_eq!(outcome.ok(), Some(BindOutcome::ElementGone));
	assert!(journal.entries().is_empty());
}

#[tokio::test]
async fn foreign_payload_is_rejected() {
	let (runtime, _host) = runtime();
	register(&runtime, decl("x-foreign"));
	let element = runtime.create("x-foreign").expect("registered");
	runtime.bus().broadcast(&topics::presenter("bogus"), 42_u32);

	let task = element.bind_presenter("bogus").expect("non-empty id spawns a resolution");
	assert_eq!(task.await.ok(), Some(BindOutcome::Rejected));
	assert_eq!(element.bound_presenter(), None);
}

#[tokio::test]
async fn empty_id_only_unbinds() {
	let (runtime, _host) = runtime();
	let journal = Journal::default();
	runtime.register_presenter(presenter("solo", &journal)).expect("free id");
	register(&runtime, decl("x-empty"));
	let element = runtime.create("x-empty").expect("registered");

	let task = element.bind_presenter("solo").expect("non-empty id spawns a resolution");
	assert_eq!(task.await.ok(), Some(BindOutcome::Connected));
	assert!(element.bind_presenter("").is_none());
	assert_eq!(journal.entries(), vec!["connect:solo", "disconnect:solo"]);
}

#[test]
fn presenter_ids_must_be_present_and_unique() {
	let (runtime, _host) = runtime();
	let journal = Journal::default();
	runtime.register_presenter(presenter("dup", &journal)).expect("free id");

	let err = runtime.register_presenter(presenter("dup", &journal)).expect_err("id taken");
	assert_eq!(
		err,
		RegistrationError::DuplicateId(DuplicateIdError {
			kind: IdKind::Presenter,
			id: "dup".to_owned(),
		})
	);

	let err = runtime.register_presenter(presenter("", &journal)).expect_err("empty id");
	assert_eq!(
		err,
		RegistrationError::Configuration(ConfigurationError::MissingId { kind: IdKind::Presenter })
	);
	assert_eq!(runtime.presenters().len(), 1);
	assert!(runtime.bus().retained(&topics::presenter("dup")).is_some());
}
