//! Fixtures shared by the runtime integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use shade_core::{
	AttributeNames, ComponentClass, ComponentDecl, Contribute, ConverterTable, Element, Event, HeadlessHost, ListenerId, Mixin,
	ObservedMap, Plugin, Presenter, PresenterDef, Runtime, RuntimeConfig, Styles, Template, Value,
};

pub fn init() {
	let _ = tracing_subscriber::fmt::try_init();
}

/// Lets spawned conversion and resolution tasks run.
pub async fn settle() {
	tokio::time::sleep(Duration::from_millis(20)).await;
}

/// Polls `done` from a plain thread while work runs on the fallback runtime.
pub fn wait_until(mut done: impl FnMut() -> bool) {
	let deadline = Instant::now() + Duration::from_secs(2);
	while !done() {
		assert!(Instant::now() < deadline, "condition not reached in time");
		std::thread::sleep(Duration::from_micros(200));
	}
}

pub fn runtime() -> (Runtime, Arc<HeadlessHost>) {
	runtime_with(RuntimeConfig::default())
}

pub fn runtime_with(config: RuntimeConfig) -> (Runtime, Arc<HeadlessHost>) {
	init();
	let host = Arc::new(HeadlessHost::new());
	let runtime = Runtime::builder().config(config).host(host.clone()).build();
	(runtime, host)
}

/// A declaration with every required field filled in.
pub fn decl(tag: &str) -> ComponentDecl {
	ComponentDecl::new(tag)
		.tag(tag)
		.html("<main></main>")
		.css(":host { display: block; }")
		.observed([("count", "integer"), ("data", "json"), ("label", "string")])
}

pub fn register(runtime: &Runtime, decl: ComponentDecl) -> Arc<ComponentClass> {
	let class = ComponentClass::new(decl);
	runtime.register(&class).expect("registration should succeed");
	class
}

/// Records `<event name>` and change payloads delivered to an element.
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<Event>>>);

impl EventLog {
	pub fn attach(element: &Element, name: &str) -> Self {
		let log = Self::default();
		log.listen(element, name);
		log
	}

	pub fn listen(&self, element: &Element, name: &str) -> ListenerId {
		let sink = self.clone();
		element.listen(name, move |event| sink.0.lock().push(event.clone()))
	}

	pub fn len(&self) -> usize {
		self.0.lock().len()
	}

	pub fn changes(&self) -> Vec<(Value, Value)> {
		self.0
			.lock()
			.iter()
			.filter_map(|event| event.change().map(|(old, new)| (old.clone(), new.clone())))
			.collect()
	}
}

/// Shared `connect:<id>` / `disconnect:<id>` journal.
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
	pub fn push(&self, entry: String) {
		self.0.lock().push(entry);
	}

	pub fn entries(&self) -> Vec<String> {
		self.0.lock().clone()
	}

	pub fn count(&self, entry: &str) -> usize {
		self.0.lock().iter().filter(|e| *e == entry).count()
	}
}

pub struct RecordingPresenter {
	id: String,
	journal: Journal,
}

impl Presenter for RecordingPresenter {
	fn connect(&self, _element: &Element) {
		self.journal.push(format!("connect:{}", self.id));
	}

	fn disconnect(&self, _element: &Element) {
		self.journal.push(format!("disconnect:{}", self.id));
	}
}

pub fn presenter(id: &str, journal: &Journal) -> PresenterDef {
	let journal = journal.clone();
	let owned = id.to_owned();
	PresenterDef::new(id, move || RecordingPresenter {
		id: owned.clone(),
		journal: journal.clone(),
	})
}

/// Presenter whose `connect` takes `delay`, journaling its start and end.
pub struct SlowPresenter {
	id: String,
	delay: Duration,
	journal: Journal,
}

impl Presenter for SlowPresenter {
	fn connect(&self, _element: &Element) {
		self.journal.push(format!("connect.start:{}", self.id));
		std::thread::sleep(self.delay);
		self.journal.push(format!("connect.end:{}", self.id));
	}

	fn disconnect(&self, _element: &Element) {
		self.journal.push(format!("disconnect:{}", self.id));
	}
}

pub fn slow_presenter(id: &str, delay: Duration, journal: &Journal) -> PresenterDef {
	let journal = journal.clone();
	let owned = id.to_owned();
	PresenterDef::new(id, move || SlowPresenter {
		id: owned.clone(),
		delay,
		journal: journal.clone(),
	})
}

/// Mixin that appends `markup`, registers a `fmt` converter yielding its id,
/// declares `extra` attributes and counts how often each hook runs.
pub struct MarkupMixin {
	pub id: &'static str,
	pub markup: &'static str,
	pub properties: Vec<(&'static str, &'static str)>,
	pub contributions: Arc<AtomicUsize>,
	pub journal: Journal,
}

impl MarkupMixin {
	pub fn new(id: &'static str, markup: &'static str) -> Self {
		Self {
			id,
			markup,
			properties: Vec::new(),
			contributions: Arc::new(AtomicUsize::new(0)),
			journal: Journal::default(),
		}
	}

	pub fn contributions(&self) -> Arc<AtomicUsize> {
		Arc::clone(&self.contributions)
	}
}

impl Contribute for MarkupMixin {
	fn id(&self) -> &str {
		self.id
	}

	fn html(&self, template: &mut Template) {
		self.contributions.fetch_add(1, Ordering::SeqCst);
		template.append(self.markup);
	}

	fn converters(&self, converters: &mut ConverterTable) {
		let id = self.id;
		converters.insert("fmt", shade_core::Converter::infallible(move |_| Value::from(id)));
	}

	fn connect(&self, element: &Element) {
		element.with_extension_state(self.id, |state| state.insert("connected", true));
		self.journal.push(format!("connect:{}", self.id));
	}

	fn disconnect(&self, _element: &Element) {
		self.journal.push(format!("disconnect:{}", self.id));
	}
}

impl Mixin for MarkupMixin {
	fn properties(&self, observed: &mut ObservedMap) {
		for (name, type_name) in &self.properties {
			observed.insert(*name, *type_name);
		}
	}
}

/// Plugin that adds a stylesheet and one watched attribute name.
pub struct StylePlugin {
	pub id: &'static str,
	pub css: &'static str,
	pub watch: &'static str,
}

impl Contribute for StylePlugin {
	fn id(&self) -> &str {
		self.id
	}

	fn css(&self, styles: &mut Styles) {
		styles.push(shade_core::StyleFragment::new(self.css));
	}

	fn observed(&self, attributes: &mut AttributeNames) {
		attributes.push(self.watch);
	}
}

impl Plugin for StylePlugin {}
