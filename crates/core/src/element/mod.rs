//! Component instances.
//!
//! An [`Element`] is a cheap handle to one instance of a registered tag. It
//! owns a shadow root cloned from the record, the raw attribute map, realized
//! property values, event listeners, per-extension state, its bus subscriptions
//! and at most one bound presenter.

use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, ReentrantMutex, ReentrantMutexGuard};
use rustc_hash::FxHashMap as HashMap;
use shade_bus::{Bus, Payload};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::{AbortHandle, JoinHandle};

use crate::config::RuntimeConfig;
use crate::extension::ExtensionState;
use crate::observed::PRESENTER_ATTRIBUTE;
use crate::presenter::{self, BindOutcome, PresenterSlot};
use crate::record::RegistrationRecord;
use crate::spawn::{TaskKind, spawn};
use crate::template::{ShadowRoot, StyleFragment};
use crate::topics;
use crate::value::Value;

mod attributes;
mod events;

use attributes::PendingChange;
pub use events::{Event, EventDetail, Listener, ListenerId, changed_event_name};
use events::Listeners;

const DISABLED_ATTRIBUTE: &str = "disabled";
const HIDDEN_ATTRIBUTE: &str = "hidden";

static NEXT_ELEMENT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique element identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u64);

impl ElementId {
	fn next() -> Self {
		Self(NEXT_ELEMENT_ID.fetch_add(1, Ordering::Relaxed))
	}

	pub const fn get(self) -> u64 {
		self.0
	}
}

impl fmt::Display for ElementId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

pub(crate) struct ElementInner {
	id: ElementId,
	record: Arc<RegistrationRecord>,
	bus: Bus,
	config: RuntimeConfig,
	root: Mutex<ShadowRoot>,
	attributes: Mutex<HashMap<String, String>>,
	properties: Mutex<HashMap<String, Value>>,
	listeners: Mutex<Listeners>,
	pending: Mutex<HashMap<String, PendingChange>>,
	generation: AtomicU64,
	presenter: Mutex<PresenterSlot>,
	presenter_transition: ReentrantMutex<()>,
	states: Mutex<HashMap<String, ExtensionState>>,
	receivers: Mutex<Vec<AbortHandle>>,
	destroyed: AtomicBool,
}

/// Handle to a component instance.
#[derive(Clone)]
pub struct Element {
	inner: Arc<ElementInner>,
}

/// Non-owning handle held by deferred tasks.
#[derive(Clone)]
pub(crate) struct WeakElement(Weak<ElementInner>);

impl WeakElement {
	pub fn upgrade(&self) -> Option<Element> {
		self.0.upgrade().map(|inner| Element { inner })
	}
}

impl Element {
	/// Instantiates `record`: clones its template and styles into a fresh
	/// shadow root, then connects every attached extension in attachment order.
	pub(crate) fn create(record: Arc<RegistrationRecord>, bus: Bus, config: RuntimeConfig) -> Self {
		let root = ShadowRoot::attach(record.mode(), record.template(), record.styles());
		let element = Self {
			inner: Arc::new(ElementInner {
				id: ElementId::next(),
				record,
				bus,
				config,
				root: Mutex::new(root),
				attributes: Mutex::default(),
				properties: Mutex::default(),
				listeners: Mutex::default(),
				pending: Mutex::default(),
				generation: AtomicU64::new(0),
				presenter: Mutex::default(),
				presenter_transition: ReentrantMutex::new(()),
				states: Mutex::default(),
				receivers: Mutex::default(),
				destroyed: AtomicBool::new(false),
			}),
		};

		tracing::debug!(element = %element.id(), tag = element.tag(), "element.create");
		element.receive(&topics::styles(element.tag()), |element, payload| {
			match payload.downcast_ref::<StyleFragment>() {
				Some(fragment) => {
					element.apply_style(fragment.clone());
				}
				None => tracing::warn!(element = %element.id(), tag = element.tag(), "element.style.rejected"),
			}
		});
		for extension in element.inner.record.extensions() {
			extension.connect(&element);
		}
		element
	}

	pub fn id(&self) -> ElementId {
		self.inner.id
	}

	pub fn tag(&self) -> &str {
		self.inner.record.tag()
	}

	pub fn record(&self) -> &Arc<RegistrationRecord> {
		&self.inner.record
	}

	/// Snapshot of the instance's shadow root.
	pub fn shadow_root(&self) -> ShadowRoot {
		self.inner.root.lock().clone()
	}

	pub fn is_destroyed(&self) -> bool {
		self.inner.destroyed.load(Ordering::Acquire)
	}

	pub(crate) fn downgrade(&self) -> WeakElement {
		WeakElement(Arc::downgrade(&self.inner))
	}

	pub(crate) fn bus(&self) -> &Bus {
		&self.inner.bus
	}

	pub(crate) fn presenter_slot(&self) -> &Mutex<PresenterSlot> {
		&self.inner.presenter
	}

	/// Held across presenter `connect`/`disconnect` calls so they never overlap.
	/// Re-entrant so hooks may rebind their own element.
	pub(crate) fn presenter_transition(&self) -> ReentrantMutexGuard<'_, ()> {
		self.inner.presenter_transition.lock()
	}

	fn next_generation(&self) -> u64 {
		self.inner.generation.fetch_add(1, Ordering::Relaxed) + 1
	}

	// Lifecycle

	pub fn connected(&self) {
		self.lifecycle("connected");
	}

	pub fn adopted(&self) {
		self.lifecycle("adopted");
	}

	/// Notifies listeners and the bus, then destroys the instance.
	pub fn disconnected(&self) {
		if self.is_destroyed() {
			return;
		}
		self.lifecycle("disconnected");
		self.destroy();
	}

	fn lifecycle(&self, event: &str) {
		self.dispatch(&Event::lifecycle(event, self.id()));
		let payload: Payload = Arc::new(self.id());
		let delivered = self.inner.bus.emit(&topics::element(event, self.tag()), payload);
		tracing::debug!(element = %self.id(), tag = self.tag(), event, delivered, "element.lifecycle");
	}

	/// Tears the instance down: cancels pending conversions, unbinds the
	/// presenter and disconnects extensions in attachment order. Runs once.
	pub fn destroy(&self) {
		if self.inner.destroyed.swap(true, Ordering::AcqRel) {
			return;
		}
		let cancelled = self.cancel_pending();
		for receiver in self.inner.receivers.lock().drain(..) {
			receiver.abort();
		}
		presenter::unbind(self);
		for extension in self.inner.record.extensions() {
			extension.disconnect(self);
		}
		self.inner.states.lock().clear();
		self.inner.listeners.lock().clear();
		tracing::debug!(element = %self.id(), tag = self.tag(), cancelled, "element.destroy");
	}

	// Attributes

	pub fn attribute(&self, name: &str) -> Option<String> {
		self.inner.attributes.lock().get(name).cloned()
	}

	pub fn has_attribute(&self, name: &str) -> bool {
		self.inner.attributes.lock().contains_key(name)
	}

	/// Sets a raw attribute, scheduling conversion when it is observed.
	pub fn set_attribute(&self, name: &str, value: impl Into<String>) {
		let value = value.into();
		let old = self.inner.attributes.lock().insert(name.to_owned(), value.clone());
		if self.inner.record.is_observed(name) {
			self.attribute_changed(name, old.as_deref(), Some(&value));
		}
	}

	pub fn remove_attribute(&self, name: &str) {
		let old = self.inner.attributes.lock().remove(name);
		if old.is_some() && self.inner.record.is_observed(name) {
			self.attribute_changed(name, old.as_deref(), None);
		}
	}

	fn toggle_attribute(&self, name: &str, on: bool) {
		if on {
			self.set_attribute(name, "");
		} else {
			self.remove_attribute(name);
		}
	}

	pub fn is_disabled(&self) -> bool {
		self.has_attribute(DISABLED_ATTRIBUTE)
	}

	pub fn set_disabled(&self, disabled: bool) {
		self.toggle_attribute(DISABLED_ATTRIBUTE, disabled);
	}

	pub fn is_hidden(&self) -> bool {
		self.has_attribute(HIDDEN_ATTRIBUTE)
	}

	pub fn set_hidden(&self, hidden: bool) {
		self.toggle_attribute(HIDDEN_ATTRIBUTE, hidden);
	}

	// Properties

	/// Last realized value of `name`.
	pub fn property(&self, name: &str) -> Option<Value> {
		self.inner.properties.lock().get(name).cloned()
	}

	pub fn set_property(&self, name: &str, value: Value) -> Option<Value> {
		self.inner.properties.lock().insert(name.to_owned(), value)
	}

	// Presenter

	/// Raw `presenter` attribute, empty when unset.
	pub fn presenter(&self) -> String {
		self.attribute(PRESENTER_ATTRIBUTE).unwrap_or_default()
	}

	/// Sets the `presenter` attribute; the binding follows once the change is realized.
	pub fn set_presenter(&self, id: &str) {
		if id.is_empty() {
			self.remove_attribute(PRESENTER_ATTRIBUTE);
		} else {
			self.set_attribute(PRESENTER_ATTRIBUTE, id);
		}
	}

	/// Binds the presenter published under `id` right away, bypassing the
	/// attribute pipeline. An empty id unbinds.
	pub fn bind_presenter(&self, id: &str) -> Option<JoinHandle<BindOutcome>> {
		presenter::bind(self, id)
	}

	pub fn unbind_presenter(&self) -> bool {
		presenter::unbind(self)
	}

	/// Id of the currently connected presenter.
	pub fn bound_presenter(&self) -> Option<String> {
		self.inner.presenter.lock().bound_id().map(str::to_owned)
	}

	pub fn presenter_pending(&self) -> bool {
		self.inner.presenter.lock().is_pending()
	}

	// Events

	pub fn listen(&self, name: &str, listener: impl Fn(&Event) + Send + Sync + 'static) -> ListenerId {
		self.inner.listeners.lock().add(name, Arc::new(listener))
	}

	pub fn unlisten(&self, id: ListenerId) -> bool {
		self.inner.listeners.lock().remove(id)
	}

	/// Delivers `event` to this element's listeners; returns how many ran.
	pub fn dispatch(&self, event: &Event) -> usize {
		let listeners = self.inner.listeners.lock().matching(&event.name);
		for listener in &listeners {
			listener(event);
		}
		listeners.len()
	}

	// Extensions and styles

	/// Runs `f` over the private state of extension `id`, creating it empty on
	/// first use. `f` must not re-enter extension state on this element.
	pub fn with_extension_state<R>(&self, id: &str, f: impl FnOnce(&mut ExtensionState) -> R) -> R {
		let mut states = self.inner.states.lock();
		f(states.entry(id.to_owned()).or_default())
	}

	pub fn has_extension_state(&self, id: &str) -> bool {
		self.inner.states.lock().contains_key(id)
	}

	/// Adds a style fragment to this instance's root, replacing one with the same id.
	pub fn set_style(&self, id: &str, css: &str) -> bool {
		self.apply_style(StyleFragment::with_id(id, css))
	}

	/// Like [`Self::set_style`]; a fragment without an id is always appended.
	pub fn apply_style(&self, fragment: StyleFragment) -> bool {
		tracing::trace!(element = %self.id(), style = ?fragment.id, "element.style");
		self.inner.root.lock().styles_mut().upsert(fragment)
	}

	// Bus

	/// Broadcasts `value` on the runtime bus under `topic`.
	pub fn broadcast<T>(&self, topic: &str, value: T) -> u64
	where
		T: Any + Send + Sync,
	{
		self.inner.bus.broadcast(topic, value)
	}

	/// Calls `listener` with every payload later broadcast or emitted on
	/// `topic`, until this element is destroyed or dropped.
	pub fn receive<F>(&self, topic: &str, listener: F)
	where
		F: Fn(&Element, Payload) + Send + Sync + 'static,
	{
		let mut rx = self.inner.bus.subscribe(topic);
		let weak = self.downgrade();
		let topic = topic.to_owned();
		let task = spawn(TaskKind::ElementReceive, async move {
			loop {
				let payload = match rx.recv().await {
					Ok(payload) => payload,
					Err(RecvError::Lagged(skipped)) => {
						tracing::warn!(topic = %topic, skipped, "element.receive.lagged");
						continue;
					}
					Err(RecvError::Closed) => break,
				};
				let Some(element) = weak.upgrade() else {
					break;
				};
				if element.is_destroyed() {
					break;
				}
				listener(&element, payload);
			}
		});

		let mut receivers = self.inner.receivers.lock();
		if self.is_destroyed() {
			task.abort();
			return;
		}
		receivers.push(task.abort_handle());
	}
}

impl fmt::Debug for Element {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Element")
			.field("id", &self.id())
			.field("tag", &self.tag())
			.field("destroyed", &self.is_destroyed())
			.finish_non_exhaustive()
	}
}
