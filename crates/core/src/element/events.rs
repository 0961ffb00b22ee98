use std::fmt;
use std::sync::Arc;

use super::ElementId;
use crate::value::Value;

/// Name of the event dispatched after `attribute` is realized.
pub fn changed_event_name(attribute: &str) -> String {
	format!("{attribute}Changed")
}

/// Event dispatched on an element.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
	pub name: String,
	pub target: ElementId,
	pub detail: EventDetail,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventDetail {
	/// `connected`, `adopted` or `disconnected`.
	Lifecycle,
	/// `<attribute>Changed` with the prior and realized values.
	Changed { old: Value, new: Value },
}

impl Event {
	pub(crate) fn lifecycle(name: &str, target: ElementId) -> Self {
		Self {
			name: name.to_owned(),
			target,
			detail: EventDetail::Lifecycle,
		}
	}

	pub(crate) fn changed(attribute: &str, target: ElementId, old: Value, new: Value) -> Self {
		Self {
			name: changed_event_name(attribute),
			target,
			detail: EventDetail::Changed { old, new },
		}
	}

	/// Old and new values of a change event.
	pub fn change(&self) -> Option<(&Value, &Value)> {
		match &self.detail {
			EventDetail::Changed { old, new } => Some((old, new)),
			EventDetail::Lifecycle => None,
		}
	}
}

pub type Listener = Arc<dyn Fn(&Event) + Send + Sync>;

/// Handle returned by [`Element::listen`](super::Element::listen).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Default)]
pub(crate) struct Listeners {
	next: u64,
	entries: Vec<(ListenerId, String, Listener)>,
}

impl Listeners {
	pub fn add(&mut self, name: &str, listener: Listener) -> ListenerId {
		self.next += 1;
		let id = ListenerId(self.next);
		self.entries.push((id, name.to_owned(), listener));
		id
	}

	pub fn remove(&mut self, id: ListenerId) -> bool {
		let before = self.entries.len();
		self.entries.retain(|(entry, _, _)| *entry != id);
		self.entries.len() != before
	}

	/// Listeners for `name` in registration order. Cloned out so callers can
	/// invoke them without holding the element's lock.
	pub fn matching(&self, name: &str) -> Vec<Listener> {
		self.entries
			.iter()
			.filter(|(_, entry, _)| entry == name)
			.map(|(_, _, listener)| Arc::clone(listener))
			.collect()
	}

	pub fn clear(&mut self) {
		self.entries.clear();
	}
}

impl fmt::Debug for Listeners {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_list().entries(self.entries.iter().map(|(id, name, _)| (id, name))).finish()
	}
}
