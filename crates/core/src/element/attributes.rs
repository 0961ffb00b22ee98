//! Debounced attribute conversion.
//!
//! A raw change is not applied immediately. It arms a per-attribute task that
//! waits for the configured delay; a newer change for the same attribute
//! aborts and replaces it, so a burst collapses into one realization carrying
//! the last raw value.

use tokio::task::AbortHandle;

use super::events::Event;
use super::Element;
use crate::observed::PRESENTER_ATTRIBUTE;
use crate::presenter;
use crate::spawn::{TaskKind, defer, spawn};
use crate::value::Value;

/// The armed realization of one attribute.
#[derive(Debug)]
pub(crate) struct PendingChange {
	generation: u64,
	task: AbortHandle,
}

impl PendingChange {
	pub fn cancel(self) {
		self.task.abort();
	}
}

impl Element {
	/// Host notification that observed attribute `name` changed from `old` to `new`.
	///
	/// Identical values are ignored. Otherwise the conversion is scheduled and
	/// any earlier pending conversion for `name` is discarded.
	pub fn attribute_changed(&self, name: &str, old: Option<&str>, new: Option<&str>) {
		if old == new {
			tracing::trace!(element = %self.id(), attribute = name, "attribute.unchanged");
			return;
		}
		if self.is_destroyed() {
			return;
		}

		let generation = self.next_generation();
		let weak = self.downgrade();
		let attribute = name.to_owned();
		let raw = new.map(str::to_owned);
		let delay = self.inner.config.debounce();

		let mut pending = self.inner.pending.lock();
		if let Some(previous) = pending.remove(name) {
			tracing::trace!(element = %self.id(), attribute = name, "attribute.debounce");
			previous.cancel();
		}
		let task = spawn(TaskKind::AttributeDebounce, async move {
			defer(delay).await;
			if let Some(element) = weak.upgrade() {
				element.realize(&attribute, generation, raw.as_deref());
			}
		});
		pending.insert(
			name.to_owned(),
			PendingChange {
				generation,
				task: task.abort_handle(),
			},
		);
	}

	/// Converts and assigns the raw value armed under `generation`.
	fn realize(&self, name: &str, generation: u64, raw: Option<&str>) {
		{
			let mut pending = self.inner.pending.lock();
			match pending.get(name) {
				Some(change) if change.generation == generation => {
					pending.remove(name);
				}
				_ => {
					tracing::trace!(element = %self.id(), attribute = name, generation, "attribute.realize.stale");
					return;
				}
			}
		}
		if self.is_destroyed() {
			return;
		}

		let record = &self.inner.record;
		let type_name = record.type_of(name);
		let new = match raw {
			None => Value::Null,
			Some(raw) => match record.converters().resolve(type_name).convert(raw) {
				Ok(value) => value,
				Err(error) => {
					tracing::warn!(
						tag = record.tag(),
						attribute = name,
						type_name,
						%error,
						"attribute.convert.failed"
					);
					return;
				}
			},
		};

		let old = self.property(name).unwrap_or_default();
		self.set_property(name, new.clone());
		if name == PRESENTER_ATTRIBUTE {
			presenter::bind(self, new.as_str().unwrap_or_default());
		}

		tracing::debug!(element = %self.id(), attribute = name, type_name, "attribute.realize");
		self.dispatch(&Event::changed(name, self.id(), old, new));
	}

	/// Aborts every armed realization.
	pub(crate) fn cancel_pending(&self) -> usize {
		let drained: Vec<_> = self.inner.pending.lock().drain().map(|(_, change)| change).collect();
		let count = drained.len();
		for change in drained {
			change.cancel();
		}
		count
	}

	/// Number of attributes with a realization still armed.
	pub fn pending_changes(&self) -> usize {
		self.inner.pending.lock().len()
	}
}
