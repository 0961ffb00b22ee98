use std::sync::Arc;

use shade_bus::Payload;
use tokio::task::{AbortHandle, JoinHandle};

use super::{Presenter, PresenterDef};
use crate::element::{Element, WeakElement};
use crate::spawn::{TaskKind, spawn};
use crate::topics;

/// How a presenter resolution ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcome {
	/// The presenter was instantiated and connected.
	Connected,
	/// A newer bind, an unbind or destruction happened first; the result was discarded.
	Superseded,
	/// The element was dropped before resolution.
	ElementGone,
	/// The topic carried something other than a presenter definition.
	Rejected,
}

pub(crate) struct BoundPresenter {
	id: String,
	presenter: Arc<dyn Presenter>,
}

/// Per-element binding state.
///
/// `generation` advances on every bind and unbind; a resolution installs only
/// if the generation it was issued under is still current.
#[derive(Default)]
pub(crate) struct PresenterSlot {
	generation: u64,
	bound: Option<BoundPresenter>,
	pending: Option<AbortHandle>,
}

impl PresenterSlot {
	pub fn bound_id(&self) -> Option<&str> {
		self.bound.as_ref().map(|b| b.id.as_str())
	}

	pub fn is_pending(&self) -> bool {
		self.pending.as_ref().is_some_and(|p| !p.is_finished())
	}

	/// Starts a new generation, cancelling any pending resolution and
	/// detaching the bound presenter.
	fn advance(&mut self) -> (u64, Option<BoundPresenter>) {
		self.generation = self.generation.wrapping_add(1);
		if let Some(pending) = self.pending.take() {
			pending.abort();
		}
		(self.generation, self.bound.take())
	}
}

/// Binds `element` to the presenter published under `id`.
///
/// The current presenter is disconnected first. An empty id only unbinds and
/// returns `None`. Otherwise the returned task resolves once the presenter is
/// available on the bus; a superseded task may also be aborted.
pub(crate) fn bind(element: &Element, id: &str) -> Option<JoinHandle<BindOutcome>> {
	let generation = {
		let _transition = element.presenter_transition();
		let (generation, previous) = element.presenter_slot().lock().advance();
		if let Some(previous) = previous {
			tracing::debug!(element = %element.id(), presenter = previous.id, "presenter.unbind");
			previous.presenter.disconnect(element);
		}
		generation
	};
	if id.is_empty() || element.is_destroyed() {
		return None;
	}

	tracing::debug!(element = %element.id(), presenter = id, generation, "presenter.bind");
	let request = element.bus().request(&topics::presenter(id));
	let weak = element.downgrade();
	let id = id.to_owned();
	let task = spawn(TaskKind::PresenterResolve, async move {
		let payload = request.await;
		install(weak, generation, id, payload)
	});

	let mut slot = element.presenter_slot().lock();
	if slot.generation == generation && slot.bound.is_none() {
		slot.pending = Some(task.abort_handle());
	}
	Some(task)
}

/// Disconnects and clears the bound presenter, and discards any pending
/// resolution. Returns whether a presenter was bound.
///
/// Waits for a `connect` running on another thread to return first.
pub(crate) fn unbind(element: &Element) -> bool {
	let _transition = element.presenter_transition();
	let (_, previous) = element.presenter_slot().lock().advance();
	let Some(previous) = previous else {
		return false;
	};
	tracing::debug!(element = %element.id(), presenter = previous.id, "presenter.unbind");
	previous.presenter.disconnect(element);
	true
}

fn install(weak: WeakElement, generation: u64, id: String, payload: Payload) -> BindOutcome {
	let Some(element) = weak.upgrade() else {
		tracing::trace!(presenter = id, "presenter.resolve.element_gone");
		return BindOutcome::ElementGone;
	};
	let def = match payload.downcast::<PresenterDef>() {
		Ok(def) => def,
		Err(_) => {
			tracing::warn!(element = %element.id(), presenter = id, "presenter.resolve.not_a_presenter");
			return BindOutcome::Rejected;
		}
	};

	let _transition = element.presenter_transition();
	let presenter = {
		let mut slot = element.presenter_slot().lock();
		if slot.generation != generation || slot.bound.is_some() || element.is_destroyed() {
			tracing::debug!(element = %element.id(), presenter = id, generation, "presenter.resolve.stale");
			return BindOutcome::Superseded;
		}
		let presenter = def.instantiate();
		slot.bound = Some(BoundPresenter {
			id: id.clone(),
			presenter: Arc::clone(&presenter),
		});
		slot.pending = None;
		presenter
	};

	tracing::debug!(element = %element.id(), presenter = id, "presenter.connect");
	presenter.connect(&element);
	BindOutcome::Connected
}
