//! Presenters: controllers resolved by id through the bus and bound to one element at a time.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap as HashMap;
use shade_bus::{Bus, Payload};

use crate::element::Element;
use crate::error::{ConfigurationError, DuplicateIdError, IdKind, RegistrationError};
use crate::topics;

mod binding;

pub use binding::BindOutcome;
pub(crate) use binding::{PresenterSlot, bind, unbind};

/// Controller attached to an element while bound.
pub trait Presenter: Send + Sync + 'static {
	fn connect(&self, element: &Element);

	fn disconnect(&self, element: &Element);
}

type Construct = dyn Fn() -> Arc<dyn Presenter> + Send + Sync;

/// A presenter type published under an id. Each binding creates a fresh instance.
pub struct PresenterDef {
	id: String,
	construct: Arc<Construct>,
}

impl PresenterDef {
	pub fn new<P, F>(id: impl Into<String>, construct: F) -> Self
	where
		P: Presenter,
		F: Fn() -> P + Send + Sync + 'static,
	{
		Self {
			id: id.into(),
			construct: Arc::new(move || Arc::new(construct()) as Arc<dyn Presenter>),
		}
	}

	pub fn id(&self) -> &str {
		&self.id
	}

	pub(crate) fn instantiate(&self) -> Arc<dyn Presenter> {
		(self.construct)()
	}
}

impl fmt::Debug for PresenterDef {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("PresenterDef").field("id", &self.id).finish_non_exhaustive()
	}
}

/// Process-wide presenter registry.
///
/// Registering a presenter also broadcasts it on the bus, which resolves every
/// element already waiting for that id.
#[derive(Debug)]
pub struct PresenterRegistry {
	bus: Bus,
	entries: RwLock<HashMap<String, Arc<PresenterDef>>>,
}

impl PresenterRegistry {
	pub fn new(bus: Bus) -> Self {
		Self {
			bus,
			entries: RwLock::new(HashMap::default()),
		}
	}

	pub fn register(&self, def: PresenterDef) -> Result<Arc<PresenterDef>, RegistrationError> {
		if def.id.is_empty() {
			return Err(ConfigurationError::MissingId { kind: IdKind::Presenter }.into());
		}

		let def = Arc::new(def);
		{
			let mut entries = self.entries.write();
			if entries.contains_key(def.id()) {
				tracing::warn!(id = def.id(), "presenter.register.duplicate");
				return Err(DuplicateIdError {
					kind: IdKind::Presenter,
					id: def.id.clone(),
				}
				.into());
			}
			entries.insert(def.id.clone(), Arc::clone(&def));
		}

		let payload: Payload = def.clone();
		self.bus.broadcast_payload(&topics::presenter(def.id()), payload);
		tracing::debug!(id = def.id(), "presenter.register");
		Ok(def)
	}

	pub fn contains(&self, id: &str) -> bool {
		self.entries.read().contains_key(id)
	}

	pub fn get(&self, id: &str) -> Option<Arc<PresenterDef>> {
		self.entries.read().get(id).cloned()
	}

	pub fn len(&self) -> usize {
		self.entries.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.read().is_empty()
	}
}
