//! Host platform seam.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::component::ComponentClass;

/// What the runtime needs from the platform that owns real elements.
pub trait Host: Send + Sync {
	/// Defines `tag` as a custom element backed by `class`, watching
	/// `observed_attributes` for changes.
	fn define(&self, tag: &str, class: &Arc<ComponentClass>, observed_attributes: &[String]);
}

/// One call recorded by [`HeadlessHost`].
#[derive(Debug, Clone)]
pub struct Definition {
	pub tag: String,
	pub class: Arc<ComponentClass>,
	pub observed_attributes: Vec<String>,
}

/// In-memory host that records definitions.
#[derive(Debug, Default)]
pub struct HeadlessHost {
	definitions: Mutex<Vec<Definition>>,
}

impl HeadlessHost {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn definitions(&self) -> Vec<Definition> {
		self.definitions.lock().clone()
	}

	pub fn is_defined(&self, tag: &str) -> bool {
		self.definitions.lock().iter().any(|d| d.tag == tag)
	}
}

impl Host for HeadlessHost {
	fn define(&self, tag: &str, class: &Arc<ComponentClass>, observed_attributes: &[String]) {
		tracing::trace!(tag, attributes = observed_attributes.len(), "host.define");
		self.definitions.lock().push(Definition {
			tag: tag.to_owned(),
			class: Arc::clone(class),
			observed_attributes: observed_attributes.to_vec(),
		});
	}
}
