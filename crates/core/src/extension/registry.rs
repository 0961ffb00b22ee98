use parking_lot::RwLock;
use rustc_hash::FxHashMap as HashMap;

use super::Extension;
use crate::error::{ConfigurationError, DuplicateIdError, RegistrationError};

/// Process-wide registry of extension ids.
///
/// Ids are unique across mixins and plugins. Registration is the point at
/// which an extension publishes its id; components may only list extensions
/// registered here.
#[derive(Debug, Default)]
pub struct ExtensionRegistry {
	entries: RwLock<HashMap<String, Extension>>,
}

impl ExtensionRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Publishes `extension` under its id.
	///
	/// Fails on an empty id or an id already registered, even by the same module.
	pub fn register(&self, extension: Extension) -> Result<(), RegistrationError> {
		let kind = extension.kind().id_kind();
		let id = extension.id().to_owned();
		if id.is_empty() {
			return Err(ConfigurationError::MissingId { kind }.into());
		}

		let mut entries = self.entries.write();
		if entries.contains_key(&id) {
			tracing::warn!(kind = %kind, id, "extension.register.duplicate");
			return Err(DuplicateIdError { kind, id }.into());
		}
		tracing::debug!(kind = %kind, id, "extension.register");
		entries.insert(id, extension);
		Ok(())
	}

	pub fn contains(&self, id: &str) -> bool {
		self.entries.read().contains_key(id)
	}

	pub fn get(&self, id: &str) -> Option<Extension> {
		self.entries.read().get(id).cloned()
	}

	pub fn len(&self) -> usize {
		self.entries.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.read().is_empty()
	}
}
