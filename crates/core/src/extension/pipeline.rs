use indexmap::IndexSet;

use super::{Extension, ExtensionKind};
use crate::component::ComponentClass;
use crate::convert::ConverterTable;
use crate::observed::{AttributeNames, ObservedMap};
use crate::template::{Styles, Template};

/// Ids of the extensions already applied to one tag, per variant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ExtensionLedger {
	mixins: IndexSet<String>,
	plugins: IndexSet<String>,
}

impl ExtensionLedger {
	pub fn contains(&self, id: &str) -> bool {
		self.mixins.contains(id) || self.plugins.contains(id)
	}

	/// Records `id`; returns `false` if it was already present.
	fn record(&mut self, kind: ExtensionKind, id: &str) -> bool {
		if self.contains(id) {
			return false;
		}
		match kind {
			ExtensionKind::Mixin => self.mixins.insert(id.to_owned()),
			ExtensionKind::Plugin => self.plugins.insert(id.to_owned()),
		}
	}

	pub fn mixins(&self) -> impl Iterator<Item = &str> {
		self.mixins.iter().map(String::as_str)
	}

	pub fn plugins(&self) -> impl Iterator<Item = &str> {
		self.plugins.iter().map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.mixins.len() + self.plugins.len()
	}
}

/// Mutable record state while a tag's extensions are being attached.
#[derive(Debug)]
pub(crate) struct RecordDraft {
	pub template: Template,
	pub styles: Styles,
	pub observed: ObservedMap,
	pub attributes: AttributeNames,
	pub converters: ConverterTable,
	pub ledger: ExtensionLedger,
	/// Attached extensions in attachment order.
	pub attached: Vec<Extension>,
}

impl RecordDraft {
	pub fn new(template: Template, styles: Styles, observed: ObservedMap, converters: ConverterTable) -> Self {
		let attributes = AttributeNames::derive(&observed);
		Self {
			template,
			styles,
			observed,
			attributes,
			converters,
			ledger: ExtensionLedger::default(),
			attached: Vec::new(),
		}
	}

	/// Attaches `extensions` in order; each id is applied at most once.
	pub fn attach_all(&mut self, class: &ComponentClass, extensions: &[Extension]) -> usize {
		extensions.iter().filter(|extension| self.attach(class, extension)).count()
	}

	/// Attaches one extension. Re-attaching an id already in the ledger is a
	/// silent no-op and returns `false`.
	pub fn attach(&mut self, class: &ComponentClass, extension: &Extension) -> bool {
		let id = extension.id();
		if !self.ledger.record(extension.kind(), id) {
			tracing::trace!(component = class.name(), id, "extension.attach.skip");
			return false;
		}

		class.push_extension(extension);
		extension.contribute(self);
		self.attached.push(extension.clone());
		tracing::debug!(component = class.name(), kind = ?extension.kind(), id, "extension.attach");
		true
	}
}
