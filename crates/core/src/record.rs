use std::sync::Arc;

use crate::component::ComponentClass;
use crate::convert::ConverterTable;
use crate::extension::{Extension, ExtensionLedger, RecordDraft};
use crate::observed::{DEFAULT_TYPE, ObservedMap};
use crate::template::{ShadowMode, Styles, Template};

/// Per-tag metadata shared by every instance of a component.
///
/// Built once at first registration of the tag, after every declared
/// extension has contributed, and never mutated afterwards.
#[derive(Debug)]
pub struct RegistrationRecord {
	tag: String,
	template: Template,
	styles: Styles,
	class: Arc<ComponentClass>,
	converters: ConverterTable,
	observed: ObservedMap,
	attribute_names: Vec<String>,
	mode: ShadowMode,
	ledger: ExtensionLedger,
	extensions: Vec<Extension>,
}

impl RegistrationRecord {
	pub(crate) fn from_draft(tag: String, class: Arc<ComponentClass>, mode: ShadowMode, draft: RecordDraft) -> Self {
		Self {
			tag,
			template: draft.template,
			styles: draft.styles,
			class,
			converters: draft.converters,
			observed: draft.observed,
			attribute_names: draft.attributes.as_slice().to_vec(),
			mode,
			ledger: draft.ledger,
			extensions: draft.attached,
		}
	}

	pub fn tag(&self) -> &str {
		&self.tag
	}

	pub fn template(&self) -> &Template {
		&self.template
	}

	pub fn styles(&self) -> &Styles {
		&self.styles
	}

	pub fn class(&self) -> &Arc<ComponentClass> {
		&self.class
	}

	pub fn converters(&self) -> &ConverterTable {
		&self.converters
	}

	pub fn observed(&self) -> &ObservedMap {
		&self.observed
	}

	/// Attributes the host must report changes for.
	pub fn attribute_names(&self) -> &[String] {
		&self.attribute_names
	}

	pub fn is_observed(&self, name: &str) -> bool {
		self.attribute_names.iter().any(|n| n == name)
	}

	/// Declared type of `name`, `string` when undeclared.
	pub fn type_of(&self, name: &str) -> &str {
		self.observed.type_of(name).unwrap_or(DEFAULT_TYPE)
	}

	pub fn mode(&self) -> ShadowMode {
		self.mode
	}

	/// Extensions in attachment order.
	pub fn extensions(&self) -> &[Extension] {
		&self.extensions
	}

	pub fn has_extension(&self, id: &str) -> bool {
		self.ledger.contains(id)
	}

	pub fn attached_mixins(&self) -> Vec<&str> {
		self.ledger.mixins().collect()
	}

	pub fn attached_plugins(&self) -> Vec<&str> {
		self.ledger.plugins().collect()
	}

	/// Number of distinct extension ids applied to this tag.
	pub fn attached_count(&self) -> usize {
		self.ledger.len()
	}
}
