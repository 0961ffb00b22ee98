//! Component declarations.
//!
//! A [`ComponentDecl`] is what an author writes: tag, markup, styles, observed
//! attributes and optional converters, extensions and shadow mode. Wrapped in
//! a [`ComponentClass`] it is what the runtime registers and instantiates.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::convert::Converter;
use crate::error::{ConfigurationError, DeclField};
use crate::extension::Extension;
use crate::template::{ShadowMode, StyleSource};

/// Names that match the custom element grammar but are reserved by the host.
const RESERVED_TAGS: &[&str] = &[
	"annotation-xml",
	"color-profile",
	"font-face",
	"font-face-src",
	"font-face-uri",
	"font-face-format",
	"font-face-name",
	"missing-glyph",
];

/// Static metadata of a component.
#[derive(Clone, Debug, Default)]
pub struct ComponentDecl {
	name: String,
	tag: Option<String>,
	html: Option<String>,
	css: Option<StyleSource>,
	observed: Option<Vec<(String, String)>>,
	converters: Vec<(String, Converter)>,
	extensions: Vec<Extension>,
	mode: Option<ShadowMode>,
}

impl ComponentDecl {
	/// Starts a declaration; `name` identifies it in diagnostics.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			..Self::default()
		}
	}

	/// Starts a declaration that shares `parent`'s optional metadata.
	///
	/// Converters, extensions and shadow mode carry over. Tag, markup, styles
	/// and observed attributes do not and must be declared again.
	pub fn inherit(name: impl Into<String>, parent: &ComponentDecl) -> Self {
		Self {
			name: name.into(),
			converters: parent.converters.clone(),
			extensions: parent.extensions.clone(),
			mode: parent.mode,
			..Self::default()
		}
	}

	pub fn tag(mut self, tag: impl Into<String>) -> Self {
		self.tag = Some(tag.into());
		self
	}

	pub fn html(mut self, html: impl Into<String>) -> Self {
		self.html = Some(html.into());
		self
	}

	pub fn css(mut self, css: impl Into<StyleSource>) -> Self {
		self.css = Some(css.into());
		self
	}

	/// Declares the observed attribute map; an empty map still counts as declared.
	pub fn observed<I, K, V>(mut self, entries: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		let entries = entries.into_iter().map(|(k, v)| (k.into(), v.into()));
		self.observed.get_or_insert_with(Vec::new).extend(entries);
		self
	}

	/// Adds one observed attribute.
	pub fn observe(self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
		self.observed([(name.into(), type_name.into())])
	}

	/// Overrides or adds a converter for this component only.
	pub fn converter(mut self, type_name: impl Into<String>, converter: Converter) -> Self {
		self.converters.push((type_name.into(), converter));
		self
	}

	pub fn extension(mut self, extension: Extension) -> Self {
		self.extensions.push(extension);
		self
	}

	pub fn mode(mut self, mode: ShadowMode) -> Self {
		self.mode = Some(mode);
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn tag_name(&self) -> Option<&str> {
		self.tag.as_deref()
	}

	pub(crate) fn html_source(&self) -> Option<&str> {
		self.html.as_deref()
	}

	pub(crate) fn css_source(&self) -> Option<&StyleSource> {
		self.css.as_ref()
	}

	pub(crate) fn observed_entries(&self) -> Option<&[(String, String)]> {
		self.observed.as_deref()
	}

	pub(crate) fn converter_overrides(&self) -> &[(String, Converter)] {
		&self.converters
	}

	pub fn declared_extensions(&self) -> &[Extension] {
		&self.extensions
	}

	pub(crate) fn declared_mode(&self) -> Option<ShadowMode> {
		self.mode
	}

	/// Checks the fields every component must declare itself.
	pub(crate) fn validate(&self) -> Result<&str, ConfigurationError> {
		let missing = |field| ConfigurationError::MissingField {
			component: self.name.clone(),
			field,
		};
		let tag = self.tag.as_deref().ok_or_else(|| missing(DeclField::Tag))?;
		self.html.as_ref().ok_or_else(|| missing(DeclField::Html))?;
		self.css.as_ref().ok_or_else(|| missing(DeclField::Css))?;
		self.observed.as_ref().ok_or_else(|| missing(DeclField::Observed))?;

		if !is_valid_tag(tag) {
			return Err(ConfigurationError::InvalidTag {
				component: self.name.clone(),
				tag: tag.to_owned(),
			});
		}
		Ok(tag)
	}
}

/// Custom element name check: lowercase ASCII start, at least one hyphen,
/// no uppercase, not reserved.
pub fn is_valid_tag(tag: &str) -> bool {
	let mut chars = tag.chars();
	let starts_lower = chars.next().is_some_and(|c| c.is_ascii_lowercase());
	starts_lower
		&& tag.contains('-')
		&& tag
			.chars()
			.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '.' | '_') || !c.is_ascii())
		&& !RESERVED_TAGS.contains(&tag)
}

/// A registrable component: its declaration plus the extensions resolved for it.
#[derive(Debug)]
pub struct ComponentClass {
	decl: ComponentDecl,
	resolved: Mutex<Vec<Extension>>,
}

impl ComponentClass {
	pub fn new(decl: ComponentDecl) -> Arc<Self> {
		Arc::new(Self {
			decl,
			resolved: Mutex::new(Vec::new()),
		})
	}

	pub fn decl(&self) -> &ComponentDecl {
		&self.decl
	}

	pub fn name(&self) -> &str {
		self.decl.name()
	}

	pub fn tag(&self) -> Option<&str> {
		self.decl.tag_name()
	}

	/// Extensions attached to this class, in attachment order.
	pub fn extensions(&self) -> Vec<Extension> {
		self.resolved.lock().clone()
	}

	/// Appends `extension` unless one with the same id is already resolved.
	pub(crate) fn push_extension(&self, extension: &Extension) -> bool {
		let mut resolved = self.resolved.lock();
		if resolved.iter().any(|e| e.id() == extension.id()) {
			return false;
		}
		resolved.push(extension.clone());
		true
	}
}
