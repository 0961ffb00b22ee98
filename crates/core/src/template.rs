//! Markup and style blueprints, and the per-instance shadow root they are cloned into.
//!
//! Markup is injected literally; nothing here parses HTML.

use serde::{Deserialize, Serialize};

/// Markup blueprint cloned into each instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Template {
	markup: String,
}

impl Template {
	pub fn new(markup: impl Into<String>) -> Self {
		Self { markup: markup.into() }
	}

	pub fn markup(&self) -> &str {
		&self.markup
	}

	pub fn set_markup(&mut self, markup: impl Into<String>) {
		self.markup = markup.into();
	}

	pub fn append(&mut self, markup: &str) {
		self.markup.push_str(markup);
	}

	pub fn prepend(&mut self, markup: &str) {
		self.markup.insert_str(0, markup);
	}
}

/// One `<style>` element inside a [`Styles`] blueprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleFragment {
	pub id: Option<String>,
	pub css: String,
}

impl StyleFragment {
	pub fn new(css: impl Into<String>) -> Self {
		Self { id: None, css: css.into() }
	}

	pub fn with_id(id: impl Into<String>, css: impl Into<String>) -> Self {
		Self {
			id: Some(id.into()),
			css: css.into(),
		}
	}

	pub fn to_markup(&self) -> String {
		match &self.id {
			Some(id) => format!("<style type=\"text/css\" id=\"{id}\">\n{}\n</style>", self.css),
			None => format!("<style type=\"text/css\">\n{}\n</style>", self.css),
		}
	}
}

/// Ordered sibling style fragments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Styles {
	fragments: Vec<StyleFragment>,
}

impl Styles {
	/// Wraps each source individually, preserving order.
	pub fn from_source(source: &StyleSource) -> Self {
		Self {
			fragments: source.iter().map(StyleFragment::new).collect(),
		}
	}

	pub fn push(&mut self, fragment: StyleFragment) {
		self.fragments.push(fragment);
	}

	/// Replaces the fragment carrying the same id, or appends.
	///
	/// Returns `true` when an existing fragment was replaced.
	pub fn upsert(&mut self, fragment: StyleFragment) -> bool {
		let existing = fragment
			.id
			.as_deref()
			.and_then(|id| self.fragments.iter().position(|f| f.id.as_deref() == Some(id)));
		match existing {
			Some(index) => {
				self.fragments[index] = fragment;
				true
			}
			None => {
				self.fragments.push(fragment);
				false
			}
		}
	}

	pub fn fragments(&self) -> &[StyleFragment] {
		&self.fragments
	}

	pub fn len(&self) -> usize {
		self.fragments.len()
	}

	pub fn is_empty(&self) -> bool {
		self.fragments.is_empty()
	}

	/// Newline-joined `<style>` elements.
	pub fn to_markup(&self) -> String {
		self.fragments
			.iter()
			.map(StyleFragment::to_markup)
			.collect::<Vec<_>>()
			.join("\n")
	}
}

/// Declared style sources: a single stylesheet or an ordered list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleSource {
	Single(String),
	List(Vec<String>),
}

impl StyleSource {
	pub fn iter(&self) -> impl Iterator<Item = &str> {
		let slice: &[String] = match self {
			Self::Single(css) => std::slice::from_ref(css),
			Self::List(list) => list,
		};
		slice.iter().map(String::as_str)
	}
}

impl From<&str> for StyleSource {
	fn from(css: &str) -> Self {
		Self::Single(css.to_owned())
	}
}

impl From<String> for StyleSource {
	fn from(css: String) -> Self {
		Self::Single(css)
	}
}

impl From<Vec<String>> for StyleSource {
	fn from(list: Vec<String>) -> Self {
		Self::List(list)
	}
}

impl From<Vec<&str>> for StyleSource {
	fn from(list: Vec<&str>) -> Self {
		Self::List(list.into_iter().map(str::to_owned).collect())
	}
}

impl<const N: usize> From<[&str; N]> for StyleSource {
	fn from(list: [&str; N]) -> Self {
		Self::List(list.into_iter().map(str::to_owned).collect())
	}
}

/// Shadow encapsulation of an instance's root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShadowMode {
	/// Root reachable from outside the element.
	Open,
	/// Isolated root, inaccessible from outside.
	#[default]
	Closed,
}

/// Per-instance clone of a record's template and styles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShadowRoot {
	mode: ShadowMode,
	template: Template,
	styles: Styles,
}

impl ShadowRoot {
	pub(crate) fn attach(mode: ShadowMode, template: &Template, styles: &Styles) -> Self {
		Self {
			mode,
			template: template.clone(),
			styles: styles.clone(),
		}
	}

	pub fn mode(&self) -> ShadowMode {
		self.mode
	}

	pub fn template(&self) -> &Template {
		&self.template
	}

	pub fn styles(&self) -> &Styles {
		&self.styles
	}

	pub(crate) fn styles_mut(&mut self) -> &mut Styles {
		&mut self.styles
	}

	/// Markup followed by styles, as appended to the root.
	pub fn to_markup(&self) -> String {
		if self.styles.is_empty() {
			return self.template.markup().to_owned();
		}
		format!("{}\n{}", self.template.markup(), self.styles.to_markup())
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn each_style_source_is_wrapped_in_order() {
		let styles = Styles::from_source(&StyleSource::from(["a { color: red; }", "b { color: blue; }"]));
		assert_eq!(
			styles.to_markup(),
			"<style type=\"text/css\">\na { color: red; }\n</style>\n<style type=\"text/css\">\nb { color: blue; }\n</style>"
		);
	}

	#[test]
	fn upsert_replaces_fragment_with_same_id() {
		let mut styles = Styles::from_source(&StyleSource::from("base"));
		assert!(!styles.upsert(StyleFragment::with_id("theme", "dark")));
		assert!(styles.upsert(StyleFragment::with_id("theme", "light")));
		assert_eq!(styles.len(), 2);
		assert_eq!(styles.fragments()[1].css, "light");
	}

	#[test]
	fn shadow_root_clones_blueprints() {
		let mut template = Template::new("<slot></slot>");
		let styles = Styles::from_source(&StyleSource::from(":host { display: block; }"));
		let root = ShadowRoot::attach(ShadowMode::Closed, &template, &styles);
		template.append("<p>later</p>");
		assert_eq!(root.template().markup(), "<slot></slot>");
		assert!(root.to_markup().starts_with("<slot></slot>\n<style"));
	}
}
