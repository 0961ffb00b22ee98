//! Extension modules: mixins and plugins.
//!
//! An extension contributes to a component's registration record once per tag
//! (template, styles, observed attributes, converters) and receives
//! `connect`/`disconnect` calls once per element instance.
//!
//! Both variants share [`Contribute`]; only [`Mixin`]s may contribute typed
//! attribute declarations through [`Mixin::properties`].

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap as HashMap;

use crate::convert::ConverterTable;
use crate::element::Element;
use crate::error::IdKind;
use crate::observed::{AttributeNames, ObservedMap};
use crate::template::{Styles, Template};

mod pipeline;
mod registry;

pub(crate) use pipeline::{ExtensionLedger, RecordDraft};
pub use registry::ExtensionRegistry;

/// Hooks shared by every extension variant. All have no-op defaults.
pub trait Contribute: Send + Sync + 'static {
	/// Globally unique id.
	fn id(&self) -> &str;

	fn html(&self, _template: &mut Template) {}

	fn css(&self, _styles: &mut Styles) {}

	fn observed(&self, _attributes: &mut AttributeNames) {}

	fn converters(&self, _converters: &mut ConverterTable) {}

	/// Called when an element of an owning tag is created.
	fn connect(&self, _element: &Element) {}

	/// Called when an element of an owning tag is destroyed.
	fn disconnect(&self, _element: &Element) {}
}

/// Extension that may also declare typed attributes.
pub trait Mixin: Contribute {
	fn properties(&self, _observed: &mut ObservedMap) {}
}

/// Extension limited to the shared contribution hooks.
pub trait Plugin: Contribute {}

/// Variant tag of an [`Extension`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtensionKind {
	Mixin,
	Plugin,
}

impl ExtensionKind {
	pub const fn id_kind(self) -> IdKind {
		match self {
			Self::Mixin => IdKind::Mixin,
			Self::Plugin => IdKind::Plugin,
		}
	}
}

/// A registered-or-registrable extension module.
#[derive(Clone)]
pub enum Extension {
	Mixin(Arc<dyn Mixin>),
	Plugin(Arc<dyn Plugin>),
}

impl Extension {
	pub fn mixin(mixin: impl Mixin) -> Self {
		Self::Mixin(Arc::new(mixin))
	}

	pub fn plugin(plugin: impl Plugin) -> Self {
		Self::Plugin(Arc::new(plugin))
	}

	pub fn id(&self) -> &str {
		match self {
			Self::Mixin(m) => m.id(),
			Self::Plugin(p) => p.id(),
		}
	}

	pub fn kind(&self) -> ExtensionKind {
		match self {
			Self::Mixin(_) => ExtensionKind::Mixin,
			Self::Plugin(_) => ExtensionKind::Plugin,
		}
	}

	/// Runs the contribution hooks in their fixed order:
	/// template, styles, properties (mixins only), observed, converters.
	pub(crate) fn contribute(&self, draft: &mut RecordDraft) {
		match self {
			Self::Mixin(m) => {
				m.html(&mut draft.template);
				m.css(&mut draft.styles);
				m.properties(&mut draft.observed);
				draft.attributes.sync(&draft.observed);
				m.observed(&mut draft.attributes);
				m.converters(&mut draft.converters);
			}
			Self::Plugin(p) => {
				p.html(&mut draft.template);
				p.css(&mut draft.styles);
				p.observed(&mut draft.attributes);
				p.converters(&mut draft.converters);
			}
		}
	}

	pub(crate) fn connect(&self, element: &Element) {
		match self {
			Self::Mixin(m) => m.connect(element),
			Self::Plugin(p) => p.connect(element),
		}
	}

	pub(crate) fn disconnect(&self, element: &Element) {
		match self {
			Self::Mixin(m) => m.disconnect(element),
			Self::Plugin(p) => p.disconnect(element),
		}
	}
}

impl fmt::Debug for Extension {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Extension")
			.field("kind", &self.kind())
			.field("id", &self.id())
			.finish()
	}
}

/// Private per-instance state of one extension.
#[derive(Default)]
pub struct ExtensionState {
	values: HashMap<String, Box<dyn Any + Send + Sync>>,
}

impl ExtensionState {
	pub fn insert<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) -> Option<Box<dyn Any + Send + Sync>> {
		self.values.insert(key.into(), Box::new(value))
	}

	pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
		self.values.get(key)?.downcast_ref()
	}

	pub fn get_mut<T: Any>(&mut self, key: &str) -> Option<&mut T> {
		self.values.get_mut(key)?.downcast_mut()
	}

	pub fn remove(&mut self, key: &str) -> bool {
		self.values.remove(key).is_some()
	}

	pub fn len(&self) -> usize {
		self.values.len()
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}
}

impl fmt::Debug for ExtensionState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_set().entries(self.values.keys()).finish()
	}
}
