//! Error types for registration, conversion and instantiation.

use std::fmt;

/// Declaration fields that must be present on a component itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclField {
	Tag,
	Html,
	Css,
	Observed,
}

impl DeclField {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Tag => "tag",
			Self::Html => "html",
			Self::Css => "css",
			Self::Observed => "observed",
		}
	}
}

impl fmt::Display for DeclField {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Kinds of globally id-addressed definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdKind {
	Mixin,
	Plugin,
	Presenter,
}

impl IdKind {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Mixin => "mixin",
			Self::Plugin => "plugin",
			Self::Presenter => "presenter",
		}
	}
}

impl fmt::Display for IdKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Programmer errors in a component, extension or presenter declaration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
	/// A required declaration field is absent.
	#[error("component `{component}` must declare `{field}`")]
	MissingField { component: String, field: DeclField },

	/// The declared tag is not a valid custom element name.
	#[error("component `{component}` declares `{tag}`, which is not a valid custom element tag")]
	InvalidTag { component: String, tag: String },

	/// An extension or presenter was registered without an id.
	#[error("no id was defined for this {kind}")]
	MissingId { kind: IdKind },

	/// A component lists an extension that was never registered globally.
	#[error("component `{component}` uses {kind} `{id}`, which has not been registered")]
	UnregisteredExtension { component: String, kind: IdKind, id: String },
}

/// A second definition was registered under an id already in use.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("the {kind} id `{id}` has already been registered")]
pub struct DuplicateIdError {
	pub kind: IdKind,
	pub id: String,
}

/// A converter rejected its raw attribute text.
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
	#[error("malformed json: {0}")]
	Json(#[from] serde_json::Error),

	#[error("`{type_name}` cannot represent {raw:?}: {reason}")]
	Rejected {
		type_name: String,
		raw: String,
		reason: String,
	},
}

/// Errors returned by registration entry points.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
	#[error(transparent)]
	Configuration(#[from] ConfigurationError),

	#[error(transparent)]
	DuplicateId(#[from] DuplicateIdError),
}

/// Errors returned by [`Runtime`](crate::Runtime) operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeError {
	/// No record is cached for the requested tag.
	#[error("no component is registered for tag `{0}`")]
	UnknownTag(String),
}

/// Errors loading a [`RuntimeConfig`](crate::RuntimeConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("invalid runtime configuration: {0}")]
	Toml(#[from] toml::de::Error),
}
