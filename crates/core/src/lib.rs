//! Component registration, extension attachment and presenter binding.
//!
//! A component is declared once with a [`ComponentDecl`] and registered on a
//! [`Runtime`]. Registration builds a per-tag [`RegistrationRecord`]:
//!
//! - **Template and styles**: the markup blueprint and ordered style fragments
//!   every instance clones into its shadow root
//! - **Observed attributes**: attribute name to converter type; `presenter` is
//!   always observed as `string`
//! - **Converters**: the global [`ConverterRegistry`] snapshot plus
//!   per-component overrides
//! - **Extensions**: [`Mixin`]s and [`Plugin`]s applied once per tag, in
//!   declaration order
//!
//! Instances ([`Element`]) convert raw attribute changes after a debounce and
//! dispatch `<name>Changed` events. The `presenter` attribute binds the
//! element to a [`Presenter`] published on the [`shade_bus::Bus`], whether
//! the presenter was registered before or after the element asked for it.
//!
//! # Example
//!
//! ```
//! use shade_core::{ComponentClass, ComponentDecl, Runtime};
//!
//! let runtime = Runtime::new();
//! let class = ComponentClass::new(
//! 	ComponentDecl::new("Counter")
//! 		.tag("x-counter")
//! 		.html("<span></span>")
//! 		.css(":host { display: block; }")
//! 		.observe("count", "integer"),
//! );
//! let registration = runtime.register(&class).expect("valid declaration");
//! assert!(registration.record().is_observed("presenter"));
//! ```

mod cache;
mod component;
mod config;
mod convert;
mod element;
mod error;
mod extension;
mod host;
mod observed;
mod presenter;
mod record;
mod runtime;
mod spawn;
mod template;
pub mod topics;
mod value;

pub use cache::RegistrationCache;
pub use component::{ComponentClass, ComponentDecl, is_valid_tag};
pub use config::RuntimeConfig;
pub use convert::{Converter, ConverterRegistry, ConverterTable, parse_date, parse_float, parse_int, parse_number};
pub use element::{Element, ElementId, Event, EventDetail, Listener, ListenerId, changed_event_name};
pub use error::{
	ConfigError, ConfigurationError, ConversionError, DeclField, DuplicateIdError, IdKind, RegistrationError,
	RuntimeError,
};
pub use extension::{Contribute, Extension, ExtensionKind, ExtensionRegistry, ExtensionState, Mixin, Plugin};
pub use host::{Definition, HeadlessHost, Host};
pub use observed::{AttributeNames, DEFAULT_TYPE, ObservedMap, PRESENTER_ATTRIBUTE};
pub use presenter::{BindOutcome, Presenter, PresenterDef, PresenterRegistry};
pub use record::RegistrationRecord;
pub use runtime::{Registration, Runtime, RuntimeBuilder};
pub use shade_bus::{Bus, Payload};
pub use template::{ShadowMode, ShadowRoot, StyleFragment, StyleSource, Styles, Template};
pub use value::Value;
