//! The runtime: registries, cache, bus and host wired together.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use shade_bus::{Bus, Payload};

use crate::cache::RegistrationCache;
use crate::component::{ComponentClass, ComponentDecl};
use crate::config::RuntimeConfig;
use crate::convert::{Converter, ConverterRegistry};
use crate::element::Element;
use crate::error::{ConfigurationError, RegistrationError, RuntimeError};
use crate::extension::{Extension, ExtensionRegistry, RecordDraft};
use crate::host::{HeadlessHost, Host};
use crate::observed::ObservedMap;
use crate::presenter::{PresenterDef, PresenterRegistry};
use crate::record::RegistrationRecord;
use crate::spawn;
use crate::template::{Styles, Template};
use crate::topics;

/// Result of a successful [`Runtime::register`].
#[derive(Debug, Clone)]
pub enum Registration {
	/// This call built and published the record.
	Registered(Arc<RegistrationRecord>),
	/// The tag was already cached; nothing was rebuilt.
	AlreadyRegistered(Arc<RegistrationRecord>),
}

impl Registration {
	pub fn record(&self) -> &Arc<RegistrationRecord> {
		match self {
			Self::Registered(record) | Self::AlreadyRegistered(record) => record,
		}
	}

	pub fn is_new(&self) -> bool {
		matches!(self, Self::Registered(_))
	}
}

pub struct RuntimeBuilder {
	config: RuntimeConfig,
	bus: Option<Bus>,
	converters: Option<ConverterRegistry>,
	host: Option<Arc<dyn Host>>,
}

impl RuntimeBuilder {
	pub fn config(mut self, config: RuntimeConfig) -> Self {
		self.config = config;
		self
	}

	pub fn bus(mut self, bus: Bus) -> Self {
		self.bus = Some(bus);
		self
	}

	pub fn converters(mut self, converters: ConverterRegistry) -> Self {
		self.converters = Some(converters);
		self
	}

	pub fn host(mut self, host: Arc<dyn Host>) -> Self {
		self.host = Some(host);
		self
	}

	pub fn build(self) -> Runtime {
		let bus = self.bus.unwrap_or_default();
		Runtime {
			presenters: PresenterRegistry::new(bus.clone()),
			bus,
			config: self.config,
			cache: RegistrationCache::new(),
			extensions: ExtensionRegistry::new(),
			converters: self.converters.unwrap_or_default(),
			host: self.host.unwrap_or_else(|| Arc::new(HeadlessHost::new())),
		}
	}
}

/// Owns the process-wide registries for one component universe.
pub struct Runtime {
	config: RuntimeConfig,
	bus: Bus,
	cache: RegistrationCache,
	extensions: ExtensionRegistry,
	presenters: PresenterRegistry,
	converters: ConverterRegistry,
	host: Arc<dyn Host>,
}

impl Default for Runtime {
	fn default() -> Self {
		Self::builder().build()
	}
}

impl Runtime {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn builder() -> RuntimeBuilder {
		RuntimeBuilder {
			config: RuntimeConfig::default(),
			bus: None,
			converters: None,
			host: None,
		}
	}

	pub fn config(&self) -> &RuntimeConfig {
		&self.config
	}

	pub fn bus(&self) -> &Bus {
		&self.bus
	}

	pub fn cache(&self) -> &RegistrationCache {
		&self.cache
	}

	pub fn extensions(&self) -> &ExtensionRegistry {
		&self.extensions
	}

	pub fn presenters(&self) -> &PresenterRegistry {
		&self.presenters
	}

	pub fn converters(&self) -> &ConverterRegistry {
		&self.converters
	}

	pub fn register_converter(&self, name: impl Into<String>, converter: Converter) {
		self.converters.register(name, converter);
	}

	pub fn register_extension(&self, extension: Extension) -> Result<(), RegistrationError> {
		self.extensions.register(extension)
	}

	/// Registers and publishes a presenter; pending bindings for its id resolve.
	pub fn register_presenter(&self, def: PresenterDef) -> Result<Arc<PresenterDef>, RegistrationError> {
		self.presenters.register(def)
	}

	/// Registers `class` under its declared tag.
	///
	/// Idempotent per tag: a second call returns the cached record without
	/// re-running extension attachment. On error nothing is cached.
	pub fn register(&self, class: &Arc<ComponentClass>) -> Result<Registration, RegistrationError> {
		let decl = class.decl();
		let tag = decl.validate()?;
		self.check_extensions(decl)?;

		if let Some(record) = self.cache.get(tag) {
			tracing::debug!(component = class.name(), tag, "component.register.cached");
			return Ok(Registration::AlreadyRegistered(record));
		}

		let template = Template::new(decl.html_source().unwrap_or_default());
		let styles = decl.css_source().map(Styles::from_source).unwrap_or_default();
		let observed = ObservedMap::from_declared(
			decl.observed_entries()
				.unwrap_or_default()
				.iter()
				.map(|(name, type_name)| (name.as_str(), type_name.as_str())),
		);
		let mut converters = self.converters.snapshot();
		converters.extend(decl.converter_overrides().iter().cloned());

		let mut draft = RecordDraft::new(template, styles, observed, converters);
		let attached = draft.attach_all(class, decl.declared_extensions());
		let mode = decl.declared_mode().unwrap_or(self.config.shadow_mode);
		let record = RegistrationRecord::from_draft(tag.to_owned(), Arc::clone(class), mode, draft);

		let (record, inserted) = self.cache.insert_if_absent(record);
		if !inserted {
			tracing::debug!(component = class.name(), tag, "component.register.lost_race");
			return Ok(Registration::AlreadyRegistered(record));
		}

		self.host.define(tag, class, record.attribute_names());
		let payload: Payload = class.clone();
		let version = self.bus.announce_on(
			&spawn::runtime_handle(),
			&topics::component(tag),
			payload,
			self.config.announce_ttl(),
		);
		tracing::trace!(tag, version, "component.announce");
		tracing::info!(
			component = class.name(),
			tag,
			attached,
			observed = record.attribute_names().len(),
			"component.register"
		);
		Ok(Registration::Registered(record))
	}

	fn check_extensions(&self, decl: &ComponentDecl) -> Result<(), ConfigurationError> {
		match decl.declared_extensions().iter().find(|e| !self.extensions.contains(e.id())) {
			Some(missing) => Err(ConfigurationError::UnregisteredExtension {
				component: decl.name().to_owned(),
				kind: missing.kind().id_kind(),
				id: missing.id().to_owned(),
			}),
			None => Ok(()),
		}
	}

	/// Instantiates a registered tag.
	pub fn create(&self, tag: &str) -> Result<Element, RuntimeError> {
		let record = self.cache.get(tag).ok_or_else(|| RuntimeError::UnknownTag(tag.to_owned()))?;
		Ok(Element::create(record, self.bus.clone(), self.config.clone()))
	}

	/// Resolves with the component class once `tag` is registered.
	///
	/// Already-cached tags resolve immediately. Otherwise this waits for the
	/// tag's registration announcement; `None` if the topic carried something
	/// other than a component class.
	pub fn when_defined(&self, tag: &str) -> impl Future<Output = Option<Arc<ComponentClass>>> + Send + 'static {
		let cached = self.cache.get(tag).map(|record| Arc::clone(record.class()));
		let request = cached.is_none().then(|| self.bus.request(&topics::component(tag)));
		async move {
			if cached.is_some() {
				return cached;
			}
			request?.await.downcast::<ComponentClass>().ok()
		}
	}
}

impl fmt::Debug for Runtime {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Runtime")
			.field("config", &self.config)
			.field("tags", &self.cache.tags())
			.field("extensions", &self.extensions.len())
			.field("presenters", &self.presenters.len())
			.finish_non_exhaustive()
	}
}
