//! Attribute coercion: converter functions, per-record tables and the global registry.
//!
//! A converter turns raw attribute text into a [`Value`]. Lookups never fail:
//! an unknown type name resolves to the identity converter, so attribute
//! coercion is best-effort rather than a registration-time check.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap as HashMap;

use crate::error::ConversionError;
use crate::value::Value;

mod builtins;

pub use builtins::{parse_date, parse_float, parse_int, parse_number};

type ConvertFn = dyn Fn(&str) -> Result<Value, ConversionError> + Send + Sync;

/// A pure `raw text -> value` coercion.
#[derive(Clone)]
pub struct Converter(Arc<ConvertFn>);

impl Converter {
	/// Wraps a fallible coercion.
	pub fn new<F>(f: F) -> Self
	where
		F: Fn(&str) -> Result<Value, ConversionError> + Send + Sync + 'static,
	{
		Self(Arc::new(f))
	}

	/// Wraps a coercion that cannot fail.
	pub fn infallible<F>(f: F) -> Self
	where
		F: Fn(&str) -> Value + Send + Sync + 'static,
	{
		Self::new(move |raw| Ok(f(raw)))
	}

	/// Passes the raw text through as [`Value::String`].
	pub fn identity() -> Self {
		Self::infallible(|raw| Value::String(raw.to_owned()))
	}

	pub fn convert(&self, raw: &str) -> Result<Value, ConversionError> {
		(self.0)(raw)
	}
}

impl fmt::Debug for Converter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("Converter(..)")
	}
}

/// Type name → converter mapping owned by a registration record.
#[derive(Clone, Default, Debug)]
pub struct ConverterTable {
	entries: HashMap<String, Converter>,
}

impl ConverterTable {
	pub fn new() -> Self {
		Self::default()
	}

	/// Table holding every built-in converter.
	pub fn builtins() -> Self {
		let mut table = Self::new();
		builtins::install(&mut table);
		table
	}

	/// Inserts or replaces the converter for `name`; last writer wins.
	pub fn insert(&mut self, name: impl Into<String>, converter: Converter) -> Option<Converter> {
		self.entries.insert(name.into(), converter)
	}

	pub fn get(&self, name: &str) -> Option<&Converter> {
		self.entries.get(name)
	}

	/// Converter for `name`, falling back to identity.
	pub fn resolve(&self, name: &str) -> Converter {
		self.entries.get(name).cloned().unwrap_or_else(Converter::identity)
	}

	pub fn contains(&self, name: &str) -> bool {
		self.entries.contains_key(name)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Registered type names, sorted.
	pub fn names(&self) -> Vec<&str> {
		let mut names: Vec<_> = self.entries.keys().map(String::as_str).collect();
		names.sort_unstable();
		names
	}
}

impl<S: Into<String>> Extend<(S, Converter)> for ConverterTable {
	fn extend<I: IntoIterator<Item = (S, Converter)>>(&mut self, iter: I) {
		for (name, converter) in iter {
			self.insert(name, converter);
		}
	}
}

/// Process-wide converter registry.
///
/// Populated at bootstrap and read afterwards; records copy a
/// [`snapshot`](Self::snapshot) before applying per-component overrides.
#[derive(Debug)]
pub struct ConverterRegistry {
	table: RwLock<ConverterTable>,
}

impl Default for ConverterRegistry {
	fn default() -> Self {
		Self::with_builtins()
	}
}

impl ConverterRegistry {
	/// Registry preloaded with the built-in converters.
	pub fn with_builtins() -> Self {
		Self {
			table: RwLock::new(ConverterTable::builtins()),
		}
	}

	/// Registry with no converters; every lookup resolves to identity.
	pub fn empty() -> Self {
		Self {
			table: RwLock::new(ConverterTable::new()),
		}
	}

	/// Inserts or overwrites a converter. There is no removal.
	pub fn register(&self, name: impl Into<String>, converter: Converter) {
		let name = name.into();
		let replaced = self.table.write().insert(name.clone(), converter).is_some();
		tracing::debug!(name, replaced, "converter.register");
	}

	/// Converter registered under `name`, or identity.
	pub fn get(&self, name: &str) -> Converter {
		self.table.read().resolve(name)
	}

	pub fn snapshot(&self) -> ConverterTable {
		self.table.read().clone()
	}
}
