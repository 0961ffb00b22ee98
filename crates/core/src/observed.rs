//! Observed attribute metadata.

use indexmap::IndexMap;

/// Built-in attribute naming the presenter bound to an element.
pub const PRESENTER_ATTRIBUTE: &str = "presenter";

/// Type name every attribute without a declaration converts with.
pub const DEFAULT_TYPE: &str = "string";

/// Ordered attribute name → converter type name mapping.
///
/// Always contains `presenter → string`; that entry cannot be retyped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedMap {
	entries: IndexMap<String, String>,
}

impl Default for ObservedMap {
	fn default() -> Self {
		Self::from_declared(std::iter::empty::<(String, String)>())
	}
}

impl ObservedMap {
	/// Builds the map from declared entries plus the implicit presenter entry.
	pub fn from_declared<I, K, V>(declared: I) -> Self
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		let mut map = Self { entries: IndexMap::new() };
		for (name, type_name) in declared {
			map.insert(name, type_name);
		}
		map.entries
			.entry(PRESENTER_ATTRIBUTE.to_owned())
			.or_insert_with(|| DEFAULT_TYPE.to_owned());
		map
	}

	/// Declares or retypes `name`. Later declarations win, except that the
	/// presenter attribute stays `string`.
	///
	/// Returns `false` when the insert was refused.
	pub fn insert(&mut self, name: impl Into<String>, type_name: impl Into<String>) -> bool {
		let name = name.into();
		let type_name = type_name.into();
		if name == PRESENTER_ATTRIBUTE && type_name != DEFAULT_TYPE {
			tracing::warn!(attribute = %name, type_name = %type_name, "observed.presenter_retype_refused");
			return false;
		}
		self.entries.insert(name, type_name);
		true
	}

	/// Declared type name for `name`.
	pub fn type_of(&self, name: &str) -> Option<&str> {
		self.entries.get(name).map(String::as_str)
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

	/// Attribute names in declaration order.
	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.entries.keys().map(String::as_str)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
		self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
	}
}

/// Ordered, duplicate-free list of attribute names the host watches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeNames {
	names: Vec<String>,
}

impl AttributeNames {
	pub fn derive(observed: &ObservedMap) -> Self {
		let mut names = Self::default();
		names.sync(observed);
		names
	}

	/// Appends names present in `observed` but not yet listed.
	pub fn sync(&mut self, observed: &ObservedMap) {
		for name in observed.names() {
			self.push(name);
		}
	}

	/// Appends `name` unless already listed.
	pub fn push(&mut self, name: impl Into<String>) -> bool {
		let name = name.into();
		if self.contains(&name) {
			return false;
		}
		self.names.push(name);
		true
	}

	pub fn contains(&self, name: &str) -> bool {
		self.names.iter().any(|n| n == name)
	}

	pub fn as_slice(&self) -> &[String] {
		&self.names
	}

	pub fn len(&self) -> usize {
		self.names.len()
	}

	pub fn is_empty(&self) -> bool {
		self.names.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn presenter_is_implicit_and_last() {
		let map = ObservedMap::from_declared([("count", "integer"), ("label", "string")]);
		assert_eq!(map.names().collect::<Vec<_>>(), vec!["count", "label", "presenter"]);
		assert_eq!(map.type_of("presenter"), Some("string"));
	}

	#[test]
	fn presenter_cannot_be_retyped() {
		let mut map = ObservedMap::from_declared([("presenter", "json")]);
		assert_eq!(map.type_of("presenter"), Some("string"));
		assert!(!map.insert("presenter", "integer"));
		assert!(map.insert("presenter", "string"));
		assert_eq!(map.type_of("presenter"), Some("string"));
	}

	#[test]
	fn later_declarations_win_and_keep_position() {
		let mut map = ObservedMap::from_declared([("a", "string"), ("b", "string")]);
		map.insert("a", "json");
		assert_eq!(map.iter().collect::<Vec<_>>(), vec![("a", "json"), ("b", "string"), ("presenter", "string")]);
	}

	#[test]
	fn attribute_names_follow_observed_order() {
		let mut map = ObservedMap::from_declared([("a", "string")]);
		let mut names = AttributeNames::derive(&map);
		assert!(!names.push("a"));
		assert!(names.push("extra"));
		map.insert("b", "integer");
		names.sync(&map);
		assert_eq!(names.as_slice(), ["a", "presenter", "extra", "b"]);
	}
}
