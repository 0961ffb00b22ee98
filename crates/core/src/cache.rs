use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap as HashMap;

use crate::record::RegistrationRecord;

/// Tag → registration record map; the single answer to "is this tag registered".
#[derive(Debug, Default)]
pub struct RegistrationCache {
	records: RwLock<HashMap<String, Arc<RegistrationRecord>>>,
}

impl RegistrationCache {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, tag: &str) -> Option<Arc<RegistrationRecord>> {
		self.records.read().get(tag).cloned()
	}

	pub fn contains(&self, tag: &str) -> bool {
		self.records.read().contains_key(tag)
	}

	/// Inserts `record` unless its tag is already cached.
	///
	/// Returns the cached record and whether it is the one just inserted.
	pub(crate) fn insert_if_absent(&self, record: RegistrationRecord) -> (Arc<RegistrationRecord>, bool) {
		let mut records = self.records.write();
		if let Some(existing) = records.get(record.tag()) {
			return (Arc::clone(existing), false);
		}
		let record = Arc::new(record);
		records.insert(record.tag().to_owned(), Arc::clone(&record));
		(record, true)
	}

	pub fn len(&self) -> usize {
		self.records.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.records.read().is_empty()
	}

	/// Registered tags, sorted.
	pub fn tags(&self) -> Vec<String> {
		let mut tags: Vec<_> = self.records.read().keys().cloned().collect();
		tags.sort_unstable();
		tags
	}
}
