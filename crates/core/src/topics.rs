//! Bus topic names used by the runtime.

/// Retained presenter definition for `id`.
pub fn presenter(id: &str) -> String {
	format!("@shade/presenters/{id}")
}

/// Time-bounded announcement that `tag` finished registering.
pub fn component(tag: &str) -> String {
	format!("@shade/components/{tag}")
}

/// Style fragments pushed to every live element of `tag`.
pub fn styles(tag: &str) -> String {
	format!("@shade/styles/{tag}")
}

/// Lifecycle emits for elements of `tag`; `event` is `connected`, `adopted`
/// or `disconnected`.
pub fn element(event: &str, tag: &str) -> String {
	format!("@shade/element/{event}/{tag}")
}
