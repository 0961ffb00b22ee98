/// Errors surfaced by bus operations that need an executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BusError {
	/// No tokio runtime is available to schedule the retraction of an announcement.
	#[error("no tokio runtime available to schedule announcement expiry")]
	NoRuntime,
}
