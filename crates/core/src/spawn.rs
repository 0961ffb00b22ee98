use std::future::Future;
use std::sync::OnceLock;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Deferred work the runtime schedules, for trace classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum TaskKind {
	/// Pending attribute change waiting for its debounce tick.
	AttributeDebounce,
	/// Presenter lookup waiting on the bus.
	PresenterResolve,
	/// Element subscription forwarding bus payloads to a listener.
	ElementReceive,
}

impl TaskKind {
	pub(crate) const fn as_str(self) -> &'static str {
		match self {
			Self::AttributeDebounce => "attribute_debounce",
			Self::PresenterResolve => "presenter_resolve",
			Self::ElementReceive => "element_receive",
		}
	}
}

/// The ambient tokio runtime, or a process-wide single-worker runtime built on
/// first use outside one.
pub(crate) fn runtime_handle() -> tokio::runtime::Handle {
	if let Ok(handle) = tokio::runtime::Handle::try_current() {
		return handle;
	}

	static GLOBAL_RT: OnceLock<tokio::runtime::Runtime> = OnceLock::new();
	let runtime = GLOBAL_RT.get_or_init(|| {
		tokio::runtime::Builder::new_multi_thread()
			.enable_all()
			.worker_threads(1)
			.thread_name("shade-runtime")
			.build()
			.expect("failed to build shade global tokio runtime")
	});
	runtime.handle().clone()
}

/// Spawns deferred runtime work on the ambient tokio runtime, or on a
/// single-worker fallback runtime when called outside one.
pub(crate) fn spawn<F>(kind: TaskKind, fut: F) -> JoinHandle<F::Output>
where
	F: Future + Send + 'static,
	F::Output: Send + 'static,
{
	tracing::trace!(task_kind = kind.as_str(), "runtime.spawn");
	runtime_handle().spawn(fut)
}

/// Waits one scheduler turn for a zero delay, otherwise sleeps.
pub(crate) async fn defer(delay: Duration) {
	if delay.is_zero() {
		tokio::task::yield_now().await;
	} else {
		tokio::time::sleep(delay).await;
	}
}
