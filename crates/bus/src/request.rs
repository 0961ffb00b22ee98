use std::future::Future;
use std::pin::Pin;
use std::sync::Weak;
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::Payload;
use crate::bus::BusInner;

/// Future returned by [`Bus::request`](crate::Bus::request).
///
/// Resolves with the payload retained under the topic, or with the next
/// payload broadcast under it. If the bus is dropped before anything is
/// broadcast, the request stays pending forever. Dropping a waiting request
/// withdraws it from the bus.
#[must_use = "requests do nothing unless awaited"]
pub struct Request {
	topic: Box<str>,
	state: RequestState,
	bus: Weak<BusInner>,
}

enum RequestState {
	Ready(Option<Payload>),
	Waiting(oneshot::Receiver<Payload>),
	Orphaned,
}

impl Request {
	pub(crate) fn ready(topic: &str, payload: Payload) -> Self {
		Self {
			topic: topic.into(),
			state: RequestState::Ready(Some(payload)),
			bus: Weak::new(),
		}
	}

	pub(crate) fn waiting(topic: &str, rx: oneshot::Receiver<Payload>, bus: Weak<BusInner>) -> Self {
		Self {
			topic: topic.into(),
			state: RequestState::Waiting(rx),
			bus,
		}
	}

	/// Topic this request resolves against.
	pub fn topic(&self) -> &str {
		&self.topic
	}
}

impl std::fmt::Debug for Request {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let state = match self.state {
			RequestState::Ready(Some(_)) => "ready",
			RequestState::Ready(None) => "consumed",
			RequestState::Waiting(_) => "waiting",
			RequestState::Orphaned => "orphaned",
		};
		f.debug_struct("Request").field("topic", &self.topic).field("state", &state).finish()
	}
}

impl Future for Request {
	type Output = Payload;

	fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Payload> {
		let this = self.get_mut();
		let orphaned = match &mut this.state {
			RequestState::Ready(payload) => {
				return match payload.take() {
					Some(payload) => Poll::Ready(payload),
					None => Poll::Pending,
				};
			}
			RequestState::Waiting(rx) => match Pin::new(rx).poll(cx) {
				Poll::Ready(Ok(payload)) => return Poll::Ready(payload),
				Poll::Ready(Err(_)) => true,
				Poll::Pending => false,
			},
			RequestState::Orphaned => return Poll::Pending,
		};

		if orphaned {
			tracing::trace!(topic = %this.topic, "bus.request.orphaned");
			this.state = RequestState::Orphaned;
		}
		Poll::Pending
	}
}

impl Drop for Request {
	fn drop(&mut self) {
		let RequestState::Waiting(rx) = std::mem::replace(&mut self.state, RequestState::Orphaned) else {
			return;
		};
		drop(rx);
		if let Some(bus) = self.bus.upgrade() {
			bus.prune_pending(&self.topic);
		}
	}
}
