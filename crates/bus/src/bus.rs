use std::any::Any;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use rustc_hash::FxHashMap as HashMap;
use tokio::runtime::Handle;
use tokio::sync::{broadcast, oneshot};

use crate::{BusError, Request};

/// Type-erased value carried by the bus.
pub type Payload = Arc<dyn Any + Send + Sync>;

/// Capacity of each per-topic subscriber channel.
const SUBSCRIBER_CAPACITY: usize = 64;

struct Retained {
	payload: Payload,
	version: u64,
}

#[derive(Default)]
struct BusState {
	retained: HashMap<Box<str>, Retained>,
	pending: HashMap<Box<str>, Vec<oneshot::Sender<Payload>>>,
	subscribers: HashMap<Box<str>, broadcast::Sender<Payload>>,
	version: u64,
}

#[derive(Default)]
pub(crate) struct BusInner {
	state: Mutex<BusState>,
}

impl BusInner {
	/// Drops closed waiters on `topic`, and the entry once none remain.
	pub(crate) fn prune_pending(&self, topic: &str) {
		let mut state = self.state.lock();
		let Some(waiters) = state.pending.get_mut(topic) else {
			return;
		};
		waiters.retain(|waiter| !waiter.is_closed());
		if waiters.is_empty() {
			state.pending.remove(topic);
		}
	}
}

/// Publish/request bus keyed by string topic.
///
/// Cloning is cheap and yields a handle to the same bus.
#[derive(Clone, Default)]
pub struct Bus {
	inner: Arc<BusInner>,
}

impl std::fmt::Debug for Bus {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let state = self.inner.state.lock();
		f.debug_struct("Bus")
			.field("retained", &state.retained.len())
			.field("pending", &state.pending.values().map(Vec::len).sum::<usize>())
			.field("subscribed", &state.subscribers.len())
			.finish()
	}
}

impl Bus {
	/// Creates an empty bus.
	pub fn new() -> Self {
		Self::default()
	}

	/// Broadcasts `value` under `topic`.
	///
	/// See [`Self::broadcast_payload`].
	pub fn broadcast<T>(&self, topic: &str, value: T) -> u64
	where
		T: Any + Send + Sync,
	{
		self.broadcast_payload(topic, Arc::new(value))
	}

	/// Retains `payload` as the latest value of `topic`, resolves every request
	/// pending on it and forwards it to subscribers.
	///
	/// Returns the version assigned to the retained payload.
	pub fn broadcast_payload(&self, topic: &str, payload: Payload) -> u64 {
		let (version, waiters, subscribers) = {
			let mut state = self.inner.state.lock();
			state.version = state.version.wrapping_add(1);
			let version = state.version;
			state.retained.insert(
				topic.into(),
				Retained {
					payload: Arc::clone(&payload),
					version,
				},
			);
			let waiters = state.pending.remove(topic).unwrap_or_default();
			let subscribers = state.subscribers.get(topic).cloned();
			(version, waiters, subscribers)
		};

		tracing::trace!(topic, version, waiters = waiters.len(), "bus.broadcast");
		for waiter in waiters {
			let _ = waiter.send(Arc::clone(&payload));
		}
		if let Some(subscribers) = subscribers {
			let _ = subscribers.send(payload);
		}
		version
	}

	/// Forwards `payload` to current subscribers of `topic` without retaining it.
	///
	/// Pending requests are not resolved by an emit.
	pub fn emit(&self, topic: &str, payload: Payload) -> usize {
		let subscribers = self.inner.state.lock().subscribers.get(topic).cloned();
		let delivered = subscribers.map_or(0, |tx| tx.send(payload).unwrap_or(0));
		tracing::trace!(topic, delivered, "bus.emit");
		delivered
	}

	/// Requests the value of `topic`.
	///
	/// Resolves immediately when a payload is retained, otherwise when one is
	/// next broadcast.
	pub fn request(&self, topic: &str) -> Request {
		let mut state = self.inner.state.lock();
		if let Some(retained) = state.retained.get(topic) {
			return Request::ready(topic, Arc::clone(&retained.payload));
		}

		let (tx, rx) = oneshot::channel();
		let waiters = state.pending.entry(topic.into()).or_default();
		waiters.retain(|waiter| !waiter.is_closed());
		waiters.push(tx);
		tracing::trace!(topic, waiters = waiters.len(), "bus.request.pending");
		Request::waiting(topic, rx, Arc::downgrade(&self.inner))
	}

	/// Subscribes to every later broadcast or emit on `topic`.
	pub fn subscribe(&self, topic: &str) -> broadcast::Receiver<Payload> {
		let mut state = self.inner.state.lock();
		state
			.subscribers
			.entry(topic.into())
			.or_insert_with(|| broadcast::channel(SUBSCRIBER_CAPACITY).0)
			.subscribe()
	}

	/// Returns the payload currently retained under `topic`.
	pub fn retained(&self, topic: &str) -> Option<Payload> {
		self.inner
			.state
			.lock()
			.retained
			.get(topic)
			.map(|retained| Arc::clone(&retained.payload))
	}

	/// Drops the payload retained under `topic`.
	pub fn retract(&self, topic: &str) -> Option<Payload> {
		let removed = self.inner.state.lock().retained.remove(topic);
		tracing::trace!(topic, removed = removed.is_some(), "bus.retract");
		removed.map(|retained| retained.payload)
	}

	/// Drops the payload retained under `topic` only if it is still `version`.
	pub fn retract_version(&self, topic: &str, version: u64) -> bool {
		let mut state = self.inner.state.lock();
		match state.retained.get(topic) {
			Some(retained) if retained.version == version => {
				state.retained.remove(topic);
				true
			}
			_ => false,
		}
	}

	/// Broadcasts a payload that retracts itself after `ttl`.
	///
	/// The expiry is scheduled on the ambient tokio runtime; without one nothing
	/// is broadcast and [`BusError::NoRuntime`] is returned. Callers that own a
	/// runtime of their own use [`Self::announce_on`].
	pub fn announce(&self, topic: &str, payload: Payload, ttl: Duration) -> Result<u64, BusError> {
		let handle = Handle::try_current().map_err(|_| BusError::NoRuntime)?;
		Ok(self.announce_on(&handle, topic, payload, ttl))
	}

	/// Broadcasts a payload and schedules its retraction after `ttl` on `handle`.
	///
	/// A later broadcast on the same topic is not affected by the expiry.
	pub fn announce_on(&self, handle: &Handle, topic: &str, payload: Payload, ttl: Duration) -> u64 {
		let version = self.broadcast_payload(topic, payload);

		let bus: Weak<BusInner> = Arc::downgrade(&self.inner);
		let topic: Box<str> = topic.into();
		handle.spawn(async move {
			tokio::time::sleep(ttl).await;
			let Some(inner) = bus.upgrade() else {
				return;
			};
			let expired = Bus { inner }.retract_version(&topic, version);
			tracing::trace!(topic = %topic, version, expired, "bus.announce.expire");
		});
		version
	}

	/// Number of requests still waiting on `topic`.
	pub fn pending_requests(&self, topic: &str) -> usize {
		self.inner
			.state
			.lock()
			.pending
			.get(topic)
			.map_or(0, |waiters| waiters.iter().filter(|waiter| !waiter.is_closed()).count())
	}
}

#[cfg(test)]
mod tests;
