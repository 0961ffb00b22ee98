//! In-process publish/request bus.
//!
//! Topics are plain strings. A topic holds at most one retained payload, the
//! most recent value broadcast under it. Requests against a topic resolve with
//! the retained payload immediately, or with the next broadcast if nothing is
//! retained yet. A request against a topic that is never broadcast stays
//! pending forever.
//!
//! ```
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let bus = shade_bus::Bus::new();
//! let request = bus.request("greeting");
//! bus.broadcast("greeting", String::from("hello"));
//! let payload = request.await;
//! assert_eq!(payload.downcast_ref::<String>().map(String::as_str), Some("hello"));
//! # }
//! ```

mod bus;
mod error;
mod request;

pub use bus::{Bus, Payload};
pub use error::BusError;
pub use request::Request;
