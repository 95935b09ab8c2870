//! # Events Module
//!
//! Reporting channel between the sorting engine and the UI.
//!
//! ## Design
//! The core library never prints. It emits events, and whichever UI is
//! driving the session decides how to show them.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//! let engine = SortingEngine::builder(root).events(sender).build()?;
//!
//! // Between keypresses
//! for event in receiver.drain() {
//!     render(&event);
//! }
//! ```

mod channel;
mod types;

pub use channel::{null_sender, EventChannel, EventReceiver, EventSender};
pub use types::*;
