//! Event channel implementation using crossbeam-channel.
//!
//! The sorting engine reports what it did through this channel; the
//! terminal UI drains it between keypresses.

use crossbeam_channel::{unbounded, Receiver, Sender};

use super::Event;

/// Sends events from the core library.
#[derive(Clone)]
pub struct EventSender {
    inner: Sender<Event>,
}

impl EventSender {
    /// Send an event.
    ///
    /// If the receiver is dropped, the event is silently discarded.
    /// This allows reporting to be optional.
    pub fn send(&self, event: Event) {
        let _ = self.inner.send(event);
    }
}

/// Receives events from the core library.
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    /// Try to receive an event without blocking
    pub fn try_recv(&self) -> Option<Event> {
        self.inner.try_recv().ok()
    }

    /// Take every event that is currently queued, without blocking
    pub fn drain(&self) -> Vec<Event> {
        self.inner.try_iter().collect()
    }
}

/// Channel between the sorting engine and a UI layer.
pub struct EventChannel;

impl EventChannel {
    /// Create a new unbounded event channel.
    pub fn new() -> (EventSender, EventReceiver) {
        let (sender, receiver) = unbounded();
        (
            EventSender { inner: sender },
            EventReceiver { inner: receiver },
        )
    }
}

/// A no-op event sender for when nobody is listening.
pub fn null_sender() -> EventSender {
    let (sender, _receiver) = EventChannel::new();
    sender
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{ScanEvent, SessionEvent};
    use std::path::PathBuf;

    #[test]
    fn drain_returns_events_in_order() {
        let (sender, receiver) = EventChannel::new();

        sender.send(Event::Scan(ScanEvent::Completed { total_photos: 3 }));
        sender.send(Event::Session(SessionEvent::Skipped {
            path: PathBuf::from("/photos/a.jpg"),
        }));

        let events = receiver.drain();
        assert_eq!(events.len(), 2);
        assert!(matches!(
            events[0],
            Event::Scan(ScanEvent::Completed { total_photos: 3 })
        ));
        assert!(receiver.try_recv().is_none());
    }

    #[test]
    fn null_sender_does_not_panic() {
        let sender = null_sender();
        sender.send(Event::Session(SessionEvent::InvalidChoice));
    }
}
