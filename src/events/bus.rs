//! Event Bus - the channel between the controller and the presentation layer
//!
//! The presentation layer posts `Intent`s; the controller drains them in
//! FIFO order and publishes `Notice`s, which the presentation layer drains
//! in turn. Delivery is synchronous and single-threaded.

use super::types::{Intent, Notice};

/// Publish/subscribe capability the controller is constructed with
pub trait EventChannel {
    /// Publish a notice to whoever renders the game
    fn publish(&mut self, notice: Notice);

    /// Take all intents posted since the last call, oldest first
    fn take_intents(&mut self) -> Vec<Intent>;
}

/// Timestamped notice for the event bus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusEvent {
    /// Time in milliseconds since session start
    pub time_ms: u32,
    /// The event data
    pub notice: Notice,
}

/// In-memory event channel
#[derive(Debug, Default)]
pub struct EventBus {
    /// Intents waiting for the controller
    intents: Vec<Intent>,

    /// Notices published this frame, waiting to be rendered
    pending: Vec<BusEvent>,

    /// Notices that have been rendered (for the transcript)
    processed: Vec<BusEvent>,

    /// Current elapsed time in milliseconds (for timestamping)
    elapsed_ms: u32,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the elapsed time
    pub fn set_elapsed_ms(&mut self, elapsed_ms: u32) {
        self.elapsed_ms = elapsed_ms;
    }

    /// Post an intent for the controller
    pub fn post(&mut self, intent: Intent) {
        self.intents.push(intent);
    }

    /// Drain pending notices, moving them to processed
    pub fn drain(&mut self) -> Vec<BusEvent> {
        let events = std::mem::take(&mut self.pending);
        self.processed.extend(events.iter().cloned());
        events
    }

    /// Get all processed notices
    pub fn processed(&self) -> &[BusEvent] {
        &self.processed
    }

    /// Clear processed notices (after writing the transcript)
    pub fn clear_processed(&mut self) {
        self.processed.clear();
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Number of intents not yet taken by the controller
    pub fn queued_intents(&self) -> usize {
        self.intents.len()
    }

    pub fn elapsed_ms(&self) -> u32 {
        self.elapsed_ms
    }
}

impl EventChannel for EventBus {
    fn publish(&mut self, notice: Notice) {
        self.pending.push(BusEvent {
            time_ms: self.elapsed_ms,
            notice,
        });
    }

    fn take_intents(&mut self) -> Vec<Intent> {
        std::mem::take(&mut self.intents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_and_drain() {
        let mut bus = EventBus::new();
        bus.set_elapsed_ms(1500);

        bus.publish(Notice::Message("hello".to_string()));

        assert_eq!(bus.pending_count(), 1);
        assert!(bus.has_pending());

        let events = bus.drain();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].time_ms, 1500);
        assert_eq!(bus.pending_count(), 0);
        assert_eq!(bus.processed().len(), 1);

        bus.clear_processed();
        assert!(bus.processed().is_empty());
    }

    #[test]
    fn test_intents_are_fifo() {
        let mut bus = EventBus::new();
        bus.post(Intent::AdvanceTutorial);
        bus.post(Intent::StartBattle);
        assert_eq!(bus.queued_intents(), 2);

        let intents = bus.take_intents();
        assert_eq!(intents, vec![Intent::AdvanceTutorial, Intent::StartBattle]);
        assert!(bus.take_intents().is_empty());
    }
}
