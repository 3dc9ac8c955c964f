//! Subscriber-list event bus for game notifications.
//!
//! The session and turn sequencer notify the UI collaborator through this
//! bus instead of holding nullable callbacks; emitting with zero
//! subscribers is the normal quiet case rather than a special one.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::turn::PlayerId;

/// A notification sent to the UI collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// The turn moved to another player.
    TurnChanged {
        /// The player whose turn it now is.
        player: PlayerId,
        /// The round the turn belongs to.
        round: u32,
    },
    /// Both players have moved and a new round began.
    RoundChanged {
        /// The new round number.
        round: u32,
    },
    /// The game ended with a winner.
    GameOver {
        /// The winning player.
        winner: PlayerId,
        /// Display message for the end-game screen.
        message: String,
    },
}

type Subscriber = Box<dyn Fn(&GameEvent) + Send>;

/// Ordered list of event subscribers.
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<Subscriber>,
}

impl EventBus {
    /// Creates a bus with no subscribers.
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
        }
    }

    /// Registers a subscriber called for every emitted event.
    pub fn subscribe(&mut self, subscriber: impl Fn(&GameEvent) + Send + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Delivers `event` to every subscriber in registration order.
    pub fn emit(&self, event: GameEvent) {
        debug!(?event, subscribers = self.subscribers.len(), "emitting event");
        for subscriber in &self.subscribers {
            subscriber(&event);
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_emit_with_no_subscribers_is_quiet() {
        let bus = EventBus::new();
        bus.emit(GameEvent::RoundChanged { round: 2 });
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_subscribers_receive_events_in_order() {
        let mut bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second"] {
            let seen = Arc::clone(&seen);
            bus.subscribe(move |event| {
                seen.lock().unwrap().push((tag, event.clone()));
            });
        }

        bus.emit(GameEvent::TurnChanged {
            player: PlayerId::Two,
            round: 1,
        });

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].0, "first");
        assert_eq!(seen[1].0, "second");
        assert_eq!(seen[0].1, seen[1].1);
    }
}
