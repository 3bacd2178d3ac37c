//! Property change notifications backed by a `tokio::sync::broadcast` channel.
//!
//! Each entity owns a [`PropertyChangedBus`]. Bindings and observers call
//! [`subscribe`](PropertyChangedBus::subscribe) and receive a
//! [`PropertyChanged`] for every notification raised after subscribing.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Property name raised after rule evaluation changes the error text.
pub const ERROR_PROPERTY: &str = "Error";
pub const IS_VALID_PROPERTY: &str = "IsValid";
pub const IS_NOT_VALID_PROPERTY: &str = "IsNotValid";
pub const IS_DIRTY_PROPERTY: &str = "IsDirty";
pub const ACTIVE_RULE_SET_PROPERTY: &str = "ActiveRuleSet";

/// Name raised when the indexer text for `property` may have changed.
pub fn indexer_property(property: &str) -> String {
    format!("Item[{property}]")
}

// ---------------------------------------------------------------------------
// PropertyChanged
// ---------------------------------------------------------------------------

/// A property of an entity changed or needs to be re-read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyChanged {
    pub property: String,
}

impl PropertyChanged {
    pub fn new(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// PropertyChangedBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// Fan-out of [`PropertyChanged`] events to any number of subscribers.
///
/// When the buffer is full the oldest unread events are dropped and slow
/// receivers observe `RecvError::Lagged`.
#[derive(Debug)]
pub struct PropertyChangedBus {
    sender: broadcast::Sender<PropertyChanged>,
}

impl PropertyChangedBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish to all current subscribers. Dropped when nobody listens.
    pub fn publish(&self, property: impl Into<String>) {
        // SendError only means there are zero receivers.
        let _ = self.sender.send(PropertyChanged::new(property));
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PropertyChanged> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for PropertyChangedBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl Clone for PropertyChangedBus {
    /// A clone publishes to the same subscribers.
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}
