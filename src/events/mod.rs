//! Events flowing from host sources into the input manager's run loop
//!
//! Host sources (the tick timer and the notification listener) never call
//! into the manager directly. They push a [`LoopEvent`] through an
//! [`EventSink`], and the run loop drains the inbox after each pump.

use std::fmt;
use std::sync::mpsc;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Decoded key/value payload of a notification
pub type Payload = serde_json::Map<String, serde_json::Value>;

/// Typed view of a key notifier payload, tagged by its `event` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum KeyNotification {
    /// The quasimode key went down
    QuasimodeStart,

    /// The quasimode key came up
    QuasimodeEnd,

    /// A key was pressed outside the quasimode; which one is withheld
    SomeKey,

    KeyUp { keycode: i32 },

    KeyDown { keycode: i32 },
}

impl KeyNotification {
    /// Decode a payload, failing on unknown events or missing fields
    pub fn from_payload(payload: &Payload) -> Result<Self, serde_json::Error> {
        Self::deserialize(serde_json::Value::Object(payload.clone()))
    }
}

impl fmt::Display for KeyNotification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyNotification::QuasimodeStart => write!(f, "QUASIMODE_START"),
            KeyNotification::QuasimodeEnd => write!(f, "QUASIMODE_END"),
            KeyNotification::SomeKey => write!(f, "SOME_KEY"),
            KeyNotification::KeyUp { keycode } => write!(f, "KEY_UP ({})", keycode),
            KeyNotification::KeyDown { keycode } => write!(f, "KEY_DOWN ({})", keycode),
        }
    }
}

/// Something a host source produced for the run loop
#[derive(Debug, Clone, PartialEq)]
pub enum LoopEvent {
    /// The periodic timer fired
    Tick,
    /// A notification arrived on the subscribed channel
    Notification(Payload),
}

/// Sending half of the run loop inbox, handed to host sources
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::Sender<LoopEvent>,
}

impl EventSink {
    /// Create a sink and the inbox it feeds
    pub fn channel() -> (Self, mpsc::Receiver<LoopEvent>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }

    /// Push an event into the inbox
    ///
    /// Returns false if the run loop has gone away.
    pub fn emit(&self, event: LoopEvent) -> bool {
        if self.tx.send(event).is_err() {
            warn!("failed to deliver loop event - inbox closed?");
            return false;
        }
        true
    }
}
