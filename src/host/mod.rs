//! Host run loop integration
//!
//! The input manager only sees two narrow interfaces: an [`EventPump`]
//! that blocks for the next host event and can carry a repeating timer,
//! and a [`NotificationChannel`] that delivers system-wide notifications.
//! A real backend implements both over the same native run loop.

mod listener;
mod local;
#[cfg(target_os = "macos")]
mod macos;
mod timer;

use std::time::Duration;

use crate::events::EventSink;

pub use listener::NotificationListener;
pub use local::{LocalHost, LocalPoster};
#[cfg(target_os = "macos")]
pub use macos::MacHost;
pub use timer::{PeriodicTimer, TICK_INTERVAL, TICK_INTERVAL_MS};

/// Default channel object the key notifier posts under
pub const KEY_NOTIFIER_OBJECT: &str = "EnsoKeyNotifier";

/// Default message name of key notifier notifications
pub const KEY_NOTIFIER_MESSAGE: &str = "EnsoKeyNotifier_msg";

/// Address of a system-wide notification stream
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NotificationName {
    /// Sender object the notification is posted under
    pub object: String,
    /// Message name
    pub name: String,
}

impl NotificationName {
    pub fn new(object: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            object: object.into(),
            name: name.into(),
        }
    }
}

impl Default for NotificationName {
    fn default() -> Self {
        Self::new(KEY_NOTIFIER_OBJECT, KEY_NOTIFIER_MESSAGE)
    }
}

impl std::fmt::Display for NotificationName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.object, self.name)
    }
}

/// The host's event dispatch loop
pub trait EventPump {
    /// Install a repeating timer that emits `LoopEvent::Tick` into `sink`
    ///
    /// At most one timer is installed; installing again replaces it.
    fn add_timer(&mut self, interval: Duration, sink: EventSink) -> Result<(), HostError>;

    /// Remove the timer. Must be safe when none is installed.
    fn remove_timer(&mut self);

    /// Block until the next host event arrives and dispatch it
    ///
    /// Waits indefinitely. Sources fired by the event push into their
    /// sinks before this returns.
    fn pump_one(&mut self) -> Result<(), HostError>;
}

/// A system-wide notification center
pub trait NotificationChannel {
    /// Observe `name`, pushing each decoded payload into `sink`
    fn add_observer(&mut self, name: &NotificationName, sink: EventSink) -> Result<(), HostError>;

    /// Drop the observation. Must be safe when nothing is observed.
    fn remove_observer(&mut self);
}

/// Errors raised by a host backend
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("failed to install run loop timer")]
    TimerRegistration,

    #[error("failed to observe notification {0}")]
    ObserverRegistration(NotificationName),

    #[error("host event source disconnected")]
    Disconnected,
}
