//! enso-input: global key and timer event bridge
//!
//! Listens for key notifications posted by the external key notifier
//! helper and for a fixed 10 ms tick, and dispatches both to an
//! application's [`InputHandler`]:
//! - [`helper`] launches and interrupts the key notifier process
//! - [`host`] abstracts the run loop ([`EventPump`]) and the notification
//!   center ([`NotificationChannel`])
//! - [`manager`] runs the loop and owns the dispatch table
//!
//! Mouse events, modality and caps lock control are recorded but not
//! implemented.

pub mod config;
pub mod events;
pub mod helper;
pub mod host;
pub mod keys;
pub mod lifecycle;
pub mod manager;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use events::{KeyNotification, LoopEvent, Payload};
pub use host::{EventPump, NotificationChannel, NotificationName};
pub use keys::{KeyEventKind, QuasimodeKeycode};
pub use manager::{InputError, InputHandler, InputManager, StopHandle};
