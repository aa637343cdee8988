//! Subscription to the key notifier's notification channel

use tracing::{debug, info};

use super::{HostError, NotificationChannel, NotificationName};
use crate::events::EventSink;

/// Observes one named notification stream and forwards its payloads
///
/// Payloads are forwarded undecoded and unvalidated.
#[derive(Debug)]
pub struct NotificationListener {
    name: NotificationName,
    registered: bool,
}

impl NotificationListener {
    pub fn new(name: NotificationName) -> Self {
        Self {
            name,
            registered: false,
        }
    }

    pub fn name(&self) -> &NotificationName {
        &self.name
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    /// Start observing, delivering payloads into `sink`
    pub fn register<C: NotificationChannel + ?Sized>(
        &mut self,
        channel: &mut C,
        sink: EventSink,
    ) -> Result<(), HostError> {
        channel.add_observer(&self.name, sink)?;
        self.registered = true;
        info!(channel = %self.name, "listening for key notifications");
        Ok(())
    }

    /// Stop observing. Safe to call repeatedly or before `register`.
    pub fn unregister<C: NotificationChannel + ?Sized>(&mut self, channel: &mut C) {
        if !std::mem::replace(&mut self.registered, false) {
            return;
        }
        channel.remove_observer();
        debug!(channel = %self.name, "key notification listener removed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{LoopEvent, Payload};
    use crate::host::{EventPump, LocalHost};
    use serde_json::json;

    fn key_down(keycode: i32) -> Payload {
        json!({"event": "keyDown", "keycode": keycode})
            .as_object()
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_payloads_are_forwarded() {
        let mut host = LocalHost::new();
        let poster = host.poster();
        let (sink, inbox) = EventSink::channel();
        let mut listener = NotificationListener::new(NotificationName::default());

        listener.register(&mut host, sink).unwrap();
        poster.post(&NotificationName::default(), key_down(36));
        host.pump_one().unwrap();

        let events: Vec<_> = inbox.try_iter().collect();
        assert_eq!(events, vec![LoopEvent::Notification(key_down(36))]);
    }

    #[test]
    fn test_other_channels_are_ignored() {
        let mut host = LocalHost::new();
        let poster = host.poster();
        let (sink, inbox) = EventSink::channel();
        let mut listener = NotificationListener::new(NotificationName::default());

        listener.register(&mut host, sink).unwrap();
        poster.post(&NotificationName::new("Other", "Other_msg"), key_down(1));
        host.pump_one().unwrap();

        assert!(inbox.try_recv().is_err());
    }

    #[test]
    fn test_unregister_without_notifications() {
        let mut host = LocalHost::new();
        let (sink, _inbox) = EventSink::channel();
        let mut listener = NotificationListener::new(NotificationName::default());

        listener.unregister(&mut host);
        listener.register(&mut host, sink).unwrap();
        assert!(host.has_observer());

        listener.unregister(&mut host);
        listener.unregister(&mut host);
        assert!(!listener.is_registered());
        assert!(!host.has_observer());
    }
}
