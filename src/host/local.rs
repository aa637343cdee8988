//! In-process host run loop
//!
//! A single-threaded stand-in for the native run loop: it owns one tick
//! deadline and a queue of posted notifications. Used on platforms without
//! a native backend and as the run loop in tests.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use super::{EventPump, HostError, NotificationChannel, NotificationName};
use crate::events::{EventSink, LoopEvent, Payload};

/// Messages queued on the local host
#[derive(Debug)]
enum HostMessage {
    Notification {
        name: NotificationName,
        payload: Payload,
    },
    Wake,
}

#[derive(Debug)]
struct LocalTimer {
    interval: Duration,
    next_fire: Instant,
    sink: EventSink,
}

impl LocalTimer {
    fn fire(&mut self) {
        trace!("local timer fired");
        self.sink.emit(LoopEvent::Tick);
        self.next_fire += self.interval;

        // Missed firings are coalesced into this one
        let now = Instant::now();
        if self.next_fire < now {
            self.next_fire = now + self.interval;
        }
    }
}

/// Single-threaded host with a tick deadline and a notification queue
#[derive(Debug)]
pub struct LocalHost {
    tx: mpsc::Sender<HostMessage>,
    rx: mpsc::Receiver<HostMessage>,
    timer: Option<LocalTimer>,
    observer: Option<(NotificationName, EventSink)>,
}

impl LocalHost {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx,
            timer: None,
            observer: None,
        }
    }

    /// Handle for posting notifications into this host, from any thread
    pub fn poster(&self) -> LocalPoster {
        LocalPoster {
            tx: self.tx.clone(),
        }
    }

    pub fn has_timer(&self) -> bool {
        self.timer.is_some()
    }

    pub fn has_observer(&self) -> bool {
        self.observer.is_some()
    }

    fn deliver(&mut self, message: HostMessage) {
        match message {
            HostMessage::Notification { name, payload } => match &self.observer {
                Some((observed, sink)) if *observed == name => {
                    sink.emit(LoopEvent::Notification(payload));
                }
                _ => {
                    debug!(channel = %name, "dropping notification with no observer");
                }
            },
            HostMessage::Wake => trace!("local host woken"),
        }
    }
}

impl Default for LocalHost {
    fn default() -> Self {
        Self::new()
    }
}

impl EventPump for LocalHost {
    fn add_timer(&mut self, interval: Duration, sink: EventSink) -> Result<(), HostError> {
        if interval.is_zero() {
            return Err(HostError::TimerRegistration);
        }
        self.timer = Some(LocalTimer {
            interval,
            next_fire: Instant::now() + interval,
            sink,
        });
        Ok(())
    }

    fn remove_timer(&mut self) {
        self.timer = None;
    }

    fn pump_one(&mut self) -> Result<(), HostError> {
        let message = match self.timer.as_mut() {
            Some(timer) => {
                let wait = timer.next_fire.saturating_duration_since(Instant::now());
                if wait.is_zero() {
                    timer.fire();
                    return Ok(());
                }
                match self.rx.recv_timeout(wait) {
                    Ok(message) => message,
                    Err(RecvTimeoutError::Timeout) => {
                        timer.fire();
                        return Ok(());
                    }
                    Err(RecvTimeoutError::Disconnected) => return Err(HostError::Disconnected),
                }
            }
            None => self.rx.recv().map_err(|_| HostError::Disconnected)?,
        };

        self.deliver(message);
        Ok(())
    }
}

impl NotificationChannel for LocalHost {
    fn add_observer(&mut self, name: &NotificationName, sink: EventSink) -> Result<(), HostError> {
        self.observer = Some((name.clone(), sink));
        Ok(())
    }

    fn remove_observer(&mut self) {
        self.observer = None;
    }
}

/// Posts notifications into a [`LocalHost`]
#[derive(Debug, Clone)]
pub struct LocalPoster {
    tx: mpsc::Sender<HostMessage>,
}

impl LocalPoster {
    /// Queue a notification. Returns false if the host is gone.
    pub fn post(&self, name: &NotificationName, payload: Payload) -> bool {
        self.tx
            .send(HostMessage::Notification {
                name: name.clone(),
                payload,
            })
            .is_ok()
    }

    /// Make a blocked `pump_one` return without producing an event
    pub fn wake(&self) -> bool {
        self.tx.send(HostMessage::Wake).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_wake_from_another_thread() {
        let mut host = LocalHost::new();
        let poster = host.poster();
        let (sink, inbox) = EventSink::channel();
        host.add_observer(&NotificationName::default(), sink).unwrap();

        let waker = thread::spawn(move || {
            thread::sleep(Duration::from_millis(5));
            poster.wake()
        });

        host.pump_one().unwrap();
        assert!(waker.join().unwrap());
        assert!(inbox.try_recv().is_err());
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let mut host = LocalHost::new();
        let (sink, _inbox) = EventSink::channel();
        assert!(matches!(
            host.add_timer(Duration::ZERO, sink),
            Err(HostError::TimerRegistration)
        ));
        assert!(!host.has_timer());
    }

    #[test]
    fn test_queued_notification_before_tick() {
        let mut host = LocalHost::new();
        let poster = host.poster();
        let (sink, inbox) = EventSink::channel();
        host.add_timer(Duration::from_secs(60), sink.clone()).unwrap();
        host.add_observer(&NotificationName::default(), sink).unwrap();

        assert!(poster.post(&NotificationName::default(), Payload::new()));
        host.pump_one().unwrap();

        assert_eq!(inbox.try_recv().unwrap(), LoopEvent::Notification(Payload::new()));
        assert!(inbox.try_recv().is_err());
    }
}
