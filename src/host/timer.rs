//! Fixed-interval tick timer

use std::time::Duration;

use tracing::debug;

use super::{EventPump, HostError};
use crate::events::EventSink;

/// Nominal tick interval in milliseconds, as reported to `on_tick`
pub const TICK_INTERVAL_MS: u32 = 10;

/// Nominal tick interval
pub const TICK_INTERVAL: Duration = Duration::from_millis(TICK_INTERVAL_MS as u64);

/// Repeating timer on the host run loop
///
/// Drift and coalescing are left to the host; firings are not corrected.
#[derive(Debug)]
pub struct PeriodicTimer {
    interval: Duration,
    active: bool,
}

impl PeriodicTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            active: false,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Install the timer on `pump`, delivering ticks into `sink`
    pub fn start<P: EventPump + ?Sized>(
        &mut self,
        pump: &mut P,
        sink: EventSink,
    ) -> Result<(), HostError> {
        pump.add_timer(self.interval, sink)?;
        self.active = true;
        debug!(interval_ms = self.interval.as_millis() as u64, "tick timer started");
        Ok(())
    }

    /// Remove the timer so nothing fires once the loop is gone
    pub fn stop<P: EventPump + ?Sized>(&mut self, pump: &mut P) {
        if !std::mem::replace(&mut self.active, false) {
            return;
        }
        pump.remove_timer();
        debug!("tick timer stopped");
    }
}

impl Default for PeriodicTimer {
    fn default() -> Self {
        Self::new(TICK_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::LoopEvent;
    use crate::host::LocalHost;

    #[test]
    fn test_default_interval() {
        let timer = PeriodicTimer::default();
        assert_eq!(timer.interval(), Duration::from_millis(10));
        assert!(!timer.is_active());
    }

    #[test]
    fn test_ticks_are_delivered() {
        let mut host = LocalHost::new();
        let (sink, inbox) = EventSink::channel();
        let mut timer = PeriodicTimer::new(Duration::from_millis(1));

        timer.start(&mut host, sink).unwrap();
        host.pump_one().unwrap();
        host.pump_one().unwrap();

        let events: Vec<_> = inbox.try_iter().collect();
        assert_eq!(events, vec![LoopEvent::Tick, LoopEvent::Tick]);
    }

    #[test]
    fn test_stop_removes_timer() {
        let mut host = LocalHost::new();
        let (sink, _inbox) = EventSink::channel();
        let mut timer = PeriodicTimer::default();

        timer.start(&mut host, sink).unwrap();
        assert!(host.has_timer());

        timer.stop(&mut host);
        timer.stop(&mut host);
        assert!(!timer.is_active());
        assert!(!host.has_timer());
    }
}
