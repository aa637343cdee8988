//! Run state owned by the input manager

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Flags owned by one [`InputManager`](super::InputManager)
#[derive(Debug, Default)]
pub struct RunState {
    should_stop: Arc<AtomicBool>,
    pub(crate) mouse_events_enabled: bool,
    pub(crate) is_modal: bool,
}

impl RunState {
    pub fn should_stop(&self) -> bool {
        self.should_stop.load(Ordering::SeqCst)
    }

    pub(crate) fn request_stop(&self) {
        self.should_stop.store(true, Ordering::SeqCst);
    }

    pub(crate) fn stop_handle(&self) -> StopHandle {
        StopHandle {
            should_stop: Arc::clone(&self.should_stop),
        }
    }
}

/// Requests a stop from outside the run loop, e.g. a signal watcher thread
///
/// Polled like [`InputManager::stop`](super::InputManager::stop): it takes
/// effect at the next dispatch boundary.
#[derive(Debug, Clone)]
pub struct StopHandle {
    should_stop: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.should_stop.store(true, Ordering::SeqCst);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.should_stop.load(Ordering::SeqCst)
    }

    pub(crate) fn clear(&self) {
        self.should_stop.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = RunState::default();
        assert!(!state.should_stop());
        assert!(!state.mouse_events_enabled);
        assert!(!state.is_modal);
    }

    #[test]
    fn test_stop_handle_shares_flag() {
        let state = RunState::default();
        let handle = state.stop_handle();

        std::thread::spawn(move || handle.stop()).join().unwrap();
        assert!(state.should_stop());

        state.stop_handle().clear();
        assert!(!state.should_stop());
    }
}
