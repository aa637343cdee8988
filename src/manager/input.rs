//! The input manager's run loop and event dispatch
//!
//! `run` brings up the tick timer, the key notifier helper and the
//! notification listener, then pumps the host one event at a time until a
//! stop is requested. Teardown runs on every exit path: a clean stop, a
//! host error, or a panic unwinding out of a hook.

use std::sync::mpsc;

use tracing::{debug, error, info, trace, warn};

use super::handler::InputHandler;
use super::state::{RunState, StopHandle};
use crate::config::Config;
use crate::events::{EventSink, KeyNotification, LoopEvent, Payload};
use crate::helper::{HelperConfig, HelperError, ProcessSupervisor};
use crate::host::{
    EventPump, HostError, NotificationChannel, NotificationListener, NotificationName,
    PeriodicTimer, TICK_INTERVAL, TICK_INTERVAL_MS,
};
use crate::keys::{InvalidSlotError, KeyEventKind, QuasimodeKeycode, QuasimodeKeycodes};

/// Errors surfaced by the input manager
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error(transparent)]
    Helper(#[from] HelperError),

    #[error(transparent)]
    Host(#[from] HostError),

    #[error(transparent)]
    InvalidSlot(#[from] InvalidSlotError),
}

/// Bridges host key notifications and timer ticks to an [`InputHandler`]
#[derive(Debug)]
pub struct InputManager {
    helper: HelperConfig,
    channel: NotificationName,
    state: RunState,
    quasimode_keycodes: QuasimodeKeycodes,
}

impl InputManager {
    /// Create a manager that launches the helper described by `helper`
    pub fn new(helper: HelperConfig) -> Self {
        Self {
            helper,
            channel: NotificationName::default(),
            state: RunState::default(),
            quasimode_keycodes: QuasimodeKeycodes::default(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.helper.clone()).with_channel(config.channel.clone())
    }

    /// Listen on a different notification channel
    pub fn with_channel(mut self, channel: NotificationName) -> Self {
        self.channel = channel;
        self
    }

    /// Run the event loop until [`stop`](Self::stop) is requested
    ///
    /// Fails without entering the loop if the timer, helper or listener
    /// cannot be started. Loop errors win over teardown errors, which are
    /// then only logged.
    pub fn run<H, I>(&mut self, host: &mut H, handler: &mut I) -> Result<(), InputError>
    where
        H: EventPump + NotificationChannel + ?Sized,
        I: InputHandler + ?Sized,
    {
        info!("entering input manager run loop");

        let (sink, inbox) = EventSink::channel();
        let mut session = Session::new(
            host,
            ProcessSupervisor::new(self.helper.clone()),
            NotificationListener::new(self.channel.clone()),
            self.state.stop_handle(),
        );
        if let Err(e) = session.start(sink) {
            error!(error = %e, "input manager failed to start");
            return Err(e);
        }

        let outcome = self.pump_until_stopped(&mut *session.host, &inbox, handler);
        let teardown = session.finish();
        drop(session);

        info!("exiting input manager run loop");
        match (outcome, teardown) {
            (Err(e), Err(teardown)) => {
                error!(error = %teardown, "key notifier teardown failed");
                Err(e)
            }
            (Err(e), Ok(())) => Err(e),
            (Ok(()), teardown) => teardown.map_err(Into::into),
        }
    }

    fn pump_until_stopped<H, I>(
        &mut self,
        host: &mut H,
        inbox: &mpsc::Receiver<LoopEvent>,
        handler: &mut I,
    ) -> Result<(), InputError>
    where
        H: EventPump + ?Sized,
        I: InputHandler + ?Sized,
    {
        handler.on_init(self);

        while !self.state.should_stop() {
            host.pump_one()?;

            for event in inbox.try_iter() {
                self.dispatch(handler, event);
                if self.state.should_stop() {
                    debug!("stop requested, leaving run loop");
                    break;
                }
            }
        }

        Ok(())
    }

    fn dispatch<I: InputHandler + ?Sized>(&mut self, handler: &mut I, event: LoopEvent) {
        match event {
            LoopEvent::Tick => self.dispatch_tick(handler),
            LoopEvent::Notification(payload) => {
                self.dispatch_payload(handler, &payload);
            }
        }
    }

    /// Deliver one timer tick, reporting the nominal interval
    pub fn dispatch_tick<I: InputHandler + ?Sized>(&mut self, handler: &mut I) {
        handler.on_tick(self, TICK_INTERVAL_MS);
    }

    /// Translate a key notifier payload into a hook call
    ///
    /// Returns false, after logging a warning, when the payload names an
    /// unknown event or lacks a required field.
    pub fn dispatch_payload<I: InputHandler + ?Sized>(
        &mut self,
        handler: &mut I,
        payload: &Payload,
    ) -> bool {
        let notification = match KeyNotification::from_payload(payload) {
            Ok(notification) => notification,
            Err(e) => {
                warn!(?payload, error = %e, "don't know what to do with event");
                return false;
            }
        };
        trace!(%notification, "key notification");

        match notification {
            KeyNotification::QuasimodeStart => handler.on_keypress(
                self,
                KeyEventKind::Quasimode,
                QuasimodeKeycode::Start.code(),
            ),
            KeyNotification::QuasimodeEnd => {
                handler.on_keypress(self, KeyEventKind::Quasimode, QuasimodeKeycode::End.code())
            }
            KeyNotification::SomeKey => handler.on_some_key(self),
            KeyNotification::KeyUp { keycode } => {
                handler.on_keypress(self, KeyEventKind::KeyUp, keycode)
            }
            KeyNotification::KeyDown { keycode } => {
                handler.on_keypress(self, KeyEventKind::KeyDown, keycode)
            }
        }
        true
    }

    /// Ask the run loop to exit after the event being dispatched
    pub fn stop(&mut self) {
        debug!("input manager stop requested");
        self.state.request_stop();
    }

    pub fn is_stop_requested(&self) -> bool {
        self.state.should_stop()
    }

    /// Handle for requesting a stop from another thread
    pub fn stop_handle(&self) -> StopHandle {
        self.state.stop_handle()
    }

    /// Record whether mouse events are wanted. Mouse events are not
    /// implemented, so no mouse hook fires either way.
    pub fn enable_mouse_events(&mut self, enabled: bool) {
        self.state.mouse_events_enabled = enabled;
    }

    pub fn mouse_events_enabled(&self) -> bool {
        self.state.mouse_events_enabled
    }

    /// Physical keycode mapped to quasimode slot `slot`
    pub fn quasimode_keycode(&self, slot: usize) -> Result<i32, InputError> {
        Ok(self.quasimode_keycodes.get(slot)?)
    }

    /// Map quasimode slot `slot` to a physical keycode
    ///
    /// Only recorded; the helper decides which key drives the quasimode.
    pub fn set_quasimode_keycode(&mut self, slot: usize, keycode: i32) -> Result<(), InputError> {
        self.quasimode_keycodes.set(slot, keycode)?;
        debug!(slot, keycode, "quasimode keycode set");
        Ok(())
    }

    /// Record modal (true) or quasimodal (false) behavior. No effect on
    /// dispatch.
    pub fn set_modality(&mut self, is_modal: bool) {
        self.state.is_modal = is_modal;
    }

    pub fn is_modal(&self) -> bool {
        self.state.is_modal
    }

    /// Caps lock control is not supported; this does nothing.
    pub fn set_caps_lock_mode(&mut self, enabled: bool) {
        debug!(enabled, "caps lock mode change ignored");
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new(HelperConfig::default())
    }
}

/// Everything `run` acquires, released in a fixed order on every exit path
struct Session<'h, H: EventPump + NotificationChannel + ?Sized> {
    host: &'h mut H,
    timer: PeriodicTimer,
    supervisor: ProcessSupervisor,
    listener: NotificationListener,
    stop: StopHandle,
    finished: bool,
}

impl<'h, H: EventPump + NotificationChannel + ?Sized> Session<'h, H> {
    fn new(
        host: &'h mut H,
        supervisor: ProcessSupervisor,
        listener: NotificationListener,
        stop: StopHandle,
    ) -> Self {
        Self {
            host,
            timer: PeriodicTimer::new(TICK_INTERVAL),
            supervisor,
            listener,
            stop,
            finished: false,
        }
    }

    fn start(&mut self, sink: EventSink) -> Result<(), InputError> {
        self.timer.start(&mut *self.host, sink.clone())?;
        self.supervisor.start()?;
        self.listener.register(&mut *self.host, sink)?;
        Ok(())
    }

    /// Unregister the listener, then stop the helper, then the timer
    fn finish(&mut self) -> Result<(), HelperError> {
        if std::mem::replace(&mut self.finished, true) {
            return Ok(());
        }
        self.listener.unregister(&mut *self.host);
        let helper = self.supervisor.stop();
        self.timer.stop(&mut *self.host);
        helper
    }
}

impl<H: EventPump + NotificationChannel + ?Sized> Drop for Session<'_, H> {
    fn drop(&mut self) {
        if let Err(e) = self.finish() {
            error!(error = %e, "teardown of aborted run failed");
        }
        // Leaves the manager runnable again, even after a panicking hook
        self.stop.clear();
    }
}
