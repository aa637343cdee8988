//! Application hooks driven by the input manager

use super::InputManager;
use crate::keys::KeyEventKind;

/// Callbacks an application implements to receive input events
///
/// Every hook defaults to a no-op. Each one gets the manager back so it
/// can call [`InputManager::stop`] or change quasimode keycodes.
pub trait InputHandler {
    /// Called once the timer, helper and listener are up, before the
    /// first event is pumped
    fn on_init(&mut self, _manager: &mut InputManager) {}

    /// Called on every timer firing with the nominal interval
    fn on_tick(&mut self, _manager: &mut InputManager, _ms_elapsed: u32) {}

    /// Called for key events inside the quasimode and for entering or
    /// leaving it
    ///
    /// For [`KeyEventKind::Quasimode`] the keycode is a
    /// [`QuasimodeKeycode`](crate::keys::QuasimodeKeycode) value.
    fn on_keypress(&mut self, _manager: &mut InputManager, _kind: KeyEventKind, _keycode: i32) {}

    /// Called for keys pressed outside the quasimode. The key is withheld.
    fn on_some_key(&mut self, _manager: &mut InputManager) {}

    /// Mouse events are not implemented; never called.
    fn on_some_mouse_button(&mut self, _manager: &mut InputManager) {}

    /// Never called by the input manager itself.
    fn on_exit_requested(&mut self, _manager: &mut InputManager) {}

    /// Mouse events are not implemented; never called.
    fn on_mouse_move(&mut self, _manager: &mut InputManager, _x: i32, _y: i32) {}
}
