//! Keycode definitions for events coming from the key notifier
//!
//! Keycodes are macOS virtual keycodes as reported by the helper
//! process. A subset of them maps to printable characters.

mod codes;
mod quasimode;

pub use codes::{
    char_for_keycode, keycode_for_char, KeyEventKind, KEYCODE_BACK, KEYCODE_CAPITAL,
    KEYCODE_DOWN, KEYCODE_ESCAPE, KEYCODE_LCONTROL, KEYCODE_LSHIFT, KEYCODE_LWIN,
    KEYCODE_RCONTROL, KEYCODE_RETURN, KEYCODE_RSHIFT, KEYCODE_RWIN, KEYCODE_SPACE, KEYCODE_TAB,
    KEYCODE_UNAVAILABLE, KEYCODE_UP,
};
pub use quasimode::{InvalidSlotError, QuasimodeKeycode, QuasimodeKeycodes, QUASIMODE_SLOTS};
