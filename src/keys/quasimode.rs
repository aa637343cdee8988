//! Quasimode keycode slots
//!
//! The quasimode is entered while a designated key is held and left on
//! its release. Three slots name the physical keys that start, end and
//! cancel it.

use std::fmt;

/// Number of quasimode keycode slots
pub const QUASIMODE_SLOTS: usize = 3;

/// Logical quasimode keycodes, doubling as slot indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum QuasimodeKeycode {
    Start = 0,
    End = 1,
    /// Has a slot but is never dispatched; the helper does not report it.
    Cancel = 2,
}

impl QuasimodeKeycode {
    /// Slot index of this keycode
    pub fn slot(self) -> usize {
        self as usize
    }

    /// Value passed as the keycode of a `KeyEventKind::Quasimode` event
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for QuasimodeKeycode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuasimodeKeycode::Start => write!(f, "QUASIMODE_START"),
            QuasimodeKeycode::End => write!(f, "QUASIMODE_END"),
            QuasimodeKeycode::Cancel => write!(f, "QUASIMODE_CANCEL"),
        }
    }
}

/// Slot index outside `0..QUASIMODE_SLOTS`
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("quasimode keycode slot {0} is out of range (expected 0..=2)")]
pub struct InvalidSlotError(pub usize);

/// Physical keycodes mapped to the three quasimode slots
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuasimodeKeycodes {
    slots: [i32; QUASIMODE_SLOTS],
}

impl QuasimodeKeycodes {
    /// Keycode currently stored in `slot`
    pub fn get(&self, slot: usize) -> Result<i32, InvalidSlotError> {
        self.slots.get(slot).copied().ok_or(InvalidSlotError(slot))
    }

    /// Store `keycode` in `slot`
    pub fn set(&mut self, slot: usize, keycode: i32) -> Result<(), InvalidSlotError> {
        let entry = self.slots.get_mut(slot).ok_or(InvalidSlotError(slot))?;
        *entry = keycode;
        Ok(())
    }

    /// Keycode mapped to a logical quasimode keycode
    pub fn keycode(&self, which: QuasimodeKeycode) -> i32 {
        self.slots[which.slot()]
    }
}
