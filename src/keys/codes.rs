//! Virtual keycodes, event kinds and the keycode-to-character table

use std::fmt;

/// Keycodes the helper cannot report are marked with this value
pub const KEYCODE_UNAVAILABLE: i32 = -1;

pub const KEYCODE_CAPITAL: i32 = KEYCODE_UNAVAILABLE;
pub const KEYCODE_LSHIFT: i32 = KEYCODE_UNAVAILABLE;
pub const KEYCODE_RSHIFT: i32 = KEYCODE_UNAVAILABLE;
pub const KEYCODE_LCONTROL: i32 = KEYCODE_UNAVAILABLE;
pub const KEYCODE_RCONTROL: i32 = KEYCODE_UNAVAILABLE;
pub const KEYCODE_LWIN: i32 = KEYCODE_UNAVAILABLE;
pub const KEYCODE_RWIN: i32 = KEYCODE_UNAVAILABLE;

pub const KEYCODE_SPACE: i32 = 49;
pub const KEYCODE_RETURN: i32 = 36;
pub const KEYCODE_ESCAPE: i32 = 53;
pub const KEYCODE_TAB: i32 = 48;
pub const KEYCODE_BACK: i32 = 51;
pub const KEYCODE_DOWN: i32 = 125;
pub const KEYCODE_UP: i32 = 126;

/// Keycode to character table. Letters are stored lowercase.
const CHARACTER_TABLE: &[(i32, char)] = &[
    (29, '0'),
    (18, '1'),
    (19, '2'),
    (20, '3'),
    (21, '4'),
    (23, '5'),
    (22, '6'),
    (26, '7'),
    (28, '8'),
    (25, '9'),
    (KEYCODE_SPACE, ' '),
    (0, 'a'),
    (11, 'b'),
    (8, 'c'),
    (2, 'd'),
    (14, 'e'),
    (3, 'f'),
    (5, 'g'),
    (4, 'h'),
    (34, 'i'),
    (38, 'j'),
    (40, 'k'),
    (37, 'l'),
    (46, 'm'),
    (45, 'n'),
    (31, 'o'),
    (35, 'p'),
    (12, 'q'),
    (15, 'r'),
    (1, 's'),
    (17, 't'),
    (32, 'u'),
    (9, 'v'),
    (13, 'w'),
    (7, 'x'),
    (16, 'y'),
    (6, 'z'),
    (44, '?'),
    (42, '\\'),
    (47, '.'),
    (41, ':'),
    (24, '+'),
    (27, '-'),
];

/// Character produced by `keycode`, if it has one
///
/// The table is case-insensitive, so letters always come back lowercase.
pub fn char_for_keycode(keycode: i32) -> Option<char> {
    CHARACTER_TABLE
        .iter()
        .find(|(code, _)| *code == keycode)
        .map(|(_, c)| *c)
}

/// Keycode of the key that types `c`, ignoring case
pub fn keycode_for_char(c: char) -> Option<i32> {
    let c = c.to_ascii_lowercase();
    CHARACTER_TABLE
        .iter()
        .find(|(_, mapped)| *mapped == c)
        .map(|(code, _)| *code)
}

/// Kind of key event passed to `on_keypress`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum KeyEventKind {
    /// A key was released while in the quasimode
    KeyUp = 0,
    /// A key was pressed while in the quasimode
    KeyDown = 1,
    /// The quasimode was entered or left; the keycode is a
    /// [`QuasimodeKeycode`](super::QuasimodeKeycode)
    Quasimode = 2,
}

impl fmt::Display for KeyEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyEventKind::KeyUp => write!(f, "KEY_UP"),
            KeyEventKind::KeyDown => write!(f, "KEY_DOWN"),
            KeyEventKind::Quasimode => write!(f, "KEY_QUASIMODE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letters_are_case_insensitive() {
        for c in 'a'..='z' {
            let lower = keycode_for_char(c);
            assert!(lower.is_some(), "no keycode for {c}");
            assert_eq!(lower, keycode_for_char(c.to_ascii_uppercase()));
        }
    }

    #[test]
    fn test_lookup_is_deterministic_both_ways() {
        for &(code, c) in CHARACTER_TABLE {
            assert_eq!(char_for_keycode(code), Some(c));
            assert_eq!(keycode_for_char(c), Some(code));
        }
    }

    #[test]
    fn test_known_keycodes() {
        assert_eq!(char_for_keycode(KEYCODE_SPACE), Some(' '));
        assert_eq!(char_for_keycode(0), Some('a'));
        assert_eq!(char_for_keycode(29), Some('0'));
        assert_eq!(keycode_for_char('Q'), Some(12));
    }

    #[test]
    fn test_unmapped_keycodes_have_no_character() {
        assert_eq!(char_for_keycode(KEYCODE_RETURN), None);
        assert_eq!(char_for_keycode(KEYCODE_UNAVAILABLE), None);
        assert_eq!(char_for_keycode(999), None);
        assert_eq!(keycode_for_char('!'), None);
    }

    #[test]
    fn test_table_has_no_duplicates() {
        for (i, (code, c)) in CHARACTER_TABLE.iter().enumerate() {
            for (other_code, other_c) in &CHARACTER_TABLE[i + 1..] {
                assert_ne!(code, other_code);
                assert_ne!(c, other_c);
            }
        }
    }
}
