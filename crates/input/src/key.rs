use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A keyboard key, numbered like DOM `keyCode` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyCode(pub u32);

impl KeyCode {
    pub const LEFT: Self = Self(37);
    pub const UP: Self = Self(38);
    pub const RIGHT: Self = Self(39);
    pub const DOWN: Self = Self(40);
    pub const A: Self = Self(65);
    pub const D: Self = Self(68);
    pub const E: Self = Self(69);
    pub const Q: Self = Self(81);
    pub const S: Self = Self(83);
    pub const W: Self = Self(87);

    /// Parse a key name such as `"w"` or `"left"`, or a numeric code.
    pub fn from_name(name: &str) -> Option<Self> {
        let key = match name.to_ascii_lowercase().as_str() {
            "left" => Self::LEFT,
            "up" => Self::UP,
            "right" => Self::RIGHT,
            "down" => Self::DOWN,
            "a" => Self::A,
            "d" => Self::D,
            "e" => Self::E,
            "q" => Self::Q,
            "s" => Self::S,
            "w" => Self::W,
            other => return other.parse().ok().map(Self),
        };
        Some(key)
    }
}

/// Set of keys held down at the start of a tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeySnapshot {
    pressed: BTreeSet<KeyCode>,
}

impl KeySnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: KeyCode) {
        self.pressed.insert(key);
    }

    pub fn release(&mut self, key: KeyCode) {
        self.pressed.remove(&key);
    }

    pub fn set(&mut self, key: KeyCode, pressed: bool) {
        if pressed {
            self.press(key);
        } else {
            self.release(key);
        }
    }

    pub fn is_pressed(&self, key: KeyCode) -> bool {
        self.pressed.contains(&key)
    }

    pub fn clear(&mut self) {
        self.pressed.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.pressed.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.pressed.iter().copied()
    }
}

impl FromIterator<KeyCode> for KeySnapshot {
    fn from_iter<I: IntoIterator<Item = KeyCode>>(iter: I) -> Self {
        Self {
            pressed: iter.into_iter().collect(),
        }
    }
}
