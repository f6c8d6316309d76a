use crate::direction::{Direction, DirectionFlags};
use crate::key::{KeyCode, KeySnapshot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key-to-direction table used to resolve a key snapshot into direction flags.
///
/// Several keys may map to the same direction; a direction is active when any
/// of its keys is pressed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyBindings {
    bindings: BTreeMap<KeyCode, Direction>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let bindings = [
            (KeyCode::W, Direction::Forward),
            (KeyCode::A, Direction::Left),
            (KeyCode::D, Direction::Right),
            (KeyCode::S, Direction::Back),
            (KeyCode::Q, Direction::Up),
            (KeyCode::E, Direction::Down),
            (KeyCode::UP, Direction::PitchUp),
            (KeyCode::DOWN, Direction::PitchDown),
            (KeyCode::RIGHT, Direction::YawRight),
            (KeyCode::LEFT, Direction::YawLeft),
        ]
        .into_iter()
        .collect();
        Self { bindings }
    }
}

impl KeyBindings {
    /// A table with no bindings.
    pub fn empty() -> Self {
        Self {
            bindings: BTreeMap::new(),
        }
    }

    /// Bind `key` to `direction`, returning the direction it was bound to before.
    pub fn bind(&mut self, key: KeyCode, direction: Direction) -> Option<Direction> {
        self.bindings.insert(key, direction)
    }

    pub fn unbind(&mut self, key: KeyCode) -> Option<Direction> {
        self.bindings.remove(&key)
    }

    pub fn direction(&self, key: KeyCode) -> Option<Direction> {
        self.bindings.get(&key).copied()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Resolve the pressed keys into direction flags. Unbound keys are ignored.
    pub fn resolve(&self, keys: &KeySnapshot) -> DirectionFlags {
        let mut flags = DirectionFlags::new();
        for key in keys.iter() {
            match self.bindings.get(&key) {
                Some(direction) => flags.set(*direction, true),
                None => tracing::trace!(?key, "unbound key ignored"),
            }
        }
        flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bindings_cover_all_directions() {
        let bindings = KeyBindings::default();
        assert_eq!(bindings.len(), 10);
        let all_keys: KeySnapshot = (0..256).map(KeyCode).collect();
        let flags = bindings.resolve(&all_keys);
        for d in Direction::ALL {
            assert!(flags.is_set(d), "{d:?} has no default key");
        }
    }

    #[test]
    fn resolve_maps_pressed_keys() {
        let bindings = KeyBindings::default();
        let keys: KeySnapshot = [KeyCode::W, KeyCode::LEFT].into_iter().collect();
        let flags = bindings.resolve(&keys);
        assert!(flags.forward);
        assert!(flags.yaw_left);
        assert!(!flags.back);
        assert_eq!(flags.forward_axis(), 1.0);
        assert_eq!(flags.yaw_axis(), 1.0);
    }

    #[test]
    fn unbound_keys_are_ignored() {
        let bindings = KeyBindings::empty();
        let keys: KeySnapshot = [KeyCode::W].into_iter().collect();
        assert!(!bindings.resolve(&keys).any());
    }

    #[test]
    fn rebinding_replaces_direction() {
        let mut bindings = KeyBindings::default();
        assert_eq!(bindings.bind(KeyCode::W, Direction::Up), Some(Direction::Forward));
        assert_eq!(bindings.direction(KeyCode::W), Some(Direction::Up));
        assert_eq!(bindings.unbind(KeyCode::W), Some(Direction::Up));
        assert_eq!(bindings.direction(KeyCode::W), None);
    }

    #[test]
    fn bindings_from_yaml() {
        let yaml = "87: forward\n32: up\n";
        let bindings: KeyBindings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(bindings.direction(KeyCode::W), Some(Direction::Forward));
        assert_eq!(bindings.direction(KeyCode(32)), Some(Direction::Up));
        assert_eq!(bindings.len(), 2);
    }
}
