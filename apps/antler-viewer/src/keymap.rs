use antler_input::KeyCode;
use winit::keyboard::KeyCode as PhysicalCode;

/// DOM-style code for a physical key, so configured bindings apply to the
/// window's keyboard. Keys with no sensible code map to `None`.
pub fn key_code(key: PhysicalCode) -> Option<KeyCode> {
    let code = match key {
        PhysicalCode::Backspace => 8,
        PhysicalCode::Tab => 9,
        PhysicalCode::Enter | PhysicalCode::NumpadEnter => 13,
        PhysicalCode::ShiftLeft | PhysicalCode::ShiftRight => 16,
        PhysicalCode::ControlLeft | PhysicalCode::ControlRight => 17,
        PhysicalCode::AltLeft | PhysicalCode::AltRight => 18,
        PhysicalCode::Space => 32,
        PhysicalCode::PageUp => 33,
        PhysicalCode::PageDown => 34,
        PhysicalCode::End => 35,
        PhysicalCode::Home => 36,
        PhysicalCode::ArrowLeft => 37,
        PhysicalCode::ArrowUp => 38,
        PhysicalCode::ArrowRight => 39,
        PhysicalCode::ArrowDown => 40,
        PhysicalCode::Digit0 => 48,
        PhysicalCode::Digit1 => 49,
        PhysicalCode::Digit2 => 50,
        PhysicalCode::Digit3 => 51,
        PhysicalCode::Digit4 => 52,
        PhysicalCode::Digit5 => 53,
        PhysicalCode::Digit6 => 54,
        PhysicalCode::Digit7 => 55,
        PhysicalCode::Digit8 => 56,
        PhysicalCode::Digit9 => 57,
        PhysicalCode::KeyA => 65,
        PhysicalCode::KeyB => 66,
        PhysicalCode::KeyC => 67,
        PhysicalCode::KeyD => 68,
        PhysicalCode::KeyE => 69,
        PhysicalCode::KeyF => 70,
        PhysicalCode::KeyG => 71,
        PhysicalCode::KeyH => 72,
        PhysicalCode::KeyI => 73,
        PhysicalCode::KeyJ => 74,
        PhysicalCode::KeyK => 75,
        PhysicalCode::KeyL => 76,
        PhysicalCode::KeyM => 77,
        PhysicalCode::KeyN => 78,
        PhysicalCode::KeyO => 79,
        PhysicalCode::KeyP => 80,
        PhysicalCode::KeyQ => 81,
        PhysicalCode::KeyR => 82,
        PhysicalCode::KeyS => 83,
        PhysicalCode::KeyT => 84,
        PhysicalCode::KeyU => 85,
        PhysicalCode::KeyV => 86,
        PhysicalCode::KeyW => 87,
        PhysicalCode::KeyX => 88,
        PhysicalCode::KeyY => 89,
        PhysicalCode::KeyZ => 90,
        _ => return None,
    };
    Some(KeyCode(code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movement_keys_match_default_bindings() {
        assert_eq!(key_code(PhysicalCode::KeyW), Some(KeyCode::W));
        assert_eq!(key_code(PhysicalCode::KeyA), Some(KeyCode::A));
        assert_eq!(key_code(PhysicalCode::KeyS), Some(KeyCode::S));
        assert_eq!(key_code(PhysicalCode::KeyD), Some(KeyCode::D));
        assert_eq!(key_code(PhysicalCode::KeyQ), Some(KeyCode::Q));
        assert_eq!(key_code(PhysicalCode::KeyE), Some(KeyCode::E));
    }

    #[test]
    fn arrows_match_default_bindings() {
        assert_eq!(key_code(PhysicalCode::ArrowLeft), Some(KeyCode::LEFT));
        assert_eq!(key_code(PhysicalCode::ArrowUp), Some(KeyCode::UP));
        assert_eq!(key_code(PhysicalCode::ArrowRight), Some(KeyCode::RIGHT));
        assert_eq!(key_code(PhysicalCode::ArrowDown), Some(KeyCode::DOWN));
    }

    #[test]
    fn both_shifts_share_a_code() {
        assert_eq!(key_code(PhysicalCode::ShiftLeft), key_code(PhysicalCode::ShiftRight));
        assert_eq!(key_code(PhysicalCode::Space), Some(KeyCode(32)));
    }

    #[test]
    fn unmapped_keys_are_ignored() {
        assert_eq!(key_code(PhysicalCode::F1), None);
        assert_eq!(key_code(PhysicalCode::Escape), None);
    }
}
