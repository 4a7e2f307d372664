//! Keyboard command layer: diagnostics toggles and the jump dialog

use crate::core::constants::{GRID_MAX, GRID_MIN, TILE_SIZE};
use crate::core::viewport::ViewportState;
use serde::{Deserialize, Serialize};

/// Global keyboard commands recognized by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyCommand {
    ToggleDebug,
    ToggleBackend,
    OpenJumpDialog,
    ToggleLoadAll,
    ClearCaches,
}

impl KeyCommand {
    /// Maps a key name (as reported by the host) to a command.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "d" | "D" => Some(Self::ToggleDebug),
            "b" | "B" => Some(Self::ToggleBackend),
            "j" | "J" => Some(Self::OpenJumpDialog),
            "l" | "L" => Some(Self::ToggleLoadAll),
            "c" | "C" => Some(Self::ClearCaches),
            _ => None,
        }
    }
}

/// Parses jump-dialog input into tile coordinates.
///
/// Rejection happens here, before any state is touched, independent of the
/// safety monitor's own checks: `NaN` parses as a float but is not a place.
pub fn parse_jump(x: &str, y: &str) -> std::result::Result<(f64, f64), String> {
    let parse = |label: &str, raw: &str| -> std::result::Result<f64, String> {
        let value: f64 = raw
            .trim()
            .parse()
            .map_err(|_| format!("{} coordinate {:?} is not a number", label, raw))?;
        if !value.is_finite() {
            return Err(format!("{} coordinate {:?} is not finite", label, raw));
        }
        Ok(value)
    };
    Ok((parse("x", x)?, parse("y", y)?))
}

/// Offset that centers the given tile coordinates in the viewport.
///
/// Coordinates clamp into MAP_BOUNDS first, then
/// `offset = viewport/2 − tile · TILE_SIZE · scale`.
pub fn jump_offset(tile_x: f64, tile_y: f64, view: &ViewportState) -> (f64, f64) {
    let tile_x = tile_x.clamp(GRID_MIN as f64, GRID_MAX as f64);
    let tile_y = tile_y.clamp(GRID_MIN as f64, GRID_MAX as f64);
    (
        view.width as f64 / 2.0 - tile_x * TILE_SIZE * view.scale,
        view.height as f64 / 2.0 - tile_y * TILE_SIZE * view.scale,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        assert_eq!(KeyCommand::from_key("d"), Some(KeyCommand::ToggleDebug));
        assert_eq!(KeyCommand::from_key("B"), Some(KeyCommand::ToggleBackend));
        assert_eq!(KeyCommand::from_key("j"), Some(KeyCommand::OpenJumpDialog));
        assert_eq!(KeyCommand::from_key("l"), Some(KeyCommand::ToggleLoadAll));
        assert_eq!(KeyCommand::from_key("c"), Some(KeyCommand::ClearCaches));
        assert_eq!(KeyCommand::from_key("x"), None);
    }

    #[test]
    fn test_jump_offset_centers_tile() {
        let view = ViewportState::new(0.0, 0.0, 1.0, 800, 600);
        let offset = jump_offset(25.0, 25.0, &view);
        assert_eq!(offset, (400.0 - 25.0 * 512.0, 300.0 - 25.0 * 512.0));
        assert_eq!(offset, (-12400.0, -12500.0));
    }

    #[test]
    fn test_jump_clamps_to_map_bounds() {
        let view = ViewportState::new(0.0, 0.0, 2.0, 800, 600);
        assert_eq!(
            jump_offset(99.0, -3.0, &view),
            jump_offset(50.0, 0.0, &view)
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_jump("12", "34").is_ok());
        assert!(parse_jump(" 12.5 ", "0").is_ok());
        assert!(parse_jump("abc", "0").is_err());
        assert!(parse_jump("12", "").is_err());
        // These parse as floats but are rejected on finiteness.
        assert!(parse_jump("NaN", "0").is_err());
        assert!(parse_jump("inf", "0").is_err());
    }
}
