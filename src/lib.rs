//! Wormsong - a gravity-free garden that sings as it moves
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spring physics, collisions, events)
//! - `audio`: Oscillator-bank mixer fed by the simulation
//! - `tuning`: Data-driven game balance
//!
//! Rendering, input polling and audio device setup live in the host
//! application; this crate only produces entity state, a per-frame event
//! queue and oscillator parameters.

pub mod audio;
pub mod sim;
pub mod tuning;

pub use tuning::Tuning;

use glam::{IVec2, Vec2};

/// Game configuration constants
pub mod consts {
    /// Maximum live entities in the world
    pub const MAX_ENTITIES: usize = 32;
    /// Maximum parts per entity
    pub const MAX_PARTS: usize = 32;
    /// Maximum queued events per frame
    pub const MAX_EVENTS: usize = 64;
    /// Oscillator bank capacity (one voice per live part)
    pub const MAX_VOICES: usize = 32;

    /// Play field dimensions
    pub const WORLD_W: f32 = 1280.0;
    pub const WORLD_H: f32 = 720.0;

    /// Number of level palettes; `current_level` wraps at this
    pub const PALETTE_SIZE: u32 = 9;
}

/// Normalize an integer vector, returning the zero vector for zero input.
///
/// Integer positions come from the renderer's pixel grid; the float variant
/// is `Vec2::normalize_or_zero`.
#[inline]
pub fn normalize_or_zero_i(v: IVec2) -> Vec2 {
    let sqrd_len = v.dot(v);
    if sqrd_len == 0 {
        return Vec2::ZERO;
    }
    let len = (sqrd_len as f32).sqrt();
    Vec2::new(v.x as f32 / len, v.y as f32 / len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_zero_int_vector() {
        let n = normalize_or_zero_i(IVec2::ZERO);
        assert_eq!(n, Vec2::ZERO);
        assert!(n.x.is_finite() && n.y.is_finite());
    }

    #[test]
    fn test_normalize_zero_float_vector() {
        let n = Vec2::ZERO.normalize_or_zero();
        assert_eq!(n, Vec2::ZERO);
    }

    #[test]
    fn test_normalize_int_vector_unit_length() {
        let n = normalize_or_zero_i(IVec2::new(3, 4));
        assert!((n.length() - 1.0).abs() < 1e-6);
        assert!((n.x - 0.6).abs() < 1e-6);
        assert!((n.y - 0.8).abs() < 1e-6);
    }
}
