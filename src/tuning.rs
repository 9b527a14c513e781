//! Data-driven game balance
//!
//! Every physics and pacing knob lives here so a host can rebalance the
//! game from a JSON blob without recompiling. Defaults are the shipped
//! values.

use serde::{Deserialize, Serialize};

/// Balance knobs for the simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Springs & integration ===
    /// Spring stiffness toward the rest-length anchor
    pub spring_k: f32,
    /// Velocity damping applied to every part
    pub damping: f32,
    /// Hard speed cap, units per frame
    pub max_speed: f32,

    // === Collision response ===
    /// Velocity kept on the clamped axis after a world-bound rebound
    pub wall_restitution: f32,
    /// Normal-component damping when a swept move crosses a box edge
    pub normal_damping: f32,

    // === Input & AI ===
    /// Acceleration per held direction key on the player root
    pub input_accel: f32,
    /// Cap on drag-to-target acceleration
    pub drag_accel: f32,
    /// Worm steering acceleration toward its target
    pub worm_accel: f32,
    /// Seconds between worm target re-evaluations
    pub worm_retarget_secs: f32,
    /// Tail growth stops silently at this many parts
    pub worm_max_parts: usize,

    // === Level pacing ===
    /// Seconds a level lasts once play begins
    pub level_secs: f32,
    /// Seconds of tunnel transition between levels
    pub tunnel_secs: f32,
    /// Fully-open tunnel radius
    pub tunnel_max: f32,

    // === Music ===
    /// Seconds between note steps
    pub note_step_secs: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            spring_k: 0.1,
            damping: 0.2,
            max_speed: 10.0,

            wall_restitution: 0.4,
            normal_damping: 0.1,

            input_accel: 1.0,
            drag_accel: 2.0,
            worm_accel: 0.6,
            worm_retarget_secs: 2.0,
            worm_max_parts: 12,

            level_secs: 30.0,
            tunnel_secs: 5.0,
            tunnel_max: 320.0,

            note_step_secs: 4.0,
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
