//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One update per rendered frame, driven by the host clock
//! - Seeded RNG only
//! - Stable iteration order (entity/part slot order)
//! - No rendering, audio-device or platform dependencies

pub mod collision;
pub mod constraint;
pub mod events;
pub mod lifecycle;
pub mod state;
pub mod tick;
pub mod waveform;

pub use collision::{SegmentHit, intersect_segments, test_box_collision, test_line_collision};
pub use state::{
    Entity, EntityKind, GameEvent, GameState, Part, SharedWaves, Voice, WaveBanks,
};
pub use tick::{TickInput, advance};
