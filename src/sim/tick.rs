//! Per-frame simulation driver
//!
//! `advance` is the whole external contract: give it the state, an input
//! snapshot and the host clock, and it runs pruning, AI, input, springs,
//! integration, events and the oscillator rewrite in a fixed order.

use glam::Vec2;

use super::state::{EntityKind, GameState};
use super::{constraint, events, lifecycle, waveform};
use crate::consts::PALETTE_SIZE;

/// Input snapshot for a single frame (deterministic)
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// Boost modifier
    pub action: bool,

    /// Edge flags, true only on the frame the key goes down
    pub left_pressed: bool,
    pub right_pressed: bool,
    pub up_pressed: bool,
    pub down_pressed: bool,
    pub action_pressed: bool,

    /// Pointer drag: pull the player anchor toward this world position
    pub drag_target: Option<Vec2>,
}

impl TickInput {
    /// Fill in the edge flags from the previous frame's snapshot.
    pub fn with_edges(mut self, prev: &TickInput) -> Self {
        self.left_pressed = self.left && !prev.left;
        self.right_pressed = self.right && !prev.right;
        self.up_pressed = self.up && !prev.up;
        self.down_pressed = self.down && !prev.down;
        self.action_pressed = self.action && !prev.action;
        self
    }
}

/// Advance the world to wall-clock time `now` (seconds, monotonic).
pub fn advance(state: &mut GameState, input: &TickInput, now: f32) {
    state.events.clear();
    state.time = now;

    update_level_clock(state);
    lifecycle::prune(state);
    constraint::begin_frame(state);
    update_worm_ai(state);
    apply_input(state, input);
    constraint::accumulate_springs(state);
    constraint::integrate_and_collide(state);
    events::apply_events(state);
    waveform::advance_note(state);
    waveform::derive_waves(state);
}

/// Advance the level clock, opening a tunnel between levels and wrapping
/// the palette when a level runs out.
fn update_level_clock(state: &mut GameState) {
    let t = state.time;
    if t > state.level_end_t {
        state.current_level = (state.current_level + 1) % PALETTE_SIZE;
        state.last_level_end_t = state.level_end_t;
        state.tunnel_begin_t = t;
        state.level_begin_t = t + state.tuning.tunnel_secs;
        state.level_end_t = state.level_begin_t + state.tuning.level_secs;
        state.populate_level();
        log::info!("entering level {}", state.current_level);
    }

    // Triangular radius ramp across the tunnel window, closed during play
    state.tunnel_size = if t < state.level_begin_t && state.level_begin_t > state.tunnel_begin_t {
        let x = ((t - state.tunnel_begin_t) / (state.level_begin_t - state.tunnel_begin_t))
            .clamp(0.0, 1.0);
        state.tuning.tunnel_max * (1.0 - (2.0 * x - 1.0).abs())
    } else {
        0.0
    };
}

/// Worm steering: re-pick the nearest food every couple of seconds, chase
/// the current target in between. A stored slot is trusted only while its
/// id still matches.
fn update_worm_ai(state: &mut GameState) {
    let retarget = state.tuning.worm_retarget_secs;
    let accel = state.tuning.worm_accel;
    let t = state.time;

    for wi in 0..state.entities.len() {
        if state.entities[wi].kind != EntityKind::Worm {
            continue;
        }

        let worm = &state.entities[wi];
        if worm.has_target {
            let slot = worm.target_entity_index;
            let stale = slot >= state.entities.len()
                || state.entities[slot].id != worm.target_entity_id
                || state.entities[slot].disposed;
            if stale {
                state.entities[wi].has_target = false;
            }
        }

        if t >= state.entities[wi].next_target_check_t || !state.entities[wi].has_target {
            let head = state.entities[wi].root().p;
            let mut best: Option<(usize, f32)> = None;
            for (fi, entity) in state.entities.iter().enumerate() {
                if entity.kind != EntityKind::Food || entity.disposed {
                    continue;
                }
                let dist = (entity.root().p - head).length();
                if best.is_none_or(|(_, b)| dist < b) {
                    best = Some((fi, dist));
                }
            }

            let best_id = best.map(|(fi, _)| state.entities[fi].id);
            let worm = &mut state.entities[wi];
            worm.next_target_check_t = t + retarget;
            if let (Some((fi, _)), Some(id)) = (best, best_id) {
                worm.has_target = true;
                worm.target_entity_index = fi;
                worm.target_entity_id = id;
            } else {
                worm.has_target = false;
            }
        }

        if state.entities[wi].has_target {
            let slot = state.entities[wi].target_entity_index;
            let target = state.entities[slot].root().p;
            state.entities[wi].target = target;
            let head = state.entities[wi].root().p;
            let steer = (target - head).normalize_or_zero() * accel;
            state.entities[wi].parts[0].a += steer;
        }
    }
}

/// Feed the input snapshot into the player anchor.
fn apply_input(state: &mut GameState, input: &TickInput) {
    let accel = if input.action {
        state.tuning.input_accel * 2.0
    } else {
        state.tuning.input_accel
    };
    let drag_accel = state.tuning.drag_accel;

    for entity in &mut state.entities {
        if entity.kind != EntityKind::Player {
            continue;
        }
        let root = &mut entity.parts[0];
        if input.left {
            root.a.x -= accel;
        }
        if input.right {
            root.a.x += accel;
        }
        if input.up {
            root.a.y -= accel;
        }
        if input.down {
            root.a.y += accel;
        }
        if let Some(target) = input.drag_target {
            let pull = (target - root.p) * 0.05;
            root.a += constraint::clamp_speed(pull, drag_accel);
        }
        if input.action_pressed {
            // Dash: banked like a collision impulse, lands next frame
            let dir = Vec2::new(
                (input.right as i32 - input.left as i32) as f32,
                (input.down as i32 - input.up as i32) as f32,
            )
            .normalize_or_zero();
            root.force += dir * root.mass * 4.0;
        }
    }
}
