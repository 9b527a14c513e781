//! Wormsong headless driver
//!
//! Runs the simulation without a window or audio device: scripted input,
//! a fixed 60 Hz clock and periodic mixer pulls to exercise the bank
//! lock. Useful for soak-testing and profiling the core.

use std::time::Instant;

use wormsong::audio::Mixer;
use wormsong::sim::{GameState, TickInput, advance};

const FPS: f32 = 60.0;
const SOAK_FRAMES: u64 = 3600;

fn main() {
    env_logger::init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(0xC0FFEE);
    log::info!("wormsong soak starting, seed {seed}");

    let mut state = GameState::new(seed);
    let mut mixer = Mixer::new(state.waves.clone(), 44_100.0);
    let mut buffer = vec![0.0f32; 512];

    let started = Instant::now();
    let mut prev = TickInput::default();
    for frame in 0..SOAK_FRAMES {
        let input = scripted_input(frame).with_edges(&prev);
        advance(&mut state, &input, (frame + 1) as f32 / FPS);
        prev = input;

        // Pull samples the way an audio callback would
        if frame % 4 == 0 {
            mixer.fill(&mut buffer);
        }
    }

    let elapsed = started.elapsed();
    log::info!(
        "soak done: {} frames in {:.1} ms, level {}, {} entities, {} live parts",
        SOAK_FRAMES,
        elapsed.as_secs_f64() * 1000.0,
        state.current_level,
        state.entities.len(),
        state.live_part_count(),
    );
}

/// Wander the player in a slow square so every wall gets visited.
fn scripted_input(frame: u64) -> TickInput {
    let phase = (frame / 240) % 4;
    TickInput {
        left: phase == 0,
        down: phase == 1,
        right: phase == 2,
        up: phase == 3,
        action: frame % 600 < 60,
        ..Default::default()
    }
}
