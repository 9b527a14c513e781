//! Oscillator parameter derivation
//!
//! Every live part carries one sine voice and one saw voice whose
//! frequency and amplitude follow its kinematics, all scaled by a note
//! value that steps on a slow cycle. The banks are rewritten under the
//! mutex shared with the audio mixer so the reader never sees a torn
//! bank/count pair.

use super::state::{GameState, Voice};
use crate::consts::MAX_VOICES;

/// Note values the sequencer cycles through
const NOTE_CYCLE: [f32; 3] = [40.0, 80.0, 60.0];

/// Step the note when its window has elapsed.
pub fn advance_note(state: &mut GameState) {
    if state.time >= state.next_note_t {
        let at = NOTE_CYCLE
            .iter()
            .position(|&n| n == state.note)
            .unwrap_or(0);
        state.note = NOTE_CYCLE[(at + 1) % NOTE_CYCLE.len()];
        state.next_note_t = state.time + state.tuning.note_step_secs;
        log::trace!("note stepped to {}", state.note);
    }
}

/// Rewrite both oscillator banks from the live parts, in traversal order.
pub fn derive_waves(state: &GameState) {
    let Ok(mut banks) = state.waves.lock() else {
        return;
    };
    banks.sine.clear();
    banks.saw.clear();

    let note = state.note;
    for entity in state.entities.iter().filter(|e| !e.disposed) {
        for part in entity.parts.iter().filter(|p| !p.disposed) {
            assert!(banks.sine.len() < MAX_VOICES, "oscillator bank overflow");

            let speed = part.v.length();
            let amp = (speed.sqrt() / 400.0).clamp(0.0, 0.25);
            banks.sine.push(Voice {
                freq: (speed * 10.0 / part.size).round() * note,
                amp,
            });
            banks.saw.push(Voice {
                freq: (speed * 100.0 / part.mass).round() * 4.0 * note,
                amp,
            });
        }
    }
}
