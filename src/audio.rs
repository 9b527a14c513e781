//! Oscillator-bank mixer
//!
//! The host's audio callback owns a `Mixer` and calls `fill` from its own
//! thread. The banks are locked for the duration of the read, pairing
//! with the simulation's locked rewrite, so a torn bank/count pair is
//! never observed. Synthesis is a phase accumulator per voice: a sine and
//! a sawtooth, summed and clamped.

use std::f32::consts::TAU;

use crate::consts::MAX_VOICES;
use crate::sim::SharedWaves;

/// Mixes the shared oscillator banks into a single channel
pub struct Mixer {
    waves: SharedWaves,
    sine_phases: [f32; MAX_VOICES],
    saw_phases: [f32; MAX_VOICES],
    sample_rate: f32,
    master_volume: f32,
    muted: bool,
}

impl Mixer {
    pub fn new(waves: SharedWaves, sample_rate: f32) -> Self {
        Self {
            waves,
            sine_phases: [0.0; MAX_VOICES],
            saw_phases: [0.0; MAX_VOICES],
            sample_rate,
            master_volume: 0.8,
            muted: false,
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn effective_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.master_volume }
    }

    /// Synthesize one buffer of mono samples in [-1, 1].
    pub fn fill(&mut self, out: &mut [f32]) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            out.fill(0.0);
            return;
        }

        let Ok(banks) = self.waves.lock() else {
            out.fill(0.0);
            return;
        };

        for sample in out.iter_mut() {
            let mut acc = 0.0;

            for (i, voice) in banks.sine.iter().enumerate() {
                acc += (self.sine_phases[i] * TAU).sin() * voice.amp;
                self.sine_phases[i] =
                    (self.sine_phases[i] + voice.freq / self.sample_rate).fract();
            }
            for (i, voice) in banks.saw.iter().enumerate() {
                acc += (self.saw_phases[i] * 2.0 - 1.0) * voice.amp;
                self.saw_phases[i] =
                    (self.saw_phases[i] + voice.freq / self.sample_rate).fract();
            }

            *sample = acc.clamp(-1.0, 1.0) * vol;
        }
    }
}
