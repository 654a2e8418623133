//! # Tone Engine
//!
//! Offline sine synthesizer for the ambient drone and single practice tones.
//! The engine is an ordinary owned value: whoever needs sound holds it (or a
//! handle to it) and pulls samples with [`ToneEngine::render`]. Nothing here
//! touches an audio device.
//!
//! ## Voices
//! - **Drone**: five sines on the synodic Moon tone at harmonic ratios,
//!   faded in and out over three seconds
//! - **Tone**: one sine at a requested frequency, half-second fades, released
//!   automatically after eight seconds
//!
//! All gains ramp linearly per sample, so starting, stopping and volume
//! changes never click.

use crate::profiles::MOON_TONE_HZ;
use serde::Serialize;
use std::f64::consts::TAU;
use tracing::debug;

/// Drone partials as `(frequency ratio, gain)`.
const DRONE_HARMONICS: [(f64, f32); 5] = [
    (1.0, 0.25),
    (2.0, 0.12),
    (3.0, 0.06),
    (0.5, 0.15),
    (1.5, 0.04),
];

pub const DRONE_FADE_SECS: f64 = 3.0;
pub const TONE_FADE_SECS: f64 = 0.5;
pub const TONE_PLAY_SECS: f64 = 8.0;
/// Crossfade used when a new tone replaces a playing one.
const TONE_CROSSFADE_SECS: f64 = 0.3;
const VOLUME_RAMP_SECS: f64 = 0.05;
const TONE_GAIN: f32 = 0.4;

pub const DEFAULT_VOLUME: f32 = 0.3;
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Snapshot of what the engine is doing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EngineState {
    pub is_drone_active: bool,
    pub active_tone_hz: Option<f64>,
    pub volume: f32,
}

/// Linear gain ramp advanced one sample at a time.
#[derive(Debug, Clone, Copy)]
struct Ramp {
    level: f32,
    target: f32,
    step: f32,
}

impl Ramp {
    fn fixed(level: f32) -> Self {
        Self {
            level,
            target: level,
            step: 0.0,
        }
    }

    fn retarget(&mut self, target: f32, samples: u64) {
        self.target = target;
        self.step = if samples == 0 {
            f32::INFINITY
        } else {
            (target - self.level).abs() / samples as f32
        };
    }

    fn next(&mut self) -> f32 {
        if self.level < self.target {
            self.level = (self.level + self.step).min(self.target);
        } else if self.level > self.target {
            self.level = (self.level - self.step).max(self.target);
        }
        self.level
    }

    fn is_silent(&self) -> bool {
        self.level == 0.0 && self.target == 0.0
    }
}

#[derive(Debug, Clone)]
struct Voice {
    hz: f64,
    /// Oscillator position in cycles, kept in [0, 1)
    cycle: f64,
    gain: Ramp,
}

impl Voice {
    fn fade_in(hz: f64, gain: f32, samples: u64) -> Self {
        let mut ramp = Ramp::fixed(0.0);
        ramp.retarget(gain, samples);
        Self {
            hz,
            cycle: 0.0,
            gain: ramp,
        }
    }

    fn next(&mut self, sample_rate: f64) -> f32 {
        let value = (self.cycle * TAU).sin() as f32 * self.gain.next();
        self.cycle = (self.cycle + self.hz / sample_rate).fract();
        value
    }
}

pub struct ToneEngine {
    sample_rate: u32,
    volume: f32,
    master: Ramp,
    drone: Vec<Voice>,
    tone: Option<Voice>,
    /// Samples left before the tone releases itself
    tone_remaining: u64,
    /// Voices fading out after a stop, dropped once silent
    releasing: Vec<Voice>,
}

impl ToneEngine {
    pub fn new(sample_rate: u32) -> Self {
        Self::with_volume(sample_rate, DEFAULT_VOLUME)
    }

    pub fn with_volume(sample_rate: u32, volume: f32) -> Self {
        let volume = clamp_volume(volume).unwrap_or(DEFAULT_VOLUME);
        Self {
            sample_rate: sample_rate.max(1),
            volume,
            master: Ramp::fixed(volume),
            drone: Vec::new(),
            tone: None,
            tone_remaining: 0,
            releasing: Vec::new(),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn samples(&self, secs: f64) -> u64 {
        (secs * self.sample_rate as f64).round() as u64
    }

    pub fn state(&self) -> EngineState {
        EngineState {
            is_drone_active: !self.drone.is_empty(),
            active_tone_hz: self.tone.as_ref().map(|voice| voice.hz),
            volume: self.volume,
        }
    }

    /// Fade in the drone. Does nothing if it is already running.
    pub fn start_drone(&mut self) {
        if !self.drone.is_empty() {
            return;
        }
        let fade = self.samples(DRONE_FADE_SECS);
        self.drone = DRONE_HARMONICS
            .iter()
            .map(|&(ratio, gain)| Voice::fade_in(MOON_TONE_HZ * ratio, gain, fade))
            .collect();
        debug!("Drone started on {} Hz", MOON_TONE_HZ);
    }

    /// Fade out the drone from wherever its envelope currently is.
    pub fn stop_drone(&mut self) {
        if self.drone.is_empty() {
            return;
        }
        let fade = self.samples(DRONE_FADE_SECS);
        for mut voice in self.drone.drain(..) {
            voice.gain.retarget(0.0, fade);
            self.releasing.push(voice);
        }
        debug!("Drone stopping");
    }

    /// Start a tone at `hz`, crossfading out any tone already playing.
    ///
    /// Non-finite or non-positive frequencies are ignored.
    pub fn play_tone(&mut self, hz: f64) {
        if !hz.is_finite() || hz <= 0.0 {
            debug!("Ignoring tone request at {} Hz", hz);
            return;
        }
        self.release_tone(TONE_CROSSFADE_SECS);
        self.tone = Some(Voice::fade_in(hz, TONE_GAIN, self.samples(TONE_FADE_SECS)));
        self.tone_remaining = self.samples(TONE_PLAY_SECS);
        debug!("Tone started at {} Hz", hz);
    }

    pub fn stop_tone(&mut self) {
        self.release_tone(TONE_FADE_SECS);
    }

    fn release_tone(&mut self, fade_secs: f64) {
        if let Some(mut voice) = self.tone.take() {
            voice.gain.retarget(0.0, self.samples(fade_secs));
            self.releasing.push(voice);
        }
        self.tone_remaining = 0;
    }

    /// Set the master volume, clamped to [0, 1]. NaN is ignored.
    pub fn set_volume(&mut self, volume: f32) {
        if let Some(volume) = clamp_volume(volume) {
            self.volume = volume;
            self.master.retarget(volume, self.samples(VOLUME_RAMP_SECS));
        }
    }

    /// Fill `out` with the next mono samples.
    pub fn render(&mut self, out: &mut [f32]) {
        let rate = self.sample_rate as f64;
        for sample in out.iter_mut() {
            if self.tone.is_some() {
                if self.tone_remaining == 0 {
                    debug!("Tone finished");
                    self.release_tone(TONE_FADE_SECS);
                } else {
                    self.tone_remaining -= 1;
                }
            }

            let mut mix = 0.0;
            for voice in self
                .drone
                .iter_mut()
                .chain(self.tone.iter_mut())
                .chain(self.releasing.iter_mut())
            {
                mix += voice.next(rate);
            }
            *sample = mix * self.master.next();
        }
        self.releasing.retain(|voice| !voice.gain.is_silent());
    }
}

impl Default for ToneEngine {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_RATE)
    }
}

fn clamp_volume(volume: f32) -> Option<f32> {
    (!volume.is_nan()).then(|| volume.clamp(0.0, 1.0))
}
