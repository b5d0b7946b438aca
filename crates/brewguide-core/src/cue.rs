//! Audible cues.
//!
//! The engine only knows the [`CueSink`] seam: `play_tick`, `play_chime` and
//! `unlock`. [`CuePlayer`] is the real implementation: it synthesizes the
//! tone into PCM samples and hands them to an [`AudioOutput`] that it creates
//! lazily from an [`AudioBackend`] and keeps for its whole lifetime. The
//! output is resumed before every cue if the platform suspended it.
//!
//! Audio problems are logged and swallowed. A broken speaker must never stop
//! the countdown.

use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;
use std::fmt;

use crate::error::CueError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cue {
    /// Short click during the last seconds of a step.
    Tick,
    /// Bell at step boundaries and on start.
    Chime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    Sine,
    Square,
}

/// Parameters of a single decaying tone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneSpec {
    pub frequency_hz: f32,
    pub waveform: Waveform,
    pub duration_ms: u32,
    /// Gain at onset.
    pub peak_gain: f32,
    /// Gain reached at the end of the exponential ramp.
    pub floor_gain: f32,
}

impl Cue {
    pub fn tone(self) -> ToneSpec {
        match self {
            Cue::Tick => ToneSpec {
                frequency_hz: 1200.0,
                waveform: Waveform::Square,
                duration_ms: 80,
                peak_gain: 0.15,
                floor_gain: 0.001,
            },
            Cue::Chime => ToneSpec {
                frequency_hz: 880.0,
                waveform: Waveform::Sine,
                duration_ms: 800,
                peak_gain: 0.3,
                floor_gain: 0.01,
            },
        }
    }
}

/// Render a tone as mono `f32` samples scaled by `volume` (0.0 ..= 1.0).
pub fn synthesize(tone: &ToneSpec, sample_rate: u32, volume: f32) -> Result<Vec<f32>, CueError> {
    if sample_rate == 0 {
        return Err(CueError::InvalidTone("sample rate is zero".into()));
    }
    if tone.frequency_hz.is_nan() || tone.frequency_hz <= 0.0 || tone.duration_ms == 0 {
        return Err(CueError::InvalidTone(format!(
            "{} Hz for {} ms",
            tone.frequency_hz, tone.duration_ms
        )));
    }
    if tone.peak_gain.is_nan()
        || tone.floor_gain.is_nan()
        || tone.peak_gain <= 0.0
        || tone.floor_gain <= 0.0
    {
        return Err(CueError::InvalidTone("gains must be positive".into()));
    }

    let volume = volume.clamp(0.0, 1.0);
    let len = (u64::from(sample_rate) * u64::from(tone.duration_ms) / 1000) as usize;
    let duration_s = tone.duration_ms as f32 / 1000.0;
    let ratio = tone.floor_gain / tone.peak_gain;

    Ok((0..len)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            let phase = (TAU * tone.frequency_hz * t).sin();
            let osc = match tone.waveform {
                Waveform::Sine => phase,
                Waveform::Square => {
                    if phase >= 0.0 {
                        1.0
                    } else {
                        -1.0
                    }
                }
            };
            let envelope = tone.peak_gain * ratio.powf(t / duration_s);
            osc * envelope * volume
        })
        .collect())
}

/// Engine-facing cue seam. Implementations must not fail.
pub trait CueSink {
    fn play_tick(&mut self);
    fn play_chime(&mut self);
    /// Called on the very first start of a brew, inside the user gesture.
    fn unlock(&mut self) {}

    fn play(&mut self, cue: Cue) {
        match cue {
            Cue::Tick => self.play_tick(),
            Cue::Chime => self.play_chime(),
        }
    }
}

/// Discards every cue.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentCues;

impl CueSink for SilentCues {
    fn play_tick(&mut self) {}
    fn play_chime(&mut self) {}
}

/// Remembers cues in order. Used by the simulator and tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingCues {
    pub played: Vec<Cue>,
    pub unlocks: usize,
}

impl RecordingCues {
    pub fn take(&mut self) -> Vec<Cue> {
        std::mem::take(&mut self.played)
    }
}

impl CueSink for RecordingCues {
    fn play_tick(&mut self) {
        self.played.push(Cue::Tick);
    }
    fn play_chime(&mut self) {
        self.played.push(Cue::Chime);
    }
    fn unlock(&mut self) {
        self.unlocks += 1;
    }
}

/// A live audio output (device stream, terminal bell, ...).
pub trait AudioOutput {
    fn is_suspended(&self) -> bool;
    fn resume(&mut self) -> Result<(), CueError>;
    fn play(&mut self, samples: &[f32], sample_rate: u32) -> Result<(), CueError>;
}

/// Factory for the output. Called at most once per successful open.
pub trait AudioBackend {
    type Output: AudioOutput;
    fn open(&mut self) -> Result<Self::Output, CueError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CueSettings {
    pub enabled: bool,
    /// 0.0 ..= 1.0
    pub volume: f32,
    pub sample_rate: u32,
}

impl Default for CueSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: 0.5,
            sample_rate: 44_100,
        }
    }
}

/// Synthesizing cue sink over a lazily opened output.
pub struct CuePlayer<B: AudioBackend> {
    backend: B,
    output: Option<B::Output>,
    settings: CueSettings,
}

impl<B: AudioBackend> CuePlayer<B> {
    pub fn new(backend: B, settings: CueSettings) -> Self {
        Self {
            backend,
            output: None,
            settings,
        }
    }

    pub fn settings(&self) -> CueSettings {
        self.settings
    }

    pub fn is_open(&self) -> bool {
        self.output.is_some()
    }

    /// Open the output on first use and resume it if suspended.
    fn ready_output(&mut self) -> Result<&mut B::Output, CueError> {
        if self.output.is_none() {
            self.output = Some(self.backend.open()?);
            tracing::debug!("audio output opened");
        }
        let output = self
            .output
            .as_mut()
            .ok_or_else(|| CueError::Unavailable("output was not retained".into()))?;
        if output.is_suspended() {
            output
                .resume()
                .map_err(|e| CueError::ResumeFailed(e.to_string()))?;
        }
        Ok(output)
    }

    fn emit(&mut self, cue: Cue) -> Result<(), CueError> {
        if !self.settings.enabled {
            return Ok(());
        }
        let samples = synthesize(&cue.tone(), self.settings.sample_rate, self.settings.volume)?;
        let sample_rate = self.settings.sample_rate;
        self.ready_output()?.play(&samples, sample_rate)
    }

    fn emit_logged(&mut self, cue: Cue) {
        if let Err(e) = self.emit(cue) {
            tracing::warn!(?cue, error = %e, "audio cue failed");
        }
    }
}

impl<B: AudioBackend> fmt::Debug for CuePlayer<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CuePlayer")
            .field("open", &self.output.is_some())
            .field("settings", &self.settings)
            .finish()
    }
}

impl<B: AudioBackend> CueSink for CuePlayer<B> {
    fn play_tick(&mut self) {
        self.emit_logged(Cue::Tick);
    }

    fn play_chime(&mut self) {
        self.emit_logged(Cue::Chime);
    }

    fn unlock(&mut self) {
        if !self.settings.enabled {
            return;
        }
        if let Err(e) = self.ready_output() {
            tracing::warn!(error = %e, "could not unlock audio output");
        }
    }
}
