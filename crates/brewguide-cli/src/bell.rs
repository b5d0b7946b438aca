//! Terminal bell output for cues.
//!
//! A terminal cannot render the synthesized waveform, so every cue becomes a
//! BEL character. Chimes ring twice to tell them apart from ticks.

use std::io::{IsTerminal, Write};

use brewguide_core::cue::{AudioBackend, AudioOutput};
use brewguide_core::CueError;

/// Samples longer than this are treated as a chime.
const CHIME_MIN_SECS: f32 = 0.5;

#[derive(Debug, Default)]
pub struct TerminalBell;

#[derive(Debug)]
pub struct BellOutput {
    attached: bool,
}

impl AudioBackend for TerminalBell {
    type Output = BellOutput;

    fn open(&mut self) -> Result<BellOutput, CueError> {
        Ok(BellOutput {
            attached: std::io::stderr().is_terminal(),
        })
    }
}

impl AudioOutput for BellOutput {
    fn is_suspended(&self) -> bool {
        false
    }

    fn resume(&mut self) -> Result<(), CueError> {
        Ok(())
    }

    fn play(&mut self, samples: &[f32], sample_rate: u32) -> Result<(), CueError> {
        if !self.attached || sample_rate == 0 {
            return Ok(());
        }
        let secs = samples.len() as f32 / sample_rate as f32;
        let bell: &[u8] = if secs >= CHIME_MIN_SECS { b"\x07\x07" } else { b"\x07" };
        let mut err = std::io::stderr().lock();
        err.write_all(bell)
            .and_then(|_| err.flush())
            .map_err(|e| CueError::PlaybackFailed(e.to_string()))
    }
}
