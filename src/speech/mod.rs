pub mod recorder;
pub mod transcribe;

use anyhow::{Result, anyhow};
use log::info;
use tts::Tts;

pub const MIN_WPM: f32 = 50.0;
pub const MAX_WPM: f32 = 300.0;

/// Thin wrapper around the platform speech engine. One engine is picked at
/// startup; speaking again interrupts whatever is currently playing.
pub struct SpeechSynth {
    tts: Tts,
}

impl SpeechSynth {
    pub fn new() -> Result<Self> {
        let tts = Tts::default().map_err(|err| anyhow!("speech engine init failed: {err}"))?;
        info!("speech synthesis ready");
        Ok(Self { tts })
    }

    pub fn speak(&mut self, text: &str, wpm: f32) -> Result<()> {
        let rate = self.scaled_rate(wpm);
        self.tts
            .set_rate(rate)
            .map_err(|err| anyhow!("failed to set speech rate: {err}"))?;
        self.tts
            .speak(text, true)
            .map_err(|err| anyhow!("speech failed: {err}"))?;
        Ok(())
    }

    pub fn stop(&mut self) -> Result<()> {
        self.tts
            .stop()
            .map_err(|err| anyhow!("failed to stop speech: {err}"))?;
        Ok(())
    }

    pub fn is_speaking(&self) -> bool {
        self.tts.is_speaking().unwrap_or(false)
    }

    /// Maps words-per-minute onto the engine's own rate scale.
    fn scaled_rate(&self, wpm: f32) -> f32 {
        let t = ((wpm - MIN_WPM) / (MAX_WPM - MIN_WPM)).clamp(0.0, 1.0);
        let min = self.tts.min_rate();
        let max = self.tts.max_rate();
        min + t * (max - min)
    }
}
