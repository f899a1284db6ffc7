use std::f32::consts::TAU;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Waveform {
    Sine,
    Square,
    Triangle,
    Sawtooth,
}

/// A single synthesized beep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToneSpec {
    pub frequency_hz: f32,
    pub duration_ms: u32,
    pub waveform: Waveform,
    /// Peak amplitude, 0.0 ..= 1.0.
    pub gain: f32,
}

/// Attack and release ramp length; keeps beeps from clicking.
const RAMP_MS: f32 = 5.0;

impl ToneSpec {
    pub const fn new(frequency_hz: f32, duration_ms: u32, waveform: Waveform, gain: f32) -> Self {
        Self {
            frequency_hz,
            duration_ms,
            waveform,
            gain,
        }
    }

    /// Same tone scaled to a 0..=100 volume setting.
    pub fn with_volume(self, volume: u32) -> Self {
        Self {
            gain: self.gain * (volume.min(100) as f32 / 100.0),
            ..self
        }
    }

    pub fn sample_count(&self, sample_rate: u32) -> usize {
        (u64::from(sample_rate) * u64::from(self.duration_ms) / 1000) as usize
    }

    /// Render mono samples in -1.0 ..= 1.0.
    pub fn synthesize(&self, sample_rate: u32) -> Vec<f32> {
        let count = self.sample_count(sample_rate);
        if count == 0 {
            return Vec::new();
        }
        let rate = sample_rate as f32;
        let ramp = ((RAMP_MS / 1000.0) * rate).max(1.0);

        (0..count)
            .map(|i| {
                let t = i as f32 / rate;
                let phase = (t * self.frequency_hz).fract();
                let raw = match self.waveform {
                    Waveform::Sine => (phase * TAU).sin(),
                    Waveform::Square => {
                        if phase < 0.5 {
                            1.0
                        } else {
                            -1.0
                        }
                    }
                    Waveform::Triangle => 1.0 - 4.0 * (phase - 0.5).abs(),
                    Waveform::Sawtooth => 2.0 * phase - 1.0,
                };
                let from_start = i as f32 / ramp;
                let from_end = (count - 1 - i) as f32 / ramp;
                let envelope = from_start.min(from_end).min(1.0);
                raw * envelope * self.gain.clamp(0.0, 1.0)
            })
            .collect()
    }
}
