#[cfg(test)]
#[path = "audio_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::bail;
use anyhow::Result;

/// Sample rate of the PCM the speech endpoint returns.
pub const SPEECH_SAMPLE_RATE: u32 = 24_000;
pub const SPEECH_CHANNELS: u16 = 1;

/// Decoded linear PCM, interleaved when there is more than one channel.
/// Samples are normalised to `[-1.0, 1.0)`.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioBuffer {
    sample_rate: u32,
    channels: u16,
    samples: Vec<f32>,
}

impl AudioBuffer {
    /// Decodes signed 16-bit little-endian PCM. Trailing samples that do not
    /// fill a whole frame are dropped.
    pub fn from_pcm16le(bytes: &[u8], sample_rate: u32, channels: u16) -> Result<AudioBuffer> {
        if channels == 0 {
            bail!("Audio must have at least one channel");
        }
        if sample_rate == 0 {
            bail!("Audio sample rate must be greater than zero");
        }
        if bytes.len() % 2 != 0 {
            bail!(format!(
                "Audio payload of {} bytes is not 16-bit aligned",
                bytes.len()
            ));
        }

        let frames = bytes.len() / 2 / channels as usize;
        let samples = bytes
            .chunks_exact(2)
            .take(frames * channels as usize)
            .map(|pair| {
                let sample = i16::from_le_bytes([pair[0], pair[1]]);
                return sample as f32 / 32768.0;
            })
            .collect::<Vec<f32>>();

        return Ok(AudioBuffer {
            sample_rate,
            channels,
            samples,
        });
    }

    pub fn sample_rate(&self) -> u32 {
        return self.sample_rate;
    }

    pub fn channels(&self) -> u16 {
        return self.channels;
    }

    pub fn samples(&self) -> &[f32] {
        return &self.samples;
    }

    pub fn frames(&self) -> usize {
        return self.samples.len() / self.channels as usize;
    }

    pub fn duration(&self) -> Duration {
        return Duration::from_secs_f64(self.frames() as f64 / self.sample_rate as f64);
    }

    /// Samples converted back to signed 16-bit integers.
    pub fn to_pcm16(&self) -> Vec<i16> {
        return self
            .samples()
            .iter()
            .map(|sample| return (sample * 32768.0).round().clamp(-32768.0, 32767.0) as i16)
            .collect();
    }
}
