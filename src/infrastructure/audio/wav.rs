#[cfg(test)]
#[path = "wav_test.rs"]
mod tests;

use std::path;

use anyhow::Result;
use hound::SampleFormat;
use hound::WavSpec;
use hound::WavWriter;

use crate::domain::models::AudioBuffer;

/// Writes decoded speech to disk as 16-bit PCM WAV. This is how the terminal
/// front end "plays" a story.
pub struct WavExporter {}

impl WavExporter {
    pub fn write(file_path: &path::Path, buffer: &AudioBuffer) -> Result<()> {
        let spec = WavSpec {
            channels: buffer.channels(),
            sample_rate: buffer.sample_rate(),
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };

        if let Some(parent) = file_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut writer = WavWriter::create(file_path, spec)?;
        for sample in buffer.to_pcm16() {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;

        tracing::info!(
            path = %file_path.display(),
            frames = buffer.frames(),
            sample_rate = buffer.sample_rate(),
            "Wrote story audio"
        );

        return Ok(());
    }
}
