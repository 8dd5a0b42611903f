use anyhow::Result;
use hound::WavReader;
use test_utils::pcm_fixture_bytes;

use super::WavExporter;
use crate::domain::models::AudioBuffer;
use crate::domain::models::SPEECH_CHANNELS;
use crate::domain::models::SPEECH_SAMPLE_RATE;

#[test]
fn it_writes_16_bit_wav_files() -> Result<()> {
    let buffer =
        AudioBuffer::from_pcm16le(&pcm_fixture_bytes(), SPEECH_SAMPLE_RATE, SPEECH_CHANNELS)?;
    let file_path = std::env::temp_dir()
        .join("storyloom-wav-test")
        .join("story.wav");

    WavExporter::write(&file_path, &buffer)?;

    let mut reader = WavReader::open(&file_path)?;
    let spec = reader.spec();
    assert_eq!(spec.sample_rate, 24_000);
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.bits_per_sample, 16);

    let samples = reader.samples::<i16>().collect::<Result<Vec<i16>, _>>()?;
    assert_eq!(samples, vec![0, 16384, -16384, 32767, -32768]);

    return Ok(());
}
