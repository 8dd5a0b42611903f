use base64::engine::general_purpose;
use base64::Engine;

/// A 1x1 transparent PNG, base64 encoded without a data URI header.
pub fn png_fixture_base64() -> &'static str {
    return "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";
}

/// The same PNG as a browser would hand it over from a file input.
pub fn png_fixture_data_uri() -> String {
    return format!("data:image/png;base64,{}", png_fixture_base64());
}

pub fn png_fixture_bytes() -> Vec<u8> {
    return general_purpose::STANDARD
        .decode(png_fixture_base64())
        .unwrap();
}

/// Samples `[0, 16384, -16384, 32767, -32768]` as signed 16-bit little-endian
/// PCM.
pub fn pcm_fixture_bytes() -> Vec<u8> {
    return [0i16, 16384, -16384, 32767, -32768]
        .iter()
        .flat_map(|sample| return sample.to_le_bytes())
        .collect();
}

pub fn pcm_fixture_base64() -> String {
    return general_purpose::STANDARD.encode(pcm_fixture_bytes());
}

pub fn story_fixture() -> &'static str {
    return r#"
The lighthouse had not turned its lamp in forty years, yet every night the
fishermen swore they saw it blink twice before the fog rolled in. Salt crusted
the iron railings, and the stairwell smelled of kelp and candle smoke.
"#
    .trim();
}
