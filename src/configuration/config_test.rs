use anyhow::Result;
use once_cell::sync::Lazy;
use tokio::sync::Mutex;

use super::Config;
use super::ConfigKey;
use crate::application::cli;

// `Config` is process wide, so tests that load it take turns.
static LOAD_LOCK: Lazy<Mutex<()>> = Lazy::new(|| return Mutex::new(()));

#[test]
fn it_serializes_to_valid_toml() {
    let res = Config::serialize_default(cli::build());
    let toml_res = res.parse::<toml_edit::Document>();
    assert!(toml_res.is_ok());

    assert!(res.contains("story-model = \"gemini-2.5-flash\""));
    assert!(res.contains("speech-model = \"gemini-2.5-flash-preview-tts\""));
    assert!(res.contains("voice = \"Kore\""));
    assert!(res.contains("backend-health-check-timeout = 1000"));
    assert!(res.contains("# api-key = \"\""));
    assert!(res.contains("[possible values: gemini]"));
    assert!(!res.contains("config-file"));
    assert!(!res.contains("media-type"));
}

#[test]
fn it_keeps_runtime_keys_out_of_the_config_file() {
    assert!(ConfigKey::Image.is_runtime_only());
    assert!(ConfigKey::ConfigFile.is_runtime_only());
    assert!(!ConfigKey::Voice.is_runtime_only());
    assert_eq!(ConfigKey::ApiURL.to_string(), "api-url");
    assert_eq!(
        ConfigKey::BackendHealthCheckTimeout.to_string(),
        "backend-health-check-timeout"
    );
}

#[tokio::test]
async fn it_loads_config_from_file() -> Result<()> {
    let _lock = LOAD_LOCK.lock().await;
    let matches =
        cli::build().try_get_matches_from(vec!["storyloom", "-c", "./config.example.toml"])?;
    Config::load(cli::build(), vec![&matches]).await?;

    assert_eq!(Config::get(ConfigKey::Voice), "Puck");
    assert_eq!(Config::get(ConfigKey::BackendHealthCheckTimeout), "2000");
    assert_eq!(Config::get(ConfigKey::StoryModel), "gemini-2.5-flash");

    return Ok(());
}

#[tokio::test]
async fn it_prefers_arguments_over_the_config_file() -> Result<()> {
    let _lock = LOAD_LOCK.lock().await;
    let matches = cli::build().try_get_matches_from(vec![
        "storyloom",
        "-c",
        "./config.example.toml",
        "--voice",
        "Charon",
    ])?;
    Config::load(cli::build(), vec![&matches]).await?;

    assert_eq!(Config::get(ConfigKey::Voice), "Charon");

    return Ok(());
}

#[tokio::test]
async fn it_fails_to_loads_config_from_file() -> Result<()> {
    let _lock = LOAD_LOCK.lock().await;
    let matches =
        cli::build().try_get_matches_from(vec!["storyloom", "-c", "./test/bad-config.toml"])?;
    let res = Config::load(cli::build(), vec![&matches]).await;
    assert!(res.is_err());

    return Ok(());
}
