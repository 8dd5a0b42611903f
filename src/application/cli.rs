#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;

use std::io;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::builder::PossibleValuesParser;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::ArgGroup;
use clap::ArgMatches;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use strum::VariantNames;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use yansi::Paint;

use super::repl::help_text;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::wrap_lines;
use crate::domain::models::BackendBox;
use crate::domain::models::BackendName;
use crate::domain::models::ImagePayload;
use crate::domain::services::SpeechSynthesizer;
use crate::domain::services::StorySession;
use crate::infrastructure::audio::WavExporter;
use crate::infrastructure::backends::BackendManager;

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
    std::process::exit(0);
}

pub fn load_backend() -> Result<BackendBox> {
    let backend_name = Config::get(ConfigKey::Backend);
    let backend = match BackendName::parse(backend_name.to_string()) {
        Some(backend) => backend,
        None => bail!(format!("No backend implemented for {backend_name}")),
    };

    return BackendManager::get(backend);
}

async fn load_image(matches: &ArgMatches) -> Result<ImagePayload> {
    let image_path = Config::get(ConfigKey::Image);
    let media_type = matches.get_one::<String>(&ConfigKey::MediaType.to_string());
    let image = ImagePayload::load(&image_path, media_type.map(|e| return e.as_str())).await?;

    if !image.is_supported() {
        tracing::warn!(media_type = image.media_type(), "Unsupported image type");
        eprintln!(
            "{}",
            Paint::yellow(format!(
                "{} may not be supported, trying anyway.",
                image.media_type()
            ))
        );
    }

    return Ok(image);
}

async fn write_story(matches: &ArgMatches) -> Result<()> {
    let backend = load_backend()?;
    let image = load_image(matches).await?;

    let mut session = StorySession::default();
    session.select_image(image);
    let story = session.generate_story(backend.as_ref()).await?;
    println!("{}", wrap_lines(story, 80).join("\n"));

    return Ok(());
}

async fn read_story(matches: &ArgMatches) -> Result<()> {
    let backend = load_backend()?;
    let output = match matches.get_one::<String>("output") {
        Some(output) => output.to_string(),
        None => "story.wav".to_string(),
    };

    let buffer = if let Some(text) = matches.get_one::<String>("text") {
        SpeechSynthesizer::default()
            .synthesize(backend.as_ref(), text)
            .await?
    } else {
        let mut session = StorySession::default();
        session.select_image(load_image(matches).await?);
        let story = session.generate_story(backend.as_ref()).await?;
        println!("{}\n", wrap_lines(story, 80).join("\n"));
        session.read_aloud(backend.as_ref()).await?.cloned()
    };

    match buffer {
        Some(buffer) => {
            WavExporter::write(path::Path::new(&output), &buffer)?;
            println!(
                "Saved {:.1}s of audio to {output}",
                buffer.duration().as_secs_f64()
            );
        }
        None => {
            eprintln!(
                "{}",
                Paint::yellow("No audio came back for this story. Try again in a moment.")
            );
        }
    }

    return Ok(());
}

async fn print_models() -> Result<()> {
    let backend = load_backend()?;
    let models = backend.list_models().await?;

    if models.is_empty() {
        println!("There are no models available.");
    } else {
        println!("{}", models.join("\n"));
    }

    return Ok(());
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if let Some(parent) = config_file_path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    let mut file = fs::File::create(config_file_path.clone()).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    println!("Created default config file at {config_file_path_str}");
    return Ok(());
}

fn arg_image(required: bool) -> Arg {
    return Arg::new(ConfigKey::Image.to_string())
        .short('i')
        .long(ConfigKey::Image.to_string())
        .num_args(1)
        .required(required)
        .help("Path to the image to write a story about.");
}

fn arg_media_type() -> Arg {
    return Arg::new(ConfigKey::MediaType.to_string())
        .long(ConfigKey::MediaType.to_string())
        .num_args(1)
        .help("Media type of the image. Inferred from the file extension when not set.");
}

fn subcommand_story() -> Command {
    return Command::new("story")
        .about("Write the opening of a story inspired by an image.")
        .arg(arg_image(true))
        .arg(arg_media_type());
}

fn subcommand_read() -> Command {
    return Command::new("read")
        .about("Read a story aloud, saving the speech as a WAV file.")
        .arg(arg_image(false))
        .arg(arg_media_type())
        .arg(
            Arg::new("text")
                .short('t')
                .long("text")
                .num_args(1)
                .help("Story text to read instead of writing one from an image."),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .num_args(1)
                .help("Where to save the audio. [default: story.wav]"),
        )
        .group(
            ArgGroup::new("read-source")
                .args([ConfigKey::Image.to_string(), "text".to_string()])
                .required(true),
        );
}

fn subcommand_chat() -> Command {
    return Command::new("chat")
        .about("Start an interactive session: write a story from an image, read it aloud, and talk it through with your co-author.")
        .arg(arg_image(false))
        .arg(arg_media_type());
}

fn subcommand_completions() -> Command {
    return Command::new("completions")
        .about("Generates shell completions.")
        .arg(
            clap::Arg::new("shell")
                .short('s')
                .long("shell")
                .help("Which shell to generate completions for.")
                .action(ArgAction::Set)
                .value_parser(value_parser!(Shell))
                .required(true),
        );
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file options.")
        .subcommand(
            Command::new("create").about("Saves the default config file to the configuration file path. This command will fail if the file exists already.")
        )
        .subcommand(
            Command::new("default").about("Outputs the default configuration file to stdout.")
        )
        .subcommand(
            Command::new("path").about("Returns the default path for the configuration file.")
        );
}

pub fn build() -> Command {
    let commands_text = help_text()
        .split('\n')
        .map(|line| {
            if line.starts_with('-') {
                return format!("  {line}");
            }
            if line.starts_with("COMMANDS:") {
                return Paint::new(format!("CHAT {line}"))
                    .underline()
                    .bold()
                    .to_string();
            }
            return line.to_string();
        })
        .collect::<Vec<String>>()
        .join("\n");

    let about = format!(
        "{}\n\nVersion: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
    );

    return Command::new("storyloom")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .after_help(commands_text)
        .arg_required_else_help(true)
        .subcommand(subcommand_story())
        .subcommand(subcommand_read())
        .subcommand(subcommand_chat())
        .subcommand(Command::new("models").about("Lists the models the backend can generate content with."))
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .arg(
            Arg::new(ConfigKey::ConfigFile.to_string())
                .short('c')
                .long(ConfigKey::ConfigFile.to_string())
                .env("STORYLOOM_CONFIG_FILE")
                .num_args(1)
                .help(format!("Path to configuration file [default: {}]", Config::default(ConfigKey::ConfigFile)))
                .global(true)
        )
        .arg(
            Arg::new(ConfigKey::Backend.to_string())
                .short('b')
                .long(ConfigKey::Backend.to_string())
                .env("STORYLOOM_BACKEND")
                .num_args(1)
                .help(format!("The backend hosting the generative models. [default: {}]", Config::default(ConfigKey::Backend)))
                .value_parser(PossibleValuesParser::new(BackendName::VARIANTS))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::ApiKey.to_string())
                .long(ConfigKey::ApiKey.to_string())
                .env("STORYLOOM_API_KEY")
                .hide_env_values(true)
                .num_args(1)
                .help("API key for the backend. Falls back to GEMINI_API_KEY.")
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::ApiURL.to_string())
                .long(ConfigKey::ApiURL.to_string())
                .env("STORYLOOM_API_URL")
                .num_args(1)
                .help(format!("Base URL of the Gemini API. Can be swapped to a compatible proxy. [default: {}]", Config::default(ConfigKey::ApiURL)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::BackendHealthCheckTimeout.to_string())
                .long(ConfigKey::BackendHealthCheckTimeout.to_string())
                .env("STORYLOOM_BACKEND_HEALTH_CHECK_TIMEOUT")
                .num_args(1)
                .help(format!("Time to wait in milliseconds before timing out when doing a healthcheck for a backend. [default: {}]", Config::default(ConfigKey::BackendHealthCheckTimeout)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::StoryModel.to_string())
                .long(ConfigKey::StoryModel.to_string())
                .env("STORYLOOM_STORY_MODEL")
                .num_args(1)
                .help(format!("Model used to write a story from an image. [default: {}]", Config::default(ConfigKey::StoryModel)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::ChatModel.to_string())
                .long(ConfigKey::ChatModel.to_string())
                .env("STORYLOOM_CHAT_MODEL")
                .num_args(1)
                .help(format!("Model used by the co-author chat. [default: {}]", Config::default(ConfigKey::ChatModel)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::SpeechModel.to_string())
                .long(ConfigKey::SpeechModel.to_string())
                .env("STORYLOOM_SPEECH_MODEL")
                .num_args(1)
                .help(format!("Model used to read stories aloud. [default: {}]", Config::default(ConfigKey::SpeechModel)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::Voice.to_string())
                .long(ConfigKey::Voice.to_string())
                .env("STORYLOOM_VOICE")
                .num_args(1)
                .help(format!("Prebuilt voice used when reading stories aloud. [default: {}]", Config::default(ConfigKey::Voice)))
                .global(true),
        );
}

/// Parses arguments and runs one-shot commands. Returns true when the
/// interactive chat should start.
pub async fn parse() -> Result<bool> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("story", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            write_story(subcmd_matches).await?;
            return Ok(false);
        }
        Some(("read", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            read_story(subcmd_matches).await?;
            return Ok(false);
        }
        Some(("chat", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
        }
        Some(("models", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            print_models().await?;
            return Ok(false);
        }
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
            return Ok(false);
        }
        Some(("config", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("create", _)) => {
                create_config_file().await?;
                return Ok(false);
            }
            Some(("default", _)) => {
                println!("{}", Config::serialize_default(build()));
                return Ok(false);
            }
            Some(("path", _)) => {
                println!("{}", Config::default(ConfigKey::ConfigFile));
                return Ok(false);
            }
            _ => {
                subcommand_config().print_long_help()?;
                return Ok(false);
            }
        },
        _ => {
            build().print_long_help()?;
            return Ok(false);
        }
    }

    return Ok(true);
}
