#[cfg(test)]
#[path = "repl_test.rs"]
mod tests;

use std::io;
use std::io::Write;
use std::path;

use anyhow::Result;
use tokio::io::AsyncBufRead;
use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;
use yansi::Paint;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::wrap_lines;
use crate::domain::models::Backend;
use crate::domain::models::BackendBox;
use crate::domain::models::ImagePayload;
use crate::domain::models::SlashCommand;
use crate::domain::services::StorySession;
use crate::infrastructure::audio::WavExporter;

const LINE_WIDTH: usize = 80;
const DEFAULT_AUDIO_PATH: &str = "story.wav";

pub fn help_text() -> String {
    let text = r#"
COMMANDS:
- /image (/i) [PATH] - Writes a new story from the image at PATH. The conversation so far is kept.
- /story (/s) - Shows the current story again.
- /read (/r) [PATH?] - Reads the story aloud, saving the audio as a WAV file to PATH (defaults to story.wav). Audio is reused until the story changes.
- /stop - Stops reading aloud.
- /reset - Forgets the image, story, audio and conversation.
- /quit /exit (/q) - Exit Storyloom.
- /help (/h) - Provides this help menu.

Anything else you type is sent to your co-author as a question about the story.
        "#;

    return text.trim().to_string();
}

pub struct Repl<'a, W: Write> {
    backend: &'a dyn Backend,
    session: StorySession,
    out: W,
}

impl<'a, W: Write> Repl<'a, W> {
    pub fn new(backend: &'a dyn Backend, session: StorySession, out: W) -> Repl<'a, W> {
        return Repl {
            backend,
            session,
            out,
        };
    }

    fn print_wrapped(&mut self, text: &str) -> Result<()> {
        for line in wrap_lines(text, LINE_WIDTH) {
            writeln!(self.out, "{line}")?;
        }

        return Ok(());
    }

    fn print_notice(&mut self, text: &str) -> Result<()> {
        writeln!(self.out, "{}", Paint::yellow(text))?;
        return Ok(());
    }

    fn print_error(&mut self, text: &str) -> Result<()> {
        writeln!(self.out, "{}", Paint::red(text))?;
        return Ok(());
    }

    pub fn greet(&mut self) -> Result<()> {
        self.print_notice("Welcome to Storyloom. Type /help to see what you can do.")?;
        return Ok(());
    }

    pub async fn open_image(&mut self, image_path: &str, media_type: Option<&str>) -> Result<()> {
        let image = ImagePayload::load(image_path, media_type).await?;
        if !image.is_supported() {
            self.print_notice(&format!(
                "{} may not be supported, trying anyway.",
                image.media_type()
            ))?;
        }

        self.session.select_image(image);
        let media_type = self.session.state().media_type().unwrap_or_default().to_string();
        self.print_notice(&format!("Reading the image ({media_type})..."))?;

        let story = self.session.generate_story(self.backend).await?.to_string();
        writeln!(self.out)?;
        self.print_wrapped(&story)?;
        writeln!(self.out)?;

        return Ok(());
    }

    async fn read_aloud(&mut self, audio_path: &str) -> Result<()> {
        let buffer = match self.session.read_aloud(self.backend).await? {
            Some(buffer) => buffer,
            None => {
                self.print_error("The story could not be read aloud right now. Try /read again.")?;
                return Ok(());
            }
        };

        WavExporter::write(path::Path::new(audio_path), buffer)?;
        let seconds = buffer.duration().as_secs_f64();
        writeln!(
            self.out,
            "{}",
            Paint::yellow(format!("Reading aloud ({seconds:.1}s), saved to {audio_path}"))
        )?;

        return Ok(());
    }

    async fn ask(&mut self, text: &str) -> Result<()> {
        if self.session.story().is_none() {
            self.print_notice("Pick an image with /image PATH first, then we can talk about its story.")?;
            return Ok(());
        }

        tracing::debug!(
            turns = self.session.transcript().len(),
            "Asking the co-author"
        );
        let reply = self.session.ask(self.backend, text).await?;
        for line in reply.as_string_lines(LINE_WIDTH) {
            writeln!(self.out, "{}", Paint::cyan(line))?;
        }

        return Ok(());
    }

    /// Returns true when the session should end.
    pub async fn handle_line(&mut self, line: &str) -> Result<bool> {
        let text = line.trim();
        if text.is_empty() {
            return Ok(false);
        }

        let cmd = match SlashCommand::parse(text) {
            Some(cmd) => cmd,
            None => {
                self.ask(text).await?;
                return Ok(false);
            }
        };

        if cmd.is_quit() {
            return Ok(true);
        }

        if cmd.is_help() {
            writeln!(self.out, "{}", help_text())?;
        } else if cmd.is_select_image() {
            match cmd.args() {
                Some(image_path) => self.open_image(image_path, None).await?,
                None => self.print_notice("Give /image the path to an image.")?,
            }
        } else if cmd.is_show_story() {
            match self.session.story().map(|story| return story.to_string()) {
                Some(story) => self.print_wrapped(&story)?,
                None => self.print_notice("There is no story yet.")?,
            }
        } else if cmd.is_read_aloud() {
            if self.session.story().is_none() {
                self.print_notice("There is no story to read yet.")?;
            } else {
                let audio_path = cmd.args().unwrap_or(DEFAULT_AUDIO_PATH).to_string();
                self.read_aloud(&audio_path).await?;
            }
        } else if cmd.is_stop_audio() {
            self.session.stop_audio();
            self.print_notice("Stopped reading.")?;
        } else if cmd.is_reset() {
            self.session.reset();
            self.print_notice("Starting over. Pick a new image with /image PATH.")?;
        }

        tracing::debug!(
            phase = %self.session.phase(),
            loading = self.session.is_loading(),
            "Handled command"
        );

        return Ok(false);
    }

    pub async fn run<R: AsyncBufRead + Unpin>(&mut self, input: R) -> Result<()> {
        let mut lines = input.lines();

        loop {
            write!(self.out, "{}", Paint::green("> "))?;
            self.out.flush()?;

            let line = match lines.next_line().await? {
                Some(line) => line,
                None => break,
            };

            match self.handle_line(&line).await {
                Ok(true) => break,
                Ok(false) => {}
                Err(err) => {
                    tracing::error!(error = ?err, "Command failed");
                    self.print_error(&format!("Error: {err}"))?;
                }
            }
        }

        return Ok(());
    }
}

pub async fn start(backend: BackendBox) -> Result<()> {
    let mut repl = Repl::new(backend.as_ref(), StorySession::default(), io::stdout());
    repl.greet()?;

    if let Err(err) = backend.health_check().await {
        repl.print_error(&format!(
            "Hey, it looks like backend {} isn't reachable. Double check your API key and connection before we start.\n\nError: {err}",
            backend.name()
        ))?;
    }

    let image_path = Config::get(ConfigKey::Image);
    if !image_path.is_empty() {
        let media_type = Config::get(ConfigKey::MediaType);
        if let Err(err) = repl.open_image(&image_path, Some(media_type.as_str())).await {
            repl.print_error(&format!("Error: {err}"))?;
        }
    } else {
        repl.print_notice("Pick an image with /image PATH to begin.")?;
    }

    return repl.run(BufReader::new(tokio::io::stdin())).await;
}
