#[cfg(test)]
#[path = "slash_commands_test.rs"]
mod tests;

pub struct SlashCommand {
    command: String,
    args: String,
}

impl SlashCommand {
    pub fn parse(text: &str) -> Option<SlashCommand> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let (prefix, args) = text.split_once(char::is_whitespace).unwrap_or((text, ""));

        let cmd = SlashCommand {
            command: prefix.to_string(),
            args: args.trim().to_string(),
        };
        if cmd.is_quit()
            || cmd.is_read_aloud()
            || cmd.is_stop_audio()
            || cmd.is_select_image()
            || cmd.is_reset()
            || cmd.is_show_story()
            || cmd.is_help()
        {
            return Some(cmd);
        }

        return None;
    }

    /// Everything after the command, so paths may contain spaces.
    pub fn args(&self) -> Option<&str> {
        if self.args.is_empty() {
            return None;
        }

        return Some(&self.args);
    }

    pub fn is_quit(&self) -> bool {
        return ["/q", "/quit", "/exit"].contains(&self.command.as_str());
    }

    pub fn is_read_aloud(&self) -> bool {
        return ["/r", "/read"].contains(&self.command.as_str());
    }

    pub fn is_stop_audio(&self) -> bool {
        return ["/stop"].contains(&self.command.as_str());
    }

    pub fn is_select_image(&self) -> bool {
        return ["/i", "/image"].contains(&self.command.as_str());
    }

    pub fn is_reset(&self) -> bool {
        return ["/reset"].contains(&self.command.as_str());
    }

    pub fn is_show_story(&self) -> bool {
        return ["/s", "/story"].contains(&self.command.as_str());
    }

    pub fn is_help(&self) -> bool {
        return ["/h", "/help"].contains(&self.command.as_str());
    }
}
