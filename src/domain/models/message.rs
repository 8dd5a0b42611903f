#[cfg(test)]
#[path = "message_test.rs"]
mod tests;

use serde::Deserialize;
use serde::Serialize;

use super::Role;

/// The subset of a chat message that is sent to the conversational endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub text: String,
}

impl ConversationTurn {
    pub fn new(role: Role, text: &str) -> ConversationTurn {
        return ConversationTurn {
            role,
            text: text.to_string(),
        };
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: u64,
    pub role: Role,
    pub text: String,
}

impl ChatMessage {
    pub fn new(id: u64, role: Role, text: &str) -> ChatMessage {
        return ChatMessage {
            id,
            role,
            text: text.to_string(),
        };
    }

    pub fn to_turn(&self) -> ConversationTurn {
        return ConversationTurn::new(self.role, &self.text);
    }

    pub fn as_string_lines(&self, line_max_width: usize) -> Vec<String> {
        return wrap_lines(&self.text.replace('\t', "  "), line_max_width);
    }
}

/// Word wraps `text` to `line_max_width` columns. Words longer than a line are
/// kept whole.
pub fn wrap_lines(text: &str, line_max_width: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();

    for full_line in text.split('\n') {
        if full_line.trim().is_empty() {
            lines.push("".to_string());
            continue;
        }

        let mut char_count = 0;
        let mut current_lines: Vec<&str> = vec![];

        for word in full_line.split(' ') {
            if !current_lines.is_empty() && word.len() + char_count + 1 > line_max_width {
                lines.push(current_lines.join(" ").trim_end().to_string());
                current_lines = vec![word];
                char_count = word.len() + 1;
            } else {
                current_lines.push(word);
                char_count += word.len() + 1;
            }
        }
        if !current_lines.is_empty() {
            lines.push(current_lines.join(" ").trim_end().to_string());
        }
    }

    return lines;
}
