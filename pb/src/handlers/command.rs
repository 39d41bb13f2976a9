//! Leading slash-command parsing

/// A `/command` at the start of a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Lowercased name without the slash or `@bot` suffix
    pub name: String,
    /// Everything after the command token, trimmed
    pub args: String,
}

/// Parse `/cmd@bot args` at the start of `text`
pub fn parse_leading_command(text: &str) -> Option<Command> {
    let text = text.trim();
    let token = text.split_whitespace().next()?;
    let name = token.strip_prefix('/')?;
    let name = name.split('@').next().unwrap_or_default().trim().to_lowercase();
    if name.is_empty() {
        return None;
    }
    Some(Command {
        name,
        args: text[token.len()..].trim().to_string(),
    })
}

impl Command {
    /// Whether this command starts the preview flow
    pub fn is_preview(&self) -> bool {
        matches!(self.name.as_str(), "preview" | "cover")
    }

    pub fn is_cover(&self) -> bool {
        self.name == "cover"
    }
}
