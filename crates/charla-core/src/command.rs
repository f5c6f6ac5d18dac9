//! Input classification shared by both session loops.

/// One classified line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserInput {
    /// The exit keyword; ends the terminal session.
    Exit,
    /// `/pic <path>`: describe the image file at `path`.
    Pic(String),
    /// Anything else: a plain chat turn.
    Text(String),
}

/// Classify a line of input.
///
/// `/pic` without an argument is not a command and falls through to
/// plain text, as does any other `/`-prefixed word.
pub fn classify(line: &str) -> UserInput {
    let trimmed = line.trim();

    if trimmed.eq_ignore_ascii_case("exit") {
        return UserInput::Exit;
    }

    if let Some(rest) = trimmed.strip_prefix("/pic")
        && rest.starts_with(char::is_whitespace)
    {
        let path = rest.trim();
        if !path.is_empty() {
            return UserInput::Pic(path.to_string());
        }
    }

    UserInput::Text(trimmed.to_string())
}
