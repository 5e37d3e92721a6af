/// Command-prefix classification for inbound message text.
///
/// Prefixes are matched literally on the untrimmed original text, in a fixed
/// priority order, before the free-chat fallthrough. The trailing space is
/// part of the token, so "!askfoo" is free chat, not a malformed command.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Ask,
    Gemini,
    Llama,
}

impl CommandKind {
    pub fn usage_hint(&self) -> &'static str {
        match self {
            CommandKind::Ask => "Usage: !ask <question>",
            CommandKind::Gemini => "Usage: !gemini <question>",
            CommandKind::Llama => "Usage: !llama <question>",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Empty text: nothing to do.
    None,
    /// A recognized prefix with an empty remainder: send a syntax hint,
    /// never invoke a provider.
    Usage(CommandKind),
    Ask(String),
    Gemini(String),
    Llama(String),
    FreeChat(String),
}

pub fn classify(text: &str) -> Command {
    if text.is_empty() {
        return Command::None;
    }
    if let Some(rest) = text.strip_prefix("!ask ") {
        return command_or_usage(rest, CommandKind::Ask, Command::Ask);
    }
    if let Some(rest) = text.strip_prefix("!gemini ") {
        return command_or_usage(rest, CommandKind::Gemini, Command::Gemini);
    }
    if let Some(rest) = text.strip_prefix("!llama ") {
        return command_or_usage(rest, CommandKind::Llama, Command::Llama);
    }
    Command::FreeChat(text.to_string())
}

fn command_or_usage(
    rest: &str,
    kind: CommandKind,
    make: impl FnOnce(String) -> Command,
) -> Command {
    let query = rest.trim();
    if query.is_empty() {
        Command::Usage(kind)
    } else {
        make(query.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_is_none() {
        assert_eq!(classify(""), Command::None);
    }

    #[test]
    fn test_ask_prefix() {
        assert_eq!(
            classify("!ask what is grace"),
            Command::Ask("what is grace".to_string())
        );
    }

    #[test]
    fn test_remainder_is_trimmed() {
        assert_eq!(classify("!gemini   hi  "), Command::Gemini("hi".to_string()));
    }

    #[test]
    fn test_empty_remainder_is_usage() {
        assert_eq!(classify("!ask "), Command::Usage(CommandKind::Ask));
        assert_eq!(classify("!ask    "), Command::Usage(CommandKind::Ask));
        assert_eq!(classify("!gemini "), Command::Usage(CommandKind::Gemini));
        assert_eq!(classify("!llama "), Command::Usage(CommandKind::Llama));
    }

    #[test]
    fn test_prefix_requires_trailing_space() {
        // Without the trailing space the token is ordinary free chat.
        assert_eq!(classify("!ask"), Command::FreeChat("!ask".to_string()));
        assert_eq!(
            classify("!askfoo"),
            Command::FreeChat("!askfoo".to_string())
        );
    }

    #[test]
    fn test_prefix_is_case_sensitive() {
        assert_eq!(
            classify("!Ask hello"),
            Command::FreeChat("!Ask hello".to_string())
        );
    }

    #[test]
    fn test_untrimmed_text_falls_through_to_free_chat() {
        // A leading space defeats the literal prefix match.
        assert_eq!(
            classify(" !ask hello"),
            Command::FreeChat(" !ask hello".to_string())
        );
    }

    #[test]
    fn test_free_chat_keeps_full_text() {
        assert_eq!(
            classify("hello there"),
            Command::FreeChat("hello there".to_string())
        );
    }

    #[test]
    fn test_llama_prefix() {
        assert_eq!(classify("!llama ping"), Command::Llama("ping".to_string()));
    }
}
