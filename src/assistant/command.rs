//! Command parsing.

use teloxide::utils::command::BotCommands;

/// Commands the bot understands. Anything else is free text.
#[derive(BotCommands, Debug, Clone, Copy, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Comandos do Assistente ADS:")]
pub enum Command {
    #[command(description = "início e cadastro")]
    Start,
    #[command(description = "informações do projeto")]
    Sobre,
    #[command(description = "regras e prazos do TCC")]
    Tcc,
    #[command(description = "apagar o cadastro e começar de novo")]
    Reset,
    #[command(description = "verificar se o bot está funcionando")]
    Status,
    #[command(description = "cancelar o cadastro em andamento")]
    Cancel,
}

/// An inbound message, classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input<'a> {
    Command(Command),
    Text(&'a str),
    /// A `/command@name` aimed at a different bot in the same group.
    OtherBot,
}

impl Command {
    /// Match a command name given without the leading slash. Case-insensitive.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "start" => Some(Self::Start),
            "sobre" => Some(Self::Sobre),
            "tcc" => Some(Self::Tcc),
            "reset" => Some(Self::Reset),
            "status" => Some(Self::Status),
            "cancel" => Some(Self::Cancel),
            _ => None,
        }
    }
}

impl<'a> Input<'a> {
    /// Classify `text` by its first token. Trailing arguments are ignored.
    ///
    /// With `bot_username` set, a `@name` suffix must match it; without it any
    /// suffix is accepted.
    pub fn parse(text: &'a str, bot_username: Option<&str>) -> Self {
        let Some(token) = text.split_whitespace().next().and_then(|t| t.strip_prefix('/')) else {
            return Input::Text(text);
        };
        let (name, target) = match token.split_once('@') {
            Some((name, target)) => (name, Some(target)),
            None => (token, None),
        };

        if let (Some(target), Some(me)) = (target, bot_username)
            && !target.eq_ignore_ascii_case(me)
        {
            return Input::OtherBot;
        }

        match Command::from_name(name) {
            Some(cmd) => Input::Command(cmd),
            None => Input::Text(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(text: &str) -> Option<Command> {
        match Input::parse(text, Some("AssistenteAdsBot")) {
            Input::Command(cmd) => Some(cmd),
            _ => None,
        }
    }

    #[test]
    fn test_known_commands() {
        assert_eq!(command("/start"), Some(Command::Start));
        assert_eq!(command("/sobre"), Some(Command::Sobre));
        assert_eq!(command("/tcc"), Some(Command::Tcc));
        assert_eq!(command("/reset"), Some(Command::Reset));
        assert_eq!(command("/status"), Some(Command::Status));
        assert_eq!(command("/cancel"), Some(Command::Cancel));
    }

    #[test]
    fn test_bot_suffix_case_and_arguments() {
        assert_eq!(command("/start@AssistenteAdsBot"), Some(Command::Start));
        assert_eq!(command("/start@assistenteadsbot"), Some(Command::Start));
        assert_eq!(command("/TCC"), Some(Command::Tcc));
        assert_eq!(command("  /sobre por favor"), Some(Command::Sobre));
    }

    #[test]
    fn test_command_for_another_bot() {
        assert_eq!(Input::parse("/start@SomeOtherBot", Some("AssistenteAdsBot")), Input::OtherBot);
        assert_eq!(Input::parse("/help@SomeOtherBot ajuda", Some("AssistenteAdsBot")), Input::OtherBot);
        // Username unknown: any suffix is taken as ours.
        assert_eq!(Input::parse("/start@SomeOtherBot", None), Input::Command(Command::Start));
    }

    #[test]
    fn test_unknown_and_plain_text() {
        assert_eq!(command("/help"), None);
        assert_eq!(command("start"), None);
        assert_eq!(command(""), None);
        assert_eq!(command("o que é /start?"), None);
    }

    #[test]
    fn test_input_falls_back_to_text() {
        assert_eq!(Input::parse("/reset", None), Input::Command(Command::Reset));
        assert_eq!(Input::parse("Maria", None), Input::Text("Maria"));
        assert_eq!(Input::parse("/foo bar", None), Input::Text("/foo bar"));
        assert_eq!(Input::parse("", None), Input::Text(""));
    }

    #[test]
    fn test_bot_commands_menu() {
        let names: Vec<String> = Command::bot_commands()
            .into_iter()
            .map(|c| c.command.trim_start_matches('/').to_string())
            .collect();
        assert_eq!(names, ["start", "sobre", "tcc", "reset", "status", "cancel"]);
    }
}
