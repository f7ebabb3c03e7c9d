//! The `!cringo [size] [min_balance]` channel command.

use cringo_core::{CardSize, MinBalance};

use crate::config::GameConfig;
use crate::error::CommandError;

/// A parsed request to start a game.
#[derive(Debug, Clone, PartialEq)]
pub struct StartCommand {
    pub size: CardSize,
    pub min_balance: MinBalance,
}

/// Parses a channel message as a start command.
///
/// Returns `None` when the message is not addressed to the command at all,
/// and `Some(Err(_))` when it is but the arguments are malformed. The prefix
/// and name match case-insensitively; omitted arguments take the configured
/// defaults.
pub fn parse_command(
    content: &str,
    config: &GameConfig,
) -> Option<Result<StartCommand, CommandError>> {
    let mut args = content.split_whitespace();
    let head = args.next()?;
    let name = strip_prefix_ignore_case(head, &config.command_prefix)?;
    if !name.eq_ignore_ascii_case(&config.command_name) {
        return None;
    }

    let args: Vec<&str> = args.collect();
    Some(parse_args(&args, config))
}

fn parse_args(args: &[&str], config: &GameConfig) -> Result<StartCommand, CommandError> {
    if args.len() > 2 {
        return Err(CommandError::TooManyArguments);
    }

    let size = match args.first() {
        Some(raw) => raw
            .parse::<CardSize>()
            .map_err(|_| CommandError::UnknownCardSize((*raw).to_string()))?,
        None => config.card_size(),
    };
    let min_balance = match args.get(1) {
        Some(raw) => parse_min_balance(raw)?,
        None => config.min_balance(),
    };

    Ok(StartCommand { size, min_balance })
}

fn parse_min_balance(raw: &str) -> Result<MinBalance, CommandError> {
    if raw.eq_ignore_ascii_case("any") || raw.eq_ignore_ascii_case("none") {
        return Ok(MinBalance::NoMinimum);
    }
    match raw.parse::<f64>() {
        Ok(amount) if amount.is_finite() && amount >= 0.0 => Ok(MinBalance::Amount(amount)),
        _ => Err(CommandError::InvalidMinBalance(raw.to_string())),
    }
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &text[prefix.len()..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Option<Result<StartCommand, CommandError>> {
        parse_command(content, &GameConfig::default())
    }

    #[test]
    fn test_defaults() {
        let command = parse("!cringo").unwrap().unwrap();
        assert_eq!(command.size, CardSize::Standard);
        assert_eq!(command.min_balance, MinBalance::Amount(0.0));
    }

    #[test]
    fn test_size_and_balance() {
        let command = parse("!CRINGO large 12.5").unwrap().unwrap();
        assert_eq!(command.size, CardSize::Large);
        assert_eq!(command.min_balance, MinBalance::Amount(12.5));

        let command = parse("  !cringo 2 any").unwrap().unwrap();
        assert_eq!(command.size, CardSize::Small);
        assert_eq!(command.min_balance, MinBalance::NoMinimum);
    }

    #[test]
    fn test_other_messages_are_not_commands() {
        assert!(parse("hello").is_none());
        assert!(parse("cringo 4").is_none());
        assert!(parse("!cringoo").is_none());
        assert!(parse("!help").is_none());
        assert!(parse("").is_none());
    }

    #[test]
    fn test_malformed_arguments() {
        assert_eq!(
            parse("!cringo 5").unwrap(),
            Err(CommandError::UnknownCardSize("5".to_string()))
        );
        assert_eq!(
            parse("!cringo 4 -3").unwrap(),
            Err(CommandError::InvalidMinBalance("-3".to_string()))
        );
        assert_eq!(
            parse("!cringo 4 inf").unwrap(),
            Err(CommandError::InvalidMinBalance("inf".to_string()))
        );
        assert_eq!(
            parse("!cringo 4 10 extra").unwrap(),
            Err(CommandError::TooManyArguments)
        );
    }

    #[test]
    fn test_custom_prefix_and_name() {
        let config = GameConfig {
            command_prefix: "?".to_string(),
            command_name: "bingo".to_string(),
            default_card_size: 6,
            default_min_balance: None,
            ..Default::default()
        };

        let command = parse_command("?Bingo", &config).unwrap().unwrap();
        assert_eq!(command.size, CardSize::Large);
        assert_eq!(command.min_balance, MinBalance::NoMinimum);
        assert!(parse_command("!cringo", &config).is_none());
    }
}
