use engine::normalize_token;

/// A prefixed chat message split into command word and arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct CommandLine<'a> {
    pub token: String,
    pub args: Vec<&'a str>,
}

/// Splits `?um 10000` into `um` and `["10000"]`.
///
/// Messages that do not start with `prefix`, or hold nothing after it, are
/// not commands and yield `None`.
pub(crate) fn parse_command_line<'a>(text: &'a str, prefix: &str) -> Option<CommandLine<'a>> {
    let rest = text.strip_prefix(prefix)?;
    let mut words = rest.split_whitespace();
    let token = normalize_token(words.next()?);

    Some(CommandLine {
        token,
        args: words.collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_token_and_arguments() {
        let line = parse_command_line("?UM 10000", "?").unwrap();
        assert_eq!(line.token, "um");
        assert_eq!(line.args, vec!["10000"]);
    }

    #[test]
    fn collapses_whitespace() {
        let line = parse_command_line("?   totaluang \t 2  ", "?").unwrap();
        assert_eq!(line.token, "totaluang");
        assert_eq!(line.args, vec!["2"]);
    }

    #[test]
    fn help_alias_survives_the_prefix() {
        let line = parse_command_line("??", "?").unwrap();
        assert_eq!(line.token, "?");
        assert!(line.args.is_empty());
    }

    #[test]
    fn ignores_plain_chat() {
        assert_eq!(parse_command_line("halo semua", "?"), None);
        assert_eq!(parse_command_line(" ?um 5", "?"), None);
        assert_eq!(parse_command_line("?", "?"), None);
        assert_eq!(parse_command_line("?   ", "?"), None);
    }

    #[test]
    fn custom_prefix() {
        let line = parse_command_line("!uk 2500", "!").unwrap();
        assert_eq!(line.token, "uk");
        assert_eq!(parse_command_line("?uk 2500", "!"), None);
    }
}
