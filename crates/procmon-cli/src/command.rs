//! Operator commands typed at the `Enter:` prompt.

/// One parsed line of operator input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Empty line: resample now.
    Refresh,
    /// `q` / `Q`.
    Quit,
    /// `s` / `S`: flip between CPU and PID ordering.
    ToggleSort,
    /// `k <pid>`, `kill <pid>`, or a bare `<pid>`.
    Terminate(u32),
    /// A terminate request whose target is not a valid PID.
    InvalidPid(String),
    /// Anything else.
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Command {
        let input = line.trim();

        match input {
            "" => return Command::Refresh,
            "q" | "Q" => return Command::Quit,
            "s" | "S" => return Command::ToggleSort,
            _ => {}
        }

        if let Some(target) = strip_kill_prefix(input) {
            return parse_pid(target.trim());
        }

        if input.chars().all(|c| c.is_ascii_digit()) {
            return parse_pid(input);
        }

        Command::Unknown(input.to_string())
    }
}

fn strip_kill_prefix(input: &str) -> Option<&str> {
    let head = input.get(..4).unwrap_or_default();
    if head.eq_ignore_ascii_case("kill") {
        return input.get(4..);
    }
    if input.starts_with(|c: char| c == 'k' || c == 'K') {
        return input.get(1..);
    }
    None
}

fn parse_pid(target: &str) -> Command {
    if target.is_empty() || !target.chars().all(|c| c.is_ascii_digit()) {
        return Command::InvalidPid(target.to_string());
    }
    // Only overflow can fail here.
    match target.parse::<u32>() {
        Ok(pid) => Command::Terminate(pid),
        Err(_) => Command::InvalidPid(target.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_whitespace_refresh() {
        assert_eq!(Command::parse(""), Command::Refresh);
        assert_eq!(Command::parse("   \t\r\n"), Command::Refresh);
    }

    #[test]
    fn quit_and_sort_either_case() {
        assert_eq!(Command::parse("q"), Command::Quit);
        assert_eq!(Command::parse(" Q \n"), Command::Quit);
        assert_eq!(Command::parse("s"), Command::ToggleSort);
        assert_eq!(Command::parse("S"), Command::ToggleSort);
    }

    #[test]
    fn kill_prefixed_forms() {
        assert_eq!(Command::parse("k 1234"), Command::Terminate(1234));
        assert_eq!(Command::parse("K1234"), Command::Terminate(1234));
        assert_eq!(Command::parse("kill 77"), Command::Terminate(77));
        assert_eq!(Command::parse("KILL   77  "), Command::Terminate(77));
    }

    #[test]
    fn bare_pid_terminates() {
        assert_eq!(Command::parse("4321"), Command::Terminate(4321));
        assert_eq!(Command::parse("0"), Command::Terminate(0));
    }

    #[test]
    fn malformed_targets_are_invalid() {
        assert_eq!(Command::parse("k"), Command::InvalidPid(String::new()));
        assert_eq!(Command::parse("k abc"), Command::InvalidPid("abc".into()));
        assert_eq!(Command::parse("k -5"), Command::InvalidPid("-5".into()));
        assert_eq!(Command::parse("k +5"), Command::InvalidPid("+5".into()));
        assert_eq!(
            Command::parse("99999999999"),
            Command::InvalidPid("99999999999".into())
        );
    }

    #[test]
    fn other_input_is_unknown() {
        assert_eq!(Command::parse("help"), Command::Unknown("help".into()));
        assert_eq!(Command::parse("12ab"), Command::Unknown("12ab".into()));
        assert_eq!(Command::parse("sort"), Command::Unknown("sort".into()));
    }
}
