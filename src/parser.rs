use std::sync::LazyLock;

use regex::Regex;

/// Broadcast sentinel accepted in place of an agent identifier.
pub const BROADCAST: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    All,
    Agent(String),
}

impl Target {
    pub fn as_str(&self) -> &str {
        match self {
            Target::All => BROADCAST,
            Target::Agent(id) => id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedCommand {
    pub target: Target,
    pub payload: String,
}

// `s` lets the payload span lines; `i` covers `@ALL`.
static COMMAND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)^@(\d+|all)\s+(.+)$").expect("valid regex"));

/// Parse `@<digits|all> <payload>` out of a chat reply.
///
/// Returns `None` for anything else. Numeric targets keep their exact digits
/// (`@007` stays `"007"`); the payload is trimmed at both ends but otherwise
/// passed through verbatim, newlines included.
pub fn parse_command(text: &str) -> Option<RoutedCommand> {
    let captures = COMMAND.captures(text.trim())?;
    let target = captures.get(1)?.as_str().to_lowercase();
    let payload = captures.get(2)?.as_str().trim();
    if payload.is_empty() {
        return None;
    }

    let target = if target == BROADCAST {
        Target::All
    } else {
        Target::Agent(target)
    };

    Some(RoutedCommand {
        target,
        payload: payload.to_string(),
    })
}
