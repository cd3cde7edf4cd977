use crate::api::UserId;

/// One line of terminal input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Plain text replaces the search box contents.
    Search(String),
    Delete(UserId),
    Confirm,
    Cancel,
    Refresh,
    Quit,
}

pub fn parse(line: &str) -> Result<Command, String> {
    let line = line.trim_end_matches(['\r', '\n']);
    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Command::Search(line.to_string()));
    };

    let mut parts = rest.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let arg = parts.next();
    match (name, arg) {
        ("delete", Some(id)) => id
            .parse()
            .map(Command::Delete)
            .map_err(|_| format!("Not a user id: {id}")),
        ("delete", None) => Err("Usage: /delete <id>".to_string()),
        ("confirm", None) => Ok(Command::Confirm),
        ("cancel", None) => Ok(Command::Cancel),
        ("refresh", None) => Ok(Command::Refresh),
        ("quit" | "exit", None) => Ok(Command::Quit),
        _ => Err(format!("Unknown command: /{rest}")),
    }
}
