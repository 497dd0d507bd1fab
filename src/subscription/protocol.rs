//! Realtime wire protocol.
//!
//! Clients send plain-text commands over the WebSocket:
//! `subscribe <pointId>` / `unsubscribe <pointId>`. The server pushes
//! JSON-serialized telemetry points for matching publishes.

#[cfg(test)]
mod tests;

/// Parsed client command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Subscribe(String),
    Unsubscribe(String),
}

/// Parse error carrying the offending line for logging.
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownCommand(pub String);

impl std::fmt::Display for UnknownCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown realtime command '{}'", self.0)
    }
}

impl Command {
    pub fn parse(line: &str) -> Result<Command, UnknownCommand> {
        let line = line.trim();
        match line.split_once(' ') {
            Some(("subscribe", point_id)) if !point_id.trim().is_empty() => {
                Ok(Command::Subscribe(point_id.trim().to_string()))
            }
            Some(("unsubscribe", point_id)) if !point_id.trim().is_empty() => {
                Ok(Command::Unsubscribe(point_id.trim().to_string()))
            }
            _ => Err(UnknownCommand(line.to_string())),
        }
    }
}
