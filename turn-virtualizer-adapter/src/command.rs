//! The command interface exposed to an external controller (e.g. an operator panel).
//!
//! Wire format, one JSON object per message:
//!
//! | request                      | response                                   |
//! |------------------------------|--------------------------------------------|
//! | `{"action":"getStatus"}`     | `{"virtualizedCount":5,"totalCount":15}`   |
//! | `{"action":"restoreAll"}`    | `{"ok":true}`                              |

use serde::{Deserialize, Serialize};
use thiserror::Error;
use turn_virtualizer::{Engine, Host, Status};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Command {
    GetStatus,
    RestoreAll,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Status(Status),
    Ack { ok: bool },
}

impl Response {
    pub fn ack() -> Self {
        Self::Ack { ok: true }
    }

    pub fn status(&self) -> Option<Status> {
        match self {
            Self::Status(status) => Some(*status),
            Self::Ack { .. } => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum CommandError {
    /// Nothing is attached on the receiving side (e.g. the page has no engine yet).
    #[error("no engine is attached to receive the command")]
    ReceiverGone,

    #[error("malformed command message: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("unexpected response to {command:?}: {response:?}")]
    UnexpectedResponse { command: Command, response: Response },
}

/// Sends a command to an engine and waits for its answer.
///
/// Failures are returned as-is: callers treat them as an absent response and never retry.
pub trait CommandChannel {
    fn send(&mut self, command: Command) -> Result<Response, CommandError>;

    fn status(&mut self) -> Result<Status, CommandError> {
        let response = self.send(Command::GetStatus)?;
        response
            .status()
            .ok_or(CommandError::UnexpectedResponse {
                command: Command::GetStatus,
                response,
            })
    }
}

/// A channel with nobody listening.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unattached;

impl CommandChannel for Unattached {
    fn send(&mut self, _command: Command) -> Result<Response, CommandError> {
        Err(CommandError::ReceiverGone)
    }
}

/// Executes a command against an engine.
pub fn dispatch<H: Host>(engine: &mut Engine<H::Item>, host: &mut H, command: Command) -> Response {
    vdebug!(?command, "command received");
    match command {
        Command::GetStatus => Response::Status(engine.status(&*host)),
        Command::RestoreAll => {
            engine.restore_all(host);
            Response::ack()
        }
    }
}

/// Decodes a JSON request, executes it and encodes the response.
pub fn handle_message<H: Host>(
    engine: &mut Engine<H::Item>,
    host: &mut H,
    message: &str,
) -> Result<String, CommandError> {
    let command: Command = serde_json::from_str(message)?;
    let response = dispatch(engine, host, command);
    Ok(serde_json::to_string(&response)?)
}
