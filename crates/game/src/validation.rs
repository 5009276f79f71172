//! # Command Validation
//!
//! Every handler runs an ordered list of checks before touching shared
//! state. The first failing check decides the result; nothing is mutated
//! unless every check passes.
//!
//! ```rust,ignore
//! validate(cmd, Action::Move, &[
//!     &has_valid_player,
//!     &has_valid_action,
//!     &is_expected_action,
//!     &has_arg_count(1),
//!     &has_valid_direction,
//! ])?;
//! ```

use gridhunt_core::{Direction, PlayerName};
use gridhunt_protocol::{Action, Command, CommandResult, ResultCode};

/// Longest accepted player name
pub const MAX_NAME_LEN: usize = 32;

/// Why a command was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// Malformed or unknown command
    #[error("{0}")]
    Protocol(String),

    /// Wrong arity or unknown argument value
    #[error("{0}")]
    Validation(String),

    /// Command not allowed in the current session or world state
    #[error("{0}")]
    State(String),

    /// Routing bug; the detail is logged, never sent to the player
    #[error("internal error")]
    Internal(String),
}

impl CommandError {
    pub fn code(&self) -> ResultCode {
        match self {
            Self::Internal(_) => ResultCode::ServerError,
            _ => ResultCode::BadRequest,
        }
    }

    /// Turn the rejection into the result sent back to the player
    pub fn into_result(self, player: Option<PlayerName>) -> CommandResult {
        if let Self::Internal(detail) = &self {
            tracing::error!("Internal command error: {}", detail);
        }
        CommandResult::new(player, self.code(), self.to_string())
    }
}

/// One step of the validation pipeline
pub type Check<'a> = &'a dyn Fn(&Command, Action) -> Result<(), CommandError>;

/// Run `checks` in order, stopping at the first failure
pub fn validate(cmd: &Command, expected: Action, checks: &[Check<'_>]) -> Result<(), CommandError> {
    checks.iter().try_for_each(|check| check(cmd, expected))
}

/// The connection has a logged-in player
pub fn has_valid_player(cmd: &Command, _expected: Action) -> Result<(), CommandError> {
    match cmd.player {
        Some(_) => Ok(()),
        None => Err(CommandError::State("log in first".into())),
    }
}

/// The connection has no player yet (login only)
pub fn has_no_player(cmd: &Command, _expected: Action) -> Result<(), CommandError> {
    match cmd.player {
        Some(_) => Err(CommandError::State("already logged in".into())),
        None => Ok(()),
    }
}

pub fn has_valid_action(cmd: &Command, _expected: Action) -> Result<(), CommandError> {
    match cmd.action {
        Action::Unknown => Err(CommandError::Protocol("unknown command".into())),
        _ => Ok(()),
    }
}

/// The command was routed to the handler declared for its action
pub fn is_expected_action(cmd: &Command, expected: Action) -> Result<(), CommandError> {
    if cmd.action == expected {
        Ok(())
    } else {
        Err(CommandError::Internal(format!(
            "{} command routed to {} handler",
            cmd.action, expected
        )))
    }
}

pub fn has_arg_count(count: usize) -> impl Fn(&Command, Action) -> Result<(), CommandError> {
    move |cmd: &Command, _: Action| {
        if cmd.args.len() == count {
            Ok(())
        } else {
            Err(CommandError::Validation(format!("expected {} argument(s)", count)))
        }
    }
}

pub fn has_min_arg_count(count: usize) -> impl Fn(&Command, Action) -> Result<(), CommandError> {
    move |cmd: &Command, _: Action| {
        if cmd.args.len() >= count {
            Ok(())
        } else {
            Err(CommandError::Validation(format!(
                "expected at least {} argument(s)",
                count
            )))
        }
    }
}

/// The first argument names a direction
pub fn has_valid_direction(cmd: &Command, _expected: Action) -> Result<(), CommandError> {
    cmd.args
        .first()
        .and_then(|arg| Direction::parse(arg))
        .map(|_| ())
        .ok_or_else(|| CommandError::Validation("unknown direction".into()))
}

/// The first argument is usable as a player name
///
/// Names travel over the ASCII wire protocol and end up as a CSV field, so
/// only printable ASCII other than the comma is accepted.
pub fn has_valid_name(cmd: &Command, _expected: Action) -> Result<(), CommandError> {
    let valid = cmd.args.first().is_some_and(|name| {
        (1..=MAX_NAME_LEN).contains(&name.chars().count())
            && name.chars().all(|c| c.is_ascii_graphic() && c != ',')
    });

    if valid {
        Ok(())
    } else {
        Err(CommandError::Validation("invalid name".into()))
    }
}
