//! # Gridhunt Line Protocol
//!
//! Line-oriented ASCII protocol spoken between clients and the server.
//!
//! ## Requests
//!
//! ```text
//! <action> [<arg> ...]
//! ```
//!
//! The action is matched case-insensitively against `login`, `map`,
//! `message`, `move`, `players` and `quit`. Anything else parses as
//! [`Action::Unknown`] and is rejected by the dispatcher.
//!
//! ## Responses
//!
//! ```text
//! <numeric-code>:<message>
//! ```
//!
//! See [`ResultCode`] for the code table.

pub mod action;
pub mod command;
pub mod response;

pub use action::Action;
pub use command::{Command, CommandResult, ResultCode};
pub use response::Response;
