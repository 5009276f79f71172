//! Wire response lines

use crate::ResultCode;
use gridhunt_core::{GridError, Result};
use std::fmt;

/// One `<code>:<message>` line sent to a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub code: ResultCode,
    pub message: String,
}

impl Response {
    pub fn new(code: ResultCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Encode without the trailing newline (the line codec adds it)
    pub fn to_line(&self) -> String {
        format!("{}:{}", self.code.as_u16(), self.message)
    }

    /// Decode a wire line
    ///
    /// # Errors
    /// `GridError::Protocol` if the line has no `:` separator or the code is
    /// not a known numeric status.
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        let (code, message) = line
            .split_once(':')
            .ok_or_else(|| GridError::Protocol(format!("missing code separator: {:?}", line)))?;

        let code = code
            .trim()
            .parse::<u16>()
            .ok()
            .and_then(ResultCode::from_u16)
            .ok_or_else(|| GridError::Protocol(format!("invalid response code: {:?}", code)))?;

        Ok(Self::new(code, message))
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.code.as_u16(), self.message)
    }
}
