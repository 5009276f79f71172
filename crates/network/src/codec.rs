//! # Request Line Codec
//!
//! Splits the inbound byte stream into request lines.
//!
//! Wraps [`LinesCodec`] so that an overlong line or a line that is not valid
//! UTF-8 comes out as an item instead of a decoder error. `FramedRead` stops
//! yielding frames after a decoder error, which would end the session over a
//! single bad line. Only real socket failures surface as `Err`.

use bytes::BytesMut;
use gridhunt_protocol::{Response, ResultCode};
use std::io::{self, ErrorKind};
use tokio_util::codec::{Decoder, LinesCodec, LinesCodecError};

/// A request line that was read but cannot be dispatched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadLine {
    /// Longer than the configured maximum; the rest of it is discarded
    TooLong,

    /// Not valid UTF-8
    NotUtf8,
}

impl BadLine {
    /// The reply sent back for the rejected line
    pub fn reply(self) -> Response {
        match self {
            Self::TooLong => Response::new(ResultCode::BadRequest, "line too long"),
            Self::NotUtf8 => Response::new(ResultCode::BadRequest, "invalid encoding"),
        }
    }
}

/// Line decoder that keeps going after a bad line
#[derive(Debug, Clone)]
pub struct RequestCodec {
    lines: LinesCodec,
}

impl RequestCodec {
    pub fn new(max_length: usize) -> Self {
        Self {
            lines: LinesCodec::new_with_max_length(max_length),
        }
    }
}

impl Decoder for RequestCodec {
    type Item = Result<String, BadLine>;
    type Error = io::Error;

    fn decode(&mut self, buf: &mut BytesMut) -> io::Result<Option<Self::Item>> {
        recover(self.lines.decode(buf))
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> io::Result<Option<Self::Item>> {
        recover(self.lines.decode_eof(buf))
    }
}

/// `LinesCodec` has already consumed (or started discarding) the bad line
/// when it reports one of these errors, so decoding can resume right away.
fn recover(
    decoded: Result<Option<String>, LinesCodecError>,
) -> io::Result<Option<Result<String, BadLine>>> {
    match decoded {
        Ok(line) => Ok(line.map(Ok)),
        Err(LinesCodecError::MaxLineLengthExceeded) => Ok(Some(Err(BadLine::TooLong))),
        Err(LinesCodecError::Io(e)) if e.kind() == ErrorKind::InvalidData => {
            Ok(Some(Err(BadLine::NotUtf8)))
        }
        Err(LinesCodecError::Io(e)) => Err(e),
    }
}
