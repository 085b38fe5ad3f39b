use std::fmt;
use std::str::{self, Utf8Error};

pub type Result<T> = std::result::Result<T, Error>;

/// Error on parsing
#[derive(Debug, PartialEq, Eq, Error)]
pub struct SipParserError {
    /// Message in error
    pub message: String,
}

impl fmt::Display for SipParserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

#[allow(missing_docs)]
impl SipParserError {
    pub fn new<T>(s: T) -> Self
    where
        T: AsRef<str>,
    {
        Self {
            message: s.as_ref().to_string(),
        }
    }
}

impl std::convert::From<&str> for SipParserError {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl std::convert::From<String> for SipParserError {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl std::convert::From<Utf8Error> for SipParserError {
    fn from(value: Utf8Error) -> Self {
        SipParserError {
            message: format!("{:#?}", value),
        }
    }
}

impl std::convert::From<pksip_util::Error> for SipParserError {
    fn from(err: pksip_util::Error) -> Self {
        SipParserError {
            message: format!(
                "Failed to parse at line:{} column:{} kind:{:?}",
                err.line, err.col, err.kind,
            ),
        }
    }
}

impl std::convert::From<pksip_util::Error> for Error {
    fn from(err: pksip_util::Error) -> Self {
        Self::ParseError(SipParserError::from(err))
    }
}

impl std::convert::From<Utf8Error> for Error {
    fn from(value: Utf8Error) -> Self {
        Self::ParseError(SipParserError::from(value))
    }
}

impl std::convert::From<tokio::sync::mpsc::error::SendError<crate::transport::TransportEvent>> for Error {
    fn from(_value: tokio::sync::mpsc::error::SendError<crate::transport::TransportEvent>) -> Self {
        Self::ChannelClosed
    }
}

impl From<std::fmt::Error> for Error {
    fn from(value: std::fmt::Error) -> Self {
        Self::FmtError(value)
    }
}

use thiserror::Error;

/// Errors produced by the transaction layer and message-processing core.
#[derive(Debug, Error)]
pub enum Error {
    /// A malformed datagram, bad start line, or bad header.
    #[error(transparent)]
    ParseError(#[from] SipParserError),

    /// A `Content-Length` larger than the bytes actually present in the datagram.
    #[error("datagram too small for declared Content-Length")]
    ContentTooSmall,

    /// A stream-framed message carried no `Content-Length` header. Unlike
    /// datagram mode, a stream has no other way to know where the body ends.
    #[error("stream message has no Content-Length")]
    NoContentLength,

    /// A required header was absent from an otherwise well-formed request.
    #[error("Missing required '{0}' header")]
    MissingRequiredHeader(&'static str),

    /// A client/server transaction with the same key already exists.
    #[error("transaction with this key already exists")]
    Duplicate,

    /// No transport could be found to reach the request's destination.
    #[error("no suitable transport for destination")]
    NoTransport,

    /// A send failed at the transport layer; fatal to client FSMs.
    #[error("transport error: {0}")]
    TransportError(String),

    /// Timer B/F/H fired with no final response.
    #[error("transaction timed out")]
    Timeout,

    /// The request failed method/loop/extension validation (405/482/420).
    #[error("request failed validation: {0}")]
    ValidationFailure(crate::message::StatusCode),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("channel closed")]
    ChannelClosed,

    #[error("fmt error")]
    FmtError(std::fmt::Error),
}
