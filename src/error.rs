use std::{fmt, io};

/// Error raised while validating a single UBX frame.
#[derive(Debug, PartialEq, Eq)]
pub enum FrameError {
    /// Fewer bytes arrived than the frame (or its header) declares.
    Truncated { expect: usize, got: usize },
    /// The trailing checksum pair does not match the recomputed one.
    ChecksumMismatch { expect: u16, got: u16 },
    /// The buffer does not start with the `B5 62` preamble.
    InvalidSync,
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::Truncated { expect, got } => {
                write!(f, "truncated frame, expected {expect} bytes, got {got}")
            },
            FrameError::ChecksumMismatch { expect, got } => {
                write!(f, "checksum mismatch, expected {expect:#06x}, got {got:#06x}")
            },
            FrameError::InvalidSync => f.write_str("missing frame preamble"),
        }
    }
}

impl std::error::Error for FrameError {}

/// Error returned by receiver sessions.
#[derive(Debug)]
pub enum Error {
    /// A response frame failed validation. Recoverable; the caller may retry
    /// the command.
    Frame(FrameError),
    /// A message payload is shorter than the last field the decoder needs.
    InvalidPayloadLen {
        packet: &'static str,
        expect: usize,
        got: usize,
    },
    /// The receiver explicitly rejected the command. Never auto-retried.
    Nacked { class: u8, msg_id: u8 },
    /// A cleanly decoded frame that does not answer the outstanding request.
    UnexpectedPacket { class: u8, msg_id: u8 },
    /// The bus stayed idle past the caller's deadline.
    TimedOut,
    /// No serial port matching the receiver description was found.
    PortNotFound,
    /// The session was used before its port was opened.
    NotOpen,
    /// Transport failure, fatal for the session.
    Io(io::Error),
    /// Serial port failure, fatal for the session.
    Serial(serialport::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Frame(e) => write!(f, "invalid response frame: {e}"),
            Error::InvalidPayloadLen {
                packet,
                expect,
                got,
            } => write!(
                f,
                "invalid {packet} payload length, expected at least {expect}, got {got}"
            ),
            Error::Nacked { class, msg_id } => {
                write!(f, "receiver rejected command {class:#04x}/{msg_id:#04x}")
            },
            Error::UnexpectedPacket { class, msg_id } => {
                write!(f, "unexpected response frame {class:#04x}/{msg_id:#04x}")
            },
            Error::TimedOut => f.write_str("timed out waiting for the receiver"),
            Error::PortNotFound => f.write_str("no matching GNSS serial port found"),
            Error::NotOpen => f.write_str("serial port is not open"),
            Error::Io(e) => write!(f, "transport error: {e}"),
            Error::Serial(e) => write!(f, "serial port error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Frame(e) => Some(e),
            Error::Io(e) => Some(e),
            Error::Serial(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FrameError> for Error {
    fn from(e: FrameError) -> Self {
        Error::Frame(e)
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<serialport::Error> for Error {
    fn from(e: serialport::Error) -> Self {
        Error::Serial(e)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Why a decoded fix could not be converted to a calendar timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateTimeError {
    MissingDate,
    InvalidDate,
    InvalidTime,
}

impl fmt::Display for DateTimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateTimeError::MissingDate => f.write_str("fix carries no date"),
            DateTimeError::InvalidDate => f.write_str("invalid date"),
            DateTimeError::InvalidTime => f.write_str("invalid time"),
        }
    }
}

impl std::error::Error for DateTimeError {}
