//! Splunk frozen-bucket journal decoding.
//!
//! A journal is a stateful opcode stream: dictionary opcodes append
//! host/source/sourcetype strings, state opcodes select the active entries
//! and a rolling base timestamp, and event opcodes carry length-framed
//! records that decode against that state. Journals arrive either raw or
//! wrapped in a zstandard frame; [`JournalDecoder`] detects which and
//! streams events without buffering the decompressed payload.
//!
//! Failure policy is journal-local: the decoder yields the first error and
//! fuses, and everything yielded before it is complete and correct. The
//! caller decides what to do with the remainder (the batch driver logs the
//! failure and moves on to the next journal).

use std::fmt;

use thiserror::Error;

pub mod varint;

mod decoder;
mod event;
mod opcode;
mod reader;
mod record;
mod state;
mod stream;

pub use decoder::JournalDecoder;
pub use event::Event;
pub use opcode::{Dictionary, Opcode};
pub use reader::JournalReader;
pub use state::DecoderState;
pub use stream::{ByteStream, ZSTD_MAGIC};

pub type JournalResult<T> = Result<T, JournalError>;

#[derive(Debug, Error)]
pub enum JournalError {
    /// Clean end of the opcode stream. Only surfaces from the primitive
    /// reader; the decoder turns it into end-of-iteration when it lands on
    /// an opcode boundary.
    #[error("end of stream")]
    EndOfStream,
    #[error("journal truncated near offset {offset}")]
    Truncated { offset: u64 },
    #[error("malformed journal near offset {offset}: {reason}")]
    Malformed { offset: u64, reason: String },
    #[error("{dictionary} index {index} out of range (have {len}) at offset {offset}")]
    OutOfRange {
        dictionary: Dictionary,
        index: u64,
        len: usize,
        offset: u64,
    },
    #[error("unknown opcode {opcode:#04x} at offset {offset}")]
    UnknownOpcode { opcode: u8, offset: u64 },
    #[error("io error near offset {offset}: {source}")]
    Io {
        offset: u64,
        #[source]
        source: std::io::Error,
    },
}

impl JournalError {
    /// Coarse class of the failure, for summary lines.
    pub fn kind(&self) -> ErrorKind {
        match self {
            JournalError::EndOfStream => ErrorKind::EndOfStream,
            JournalError::Truncated { .. } => ErrorKind::Truncated,
            JournalError::Malformed { .. } => ErrorKind::Malformed,
            JournalError::OutOfRange { .. } => ErrorKind::OutOfRange,
            JournalError::UnknownOpcode { .. } => ErrorKind::UnknownOpcode,
            JournalError::Io { .. } => ErrorKind::Io,
        }
    }

    /// Approximate offset of the failure in the decompressed stream.
    pub fn offset(&self) -> Option<u64> {
        match self {
            JournalError::EndOfStream => None,
            JournalError::Truncated { offset }
            | JournalError::Malformed { offset, .. }
            | JournalError::OutOfRange { offset, .. }
            | JournalError::UnknownOpcode { offset, .. }
            | JournalError::Io { offset, .. } => Some(*offset),
        }
    }
}

/// Failure classes of [`JournalError`], ordered by severity.
///
/// Recovery policy is the same for all of them: close the current journal,
/// keep the events decoded so far, continue with the next journal. Io
/// covers both the byte source and the decompressor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    EndOfStream,
    Truncated,
    Malformed,
    OutOfRange,
    UnknownOpcode,
    Io,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::EndOfStream => "end-of-stream",
            ErrorKind::Truncated => "truncated",
            ErrorKind::Malformed => "malformed",
            ErrorKind::OutOfRange => "out-of-range",
            ErrorKind::UnknownOpcode => "unknown-opcode",
            ErrorKind::Io => "io",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
