#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod journal;
pub mod sink;
pub mod store;
pub mod telemetry;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;

// Re-export the main types at crate root for convenience
pub use crate::export::{CancelToken, ExportOptions, ExportReport, JournalReport, JournalStatus};
pub use crate::journal::{
    DecoderState, Dictionary, ErrorKind, Event, JournalDecoder, JournalError, JournalResult,
};
pub use crate::sink::{ConsoleSink, EventSink, JsonlSink, SinkError};
pub use crate::store::{JournalRef, JournalStore, LocalStore, StoreError};
