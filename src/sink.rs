//! Event output — JSONL files and console.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::journal::Event;

pub type SinkResult<T> = Result<T, SinkError>;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("io error at {path:?}: {source}")]
    Io {
        path: Option<PathBuf>,
        #[source]
        source: io::Error,
    },
    #[error("event serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Receives the decoded events of one journal.
pub trait EventSink {
    fn write(&mut self, event: &Event) -> SinkResult<()>;

    /// Flushes buffered output. Must be called before the sink is dropped
    /// for the output to be complete.
    fn finish(&mut self) -> SinkResult<()>;
}

/// One `<prefix><name>.jsonl` file per journal under the output root.
pub struct JsonlSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl JsonlSink {
    pub fn create(output_root: &Path, prefix: &str, journal_name: &str) -> SinkResult<Self> {
        let path = output_root.join(format!("{prefix}{journal_name}.jsonl"));
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|source| SinkError::Io {
                path: Some(dir.to_path_buf()),
                source,
            })?;
        }
        let file = File::create(&path).map_err(|source| SinkError::Io {
            path: Some(path.clone()),
            source,
        })?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io(&self, source: io::Error) -> SinkError {
        SinkError::Io {
            path: Some(self.path.clone()),
            source,
        }
    }
}

impl EventSink for JsonlSink {
    fn write(&mut self, event: &Event) -> SinkResult<()> {
        serde_json::to_writer(&mut self.writer, event)?;
        self.writer.write_all(b"\n").map_err(|source| SinkError::Io {
            path: Some(self.path.clone()),
            source,
        })
    }

    fn finish(&mut self) -> SinkResult<()> {
        let result = self.writer.flush();
        result.map_err(|source| self.io(source))
    }
}

/// Prints events to stdout, one JSON object per line (`--console`).
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl EventSink for ConsoleSink {
    fn write(&mut self, event: &Event) -> SinkResult<()> {
        let line = serde_json::to_string(event)?;
        let mut stdout = io::stdout().lock();
        stdout
            .write_all(line.as_bytes())
            .and_then(|()| stdout.write_all(b"\n"))
            .map_err(|source| SinkError::Io {
                path: None,
                source,
            })
    }

    fn finish(&mut self) -> SinkResult<()> {
        io::stdout().lock().flush().map_err(|source| SinkError::Io {
            path: None,
            source,
        })
    }
}
