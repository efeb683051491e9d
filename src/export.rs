//! Batch export driver.
//!
//! Fans independent journals out to worker threads; within one journal
//! decoding is single-threaded and strictly ordered. Failure recovery is
//! journal-local: a corrupted journal never aborts the batch, and events
//! decoded before its failure point are kept in the output.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam::channel;
use thiserror::Error;
use tracing::{info, warn};

use crate::journal::{ErrorKind, JournalDecoder};
use crate::sink::{ConsoleSink, EventSink, JsonlSink};
use crate::store::{JournalRef, JournalStore};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no journals found under the source prefix")]
    NoJournals,
}

/// Cooperative cancellation shared with decode workers.
///
/// Observed between events: a journal cancelled between events closes
/// cleanly with the events emitted so far; a decode in flight is never
/// half-emitted.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Clone, Debug)]
pub struct ExportOptions {
    pub output_root: PathBuf,
    pub output_prefix: String,
    /// Print events to stdout instead of writing JSONL files.
    pub console: bool,
    /// Journals decoded in parallel.
    pub jobs: usize,
    pub cancel: CancelToken,
}

/// Outcome of one journal.
#[derive(Clone, Debug)]
pub struct JournalReport {
    pub name: String,
    pub events: u64,
    pub status: JournalStatus,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JournalStatus {
    Complete,
    Cancelled,
    /// Decoding stopped; events before the failure point were kept.
    Failed { kind: ErrorKind, offset: u64 },
    /// The blob could not be opened or its output written.
    Io { reason: String },
}

impl JournalStatus {
    pub fn is_complete(&self) -> bool {
        matches!(self, JournalStatus::Complete)
    }
}

impl fmt::Display for JournalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JournalStatus::Complete => f.write_str("complete"),
            JournalStatus::Cancelled => f.write_str("cancelled"),
            JournalStatus::Failed { kind, offset } => {
                write!(f, "failed: {kind} near offset {offset}")
            }
            JournalStatus::Io { reason } => write!(f, "io: {reason}"),
        }
    }
}

/// Totals across the batch.
#[derive(Clone, Debug, Default)]
pub struct ExportReport {
    pub journals: usize,
    pub events: u64,
    pub failures: usize,
    pub cancelled: usize,
    pub duration: Duration,
}

impl ExportReport {
    pub fn events_per_second(&self) -> f64 {
        let seconds = self.duration.as_secs_f64();
        if seconds > 0.0 {
            self.events as f64 / seconds
        } else {
            0.0
        }
    }
}

/// Decodes every journal in the store and hands the events to per-journal
/// sinks. Returns once all journals finished or were cancelled.
pub fn run(
    store: &(dyn JournalStore + Sync),
    options: &ExportOptions,
) -> crate::Result<ExportReport> {
    let start = Instant::now();
    let journals = store.list()?;
    if journals.is_empty() {
        return Err(ExportError::NoJournals.into());
    }
    info!(journals = journals.len(), jobs = options.jobs, "starting export");

    let jobs = options.jobs.max(1).min(journals.len());
    let (work_tx, work_rx) = channel::unbounded::<JournalRef>();
    let (report_tx, report_rx) = channel::unbounded::<JournalReport>();
    for journal in journals {
        let _ = work_tx.send(journal);
    }
    drop(work_tx);

    thread::scope(|scope| {
        for _ in 0..jobs {
            let work_rx = work_rx.clone();
            let report_tx = report_tx.clone();
            scope.spawn(move || {
                for journal in work_rx.iter() {
                    if options.cancel.is_cancelled() {
                        return;
                    }
                    let report = export_one(store, options, &journal);
                    if report_tx.send(report).is_err() {
                        return;
                    }
                }
            });
        }
    });
    drop(report_tx);

    let mut report = ExportReport::default();
    for journal in report_rx.try_iter() {
        report.journals += 1;
        report.events += journal.events;
        match journal.status {
            JournalStatus::Complete => {}
            JournalStatus::Cancelled => report.cancelled += 1,
            JournalStatus::Failed { .. } | JournalStatus::Io { .. } => report.failures += 1,
        }
    }
    report.duration = start.elapsed();
    Ok(report)
}

fn export_one(
    store: &(dyn JournalStore + Sync),
    options: &ExportOptions,
    journal: &JournalRef,
) -> JournalReport {
    info!(name = %journal.name, size = journal.size, "decoding journal");

    let io_report = |reason: String| JournalReport {
        name: journal.name.clone(),
        events: 0,
        status: JournalStatus::Io { reason },
    };

    let source = match store.open(journal) {
        Ok(source) => source,
        Err(err) => {
            warn!(name = %journal.name, "failed to open journal: {err}");
            return io_report(err.to_string());
        }
    };
    let mut sink: Box<dyn EventSink> = if options.console {
        Box::new(ConsoleSink)
    } else {
        match JsonlSink::create(&options.output_root, &options.output_prefix, &journal.name) {
            Ok(sink) => Box::new(sink),
            Err(err) => {
                warn!(name = %journal.name, "failed to create output: {err}");
                return io_report(err.to_string());
            }
        }
    };

    let decoder = match JournalDecoder::new(source) {
        Ok(decoder) => decoder,
        Err(err) => {
            warn!(name = %journal.name, "failed to open journal stream: {err}");
            return io_report(err.to_string());
        }
    };

    let mut events = 0u64;
    let mut status = JournalStatus::Complete;
    for item in decoder {
        if options.cancel.is_cancelled() {
            status = JournalStatus::Cancelled;
            break;
        }
        match item {
            Ok(event) => match sink.write(&event) {
                Ok(()) => events += 1,
                Err(err) => {
                    warn!(name = %journal.name, "sink write failed: {err}");
                    status = JournalStatus::Io {
                        reason: err.to_string(),
                    };
                    break;
                }
            },
            Err(err) => {
                warn!(name = %journal.name, "decode failed: {err}");
                status = JournalStatus::Failed {
                    kind: err.kind(),
                    offset: err.offset().unwrap_or_default(),
                };
                break;
            }
        }
    }
    if let Err(err) = sink.finish()
        && status.is_complete()
    {
        status = JournalStatus::Io {
            reason: err.to_string(),
        };
    }

    info!(name = %journal.name, events, status = %status, "journal finished");
    JournalReport {
        name: journal.name.clone(),
        events,
        status,
    }
}
