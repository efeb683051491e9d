//! Event record parsing inside the length-bounded event window.
//!
//! An event record is a varint total length `L0` followed by `L0` bytes:
//! flags, optional extended headers, stream identity, the index-time delta,
//! a metadata block, and the trailing raw message. The window isolates the
//! record from the opcode stream: bytes the parser does not understand are
//! skipped by jumping to the window end, and any field that would cross the
//! window boundary is malformed rather than truncated.

use std::io::Read;

use super::event::Event;
use super::opcode::Dictionary;
use super::reader::JournalReader;
use super::state::DecoderState;
use super::varint::{self, MAX_VARINT_LEN};
use super::{JournalError, JournalResult};

/// Flags bit 0: extended headers precede the fixed fields.
const FLAG_EXTENDED_HEADERS: u8 = 0x01;

const META_RAW: &[u8] = b"_raw";
const META_HOST: &[u8] = b"host";
const META_SOURCE: &[u8] = b"source";
const META_SOURCETYPE: &[u8] = b"sourcetype";

/// Reads one event record (the opcode byte is already consumed) and
/// composes it with the current state.
pub(crate) fn read_event<R: Read>(
    reader: &mut JournalReader<R>,
    state: &DecoderState,
) -> JournalResult<Event> {
    let length = reader.read_varint()?;
    let base = reader.position();
    let window = reader.read_bytes(length)?;
    parse_window(&window, base, state)
}

fn parse_window(window: &[u8], base: u64, state: &DecoderState) -> JournalResult<Event> {
    let mut win = Window {
        buf: window,
        pos: 0,
        base,
    };

    // L0 = 0 is a legal degenerate record: no fields at all, empty message,
    // index_time anchored at zero when nothing says otherwise.
    let mut stream_id = 0;
    let mut stream_offset = 0;
    let mut delta = None;
    let mut meta = MetadataOverrides::default();

    if !win.is_empty() {
        let flags = win.read_u8()?;
        if flags & FLAG_EXTENDED_HEADERS != 0 {
            skip_extended_headers(&mut win)?;
        }
        stream_id = win.read_varint()?;
        stream_offset = win.read_varint()?;
        delta = Some(win.read_varint()?);

        let count = win.read_varint()?;
        for _ in 0..count {
            let key = win.read_lp_bytes()?;
            let value = win.read_lp_bytes()?;
            meta.note(key, value);
        }
    }

    let index_time = match delta {
        None => 0,
        Some(delta) => {
            let base_time = state.base_time().ok_or_else(|| {
                win.malformed("event carries a time delta but no base time was set")
            })?;
            base_time
                .checked_add(delta)
                .ok_or_else(|| win.malformed("event time overflows u64"))?
        }
    };

    // Remaining window bytes are the message; a `_raw` metadata entry wins.
    let message = match meta.raw {
        Some(raw) => String::from_utf8_lossy(&raw).into_owned(),
        None => String::from_utf8_lossy(win.remaining()).into_owned(),
    };

    Ok(Event {
        host: resolve(meta.host, state.active(Dictionary::Host)),
        source: resolve(meta.source, state.active(Dictionary::Source)),
        sourcetype: resolve(meta.sourcetype, state.active(Dictionary::Sourcetype)),
        index_time,
        message,
        stream_id,
        stream_offset,
    })
}

/// (key varint, value lp-bytes) pairs; a key of 0 ends the list. No header
/// ids are recognized yet, so contents are skipped.
fn skip_extended_headers(win: &mut Window<'_>) -> JournalResult<()> {
    loop {
        let key = win.read_varint()?;
        if key == 0 {
            return Ok(());
        }
        let _ = win.read_lp_bytes()?;
    }
}

fn resolve(override_value: Option<String>, active: Option<&str>) -> String {
    override_value.unwrap_or_else(|| active.unwrap_or_default().to_string())
}

/// Per-event values from the metadata block. Overrides apply to this event
/// only and never mutate the dictionaries.
#[derive(Default)]
struct MetadataOverrides {
    host: Option<String>,
    source: Option<String>,
    sourcetype: Option<String>,
    raw: Option<Vec<u8>>,
}

impl MetadataOverrides {
    fn note(&mut self, key: Vec<u8>, value: Vec<u8>) {
        match key.as_slice() {
            META_RAW => self.raw = Some(value),
            META_HOST => self.host = Some(lossy(value)),
            META_SOURCE => self.source = Some(lossy(value)),
            META_SOURCETYPE => self.sourcetype = Some(lossy(value)),
            // `_time`, `punct`, ... are not part of the output schema
            _ => {}
        }
    }
}

fn lossy(value: Vec<u8>) -> String {
    String::from_utf8_lossy(&value).into_owned()
}

/// Slice cursor over the event window. Every read that would cross the
/// window boundary is `Malformed`; truncation of the stream itself was
/// already ruled out when the window was read.
struct Window<'a> {
    buf: &'a [u8],
    pos: usize,
    base: u64,
}

impl<'a> Window<'a> {
    fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    fn offset(&self) -> u64 {
        self.base + self.pos as u64
    }

    fn malformed(&self, reason: impl Into<String>) -> JournalError {
        JournalError::Malformed {
            offset: self.offset(),
            reason: reason.into(),
        }
    }

    fn read_u8(&mut self) -> JournalResult<u8> {
        let Some(&byte) = self.buf.get(self.pos) else {
            return Err(self.malformed("event window exhausted"));
        };
        self.pos += 1;
        Ok(byte)
    }

    fn read_varint(&mut self) -> JournalResult<u64> {
        let start = self.pos;
        let mut value = 0u64;
        for index in 0..MAX_VARINT_LEN {
            let byte = self.read_u8()?;
            value = varint::accumulate(value, 7 * index as u32, byte).ok_or_else(|| {
                JournalError::Malformed {
                    offset: self.base + start as u64,
                    reason: "varint overflows u64".to_string(),
                }
            })?;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(JournalError::Malformed {
            offset: self.base + start as u64,
            reason: format!("varint continues past {MAX_VARINT_LEN} bytes"),
        })
    }

    fn read_lp_bytes(&mut self) -> JournalResult<Vec<u8>> {
        let len = self.read_varint()?;
        let len = usize::try_from(len)
            .ok()
            .filter(|len| *len <= self.buf.len() - self.pos)
            .ok_or_else(|| self.malformed("length crosses the event window boundary"))?;
        let bytes = self.buf[self.pos..self.pos + len].to_vec();
        self.pos += len;
        Ok(bytes)
    }

    /// Everything left in the window; consumes it (under-read tolerance:
    /// the cursor always ends at the window boundary).
    fn remaining(&mut self) -> &'a [u8] {
        let rest = &self.buf[self.pos..];
        self.pos = self.buf.len();
        rest
    }
}
