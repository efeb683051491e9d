//! Opcode dispatch loop over one journal.

use std::io::Read;

use tracing::trace;

use super::opcode::Opcode;
use super::reader::JournalReader;
use super::record;
use super::state::DecoderState;
use super::stream::ByteStream;
use super::{Event, JournalError, JournalResult};

/// Streaming decoder for one journal blob.
///
/// Iterates decoded events in stream order. A clean end-of-stream at an
/// opcode boundary ends iteration; the first failure anywhere else is
/// yielded once and the iterator fuses. Events yielded before a failure
/// are complete and correct.
pub struct JournalDecoder<R: Read> {
    reader: JournalReader<ByteStream<R>>,
    state: DecoderState,
    events: u64,
    done: bool,
}

impl<R: Read> JournalDecoder<R> {
    /// Wraps a journal byte source, transparently decompressing zstd
    /// frames.
    pub fn new(source: R) -> JournalResult<Self> {
        let stream = ByteStream::new(source).map_err(|source| JournalError::Io {
            offset: 0,
            source,
        })?;
        Ok(Self {
            reader: JournalReader::new(stream),
            state: DecoderState::new(),
            events: 0,
            done: false,
        })
    }

    /// Events yielded so far.
    pub fn events_decoded(&self) -> u64 {
        self.events
    }

    /// Approximate offset into the decompressed stream.
    pub fn position(&self) -> u64 {
        self.reader.position()
    }

    fn step(&mut self) -> JournalResult<Option<Event>> {
        loop {
            let offset = self.reader.position();
            let byte = match self.reader.read_u8() {
                Ok(byte) => byte,
                Err(JournalError::EndOfStream) => return Ok(None),
                Err(err) => return Err(err),
            };
            let Some(opcode) = Opcode::from_byte(byte) else {
                return Err(JournalError::UnknownOpcode {
                    opcode: byte,
                    offset,
                });
            };
            trace!(opcode = byte, offset, "dispatch");
            match opcode {
                Opcode::Nop => {}
                Opcode::NewString(dictionary) => {
                    let raw = self.reader.read_lp_bytes()?;
                    self.state
                        .define(dictionary, String::from_utf8_lossy(&raw).into_owned());
                }
                Opcode::SetActive(dictionary) => {
                    let index = self.reader.read_varint()?;
                    self.state.set_active(dictionary, index, offset)?;
                }
                Opcode::SetBaseTime => {
                    let secs = self.reader.read_varint()?;
                    self.state.set_base_time(secs);
                }
                Opcode::Reserved(_) => {
                    // payload is a single varint; consumed to keep the
                    // cursor aligned, value discarded
                    let _ = self.reader.read_varint()?;
                }
                Opcode::Event(_) => {
                    let event = record::read_event(&mut self.reader, &self.state)?;
                    self.events += 1;
                    return Ok(Some(event));
                }
            }
        }
    }
}

impl<R: Read> Iterator for JournalDecoder<R> {
    type Item = JournalResult<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.step() {
            Ok(Some(event)) => Some(Ok(event)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
