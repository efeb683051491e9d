//! Buffered primitive reader over a journal byte stream.

use std::io::{self, BufRead, BufReader, Read};

use super::varint::{self, MAX_VARINT_LEN};
use super::{JournalError, JournalResult};

pub(crate) const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Wraps a byte source with a read buffer and a logical offset counter.
///
/// Clean end-of-stream is only reported by [`read_u8`](Self::read_u8) and
/// [`peek_u8`](Self::peek_u8); every multi-byte read maps end-of-stream to
/// [`JournalError::Truncated`], so the dispatcher can tell a finished
/// journal from one cut off mid-record.
pub struct JournalReader<R> {
    inner: BufReader<R>,
    pos: u64,
}

impl<R: Read> JournalReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner: BufReader::with_capacity(READ_BUFFER_SIZE, inner),
            pos: 0,
        }
    }

    /// Offset of the next unread byte in the (decompressed) stream.
    pub fn position(&self) -> u64 {
        self.pos
    }

    pub fn read_u8(&mut self) -> JournalResult<u8> {
        let mut byte = [0u8; 1];
        match self.inner.read_exact(&mut byte) {
            Ok(()) => {
                self.pos += 1;
                Ok(byte[0])
            }
            Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
                Err(JournalError::EndOfStream)
            }
            Err(source) => Err(self.io(source)),
        }
    }

    /// Next byte without consuming it.
    pub fn peek_u8(&mut self) -> JournalResult<u8> {
        let buf = match self.inner.fill_buf() {
            Ok(buf) => buf,
            Err(source) => return Err(JournalError::Io {
                offset: self.pos,
                source,
            }),
        };
        buf.first().copied().ok_or(JournalError::EndOfStream)
    }

    pub fn at_end(&mut self) -> JournalResult<bool> {
        match self.peek_u8() {
            Ok(_) => Ok(false),
            Err(JournalError::EndOfStream) => Ok(true),
            Err(err) => Err(err),
        }
    }

    pub fn read_exact(&mut self, buf: &mut [u8]) -> JournalResult<()> {
        match self.inner.read_exact(buf) {
            Ok(()) => {
                self.pos += buf.len() as u64;
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
                Err(JournalError::Truncated { offset: self.pos })
            }
            Err(source) => Err(self.io(source)),
        }
    }

    /// Decodes an unsigned LEB128 varint.
    ///
    /// Fails `Malformed` when the continuation runs past ten bytes or the
    /// value overflows u64, `Truncated` when the stream ends mid-sequence.
    pub fn read_varint(&mut self) -> JournalResult<u64> {
        let start = self.pos;
        let mut value = 0u64;
        for index in 0..MAX_VARINT_LEN {
            let byte = match self.read_u8() {
                Ok(byte) => byte,
                Err(JournalError::EndOfStream) => {
                    return Err(JournalError::Truncated { offset: self.pos });
                }
                Err(err) => return Err(err),
            };
            value = varint::accumulate(value, 7 * index as u32, byte).ok_or_else(|| {
                JournalError::Malformed {
                    offset: start,
                    reason: "varint overflows u64".to_string(),
                }
            })?;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(JournalError::Malformed {
            offset: start,
            reason: format!("varint continues past {MAX_VARINT_LEN} bytes"),
        })
    }

    /// Reads a varint length followed by that many bytes. Zero-length is
    /// legal and yields empty bytes.
    pub fn read_lp_bytes(&mut self) -> JournalResult<Vec<u8>> {
        let len = self.read_varint()?;
        self.read_bytes(len)
    }

    /// Reads `len` bytes without trusting `len` for the allocation: the
    /// buffer grows as bytes actually arrive, so a corrupt length fails at
    /// end-of-stream instead of reserving it up front.
    pub(crate) fn read_bytes(&mut self, len: u64) -> JournalResult<Vec<u8>> {
        let hint = len.min(READ_BUFFER_SIZE as u64) as usize;
        let mut data = Vec::with_capacity(hint);
        let result = (&mut self.inner).take(len).read_to_end(&mut data);
        let read = match result {
            Ok(read) => read,
            Err(source) => return Err(self.io(source)),
        };
        self.pos += read as u64;
        if (read as u64) < len {
            return Err(JournalError::Truncated { offset: self.pos });
        }
        Ok(data)
    }

    fn io(&self, source: io::Error) -> JournalError {
        JournalError::Io {
            offset: self.pos,
            source,
        }
    }
}
