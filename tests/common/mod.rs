//! Shared journal fixture builder for integration tests.
#![allow(dead_code)]

use thaw::journal::varint::write_uvarint;

/// Builds journal byte streams opcode by opcode.
#[derive(Default)]
pub struct JournalBuilder {
    bytes: Vec<u8>,
}

impl JournalBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn lp(mut self, opcode: u8, value: &[u8]) -> Self {
        self.bytes.push(opcode);
        write_uvarint(&mut self.bytes, value.len() as u64);
        self.bytes.extend_from_slice(value);
        self
    }

    fn op_varint(mut self, opcode: u8, value: u64) -> Self {
        self.bytes.push(opcode);
        write_uvarint(&mut self.bytes, value);
        self
    }

    pub fn nop(mut self) -> Self {
        self.bytes.push(0x00);
        self
    }

    pub fn new_host(self, value: &[u8]) -> Self {
        self.lp(0x03, value)
    }

    pub fn new_host_alias(self, value: &[u8]) -> Self {
        self.lp(0x06, value)
    }

    pub fn new_source(self, value: &[u8]) -> Self {
        self.lp(0x04, value)
    }

    pub fn new_sourcetype(self, value: &[u8]) -> Self {
        self.lp(0x05, value)
    }

    pub fn set_active_host(self, index: u64) -> Self {
        self.op_varint(0x11, index)
    }

    pub fn set_active_source(self, index: u64) -> Self {
        self.op_varint(0x12, index)
    }

    pub fn set_active_sourcetype(self, index: u64) -> Self {
        self.op_varint(0x13, index)
    }

    pub fn set_base_time(self, secs: u64) -> Self {
        self.op_varint(0x14, secs)
    }

    pub fn reserved(self, opcode: u8, payload: u64) -> Self {
        assert!((0x15..=0x1f).contains(&opcode));
        self.op_varint(opcode, payload)
    }

    pub fn event(mut self, record: EventRecord) -> Self {
        self.bytes.extend(record.encode());
        self
    }

    /// Appends arbitrary bytes (truncated records, garbage opcodes).
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

/// One event record; encodes to opcode + L0 window.
pub struct EventRecord {
    pub opcode: u8,
    pub headers: Vec<(u64, Vec<u8>)>,
    pub stream_id: u64,
    pub stream_offset: u64,
    pub delta: u64,
    pub metadata: Vec<(Vec<u8>, Vec<u8>)>,
    pub message: Vec<u8>,
}

impl EventRecord {
    pub fn new(delta: u64, message: &[u8]) -> Self {
        Self {
            opcode: 0x20,
            headers: Vec::new(),
            stream_id: 0,
            stream_offset: 0,
            delta,
            metadata: Vec::new(),
            message: message.to_vec(),
        }
    }

    pub fn stream(mut self, id: u64, offset: u64) -> Self {
        self.stream_id = id;
        self.stream_offset = offset;
        self
    }

    pub fn metadata(mut self, key: &[u8], value: &[u8]) -> Self {
        self.metadata.push((key.to_vec(), value.to_vec()));
        self
    }

    pub fn extended_header(mut self, key: u64, value: &[u8]) -> Self {
        assert_ne!(key, 0, "key 0 terminates the header list");
        self.headers.push((key, value.to_vec()));
        self
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut body = Vec::new();
        let flags: u8 = if self.headers.is_empty() { 0x00 } else { 0x01 };
        body.push(flags);
        for (key, value) in &self.headers {
            write_uvarint(&mut body, *key);
            write_uvarint(&mut body, value.len() as u64);
            body.extend_from_slice(value);
        }
        if !self.headers.is_empty() {
            write_uvarint(&mut body, 0);
        }
        write_uvarint(&mut body, self.stream_id);
        write_uvarint(&mut body, self.stream_offset);
        write_uvarint(&mut body, self.delta);
        write_uvarint(&mut body, self.metadata.len() as u64);
        for (key, value) in &self.metadata {
            write_uvarint(&mut body, key.len() as u64);
            body.extend_from_slice(key);
            write_uvarint(&mut body, value.len() as u64);
            body.extend_from_slice(value);
        }
        body.extend_from_slice(&self.message);

        let mut record = vec![self.opcode];
        write_uvarint(&mut record, body.len() as u64);
        record.extend_from_slice(&body);
        record
    }
}

/// Three dictionary entries, all active, base time 10_000_000.
pub fn preamble() -> JournalBuilder {
    JournalBuilder::new()
        .new_host(b"hostA")
        .new_source(b"src/1")
        .new_sourcetype(b"st_1")
        .set_active_host(0)
        .set_active_source(0)
        .set_active_sourcetype(0)
        .set_base_time(10_000_000)
}
