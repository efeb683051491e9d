//! Transparent zstd detection for journal byte sources.

use std::io::{self, BufReader, Chain, Cursor, Read};

use zstd::stream::read::Decoder;

/// Magic bytes opening a zstandard frame.
pub const ZSTD_MAGIC: [u8; 4] = [0x28, 0xb5, 0x2f, 0xfd];

type Rewound<R> = Chain<Cursor<Vec<u8>>, R>;

/// Byte source with the compression layer peeled off.
///
/// Sniffs the first four bytes of the stream: a zstd magic selects a
/// pull-based streaming decompressor, anything else (including streams
/// shorter than the magic) passes through unchanged. Either way the bytes
/// read while sniffing are replayed, and memory stays bounded by the
/// decoder's internal window.
pub enum ByteStream<R: Read> {
    Plain(Rewound<R>),
    Zstd(Box<Decoder<'static, BufReader<Rewound<R>>>>),
}

impl<R: Read> ByteStream<R> {
    pub fn new(mut inner: R) -> io::Result<Self> {
        let mut head = [0u8; 4];
        let mut filled = 0usize;
        while filled < head.len() {
            let n = inner.read(&mut head[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        let rewound = Cursor::new(head[..filled].to_vec()).chain(inner);
        if head[..filled] == ZSTD_MAGIC {
            Ok(ByteStream::Zstd(Box::new(Decoder::new(rewound)?)))
        } else {
            Ok(ByteStream::Plain(rewound))
        }
    }

    pub fn is_compressed(&self) -> bool {
        matches!(self, ByteStream::Zstd(_))
    }
}

impl<R: Read> Read for ByteStream<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            ByteStream::Plain(inner) => inner.read(buf),
            ByteStream::Zstd(inner) => inner.read(buf),
        }
    }
}
