//! Byte-level framing over a live input stream.

#[cfg(feature = "std")]
use std::boxed::Box;
#[cfg(feature = "std")]
use std::io::{self, Read};

/// Marks a potential frame start. Also the byte value that the encoder
/// stuffs when it appears in payload data.
pub const ESCAPE: u8 = 0x42;

/// Follows [`ESCAPE`] to confirm the start of a frame.
pub const FRAME_START: u8 = 0x00;

/// The capacity of the stream window in bytes.
pub const BUFFER_SIZE: usize = 1024;

/// A source of argument words for a frame.
pub trait WordSource {
    /// Read the next little-endian 32-bit word.
    ///
    /// Returns `None` once the input is exhausted before a whole word is
    /// available.
    fn read_u32(&mut self) -> Option<u32>;
}

/// A fixed-size window over a stream that may deliver data in arbitrarily
/// small pieces.
///
/// Bytes between `begin` and `end` are buffered but not yet consumed. The
/// `begin` cursor only ever moves forward through the stream; unconsumed
/// bytes are moved to the front of the buffer before it is refilled.
#[cfg(feature = "std")]
pub struct StreamReader<R> {
    inner: R,
    buf: Box<[u8; BUFFER_SIZE]>,
    begin: usize,
    end: usize,
}

#[cfg(feature = "std")]
impl<R: Read> StreamReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: Box::new([0; BUFFER_SIZE]),
            begin: 0,
            end: 0,
        }
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    /// The buffered bytes that have not been consumed yet.
    pub fn buffered(&self) -> &[u8] {
        &self.buf[self.begin..self.end]
    }

    /// Consume input up to and including the next [`ESCAPE`] byte.
    ///
    /// Returns `false` once the stream has ended without another escape
    /// byte. Everything skipped over is discarded.
    pub fn next_escape(&mut self) -> bool {
        loop {
            if let Some(pos) = self.buffered().iter().position(|&b| b == ESCAPE) {
                self.begin += pos + 1;
                return true;
            }

            self.begin = 0;
            self.end = self.read_into(0);

            if self.end == 0 {
                return false;
            }
        }
    }

    /// Read a single byte, waiting for more input if the window is empty.
    pub fn read_u8(&mut self) -> Option<u8> {
        if !self.fill(1) {
            return None;
        }

        let byte = self.buf[self.begin];
        self.begin += 1;
        Some(byte)
    }

    /// Read a little-endian 32-bit word, waiting for more input until four
    /// bytes are available.
    pub fn read_u32(&mut self) -> Option<u32> {
        if !self.fill(4) {
            return None;
        }

        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&self.buf[self.begin..self.begin + 4]);
        self.begin += 4;
        Some(u32::from_le_bytes(bytes))
    }

    /// Make sure at least `needed` bytes are buffered.
    ///
    /// On end of stream the bytes that did arrive stay buffered so that the
    /// caller can resume scanning through them.
    fn fill(&mut self, needed: usize) -> bool {
        if self.end - self.begin >= needed {
            return true;
        }

        self.buf.copy_within(self.begin..self.end, 0);
        self.end -= self.begin;
        self.begin = 0;

        while self.end < needed {
            let len = self.read_into(self.end);
            if len == 0 {
                return false;
            }

            self.end += len;
        }

        true
    }

    /// Read from the underlying stream into `buf[start..]`.
    ///
    /// A return value of 0 means the stream has ended. Errors other than
    /// interruptions are treated as the end of the stream.
    fn read_into(&mut self, start: usize) -> usize {
        loop {
            match self.inner.read(&mut self.buf[start..]) {
                Ok(len) => return len,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    log::warn!("failed to read input, treating it as the end of the stream: {e}");
                    return 0;
                }
            }
        }
    }
}

#[cfg(feature = "std")]
impl<R: Read> WordSource for StreamReader<R> {
    fn read_u32(&mut self) -> Option<u32> {
        StreamReader::read_u32(self)
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use std::vec;

    use super::*;

    /// Hands out at most `chunk` bytes per call to `read`.
    struct Chunked<'a> {
        data: &'a [u8],
        chunk: usize,
    }

    impl Read for Chunked<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let len = self.chunk.min(buf.len()).min(self.data.len());
            buf[..len].copy_from_slice(&self.data[..len]);
            self.data = &self.data[len..];
            Ok(len)
        }
    }

    fn chunked(data: &[u8], chunk: usize) -> StreamReader<Chunked<'_>> {
        StreamReader::new(Chunked { data, chunk })
    }

    #[test]
    fn read_u32_is_little_endian() {
        let mut reader = StreamReader::new(&[0x78, 0x56, 0x34, 0x12][..]);

        assert_eq!(reader.read_u32(), Some(0x1234_5678));
        assert_eq!(reader.read_u32(), None);
    }

    #[test]
    fn read_u32_across_single_byte_reads() {
        let data = [0x01, 0x00, 0x00, 0x00, 0xff, 0xff, 0xff, 0xff];
        let mut reader = chunked(&data, 1);

        assert_eq!(reader.read_u32(), Some(1));
        assert_eq!(reader.read_u32(), Some(u32::MAX));
        assert_eq!(reader.read_u32(), None);
    }

    #[test]
    fn partial_word_is_kept_at_end_of_stream() {
        let data = [0x42, 0x00, 0x10, 0x20, 0x30];
        let mut reader = chunked(&data, 2);

        assert!(reader.next_escape());
        assert_eq!(reader.read_u8(), Some(FRAME_START));
        assert_eq!(reader.read_u32(), None);
        assert_eq!(reader.buffered(), &[0x10, 0x20, 0x30]);
    }

    #[test]
    fn unconsumed_bytes_survive_a_refill() {
        let data = [0x42, 0x00, 0xaa, 0xbb, 0xcc, 0xdd, 0x01, 0x02, 0x03, 0x04];
        let mut reader = chunked(&data, 3);

        assert!(reader.next_escape());
        assert_eq!(reader.read_u8(), Some(0x00));
        assert_eq!(reader.read_u32(), Some(0xddcc_bbaa));
        assert_eq!(reader.read_u32(), Some(0x0403_0201));
    }

    #[test]
    fn next_escape_skips_other_bytes() {
        let data = b"hello\x42\x07world\x42";
        let mut reader = chunked(data, 4);

        assert!(reader.next_escape());
        assert_eq!(reader.read_u8(), Some(0x07));
        assert!(reader.next_escape());
        assert_eq!(reader.read_u8(), None);
        assert!(!reader.next_escape());
    }

    #[test]
    fn escape_at_end_of_chunk_waits_for_next_byte() {
        let data = [0x11, 0x42, 0x00];
        let mut reader = chunked(&data, 2);

        assert!(reader.next_escape());
        assert_eq!(reader.read_u8(), Some(FRAME_START));
    }

    #[test]
    fn words_straddle_the_end_of_the_buffer() {
        let mut data = vec![0u8; BUFFER_SIZE - 3];
        data.push(ESCAPE);
        data.push(FRAME_START);
        data.extend_from_slice(&0xdead_beef_u32.to_le_bytes());
        data.extend_from_slice(&7u32.to_le_bytes());

        let mut reader = StreamReader::new(&data[..]);

        assert!(reader.next_escape());
        assert_eq!(reader.read_u8(), Some(FRAME_START));
        assert_eq!(reader.read_u32(), Some(0xdead_beef));
        assert_eq!(reader.read_u32(), Some(7));
        assert!(!reader.next_escape());
    }

    #[test]
    fn read_errors_end_the_stream() {
        struct Failing(bool);

        impl Read for Failing {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                if std::mem::replace(&mut self.0, false) {
                    buf[0] = ESCAPE;
                    return Ok(1);
                }

                Err(io::Error::new(io::ErrorKind::BrokenPipe, "gone"))
            }
        }

        let mut reader = StreamReader::new(Failing(true));

        assert!(reader.next_escape());
        assert_eq!(reader.read_u8(), None);
        assert!(!reader.next_escape());
    }

    #[test]
    fn interrupted_reads_are_retried() {
        struct Flaky<'a> {
            interrupt: bool,
            data: &'a [u8],
        }

        impl Read for Flaky<'_> {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                self.interrupt = !self.interrupt;
                if self.interrupt {
                    return Err(io::ErrorKind::Interrupted.into());
                }

                self.data.read(buf)
            }
        }

        let mut reader = StreamReader::new(Flaky {
            interrupt: false,
            data: &[0x05, 0x00, 0x00, 0x00],
        });

        assert_eq!(reader.read_u32(), Some(5));
    }
}
