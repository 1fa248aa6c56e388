use std::io::{self, Read, Write};

use crate::format::{self, Rendered};
use crate::stream::{StreamReader, FRAME_START};
use crate::strings::TrunkStrings;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct DecodeOptions {
    color: bool,
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self { color: false }
    }

    /// Highlight diagnostics with terminal escape codes.
    ///
    /// Defaults to false.
    pub fn color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }
}

/// A decoding session over one input stream.
///
/// The session borrows the string table, so several sessions for the same
/// firmware image can run independently.
pub struct Decoder<'t, R> {
    strings: &'t TrunkStrings,
    reader: StreamReader<R>,
    options: DecodeOptions,
}

impl<'t, R: Read> Decoder<'t, R> {
    pub fn new(strings: &'t TrunkStrings, input: R, options: DecodeOptions) -> Self {
        Self {
            strings,
            reader: StreamReader::new(input),
            options,
        }
    }

    /// Decode frames until the input ends, writing the rendered text to
    /// `out`.
    ///
    /// Frames that cannot be decoded are skipped silently. The only error
    /// returned is a failure to write to `out`.
    pub fn run<W: Write + ?Sized>(&mut self, out: &mut W) -> io::Result<()> {
        while self.reader.next_escape() {
            self.frame(out)?;
        }

        out.flush()
    }

    /// Decode the frame following an escape byte.
    ///
    /// Returns `None` if the frame was abandoned without output.
    fn frame<W: Write + ?Sized>(&mut self, out: &mut W) -> io::Result<Option<Rendered>> {
        if self.reader.read_u8() != Some(FRAME_START) {
            return Ok(None);
        }

        let Some(address) = self.reader.read_u32() else {
            return Ok(None);
        };
        let Some(text) = self.strings.lookup(address) else {
            return Ok(None);
        };

        let rendered = format::render(text, &mut self.reader, out, self.options.color)?;
        out.flush()?;

        Ok(Some(rendered))
    }

    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }
}
