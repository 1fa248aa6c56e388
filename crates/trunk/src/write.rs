//! Generate trunk frames the same way the device does.
//!
//! This is mainly useful for producing captures to feed back into a
//! [`Decoder`](crate::Decoder), and for host-side code that wants to speak the
//! protocol.

use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::io::{self, Write};

use crate::stream::{ESCAPE, FRAME_START};

/// The byte that follows [`ESCAPE`] when an escape-valued payload byte is
/// stuffed.
pub const STUFFED: u8 = ESCAPE + 1;

/// A single argument of a log call.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Arg {
    U8(u8),
    U32(u32),
}

impl Arg {
    /// Append the stuffed wire encoding of this argument to `out`.
    pub fn encode(self, out: &mut Vec<u8>) {
        match self {
            Self::U8(value) => extend_stuffed(out, &[value]),
            Self::U32(value) => extend_stuffed(out, &value.to_le_bytes()),
        }
    }
}

impl From<u8> for Arg {
    fn from(value: u8) -> Self {
        Self::U8(value)
    }
}

impl From<u32> for Arg {
    fn from(value: u32) -> Self {
        Self::U32(value)
    }
}

impl From<i32> for Arg {
    fn from(value: i32) -> Self {
        Self::U32(value as u32)
    }
}

/// Encode a complete frame: the frame header for the format string at
/// `address` followed by each argument.
pub fn encode_frame(address: u32, args: &[Arg]) -> Vec<u8> {
    let mut out = Vec::with_capacity(6 + 4 * args.len());
    out.extend_from_slice(&[ESCAPE, FRAME_START]);
    extend_stuffed(&mut out, &address.to_le_bytes());

    for arg in args {
        arg.encode(&mut out);
    }

    out
}

/// Writes frames to an underlying byte sink.
#[cfg(feature = "std")]
#[derive(Debug)]
pub struct FrameWriter<W> {
    inner: W,
}

#[cfg(feature = "std")]
impl<W: Write> FrameWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Start a new frame for the format string at `address`.
    ///
    /// The arguments for the format string have to be sent afterwards, in
    /// the order their placeholders appear.
    pub fn start_frame(&mut self, address: u32) -> io::Result<()> {
        self.inner.write_all(&[ESCAPE, FRAME_START])?;
        self.send_u32(address)
    }

    pub fn send_u8(&mut self, value: u8) -> io::Result<()> {
        self.send(Arg::U8(value))
    }

    pub fn send_u32(&mut self, value: u32) -> io::Result<()> {
        self.send(Arg::U32(value))
    }

    pub fn send(&mut self, arg: Arg) -> io::Result<()> {
        let mut buf = Vec::with_capacity(8);
        arg.encode(&mut buf);
        self.inner.write_all(&buf)
    }

    /// Write a whole frame at once.
    pub fn frame(&mut self, address: u32, args: &[Arg]) -> io::Result<()> {
        self.inner.write_all(&encode_frame(address, args))
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

fn extend_stuffed(out: &mut Vec<u8>, bytes: &[u8]) {
    for &byte in bytes {
        out.push(byte);

        if byte == ESCAPE {
            out.push(STUFFED);
        }
    }
}
