//! `elf-trunk` decodes the trunk logging protocol.
//!
//! Trunk keeps log format strings off the wire. Firmware places them in a
//! `.trunk` section of its ELF image and only transmits a short frame made up
//! of the runtime address of the format string followed by its arguments:
//!
//! ```text
//! 0x42 0x00 <address: u32 LE> <argument: u32 LE>...
//! ```
//!
//! Decoding happens in two steps:
//! 1. Extract the format strings from the firmware image with
//!    [`ElfImage::trunk_section`] and [`TrunkStrings::from_section`].
//! 2. Run a [`Decoder`] over the captured byte stream.
//!
//! # Modules
//! - Types to read an image and decode a stream are available in the crate
//!   root.
//! - [`raw`] - Raw ELF32 header types.
//! - [`write`][mod@write] - Encode frames the same way the device does.
//!
//! # Features
//! - `std` (default) - Stream decoding with [`Decoder`] and [`StreamReader`],
//!   and `std::error::Error` for [`ReadError`]. Without it the crate only
//!   needs `alloc`, which is enough to read the string table out of an image
//!   and to encode frames.

#![no_std]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

#[cfg(feature = "std")]
mod decode;
mod display;
mod elf;
mod error;
#[cfg(feature = "std")]
mod format;
pub mod raw;
mod stream;
mod strings;
pub mod write;

pub use zerocopy::{ByteOrder, LittleEndian};

#[cfg(feature = "std")]
pub use self::decode::{DecodeOptions, Decoder};
pub use self::display::Escaped;
pub use self::elf::{ElfImage, Section, SectionIter, TRUNK_SECTION};
pub use self::error::ReadError;
#[cfg(feature = "std")]
pub use self::format::{render, Rendered};
#[cfg(feature = "std")]
pub use self::stream::StreamReader;
pub use self::stream::{WordSource, BUFFER_SIZE, ESCAPE, FRAME_START};
pub use self::strings::{TrunkString, TrunkStrings};
