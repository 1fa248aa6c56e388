use alloc::string::String;
use core::fmt;

/// Errors that can occur while locating a section within an ELF image.
///
/// [`SectionNotFound`] is the only variant that can be returned for a
/// well-formed image. All others mean the image is truncated or is not an
/// ELF32 little-endian file.
///
/// [`SectionNotFound`]: ReadError::SectionNotFound
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ReadError {
    /// Hit the end of the image before it was expected.
    ///
    /// This happens when the image is too short to contain the file header or
    /// when the section header table extends past the end of the image.
    UnexpectedEof,

    /// The image did not start with the ELF magic number.
    BadMagic,

    /// The image is not a 32-bit ELF file.
    UnsupportedClass(u8),

    /// The image is not little-endian.
    UnsupportedEndian(u8),

    /// The section header entry size is too small to hold a section header.
    InvalidSectionHeaderSize(u16),

    /// The index of the section name string table is past the end of the
    /// section header table.
    InvalidStringTableIndex(u32),

    /// The contents of a section extend past the end of the image.
    SectionOutOfBounds { index: usize },

    /// No section with the requested name exists.
    SectionNotFound(String),
}

impl fmt::Display for ReadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEof => f.write_str("unexpected end of ELF image"),
            Self::BadMagic => f.write_str("not an ELF image"),
            Self::UnsupportedClass(class) => {
                write!(f, "unsupported ELF class {class} (only ELF32 is supported)")
            }
            Self::UnsupportedEndian(data) => {
                write!(f, "unsupported ELF data encoding {data} (only little-endian is supported)")
            }
            Self::InvalidSectionHeaderSize(size) => {
                write!(f, "section header entries are {size} bytes, which is too small")
            }
            Self::InvalidStringTableIndex(index) => {
                write!(f, "section name table index {index} is out of range")
            }
            Self::SectionOutOfBounds { index } => {
                write!(f, "contents of section {index} extend past the end of the image")
            }
            Self::SectionNotFound(name) => write!(f, "elf binary has no {name} section"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ReadError {}
