//! Raw struct types for the parts of the ELF32 format needed to find a
//! section.
//!
//! Only the file header and the section header are described here. Program
//! headers, symbols and relocations are never looked at.
//!
//! The ELF specification is available at
//! <https://refspecs.linuxfoundation.org/elf/elf.pdf>.

use c_enum::c_enum;
use zerocopy::{AsBytes, ByteOrder, FromBytes, FromZeroes, Unaligned, U16, U32};

/// The magic number at the very start of every ELF file.
pub const MAGIC: [u8; 4] = *b"\x7fELF";

/// Undefined section index. Used as `shstrndx` when there are no section
/// names.
pub const SHN_UNDEF: u16 = 0;

/// Escape value for `shstrndx` meaning the real index lives in the `link`
/// field of section 0.
pub const SHN_XINDEX: u16 = 0xFFFF;

/// The identification bytes at the start of the file header.
#[repr(C)]
#[derive(Copy, Clone, Debug, AsBytes, FromBytes, FromZeroes, Unaligned)]
pub struct Ident {
    /// Must be equal to [`MAGIC`].
    pub magic: [u8; 4],

    /// Whether this is a 32-bit or 64-bit file.
    pub class: Class,

    /// The byte order of all the multi-byte fields that follow.
    pub data: Data,

    /// ELF header version, always 1.
    pub version: u8,

    pub osabi: u8,
    pub abiversion: u8,

    #[doc(hidden)]
    pub _padding: [u8; 7],
}

c_enum! {
    /// The file class, identifying the size of addresses and offsets.
    #[repr(transparent)]
    #[derive(Copy, Clone, Default, Eq, PartialEq, AsBytes, FromBytes, FromZeroes, Unaligned)]
    pub enum Class: u8 {
        NONE = 0,
        ELF32 = 1,
        ELF64 = 2,
    }
}

c_enum! {
    /// The data encoding of the file.
    #[repr(transparent)]
    #[derive(Copy, Clone, Default, Eq, PartialEq, AsBytes, FromBytes, FromZeroes, Unaligned)]
    pub enum Data: u8 {
        NONE = 0,

        /// Two's complement, little-endian.
        LSB = 1,

        /// Two's complement, big-endian.
        MSB = 2,
    }
}

/// The ELF32 file header.
///
/// This sits at offset 0 of the file and points at the section header table.
#[repr(packed)]
#[derive(Copy, Clone, Debug, AsBytes, FromBytes, FromZeroes, Unaligned)]
pub struct FileHeader<O: ByteOrder> {
    pub ident: Ident,

    /// Object file type (relocatable, executable, shared object, ...).
    pub kind: U16<O>,
    pub machine: U16<O>,
    pub version: U32<O>,
    pub entry: U32<O>,

    /// File offset of the program header table.
    pub phoff: U32<O>,

    /// File offset of the section header table, or 0 if there is none.
    pub shoff: U32<O>,
    pub flags: U32<O>,

    /// Size of this header in bytes.
    pub ehsize: U16<O>,
    pub phentsize: U16<O>,
    pub phnum: U16<O>,

    /// Size of one entry of the section header table.
    pub shentsize: U16<O>,

    /// Number of entries in the section header table.
    ///
    /// If this is 0 while `shoff` is not then the real count is stored in the
    /// `size` field of section 0.
    pub shnum: U16<O>,

    /// Index of the section holding section names.
    ///
    /// If this is [`SHN_XINDEX`] then the real index is stored in the `link`
    /// field of section 0.
    pub shstrndx: U16<O>,
}

/// A single entry of the section header table.
#[repr(packed)]
#[derive(Copy, Clone, Debug, Default, AsBytes, FromBytes, FromZeroes, Unaligned)]
pub struct SectionHeader<O: ByteOrder> {
    /// Offset of the section name within the section name string table.
    pub name: U32<O>,

    /// The section type. See [`SectionType`].
    pub kind: U32<O>,
    pub flags: U32<O>,

    /// The address of the section when the program is loaded.
    pub addr: U32<O>,

    /// File offset of the section contents.
    pub offset: U32<O>,

    /// Size of the section in bytes.
    ///
    /// For [`SectionType::NOBITS`] sections this is the size in memory, the
    /// section occupies no bytes in the file.
    pub size: U32<O>,
    pub link: U32<O>,
    pub info: U32<O>,
    pub addralign: U32<O>,
    pub entsize: U32<O>,
}

c_enum! {
    /// The contents and semantics of a section.
    #[repr(transparent)]
    #[derive(Copy, Clone, Default, Eq, PartialEq, Hash)]
    pub enum SectionType: u32 {
        NULL = 0,
        PROGBITS = 1,
        SYMTAB = 2,
        STRTAB = 3,
        RELA = 4,
        HASH = 5,
        DYNAMIC = 6,
        NOTE = 7,
        NOBITS = 8,
        REL = 9,
    }
}
