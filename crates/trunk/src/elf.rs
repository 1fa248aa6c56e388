use core::iter::FusedIterator;
use core::mem;

use zerocopy::{FromBytes, LittleEndian};

use crate::raw::*;
use crate::ReadError;

/// The name of the section that firmware places its format strings in.
pub const TRUNK_SECTION: &str = ".trunk";

type Shdr = SectionHeader<LittleEndian>;

/// A parsed view of an ELF32 little-endian image.
///
/// Parsing only validates the file header and the bounds of the section
/// header table. Individual sections are validated when they are looked up.
#[derive(Copy, Clone, Debug)]
pub struct ElfImage<'a> {
    data: &'a [u8],
    shoff: usize,
    shentsize: usize,
    shnum: usize,
    shstrtab: &'a [u8],
}

impl<'a> ElfImage<'a> {
    pub fn parse(data: &'a [u8]) -> Result<Self, ReadError> {
        let header = FileHeader::<LittleEndian>::ref_from_prefix(data)
            .ok_or(ReadError::UnexpectedEof)?;

        if header.ident.magic != MAGIC {
            return Err(ReadError::BadMagic);
        }
        if header.ident.class != Class::ELF32 {
            return Err(ReadError::UnsupportedClass(header.ident.class.0));
        }
        if header.ident.data != Data::LSB {
            return Err(ReadError::UnsupportedEndian(header.ident.data.0));
        }

        let shentsize = header.shentsize.get();
        let mut image = Self {
            data,
            shoff: header.shoff.get() as usize,
            shentsize: shentsize as usize,
            shnum: header.shnum.get() as usize,
            shstrtab: &[],
        };

        // An image without a section header table simply has no sections.
        if image.shoff == 0 {
            image.shnum = 0;
            return Ok(image);
        }

        if image.shentsize < mem::size_of::<Shdr>() {
            return Err(ReadError::InvalidSectionHeaderSize(shentsize));
        }

        let mut shstrndx = u32::from(header.shstrndx.get());
        if image.shnum == 0 || shstrndx == u32::from(SHN_XINDEX) {
            let first = image.header(0)?;

            if image.shnum == 0 {
                image.shnum = first.size.get() as usize;
            }
            if shstrndx == u32::from(SHN_XINDEX) {
                shstrndx = first.link.get();
            }
        }

        let table_end = image
            .shnum
            .checked_mul(image.shentsize)
            .and_then(|len| len.checked_add(image.shoff))
            .ok_or(ReadError::UnexpectedEof)?;
        if table_end > data.len() {
            return Err(ReadError::UnexpectedEof);
        }

        if shstrndx != u32::from(SHN_UNDEF) {
            let index = shstrndx as usize;
            if index >= image.shnum {
                return Err(ReadError::InvalidStringTableIndex(shstrndx));
            }

            image.shstrtab = image.contents(index, image.header(index)?)?;
        }

        Ok(image)
    }

    /// The number of entries in the section header table, including the null
    /// section at index 0.
    pub fn num_sections(&self) -> usize {
        self.shnum
    }

    /// Get an iterator over all the sections in the image.
    pub fn sections(&self) -> SectionIter<'a> {
        SectionIter {
            image: *self,
            index: 0,
        }
    }

    /// Get the section at the given index of the section header table.
    pub fn section(&self, index: usize) -> Result<Section<'a>, ReadError> {
        if index >= self.shnum {
            return Err(ReadError::UnexpectedEof);
        }

        let header = self.header(index)?;
        Ok(Section {
            index,
            name: self.name(header),
            kind: SectionType(header.kind.get()),
            address: header.addr.get(),
            offset: header.offset.get(),
            size: header.size.get(),
            data: self.contents(index, header)?,
        })
    }

    /// Find the first section whose name is exactly `name`.
    ///
    /// Sections other than the matching one are not validated, so a
    /// malformed section elsewhere in the image does not prevent the lookup.
    pub fn section_by_name(&self, name: &str) -> Result<Section<'a>, ReadError> {
        for index in 0..self.shnum {
            let header = self.header(index)?;

            if self.name(header) == Some(name.as_bytes()) {
                return self.section(index);
            }
        }

        Err(ReadError::SectionNotFound(name.into()))
    }

    /// Find the section containing the trunk format strings.
    pub fn trunk_section(&self) -> Result<Section<'a>, ReadError> {
        self.section_by_name(TRUNK_SECTION)
    }

    fn header(&self, index: usize) -> Result<&'a Shdr, ReadError> {
        let offset = index
            .checked_mul(self.shentsize)
            .and_then(|offset| offset.checked_add(self.shoff))
            .ok_or(ReadError::UnexpectedEof)?;

        self.data
            .get(offset..)
            .and_then(Shdr::ref_from_prefix)
            .ok_or(ReadError::UnexpectedEof)
    }

    fn name(&self, header: &Shdr) -> Option<&'a [u8]> {
        let tail = self.shstrtab.get(header.name.get() as usize..)?;
        let len = tail.iter().position(|&b| b == 0)?;

        Some(&tail[..len])
    }

    fn contents(&self, index: usize, header: &Shdr) -> Result<&'a [u8], ReadError> {
        if SectionType(header.kind.get()) == SectionType::NOBITS {
            return Ok(&[]);
        }

        let start = header.offset.get() as usize;
        let len = header.size.get() as usize;

        start
            .checked_add(len)
            .and_then(|end| self.data.get(start..end))
            .ok_or(ReadError::SectionOutOfBounds { index })
    }
}

/// A single section of an [`ElfImage`].
#[derive(Copy, Clone, Debug)]
pub struct Section<'a> {
    index: usize,
    name: Option<&'a [u8]>,
    kind: SectionType,
    address: u32,
    offset: u32,
    size: u32,
    data: &'a [u8],
}

impl<'a> Section<'a> {
    /// The index of this section in the section header table.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The section name, if it could be resolved and is valid UTF-8.
    pub fn name(&self) -> Option<&'a str> {
        self.name.and_then(|name| core::str::from_utf8(name).ok())
    }

    /// The raw bytes of the section name, if it could be resolved.
    pub fn name_bytes(&self) -> Option<&'a [u8]> {
        self.name
    }

    pub fn kind(&self) -> SectionType {
        self.kind
    }

    /// The address the section is loaded at when the program runs.
    pub fn address(&self) -> u32 {
        self.address
    }

    /// The offset of the section contents within the image.
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// The size of the section in bytes.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// The contents of the section.
    ///
    /// This is empty for sections that occupy no space in the file.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }
}

/// Iterator over the sections of an [`ElfImage`].
#[derive(Clone, Debug)]
pub struct SectionIter<'a> {
    image: ElfImage<'a>,
    index: usize,
}

impl<'a> Iterator for SectionIter<'a> {
    type Item = Result<Section<'a>, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.image.shnum {
            return None;
        }

        let section = self.image.section(self.index);
        self.index += 1;
        Some(section)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.image.shnum.saturating_sub(self.index);
        (len, Some(len))
    }
}

impl ExactSizeIterator for SectionIter<'_> {}
impl FusedIterator for SectionIter<'_> {}
