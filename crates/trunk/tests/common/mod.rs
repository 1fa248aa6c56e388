#![allow(dead_code)]

use std::io::{self, Read};
use std::mem;

use elf_trunk::raw::{Class, Data, FileHeader, SectionHeader, SectionType, MAGIC};
use elf_trunk::{DecodeOptions, Decoder, LittleEndian, TrunkStrings};
use zerocopy::{AsBytes, FromZeroes, U16, U32};

/// Builds minimal ELF32 little-endian images with arbitrary sections.
#[derive(Default)]
pub struct ImageBuilder {
    sections: Vec<(String, SectionType, u32, Vec<u8>)>,
}

impl ImageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn section(mut self, name: &str, address: u32, data: &[u8]) -> Self {
        self.sections
            .push((name.into(), SectionType::PROGBITS, address, data.to_vec()));
        self
    }

    pub fn nobits(mut self, name: &str, address: u32, size: usize) -> Self {
        self.sections
            .push((name.into(), SectionType::NOBITS, address, vec![0; size]));
        self
    }

    /// Lay out the image as: file header, section contents, `.shstrtab`,
    /// section header table.
    pub fn build(&self) -> Vec<u8> {
        let mut image = vec![0u8; mem::size_of::<FileHeader<LittleEndian>>()];
        let mut shstrtab = vec![0u8];
        let mut headers = vec![SectionHeader::<LittleEndian>::new_zeroed()];

        for (name, kind, address, data) in &self.sections {
            let mut header = SectionHeader::<LittleEndian>::new_zeroed();
            header.name = U32::new(shstrtab.len() as u32);
            header.kind = U32::new(kind.0);
            header.addr = U32::new(*address);
            header.offset = U32::new(image.len() as u32);
            header.size = U32::new(data.len() as u32);
            header.addralign = U32::new(1);
            headers.push(header);

            shstrtab.extend_from_slice(name.as_bytes());
            shstrtab.push(0);

            if *kind != SectionType::NOBITS {
                image.extend_from_slice(data);
            }
        }

        let mut header = SectionHeader::<LittleEndian>::new_zeroed();
        header.name = U32::new(shstrtab.len() as u32);
        shstrtab.extend_from_slice(b".shstrtab\0");
        header.kind = U32::new(SectionType::STRTAB.0);
        header.offset = U32::new(image.len() as u32);
        header.size = U32::new(shstrtab.len() as u32);
        headers.push(header);
        image.extend_from_slice(&shstrtab);

        while image.len() % 4 != 0 {
            image.push(0);
        }

        let shoff = image.len();
        for header in &headers {
            image.extend_from_slice(header.as_bytes());
        }

        let mut fh = FileHeader::<LittleEndian>::new_zeroed();
        fh.ident.magic = MAGIC;
        fh.ident.class = Class::ELF32;
        fh.ident.data = Data::LSB;
        fh.ident.version = 1;
        fh.kind = U16::new(2);
        fh.machine = U16::new(40);
        fh.version = U32::new(1);
        fh.shoff = U32::new(shoff as u32);
        fh.ehsize = U16::new(mem::size_of::<FileHeader<LittleEndian>>() as u16);
        fh.shentsize = U16::new(mem::size_of::<SectionHeader<LittleEndian>>() as u16);
        fh.shnum = U16::new(headers.len() as u16);
        fh.shstrndx = U16::new((headers.len() - 1) as u16);

        image[..mem::size_of_val(&fh)].copy_from_slice(fh.as_bytes());
        image
    }
}

/// Offsets of the file header fields that tests patch.
pub const SHOFF: usize = 32;
pub const SHNUM: usize = 48;
pub const SHSTRNDX: usize = 50;

/// Offsets of section header fields, relative to the start of the header.
pub const SH_NAME: usize = 0;
pub const SH_SIZE: usize = 20;
pub const SH_LINK: usize = 24;

/// The file offset of the section header at `index`.
pub fn section_header(image: &[u8], index: usize) -> usize {
    let shoff = u32::from_le_bytes(image[SHOFF..SHOFF + 4].try_into().unwrap()) as usize;
    shoff + index * mem::size_of::<SectionHeader<LittleEndian>>()
}

pub fn patch_u16(image: &mut [u8], offset: usize, value: u16) {
    image[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}

pub fn patch_u32(image: &mut [u8], offset: usize, value: u32) {
    image[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

/// Hands out at most `chunk` bytes per call to `read`, like a slow serial
/// link would.
pub struct Chunked<'a> {
    data: &'a [u8],
    chunk: usize,
}

impl<'a> Chunked<'a> {
    pub fn new(data: &'a [u8], chunk: usize) -> Self {
        Self { data, chunk }
    }
}

impl Read for Chunked<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let len = self.chunk.min(buf.len()).min(self.data.len());
        buf[..len].copy_from_slice(&self.data[..len]);
        self.data = &self.data[len..];
        Ok(len)
    }
}

/// Decode `input` into a string, reading at most `chunk` bytes at a time.
pub fn decode_chunked(strings: &TrunkStrings, input: &[u8], chunk: usize) -> String {
    let mut out = Vec::new();
    Decoder::new(strings, Chunked::new(input, chunk), DecodeOptions::new())
        .run(&mut out)
        .expect("writing to a Vec cannot fail");

    String::from_utf8(out).expect("decoded output is not UTF-8")
}

pub fn decode(strings: &TrunkStrings, input: &[u8]) -> String {
    decode_chunked(strings, input, usize::MAX)
}
