use alloc::string::String;
use alloc::vec::Vec;
use core::slice;

use crate::display::Escaped;
use crate::elf::Section;

/// A format string together with the address it is loaded at on the device.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct TrunkString {
    address: u32,
    text: String,
}

impl TrunkString {
    /// The runtime address of the first byte of the string.
    ///
    /// This is the value the device sends at the start of a frame.
    pub fn address(&self) -> u32 {
        self.address
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// All format strings of a firmware image, sorted by address.
#[derive(Clone, Debug, Default)]
pub struct TrunkStrings {
    entries: Vec<TrunkString>,
}

impl TrunkStrings {
    /// Build the table from the contents of a `.trunk` section.
    pub fn from_section(section: &Section<'_>) -> Self {
        Self::extract(section.data(), section.address())
    }

    /// Build the table from the raw bytes of a section loaded at `base`.
    ///
    /// Every non-empty NUL-terminated run of bytes becomes one entry whose
    /// address is `base` plus the offset of the run within `data`. Empty runs
    /// and any bytes after the last NUL are skipped.
    pub fn extract(data: &[u8], base: u32) -> Self {
        let mut entries = Vec::new();
        let mut rest = data;
        let mut offset = 0usize;

        while let Some(len) = rest.iter().position(|&b| b == 0) {
            if len != 0 {
                let address = u32::try_from(offset)
                    .ok()
                    .and_then(|offset| base.checked_add(offset));

                match address {
                    Some(address) => {
                        let text = String::from_utf8_lossy(&rest[..len]).into_owned();
                        log::debug!("found string at {address:#06x}: `{}`", Escaped(&text));
                        entries.push(TrunkString { address, text });
                    }
                    None => log::warn!(
                        "dropping string at section offset {offset:#x}: address does not fit in 32 \
                         bits"
                    ),
                }
            }

            offset += len + 1;
            rest = &rest[len + 1..];
        }

        if !rest.is_empty() {
            log::debug!("ignoring {} unterminated bytes at the end of the section", rest.len());
        }

        entries.sort_by_key(|entry| entry.address);
        log::debug!("loaded {} trunk strings", entries.len());

        Self { entries }
    }

    /// Find the format string that starts exactly at `address`.
    pub fn lookup(&self, address: u32) -> Option<&str> {
        self.entries
            .binary_search_by_key(&address, |entry| entry.address)
            .ok()
            .map(|index| self.entries[index].text())
    }

    /// The number of strings in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get an iterator over the entries, in ascending address order.
    pub fn iter(&self) -> slice::Iter<'_, TrunkString> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a TrunkStrings {
    type Item = &'a TrunkString;
    type IntoIter = slice::Iter<'a, TrunkString>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
