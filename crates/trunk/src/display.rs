//! Display helpers for printing format strings to a terminal.

use core::fmt::{self, Write};

/// Displays a string with control characters escaped.
///
/// Newlines and carriage returns are shown as `\n` and `\r`, every other
/// character below `0x1F` as a `\xNN` hex escape. Everything else is written
/// unchanged.
#[derive(Copy, Clone, Debug)]
pub struct Escaped<'a>(pub &'a str);

impl fmt::Display for Escaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.0.chars() {
            match c {
                '\n' => f.write_str("\\n")?,
                '\r' => f.write_str("\\r")?,
                c if (c as u32) < 0x1F => write!(f, "\\x{:02x}", c as u32)?,
                c => f.write_char(c)?,
            }
        }

        Ok(())
    }
}
