//! Rendering of format strings with arguments pulled from a frame.
//!
//! The only placeholder is `%d`. Each one consumes one 32-bit word from the
//! frame, which is printed as a signed decimal number. A `%` followed by any
//! other character is printed as-is together with that character.

use std::io::{self, Write};

use crate::display::Escaped;
use crate::stream::WordSource;

const HIGHLIGHT: &str = "\x1b[7;31m";
const RESET: &str = "\x1b[0m";

/// How rendering a frame ended.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Rendered {
    /// Every placeholder received a value.
    Complete,

    /// The input ended before all placeholders received a value.
    ///
    /// The text up to the missing value has been written, followed by a
    /// diagnostic line.
    Truncated,
}

/// Render `format` to `out`, pulling one word from `words` for each `%d`.
///
/// If `highlight` is set then the insufficient-data diagnostic is wrapped in
/// terminal escape codes.
pub fn render<S, W>(format: &str, words: &mut S, out: &mut W, highlight: bool) -> io::Result<Rendered>
where
    S: WordSource + ?Sized,
    W: Write + ?Sized,
{
    let mut chars = format.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        if c != '%' {
            write!(out, "{c}")?;
            continue;
        }

        match chars.peek() {
            Some(&(_, 'd')) => {
                chars.next();

                match words.read_u32() {
                    // The device sends C `int`s, so the word is two's complement.
                    Some(value) => write!(out, "{}", value as i32)?,
                    None => {
                        insufficient_data(out, &format[idx..], highlight)?;
                        return Ok(Rendered::Truncated);
                    }
                }
            }
            Some(&(_, other)) => {
                chars.next();
                write!(out, "%{other}")?;
            }
            None => out.write_all(b"%")?,
        }
    }

    Ok(Rendered::Complete)
}

fn insufficient_data<W>(out: &mut W, remaining: &str, highlight: bool) -> io::Result<()>
where
    W: Write + ?Sized,
{
    if highlight {
        out.write_all(HIGHLIGHT.as_bytes())?;
    }

    write!(
        out,
        "!!! Not enough data for remaining format parameters. Remaining = `{}` !!!",
        Escaped(remaining)
    )?;

    if highlight {
        out.write_all(RESET.as_bytes())?;
    }

    writeln!(out)
}
