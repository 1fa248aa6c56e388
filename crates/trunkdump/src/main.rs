use std::fs::File;
use std::io::{self, BufWriter, IsTerminal};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use elf_trunk::{DecodeOptions, Decoder, ElfImage, Escaped, TrunkStrings};

/// Decode trunk log frames using the format strings embedded in a firmware
/// image.
///
/// Frames are read from standard input (or --input) and the decoded log text
/// is written to standard output. The extracted string table is listed on
/// standard error.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// ELF image of the firmware that produced the logs.
    elf: PathBuf,

    /// Read frames from a file instead of standard input.
    #[arg(long, short)]
    input: Option<PathBuf>,

    /// Do not list the extracted strings before decoding.
    #[arg(long, short)]
    quiet: bool,

    /// When to highlight diagnostics in the decoded output.
    #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
    color: ColorChoice,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ColorChoice {
    /// Highlight when standard output is a terminal.
    Auto,
    Always,
    Never,
}

fn main() -> anyhow::Result<ExitCode> {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            return Ok(ExitCode::from(1));
        }
        Err(e) => e.exit(),
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let strings = load_strings(&args.elf)?;

    if !args.quiet {
        for entry in &strings {
            eprintln!(
                "Found string at addr {:04x}: `{}`",
                entry.address(),
                Escaped(entry.text())
            );
        }

        eprintln!("Loaded {} strings.", strings.len());
        if io::stderr().is_terminal() {
            eprintln!("\x1b[100;1m--- LOGS START ---\x1b[0m");
        } else {
            eprintln!("--- LOGS START ---");
        }
    }

    let color = match args.color {
        ColorChoice::Auto => io::stdout().is_terminal(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };
    let options = DecodeOptions::new().color(color);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    let result = match &args.input {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open `{}`", path.display()))?;
            Decoder::new(&strings, file, options).run(&mut out)
        }
        None => Decoder::new(&strings, io::stdin().lock(), options).run(&mut out),
    };

    match result {
        Ok(()) => Ok(ExitCode::SUCCESS),
        // The reader of our output went away, there is nobody left to log to.
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(ExitCode::SUCCESS),
        Err(e) => Err(e).context("failed to write decoded logs"),
    }
}

/// Extract the format string table from the image at `path`.
///
/// The image is only mapped for as long as it takes to copy the strings out.
fn load_strings(path: &Path) -> anyhow::Result<TrunkStrings> {
    let file = File::open(path).with_context(|| format!("failed to open `{}`", path.display()))?;
    let data = unsafe { memmap2::Mmap::map(&file) }
        .with_context(|| format!("failed to mmap `{}`", path.display()))?;
    let image = ElfImage::parse(&*data)
        .with_context(|| format!("failed to parse `{}`", path.display()))?;
    let section = image
        .trunk_section()
        .with_context(|| format!("failed to load format strings from `{}`", path.display()))?;

    log::debug!(
        "{} section: index {}, address {:#010x}, {} bytes at file offset {:#x}",
        elf_trunk::TRUNK_SECTION,
        section.index(),
        section.address(),
        section.size(),
        section.offset()
    );

    Ok(TrunkStrings::from_section(&section))
}
