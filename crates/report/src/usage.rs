//! Banner, usage text and the input readability check.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

const BANNER: &str = "Developer Challenge from PlayLab";

/// What an unreadable input path turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    File,
    Directory,
    Missing,
    Other,
}

impl FileKind {
    pub fn describe(&self) -> &'static str {
        match self {
            FileKind::File => "file",
            FileKind::Directory => "directory",
            FileKind::Missing => "Non Existant",
            FileKind::Other => "other",
        }
    }
}

/// `Ok` only for an existing regular file that can be opened for reading.
pub fn check_readable(path: &Path) -> Result<(), FileKind> {
    let meta = match fs::metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(FileKind::Missing),
        Err(_) => return Err(FileKind::Other),
    };

    if meta.is_dir() {
        return Err(FileKind::Directory);
    }
    if !meta.is_file() {
        return Err(FileKind::Other);
    }

    File::open(path).map(drop).map_err(|_| FileKind::File)
}

pub fn write_banner<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "{}", BANNER)?;
    writeln!(out, "{}", "-".repeat(BANNER.len()))?;
    writeln!(out)
}

pub fn write_usage<W: Write>(
    out: &mut W,
    path: &Path,
    default_log: &str,
    kind: FileKind,
) -> io::Result<()> {
    writeln!(out, "Usage:")?;
    writeln!(out, "{} <filename>", env!("CARGO_BIN_NAME"))?;
    writeln!(
        out,
        "<filename> is the name of a log file to process, defaults to {}",
        default_log
    )?;
    writeln!(out)?;
    writeln!(
        out,
        "Error: {} is {} and is unable to be read.  It can not be processed.",
        path.display(),
        kind.describe()
    )
}
