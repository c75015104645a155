//! Stream and file wrappers around [`decode`] and [`encode`].
//!
//! The format needs the whole buffer in memory (C-strings are found by
//! scanning for NUL), so readers are drained completely before decoding and
//! writers receive the finished encoding in one call.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use crate::decoder::decode;
use crate::encoder::encode;
use crate::error::Result;
use crate::model::Document;

/// Reads `reader` to the end and decodes the bytes.
pub fn read_from<R: Read>(mut reader: R) -> Result<Document> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    decode(&data)
}

/// Encodes `doc` and writes it to `writer`, then flushes.
///
/// Nothing is written if encoding fails.
pub fn write_to<W: Write>(doc: &Document, mut writer: W) -> Result<()> {
    let data = encode(doc)?;
    writer.write_all(&data)?;
    writer.flush()?;
    Ok(())
}

/// Reads and decodes the file at `path`.
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    let data = fs::read(path)?;
    decode(&data)
}

/// Encodes `doc` and writes it to `path`.
///
/// # Crash Safety
///
/// Writes to `<path>.tmp`, calls `sync_all()`, then atomically renames over
/// `path`. An encoding error leaves both files untouched.
pub fn write_file<P: AsRef<Path>>(path: P, doc: &Document) -> Result<()> {
    let path = path.as_ref();
    let data = encode(doc)?;

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = Path::new(&tmp_name);

    let raw_file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(tmp_path)?;
    let mut file = BufWriter::new(raw_file);
    file.write_all(&data)?;
    file.flush()?;
    file.into_inner().map_err(|e| e.into_error())?.sync_all()?;

    fs::rename(tmp_path, path)?;

    // Make the rename durable; not supported on every platform.
    if let Some(parent) = path.parent() {
        if let Ok(dir) = File::open(parent) {
            let _ = dir.sync_all();
        }
    }

    Ok(())
}
