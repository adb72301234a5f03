//! Loaders for category/subcategory pair files.
//!
//! Accepts either a JSON array of `{"category", "subcategory"}` objects or
//! one such object per line (JSON Lines).

use datacleaner_core::model::CategoryAndSubcat;
use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairFormat {
    JsonArray,
    Jsonl,
}

/// Looks at the first non-whitespace byte of the file.
pub fn detect_format<P: AsRef<Path>>(path: P) -> std::io::Result<PairFormat> {
    let f = File::open(path)?;
    for byte in BufReader::new(f).bytes() {
        let b = byte?;
        if b.is_ascii_whitespace() {
            continue;
        }
        return Ok(if b == b'[' {
            PairFormat::JsonArray
        } else {
            PairFormat::Jsonl
        });
    }
    Ok(PairFormat::Jsonl)
}

pub fn load_pairs_from_path<P: AsRef<Path>>(path: P) -> std::io::Result<Vec<CategoryAndSubcat>> {
    match detect_format(&path)? {
        PairFormat::JsonArray => load_json_array(path),
        PairFormat::Jsonl => load_jsonl(path),
    }
}

fn invalid_data(e: serde_json::Error) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::InvalidData, e)
}

fn load_json_array<P: AsRef<Path>>(path: P) -> std::io::Result<Vec<CategoryAndSubcat>> {
    let mut s = String::new();
    File::open(path)?.read_to_string(&mut s)?;
    serde_json::from_str(&s).map_err(invalid_data)
}

fn load_jsonl<P: AsRef<Path>>(path: P) -> std::io::Result<Vec<CategoryAndSubcat>> {
    let reader = BufReader::new(File::open(path)?);
    let mut out = Vec::new();
    for line in reader.lines() {
        let l = line?;
        if l.trim().is_empty() {
            continue;
        }
        out.push(serde_json::from_str(&l).map_err(invalid_data)?);
    }
    Ok(out)
}
