//! Source format sniffing for uploaded documents.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Header information read from a source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFormat {
    /// PDF version (e.g., "1.7", "2.0")
    pub version: String,
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PDF {}", self.version)
    }
}

const PDF_MAGIC: &[u8] = b"%PDF-";
const VERSION_LEN: usize = 3;

/// Leading bytes some producers emit before the header (BOMs, whitespace).
const MAX_HEADER_OFFSET: usize = 1024;

/// Sniff the format of a file on disk.
pub fn sniff_path<P: AsRef<Path>>(path: P) -> Result<SourceFormat> {
    let file = File::open(path)?;
    let mut head = Vec::with_capacity(MAX_HEADER_OFFSET + 16);
    BufReader::new(file)
        .take((MAX_HEADER_OFFSET + 16) as u64)
        .read_to_end(&mut head)?;
    sniff_bytes(&head)
}

/// Sniff the format of an in-memory document.
///
/// The `%PDF-x.y` header may be preceded by up to 1 KiB of junk, which
/// viewers tolerate, so we do too.
pub fn sniff_bytes(data: &[u8]) -> Result<SourceFormat> {
    let window = &data[..data.len().min(MAX_HEADER_OFFSET + PDF_MAGIC.len() + VERSION_LEN)];
    let start = window
        .windows(PDF_MAGIC.len())
        .position(|w| w == PDF_MAGIC)
        .ok_or(Error::UnknownFormat)?;

    let version_start = start + PDF_MAGIC.len();
    let version_bytes = data
        .get(version_start..version_start + VERSION_LEN)
        .ok_or(Error::UnknownFormat)?;
    let version = String::from_utf8_lossy(version_bytes).to_string();

    match version.as_bytes() {
        [major, b'.', minor] if major.is_ascii_digit() && minor.is_ascii_digit() => {
            if *major > b'2' {
                return Err(Error::UnsupportedVersion(version));
            }
            Ok(SourceFormat { version })
        }
        _ => Err(Error::UnsupportedVersion(version)),
    }
}

/// Check whether bytes look like a PDF we can open.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    sniff_bytes(data).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_valid_header() {
        let format = sniff_bytes(b"%PDF-1.7\n%\xe2\xe3\xcf\xd3").unwrap();
        assert_eq!(format.version, "1.7");
        assert_eq!(format.to_string(), "PDF 1.7");
    }

    #[test]
    fn test_sniff_header_after_junk() {
        let mut data = vec![b' '; 12];
        data.extend_from_slice(b"%PDF-2.0\n");
        assert_eq!(sniff_bytes(&data).unwrap().version, "2.0");
    }

    #[test]
    fn test_sniff_rejects_other_formats() {
        assert!(matches!(
            sniff_bytes(b"<!DOCTYPE html>"),
            Err(Error::UnknownFormat)
        ));
        assert!(matches!(sniff_bytes(b"%PDF"), Err(Error::UnknownFormat)));
        assert!(matches!(sniff_bytes(b""), Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_sniff_rejects_bad_versions() {
        assert!(matches!(
            sniff_bytes(b"%PDF-x.y\n"),
            Err(Error::UnsupportedVersion(_))
        ));
        assert!(matches!(
            sniff_bytes(b"%PDF-9.0\n"),
            Err(Error::UnsupportedVersion(_))
        ));
    }

    #[test]
    fn test_is_pdf_bytes() {
        assert!(is_pdf_bytes(b"%PDF-1.4\n"));
        assert!(!is_pdf_bytes(b"Not a PDF"));
    }
}
