//! PDF header sniffing.
//!
//! The lopdf loader accepts a fair amount of garbage before giving up, so the
//! backend checks the `%PDF-x.y` header first to report non-PDF input early.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const PDF_MAGIC: &[u8] = b"%PDF-";
const VERSION_LEN: usize = 3;
const HEADER_READ_LEN: u64 = 16;

/// Version declared in a PDF header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfHeader {
    /// PDF version (e.g., "1.7", "2.0")
    pub version: String,
}

impl std::fmt::Display for PdfHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PDF {}", self.version)
    }
}

/// Read and validate the header of a file on disk.
pub fn read_header<P: AsRef<Path>>(path: P) -> Result<PdfHeader> {
    let mut head = Vec::with_capacity(HEADER_READ_LEN as usize);
    File::open(path)?
        .take(HEADER_READ_LEN)
        .read_to_end(&mut head)?;
    parse_header(&head)
}

/// Validate the header at the start of `data`.
fn parse_header(data: &[u8]) -> Result<PdfHeader> {
    let rest = data.strip_prefix(PDF_MAGIC).ok_or(Error::UnknownFormat)?;
    let version_bytes = rest.get(..VERSION_LEN).ok_or(Error::UnknownFormat)?;
    let version = String::from_utf8_lossy(version_bytes).to_string();

    if !is_valid_version(&version) {
        return Err(Error::UnsupportedVersion(version));
    }

    Ok(PdfHeader { version })
}

fn is_valid_version(version: &str) -> bool {
    let bytes = version.as_bytes();
    bytes.len() == 3 && bytes[0].is_ascii_digit() && bytes[1] == b'.' && bytes[2].is_ascii_digit()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_header() {
        let header = parse_header(b"%PDF-1.7\n%\xe2\xe3\xcf\xd3").unwrap();
        assert_eq!(header.version, "1.7");
        assert_eq!(header.to_string(), "PDF 1.7");
    }

    #[test]
    fn test_parse_pdf_2_0() {
        assert_eq!(parse_header(b"%PDF-2.0\n").unwrap().version, "2.0");
    }

    #[test]
    fn test_parse_not_a_pdf() {
        let result = parse_header(b"<!DOCTYPE html>");
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_parse_truncated() {
        assert!(matches!(parse_header(b"%PDF"), Err(Error::UnknownFormat)));
        assert!(matches!(parse_header(b"%PDF-1"), Err(Error::UnknownFormat)));
        assert!(matches!(parse_header(b""), Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_parse_bad_version() {
        let result = parse_header(b"%PDF-x.y\n");
        assert!(matches!(result, Err(Error::UnsupportedVersion(v)) if v == "x.y"));
    }

    #[test]
    fn test_read_header_rejects_html() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.pdf");
        std::fs::write(&path, "<!DOCTYPE html>").unwrap();
        assert!(matches!(read_header(&path), Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_read_header_missing_file() {
        let result = read_header("definitely/not/here.pdf");
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
