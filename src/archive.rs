//! Report archive construction
//!
//! Retrieved documents are packed into a single deflate-compressed ZIP held
//! in memory; the surrounding presentation layer decides what to do with the
//! bytes. Duplicate filenames cannot occur here — the batch loop already
//! collapsed duplicate VINs to their last retrieved document.

use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::Result;
use crate::types::RetrievedDocument;

/// Pack retrieved documents into ZIP bytes
///
/// Entries appear in the order given. An empty slice produces a valid,
/// empty archive — callers decide whether that is worth surfacing.
pub fn build_archive(documents: &[RetrievedDocument]) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for document in documents {
        writer.start_file(document.file_name.as_str(), options)?;
        writer.write_all(&document.bytes)?;
    }

    let cursor = writer.finish()?;
    Ok(cursor.into_inner())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn document(name: &str, bytes: &[u8]) -> RetrievedDocument {
        RetrievedDocument {
            file_name: name.to_string(),
            bytes: bytes.to_vec(),
        }
    }

    fn read_entry(archive_bytes: &[u8], name: &str) -> Vec<u8> {
        let mut archive = zip::ZipArchive::new(Cursor::new(archive_bytes.to_vec())).unwrap();
        let mut entry = archive.by_name(name).unwrap();
        let mut buf = Vec::new();
        entry.read_to_end(&mut buf).unwrap();
        buf
    }

    #[test]
    fn archive_round_trips_every_document() {
        let docs = vec![
            document("VIN1.pdf", b"%PDF one"),
            document("VIN2.html", b"<html>two</html>"),
        ];

        let bytes = build_archive(&docs).unwrap();
        let archive = zip::ZipArchive::new(Cursor::new(bytes.clone())).unwrap();
        assert_eq!(archive.len(), 2);

        assert_eq!(read_entry(&bytes, "VIN1.pdf"), b"%PDF one");
        assert_eq!(read_entry(&bytes, "VIN2.html"), b"<html>two</html>");
    }

    #[test]
    fn entries_are_deflate_compressed() {
        let docs = vec![document("VIN1.html", "repetition ".repeat(200).as_bytes())];
        let bytes = build_archive(&docs).unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let entry = archive.by_index(0).unwrap();
        assert_eq!(entry.compression(), CompressionMethod::Deflated);
        assert!(entry.compressed_size() < entry.size());
    }

    #[test]
    fn empty_input_produces_a_valid_empty_archive() {
        let bytes = build_archive(&[]).unwrap();
        let archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 0);
    }
}
