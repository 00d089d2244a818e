//! `.cbz`/`.zip` comic archives.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use zip::result::ZipError;
use zip::ZipArchive;

use super::{compare_filenames, is_page_image};
use crate::error::ComicastError;
use crate::page::{ImageRef, Page};

type Archive = ZipArchive<BufReader<File>>;

fn open(path: &Path) -> Result<Archive, ComicastError> {
    let file = File::open(path).map_err(ComicastError::Io)?;
    ZipArchive::new(BufReader::new(file)).map_err(|source| ComicastError::Archive {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads the page images stored in an archive, in reading order.
///
/// Directory entries and macOS resource-fork folders are skipped.
pub fn load_archive(path: &Path) -> Result<Vec<Page>, ComicastError> {
    let mut archive = open(path)?;

    let mut names: Vec<String> = archive
        .file_names()
        .filter(|name| !name.ends_with('/') && !name.starts_with("__MACOSX/"))
        .filter(|name| is_page_image(name))
        .map(str::to_string)
        .collect();
    names.sort_by(|a, b| compare_filenames(a, b));

    let mut pages = Vec::with_capacity(names.len());
    for name in names {
        let bytes = read_entry(&mut archive, path, &name)?;
        let size = imagesize::blob_size(&bytes).map_err(|source| ComicastError::ImageSize {
            path: format!("{}:{}", path.display(), name),
            source,
        })?;
        pages.push(Page::new(
            name.clone(),
            ImageRef::ArchiveEntry {
                archive: path.to_path_buf(),
                entry: name,
            },
            size.width as u32,
            size.height as u32,
        ));
    }
    Ok(pages)
}

/// Reads one entry from an archive. Returns `Ok(None)` if it does not exist.
pub fn read_archive_entry(path: &Path, entry: &str) -> Result<Option<Vec<u8>>, ComicastError> {
    let mut archive = open(path)?;
    match read_entry(&mut archive, path, entry) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(ComicastError::Archive {
            source: ZipError::FileNotFound,
            ..
        }) => Ok(None),
        Err(err) => Err(err),
    }
}

fn read_entry(archive: &mut Archive, path: &Path, entry: &str) -> Result<Vec<u8>, ComicastError> {
    let mut file = archive
        .by_name(entry)
        .map_err(|source| ComicastError::Archive {
            path: path.to_path_buf(),
            source,
        })?;
    // The declared size is untrusted; let the buffer grow with the data.
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    // 1x1 PNG header, enough for imagesize.
    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        bytes.extend_from_slice(&13u32.to_be_bytes());
        bytes.extend_from_slice(b"IHDR");
        bytes.extend_from_slice(&width.to_be_bytes());
        bytes.extend_from_slice(&height.to_be_bytes());
        bytes.extend_from_slice(&[8, 6, 0, 0, 0]);
        bytes.extend_from_slice(&[0, 0, 0, 0]);
        bytes
    }

    fn write_archive(path: &Path, entries: &[(&str, Vec<u8>)]) {
        let file = File::create(path).expect("create archive");
        let mut zip = zip::ZipWriter::new(file);
        for (name, bytes) in entries {
            zip.start_file(*name, SimpleFileOptions::default())
                .expect("start entry");
            zip.write_all(bytes).expect("write entry");
        }
        zip.finish().expect("finish archive");
    }

    #[test]
    fn test_load_archive_orders_pages_naturally() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("comic.cbz");
        write_archive(
            &path,
            &[
                ("page10.png", png_bytes(10, 20)),
                ("page2.png", png_bytes(30, 40)),
                ("page2.json", br#"{"bubbles":[]}"#.to_vec()),
                ("__MACOSX/page1.png", png_bytes(1, 1)),
            ],
        );

        let pages = load_archive(&path).expect("load archive");
        let ids: Vec<&str> = pages.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["page2.png", "page10.png"]);
        assert_eq!((pages[0].width, pages[0].height), (30, 40));
        assert!(pages.iter().all(|p| !p.analyzed));
    }

    #[test]
    fn test_read_archive_entry() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("comic.cbz");
        write_archive(&path, &[("page1.json", b"{}".to_vec())]);

        let found = read_archive_entry(&path, "page1.json").expect("read entry");
        assert_eq!(found.as_deref(), Some(&b"{}"[..]));
        let missing = read_archive_entry(&path, "page2.json").expect("read missing");
        assert!(missing.is_none());
    }

    #[test]
    fn test_read_entry_ignores_declared_size() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("comic.cbz");
        let file = File::create(&path).expect("create archive");
        let mut zip = zip::ZipWriter::new(file);
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        zip.start_file("page1.json", options).expect("start entry");
        zip.write_all(b"{}").expect("write entry");
        zip.finish().expect("finish archive");

        // Claim an uncompressed size of almost 4 GiB in both headers.
        let mut bytes = std::fs::read(&path).expect("read archive");
        let huge = (u32::MAX - 1).to_le_bytes();
        for (signature, offset) in [(b"PK\x03\x04", 22), (b"PK\x01\x02", 24)] {
            let at = bytes
                .windows(4)
                .position(|w| w == signature)
                .expect("header signature");
            bytes[at + offset..at + offset + 4].copy_from_slice(&huge);
        }
        std::fs::write(&path, &bytes).expect("rewrite archive");

        match read_archive_entry(&path, "page1.json") {
            Ok(Some(found)) => assert_eq!(found, b"{}"),
            Ok(None) => panic!("entry should exist"),
            Err(err) => assert!(matches!(err, ComicastError::Archive { .. } | ComicastError::Io(_))),
        }
    }
}
