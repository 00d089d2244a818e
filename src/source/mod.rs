//! Page sources: turn a comic on disk into an ordered list of [`Page`]s.
//!
//! A comic is either a directory of images or a `.cbz`/`.zip` archive.
//! Pages are ordered by natural, case-insensitive filename comparison so
//! that `page2.png` precedes `page10.png`.

#[cfg(feature = "cbz")]
pub mod archive;

use std::cmp::Ordering;
use std::path::Path;

use walkdir::WalkDir;

use crate::error::ComicastError;
use crate::page::{ImageRef, Page};

/// File extensions accepted as page images (compared case-insensitively).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// File extensions treated as comic archives.
pub const ARCHIVE_EXTENSIONS: &[&str] = &["cbz", "zip"];

/// Loads the pages of a comic directory or archive, in reading order.
///
/// # Errors
/// Returns an error if the input cannot be read, an image's dimensions
/// cannot be determined, or no page images are found.
pub fn load_pages(path: &Path) -> Result<Vec<Page>, ComicastError> {
    let pages = if path.is_dir() {
        load_directory(path)?
    } else if has_extension(path, ARCHIVE_EXTENSIONS) {
        load_archive(path)?
    } else {
        return Err(ComicastError::UnsupportedFormat(format!(
            "'{}' (expected a directory or a .cbz/.zip archive)",
            path.display()
        )));
    };

    if pages.is_empty() {
        return Err(ComicastError::NoPages(path.to_path_buf()));
    }
    log::info!("loaded {} page(s) from {}", pages.len(), path.display());
    Ok(pages)
}

#[cfg(feature = "cbz")]
fn load_archive(path: &Path) -> Result<Vec<Page>, ComicastError> {
    archive::load_archive(path)
}

#[cfg(not(feature = "cbz"))]
fn load_archive(path: &Path) -> Result<Vec<Page>, ComicastError> {
    Err(ComicastError::UnsupportedFormat(format!(
        "'{}' (archive support requires the 'cbz' feature)",
        path.display()
    )))
}

/// Loads every page image below `root`, recursing into subdirectories.
///
/// Page ids are the paths relative to `root`, with `/` separators.
pub fn load_directory(root: &Path) -> Result<Vec<Page>, ComicastError> {
    let mut found: Vec<(String, std::path::PathBuf)> = Vec::new();

    for entry in WalkDir::new(root).follow_links(true) {
        let entry = entry.map_err(|err| ComicastError::Io(err.into()))?;
        if !entry.file_type().is_file() || !has_extension(entry.path(), IMAGE_EXTENSIONS) {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(root)
            .unwrap_or(entry.path())
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        found.push((relative, entry.path().to_path_buf()));
    }

    found.sort_by(|a, b| compare_filenames(&a.0, &b.0));

    found
        .into_iter()
        .map(|(id, path)| {
            let size = imagesize::size(&path).map_err(|source| ComicastError::ImageSize {
                path: path.display().to_string(),
                source,
            })?;
            Ok(Page::new(
                id,
                ImageRef::File { path },
                size.width as u32,
                size.height as u32,
            ))
        })
        .collect()
}

/// Natural, case-insensitive filename ordering with a case-sensitive tie-break.
pub fn compare_filenames(a: &str, b: &str) -> Ordering {
    natord::compare_ignore_case(a, b).then_with(|| natord::compare(a, b))
}

/// Returns true if the file name is a page image.
pub fn is_page_image(name: &str) -> bool {
    has_extension(Path::new(name), IMAGE_EXTENSIONS)
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)))
        .unwrap_or(false)
}
