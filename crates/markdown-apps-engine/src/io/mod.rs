//! Page storage on disk, addressed by paths relative to the pages directory.

use relative_path::{RelativePath, RelativePathBuf};
use std::fs;
use std::path::{Path, PathBuf};

use crate::editing::Page;

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("Page not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Page is not valid UTF-8: {0}")]
    InvalidUtf8(PathBuf),
    #[error("Invalid pages directory: {0}")]
    InvalidPagesDir(String),
}

/// Read a page's raw text
pub fn read_file(relative_path: &RelativePath, pages_root: &Path) -> Result<String, IoError> {
    let absolute_path = relative_path.to_path(pages_root);
    if !absolute_path.exists() {
        return Err(IoError::NotFound(absolute_path));
    }
    fs::read_to_string(&absolute_path).map_err(|err| match err.kind() {
        std::io::ErrorKind::InvalidData => IoError::InvalidUtf8(absolute_path.clone()),
        _ => IoError::Io(err),
    })
}

/// Write a page's text, creating parent directories as needed
pub fn write_file(
    relative_path: &RelativePath,
    pages_root: &Path,
    content: &str,
) -> Result<(), IoError> {
    let absolute_path = relative_path.to_path(pages_root);

    if let Some(parent) = absolute_path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(&absolute_path, content)?;
    log::debug!("Wrote {} bytes to {}", content.len(), absolute_path.display());
    Ok(())
}

pub fn read_page(relative_path: &RelativePath, pages_root: &Path) -> Result<Page, IoError> {
    read_file(relative_path, pages_root).map(|text| Page::from_text(&text))
}

pub fn write_page(relative_path: &RelativePath, pages_root: &Path, page: &Page) -> Result<(), IoError> {
    write_file(relative_path, pages_root, &page.text())
}

/// All `.md` files under `pages_root`, as sorted relative paths
pub fn scan_pages(pages_root: &Path) -> Result<Vec<RelativePathBuf>, IoError> {
    validate_pages_dir(pages_root)?;

    let mut files = Vec::new();
    scan_directory_recursive(pages_root, &mut files)?;

    let mut pages: Vec<RelativePathBuf> = files
        .iter()
        .filter_map(|file| {
            let relative = file.strip_prefix(pages_root).ok()?;
            RelativePathBuf::from_path(relative).ok()
        })
        .collect();
    pages.sort();
    Ok(pages)
}

fn scan_directory_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), IoError> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();

        if path.is_dir() {
            scan_directory_recursive(&path, files)?;
        } else if let Some(ext) = path.extension()
            && ext == "md"
        {
            files.push(path);
        }
    }

    Ok(())
}

pub fn validate_pages_dir(path: &Path) -> Result<(), IoError> {
    if !path.is_dir() {
        return Err(IoError::InvalidPagesDir(format!(
            "{} is not a directory",
            path.display()
        )));
    }

    Ok(())
}
