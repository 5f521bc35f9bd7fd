//! File selection for indexing.
//!
//! Walks a directory tree and yields every file whose name ends with one of
//! the requested extensions. A file is rejected when any component of its
//! path below the root is hidden (starts with `.`) or is exactly one of the
//! configured excluded directory names. Hidden and excluded directories are
//! pruned during the walk, so their contents are never visited.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// A file chosen for indexing, with the extension that matched it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub extension: String,
}

pub struct FileSelector {
    root: PathBuf,
    extensions: Vec<String>,
    excluded_dirs: Vec<String>,
}

impl FileSelector {
    pub fn new(root: impl Into<PathBuf>, extensions: &[String], excluded_dirs: &[String]) -> Self {
        let extensions = extensions
            .iter()
            .filter(|e| !e.trim().is_empty())
            .map(|e| normalize_extension(e))
            .collect();

        Self {
            root: root.into(),
            extensions,
            excluded_dirs: excluded_dirs.to_vec(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the tree and yield matching files.
    ///
    /// Each call starts a fresh walk; nothing is cached between calls.
    /// Entries within a directory are visited in file-name order.
    pub fn files(&self) -> impl Iterator<Item = SelectedFile> + '_ {
        WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| entry.depth() == 0 || !self.is_rejected(entry.file_name()))
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!("skipping unreadable path: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter_map(move |entry| self.select(entry))
    }

    fn select(&self, entry: DirEntry) -> Option<SelectedFile> {
        let extension = self.matching_extension(entry.path())?.to_string();
        Some(SelectedFile {
            path: entry.into_path(),
            extension,
        })
    }

    /// The first configured extension that the file name ends with.
    pub fn matching_extension(&self, path: &Path) -> Option<&str> {
        let name = path.file_name()?.to_string_lossy();
        self.extensions
            .iter()
            .find(|ext| name.ends_with(ext.as_str()))
            .map(|ext| ext.as_str())
    }

    fn is_rejected(&self, component: &OsStr) -> bool {
        let name = component.to_string_lossy();
        name.starts_with('.') || self.excluded_dirs.iter().any(|d| d.as_str() == name.as_ref())
    }
}

/// Ensure an extension carries its leading dot: `md` → `.md`.
pub fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim();
    if ext.starts_with('.') {
        ext.to_string()
    } else {
        format!(".{}", ext)
    }
}
