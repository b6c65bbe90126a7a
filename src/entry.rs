//! Filesystem entry types
//!
//! A [`DirEntry`] is read once from the filesystem when its parent is
//! enumerated and never changes afterwards. The entry type describes the
//! link target (symlinks are followed for classification) while
//! [`DirEntry::is_symlink`] describes the entry itself, so a symlink to a
//! directory reports both `is_directory()` and `is_symlink()`.

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Type of filesystem entry, after following symlinks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryType {
    /// Regular file
    File,
    /// Directory
    Directory,
    /// Anything else: devices, sockets, FIFOs, dangling symlinks
    Other,
}

impl EntryType {
    /// Classify from a file type obtained with `fs::metadata`
    pub fn from_file_type(file_type: fs::FileType) -> Self {
        if file_type.is_dir() {
            EntryType::Directory
        } else if file_type.is_file() {
            EntryType::File
        } else {
            EntryType::Other
        }
    }

    /// Check if this is a regular file
    pub fn is_file(&self) -> bool {
        *self == EntryType::File
    }

    /// Check if this is a directory
    pub fn is_dir(&self) -> bool {
        *self == EntryType::Directory
    }
}

/// A filesystem entry discovered during the walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    path: PathBuf,
    entry_type: EntryType,
    is_symlink: bool,
}

impl DirEntry {
    /// Build an entry from already known attributes
    pub fn new(path: impl Into<PathBuf>, entry_type: EntryType, is_symlink: bool) -> Self {
        Self {
            path: path.into(),
            entry_type,
            is_symlink,
        }
    }

    /// Stat `path` directly (used for the walk root)
    pub fn from_path(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let is_symlink = fs::symlink_metadata(&path)?.file_type().is_symlink();
        let entry_type = target_type(&path, is_symlink)?;

        Ok(Self {
            path,
            entry_type,
            is_symlink,
        })
    }

    /// Build an entry from a `read_dir` item
    ///
    /// `read_dir` reports the type of the link itself; only symlinks need an
    /// extra `stat` to classify their target. A dangling link becomes
    /// [`EntryType::Other`].
    pub fn from_read_dir(entry: &fs::DirEntry) -> io::Result<Self> {
        let path = entry.path();
        let file_type = entry.file_type()?;
        let is_symlink = file_type.is_symlink();

        let entry_type = if is_symlink {
            target_type(&path, true).unwrap_or(EntryType::Other)
        } else {
            EntryType::from_file_type(file_type)
        };

        Ok(Self {
            path,
            entry_type,
            is_symlink,
        })
    }

    /// Full path as built from the walk root
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entry_type(&self) -> EntryType {
        self.entry_type
    }

    /// True if the entry (or its link target) is a directory
    pub fn is_directory(&self) -> bool {
        self.entry_type.is_dir()
    }

    /// True if the entry (or its link target) is a regular file
    pub fn is_regular_file(&self) -> bool {
        self.entry_type.is_file()
    }

    /// True if the entry itself is a symbolic link
    pub fn is_symlink(&self) -> bool {
        self.is_symlink
    }

    /// Final path component, used for name matching
    ///
    /// Falls back to the last raw component for paths such as `.` or `/`
    /// that have no file name. Names are not required to be UTF-8.
    pub fn name(&self) -> &OsStr {
        match self.path.file_name() {
            Some(name) => name,
            None => self
                .path
                .components()
                .next_back()
                .map_or(self.path.as_os_str(), |c| c.as_os_str()),
        }
    }
}

fn target_type(path: &Path, is_symlink: bool) -> io::Result<EntryType> {
    let metadata = if is_symlink {
        fs::metadata(path)?
    } else {
        fs::symlink_metadata(path)?
    };
    Ok(EntryType::from_file_type(metadata.file_type()))
}
