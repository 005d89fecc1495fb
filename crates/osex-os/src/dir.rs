//! Directory operations and entry metadata.

use osex_common::{EntryType, Error, Result};
use std::fs::{self, File, Metadata, ReadDir};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Type and size of a filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryInfo {
    pub kind: EntryType,
    pub size: u64,
}

impl From<&Metadata> for EntryInfo {
    fn from(metadata: &Metadata) -> Self {
        let kind = if metadata.is_dir() {
            EntryType::Directory
        } else {
            EntryType::File
        };
        Self {
            kind,
            size: metadata.len(),
        }
    }
}

/// One entry yielded by [`dir`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub kind: EntryType,
    pub size: u64,
}

/// Changes the working directory of the process.
pub fn chdir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    debug!("Changing directory to {}", path.display());
    std::env::set_current_dir(path).map_err(|e| Error::native_io("chdir", &e))
}

/// Creates a single directory.
pub fn mkdir(path: impl AsRef<Path>) -> Result<()> {
    fs::create_dir(path.as_ref()).map_err(|e| Error::native_io("mkdir", &e))
}

/// The working directory of the process.
pub fn currentdir() -> Result<PathBuf> {
    std::env::current_dir().map_err(|e| Error::native_io("currentdir", &e))
}

/// Lists the entries of the directory at `path`.
///
/// `.` and `..` are never yielded. The iterator is single pass.
pub fn dir(path: impl AsRef<Path>) -> Result<DirIter> {
    let path = path.as_ref();
    let entries = fs::read_dir(path).map_err(|e| Error::native_io("dir", &e))?;
    Ok(DirIter {
        entries: Some(entries),
    })
}

/// Iterator over a directory, closed once exhausted or on error.
#[derive(Debug)]
pub struct DirIter {
    entries: Option<ReadDir>,
}

impl DirIter {
    /// Releases the underlying directory handle early.
    pub fn close(&mut self) {
        self.entries = None;
    }

    pub fn is_closed(&self) -> bool {
        self.entries.is_none()
    }

    fn read_entry(entry: fs::DirEntry) -> Result<DirEntry> {
        let name = entry.file_name().to_string_lossy().into_owned();
        // Follows symlinks, like `dirent` on a path.
        let metadata = fs::metadata(entry.path()).map_err(|e| Error::native_io("dir", &e))?;
        let info = EntryInfo::from(&metadata);
        Ok(DirEntry {
            name,
            kind: info.kind,
            size: info.size,
        })
    }
}

impl Iterator for DirIter {
    type Item = Result<DirEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        let entries = self.entries.as_mut()?;
        loop {
            match entries.next() {
                None => {
                    self.entries = None;
                    return None;
                }
                Some(Err(e)) => {
                    self.entries = None;
                    return Some(Err(Error::native_io("dir", &e)));
                }
                Some(Ok(entry)) => {
                    let name = entry.file_name();
                    if name == "." || name == ".." {
                        continue;
                    }
                    return Some(Self::read_entry(entry));
                }
            }
        }
    }
}

/// What [`dirent`] inspects: a path, or an open file.
#[derive(Debug, Clone, Copy)]
pub enum DirentTarget<'a> {
    Path(&'a Path),
    File(&'a File),
}

impl<'a> From<&'a Path> for DirentTarget<'a> {
    fn from(path: &'a Path) -> Self {
        DirentTarget::Path(path)
    }
}

impl<'a> From<&'a str> for DirentTarget<'a> {
    fn from(path: &'a str) -> Self {
        DirentTarget::Path(Path::new(path))
    }
}

impl<'a> From<&'a PathBuf> for DirentTarget<'a> {
    fn from(path: &'a PathBuf) -> Self {
        DirentTarget::Path(path.as_path())
    }
}

impl<'a> From<&'a File> for DirentTarget<'a> {
    fn from(file: &'a File) -> Self {
        DirentTarget::File(file)
    }
}

/// Type and size of a path (following symlinks) or of an open file.
pub fn dirent<'a>(target: impl Into<DirentTarget<'a>>) -> Result<EntryInfo> {
    let metadata = match target.into() {
        DirentTarget::Path(path) => fs::metadata(path),
        DirentTarget::File(file) => file.metadata(),
    }
    .map_err(|e| Error::native_io("dirent", &e))?;
    Ok(EntryInfo::from(&metadata))
}
