//! Filesystem access seam and entry classification
//!
//! [`Filesystem`] is what the endpoint needs from the host: open a directory
//! for enumeration, open a file for reading. [`LocalFs`] backs it with the
//! real disk; tests substitute in-memory fakes.

use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek};
use std::path::PathBuf;

use super::error::DirError;

/// An open directory whose entries can be enumerated once.
pub trait DirHandle {
    /// Lazy, one-shot sequence of entry names, including `.` and `..`.
    ///
    /// Order is unspecified. Once exhausted it stays exhausted.
    fn entries(&mut self) -> impl Iterator<Item = io::Result<OsString>> + '_;

    /// Release the handle, reporting any error from the close itself.
    fn close(self) -> io::Result<()>;
}

/// Read-only view of the host filesystem.
pub trait Filesystem {
    type Dir: DirHandle;
    type File: Read + Seek;

    fn open_dir(&self, path: &str) -> io::Result<Self::Dir>;

    /// Open for reading only. Implementations must not leak the descriptor
    /// into child processes.
    fn open_file(&self, path: &str) -> io::Result<Self::File>;

    /// Resolve symlinks; used by the containment check only.
    fn canonicalize(&self, path: &str) -> io::Result<PathBuf> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            format!("canonicalize not supported for {path}"),
        ))
    }
}

/// Outcome of classifying a resolved path
#[derive(Debug)]
pub enum Entry<D, F> {
    Directory(D),
    File(F),
}

/// Try the path as a directory first and fall back to a plain file.
///
/// At most one directory-open, and the file-open only after it failed.
pub fn classify<FS: Filesystem>(
    fs: &FS,
    path: &str,
) -> Result<Entry<FS::Dir, FS::File>, DirError> {
    match fs.open_dir(path) {
        Ok(dir) => Ok(Entry::Directory(dir)),
        Err(_) => fs
            .open_file(path)
            .map(Entry::File)
            .map_err(|source| DirError::Open {
                path: path.to_string(),
                source,
            }),
    }
}

/// The host's real filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFs;

/// Directory opened on [`LocalFs`]
///
/// `std::fs::read_dir` skips `.` and `..`, so they are yielded first to keep
/// the listing complete.
#[derive(Debug)]
pub struct LocalDir {
    dots: std::array::IntoIter<&'static str, 2>,
    inner: fs::ReadDir,
}

impl DirHandle for LocalDir {
    fn entries(&mut self) -> impl Iterator<Item = io::Result<OsString>> + '_ {
        let dots = self.dots.by_ref().map(|name| Ok(OsString::from(name)));
        let names = self
            .inner
            .by_ref()
            .map(|entry| entry.map(|e| e.file_name()));
        dots.chain(names)
    }

    fn close(self) -> io::Result<()> {
        // closedir errors are swallowed by ReadDir's Drop
        drop(self.inner);
        Ok(())
    }
}

impl Filesystem for LocalFs {
    type Dir = LocalDir;
    type File = File;

    fn open_dir(&self, path: &str) -> io::Result<LocalDir> {
        Ok(LocalDir {
            dots: [".", ".."].into_iter(),
            inner: fs::read_dir(path)?,
        })
    }

    fn open_file(&self, path: &str) -> io::Result<File> {
        let mut options = OpenOptions::new();
        options.read(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.custom_flags(libc::O_NONBLOCK | libc::O_CLOEXEC);
        }
        options.open(path)
    }

    fn canonicalize(&self, path: &str) -> io::Result<PathBuf> {
        fs::canonicalize(path)
    }
}
