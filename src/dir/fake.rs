//! In-memory filesystem for tests

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io::{self, Cursor};

use super::fs::{DirHandle, Filesystem};

/// Directory that yields a fixed list of results, in the given order
pub struct FakeDir {
    pub entries: Vec<io::Result<OsString>>,
    pub close_error: Option<io::Error>,
}

impl FakeDir {
    pub fn with_names(names: &[&str]) -> Self {
        Self {
            entries: names.iter().map(|n| Ok(OsString::from(*n))).collect(),
            close_error: None,
        }
    }
}

impl DirHandle for FakeDir {
    fn entries(&mut self) -> impl Iterator<Item = io::Result<OsString>> + '_ {
        self.entries.drain(..)
    }

    fn close(self) -> io::Result<()> {
        self.close_error.map_or(Ok(()), Err)
    }
}

/// Paths mapped to directory listings or file contents
#[derive(Default)]
pub struct FakeFs {
    pub dirs: BTreeMap<String, Vec<&'static str>>,
    pub files: BTreeMap<String, Vec<u8>>,
}

impl Filesystem for FakeFs {
    type Dir = FakeDir;
    type File = Cursor<Vec<u8>>;

    fn open_dir(&self, path: &str) -> io::Result<FakeDir> {
        self.dirs
            .get(path)
            .map(|names| FakeDir::with_names(names))
            .ok_or_else(|| io::Error::from_raw_os_error(20))
    }

    fn open_file(&self, path: &str) -> io::Result<Cursor<Vec<u8>>> {
        self.files
            .get(path)
            .map(|data| Cursor::new(data.clone()))
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
    }
}
