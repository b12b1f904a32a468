//! Bounded file reading
//!
//! A file is read into memory up to [`MAX_READ`] bytes. Content past the cap
//! is never read; its size is learned from a single seek to the end and
//! reported in a trailing marker such as ` <100 more bytes>`.

use std::io::{self, Read, Seek, SeekFrom};

use super::error::DirError;

/// Maximum number of file bytes ever returned for one request (1 MiB).
pub const MAX_READ: usize = 1024 * 1024;

const CHUNK_SIZE: usize = 64 * 1024;

/// What is known about the bytes left after the cap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Truncation {
    /// EOF was reached within the cap
    Complete,
    /// The cap was hit and the file has this many more bytes
    Remaining(u64),
    /// The cap was hit but the file size could not be determined
    Unknown,
}

/// File bytes read for a single request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileContent {
    pub data: Vec<u8>,
    pub truncation: Truncation,
}

impl FileContent {
    pub const fn is_truncated(&self) -> bool {
        !matches!(self.truncation, Truncation::Complete)
    }

    /// Response body: the bytes read plus at most one truncation marker
    pub fn into_body(self) -> Vec<u8> {
        let mut body = self.data;
        match self.truncation {
            Truncation::Complete => {}
            Truncation::Remaining(n) => body.extend_from_slice(format!(" <{n} more bytes>").as_bytes()),
            Truncation::Unknown => body.extend_from_slice(b" <more bytes>"),
        }
        body
    }
}

/// Read at most [`MAX_READ`] bytes from `file`.
///
/// `path` is only used for error reporting.
pub fn read_capped<R: Read + Seek>(file: &mut R, path: &str) -> Result<FileContent, DirError> {
    read_with_limit(file, path, MAX_READ)
}

/// Read loop behind [`read_capped`] with an explicit cap.
///
/// Short reads are normal and keep the loop going; `Ok(0)` is EOF and
/// `Interrupted` is retried. Any other error aborts and drops what was read.
pub fn read_with_limit<R: Read + Seek>(
    file: &mut R,
    path: &str,
    limit: usize,
) -> Result<FileContent, DirError> {
    let mut data = Vec::with_capacity(limit.min(CHUNK_SIZE));
    let mut chunk = vec![0u8; limit.clamp(1, CHUNK_SIZE)];

    while data.len() < limit {
        let want = (limit - data.len()).min(chunk.len());
        match file.read(&mut chunk[..want]) {
            Ok(0) => break,
            Ok(n) => data.extend_from_slice(&chunk[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(source) => {
                return Err(DirError::Read {
                    path: path.to_string(),
                    source,
                })
            }
        }
    }

    let truncation = if data.len() < limit {
        Truncation::Complete
    } else {
        remaining_after(file, data.len() as u64)
    };

    Ok(FileContent { data, truncation })
}

fn remaining_after<R: Seek>(file: &mut R, consumed: u64) -> Truncation {
    match file.seek(SeekFrom::End(0)) {
        Ok(end) if end == consumed => Truncation::Complete,
        Ok(end) if end > consumed => Truncation::Remaining(end - consumed),
        // pipes and procfs-style files report sizes that say nothing useful
        Ok(_) | Err(_) => Truncation::Unknown,
    }
}
