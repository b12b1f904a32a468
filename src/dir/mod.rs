//! Directory browsing endpoint
//!
//! Resolves a requested sub-path against the configured base directory,
//! then either lists the directory or returns the first [`MAX_READ`] bytes
//! of the file found there.
//!
//! The core is synchronous and bounded: a listing costs one enumeration of
//! one directory, a file costs at most `MAX_READ` bytes of reads and one seek.

mod error;
#[cfg(test)]
pub mod fake;
pub mod fs;
pub mod listing;
pub mod path;
pub mod reader;
mod render_mode;

pub use error::DirError;
pub use fs::{Filesystem, LocalFs};
pub use reader::MAX_READ;
pub use render_mode::RenderMode;

use crate::config::DirConfig;
use crate::logger;
use fs::Entry;

/// Content type of every file response
pub const FILE_CONTENT_TYPE: &str = "text/plain";

/// One request to the endpoint
#[derive(Debug, Clone, Copy)]
pub struct DirRequest<'a> {
    /// Sub-path after the mount prefix, empty for the base directory
    pub path: &'a str,
    pub mode: RenderMode,
}

/// Rendered body and its content type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirResponse {
    pub body: Vec<u8>,
    pub content_type: &'static str,
}

/// The endpoint, bound to a filesystem and a base directory
#[derive(Debug, Clone)]
pub struct DirService<F = LocalFs> {
    fs: F,
    base_dir: String,
    route_prefix: String,
    confine_to_base: bool,
}

impl DirService<LocalFs> {
    pub fn from_config(config: &DirConfig) -> Self {
        Self::new(LocalFs, config)
    }
}

impl<F: Filesystem> DirService<F> {
    pub fn new(fs: F, config: &DirConfig) -> Self {
        Self {
            fs,
            base_dir: config.base_dir.clone(),
            route_prefix: config.route_prefix.clone(),
            confine_to_base: config.confine_to_base,
        }
    }

    /// Serve one request: resolve, classify, then read or list.
    pub fn serve(&self, request: &DirRequest<'_>) -> Result<DirResponse, DirError> {
        let resolved = self.resolve(request.path)?;

        match fs::classify(&self.fs, &resolved)? {
            Entry::File(mut file) => {
                let content = reader::read_capped(&mut file, &resolved)?;
                if content.is_truncated() {
                    logger::log_debug(&format!("[DIR] '{resolved}' cut at {MAX_READ} bytes"));
                }
                Ok(DirResponse {
                    body: content.into_body(),
                    content_type: FILE_CONTENT_TYPE,
                })
            }
            Entry::Directory(dir) => {
                let names = listing::collect_entries(dir, &resolved)?;
                let page =
                    listing::render_listing(&names, request.path, &self.route_prefix, request.mode);
                Ok(DirResponse {
                    body: page.into_bytes(),
                    content_type: request.mode.content_type(),
                })
            }
        }
    }

    fn resolve(&self, requested: &str) -> Result<String, DirError> {
        let resolved = path::resolve(&self.base_dir, requested);
        if self.confine_to_base && !self.is_inside_base(&resolved) {
            return Err(DirError::OutsideBase { path: resolved });
        }
        Ok(resolved)
    }

    /// Lexical check first, then a symlink-aware one when both paths exist
    fn is_inside_base(&self, resolved: &str) -> bool {
        if !path::is_contained(&self.base_dir, resolved) {
            return false;
        }
        match (
            self.fs.canonicalize(&self.base_dir),
            self.fs.canonicalize(resolved),
        ) {
            (Ok(base), Ok(target)) => target.starts_with(base),
            _ => true,
        }
    }
}
