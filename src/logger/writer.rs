//! Log writer module
//!
//! Process-wide sinks for the two log streams. The access stream (also used
//! for info lines) goes to stdout or a file, the error stream to stderr or a
//! file. Either can be swapped at runtime, which is how SIGUSR1 log rotation
//! works.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

static LOG_WRITER: OnceLock<LogWriter> = OnceLock::new();

/// Where one stream ends up
enum Sink {
    Stdout,
    Stderr,
    File(File),
}

impl Sink {
    /// Open `path` for appending, or use `console` when no path is configured
    fn open(path: Option<&str>, console: Self) -> io::Result<Self> {
        match path {
            Some(p) => open_log_file(p).map(Self::File),
            None => Ok(console),
        }
    }

    fn write_line(&mut self, message: &str) {
        match self {
            Self::Stdout => println!("{message}"),
            Self::Stderr => eprintln!("{message}"),
            // write errors are dropped, the request still completes
            Self::File(file) => {
                let _ = writeln!(file, "{message}");
            }
        }
    }
}

/// The access and error streams, each behind its own lock
pub struct LogWriter {
    access: Mutex<Sink>,
    error: Mutex<Sink>,
}

impl LogWriter {
    fn new(access_log_file: Option<&str>, error_log_file: Option<&str>) -> io::Result<Self> {
        Ok(Self {
            access: Mutex::new(Sink::open(access_log_file, Sink::Stdout)?),
            error: Mutex::new(Sink::open(error_log_file, Sink::Stderr)?),
        })
    }

    pub fn write_access(&self, message: &str) {
        lock(&self.access).write_line(message);
    }

    pub fn write_error(&self, message: &str) {
        lock(&self.error).write_line(message);
    }

    /// Info lines share the access stream
    pub fn write_info(&self, message: &str) {
        self.write_access(message);
    }

    /// Point the access stream at `path` (or stdout), reopening the file
    pub fn set_access_log_file(&self, path: Option<&str>) -> io::Result<()> {
        let sink = Sink::open(path, Sink::Stdout)?;
        *lock(&self.access) = sink;
        Ok(())
    }

    /// Point the error stream at `path` (or stderr), reopening the file
    pub fn set_error_log_file(&self, path: Option<&str>) -> io::Result<()> {
        let sink = Sink::open(path, Sink::Stderr)?;
        *lock(&self.error) = sink;
        Ok(())
    }
}

/// A panicking writer must not silence logging for the rest of the process
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Open or create a log file for appending, creating missing parent directories
fn open_log_file(path: &str) -> io::Result<File> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}

/// Install the global writer; fails if a log file cannot be opened or it is
/// already installed.
pub fn init(access_log_file: Option<&str>, error_log_file: Option<&str>) -> io::Result<()> {
    let writer = LogWriter::new(access_log_file, error_log_file)?;
    LOG_WRITER.set(writer).map_err(|_| {
        io::Error::new(
            io::ErrorKind::AlreadyExists,
            "Log writer already initialized",
        )
    })
}

/// Get the global log writer, `None` before `init()`
pub fn get() -> Option<&'static LogWriter> {
    LOG_WRITER.get()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_sinks_append() {
        let temp = TempDir::new().unwrap();
        let access = temp.path().join("logs/access.log");
        let error = temp.path().join("logs/error.log");
        std::fs::create_dir_all(temp.path().join("logs")).unwrap();
        std::fs::write(&access, "earlier\n").unwrap();

        let writer =
            LogWriter::new(Some(access.to_str().unwrap()), Some(error.to_str().unwrap())).unwrap();
        writer.write_access("GET /dir");
        writer.write_info("started");
        writer.write_error("[WARN] oops");

        assert_eq!(
            std::fs::read_to_string(&access).unwrap(),
            "earlier\nGET /dir\nstarted\n"
        );
        assert_eq!(std::fs::read_to_string(&error).unwrap(), "[WARN] oops\n");
    }

    #[test]
    fn test_missing_parent_dirs_are_created() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("a/b/c/error.log");

        let writer = LogWriter::new(None, Some(nested.to_str().unwrap())).unwrap();
        writer.write_error("x");
        assert!(nested.exists());
    }

    #[test]
    fn test_rotated_file_is_recreated_on_reopen() {
        let temp = TempDir::new().unwrap();
        let log = temp.path().join("access.log");
        let rotated = temp.path().join("access.log.1");
        let log_str = log.to_str().unwrap();

        let writer = LogWriter::new(Some(log_str), None).unwrap();
        writer.write_access("one");
        std::fs::rename(&log, &rotated).unwrap();
        writer.write_access("two");
        writer.set_access_log_file(Some(log_str)).unwrap();
        writer.write_access("three");

        assert_eq!(std::fs::read_to_string(&rotated).unwrap(), "one\ntwo\n");
        assert_eq!(std::fs::read_to_string(&log).unwrap(), "three\n");
    }
}
