//! Source reader with compile-time limits and global logging integration

use crate::config::compile_time::file_processing::{MAX_FILE_SIZE, MAX_LINE_COUNT};
use crate::logging::{codes, Code};
use crate::{log_debug, log_error};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Source reading errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Permission denied: {path}")]
    PermissionDenied { path: String },

    #[error("File too large: {size} bytes (max: {max_size})")]
    FileTooLarge { size: u64, max_size: u64 },

    #[error("File exceeds maximum line count: {lines} (max: {max_lines})")]
    TooManyLines { lines: usize, max_lines: usize },

    #[error("Invalid UTF-8 encoding in file: {path}")]
    InvalidEncoding { path: String },

    #[error("I/O error reading {path}: {message}")]
    Io { path: String, message: String },
}

impl SourceError {
    pub fn error_code(&self) -> Code {
        match self {
            SourceError::FileNotFound { .. } => codes::file::FILE_NOT_FOUND,
            SourceError::PermissionDenied { .. } => codes::file::PERMISSION_DENIED,
            SourceError::FileTooLarge { .. } => codes::file::FILE_TOO_LARGE,
            SourceError::TooManyLines { .. } => codes::file::TOO_MANY_LINES,
            SourceError::InvalidEncoding { .. } => codes::file::INVALID_ENCODING,
            SourceError::Io { .. } => codes::file::IO_ERROR,
        }
    }

    fn from_io(path: &Path, error: std::io::Error) -> Self {
        let path = path.display().to_string();
        match error.kind() {
            ErrorKind::NotFound => SourceError::FileNotFound { path },
            ErrorKind::PermissionDenied => SourceError::PermissionDenied { path },
            ErrorKind::InvalidData => SourceError::InvalidEncoding { path },
            _ => SourceError::Io {
                path,
                message: error.to_string(),
            },
        }
    }
}

/// A source file read into memory
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub text: String,
    pub size: u64,
    pub line_count: usize,
}

/// Reads compilation units within the configured size limits
#[derive(Debug, Clone)]
pub struct SourceReader {
    max_file_size: u64,
    max_line_count: usize,
}

impl SourceReader {
    pub fn new() -> Self {
        Self::with_limits(MAX_FILE_SIZE, MAX_LINE_COUNT)
    }

    pub fn with_limits(max_file_size: u64, max_line_count: usize) -> Self {
        Self {
            max_file_size,
            max_line_count,
        }
    }

    pub fn read(&self, path: &Path) -> Result<SourceFile, SourceError> {
        self.read_inner(path).map_err(|error| {
            log_error!(error.error_code(), &error.to_string(), "path" => path.display());
            error
        })
    }

    fn read_inner(&self, path: &Path) -> Result<SourceFile, SourceError> {
        let metadata = fs::metadata(path).map_err(|e| SourceError::from_io(path, e))?;
        if !metadata.is_file() {
            return Err(SourceError::Io {
                path: path.display().to_string(),
                message: "not a regular file".to_string(),
            });
        }

        let size = metadata.len();
        if size > self.max_file_size {
            return Err(SourceError::FileTooLarge {
                size,
                max_size: self.max_file_size,
            });
        }

        let text = fs::read_to_string(path).map_err(|e| SourceError::from_io(path, e))?;

        let line_count = text.lines().count();
        if line_count > self.max_line_count {
            return Err(SourceError::TooManyLines {
                lines: line_count,
                max_lines: self.max_line_count,
            });
        }

        log_debug!("Source file read",
            "path" => path.display(),
            "size_bytes" => size,
            "lines" => line_count);

        Ok(SourceFile {
            path: path.to_path_buf(),
            text,
            size,
            line_count,
        })
    }
}

impl Default for SourceReader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{self, LogLevel, LoggingService, MemoryLogger};
    use assert_matches::assert_matches;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn test_reads_file_with_line_count() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ring.dpy");
        fs::write(&path, "x = 1\ny = 2\n").unwrap();

        let file = SourceReader::new().read(&path).unwrap();
        assert_eq!(file.line_count, 2);
        assert_eq!(file.text, "x = 1\ny = 2\n");
        assert_eq!(file.size, 12);
    }

    #[test]
    fn test_successful_read_is_silent_below_debug() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ring.dpy");
        fs::write(&path, "x = 1\n").unwrap();
        let memory = Arc::new(MemoryLogger::new());

        for level in [LogLevel::Error, LogLevel::Warning, LogLevel::Info] {
            let service = LoggingService::new(memory.clone(), level);
            logging::with_logger(service, || SourceReader::new().read(&path)).unwrap();
        }
        assert!(memory.is_empty());
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = SourceReader::new().read(&dir.path().join("absent.dpy"));
        assert_matches!(result, Err(SourceError::FileNotFound { .. }));
    }

    #[test]
    fn test_size_limit() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("big.dpy");
        fs::write(&path, "x = 1\n".repeat(10)).unwrap();

        let result = SourceReader::with_limits(16, 1000).read(&path);
        assert_matches!(result, Err(SourceError::FileTooLarge { size: 60, max_size: 16 }));
    }

    #[test]
    fn test_line_limit() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("long.dpy");
        fs::write(&path, "pass\n".repeat(5)).unwrap();

        let result = SourceReader::with_limits(1024, 3).read(&path);
        assert_matches!(result, Err(SourceError::TooManyLines { lines: 5, max_lines: 3 }));
    }

    #[test]
    fn test_invalid_utf8() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bin.dpy");
        fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();

        let error = SourceReader::new().read(&path).unwrap_err();
        assert_matches!(error, SourceError::InvalidEncoding { .. });
        assert_eq!(error.error_code(), codes::file::INVALID_ENCODING);
    }
}
