//! Runtime configuration
//!
//! Built once at process start (CLI flags or test setup) and handed to
//! [`crate::db::init`]. Nothing security- or limit-relevant is compiled in.

use std::path::PathBuf;

/// Maximum upload size when none is configured (50 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the LMDB environment
    pub db_path: PathBuf,
    /// Directory files are materialized under; served as `/uploads` over HTTP
    pub upload_root: PathBuf,
    /// Per-file upload ceiling in bytes
    pub max_file_size: u64,
    /// Session lifetime in seconds; 0 means sessions never expire
    pub token_ttl_secs: u64,
}

impl Config {
    pub fn new(db_path: impl Into<PathBuf>, upload_root: impl Into<PathBuf>) -> Self {
        Config {
            db_path: db_path.into(),
            upload_root: upload_root.into(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            token_ttl_secs: 0,
        }
    }

    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    pub fn with_token_ttl(mut self, secs: u64) -> Self {
        self.token_ttl_secs = secs;
        self
    }
}
