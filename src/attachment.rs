//! Physical lifecycle of uploaded files
//!
//! Per file: Validated -> StoredTemp -> Persisted -> Relocated, or
//! Validated -> Rejected, or any state -> Deleted.
//!
//! Files live under `{upload_root}/{kind}/{resource_id}/{ts}_{name}`; a file
//! stored before its resource id exists goes to `{upload_root}/{kind}/` and
//! is moved by [`AttachmentStore::relocate`] after the record commit.
//! Recorded paths are host-agnostic URL paths (`/uploads/...`): deployments
//! can change port or domain without touching stored records.

use std::path::{Path, PathBuf};

use crate::db;
use crate::error::{Error, Result};
use crate::model::{iso8601, Attachment};

/// URL mount name for the upload root; the prefix recorded in every path
const URL_PREFIX: &str = "uploads";

const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".webp", ".bmp"];

/// Upload category, driving the extension allow-list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// `.pdf` only
    Pdf,
    /// Common raster formats
    Image,
    /// Permissive
    Other,
}

impl Category {
    pub fn parse(s: &str) -> Result<Category> {
        match s {
            "pdf" => Ok(Category::Pdf),
            "image" => Ok(Category::Image),
            "other" => Ok(Category::Other),
            _ => Err(Error::InvalidAttachment(format!("unknown category: {}", s))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Pdf => "pdf",
            Category::Image => "image",
            Category::Other => "other",
        }
    }

    fn allows(&self, ext: &str) -> bool {
        match self {
            Category::Pdf => ext == ".pdf",
            Category::Image => IMAGE_EXTENSIONS.contains(&ext),
            Category::Other => true,
        }
    }

    fn can_preview(&self) -> bool {
        !matches!(self, Category::Other)
    }
}

/// Manages validation, placement, relocation and deletion of uploaded files
#[derive(Debug, Clone)]
pub struct AttachmentStore {
    root: PathBuf,
    max_file_size: u64,
}

impl AttachmentStore {
    pub fn new(root: impl Into<PathBuf>, max_file_size: u64) -> Self {
        AttachmentStore { root: root.into(), max_file_size }
    }

    /// Store configured from the process [`Config`](crate::config::Config)
    pub fn from_config() -> Result<Self> {
        let config = db::config()?;
        Ok(AttachmentStore::new(&config.upload_root, config.max_file_size))
    }

    /// Check extension and size before any bytes are written.
    /// A file exactly at the ceiling passes; one byte over is rejected.
    pub fn validate(&self, filename: &str, size: u64, category: Category) -> Result<()> {
        let ext = extension(filename);
        if !category.allows(&ext) {
            return Err(Error::InvalidAttachment(format!(
                "unsupported file type {} for category {}",
                if ext.is_empty() { "(none)" } else { &ext },
                category.as_str()
            )));
        }
        if size > self.max_file_size {
            return Err(Error::InvalidAttachment(format!(
                "file exceeds size limit of {} bytes",
                self.max_file_size
            )));
        }
        Ok(())
    }

    /// Write bytes under the resource directory when `owner` is known, else
    /// under the kind's temporary holding directory. A failed write removes
    /// the partial file before the error propagates.
    pub fn store(
        &self,
        bytes: &[u8],
        original_filename: &str,
        category: Category,
        kind: &str,
        owner: Option<u64>,
    ) -> Result<Attachment> {
        let original = basename(original_filename);
        self.validate(original, bytes.len() as u64, category)?;

        let ts = db::current_epoch() / 1000;
        // Same-second uploads of the same original name collide; documented
        // limitation of the timestamp-prefix scheme.
        let stored_filename = format!("{}_{}", ts, original);

        let dir = match owner {
            Some(id) => self.root.join(kind).join(id.to_string()),
            None => self.root.join(kind),
        };
        std::fs::create_dir_all(&dir)?;
        let full_path = dir.join(&stored_filename);

        if let Err(e) = std::fs::write(&full_path, bytes) {
            let _ = std::fs::remove_file(&full_path);
            return Err(Error::Storage(e.to_string()));
        }

        let file_path = match owner {
            Some(id) => format!("/{}/{}/{}/{}", URL_PREFIX, kind, id, stored_filename),
            None => format!("/{}/{}/{}", URL_PREFIX, kind, stored_filename),
        };

        Ok(Attachment {
            filename: original.to_string(),
            stored_filename,
            file_path,
            file_size: bytes.len() as u64,
            mime_type: mime_for(original).map(str::to_string),
            upload_time: iso8601(db::current_epoch()),
            category: category.as_str().to_string(),
            can_preview: category.can_preview(),
        })
    }

    /// Move a temp-stored file into its resource directory once the record
    /// id exists. Idempotent: a missing source returns the path unchanged,
    /// so retries after a completed move succeed.
    pub fn relocate(&self, rel_path: &str, kind: &str, owner_id: u64) -> Result<String> {
        let old = self.resolve(rel_path);
        if !old.exists() {
            return Ok(rel_path.to_string());
        }
        let name = old
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::Storage(format!("bad attachment path: {}", rel_path)))?
            .to_string();

        let target_dir = self.root.join(kind).join(owner_id.to_string());
        std::fs::create_dir_all(&target_dir)?;
        let target = target_dir.join(&name);
        std::fs::rename(&old, &target)?;

        tracing::debug!(from = %old.display(), to = %target.display(), "relocated attachment");
        Ok(format!("/{}/{}/{}/{}", URL_PREFIX, kind, owner_id, name))
    }

    /// Best-effort physical delete. Returns true if a file was removed;
    /// a file that is already gone is success, not an error.
    pub fn delete(&self, rel_path: &str) -> bool {
        let full = self.resolve(rel_path);
        if !full.exists() {
            return false;
        }
        match std::fs::remove_file(&full) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(path = %full.display(), error = %e, "failed to delete attachment file");
                false
            }
        }
    }

    /// Map a recorded path (any historical variant) onto the filesystem
    fn resolve(&self, rel_path: &str) -> PathBuf {
        let normalized = normalize_for_response(rel_path);
        let trimmed = normalized.trim_start_matches('/');
        let trimmed = trimmed
            .strip_prefix(&format!("{}/", URL_PREFIX))
            .unwrap_or(trimmed);
        self.root.join(trimmed)
    }
}

/// Make a recorded or legacy path safe to return to clients: strip any
/// scheme/host, convert Windows separators, guarantee a single leading `/`.
pub fn normalize_for_response(raw: &str) -> String {
    let mut path = raw.replace('\\', "/");
    if let Some(rest) = path.strip_prefix("http://").or_else(|| path.strip_prefix("https://")) {
        path = match rest.find('/') {
            Some(i) => rest[i..].to_string(),
            None => String::new(),
        };
    }
    format!("/{}", path.trim_start_matches('/'))
}

/// Lowercased extension including the dot, or empty
fn extension(filename: &str) -> String {
    match filename.rfind('.') {
        Some(i) if i > 0 => filename[i..].to_ascii_lowercase(),
        _ => String::new(),
    }
}

/// Last path component; uploads must not smuggle directory parts
fn basename(filename: &str) -> &str {
    filename
        .rsplit(['/', '\\'])
        .next()
        .filter(|s| !s.is_empty() && *s != ".." && *s != ".")
        .unwrap_or("unnamed")
}

/// MIME type resolved from the extension when nothing better is known
fn mime_for(filename: &str) -> Option<&'static str> {
    let p = Path::new(filename);
    let ext = p.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => Some("application/pdf"),
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "bmp" => Some("image/bmp"),
        "txt" => Some("text/plain"),
        "json" => Some("application/json"),
        "xml" => Some("application/xml"),
        "zip" => Some("application/zip"),
        _ => None,
    }
}
