//! Record types persisted in the catalog
//!
//! Every governed record embeds its ownership fact (`creator_id`), set once
//! at creation and never changed afterward. `None` marks rows created before
//! ownership existed.
//!
//! Documents and FAQs predating the multi-attachment model carry legacy
//! single-file fields; [`Document::effective_attachments`] and
//! [`Faq::effective_attachments`] fold those into a one-element list at the
//! read boundary. The synthesized list is never written back.

use serde::{Deserialize, Serialize};

use crate::attachment;

// ============================================================================
// Principals
// ============================================================================

/// Caller role; a closed enum, compared by value equality only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

/// The authenticated caller of one request; never persisted
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: u64,
    pub role: Role,
    pub active: bool,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Persisted account record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub role: Role,
    pub active: bool,
    pub salt: String,
    pub password_hash: String,
    pub created_at: u64,
}

impl User {
    pub fn principal(&self) -> Principal {
        Principal { id: self.id, role: self.role, active: self.active }
    }
}

// ============================================================================
// Attachments
// ============================================================================

/// Metadata for one uploaded file, owned by exactly one resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub filename: String,
    /// `{unix_ts}_{original}` - unique within the resource directory
    pub stored_filename: String,
    /// Relative POSIX path with a single leading `/`, no scheme or host
    pub file_path: String,
    pub file_size: u64,
    pub mime_type: Option<String>,
    /// ISO-8601
    pub upload_time: String,
    pub category: String,
    pub can_preview: bool,
}

/// Synthesize a one-element attachment list from legacy single-file fields.
/// Used only at the read boundary; the result is never persisted.
pub(crate) fn legacy_attachment(
    file_path: &str,
    file_name: Option<&str>,
    file_size: Option<u64>,
    mime_type: Option<&str>,
    document_type: DocumentType,
    created_at: u64,
) -> Attachment {
    let normalized = attachment::normalize_for_response(file_path);
    let stored = normalized.rsplit('/').next().unwrap_or("").to_string();
    let category = match document_type {
        DocumentType::Pdf => "pdf",
        DocumentType::Image => "image",
    };
    Attachment {
        filename: file_name.unwrap_or("unknown").to_string(),
        stored_filename: stored,
        file_path: normalized,
        file_size: file_size.unwrap_or(0),
        mime_type: mime_type.map(str::to_string),
        upload_time: iso8601(created_at),
        category: category.to_string(),
        can_preview: true,
    }
}

/// Epoch milliseconds to ISO-8601 text
pub fn iso8601(epoch_ms: u64) -> String {
    chrono::DateTime::from_timestamp_millis(epoch_ms as i64)
        .map(|t| t.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
        .unwrap_or_default()
}

// ============================================================================
// Projects
// ============================================================================

/// Reference to an external interface document (name/version/date only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRef {
    pub name: String,
    pub version: Option<String>,
    pub update_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: u64,
    pub name: String,
    pub manager: String,
    pub contact_info: String,
    pub description: Option<String>,
    #[serde(default)]
    pub documents: Vec<DocumentRef>,
    pub attachments: Option<Vec<Attachment>>,
    pub creator_id: Option<u64>,
    pub created_at: u64,
    pub updated_at: u64,
}

// ============================================================================
// Interfaces
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterfaceType {
    /// Database-view integration
    View,
    /// HTTP/HTTPS integration
    Api,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterfaceStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamDirection {
    Input,
    Output,
}

/// One typed input/output parameter, embedded in its interface record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    pub id: u64,
    pub name: String,
    pub field_name: String,
    pub data_type: String,
    pub direction: ParamDirection,
    #[serde(default)]
    pub required: bool,
    pub default_value: Option<String>,
    pub description: Option<String>,
    pub example: Option<String>,
    #[serde(default)]
    pub order_index: i64,
    pub dictionary_id: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interface {
    pub id: u64,
    pub project_id: u64,
    pub name: String,
    /// Globally unique
    pub code: String,
    pub description: Option<String>,
    pub interface_type: InterfaceType,
    pub url: Option<String>,
    pub method: Option<String>,
    pub category: Option<String>,
    pub tags: Option<String>,
    pub status: InterfaceStatus,
    pub input_example: Option<String>,
    pub output_example: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    /// Per-interface parameter id counter
    #[serde(default)]
    pub next_parameter_id: u64,
    pub creator_id: Option<u64>,
    pub created_at: u64,
    pub updated_at: u64,
}

// ============================================================================
// Dictionaries
// ============================================================================

/// One key/value entry, embedded in its dictionary record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DictEntry {
    pub id: u64,
    pub key: String,
    pub value: String,
    pub description: Option<String>,
    #[serde(default)]
    pub order_index: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dictionary {
    pub id: u64,
    pub project_id: u64,
    pub name: String,
    /// Globally unique
    pub code: String,
    pub description: Option<String>,
    #[serde(default)]
    pub entries: Vec<DictEntry>,
    #[serde(default)]
    pub next_entry_id: u64,
    pub creator_id: Option<u64>,
    pub created_at: u64,
    pub updated_at: u64,
}

// ============================================================================
// Documents
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Pdf,
    Image,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: u64,
    pub title: String,
    pub description: Option<String>,
    pub region: Option<String>,
    pub person: Option<String>,
    pub document_type: DocumentType,
    // Legacy single-file fields; readers fold these into `attachments`
    pub file_path: Option<String>,
    pub file_name: Option<String>,
    pub file_size: Option<u64>,
    pub mime_type: Option<String>,
    pub attachments: Option<Vec<Attachment>>,
    pub creator_id: Option<u64>,
    pub created_at: u64,
    pub updated_at: u64,
}

impl Document {
    /// Attachment list as seen by readers: the stored list, or a synthesized
    /// one-element view of the legacy single-file fields.
    pub fn effective_attachments(&self) -> Vec<Attachment> {
        match &self.attachments {
            Some(list) if !list.is_empty() => list.clone(),
            _ => match self.file_path.as_deref() {
                Some(path) => vec![legacy_attachment(
                    path,
                    self.file_name.as_deref(),
                    self.file_size,
                    self.mime_type.as_deref(),
                    self.document_type,
                    self.created_at,
                )],
                None => Vec::new(),
            },
        }
    }
}

// ============================================================================
// FAQs
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaqContentType {
    /// One PDF attachment
    Attachment,
    /// HTML body, no files
    RichText,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Faq {
    pub id: u64,
    pub title: String,
    pub description: Option<String>,
    pub module: Option<String>,
    pub person: Option<String>,
    pub document_type: DocumentType,
    pub content_type: FaqContentType,
    pub rich_content: Option<String>,
    // Legacy single-file fields; readers fold these into `attachments`
    pub file_path: Option<String>,
    pub file_name: Option<String>,
    pub file_size: Option<u64>,
    pub mime_type: Option<String>,
    pub attachments: Option<Vec<Attachment>>,
    pub creator_id: Option<u64>,
    pub created_at: u64,
    pub updated_at: u64,
}

impl Faq {
    pub fn effective_attachments(&self) -> Vec<Attachment> {
        match &self.attachments {
            Some(list) if !list.is_empty() => list.clone(),
            _ => match self.file_path.as_deref() {
                Some(path) => vec![legacy_attachment(
                    path,
                    self.file_name.as_deref(),
                    self.file_size,
                    self.mime_type.as_deref(),
                    self.document_type,
                    self.created_at,
                )],
                None => Vec::new(),
            },
        }
    }
}
