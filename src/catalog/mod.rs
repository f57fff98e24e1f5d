//! Per-kind resource services
//!
//! Each submodule is thin CRUD orchestration over one record table. The
//! shared rules live elsewhere and every kind calls the same implementations:
//!
//! - creation stamps `creator_id` from the caller, immutable afterward
//! - update/delete pass through [`permission::can_access`] with
//!   `allow_read = false`
//! - list/search/get apply [`permission::Visibility`] before pagination
//! - attachment-bearing kinds drive [`AttachmentStore`] in the
//!   validate -> store -> commit -> relocate sequence
//!
//! [`permission::can_access`]: crate::permission::can_access
//! [`permission::Visibility`]: crate::permission::Visibility
//! [`AttachmentStore`]: crate::attachment::AttachmentStore

pub mod dictionary;
pub mod document;
pub mod faq;
pub mod interface;
pub mod project;

use serde::{Deserialize, Serialize};

/// One page of a search result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub items: Vec<T>,
}

/// An uploaded file before it has a home
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Case-insensitive substring match over any of the given fields.
/// An empty or absent keyword matches everything.
pub(crate) fn matches_keyword(keyword: Option<&str>, fields: &[Option<&str>]) -> bool {
    let Some(kw) = keyword.map(str::trim).filter(|k| !k.is_empty()) else {
        return true;
    };
    let kw = kw.to_lowercase();
    fields
        .iter()
        .flatten()
        .any(|f| f.to_lowercase().contains(&kw))
}

/// Page/page_size slicing with 1-based pages; page 0 is treated as 1
pub(crate) fn paginate<T>(items: Vec<T>, page: usize, page_size: usize) -> Page<T> {
    let total = items.len();
    let page = page.max(1);
    let page_size = page_size.clamp(1, 1000);
    let start = (page - 1).saturating_mul(page_size).min(total);
    let end = start.saturating_add(page_size).min(total);
    let items = items.into_iter().skip(start).take(end - start).collect();
    Page { total, page, page_size, items }
}

/// Skip/limit slicing for the simple list endpoints
pub(crate) fn slice<T>(items: Vec<T>, skip: usize, limit: usize) -> Vec<T> {
    items.into_iter().skip(skip).take(limit.clamp(1, 1000)).collect()
}
