//! Document CRUD with multi-file attachments
//!
//! Upload order per request: every file is validated and written to the
//! temporary holding directory first, then the record commits with the
//! attachment metadata, then the files are relocated under the new id and
//! the recorded paths rewritten. A failed commit triggers a compensating
//! delete of the just-written files.

use serde::Deserialize;

use crate::attachment::{AttachmentStore, Category};
use crate::db::{self, current_epoch};
use crate::error::{Error, Result};
use crate::model::{Attachment, Document, DocumentType, Principal};
use crate::permission::{self, Visibility};

use super::{matches_keyword, paginate, Page, UploadFile};

/// Attachment directory kind for documents
const KIND: &str = "documents";

#[derive(Debug, Clone, Deserialize)]
pub struct NewDocument {
    pub title: String,
    pub description: Option<String>,
    pub region: Option<String>,
    pub person: Option<String>,
    pub document_type: DocumentType,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub region: Option<String>,
    pub person: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentSearch {
    pub keyword: Option<String>,
    pub region: Option<String>,
    pub person: Option<String>,
    pub document_type: Option<DocumentType>,
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page() -> usize {
    1
}

fn default_page_size() -> usize {
    10
}

impl Default for DocumentSearch {
    fn default() -> Self {
        DocumentSearch {
            keyword: None,
            region: None,
            person: None,
            document_type: None,
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

fn category_for(document_type: DocumentType) -> Category {
    match document_type {
        DocumentType::Pdf => Category::Pdf,
        DocumentType::Image => Category::Image,
    }
}

pub fn create(actor: &Principal, input: NewDocument, files: Vec<UploadFile>) -> Result<Document> {
    if input.title.trim().is_empty() {
        return Err(Error::Invalid("document title must not be empty".into()));
    }
    let store = AttachmentStore::from_config()?;
    let category = category_for(input.document_type);

    // Reject the whole batch before writing anything
    for file in &files {
        store.validate(&file.filename, file.bytes.len() as u64, category)?;
    }

    let mut stored: Vec<Attachment> = Vec::with_capacity(files.len());
    for file in &files {
        match store.store(&file.bytes, &file.filename, category, KIND, None) {
            Ok(meta) => stored.push(meta),
            Err(e) => {
                for meta in &stored {
                    store.delete(&meta.file_path);
                }
                return Err(e);
            }
        }
    }

    let now = current_epoch();
    let attachments = stored.clone();
    let committed = db::with_write_txn(|t, txn| {
        let id = db::next_id(t, txn, "documents")?;
        let doc = Document {
            id,
            title: input.title.trim().to_string(),
            description: input.description.clone(),
            region: input.region.clone(),
            person: input.person.clone(),
            document_type: input.document_type,
            file_path: None,
            file_name: None,
            file_size: None,
            mime_type: None,
            attachments: Some(attachments.clone()),
            creator_id: Some(actor.id),
            created_at: now,
            updated_at: now,
        };
        t.documents.put(txn, &id, &doc)?;
        Ok(doc)
    });

    let mut doc = match committed {
        Ok(doc) => doc,
        Err(e) => {
            for meta in &stored {
                store.delete(&meta.file_path);
            }
            return Err(e);
        }
    };

    relocate_all(&store, &mut doc)?;
    Ok(doc)
}

/// Move every temp-stored attachment under the record's id and persist the
/// rewritten paths
fn relocate_all(store: &AttachmentStore, doc: &mut Document) -> Result<()> {
    let id = doc.id;
    if let Some(list) = doc.attachments.as_mut() {
        for att in list.iter_mut() {
            att.file_path = store.relocate(&att.file_path, KIND, id)?;
        }
    }
    let updated = doc.clone();
    db::with_write_txn(|t, txn| {
        t.documents.put(txn, &id, &updated)?;
        Ok(())
    })
}

pub fn get(actor: &Principal, id: u64) -> Result<Document> {
    let vis = Visibility::for_principal(actor)?;
    let doc = db::with_read_txn(|t, txn| Ok(t.documents.get(txn, &id)?))?
        .ok_or(Error::NotFound)?;
    if !vis.allows(doc.creator_id) {
        return Err(Error::NotFound);
    }
    Ok(doc)
}

/// Newest first, stable on id for same-instant rows
pub fn search(actor: &Principal, search: DocumentSearch) -> Result<Page<Document>> {
    let vis = Visibility::for_principal(actor)?;
    let mut items = db::with_read_txn(|t, txn| {
        let mut out = Vec::new();
        for item in t.documents.iter(txn)? {
            let (_, doc) = item?;
            if !vis.allows(doc.creator_id) {
                continue;
            }
            if let Some(ty) = search.document_type {
                if doc.document_type != ty {
                    continue;
                }
            }
            if let Some(region) = search.region.as_deref() {
                if doc.region.as_deref() != Some(region) {
                    continue;
                }
            }
            if let Some(person) = search.person.as_deref() {
                if doc.person.as_deref() != Some(person) {
                    continue;
                }
            }
            if !matches_keyword(
                search.keyword.as_deref(),
                &[Some(&doc.title), doc.description.as_deref()],
            ) {
                continue;
            }
            out.push(doc);
        }
        Ok(out)
    })?;
    items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    Ok(paginate(items, search.page, search.page_size))
}

pub fn update(actor: &Principal, id: u64, patch: DocumentUpdate) -> Result<Document> {
    db::with_write_txn(|t, txn| {
        let mut doc = t.documents.get(txn, &id)?.ok_or(Error::NotFound)?;
        if !permission::can_access(doc.creator_id, actor, false)? {
            return Err(Error::Forbidden);
        }
        if let Some(title) = patch.title {
            if title.trim().is_empty() {
                return Err(Error::Invalid("document title must not be empty".into()));
            }
            doc.title = title.trim().to_string();
        }
        if let Some(description) = patch.description {
            doc.description = Some(description);
        }
        if let Some(region) = patch.region {
            doc.region = Some(region);
        }
        if let Some(person) = patch.person {
            doc.person = Some(person);
        }
        doc.updated_at = current_epoch();
        t.documents.put(txn, &id, &doc)?;
        Ok(doc)
    })
}

/// Append more files to an existing document
pub fn upload_attachments(actor: &Principal, id: u64, files: Vec<UploadFile>) -> Result<Document> {
    let store = AttachmentStore::from_config()?;

    let doc = db::with_read_txn(|t, txn| Ok(t.documents.get(txn, &id)?))?
        .ok_or(Error::NotFound)?;
    if !permission::can_access(doc.creator_id, actor, false)? {
        return Err(Error::Forbidden);
    }
    let category = category_for(doc.document_type);
    for file in &files {
        store.validate(&file.filename, file.bytes.len() as u64, category)?;
    }

    let mut stored: Vec<Attachment> = Vec::with_capacity(files.len());
    for file in &files {
        match store.store(&file.bytes, &file.filename, category, KIND, Some(id)) {
            Ok(meta) => stored.push(meta),
            Err(e) => {
                for meta in &stored {
                    store.delete(&meta.file_path);
                }
                return Err(e);
            }
        }
    }

    let result = db::with_write_txn(|t, txn| {
        let mut doc = t.documents.get(txn, &id)?.ok_or(Error::NotFound)?;
        // First append migrates the record off its legacy single-file fields
        let mut list = doc.effective_attachments();
        list.extend(stored.iter().cloned());
        doc.attachments = Some(list);
        doc.file_path = None;
        doc.file_name = None;
        doc.file_size = None;
        doc.mime_type = None;
        doc.updated_at = current_epoch();
        t.documents.put(txn, &id, &doc)?;
        Ok(doc)
    });

    if result.is_err() {
        for meta in &stored {
            store.delete(&meta.file_path);
        }
    }
    result
}

/// Remove one attachment by its stored filename, including the file
pub fn delete_attachment(actor: &Principal, id: u64, stored_filename: &str) -> Result<Document> {
    let store = AttachmentStore::from_config()?;
    let (doc, removed) = db::with_write_txn(|t, txn| {
        let mut doc = t.documents.get(txn, &id)?.ok_or(Error::NotFound)?;
        if !permission::can_access(doc.creator_id, actor, false)? {
            return Err(Error::Forbidden);
        }
        let mut list = doc.effective_attachments();
        let pos = list
            .iter()
            .position(|a| a.stored_filename == stored_filename)
            .ok_or(Error::NotFound)?;
        let removed = list.remove(pos);
        doc.attachments = Some(list);
        doc.file_path = None;
        doc.file_name = None;
        doc.file_size = None;
        doc.mime_type = None;
        doc.updated_at = current_epoch();
        t.documents.put(txn, &id, &doc)?;
        Ok((doc.clone(), removed))
    })?;
    store.delete(&removed.file_path);
    Ok(doc)
}

/// Delete a document and the physical files behind every attachment,
/// including a legacy single-file reference
pub fn delete(actor: &Principal, id: u64) -> Result<()> {
    let store = AttachmentStore::from_config()?;
    let doc = db::with_write_txn(|t, txn| {
        let doc = t.documents.get(txn, &id)?.ok_or(Error::NotFound)?;
        if !permission::can_access(doc.creator_id, actor, false)? {
            return Err(Error::Forbidden);
        }
        t.documents.delete(txn, &id)?;
        Ok(doc)
    })?;
    for att in doc.effective_attachments() {
        store.delete(&att.file_path);
    }
    Ok(())
}
