//! FAQ CRUD: either one PDF attachment or a rich-text body

use serde::Deserialize;

use crate::attachment::{AttachmentStore, Category};
use crate::db::{self, current_epoch};
use crate::error::{Error, Result};
use crate::model::{DocumentType, Faq, FaqContentType, Principal};
use crate::permission::{self, Visibility};

use super::{matches_keyword, paginate, Page, UploadFile};

/// Attachment directory kind for FAQs
const KIND: &str = "faqs";

#[derive(Debug, Clone, Deserialize)]
pub struct NewFaq {
    pub title: String,
    pub description: Option<String>,
    pub module: Option<String>,
    pub person: Option<String>,
    pub content_type: FaqContentType,
    pub rich_content: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FaqUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub module: Option<String>,
    pub person: Option<String>,
    pub rich_content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FaqSearch {
    pub keyword: Option<String>,
    pub module: Option<String>,
    pub person: Option<String>,
    pub content_type: Option<FaqContentType>,
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

impl Default for FaqSearch {
    fn default() -> Self {
        FaqSearch {
            keyword: None,
            module: None,
            person: None,
            content_type: None,
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

/// Create a FAQ. `Attachment` FAQs carry exactly one PDF; `RichText` FAQs
/// carry an HTML body and no files.
pub fn create(actor: &Principal, input: NewFaq, file: Option<UploadFile>) -> Result<Faq> {
    if input.title.trim().is_empty() {
        return Err(Error::Invalid("faq title must not be empty".into()));
    }
    match input.content_type {
        FaqContentType::Attachment if file.is_none() => {
            return Err(Error::Invalid("attachment faq requires a pdf file".into()));
        }
        FaqContentType::RichText => {
            if file.is_some() {
                return Err(Error::Invalid("rich text faq must not carry a file".into()));
            }
            if input.rich_content.as_deref().map(str::trim).unwrap_or("").is_empty() {
                return Err(Error::Invalid("rich text faq requires content".into()));
            }
        }
        _ => {}
    }

    let store = AttachmentStore::from_config()?;
    let stored = match &file {
        Some(f) => {
            store.validate(&f.filename, f.bytes.len() as u64, Category::Pdf)?;
            Some(store.store(&f.bytes, &f.filename, Category::Pdf, KIND, None)?)
        }
        None => None,
    };

    let now = current_epoch();
    let attachments = stored.clone().map(|a| vec![a]);
    let committed = db::with_write_txn(|t, txn| {
        let id = db::next_id(t, txn, "faqs")?;
        let faq = Faq {
            id,
            title: input.title.trim().to_string(),
            description: input.description.clone(),
            module: input.module.clone(),
            person: input.person.clone(),
            document_type: DocumentType::Pdf,
            content_type: input.content_type,
            rich_content: input.rich_content.clone(),
            file_path: None,
            file_name: None,
            file_size: None,
            mime_type: None,
            attachments: attachments.clone(),
            creator_id: Some(actor.id),
            created_at: now,
            updated_at: now,
        };
        t.faqs.put(txn, &id, &faq)?;
        Ok(faq)
    });

    let mut faq = match committed {
        Ok(faq) => faq,
        Err(e) => {
            if let Some(meta) = &stored {
                store.delete(&meta.file_path);
            }
            return Err(e);
        }
    };

    if let Some(list) = faq.attachments.as_mut() {
        for att in list.iter_mut() {
            att.file_path = store.relocate(&att.file_path, KIND, faq.id)?;
        }
        let updated = faq.clone();
        db::with_write_txn(|t, txn| {
            t.faqs.put(txn, &faq.id, &updated)?;
            Ok(())
        })?;
    }
    Ok(faq)
}

pub fn get(actor: &Principal, id: u64) -> Result<Faq> {
    let vis = Visibility::for_principal(actor)?;
    let faq = db::with_read_txn(|t, txn| Ok(t.faqs.get(txn, &id)?))?.ok_or(Error::NotFound)?;
    if !vis.allows(faq.creator_id) {
        return Err(Error::NotFound);
    }
    Ok(faq)
}

/// Newest first, stable on id for same-instant rows
pub fn search(actor: &Principal, search: FaqSearch) -> Result<Page<Faq>> {
    let vis = Visibility::for_principal(actor)?;
    let mut items = db::with_read_txn(|t, txn| {
        let mut out = Vec::new();
        for item in t.faqs.iter(txn)? {
            let (_, faq) = item?;
            if !vis.allows(faq.creator_id) {
                continue;
            }
            if let Some(ct) = search.content_type {
                if faq.content_type != ct {
                    continue;
                }
            }
            if let Some(module) = search.module.as_deref() {
                if faq.module.as_deref() != Some(module) {
                    continue;
                }
            }
            if let Some(person) = search.person.as_deref() {
                if faq.person.as_deref() != Some(person) {
                    continue;
                }
            }
            if !matches_keyword(
                search.keyword.as_deref(),
                &[Some(&faq.title), faq.description.as_deref()],
            ) {
                continue;
            }
            out.push(faq);
        }
        Ok(out)
    })?;
    items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    Ok(paginate(items, search.page, search.page_size))
}

pub fn update(actor: &Principal, id: u64, patch: FaqUpdate) -> Result<Faq> {
    db::with_write_txn(|t, txn| {
        let mut faq = t.faqs.get(txn, &id)?.ok_or(Error::NotFound)?;
        if !permission::can_access(faq.creator_id, actor, false)? {
            return Err(Error::Forbidden);
        }
        if let Some(title) = patch.title {
            if title.trim().is_empty() {
                return Err(Error::Invalid("faq title must not be empty".into()));
            }
            faq.title = title.trim().to_string();
        }
        if let Some(description) = patch.description {
            faq.description = Some(description);
        }
        if let Some(module) = patch.module {
            faq.module = Some(module);
        }
        if let Some(person) = patch.person {
            faq.person = Some(person);
        }
        if let Some(rich_content) = patch.rich_content {
            if faq.content_type != FaqContentType::RichText {
                return Err(Error::Invalid("only rich text faqs carry content".into()));
            }
            faq.rich_content = Some(rich_content);
        }
        faq.updated_at = current_epoch();
        t.faqs.put(txn, &id, &faq)?;
        Ok(faq)
    })
}

/// Replace the PDF of an attachment FAQ; the previous file is removed
pub fn replace_attachment(actor: &Principal, id: u64, file: UploadFile) -> Result<Faq> {
    let store = AttachmentStore::from_config()?;

    let faq = db::with_read_txn(|t, txn| Ok(t.faqs.get(txn, &id)?))?.ok_or(Error::NotFound)?;
    if !permission::can_access(faq.creator_id, actor, false)? {
        return Err(Error::Forbidden);
    }
    if faq.content_type != FaqContentType::Attachment {
        return Err(Error::Invalid("rich text faq must not carry a file".into()));
    }
    store.validate(&file.filename, file.bytes.len() as u64, Category::Pdf)?;

    let meta = store.store(&file.bytes, &file.filename, Category::Pdf, KIND, Some(id))?;
    let old = faq.effective_attachments();

    let result = db::with_write_txn(|t, txn| {
        let mut faq = t.faqs.get(txn, &id)?.ok_or(Error::NotFound)?;
        faq.attachments = Some(vec![meta.clone()]);
        faq.file_path = None;
        faq.file_name = None;
        faq.file_size = None;
        faq.mime_type = None;
        faq.updated_at = current_epoch();
        t.faqs.put(txn, &id, &faq)?;
        Ok(faq)
    });

    match result {
        Ok(faq) => {
            for att in old {
                store.delete(&att.file_path);
            }
            Ok(faq)
        }
        Err(e) => {
            store.delete(&meta.file_path);
            Err(e)
        }
    }
}

/// Remove one attachment by its stored filename, including the file
pub fn delete_attachment(actor: &Principal, id: u64, stored_filename: &str) -> Result<Faq> {
    let store = AttachmentStore::from_config()?;
    let (faq, removed) = db::with_write_txn(|t, txn| {
        let mut faq = t.faqs.get(txn, &id)?.ok_or(Error::NotFound)?;
        if !permission::can_access(faq.creator_id, actor, false)? {
            return Err(Error::Forbidden);
        }
        let mut list = faq.effective_attachments();
        let pos = list
            .iter()
            .position(|a| a.stored_filename == stored_filename)
            .ok_or(Error::NotFound)?;
        let removed = list.remove(pos);
        faq.attachments = Some(list);
        faq.file_path = None;
        faq.file_name = None;
        faq.file_size = None;
        faq.mime_type = None;
        faq.updated_at = current_epoch();
        t.faqs.put(txn, &id, &faq)?;
        Ok((faq.clone(), removed))
    })?;
    store.delete(&removed.file_path);
    Ok(faq)
}

/// Delete a FAQ and its physical file, legacy reference included
pub fn delete(actor: &Principal, id: u64) -> Result<()> {
    let store = AttachmentStore::from_config()?;
    let faq = db::with_write_txn(|t, txn| {
        let faq = t.faqs.get(txn, &id)?.ok_or(Error::NotFound)?;
        if !permission::can_access(faq.creator_id, actor, false)? {
            return Err(Error::Forbidden);
        }
        t.faqs.delete(txn, &id)?;
        Ok(faq)
    })?;
    for att in faq.effective_attachments() {
        store.delete(&att.file_path);
    }
    Ok(())
}
