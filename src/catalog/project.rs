//! Project CRUD and project-level attachments

use serde::Deserialize;

use crate::attachment::{AttachmentStore, Category};
use crate::db::{self, current_epoch};
use crate::error::{Error, Result};
use crate::model::{DocumentRef, Principal, Project};
use crate::permission::{self, Visibility};

use super::{matches_keyword, slice, UploadFile};

/// Attachment directory kind for projects
const KIND: &str = "projects";

#[derive(Debug, Clone, Deserialize)]
pub struct NewProject {
    pub name: String,
    pub manager: String,
    pub contact_info: String,
    pub description: Option<String>,
    #[serde(default)]
    pub documents: Vec<DocumentRef>,
}

/// Partial update; absent fields keep their stored value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectUpdate {
    pub name: Option<String>,
    pub manager: Option<String>,
    pub contact_info: Option<String>,
    pub description: Option<String>,
    pub documents: Option<Vec<DocumentRef>>,
}

pub fn create(actor: &Principal, input: NewProject) -> Result<Project> {
    if input.name.trim().is_empty() {
        return Err(Error::Invalid("project name must not be empty".into()));
    }
    let now = current_epoch();
    db::with_write_txn(|t, txn| {
        let id = db::next_id(t, txn, "projects")?;
        let project = Project {
            id,
            name: input.name.trim().to_string(),
            manager: input.manager.clone(),
            contact_info: input.contact_info.clone(),
            description: input.description.clone(),
            documents: input.documents.clone(),
            attachments: None,
            creator_id: Some(actor.id),
            created_at: now,
            updated_at: now,
        };
        t.projects.put(txn, &id, &project)?;
        Ok(project)
    })
}

/// Single read follows the same visibility rule as listing; a hidden
/// project is indistinguishable from a missing one.
pub fn get(actor: &Principal, id: u64) -> Result<Project> {
    let vis = Visibility::for_principal(actor)?;
    let project = db::with_read_txn(|t, txn| Ok(t.projects.get(txn, &id)?))?
        .ok_or(Error::NotFound)?;
    if !vis.allows(project.creator_id) {
        return Err(Error::NotFound);
    }
    Ok(project)
}

pub fn list(
    actor: &Principal,
    skip: usize,
    limit: usize,
    keyword: Option<&str>,
) -> Result<Vec<Project>> {
    let vis = Visibility::for_principal(actor)?;
    let projects = db::with_read_txn(|t, txn| {
        let mut out = Vec::new();
        for item in t.projects.iter(txn)? {
            let (_, p) = item?;
            if !vis.allows(p.creator_id) {
                continue;
            }
            if !matches_keyword(
                keyword,
                &[Some(&p.name), Some(&p.manager), p.description.as_deref()],
            ) {
                continue;
            }
            out.push(p);
        }
        Ok(out)
    })?;
    Ok(slice(projects, skip, limit))
}

pub fn update(actor: &Principal, id: u64, patch: ProjectUpdate) -> Result<Project> {
    db::with_write_txn(|t, txn| {
        let mut project = t.projects.get(txn, &id)?.ok_or(Error::NotFound)?;
        if !permission::can_access(project.creator_id, actor, false)? {
            return Err(Error::Forbidden);
        }
        if let Some(name) = patch.name {
            if name.trim().is_empty() {
                return Err(Error::Invalid("project name must not be empty".into()));
            }
            project.name = name.trim().to_string();
        }
        if let Some(manager) = patch.manager {
            project.manager = manager;
        }
        if let Some(contact_info) = patch.contact_info {
            project.contact_info = contact_info;
        }
        if let Some(description) = patch.description {
            project.description = Some(description);
        }
        if let Some(documents) = patch.documents {
            project.documents = documents;
        }
        project.updated_at = current_epoch();
        t.projects.put(txn, &id, &project)?;
        Ok(project)
    })
}

/// Delete a project and everything scoped to it: interfaces (with their code
/// index rows), dictionaries, and the physical attachment files.
pub fn delete(actor: &Principal, id: u64) -> Result<()> {
    let store = AttachmentStore::from_config()?;
    let project = db::with_write_txn(|t, txn| {
        let project = t.projects.get(txn, &id)?.ok_or(Error::NotFound)?;
        if !permission::can_access(project.creator_id, actor, false)? {
            return Err(Error::Forbidden);
        }

        let mut interface_ids = Vec::new();
        for item in t.interfaces.iter(txn)? {
            let (iid, iface) = item?;
            if iface.project_id == id {
                interface_ids.push((iid, iface.code));
            }
        }
        for (iid, code) in interface_ids {
            t.interfaces.delete(txn, &iid)?;
            t.interface_codes.delete(txn, &code)?;
        }

        let mut dictionary_ids = Vec::new();
        for item in t.dictionaries.iter(txn)? {
            let (did, dict) = item?;
            if dict.project_id == id {
                dictionary_ids.push((did, dict.code));
            }
        }
        for (did, code) in dictionary_ids {
            t.dictionaries.delete(txn, &did)?;
            t.dictionary_codes.delete(txn, &code)?;
        }

        t.projects.delete(txn, &id)?;
        Ok(project)
    })?;

    for att in project.attachments.iter().flatten() {
        store.delete(&att.file_path);
    }
    Ok(())
}

/// Upload one file onto an existing project. The project category accepts
/// `pdf` (validated) or anything else stored as `other`.
pub fn upload_attachment(
    actor: &Principal,
    id: u64,
    file: UploadFile,
    category: &str,
) -> Result<Project> {
    let category = match category {
        "pdf" => Category::Pdf,
        _ => Category::Other,
    };
    let store = AttachmentStore::from_config()?;

    // Ownership gate before any bytes land on disk
    let project = db::with_read_txn(|t, txn| Ok(t.projects.get(txn, &id)?))?
        .ok_or(Error::NotFound)?;
    if !permission::can_access(project.creator_id, actor, false)? {
        return Err(Error::Forbidden);
    }
    store.validate(&file.filename, file.bytes.len() as u64, category)?;

    let meta = store.store(&file.bytes, &file.filename, category, KIND, Some(id))?;

    let result = db::with_write_txn(|t, txn| {
        let mut project = t.projects.get(txn, &id)?.ok_or(Error::NotFound)?;
        project
            .attachments
            .get_or_insert_with(Vec::new)
            .push(meta.clone());
        project.updated_at = current_epoch();
        t.projects.put(txn, &id, &project)?;
        Ok(project)
    });

    // Never leave a file referenced by nothing
    if result.is_err() {
        store.delete(&meta.file_path);
    }
    result
}

/// Remove one attachment by its stored filename, including the file
pub fn delete_attachment(actor: &Principal, id: u64, stored_filename: &str) -> Result<Project> {
    let store = AttachmentStore::from_config()?;
    let (project, removed) = db::with_write_txn(|t, txn| {
        let mut project = t.projects.get(txn, &id)?.ok_or(Error::NotFound)?;
        if !permission::can_access(project.creator_id, actor, false)? {
            return Err(Error::Forbidden);
        }
        let list = project.attachments.get_or_insert_with(Vec::new);
        let pos = list
            .iter()
            .position(|a| a.stored_filename == stored_filename)
            .ok_or(Error::NotFound)?;
        let removed = list.remove(pos);
        project.updated_at = current_epoch();
        t.projects.put(txn, &id, &project)?;
        Ok((project.clone(), removed))
    })?;
    store.delete(&removed.file_path);
    Ok(project)
}
