//! Dictionary CRUD, code uniqueness and embedded entries

use serde::Deserialize;

use crate::db::{self, current_epoch};
use crate::error::{Error, Result};
use crate::model::{DictEntry, Dictionary, Principal};
use crate::permission::{self, Visibility};

use super::{matches_keyword, slice};

#[derive(Debug, Clone, Deserialize)]
pub struct NewDictEntry {
    pub key: String,
    pub value: String,
    pub description: Option<String>,
    #[serde(default)]
    pub order_index: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewDictionary {
    pub project_id: u64,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    #[serde(default)]
    pub entries: Vec<NewDictEntry>,
}

/// Partial update; a provided `entries` replaces the whole set
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DictionaryUpdate {
    pub name: Option<String>,
    pub code: Option<String>,
    pub description: Option<String>,
    pub entries: Option<Vec<NewDictEntry>>,
}

fn materialize(entries: Vec<NewDictEntry>, next_id: &mut u64) -> Vec<DictEntry> {
    entries
        .into_iter()
        .map(|e| {
            *next_id += 1;
            DictEntry {
                id: *next_id,
                key: e.key,
                value: e.value,
                description: e.description,
                order_index: e.order_index,
            }
        })
        .collect()
}

pub fn create(actor: &Principal, input: NewDictionary) -> Result<Dictionary> {
    let code = input.code.trim().to_string();
    if code.is_empty() {
        return Err(Error::Invalid("dictionary code must not be empty".into()));
    }
    let now = current_epoch();
    db::with_write_txn(|t, txn| {
        if t.dictionary_codes.get(txn, &code)?.is_some() {
            return Err(Error::Invalid(format!("dictionary code already exists: {}", code)));
        }
        if t.projects.get(txn, &input.project_id)?.is_none() {
            return Err(Error::Invalid(format!("no such project: {}", input.project_id)));
        }
        let id = db::next_id(t, txn, "dictionaries")?;
        let mut next_entry_id = 0;
        let entries = materialize(input.entries.clone(), &mut next_entry_id);
        let dict = Dictionary {
            id,
            project_id: input.project_id,
            name: input.name.clone(),
            code: code.clone(),
            description: input.description.clone(),
            entries,
            next_entry_id,
            creator_id: Some(actor.id),
            created_at: now,
            updated_at: now,
        };
        t.dictionaries.put(txn, &id, &dict)?;
        t.dictionary_codes.put(txn, &code, &id)?;
        Ok(dict)
    })
}

pub fn get(actor: &Principal, id: u64) -> Result<Dictionary> {
    let vis = Visibility::for_principal(actor)?;
    let dict = db::with_read_txn(|t, txn| Ok(t.dictionaries.get(txn, &id)?))?
        .ok_or(Error::NotFound)?;
    if !vis.allows(dict.creator_id) {
        return Err(Error::NotFound);
    }
    Ok(dict)
}

pub fn get_by_code(actor: &Principal, code: &str) -> Result<Dictionary> {
    let id = db::with_read_txn(|t, txn| Ok(t.dictionary_codes.get(txn, code)?))?
        .ok_or(Error::NotFound)?;
    get(actor, id)
}

/// List, optionally scoped to one project and filtered by keyword over
/// name/code/description. A project scope the caller cannot see yields an
/// empty list, not an error.
pub fn list(
    actor: &Principal,
    skip: usize,
    limit: usize,
    project_id: Option<u64>,
    keyword: Option<&str>,
) -> Result<Vec<Dictionary>> {
    let vis = Visibility::for_principal(actor)?;

    if let Some(pid) = project_id {
        let parent = db::with_read_txn(|t, txn| Ok(t.projects.get(txn, &pid)?))?;
        let parent_visible = parent.map(|p| vis.allows(p.creator_id)).unwrap_or(false);
        if !parent_visible {
            return Ok(Vec::new());
        }
    }

    let items = db::with_read_txn(|t, txn| {
        let mut out = Vec::new();
        for item in t.dictionaries.iter(txn)? {
            let (_, dict) = item?;
            if !vis.allows(dict.creator_id) {
                continue;
            }
            if let Some(pid) = project_id {
                if dict.project_id != pid {
                    continue;
                }
            }
            if !matches_keyword(
                keyword,
                &[Some(&dict.name), Some(&dict.code), dict.description.as_deref()],
            ) {
                continue;
            }
            out.push(dict);
        }
        Ok(out)
    })?;
    Ok(slice(items, skip, limit))
}

pub fn update(actor: &Principal, id: u64, patch: DictionaryUpdate) -> Result<Dictionary> {
    db::with_write_txn(|t, txn| {
        let mut dict = t.dictionaries.get(txn, &id)?.ok_or(Error::NotFound)?;
        if !permission::can_access(dict.creator_id, actor, false)? {
            return Err(Error::Forbidden);
        }
        if let Some(code) = patch.code {
            let code = code.trim().to_string();
            if code != dict.code {
                if t.dictionary_codes.get(txn, &code)?.is_some() {
                    return Err(Error::Invalid(format!("dictionary code already exists: {}", code)));
                }
                t.dictionary_codes.delete(txn, &dict.code)?;
                t.dictionary_codes.put(txn, &code, &id)?;
                dict.code = code;
            }
        }
        if let Some(name) = patch.name {
            dict.name = name;
        }
        if let Some(description) = patch.description {
            dict.description = Some(description);
        }
        if let Some(entries) = patch.entries {
            let mut next = dict.next_entry_id;
            dict.entries = materialize(entries, &mut next);
            dict.next_entry_id = next;
        }
        dict.updated_at = current_epoch();
        t.dictionaries.put(txn, &id, &dict)?;
        Ok(dict)
    })
}

pub fn delete(actor: &Principal, id: u64) -> Result<()> {
    db::with_write_txn(|t, txn| {
        let dict = t.dictionaries.get(txn, &id)?.ok_or(Error::NotFound)?;
        if !permission::can_access(dict.creator_id, actor, false)? {
            return Err(Error::Forbidden);
        }
        t.dictionaries.delete(txn, &id)?;
        t.dictionary_codes.delete(txn, &dict.code)?;
        Ok(())
    })
}

// ============================================================================
// Entries
// ============================================================================

/// Entry listing goes through the dictionary's own visibility
pub fn entries(actor: &Principal, id: u64) -> Result<Vec<DictEntry>> {
    Ok(get(actor, id)?.entries)
}

pub fn add_entry(actor: &Principal, id: u64, input: NewDictEntry) -> Result<Dictionary> {
    db::with_write_txn(|t, txn| {
        let mut dict = t.dictionaries.get(txn, &id)?.ok_or(Error::NotFound)?;
        if !permission::can_access(dict.creator_id, actor, false)? {
            return Err(Error::Forbidden);
        }
        let mut next = dict.next_entry_id;
        let mut entries = materialize(vec![input], &mut next);
        dict.entries.append(&mut entries);
        dict.next_entry_id = next;
        dict.updated_at = current_epoch();
        t.dictionaries.put(txn, &id, &dict)?;
        Ok(dict)
    })
}

pub fn delete_entry(actor: &Principal, id: u64, entry_id: u64) -> Result<Dictionary> {
    db::with_write_txn(|t, txn| {
        let mut dict = t.dictionaries.get(txn, &id)?.ok_or(Error::NotFound)?;
        if !permission::can_access(dict.creator_id, actor, false)? {
            return Err(Error::Forbidden);
        }
        let pos = dict
            .entries
            .iter()
            .position(|e| e.id == entry_id)
            .ok_or(Error::NotFound)?;
        dict.entries.remove(pos);
        dict.updated_at = current_epoch();
        t.dictionaries.put(txn, &id, &dict)?;
        Ok(dict)
    })
}
