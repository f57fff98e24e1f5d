//! Interface CRUD, code uniqueness and embedded parameters

use serde::Deserialize;

use crate::db::{self, current_epoch};
use crate::error::{Error, Result};
use crate::model::{
    Interface, InterfaceStatus, InterfaceType, ParamDirection, Parameter, Principal,
};
use crate::permission::{self, Visibility};

use super::{matches_keyword, paginate, slice, Page};

#[derive(Debug, Clone, Deserialize)]
pub struct NewParameter {
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

#[derive(Debug, Clone, Deserialize)]
pub struct NewInterface {
    pub project_id: u64,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub interface_type: InterfaceType,
    pub url: Option<String>,
    pub method: Option<String>,
    pub category: Option<String>,
    pub tags: Option<String>,
    #[serde(default = "default_status")]
    pub status: InterfaceStatus,
    pub input_example: Option<String>,
    pub output_example: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub parameters: Vec<NewParameter>,
}

fn default_status() -> InterfaceStatus {
    InterfaceStatus::Active
}

/// Partial update; a provided `parameters` replaces the whole set
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InterfaceUpdate {
    pub name: Option<String>,
    pub code: Option<String>,
    pub description: Option<String>,
    pub interface_type: Option<InterfaceType>,
    pub url: Option<String>,
    pub method: Option<String>,
    pub category: Option<String>,
    pub tags: Option<String>,
    pub status: Option<InterfaceStatus>,
    pub input_example: Option<String>,
    pub output_example: Option<String>,
    pub notes: Option<String>,
    pub parameters: Option<Vec<NewParameter>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InterfaceSearch {
    pub keyword: Option<String>,
    pub project_id: Option<u64>,
    pub interface_type: Option<InterfaceType>,
    pub category: Option<String>,
    /// Comma-separated; matches if any requested tag appears
    pub tags: Option<String>,
    pub status: Option<InterfaceStatus>,
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page() -> usize {
    1
}

fn default_page_size() -> usize {
    20
}

impl Default for InterfaceSearch {
    fn default() -> Self {
        InterfaceSearch {
            keyword: None,
            project_id: None,
            interface_type: None,
            category: None,
            tags: None,
            status: None,
            page: default_page(),
            page_size: default_page_size(),
        }
    }
}

fn materialize(params: Vec<NewParameter>, next_id: &mut u64) -> Vec<Parameter> {
    params
        .into_iter()
        .map(|p| {
            *next_id += 1;
            Parameter {
                id: *next_id,
                name: p.name,
                field_name: p.field_name,
                data_type: p.data_type,
                direction: p.direction,
                required: p.required,
                default_value: p.default_value,
                description: p.description,
                example: p.example,
                order_index: p.order_index,
                dictionary_id: p.dictionary_id,
            }
        })
        .collect()
}

pub fn create(actor: &Principal, input: NewInterface) -> Result<Interface> {
    let code = input.code.trim().to_string();
    if code.is_empty() {
        return Err(Error::Invalid("interface code must not be empty".into()));
    }
    let now = current_epoch();
    db::with_write_txn(|t, txn| {
        if t.interface_codes.get(txn, &code)?.is_some() {
            return Err(Error::Invalid(format!("interface code already exists: {}", code)));
        }
        if t.projects.get(txn, &input.project_id)?.is_none() {
            return Err(Error::Invalid(format!("no such project: {}", input.project_id)));
        }
        let id = db::next_id(t, txn, "interfaces")?;
        let mut next_parameter_id = 0;
        let parameters = materialize(input.parameters.clone(), &mut next_parameter_id);
        let iface = Interface {
            id,
            project_id: input.project_id,
            name: input.name.clone(),
            code: code.clone(),
            description: input.description.clone(),
            interface_type: input.interface_type,
            url: input.url.clone(),
            method: input.method.clone(),
            category: input.category.clone(),
            tags: input.tags.clone(),
            status: input.status,
            input_example: input.input_example.clone(),
            output_example: input.output_example.clone(),
            notes: input.notes.clone(),
            parameters,
            next_parameter_id,
            creator_id: Some(actor.id),
            created_at: now,
            updated_at: now,
        };
        t.interfaces.put(txn, &id, &iface)?;
        t.interface_codes.put(txn, &code, &id)?;
        Ok(iface)
    })
}

pub fn get(actor: &Principal, id: u64) -> Result<Interface> {
    let vis = Visibility::for_principal(actor)?;
    let iface = db::with_read_txn(|t, txn| Ok(t.interfaces.get(txn, &id)?))?
        .ok_or(Error::NotFound)?;
    if !vis.allows(iface.creator_id) {
        return Err(Error::NotFound);
    }
    Ok(iface)
}

pub fn get_by_code(actor: &Principal, code: &str) -> Result<Interface> {
    let id = db::with_read_txn(|t, txn| Ok(t.interface_codes.get(txn, code)?))?
        .ok_or(Error::NotFound)?;
    get(actor, id)
}

pub fn list(actor: &Principal, skip: usize, limit: usize) -> Result<Vec<Interface>> {
    let vis = Visibility::for_principal(actor)?;
    let items = db::with_read_txn(|t, txn| {
        let mut out = Vec::new();
        for item in t.interfaces.iter(txn)? {
            let (_, iface) = item?;
            if vis.allows(iface.creator_id) {
                out.push(iface);
            }
        }
        Ok(out)
    })?;
    Ok(slice(items, skip, limit))
}

/// Multi-criteria search. When the search is scoped to a project the caller
/// cannot see, the result is an empty page rather than an error, so a
/// restricted parent leaks nothing about its children.
pub fn search(actor: &Principal, search: InterfaceSearch) -> Result<Page<Interface>> {
    let vis = Visibility::for_principal(actor)?;

    if let Some(project_id) = search.project_id {
        let parent = db::with_read_txn(|t, txn| Ok(t.projects.get(txn, &project_id)?))?;
        let parent_visible = parent.map(|p| vis.allows(p.creator_id)).unwrap_or(false);
        if !parent_visible {
            return Ok(paginate(Vec::new(), search.page, search.page_size));
        }
    }

    let wanted_tags: Vec<String> = search
        .tags
        .as_deref()
        .unwrap_or("")
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();

    let items = db::with_read_txn(|t, txn| {
        let mut out = Vec::new();
        for item in t.interfaces.iter(txn)? {
            let (_, iface) = item?;
            if !vis.allows(iface.creator_id) {
                continue;
            }
            if let Some(pid) = search.project_id {
                if iface.project_id != pid {
                    continue;
                }
            }
            if let Some(ty) = search.interface_type {
                if iface.interface_type != ty {
                    continue;
                }
            }
            if let Some(status) = search.status {
                if iface.status != status {
                    continue;
                }
            }
            if let Some(cat) = search.category.as_deref() {
                if iface.category.as_deref() != Some(cat) {
                    continue;
                }
            }
            if !wanted_tags.is_empty() {
                let have = iface.tags.as_deref().unwrap_or("").to_lowercase();
                if !wanted_tags.iter().any(|tag| have.contains(tag)) {
                    continue;
                }
            }
            if !matches_keyword(
                search.keyword.as_deref(),
                &[Some(&iface.name), Some(&iface.code), iface.description.as_deref()],
            ) {
                continue;
            }
            // List view omits the parameter bodies
            let mut thin = iface;
            thin.parameters = Vec::new();
            out.push(thin);
        }
        Ok(out)
    })?;
    Ok(paginate(items, search.page, search.page_size))
}

/// Interfaces of one project. A parent the caller cannot see yields an
/// empty list, not an error.
pub fn list_for_project(actor: &Principal, project_id: u64) -> Result<Vec<Interface>> {
    let vis = Visibility::for_principal(actor)?;
    let parent = db::with_read_txn(|t, txn| Ok(t.projects.get(txn, &project_id)?))?;
    if !parent.map(|p| vis.allows(p.creator_id)).unwrap_or(false) {
        return Ok(Vec::new());
    }
    db::with_read_txn(|t, txn| {
        let mut out = Vec::new();
        for item in t.interfaces.iter(txn)? {
            let (_, iface) = item?;
            if iface.project_id == project_id && vis.allows(iface.creator_id) {
                out.push(iface);
            }
        }
        Ok(out)
    })
}

pub fn update(actor: &Principal, id: u64, patch: InterfaceUpdate) -> Result<Interface> {
    db::with_write_txn(|t, txn| {
        let mut iface = t.interfaces.get(txn, &id)?.ok_or(Error::NotFound)?;
        if !permission::can_access(iface.creator_id, actor, false)? {
            return Err(Error::Forbidden);
        }
        if let Some(code) = patch.code {
            let code = code.trim().to_string();
            if code != iface.code {
                if t.interface_codes.get(txn, &code)?.is_some() {
                    return Err(Error::Invalid(format!("interface code already exists: {}", code)));
                }
                t.interface_codes.delete(txn, &iface.code)?;
                t.interface_codes.put(txn, &code, &id)?;
                iface.code = code;
            }
        }
        if let Some(name) = patch.name {
            iface.name = name;
        }
        if let Some(description) = patch.description {
            iface.description = Some(description);
        }
        if let Some(ty) = patch.interface_type {
            iface.interface_type = ty;
        }
        if let Some(url) = patch.url {
            iface.url = Some(url);
        }
        if let Some(method) = patch.method {
            iface.method = Some(method);
        }
        if let Some(category) = patch.category {
            iface.category = Some(category);
        }
        if let Some(tags) = patch.tags {
            iface.tags = Some(tags);
        }
        if let Some(status) = patch.status {
            iface.status = status;
        }
        if let Some(input_example) = patch.input_example {
            iface.input_example = Some(input_example);
        }
        if let Some(output_example) = patch.output_example {
            iface.output_example = Some(output_example);
        }
        if let Some(notes) = patch.notes {
            iface.notes = Some(notes);
        }
        if let Some(parameters) = patch.parameters {
            let mut next = iface.next_parameter_id;
            iface.parameters = materialize(parameters, &mut next);
            iface.next_parameter_id = next;
        }
        iface.updated_at = current_epoch();
        t.interfaces.put(txn, &id, &iface)?;
        Ok(iface)
    })
}

/// Delete an interface and its code index row; embedded parameters go with it
pub fn delete(actor: &Principal, id: u64) -> Result<()> {
    db::with_write_txn(|t, txn| {
        let iface = t.interfaces.get(txn, &id)?.ok_or(Error::NotFound)?;
        if !permission::can_access(iface.creator_id, actor, false)? {
            return Err(Error::Forbidden);
        }
        t.interfaces.delete(txn, &id)?;
        t.interface_codes.delete(txn, &iface.code)?;
        Ok(())
    })
}

// ============================================================================
// Parameters
// ============================================================================

pub fn add_parameter(actor: &Principal, interface_id: u64, input: NewParameter) -> Result<Interface> {
    db::with_write_txn(|t, txn| {
        let mut iface = t.interfaces.get(txn, &interface_id)?.ok_or(Error::NotFound)?;
        if !permission::can_access(iface.creator_id, actor, false)? {
            return Err(Error::Forbidden);
        }
        let mut next = iface.next_parameter_id;
        let mut params = materialize(vec![input], &mut next);
        iface.parameters.append(&mut params);
        iface.next_parameter_id = next;
        iface.updated_at = current_epoch();
        t.interfaces.put(txn, &interface_id, &iface)?;
        Ok(iface)
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParameterUpdate {
    pub name: Option<String>,
    pub field_name: Option<String>,
    pub data_type: Option<String>,
    pub direction: Option<ParamDirection>,
    pub required: Option<bool>,
    pub default_value: Option<String>,
    pub description: Option<String>,
    pub example: Option<String>,
    pub order_index: Option<i64>,
    pub dictionary_id: Option<u64>,
}

pub fn update_parameter(
    actor: &Principal,
    interface_id: u64,
    parameter_id: u64,
    patch: ParameterUpdate,
) -> Result<Interface> {
    db::with_write_txn(|t, txn| {
        let mut iface = t.interfaces.get(txn, &interface_id)?.ok_or(Error::NotFound)?;
        if !permission::can_access(iface.creator_id, actor, false)? {
            return Err(Error::Forbidden);
        }
        let param = iface
            .parameters
            .iter_mut()
            .find(|p| p.id == parameter_id)
            .ok_or(Error::NotFound)?;
        if let Some(name) = patch.name {
            param.name = name;
        }
        if let Some(field_name) = patch.field_name {
            param.field_name = field_name;
        }
        if let Some(data_type) = patch.data_type {
            param.data_type = data_type;
        }
        if let Some(direction) = patch.direction {
            param.direction = direction;
        }
        if let Some(required) = patch.required {
            param.required = required;
        }
        if let Some(default_value) = patch.default_value {
            param.default_value = Some(default_value);
        }
        if let Some(description) = patch.description {
            param.description = Some(description);
        }
        if let Some(example) = patch.example {
            param.example = Some(example);
        }
        if let Some(order_index) = patch.order_index {
            param.order_index = order_index;
        }
        if let Some(dictionary_id) = patch.dictionary_id {
            param.dictionary_id = Some(dictionary_id);
        }
        iface.updated_at = current_epoch();
        t.interfaces.put(txn, &interface_id, &iface)?;
        Ok(iface)
    })
}

pub fn delete_parameter(actor: &Principal, interface_id: u64, parameter_id: u64) -> Result<Interface> {
    db::with_write_txn(|t, txn| {
        let mut iface = t.interfaces.get(txn, &interface_id)?.ok_or(Error::NotFound)?;
        if !permission::can_access(iface.creator_id, actor, false)? {
            return Err(Error::Forbidden);
        }
        let pos = iface
            .parameters
            .iter()
            .position(|p| p.id == parameter_id)
            .ok_or(Error::NotFound)?;
        iface.parameters.remove(pos);
        iface.updated_at = current_epoch();
        t.interfaces.put(txn, &interface_id, &iface)?;
        Ok(iface)
    })
}
