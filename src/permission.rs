//! Ownership-based authorization core
//!
//! Two entry points, shared by every resource kind:
//!
//! - [`can_access`] decides whether one caller may touch one resource, given
//!   the resource's recorded creator. Mutations pass `allow_read = false`.
//! - [`Visibility`] is the list/search predicate: a non-admin sees only
//!   resources created by itself, by an admin, or by nobody.
//!
//! Both are pure over externally supplied data apart from the read-only
//! owner/admin lookups.

use std::collections::HashSet;

use crate::auth;
use crate::db;
use crate::error::Result;
use crate::model::{Principal, Role};

/// Decide whether `principal` may operate on a resource created by `owner_id`.
///
/// Rules:
/// - admins pass unconditionally
/// - an unowned resource (legacy row) is admin-only
/// - a vanished owner means no permission, not an error
/// - an admin-owned resource is readable by anyone when `allow_read`, but
///   never writable by a non-admin
/// - otherwise only the creator itself passes
pub fn can_access(owner_id: Option<u64>, principal: &Principal, allow_read: bool) -> Result<bool> {
    if principal.role == Role::Admin {
        return Ok(true);
    }
    let Some(owner_id) = owner_id else {
        return Ok(false);
    };
    match auth::get_user(owner_id)? {
        None => Ok(false),
        Some(owner) if owner.role == Role::Admin => Ok(allow_read),
        Some(_) => Ok(owner_id == principal.id),
    }
}

/// List/search predicate over ownership records
#[derive(Debug, Clone)]
pub enum Visibility {
    /// Admin caller: everything matches
    All,
    /// Non-admin caller: own rows, admin-created rows, unowned rows
    Restricted { caller: u64, admin_ids: HashSet<u64> },
}

impl Visibility {
    /// Build the predicate for one filter evaluation. The admin-id set is
    /// computed here, once, so the per-row check stays O(1).
    pub fn for_principal(principal: &Principal) -> Result<Visibility> {
        if principal.role == Role::Admin {
            return Ok(Visibility::All);
        }
        let admin_ids = db::with_read_txn(|t, txn| {
            let mut ids = HashSet::new();
            for item in t.users.iter(txn)? {
                let (id, user) = item?;
                if user.role == Role::Admin {
                    ids.insert(id);
                }
            }
            Ok(ids)
        })?;
        Ok(Visibility::Restricted { caller: principal.id, admin_ids })
    }

    pub fn allows(&self, creator_id: Option<u64>) -> bool {
        match self {
            Visibility::All => true,
            Visibility::Restricted { caller, admin_ids } => match creator_id {
                None => true,
                Some(id) => id == *caller || admin_ids.contains(&id),
            },
        }
    }
}
