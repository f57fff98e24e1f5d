//! Accounts and token-based session management
//!
//! Tokens are random 32-byte values handed to the client base64url-encoded
//! and stored server-side as SHA-256 hashes. Passwords are salted SHA-256.
//! Nothing secret is compiled in; session lifetime comes from [`Config`].
//!
//! [`Config`]: crate::config::Config

use sha2::{Digest, Sha256};

use crate::db::{self, current_epoch};
use crate::error::{Error, Result};
use crate::model::{Principal, Role, User};

/// Generate a cryptographically secure token (32 bytes, base64url encoded)
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    getrandom::getrandom(&mut bytes).expect("failed to generate random bytes");
    base64url_encode(&bytes)
}

/// Hash token with SHA-256 for storage
fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex_encode(&hasher.finalize())
}

/// Generate random salt (16 bytes, hex encoded)
fn generate_salt() -> String {
    let mut bytes = [0u8; 16];
    getrandom::getrandom(&mut bytes).expect("failed to generate random bytes");
    hex_encode(&bytes)
}

/// Hash password with salt
fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex_encode(&hasher.finalize())
}

/// Base64url encode without padding
fn base64url_encode(data: &[u8]) -> String {
    use base64::Engine;
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(data)
}

fn hex_encode(data: &[u8]) -> String {
    data.iter().map(|b| format!("{:02x}", b)).collect()
}

// ============================================================================
// Users
// ============================================================================

fn insert_user(username: &str, password: &str, role: Role) -> Result<User> {
    let name = username.trim();
    if name.is_empty() {
        return Err(Error::Invalid("username must not be empty".into()));
    }
    db::with_write_txn(|t, txn| {
        if t.usernames.get(txn, name)?.is_some() {
            return Err(Error::Invalid(format!("username already taken: {}", name)));
        }
        let id = db::next_id(t, txn, "users")?;
        let salt = generate_salt();
        let user = User {
            id,
            username: name.to_string(),
            role,
            active: true,
            password_hash: hash_password(&salt, password),
            salt,
            created_at: current_epoch(),
        };
        t.users.put(txn, &id, &user)?;
        t.usernames.put(txn, name, &id)?;
        Ok(user)
    })
}

/// Create an account. Admin-only.
pub fn create_user(actor: &Principal, username: &str, password: &str, role: Role) -> Result<User> {
    if !actor.is_admin() {
        return Err(Error::Forbidden);
    }
    insert_user(username, password, role)
}

pub fn get_user(id: u64) -> Result<Option<User>> {
    db::with_read_txn(|t, txn| Ok(t.users.get(txn, &id)?))
}

pub fn find_user(username: &str) -> Result<Option<User>> {
    db::with_read_txn(|t, txn| {
        match t.usernames.get(txn, username)? {
            Some(id) => Ok(t.users.get(txn, &id)?),
            None => Ok(None),
        }
    })
}

/// List all accounts. Admin-only.
pub fn list_users(actor: &Principal) -> Result<Vec<User>> {
    if !actor.is_admin() {
        return Err(Error::Forbidden);
    }
    db::with_read_txn(|t, txn| {
        let mut users = Vec::new();
        for item in t.users.iter(txn)? {
            let (_, user) = item?;
            users.push(user);
        }
        Ok(users)
    })
}

/// Enable or disable an account. Admin-only. Existing sessions of a
/// deactivated user fail at [`authenticate`] time.
pub fn set_user_active(actor: &Principal, id: u64, active: bool) -> Result<User> {
    if !actor.is_admin() {
        return Err(Error::Forbidden);
    }
    db::with_write_txn(|t, txn| {
        let mut user = t.users.get(txn, &id)?.ok_or(Error::NotFound)?;
        user.active = active;
        t.users.put(txn, &id, &user)?;
        Ok(user)
    })
}

// ============================================================================
// Bootstrap
// ============================================================================

pub fn is_bootstrapped() -> Result<bool> {
    db::with_read_txn(|t, txn| Ok(t.meta.get(txn, "boot")?.is_some()))
}

/// Create the first admin account and return it with a fresh token.
/// Fails once any account exists.
pub fn bootstrap(username: &str, password: &str) -> Result<(User, String)> {
    if is_bootstrapped()? {
        return Err(Error::Invalid("already bootstrapped".into()));
    }
    let user = insert_user(username, password, Role::Admin)?;
    db::with_write_txn(|t, txn| {
        t.meta.put(txn, "boot", "1")?;
        Ok(())
    })?;
    let token = create_session(user.id)?;
    Ok((user, token))
}

// ============================================================================
// Sessions
// ============================================================================

/// Create a session for a user, returns the bearer token
pub fn create_session(user_id: u64) -> Result<String> {
    let token = generate_token();
    let hash = hash_token(&token);
    let now = current_epoch();
    let ttl = db::config()?.token_ttl_secs;
    let expires = if ttl == 0 { 0 } else { now + ttl * 1000 };

    db::with_write_txn(|t, txn| {
        let value = format!("{}|{}|{}", user_id, now, expires);
        t.sessions.put(txn, &hash, &value)?;
        Ok(())
    })?;
    Ok(token)
}

/// Validate a token, returns the user id if the session is live
pub fn validate_session(token: &str) -> Result<u64> {
    let hash = hash_token(token);
    db::with_read_txn(|t, txn| {
        let value = t
            .sessions
            .get(txn, &hash)?
            .ok_or_else(|| Error::Unauthorized("invalid token".into()))?;
        let parts: Vec<&str> = value.split('|').collect();
        if parts.len() != 3 {
            return Err(Error::Unauthorized("corrupted session".into()));
        }
        let user_id: u64 = parts[0]
            .parse()
            .map_err(|_| Error::Unauthorized("corrupted session".into()))?;
        let expires: u64 = parts[2].parse().unwrap_or(0);
        // 0 = never expires
        if expires > 0 && expires < current_epoch() {
            return Err(Error::Unauthorized("token expired".into()));
        }
        Ok(user_id)
    })
}

/// Revoke a session by token
pub fn revoke_session(token: &str) -> Result<bool> {
    let hash = hash_token(token);
    db::with_write_txn(|t, txn| Ok(t.sessions.delete(txn, &hash)?))
}

/// Verify a credential and produce the request's Principal
pub fn authenticate(token: &str) -> Result<Principal> {
    let user_id = validate_session(token)?;
    let user = get_user(user_id)?.ok_or_else(|| Error::Unauthorized("unknown account".into()))?;
    if !user.active {
        return Err(Error::Unauthorized("account disabled".into()));
    }
    Ok(user.principal())
}

/// Verify username/password and open a session
pub fn login(username: &str, password: &str) -> Result<String> {
    let user = find_user(username)?
        .ok_or_else(|| Error::Unauthorized("invalid credentials".into()))?;
    if hash_password(&user.salt, password) != user.password_hash {
        return Err(Error::Unauthorized("invalid credentials".into()));
    }
    if !user.active {
        return Err(Error::Unauthorized("account disabled".into()));
    }
    create_session(user.id)
}
