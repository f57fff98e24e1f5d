//! LMDB environment, tables and transaction helpers
//!
//! Storage layout:
//! - record tables: big-endian u64 id -> JSON record
//! - `usernames`, `interface_codes`, `dictionary_codes`: uniqueness indexes,
//!   name/code -> id, kept in the same write transaction as the record
//! - `sessions`: token hash -> `user_id|created_at|expires_at`
//! - `meta`: sequences (`seq:{table}`) and the bootstrap marker

use std::sync::{Mutex, MutexGuard, OnceLock};

use heed::types::{SerdeJson, Str, U64};
use heed::{Database, Env, EnvOpenOptions, RoTxn, RwTxn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{Dictionary, Document, Faq, Interface, Project, User};

type Id = U64<byteorder::BigEndian>;

/// Sub-databases
pub struct Tables {
    pub users: Database<Id, SerdeJson<User>>,
    /// username -> user id
    pub usernames: Database<Str, Id>,
    pub projects: Database<Id, SerdeJson<Project>>,
    pub interfaces: Database<Id, SerdeJson<Interface>>,
    /// interface code -> interface id
    pub interface_codes: Database<Str, Id>,
    pub dictionaries: Database<Id, SerdeJson<Dictionary>>,
    /// dictionary code -> dictionary id
    pub dictionary_codes: Database<Str, Id>,
    pub documents: Database<Id, SerdeJson<Document>>,
    pub faqs: Database<Id, SerdeJson<Faq>>,
    /// token hash -> `user_id|created_at|expires_at`
    pub sessions: Database<Str, Str>,
    pub meta: Database<Str, Str>,
}

static ENV: OnceLock<Env> = OnceLock::new();
static TABLES: OnceLock<Tables> = OnceLock::new();
static CONFIG: OnceLock<Config> = OnceLock::new();
static TEST_LOCK: Mutex<()> = Mutex::new(());

/// Open the LMDB environment and create all tables.
/// Returns Ok(()) if already initialized (idempotent).
pub fn init(config: Config) -> Result<()> {
    if ENV.get().is_some() {
        return Ok(());
    }

    std::fs::create_dir_all(&config.db_path)?;
    std::fs::create_dir_all(&config.upload_root)?;

    let env = unsafe {
        EnvOpenOptions::new()
            .map_size(1 << 30)
            .max_dbs(12)
            .open(&config.db_path)?
    };

    let mut wtxn = env.write_txn()?;
    let tables = Tables {
        users: env.create_database(&mut wtxn, Some("users"))?,
        usernames: env.create_database(&mut wtxn, Some("usernames"))?,
        projects: env.create_database(&mut wtxn, Some("projects"))?,
        interfaces: env.create_database(&mut wtxn, Some("interfaces"))?,
        interface_codes: env.create_database(&mut wtxn, Some("interface_codes"))?,
        dictionaries: env.create_database(&mut wtxn, Some("dictionaries"))?,
        dictionary_codes: env.create_database(&mut wtxn, Some("dictionary_codes"))?,
        documents: env.create_database(&mut wtxn, Some("documents"))?,
        faqs: env.create_database(&mut wtxn, Some("faqs"))?,
        sessions: env.create_database(&mut wtxn, Some("sessions"))?,
        meta: env.create_database(&mut wtxn, Some("meta"))?,
    };
    wtxn.commit()?;

    let _ = CONFIG.set(config);
    let _ = (ENV.set(env), TABLES.set(tables));
    Ok(())
}

pub fn config() -> Result<&'static Config> {
    CONFIG.get().ok_or_else(|| Error::Db("not initialized, call init() first".into()))
}

fn env() -> Result<&'static Env> {
    ENV.get().ok_or_else(|| Error::Db("not initialized, call init() first".into()))
}

fn tables() -> Result<&'static Tables> {
    TABLES.get().ok_or_else(|| Error::Db("not initialized, call init() first".into()))
}

pub fn with_read_txn<T, F: FnOnce(&Tables, &RoTxn) -> Result<T>>(f: F) -> Result<T> {
    f(tables()?, &env()?.read_txn()?)
}

pub fn with_write_txn<T, F: FnOnce(&Tables, &mut RwTxn) -> Result<T>>(f: F) -> Result<T> {
    let mut txn = env()?.write_txn()?;
    let r = f(tables()?, &mut txn)?;
    txn.commit()?;
    Ok(r)
}

/// Allocate the next id for a record table, inside the caller's transaction
pub fn next_id(t: &Tables, txn: &mut RwTxn, table: &str) -> Result<u64> {
    let key = format!("seq:{}", table);
    let id = t.meta.get(txn, &key)?.and_then(|s| s.parse().ok()).unwrap_or(0u64) + 1;
    t.meta.put(txn, &key, &id.to_string())?;
    Ok(id)
}

/// Epoch milliseconds
pub fn current_epoch() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Drop every row in every table. Test plumbing.
pub fn clear_all() -> Result<()> {
    with_write_txn(|t, txn| {
        t.users.clear(txn)?;
        t.usernames.clear(txn)?;
        t.projects.clear(txn)?;
        t.interfaces.clear(txn)?;
        t.interface_codes.clear(txn)?;
        t.dictionaries.clear(txn)?;
        t.dictionary_codes.clear(txn)?;
        t.documents.clear(txn)?;
        t.faqs.clear(txn)?;
        t.sessions.clear(txn)?;
        t.meta.clear(txn)?;
        Ok(())
    })
}

/// Serializes tests that share the global environment
pub fn test_lock() -> MutexGuard<'static, ()> {
    TEST_LOCK.lock().unwrap_or_else(|p| p.into_inner())
}
