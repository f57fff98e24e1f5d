//! Shared test plumbing: one LMDB environment per test binary, serialized
//! tests, a wiped database per test.

use std::sync::{MutexGuard, OnceLock};

use tempfile::TempDir;

use apicat::model::{Principal, Role};
use apicat::{auth, db, Config};

static TEST_DIR: OnceLock<TempDir> = OnceLock::new();

pub fn setup() -> MutexGuard<'static, ()> {
    let guard = db::test_lock();
    let dir = TEST_DIR.get_or_init(|| TempDir::new().unwrap());
    let config = Config::new(dir.path().join("db"), dir.path().join("uploads"));
    db::init(config).unwrap();
    db::clear_all().unwrap();
    guard
}

/// Bootstrap the first admin and return its principal
pub fn bootstrap_admin() -> Principal {
    let (user, _token) = auth::bootstrap("root", "root-password").unwrap();
    user.principal()
}

/// Create a regular account through the admin
#[allow(dead_code)]
pub fn create_user(admin: &Principal, name: &str) -> Principal {
    auth::create_user(admin, name, "password", Role::User)
        .unwrap()
        .principal()
}

/// Create a second admin account
#[allow(dead_code)]
pub fn create_admin(admin: &Principal, name: &str) -> Principal {
    auth::create_user(admin, name, "password", Role::Admin)
        .unwrap()
        .principal()
}
