//! Apicat - project/interface catalog with ownership-based access control
//!
//! Projects own uniquely-coded interfaces and dictionaries; documents and
//! FAQs stand alone. Every record stamps its creator, and three shared
//! pieces gate all of them:
//!
//! - [`permission::can_access`] authorizes single-record mutation
//! - [`permission::Visibility`] filters list/search results
//! - [`attachment::AttachmentStore`] owns the physical file lifecycle
//!
//! Storage is LMDB via heed; the optional `server` feature adds the axum
//! REST surface and the `apicat-server` binary.

pub mod attachment;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod permission;

#[cfg(feature = "server")]
pub mod server;

pub use config::{Config, DEFAULT_MAX_FILE_SIZE};
pub use error::{Error, Result};
