//! File lifecycle: validation, placement, relocation, deletion,
//! path normalization and the legacy single-file fold

use apicat::attachment::{normalize_for_response, AttachmentStore, Category};
use apicat::model::{Document, DocumentType};
use apicat::Error;
use tempfile::TempDir;

const MAX: u64 = 1024;

fn store() -> (TempDir, AttachmentStore) {
    let dir = TempDir::new().unwrap();
    let store = AttachmentStore::new(dir.path(), MAX);
    (dir, store)
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn category_extension_allow_lists() {
    let (_dir, store) = store();

    assert!(store.validate("report.pdf", 10, Category::Pdf).is_ok());
    assert!(store.validate("report.PDF", 10, Category::Pdf).is_ok());
    assert!(store.validate("photo.png", 10, Category::Pdf).is_err());

    for name in ["a.png", "b.jpg", "c.jpeg", "d.gif", "e.webp", "f.bmp"] {
        assert!(store.validate(name, 10, Category::Image).is_ok(), "{}", name);
    }
    assert!(store.validate("doc.pdf", 10, Category::Image).is_err());

    assert!(store.validate("archive.zip", 10, Category::Other).is_ok());
    assert!(store.validate("no-extension", 10, Category::Other).is_ok());
}

#[test]
fn size_ceiling_is_inclusive() {
    let (_dir, store) = store();

    assert!(store.validate("a.pdf", MAX, Category::Pdf).is_ok());
    let err = store.validate("a.pdf", MAX + 1, Category::Pdf).unwrap_err();
    assert!(matches!(err, Error::InvalidAttachment(_)));
}

#[test]
fn oversized_store_writes_nothing() {
    let (dir, store) = store();
    let bytes = vec![0u8; (MAX + 1) as usize];

    assert!(store.store(&bytes, "big.pdf", Category::Pdf, "documents", None).is_err());
    assert!(!dir.path().join("documents").exists());
}

// ============================================================================
// Store
// ============================================================================

#[test]
fn store_with_owner_lands_in_resource_directory() {
    let (dir, store) = store();
    let meta = store
        .store(b"pdf bytes", "scan.pdf", Category::Pdf, "documents", Some(7))
        .unwrap();

    assert_eq!(meta.filename, "scan.pdf");
    assert!(meta.stored_filename.ends_with("_scan.pdf"));
    assert!(meta.file_path.starts_with("/uploads/documents/7/"));
    assert_eq!(meta.file_size, 9);
    assert_eq!(meta.mime_type.as_deref(), Some("application/pdf"));
    assert!(meta.can_preview);

    let physical = dir.path().join("documents").join("7").join(&meta.stored_filename);
    assert_eq!(std::fs::read(physical).unwrap(), b"pdf bytes");
}

#[test]
fn store_without_owner_uses_holding_directory() {
    let (dir, store) = store();
    let meta = store
        .store(b"x", "draft.pdf", Category::Pdf, "faqs", None)
        .unwrap();

    assert!(meta.file_path.starts_with("/uploads/faqs/"));
    assert!(!meta.file_path.contains("/faqs/0/"));
    assert!(dir.path().join("faqs").join(&meta.stored_filename).exists());
}

#[test]
fn uploaded_filename_is_stripped_to_its_basename() {
    let (_dir, store) = store();
    let meta = store
        .store(b"x", "../../etc/passwd.pdf", Category::Pdf, "documents", Some(1))
        .unwrap();
    assert_eq!(meta.filename, "passwd.pdf");
    assert!(!meta.file_path.contains(".."));
}

#[test]
fn other_category_gets_no_preview_and_unknown_mime() {
    let (_dir, store) = store();
    let meta = store
        .store(b"x", "data.bin", Category::Other, "projects", Some(3))
        .unwrap();
    assert!(!meta.can_preview);
    assert_eq!(meta.mime_type, None);
    assert_eq!(meta.category, "other");
}

// ============================================================================
// Relocate
// ============================================================================

#[test]
fn relocate_moves_the_file_and_rewrites_the_path() {
    let (dir, store) = store();
    let meta = store.store(b"x", "a.pdf", Category::Pdf, "documents", None).unwrap();

    let new_path = store.relocate(&meta.file_path, "documents", 42).unwrap();
    assert_eq!(new_path, format!("/uploads/documents/42/{}", meta.stored_filename));
    assert!(dir.path().join("documents").join("42").join(&meta.stored_filename).exists());
    assert!(!dir.path().join("documents").join(&meta.stored_filename).exists());
}

#[test]
fn relocate_is_idempotent_after_the_move() {
    let (_dir, store) = store();
    let meta = store.store(b"x", "a.pdf", Category::Pdf, "documents", None).unwrap();

    let moved = store.relocate(&meta.file_path, "documents", 42).unwrap();
    // Source is gone now; a retry must succeed and keep the path stable
    let again = store.relocate(&moved, "documents", 42).unwrap();
    assert_eq!(moved, again);
}

#[test]
fn relocate_of_a_missing_source_returns_path_unchanged() {
    let (_dir, store) = store();
    let path = "/uploads/documents/never_stored.pdf";
    assert_eq!(store.relocate(path, "documents", 1).unwrap(), path);
}

// ============================================================================
// Delete
// ============================================================================

#[test]
fn delete_removes_the_file_and_tolerates_absence() {
    let (dir, store) = store();
    let meta = store.store(b"x", "a.pdf", Category::Pdf, "documents", Some(1)).unwrap();

    assert!(store.delete(&meta.file_path));
    assert!(!dir.path().join("documents").join("1").join(&meta.stored_filename).exists());

    // Already gone: success, not an error
    assert!(!store.delete(&meta.file_path));
    assert!(!store.delete("/uploads/documents/ghost.pdf"));
}

// ============================================================================
// Normalization
// ============================================================================

#[test]
fn normalize_strips_scheme_and_host() {
    assert_eq!(
        normalize_for_response("http://example.com:8080/uploads/documents/1/a.pdf"),
        "/uploads/documents/1/a.pdf"
    );
    assert_eq!(
        normalize_for_response("https://example.com/uploads/a.pdf"),
        "/uploads/a.pdf"
    );
}

#[test]
fn normalize_guarantees_a_single_leading_slash() {
    assert_eq!(normalize_for_response("uploads/a.pdf"), "/uploads/a.pdf");
    assert_eq!(normalize_for_response("/uploads/a.pdf"), "/uploads/a.pdf");
    assert_eq!(normalize_for_response("//uploads/a.pdf"), "/uploads/a.pdf");
}

#[test]
fn normalize_converts_windows_separators() {
    assert_eq!(
        normalize_for_response("uploads\\documents\\1\\a.pdf"),
        "/uploads/documents/1/a.pdf"
    );
}

#[test]
fn stored_then_normalized_paths_are_host_agnostic() {
    let (_dir, store) = store();
    let meta = store.store(b"x", "a.pdf", Category::Pdf, "documents", Some(5)).unwrap();
    let normalized = normalize_for_response(&meta.file_path);
    assert!(normalized.starts_with('/'));
    assert!(!normalized.starts_with("//"));
    assert!(!normalized.contains("://"));
    assert_eq!(normalized, meta.file_path);
}

// ============================================================================
// Legacy single-file fold
// ============================================================================

fn legacy_document() -> Document {
    Document {
        id: 7,
        title: "legacy".to_string(),
        description: None,
        region: None,
        person: None,
        document_type: DocumentType::Pdf,
        file_path: Some("uploads/documents/7/123_scan.pdf".to_string()),
        file_name: Some("scan.pdf".to_string()),
        file_size: Some(2048),
        mime_type: Some("application/pdf".to_string()),
        attachments: None,
        creator_id: None,
        created_at: 1_700_000_000_000,
        updated_at: 1_700_000_000_000,
    }
}

#[test]
fn legacy_row_reads_as_a_one_element_attachment_list() {
    let doc = legacy_document();
    let list = doc.effective_attachments();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].file_path, "/uploads/documents/7/123_scan.pdf");
    assert_eq!(list[0].filename, "scan.pdf");
    assert_eq!(list[0].stored_filename, "123_scan.pdf");
    assert_eq!(list[0].file_size, 2048);
    assert_eq!(list[0].category, "pdf");
}

#[test]
fn legacy_fold_is_never_persisted() {
    let doc = legacy_document();
    let _ = doc.effective_attachments();
    // The record itself is untouched
    assert!(doc.attachments.is_none());
    assert!(doc.file_path.is_some());
}

#[test]
fn stored_list_wins_over_legacy_fields() {
    let mut doc = legacy_document();
    let (_dir, store) = store();
    let meta = store.store(b"x", "new.pdf", Category::Pdf, "documents", Some(7)).unwrap();
    doc.attachments = Some(vec![meta.clone()]);

    let list = doc.effective_attachments();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].stored_filename, meta.stored_filename);
}
