//! End-to-end catalog behavior across the five resource kinds

mod common;

use std::path::PathBuf;

use apicat::catalog::{dictionary, document, faq, interface, project, UploadFile};
use apicat::model::{DocumentType, FaqContentType, InterfaceStatus, InterfaceType, ParamDirection};
use apicat::{db, Error};

use common::{bootstrap_admin, create_user, setup};

fn upload_root() -> PathBuf {
    db::config().unwrap().upload_root.clone()
}

fn pdf(name: &str) -> UploadFile {
    UploadFile { filename: name.to_string(), bytes: b"%PDF-1.4 test".to_vec() }
}

fn new_project(name: &str) -> project::NewProject {
    project::NewProject {
        name: name.to_string(),
        manager: "pm".to_string(),
        contact_info: "pm@example.com".to_string(),
        description: Some("test project".to_string()),
        documents: Vec::new(),
    }
}

fn new_interface(project_id: u64, code: &str) -> interface::NewInterface {
    interface::NewInterface {
        project_id,
        name: format!("iface {}", code),
        code: code.to_string(),
        description: None,
        interface_type: InterfaceType::Api,
        url: Some("/v1/query".to_string()),
        method: Some("POST".to_string()),
        category: None,
        tags: None,
        status: InterfaceStatus::Active,
        input_example: None,
        output_example: None,
        notes: None,
        parameters: vec![interface::NewParameter {
            name: "patient id".to_string(),
            field_name: "patient_id".to_string(),
            data_type: "string".to_string(),
            direction: ParamDirection::Input,
            required: true,
            default_value: None,
            description: None,
            example: None,
            order_index: 0,
            dictionary_id: None,
        }],
    }
}

fn new_document(title: &str) -> document::NewDocument {
    document::NewDocument {
        title: title.to_string(),
        description: None,
        region: None,
        person: None,
        document_type: DocumentType::Pdf,
    }
}

// ============================================================================
// Projects
// ============================================================================

#[test]
fn creation_stamps_the_creator_and_update_keeps_it() {
    let _g = setup();
    let admin = bootstrap_admin();
    let alice = create_user(&admin, "alice");

    let p = project::create(&alice, new_project("his")).unwrap();
    assert_eq!(p.creator_id, Some(alice.id));

    let patch = project::ProjectUpdate { name: Some("his v2".to_string()), ..Default::default() };
    let p = project::update(&alice, p.id, patch).unwrap();
    assert_eq!(p.name, "his v2");
    assert_eq!(p.creator_id, Some(alice.id));
}

#[test]
fn project_attachment_upload_and_removal() {
    let _g = setup();
    let admin = bootstrap_admin();
    let alice = create_user(&admin, "alice");

    let p = project::create(&alice, new_project("hub")).unwrap();
    let p = project::upload_attachment(&alice, p.id, pdf("manual.pdf"), "pdf").unwrap();

    let list = p.attachments.clone().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].category, "pdf");
    let physical = upload_root()
        .join("projects")
        .join(p.id.to_string())
        .join(&list[0].stored_filename);
    assert!(physical.exists());

    let p = project::delete_attachment(&alice, p.id, &list[0].stored_filename).unwrap();
    assert!(p.attachments.unwrap().is_empty());
    assert!(!physical.exists());
}

#[test]
fn project_pdf_category_is_validated() {
    let _g = setup();
    let admin = bootstrap_admin();
    let p = project::create(&admin, new_project("hub")).unwrap();

    let file = UploadFile { filename: "notes.txt".to_string(), bytes: b"hi".to_vec() };
    let err = project::upload_attachment(&admin, p.id, file.clone(), "pdf").unwrap_err();
    assert!(matches!(err, Error::InvalidAttachment(_)));

    // Anything goes under the permissive category
    project::upload_attachment(&admin, p.id, file, "other").unwrap();
}

#[test]
fn deleting_a_project_cascades_to_its_children() {
    let _g = setup();
    let admin = bootstrap_admin();

    let p = project::create(&admin, new_project("hub")).unwrap();
    let iface = interface::create(&admin, new_interface(p.id, "PATIENT_QUERY")).unwrap();
    let dict = dictionary::create(
        &admin,
        dictionary::NewDictionary {
            project_id: p.id,
            name: "gender".to_string(),
            code: "GENDER".to_string(),
            description: None,
            entries: Vec::new(),
        },
    )
    .unwrap();

    project::delete(&admin, p.id).unwrap();

    assert!(matches!(interface::get(&admin, iface.id), Err(Error::NotFound)));
    assert!(matches!(dictionary::get(&admin, dict.id), Err(Error::NotFound)));
    // Codes are free again
    let p2 = project::create(&admin, new_project("hub2")).unwrap();
    interface::create(&admin, new_interface(p2.id, "PATIENT_QUERY")).unwrap();
}

// ============================================================================
// Interfaces
// ============================================================================

#[test]
fn interface_codes_are_globally_unique() {
    let _g = setup();
    let admin = bootstrap_admin();
    let p = project::create(&admin, new_project("hub")).unwrap();

    interface::create(&admin, new_interface(p.id, "PATIENT_QUERY")).unwrap();
    let err = interface::create(&admin, new_interface(p.id, "PATIENT_QUERY")).unwrap_err();
    assert!(matches!(err, Error::Invalid(_)));
}

#[test]
fn interface_lookup_by_code() {
    let _g = setup();
    let admin = bootstrap_admin();
    let p = project::create(&admin, new_project("hub")).unwrap();
    let created = interface::create(&admin, new_interface(p.id, "ORDER_PUSH")).unwrap();

    let found = interface::get_by_code(&admin, "ORDER_PUSH").unwrap();
    assert_eq!(found.id, created.id);
    assert_eq!(found.parameters.len(), 1);
}

#[test]
fn code_change_updates_the_uniqueness_index() {
    let _g = setup();
    let admin = bootstrap_admin();
    let p = project::create(&admin, new_project("hub")).unwrap();
    let iface = interface::create(&admin, new_interface(p.id, "OLD_CODE")).unwrap();

    let patch = interface::InterfaceUpdate {
        code: Some("NEW_CODE".to_string()),
        ..Default::default()
    };
    interface::update(&admin, iface.id, patch).unwrap();

    assert!(matches!(interface::get_by_code(&admin, "OLD_CODE"), Err(Error::NotFound)));
    assert_eq!(interface::get_by_code(&admin, "NEW_CODE").unwrap().id, iface.id);
    // Old code is reusable
    interface::create(&admin, new_interface(p.id, "OLD_CODE")).unwrap();
}

#[test]
fn interface_search_filters_and_paginates() {
    let _g = setup();
    let admin = bootstrap_admin();
    let p = project::create(&admin, new_project("hub")).unwrap();

    for i in 0..5 {
        let mut input = new_interface(p.id, &format!("CODE_{}", i));
        input.tags = Some("hl7,query".to_string());
        interface::create(&admin, input).unwrap();
    }
    let mut inactive = new_interface(p.id, "CODE_X");
    inactive.status = InterfaceStatus::Inactive;
    interface::create(&admin, inactive).unwrap();

    let page = interface::search(
        &admin,
        interface::InterfaceSearch {
            status: Some(InterfaceStatus::Active),
            page: 1,
            page_size: 3,
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(page.total, 5);
    assert_eq!(page.items.len(), 3);
    // List view carries no parameter bodies
    assert!(page.items.iter().all(|i| i.parameters.is_empty()));

    let page = interface::search(
        &admin,
        interface::InterfaceSearch {
            tags: Some("hl7".to_string()),
            keyword: Some("code_1".to_string()),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].code, "CODE_1");
}

#[test]
fn restricted_parent_yields_an_empty_page_not_an_error() {
    let _g = setup();
    let admin = bootstrap_admin();
    let alice = create_user(&admin, "alice");
    let bob = create_user(&admin, "bob");

    let p = project::create(&bob, new_project("bob-hub")).unwrap();
    interface::create(&bob, new_interface(p.id, "SECRET_IFACE")).unwrap();

    let page = interface::search(
        &alice,
        interface::InterfaceSearch { project_id: Some(p.id), ..Default::default() },
    )
    .unwrap();
    assert_eq!(page.total, 0);
    assert!(page.items.is_empty());

    let dicts = dictionary::list(&alice, 0, 100, Some(p.id), None).unwrap();
    assert!(dicts.is_empty());
}

#[test]
fn parameter_ids_survive_removal() {
    let _g = setup();
    let admin = bootstrap_admin();
    let p = project::create(&admin, new_project("hub")).unwrap();
    let iface = interface::create(&admin, new_interface(p.id, "CODE_A")).unwrap();
    let first_id = iface.parameters[0].id;

    let iface = interface::add_parameter(
        &admin,
        iface.id,
        interface::NewParameter {
            name: "result".to_string(),
            field_name: "result".to_string(),
            data_type: "string".to_string(),
            direction: ParamDirection::Output,
            required: false,
            default_value: None,
            description: None,
            example: None,
            order_index: 1,
            dictionary_id: None,
        },
    )
    .unwrap();
    let second_id = iface.parameters[1].id;
    assert_ne!(first_id, second_id);

    let iface = interface::update_parameter(
        &admin,
        iface.id,
        second_id,
        interface::ParameterUpdate {
            required: Some(true),
            description: Some("query result payload".to_string()),
            ..Default::default()
        },
    )
    .unwrap();
    assert!(iface.parameters[1].required);

    let iface = interface::delete_parameter(&admin, iface.id, first_id).unwrap();
    assert_eq!(iface.parameters.len(), 1);
    assert_eq!(iface.parameters[0].id, second_id);
}

#[test]
fn project_scoped_listing_respects_parent_visibility() {
    let _g = setup();
    let admin = bootstrap_admin();
    let alice = create_user(&admin, "alice");
    let bob = create_user(&admin, "bob");

    let mine = project::create(&alice, new_project("alice-hub")).unwrap();
    interface::create(&alice, new_interface(mine.id, "MINE_A")).unwrap();

    let theirs = project::create(&bob, new_project("bob-hub")).unwrap();
    interface::create(&bob, new_interface(theirs.id, "THEIRS_A")).unwrap();

    let visible = interface::list_for_project(&alice, mine.id).unwrap();
    assert_eq!(visible.len(), 1);
    assert!(interface::list_for_project(&alice, theirs.id).unwrap().is_empty());
    assert_eq!(interface::list_for_project(&admin, theirs.id).unwrap().len(), 1);
}

// ============================================================================
// Dictionaries
// ============================================================================

#[test]
fn dictionary_entries_are_managed_in_place() {
    let _g = setup();
    let admin = bootstrap_admin();
    let p = project::create(&admin, new_project("hub")).unwrap();

    let dict = dictionary::create(
        &admin,
        dictionary::NewDictionary {
            project_id: p.id,
            name: "gender".to_string(),
            code: "GENDER".to_string(),
            description: None,
            entries: vec![dictionary::NewDictEntry {
                key: "M".to_string(),
                value: "male".to_string(),
                description: None,
                order_index: 0,
            }],
        },
    )
    .unwrap();
    assert_eq!(dict.entries.len(), 1);

    let dict = dictionary::add_entry(
        &admin,
        dict.id,
        dictionary::NewDictEntry {
            key: "F".to_string(),
            value: "female".to_string(),
            description: None,
            order_index: 1,
        },
    )
    .unwrap();
    assert_eq!(dict.entries.len(), 2);

    let entry_id = dict.entries[0].id;
    let dict = dictionary::delete_entry(&admin, dict.id, entry_id).unwrap();
    assert_eq!(dict.entries.len(), 1);
    assert_eq!(dictionary::entries(&admin, dict.id).unwrap().len(), 1);
}

// ============================================================================
// Documents
// ============================================================================

#[test]
fn document_create_relocates_files_under_its_id() {
    let _g = setup();
    let admin = bootstrap_admin();

    let doc = document::create(
        &admin,
        new_document("integration guide"),
        vec![pdf("guide.pdf"), pdf("appendix.pdf")],
    )
    .unwrap();

    let list = doc.attachments.clone().unwrap();
    assert_eq!(list.len(), 2);
    for att in &list {
        assert!(att.file_path.starts_with(&format!("/uploads/documents/{}/", doc.id)));
        let physical = upload_root()
            .join("documents")
            .join(doc.id.to_string())
            .join(&att.stored_filename);
        assert!(physical.exists());
    }
    // Holding directory is empty again
    let stray: Vec<_> = std::fs::read_dir(upload_root().join("documents"))
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .collect();
    assert!(stray.is_empty());
}

#[test]
fn document_type_drives_the_allow_list() {
    let _g = setup();
    let admin = bootstrap_admin();

    let mut input = new_document("screenshots");
    input.document_type = DocumentType::Image;
    let err = document::create(&admin, input, vec![pdf("a.pdf")]).unwrap_err();
    assert!(matches!(err, Error::InvalidAttachment(_)));
}

#[test]
fn cross_user_delete_is_forbidden_and_admin_delete_removes_files() {
    let _g = setup();
    let admin = bootstrap_admin();
    let alice = create_user(&admin, "alice");
    let bob = create_user(&admin, "bob");

    let doc = document::create(&alice, new_document("private"), vec![pdf("scan.pdf")]).unwrap();
    let att = doc.attachments.clone().unwrap().remove(0);
    let physical = upload_root()
        .join("documents")
        .join(doc.id.to_string())
        .join(&att.stored_filename);
    assert!(physical.exists());

    let err = document::delete(&bob, doc.id).unwrap_err();
    assert!(matches!(err, Error::Forbidden));
    assert!(physical.exists());

    document::delete(&admin, doc.id).unwrap();
    assert!(!physical.exists());
    assert!(matches!(document::get(&admin, doc.id), Err(Error::NotFound)));
}

#[test]
fn document_search_orders_newest_first() {
    let _g = setup();
    let admin = bootstrap_admin();

    let a = document::create(&admin, new_document("first"), Vec::new()).unwrap();
    let b = document::create(&admin, new_document("second"), Vec::new()).unwrap();
    let c = document::create(&admin, new_document("third"), Vec::new()).unwrap();

    let page = document::search(&admin, document::DocumentSearch::default()).unwrap();
    assert_eq!(page.total, 3);
    let ids: Vec<u64> = page.items.iter().map(|d| d.id).collect();
    // Same-millisecond rows fall back to descending id
    assert_eq!(ids, vec![c.id, b.id, a.id]);

    let page = document::search(
        &admin,
        document::DocumentSearch { keyword: Some("SECOND".to_string()), ..Default::default() },
    )
    .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].id, b.id);
}

#[test]
fn appending_files_migrates_a_legacy_row() {
    let _g = setup();
    let admin = bootstrap_admin();

    // Seed a pre-migration row directly
    let id = db::with_write_txn(|t, txn| {
        let id = db::next_id(t, txn, "documents")?;
        let doc = apicat::model::Document {
            id,
            title: "legacy".to_string(),
            description: None,
            region: None,
            person: None,
            document_type: DocumentType::Pdf,
            file_path: Some(format!("uploads/documents/{}/123_old.pdf", id)),
            file_name: Some("old.pdf".to_string()),
            file_size: Some(10),
            mime_type: Some("application/pdf".to_string()),
            attachments: None,
            creator_id: Some(admin.id),
            created_at: db::current_epoch(),
            updated_at: db::current_epoch(),
        };
        t.documents.put(txn, &id, &doc)?;
        Ok(id)
    })
    .unwrap();

    let doc = document::upload_attachments(&admin, id, vec![pdf("new.pdf")]).unwrap();
    let list = doc.attachments.clone().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].stored_filename, "123_old.pdf");
    // Legacy fields are cleared once the list owns the truth
    assert!(doc.file_path.is_none());
    assert!(doc.file_name.is_none());
}

// ============================================================================
// FAQs
// ============================================================================

#[test]
fn attachment_faq_requires_exactly_one_pdf() {
    let _g = setup();
    let admin = bootstrap_admin();

    let input = faq::NewFaq {
        title: "how to connect".to_string(),
        description: None,
        module: None,
        person: None,
        content_type: FaqContentType::Attachment,
        rich_content: None,
    };
    let err = faq::create(&admin, input.clone(), None).unwrap_err();
    assert!(matches!(err, Error::Invalid(_)));

    let created = faq::create(&admin, input, Some(pdf("howto.pdf"))).unwrap();
    let list = created.attachments.clone().unwrap();
    assert_eq!(list.len(), 1);
    assert!(list[0].file_path.starts_with(&format!("/uploads/faqs/{}/", created.id)));
}

#[test]
fn rich_text_faq_requires_content_and_rejects_files() {
    let _g = setup();
    let admin = bootstrap_admin();

    let mut input = faq::NewFaq {
        title: "faq".to_string(),
        description: None,
        module: None,
        person: None,
        content_type: FaqContentType::RichText,
        rich_content: None,
    };
    assert!(matches!(faq::create(&admin, input.clone(), None), Err(Error::Invalid(_))));

    input.rich_content = Some("<p>answer</p>".to_string());
    assert!(matches!(
        faq::create(&admin, input.clone(), Some(pdf("extra.pdf"))),
        Err(Error::Invalid(_))
    ));

    let created = faq::create(&admin, input, None).unwrap();
    assert!(created.attachments.is_none());
    assert_eq!(created.rich_content.as_deref(), Some("<p>answer</p>"));
}

#[test]
fn replacing_the_faq_pdf_removes_the_old_file() {
    let _g = setup();
    let admin = bootstrap_admin();

    let input = faq::NewFaq {
        title: "guide".to_string(),
        description: None,
        module: Some("lab".to_string()),
        person: None,
        content_type: FaqContentType::Attachment,
        rich_content: None,
    };
    let created = faq::create(&admin, input, Some(pdf("v1.pdf"))).unwrap();
    let old = created.attachments.clone().unwrap().remove(0);
    let old_physical = upload_root()
        .join("faqs")
        .join(created.id.to_string())
        .join(&old.stored_filename);
    assert!(old_physical.exists());

    let updated = faq::replace_attachment(&admin, created.id, pdf("v2.pdf")).unwrap();
    let new = updated.attachments.clone().unwrap().remove(0);
    assert_eq!(new.filename, "v2.pdf");
    assert!(!old_physical.exists());
}

#[test]
fn deleting_the_faq_attachment_entry_removes_the_file() {
    let _g = setup();
    let admin = bootstrap_admin();

    let input = faq::NewFaq {
        title: "guide".to_string(),
        description: None,
        module: None,
        person: None,
        content_type: FaqContentType::Attachment,
        rich_content: None,
    };
    let created = faq::create(&admin, input, Some(pdf("guide.pdf"))).unwrap();
    let att = created.attachments.clone().unwrap().remove(0);
    let physical = upload_root()
        .join("faqs")
        .join(created.id.to_string())
        .join(&att.stored_filename);
    assert!(physical.exists());

    let updated = faq::delete_attachment(&admin, created.id, &att.stored_filename).unwrap();
    assert!(updated.attachments.unwrap().is_empty());
    assert!(!physical.exists());
}

#[test]
fn faq_search_respects_visibility() {
    let _g = setup();
    let admin = bootstrap_admin();
    let alice = create_user(&admin, "alice");
    let bob = create_user(&admin, "bob");

    let mk = |title: &str| faq::NewFaq {
        title: title.to_string(),
        description: None,
        module: None,
        person: None,
        content_type: FaqContentType::RichText,
        rich_content: Some("x".to_string()),
    };
    faq::create(&alice, mk("alice faq"), None).unwrap();
    faq::create(&bob, mk("bob faq"), None).unwrap();
    faq::create(&admin, mk("admin faq"), None).unwrap();

    let page = faq::search(&alice, faq::FaqSearch::default()).unwrap();
    let titles: Vec<&str> = page.items.iter().map(|f| f.title.as_str()).collect();
    assert_eq!(page.total, 2);
    assert!(titles.contains(&"alice faq"));
    assert!(titles.contains(&"admin faq"));
    assert!(!titles.contains(&"bob faq"));
}
