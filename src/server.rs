//! Apicat HTTP server
//!
//! REST surface over the catalog services. Callers authenticate with a
//! bearer token from `POST /auth/login`; file uploads travel as base64
//! fields in JSON bodies.
//!
//! Run with: cargo run --release --features server --bin apicat-server

use axum::{
    extract::{Path, Query},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::attachment::normalize_for_response;
use crate::auth;
use crate::catalog::{dictionary, document, faq, interface, project, Page, UploadFile};
use crate::error::{Error, Result};
use crate::model::{
    Attachment, Dictionary, Document, DocumentType, Faq, FaqContentType, Interface, Principal,
    Project, Role, User,
};

// ============================================================================
// Error mapping
// ============================================================================

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::Forbidden => StatusCode::FORBIDDEN,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::InvalidAttachment(_) | Error::Invalid(_) => StatusCode::BAD_REQUEST,
            Error::Storage(_) | Error::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}

/// Pull the caller's Principal out of the Authorization header
fn principal(headers: &HeaderMap) -> Result<Principal> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| Error::Unauthorized("missing bearer token".into()))?;
    auth::authenticate(token)
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct BootstrapRequest {
    username: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct TokenResponse {
    token: String,
}

#[derive(Debug, Deserialize)]
struct CreateUserRequest {
    username: String,
    password: String,
    role: Role,
}

#[derive(Debug, Deserialize)]
struct SetActiveRequest {
    active: bool,
}

/// Account view without credential material
#[derive(Debug, Serialize)]
struct UserResponse {
    id: u64,
    username: String,
    role: Role,
    active: bool,
    created_at: u64,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        UserResponse {
            id: u.id,
            username: u.username,
            role: u.role,
            active: u.active,
            created_at: u.created_at,
        }
    }
}

/// One uploaded file, base64-encoded in the JSON body
#[derive(Debug, Deserialize)]
struct FileUpload {
    filename: String,
    /// Standard base64 of the raw bytes
    content: String,
}

fn decode_file(upload: &FileUpload) -> Result<UploadFile> {
    use base64::Engine;
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(upload.content.as_bytes())
        .map_err(|_| Error::Invalid("file content is not valid base64".into()))?;
    Ok(UploadFile { filename: upload.filename.clone(), bytes })
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    #[serde(default)]
    skip: usize,
    #[serde(default = "default_limit")]
    limit: usize,
    keyword: Option<String>,
    project_id: Option<u64>,
}

fn default_limit() -> usize {
    100
}

#[derive(Debug, Deserialize)]
struct ProjectUploadRequest {
    file: FileUpload,
    #[serde(default = "default_category")]
    category: String,
}

fn default_category() -> String {
    "other".to_string()
}

#[derive(Debug, Deserialize)]
struct CreateDocumentRequest {
    #[serde(flatten)]
    document: document::NewDocument,
    #[serde(default)]
    files: Vec<FileUpload>,
}

#[derive(Debug, Deserialize)]
struct UploadFilesRequest {
    files: Vec<FileUpload>,
}

#[derive(Debug, Deserialize)]
struct CreateFaqRequest {
    #[serde(flatten)]
    faq: faq::NewFaq,
    file: Option<FileUpload>,
}

#[derive(Debug, Deserialize)]
struct ReplaceFileRequest {
    file: FileUpload,
}

/// Attachment view with the path normalized for clients
fn normalized(mut att: Attachment) -> Attachment {
    att.file_path = normalize_for_response(&att.file_path);
    att
}

#[derive(Debug, Serialize)]
struct ProjectResponse {
    id: u64,
    name: String,
    manager: String,
    contact_info: String,
    description: Option<String>,
    documents: Vec<crate::model::DocumentRef>,
    attachments: Vec<Attachment>,
    creator_id: Option<u64>,
    created_at: u64,
    updated_at: u64,
}

impl From<Project> for ProjectResponse {
    fn from(p: Project) -> Self {
        let attachments = p
            .attachments
            .unwrap_or_default()
            .into_iter()
            .map(normalized)
            .collect();
        ProjectResponse {
            id: p.id,
            name: p.name,
            manager: p.manager,
            contact_info: p.contact_info,
            description: p.description,
            documents: p.documents,
            attachments,
            creator_id: p.creator_id,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct DocumentResponse {
    id: u64,
    title: String,
    description: Option<String>,
    region: Option<String>,
    person: Option<String>,
    document_type: DocumentType,
    attachments: Vec<Attachment>,
    creator_id: Option<u64>,
    created_at: u64,
    updated_at: u64,
}

impl From<Document> for DocumentResponse {
    fn from(d: Document) -> Self {
        let attachments = d.effective_attachments().into_iter().map(normalized).collect();
        DocumentResponse {
            id: d.id,
            title: d.title,
            description: d.description,
            region: d.region,
            person: d.person,
            document_type: d.document_type,
            attachments,
            creator_id: d.creator_id,
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct FaqResponse {
    id: u64,
    title: String,
    description: Option<String>,
    module: Option<String>,
    person: Option<String>,
    content_type: FaqContentType,
    rich_content: Option<String>,
    attachments: Vec<Attachment>,
    creator_id: Option<u64>,
    created_at: u64,
    updated_at: u64,
}

impl From<Faq> for FaqResponse {
    fn from(f: Faq) -> Self {
        let attachments = f.effective_attachments().into_iter().map(normalized).collect();
        FaqResponse {
            id: f.id,
            title: f.title,
            description: f.description,
            module: f.module,
            person: f.person,
            content_type: f.content_type,
            rich_content: f.rich_content,
            attachments,
            creator_id: f.creator_id,
            created_at: f.created_at,
            updated_at: f.updated_at,
        }
    }
}

fn map_page<T, U: From<T>>(page: Page<T>) -> Page<U> {
    Page {
        total: page.total,
        page: page.page,
        page_size: page.page_size,
        items: page.items.into_iter().map(U::from).collect(),
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

// ============================================================================
// Handlers: health, bootstrap, auth, users
// ============================================================================

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok", version: env!("CARGO_PKG_VERSION") })
}

async fn bootstrap(Json(req): Json<BootstrapRequest>) -> Result<Json<TokenResponse>> {
    let (_, token) = auth::bootstrap(&req.username, &req.password)?;
    Ok(Json(TokenResponse { token }))
}

async fn login(Json(req): Json<LoginRequest>) -> Result<Json<TokenResponse>> {
    let token = auth::login(&req.username, &req.password)?;
    Ok(Json(TokenResponse { token }))
}

async fn logout(headers: HeaderMap) -> Result<StatusCode> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| Error::Unauthorized("missing bearer token".into()))?;
    auth::revoke_session(token)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn me(headers: HeaderMap) -> Result<Json<UserResponse>> {
    let actor = principal(&headers)?;
    let user = auth::get_user(actor.id)?
        .ok_or_else(|| Error::Unauthorized("unknown account".into()))?;
    Ok(Json(user.into()))
}

async fn create_user(
    headers: HeaderMap,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    let actor = principal(&headers)?;
    let user = auth::create_user(&actor, &req.username, &req.password, req.role)?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

async fn list_users(headers: HeaderMap) -> Result<Json<Vec<UserResponse>>> {
    let actor = principal(&headers)?;
    let users = auth::list_users(&actor)?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}

async fn set_user_active(
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(req): Json<SetActiveRequest>,
) -> Result<Json<UserResponse>> {
    let actor = principal(&headers)?;
    let user = auth::set_user_active(&actor, id, req.active)?;
    Ok(Json(user.into()))
}

// ============================================================================
// Handlers: projects
// ============================================================================

async fn create_project(
    headers: HeaderMap,
    Json(req): Json<project::NewProject>,
) -> Result<(StatusCode, Json<ProjectResponse>)> {
    let actor = principal(&headers)?;
    let p = project::create(&actor, req)?;
    Ok((StatusCode::CREATED, Json(p.into())))
}

async fn get_project(headers: HeaderMap, Path(id): Path<u64>) -> Result<Json<ProjectResponse>> {
    let actor = principal(&headers)?;
    Ok(Json(project::get(&actor, id)?.into()))
}

async fn list_projects(
    headers: HeaderMap,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<ProjectResponse>>> {
    let actor = principal(&headers)?;
    let projects = project::list(&actor, q.skip, q.limit, q.keyword.as_deref())?;
    Ok(Json(projects.into_iter().map(Into::into).collect()))
}

async fn update_project(
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(req): Json<project::ProjectUpdate>,
) -> Result<Json<ProjectResponse>> {
    let actor = principal(&headers)?;
    Ok(Json(project::update(&actor, id, req)?.into()))
}

async fn delete_project(headers: HeaderMap, Path(id): Path<u64>) -> Result<StatusCode> {
    let actor = principal(&headers)?;
    project::delete(&actor, id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn upload_project_attachment(
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(req): Json<ProjectUploadRequest>,
) -> Result<Json<ProjectResponse>> {
    let actor = principal(&headers)?;
    let file = decode_file(&req.file)?;
    Ok(Json(project::upload_attachment(&actor, id, file, &req.category)?.into()))
}

async fn delete_project_attachment(
    headers: HeaderMap,
    Path((id, stored_filename)): Path<(u64, String)>,
) -> Result<Json<ProjectResponse>> {
    let actor = principal(&headers)?;
    Ok(Json(project::delete_attachment(&actor, id, &stored_filename)?.into()))
}

// ============================================================================
// Handlers: interfaces
// ============================================================================

async fn create_interface(
    headers: HeaderMap,
    Json(req): Json<interface::NewInterface>,
) -> Result<(StatusCode, Json<Interface>)> {
    let actor = principal(&headers)?;
    Ok((StatusCode::CREATED, Json(interface::create(&actor, req)?)))
}

async fn get_interface(headers: HeaderMap, Path(id): Path<u64>) -> Result<Json<Interface>> {
    let actor = principal(&headers)?;
    Ok(Json(interface::get(&actor, id)?))
}

async fn get_interface_by_code(
    headers: HeaderMap,
    Path(code): Path<String>,
) -> Result<Json<Interface>> {
    let actor = principal(&headers)?;
    Ok(Json(interface::get_by_code(&actor, &code)?))
}

async fn list_interfaces(
    headers: HeaderMap,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<Interface>>> {
    let actor = principal(&headers)?;
    Ok(Json(interface::list(&actor, q.skip, q.limit)?))
}

async fn search_interfaces(
    headers: HeaderMap,
    Json(req): Json<interface::InterfaceSearch>,
) -> Result<Json<Page<Interface>>> {
    let actor = principal(&headers)?;
    Ok(Json(interface::search(&actor, req)?))
}

async fn update_interface(
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(req): Json<interface::InterfaceUpdate>,
) -> Result<Json<Interface>> {
    let actor = principal(&headers)?;
    Ok(Json(interface::update(&actor, id, req)?))
}

async fn delete_interface(headers: HeaderMap, Path(id): Path<u64>) -> Result<StatusCode> {
    let actor = principal(&headers)?;
    interface::delete(&actor, id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn add_parameter(
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(req): Json<interface::NewParameter>,
) -> Result<(StatusCode, Json<Interface>)> {
    let actor = principal(&headers)?;
    Ok((StatusCode::CREATED, Json(interface::add_parameter(&actor, id, req)?)))
}

async fn update_parameter(
    headers: HeaderMap,
    Path((id, parameter_id)): Path<(u64, u64)>,
    Json(req): Json<interface::ParameterUpdate>,
) -> Result<Json<Interface>> {
    let actor = principal(&headers)?;
    Ok(Json(interface::update_parameter(&actor, id, parameter_id, req)?))
}

async fn delete_parameter(
    headers: HeaderMap,
    Path((id, parameter_id)): Path<(u64, u64)>,
) -> Result<Json<Interface>> {
    let actor = principal(&headers)?;
    Ok(Json(interface::delete_parameter(&actor, id, parameter_id)?))
}

async fn list_project_interfaces(
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Result<Json<Vec<Interface>>> {
    let actor = principal(&headers)?;
    Ok(Json(interface::list_for_project(&actor, id)?))
}

async fn list_project_dictionaries(
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Result<Json<Vec<Dictionary>>> {
    let actor = principal(&headers)?;
    Ok(Json(dictionary::list(&actor, 0, 1000, Some(id), None)?))
}

// ============================================================================
// Handlers: dictionaries
// ============================================================================

async fn create_dictionary(
    headers: HeaderMap,
    Json(req): Json<dictionary::NewDictionary>,
) -> Result<(StatusCode, Json<Dictionary>)> {
    let actor = principal(&headers)?;
    Ok((StatusCode::CREATED, Json(dictionary::create(&actor, req)?)))
}

async fn get_dictionary(headers: HeaderMap, Path(id): Path<u64>) -> Result<Json<Dictionary>> {
    let actor = principal(&headers)?;
    Ok(Json(dictionary::get(&actor, id)?))
}

async fn get_dictionary_by_code(
    headers: HeaderMap,
    Path(code): Path<String>,
) -> Result<Json<Dictionary>> {
    let actor = principal(&headers)?;
    Ok(Json(dictionary::get_by_code(&actor, &code)?))
}

async fn list_dictionaries(
    headers: HeaderMap,
    Query(q): Query<ListQuery>,
) -> Result<Json<Vec<Dictionary>>> {
    let actor = principal(&headers)?;
    let items = dictionary::list(&actor, q.skip, q.limit, q.project_id, q.keyword.as_deref())?;
    Ok(Json(items))
}

async fn update_dictionary(
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(req): Json<dictionary::DictionaryUpdate>,
) -> Result<Json<Dictionary>> {
    let actor = principal(&headers)?;
    Ok(Json(dictionary::update(&actor, id, req)?))
}

async fn delete_dictionary(headers: HeaderMap, Path(id): Path<u64>) -> Result<StatusCode> {
    let actor = principal(&headers)?;
    dictionary::delete(&actor, id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_dictionary_entries(
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Result<Json<Vec<crate::model::DictEntry>>> {
    let actor = principal(&headers)?;
    Ok(Json(dictionary::entries(&actor, id)?))
}

async fn add_dictionary_entry(
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(req): Json<dictionary::NewDictEntry>,
) -> Result<(StatusCode, Json<Dictionary>)> {
    let actor = principal(&headers)?;
    Ok((StatusCode::CREATED, Json(dictionary::add_entry(&actor, id, req)?)))
}

async fn delete_dictionary_entry(
    headers: HeaderMap,
    Path((id, entry_id)): Path<(u64, u64)>,
) -> Result<Json<Dictionary>> {
    let actor = principal(&headers)?;
    Ok(Json(dictionary::delete_entry(&actor, id, entry_id)?))
}

// ============================================================================
// Handlers: documents
// ============================================================================

async fn create_document(
    headers: HeaderMap,
    Json(req): Json<CreateDocumentRequest>,
) -> Result<(StatusCode, Json<DocumentResponse>)> {
    let actor = principal(&headers)?;
    let files = req.files.iter().map(decode_file).collect::<Result<Vec<_>>>()?;
    let doc = document::create(&actor, req.document, files)?;
    Ok((StatusCode::CREATED, Json(doc.into())))
}

async fn get_document(headers: HeaderMap, Path(id): Path<u64>) -> Result<Json<DocumentResponse>> {
    let actor = principal(&headers)?;
    Ok(Json(document::get(&actor, id)?.into()))
}

async fn search_documents(
    headers: HeaderMap,
    Json(req): Json<document::DocumentSearch>,
) -> Result<Json<Page<DocumentResponse>>> {
    let actor = principal(&headers)?;
    Ok(Json(map_page(document::search(&actor, req)?)))
}

async fn update_document(
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(req): Json<document::DocumentUpdate>,
) -> Result<Json<DocumentResponse>> {
    let actor = principal(&headers)?;
    Ok(Json(document::update(&actor, id, req)?.into()))
}

async fn upload_document_attachments(
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(req): Json<UploadFilesRequest>,
) -> Result<Json<DocumentResponse>> {
    let actor = principal(&headers)?;
    let files = req.files.iter().map(decode_file).collect::<Result<Vec<_>>>()?;
    Ok(Json(document::upload_attachments(&actor, id, files)?.into()))
}

async fn delete_document_attachment(
    headers: HeaderMap,
    Path((id, stored_filename)): Path<(u64, String)>,
) -> Result<Json<DocumentResponse>> {
    let actor = principal(&headers)?;
    Ok(Json(document::delete_attachment(&actor, id, &stored_filename)?.into()))
}

async fn delete_document(headers: HeaderMap, Path(id): Path<u64>) -> Result<StatusCode> {
    let actor = principal(&headers)?;
    document::delete(&actor, id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Handlers: FAQs
// ============================================================================

async fn create_faq(
    headers: HeaderMap,
    Json(req): Json<CreateFaqRequest>,
) -> Result<(StatusCode, Json<FaqResponse>)> {
    let actor = principal(&headers)?;
    let file = req.file.as_ref().map(decode_file).transpose()?;
    let faq = faq::create(&actor, req.faq, file)?;
    Ok((StatusCode::CREATED, Json(faq.into())))
}

async fn get_faq(headers: HeaderMap, Path(id): Path<u64>) -> Result<Json<FaqResponse>> {
    let actor = principal(&headers)?;
    Ok(Json(faq::get(&actor, id)?.into()))
}

async fn search_faqs(
    headers: HeaderMap,
    Json(req): Json<faq::FaqSearch>,
) -> Result<Json<Page<FaqResponse>>> {
    let actor = principal(&headers)?;
    Ok(Json(map_page(faq::search(&actor, req)?)))
}

async fn update_faq(
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(req): Json<faq::FaqUpdate>,
) -> Result<Json<FaqResponse>> {
    let actor = principal(&headers)?;
    Ok(Json(faq::update(&actor, id, req)?.into()))
}

async fn replace_faq_attachment(
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(req): Json<ReplaceFileRequest>,
) -> Result<Json<FaqResponse>> {
    let actor = principal(&headers)?;
    let file = decode_file(&req.file)?;
    Ok(Json(faq::replace_attachment(&actor, id, file)?.into()))
}

async fn delete_faq_attachment(
    headers: HeaderMap,
    Path((id, stored_filename)): Path<(u64, String)>,
) -> Result<Json<FaqResponse>> {
    let actor = principal(&headers)?;
    Ok(Json(faq::delete_attachment(&actor, id, &stored_filename)?.into()))
}

async fn delete_faq(headers: HeaderMap, Path(id): Path<u64>) -> Result<StatusCode> {
    let actor = principal(&headers)?;
    faq::delete(&actor, id)?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Router
// ============================================================================

pub fn router() -> Router {
    Router::new()
        // Health
        .route("/health", get(health))
        // Auth
        .route("/auth/bootstrap", post(bootstrap))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
        // Users
        .route("/users", post(create_user).get(list_users))
        .route("/users/:id/active", put(set_user_active))
        // Projects
        .route("/projects", post(create_project).get(list_projects))
        .route(
            "/projects/:id",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route("/projects/:id/interfaces", get(list_project_interfaces))
        .route("/projects/:id/dictionaries", get(list_project_dictionaries))
        .route("/projects/:id/attachments", post(upload_project_attachment))
        .route(
            "/projects/:id/attachments/:stored_filename",
            delete(delete_project_attachment),
        )
        // Interfaces
        .route("/interfaces", post(create_interface).get(list_interfaces))
        .route("/interfaces/search", post(search_interfaces))
        .route("/interfaces/code/:code", get(get_interface_by_code))
        .route(
            "/interfaces/:id",
            get(get_interface).put(update_interface).delete(delete_interface),
        )
        .route("/interfaces/:id/parameters", post(add_parameter))
        .route(
            "/interfaces/:id/parameters/:parameter_id",
            put(update_parameter).delete(delete_parameter),
        )
        // Dictionaries
        .route("/dictionaries", post(create_dictionary).get(list_dictionaries))
        .route("/dictionaries/code/:code", get(get_dictionary_by_code))
        .route(
            "/dictionaries/:id",
            get(get_dictionary).put(update_dictionary).delete(delete_dictionary),
        )
        .route(
            "/dictionaries/:id/entries",
            get(list_dictionary_entries).post(add_dictionary_entry),
        )
        .route("/dictionaries/:id/entries/:entry_id", delete(delete_dictionary_entry))
        // Documents
        .route("/documents", post(create_document))
        .route("/documents/search", post(search_documents))
        .route(
            "/documents/:id",
            get(get_document).put(update_document).delete(delete_document),
        )
        .route("/documents/:id/attachments", post(upload_document_attachments))
        .route(
            "/documents/:id/attachments/:stored_filename",
            delete(delete_document_attachment),
        )
        // FAQs
        .route("/faqs", post(create_faq))
        .route("/faqs/search", post(search_faqs))
        .route("/faqs/:id", get(get_faq).put(update_faq).delete(delete_faq))
        .route("/faqs/:id/attachments", put(replace_faq_attachment))
        .route(
            "/faqs/:id/attachments/:stored_filename",
            delete(delete_faq_attachment),
        )
        // Middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
