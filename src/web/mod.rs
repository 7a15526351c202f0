// src/web/mod.rs

pub mod auth;
pub mod handlers;
pub mod sessions;
pub mod types;

pub use types::*;

use anyhow::Result;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Status};
use rocket::serde::json::Json;
use rocket::{catchers, delete, get, options, post, routes, Build, Request, Response, Rocket, State};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::core::flow::{LoginForm, SignupForm};
use crate::core::BuilderCommand;
use crate::services::{self, FileDocumentStore, SqliteAccounts};
use crate::types::{ResumeDocument, VerifiedUser};
use auth::{AuthenticatedUser, TokenService};
use sessions::SessionRegistry;

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, DELETE, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
        response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
    }
}

// ===== Auth =====

#[post("/auth/login", data = "<form>")]
pub async fn login(
    form: Json<LoginForm>,
    collaborators: &State<Collaborators>,
    tokens: &State<TokenService>,
) -> Result<Json<DataResponse<AuthData>>, ApiError> {
    handlers::login_handler(form, collaborators, tokens).await
}

#[post("/auth/signup", data = "<form>")]
pub async fn signup(
    form: Json<SignupForm>,
    collaborators: &State<Collaborators>,
    tokens: &State<TokenService>,
) -> Result<Json<DataResponse<AuthData>>, ApiError> {
    handlers::signup_handler(form, collaborators, tokens).await
}

#[get("/me")]
pub async fn get_current_user(auth: AuthenticatedUser) -> Json<DataResponse<VerifiedUser>> {
    handlers::get_current_user_handler(auth).await
}

// ===== Builder =====

#[get("/documents")]
pub async fn list_documents(
    auth: AuthenticatedUser,
    collaborators: &State<Collaborators>,
) -> Result<Json<DataResponse<Vec<Uuid>>>, ApiError> {
    handlers::list_documents_handler(auth, collaborators).await
}

#[post("/builder", data = "<request>")]
pub async fn create_session(
    request: Option<Json<OpenSessionRequest>>,
    auth: AuthenticatedUser,
    registry: &State<SessionRegistry>,
    collaborators: &State<Collaborators>,
) -> Result<Json<DataResponse<SessionData>>, ApiError> {
    handlers::create_session_handler(request, auth, registry, collaborators).await
}

#[get("/builder/<id>")]
pub async fn get_session(
    id: Uuid,
    auth: AuthenticatedUser,
    registry: &State<SessionRegistry>,
) -> Result<Json<DataResponse<ResumeDocument>>, ApiError> {
    handlers::get_session_handler(id, auth, registry).await
}

#[post("/builder/<id>/commands", data = "<command>")]
pub async fn apply_command(
    id: Uuid,
    command: Json<BuilderCommand>,
    auth: AuthenticatedUser,
    registry: &State<SessionRegistry>,
) -> Result<Json<DataResponse<CommandData>>, ApiError> {
    handlers::apply_command_handler(id, command, auth, registry).await
}

#[get("/builder/<id>/preview")]
pub async fn preview(
    id: Uuid,
    auth: AuthenticatedUser,
    registry: &State<SessionRegistry>,
) -> Result<Json<DataResponse<PreviewData>>, ApiError> {
    handlers::preview_handler(id, auth, registry).await
}

#[get("/builder/<id>/preview.txt")]
pub async fn preview_text(
    id: Uuid,
    auth: AuthenticatedUser,
    registry: &State<SessionRegistry>,
) -> Result<String, ApiError> {
    handlers::preview_text_handler(id, auth, registry).await
}

#[get("/builder/<id>/quick-preview")]
pub async fn quick_preview(
    id: Uuid,
    auth: AuthenticatedUser,
    registry: &State<SessionRegistry>,
) -> Result<Json<DataResponse<QuickPreviewData>>, ApiError> {
    handlers::quick_preview_handler(id, auth, registry).await
}

#[post("/builder/<id>/save")]
pub async fn save(
    id: Uuid,
    auth: AuthenticatedUser,
    registry: &State<SessionRegistry>,
    collaborators: &State<Collaborators>,
) -> Result<Json<DataResponse<SaveData>>, ApiError> {
    handlers::save_handler(id, auth, registry, collaborators).await
}

#[post("/builder/<id>/export")]
pub async fn export(
    id: Uuid,
    auth: AuthenticatedUser,
    registry: &State<SessionRegistry>,
    collaborators: &State<Collaborators>,
) -> Result<PdfResponse, ApiError> {
    handlers::export_handler(id, auth, registry, collaborators).await
}

#[delete("/builder/<id>")]
pub async fn delete_session(
    id: Uuid,
    auth: AuthenticatedUser,
    registry: &State<SessionRegistry>,
) -> Result<Json<ActionResponse>, ApiError> {
    handlers::delete_session_handler(id, auth, registry).await
}

// ===== System =====

#[get("/health")]
pub async fn health(registry: &State<SessionRegistry>) -> Json<TextResponse> {
    handlers::health_handler(registry).await
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// Error catchers
#[rocket::catch(400)]
pub fn bad_request() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Invalid request format".to_string(),
        "BAD_REQUEST".to_string(),
        vec![
            "Check your request JSON format".to_string(),
            "Verify all required fields are present".to_string(),
        ],
    ))
}

#[rocket::catch(401)]
pub fn unauthorized() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Authentication required".to_string(),
        "AUTH_FAILED".to_string(),
        vec!["Log in and send 'Authorization: Bearer <token>'".to_string()],
    ))
}

#[rocket::catch(404)]
pub fn not_found() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Resource not found".to_string(),
        "NOT_FOUND".to_string(),
        vec!["Check the request path".to_string()],
    ))
}

#[rocket::catch(422)]
pub fn unprocessable() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Request body does not match the expected shape".to_string(),
        "INVALID_BODY".to_string(),
        vec!["Check field names and types".to_string()],
    ))
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Internal server error".to_string(),
        "INTERNAL_ERROR".to_string(),
        vec![
            "Try again in a few moments".to_string(),
            "Contact support if the problem persists".to_string(),
        ],
    ))
}

/// Assemble the API around the given collaborators.
pub fn build_rocket(collaborators: Collaborators, tokens: TokenService) -> Rocket<Build> {
    // Live sessions expire with the tokens that can reach them
    let registry = SessionRegistry::with_max_age(tokens.ttl());

    rocket::build()
        .attach(Cors)
        .manage(collaborators)
        .manage(tokens)
        .manage(registry)
        .register(
            "/api",
            catchers![bad_request, unauthorized, not_found, unprocessable, internal_error],
        )
        .mount(
            "/api",
            routes![
                login,
                signup,
                get_current_user,
                list_documents,
                create_session,
                get_session,
                apply_command,
                preview,
                preview_text,
                quick_preview,
                save,
                export,
                delete_session,
                health,
                options,
            ],
        )
}

// Main server start function
pub async fn start_web_server(config: AppConfig) -> Result<()> {
    let tokens = TokenService::new(config.require_jwt_secret()?);

    config.ensure_directories().await?;

    let accounts = SqliteAccounts::connect(&config.paths.database_path).await?;
    let collaborators = Collaborators {
        credentials: Arc::new(accounts),
        documents: Arc::new(FileDocumentStore::new(config.paths.documents_path.clone())),
        renderer: services::renderer_from_config(&config)?,
    };

    info!("Starting resume builder API server");
    info!("Environment: {}", config.environment);
    info!("Documents: {}", config.paths.documents_path.display());
    info!("Database: {}", config.paths.database_path.display());
    info!("Server: http://0.0.0.0:{}", config.paths.port);

    let figment = rocket::Config::figment()
        .merge(("port", config.paths.port))
        .merge(("address", "0.0.0.0"));

    build_rocket(collaborators, tokens)
        .configure(figment)
        .launch()
        .await
        .map_err(|e| anyhow::anyhow!("Web server failed: {}", e))?;

    Ok(())
}
