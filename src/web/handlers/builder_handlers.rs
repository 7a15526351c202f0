// src/web/handlers/builder_handlers.rs

use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use crate::core::{BuilderCommand, BuilderSession};
use crate::error::CollaboratorError;
use crate::types::ResumeDocument;
use crate::web::auth::AuthenticatedUser;
use crate::web::sessions::{SessionError, SessionRegistry};
use crate::web::types::*;

fn session_error(e: SessionError) -> ApiError {
    match e {
        SessionError::NotFound(id) => StandardErrorResponse::new(
            format!("Builder session {} not found", id),
            "SESSION_NOT_FOUND".to_string(),
            vec!["Open a new builder session".to_string()],
        )
        .with_status(Status::NotFound),
        SessionError::Forbidden(id) => StandardErrorResponse::new(
            format!("Builder session {} belongs to another account", id),
            "SESSION_FORBIDDEN".to_string(),
            vec!["Open your own builder session".to_string()],
        )
        .with_status(Status::Forbidden),
    }
}

fn collaborator_error(e: CollaboratorError, error_code: &str) -> ApiError {
    let status = match e {
        CollaboratorError::NotFound(_) => Status::NotFound,
        CollaboratorError::Unavailable(_) => Status::ServiceUnavailable,
        CollaboratorError::Rendering(_) => Status::BadGateway,
        _ => Status::InternalServerError,
    };

    StandardErrorResponse::new(
        e.to_string(),
        error_code.to_string(),
        vec![
            "Try again in a few moments".to_string(),
            "Contact support if the problem persists".to_string(),
        ],
    )
    .with_status(status)
}

pub async fn list_documents_handler(
    auth: AuthenticatedUser,
    collaborators: &State<Collaborators>,
) -> Result<Json<DataResponse<Vec<Uuid>>>, ApiError> {
    let ids = collaborators
        .documents
        .list(auth.email())
        .await
        .map_err(|e| collaborator_error(e, "STORAGE_ERROR"))?;

    Ok(Json(DataResponse::success(
        format!("{} saved documents", ids.len()),
        ids,
    )))
}

pub async fn create_session_handler(
    request: Option<Json<OpenSessionRequest>>,
    auth: AuthenticatedUser,
    registry: &State<SessionRegistry>,
    collaborators: &State<Collaborators>,
) -> Result<Json<DataResponse<SessionData>>, ApiError> {
    let request = request.map(Json::into_inner).unwrap_or_default();

    let session = match request.document_id {
        Some(document_id) => {
            // A live session for this document wins over the stored copy
            match registry
                .with_session(document_id, auth.email(), |session| session.document().clone())
                .await
            {
                Ok(document) => {
                    info!("Document {} is already open, resuming its session", document_id);
                    return Ok(Json(DataResponse::success(
                        "Builder session resumed".to_string(),
                        SessionData {
                            session_id: document_id,
                            document,
                        },
                    )));
                }
                Err(e @ SessionError::Forbidden(_)) => return Err(session_error(e)),
                Err(SessionError::NotFound(_)) => {}
            }

            let document = collaborators
                .documents
                .load(auth.email(), document_id)
                .await
                .map_err(|e| collaborator_error(e, "DOCUMENT_NOT_FOUND"))?;
            BuilderSession::with_document(auth.email(), document_id, document)
        }
        None => BuilderSession::new(auth.email()),
    };

    let (session_id, document) = registry.open(session).await.map_err(session_error)?;

    Ok(Json(DataResponse::success(
        "Builder session opened".to_string(),
        SessionData {
            session_id,
            document,
        },
    )))
}

pub async fn get_session_handler(
    id: Uuid,
    auth: AuthenticatedUser,
    registry: &State<SessionRegistry>,
) -> Result<Json<DataResponse<ResumeDocument>>, ApiError> {
    let document = registry
        .with_session(id, auth.email(), |session| session.document().clone())
        .await
        .map_err(session_error)?;

    Ok(Json(DataResponse::success("Current document".to_string(), document)))
}

pub async fn apply_command_handler(
    id: Uuid,
    command: Json<BuilderCommand>,
    auth: AuthenticatedUser,
    registry: &State<SessionRegistry>,
) -> Result<Json<DataResponse<CommandData>>, ApiError> {
    let command = command.into_inner();

    let data = registry
        .with_session(id, auth.email(), |session| {
            let outcome = session.apply(command);
            CommandData {
                outcome,
                document: session.document().clone(),
            }
        })
        .await
        .map_err(session_error)?;

    let message = match &data.outcome.section {
        Some(section) => format!("Updated {:?}", section),
        None => "No change".to_string(),
    };

    Ok(Json(DataResponse::success(message, data)))
}

pub async fn preview_handler(
    id: Uuid,
    auth: AuthenticatedUser,
    registry: &State<SessionRegistry>,
) -> Result<Json<DataResponse<PreviewData>>, ApiError> {
    let preview = registry
        .with_session(id, auth.email(), |session| session.preview())
        .await
        .map_err(session_error)?;

    Ok(Json(DataResponse::success(
        "Preview".to_string(),
        PreviewData { preview },
    )))
}

pub async fn preview_text_handler(
    id: Uuid,
    auth: AuthenticatedUser,
    registry: &State<SessionRegistry>,
) -> Result<String, ApiError> {
    registry
        .with_session(id, auth.email(), |session| session.preview().to_text())
        .await
        .map_err(session_error)
}

pub async fn quick_preview_handler(
    id: Uuid,
    auth: AuthenticatedUser,
    registry: &State<SessionRegistry>,
) -> Result<Json<DataResponse<QuickPreviewData>>, ApiError> {
    let card = registry
        .with_session(id, auth.email(), |session| session.quick_preview())
        .await
        .map_err(session_error)?;

    Ok(Json(DataResponse::success(
        "Quick preview".to_string(),
        QuickPreviewData { card },
    )))
}

pub async fn save_handler(
    id: Uuid,
    auth: AuthenticatedUser,
    registry: &State<SessionRegistry>,
    collaborators: &State<Collaborators>,
) -> Result<Json<DataResponse<SaveData>>, ApiError> {
    // Snapshot first so the registry lock is not held across storage IO
    let document = registry
        .with_session(id, auth.email(), |session| session.document().clone())
        .await
        .map_err(session_error)?;

    let receipt = collaborators
        .documents
        .save(auth.email(), id, &document)
        .await
        .map_err(|e| {
            error!("Save failed for session {}: {}", id, e);
            collaborator_error(e, "SAVE_FAILED")
        })?;

    info!("Session {} saved by {}", id, auth.email());

    Ok(Json(DataResponse::success(
        "Resume saved".to_string(),
        SaveData { receipt },
    )))
}

pub async fn export_handler(
    id: Uuid,
    auth: AuthenticatedUser,
    registry: &State<SessionRegistry>,
    collaborators: &State<Collaborators>,
) -> Result<PdfResponse, ApiError> {
    let document = registry
        .with_session(id, auth.email(), |session| session.document().clone())
        .await
        .map_err(session_error)?;

    let span = info_span!("pdf_export", session = %id, user_email = %auth.email());
    let pdf = collaborators
        .renderer
        .render(&document)
        .instrument(span)
        .await
        .map_err(|e| {
            error!("Export failed for session {}: {}", id, e);
            collaborator_error(e, "EXPORT_FAILED")
        })?;

    info!("Exported {} for session {}", pdf.filename, id);
    Ok(PdfResponse::new(pdf.bytes, pdf.filename))
}

pub async fn delete_session_handler(
    id: Uuid,
    auth: AuthenticatedUser,
    registry: &State<SessionRegistry>,
) -> Result<Json<ActionResponse>, ApiError> {
    registry
        .remove(id, auth.email())
        .await
        .map_err(session_error)?;

    info!("Builder session {} discarded by {}", id, auth.email());

    Ok(Json(
        ActionResponse::success(
            "Builder session discarded".to_string(),
            "session_deleted".to_string(),
        )
        .with_next_actions(vec!["Open a new builder session".to_string()]),
    ))
}
