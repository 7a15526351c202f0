// src/web/handlers/auth_handlers.rs

use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use tracing::{error, info};

use crate::core::flow::{AuthRequest, FlowController, LoginForm, SignupForm};
use crate::error::{CollaboratorError, FlowError};
use crate::web::auth::TokenService;
use crate::web::types::*;

pub async fn login_handler(
    form: Json<LoginForm>,
    collaborators: &State<Collaborators>,
    tokens: &State<TokenService>,
) -> Result<Json<DataResponse<AuthData>>, ApiError> {
    info!("Login attempt for {}", form.email);
    authenticate(AuthRequest::Login(form.into_inner()), collaborators, tokens).await
}

pub async fn signup_handler(
    form: Json<SignupForm>,
    collaborators: &State<Collaborators>,
    tokens: &State<TokenService>,
) -> Result<Json<DataResponse<AuthData>>, ApiError> {
    info!("Signup attempt for {}", form.email);
    authenticate(AuthRequest::Signup(form.into_inner()), collaborators, tokens).await
}

/// Drive one request through landing → authenticating → building.
async fn authenticate(
    request: AuthRequest,
    collaborators: &State<Collaborators>,
    tokens: &State<TokenService>,
) -> Result<Json<DataResponse<AuthData>>, ApiError> {
    let mut flow = FlowController::new();
    flow.open_auth().map_err(flow_error)?;
    flow.submit(request).map_err(flow_error)?;
    let user = flow
        .resolve(collaborators.credentials.as_ref())
        .await
        .map_err(flow_error)?;

    let token = tokens.issue(&user).map_err(|e| {
        error!("Failed to issue token for {}: {:#}", user.email, e);
        StandardErrorResponse::new(
            "Could not issue a session token".to_string(),
            "TOKEN_ERROR".to_string(),
            vec!["Try again in a few moments".to_string()],
        )
        .with_status(Status::InternalServerError)
    })?;

    Ok(Json(DataResponse::success(
        format!("Welcome, {}", user.username),
        AuthData { token, user },
    )))
}

fn flow_error(e: FlowError) -> ApiError {
    match e {
        FlowError::FormIncomplete(reason) => StandardErrorResponse::new(
            reason.to_string(),
            "FORM_INCOMPLETE".to_string(),
            vec!["Fill in every field of the form".to_string()],
        )
        .with_status(Status::BadRequest),
        FlowError::Rejected(CollaboratorError::InvalidCredentials) => StandardErrorResponse::new(
            "Invalid email or password".to_string(),
            "AUTH_FAILED".to_string(),
            vec![
                "Check your email and password".to_string(),
                "Sign up if you do not have an account yet".to_string(),
            ],
        )
        .with_status(Status::Unauthorized),
        FlowError::Rejected(CollaboratorError::AccountExists(email)) => {
            StandardErrorResponse::new(
                format!("An account already exists for {}", email),
                "ACCOUNT_EXISTS".to_string(),
                vec!["Log in instead".to_string()],
            )
            .with_status(Status::Conflict)
        }
        FlowError::Rejected(other) => {
            error!("Credential service failed: {}", other);
            StandardErrorResponse::new(
                "Authentication service unavailable".to_string(),
                "AUTH_UNAVAILABLE".to_string(),
                vec!["Try again in a few moments".to_string()],
            )
            .with_status(Status::ServiceUnavailable)
        }
        FlowError::InvalidTransition { .. } => {
            error!("Unexpected auth flow state: {}", e);
            StandardErrorResponse::new(
                "Internal server error".to_string(),
                "INTERNAL_ERROR".to_string(),
                vec!["Try again in a few moments".to_string()],
            )
            .with_status(Status::InternalServerError)
        }
    }
}
