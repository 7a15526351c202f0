// src/web/handlers/system_handlers.rs

use rocket::serde::json::Json;
use rocket::State;
use tracing::info;

use crate::types::VerifiedUser;
use crate::web::auth::AuthenticatedUser;
use crate::web::sessions::SessionRegistry;
use crate::web::types::*;

pub async fn health_handler(registry: &State<SessionRegistry>) -> Json<TextResponse> {
    let live = registry.len().await;
    info!("Health check ({} live sessions)", live);
    Json(TextResponse::success("OK".to_string()))
}

pub async fn get_current_user_handler(auth: AuthenticatedUser) -> Json<DataResponse<VerifiedUser>> {
    Json(DataResponse::success(
        "User authenticated".to_string(),
        auth.user().clone(),
    ))
}
