use axum::{Json, extract::State};

use crate::api::dto::SessionResponse;
use crate::api::routes::SharedSession;

/// Full session snapshot: main flow, saved branches, active-branch pointer
/// and the streaming flag.
pub async fn get_session(State(service): State<SharedSession>) -> Json<SessionResponse> {
    Json(service.snapshot().into())
}
