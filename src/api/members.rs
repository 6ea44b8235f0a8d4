use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use sea_orm::DatabaseConnection;
use serde_json::json;

use crate::api::error_response;
use crate::services::member_service::{self, CreateMember};

pub async fn list_members(State(db): State<DatabaseConnection>) -> impl IntoResponse {
    match member_service::list_members(&db).await {
        Ok(members) => Json(json!({
            "members": members,
            "total": members.len()
        }))
        .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

pub async fn create_member(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<CreateMember>,
) -> impl IntoResponse {
    match member_service::create_member(&db, payload).await {
        Ok(member) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "Member created successfully",
                "member": member
            })),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

pub async fn delete_member(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match member_service::delete_member(&db, id).await {
        Ok(()) => Json(json!({ "message": "Member deleted successfully" })).into_response(),
        Err(e) => error_response(e).into_response(),
    }
}
