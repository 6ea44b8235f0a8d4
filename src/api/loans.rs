use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use sea_orm::DatabaseConnection;
use serde_json::json;

use crate::api::error_response;
use crate::services::loan_service::{self, IssueLoan};

pub async fn list_loans(State(db): State<DatabaseConnection>) -> impl IntoResponse {
    match loan_service::list_loans(&db).await {
        Ok(loans) => Json(json!({
            "loans": loans,
            "total": loans.len()
        }))
        .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

pub async fn issue_loan(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<IssueLoan>,
) -> impl IntoResponse {
    match loan_service::issue_loan(&db, payload).await {
        Ok(loan) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "Loan issued successfully",
                "loan": loan
            })),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

pub async fn return_loan(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match loan_service::return_loan(&db, id).await {
        Ok(loan) => Json(json!({
            "message": "Loan returned successfully",
            "loan": loan
        }))
        .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}
