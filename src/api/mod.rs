pub mod books;
pub mod health;
pub mod loans;
pub mod members;

use axum::{
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};

use crate::domain::DomainError;

pub fn api_router(db: DatabaseConnection) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route(
            "/books/:id",
            put(books::update_book).delete(books::delete_book),
        )
        // Members
        .route(
            "/members",
            get(members::list_members).post(members::create_member),
        )
        .route("/members/:id", delete(members::delete_member))
        // Loans
        .route("/loans", get(loans::list_loans))
        .route("/loans/issue", post(loans::issue_loan))
        .route("/loans/:id/return", put(loans::return_loan))
        .with_state(db)
}

/// Map a domain error to a status code and `{"error": ...}` body
pub(crate) fn error_response(err: DomainError) -> (StatusCode, Json<Value>) {
    let status = match err {
        DomainError::Validation(_)
        | DomainError::InvalidReference(_)
        | DomainError::Capacity
        | DomainError::AlreadyReturned => StatusCode::BAD_REQUEST,
        DomainError::Conflict(_) => StatusCode::CONFLICT,
        DomainError::NotFound(_) => StatusCode::NOT_FOUND,
        DomainError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!("{}", err);
    }

    (status, Json(json!({ "error": err.to_string() })))
}
