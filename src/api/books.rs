use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::json;

use crate::api::error_response;
use crate::services::book_service::{self, BookPatch, CreateBook};

#[derive(Debug, Deserialize)]
pub struct ListBooksQuery {
    pub q: Option<String>,
}

pub async fn list_books(
    State(db): State<DatabaseConnection>,
    Query(params): Query<ListBooksQuery>,
) -> impl IntoResponse {
    match book_service::list_books(&db, params.q.as_deref()).await {
        Ok(books) => Json(json!({
            "books": books,
            "total": books.len()
        }))
        .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

pub async fn create_book(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<CreateBook>,
) -> impl IntoResponse {
    match book_service::create_book(&db, payload).await {
        Ok(book) => (
            StatusCode::CREATED,
            Json(json!({
                "message": "Book created successfully",
                "book": book
            })),
        )
            .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

pub async fn update_book(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
    Json(payload): Json<BookPatch>,
) -> impl IntoResponse {
    match book_service::update_book(&db, id, payload).await {
        Ok(book) => Json(json!({
            "message": "Book updated successfully",
            "book": book
        }))
        .into_response(),
        Err(e) => error_response(e).into_response(),
    }
}

pub async fn delete_book(
    State(db): State<DatabaseConnection>,
    Path(id): Path<i32>,
) -> impl IntoResponse {
    match book_service::delete_book(&db, id).await {
        Ok(()) => Json(json!({ "message": "Book deleted successfully" })).into_response(),
        Err(e) => error_response(e).into_response(),
    }
}
