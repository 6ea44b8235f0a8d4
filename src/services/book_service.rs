//! Book Service - Catalog operations without HTTP layer

use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use std::collections::HashMap;

use crate::domain::DomainError;
use crate::models::book::{self, Entity as BookEntity};
use crate::models::loan::{self, Entity as LoanEntity};
use crate::models::Book;
use crate::services::{loan_service, required_field};

/// Payload for creating a book
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBook {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub copies: i32,
}

/// Partial update; absent fields are left untouched
#[derive(Debug, Default, Clone, Deserialize)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub copies: Option<i32>,
}

/// List all books newest-first, optionally filtered by a case-insensitive
/// substring match against title, author or ISBN. Each result carries the
/// computed `available` count.
pub async fn list_books(
    db: &DatabaseConnection,
    query: Option<&str>,
) -> Result<Vec<Book>, DomainError> {
    let mut find = BookEntity::find();

    if let Some(q) = query {
        let q = q.trim();
        if !q.is_empty() {
            find = find.filter(
                Condition::any()
                    .add(book::Column::Title.contains(q))
                    .add(book::Column::Author.contains(q))
                    .add(book::Column::Isbn.contains(q)),
            );
        }
    }

    let books = find
        .order_by_desc(book::Column::CreatedAt)
        .order_by_desc(book::Column::Id)
        .all(db)
        .await?;

    // One pass over the active loans for the listed books
    let book_ids: Vec<i32> = books.iter().map(|b| b.id).collect();
    let mut active_counts: HashMap<i32, u64> = HashMap::new();

    if !book_ids.is_empty() {
        let active_loans = LoanEntity::find()
            .filter(loan::Column::BookId.is_in(book_ids))
            .filter(loan::Column::ReturnedAt.is_null())
            .all(db)
            .await?;

        for l in active_loans {
            *active_counts.entry(l.book_id).or_insert(0) += 1;
        }
    }

    Ok(books
        .into_iter()
        .map(|model| {
            let active = active_counts.get(&model.id).copied().unwrap_or(0);
            Book::from_model(model, active)
        })
        .collect())
}

/// Create a new book with a system-assigned id and creation timestamp
pub async fn create_book(db: &DatabaseConnection, input: CreateBook) -> Result<Book, DomainError> {
    let title = required_field(&input.title, "title")?;
    let author = required_field(&input.author, "author")?;
    let isbn = required_field(&input.isbn, "isbn")?;

    if input.copies < 0 {
        return Err(DomainError::Validation(
            "copies must be a non-negative integer".to_string(),
        ));
    }

    let existing = BookEntity::find()
        .filter(book::Column::Isbn.eq(&isbn))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(DomainError::Conflict("ISBN already exists".to_string()));
    }

    let new_book = book::ActiveModel {
        title: Set(title),
        author: Set(author),
        isbn: Set(isbn),
        copies: Set(input.copies),
        created_at: Set(chrono::Utc::now().to_rfc3339()),
        ..Default::default()
    };

    let model = new_book.insert(db).await?;
    tracing::info!("Created book {} ({})", model.id, model.isbn);

    // A freshly created book has no loans
    Ok(Book::from_model(model, 0))
}

/// Apply a partial update; string fields are trimmed, others untouched
pub async fn update_book(
    db: &DatabaseConnection,
    id: i32,
    patch: BookPatch,
) -> Result<Book, DomainError> {
    let model = BookEntity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound("Book"))?;

    let mut active_model: book::ActiveModel = model.into();

    if let Some(title) = patch.title {
        active_model.title = Set(title.trim().to_string());
    }

    if let Some(author) = patch.author {
        active_model.author = Set(author.trim().to_string());
    }

    if let Some(isbn) = patch.isbn {
        let isbn = isbn.trim().to_string();
        let taken = BookEntity::find()
            .filter(book::Column::Isbn.eq(&isbn))
            .filter(book::Column::Id.ne(id))
            .one(db)
            .await?;
        if taken.is_some() {
            return Err(DomainError::Conflict("ISBN already exists".to_string()));
        }
        active_model.isbn = Set(isbn);
    }

    if let Some(copies) = patch.copies {
        if copies < 0 {
            return Err(DomainError::Validation(
                "copies must be a non-negative integer".to_string(),
            ));
        }
        // Lowering copies below the active loan count is allowed; the book
        // simply stays unavailable until enough loans are returned.
        active_model.copies = Set(copies);
    }

    let model = active_model.update(db).await?;
    let active = loan_service::active_loan_count(db, model.id).await?;

    Ok(Book::from_model(model, active))
}

/// Delete a book and all of its loans in one transaction
pub async fn delete_book(db: &DatabaseConnection, id: i32) -> Result<(), DomainError> {
    let book = BookEntity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound("Book"))?;

    let txn = db.begin().await?;

    LoanEntity::delete_many()
        .filter(loan::Column::BookId.eq(book.id))
        .exec(&txn)
        .await?;
    BookEntity::delete_by_id(book.id).exec(&txn).await?;

    txn.commit().await?;

    tracing::info!("Deleted book {} and its loans", id);
    Ok(())
}
