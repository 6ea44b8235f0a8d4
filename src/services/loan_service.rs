//! Loan Service - Issue/return workflow and the availability accounting

use once_cell::sync::Lazy;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::domain::DomainError;
use crate::models::book::{self, Entity as BookEntity};
use crate::models::loan::{self, Entity as LoanEntity};
use crate::models::member::Entity as MemberEntity;

/// Payload for issuing a loan
#[derive(Debug, Clone, Deserialize)]
pub struct IssueLoan {
    pub book_id: i32,
    pub member_id: i32,
}

/// Loan enriched at read time with the referenced book and member
#[derive(Debug, Clone, Serialize)]
pub struct LoanWithDetails {
    pub id: i32,
    pub book_id: i32,
    pub member_id: i32,
    pub issued_at: String,
    pub returned_at: Option<String>,
    pub book_title: Option<String>,
    pub member_name: Option<String>,
}

// Per-book critical sections. The count+insert in `issue_loan` must be
// serialized per book so two concurrent issuances cannot both take the last
// copy.
static ISSUE_LOCKS: Lazy<Mutex<HashMap<i32, Arc<tokio::sync::Mutex<()>>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

fn issue_lock(book_id: i32) -> Arc<tokio::sync::Mutex<()>> {
    let mut locks = ISSUE_LOCKS.lock().expect("issue lock map poisoned");
    locks
        .entry(book_id)
        .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
        .clone()
}

/// Count loans for a book that have not been returned
pub async fn active_loan_count<C: ConnectionTrait>(
    conn: &C,
    book_id: i32,
) -> Result<u64, DomainError> {
    let count = LoanEntity::find()
        .filter(loan::Column::BookId.eq(book_id))
        .filter(loan::Column::ReturnedAt.is_null())
        .count(conn)
        .await?;
    Ok(count)
}

/// Issue a loan: both references must exist and the book must have a copy
/// left. No loan row is written on any failure path.
pub async fn issue_loan(
    db: &DatabaseConnection,
    input: IssueLoan,
) -> Result<loan::Model, DomainError> {
    let book = BookEntity::find_by_id(input.book_id).one(db).await?;
    let member = MemberEntity::find_by_id(input.member_id).one(db).await?;

    if book.is_none() || member.is_none() {
        return Err(DomainError::InvalidReference(
            "Invalid book or member".to_string(),
        ));
    }

    let lock = issue_lock(input.book_id);
    let _guard = lock.lock().await;

    let txn = db.begin().await?;

    // Re-read inside the transaction so the copy count is current
    let book = BookEntity::find_by_id(input.book_id)
        .one(&txn)
        .await?
        .ok_or_else(|| DomainError::InvalidReference("Invalid book or member".to_string()))?;

    let active = active_loan_count(&txn, book.id).await?;
    if active >= book.copies.max(0) as u64 {
        // Dropping the transaction rolls it back
        return Err(DomainError::Capacity);
    }

    let new_loan = loan::ActiveModel {
        book_id: Set(book.id),
        member_id: Set(input.member_id),
        issued_at: Set(chrono::Utc::now().to_rfc3339()),
        returned_at: Set(None),
        ..Default::default()
    };

    let saved_loan = new_loan.insert(&txn).await?;
    txn.commit().await?;

    tracing::info!(
        "Issued loan {} (book {}, member {})",
        saved_loan.id,
        saved_loan.book_id,
        saved_loan.member_id
    );

    Ok(saved_loan)
}

/// Return a loan; `returned_at` is set exactly once
pub async fn return_loan(db: &DatabaseConnection, id: i32) -> Result<loan::Model, DomainError> {
    let loan = LoanEntity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound("Loan"))?;

    if loan.returned_at.is_some() {
        return Err(DomainError::AlreadyReturned);
    }

    let mut loan_active: loan::ActiveModel = loan.into();
    loan_active.returned_at = Set(Some(chrono::Utc::now().to_rfc3339()));

    let updated_loan = loan_active.update(db).await?;
    tracing::info!("Returned loan {}", updated_loan.id);

    Ok(updated_loan)
}

/// List all loans newest-issued-first, enriched with the referenced book's
/// title and member's name. Enrichment fields are null if the referenced
/// entity no longer exists (cascade delete normally prevents this).
pub async fn list_loans(db: &DatabaseConnection) -> Result<Vec<LoanWithDetails>, DomainError> {
    let loans_with_members = LoanEntity::find()
        .order_by_desc(loan::Column::IssuedAt)
        .order_by_desc(loan::Column::Id)
        .find_also_related(MemberEntity)
        .all(db)
        .await?;

    // Fetch the referenced book titles in one query
    let book_ids: Vec<i32> = loans_with_members.iter().map(|(l, _)| l.book_id).collect();
    let mut book_titles: HashMap<i32, String> = HashMap::new();

    if !book_ids.is_empty() {
        let books = BookEntity::find()
            .filter(book::Column::Id.is_in(book_ids))
            .all(db)
            .await?;

        for b in books {
            book_titles.insert(b.id, b.title);
        }
    }

    let result = loans_with_members
        .into_iter()
        .map(|(loan, member)| LoanWithDetails {
            id: loan.id,
            book_id: loan.book_id,
            member_id: loan.member_id,
            issued_at: loan.issued_at,
            returned_at: loan.returned_at,
            book_title: book_titles.get(&loan.book_id).cloned(),
            member_name: member.map(|m| m.name),
        })
        .collect();

    Ok(result)
}
