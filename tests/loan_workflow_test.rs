use futures::future::join_all;
use sea_orm::DatabaseConnection;

use librarium::db;
use librarium::domain::DomainError;
use librarium::services::book_service::{self, BookPatch, CreateBook};
use librarium::services::loan_service::{self, IssueLoan};
use librarium::services::member_service::{self, CreateMember};

async fn setup_test_db() -> DatabaseConnection {
    db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB")
}

async fn create_test_book(db: &DatabaseConnection, isbn: &str, copies: i32) -> i32 {
    book_service::create_book(
        db,
        CreateBook {
            title: "Test Book".to_string(),
            author: "Test Author".to_string(),
            isbn: isbn.to_string(),
            copies,
        },
    )
    .await
    .expect("Failed to create book")
    .id
}

async fn create_test_member(db: &DatabaseConnection, email: &str) -> i32 {
    member_service::create_member(
        db,
        CreateMember {
            name: "Test Member".to_string(),
            email: email.to_string(),
        },
    )
    .await
    .expect("Failed to create member")
    .id
}

async fn available_for(db: &DatabaseConnection, book_id: i32) -> i32 {
    let books = book_service::list_books(db, None)
        .await
        .expect("Failed to list books");
    books
        .into_iter()
        .find(|b| b.id == book_id)
        .expect("book missing from list")
        .available
}

#[tokio::test]
async fn test_available_tracks_issue_and_return() {
    let db = setup_test_db().await;
    let book_id = create_test_book(&db, "isbn-1", 2).await;
    let member_id = create_test_member(&db, "m1@example.org").await;

    assert_eq!(available_for(&db, book_id).await, 2);

    let loan_a = loan_service::issue_loan(&db, IssueLoan { book_id, member_id })
        .await
        .expect("first issue should succeed");
    assert_eq!(available_for(&db, book_id).await, 1);

    loan_service::issue_loan(&db, IssueLoan { book_id, member_id })
        .await
        .expect("second issue should succeed");
    assert_eq!(available_for(&db, book_id).await, 0);

    // Both copies are out
    match loan_service::issue_loan(&db, IssueLoan { book_id, member_id }).await {
        Err(DomainError::Capacity) => {}
        other => panic!("expected capacity failure, got {:?}", other.map(|l| l.id)),
    }

    let returned = loan_service::return_loan(&db, loan_a.id)
        .await
        .expect("return should succeed");
    assert!(returned.returned_at.is_some());
    assert_eq!(available_for(&db, book_id).await, 1);

    loan_service::issue_loan(&db, IssueLoan { book_id, member_id })
        .await
        .expect("copy freed, issue should succeed");
    assert_eq!(available_for(&db, book_id).await, 0);
}

#[tokio::test]
async fn test_return_is_one_way() {
    let db = setup_test_db().await;
    let book_id = create_test_book(&db, "isbn-2", 1).await;
    let member_id = create_test_member(&db, "m2@example.org").await;

    let loan = loan_service::issue_loan(&db, IssueLoan { book_id, member_id })
        .await
        .expect("issue should succeed");

    let returned = loan_service::return_loan(&db, loan.id)
        .await
        .expect("return should succeed");
    let first_returned_at = returned.returned_at.clone().unwrap();

    match loan_service::return_loan(&db, loan.id).await {
        Err(DomainError::AlreadyReturned) => {}
        other => panic!("expected already-returned failure, got {:?}", other.is_ok()),
    }

    // returned_at was not altered by the failed second return
    let loans = loan_service::list_loans(&db).await.expect("list loans");
    assert_eq!(loans[0].returned_at.as_deref(), Some(first_returned_at.as_str()));
}

#[tokio::test]
async fn test_lowering_copies_below_active_loans() {
    let db = setup_test_db().await;
    let book_id = create_test_book(&db, "isbn-3", 2).await;
    let m1 = create_test_member(&db, "m3@example.org").await;
    let m2 = create_test_member(&db, "m4@example.org").await;

    loan_service::issue_loan(&db, IssueLoan { book_id, member_id: m1 })
        .await
        .expect("issue should succeed");
    loan_service::issue_loan(&db, IssueLoan { book_id, member_id: m2 })
        .await
        .expect("issue should succeed");

    // Shrinking the copy count is allowed; availability floors at 0
    let book = book_service::update_book(
        &db,
        book_id,
        BookPatch {
            copies: Some(1),
            ..Default::default()
        },
    )
    .await
    .expect("update should succeed");
    assert_eq!(book.copies, 1);
    assert_eq!(book.available, 0);

    match loan_service::issue_loan(&db, IssueLoan { book_id, member_id: m1 }).await {
        Err(DomainError::Capacity) => {}
        other => panic!("expected capacity failure, got {:?}", other.is_ok()),
    }
}

#[tokio::test]
async fn test_concurrent_issue_takes_last_copy_once() {
    // File-backed database so every pooled connection sees the same data;
    // a fresh in-memory database per connection would defeat the test.
    let path = std::env::temp_dir().join(format!(
        "librarium_concurrency_{}.db",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);
    let url = format!("sqlite://{}?mode=rwc", path.display());

    let db = db::init_db(&url).await.expect("Failed to init DB");
    let book_id = create_test_book(&db, "isbn-4", 1).await;
    let member_id = create_test_member(&db, "m5@example.org").await;

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let db = db.clone();
            tokio::spawn(async move {
                loan_service::issue_loan(&db, IssueLoan { book_id, member_id }).await
            })
        })
        .collect();

    let mut issued = 0;
    let mut rejected = 0;
    for result in join_all(tasks).await {
        match result.expect("issue task panicked") {
            Ok(_) => issued += 1,
            Err(DomainError::Capacity) => rejected += 1,
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    assert_eq!(issued, 1);
    assert_eq!(rejected, 7);
    assert_eq!(available_for(&db, book_id).await, 0);

    let loans = loan_service::list_loans(&db).await.expect("list loans");
    assert_eq!(loans.len(), 1);

    let _ = std::fs::remove_file(&path);
}
