use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set};

use crate::models::{book, member};

/// Seed a handful of demo books and members. Safe to run repeatedly; rows
/// that already exist (by ISBN or email) are skipped.
pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<(), DbErr> {
    let books = vec![
        ("The Hobbit", "J.R.R. Tolkien", "9780547928227", 3),
        ("Foundation", "Isaac Asimov", "9780553293357", 2),
        ("Dune", "Frank Herbert", "9780441013593", 1),
    ];

    for (title, author, isbn, copies) in books {
        let exists = book::Entity::find()
            .filter(book::Column::Isbn.eq(isbn))
            .one(db)
            .await?;
        if exists.is_some() {
            continue;
        }

        book::ActiveModel {
            title: Set(title.to_owned()),
            author: Set(author.to_owned()),
            isbn: Set(isbn.to_owned()),
            copies: Set(copies),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    let members = vec![
        ("Ada Lovelace", "ada@example.org"),
        ("Grace Hopper", "grace@example.org"),
    ];

    for (name, email) in members {
        let exists = member::Entity::find()
            .filter(member::Column::Email.eq(email))
            .one(db)
            .await?;
        if exists.is_some() {
            continue;
        }

        member::ActiveModel {
            name: Set(name.to_owned()),
            email: Set(email.to_owned()),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        }
        .insert(db)
        .await?;
    }

    Ok(())
}
