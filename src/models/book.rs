use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "books")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub author: String,
    #[sea_orm(unique)]
    pub isbn: String,
    pub copies: i32,
    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::loan::Entity")]
    Loans,
}

impl Related<super::loan::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Loans.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// API shape for a book, enriched with computed availability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub copies: i32,
    pub available: i32,
    pub created_at: String,
}

impl Book {
    /// `available = max(copies - active loans, 0)`
    pub fn from_model(model: Model, active_loans: u64) -> Self {
        let available = (i64::from(model.copies) - active_loans as i64).max(0) as i32;

        Self {
            id: model.id,
            title: model.title,
            author: model.author,
            isbn: model.isbn,
            copies: model.copies,
            available,
            created_at: model.created_at,
        }
    }
}
