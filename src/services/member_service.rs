//! Member Service - Membership operations without HTTP layer

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::Deserialize;

use crate::domain::DomainError;
use crate::models::loan::{self, Entity as LoanEntity};
use crate::models::member::{self, Entity as MemberEntity};
use crate::services::required_field;

/// Payload for registering a member
#[derive(Debug, Clone, Deserialize)]
pub struct CreateMember {
    pub name: String,
    pub email: String,
}

/// List all members newest-first
pub async fn list_members(db: &DatabaseConnection) -> Result<Vec<member::Model>, DomainError> {
    let members = MemberEntity::find()
        .order_by_desc(member::Column::CreatedAt)
        .order_by_desc(member::Column::Id)
        .all(db)
        .await?;

    Ok(members)
}

/// Register a new member; email must be unique after trimming
pub async fn create_member(
    db: &DatabaseConnection,
    input: CreateMember,
) -> Result<member::Model, DomainError> {
    let name = required_field(&input.name, "name")?;
    let email = required_field(&input.email, "email")?;

    let existing = MemberEntity::find()
        .filter(member::Column::Email.eq(&email))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(DomainError::Conflict("Email already exists".to_string()));
    }

    let new_member = member::ActiveModel {
        name: Set(name),
        email: Set(email),
        created_at: Set(chrono::Utc::now().to_rfc3339()),
        ..Default::default()
    };

    let model = new_member.insert(db).await?;
    tracing::info!("Registered member {}", model.id);

    Ok(model)
}

/// Delete a member and all of their loans in one transaction
pub async fn delete_member(db: &DatabaseConnection, id: i32) -> Result<(), DomainError> {
    let member = MemberEntity::find_by_id(id)
        .one(db)
        .await?
        .ok_or(DomainError::NotFound("Member"))?;

    let txn = db.begin().await?;

    LoanEntity::delete_many()
        .filter(loan::Column::MemberId.eq(member.id))
        .exec(&txn)
        .await?;
    MemberEntity::delete_by_id(member.id).exec(&txn).await?;

    txn.commit().await?;

    tracing::info!("Deleted member {} and their loans", id);
    Ok(())
}
