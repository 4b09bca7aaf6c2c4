//! Administrator account entity.

use sea_orm::entity::prelude::*;

/// Sea-ORM entity model for the `admin_users` table.
///
/// | Column        | Type              | Description                      |
/// |---------------|-------------------|----------------------------------|
/// | id            | UUID (Primary Key)| Admin identifier                 |
/// | username      | TEXT UNIQUE       | Login name                       |
/// | email         | TEXT              | Contact address                  |
/// | password_hash | TEXT              | Argon2id PHC string              |
/// | created_at    | TIMESTAMPTZ       | Provisioning time                |
/// | updated_at    | TIMESTAMPTZ       | Last change                      |
///
/// The model never leaves the crate as-is; responses use
/// [`crate::auth::AdminProfile`] so the hash is never serialized.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "admin_users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::admin_session::Entity")]
    AdminSession,
    #[sea_orm(has_many = "super::product::Entity")]
    Product,
}

impl Related<super::admin_session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AdminSession.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
