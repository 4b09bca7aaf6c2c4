//! Admin session entity model.
//!
//! Maps the `admin_sessions` table: one row per issued bearer token.

use sea_orm::entity::prelude::*;

/// Sea-ORM entity model representing an issued admin session.
///
/// # Database Schema
///
/// | Column     | Type               | Description                         |
/// |------------|--------------------|-------------------------------------|
/// | token      | TEXT (Primary Key) | Opaque bearer token                 |
/// | admin_id   | UUID               | Owning admin, cascades on delete    |
/// | expires_at | TIMESTAMPTZ        | Absolute expiry, fixed at issuance  |
/// | created_at | TIMESTAMPTZ        | Issuance time                       |
///
/// An admin may own any number of concurrent rows.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "admin_sessions")]
pub struct Model {
    /// The bearer token presented in `Authorization: Bearer <token>`.
    ///
    /// Generated from a random [`tower_sessions::session::Id`], so it is
    /// unguessable; uniqueness is still re-checked on insert.
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub token: String,

    pub admin_id: Uuid,

    /// Once this instant has passed the row is treated exactly like a
    /// missing one. Expired rows linger until
    /// [`crate::auth::SessionAuthority::purge_expired`] runs.
    pub expires_at: DateTimeWithTimeZone,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::admin_user::Entity",
        from = "Column::AdminId",
        to = "super::admin_user::Column::Id",
        on_delete = "Cascade"
    )]
    AdminUser,
}

impl Related<super::admin_user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AdminUser.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
