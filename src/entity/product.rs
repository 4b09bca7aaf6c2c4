//! Catalog product entity.

use std::collections::BTreeSet;

use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};

/// Sea-ORM entity model for the `products` table.
///
/// | Column         | Type                | Description                           |
/// |----------------|---------------------|---------------------------------------|
/// | id             | UUID (Primary Key)  | Product identifier                    |
/// | name           | TEXT                | Display name, never empty             |
/// | description    | TEXT                | Free text                             |
/// | price          | DECIMAL(10,2)       | `CHECK (price >= 0)`                  |
/// | unit           | TEXT                | Display unit ("bouteille 1.5L")       |
/// | image_url      | TEXT NULL           | Optional picture                      |
/// | in_stock       | BOOLEAN             | Visible in the public catalog         |
/// | stock_quantity | INTEGER             | `CHECK (stock_quantity >= 0)`         |
/// | tags           | JSON                | Array of tag strings                  |
/// | created_by     | UUID NULL           | Creating admin, nulled on admin delete|
/// | created_at     | TIMESTAMPTZ         |                                       |
/// | updated_at     | TIMESTAMPTZ         | Refreshed on every mutation           |
///
/// The model doubles as the wire representation of a product.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub price: Decimal,
    pub unit: String,
    pub image_url: Option<String>,
    pub in_stock: bool,
    pub stock_quantity: i32,
    pub tags: Tags,
    pub created_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

/// Tag set stored as a JSON array; ordering carries no meaning.
#[derive(
    Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult,
)]
#[serde(transparent)]
pub struct Tags(pub BTreeSet<String>);

impl<S: Into<String>> FromIterator<S> for Tags {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Tags(iter.into_iter().map(Into::into).collect())
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::admin_user::Entity",
        from = "Column::CreatedBy",
        to = "super::admin_user::Column::Id",
        on_delete = "SetNull"
    )]
    AdminUser,
}

impl Related<super::admin_user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AdminUser.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
