//! Product catalog: the public in-stock listing and admin CRUD.

use sea_orm::prelude::{Decimal, Uuid};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    NotSet, QueryFilter, QueryOrder, Set, Unchanged,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::AdminId;
use crate::clock;
use crate::entity::product::{self, Entity as ProductEntity, Tags};
use crate::error::{Error, Result};

/// Every writable field of a product.
///
/// Updates overwrite all of them; an omitted optional field is reset to
/// its default rather than left untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default = "in_stock_by_default")]
    pub in_stock: bool,
    #[serde(default)]
    pub stock_quantity: i32,
    #[serde(default)]
    pub tags: Tags,
}

fn in_stock_by_default() -> bool {
    true
}

impl ProductInput {
    /// Rejects inputs the store would refuse anyway.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::validation("Product name is required"));
        }
        if self.price < Decimal::ZERO {
            return Err(Error::validation("Price must not be negative"));
        }
        if self.stock_quantity < 0 {
            return Err(Error::validation("Stock quantity must not be negative"));
        }
        Ok(())
    }
}

/// Catalog service over the `products` table.
#[derive(Debug, Clone)]
pub struct Catalog {
    conn: DatabaseConnection,
}

impl Catalog {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// In-stock products ordered by name. Needs no authentication.
    pub async fn list_public(&self) -> Result<Vec<product::Model>> {
        Ok(ProductEntity::find()
            .filter(product::Column::InStock.eq(true))
            .order_by_asc(product::Column::Name)
            .all(&self.conn)
            .await?)
    }

    /// Every product, in stock or not, ordered by name.
    pub async fn list_all(&self, _admin: AdminId) -> Result<Vec<product::Model>> {
        Ok(ProductEntity::find()
            .order_by_asc(product::Column::Name)
            .all(&self.conn)
            .await?)
    }

    pub async fn get(&self, _admin: AdminId, id: Uuid) -> Result<product::Model> {
        ProductEntity::find_by_id(id)
            .one(&self.conn)
            .await?
            .ok_or(Error::NotFound("Product"))
    }

    /// Adds a product attributed to `admin` and returns its id.
    pub async fn create(&self, admin: AdminId, input: ProductInput) -> Result<Uuid> {
        input.validate()?;
        let product = insert_product(&self.conn, input, Some(admin.as_uuid())).await?;
        info!(product_id = %product.id, %admin, "product created");
        Ok(product.id)
    }

    /// Replaces every writable field of product `id`.
    pub async fn update(&self, admin: AdminId, id: Uuid, input: ProductInput) -> Result<()> {
        input.validate()?;

        let ProductInput {
            name,
            description,
            price,
            unit,
            image_url,
            in_stock,
            stock_quantity,
            tags,
        } = input;

        let result = product::ActiveModel {
            id: Unchanged(id),
            name: Set(name),
            description: Set(description),
            price: Set(price),
            unit: Set(unit),
            image_url: Set(image_url),
            in_stock: Set(in_stock),
            stock_quantity: Set(stock_quantity),
            tags: Set(tags),
            created_by: NotSet,
            created_at: NotSet,
            updated_at: Set(clock::now()),
        }
        .update(&self.conn)
        .await;

        match result {
            Ok(_) => {
                info!(product_id = %id, %admin, "product updated");
                Ok(())
            }
            Err(DbErr::RecordNotUpdated) => Err(Error::NotFound("Product")),
            Err(e) => Err(e.into()),
        }
    }

    /// Removes product `id`. Removing an absent product is not an error.
    pub async fn delete(&self, admin: AdminId, id: Uuid) -> Result<()> {
        let result = ProductEntity::delete_by_id(id).exec(&self.conn).await?;
        if result.rows_affected > 0 {
            info!(product_id = %id, %admin, "product deleted");
        }
        Ok(())
    }
}

/// Inserts a product row without any authorization check.
pub(crate) async fn insert_product<C>(
    conn: &C,
    input: ProductInput,
    created_by: Option<Uuid>,
) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    let now = clock::now();
    let product = product::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(input.name),
        description: Set(input.description),
        price: Set(input.price),
        unit: Set(input.unit),
        image_url: Set(input.image_url),
        in_stock: Set(input.in_stock),
        stock_quantity: Set(input.stock_quantity),
        tags: Set(input.tags),
        created_by: Set(created_by),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await?;

    Ok(product)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> ProductInput {
        ProductInput {
            name: "Café moulu".into(),
            description: "Café arabica moulu".into(),
            price: Decimal::new(420, 2),
            unit: "paquet 250g".into(),
            image_url: None,
            in_stock: true,
            stock_quantity: 35,
            tags: ["Boissons"].into_iter().collect(),
        }
    }

    #[test]
    fn valid_input_passes() {
        assert!(input().validate().is_ok());
    }

    #[test]
    fn zero_price_is_allowed() {
        let free = ProductInput {
            price: Decimal::ZERO,
            ..input()
        };
        assert!(free.validate().is_ok());
    }

    #[test]
    fn blank_name_negative_price_and_stock_are_rejected() {
        for bad in [
            ProductInput {
                name: "   ".into(),
                ..input()
            },
            ProductInput {
                price: Decimal::new(-1, 2),
                ..input()
            },
            ProductInput {
                stock_quantity: -3,
                ..input()
            },
        ] {
            assert!(matches!(bad.validate(), Err(Error::Validation(_))));
        }
    }

    #[test]
    fn optional_fields_default_when_absent() {
        let parsed: ProductInput =
            serde_json::from_str(r#"{"name": "Eau minérale", "price": 0.8}"#).unwrap();

        assert_eq!(parsed.price, Decimal::new(8, 1));
        assert!(parsed.in_stock);
        assert_eq!(parsed.stock_quantity, 0);
        assert!(parsed.tags.0.is_empty());
        assert_eq!(parsed.image_url, None);
    }
}
