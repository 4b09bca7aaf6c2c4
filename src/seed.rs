//! Out-of-band provisioning: the first admin account and a demo catalog.

use std::env;

use rust_decimal::Decimal;
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};
use tracing::info;

use crate::auth::{provision_admin, AdminProfile};
use crate::catalog::{insert_product, ProductInput};
use crate::config::ConfigError;
use crate::entity::product::Entity as ProductEntity;
use crate::error::Result;

/// Admin account to create, read from `SEED_ADMIN_*` variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedAdmin {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl SeedAdmin {
    pub fn from_env() -> Result<Self, ConfigError> {
        let var = |name: &'static str| {
            env::var(name)
                .ok()
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(name))
        };
        Ok(Self {
            username: var("SEED_ADMIN_USERNAME")?,
            email: var("SEED_ADMIN_EMAIL")?,
            password: var("SEED_ADMIN_PASSWORD")?,
        })
    }
}

/// Name, description, price in cents, unit, stock, tags.
const DEMO_PRODUCTS: &[(&str, &str, i64, &str, i32, &[&str])] = &[
    ("Coca-Cola", "Boisson gazeuse rafraîchissante", 250, "bouteille 1.5L", 50, &["Boissons"]),
    ("Pain de mie", "Pain de mie moelleux tranché", 180, "paquet", 30, &["Autres"]),
    ("Lait demi-écrémé", "Lait frais demi-écrémé", 120, "litre", 40, &["Boissons"]),
    ("Chips nature", "Chips croustillantes salées", 200, "paquet 150g", 60, &["Salé"]),
    ("Chocolat au lait", "Tablette de chocolat au lait", 230, "tablette 200g", 45, &["Sucré"]),
    ("Bière blonde", "Bière blonde artisanale", 350, "bouteille 75cl", 35, &["Alcool", "Boissons"]),
    ("Pizza surgelée", "Pizza 4 fromages surgelée", 450, "pièce", 25, &["Surgelé"]),
    ("Eau minérale", "Eau minérale naturelle", 80, "bouteille 1.5L", 100, &["Boissons"]),
    ("Bonbons", "Assortiment de bonbons", 300, "sachet 200g", 40, &["Sucré"]),
    ("Glace vanille", "Crème glacée vanille de Madagascar", 550, "pot 500ml", 20, &["Surgelé", "Sucré"]),
    ("Vin rouge", "Vin rouge de table", 600, "bouteille 75cl", 30, &["Alcool"]),
    ("Café moulu", "Café arabica moulu", 420, "paquet 250g", 35, &["Boissons"]),
    ("Cacahuètes", "Cacahuètes grillées salées", 280, "sachet 200g", 50, &["Salé"]),
    ("Shampooing", "Shampooing cheveux normaux", 390, "flacon 250ml", 25, &["Parfum"]),
    ("Gel douche", "Gel douche parfum frais", 350, "flacon 250ml", 30, &["Parfum"]),
];

/// Creates the seed admin (if missing) and fills an empty catalog.
pub async fn run(conn: &DatabaseConnection, admin: &SeedAdmin) -> Result<AdminProfile> {
    let profile = provision_admin(conn, &admin.username, &admin.email, &admin.password).await?;
    demo_products(conn, &profile).await?;
    Ok(profile)
}

/// Inserts the demo catalog attributed to `admin`, unless products exist.
/// Returns how many products were inserted.
pub async fn demo_products(conn: &DatabaseConnection, admin: &AdminProfile) -> Result<usize> {
    if ProductEntity::find().count(conn).await? > 0 {
        info!("catalog already populated, skipping demo products");
        return Ok(0);
    }

    for (name, description, cents, unit, stock, tags) in DEMO_PRODUCTS {
        let input = ProductInput {
            name: (*name).to_owned(),
            description: (*description).to_owned(),
            price: Decimal::new(*cents, 2),
            unit: (*unit).to_owned(),
            image_url: None,
            in_stock: true,
            stock_quantity: *stock,
            tags: tags.iter().copied().collect(),
        };
        insert_product(conn, input, Some(admin.id)).await?;
    }

    info!(count = DEMO_PRODUCTS.len(), "demo products inserted");
    Ok(DEMO_PRODUCTS.len())
}
