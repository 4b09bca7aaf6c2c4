#![allow(dead_code)]

use epicerie::auth::{provision_admin, AdminProfile};
use epicerie::migration::Migrator;
use epicerie::orders::{LineItemInput, OrderInput};
use epicerie::{AdminId, AdminSession, SessionAuthority};
use rust_decimal::Decimal;
use sea_orm::prelude::Uuid;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "correct horse battery staple";

/// Fresh in-memory database with the schema applied.
///
/// The pool is pinned to one connection: every connection to
/// `sqlite::memory:` would otherwise see its own empty database.
pub async fn setup_db() -> DatabaseConnection {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);

    let db = Database::connect(opt)
        .await
        .expect("connect to in-memory sqlite");
    Migrator::up(&db, None).await.expect("apply migrations");
    db
}

pub async fn seed_admin(db: &DatabaseConnection) -> AdminProfile {
    provision_admin(db, ADMIN_USERNAME, "admin@epicerie.local", ADMIN_PASSWORD)
        .await
        .expect("provision admin")
}

/// Provisions the admin, logs in and validates, returning both halves.
pub async fn login(db: &DatabaseConnection) -> (AdminSession, AdminId) {
    seed_admin(db).await;
    let sessions = SessionAuthority::new(db.clone());
    let session = sessions
        .issue(ADMIN_USERNAME, ADMIN_PASSWORD)
        .await
        .expect("issue session");
    let admin = sessions
        .validate(&session.session_token)
        .await
        .expect("validate fresh session");
    (session, admin)
}

pub fn line_item(name: &str, price_cents: i64, quantity: i32) -> LineItemInput {
    LineItemInput {
        product_id: Some(Uuid::new_v4()),
        product_name: Some(name.to_owned()),
        product_price: Some(Decimal::new(price_cents, 2)),
        quantity: Some(quantity),
        subtotal: Some(Decimal::new(price_cents * quantity as i64, 2)),
    }
}

pub fn order_with(items: Vec<LineItemInput>) -> OrderInput {
    let total = items
        .iter()
        .filter_map(|item| item.subtotal)
        .sum::<Decimal>();
    OrderInput {
        customer_name: Some("Jeanne Martin".to_owned()),
        customer_email: Some("jeanne@example.fr".to_owned()),
        customer_phone: Some("0601020304".to_owned()),
        delivery_address: Some("12 rue des Lilas, 69001 Lyon".to_owned()),
        items: Some(items),
        total_amount: Some(total),
        notes: Some("Sonner deux fois".to_owned()),
    }
}
