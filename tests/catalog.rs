mod common;

use common::{login, setup_db};
use epicerie::entity::product::Tags;
use epicerie::{Catalog, Error, ProductInput};
use rust_decimal::Decimal;
use sea_orm::prelude::Uuid;

fn product(name: &str, in_stock: bool) -> ProductInput {
    ProductInput {
        name: name.to_owned(),
        description: format!("{name} de qualité"),
        price: Decimal::new(250, 2),
        unit: "pièce".to_owned(),
        image_url: Some(format!("https://cdn.example/{name}.jpg")),
        in_stock,
        stock_quantity: 12,
        tags: ["Boissons"].into_iter().collect(),
    }
}

#[tokio::test]
async fn public_listing_hides_out_of_stock_and_sorts_by_name() {
    let db = setup_db().await;
    let (_, admin) = login(&db).await;
    let catalog = Catalog::new(db.clone());

    for (name, in_stock) in [
        ("Vin rouge", true),
        ("Bonbons", false),
        ("Café moulu", true),
        ("Eau minérale", true),
        ("Pizza surgelée", false),
    ] {
        catalog.create(admin, product(name, in_stock)).await.unwrap();
    }

    let public = catalog.list_public().await.unwrap();
    let names: Vec<_> = public.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Café moulu", "Eau minérale", "Vin rouge"]);
    assert!(public.iter().all(|p| p.in_stock));

    let all = catalog.list_all(admin).await.unwrap();
    assert_eq!(all.len(), 5);
    assert_eq!(all[0].name, "Bonbons");
}

#[tokio::test]
async fn toggling_stock_moves_product_in_and_out_of_public_view() {
    let db = setup_db().await;
    let (_, admin) = login(&db).await;
    let catalog = Catalog::new(db.clone());

    let id = catalog.create(admin, product("Chips nature", true)).await.unwrap();
    assert_eq!(catalog.list_public().await.unwrap().len(), 1);

    catalog
        .update(admin, id, product("Chips nature", false))
        .await
        .unwrap();
    assert!(catalog.list_public().await.unwrap().is_empty());
}

#[tokio::test]
async fn create_records_the_creating_admin() {
    let db = setup_db().await;
    let (session, admin) = login(&db).await;
    let catalog = Catalog::new(db.clone());

    let id = catalog.create(admin, product("Gel douche", true)).await.unwrap();
    let stored = catalog.get(admin, id).await.unwrap();

    assert_eq!(stored.created_by, Some(session.admin.id));
    assert_eq!(stored.created_at, stored.updated_at);
    assert_eq!(stored.price, Decimal::new(250, 2));
    assert_eq!(stored.tags, ["Boissons"].into_iter().collect::<Tags>());
}

#[tokio::test]
async fn update_replaces_every_field() {
    let db = setup_db().await;
    let (_, admin) = login(&db).await;
    let catalog = Catalog::new(db.clone());

    let id = catalog.create(admin, product("Bière blonde", true)).await.unwrap();
    let before = catalog.get(admin, id).await.unwrap();

    let replacement = ProductInput {
        name: "Bière ambrée".to_owned(),
        description: String::new(),
        price: Decimal::new(375, 2),
        unit: "bouteille 33cl".to_owned(),
        image_url: None,
        in_stock: false,
        stock_quantity: 0,
        tags: Tags::default(),
    };
    catalog.update(admin, id, replacement.clone()).await.unwrap();

    let after = catalog.get(admin, id).await.unwrap();
    assert_eq!(after.name, replacement.name);
    assert_eq!(after.description, replacement.description);
    assert_eq!(after.price, replacement.price);
    assert_eq!(after.unit, replacement.unit);
    assert_eq!(after.image_url, None);
    assert_eq!(after.in_stock, replacement.in_stock);
    assert_eq!(after.stock_quantity, replacement.stock_quantity);
    assert_eq!(after.tags, replacement.tags);

    assert_eq!(after.created_by, before.created_by);
    assert_eq!(after.created_at, before.created_at);
    assert!(after.updated_at >= before.updated_at);
}

#[tokio::test]
async fn update_of_missing_product_is_not_found() {
    let db = setup_db().await;
    let (_, admin) = login(&db).await;
    let catalog = Catalog::new(db.clone());

    assert!(matches!(
        catalog
            .update(admin, Uuid::new_v4(), product("Fantôme", true))
            .await,
        Err(Error::NotFound("Product"))
    ));
}

#[tokio::test]
async fn invalid_input_is_rejected_before_storage() {
    let db = setup_db().await;
    let (_, admin) = login(&db).await;
    let catalog = Catalog::new(db.clone());

    let nameless = ProductInput {
        name: String::new(),
        ..product("x", true)
    };
    let negative = ProductInput {
        price: Decimal::new(-100, 2),
        ..product("Bonbons", true)
    };

    assert!(matches!(catalog.create(admin, nameless).await, Err(Error::Validation(_))));
    assert!(matches!(catalog.create(admin, negative).await, Err(Error::Validation(_))));
    assert!(catalog.list_all(admin).await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_is_idempotent() {
    let db = setup_db().await;
    let (_, admin) = login(&db).await;
    let catalog = Catalog::new(db.clone());

    let id = catalog.create(admin, product("Cacahuètes", true)).await.unwrap();
    catalog.delete(admin, id).await.unwrap();
    catalog.delete(admin, id).await.unwrap();

    assert!(matches!(catalog.get(admin, id).await, Err(Error::NotFound(_))));
}
