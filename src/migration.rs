//! Schema migrations for the storefront tables.

pub use sea_orm_migration::prelude::*;

mod m20241017_000001_create_storefront_tables;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    // Own migration table so the schema can share a database with other services
    fn migration_table_name() -> sea_orm::DynIden {
        Alias::new("epicerie_migrations").into_iden()
    }

    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20241017_000001_create_storefront_tables::Migration)]
    }
}
