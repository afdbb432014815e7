pub use sea_orm_migration::prelude::*;

mod m20261001_000001_create_suppliers;
mod m20261001_000002_create_products;
mod m20261001_000003_create_consolidations;
mod m20261001_000004_create_orders;
mod m20261001_000005_create_payments;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20261001_000001_create_suppliers::Migration),
            Box::new(m20261001_000002_create_products::Migration),
            Box::new(m20261001_000003_create_consolidations::Migration),
            Box::new(m20261001_000004_create_orders::Migration),
            Box::new(m20261001_000005_create_payments::Migration),
        ]
    }
}
