pub use sea_orm_migration::prelude::*;

mod m20260105_090000_create_schema_and_base_db_setup;
mod m20260105_090100_create_marketplace_tables;
mod m20260105_090200_add_initial_admin_user;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260105_090000_create_schema_and_base_db_setup::Migration),
            Box::new(m20260105_090100_create_marketplace_tables::Migration),
            Box::new(m20260105_090200_add_initial_admin_user::Migration),
        ]
    }
}
