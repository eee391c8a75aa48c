pub use sea_orm_migration::prelude::*;

mod m20260601_000001_init;
mod m20260601_000002_leads;
mod m20260601_000003_progression;

pub struct Migrator;
#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260601_000001_init::Migration),
            Box::new(m20260601_000002_leads::Migration),
            Box::new(m20260601_000003_progression::Migration),
        ]
    }
}
