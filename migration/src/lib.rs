pub use sea_orm_migration::prelude::*;

mod m20251122_101500_create_event_table;
mod m20251122_102230_create_ticket_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251122_101500_create_event_table::Migration),
            Box::new(m20251122_102230_create_ticket_table::Migration),
        ]
    }
}
