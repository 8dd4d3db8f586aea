//! Database configuration module for `DormHub`.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! It provides functions for establishing database connections and creating all necessary tables
//! based on the entity definitions. The module uses `SeaORM`'s `Schema::create_table_from_entity`
//! method to automatically generate SQL statements from the entity models, ensuring that the
//! database schema matches the Rust struct definitions without requiring manual SQL.

use crate::entities::{
    Booking, CaretakerGrant, PaymentEntry, Property, Room, TenantAssignment,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Establishes a connection to the database at the given URL.
///
/// The URL comes from application configuration, with `DATABASE_URL` in the
/// environment taking precedence over config.toml.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates all necessary database tables using `SeaORM`'s schema generation from entity definitions.
///
/// This function uses the `DeriveEntityModel` macros to automatically generate proper SQL
/// statements for table creation, ensuring the database schema matches the Rust struct definitions.
/// It creates tables for properties, rooms, bookings, tenant assignments, payment entries,
/// and caretaker grants.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    // Use SeaORM's proper table creation using Schema::create_table_from_entity
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    // Create tables using SeaORM's schema generation
    let property_table = schema.create_table_from_entity(Property);
    let room_table = schema.create_table_from_entity(Room);
    let booking_table = schema.create_table_from_entity(Booking);
    let assignment_table = schema.create_table_from_entity(TenantAssignment);
    let payment_table = schema.create_table_from_entity(PaymentEntry);
    let grant_table = schema.create_table_from_entity(CaretakerGrant);

    db.execute(builder.build(&property_table)).await?;
    db.execute(builder.build(&room_table)).await?;
    db.execute(builder.build(&booking_table)).await?;
    db.execute(builder.build(&assignment_table)).await?;
    db.execute(builder.build(&payment_table)).await?;
    db.execute(builder.build(&grant_table)).await?;

    // Partial unique index: at most one active assignment per tenant,
    // enforced by the store itself rather than by application-level reads.
    db.execute_unprepared(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_tenant_assignments_active \
         ON tenant_assignments (tenant_id) WHERE move_out_date IS NULL",
    )
    .await?;

    Ok(())
}
