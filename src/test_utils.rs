//! Shared test utilities for `DormHub`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults, plus recording mocks for
//! the external collaborators.

use crate::{
    core::{bookings, properties, rooms},
    entities,
    entities::PaymentMethod,
    errors::{Error, Result},
    external::{BookingEvent, NotificationPublisher, PaymentGateway, TracingPublisher},
};
use sea_orm::DatabaseConnection;
use std::sync::Mutex;

/// Landlord id used by the default test property.
pub const TEST_LANDLORD: i64 = 7;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test property with sensible defaults, owned by `landlord_id`.
pub async fn create_test_property(
    db: &DatabaseConnection,
    landlord_id: i64,
) -> Result<entities::property::Model> {
    properties::create_property(
        db,
        landlord_id,
        "Test Dormitory".to_string(),
        "12 Hostel Lane".to_string(),
        "Nairobi".to_string(),
        None,
        vec!["wifi".to_string()],
    )
    .await
}

/// Creates a test room with custom number, capacity, and monthly rate.
pub async fn create_custom_room(
    db: &DatabaseConnection,
    property_id: i64,
    room_number: &str,
    capacity: i32,
    monthly_rate_cents: i64,
) -> Result<entities::room::Model> {
    rooms::create_room(
        db,
        property_id,
        room_number.to_string(),
        "double".to_string(),
        capacity,
        monthly_rate_cents,
    )
    .await
}

/// Creates a pending test booking starting today for three months.
pub async fn create_test_booking(
    db: &DatabaseConnection,
    tenant_id: i64,
    room_id: i64,
) -> Result<entities::booking::Model> {
    bookings::create_booking(
        db,
        &TracingPublisher,
        tenant_id,
        room_id,
        chrono::Utc::now().date_naive(),
        3,
        None,
    )
    .await
}

/// Sets up a complete test environment: database, one property owned by
/// [`TEST_LANDLORD`], and one capacity-2 room at 5000 cents per month.
pub async fn setup_with_room() -> Result<(
    DatabaseConnection,
    entities::property::Model,
    entities::room::Model,
)> {
    let db = setup_test_db().await?;
    let property = create_test_property(&db, TEST_LANDLORD).await?;
    let room = create_custom_room(&db, property.id, "101", 2, 5000).await?;
    Ok((db, property, room))
}

/// Payment gateway mock that records calls and can be told to fail.
#[derive(Debug, Default)]
pub struct MockGateway {
    fail: bool,
    charges: Mutex<Vec<(String, i64)>>,
    refunds: Mutex<Vec<(String, i64)>>,
}

impl MockGateway {
    /// A gateway that accepts every call.
    pub fn new() -> Self {
        Self::default()
    }

    /// A gateway whose every call fails with an external-service error.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Number of successful charge calls.
    pub fn charge_count(&self) -> usize {
        self.charges.lock().map(|c| c.len()).unwrap_or_default()
    }

    /// Number of successful refund calls.
    pub fn refund_count(&self) -> usize {
        self.refunds.lock().map(|r| r.len()).unwrap_or_default()
    }
}

impl PaymentGateway for MockGateway {
    async fn charge(
        &self,
        booking_reference: &str,
        amount_cents: i64,
        _method: PaymentMethod,
    ) -> Result<String> {
        if self.fail {
            return Err(Error::ExternalService {
                message: "gateway offline".to_string(),
            });
        }
        if let Ok(mut charges) = self.charges.lock() {
            charges.push((booking_reference.to_string(), amount_cents));
        }
        Ok(format!("gw-charge-{booking_reference}-{amount_cents}"))
    }

    async fn refund(&self, booking_reference: &str, amount_cents: i64) -> Result<String> {
        if self.fail {
            return Err(Error::ExternalService {
                message: "gateway offline".to_string(),
            });
        }
        if let Ok(mut refunds) = self.refunds.lock() {
            refunds.push((booking_reference.to_string(), amount_cents));
        }
        Ok(format!("gw-refund-{booking_reference}-{amount_cents}"))
    }
}

/// Notification publisher mock that records every published event.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    events: Mutex<Vec<BookingEvent>>,
}

impl RecordingPublisher {
    /// An empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything published so far, in order.
    pub fn events(&self) -> Vec<BookingEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl NotificationPublisher for RecordingPublisher {
    fn publish(&self, event: &BookingEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
