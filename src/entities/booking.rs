//! Booking entity - A tenant's reservation request and its lifecycle record.
//!
//! Booking status and payment status are orthogonal axes: the booking state
//! machine (`pending → confirmed → completed`, with cancellation from either
//! non-terminal state) never encodes payment progress, and payment status is
//! derived purely from the ledger. `total_due_cents` is snapshotted from the
//! room's rate at creation so later rate changes never reprice an open booking.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a booking. `Cancelled` and `Completed` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum BookingStatus {
    /// Created by the tenant, not yet confirmed; no slot is held
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Slot reserved and tenant assigned
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    /// Terminal: cancelled by actor or expiry sweep
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    /// Terminal: the stay ran its course
    #[sea_orm(string_value = "completed")]
    Completed,
}

impl BookingStatus {
    /// Whether this state admits no further transitions.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Cancelled | Self::Completed)
    }
}

/// Payment progress derived from the booking's ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum PaymentStatus {
    /// Net paid is zero or below and the booking is still live
    #[sea_orm(string_value = "unpaid")]
    Unpaid,
    /// Some payment received, less than the total due
    #[sea_orm(string_value = "partial")]
    Partial,
    /// Net paid covers the total due
    #[sea_orm(string_value = "paid")]
    Paid,
    /// Fully refunded after cancellation
    #[sea_orm(string_value = "refunded")]
    Refunded,
}

/// Booking database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bookings")]
pub struct Model {
    /// Unique identifier for the booking
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-facing reference code (e.g., "BK-000042")
    #[sea_orm(unique)]
    pub reference: String,
    /// Tenant who requested the booking
    pub tenant_id: i64,
    /// Room being booked
    pub room_id: i64,
    /// Property the room belongs to, denormalized for permission checks
    pub property_id: i64,
    /// First day of the stay
    pub start_date: Date,
    /// Length of the stay in months; at least 1
    pub total_months: i32,
    /// Total amount due in cents, snapshotted at creation
    pub total_due_cents: i64,
    /// Current lifecycle state
    pub status: BookingStatus,
    /// Current payment progress
    pub payment_status: PaymentStatus,
    /// Optional free-form note from the tenant
    pub notes: Option<String>,
    /// Reason recorded when the booking was cancelled
    pub cancellation_reason: Option<String>,
    /// When the booking was created
    pub created_at: DateTimeUtc,
    /// When the booking was confirmed, if it was
    pub confirmed_at: Option<DateTimeUtc>,
    /// When the booking was cancelled, if it was
    pub cancelled_at: Option<DateTimeUtc>,
    /// When the booking was completed, if it was
    pub completed_at: Option<DateTimeUtc>,
}

/// Defines relationships between Booking and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each booking targets one room
    #[sea_orm(
        belongs_to = "super::room::Entity",
        from = "Column::RoomId",
        to = "super::room::Column::Id"
    )]
    Room,
    /// One booking has many payment ledger entries
    #[sea_orm(has_many = "super::payment_entry::Entity")]
    PaymentEntries,
}

impl Related<super::room::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Room.def()
    }
}

impl Related<super::payment_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PaymentEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
