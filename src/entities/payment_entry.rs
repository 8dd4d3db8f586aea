//! Payment ledger entry entity - One signed movement of money for a booking.
//!
//! The ledger is append-only: corrections and refunds are new entries with
//! negative amounts, never edits. Payment status is recomputed from the net
//! sum of a booking's entries.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// How a ledger entry moved money.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum PaymentMethod {
    /// Cash handed over in person; never touches the gateway
    #[sea_orm(string_value = "cash")]
    Cash,
    /// Card charge through the payment gateway
    #[sea_orm(string_value = "card")]
    Card,
    /// Bank transfer through the payment gateway
    #[sea_orm(string_value = "bank_transfer")]
    BankTransfer,
    /// Refund entry; amount is negative
    #[sea_orm(string_value = "refund")]
    Refund,
}

impl PaymentMethod {
    /// Whether charges with this method go through the external gateway.
    pub const fn uses_gateway(self) -> bool {
        matches!(self, Self::Card | Self::BankTransfer)
    }
}

/// Payment ledger entry database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payment_entries")]
pub struct Model {
    /// Unique identifier for the entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Booking this entry belongs to
    pub booking_id: i64,
    /// Signed amount in cents; refunds are negative
    pub amount_cents: i64,
    /// How the money moved
    pub method: PaymentMethod,
    /// When the entry was recorded
    pub recorded_at: DateTimeUtc,
}

/// Defines relationships between PaymentEntry and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each entry belongs to one booking
    #[sea_orm(
        belongs_to = "super::booking::Entity",
        from = "Column::BookingId",
        to = "super::booking::Column::Id"
    )]
    Booking,
}

impl Related<super::booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Booking.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
