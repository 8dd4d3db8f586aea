//! Tenant assignment entity - The realized link between a tenant and a room.
//!
//! Distinct from a booking: an assignment exists only once a booking is
//! confirmed. A row with `move_out_date == None` is *active*; at most one
//! active row may exist per tenant platform-wide.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Tenant assignment database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tenant_assignments")]
pub struct Model {
    /// Unique identifier for the assignment
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Tenant occupying the slot
    pub tenant_id: i64,
    /// Room being occupied
    pub room_id: i64,
    /// Booking that produced this assignment
    pub booking_id: i64,
    /// Day the tenant moves in
    pub move_in_date: Date,
    /// Day the tenant moved out; None while the assignment is active
    pub move_out_date: Option<Date>,
}

/// Defines relationships between TenantAssignment and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each assignment occupies one room
    #[sea_orm(
        belongs_to = "super::room::Entity",
        from = "Column::RoomId",
        to = "super::room::Column::Id"
    )]
    Room,
    /// Each assignment was produced by one booking
    #[sea_orm(
        belongs_to = "super::booking::Entity",
        from = "Column::BookingId",
        to = "super::booking::Column::Id"
    )]
    Booking,
}

impl Related<super::room::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Room.def()
    }
}

impl Related<super::booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Booking.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
