//! Room entity - One rentable room inside a property.
//!
//! A room holds `capacity` slots; `occupied_count` tracks how many are taken.
//! The invariant `0 <= occupied_count <= capacity` is enforced by conditional
//! single-statement updates in [`crate::core::rooms`], never by read-modify-write.
//! Room status is derived from these fields in one place, not stored.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Room database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "rooms")]
pub struct Model {
    /// Unique identifier for the room
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Property this room belongs to
    pub property_id: i64,
    /// Human-facing room number (e.g., "204-B")
    pub room_number: String,
    /// Room type label (e.g., "double", "quad")
    pub room_type: String,
    /// Total number of tenant slots; always positive
    pub capacity: i32,
    /// Monthly rate in cents
    pub monthly_rate_cents: i64,
    /// Number of currently occupied slots (0..=capacity)
    pub occupied_count: i32,
    /// Whether the room is under maintenance; only settable while empty
    pub maintenance: bool,
}

/// Defines relationships between Room and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each room belongs to one property
    #[sea_orm(
        belongs_to = "super::property::Entity",
        from = "Column::PropertyId",
        to = "super::property::Column::Id"
    )]
    Property,
    /// One room has many bookings
    #[sea_orm(has_many = "super::booking::Entity")]
    Bookings,
    /// One room has many tenant assignments over its lifetime
    #[sea_orm(has_many = "super::tenant_assignment::Entity")]
    TenantAssignments,
}

impl Related<super::property::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Property.def()
    }
}

impl Related<super::booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bookings.def()
    }
}

impl Related<super::tenant_assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TenantAssignments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
