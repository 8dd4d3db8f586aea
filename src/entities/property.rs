//! Property entity - A landlord-owned building that rooms belong to.
//!
//! Properties carry address and house-rule metadata and are soft-deleted on
//! landlord request so historical bookings keep a valid reference.

use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Amenity names stored as a JSON list on the property row.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct AmenityList(pub Vec<String>);

/// Property database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "properties")]
pub struct Model {
    /// Unique identifier for the property
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Landlord who owns this property
    pub landlord_id: i64,
    /// Display name (e.g., "Sunrise Dormitory")
    pub name: String,
    /// Street address line
    pub address_line: String,
    /// City the property is located in
    pub city: String,
    /// Optional free-form house rules shown to tenants
    pub house_rules: Option<String>,
    /// Amenities offered by the property
    pub amenities: AmenityList,
    /// Soft delete flag - if true, property is hidden but data is preserved
    pub is_deleted: bool,
}

/// Defines relationships between Property and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One property has many rooms
    #[sea_orm(has_many = "super::room::Entity")]
    Rooms,
}

impl Related<super::room::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Rooms.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
