//! Caretaker grant entity - Landlord-delegated, property-scoped permissions.
//!
//! A grant scopes a caretaker to a set of properties with per-domain flags.
//! Revocation is permanent: a revoked grant never authorizes again and is
//! never reactivated; the landlord issues a fresh grant instead.

use sea_orm::FromJsonQueryResult;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Property ids covered by a grant, stored as a JSON list on the grant row.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct PropertyIdSet(pub Vec<i64>);

impl PropertyIdSet {
    /// Whether the grant covers the given property.
    pub fn contains(&self, property_id: i64) -> bool {
        self.0.contains(&property_id)
    }
}

/// Caretaker grant database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "caretaker_grants")]
pub struct Model {
    /// Unique identifier for the grant
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Landlord who issued the grant
    pub landlord_id: i64,
    /// Caretaker the grant was issued to
    pub caretaker_id: i64,
    /// Properties the grant covers
    pub property_ids: PropertyIdSet,
    /// May act on bookings (confirm, cancel)
    pub can_bookings: bool,
    /// May act on tenant records
    pub can_tenants: bool,
    /// May message tenants on the landlord's behalf
    pub can_messages: bool,
    /// May manage rooms (rates, maintenance)
    pub can_rooms: bool,
    /// Permanently revoked; never flips back to false
    pub revoked: bool,
    /// Reason supplied at revocation
    pub revocation_reason: Option<String>,
    /// When the grant was issued
    pub created_at: DateTimeUtc,
    /// When the grant was revoked, if it was
    pub revoked_at: Option<DateTimeUtc>,
}

/// Defines relationships between CaretakerGrant and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
