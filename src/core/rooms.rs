//! Room registry - capacity, occupancy slots, and status derivation.
//!
//! Slot reservation and release are single conditional `UPDATE` statements so
//! that concurrent confirmations racing for the last slot are decided by the
//! database, never by a read-modify-write in application code. Room status is
//! derived in exactly one place ([`derive_status`]) and exposed through
//! [`get_availability`].

use crate::{
    entities::{Room, room},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*, sea_query::Expr};
use serde::Serialize;

/// Derived room status. Never stored; always computed from occupancy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    /// At least one free slot and not under maintenance
    Available,
    /// Every slot is taken
    Occupied,
    /// Taken out of service; only possible while empty
    Maintenance,
}

/// One room's availability as exposed to booking and admin surfaces.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RoomAvailability {
    /// Room id
    pub room_id: i64,
    /// Free slots: `capacity - occupied_count`
    pub available_slots: i32,
    /// Derived status
    pub status: RoomStatus,
}

/// The single source of truth for a room's status.
pub const fn derive_status(occupied_count: i32, capacity: i32, maintenance: bool) -> RoomStatus {
    if maintenance {
        RoomStatus::Maintenance
    } else if occupied_count >= capacity {
        RoomStatus::Occupied
    } else {
        RoomStatus::Available
    }
}

/// Creates a new room under a property, performing input validation.
pub async fn create_room(
    db: &DatabaseConnection,
    property_id: i64,
    room_number: String,
    room_type: String,
    capacity: i32,
    monthly_rate_cents: i64,
) -> Result<room::Model> {
    if room_number.trim().is_empty() {
        return Err(Error::validation("room number cannot be empty"));
    }
    if capacity < 1 {
        return Err(Error::validation("room capacity must be at least 1"));
    }
    if monthly_rate_cents < 0 {
        return Err(Error::validation("monthly rate cannot be negative"));
    }

    crate::core::properties::get_property_by_id(db, property_id)
        .await?
        .ok_or_else(|| Error::not_found("property", property_id))?;

    let room = room::ActiveModel {
        property_id: Set(property_id),
        room_number: Set(room_number.trim().to_string()),
        room_type: Set(room_type),
        capacity: Set(capacity),
        monthly_rate_cents: Set(monthly_rate_cents),
        occupied_count: Set(0),
        maintenance: Set(false),
        ..Default::default()
    };

    let result = room.insert(db).await?;
    Ok(result)
}

/// Finds a room by its unique ID.
pub async fn get_room_by_id<C>(db: &C, room_id: i64) -> Result<Option<room::Model>>
where
    C: ConnectionTrait,
{
    Room::find_by_id(room_id).one(db).await.map_err(Into::into)
}

/// Returns per-room availability for a property, ordered by room number.
///
/// Read-only; reserving a slot happens only at booking confirmation.
pub async fn get_availability(
    db: &DatabaseConnection,
    property_id: i64,
) -> Result<Vec<RoomAvailability>> {
    let property = crate::core::properties::get_property_by_id(db, property_id)
        .await?
        .ok_or_else(|| Error::not_found("property", property_id))?;

    let rooms = Room::find()
        .filter(room::Column::PropertyId.eq(property.id))
        .order_by_asc(room::Column::RoomNumber)
        .all(db)
        .await?;

    Ok(rooms
        .iter()
        .map(|r| RoomAvailability {
            room_id: r.id,
            available_slots: r.capacity - r.occupied_count,
            status: derive_status(r.occupied_count, r.capacity, r.maintenance),
        })
        .collect())
}

/// Atomically takes one slot in the room.
///
/// A single conditional update guards the `occupied_count < capacity`
/// invariant: concurrent reservations on the same room are linearized by the
/// database and at most `capacity` of them can ever succeed.
///
/// # Errors
/// * [`Error::NotFound`] - the room does not exist
/// * [`Error::RoomUnavailable`] - the room is under maintenance
/// * [`Error::CapacityExceeded`] - every slot is already taken
pub async fn reserve_slot<C>(db: &C, room_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    let result = Room::update_many()
        .col_expr(
            room::Column::OccupiedCount,
            Expr::col(room::Column::OccupiedCount).add(1),
        )
        .filter(room::Column::Id.eq(room_id))
        .filter(room::Column::Maintenance.eq(false))
        .filter(Expr::col(room::Column::OccupiedCount).lt(Expr::col(room::Column::Capacity)))
        .exec(db)
        .await?;

    if result.rows_affected > 0 {
        return Ok(());
    }

    // Zero rows affected: disambiguate by reading the row
    let room = Room::find_by_id(room_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("room", room_id))?;

    if room.maintenance {
        Err(Error::RoomUnavailable { room_id })
    } else {
        Err(Error::CapacityExceeded { room_id })
    }
}

/// Atomically frees one slot in the room, floored at zero.
///
/// Releasing an already-empty room is a no-op, not an error, so compensating
/// actions and idempotent cancellation replays are always safe.
pub async fn release_slot<C>(db: &C, room_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    let result = Room::update_many()
        .col_expr(
            room::Column::OccupiedCount,
            Expr::col(room::Column::OccupiedCount).sub(1),
        )
        .filter(room::Column::Id.eq(room_id))
        .filter(Expr::col(room::Column::OccupiedCount).gt(0))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        // Distinguish "already empty" (fine) from "no such room"
        Room::find_by_id(room_id)
            .one(db)
            .await?
            .ok_or_else(|| Error::not_found("room", room_id))?;
    }

    Ok(())
}

/// Puts a room into or takes it out of maintenance.
///
/// Entering maintenance is rejected with [`Error::RoomOccupied`] while any
/// slot is taken; the guard is part of the conditional update itself.
pub async fn set_maintenance(
    db: &DatabaseConnection,
    room_id: i64,
    on: bool,
) -> Result<room::Model> {
    if on {
        let result = Room::update_many()
            .col_expr(room::Column::Maintenance, Expr::value(true))
            .filter(room::Column::Id.eq(room_id))
            .filter(room::Column::OccupiedCount.eq(0))
            .exec(db)
            .await?;

        if result.rows_affected == 0 {
            Room::find_by_id(room_id)
                .one(db)
                .await?
                .ok_or_else(|| Error::not_found("room", room_id))?;
            return Err(Error::RoomOccupied { room_id });
        }
    } else {
        let result = Room::update_many()
            .col_expr(room::Column::Maintenance, Expr::value(false))
            .filter(room::Column::Id.eq(room_id))
            .exec(db)
            .await?;

        if result.rows_affected == 0 {
            return Err(Error::not_found("room", room_id));
        }
    }

    Room::find_by_id(room_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("room", room_id))
}
