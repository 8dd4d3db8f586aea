//! Permission gate - landlord/caretaker authorization with revocable grants.
//!
//! Landlords are always authorized for properties they own. Caretakers act
//! under a grant scoped to a property set and four permission domains. Every
//! authorization reads the grant rows fresh from the store: there is no cache
//! that could return a stale "allow" after a revocation commits.

use crate::{
    entities::{CaretakerGrant, PropertyIdSet, caretaker_grant},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};

/// The resolved identity behind a request, as produced by the (out-of-scope)
/// authentication service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Actor {
    /// A landlord acting on their own portfolio
    Landlord {
        /// Landlord id
        id: i64,
    },
    /// A caretaker acting under a landlord's grant
    Caretaker {
        /// Caretaker id
        id: i64,
    },
    /// Internal maintenance (expiry/completion sweeps); always authorized
    System,
}

/// The four permission domains a grant can cover.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PermissionDomain {
    /// Confirming, cancelling, and completing bookings
    Bookings,
    /// Managing tenant records and assignments
    Tenants,
    /// Messaging tenants on the landlord's behalf
    Messages,
    /// Managing rooms: rates, maintenance, room records
    Rooms,
}

/// A concrete mutating action, mapped onto its permission domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Confirm a pending booking
    ConfirmBooking,
    /// Cancel a booking
    CancelBooking,
    /// Complete a booking ahead of its term
    CompleteBooking,
    /// Create or end tenant assignments
    ManageTenants,
    /// Send a message to a tenant
    SendMessage,
    /// Create or edit room records
    ManageRooms,
    /// Put a room into or out of maintenance
    SetMaintenance,
}

impl Action {
    /// The permission domain this action falls under.
    pub const fn domain(self) -> PermissionDomain {
        match self {
            Self::ConfirmBooking | Self::CancelBooking | Self::CompleteBooking => {
                PermissionDomain::Bookings
            }
            Self::ManageTenants => PermissionDomain::Tenants,
            Self::SendMessage => PermissionDomain::Messages,
            Self::ManageRooms | Self::SetMaintenance => PermissionDomain::Rooms,
        }
    }
}

/// Per-domain flags requested when issuing a grant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PermissionFlags {
    /// May act on bookings
    pub bookings: bool,
    /// May act on tenant records
    pub tenants: bool,
    /// May message tenants
    pub messages: bool,
    /// May manage rooms
    pub rooms: bool,
}

const fn domain_allowed(grant: &caretaker_grant::Model, domain: PermissionDomain) -> bool {
    match domain {
        PermissionDomain::Bookings => grant.can_bookings,
        PermissionDomain::Tenants => grant.can_tenants,
        PermissionDomain::Messages => grant.can_messages,
        PermissionDomain::Rooms => grant.can_rooms,
    }
}

/// Authorizes an actor for a permission domain on a property.
///
/// Caretaker checks hit the store on every call so that [`revoke`] takes
/// effect immediately, even for requests in flight at revocation time.
pub async fn authorize<C>(
    db: &C,
    actor: &Actor,
    domain: PermissionDomain,
    property_id: i64,
) -> Result<()>
where
    C: ConnectionTrait,
{
    match actor {
        Actor::System => Ok(()),
        Actor::Landlord { id } => {
            let property = crate::core::properties::get_property_by_id(db, property_id)
                .await?
                .ok_or_else(|| Error::not_found("property", property_id))?;
            if property.landlord_id == *id {
                Ok(())
            } else {
                Err(Error::PermissionDenied {
                    reason: format!("landlord {id} does not own property {property_id}"),
                })
            }
        }
        Actor::Caretaker { id } => {
            let grants = CaretakerGrant::find()
                .filter(caretaker_grant::Column::CaretakerId.eq(*id))
                .filter(caretaker_grant::Column::Revoked.eq(false))
                .all(db)
                .await?;

            let allowed = grants
                .iter()
                .any(|g| g.property_ids.contains(property_id) && domain_allowed(g, domain));

            if allowed {
                Ok(())
            } else {
                Err(Error::PermissionDenied {
                    reason: format!(
                        "caretaker {id} has no active grant for {domain:?} on property {property_id}"
                    ),
                })
            }
        }
    }
}

/// Issues a caretaker grant scoped to the given properties and flags.
///
/// The landlord must own every listed (non-deleted) property.
pub async fn grant_access(
    db: &DatabaseConnection,
    landlord_id: i64,
    caretaker_id: i64,
    permissions: PermissionFlags,
    property_ids: Vec<i64>,
) -> Result<caretaker_grant::Model> {
    if property_ids.is_empty() {
        return Err(Error::validation("a grant must cover at least one property"));
    }

    for property_id in &property_ids {
        let property = crate::core::properties::get_property_by_id(db, *property_id)
            .await?
            .ok_or_else(|| Error::not_found("property", *property_id))?;
        if property.landlord_id != landlord_id {
            return Err(Error::PermissionDenied {
                reason: format!(
                    "landlord {landlord_id} does not own property {property_id} and cannot delegate it"
                ),
            });
        }
    }

    let grant = caretaker_grant::ActiveModel {
        landlord_id: Set(landlord_id),
        caretaker_id: Set(caretaker_id),
        property_ids: Set(PropertyIdSet(property_ids)),
        can_bookings: Set(permissions.bookings),
        can_tenants: Set(permissions.tenants),
        can_messages: Set(permissions.messages),
        can_rooms: Set(permissions.rooms),
        revoked: Set(false),
        revocation_reason: Set(None),
        created_at: Set(chrono::Utc::now()),
        revoked_at: Set(None),
        ..Default::default()
    };

    let result = grant.insert(db).await?;
    Ok(result)
}

/// Permanently revokes a grant. There is no un-revoke: the landlord issues a
/// fresh grant instead. Revoking an already-revoked grant is a no-op.
pub async fn revoke(
    db: &DatabaseConnection,
    grant_id: i64,
    reason: String,
) -> Result<caretaker_grant::Model> {
    let grant = CaretakerGrant::find_by_id(grant_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("caretaker grant", grant_id))?;

    if grant.revoked {
        return Ok(grant);
    }

    let mut active: caretaker_grant::ActiveModel = grant.into();
    active.revoked = Set(true);
    active.revocation_reason = Set(Some(reason));
    active.revoked_at = Set(Some(chrono::Utc::now()));
    let result = active.update(db).await?;
    Ok(result)
}
