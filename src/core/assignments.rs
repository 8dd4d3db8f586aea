//! Tenant assignment business logic - the realized link between tenant and room.
//!
//! Enforces the platform-wide rule that a tenant holds at most one active
//! assignment at a time. Assignment and unassignment are deliberately separate
//! operations: a reassignment is always explicit, never a silent merge.

use crate::{
    entities::{TenantAssignment, tenant_assignment},
    errors::{Error, Result},
};
use sea_orm::{Set, SqlErr, TransactionTrait, prelude::*, sea_query::Expr};

/// Returns the tenant's active assignment, if any.
pub async fn active_assignment<C>(
    db: &C,
    tenant_id: i64,
) -> Result<Option<tenant_assignment::Model>>
where
    C: ConnectionTrait,
{
    TenantAssignment::find()
        .filter(tenant_assignment::Column::TenantId.eq(tenant_id))
        .filter(tenant_assignment::Column::MoveOutDate.is_null())
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates an active assignment for the tenant.
///
/// Fails with [`Error::StaleAssignment`] if the tenant already holds an active
/// assignment anywhere on the platform. Callers that want to move a tenant
/// must use [`reassign`] instead; the two steps are never merged silently.
///
/// Runs against the caller's connection so confirmation flows can include it
/// in their transaction.
pub async fn assign<C>(
    db: &C,
    tenant_id: i64,
    room_id: i64,
    booking_id: i64,
    move_in_date: Date,
) -> Result<tenant_assignment::Model>
where
    C: ConnectionTrait,
{
    if active_assignment(db, tenant_id).await?.is_some() {
        return Err(Error::StaleAssignment { tenant_id });
    }

    let assignment = tenant_assignment::ActiveModel {
        tenant_id: Set(tenant_id),
        room_id: Set(room_id),
        booking_id: Set(booking_id),
        move_in_date: Set(move_in_date),
        move_out_date: Set(None),
        ..Default::default()
    };

    // The partial unique index over active rows backstops the read above:
    // concurrent assigns racing past it lose here, not in the table.
    match assignment.insert(db).await {
        Ok(result) => Ok(result),
        Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            Err(Error::StaleAssignment { tenant_id })
        }
        Err(err) => Err(err.into()),
    }
}

/// Ends the tenant's active assignment by stamping today's date on it.
///
/// No-op when the tenant has no active assignment, so cancellation replays
/// and compensating actions are always safe.
pub async fn unassign<C>(db: &C, tenant_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    let today = chrono::Utc::now().date_naive();

    TenantAssignment::update_many()
        .col_expr(tenant_assignment::Column::MoveOutDate, Expr::value(today))
        .filter(tenant_assignment::Column::TenantId.eq(tenant_id))
        .filter(tenant_assignment::Column::MoveOutDate.is_null())
        .exec(db)
        .await?;

    Ok(())
}

/// Moves a tenant to a new room: explicit unassign followed by assign,
/// two distinct operations inside one transaction.
pub async fn reassign(
    db: &DatabaseConnection,
    tenant_id: i64,
    room_id: i64,
    booking_id: i64,
    move_in_date: Date,
) -> Result<tenant_assignment::Model> {
    let txn = db.begin().await?;
    unassign(&txn, tenant_id).await?;
    let assignment = assign(&txn, tenant_id, room_id, booking_id, move_in_date).await?;
    txn.commit().await?;
    Ok(assignment)
}
