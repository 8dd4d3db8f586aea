//! Booking engine - the booking state machine and its confirmation saga.
//!
//! States: `Pending → Confirmed → Completed`, with cancellation allowed from
//! either non-terminal state. Creation only *reads* availability; the slot is
//! taken at confirmation, where the sequence is reserve-slot, assign-tenant,
//! then a conditional status flip. Each later step failing compensates the
//! earlier ones, so a reserved slot can never outlive a failed confirmation.
//! Status transitions are claimed with conditional updates (`UPDATE ... WHERE
//! status = ...`) so a user-initiated confirm and the expiry sweep can race
//! safely: exactly one side wins and the loser observes the committed state.

use crate::{
    core::{assignments, permissions, permissions::Actor, rooms},
    entities::{
        Booking, booking,
        booking::{BookingStatus, PaymentStatus},
    },
    errors::{Error, Result},
    external::{BookingEvent, NotificationPublisher},
};
use chrono::{Months, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};

/// Finds a booking by its unique ID.
pub async fn get_booking_by_id<C>(db: &C, booking_id: i64) -> Result<Option<booking::Model>>
where
    C: ConnectionTrait,
{
    Booking::find_by_id(booking_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a booking by its human-facing reference code.
pub async fn get_booking_by_reference(
    db: &DatabaseConnection,
    reference: &str,
) -> Result<Option<booking::Model>> {
    Booking::find()
        .filter(booking::Column::Reference.eq(reference))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Returns a tenant's bookings, newest first.
pub async fn get_bookings_for_tenant(
    db: &DatabaseConnection,
    tenant_id: i64,
) -> Result<Vec<booking::Model>> {
    Booking::find()
        .filter(booking::Column::TenantId.eq(tenant_id))
        .order_by_desc(booking::Column::CreatedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// The day after which a booking's term has fully elapsed.
pub fn end_date(start_date: Date, total_months: i32) -> Result<Date> {
    start_date
        .checked_add_months(Months::new(total_months.unsigned_abs()))
        .ok_or_else(|| Error::validation("booking term overflows the calendar"))
}

/// Creates a pending booking after validation and a non-reserving
/// availability read.
///
/// No slot is held at this point: the request may sit unconfirmed for a
/// while, and reservation happens only at confirmation. The total due is
/// snapshotted from the room's current rate.
pub async fn create_booking<P>(
    db: &DatabaseConnection,
    publisher: &P,
    tenant_id: i64,
    room_id: i64,
    start_date: Date,
    total_months: i32,
    notes: Option<String>,
) -> Result<booking::Model>
where
    P: NotificationPublisher,
{
    if total_months < 1 {
        return Err(Error::validation("booking must run for at least one month"));
    }
    let now = Utc::now();
    if start_date < now.date_naive() {
        return Err(Error::validation("start date cannot be in the past"));
    }

    let room = rooms::get_room_by_id(db, room_id)
        .await?
        .ok_or_else(|| Error::not_found("room", room_id))?;

    if room.maintenance || room.occupied_count >= room.capacity {
        return Err(Error::RoomUnavailable { room_id });
    }

    let total_due_cents = room.monthly_rate_cents * i64::from(total_months);

    let txn = db.begin().await?;

    // Provisional reference keeps the unique index satisfied until the row id
    // exists; the final code derives from the id.
    let inserted = booking::ActiveModel {
        reference: Set(format!(
            "PB-{tenant_id}-{}",
            now.timestamp_nanos_opt().unwrap_or_default()
        )),
        tenant_id: Set(tenant_id),
        room_id: Set(room_id),
        property_id: Set(room.property_id),
        start_date: Set(start_date),
        total_months: Set(total_months),
        total_due_cents: Set(total_due_cents),
        status: Set(BookingStatus::Pending),
        payment_status: Set(PaymentStatus::Unpaid),
        notes: Set(notes),
        cancellation_reason: Set(None),
        created_at: Set(now),
        confirmed_at: Set(None),
        cancelled_at: Set(None),
        completed_at: Set(None),
        ..Default::default()
    };
    let inserted = inserted.insert(&txn).await?;

    let mut active: booking::ActiveModel = inserted.clone().into();
    active.reference = Set(format!("BK-{:06}", inserted.id));
    let model = active.update(&txn).await?;

    txn.commit().await?;

    publisher.publish(&BookingEvent::Created {
        booking_id: model.id,
        reference: model.reference.clone(),
    });

    Ok(model)
}

/// Confirms a pending booking: reserve a slot, assign the tenant, then flip
/// the status.
///
/// Losing the capacity race leaves the booking pending and surfaces
/// [`Error::CapacityExceeded`]; it is never silently auto-cancelled. An
/// assignment failure releases the reserved slot before the error surfaces.
/// Confirming an already-confirmed booking is an idempotent no-op.
pub async fn confirm_booking<P>(
    db: &DatabaseConnection,
    publisher: &P,
    booking_id: i64,
    actor: &Actor,
) -> Result<booking::Model>
where
    P: NotificationPublisher,
{
    let booking = get_booking_by_id(db, booking_id)
        .await?
        .ok_or_else(|| Error::not_found("booking", booking_id))?;

    permissions::authorize(
        db,
        actor,
        permissions::PermissionDomain::Bookings,
        booking.property_id,
    )
    .await?;

    match booking.status {
        BookingStatus::Confirmed => return Ok(booking),
        BookingStatus::Cancelled | BookingStatus::Completed => {
            return Err(Error::Conflict {
                message: format!("booking {booking_id} is already {:?}", booking.status),
            });
        }
        BookingStatus::Pending => {}
    }

    // Step 1: take the slot. The losing side of a capacity race stops here
    // with the booking still pending.
    rooms::reserve_slot(db, booking.room_id).await?;

    // Step 2: assign the tenant inside a transaction that also claims the
    // status flip, so the assignment never outlives a lost claim.
    let txn = db.begin().await?;

    if let Err(err) = assignments::assign(
        &txn,
        booking.tenant_id,
        booking.room_id,
        booking.id,
        booking.start_date,
    )
    .await
    {
        drop(txn); // rolls back the open transaction
        rooms::release_slot(db, booking.room_id).await?;
        return Err(err);
    }

    // Step 3: claim Pending -> Confirmed. Zero rows means a concurrent
    // cancel or expiry won; compensate and surface the committed state.
    let claimed = Booking::update_many()
        .col_expr(
            booking::Column::Status,
            Expr::value(BookingStatus::Confirmed),
        )
        .col_expr(booking::Column::ConfirmedAt, Expr::value(Utc::now()))
        .filter(booking::Column::Id.eq(booking_id))
        .filter(booking::Column::Status.eq(BookingStatus::Pending))
        .exec(&txn)
        .await?;

    if claimed.rows_affected == 0 {
        drop(txn);
        rooms::release_slot(db, booking.room_id).await?;
        let current = get_booking_by_id(db, booking_id)
            .await?
            .ok_or_else(|| Error::not_found("booking", booking_id))?;
        return Err(Error::Conflict {
            message: format!(
                "booking {booking_id} was concurrently moved to {:?}",
                current.status
            ),
        });
    }

    if let Err(err) = txn.commit().await {
        // The slot was reserved outside this transaction; give it back.
        rooms::release_slot(db, booking.room_id).await?;
        return Err(err.into());
    }

    let confirmed = get_booking_by_id(db, booking_id)
        .await?
        .ok_or_else(|| Error::not_found("booking", booking_id))?;

    publisher.publish(&BookingEvent::Confirmed {
        booking_id: confirmed.id,
        reference: confirmed.reference.clone(),
    });

    Ok(confirmed)
}

/// Cancels a booking, undoing occupancy side effects when it was confirmed.
///
/// Cancelling an already-cancelled booking is an idempotent no-op returning
/// the current state. A paid booking additionally emits a refund-workflow
/// event; refund execution itself is delegated downstream.
pub async fn cancel_booking<P>(
    db: &DatabaseConnection,
    publisher: &P,
    booking_id: i64,
    actor: &Actor,
    reason: String,
) -> Result<booking::Model>
where
    P: NotificationPublisher,
{
    let booking = get_booking_by_id(db, booking_id)
        .await?
        .ok_or_else(|| Error::not_found("booking", booking_id))?;

    permissions::authorize(
        db,
        actor,
        permissions::PermissionDomain::Bookings,
        booking.property_id,
    )
    .await?;

    match booking.status {
        BookingStatus::Cancelled => return Ok(booking),
        BookingStatus::Completed => {
            return Err(Error::Conflict {
                message: format!("booking {booking_id} is already completed"),
            });
        }
        BookingStatus::Pending | BookingStatus::Confirmed => {}
    }

    // Claim the transition from the status we observed and undo occupancy
    // side effects in the same transaction, so a cancelled booking can never
    // be left holding its slot. A lost claim means a concurrent operation
    // got there first.
    let txn = db.begin().await?;

    let claimed = Booking::update_many()
        .col_expr(
            booking::Column::Status,
            Expr::value(BookingStatus::Cancelled),
        )
        .col_expr(booking::Column::CancelledAt, Expr::value(Utc::now()))
        .col_expr(
            booking::Column::CancellationReason,
            Expr::value(reason.clone()),
        )
        .filter(booking::Column::Id.eq(booking_id))
        .filter(booking::Column::Status.eq(booking.status))
        .exec(&txn)
        .await?;

    if claimed.rows_affected == 0 {
        drop(txn);
        let current = get_booking_by_id(db, booking_id)
            .await?
            .ok_or_else(|| Error::not_found("booking", booking_id))?;
        if current.status == BookingStatus::Cancelled {
            return Ok(current);
        }
        return Err(Error::Conflict {
            message: format!(
                "booking {booking_id} was concurrently moved to {:?}",
                current.status
            ),
        });
    }

    // A confirmed booking held occupancy: end the assignment and free the
    // slot with the status flip, atomically.
    if booking.status == BookingStatus::Confirmed {
        assignments::unassign(&txn, booking.tenant_id).await?;
        rooms::release_slot(&txn, booking.room_id).await?;
    }

    txn.commit().await?;

    if booking.payment_status == PaymentStatus::Paid {
        publisher.publish(&BookingEvent::RefundRequested {
            booking_id: booking.id,
            reference: booking.reference.clone(),
        });
    }

    publisher.publish(&BookingEvent::Cancelled {
        booking_id: booking.id,
        reference: booking.reference.clone(),
        reason,
    });

    get_booking_by_id(db, booking_id)
        .await?
        .ok_or_else(|| Error::not_found("booking", booking_id))
}

/// Completes a confirmed booking, ending the tenancy.
///
/// The system actor (periodic sweep) may complete only once the term has
/// elapsed; a named actor is permission-checked and may complete early.
/// Completing an already-completed booking is an idempotent no-op.
pub async fn complete_booking<P>(
    db: &DatabaseConnection,
    publisher: &P,
    booking_id: i64,
    actor: &Actor,
) -> Result<booking::Model>
where
    P: NotificationPublisher,
{
    let booking = get_booking_by_id(db, booking_id)
        .await?
        .ok_or_else(|| Error::not_found("booking", booking_id))?;

    match booking.status {
        BookingStatus::Completed => return Ok(booking),
        BookingStatus::Pending | BookingStatus::Cancelled => {
            return Err(Error::Conflict {
                message: format!(
                    "only confirmed bookings can complete; booking {booking_id} is {:?}",
                    booking.status
                ),
            });
        }
        BookingStatus::Confirmed => {}
    }

    if matches!(actor, Actor::System) {
        let end = end_date(booking.start_date, booking.total_months)?;
        if Utc::now().date_naive() < end {
            return Err(Error::validation(format!(
                "booking {booking_id} term has not elapsed yet"
            )));
        }
    } else {
        permissions::authorize(
            db,
            actor,
            permissions::PermissionDomain::Bookings,
            booking.property_id,
        )
        .await?;
    }

    // The claim and the occupancy teardown commit together: a completed
    // booking can never be left holding its slot.
    let txn = db.begin().await?;

    let claimed = Booking::update_many()
        .col_expr(
            booking::Column::Status,
            Expr::value(BookingStatus::Completed),
        )
        .col_expr(booking::Column::CompletedAt, Expr::value(Utc::now()))
        .filter(booking::Column::Id.eq(booking_id))
        .filter(booking::Column::Status.eq(BookingStatus::Confirmed))
        .exec(&txn)
        .await?;

    if claimed.rows_affected == 0 {
        drop(txn);
        let current = get_booking_by_id(db, booking_id)
            .await?
            .ok_or_else(|| Error::not_found("booking", booking_id))?;
        if current.status == BookingStatus::Completed {
            return Ok(current);
        }
        return Err(Error::Conflict {
            message: format!(
                "booking {booking_id} was concurrently moved to {:?}",
                current.status
            ),
        });
    }

    // The stay is over: end the assignment and free the slot.
    assignments::unassign(&txn, booking.tenant_id).await?;
    rooms::release_slot(&txn, booking.room_id).await?;
    txn.commit().await?;

    publisher.publish(&BookingEvent::Completed {
        booking_id: booking.id,
        reference: booking.reference.clone(),
    });

    get_booking_by_id(db, booking_id)
        .await?
        .ok_or_else(|| Error::not_found("booking", booking_id))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::assignments::active_assignment;
    use crate::core::rooms::{get_room_by_id, set_maintenance};
    use crate::external::TracingPublisher;
    use crate::test_utils::{
        RecordingPublisher, TEST_LANDLORD, create_custom_room, create_test_booking,
        create_test_property, setup_test_db, setup_with_room,
    };
    use chrono::Duration;
    use sea_orm::{DatabaseBackend, MockDatabase};

    const LANDLORD: Actor = Actor::Landlord { id: TEST_LANDLORD };

    #[tokio::test]
    async fn test_create_booking_rejects_past_start_before_any_room_check() -> Result<()> {
        // A MockDatabase with no seeded results: any query would fail, so the
        // validation error proves no room read happened.
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let publisher = TracingPublisher;

        let yesterday = Utc::now().date_naive() - Duration::days(1);
        let result = create_booking(&db, &publisher, 42, 1, yesterday, 3, None).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        let today = Utc::now().date_naive();
        let result = create_booking(&db, &publisher, 42, 1, today, 0, None).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_booking_pending_with_snapshot() -> Result<()> {
        let (db, property, room) = setup_with_room().await?;
        let publisher = RecordingPublisher::new();

        let today = Utc::now().date_naive();
        let booking =
            create_booking(&db, &publisher, 42, room.id, today, 3, Some("quiet floor".to_string()))
                .await?;

        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.payment_status, PaymentStatus::Unpaid);
        assert_eq!(booking.property_id, property.id);
        assert_eq!(booking.total_due_cents, 15000);
        assert_eq!(booking.reference, format!("BK-{:06}", booking.id));

        // Creation reserves nothing
        let reloaded_room = get_room_by_id(&db, room.id).await?.unwrap();
        assert_eq!(reloaded_room.occupied_count, 0);

        assert_eq!(
            publisher.events(),
            vec![BookingEvent::Created {
                booking_id: booking.id,
                reference: booking.reference.clone(),
            }]
        );

        let by_reference = get_booking_by_reference(&db, &booking.reference).await?;
        assert_eq!(by_reference.unwrap().id, booking.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_booking_room_unavailable() -> Result<()> {
        let (db, _property, room) = setup_with_room().await?;
        let publisher = TracingPublisher;
        let today = Utc::now().date_naive();

        set_maintenance(&db, room.id, true).await?;
        let result = create_booking(&db, &publisher, 42, room.id, today, 3, None).await;
        assert!(matches!(result.unwrap_err(), Error::RoomUnavailable { .. }));

        let result = create_booking(&db, &publisher, 42, 999, today, 3, None).await;
        assert!(matches!(result.unwrap_err(), Error::NotFound { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_confirm_booking_reserves_and_assigns() -> Result<()> {
        let (db, _property, room) = setup_with_room().await?;
        let publisher = RecordingPublisher::new();
        let booking = create_test_booking(&db, 42, room.id).await?;

        let confirmed = confirm_booking(&db, &publisher, booking.id, &LANDLORD).await?;
        assert_eq!(confirmed.status, BookingStatus::Confirmed);
        assert!(confirmed.confirmed_at.is_some());

        let reloaded_room = get_room_by_id(&db, room.id).await?.unwrap();
        assert_eq!(reloaded_room.occupied_count, 1);

        let assignment = active_assignment(&db, 42).await?.unwrap();
        assert_eq!(assignment.room_id, room.id);
        assert_eq!(assignment.booking_id, booking.id);

        // Idempotent: confirming again changes nothing
        let again = confirm_booking(&db, &publisher, booking.id, &LANDLORD).await?;
        assert_eq!(again.status, BookingStatus::Confirmed);
        let reloaded_room = get_room_by_id(&db, room.id).await?.unwrap();
        assert_eq!(reloaded_room.occupied_count, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_confirm_denied_without_permission() -> Result<()> {
        let (db, _property, room) = setup_with_room().await?;
        let publisher = TracingPublisher;
        let booking = create_test_booking(&db, 42, room.id).await?;

        let intruder = Actor::Landlord { id: TEST_LANDLORD + 1 };
        let result = confirm_booking(&db, &publisher, booking.id, &intruder).await;
        assert!(matches!(result.unwrap_err(), Error::PermissionDenied { .. }));

        // Booking untouched
        let reloaded = get_booking_by_id(&db, booking.id).await?.unwrap();
        assert_eq!(reloaded.status, BookingStatus::Pending);

        Ok(())
    }

    #[tokio::test]
    async fn test_two_confirms_race_for_last_slot() -> Result<()> {
        let db = setup_test_db().await?;
        let property = create_test_property(&db, TEST_LANDLORD).await?;
        let single = create_custom_room(&db, property.id, "201", 1, 5000).await?;
        let publisher = TracingPublisher;

        let first = create_test_booking(&db, 42, single.id).await?;
        let second = create_test_booking(&db, 43, single.id).await?;

        let winner = confirm_booking(&db, &publisher, first.id, &LANDLORD).await?;
        assert_eq!(winner.status, BookingStatus::Confirmed);

        // The loser gets the room-full error and stays pending
        let result = confirm_booking(&db, &publisher, second.id, &LANDLORD).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::CapacityExceeded { room_id } if room_id == single.id
        ));
        let loser = get_booking_by_id(&db, second.id).await?.unwrap();
        assert_eq!(loser.status, BookingStatus::Pending);

        let reloaded_room = get_room_by_id(&db, single.id).await?.unwrap();
        assert_eq!(reloaded_room.capacity - reloaded_room.occupied_count, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_confirm_compensates_on_stale_assignment() -> Result<()> {
        let db = setup_test_db().await?;
        let property = create_test_property(&db, TEST_LANDLORD).await?;
        let room_a = create_custom_room(&db, property.id, "101", 2, 5000).await?;
        let room_b = create_custom_room(&db, property.id, "102", 2, 5000).await?;
        let publisher = TracingPublisher;

        // Tenant 42 is already assigned through a confirmed booking in room A
        let first = create_test_booking(&db, 42, room_a.id).await?;
        confirm_booking(&db, &publisher, first.id, &LANDLORD).await?;

        let second = create_test_booking(&db, 42, room_b.id).await?;
        let result = confirm_booking(&db, &publisher, second.id, &LANDLORD).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::StaleAssignment { tenant_id: 42 }
        ));

        // The reserved slot in room B was released and the booking is pending
        let reloaded_b = get_room_by_id(&db, room_b.id).await?.unwrap();
        assert_eq!(reloaded_b.occupied_count, 0);
        let reloaded = get_booking_by_id(&db, second.id).await?.unwrap();
        assert_eq!(reloaded.status, BookingStatus::Pending);

        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_pending_is_idempotent() -> Result<()> {
        let (db, _property, room) = setup_with_room().await?;
        let publisher = RecordingPublisher::new();
        let booking = create_test_booking(&db, 42, room.id).await?;

        let cancelled = cancel_booking(
            &db,
            &publisher,
            booking.id,
            &LANDLORD,
            "changed plans".to_string(),
        )
        .await?;
        assert_eq!(cancelled.status, BookingStatus::Cancelled);
        assert_eq!(cancelled.cancellation_reason.as_deref(), Some("changed plans"));

        // Second cancel is a no-op returning the current state
        let again = cancel_booking(
            &db,
            &publisher,
            booking.id,
            &LANDLORD,
            "other reason".to_string(),
        )
        .await?;
        assert_eq!(again.cancellation_reason.as_deref(), Some("changed plans"));

        // Exactly one Cancelled event was published
        let cancelled_events = publisher
            .events()
            .into_iter()
            .filter(|e| matches!(e, BookingEvent::Cancelled { .. }))
            .count();
        assert_eq!(cancelled_events, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_confirmed_releases_slot_exactly_once() -> Result<()> {
        let (db, _property, room) = setup_with_room().await?;
        let publisher = TracingPublisher;
        let booking = create_test_booking(&db, 42, room.id).await?;

        confirm_booking(&db, &publisher, booking.id, &LANDLORD).await?;
        let occupied = get_room_by_id(&db, room.id).await?.unwrap().occupied_count;
        assert_eq!(occupied, 1);

        cancel_booking(&db, &publisher, booking.id, &LANDLORD, "moving out".to_string()).await?;

        let reloaded_room = get_room_by_id(&db, room.id).await?.unwrap();
        assert_eq!(reloaded_room.occupied_count, 0);
        assert!(active_assignment(&db, 42).await?.is_none());

        // Repeat cancel releases nothing further
        cancel_booking(&db, &publisher, booking.id, &LANDLORD, "again".to_string()).await?;
        let reloaded_room = get_room_by_id(&db, room.id).await?.unwrap();
        assert_eq!(reloaded_room.occupied_count, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_terminal_bookings_hold_no_occupancy() -> Result<()> {
        let (db, _property, room) = setup_with_room().await?;
        let publisher = TracingPublisher;

        let cancelled = create_test_booking(&db, 42, room.id).await?;
        confirm_booking(&db, &publisher, cancelled.id, &LANDLORD).await?;
        cancel_booking(&db, &publisher, cancelled.id, &LANDLORD, "left".to_string()).await?;

        let completed = create_test_booking(&db, 43, room.id).await?;
        confirm_booking(&db, &publisher, completed.id, &LANDLORD).await?;
        complete_booking(&db, &publisher, completed.id, &LANDLORD).await?;

        // The status flip and the occupancy teardown commit together, so a
        // terminal booking leaves no slot or assignment behind.
        let reloaded = get_booking_by_id(&db, cancelled.id).await?.unwrap();
        assert_eq!(reloaded.status, BookingStatus::Cancelled);
        let reloaded = get_booking_by_id(&db, completed.id).await?.unwrap();
        assert_eq!(reloaded.status, BookingStatus::Completed);

        let reloaded_room = get_room_by_id(&db, room.id).await?.unwrap();
        assert_eq!(reloaded_room.occupied_count, 0);
        assert!(active_assignment(&db, 42).await?.is_none());
        assert!(active_assignment(&db, 43).await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_paid_booking_requests_refund() -> Result<()> {
        let (db, _property, room) = setup_with_room().await?;
        let publisher = RecordingPublisher::new();
        let gateway = crate::test_utils::MockGateway::new();
        let booking = create_test_booking(&db, 42, room.id).await?;

        crate::core::payments::record_payment(
            &db,
            &gateway,
            booking.id,
            15000,
            crate::entities::PaymentMethod::Cash,
        )
        .await?;

        cancel_booking(&db, &publisher, booking.id, &LANDLORD, "tenant left".to_string())
            .await?;

        assert!(publisher
            .events()
            .iter()
            .any(|e| matches!(e, BookingEvent::RefundRequested { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_complete_booking_manual_and_idempotent() -> Result<()> {
        let (db, _property, room) = setup_with_room().await?;
        let publisher = TracingPublisher;
        let booking = create_test_booking(&db, 42, room.id).await?;
        confirm_booking(&db, &publisher, booking.id, &LANDLORD).await?;

        // A named, authorized actor may complete ahead of the term
        let completed = complete_booking(&db, &publisher, booking.id, &LANDLORD).await?;
        assert_eq!(completed.status, BookingStatus::Completed);
        assert!(completed.completed_at.is_some());

        // The tenancy ended with it
        let reloaded_room = get_room_by_id(&db, room.id).await?.unwrap();
        assert_eq!(reloaded_room.occupied_count, 0);
        assert!(active_assignment(&db, 42).await?.is_none());

        // Idempotent
        let again = complete_booking(&db, &publisher, booking.id, &LANDLORD).await?;
        assert_eq!(again.status, BookingStatus::Completed);

        // Terminal: cancelling a completed booking is a conflict
        let result = cancel_booking(&db, &publisher, booking.id, &LANDLORD, "late".to_string())
            .await;
        assert!(matches!(result.unwrap_err(), Error::Conflict { .. }));

        Ok(())
    }

    #[tokio::test]
    async fn test_system_completion_requires_elapsed_term() -> Result<()> {
        let (db, _property, room) = setup_with_room().await?;
        let publisher = TracingPublisher;
        let booking = create_test_booking(&db, 42, room.id).await?;
        confirm_booking(&db, &publisher, booking.id, &LANDLORD).await?;

        // The term starts today and runs three months: not elapsed
        let result = complete_booking(&db, &publisher, booking.id, &Actor::System).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { .. }));

        let reloaded = get_booking_by_id(&db, booking.id).await?.unwrap();
        assert_eq!(reloaded.status, BookingStatus::Confirmed);

        Ok(())
    }

    #[tokio::test]
    async fn test_complete_pending_is_conflict() -> Result<()> {
        let (db, _property, room) = setup_with_room().await?;
        let publisher = TracingPublisher;
        let booking = create_test_booking(&db, 42, room.id).await?;

        let result = complete_booking(&db, &publisher, booking.id, &LANDLORD).await;
        assert!(matches!(result.unwrap_err(), Error::Conflict { .. }));

        Ok(())
    }

    #[test]
    fn test_end_date_month_arithmetic() {
        let start = chrono::NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
        assert_eq!(
            end_date(start, 3).unwrap(),
            chrono::NaiveDate::from_ymd_opt(2026, 4, 15).unwrap()
        );
        // Month-end clamping
        let start = chrono::NaiveDate::from_ymd_opt(2026, 1, 31).unwrap();
        assert_eq!(
            end_date(start, 1).unwrap(),
            chrono::NaiveDate::from_ymd_opt(2026, 2, 28).unwrap()
        );
    }
}
