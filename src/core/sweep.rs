//! Periodic maintenance sweeps over the booking table.
//!
//! Both sweeps reuse the exact cancel/complete paths that user-initiated
//! calls take, so they inherit the same conditional-claim concurrency rules:
//! running a sweep while an operator confirms the same booking is safe, and
//! either side losing the race simply observes the committed state. Failures
//! on one booking are logged and skipped, never aborting the rest of the run.

use crate::{
    core::{bookings, permissions::Actor},
    entities::{Booking, booking, booking::BookingStatus},
    errors::Result,
    external::NotificationPublisher,
};
use chrono::{Duration, Utc};
use sea_orm::prelude::*;
use tracing::{info, warn};

/// Reason recorded on bookings cancelled by the expiry sweep.
pub const EXPIRY_REASON: &str = "expired: not confirmed within the allowed window";

/// Cancels pending bookings that have sat unconfirmed longer than `older_than`.
///
/// Returns the number of bookings expired. Idempotent: an already-cancelled
/// booking no-ops and a concurrently-confirmed one is left alone.
pub async fn expire_stale_pending<P>(
    db: &DatabaseConnection,
    publisher: &P,
    older_than: Duration,
) -> Result<usize>
where
    P: NotificationPublisher,
{
    let cutoff = Utc::now() - older_than;

    let stale = Booking::find()
        .filter(booking::Column::Status.eq(BookingStatus::Pending))
        .filter(booking::Column::CreatedAt.lt(cutoff))
        .all(db)
        .await?;

    let mut expired = 0;
    for candidate in stale {
        match bookings::cancel_booking(
            db,
            publisher,
            candidate.id,
            &Actor::System,
            EXPIRY_REASON.to_string(),
        )
        .await
        {
            Ok(_) => {
                info!(booking_id = candidate.id, "expired stale pending booking");
                expired += 1;
            }
            Err(crate::errors::Error::Conflict { .. }) => {
                // A concurrent confirmation won; the booking is no longer ours to expire
            }
            Err(err) => {
                warn!(booking_id = candidate.id, error = %err, "failed to expire stale booking");
            }
        }
    }

    Ok(expired)
}

/// Completes confirmed bookings whose term has fully elapsed.
///
/// Returns the number of bookings completed.
pub async fn complete_elapsed<P>(db: &DatabaseConnection, publisher: &P) -> Result<usize>
where
    P: NotificationPublisher,
{
    let today = Utc::now().date_naive();

    let confirmed = Booking::find()
        .filter(booking::Column::Status.eq(BookingStatus::Confirmed))
        .all(db)
        .await?;

    let mut completed = 0;
    for candidate in confirmed {
        let end = match bookings::end_date(candidate.start_date, candidate.total_months) {
            Ok(end) => end,
            Err(err) => {
                warn!(booking_id = candidate.id, error = %err, "skipping booking with invalid term");
                continue;
            }
        };
        if today < end {
            continue;
        }

        match bookings::complete_booking(db, publisher, candidate.id, &Actor::System).await {
            Ok(_) => {
                info!(booking_id = candidate.id, "completed elapsed booking");
                completed += 1;
            }
            Err(err) => {
                warn!(booking_id = candidate.id, error = %err, "failed to complete elapsed booking");
            }
        }
    }

    Ok(completed)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::permissions::Actor;
    use crate::core::rooms::get_room_by_id;
    use crate::external::TracingPublisher;
    use crate::test_utils::{
        TEST_LANDLORD, create_custom_room, create_test_booking, create_test_property,
        setup_test_db, setup_with_room,
    };
    use sea_orm::Set;

    async fn backdate_created(
        db: &DatabaseConnection,
        booking_id: i64,
        hours: i64,
    ) -> Result<()> {
        let booking = bookings::get_booking_by_id(db, booking_id).await?.unwrap();
        let mut active: booking::ActiveModel = booking.into();
        active.created_at = Set(Utc::now() - Duration::hours(hours));
        active.update(db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_expire_stale_pending_only() -> Result<()> {
        let (db, _property, room) = setup_with_room().await?;
        let publisher = TracingPublisher;

        let stale = create_test_booking(&db, 42, room.id).await?;
        let fresh = create_test_booking(&db, 43, room.id).await?;
        backdate_created(&db, stale.id, 100).await?;

        let expired = expire_stale_pending(&db, &publisher, Duration::hours(48)).await?;
        assert_eq!(expired, 1);

        let stale = bookings::get_booking_by_id(&db, stale.id).await?.unwrap();
        assert_eq!(stale.status, BookingStatus::Cancelled);
        assert_eq!(stale.cancellation_reason.as_deref(), Some(EXPIRY_REASON));

        let fresh = bookings::get_booking_by_id(&db, fresh.id).await?.unwrap();
        assert_eq!(fresh.status, BookingStatus::Pending);

        // Re-running finds nothing left to do
        let expired = expire_stale_pending(&db, &publisher, Duration::hours(48)).await?;
        assert_eq!(expired, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_expiry_skips_confirmed_bookings() -> Result<()> {
        let (db, _property, room) = setup_with_room().await?;
        let publisher = TracingPublisher;
        let landlord = Actor::Landlord { id: TEST_LANDLORD };

        let booking = create_test_booking(&db, 42, room.id).await?;
        backdate_created(&db, booking.id, 100).await?;
        bookings::confirm_booking(&db, &publisher, booking.id, &landlord).await?;

        let expired = expire_stale_pending(&db, &publisher, Duration::hours(48)).await?;
        assert_eq!(expired, 0);

        let reloaded = bookings::get_booking_by_id(&db, booking.id).await?.unwrap();
        assert_eq!(reloaded.status, BookingStatus::Confirmed);

        Ok(())
    }

    #[tokio::test]
    async fn test_complete_elapsed_frees_occupancy() -> Result<()> {
        let db = setup_test_db().await?;
        let property = create_test_property(&db, TEST_LANDLORD).await?;
        let room = create_custom_room(&db, property.id, "301", 2, 5000).await?;
        let publisher = TracingPublisher;
        let landlord = Actor::Landlord { id: TEST_LANDLORD };

        let elapsed = create_test_booking(&db, 42, room.id).await?;
        bookings::confirm_booking(&db, &publisher, elapsed.id, &landlord).await?;
        // Push the term into the past: started four months ago, ran three
        let model = bookings::get_booking_by_id(&db, elapsed.id).await?.unwrap();
        let mut active: booking::ActiveModel = model.into();
        active.start_date = Set(Utc::now().date_naive() - Duration::days(120));
        active.update(&db).await?;

        let running = create_test_booking(&db, 43, room.id).await?;
        bookings::confirm_booking(&db, &publisher, running.id, &landlord).await?;

        let completed = complete_elapsed(&db, &publisher).await?;
        assert_eq!(completed, 1);

        let elapsed = bookings::get_booking_by_id(&db, elapsed.id).await?.unwrap();
        assert_eq!(elapsed.status, BookingStatus::Completed);
        let running = bookings::get_booking_by_id(&db, running.id).await?.unwrap();
        assert_eq!(running.status, BookingStatus::Confirmed);

        // Only the elapsed booking's slot was freed
        let reloaded_room = get_room_by_id(&db, room.id).await?.unwrap();
        assert_eq!(reloaded_room.occupied_count, 1);

        // Idempotent
        let completed = complete_elapsed(&db, &publisher).await?;
        assert_eq!(completed, 0);

        Ok(())
    }
}
