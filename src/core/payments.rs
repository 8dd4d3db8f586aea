//! Payment tracking business logic - ledger entries and status derivation.
//!
//! Payment status is a pure function of the booking's net ledger sum against
//! its total due, so it can move backward (a refund can take `Paid` back to
//! `Partial`). Gateway charges happen before any database transaction is
//! opened: a gateway failure leaves nothing persisted, and the store is never
//! blocked on a network round trip.

use crate::{
    entities::{
        Booking, PaymentEntry, PaymentMethod, booking,
        booking::{BookingStatus, PaymentStatus},
        payment_entry,
    },
    errors::{Error, Result},
    external::PaymentGateway,
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};

/// Derives payment status from the net ledger amount.
///
/// `Refunded` is only reachable when the net is zero-or-below **and** the
/// booking itself is cancelled; a refund alone never cancels a booking.
pub const fn payment_status_for(
    net_cents: i64,
    total_due_cents: i64,
    booking_cancelled: bool,
) -> PaymentStatus {
    if net_cents <= 0 {
        if booking_cancelled {
            PaymentStatus::Refunded
        } else {
            PaymentStatus::Unpaid
        }
    } else if net_cents < total_due_cents {
        PaymentStatus::Partial
    } else {
        PaymentStatus::Paid
    }
}

/// Returns the booking's ledger, newest entries first.
pub async fn ledger_for_booking(
    db: &DatabaseConnection,
    booking_id: i64,
) -> Result<Vec<payment_entry::Model>> {
    PaymentEntry::find()
        .filter(payment_entry::Column::BookingId.eq(booking_id))
        .order_by_desc(payment_entry::Column::RecordedAt)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Sums the booking's ledger entries (payments positive, refunds negative).
pub async fn net_paid_cents<C>(db: &C, booking_id: i64) -> Result<i64>
where
    C: ConnectionTrait,
{
    let entries = PaymentEntry::find()
        .filter(payment_entry::Column::BookingId.eq(booking_id))
        .all(db)
        .await?;
    Ok(entries.iter().map(|e| e.amount_cents).sum())
}

/// Records a payment against a booking and recomputes its payment status.
///
/// Non-cash methods are charged through the gateway first, outside any
/// database transaction; if the gateway fails, nothing is persisted.
pub async fn record_payment<G>(
    db: &DatabaseConnection,
    gateway: &G,
    booking_id: i64,
    amount_cents: i64,
    method: PaymentMethod,
) -> Result<PaymentStatus>
where
    G: PaymentGateway,
{
    if amount_cents <= 0 {
        return Err(Error::validation("payment amount must be positive"));
    }
    if method == PaymentMethod::Refund {
        return Err(Error::validation(
            "refund entries are appended through the refund operation",
        ));
    }

    let booking = Booking::find_by_id(booking_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("booking", booking_id))?;

    // Fast path so a cancelled booking never reaches the gateway; the
    // authoritative check runs again inside the ledger transaction.
    if booking.status == BookingStatus::Cancelled {
        return Err(Error::validation(
            "cannot record a payment against a cancelled booking",
        ));
    }

    // Charge first; the gateway call must never run inside a held transaction
    if method.uses_gateway() {
        gateway
            .charge(&booking.reference, amount_cents, method)
            .await?;
    }

    apply_entry(db, booking_id, amount_cents, method).await
}

/// Appends a refund (negative) entry and recomputes the payment status.
///
/// Refund execution is delegated to the gateway before anything is persisted.
/// Status can move backward; `Refunded` is reached only if the booking is
/// cancelled and the net drops to zero or below.
pub async fn refund<G>(
    db: &DatabaseConnection,
    gateway: &G,
    booking_id: i64,
    amount_cents: i64,
) -> Result<PaymentStatus>
where
    G: PaymentGateway,
{
    if amount_cents <= 0 {
        return Err(Error::validation("refund amount must be positive"));
    }

    let booking = Booking::find_by_id(booking_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("booking", booking_id))?;

    // Fast path so a clearly-invalid refund never reaches the gateway; the
    // authoritative bound check runs again inside the ledger transaction.
    let net = net_paid_cents(db, booking_id).await?;
    if amount_cents > net {
        return Err(Error::validation(format!(
            "refund of {amount_cents} exceeds net paid {net}"
        )));
    }

    gateway.refund(&booking.reference, amount_cents).await?;

    apply_entry(db, booking_id, -amount_cents, PaymentMethod::Refund).await
}

/// Appends one signed ledger entry and updates the booking's payment status,
/// atomically.
///
/// The booking and its net are re-read and validated inside the transaction.
/// Two concurrent refunds can both pass the callers' fast-path checks, but
/// only one can pass here; the loser fails validation instead of driving the
/// ledger negative.
async fn apply_entry(
    db: &DatabaseConnection,
    booking_id: i64,
    amount_cents: i64,
    method: PaymentMethod,
) -> Result<PaymentStatus> {
    let txn = db.begin().await?;

    let booking = Booking::find_by_id(booking_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("booking", booking_id))?;

    let net = net_paid_cents(&txn, booking_id).await?;
    if method == PaymentMethod::Refund {
        if net + amount_cents < 0 {
            return Err(Error::validation(format!(
                "refund of {} exceeds net paid {net}",
                -amount_cents
            )));
        }
    } else if booking.status == BookingStatus::Cancelled {
        return Err(Error::validation(
            "cannot record a payment against a cancelled booking",
        ));
    }

    let entry = payment_entry::ActiveModel {
        booking_id: Set(booking.id),
        amount_cents: Set(amount_cents),
        method: Set(method),
        recorded_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    entry.insert(&txn).await?;

    let status = payment_status_for(
        net + amount_cents,
        booking.total_due_cents,
        booking.status == BookingStatus::Cancelled,
    );

    let mut active: booking::ActiveModel = booking.into();
    active.payment_status = Set(status);
    active.update(&txn).await?;

    txn.commit().await?;
    Ok(status)
}
