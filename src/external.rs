//! Boundary traits for external collaborators.
//!
//! The core delegates money movement to a payment gateway and event delivery
//! to a notification publisher. Gateway calls are made before any database
//! transaction is opened, never while a row lock is held. Notification
//! delivery is fire-and-forget: the publisher is infallible by signature and
//! the core never blocks on, retries, or rolls back for it.

use crate::{entities::PaymentMethod, errors::Result};
use tracing::info;

/// A booking lifecycle event emitted to the notification pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BookingEvent {
    /// A tenant created a new pending booking
    Created {
        /// Booking id
        booking_id: i64,
        /// Human-facing reference code
        reference: String,
    },
    /// A pending booking was confirmed; the slot is now held
    Confirmed {
        /// Booking id
        booking_id: i64,
        /// Human-facing reference code
        reference: String,
    },
    /// The booking was cancelled by an actor or the expiry sweep
    Cancelled {
        /// Booking id
        booking_id: i64,
        /// Human-facing reference code
        reference: String,
        /// Reason recorded with the cancellation
        reason: String,
    },
    /// The booking ran its full term
    Completed {
        /// Booking id
        booking_id: i64,
        /// Human-facing reference code
        reference: String,
    },
    /// A paid booking was cancelled; downstream refund workflow should start
    RefundRequested {
        /// Booking id
        booking_id: i64,
        /// Human-facing reference code
        reference: String,
    },
}

/// External payment gateway used for non-cash charges and refund execution.
///
/// Implementations wrap the platform's payment provider client. Errors map to
/// [`crate::errors::Error::ExternalService`].
#[allow(async_fn_in_trait)] // implementors are used generically, never as trait objects
pub trait PaymentGateway {
    /// Charges the given amount against the booking's payer.
    /// Returns the gateway's transaction reference.
    async fn charge(
        &self,
        booking_reference: &str,
        amount_cents: i64,
        method: PaymentMethod,
    ) -> Result<String>;

    /// Refunds the given amount to the booking's payer.
    /// Returns the gateway's transaction reference.
    async fn refund(&self, booking_reference: &str, amount_cents: i64) -> Result<String>;
}

/// Fire-and-forget sink for booking lifecycle events.
pub trait NotificationPublisher {
    /// Publishes one event. Must not block the caller on delivery.
    fn publish(&self, event: &BookingEvent);
}

/// Default publisher: one structured log line per event.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingPublisher;

impl NotificationPublisher for TracingPublisher {
    fn publish(&self, event: &BookingEvent) {
        info!(?event, "booking event");
    }
}
