//! Core business logic - framework-agnostic booking, occupancy, payment,
//! and permission operations. Nothing in here knows about the HTTP layer;
//! every function takes a database connection (or transaction) explicitly.

/// Tenant-to-room assignment lifecycle and global uniqueness
pub mod assignments;
/// Booking state machine and confirmation saga
pub mod bookings;
/// Payment ledger and payment status derivation
pub mod payments;
/// Landlord/caretaker authorization and grant management
pub mod permissions;
/// Property records and soft deletion
pub mod properties;
/// Room capacity, occupancy slots, and status derivation
pub mod rooms;
/// Periodic maintenance: pending-booking expiry and elapsed-booking completion
pub mod sweep;
