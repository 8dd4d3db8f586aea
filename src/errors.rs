//! Unified error types for the booking core.
//!
//! Capacity races and permission failures are expected outcomes, not bugs, so
//! each carries enough context for a caller to offer an alternative (another
//! room, a fresh grant) instead of a generic failure. Database errors propagate
//! unchanged and should be treated as retryable by the request boundary.

use thiserror::Error;

/// All errors surfaced by the booking core.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad input shape or range, rejected before any write
    #[error("Validation error: {message}")]
    Validation {
        /// What was wrong with the input
        message: String,
    },

    /// Room exists but cannot take bookings right now (maintenance, no free slots at read time)
    #[error("Room {room_id} is not available for booking")]
    RoomUnavailable {
        /// The room that was requested
        room_id: i64,
    },

    /// Lost the race for the last free slot during confirmation
    #[error("Room {room_id} has no free slots")]
    CapacityExceeded {
        /// The room that filled up
        room_id: i64,
    },

    /// Maintenance requested while tenants still occupy the room
    #[error("Room {room_id} is occupied and cannot enter maintenance")]
    RoomOccupied {
        /// The occupied room
        room_id: i64,
    },

    /// Grant missing, revoked, or insufficient for the attempted action
    #[error("Permission denied: {reason}")]
    PermissionDenied {
        /// Why authorization failed
        reason: String,
    },

    /// Tenant already holds an active assignment elsewhere on the platform
    #[error("Tenant {tenant_id} already has an active room assignment")]
    StaleAssignment {
        /// The tenant with the conflicting assignment
        tenant_id: i64,
    },

    /// Lost a concurrency race on a terminal-state transition
    #[error("Conflict: {message}")]
    Conflict {
        /// What committed state was observed
        message: String,
    },

    /// Payment gateway or other external collaborator failed
    #[error("External service error: {message}")]
    ExternalService {
        /// The upstream failure
        message: String,
    },

    /// Referenced entity does not exist
    #[error("{entity} {id} not found")]
    NotFound {
        /// Entity kind (e.g. "booking", "room")
        entity: &'static str,
        /// The identifier that missed
        id: String,
    },

    /// Configuration error: missing/invalid config file or setting
    #[error("Configuration error: {message}")]
    Config {
        /// What failed to load or parse
        message: String,
    },

    /// Database error from the persistent store
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Environment variable error
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),
}

impl Error {
    /// Shorthand for a validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for a not-found failure.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
