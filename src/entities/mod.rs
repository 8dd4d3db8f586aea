//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod booking;
pub mod caretaker_grant;
pub mod payment_entry;
pub mod property;
pub mod room;
pub mod tenant_assignment;

// Re-export specific types to avoid conflicts
pub use booking::{
    BookingStatus, Column as BookingColumn, Entity as Booking, Model as BookingModel,
    PaymentStatus,
};
pub use caretaker_grant::{
    Column as CaretakerGrantColumn, Entity as CaretakerGrant, Model as CaretakerGrantModel,
    PropertyIdSet,
};
pub use payment_entry::{
    Column as PaymentEntryColumn, Entity as PaymentEntry, Model as PaymentEntryModel,
    PaymentMethod,
};
pub use property::{
    AmenityList, Column as PropertyColumn, Entity as Property, Model as PropertyModel,
};
pub use room::{Column as RoomColumn, Entity as Room, Model as RoomModel};
pub use tenant_assignment::{
    Column as TenantAssignmentColumn, Entity as TenantAssignment, Model as TenantAssignmentModel,
};
