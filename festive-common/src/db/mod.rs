//! Record store: SQLite persistence for events and organizers

pub mod events;
pub mod init;
pub mod organizers;
pub mod schema_sync;

pub use events::EventStore;
pub use init::*;
pub use organizers::OrganizerStore;
pub use schema_sync::*;
