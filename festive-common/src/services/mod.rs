//! Event and organizer services
//!
//! Services own no state between calls beyond their store handle and clock:
//! every analytic re-reads the full record set from the store.

pub mod events;
pub mod organizers;
pub mod stats;

pub use events::EventService;
pub use organizers::{CompanyEvents, OrganizerService, RegionLeader, TopOrganizer};
pub use stats::{mode_by_field, ModeSummary};
