//! HTTP handlers

pub mod events;
pub mod health;
pub mod organizers;

pub use events::event_routes;
pub use health::health_routes;
pub use organizers::organizer_routes;
