//! # Festive Common Library
//!
//! Core of the event catalog backend:
//! - Event and organizer models
//! - Record store (SQLite via sqlx)
//! - Temporal normalization of free-form date text
//! - Event and organizer services (CRUD plus analytics)
//! - Configuration loading

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod time;
pub mod uuid_utils;

pub use error::{Error, Result};
pub use models::{Event, EventDraft, Organizer, OrganizerDraft};
pub use services::{EventService, OrganizerService};
pub use time::{Clock, FixedClock, SystemClock};
