//! Event and organizer records
//!
//! `Event` / `Organizer` are what the store hands back and what the services
//! return. `EventDraft` / `OrganizerDraft` are caller input for create and
//! update: identifiers and stamps are optional there and every text field
//! defaults to empty so that missing fields reach validation instead of
//! failing deserialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::time::normalize;
use crate::{Error, Result};

/// Delimiter used for performers at the storage boundary
pub const PERFORMER_DELIMITER: char = ',';

/// Only year with a tracked per-organizer event count
pub const TRACKED_EVENT_YEAR: i32 = 2025;

/// Festival / event record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub date: String,
    pub location: String,
    #[serde(default)]
    pub performers: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Event {
    /// Normalized event date
    pub fn event_date(&self) -> Option<DateTime<Utc>> {
        normalize(Some(&self.date))
    }

    /// Best-available timestamp: `created_at`, then `date`, then `updated_at`
    ///
    /// The first field that normalizes wins; later fields are not consulted.
    pub fn best_timestamp(&self) -> Option<DateTime<Utc>> {
        [
            self.created_at.as_deref(),
            Some(self.date.as_str()),
            self.updated_at.as_deref(),
        ]
        .into_iter()
        .find_map(normalize)
    }
}

/// Caller input for creating or replacing an event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventDraft {
    pub id: Option<String>,
    pub title: String,
    pub date: String,
    pub location: String,
    pub performers: Vec<String>,
    pub description: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl EventDraft {
    pub fn new(title: impl Into<String>, date: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            date: date.into(),
            location: location.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_performers<I, S>(mut self, performers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.performers = performers.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_created_at(mut self, created_at: impl Into<String>) -> Self {
        self.created_at = Some(created_at.into());
        self
    }

    /// Check required fields and the performer delimiter invariant
    pub fn validate(&self) -> Result<()> {
        let missing = missing_fields(&[
            ("title", &self.title),
            ("date", &self.date),
            ("location", &self.location),
        ]);
        if !missing.is_empty() {
            return Err(Error::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        if let Some(name) = self
            .performers
            .iter()
            .find(|name| name.contains(PERFORMER_DELIMITER))
        {
            return Err(Error::Validation(format!(
                "Performer name may not contain '{}': {}",
                PERFORMER_DELIMITER, name
            )));
        }

        Ok(())
    }

    /// Build the stored record with the given identity and stamps
    pub fn into_event(self, id: String, created_at: Option<String>, updated_at: String) -> Event {
        Event {
            id,
            title: self.title.trim().to_string(),
            date: self.date.trim().to_string(),
            location: self.location.trim().to_string(),
            performers: clean_performers(self.performers),
            description: self.description,
            created_at,
            updated_at: Some(updated_at),
        }
    }
}

/// Event organizer record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organizer {
    pub organizer_id: String,
    pub name: String,
    pub company: String,
    pub region: String,
    /// Years of experience
    #[serde(default)]
    pub experience: u32,
    #[serde(default)]
    pub managed_events: u32,
    #[serde(default)]
    pub cultural_events: u32,
    #[serde(default)]
    pub events_2025: u32,
}

impl Organizer {
    /// Year-specific event count, if that year is tracked
    pub fn events_in_year(&self, year: i32) -> Option<u32> {
        (year == TRACKED_EVENT_YEAR).then_some(self.events_2025)
    }
}

/// Caller input for creating or replacing an organizer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizerDraft {
    pub organizer_id: Option<String>,
    pub name: String,
    pub company: String,
    pub region: String,
    pub experience: u32,
    pub managed_events: u32,
    pub cultural_events: u32,
    pub events_2025: u32,
}

impl OrganizerDraft {
    pub fn new(name: impl Into<String>, company: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            company: company.into(),
            region: region.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, organizer_id: impl Into<String>) -> Self {
        self.organizer_id = Some(organizer_id.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        let missing = missing_fields(&[
            ("name", &self.name),
            ("company", &self.company),
            ("region", &self.region),
        ]);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )))
        }
    }

    pub fn into_organizer(self, organizer_id: String) -> Organizer {
        Organizer {
            organizer_id,
            name: self.name.trim().to_string(),
            company: self.company.trim().to_string(),
            region: self.region.trim().to_string(),
            experience: self.experience,
            managed_events: self.managed_events,
            cultural_events: self.cultural_events,
            events_2025: self.events_2025,
        }
    }
}

fn missing_fields<'a>(fields: &[(&'a str, &String)]) -> Vec<&'a str> {
    fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect()
}

/// Trim performer names and drop blanks, keeping order
pub fn clean_performers(performers: Vec<String>) -> Vec<String> {
    performers
        .into_iter()
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}
