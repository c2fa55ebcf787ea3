//! Event service
//!
//! CRUD with identity enforcement plus the event analytics. Structural
//! problems (missing fields, duplicate or unknown identifiers) are the only
//! errors raised here. Dates that do not normalize simply drop the record out
//! of the time-based computation at hand.

use chrono::{DateTime, Datelike, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::db::EventStore;
use crate::models::{Event, EventDraft};
use crate::services::stats::{mode_by_field, ModeSummary};
use crate::time::{normalize, stamp, Clock, SystemClock};
use crate::uuid_utils;
use crate::{Error, Result};

/// Generated identifiers retried on collision before giving up
const MAX_ID_ATTEMPTS: usize = 8;

const MONTH_NAMES: [&str; 12] = [
    "january", "february", "march", "april", "may", "june",
    "july", "august", "september", "october", "november", "december",
];

pub struct EventService {
    store: EventStore,
    clock: Arc<dyn Clock>,
}

impl EventService {
    pub fn new(store: EventStore, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn with_system_clock(store: EventStore) -> Self {
        Self::new(store, Arc::new(SystemClock))
    }

    /// Create an event
    ///
    /// Assigns a fresh identifier when none is given and stamps
    /// `created_at` / `updated_at` unless the caller already supplied them.
    pub async fn create(&self, draft: EventDraft) -> Result<Event> {
        self.store.init().await?;
        draft.validate()?;

        let id = match non_blank(draft.id.as_deref()) {
            Some(id) => id.to_string(),
            None => self.unused_id().await?,
        };

        if self.store.get(&id).await?.is_some() {
            return Err(Error::Conflict(format!("Event already exists: {}", id)));
        }

        let now = self.clock.now();
        let created_at = non_blank(draft.created_at.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| stamp(now));
        let updated_at = match non_blank(draft.updated_at.as_deref()) {
            Some(updated_at) => updated_not_before(updated_at, &created_at),
            None => stamp_not_before(now, &created_at),
        };

        let event = draft.into_event(id, Some(created_at), updated_at);
        self.store.insert(&event).await?;

        info!("Created event {} ({})", event.id, event.title);
        Ok(event)
    }

    pub async fn get(&self, id: &str) -> Result<Event> {
        self.store.init().await?;
        self.store
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Event not found: {}", id)))
    }

    /// Every event, in store order
    pub async fn list(&self) -> Result<Vec<Event>> {
        self.store.init().await?;
        self.store.list().await
    }

    /// Replace every mutable field of an existing event
    ///
    /// `updated_at` is re-stamped, `created_at` is kept from the stored record.
    pub async fn update(&self, id: &str, draft: EventDraft) -> Result<Event> {
        self.store.init().await?;
        draft.validate()?;

        let existing = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Event not found to update: {}", id)))?;

        let updated_at = match existing.created_at.as_deref() {
            Some(created_at) => stamp_not_before(self.clock.now(), created_at),
            None => stamp(self.clock.now()),
        };
        let merged = draft.into_event(existing.id, existing.created_at, updated_at);

        if !self.store.update(&merged).await? {
            // Deleted between the lookup and the write
            return Err(Error::NotFound(format!("Event not found to update: {}", id)));
        }

        info!("Updated event {}", merged.id);
        Ok(merged)
    }

    /// Delete an event, returning the record as it was
    pub async fn delete(&self, id: &str) -> Result<Event> {
        self.store.init().await?;

        let existing = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Event not found to delete: {}", id)))?;

        if self.store.delete(id).await? == 0 {
            return Err(Error::NotFound(format!("Event not found to delete: {}", id)));
        }

        info!("Deleted event {}", id);
        Ok(existing)
    }

    pub async fn count(&self) -> Result<u64> {
        self.store.init().await?;
        let total = self.store.count().await?;
        Ok(u64::try_from(total).unwrap_or(0))
    }

    /// Events whose date falls in the current calendar month (UTC)
    pub async fn events_in_current_month(&self) -> Result<Vec<Event>> {
        let now = self.clock.now();
        let events: Vec<Event> = self
            .list()
            .await?
            .into_iter()
            .filter(|event| {
                event
                    .event_date()
                    .is_some_and(|date| date.year() == now.year() && date.month() == now.month())
            })
            .collect();

        debug!("{} events this month ({}-{:02})", events.len(), now.year(), now.month());
        Ok(events)
    }

    /// Location(s) hosting the most events
    pub async fn city_with_most_events(&self) -> Result<ModeSummary> {
        let events = self.list().await?;
        Ok(mode_by_field(&events, |event| std::iter::once(event.location.as_str())))
    }

    /// Performer(s) appearing in the most lineups
    pub async fn top_performer(&self) -> Result<ModeSummary> {
        let events = self.list().await?;
        Ok(mode_by_field(&events, |event| {
            event.performers.iter().map(String::as_str)
        }))
    }

    /// The event with the latest best-available timestamp
    ///
    /// Records without any parseable timestamp rank as oldest. Ties go to
    /// the record seen first. `None` only when there are no events.
    pub async fn most_recently_added(&self) -> Result<Option<Event>> {
        let mut latest: Option<(DateTime<Utc>, Event)> = None;

        for event in self.list().await? {
            let timestamp = event.best_timestamp().unwrap_or(DateTime::<Utc>::MIN_UTC);
            let is_newer = latest
                .as_ref()
                .map_or(true, |(best, _)| timestamp > *best);
            if is_newer {
                latest = Some((timestamp, event));
            }
        }

        Ok(latest.map(|(_, event)| event))
    }

    /// Events whose best-available timestamp is at or after `now - days`
    pub async fn created_within(&self, days: u32) -> Result<Vec<Event>> {
        let cutoff = self
            .clock
            .now()
            .checked_sub_signed(Duration::days(i64::from(days)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);

        let events: Vec<Event> = self
            .list()
            .await?
            .into_iter()
            .filter(|event| event.best_timestamp().is_some_and(|ts| ts >= cutoff))
            .collect();

        debug!("{} events within the last {} days", events.len(), days);
        Ok(events)
    }

    /// Location(s) that hosted the most events dated before now
    pub async fn top_past_location(&self) -> Result<ModeSummary> {
        let now = self.clock.now();
        let past: Vec<Event> = self
            .list()
            .await?
            .into_iter()
            .filter(|event| event.event_date().is_some_and(|date| date < now))
            .collect();

        Ok(mode_by_field(&past, |event| std::iter::once(event.location.as_str())))
    }

    /// Events whose location contains `query`, ignoring case
    pub async fn events_at_location(&self, query: &str) -> Result<Vec<Event>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|event| event.location.to_lowercase().contains(&needle))
            .collect())
    }

    /// Events in a given month of any year
    ///
    /// `month` is `1`-`12`, an English month name, or its three-letter
    /// abbreviation. Dates that do not normalize match on the month's name,
    /// `-MM-` or `/MM/` appearing in the raw text.
    pub async fn events_in_month(&self, month: &str) -> Result<Vec<Event>> {
        let number = parse_month(month)
            .ok_or_else(|| Error::Validation(format!("Unrecognized month: {}", month)))?;

        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|event| match event.event_date() {
                Some(date) => date.month() == number,
                None => raw_date_mentions_month(&event.date, number),
            })
            .collect())
    }

    /// First event whose title matches, ignoring case and surrounding space
    pub async fn find_by_title(&self, title: &str) -> Result<Option<Event>> {
        let wanted = title.trim().to_lowercase();
        if wanted.is_empty() {
            return Ok(None);
        }

        Ok(self
            .list()
            .await?
            .into_iter()
            .find(|event| event.title.trim().to_lowercase() == wanted))
    }

    async fn unused_id(&self) -> Result<String> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let candidate = uuid_utils::generate_id();
            if self.store.get(&candidate).await?.is_none() {
                return Ok(candidate);
            }
            warn!("Generated event id {} already in use, retrying", candidate);
        }
        Err(Error::Internal(
            "Could not generate an unused event id".to_string(),
        ))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|text| !text.is_empty())
}

/// Stamp `now`, or the creation instant if that lies in the future
fn stamp_not_before(now: DateTime<Utc>, created_at: &str) -> String {
    match normalize(Some(created_at)) {
        Some(created) if created > now => stamp(created),
        _ => stamp(now),
    }
}

/// Keep a supplied `updated_at` unless it parses to a time before `created_at`
fn updated_not_before(updated_at: &str, created_at: &str) -> String {
    match (normalize(Some(updated_at)), normalize(Some(created_at))) {
        (Some(updated), Some(created)) if updated < created => stamp(created),
        _ => updated_at.to_string(),
    }
}

/// Raw date text mentions `month` by name, as `-MM-`, or as `/MM/`
fn raw_date_mentions_month(raw: &str, month: u32) -> bool {
    let raw = raw.to_lowercase();
    raw.contains(MONTH_NAMES[(month - 1) as usize])
        || raw.contains(&format!("-{:02}-", month))
        || raw.contains(&format!("/{:02}/", month))
}

/// Month number from `1`-`12`, a full English name, or a 3-letter abbreviation
pub fn parse_month(text: &str) -> Option<u32> {
    let text = text.trim().to_lowercase();
    if let Ok(number) = text.parse::<u32>() {
        return (1..=12).contains(&number).then_some(number);
    }

    MONTH_NAMES
        .iter()
        .position(|name| *name == text || (text.len() == 3 && name.starts_with(text.as_str())))
        .map(|index| index as u32 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init::init_in_memory;
    use crate::time::FixedClock;

    async fn service_at(date: &str) -> EventService {
        let pool = init_in_memory().await.unwrap();
        let clock = FixedClock::at_date(date).unwrap();
        EventService::new(EventStore::new(pool), Arc::new(clock))
    }

    #[test]
    fn test_parse_month_forms() {
        assert_eq!(parse_month("12"), Some(12));
        assert_eq!(parse_month(" 3 "), Some(3));
        assert_eq!(parse_month("December"), Some(12));
        assert_eq!(parse_month("sep"), Some(9));
        assert_eq!(parse_month("0"), None);
        assert_eq!(parse_month("13"), None);
        assert_eq!(parse_month("ju"), None);
        assert_eq!(parse_month("smarch"), None);
    }

    #[test]
    fn test_stamp_not_before_future_creation() {
        let now = normalize(Some("2025-12-10")).unwrap();
        assert_eq!(stamp_not_before(now, "2026-01-01"), "2026-01-01T00:00:00.000Z");
        assert_eq!(stamp_not_before(now, "2025-01-01"), "2025-12-10T00:00:00.000Z");
        assert_eq!(stamp_not_before(now, "whenever"), "2025-12-10T00:00:00.000Z");
    }

    #[tokio::test]
    async fn test_create_stamps_and_generates_id() {
        let service = service_at("2025-12-10").await;
        let created = service
            .create(EventDraft::new("Sunburn", "2025-12-28", "Goa"))
            .await
            .unwrap();

        assert!(!created.id.is_empty());
        assert_eq!(created.created_at.as_deref(), Some("2025-12-10T00:00:00.000Z"));
        assert_eq!(created.updated_at, created.created_at);
        assert_eq!(service.get(&created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_create_honors_supplied_created_at() {
        let service = service_at("2025-12-10").await;
        let created = service
            .create(EventDraft::new("Old", "2025-01-01", "Pune").with_created_at("2025-01-02T09:00:00Z"))
            .await
            .unwrap();
        assert_eq!(created.created_at.as_deref(), Some("2025-01-02T09:00:00Z"));
        assert_eq!(created.updated_at.as_deref(), Some("2025-12-10T00:00:00.000Z"));
    }

    #[tokio::test]
    async fn test_create_never_stores_updated_before_created() {
        let service = service_at("2025-12-10").await;
        let stale = EventDraft {
            updated_at: Some("2020-01-01".into()),
            ..EventDraft::new("T", "2025-12-20", "Goa")
        };
        let created = service.create(stale).await.unwrap();

        assert_eq!(created.created_at.as_deref(), Some("2025-12-10T00:00:00.000Z"));
        assert_eq!(created.updated_at.as_deref(), Some("2025-12-10T00:00:00.000Z"));
        let created_ts = normalize(created.created_at.as_deref()).unwrap();
        let updated_ts = normalize(created.updated_at.as_deref()).unwrap();
        assert!(created_ts <= updated_ts);
        assert_eq!(service.get(&created.id).await.unwrap(), created);
    }

    #[test]
    fn test_updated_not_before_keeps_valid_stamps() {
        assert_eq!(updated_not_before("2025-12-11", "2025-12-10"), "2025-12-11");
        assert_eq!(updated_not_before("later", "2025-12-10"), "later");
        assert_eq!(
            updated_not_before("2025-01-01", "2025-03-01T10:00:00Z"),
            "2025-03-01T10:00:00.000Z"
        );
    }

    #[tokio::test]
    async fn test_update_keeps_created_at() {
        let service = service_at("2025-12-10").await;
        let created = service
            .create(EventDraft::new("Sunburn", "2025-12-28", "Goa").with_created_at("2025-11-01"))
            .await
            .unwrap();

        let updated = service
            .update(&created.id, EventDraft::new("Sunburn", "2025-12-29", "Vagator").with_id("other"))
            .await
            .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.location, "Vagator");
        assert_eq!(updated.created_at.as_deref(), Some("2025-11-01"));
        assert_eq!(updated.updated_at.as_deref(), Some("2025-12-10T00:00:00.000Z"));
        assert_eq!(service.get(&created.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_most_recent_prefers_parseable_timestamps() {
        let service = service_at("2025-12-10").await;
        let undated = EventDraft {
            created_at: Some("unknown".into()),
            updated_at: Some("unknown".into()),
            ..EventDraft::new("Undated", "sometime soon", "Goa").with_id("undated")
        };
        service.create(undated).await.unwrap();
        service
            .create(EventDraft::new("Dated", "2025-12-01", "Pune").with_id("dated"))
            .await
            .unwrap();

        let recent = service.most_recently_added().await.unwrap().unwrap();
        assert_eq!(recent.id, "dated");
    }

    #[tokio::test]
    async fn test_events_in_month_falls_back_to_month_name() {
        let service = service_at("2025-12-10").await;
        service
            .create(EventDraft::new("A", "2024-12-31", "Goa").with_id("a"))
            .await
            .unwrap();
        service
            .create(EventDraft::new("B", "Late December, TBC", "Pune").with_id("b"))
            .await
            .unwrap();
        service
            .create(EventDraft::new("C", "2025-11-30", "Delhi").with_id("c"))
            .await
            .unwrap();

        let ids: Vec<String> = service
            .events_in_month("dec")
            .await
            .unwrap()
            .into_iter()
            .map(|event| event.id)
            .collect();
        assert_eq!(ids, vec!["a", "b"]);

        service
            .create(EventDraft::new("D", "05/12/2025", "Agra").with_id("d"))
            .await
            .unwrap();
        service
            .create(EventDraft::new("E", "2025-12 (week two)", "Kochi").with_id("e"))
            .await
            .unwrap();
        let numeric: Vec<String> = service
            .events_in_month("12")
            .await
            .unwrap()
            .into_iter()
            .map(|event| event.id)
            .collect();
        assert_eq!(numeric, vec!["a", "b", "d"]);

        assert!(matches!(
            service.events_in_month("someday").await,
            Err(Error::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_location_and_title_lookups() {
        let service = service_at("2025-12-10").await;
        service
            .create(EventDraft::new("Hornbill Festival", "2025-12-01", "Kisama, Nagaland").with_id("h"))
            .await
            .unwrap();

        assert_eq!(service.events_at_location("nagaland").await.unwrap().len(), 1);
        assert!(service.events_at_location("  ").await.unwrap().is_empty());

        let found = service.find_by_title("  hornbill festival ").await.unwrap();
        assert_eq!(found.map(|event| event.id), Some("h".to_string()));
        assert!(service.find_by_title("Sunburn").await.unwrap().is_none());
    }
}
