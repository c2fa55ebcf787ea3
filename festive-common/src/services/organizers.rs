//! Organizer service

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::db::OrganizerStore;
use crate::models::{Organizer, OrganizerDraft, TRACKED_EVENT_YEAR};
use crate::uuid_utils;
use crate::{Error, Result};

const MAX_ID_ATTEMPTS: usize = 8;

/// Total events managed by one company
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyEvents {
    pub company: String,
    pub managed_events: u64,
}

/// Region with the highest cultural event total
///
/// `region` is `None` only when there are no organizers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionLeader {
    pub region: Option<String>,
    pub cultural_events: u64,
}

/// Organizer with the most events in a given year
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopOrganizer {
    pub year: i32,
    pub organizer: Option<Organizer>,
    pub events: u32,
}

pub struct OrganizerService {
    store: OrganizerStore,
}

impl OrganizerService {
    pub fn new(store: OrganizerStore) -> Self {
        Self { store }
    }

    pub async fn create(&self, draft: OrganizerDraft) -> Result<Organizer> {
        self.store.init().await?;
        draft.validate()?;

        let organizer_id = match draft
            .organizer_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
        {
            Some(id) => id.to_string(),
            None => self.unused_id().await?,
        };

        if self.store.get(&organizer_id).await?.is_some() {
            return Err(Error::Conflict(format!(
                "Organizer with this ID already exists: {}",
                organizer_id
            )));
        }

        let organizer = draft.into_organizer(organizer_id);
        self.store.insert(&organizer).await?;

        info!("Created organizer {} ({})", organizer.organizer_id, organizer.name);
        Ok(organizer)
    }

    pub async fn get(&self, organizer_id: &str) -> Result<Organizer> {
        self.store.init().await?;
        self.store
            .get(organizer_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Organizer not found: {}", organizer_id)))
    }

    pub async fn list(&self) -> Result<Vec<Organizer>> {
        self.store.init().await?;
        self.store.list().await
    }

    pub async fn update(&self, organizer_id: &str, draft: OrganizerDraft) -> Result<Organizer> {
        self.store.init().await?;
        draft.validate()?;

        let organizer = draft.into_organizer(organizer_id.to_string());
        if !self.store.update(&organizer).await? {
            return Err(Error::NotFound(format!(
                "Organizer not found to update: {}",
                organizer_id
            )));
        }

        info!("Updated organizer {}", organizer_id);
        Ok(organizer)
    }

    /// Delete an organizer, returning the record as it was
    pub async fn delete(&self, organizer_id: &str) -> Result<Organizer> {
        self.store.init().await?;

        let not_found = || Error::NotFound(format!("Organizer not found to delete: {}", organizer_id));
        let existing = self.store.get(organizer_id).await?.ok_or_else(not_found)?;
        if self.store.delete(organizer_id).await? == 0 {
            return Err(not_found());
        }

        info!("Deleted organizer {}", organizer_id);
        Ok(existing)
    }

    /// Sum of `managed_events` over organizers whose company matches, ignoring case
    pub async fn events_managed_by(&self, company: &str) -> Result<CompanyEvents> {
        let wanted = company.trim().to_lowercase();
        let managed_events: u64 = self
            .list()
            .await?
            .iter()
            .filter(|organizer| organizer.company.trim().to_lowercase() == wanted)
            .map(|organizer| u64::from(organizer.managed_events))
            .sum();

        Ok(CompanyEvents {
            company: company.to_string(),
            managed_events,
        })
    }

    /// Region with the largest `cultural_events` total
    ///
    /// Single winner; on a tie the region seen first in store order wins.
    pub async fn region_with_most_cultural_events(&self) -> Result<RegionLeader> {
        let mut totals: Vec<(String, u64)> = Vec::new();
        for organizer in self.list().await? {
            let amount = u64::from(organizer.cultural_events);
            match totals.iter().position(|(region, _)| *region == organizer.region) {
                Some(index) => totals[index].1 += amount,
                None => totals.push((organizer.region, amount)),
            }
        }

        let mut leader: Option<(String, u64)> = None;
        for (region, total) in totals {
            if leader.as_ref().map_or(true, |(_, best)| total > *best) {
                leader = Some((region, total));
            }
        }

        debug!("Cultural event leader: {:?}", leader);
        Ok(match leader {
            Some((region, cultural_events)) => RegionLeader {
                region: Some(region),
                cultural_events,
            },
            None => RegionLeader {
                region: None,
                cultural_events: 0,
            },
        })
    }

    /// Organizer with the highest event count for `year`
    ///
    /// Counts are only tracked for one year; asking for any other year is a
    /// validation error. First in store order wins a tie.
    pub async fn top_organizer_for_year(&self, year: i32) -> Result<TopOrganizer> {
        if year != TRACKED_EVENT_YEAR {
            return Err(Error::Validation(format!(
                "Event counts are only tracked for {}, not {}",
                TRACKED_EVENT_YEAR, year
            )));
        }

        let mut top: Option<(u32, Organizer)> = None;
        for organizer in self.list().await? {
            let events = organizer.events_in_year(year).unwrap_or(0);
            if top.as_ref().map_or(true, |(best, _)| events > *best) {
                top = Some((events, organizer));
            }
        }

        Ok(match top {
            Some((events, organizer)) => TopOrganizer {
                year,
                organizer: Some(organizer),
                events,
            },
            None => TopOrganizer {
                year,
                organizer: None,
                events: 0,
            },
        })
    }

    async fn unused_id(&self) -> Result<String> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let candidate = uuid_utils::generate_id();
            if self.store.get(&candidate).await?.is_none() {
                return Ok(candidate);
            }
            warn!("Generated organizer id {} already in use, retrying", candidate);
        }
        Err(Error::Internal(
            "Could not generate an unused organizer id".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init::init_in_memory;

    async fn service() -> OrganizerService {
        OrganizerService::new(OrganizerStore::new(init_in_memory().await.unwrap()))
    }

    fn draft(id: &str, company: &str, region: &str, cultural: u32, events_2025: u32) -> OrganizerDraft {
        let mut draft = OrganizerDraft::new(format!("Organizer {}", id), company, region).with_id(id);
        draft.managed_events = 10;
        draft.cultural_events = cultural;
        draft.events_2025 = events_2025;
        draft
    }

    #[tokio::test]
    async fn test_region_tie_goes_to_first_seen() {
        let service = service().await;
        service.create(draft("a", "Utsav", "West", 3, 1)).await.unwrap();
        service.create(draft("b", "Utsav", "South", 5, 1)).await.unwrap();
        service.create(draft("c", "Mela", "West", 2, 1)).await.unwrap();

        let leader = service.region_with_most_cultural_events().await.unwrap();
        assert_eq!(leader.region.as_deref(), Some("West"));
        assert_eq!(leader.cultural_events, 5);
    }

    #[tokio::test]
    async fn test_top_organizer_first_max_wins() {
        let service = service().await;
        service.create(draft("a", "Utsav", "West", 0, 4)).await.unwrap();
        service.create(draft("b", "Utsav", "West", 0, 9)).await.unwrap();
        service.create(draft("c", "Utsav", "West", 0, 9)).await.unwrap();

        let top = service.top_organizer_for_year(2025).await.unwrap();
        assert_eq!(top.organizer.map(|o| o.organizer_id), Some("b".to_string()));
        assert_eq!(top.events, 9);

        assert!(matches!(
            service.top_organizer_for_year(2024).await,
            Err(Error::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_update_replaces_fields() {
        let service = service().await;
        service.create(draft("a", "Utsav", "West", 1, 1)).await.unwrap();

        let updated = service
            .update("a", draft("ignored", "Mela", "East", 7, 2))
            .await
            .unwrap();
        assert_eq!(updated.organizer_id, "a");
        assert_eq!(service.get("a").await.unwrap().company, "Mela");
        assert_eq!(service.get("a").await.unwrap().cultural_events, 7);
    }
}
