//! # storage-adapters
//!
//! In-process implementations of the storage ports: one `MemoryTable` per
//! entity type, a refresh-session store, and optional demo fixtures.

#[cfg(feature = "fixtures")]
pub mod fixtures;
pub mod memory;
pub mod sessions;

use std::sync::Arc;

#[cfg(feature = "fixtures")]
use chrono::{DateTime, Utc};
use domains::models::*;
use domains::ports::Repositories;

pub use memory::MemoryTable;
pub use sessions::MemorySessionStore;

/// Every table the services need, sharing one lifetime.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    pub accounts: Arc<MemoryTable<Account>>,
    pub discussions: Arc<MemoryTable<Discussion>>,
    pub comments: Arc<MemoryTable<Comment>>,
    pub meetups: Arc<MemoryTable<Meetup>>,
    pub meetup_applications: Arc<MemoryTable<MeetupApplication>>,
    pub experts: Arc<MemoryTable<Expert>>,
    pub consultations: Arc<MemoryTable<Consultation>>,
    pub consultation_applications: Arc<MemoryTable<ConsultationApplication>>,
    pub actions: Arc<MemoryTable<Action>>,
    pub follow_ups: Arc<MemoryTable<FollowUp>>,
    pub analyses: Arc<MemoryTable<Analysis>>,
    pub topics: Arc<MemoryTable<Topic>>,
    pub models: Arc<MemoryTable<ThinkingModel>>,
    pub categories: Arc<MemoryTable<Category>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn repositories(&self) -> Repositories {
        Repositories {
            accounts: self.accounts.clone(),
            discussions: self.discussions.clone(),
            comments: self.comments.clone(),
            meetups: self.meetups.clone(),
            meetup_applications: self.meetup_applications.clone(),
            experts: self.experts.clone(),
            consultations: self.consultations.clone(),
            consultation_applications: self.consultation_applications.clone(),
            actions: self.actions.clone(),
            follow_ups: self.follow_ups.clone(),
            analyses: self.analyses.clone(),
            topics: self.topics.clone(),
            models: self.models.clone(),
            categories: self.categories.clone(),
        }
    }

    /// A backend pre-filled with the demo records. Relative dates (due
    /// dates, topic ages) are computed from `now`.
    #[cfg(feature = "fixtures")]
    pub fn with_fixtures(now: DateTime<Utc>) -> Self {
        let backend = Self {
            accounts: Arc::default(),
            discussions: Arc::new(MemoryTable::seeded(fixtures::discussions())),
            comments: Arc::new(MemoryTable::seeded(fixtures::comments())),
            meetups: Arc::new(MemoryTable::seeded(fixtures::meetups())),
            meetup_applications: Arc::new(MemoryTable::seeded(fixtures::meetup_applications())),
            experts: Arc::new(MemoryTable::seeded(fixtures::experts())),
            consultations: Arc::new(MemoryTable::seeded(fixtures::consultations())),
            consultation_applications: Arc::new(MemoryTable::seeded(
                fixtures::consultation_applications(),
            )),
            actions: Arc::new(MemoryTable::seeded(fixtures::actions(now))),
            follow_ups: Arc::default(),
            analyses: Arc::new(MemoryTable::seeded(fixtures::analyses(now))),
            topics: Arc::new(MemoryTable::seeded(fixtures::topics(now))),
            models: Arc::new(MemoryTable::seeded(fixtures::models())),
            categories: Arc::new(MemoryTable::seeded(fixtures::categories())),
        };
        tracing::info!(
            discussions = backend.discussions.len(),
            meetups = backend.meetups.len(),
            consultations = backend.consultations.len(),
            models = backend.models.len(),
            "seeded in-memory tables"
        );
        backend
    }
}
