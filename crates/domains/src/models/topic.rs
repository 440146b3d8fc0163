//! Topics: a problem a user is thinking through, optionally framed by one
//! thinking model.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AnalysisLineage, Lifecycle, Record};
use crate::query::{desc, keyword_matches, ListQuery, Selector};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopicStatus {
    #[default]
    InProgress,
    Completed,
    Archived,
    Draft,
}

impl TopicStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Archived => "archived",
            Self::Draft => "draft",
        }
    }
}

impl fmt::Display for TopicStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Lifecycle for TopicStatus {
    fn allows(self, next: Self) -> bool {
        use TopicStatus::*;
        matches!(
            (self, next),
            (Draft, InProgress)
                | (InProgress, Completed | Archived)
                | (Completed, InProgress | Archived)
                | (Archived, InProgress)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: String,
    pub title: String,
    pub description: String,
    pub background: String,
    pub goal: String,
    pub constraints: String,
    pub status: TopicStatus,
    pub owner_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    /// 1 (highest) to 3.
    pub priority: u8,
    pub tags: Vec<String>,
    pub analysis_count: u64,
    pub action_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub lineage: AnalysisLineage,
}

impl Record for Topic {
    const ENTITY: &'static str = "Topic";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TopicQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub status: Selector<TopicStatus>,
    pub priority: Option<u8>,
    pub model_id: Option<String>,
    /// Matches title, description and tags.
    pub keyword: Option<String>,
    #[serde(skip)]
    pub owner_id: Option<String>,
}

impl ListQuery<Topic> for TopicQuery {
    fn matches(&self, t: &Topic) -> bool {
        self.owner_id.as_ref().map_or(true, |o| &t.owner_id == o)
            && self.status.matches(&t.status)
            && self.priority.map_or(true, |p| t.priority == p)
            && self.model_id.as_ref().map_or(true, |m| t.model_id.as_ref() == Some(m))
            && keyword_matches(
                self.keyword.as_deref(),
                [t.title.as_str(), t.description.as_str()]
                    .into_iter()
                    .chain(t.tags.iter().map(String::as_str)),
            )
    }

    fn compare(&self, a: &Topic, b: &Topic) -> Ordering {
        desc(a.created_at, b.created_at)
    }

    fn paging(&self) -> (Option<u32>, Option<u32>) {
        (self.page, self.page_size)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateTopic {
    pub title: String,
    pub description: String,
    pub background: String,
    pub goal: String,
    pub constraints: String,
    pub priority: Option<u8>,
    pub tags: Vec<String>,
    pub deadline: Option<DateTime<Utc>>,
    /// Saves as draft instead of starting right away.
    pub draft: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateTopic {
    pub title: Option<String>,
    pub description: Option<String>,
    pub background: Option<String>,
    pub goal: Option<String>,
    pub constraints: Option<String>,
    pub priority: Option<u8>,
    pub tags: Option<Vec<String>>,
    pub deadline: Option<DateTime<Utc>>,
}

impl UpdateTopic {
    pub fn apply(self, t: &mut Topic, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            t.title = title;
        }
        if let Some(description) = self.description {
            t.description = description;
        }
        if let Some(background) = self.background {
            t.background = background;
        }
        if let Some(goal) = self.goal {
            t.goal = goal;
        }
        if let Some(constraints) = self.constraints {
            t.constraints = constraints;
        }
        if let Some(priority) = self.priority {
            t.priority = priority;
        }
        if let Some(tags) = self.tags {
            t.tags = tags;
        }
        if self.deadline.is_some() {
            t.deadline = self.deadline;
        }
        t.updated_at = now;
    }
}

/// Priority must be 1, 2 or 3.
pub fn validate_priority(priority: u8) -> crate::errors::Result<u8> {
    if (1..=3).contains(&priority) {
        Ok(priority)
    } else {
        Err(crate::errors::DomainError::Validation(format!(
            "priority must be 1, 2 or 3, got {priority}"
        )))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTopicStatus {
    pub status: TopicStatus,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectModel {
    pub model_id: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicStatistics {
    pub total: u64,
    pub draft_count: u64,
    pub progress_count: u64,
    pub complete_count: u64,
    pub archive_count: u64,
}

impl TopicStatistics {
    pub fn tally<'a>(topics: impl IntoIterator<Item = &'a Topic>) -> Self {
        topics.into_iter().fold(Self::default(), |mut stats, t| {
            stats.total += 1;
            match t.status {
                TopicStatus::Draft => stats.draft_count += 1,
                TopicStatus::InProgress => stats.progress_count += 1,
                TopicStatus::Completed => stats.complete_count += 1,
                TopicStatus::Archived => stats.archive_count += 1,
            }
            stats
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reopen_and_archive_paths() {
        assert!(TopicStatus::Completed.transition(TopicStatus::InProgress).is_ok());
        assert!(TopicStatus::Archived.transition(TopicStatus::InProgress).is_ok());
        assert!(TopicStatus::Archived.transition(TopicStatus::Completed).is_err());
        assert!(TopicStatus::InProgress.transition(TopicStatus::Draft).is_err());
    }

    #[test]
    fn priority_bounds() {
        assert!(validate_priority(0).is_err());
        assert_eq!(validate_priority(2), Ok(2));
        assert!(validate_priority(4).is_err());
    }
}
