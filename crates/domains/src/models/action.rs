//! Actions: concrete follow-up steps a user commits to after thinking a
//! topic through, with progress tracked by follow-up records.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Lifecycle, Record};
use crate::errors::{DomainError, Result};
use crate::query::{asc_nulls_last, desc, keyword_matches, ListQuery, Selector};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl ActionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Status implied by a completion rate.
    pub fn for_completion(rate: u8) -> Self {
        match rate {
            0 => Self::Pending,
            100 => Self::Completed,
            _ => Self::InProgress,
        }
    }
}

impl fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Lifecycle for ActionStatus {
    fn allows(self, next: Self) -> bool {
        use ActionStatus::*;
        matches!(
            (self, next),
            (Pending, InProgress | Completed | Cancelled) | (InProgress, Pending | Completed | Cancelled)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionPriority {
    High,
    #[default]
    Medium,
    Low,
}

impl ActionPriority {
    fn rank(self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub id: String,
    pub title: String,
    pub description: String,
    pub owner_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guiding_principle: Option<String>,
    /// 0 to 100.
    pub completion_rate: u8,
    pub status: ActionStatus,
    pub priority: ActionPriority,
    pub follow_up_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Derived at read time from `due_date` and `status`.
    #[serde(default)]
    pub is_overdue: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Completion rate just before the latest follow-up.
    #[serde(skip)]
    pub progress_before: u8,
}

impl Record for Action {
    const ENTITY: &'static str = "Action";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Action {
    pub fn overdue_at(&self, now: DateTime<Utc>) -> bool {
        !self.status.is_terminal() && self.due_date.is_some_and(|due| due < now)
    }

    pub fn with_overdue(mut self, now: DateTime<Utc>) -> Self {
        self.is_overdue = self.overdue_at(now);
        self
    }

    /// Moves to `next` through the transition table and stamps timestamps.
    pub fn set_status(&mut self, next: ActionStatus, now: DateTime<Utc>) -> Result<()> {
        self.status = self.status.transition(next)?;
        match self.status {
            ActionStatus::Completed => {
                self.completion_rate = 100;
                self.completed_at.get_or_insert(now);
            }
            ActionStatus::Pending => self.completion_rate = 0,
            _ => {}
        }
        self.updated_at = now;
        Ok(())
    }

    /// Sets the completion rate; the status follows it (0 pending,
    /// 100 completed, anything else in progress).
    pub fn set_completion(&mut self, rate: u8, now: DateTime<Utc>) -> Result<()> {
        validate_rate(rate)?;
        if self.status.is_terminal() {
            return Err(DomainError::transition(
                self.status,
                ActionStatus::for_completion(rate),
            ));
        }
        self.status = self.status.transition(ActionStatus::for_completion(rate))?;
        self.completion_rate = rate;
        if self.status == ActionStatus::Completed {
            self.completed_at = Some(now);
        }
        self.updated_at = now;
        Ok(())
    }

    /// Counts one follow-up and applies the progress it reports, keeping
    /// the rate it started from in `progress_before`.
    pub fn record_follow_up(&mut self, progress_after: Option<u8>, now: DateTime<Utc>) -> Result<()> {
        self.progress_before = self.completion_rate;
        if let Some(rate) = progress_after {
            self.set_completion(rate, now)?;
        }
        self.follow_up_count += 1;
        Ok(())
    }

    pub fn progress_delta(&self) -> i16 {
        i16::from(self.completion_rate) - i16::from(self.progress_before)
    }
}

pub fn validate_rate(rate: u8) -> Result<()> {
    if rate > 100 {
        return Err(DomainError::Validation(format!(
            "completion rate must be between 0 and 100, got {rate}"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum ActionSort {
    #[default]
    CreatedAt,
    DueDate,
    CompletionRate,
    Priority,
}

impl From<String> for ActionSort {
    fn from(value: String) -> Self {
        match value.as_str() {
            "dueDate" => Self::DueDate,
            "completionRate" => Self::CompletionRate,
            "priority" => Self::Priority,
            _ => Self::CreatedAt,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ActionQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub status: Selector<ActionStatus>,
    pub priority: Selector<ActionPriority>,
    pub topic_id: Option<String>,
    pub analysis_id: Option<String>,
    pub overdue: Option<bool>,
    /// Matches title, description and topic title.
    pub keyword: Option<String>,
    pub sort_by: ActionSort,
    /// Set by the `/my` listing.
    #[serde(skip)]
    pub owner_id: Option<String>,
}

impl ListQuery<Action> for ActionQuery {
    fn matches(&self, a: &Action) -> bool {
        self.owner_id.as_ref().map_or(true, |o| &a.owner_id == o)
            && self.status.matches(&a.status)
            && self.priority.matches(&a.priority)
            && self.topic_id.as_ref().map_or(true, |t| a.topic_id.as_ref() == Some(t))
            && self
                .analysis_id
                .as_ref()
                .map_or(true, |an| a.analysis_id.as_ref() == Some(an))
            && self.overdue.map_or(true, |o| a.is_overdue == o)
            && keyword_matches(
                self.keyword.as_deref(),
                [
                    a.title.as_str(),
                    a.description.as_str(),
                    a.topic_title.as_deref().unwrap_or_default(),
                ],
            )
    }

    fn compare(&self, a: &Action, b: &Action) -> Ordering {
        match self.sort_by {
            ActionSort::DueDate => asc_nulls_last(a.due_date, b.due_date),
            ActionSort::CompletionRate => desc(a.completion_rate, b.completion_rate),
            ActionSort::Priority => a.priority.rank().cmp(&b.priority.rank()),
            ActionSort::CreatedAt => desc(a.created_at, b.created_at),
        }
    }

    fn paging(&self) -> (Option<u32>, Option<u32>) {
        (self.page, self.page_size)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAction {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub priority: ActionPriority,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub guiding_principle: Option<String>,
    #[serde(default)]
    pub topic_id: Option<String>,
    #[serde(default)]
    pub topic_title: Option<String>,
    #[serde(default)]
    pub analysis_id: Option<String>,
}

/// Batch creation from one analysis; the batch-level topic and analysis
/// override whatever the individual drafts carry.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateActionsFromAnalysis {
    pub analysis_id: String,
    #[serde(default)]
    pub topic_id: Option<String>,
    #[serde(default)]
    pub topic_title: Option<String>,
    pub actions: Vec<CreateAction>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateAction {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<ActionPriority>,
    pub due_date: Option<DateTime<Utc>>,
    pub guiding_principle: Option<String>,
}

impl UpdateAction {
    pub fn apply(self, a: &mut Action, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            a.title = title;
        }
        if let Some(description) = self.description {
            a.description = description;
        }
        if let Some(priority) = self.priority {
            a.priority = priority;
        }
        if self.due_date.is_some() {
            a.due_date = self.due_date;
        }
        if self.guiding_principle.is_some() {
            a.guiding_principle = self.guiding_principle;
        }
        a.updated_at = now;
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCompletion {
    pub completion_rate: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateActionStatus {
    pub status: ActionStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUp {
    pub id: String,
    pub action_id: String,
    pub user_id: String,
    pub user_name: String,
    pub content: String,
    pub progress_before: u8,
    pub progress_after: u8,
    pub progress_delta: i16,
    pub created_at: DateTime<Utc>,
}

impl Record for FollowUp {
    const ENTITY: &'static str = "FollowUp";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddFollowUp {
    pub content: String,
    /// New completion rate reported with this follow-up, if any.
    #[serde(default)]
    pub progress_after: Option<u8>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionStatistics {
    pub total: u64,
    pub pending_count: u64,
    pub progress_count: u64,
    pub complete_count: u64,
    pub cancel_count: u64,
    pub overdue_count: u64,
}

impl ActionStatistics {
    pub fn tally<'a>(actions: impl IntoIterator<Item = &'a Action>, now: DateTime<Utc>) -> Self {
        actions.into_iter().fold(Self::default(), |mut stats, a| {
            stats.total += 1;
            match a.status {
                ActionStatus::Pending => stats.pending_count += 1,
                ActionStatus::InProgress => stats.progress_count += 1,
                ActionStatus::Completed => stats.complete_count += 1,
                ActionStatus::Cancelled => stats.cancel_count += 1,
            }
            if a.overdue_at(now) {
                stats.overdue_count += 1;
            }
            stats
        })
    }
}
