//! Meetups: offline conversations a host proposes and guests apply to.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Lifecycle, Reactions, Record, UserInfo};
use crate::query::{desc, keyword_matches, ListQuery, Selector};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MeetupTopic {
    Career,
    Startup,
    Technology,
    Investment,
    Life,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MeetupStatus {
    Open,
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl MeetupStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for MeetupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Lifecycle for MeetupStatus {
    fn allows(self, next: Self) -> bool {
        use MeetupStatus::*;
        matches!(
            (self, next),
            (Open, Pending | Cancelled)
                | (Pending, Open | Confirmed | Cancelled)
                | (Confirmed, Completed | Cancelled)
        )
    }
}

/// Who pays for the meetup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CostSplit {
    Host,
    Aa,
    Guest,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meetup {
    pub id: String,
    pub title: String,
    pub topic: MeetupTopic,
    pub description: String,
    /// The host's own thinking on the subject, shown before applying.
    pub thoughts: String,
    pub host: UserInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    pub tags: Vec<String>,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub preferred_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_time: Option<String>,
    pub cost_split: CostSplit,
    pub max_guests: u32,
    pub current_guests: u32,
    pub status: MeetupStatus,
    pub view_count: u64,
    pub interested_count: u64,
    pub application_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_interested: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub interested: Reactions,
    /// One application per user.
    #[serde(skip)]
    pub applicants: Reactions,
}

impl Record for Meetup {
    const ENTITY: &'static str = "Meetup";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Meetup {
    pub fn for_viewer(mut self, viewer: Option<&str>) -> Self {
        self.is_interested = viewer.map(|v| self.interested.contains(v));
        self
    }

    pub fn is_full(&self) -> bool {
        self.current_guests >= self.max_guests
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum MeetupSort {
    #[default]
    Latest,
    /// Most interested users first.
    Popular,
    /// Oldest first, standing in for "happening soonest".
    Soonest,
}

impl From<String> for MeetupSort {
    fn from(value: String) -> Self {
        match value.as_str() {
            "popular" => Self::Popular,
            "soonest" => Self::Soonest,
            _ => Self::Latest,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MeetupQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub topic: Selector<MeetupTopic>,
    pub city: Option<String>,
    pub cost_split: Selector<CostSplit>,
    pub status: Selector<MeetupStatus>,
    /// Matches title, description, host name and tags.
    pub keyword: Option<String>,
    pub sort_by: MeetupSort,
}

impl ListQuery<Meetup> for MeetupQuery {
    fn matches(&self, m: &Meetup) -> bool {
        self.topic.matches(&m.topic)
            && self
                .city
                .as_deref()
                .filter(|c| !c.is_empty())
                .map_or(true, |c| m.city == c)
            && self.cost_split.matches(&m.cost_split)
            && self.status.matches(&m.status)
            && keyword_matches(
                self.keyword.as_deref(),
                [m.title.as_str(), m.description.as_str(), m.host.name.as_str()]
                    .into_iter()
                    .chain(m.tags.iter().map(String::as_str)),
            )
    }

    fn compare(&self, a: &Meetup, b: &Meetup) -> Ordering {
        match self.sort_by {
            MeetupSort::Popular => desc(a.interested_count, b.interested_count),
            MeetupSort::Soonest => a.created_at.cmp(&b.created_at),
            MeetupSort::Latest => desc(a.created_at, b.created_at),
        }
    }

    fn paging(&self) -> (Option<u32>, Option<u32>) {
        (self.page, self.page_size)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMeetup {
    pub title: String,
    pub topic: MeetupTopic,
    pub description: String,
    pub thoughts: String,
    pub city: String,
    pub preferred_time: String,
    pub cost_split: CostSplit,
    pub max_guests: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub model_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterestState {
    pub interested: bool,
    pub interested_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetupApplication {
    pub id: String,
    pub meetup_id: String,
    pub applicant: UserInfo,
    pub message: String,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
}

impl Record for MeetupApplication {
    const ENTITY: &'static str = "MeetupApplication";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplyMeetup {
    pub message: String,
}

/// Host decision on a pending application.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewApplication {
    pub accept: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMeetupStatus {
    pub status: MeetupStatus,
    #[serde(default)]
    pub scheduled_time: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}
