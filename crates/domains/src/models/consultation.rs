//! Paid consultations: a requester posts a question with a reward and
//! experts apply with a proposal.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ApplicationStatus, Lifecycle, Reactions, Record, UserInfo};
use crate::query::{desc, keyword_matches, within, ListQuery, Selector};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConsultationField {
    Career,
    Startup,
    Technology,
    Product,
    Investment,
    Management,
    Psychology,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConsultationMode {
    Online,
    Offline,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConsultationStatus {
    Open,
    Matched,
    InProgress,
    Completed,
    Cancelled,
    Expired,
}

impl ConsultationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Matched => "matched",
            Self::InProgress => "inProgress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Expired => "expired",
        }
    }

    /// Completed, cancelled or expired.
    pub fn is_closed(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Expired)
    }
}

impl fmt::Display for ConsultationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Lifecycle for ConsultationStatus {
    fn allows(self, next: Self) -> bool {
        use ConsultationStatus::*;
        matches!(
            (self, next),
            (Open, Matched | Cancelled | Expired)
                | (Matched, InProgress | Cancelled)
                | (InProgress, Completed | Cancelled)
        )
    }
}

/// A user with a professional track record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expert {
    #[serde(flatten)]
    pub user: UserInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    /// Years in the profession.
    pub experience: u32,
    pub expertise: Vec<String>,
    /// Consultation fields the expert takes requests for.
    pub fields: Vec<ConsultationField>,
    pub consult_count: u64,
    pub rating: f64,
    pub response_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hourly_rate: Option<u64>,
}

impl Record for Expert {
    const ENTITY: &'static str = "Expert";

    fn id(&self) -> &str {
        &self.user.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Consultation {
    pub id: String,
    pub title: String,
    pub field: ConsultationField,
    pub description: String,
    pub background: String,
    pub expectation: String,
    pub requester: UserInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    pub tags: Vec<String>,
    /// Reward in whole currency units.
    pub reward: u64,
    pub mode: ConsultationMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub deadline: DateTime<Utc>,
    pub status: ConsultationStatus,
    pub view_count: u64,
    pub application_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_expert: Option<Expert>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub applicants: Reactions,
}

impl Record for Consultation {
    const ENTITY: &'static str = "Consultation";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum ConsultationSort {
    #[default]
    Latest,
    Reward,
    Deadline,
    Popular,
}

impl From<String> for ConsultationSort {
    fn from(value: String) -> Self {
        match value.as_str() {
            "reward" => Self::Reward,
            "deadline" => Self::Deadline,
            "popular" => Self::Popular,
            _ => Self::Latest,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConsultationQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub field: Selector<ConsultationField>,
    /// A consultation offered in `both` modes matches any requested mode.
    pub mode: Selector<ConsultationMode>,
    pub status: Selector<ConsultationStatus>,
    pub min_reward: Option<u64>,
    pub max_reward: Option<u64>,
    /// Matches title, description, requester name and tags.
    pub keyword: Option<String>,
    pub sort_by: ConsultationSort,
}

impl ListQuery<Consultation> for ConsultationQuery {
    fn matches(&self, c: &Consultation) -> bool {
        self.field.matches(&c.field)
            && (c.mode == ConsultationMode::Both || self.mode.matches(&c.mode))
            && self.status.matches(&c.status)
            && within(c.reward, self.min_reward, self.max_reward)
            && keyword_matches(
                self.keyword.as_deref(),
                [c.title.as_str(), c.description.as_str(), c.requester.name.as_str()]
                    .into_iter()
                    .chain(c.tags.iter().map(String::as_str)),
            )
    }

    fn compare(&self, a: &Consultation, b: &Consultation) -> Ordering {
        match self.sort_by {
            ConsultationSort::Reward => desc(a.reward, b.reward),
            ConsultationSort::Deadline => a.deadline.cmp(&b.deadline),
            ConsultationSort::Popular => desc(a.view_count, b.view_count),
            ConsultationSort::Latest => desc(a.created_at, b.created_at),
        }
    }

    fn paging(&self) -> (Option<u32>, Option<u32>) {
        (self.page, self.page_size)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConsultation {
    pub title: String,
    pub field: ConsultationField,
    pub description: String,
    pub background: String,
    pub expectation: String,
    pub reward: u64,
    pub mode: ConsultationMode,
    #[serde(default)]
    pub city: Option<String>,
    pub deadline: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub model_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationApplication {
    pub id: String,
    pub consultation_id: String,
    pub expert: Expert,
    pub proposal: String,
    pub estimated_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quotation: Option<u64>,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
}

impl Record for ConsultationApplication {
    const ENTITY: &'static str = "ConsultationApplication";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyConsultation {
    pub proposal: String,
    pub estimated_time: String,
    #[serde(default)]
    pub quotation: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectExpert {
    pub application_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateConsultationStatus {
    pub status: ConsultationStatus,
}

/// Experts serving one field, best rated first.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ExpertQuery {
    pub field: Selector<ConsultationField>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultationStats {
    pub total_consultations: u64,
    pub total_experts: u64,
    pub avg_reward: u64,
    /// Completed share of closed consultations.
    pub success_rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expert_serializes_flat_profile() {
        let expert = Expert {
            user: UserInfo::new("e1", "Expert", "a.png"),
            title: None,
            company: None,
            experience: 3,
            expertise: vec![],
            fields: vec![ConsultationField::Career],
            consult_count: 0,
            rating: 4.5,
            response_rate: 0.9,
            hourly_rate: None,
        };
        let json = serde_json::to_value(&expert).unwrap();
        assert_eq!(json["id"], "e1");
        assert_eq!(json["name"], "Expert");
        assert_eq!(json["fields"][0], "career");
        assert_eq!(json["responseRate"], 0.9);
    }

    #[test]
    fn in_progress_uses_camel_case_on_the_wire() {
        let status: ConsultationStatus = serde_json::from_str(r#""inProgress""#).unwrap();
        assert_eq!(status, ConsultationStatus::InProgress);
        assert_eq!(status.to_string(), "inProgress");
    }

    #[test]
    fn open_cannot_jump_to_completed() {
        assert!(ConsultationStatus::Open
            .transition(ConsultationStatus::Completed)
            .is_err());
        assert!(ConsultationStatus::Matched
            .transition(ConsultationStatus::InProgress)
            .is_ok());
    }
}
