//! Analyses: one user's worked application of a thinking model to a topic.
//! Every save under the same topic and model is a new version; one version
//! per pair is current.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Record;
use crate::errors::{DomainError, Result};
use crate::query::{desc, ListQuery};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub id: String,
    pub topic_id: String,
    pub model_id: String,
    /// Snapshot taken when the version was created.
    pub model_name: String,
    /// The filled-in model template, a JSON object.
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_analysis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_suggestions: Option<String>,
    /// Starts at 1 for each topic and model pair.
    pub version: u32,
    /// Derived at read time from the topic's lineage.
    #[serde(default)]
    pub is_current: bool,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Analysis {
    const ENTITY: &'static str = "Analysis";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Analysis {
    pub fn with_current(mut self, lineage: &AnalysisLineage) -> Self {
        self.is_current = lineage.current(&self.model_id) == Some(self.id.as_str());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ModelLine {
    last_version: u32,
    current: Option<String>,
}

/// Per-model version counter and current pointer. Lives on the topic row
/// so numbering and the current flag change under one lock.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalysisLineage {
    lines: HashMap<String, ModelLine>,
}

impl AnalysisLineage {
    /// Rebuilds from stored rows: the highest version of each model is
    /// current.
    pub fn from_rows<'a>(rows: impl IntoIterator<Item = &'a Analysis>) -> Self {
        let mut lineage = Self::default();
        for a in rows {
            let line = lineage.lines.entry(a.model_id.clone()).or_default();
            if a.version > line.last_version {
                line.last_version = a.version;
                line.current = Some(a.id.clone());
            }
        }
        lineage
    }

    /// Allocates the next version for `model_id` and makes `analysis_id`
    /// current.
    pub fn advance(&mut self, model_id: &str, analysis_id: &str) -> u32 {
        let line = self.lines.entry(model_id.to_owned()).or_default();
        line.last_version += 1;
        line.current = Some(analysis_id.to_owned());
        line.last_version
    }

    pub fn last_version(&self, model_id: &str) -> u32 {
        self.lines.get(model_id).map_or(0, |l| l.last_version)
    }

    pub fn current(&self, model_id: &str) -> Option<&str> {
        self.lines.get(model_id)?.current.as_deref()
    }

    pub fn set_current(&mut self, model_id: &str, analysis_id: &str) {
        self.lines.entry(model_id.to_owned()).or_default().current = Some(analysis_id.to_owned());
    }

    /// Drops the current pointer when it names a deleted version. Version
    /// numbers are never reused.
    pub fn forget(&mut self, model_id: &str, analysis_id: &str) {
        if let Some(line) = self.lines.get_mut(model_id) {
            if line.current.as_deref() == Some(analysis_id) {
                line.current = None;
            }
        }
    }
}

/// Empty content becomes `{}`; anything else must parse as a JSON object.
pub fn validate_content(raw: Option<String>) -> Result<String> {
    let raw = match raw {
        Some(raw) if !raw.trim().is_empty() => raw,
        _ => return Ok("{}".to_owned()),
    };
    match serde_json::from_str::<serde_json::Value>(&raw) {
        Ok(serde_json::Value::Object(_)) => Ok(raw),
        Ok(_) => Err(DomainError::Validation("content must be a JSON object".into())),
        Err(err) => Err(DomainError::Validation(format!("content is not valid JSON: {err}"))),
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalysisQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub topic_id: Option<String>,
    pub model_id: Option<String>,
    /// Admin-only filter; members are pinned to themselves.
    pub user_id: Option<String>,
    /// Applied after `isCurrent` is derived.
    pub is_current: Option<bool>,
}

impl ListQuery<Analysis> for AnalysisQuery {
    fn matches(&self, a: &Analysis) -> bool {
        self.topic_id.as_ref().map_or(true, |t| &a.topic_id == t)
            && self.model_id.as_ref().map_or(true, |m| &a.model_id == m)
            && self.user_id.as_ref().map_or(true, |u| &a.user_id == u)
            && self.is_current.map_or(true, |c| a.is_current == c)
    }

    /// Newest first; same-instant saves fall back to the higher version.
    fn compare(&self, a: &Analysis, b: &Analysis) -> Ordering {
        desc(a.created_at, b.created_at).then_with(|| desc(a.version, b.version))
    }

    fn paging(&self) -> (Option<u32>, Option<u32>) {
        (self.page, self.page_size)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAnalysis {
    pub topic_id: String,
    pub model_id: String,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAnalysis {
    pub id: String,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetCurrentAnalysis {
    pub id: String,
}

/// `GET /thinking/analysis/current` parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicModelRef {
    pub topic_id: String,
    pub model_id: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicRef {
    pub topic_id: String,
}

/// Every version of one topic and model pair, newest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisHistory {
    pub topic_id: String,
    pub model_id: String,
    pub model_name: String,
    pub versions: Vec<Analysis>,
}
