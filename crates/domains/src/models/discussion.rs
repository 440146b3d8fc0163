//! Discussions and their two-level comment trees.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use super::{Reactions, Record, UserInfo};
use crate::query::{desc, keyword_matches, ListQuery, Selector};

/// Summary length used when the author does not supply one.
pub const SUMMARY_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DiscussionCategory {
    Inspiration,
    Methodology,
    Case,
    Question,
    Share,
}

/// Travels as a number on the wire: `0` draft, `1` published, `2` closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiscussionStatus {
    Draft,
    #[default]
    Published,
    Closed,
}

impl DiscussionStatus {
    pub fn code(self) -> u8 {
        match self {
            Self::Draft => 0,
            Self::Published => 1,
            Self::Closed => 2,
        }
    }
}

impl TryFrom<u8> for DiscussionStatus {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Draft),
            1 => Ok(Self::Published),
            2 => Ok(Self::Closed),
            other => Err(format!("unknown discussion status {other}")),
        }
    }
}

impl Serialize for DiscussionStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

impl<'de> Deserialize<'de> for DiscussionStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = u8::deserialize(deserializer)?;
        Self::try_from(code).map_err(de::Error::custom)
    }
}

/// A user-started thread of conversation, optionally tied to a thinking model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discussion {
    pub id: String,
    pub title: String,
    pub content: String,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    pub user: UserInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    pub category: DiscussionCategory,
    pub tags: Vec<String>,
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
    pub favorite_count: u64,
    /// Pinned: sorts ahead of everything else in the default order.
    pub is_top: bool,
    pub is_featured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_liked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_favorited: Option<bool>,
    pub status: DiscussionStatus,
    pub publish_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub likes: Reactions,
    #[serde(skip)]
    pub favorites: Reactions,
}

impl Record for Discussion {
    const ENTITY: &'static str = "Discussion";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Discussion {
    /// Fills the viewer-specific flags. Anonymous viewers get none.
    pub fn for_viewer(mut self, viewer: Option<&str>) -> Self {
        self.is_liked = viewer.map(|v| self.likes.contains(v));
        self.is_favorited = viewer.map(|v| self.favorites.contains(v));
        self
    }
}

/// First [`SUMMARY_CHARS`] characters of `content`.
pub fn summarize(content: &str) -> String {
    content.chars().take(SUMMARY_CHARS).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum DiscussionSort {
    /// Pinned first, then newest publish time.
    #[default]
    Latest,
    Popular,
    MostCommented,
    MostLiked,
}

impl From<String> for DiscussionSort {
    fn from(value: String) -> Self {
        match value.as_str() {
            "popular" => Self::Popular,
            "mostCommented" => Self::MostCommented,
            "mostLiked" => Self::MostLiked,
            _ => Self::Latest,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DiscussionQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub category: Selector<DiscussionCategory>,
    /// Matches title, content, author name and tags.
    pub keyword: Option<String>,
    pub model_id: Option<String>,
    pub user_id: Option<String>,
    pub sort_by: DiscussionSort,
    /// Authors see their own drafts when listing by their own `userId`.
    #[serde(skip)]
    pub viewer: Option<String>,
}

impl ListQuery<Discussion> for DiscussionQuery {
    fn matches(&self, d: &Discussion) -> bool {
        let own_listing = self.user_id.is_some() && self.user_id == self.viewer;
        keyword_matches(
            self.keyword.as_deref(),
            [d.title.as_str(), d.content.as_str(), d.user.name.as_str()]
                .into_iter()
                .chain(d.tags.iter().map(String::as_str)),
        ) && self.category.matches(&d.category)
            && self.model_id.as_ref().map_or(true, |m| d.model_id.as_ref() == Some(m))
            && self.user_id.as_ref().map_or(true, |u| &d.user.id == u)
            && (own_listing || d.status == DiscussionStatus::Published)
    }

    fn compare(&self, a: &Discussion, b: &Discussion) -> Ordering {
        match self.sort_by {
            DiscussionSort::Popular => desc(a.view_count, b.view_count),
            DiscussionSort::MostCommented => desc(a.comment_count, b.comment_count),
            DiscussionSort::MostLiked => desc(a.like_count, b.like_count),
            DiscussionSort::Latest => {
                desc(a.is_top, b.is_top).then_with(|| desc(a.publish_time, b.publish_time))
            }
        }
    }

    fn paging(&self) -> (Option<u32>, Option<u32>) {
        (self.page, self.page_size)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDiscussion {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub cover: Option<String>,
    pub category: DiscussionCategory,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub model_id: Option<String>,
    #[serde(default)]
    pub status: Option<DiscussionStatus>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateDiscussion {
    pub title: Option<String>,
    pub content: Option<String>,
    pub summary: Option<String>,
    pub cover: Option<String>,
    pub category: Option<DiscussionCategory>,
    pub tags: Option<Vec<String>>,
    pub model_id: Option<String>,
    pub status: Option<DiscussionStatus>,
}

impl UpdateDiscussion {
    /// Overwrites every supplied field and refreshes `updated_at`.
    pub fn apply(self, d: &mut Discussion, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            d.title = title;
        }
        if let Some(content) = self.content {
            d.content = content;
        }
        if let Some(summary) = self.summary {
            d.summary = summary;
        }
        if self.cover.is_some() {
            d.cover = self.cover;
        }
        if let Some(category) = self.category {
            d.category = category;
        }
        if let Some(tags) = self.tags {
            d.tags = tags;
        }
        if self.model_id.is_some() {
            d.model_id = self.model_id;
        }
        if let Some(status) = self.status {
            if status == DiscussionStatus::Published && d.status == DiscussionStatus::Draft {
                d.publish_time = now;
            }
            d.status = status;
        }
        d.updated_at = now;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeState {
    pub liked: bool,
    pub like_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteState {
    pub favorited: bool,
    pub favorite_count: u64,
}

/// A top-level comment owns its replies; replies never nest further.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub discussion_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to_name: Option<String>,
    pub content: String,
    pub user: UserInfo,
    pub like_count: u64,
    pub reply_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_liked: Option<bool>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub replies: Vec<Comment>,
    #[serde(skip)]
    pub likes: Reactions,
}

impl Record for Comment {
    const ENTITY: &'static str = "Comment";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Comment {
    pub fn for_viewer(mut self, viewer: Option<&str>) -> Self {
        self.is_liked = viewer.map(|v| self.likes.contains(v));
        self.replies = self
            .replies
            .into_iter()
            .map(|reply| reply.for_viewer(viewer))
            .collect();
        self
    }

    /// Finds `id` in this comment or its replies.
    pub fn find_mut(&mut self, id: &str) -> Option<&mut Comment> {
        if self.id == id {
            return Some(self);
        }
        self.replies.iter_mut().find(|reply| reply.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.id == id || self.replies.iter().any(|reply| reply.id == id)
    }
}

/// Top-level comments of one discussion, oldest first.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CommentQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    /// When set, list the replies under this comment instead.
    pub parent_id: Option<String>,
    #[serde(skip)]
    pub discussion_id: String,
}

impl ListQuery<Comment> for CommentQuery {
    fn matches(&self, c: &Comment) -> bool {
        c.discussion_id == self.discussion_id && c.parent_id == self.parent_id
    }

    fn compare(&self, a: &Comment, b: &Comment) -> Ordering {
        a.created_at.cmp(&b.created_at)
    }

    fn paging(&self) -> (Option<u32>, Option<u32>) {
        (self.page, self.page_size)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateComment {
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub reply_to_id: Option<String>,
    pub content: String,
}
