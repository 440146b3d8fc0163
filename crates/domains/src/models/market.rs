//! The thinking-model marketplace: published models and their categories.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Reactions, Record, UserInfo};
use crate::query::{desc, keyword_matches, ListQuery};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModelStatus {
    Draft,
    #[default]
    Published,
    Offline,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelStats {
    pub adoptions: u64,
    pub practices: u64,
    pub discussions: u64,
    pub forks: u64,
    pub likes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThinkingModel {
    pub id: String,
    /// Unique, URL-friendly handle.
    pub code: String,
    pub title: String,
    pub description: String,
    pub cover: String,
    pub author: UserInfo,
    pub is_free: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<u64>,
    /// Category display name.
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    pub tags: Vec<String>,
    pub stats: ModelStats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub status: ModelStatus,
    /// Stamped on every publish.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forked_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_liked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_adopted: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub likes: Reactions,
    #[serde(skip)]
    pub adopters: Reactions,
    #[serde(skip)]
    pub purchasers: Reactions,
}

impl Record for ThinkingModel {
    const ENTITY: &'static str = "ThinkingModel";

    fn id(&self) -> &str {
        &self.id
    }
}

impl ThinkingModel {
    pub fn for_viewer(mut self, viewer: Option<&str>) -> Self {
        self.is_liked = viewer.map(|v| self.likes.contains(v));
        self.is_adopted = viewer.map(|v| self.adopters.contains(v));
        self
    }

    /// Adoptions plus likes, the default market ranking.
    pub fn popularity(&self) -> u64 {
        self.stats.adoptions + self.stats.likes
    }

    /// Free models, and paid ones the user bought, can be adopted.
    pub fn accessible_to(&self, user_id: &str) -> bool {
        self.is_free || self.author.id == user_id || self.purchasers.contains(user_id)
    }

    pub fn set_status(&mut self, status: ModelStatus, now: DateTime<Utc>) {
        if status == ModelStatus::Published {
            self.publish_time = Some(now);
        }
        self.status = status;
        self.updated_at = now;
    }
}

/// Lowercase, ASCII-alphanumeric words joined by `-`; empty when nothing
/// usable remains.
pub fn slugify(text: &str) -> String {
    text.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum ModelSort {
    #[default]
    Popular,
    Newest,
    MostAdopted,
    MostLiked,
}

impl From<String> for ModelSort {
    fn from(value: String) -> Self {
        match value.as_str() {
            "newest" => Self::Newest,
            "mostAdopted" => Self::MostAdopted,
            "mostLiked" => Self::MostLiked,
            _ => Self::Popular,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModelQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    /// Category name or id; `all` or empty means any.
    pub category: Option<String>,
    pub is_free: Option<bool>,
    /// Matches title, description, author name and tags.
    pub keyword: Option<String>,
    pub sort_by: ModelSort,
    /// Only honoured on the author's own listing.
    pub status: Option<ModelStatus>,
    /// Set by the `/my` listing, which shows every status.
    #[serde(skip)]
    pub author_id: Option<String>,
}

impl ListQuery<ThinkingModel> for ModelQuery {
    fn matches(&self, m: &ThinkingModel) -> bool {
        let category = self
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("all"));
        let visible = match &self.author_id {
            Some(author) => &m.author.id == author && self.status.map_or(true, |s| m.status == s),
            None => m.status == ModelStatus::Published,
        };
        visible
            && category.map_or(true, |c| m.category == c || m.category_id.as_deref() == Some(c))
            && self.is_free.map_or(true, |free| m.is_free == free)
            && keyword_matches(
                self.keyword.as_deref(),
                [m.title.as_str(), m.description.as_str(), m.author.name.as_str()]
                    .into_iter()
                    .chain(m.tags.iter().map(String::as_str)),
            )
    }

    fn compare(&self, a: &ThinkingModel, b: &ThinkingModel) -> Ordering {
        match self.sort_by {
            ModelSort::Newest => desc(a.updated_at, b.updated_at),
            ModelSort::MostAdopted => desc(a.stats.adoptions, b.stats.adoptions),
            ModelSort::MostLiked => desc(a.stats.likes, b.stats.likes),
            ModelSort::Popular => desc(a.popularity(), b.popularity()),
        }
    }

    fn paging(&self) -> (Option<u32>, Option<u32>) {
        (self.page, self.page_size)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedQuery {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

pub const DEFAULT_RECOMMENDED: usize = 4;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateModel {
    pub title: String,
    /// Derived from the title, or the id, when absent.
    #[serde(default)]
    pub code: Option<String>,
    pub description: String,
    #[serde(default)]
    pub cover: Option<String>,
    pub category_id: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub is_free: bool,
    #[serde(default)]
    pub price: Option<u64>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateModel {
    pub title: Option<String>,
    /// Uniqueness is checked by the service.
    pub code: Option<String>,
    pub description: Option<String>,
    pub cover: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_free: Option<bool>,
    pub price: Option<u64>,
    pub content: Option<String>,
    pub status: Option<ModelStatus>,
    /// Resolved against the category table by the service.
    pub category_id: Option<String>,
}

impl UpdateModel {
    pub fn apply(self, m: &mut ThinkingModel, category: Option<&Category>, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            m.title = title;
        }
        if let Some(code) = self.code {
            m.code = code;
        }
        if let Some(description) = self.description {
            m.description = description;
        }
        if let Some(cover) = self.cover {
            m.cover = cover;
        }
        if let Some(tags) = self.tags {
            m.tags = tags;
        }
        if let Some(is_free) = self.is_free {
            m.is_free = is_free;
        }
        if self.price.is_some() {
            m.price = self.price;
        }
        if m.is_free {
            m.price = None;
        }
        if self.content.is_some() {
            m.content = self.content;
        }
        if let Some(category) = category {
            m.category = category.name.clone();
            m.category_id = Some(category.id.clone());
        }
        match self.status {
            Some(status) => m.set_status(status, now),
            None => m.updated_at = now,
        }
    }
}

/// Body of `POST /model/publish`.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelRef {
    pub id: String,
}

/// Outcome of adopt and purchase.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ThinkingModel>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelLikeState {
    pub liked: bool,
    pub likes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CategoryStatus {
    #[default]
    Enabled,
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    /// `None` for top-level categories.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Roots sit at level 1.
    pub level: u32,
    /// Ancestor chain including the category itself, e.g. `/cat1/cat7/`.
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub sort: i32,
    pub status: CategoryStatus,
    /// Filled at read time from the model table.
    #[serde(default)]
    pub model_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Category {
    const ENTITY: &'static str = "Category";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Category {
    pub fn root_path(id: &str) -> String {
        format!("/{id}/")
    }

    pub fn child_path(&self, child_id: &str) -> String {
        format!("{}{child_id}/", self.path)
    }

    /// True for the category itself and everything below it.
    pub fn contains(&self, other: &Category) -> bool {
        other.path.starts_with(&self.path)
    }

    /// Ids along the path, root first.
    pub fn ancestry(&self) -> Vec<&str> {
        self.path.split('/').filter(|s| !s.is_empty()).collect()
    }

    /// Moves a subtree member whose top used to live at `old_prefix` and
    /// now lives at `new_prefix`, `level_shift` levels deeper.
    pub fn rebase(&mut self, old_prefix: &str, new_prefix: &str, level_shift: i64) {
        if let Some(rest) = self.path.strip_prefix(old_prefix) {
            self.path = format!("{new_prefix}{rest}");
            self.level = (i64::from(self.level) + level_shift).max(1) as u32;
        }
    }
}

/// A category with its children, for `/category/tree`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: Category,
    pub children: Vec<CategoryNode>,
}

/// Assembles the forest from a flat list. Siblings keep the input order;
/// categories whose parent is missing become roots.
pub fn category_tree(rows: Vec<Category>) -> Vec<CategoryNode> {
    let ids: Vec<String> = rows.iter().map(|c| c.id.clone()).collect();
    let (roots, rest): (Vec<_>, Vec<_>) = rows.into_iter().partition(|c| {
        c.parent_id
            .as_ref()
            .map_or(true, |p| !ids.contains(p))
    });
    let mut pending = rest;
    roots
        .into_iter()
        .map(|c| grow(c, &mut pending))
        .collect()
}

fn grow(category: Category, pending: &mut Vec<Category>) -> CategoryNode {
    let (mine, others): (Vec<_>, Vec<_>) = std::mem::take(pending)
        .into_iter()
        .partition(|c| c.parent_id.as_deref() == Some(category.id.as_str()));
    *pending = others;
    let children = mine.into_iter().map(|c| grow(c, pending)).collect();
    CategoryNode { category, children }
}
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategory {
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub sort: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpdateCategory {
    pub name: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub sort: Option<i32>,
    pub status: Option<CategoryStatus>,
}

/// Body of `POST /category/move`; no `parentId` moves to the top level.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveCategory {
    pub id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
}

impl UpdateCategory {
    pub fn apply(self, c: &mut Category, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            c.name = name;
        }
        if self.description.is_some() {
            c.description = self.description;
        }
        if self.icon.is_some() {
            c.icon = self.icon;
        }
        if let Some(sort) = self.sort {
            c.sort = sort;
        }
        if let Some(status) = self.status {
            c.status = status;
        }
        c.updated_at = now;
    }
}
