//! # MarketService
//!
//! The thinking-model marketplace: browsing, adoption, purchase, forking,
//! the author's publish workflow and the category hierarchy.

use std::sync::Arc;

use chrono::Utc;
use domains::errors::{DomainError, Result};
use domains::models::*;
use domains::ports::{Repositories, Store};
use domains::query::{desc, run_query, ListQuery, Page};

use crate::{ensure_admin, ensure_can_modify, ServiceOptions};

pub struct MarketService {
    models: Arc<dyn Store<ThinkingModel>>,
    categories: Arc<dyn Store<Category>>,
    options: ServiceOptions,
}

impl MarketService {
    pub fn new(repos: &Repositories, options: ServiceOptions) -> Self {
        Self {
            models: repos.models.clone(),
            categories: repos.categories.clone(),
            options,
        }
    }

    pub async fn list(&self, query: ModelQuery, viewer: Option<&str>) -> Result<Page<ThinkingModel>> {
        let rows = self.models.list().await?;
        let page = run_query(rows, &query, self.options.max_page_size);
        tracing::debug!(total = page.total, page = page.page, "listed models");
        Ok(page.map(|m| m.for_viewer(viewer)))
    }

    /// The caller's own models, drafts and offline ones included.
    pub async fn my(&self, caller: &Principal, mut query: ModelQuery) -> Result<Page<ThinkingModel>> {
        query.author_id = Some(caller.user_id.clone());
        self.list(query, Some(caller.user_id.as_str())).await
    }

    /// Unpublished models are only visible to their author and admins.
    pub async fn detail(&self, id: &str, viewer: Option<&Principal>) -> Result<ThinkingModel> {
        let m = self.models.get(id).await?;
        visible_to(m, viewer).ok_or_else(|| DomainError::not_found(ThinkingModel::ENTITY, id))
    }

    pub async fn by_code(&self, code: &str, viewer: Option<&Principal>) -> Result<ThinkingModel> {
        self.models
            .list()
            .await?
            .into_iter()
            .find(|m| m.code == code)
            .and_then(|m| visible_to(m, viewer))
            .ok_or_else(|| DomainError::not_found(ThinkingModel::ENTITY, code))
    }

    pub async fn create(&self, actor: &Actor, input: CreateModel) -> Result<ThinkingModel> {
        ensure_admin(&actor.principal)?;
        require_text("title", &input.title)?;
        let price = checked_price(input.is_free, input.price)?;
        let category = self.usable_category(&input.category_id).await?;
        let id = new_id();
        let code = match input.code.filter(|c| !c.trim().is_empty()) {
            Some(code) => {
                self.ensure_code_free(&code, None).await?;
                code
            }
            None => self.derived_code(&input.title, &id).await?,
        };
        let now = Utc::now();
        let model = ThinkingModel {
            id,
            code,
            title: input.title,
            description: input.description,
            cover: input.cover.unwrap_or_default(),
            author: actor.profile.clone(),
            is_free: input.is_free,
            price,
            category: category.name,
            category_id: Some(category.id),
            tags: input.tags,
            stats: ModelStats::default(),
            content: input.content,
            status: ModelStatus::Published,
            publish_time: Some(now),
            forked_from: None,
            is_liked: None,
            is_adopted: None,
            created_at: now,
            updated_at: now,
            likes: Reactions::default(),
            adopters: Reactions::default(),
            purchasers: Reactions::default(),
        };
        let m = self.models.insert(model).await?;
        tracing::info!(model_id = %m.id, category = %m.category, "model created");
        Ok(m)
    }

    /// Authors edit their own models; admins edit any.
    pub async fn update(
        &self,
        caller: &Principal,
        id: &str,
        input: UpdateModel,
    ) -> Result<ThinkingModel> {
        if let Some(title) = &input.title {
            require_text("title", title)?;
        }
        if let Some(code) = &input.code {
            require_text("code", code)?;
            self.ensure_code_free(code, Some(id)).await?;
        }
        let category = match input.category_id.as_deref() {
            Some(category_id) => Some(self.usable_category(category_id).await?),
            None => None,
        };
        let who = caller.clone();
        let m = self
            .models
            .update(
                id,
                Box::new(move |m: &mut ThinkingModel| {
                    ensure_can_modify(&who, &m.author.id, "model")?;
                    input.apply(m, category.as_ref(), Utc::now());
                    m.price = checked_price(m.is_free, m.price)?;
                    Ok(())
                }),
            )
            .await?;
        tracing::info!(model_id = %m.id, status = ?m.status, "model updated");
        Ok(m)
    }

    pub async fn delete(&self, caller: &Principal, id: &str) -> Result<()> {
        let m = self.models.get(id).await?;
        ensure_can_modify(caller, &m.author.id, "model")?;
        self.models.remove(id).await?;
        tracing::info!(model_id = id, "model deleted");
        Ok(())
    }

    /// Puts a draft or offline model on the market.
    pub async fn publish(&self, caller: &Principal, id: &str) -> Result<ThinkingModel> {
        self.change_status(caller, id, ModelStatus::Published).await
    }

    /// Takes a published model off the market.
    pub async fn unpublish(&self, caller: &Principal, id: &str) -> Result<ThinkingModel> {
        self.change_status(caller, id, ModelStatus::Offline).await
    }

    async fn change_status(
        &self,
        caller: &Principal,
        id: &str,
        target: ModelStatus,
    ) -> Result<ThinkingModel> {
        let who = caller.clone();
        let m = self
            .models
            .update(
                id,
                Box::new(move |m: &mut ThinkingModel| {
                    ensure_can_modify(&who, &m.author.id, "model")?;
                    match (m.status, target) {
                        (ModelStatus::Published, ModelStatus::Published) => {
                            Err(DomainError::Conflict("model is already published".into()))
                        }
                        (ModelStatus::Draft | ModelStatus::Offline, ModelStatus::Offline) => {
                            Err(DomainError::Conflict("model is not published".into()))
                        }
                        _ => {
                            m.set_status(target, Utc::now());
                            Ok(())
                        }
                    }
                }),
            )
            .await?;
        tracing::info!(model_id = id, status = ?m.status, by = %caller.user_id, "model status changed");
        Ok(m.for_viewer(Some(caller.user_id.as_str())))
    }

    /// Adds the model to the caller's toolbox. Paid models must be bought
    /// first; adopting twice is a conflict.
    pub async fn adopt(&self, user_id: &str, id: &str) -> Result<OperationResult> {
        let user = user_id.to_owned();
        let m = self
            .models
            .update(
                id,
                Box::new(move |m: &mut ThinkingModel| {
                    ensure_published(m)?;
                    if !m.accessible_to(&user) {
                        return Err(DomainError::Forbidden("purchase this model first".into()));
                    }
                    if !m.adopters.add(&user) {
                        return Err(DomainError::Conflict("model already adopted".into()));
                    }
                    m.stats.adoptions += 1;
                    Ok(())
                }),
            )
            .await?;
        tracing::info!(model_id = id, user_id, adoptions = m.stats.adoptions, "model adopted");
        Ok(OperationResult {
            success: true,
            message: Some("adopted".into()),
            data: Some(m.for_viewer(Some(user_id))),
        })
    }

    pub async fn purchase(&self, user_id: &str, id: &str) -> Result<OperationResult> {
        let user = user_id.to_owned();
        let m = self
            .models
            .update(
                id,
                Box::new(move |m: &mut ThinkingModel| {
                    ensure_published(m)?;
                    if m.is_free {
                        return Err(DomainError::Validation("free models need no purchase".into()));
                    }
                    if m.author.id == user || !m.purchasers.add(&user) {
                        return Err(DomainError::Conflict("model already owned".into()));
                    }
                    Ok(())
                }),
            )
            .await?;
        tracing::info!(model_id = id, user_id, price = ?m.price, "model purchased");
        Ok(OperationResult {
            success: true,
            message: Some("purchased".into()),
            data: Some(m.for_viewer(Some(user_id))),
        })
    }

    /// Copies an accessible model into a draft owned by the caller.
    pub async fn fork(&self, actor: &Actor, id: &str) -> Result<ThinkingModel> {
        let user = actor.id().to_owned();
        let source = self
            .models
            .update(
                id,
                Box::new(move |m: &mut ThinkingModel| {
                    ensure_published(m)?;
                    if !m.accessible_to(&user) {
                        return Err(DomainError::Forbidden("purchase this model first".into()));
                    }
                    m.stats.forks += 1;
                    Ok(())
                }),
            )
            .await?;

        let now = Utc::now();
        let copy_id = new_id();
        let copy = ThinkingModel {
            code: format!("{}-{copy_id}", source.code),
            id: copy_id,
            author: actor.profile.clone(),
            stats: ModelStats::default(),
            status: ModelStatus::Draft,
            publish_time: None,
            forked_from: Some(source.id.clone()),
            is_liked: None,
            is_adopted: None,
            created_at: now,
            updated_at: now,
            likes: Reactions::default(),
            adopters: Reactions::default(),
            purchasers: Reactions::default(),
            ..source
        };
        let m = self.models.insert(copy).await?;
        tracing::info!(model_id = %m.id, forked_from = id, owner = %actor.id(), "model forked");
        Ok(m.for_viewer(Some(actor.id())))
    }

    pub async fn toggle_like(&self, user_id: &str, id: &str) -> Result<ModelLikeState> {
        let user = user_id.to_owned();
        let m = self
            .models
            .update(
                id,
                Box::new(move |m: &mut ThinkingModel| {
                    m.likes.toggle(&user, &mut m.stats.likes);
                    Ok(())
                }),
            )
            .await?;
        Ok(ModelLikeState {
            liked: m.likes.contains(user_id),
            likes: m.stats.likes,
        })
    }

    /// Most adopted published models, optionally within one category.
    pub async fn recommended(
        &self,
        query: RecommendedQuery,
        viewer: Option<&str>,
    ) -> Result<Vec<ThinkingModel>> {
        let filter = ModelQuery {
            category: query.category,
            ..ModelQuery::default()
        };
        let mut rows: Vec<ThinkingModel> = self
            .models
            .list()
            .await?
            .into_iter()
            .filter(|m| filter.matches(m))
            .collect();
        rows.sort_by(|a, b| desc(a.stats.adoptions, b.stats.adoptions));
        rows.truncate(query.limit.unwrap_or(DEFAULT_RECOMMENDED));
        Ok(rows.into_iter().map(|m| m.for_viewer(viewer)).collect())
    }

    /// Categories by `sort`, each with its published model count.
    pub async fn categories(&self) -> Result<Vec<Category>> {
        let models = self.models.list().await?;
        let mut rows = self.categories.list().await?;
        rows.sort_by_key(|c| c.sort);
        Ok(rows
            .into_iter()
            .map(|c| with_model_count(c, &models))
            .collect())
    }

    pub async fn category(&self, id: &str) -> Result<Category> {
        let c = self.categories.get(id).await?;
        Ok(with_model_count(c, &self.models.list().await?))
    }

    /// The full hierarchy; siblings ordered by `sort`.
    pub async fn category_tree(&self) -> Result<Vec<CategoryNode>> {
        Ok(category_tree(self.categories().await?))
    }

    /// Direct children only.
    pub async fn category_children(&self, id: &str) -> Result<Vec<Category>> {
        self.categories.get(id).await?;
        Ok(self
            .categories()
            .await?
            .into_iter()
            .filter(|c| c.parent_id.as_deref() == Some(id))
            .collect())
    }

    /// Ancestors from the root down to the category itself.
    pub async fn category_path(&self, id: &str) -> Result<Vec<Category>> {
        let target = self.categories.get(id).await?;
        let rows = self.categories().await?;
        Ok(target
            .ancestry()
            .into_iter()
            .filter_map(|ancestor| rows.iter().find(|c| c.id == ancestor).cloned())
            .collect())
    }

    /// Re-parents a category and rewrites the path and level of its subtree.
    pub async fn move_category(&self, caller: &Principal, input: MoveCategory) -> Result<Category> {
        ensure_admin(caller)?;
        let moving = self.categories.get(&input.id).await?;
        let parent_id = input.parent_id.filter(|p| !p.is_empty());
        let (new_path, new_level) = match parent_id.as_deref() {
            Some(parent_id) => {
                if parent_id == moving.id {
                    return Err(DomainError::Validation(
                        "a category cannot be its own parent".into(),
                    ));
                }
                let parent = self.parent_category(parent_id).await?;
                if moving.contains(&parent) {
                    return Err(DomainError::Validation(
                        "a category cannot move below its own descendant".into(),
                    ));
                }
                (parent.child_path(&moving.id), parent.level + 1)
            }
            None => (Category::root_path(&moving.id), 1),
        };
        let old_path = moving.path.clone();
        let shift = i64::from(new_level) - i64::from(moving.level);

        let subtree: Vec<String> = self
            .categories
            .list()
            .await?
            .into_iter()
            .filter(|c| moving.contains(c))
            .map(|c| c.id)
            .collect();
        let now = Utc::now();
        for member in &subtree {
            let (old, new) = (old_path.clone(), new_path.clone());
            let parent = (member == &moving.id).then(|| parent_id.clone());
            self.categories
                .update(
                    member,
                    Box::new(move |c: &mut Category| {
                        if let Some(parent) = parent {
                            c.parent_id = parent;
                        }
                        c.rebase(&old, &new, shift);
                        c.updated_at = now;
                        Ok(())
                    }),
                )
                .await?;
        }
        tracing::info!(
            category_id = %moving.id,
            parent_id = ?parent_id,
            moved = subtree.len(),
            "category moved"
        );
        self.category(&moving.id).await
    }

    pub async fn create_category(&self, caller: &Principal, input: CreateCategory) -> Result<Category> {
        ensure_admin(caller)?;
        require_text("name", &input.name)?;
        let existing = self.categories.list().await?;
        if existing.iter().any(|c| c.name == input.name) {
            return Err(DomainError::Conflict(format!(
                "category {} already exists",
                input.name
            )));
        }
        let parent = match input.parent_id.as_deref().filter(|p| !p.is_empty()) {
            Some(parent_id) => Some(self.parent_category(parent_id).await?),
            None => None,
        };
        let next_sort = existing.iter().map(|c| c.sort).max().unwrap_or(0) + 1;
        let id = new_id();
        let now = Utc::now();
        let c = self
            .categories
            .insert(Category {
                parent_id: parent.as_ref().map(|p| p.id.clone()),
                level: parent.as_ref().map_or(1, |p| p.level + 1),
                path: parent
                    .as_ref()
                    .map_or_else(|| Category::root_path(&id), |p| p.child_path(&id)),
                id,
                name: input.name,
                description: input.description,
                icon: input.icon,
                sort: input.sort.unwrap_or(next_sort),
                status: CategoryStatus::Enabled,
                model_count: 0,
                created_at: now,
                updated_at: now,
            })
            .await?;
        tracing::info!(category_id = %c.id, name = %c.name, "category created");
        Ok(c)
    }

    /// Renaming a category renames it on every model that uses it.
    pub async fn update_category(
        &self,
        caller: &Principal,
        id: &str,
        input: UpdateCategory,
    ) -> Result<Category> {
        ensure_admin(caller)?;
        if let Some(name) = &input.name {
            require_text("name", name)?;
        }
        let c = self
            .categories
            .update(
                id,
                Box::new(move |c: &mut Category| {
                    input.apply(c, Utc::now());
                    Ok(())
                }),
            )
            .await?;

        let models = self.models.list().await?;
        for m in models.iter().filter(|m| m.category_id.as_deref() == Some(id)) {
            if m.category == c.name {
                continue;
            }
            let name = c.name.clone();
            self.models
                .update(
                    &m.id,
                    Box::new(move |m: &mut ThinkingModel| {
                        m.category = name;
                        Ok(())
                    }),
                )
                .await?;
        }
        tracing::info!(category_id = id, name = %c.name, "category updated");
        Ok(with_model_count(c, &self.models.list().await?))
    }

    /// Categories still holding models or subcategories cannot be deleted.
    pub async fn delete_category(&self, caller: &Principal, id: &str) -> Result<()> {
        ensure_admin(caller)?;
        self.categories.get(id).await?;
        let children = self
            .categories
            .list()
            .await?
            .iter()
            .filter(|c| c.parent_id.as_deref() == Some(id))
            .count();
        if children > 0 {
            return Err(DomainError::Conflict(format!(
                "category still has {children} subcategories"
            )));
        }
        let in_use = self
            .models
            .list()
            .await?
            .iter()
            .filter(|m| m.category_id.as_deref() == Some(id))
            .count();
        if in_use > 0 {
            return Err(DomainError::Conflict(format!(
                "category still holds {in_use} models"
            )));
        }
        self.categories.remove(id).await?;
        tracing::info!(category_id = id, "category deleted");
        Ok(())
    }

    async fn parent_category(&self, id: &str) -> Result<Category> {
        match self.categories.get(id).await {
            Err(DomainError::NotFound { .. }) => {
                Err(DomainError::Validation(format!("unknown parent category {id}")))
            }
            other => other,
        }
    }

    async fn ensure_code_free(&self, code: &str, except: Option<&str>) -> Result<()> {
        let taken = self
            .models
            .list()
            .await?
            .iter()
            .any(|m| m.code == code && Some(m.id.as_str()) != except);
        if taken {
            return Err(DomainError::Conflict(format!("model code {code} is taken")));
        }
        Ok(())
    }

    /// Title slug, suffixed with the id when the slug is empty or taken.
    async fn derived_code(&self, title: &str, id: &str) -> Result<String> {
        let slug = slugify(title);
        if slug.is_empty() {
            return Ok(format!("model-{id}"));
        }
        match self.ensure_code_free(&slug, None).await {
            Ok(()) => Ok(slug),
            Err(DomainError::Conflict(_)) => Ok(format!("{slug}-{id}")),
            Err(err) => Err(err),
        }
    }

    async fn usable_category(&self, id: &str) -> Result<Category> {
        match self.categories.get(id).await {
            Ok(c) if c.status == CategoryStatus::Enabled => Ok(c),
            Ok(c) => Err(DomainError::Validation(format!("category {} is disabled", c.name))),
            Err(DomainError::NotFound { .. }) => {
                Err(DomainError::Validation(format!("unknown category {id}")))
            }
            Err(err) => Err(err),
        }
    }
}

fn visible_to(m: ThinkingModel, viewer: Option<&Principal>) -> Option<ThinkingModel> {
    let visible =
        m.status == ModelStatus::Published || viewer.is_some_and(|p| p.can_modify(&m.author.id));
    visible.then(|| m.for_viewer(viewer.map(|p| p.user_id.as_str())))
}

fn ensure_published(m: &ThinkingModel) -> Result<()> {
    if m.status == ModelStatus::Published {
        Ok(())
    } else {
        Err(DomainError::Conflict("model is not published".into()))
    }
}

/// Paid models need a positive price; free ones carry none.
fn checked_price(is_free: bool, price: Option<u64>) -> Result<Option<u64>> {
    match (is_free, price) {
        (true, _) => Ok(None),
        (false, Some(p)) if p > 0 => Ok(Some(p)),
        (false, _) => Err(DomainError::Validation("paid models need a positive price".into())),
    }
}

fn with_model_count(mut c: Category, models: &[ThinkingModel]) -> Category {
    c.model_count = models
        .iter()
        .filter(|m| m.status == ModelStatus::Published && m.category_id.as_deref() == Some(&c.id))
        .count() as u64;
    c
}
