//! # DiscussionService
//!
//! Discussions, their two-level comment trees, and the sidebar lookups
//! (hot tags, active users).

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use domains::errors::{DomainError, Result};
use domains::models::*;
use domains::ports::{Repositories, Store};
use domains::query::{run_query, Page};

use crate::{ensure_can_modify, model_name, ServiceOptions};

const HOT_TAG_LIMIT: usize = 10;
const ACTIVE_USER_LIMIT: usize = 5;

pub struct DiscussionService {
    discussions: Arc<dyn Store<Discussion>>,
    comments: Arc<dyn Store<Comment>>,
    models: Arc<dyn Store<ThinkingModel>>,
    options: ServiceOptions,
}

impl DiscussionService {
    pub fn new(repos: &Repositories, options: ServiceOptions) -> Self {
        Self {
            discussions: repos.discussions.clone(),
            comments: repos.comments.clone(),
            models: repos.models.clone(),
            options,
        }
    }

    pub async fn list(
        &self,
        mut query: DiscussionQuery,
        viewer: Option<&str>,
    ) -> Result<Page<Discussion>> {
        query.viewer = viewer.map(str::to_owned);
        let rows = self.discussions.list().await?;
        let page = run_query(rows, &query, self.options.max_page_size);
        tracing::debug!(total = page.total, page = page.page, "listed discussions");
        Ok(page.map(|d| d.for_viewer(viewer)))
    }

    /// Returns the discussion and counts the view.
    pub async fn detail(&self, id: &str, viewer: Option<&str>) -> Result<Discussion> {
        let d = self
            .discussions
            .update(
                id,
                Box::new(|d: &mut Discussion| {
                    d.view_count += 1;
                    Ok(())
                }),
            )
            .await?;
        Ok(d.for_viewer(viewer))
    }

    pub async fn create(&self, actor: &Actor, input: CreateDiscussion) -> Result<Discussion> {
        require_text("title", &input.title)?;
        require_text("content", &input.content)?;
        let linked_model = model_name(self.models.as_ref(), input.model_id.as_deref()).await?;
        let now = Utc::now();
        let summary = input
            .summary
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| summarize(&input.content));
        let discussion = Discussion {
            id: new_id(),
            title: input.title,
            content: input.content,
            summary,
            cover: input.cover,
            user: actor.profile.clone(),
            model_id: input.model_id.filter(|_| linked_model.is_some()),
            model_name: linked_model,
            category: input.category,
            tags: input.tags,
            view_count: 0,
            like_count: 0,
            comment_count: 0,
            favorite_count: 0,
            is_top: false,
            is_featured: false,
            is_liked: None,
            is_favorited: None,
            status: input.status.unwrap_or_default(),
            publish_time: now,
            created_at: now,
            updated_at: now,
            likes: Reactions::default(),
            favorites: Reactions::default(),
        };
        let d = self.discussions.insert(discussion).await?;
        tracing::info!(discussion_id = %d.id, author = %actor.id(), "discussion created");
        Ok(d.for_viewer(Some(actor.id())))
    }

    pub async fn update(
        &self,
        actor: &Actor,
        id: &str,
        input: UpdateDiscussion,
    ) -> Result<Discussion> {
        if let Some(title) = &input.title {
            require_text("title", title)?;
        }
        let linked_model = model_name(self.models.as_ref(), input.model_id.as_deref()).await?;
        let caller = actor.principal.clone();
        let d = self
            .discussions
            .update(
                id,
                Box::new(move |d: &mut Discussion| {
                    ensure_can_modify(&caller, &d.user.id, "discussion")?;
                    if linked_model.is_some() {
                        d.model_name = linked_model;
                    }
                    input.apply(d, Utc::now());
                    Ok(())
                }),
            )
            .await?;
        Ok(d.for_viewer(Some(actor.id())))
    }

    /// Deletes the discussion and every comment under it.
    pub async fn delete(&self, actor: &Actor, id: &str) -> Result<()> {
        let d = self.discussions.get(id).await?;
        ensure_can_modify(&actor.principal, &d.user.id, "discussion")?;
        self.discussions.remove(id).await?;
        let discussion_id = id.to_owned();
        let removed = self
            .comments
            .remove_where(Box::new(move |c: &Comment| c.discussion_id == discussion_id))
            .await?;
        tracing::info!(discussion_id = %id, comments = removed, "discussion deleted");
        Ok(())
    }

    pub async fn toggle_like(&self, user_id: &str, id: &str) -> Result<LikeState> {
        let user = user_id.to_owned();
        let d = self
            .discussions
            .update(
                id,
                Box::new(move |d: &mut Discussion| {
                    d.likes.toggle(&user, &mut d.like_count);
                    Ok(())
                }),
            )
            .await?;
        Ok(LikeState {
            liked: d.likes.contains(user_id),
            like_count: d.like_count,
        })
    }

    pub async fn toggle_favorite(&self, user_id: &str, id: &str) -> Result<FavoriteState> {
        let user = user_id.to_owned();
        let d = self
            .discussions
            .update(
                id,
                Box::new(move |d: &mut Discussion| {
                    d.favorites.toggle(&user, &mut d.favorite_count);
                    Ok(())
                }),
            )
            .await?;
        Ok(FavoriteState {
            favorited: d.favorites.contains(user_id),
            favorite_count: d.favorite_count,
        })
    }

    /// Top-level comments of a discussion, or the replies under `parentId`.
    pub async fn comments(
        &self,
        discussion_id: &str,
        mut query: CommentQuery,
        viewer: Option<&str>,
    ) -> Result<Page<Comment>> {
        self.discussions.get(discussion_id).await?;
        query.discussion_id = discussion_id.to_owned();
        let rows = match query.parent_id.as_deref() {
            Some(parent_id) => self.comments.get(parent_id).await?.replies,
            None => self.comments.list().await?,
        };
        let page = run_query(rows, &query, self.options.max_page_size);
        Ok(page.map(|c| c.for_viewer(viewer)))
    }

    /// Adds a comment. A reply to a reply hangs off the top-level comment,
    /// addressed to the author of the reply it answers.
    pub async fn create_comment(
        &self,
        actor: &Actor,
        discussion_id: &str,
        input: CreateComment,
    ) -> Result<Comment> {
        require_text("content", &input.content)?;
        self.discussions.get(discussion_id).await?;

        let now = Utc::now();
        let mut comment = Comment {
            id: new_id(),
            discussion_id: discussion_id.to_owned(),
            parent_id: None,
            reply_to_id: None,
            reply_to_name: None,
            content: input.content,
            user: actor.profile.clone(),
            like_count: 0,
            reply_count: 0,
            is_liked: None,
            created_at: now,
            replies: Vec::new(),
            likes: Reactions::default(),
        };

        match input.parent_id {
            Some(parent_id) => {
                let thread = self.thread_of(discussion_id, &parent_id).await?;
                comment.parent_id = Some(thread.id.clone());
                let answered = thread
                    .replies
                    .iter()
                    .find(|r| r.id == parent_id)
                    .map(|r| r.user.clone());
                let addressee = match input.reply_to_id {
                    Some(user_id) => thread
                        .replies
                        .iter()
                        .map(|r| &r.user)
                        .chain(std::iter::once(&thread.user))
                        .find(|u| u.id == user_id)
                        .cloned(),
                    None => answered,
                };
                if let Some(user) = addressee {
                    comment.reply_to_id = Some(user.id);
                    comment.reply_to_name = Some(user.name);
                }
                let reply = comment.clone();
                self.comments
                    .update(
                        &thread.id,
                        Box::new(move |parent: &mut Comment| {
                            parent.replies.push(reply);
                            parent.reply_count += 1;
                            Ok(())
                        }),
                    )
                    .await?;
                self.bump_comment_count(discussion_id).await?;
            }
            None => {
                self.bump_comment_count(discussion_id).await?;
                self.comments.insert(comment.clone()).await?;
            }
        }
        tracing::info!(comment_id = %comment.id, discussion_id, "comment created");
        Ok(comment.for_viewer(Some(actor.id())))
    }

    pub async fn toggle_comment_like(&self, user_id: &str, comment_id: &str) -> Result<LikeState> {
        let thread = self
            .comments
            .list()
            .await?
            .into_iter()
            .find(|c| c.contains(comment_id))
            .ok_or_else(|| DomainError::not_found(Comment::ENTITY, comment_id))?;
        let (user, target) = (user_id.to_owned(), comment_id.to_owned());
        let updated = self
            .comments
            .update(
                &thread.id,
                Box::new(move |c: &mut Comment| {
                    let node = c
                        .find_mut(&target)
                        .ok_or_else(|| DomainError::not_found(Comment::ENTITY, target.as_str()))?;
                    node.likes.toggle(&user, &mut node.like_count);
                    Ok(())
                }),
            )
            .await?;
        let node = if updated.id == comment_id {
            Some(&updated)
        } else {
            updated.replies.iter().find(|r| r.id == comment_id)
        };
        node.map(|c| LikeState {
            liked: c.likes.contains(user_id),
            like_count: c.like_count,
        })
        .ok_or_else(|| DomainError::not_found(Comment::ENTITY, comment_id))
    }

    /// The ten most used tags on published discussions. Ties keep the
    /// order in which tags first appear.
    pub async fn hot_tags(&self) -> Result<Vec<String>> {
        let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
        let mut seen = 0;
        for d in self.published().await? {
            for tag in d.tags {
                let entry = counts.entry(tag).or_insert_with(|| {
                    seen += 1;
                    (0, seen)
                });
                entry.0 += 1;
            }
        }
        let mut ranked: Vec<(String, (usize, usize))> = counts.into_iter().collect();
        ranked.sort_by(|(_, (ca, fa)), (_, (cb, fb))| cb.cmp(ca).then(fa.cmp(fb)));
        Ok(ranked
            .into_iter()
            .take(HOT_TAG_LIMIT)
            .map(|(tag, _)| tag)
            .collect())
    }

    /// Distinct authors of published discussions, most recent first.
    pub async fn active_users(&self) -> Result<Vec<UserInfo>> {
        let mut rows = self.published().await?;
        rows.sort_by(|a, b| b.publish_time.cmp(&a.publish_time));
        let mut users: Vec<UserInfo> = Vec::new();
        for d in rows {
            if users.len() == ACTIVE_USER_LIMIT {
                break;
            }
            if !users.iter().any(|u| u.id == d.user.id) {
                users.push(d.user);
            }
        }
        Ok(users)
    }

    async fn published(&self) -> Result<Vec<Discussion>> {
        Ok(self
            .discussions
            .list()
            .await?
            .into_iter()
            .filter(|d| d.status == DiscussionStatus::Published)
            .collect())
    }

    async fn thread_of(&self, discussion_id: &str, comment_id: &str) -> Result<Comment> {
        self.comments
            .list()
            .await?
            .into_iter()
            .find(|c| c.discussion_id == discussion_id && c.contains(comment_id))
            .ok_or_else(|| DomainError::not_found(Comment::ENTITY, comment_id))
    }

    async fn bump_comment_count(&self, discussion_id: &str) -> Result<()> {
        self.discussions
            .update(
                discussion_id,
                Box::new(|d: &mut Discussion| {
                    d.comment_count += 1;
                    Ok(())
                }),
            )
            .await
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{admin, backend, member, options};
    use domains::query::Selector;

    fn service() -> DiscussionService {
        DiscussionService::new(&backend().repositories(), options())
    }

    fn draft(title: &str) -> CreateDiscussion {
        CreateDiscussion {
            title: title.into(),
            content: "Thinking out loud about second-order effects.".into(),
            summary: None,
            cover: None,
            category: DiscussionCategory::Inspiration,
            tags: vec!["effects".into()],
            model_id: None,
            status: None,
        }
    }

    #[tokio::test]
    async fn methodology_filter_finds_the_first_principles_thread() {
        let svc = service();
        let query = DiscussionQuery {
            category: Selector::Only(DiscussionCategory::Methodology),
            ..DiscussionQuery::default()
        };
        let page = svc.list(query, None).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.list[0].id, "1");
        assert_eq!(page.list[0].title, "如何用第一性原理思考职业发展？");
    }

    #[tokio::test]
    async fn default_order_puts_pinned_first() {
        let page = service().list(DiscussionQuery::default(), None).await.unwrap();
        let ids: Vec<_> = page.list.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["1", "5", "2", "3", "4", "6"]);
    }

    #[tokio::test]
    async fn like_toggles_per_user() {
        let svc = service();
        let first = svc.toggle_like("u1", "1").await.unwrap();
        assert_eq!(first, LikeState { liked: true, like_count: 90 });
        let other = svc.toggle_like("u2", "1").await.unwrap();
        assert_eq!(other.like_count, 91);
        let undo = svc.toggle_like("u1", "1").await.unwrap();
        assert_eq!(undo, LikeState { liked: false, like_count: 90 });
        assert!(matches!(
            svc.toggle_like("u1", "missing").await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn detail_counts_views_and_fills_viewer_flags() {
        let svc = service();
        svc.toggle_favorite("u1", "3").await.unwrap();
        let d = svc.detail("3", Some("u1")).await.unwrap();
        assert_eq!(d.view_count, 2342);
        assert_eq!(d.is_favorited, Some(true));
        assert_eq!(d.is_liked, Some(false));
    }

    #[tokio::test]
    async fn create_defaults_summary_and_prepends() {
        let svc = service();
        let author = member("u9");
        let mut input = draft("A new thread");
        input.content = "x".repeat(150);
        let d = svc.create(&author, input).await.unwrap();
        assert_eq!(d.summary.chars().count(), 100);
        assert_eq!(d.user.id, "u9");
        let page = svc.list(DiscussionQuery::default(), None).await.unwrap();
        // Pinned rows still lead; the new row is the newest unpinned one.
        assert_eq!(page.list[2].id, d.id);
        assert_eq!(page.total, 7);
    }

    #[tokio::test]
    async fn unknown_model_is_rejected() {
        let mut input = draft("With a model");
        input.model_id = Some("404".into());
        let err = service().create(&member("u1"), input).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn drafts_only_show_in_the_authors_own_listing() {
        let svc = service();
        let author = member("u7");
        let mut input = draft("Half-baked");
        input.status = Some(DiscussionStatus::Draft);
        svc.create(&author, input).await.unwrap();

        let mine = DiscussionQuery {
            user_id: Some("u7".into()),
            ..DiscussionQuery::default()
        };
        assert_eq!(svc.list(mine.clone(), Some("u7")).await.unwrap().total, 1);
        assert_eq!(svc.list(mine, Some("u8")).await.unwrap().total, 0);
    }

    #[tokio::test]
    async fn only_author_or_admin_may_edit() {
        let svc = service();
        let edit = || UpdateDiscussion {
            title: Some("Edited".into()),
            ..UpdateDiscussion::default()
        };
        let err = svc.update(&member("2"), "1", edit()).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
        assert_eq!(svc.update(&member("1"), "1", edit()).await.unwrap().title, "Edited");
        assert!(svc.update(&admin(), "1", edit()).await.is_ok());
    }

    #[tokio::test]
    async fn delete_cascades_to_comments() {
        let backend = backend();
        let svc = DiscussionService::new(&backend.repositories(), options());
        assert_eq!(backend.comments.len(), 3);
        svc.delete(&member("1"), "1").await.unwrap();
        assert!(backend.comments.is_empty());
        assert!(matches!(
            svc.detail("1", None).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn reply_bumps_parent_once_and_appends_once() {
        let svc = service();
        let reply = svc
            .create_comment(
                &member("u5"),
                "1",
                CreateComment {
                    parent_id: Some("2".into()),
                    reply_to_id: None,
                    content: "Agreed.".into(),
                },
            )
            .await
            .unwrap();
        assert_eq!(reply.parent_id.as_deref(), Some("2"));

        let replies = svc
            .comments(
                "1",
                CommentQuery {
                    parent_id: Some("2".into()),
                    ..CommentQuery::default()
                },
                None,
            )
            .await
            .unwrap();
        assert_eq!(replies.total, 2);
        let top = svc.comments("1", CommentQuery::default(), None).await.unwrap();
        let parent = top.list.iter().find(|c| c.id == "2").unwrap();
        assert_eq!(parent.reply_count, 2);
        assert_eq!(parent.replies.len(), 2);
        assert_eq!(svc.detail("1", None).await.unwrap().comment_count, 24);
    }

    #[tokio::test]
    async fn reply_to_a_reply_stays_on_two_levels() {
        let svc = service();
        let reply = svc
            .create_comment(
                &member("u5"),
                "1",
                CreateComment {
                    parent_id: Some("1-1".into()),
                    reply_to_id: None,
                    content: "Same question here.".into(),
                },
            )
            .await
            .unwrap();
        assert_eq!(reply.parent_id.as_deref(), Some("1"));
        assert_eq!(reply.reply_to_name.as_deref(), Some("逻辑大师"));
    }

    #[tokio::test]
    async fn comment_likes_reach_nested_replies() {
        let svc = service();
        let state = svc.toggle_comment_like("u1", "2-1").await.unwrap();
        assert_eq!(state, LikeState { liked: true, like_count: 7 });
        let state = svc.toggle_comment_like("u1", "2-1").await.unwrap();
        assert_eq!(state.like_count, 6);
    }

    #[tokio::test]
    async fn hot_tags_rank_by_frequency_then_first_use() {
        let tags = service().hot_tags().await.unwrap();
        assert_eq!(tags.len(), 10);
        assert_eq!(tags[0], "心理学");
        assert_eq!(tags[1], "职业发展");
    }

    #[tokio::test]
    async fn active_users_are_distinct() {
        let users = service().active_users().await.unwrap();
        let ids: Vec<_> = users.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "3", "4", "5"]);
    }
}
