//! # TopicService
//!
//! Topics a user is thinking through, their lifecycle and the thinking
//! model chosen to frame them.

use std::sync::Arc;

use chrono::Utc;
use domains::errors::{DomainError, Result};
use domains::models::*;
use domains::ports::{Mutation, Repositories, Store};
use domains::query::{run_query, Page};

use crate::{ensure_can_modify, model_name, ServiceOptions};

const DEFAULT_PRIORITY: u8 = 2;

pub struct TopicService {
    topics: Arc<dyn Store<Topic>>,
    models: Arc<dyn Store<ThinkingModel>>,
    options: ServiceOptions,
}

impl TopicService {
    pub fn new(repos: &Repositories, options: ServiceOptions) -> Self {
        Self {
            topics: repos.topics.clone(),
            models: repos.models.clone(),
            options,
        }
    }

    /// Admins see every topic, members only their own.
    pub async fn list(&self, caller: &Principal, mut query: TopicQuery) -> Result<Page<Topic>> {
        if !caller.is_admin() {
            query.owner_id = Some(caller.user_id.clone());
        }
        self.query(query).await
    }

    pub async fn my(&self, caller: &Principal, mut query: TopicQuery) -> Result<Page<Topic>> {
        query.owner_id = Some(caller.user_id.clone());
        self.query(query).await
    }

    pub async fn detail(&self, caller: &Principal, id: &str) -> Result<Topic> {
        let t = self.topics.get(id).await?;
        ensure_can_modify(caller, &t.owner_id, "topic")?;
        Ok(t)
    }

    pub async fn create(&self, caller: &Principal, input: CreateTopic) -> Result<Topic> {
        require_text("title", &input.title)?;
        let priority = validate_priority(input.priority.unwrap_or(DEFAULT_PRIORITY))?;
        let now = Utc::now();
        let topic = Topic {
            id: new_id(),
            title: input.title,
            description: input.description,
            background: input.background,
            goal: input.goal,
            constraints: input.constraints,
            status: if input.draft {
                TopicStatus::Draft
            } else {
                TopicStatus::InProgress
            },
            owner_id: caller.user_id.clone(),
            model_id: None,
            model_name: None,
            priority,
            tags: input.tags,
            analysis_count: 0,
            action_count: 0,
            deadline: input.deadline,
            completed_at: None,
            created_at: now,
            updated_at: now,
            lineage: AnalysisLineage::default(),
        };
        let t = self.topics.insert(topic).await?;
        tracing::info!(topic_id = %t.id, owner = %t.owner_id, status = %t.status, "topic created");
        Ok(t)
    }

    pub async fn update(&self, caller: &Principal, id: &str, input: UpdateTopic) -> Result<Topic> {
        if let Some(title) = &input.title {
            require_text("title", title)?;
        }
        if let Some(priority) = input.priority {
            validate_priority(priority)?;
        }
        self.mutate(
            caller,
            id,
            Box::new(move |t: &mut Topic| {
                input.apply(t, Utc::now());
                Ok(())
            }),
        )
        .await
    }

    /// Deletes the listed topics. Every id is checked before anything is
    /// removed. Actions keep their `topicId` and `topicTitle`.
    pub async fn delete(&self, caller: &Principal, ids: &[String]) -> Result<usize> {
        for id in ids {
            let t = self.topics.get(id).await?;
            ensure_can_modify(caller, &t.owner_id, "topic")?;
        }
        for id in ids {
            self.topics.remove(id).await?;
        }
        tracing::info!(count = ids.len(), by = %caller.user_id, "topics deleted");
        Ok(ids.len())
    }

    pub async fn update_status(
        &self,
        caller: &Principal,
        id: &str,
        input: UpdateTopicStatus,
    ) -> Result<Topic> {
        let t = self
            .mutate(
                caller,
                id,
                Box::new(move |t: &mut Topic| {
                    let now = Utc::now();
                    t.status = t.status.transition(input.status)?;
                    t.completed_at = match t.status {
                        TopicStatus::Completed => Some(t.completed_at.unwrap_or(now)),
                        TopicStatus::Archived => t.completed_at,
                        _ => None,
                    };
                    t.updated_at = now;
                    Ok(())
                }),
            )
            .await?;
        tracing::info!(topic_id = %t.id, status = %t.status, "topic status changed");
        Ok(t)
    }

    pub async fn complete(&self, caller: &Principal, id: &str) -> Result<Topic> {
        self.update_status(caller, id, UpdateTopicStatus { status: TopicStatus::Completed })
            .await
    }

    pub async fn archive(&self, caller: &Principal, id: &str) -> Result<Topic> {
        self.update_status(caller, id, UpdateTopicStatus { status: TopicStatus::Archived })
            .await
    }

    pub async fn reopen(&self, caller: &Principal, id: &str) -> Result<Topic> {
        self.update_status(caller, id, UpdateTopicStatus { status: TopicStatus::InProgress })
            .await
    }

    pub async fn select_model(
        &self,
        caller: &Principal,
        id: &str,
        input: SelectModel,
    ) -> Result<Topic> {
        let name = model_name(self.models.as_ref(), Some(&input.model_id))
            .await?
            .ok_or_else(|| DomainError::Validation("modelId must not be empty".into()))?;
        self.mutate(
            caller,
            id,
            Box::new(move |t: &mut Topic| {
                t.model_id = Some(input.model_id);
                t.model_name = Some(name);
                t.updated_at = Utc::now();
                Ok(())
            }),
        )
        .await
    }

    pub async fn remove_model(&self, caller: &Principal, id: &str) -> Result<Topic> {
        self.mutate(
            caller,
            id,
            Box::new(|t: &mut Topic| {
                t.model_id = None;
                t.model_name = None;
                t.updated_at = Utc::now();
                Ok(())
            }),
        )
        .await
    }

    pub async fn statistics(&self, caller: &Principal) -> Result<TopicStatistics> {
        let rows: Vec<Topic> = self
            .topics
            .list()
            .await?
            .into_iter()
            .filter(|t| caller.is_admin() || t.owner_id == caller.user_id)
            .collect();
        Ok(TopicStatistics::tally(&rows))
    }

    async fn query(&self, query: TopicQuery) -> Result<Page<Topic>> {
        let rows = self.topics.list().await?;
        let page = run_query(rows, &query, self.options.max_page_size);
        tracing::debug!(total = page.total, owner = ?query.owner_id, "listed topics");
        Ok(page)
    }

    async fn mutate(&self, caller: &Principal, id: &str, edit: Mutation<Topic>) -> Result<Topic> {
        let caller = caller.clone();
        self.topics
            .update(
                id,
                Box::new(move |t: &mut Topic| {
                    ensure_can_modify(&caller, &t.owner_id, "topic")?;
                    edit(t)
                }),
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{admin, backend, member, options};
    use domains::query::Selector;
    use storage_adapters::fixtures::DEMO_OWNER_ID;

    fn owner() -> Principal {
        member(DEMO_OWNER_ID).principal
    }

    fn service() -> TopicService {
        TopicService::new(&backend().repositories(), options())
    }

    #[tokio::test]
    async fn listing_is_scoped_to_the_caller() {
        let svc = service();
        let page = svc.list(&owner(), TopicQuery::default()).await.unwrap();
        let ids: Vec<_> = page.list.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["t4", "t1", "t2", "t3"]);
        assert_eq!(svc.list(&member("u9").principal, TopicQuery::default()).await.unwrap().total, 0);
        assert_eq!(svc.list(&admin().principal, TopicQuery::default()).await.unwrap().total, 4);

        let in_progress = TopicQuery {
            status: Selector::Only(TopicStatus::InProgress),
            ..TopicQuery::default()
        };
        assert_eq!(svc.my(&owner(), in_progress).await.unwrap().total, 2);
    }

    #[tokio::test]
    async fn create_validates_priority_and_honours_draft() {
        let svc = service();
        let bad = CreateTopic {
            title: "Move cities?".into(),
            priority: Some(5),
            ..CreateTopic::default()
        };
        assert!(matches!(
            svc.create(&owner(), bad).await,
            Err(DomainError::Validation(_))
        ));

        let draft = CreateTopic {
            title: "Move cities?".into(),
            draft: true,
            ..CreateTopic::default()
        };
        let t = svc.create(&owner(), draft).await.unwrap();
        assert_eq!(t.status, TopicStatus::Draft);
        assert_eq!(t.priority, DEFAULT_PRIORITY);
    }

    #[tokio::test]
    async fn complete_archive_reopen_cycle() {
        let svc = service();
        let p = owner();
        let t = svc.complete(&p, "t1").await.unwrap();
        assert_eq!(t.status, TopicStatus::Completed);
        assert!(t.completed_at.is_some());

        let t = svc.archive(&p, "t1").await.unwrap();
        assert_eq!(t.status, TopicStatus::Archived);

        let t = svc.reopen(&p, "t1").await.unwrap();
        assert_eq!(t.status, TopicStatus::InProgress);
        assert!(t.completed_at.is_none());

        let err = svc.complete(&p, "t4").await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn models_are_checked_before_selection() {
        let svc = service();
        let p = owner();
        let t = svc
            .select_model(&p, "t4", SelectModel { model_id: "6".into() })
            .await
            .unwrap();
        assert_eq!(t.model_name.as_deref(), Some("六顶思考帽"));

        let err = svc
            .select_model(&p, "t4", SelectModel { model_id: "404".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let t = svc.remove_model(&p, "t4").await.unwrap();
        assert!(t.model_id.is_none() && t.model_name.is_none());
    }

    #[tokio::test]
    async fn strangers_cannot_touch_topics() {
        let svc = service();
        let stranger = member("u9").principal;
        assert!(matches!(
            svc.detail(&stranger, "t1").await,
            Err(DomainError::Forbidden(_))
        ));
        let err = svc.delete(&stranger, &["t1".into()]).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
        assert_eq!(svc.delete(&owner(), &["t1".into(), "t2".into()]).await.unwrap(), 2);
        assert!(matches!(
            svc.detail(&owner(), "t1").await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn statistics_count_each_status() {
        let stats = service().statistics(&owner()).await.unwrap();
        assert_eq!(
            stats,
            TopicStatistics {
                total: 4,
                draft_count: 1,
                progress_count: 2,
                complete_count: 1,
                archive_count: 0,
            }
        );
    }
}
