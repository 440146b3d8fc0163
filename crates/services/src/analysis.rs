//! # AnalysisService
//!
//! Versioned analyses of a topic through one thinking model. Version
//! numbers and the current pointer live on the topic row.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use domains::errors::{DomainError, Result};
use domains::models::*;
use domains::ports::{Repositories, Store};
use domains::query::{filter_sorted, run_query, Page};

use crate::{ensure_can_modify, model_name, ServiceOptions};

pub struct AnalysisService {
    analyses: Arc<dyn Store<Analysis>>,
    topics: Arc<dyn Store<Topic>>,
    models: Arc<dyn Store<ThinkingModel>>,
    options: ServiceOptions,
}

impl AnalysisService {
    pub fn new(repos: &Repositories, options: ServiceOptions) -> Self {
        Self {
            analyses: repos.analyses.clone(),
            topics: repos.topics.clone(),
            models: repos.models.clone(),
            options,
        }
    }

    /// Admins may filter by any `userId`; members only see their own.
    pub async fn list(&self, caller: &Principal, mut query: AnalysisQuery) -> Result<Page<Analysis>> {
        if !caller.is_admin() {
            query.user_id = Some(caller.user_id.clone());
        }
        let page = run_query(self.rows().await?, &query, self.options.max_page_size);
        tracing::debug!(total = page.total, user = ?query.user_id, "listed analyses");
        Ok(page)
    }

    pub async fn my(&self, caller: &Principal, mut query: AnalysisQuery) -> Result<Page<Analysis>> {
        query.user_id = Some(caller.user_id.clone());
        Ok(run_query(self.rows().await?, &query, self.options.max_page_size))
    }

    pub async fn detail(&self, caller: &Principal, id: &str) -> Result<Analysis> {
        let a = self.analyses.get(id).await?;
        ensure_can_modify(caller, &a.user_id, "analysis")?;
        let topic = self.topics.get(&a.topic_id).await?;
        Ok(a.with_current(&topic.lineage))
    }

    /// Saves a new version for the topic and model pair and makes it current.
    pub async fn create(&self, caller: &Principal, input: CreateAnalysis) -> Result<Analysis> {
        require_text("topicId", &input.topic_id)?;
        require_text("modelId", &input.model_id)?;
        let content = validate_content(input.content)?;
        let model_name = model_name(self.models.as_ref(), Some(&input.model_id))
            .await?
            .unwrap_or_default();

        let id = new_id();
        let (who, model_id, analysis_id) = (caller.clone(), input.model_id.clone(), id.clone());
        let topic = self
            .topics
            .update(
                &input.topic_id,
                Box::new(move |t: &mut Topic| {
                    ensure_can_modify(&who, &t.owner_id, "topic")?;
                    t.lineage.advance(&model_id, &analysis_id);
                    t.analysis_count += 1;
                    Ok(())
                }),
            )
            .await?;

        let now = Utc::now();
        let analysis = Analysis {
            version: topic.lineage.last_version(&input.model_id),
            id,
            topic_id: input.topic_id,
            model_id: input.model_id,
            model_name,
            content,
            ai_analysis: None,
            ai_suggestions: None,
            is_current: false,
            user_id: caller.user_id.clone(),
            created_at: now,
            updated_at: now,
        };
        let a = self.analyses.insert(analysis).await?;
        tracing::info!(
            analysis_id = %a.id,
            topic_id = %a.topic_id,
            model_id = %a.model_id,
            version = a.version,
            "analysis created"
        );
        Ok(a.with_current(&topic.lineage))
    }

    /// Rewrites the content of one version in place.
    pub async fn update(&self, caller: &Principal, input: UpdateAnalysis) -> Result<Analysis> {
        let content = validate_content(Some(input.content))?;
        let who = caller.clone();
        let a = self
            .analyses
            .update(
                &input.id,
                Box::new(move |a: &mut Analysis| {
                    ensure_can_modify(&who, &a.user_id, "analysis")?;
                    a.content = content;
                    a.updated_at = Utc::now();
                    Ok(())
                }),
            )
            .await?;
        let topic = self.topics.get(&a.topic_id).await?;
        Ok(a.with_current(&topic.lineage))
    }

    /// Deletes the listed versions. Every id is checked before anything is
    /// removed; a deleted current version leaves its pair without one.
    pub async fn delete(&self, caller: &Principal, ids: &[String]) -> Result<usize> {
        let mut doomed = Vec::with_capacity(ids.len());
        for id in ids {
            let a = self.analyses.get(id).await?;
            ensure_can_modify(caller, &a.user_id, "analysis")?;
            doomed.push(a);
        }
        for a in &doomed {
            self.analyses.remove(&a.id).await?;
            let (model_id, analysis_id) = (a.model_id.clone(), a.id.clone());
            let detached = self
                .topics
                .update(
                    &a.topic_id,
                    Box::new(move |t: &mut Topic| {
                        t.lineage.forget(&model_id, &analysis_id);
                        t.analysis_count = t.analysis_count.saturating_sub(1);
                        Ok(())
                    }),
                )
                .await;
            match detached {
                Ok(_) | Err(DomainError::NotFound { .. }) => {}
                Err(err) => return Err(err),
            }
        }
        tracing::info!(count = doomed.len(), by = %caller.user_id, "analyses deleted");
        Ok(doomed.len())
    }

    pub async fn current(&self, caller: &Principal, topic_id: &str, model_id: &str) -> Result<Analysis> {
        let topic = self.owned_topic(caller, topic_id).await?;
        let id = topic
            .lineage
            .current(model_id)
            .ok_or_else(|| DomainError::not_found(Analysis::ENTITY, format!("{topic_id}/{model_id}")))?;
        Ok(self.analyses.get(id).await?.with_current(&topic.lineage))
    }

    /// The most recent version under the topic, whatever its model.
    pub async fn latest(&self, caller: &Principal, topic_id: &str) -> Result<Analysis> {
        self.by_topic(caller, topic_id)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::not_found(Analysis::ENTITY, topic_id))
    }

    /// Every version under the topic, newest first.
    pub async fn by_topic(&self, caller: &Principal, topic_id: &str) -> Result<Vec<Analysis>> {
        self.owned_topic(caller, topic_id).await?;
        let query = AnalysisQuery {
            topic_id: Some(topic_id.to_owned()),
            ..AnalysisQuery::default()
        };
        Ok(filter_sorted(self.rows().await?, &query))
    }

    pub async fn history(
        &self,
        caller: &Principal,
        topic_id: &str,
        model_id: &str,
    ) -> Result<AnalysisHistory> {
        self.owned_topic(caller, topic_id).await?;
        let query = AnalysisQuery {
            topic_id: Some(topic_id.to_owned()),
            model_id: Some(model_id.to_owned()),
            ..AnalysisQuery::default()
        };
        let mut versions = filter_sorted(self.rows().await?, &query);
        versions.sort_by(|a, b| b.version.cmp(&a.version));
        let model_name = match versions.first() {
            Some(v) => v.model_name.clone(),
            None => model_name(self.models.as_ref(), Some(model_id))
                .await
                .ok()
                .flatten()
                .unwrap_or_default(),
        };
        Ok(AnalysisHistory {
            topic_id: topic_id.to_owned(),
            model_id: model_id.to_owned(),
            model_name,
            versions,
        })
    }

    /// Points the pair's current flag at `id`.
    pub async fn set_current(&self, caller: &Principal, input: SetCurrentAnalysis) -> Result<Analysis> {
        let a = self.analyses.get(&input.id).await?;
        ensure_can_modify(caller, &a.user_id, "analysis")?;
        let (who, model_id, analysis_id) = (caller.clone(), a.model_id.clone(), a.id.clone());
        let topic = self
            .topics
            .update(
                &a.topic_id,
                Box::new(move |t: &mut Topic| {
                    ensure_can_modify(&who, &t.owner_id, "topic")?;
                    t.lineage.set_current(&model_id, &analysis_id);
                    Ok(())
                }),
            )
            .await?;
        tracing::info!(analysis_id = %a.id, version = a.version, "analysis set current");
        Ok(a.with_current(&topic.lineage))
    }

    async fn owned_topic(&self, caller: &Principal, topic_id: &str) -> Result<Topic> {
        let topic = self.topics.get(topic_id).await?;
        ensure_can_modify(caller, &topic.owner_id, "topic")?;
        Ok(topic)
    }

    /// Every stored version with `isCurrent` filled in.
    async fn rows(&self) -> Result<Vec<Analysis>> {
        let lineages: HashMap<String, AnalysisLineage> = self
            .topics
            .list()
            .await?
            .into_iter()
            .map(|t| (t.id, t.lineage))
            .collect();
        let empty = AnalysisLineage::default();
        Ok(self
            .analyses
            .list()
            .await?
            .into_iter()
            .map(|a| {
                let lineage = lineages.get(&a.topic_id).unwrap_or(&empty);
                a.with_current(lineage)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{admin, backend, member, options};
    use storage_adapters::fixtures::DEMO_OWNER_ID;
    use storage_adapters::MemoryBackend;

    fn owner() -> Principal {
        member(DEMO_OWNER_ID).principal
    }

    fn service_over(backend: &MemoryBackend) -> AnalysisService {
        AnalysisService::new(&backend.repositories(), options())
    }

    fn draft(topic_id: &str, model_id: &str, content: &str) -> CreateAnalysis {
        CreateAnalysis {
            topic_id: topic_id.into(),
            model_id: model_id.into(),
            content: Some(content.into()),
        }
    }

    #[tokio::test]
    async fn saving_again_adds_a_current_version() {
        let backend = backend();
        let svc = service_over(&backend);
        let a = svc.create(&owner(), draft("t1", "2", r#"{"options":[]}"#)).await.unwrap();
        assert_eq!(a.version, 3);
        assert!(a.is_current);
        assert_eq!(a.model_name, "决策矩阵");
        assert_eq!(backend.topics.get("t1").await.unwrap().analysis_count, 3);

        let history = svc.history(&owner(), "t1", "2").await.unwrap();
        let versions: Vec<(u32, bool)> = history.versions.iter().map(|v| (v.version, v.is_current)).collect();
        assert_eq!(versions, [(3, true), (2, false), (1, false)]);
        assert_eq!(history.model_name, "决策矩阵");

        let other_model = svc.create(&owner(), draft("t1", "1", "")).await.unwrap();
        assert_eq!((other_model.version, other_model.content.as_str()), (1, "{}"));
        assert_eq!(svc.current(&owner(), "t1", "2").await.unwrap().id, a.id);
    }

    #[tokio::test]
    async fn set_current_moves_the_flag() {
        let backend = backend();
        let svc = service_over(&backend);
        let old = svc
            .set_current(&owner(), SetCurrentAnalysis { id: "an1".into() })
            .await
            .unwrap();
        assert!(old.is_current);
        assert_eq!(svc.current(&owner(), "t1", "2").await.unwrap().id, "an1");
        let query = AnalysisQuery {
            topic_id: Some("t1".into()),
            is_current: Some(true),
            ..AnalysisQuery::default()
        };
        let page = svc.list(&owner(), query).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.list[0].id, "an1");
    }

    #[tokio::test]
    async fn latest_and_by_topic_are_newest_first() {
        let svc = service_over(&backend());
        assert_eq!(svc.latest(&owner(), "t1").await.unwrap().id, "an2");
        let ids: Vec<String> = svc
            .by_topic(&owner(), "t1")
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(ids, ["an2", "an1"]);
        assert!(matches!(
            svc.latest(&owner(), "t4").await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn deleting_the_current_version_clears_the_pointer() {
        let backend = backend();
        let svc = service_over(&backend);
        let stranger = member("u9").principal;
        let err = svc.delete(&stranger, &["an2".into()]).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        assert_eq!(svc.delete(&owner(), &["an2".into()]).await.unwrap(), 1);
        assert!(matches!(
            svc.current(&owner(), "t1", "2").await,
            Err(DomainError::NotFound { .. })
        ));
        assert_eq!(backend.topics.get("t1").await.unwrap().analysis_count, 1);
        let next = svc.create(&owner(), draft("t1", "2", "{}")).await.unwrap();
        assert_eq!(next.version, 3);
    }

    #[tokio::test]
    async fn only_the_topic_owner_analyses_it() {
        let svc = service_over(&backend());
        let stranger = member("u9").principal;
        let err = svc.create(&stranger, draft("t1", "2", "{}")).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
        assert!(matches!(
            svc.by_topic(&stranger, "t1").await,
            Err(DomainError::Forbidden(_))
        ));
        assert_eq!(svc.list(&stranger, AnalysisQuery::default()).await.unwrap().total, 0);
        assert_eq!(svc.list(&admin().principal, AnalysisQuery::default()).await.unwrap().total, 3);

        let bad = svc.create(&owner(), draft("t1", "2", "[1]")).await.unwrap_err();
        assert!(matches!(bad, DomainError::Validation(_)));
        let unknown = svc.create(&owner(), draft("t1", "99", "{}")).await.unwrap_err();
        assert!(matches!(unknown, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn update_rewrites_content_only() {
        let svc = service_over(&backend());
        let input = UpdateAnalysis {
            id: "an1".into(),
            content: r#"{"options":["接受"]}"#.into(),
        };
        let a = svc.update(&owner(), input).await.unwrap();
        assert_eq!(a.version, 1);
        assert!(!a.is_current);
        assert!(a.content.contains("接受"));
        let garbage = UpdateAnalysis { id: "an1".into(), content: "nope".into() };
        assert!(svc.update(&owner(), garbage).await.is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn racing_saves_get_distinct_versions() {
        let backend = backend();
        let svc = Arc::new(service_over(&backend));
        let mut handles = Vec::new();
        for _ in 0..16 {
            let svc = svc.clone();
            handles.push(tokio::spawn(async move {
                svc.create(&owner(), draft("t2", "4", "{}")).await
            }));
        }
        let mut versions = Vec::new();
        for h in handles {
            versions.push(h.await.unwrap().unwrap().version);
        }
        versions.sort_unstable();
        assert_eq!(versions, (2..=17).collect::<Vec<u32>>());
        let current = svc.current(&owner(), "t2", "4").await.unwrap();
        assert_eq!(current.version, 17);
    }
}
