//! # ActionService
//!
//! Follow-up actions, their progress log and the counters they keep on
//! the topic they belong to.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use domains::errors::{DomainError, Result};
use domains::models::*;
use domains::ports::{Mutation, Repositories, Store};
use domains::query::{filter_sorted, run_query, Page};

use crate::{ensure_can_modify, ServiceOptions};

pub struct ActionService {
    actions: Arc<dyn Store<Action>>,
    follow_ups: Arc<dyn Store<FollowUp>>,
    topics: Arc<dyn Store<Topic>>,
    options: ServiceOptions,
}

impl ActionService {
    pub fn new(repos: &Repositories, options: ServiceOptions) -> Self {
        Self {
            actions: repos.actions.clone(),
            follow_ups: repos.follow_ups.clone(),
            topics: repos.topics.clone(),
            options,
        }
    }

    /// Admins see every action, members only their own.
    pub async fn list(&self, caller: &Principal, mut query: ActionQuery) -> Result<Page<Action>> {
        if !caller.is_admin() {
            query.owner_id = Some(caller.user_id.clone());
        }
        self.query(query).await
    }

    pub async fn my(&self, caller: &Principal, mut query: ActionQuery) -> Result<Page<Action>> {
        query.owner_id = Some(caller.user_id.clone());
        self.query(query).await
    }

    pub async fn detail(&self, caller: &Principal, id: &str) -> Result<Action> {
        let a = self.actions.get(id).await?;
        ensure_can_modify(caller, &a.owner_id, "action")?;
        Ok(a.with_overdue(Utc::now()))
    }

    pub async fn create(&self, caller: &Principal, input: CreateAction) -> Result<Action> {
        require_text("title", &input.title)?;
        let topic_title = match input.topic_id.as_deref() {
            Some(topic_id) => Some(self.attach_to_topic(caller, topic_id, 1).await?),
            None => None,
        };
        let now = Utc::now();
        let a = self
            .actions
            .insert(draft_action(caller, input, topic_title, now))
            .await?;
        tracing::info!(action_id = %a.id, owner = %a.owner_id, topic_id = ?a.topic_id, "action created");
        Ok(a.with_overdue(now))
    }

    /// Creates every drafted action of one analysis under the same topic.
    pub async fn create_from_analysis(
        &self,
        caller: &Principal,
        input: CreateActionsFromAnalysis,
    ) -> Result<Vec<Action>> {
        require_text("analysisId", &input.analysis_id)?;
        if input.actions.is_empty() {
            return Err(DomainError::Validation("actions must not be empty".into()));
        }
        for draft in &input.actions {
            require_text("title", &draft.title)?;
        }
        let topic_title = match input.topic_id.as_deref() {
            Some(topic_id) => Some(
                self.attach_to_topic(caller, topic_id, input.actions.len() as u64)
                    .await?,
            ),
            None => input.topic_title.clone(),
        };

        let now = Utc::now();
        let mut created = Vec::with_capacity(input.actions.len());
        for draft in input.actions {
            let draft = CreateAction {
                topic_id: input.topic_id.clone(),
                analysis_id: Some(input.analysis_id.clone()),
                ..draft
            };
            let a = self
                .actions
                .insert(draft_action(caller, draft, topic_title.clone(), now))
                .await?;
            created.push(a.with_overdue(now));
        }
        tracing::info!(
            analysis_id = %input.analysis_id,
            count = created.len(),
            "actions created from analysis"
        );
        Ok(created)
    }

    pub async fn update(&self, caller: &Principal, id: &str, input: UpdateAction) -> Result<Action> {
        if let Some(title) = &input.title {
            require_text("title", title)?;
        }
        self.mutate(
            caller,
            id,
            Box::new(move |a: &mut Action| {
                input.apply(a, Utc::now());
                Ok(())
            }),
        )
        .await
    }

    /// Deletes the listed actions with their follow-ups. Every id is
    /// checked before anything is removed.
    pub async fn delete(&self, caller: &Principal, ids: &[String]) -> Result<usize> {
        let mut doomed = Vec::with_capacity(ids.len());
        for id in ids {
            let a = self.actions.get(id).await?;
            ensure_can_modify(caller, &a.owner_id, "action")?;
            doomed.push(a);
        }
        for a in &doomed {
            self.actions.remove(&a.id).await?;
            let action_id = a.id.clone();
            self.follow_ups
                .remove_where(Box::new(move |f: &FollowUp| f.action_id == action_id))
                .await?;
            if let Some(topic_id) = &a.topic_id {
                let detached = self
                    .topics
                    .update(
                        topic_id,
                        Box::new(|t: &mut Topic| {
                            t.action_count = t.action_count.saturating_sub(1);
                            Ok(())
                        }),
                    )
                    .await;
                match detached {
                    Ok(_) | Err(DomainError::NotFound { .. }) => {}
                    Err(err) => return Err(err),
                }
            }
        }
        tracing::info!(count = doomed.len(), by = %caller.user_id, "actions deleted");
        Ok(doomed.len())
    }

    pub async fn update_completion(
        &self,
        caller: &Principal,
        id: &str,
        input: UpdateCompletion,
    ) -> Result<Action> {
        self.mutate(
            caller,
            id,
            Box::new(move |a: &mut Action| a.set_completion(input.completion_rate, Utc::now())),
        )
        .await
    }

    pub async fn update_status(
        &self,
        caller: &Principal,
        id: &str,
        input: UpdateActionStatus,
    ) -> Result<Action> {
        let a = self
            .mutate(
                caller,
                id,
                Box::new(move |a: &mut Action| a.set_status(input.status, Utc::now())),
            )
            .await?;
        tracing::info!(action_id = %a.id, status = %a.status, "action status changed");
        Ok(a)
    }

    pub async fn complete(&self, caller: &Principal, id: &str) -> Result<Action> {
        self.update_status(caller, id, UpdateActionStatus { status: ActionStatus::Completed })
            .await
    }

    pub async fn cancel(&self, caller: &Principal, id: &str) -> Result<Action> {
        self.update_status(caller, id, UpdateActionStatus { status: ActionStatus::Cancelled })
            .await
    }

    /// Logs progress on an action. A reported `progressAfter` moves the
    /// completion rate, and with it the status.
    pub async fn add_follow_up(
        &self,
        actor: &Actor,
        id: &str,
        input: AddFollowUp,
    ) -> Result<FollowUp> {
        require_text("content", &input.content)?;
        let caller = actor.principal.clone();
        let progress_after = input.progress_after;
        let a = self
            .actions
            .update(
                id,
                Box::new(move |a: &mut Action| {
                    ensure_can_modify(&caller, &a.owner_id, "action")?;
                    a.record_follow_up(progress_after, Utc::now())
                }),
            )
            .await?;

        let follow_up = FollowUp {
            id: new_id(),
            action_id: id.to_owned(),
            user_id: actor.id().to_owned(),
            user_name: actor.profile.name.clone(),
            content: input.content,
            progress_before: a.progress_before,
            progress_after: a.completion_rate,
            progress_delta: a.progress_delta(),
            created_at: Utc::now(),
        };
        let f = self.follow_ups.insert(follow_up).await?;
        tracing::info!(action_id = id, follow_up_id = %f.id, delta = f.progress_delta, "follow-up recorded");
        Ok(f)
    }

    /// Follow-ups of one action, newest first.
    pub async fn follow_ups(&self, caller: &Principal, id: &str) -> Result<Vec<FollowUp>> {
        let a = self.actions.get(id).await?;
        ensure_can_modify(caller, &a.owner_id, "action")?;
        self.follow_ups_of(id).await
    }

    /// Every action attached to one topic, newest first.
    pub async fn by_topic(&self, caller: &Principal, topic_id: &str) -> Result<Vec<Action>> {
        self.all_matching(ActionQuery {
            topic_id: Some(topic_id.to_owned()),
            owner_id: (!caller.is_admin()).then(|| caller.user_id.clone()),
            ..ActionQuery::default()
        })
        .await
    }

    /// Every action drafted from one analysis, newest first.
    pub async fn by_analysis(&self, caller: &Principal, analysis_id: &str) -> Result<Vec<Action>> {
        self.all_matching(ActionQuery {
            analysis_id: Some(analysis_id.to_owned()),
            owner_id: (!caller.is_admin()).then(|| caller.user_id.clone()),
            ..ActionQuery::default()
        })
        .await
    }

    pub async fn statistics(&self, caller: &Principal) -> Result<ActionStatistics> {
        let rows: Vec<Action> = self
            .actions
            .list()
            .await?
            .into_iter()
            .filter(|a| caller.is_admin() || a.owner_id == caller.user_id)
            .collect();
        Ok(ActionStatistics::tally(&rows, Utc::now()))
    }

    async fn query(&self, query: ActionQuery) -> Result<Page<Action>> {
        let page = run_query(self.rows().await?, &query, self.options.max_page_size);
        tracing::debug!(total = page.total, owner = ?query.owner_id, "listed actions");
        Ok(page)
    }

    async fn all_matching(&self, query: ActionQuery) -> Result<Vec<Action>> {
        Ok(filter_sorted(self.rows().await?, &query))
    }

    async fn rows(&self) -> Result<Vec<Action>> {
        let now = Utc::now();
        Ok(self
            .actions
            .list()
            .await?
            .into_iter()
            .map(|a| a.with_overdue(now))
            .collect())
    }

    async fn mutate(
        &self,
        caller: &Principal,
        id: &str,
        edit: Mutation<Action>,
    ) -> Result<Action> {
        let caller = caller.clone();
        let a = self
            .actions
            .update(
                id,
                Box::new(move |a: &mut Action| {
                    ensure_can_modify(&caller, &a.owner_id, "action")?;
                    edit(a)
                }),
            )
            .await?;
        Ok(a.with_overdue(Utc::now()))
    }

    /// Bumps the topic's action counter by `count` and returns its title.
    async fn attach_to_topic(&self, caller: &Principal, topic_id: &str, count: u64) -> Result<String> {
        let caller = caller.clone();
        let topic = self
            .topics
            .update(
                topic_id,
                Box::new(move |t: &mut Topic| {
                    ensure_can_modify(&caller, &t.owner_id, "topic")?;
                    t.action_count += count;
                    Ok(())
                }),
            )
            .await?;
        Ok(topic.title)
    }

    async fn follow_ups_of(&self, action_id: &str) -> Result<Vec<FollowUp>> {
        Ok(self
            .follow_ups
            .list()
            .await?
            .into_iter()
            .filter(|f| f.action_id == action_id)
            .collect())
    }

}

fn draft_action(
    caller: &Principal,
    input: CreateAction,
    topic_title: Option<String>,
    now: DateTime<Utc>,
) -> Action {
    Action {
        id: new_id(),
        title: input.title,
        description: input.description,
        owner_id: caller.user_id.clone(),
        topic_title: topic_title.or(input.topic_title),
        topic_id: input.topic_id,
        analysis_id: input.analysis_id,
        guiding_principle: input.guiding_principle,
        completion_rate: 0,
        status: ActionStatus::Pending,
        priority: input.priority,
        follow_up_count: 0,
        due_date: input.due_date,
        completed_at: None,
        is_overdue: false,
        created_at: now,
        updated_at: now,
        progress_before: 0,
    }
}
