//! # ConsultationService
//!
//! Paid questions, expert applications and the selection of one expert.

use std::sync::Arc;

use chrono::Utc;
use domains::errors::{DomainError, Result};
use domains::models::*;
use domains::ports::{Repositories, Store};
use domains::query::{run_query, Page};

use crate::{ensure_can_modify, model_name, ServiceOptions};

pub struct ConsultationService {
    consultations: Arc<dyn Store<Consultation>>,
    applications: Arc<dyn Store<ConsultationApplication>>,
    experts: Arc<dyn Store<Expert>>,
    models: Arc<dyn Store<ThinkingModel>>,
    options: ServiceOptions,
}

impl ConsultationService {
    pub fn new(repos: &Repositories, options: ServiceOptions) -> Self {
        Self {
            consultations: repos.consultations.clone(),
            applications: repos.consultation_applications.clone(),
            experts: repos.experts.clone(),
            models: repos.models.clone(),
            options,
        }
    }

    pub async fn list(&self, query: ConsultationQuery) -> Result<Page<Consultation>> {
        let rows = self.consultations.list().await?;
        let page = run_query(rows, &query, self.options.max_page_size);
        tracing::debug!(total = page.total, page = page.page, "listed consultations");
        Ok(page)
    }

    pub async fn detail(&self, id: &str) -> Result<Consultation> {
        self.consultations
            .update(
                id,
                Box::new(|c: &mut Consultation| {
                    c.view_count += 1;
                    Ok(())
                }),
            )
            .await
    }

    pub async fn create(&self, actor: &Actor, input: CreateConsultation) -> Result<Consultation> {
        require_text("title", &input.title)?;
        require_text("description", &input.description)?;
        let now = Utc::now();
        if input.deadline <= now {
            return Err(DomainError::Validation("deadline must be in the future".into()));
        }
        let linked_model = model_name(self.models.as_ref(), input.model_id.as_deref()).await?;
        let consultation = Consultation {
            id: new_id(),
            title: input.title,
            field: input.field,
            description: input.description,
            background: input.background,
            expectation: input.expectation,
            requester: actor.profile.clone(),
            model_id: input.model_id.filter(|_| linked_model.is_some()),
            model_name: linked_model,
            tags: input.tags,
            reward: input.reward,
            mode: input.mode,
            city: input.city,
            deadline: input.deadline,
            status: ConsultationStatus::Open,
            view_count: 0,
            application_count: 0,
            selected_expert: None,
            created_at: now,
            updated_at: now,
            applicants: Reactions::default(),
        };
        let c = self.consultations.insert(consultation).await?;
        tracing::info!(consultation_id = %c.id, requester = %actor.id(), reward = c.reward, "consultation created");
        Ok(c)
    }

    /// Files a proposal. Callers without an expert profile apply with a
    /// provisional one built from their public profile.
    pub async fn apply(
        &self,
        actor: &Actor,
        consultation_id: &str,
        input: ApplyConsultation,
    ) -> Result<ConsultationApplication> {
        require_text("proposal", &input.proposal)?;
        let applicant = actor.id().to_owned();
        let consultation = self
            .consultations
            .update(
                consultation_id,
                Box::new(move |c: &mut Consultation| {
                    if c.requester.id == applicant {
                        return Err(DomainError::Conflict(
                            "requesters cannot apply to their own consultation".into(),
                        ));
                    }
                    if !c.applicants.add(&applicant) {
                        return Err(DomainError::Conflict(
                            "already applied to this consultation".into(),
                        ));
                    }
                    if c.status != ConsultationStatus::Open {
                        return Err(DomainError::Conflict(format!(
                            "consultation is {}, not open for applications",
                            c.status
                        )));
                    }
                    c.application_count += 1;
                    Ok(())
                }),
            )
            .await?;

        let expert = match self.experts.get(actor.id()).await {
            Ok(expert) => expert,
            Err(DomainError::NotFound { .. }) => provisional_expert(actor, consultation.field),
            Err(err) => return Err(err),
        };
        let application = ConsultationApplication {
            id: new_id(),
            consultation_id: consultation_id.to_owned(),
            expert,
            proposal: input.proposal,
            estimated_time: input.estimated_time,
            quotation: input.quotation,
            status: ApplicationStatus::Pending,
            created_at: Utc::now(),
        };
        let a = self.applications.insert(application).await?;
        tracing::info!(application_id = %a.id, consultation_id, expert = %actor.id(), "consultation application filed");
        Ok(a)
    }

    pub async fn applications(&self, consultation_id: &str) -> Result<Vec<ConsultationApplication>> {
        self.consultations.get(consultation_id).await?;
        self.applications_of(consultation_id).await
    }

    /// Picks the expert of one pending application: the consultation moves
    /// to `matched`, that application is accepted and every other pending
    /// one rejected.
    pub async fn select_expert(
        &self,
        caller: &Principal,
        consultation_id: &str,
        input: SelectExpert,
    ) -> Result<Consultation> {
        let chosen = self.applications.get(&input.application_id).await?;
        if chosen.consultation_id != consultation_id {
            return Err(DomainError::Validation(format!(
                "application {} does not belong to consultation {consultation_id}",
                chosen.id
            )));
        }
        if chosen.status != ApplicationStatus::Pending {
            return Err(DomainError::Conflict("application was already reviewed".into()));
        }

        let (caller_owned, expert) = (caller.clone(), chosen.expert.clone());
        let c = self
            .consultations
            .update(
                consultation_id,
                Box::new(move |c: &mut Consultation| {
                    ensure_can_modify(&caller_owned, &c.requester.id, "consultation")?;
                    if c.selected_expert.is_some() {
                        return Err(DomainError::Conflict("an expert was already selected".into()));
                    }
                    c.status = c.status.transition(ConsultationStatus::Matched)?;
                    c.selected_expert = Some(expert);
                    c.updated_at = Utc::now();
                    Ok(())
                }),
            )
            .await?;

        for a in self.applications_of(consultation_id).await? {
            let decision = if a.id == chosen.id {
                ApplicationStatus::Accepted
            } else if a.status == ApplicationStatus::Pending {
                ApplicationStatus::Rejected
            } else {
                continue;
            };
            self.applications
                .update(
                    &a.id,
                    Box::new(move |a: &mut ConsultationApplication| {
                        a.status = decision;
                        Ok(())
                    }),
                )
                .await?;
        }
        tracing::info!(consultation_id, expert = %chosen.expert.user.id, "expert selected");
        Ok(c)
    }

    pub async fn update_status(
        &self,
        caller: &Principal,
        id: &str,
        input: UpdateConsultationStatus,
    ) -> Result<Consultation> {
        let caller_owned = caller.clone();
        let c = self
            .consultations
            .update(
                id,
                Box::new(move |c: &mut Consultation| {
                    ensure_can_modify(&caller_owned, &c.requester.id, "consultation")?;
                    c.status = c.status.transition(input.status)?;
                    c.updated_at = Utc::now();
                    Ok(())
                }),
            )
            .await?;
        tracing::info!(consultation_id = %c.id, status = %c.status, "consultation status changed");
        Ok(c)
    }

    pub async fn recommended_experts(&self, query: ExpertQuery) -> Result<Vec<Expert>> {
        let mut experts: Vec<Expert> = self
            .experts
            .list()
            .await?
            .into_iter()
            .filter(|e| query.field.as_option().map_or(true, |f| e.fields.contains(f)))
            .collect();
        experts.sort_by(|a, b| b.rating.total_cmp(&a.rating));
        if let Some(limit) = query.limit {
            experts.truncate(limit);
        }
        Ok(experts)
    }

    pub async fn stats(&self) -> Result<ConsultationStats> {
        let rows = self.consultations.list().await?;
        let total = rows.len() as u64;
        let reward_sum: u64 = rows.iter().map(|c| c.reward).sum();
        let closed = rows.iter().filter(|c| c.status.is_closed()).count();
        let completed = rows
            .iter()
            .filter(|c| c.status == ConsultationStatus::Completed)
            .count();
        Ok(ConsultationStats {
            total_consultations: total,
            total_experts: self.experts.list().await?.len() as u64,
            avg_reward: reward_sum.checked_div(total).unwrap_or(0),
            success_rate: if closed == 0 {
                0.0
            } else {
                completed as f64 / closed as f64
            },
        })
    }

    async fn applications_of(&self, consultation_id: &str) -> Result<Vec<ConsultationApplication>> {
        Ok(self
            .applications
            .list()
            .await?
            .into_iter()
            .filter(|a| a.consultation_id == consultation_id)
            .collect())
    }
}

fn provisional_expert(actor: &Actor, field: ConsultationField) -> Expert {
    Expert {
        user: actor.profile.clone(),
        title: None,
        company: None,
        experience: 0,
        expertise: Vec::new(),
        fields: vec![field],
        consult_count: 0,
        rating: 0.0,
        response_rate: 0.0,
        hourly_rate: None,
    }
}
