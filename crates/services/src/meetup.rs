//! # MeetupService
//!
//! Meetups proposed by a host, the interest toggle, and the application
//! flow (apply, review, accept into the guest list).

use std::sync::Arc;

use chrono::Utc;
use domains::errors::{DomainError, Result};
use domains::models::*;
use domains::ports::{Repositories, Store};
use domains::query::{run_query, Page};

use crate::{ensure_can_modify, model_name, ServiceOptions};

pub struct MeetupService {
    meetups: Arc<dyn Store<Meetup>>,
    applications: Arc<dyn Store<MeetupApplication>>,
    models: Arc<dyn Store<ThinkingModel>>,
    options: ServiceOptions,
}

impl MeetupService {
    pub fn new(repos: &Repositories, options: ServiceOptions) -> Self {
        Self {
            meetups: repos.meetups.clone(),
            applications: repos.meetup_applications.clone(),
            models: repos.models.clone(),
            options,
        }
    }

    pub async fn list(&self, query: MeetupQuery, viewer: Option<&str>) -> Result<Page<Meetup>> {
        let rows = self.meetups.list().await?;
        let page = run_query(rows, &query, self.options.max_page_size);
        tracing::debug!(total = page.total, page = page.page, "listed meetups");
        Ok(page.map(|m| m.for_viewer(viewer)))
    }

    pub async fn detail(&self, id: &str, viewer: Option<&str>) -> Result<Meetup> {
        let m = self
            .meetups
            .update(
                id,
                Box::new(|m: &mut Meetup| {
                    m.view_count += 1;
                    Ok(())
                }),
            )
            .await?;
        Ok(m.for_viewer(viewer))
    }

    pub async fn create(&self, actor: &Actor, input: CreateMeetup) -> Result<Meetup> {
        require_text("title", &input.title)?;
        require_text("city", &input.city)?;
        if input.max_guests == 0 {
            return Err(DomainError::Validation("maxGuests must be at least 1".into()));
        }
        let linked_model = model_name(self.models.as_ref(), input.model_id.as_deref()).await?;
        let now = Utc::now();
        let meetup = Meetup {
            id: new_id(),
            title: input.title,
            topic: input.topic,
            description: input.description,
            thoughts: input.thoughts,
            host: actor.profile.clone(),
            model_id: input.model_id.filter(|_| linked_model.is_some()),
            model_name: linked_model,
            tags: input.tags,
            city: input.city.trim().to_owned(),
            location: None,
            preferred_time: input.preferred_time,
            scheduled_time: None,
            cost_split: input.cost_split,
            max_guests: input.max_guests,
            current_guests: 0,
            status: MeetupStatus::Open,
            view_count: 0,
            interested_count: 0,
            application_count: 0,
            is_interested: None,
            created_at: now,
            updated_at: now,
            interested: Reactions::default(),
            applicants: Reactions::default(),
        };
        let m = self.meetups.insert(meetup).await?;
        tracing::info!(meetup_id = %m.id, host = %actor.id(), city = %m.city, "meetup created");
        Ok(m.for_viewer(Some(actor.id())))
    }

    pub async fn toggle_interest(&self, user_id: &str, id: &str) -> Result<InterestState> {
        let user = user_id.to_owned();
        let m = self
            .meetups
            .update(
                id,
                Box::new(move |m: &mut Meetup| {
                    m.interested.toggle(&user, &mut m.interested_count);
                    Ok(())
                }),
            )
            .await?;
        Ok(InterestState {
            interested: m.interested.contains(user_id),
            interested_count: m.interested_count,
        })
    }

    /// Files an application. Hosts cannot apply to their own meetup and
    /// each user applies at most once.
    pub async fn apply(
        &self,
        actor: &Actor,
        meetup_id: &str,
        input: ApplyMeetup,
    ) -> Result<MeetupApplication> {
        let applicant = actor.id().to_owned();
        self.meetups
            .update(
                meetup_id,
                Box::new(move |m: &mut Meetup| {
                    if m.host.id == applicant {
                        return Err(DomainError::Conflict(
                            "hosts cannot apply to their own meetup".into(),
                        ));
                    }
                    if !m.applicants.add(&applicant) {
                        return Err(DomainError::Conflict("already applied to this meetup".into()));
                    }
                    if m.status != MeetupStatus::Open {
                        return Err(DomainError::Conflict(format!(
                            "meetup is {}, not open for applications",
                            m.status
                        )));
                    }
                    if m.is_full() {
                        return Err(DomainError::Conflict("meetup is full".into()));
                    }
                    m.application_count += 1;
                    Ok(())
                }),
            )
            .await?;

        let application = MeetupApplication {
            id: new_id(),
            meetup_id: meetup_id.to_owned(),
            applicant: actor.profile.clone(),
            message: input.message,
            status: ApplicationStatus::Pending,
            created_at: Utc::now(),
        };
        let a = self.applications.insert(application).await?;
        tracing::info!(application_id = %a.id, meetup_id, applicant = %actor.id(), "meetup application filed");
        Ok(a)
    }

    /// Applications of one meetup, visible to its host and admins.
    pub async fn applications(
        &self,
        caller: &Principal,
        meetup_id: &str,
    ) -> Result<Vec<MeetupApplication>> {
        let meetup = self.meetups.get(meetup_id).await?;
        ensure_can_modify(caller, &meetup.host.id, "meetup")?;
        self.applications_of(meetup_id).await
    }

    /// Accepts or rejects a pending application. Accepting takes one seat.
    ///
    /// The decision is claimed on the application row first, so only one
    /// reviewer wins. A refused seat puts the application back to pending.
    pub async fn review(
        &self,
        caller: &Principal,
        application_id: &str,
        input: ReviewApplication,
    ) -> Result<MeetupApplication> {
        let application = self.applications.get(application_id).await?;
        let meetup = self.meetups.get(&application.meetup_id).await?;
        ensure_can_modify(caller, &meetup.host.id, "meetup")?;

        let decision = if input.accept {
            ApplicationStatus::Accepted
        } else {
            ApplicationStatus::Rejected
        };
        let a = self
            .applications
            .update(
                application_id,
                Box::new(move |a: &mut MeetupApplication| {
                    if a.status != ApplicationStatus::Pending {
                        return Err(DomainError::Conflict("application was already reviewed".into()));
                    }
                    a.status = decision;
                    Ok(())
                }),
            )
            .await?;

        if input.accept {
            let seated = self
                .meetups
                .update(
                    &meetup.id,
                    Box::new(|m: &mut Meetup| {
                        if m.is_full() {
                            return Err(DomainError::Conflict("meetup is full".into()));
                        }
                        m.current_guests += 1;
                        m.updated_at = Utc::now();
                        Ok(())
                    }),
                )
                .await;
            if let Err(err) = seated {
                self.applications
                    .update(
                        application_id,
                        Box::new(|a: &mut MeetupApplication| {
                            a.status = ApplicationStatus::Pending;
                            Ok(())
                        }),
                    )
                    .await?;
                return Err(err);
            }
        }
        tracing::info!(application_id, meetup_id = %meetup.id, accepted = input.accept, "meetup application reviewed");
        Ok(a)
    }

    pub async fn update_status(
        &self,
        caller: &Principal,
        id: &str,
        input: UpdateMeetupStatus,
    ) -> Result<Meetup> {
        let caller_owned = caller.clone();
        let m = self
            .meetups
            .update(
                id,
                Box::new(move |m: &mut Meetup| {
                    ensure_can_modify(&caller_owned, &m.host.id, "meetup")?;
                    m.status = m.status.transition(input.status)?;
                    if input.scheduled_time.is_some() {
                        m.scheduled_time = input.scheduled_time;
                    }
                    if input.location.is_some() {
                        m.location = input.location;
                    }
                    m.updated_at = Utc::now();
                    Ok(())
                }),
            )
            .await?;
        tracing::info!(meetup_id = %m.id, status = %m.status, "meetup status changed");
        Ok(m.for_viewer(Some(&caller.user_id)))
    }

    /// Distinct cities in storage order.
    pub async fn cities(&self) -> Result<Vec<String>> {
        let mut cities: Vec<String> = Vec::new();
        for m in self.meetups.list().await? {
            if !cities.contains(&m.city) {
                cities.push(m.city);
            }
        }
        Ok(cities)
    }

    async fn applications_of(&self, meetup_id: &str) -> Result<Vec<MeetupApplication>> {
        Ok(self
            .applications
            .list()
            .await?
            .into_iter()
            .filter(|a| a.meetup_id == meetup_id)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{admin, backend, member, options};
    use domains::query::Selector;

    fn service() -> MeetupService {
        MeetupService::new(&backend().repositories(), options())
    }

    fn review(accept: bool) -> ReviewApplication {
        ReviewApplication { accept }
    }

    #[tokio::test]
    async fn popular_orders_by_interest() {
        let query = MeetupQuery {
            sort_by: MeetupSort::Popular,
            ..MeetupQuery::default()
        };
        let page = service().list(query, None).await.unwrap();
        let counts: Vec<u64> = page.list.iter().map(|m| m.interested_count).collect();
        assert_eq!(counts, [42, 28, 15, 12, 8]);
    }

    #[tokio::test]
    async fn filters_combine_with_and() {
        let query = MeetupQuery {
            cost_split: Selector::Only(CostSplit::Host),
            status: Selector::Only(MeetupStatus::Open),
            ..MeetupQuery::default()
        };
        let page = service().list(query, None).await.unwrap();
        let ids: Vec<_> = page.list.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["m3", "m1"]);
    }

    #[tokio::test]
    async fn interest_is_per_user() {
        let svc = service();
        let on = svc.toggle_interest("u1", "m1").await.unwrap();
        assert_eq!(on, InterestState { interested: true, interested_count: 13 });
        let detail = svc.detail("m1", Some("u1")).await.unwrap();
        assert_eq!(detail.is_interested, Some(true));
        assert_eq!(svc.detail("m1", Some("u2")).await.unwrap().is_interested, Some(false));
        let off = svc.toggle_interest("u1", "m1").await.unwrap();
        assert_eq!(off.interested_count, 12);
    }

    #[tokio::test]
    async fn apply_bumps_count_and_rejects_duplicates() {
        let svc = service();
        let guest = member("u8");
        let message = || ApplyMeetup { message: "Count me in".into() };
        let a = svc.apply(&guest, "m3", message()).await.unwrap();
        assert_eq!(a.status, ApplicationStatus::Pending);
        assert_eq!(svc.detail("m3", None).await.unwrap().application_count, 1);

        let err = svc.apply(&guest, "m3", message()).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(svc.detail("m3", None).await.unwrap().application_count, 1);
    }

    #[tokio::test]
    async fn hosts_and_closed_meetups_refuse_applications() {
        let svc = service();
        let message = || ApplyMeetup { message: "hi".into() };
        let own = svc.apply(&member("3"), "m3", message()).await.unwrap_err();
        assert!(matches!(own, DomainError::Conflict(_)));
        let pending = svc.apply(&member("u8"), "m5", message()).await.unwrap_err();
        assert!(matches!(pending, DomainError::Conflict(_)));
        assert!(matches!(
            svc.apply(&member("u8"), "nope", message()).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn accepting_fills_seats_until_full() {
        let svc = service();
        let host = member("3").principal;
        let first = svc
            .apply(&member("u1"), "m3", ApplyMeetup { message: "a".into() })
            .await
            .unwrap();
        let second = svc
            .apply(&member("u2"), "m3", ApplyMeetup { message: "b".into() })
            .await
            .unwrap();
        let third = svc
            .apply(&member("u4"), "m3", ApplyMeetup { message: "c".into() })
            .await
            .unwrap();

        svc.review(&host, &first.id, review(true)).await.unwrap();
        svc.review(&host, &second.id, review(true)).await.unwrap();
        assert_eq!(svc.detail("m3", None).await.unwrap().current_guests, 2);

        let full = svc.review(&host, &third.id, review(true)).await.unwrap_err();
        assert!(matches!(full, DomainError::Conflict(_)));
        let rejected = svc.review(&host, &third.id, review(false)).await.unwrap();
        assert_eq!(rejected.status, ApplicationStatus::Rejected);

        let again = svc.review(&host, &first.id, review(false)).await.unwrap_err();
        assert!(matches!(again, DomainError::Conflict(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn racing_applications_from_one_user_file_once() {
        let svc = Arc::new(service());
        let mut tasks = Vec::new();
        for _ in 0..16 {
            let svc = svc.clone();
            tasks.push(tokio::spawn(async move {
                svc.apply(&member("u8"), "m3", ApplyMeetup { message: "me".into() })
                    .await
            }));
        }
        let mut filed = 0;
        for task in tasks {
            if task.await.unwrap().is_ok() {
                filed += 1;
            }
        }
        assert_eq!(filed, 1);
        assert_eq!(svc.detail("m3", None).await.unwrap().application_count, 1);
        assert_eq!(svc.applications(&member("3").principal, "m3").await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn racing_accepts_take_one_seat() {
        let svc = Arc::new(service());
        let a = svc
            .apply(&member("u1"), "m3", ApplyMeetup { message: "a".into() })
            .await
            .unwrap();
        let mut tasks = Vec::new();
        for _ in 0..16 {
            let (svc, id) = (svc.clone(), a.id.clone());
            tasks.push(tokio::spawn(async move {
                svc.review(&member("3").principal, &id, review(true)).await
            }));
        }
        let mut accepted = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(_) => accepted += 1,
                Err(err) => assert!(matches!(err, DomainError::Conflict(_))),
            }
        }
        assert_eq!(accepted, 1);
        assert_eq!(svc.detail("m3", None).await.unwrap().current_guests, 1);
    }

    #[tokio::test]
    async fn only_the_host_reviews() {
        let svc = service();
        let a = svc
            .apply(&member("u1"), "m3", ApplyMeetup { message: "a".into() })
            .await
            .unwrap();
        let err = svc.review(&member("u2").principal, &a.id, review(true)).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
        assert!(svc.review(&admin().principal, &a.id, review(true)).await.is_ok());
        assert_eq!(svc.applications(&member("3").principal, "m3").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn status_follows_the_transition_table() {
        let svc = service();
        let host = member("5").principal;
        let confirm = |time: Option<&str>| UpdateMeetupStatus {
            status: MeetupStatus::Confirmed,
            scheduled_time: time.map(str::to_owned),
            location: None,
        };
        let m = svc.update_status(&host, "m5", confirm(Some("Sun 14:00"))).await.unwrap();
        assert_eq!(m.status, MeetupStatus::Confirmed);
        assert_eq!(m.scheduled_time.as_deref(), Some("Sun 14:00"));

        let reopen = UpdateMeetupStatus {
            status: MeetupStatus::Open,
            scheduled_time: None,
            location: None,
        };
        let err = svc.update_status(&host, "m5", reopen).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition { .. }));

        let err = svc.update_status(&host, "m1", confirm(None)).await.unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
    }

    #[tokio::test]
    async fn cities_are_distinct_in_first_seen_order() {
        let svc = service();
        let input = CreateMeetup {
            title: "Another Beijing chat".into(),
            topic: MeetupTopic::Other,
            description: String::new(),
            thoughts: String::new(),
            city: "北京".into(),
            preferred_time: "any".into(),
            cost_split: CostSplit::Aa,
            max_guests: 2,
            tags: vec![],
            model_id: None,
        };
        svc.create(&member("u1"), input).await.unwrap();
        let cities = svc.cities().await.unwrap();
        assert_eq!(cities, ["北京", "上海", "深圳", "杭州", "广州"]);
    }
}
