//! # services
//!
//! Application services for the thinking-models platform. Each service owns
//! the stores of one content area and applies the list-query pipeline,
//! ownership checks and status transitions on top of them.

pub mod action;
pub mod analysis;
pub mod auth;
pub mod consultation;
pub mod discussion;
pub mod market;
pub mod meetup;
pub mod topic;

use std::sync::Arc;

use domains::errors::{DomainError, Result};
use domains::models::{Principal, ThinkingModel};
use domains::ports::{PasswordHasher, Repositories, SessionStore, Store, TokenIssuer};
use domains::query::DEFAULT_MAX_PAGE_SIZE;

pub use action::ActionService;
pub use analysis::AnalysisService;
pub use auth::AuthService;
pub use consultation::ConsultationService;
pub use discussion::DiscussionService;
pub use market::MarketService;
pub use meetup::MeetupService;
pub use topic::TopicService;

/// Knobs shared by every service.
#[derive(Debug, Clone, Copy)]
pub struct ServiceOptions {
    pub max_page_size: u32,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }
}

/// Credential ports used by [`AuthService`].
#[derive(Clone)]
pub struct AuthPorts {
    pub hasher: Arc<dyn PasswordHasher>,
    pub tokens: Arc<dyn TokenIssuer>,
    pub sessions: Arc<dyn SessionStore>,
}

/// Every service, wired against one set of repositories.
#[derive(Clone)]
pub struct Services {
    pub auth: Arc<AuthService>,
    pub discussions: Arc<DiscussionService>,
    pub meetups: Arc<MeetupService>,
    pub consultations: Arc<ConsultationService>,
    pub actions: Arc<ActionService>,
    pub analyses: Arc<AnalysisService>,
    pub topics: Arc<TopicService>,
    pub market: Arc<MarketService>,
}

impl Services {
    pub fn new(repos: Repositories, auth: AuthPorts, options: ServiceOptions) -> Self {
        Self {
            auth: Arc::new(AuthService::new(repos.accounts.clone(), auth)),
            discussions: Arc::new(DiscussionService::new(&repos, options)),
            meetups: Arc::new(MeetupService::new(&repos, options)),
            consultations: Arc::new(ConsultationService::new(&repos, options)),
            actions: Arc::new(ActionService::new(&repos, options)),
            analyses: Arc::new(AnalysisService::new(&repos, options)),
            topics: Arc::new(TopicService::new(&repos, options)),
            market: Arc::new(MarketService::new(&repos, options)),
        }
    }
}

pub(crate) fn ensure_can_modify(caller: &Principal, owner_id: &str, entity: &str) -> Result<()> {
    if caller.can_modify(owner_id) {
        Ok(())
    } else {
        Err(DomainError::Forbidden(format!(
            "only the owner can change this {entity}"
        )))
    }
}

pub(crate) fn ensure_admin(caller: &Principal) -> Result<()> {
    if caller.is_admin() {
        Ok(())
    } else {
        Err(DomainError::Forbidden("admin role required".into()))
    }
}

/// Looks up the display name of a referenced thinking model.
pub(crate) async fn model_name(
    models: &dyn Store<ThinkingModel>,
    model_id: Option<&str>,
) -> Result<Option<String>> {
    let Some(id) = model_id.filter(|id| !id.is_empty()) else {
        return Ok(None);
    };
    match models.get(id).await {
        Ok(model) => Ok(Some(model.title)),
        Err(DomainError::NotFound { .. }) => {
            Err(DomainError::Validation(format!("unknown thinking model {id}")))
        }
        Err(err) => Err(err),
    }
}
