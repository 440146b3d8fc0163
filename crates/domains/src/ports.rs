//! # Ports
//!
//! Contracts the services depend on. Adapters in sibling crates implement
//! them; the binary picks which ones to wire in.

use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::Result;
use crate::models::*;

/// In-place edit applied under the store's per-record lock.
pub type Mutation<T> = Box<dyn FnOnce(&mut T) -> Result<()> + Send>;

/// Predicate used by bulk removal.
pub type Filter<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// Ordered record table for one entity type.
///
/// Listing returns records in storage order: `insert` places a record at
/// the front (newest first), `append` at the back (used when seeding).
#[async_trait]
pub trait Store<T: Record>: Send + Sync {
    async fn insert(&self, record: T) -> Result<T>;
    async fn append(&self, record: T) -> Result<T>;
    async fn get(&self, id: &str) -> Result<T>;
    async fn list(&self) -> Result<Vec<T>>;

    /// Runs `mutation` atomically against one record and returns the result.
    /// Nothing is written when the mutation fails.
    async fn update(&self, id: &str, mutation: Mutation<T>) -> Result<T>;

    async fn remove(&self, id: &str) -> Result<T>;

    /// Removes every record matching `filter`, returning how many went.
    async fn remove_where(&self, filter: Filter<T>) -> Result<usize>;
}

/// Long-lived refresh sessions.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Opens a session for `user_id` and returns the opaque refresh token.
    async fn issue(&self, user_id: &str) -> Result<String>;

    /// Returns the owning user id, or `Unauthorized` for unknown or expired
    /// tokens.
    async fn resolve(&self, token: &str) -> Result<String>;

    async fn revoke(&self, token: &str) -> Result<()>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    async fn hash(&self, password: &str) -> Result<String>;
    async fn verify(&self, password: &str, hash: &str) -> Result<bool>;
}

/// Signs and checks short-lived access tokens.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait TokenIssuer: Send + Sync {
    fn issue(&self, principal: &Principal) -> Result<IssuedToken>;
    fn verify(&self, token: &str) -> Result<Principal>;
}

/// One store per entity type, as handed to the services.
#[derive(Clone)]
pub struct Repositories {
    pub accounts: Arc<dyn Store<Account>>,
    pub discussions: Arc<dyn Store<Discussion>>,
    pub comments: Arc<dyn Store<Comment>>,
    pub meetups: Arc<dyn Store<Meetup>>,
    pub meetup_applications: Arc<dyn Store<MeetupApplication>>,
    pub experts: Arc<dyn Store<Expert>>,
    pub consultations: Arc<dyn Store<Consultation>>,
    pub consultation_applications: Arc<dyn Store<ConsultationApplication>>,
    pub actions: Arc<dyn Store<Action>>,
    pub follow_ups: Arc<dyn Store<FollowUp>>,
    pub analyses: Arc<dyn Store<Analysis>>,
    pub topics: Arc<dyn Store<Topic>>,
    pub models: Arc<dyn Store<ThinkingModel>>,
    pub categories: Arc<dyn Store<Category>>,
}
