//! # Domain Models
//!
//! These structs represent the core entities of the thinking-models
//! platform. Newly created records use UUID v7 for time-ordered,
//! globally unique identification; seeded records keep their fixture ids.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{DomainError, Result};

pub mod account;
pub mod action;
pub mod analysis;
pub mod consultation;
pub mod discussion;
pub mod market;
pub mod meetup;
pub mod resources;
pub mod topic;

pub use account::*;
pub use action::*;
pub use analysis::*;
pub use consultation::*;
pub use discussion::*;
pub use market::*;
pub use meetup::*;
pub use resources::*;
pub use topic::*;

/// Anything a [`crate::ports::Store`] can hold.
pub trait Record: Clone + Send + Sync + 'static {
    /// Entity name used in `NotFound` errors.
    const ENTITY: &'static str;

    fn id(&self) -> &str;
}

/// Generates an identifier for a new record.
pub fn new_id() -> String {
    Uuid::now_v7().to_string()
}

/// Public profile shown next to authored content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: String,
    pub name: String,
    pub avatar: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interests: Option<Vec<String>>,
}

impl UserInfo {
    pub fn new(id: impl Into<String>, name: impl Into<String>, avatar: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            avatar: avatar.into(),
            bio: None,
            interests: None,
        }
    }
}

/// Per-record set of users that switched a flag on (like, favorite,
/// interest). Never serialized; the viewer's flag is derived from it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reactions(BTreeSet<String>);

impl Reactions {
    pub fn contains(&self, user_id: &str) -> bool {
        self.0.contains(user_id)
    }

    /// Flips `user_id`'s flag and moves `counter` by exactly one.
    /// Returns the new flag. The counter never goes below zero.
    pub fn toggle(&mut self, user_id: &str, counter: &mut u64) -> bool {
        if self.0.remove(user_id) {
            *counter = counter.saturating_sub(1);
            false
        } else {
            self.0.insert(user_id.to_owned());
            *counter += 1;
            true
        }
    }

    /// Switches the flag on. Returns `false` if it already was.
    pub fn add(&mut self, user_id: &str) -> bool {
        self.0.insert(user_id.to_owned())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Status enums with an explicit transition table.
pub trait Lifecycle: Copy + PartialEq + fmt::Display {
    fn allows(self, next: Self) -> bool;

    /// Re-setting the current status is a no-op and always allowed.
    fn transition(self, next: Self) -> Result<Self> {
        if self == next || self.allows(next) {
            Ok(next)
        } else {
            Err(DomainError::transition(self, next))
        }
    }
}

/// Body of bulk deletes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdList {
    pub ids: Vec<String>,
}

/// Rejects blank required text fields.
pub fn require_text(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DomainError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_twice_restores_flag_and_counter() {
        let mut reactions = Reactions::default();
        let mut count = 89;
        assert!(reactions.toggle("u1", &mut count));
        assert_eq!(count, 90);
        assert!(reactions.contains("u1"));
        assert!(!reactions.toggle("u1", &mut count));
        assert_eq!(count, 89);
        assert!(!reactions.contains("u1"));
    }

    #[test]
    fn toggle_off_never_goes_negative() {
        let mut reactions = Reactions::default();
        let mut count = 0;
        reactions.toggle("u1", &mut count);
        count = 0;
        reactions.toggle("u1", &mut count);
        assert_eq!(count, 0);
    }

    #[test]
    fn ids_are_unique() {
        let a = new_id();
        let b = new_id();
        assert_ne!(a, b);
        assert_eq!(Uuid::parse_str(&a).ok().map(|u| u.get_version_num()), Some(7));
    }

    #[test]
    fn blank_text_is_rejected() {
        assert!(require_text("title", "  ").is_err());
        assert!(require_text("title", "ok").is_ok());
    }
}
