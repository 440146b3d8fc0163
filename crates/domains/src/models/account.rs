//! Accounts, sessions and the credentials exchanged at login.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Record, UserInfo};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Member,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }

    /// Permission codes the front end uses to show or hide features.
    pub fn access_codes(self) -> Vec<String> {
        let codes: &[&str] = match self {
            Self::Admin => &["AC_100010", "AC_100020", "AC_100030"],
            Self::Member => &["AC_1000001", "AC_1000002"],
        };
        codes.iter().map(|c| (*c).to_owned()).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    #[default]
    Active,
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub username: String,
    pub nickname: String,
    pub email: String,
    pub phone: String,
    pub avatar: String,
    pub status: AccountStatus,
    pub role: Role,
    #[serde(skip)]
    pub password_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login_time: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Record for Account {
    const ENTITY: &'static str = "Account";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Account {
    pub fn display_name(&self) -> &str {
        if self.nickname.is_empty() {
            &self.username
        } else {
            &self.nickname
        }
    }

    pub fn principal(&self) -> Principal {
        Principal {
            user_id: self.id.clone(),
            username: self.username.clone(),
            role: self.role,
        }
    }

    pub fn user_info(&self) -> UserInfo {
        UserInfo::new(self.id.clone(), self.display_name(), self.avatar.clone())
    }

    pub fn actor(&self) -> Actor {
        Actor {
            principal: self.principal(),
            profile: self.user_info(),
        }
    }
}

/// The authenticated caller, as carried in an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: String,
    pub username: String,
    pub role: Role,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Owners and admins may edit or delete a record.
    pub fn can_modify(&self, owner_id: &str) -> bool {
        self.is_admin() || self.user_id == owner_id
    }
}

/// A signed-in caller together with the profile shown on what they author.
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    pub principal: Principal,
    pub profile: UserInfo,
}

impl Actor {
    pub fn id(&self) -> &str {
        &self.principal.user_id
    }

    pub fn can_modify(&self, owner_id: &str) -> bool {
        self.principal.can_modify(owner_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    /// Seconds until the token expires.
    pub expires_in: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResult {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
    pub user_info: Account,
}

/// Refresh responses carry the new access token in `data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshResult {
    pub data: String,
    pub status: u16,
}

pub const MIN_PASSWORD_LEN: usize = 6;

#[cfg(test)]
mod tests {
    use super::*;

    fn account(role: Role) -> Account {
        Account {
            id: "u1".into(),
            username: "alice".into(),
            nickname: String::new(),
            email: String::new(),
            phone: String::new(),
            avatar: String::new(),
            status: AccountStatus::Active,
            role,
            password_hash: "$argon2id$secret".into(),
            last_login_time: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn password_hash_never_serializes() {
        let json = serde_json::to_value(account(Role::Member)).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["role"], "member");
    }

    #[test]
    fn display_name_falls_back_to_username() {
        assert_eq!(account(Role::Member).display_name(), "alice");
    }

    #[test]
    fn only_owner_or_admin_may_modify() {
        let member = account(Role::Member).principal();
        assert!(member.can_modify("u1"));
        assert!(!member.can_modify("u2"));
        assert!(account(Role::Admin).principal().can_modify("u2"));
    }
}
