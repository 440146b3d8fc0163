//! # AuthService
//!
//! Accounts, password login and the access/refresh token pair. Hashing,
//! signing and session storage are ports so the service stays testable
//! without real crypto.

use std::sync::Arc;

use chrono::Utc;
use domains::errors::{DomainError, Result};
use domains::models::*;
use domains::ports::{PasswordHasher, SessionStore, Store, TokenIssuer};
use tokio::sync::Mutex;

use crate::AuthPorts;

const INVALID_CREDENTIALS: &str = "invalid username or password";

pub struct AuthService {
    accounts: Arc<dyn Store<Account>>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenIssuer>,
    sessions: Arc<dyn SessionStore>,
    /// Serializes the username uniqueness check with the insert.
    registration: Mutex<()>,
}

impl AuthService {
    pub fn new(accounts: Arc<dyn Store<Account>>, ports: AuthPorts) -> Self {
        Self {
            accounts,
            hasher: ports.hasher,
            tokens: ports.tokens,
            sessions: ports.sessions,
            registration: Mutex::new(()),
        }
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<Account> {
        self.create_account(req, Role::Member).await
    }

    /// Creates the admin account unless the username is already taken.
    pub async fn bootstrap_admin(&self, id: &str, username: &str, password: &str) -> Result<Account> {
        let _guard = self.registration.lock().await;
        if let Some(existing) = self.find_by_username(username).await? {
            return Ok(existing);
        }
        let req = RegisterRequest {
            username: username.to_owned(),
            password: password.to_owned(),
            nickname: None,
            email: None,
            phone: None,
        };
        let mut account = self.build_account(req, Role::Admin).await?;
        account.id = id.to_owned();
        let account = self.accounts.insert(account).await?;
        tracing::info!(user_id = %account.id, username = %account.username, "admin account ready");
        Ok(account)
    }

    pub async fn login(&self, req: LoginRequest) -> Result<LoginResult> {
        let Some(account) = self.find_by_username(req.username.trim()).await? else {
            tracing::warn!(username = %req.username, "login for unknown user");
            return Err(DomainError::Unauthorized(INVALID_CREDENTIALS.into()));
        };
        if !self.hasher.verify(&req.password, &account.password_hash).await? {
            tracing::warn!(user_id = %account.id, "login with wrong password");
            return Err(DomainError::Unauthorized(INVALID_CREDENTIALS.into()));
        }
        if account.status == AccountStatus::Disabled {
            return Err(DomainError::Forbidden("account is disabled".into()));
        }

        let access = self.tokens.issue(&account.principal())?;
        let refresh_token = self.sessions.issue(&account.id).await?;
        let account = self
            .accounts
            .update(
                &account.id,
                Box::new(|a: &mut Account| {
                    a.last_login_time = Some(Utc::now());
                    Ok(())
                }),
            )
            .await?;
        tracing::info!(user_id = %account.id, "login succeeded");
        Ok(LoginResult {
            access_token: access.token,
            refresh_token,
            expires_in: access.expires_in,
            user_info: account,
        })
    }

    /// Swaps a live refresh token for a new access token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshResult> {
        let user_id = self.sessions.resolve(refresh_token).await?;
        let account = self.account(&user_id).await?;
        if account.status == AccountStatus::Disabled {
            self.sessions.revoke(refresh_token).await?;
            return Err(DomainError::Unauthorized("account is disabled".into()));
        }
        let access = self.tokens.issue(&account.principal())?;
        tracing::debug!(user_id = %account.id, "access token refreshed");
        Ok(RefreshResult {
            data: access.token,
            status: 200,
        })
    }

    pub async fn logout(&self, refresh_token: Option<&str>) -> Result<()> {
        if let Some(token) = refresh_token.filter(|t| !t.is_empty()) {
            self.sessions.revoke(token).await?;
        }
        Ok(())
    }

    /// Verifies a bearer token.
    pub fn authenticate(&self, access_token: &str) -> Result<Principal> {
        self.tokens.verify(access_token)
    }

    pub fn access_codes(&self, caller: &Principal) -> Vec<String> {
        caller.role.access_codes()
    }

    pub async fn user_info(&self, caller: &Principal) -> Result<Account> {
        self.account(&caller.user_id).await
    }

    /// The caller with the public profile stamped on what they author.
    pub async fn actor(&self, caller: &Principal) -> Result<Actor> {
        Ok(self.account(&caller.user_id).await?.actor())
    }

    async fn account(&self, user_id: &str) -> Result<Account> {
        match self.accounts.get(user_id).await {
            Err(DomainError::NotFound { .. }) => {
                Err(DomainError::Unauthorized("account no longer exists".into()))
            }
            other => other,
        }
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>> {
        Ok(self
            .accounts
            .list()
            .await?
            .into_iter()
            .find(|a| a.username == username))
    }

    async fn create_account(&self, req: RegisterRequest, role: Role) -> Result<Account> {
        let account = self.build_account(req, role).await?;
        let _guard = self.registration.lock().await;
        if self.find_by_username(&account.username).await?.is_some() {
            return Err(DomainError::Conflict(format!(
                "username {} is taken",
                account.username
            )));
        }
        let account = self.accounts.insert(account).await?;
        tracing::info!(user_id = %account.id, username = %account.username, role = account.role.as_str(), "account registered");
        Ok(account)
    }

    async fn build_account(&self, req: RegisterRequest, role: Role) -> Result<Account> {
        let username = req.username.trim().to_owned();
        require_text("username", &username)?;
        if req.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(DomainError::Validation(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }
        let password_hash = self.hasher.hash(&req.password).await?;
        Ok(Account {
            id: new_id(),
            nickname: req.nickname.filter(|n| !n.trim().is_empty()).unwrap_or_else(|| username.clone()),
            email: req.email.unwrap_or_default(),
            phone: req.phone.unwrap_or_default(),
            avatar: format!("https://api.dicebear.com/7.x/avataaars/svg?seed={username}"),
            username,
            status: AccountStatus::Active,
            role,
            password_hash,
            last_login_time: None,
            created_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::ports::{MockPasswordHasher, MockSessionStore, MockTokenIssuer};
    use storage_adapters::MemoryTable;

    fn hasher() -> MockPasswordHasher {
        let mut hasher = MockPasswordHasher::new();
        hasher
            .expect_hash()
            .returning(|password| Ok(format!("hashed:{password}")));
        hasher
            .expect_verify()
            .returning(|password, hash| Ok(hash == format!("hashed:{password}")));
        hasher
    }

    fn tokens() -> MockTokenIssuer {
        let mut tokens = MockTokenIssuer::new();
        tokens.expect_issue().returning(|p| {
            Ok(IssuedToken {
                token: format!("access:{}", p.user_id),
                expires_in: 900,
            })
        });
        tokens
    }

    fn service(sessions: MockSessionStore) -> AuthService {
        AuthService::new(
            Arc::new(MemoryTable::<Account>::default()),
            AuthPorts {
                hasher: Arc::new(hasher()),
                tokens: Arc::new(tokens()),
                sessions: Arc::new(sessions),
            },
        )
    }

    fn register(username: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.into(),
            password: password.into(),
            nickname: None,
            email: None,
            phone: None,
        }
    }

    #[tokio::test]
    async fn register_then_login_issues_both_tokens() {
        let mut sessions = MockSessionStore::new();
        sessions
            .expect_issue()
            .times(1)
            .returning(|user_id| Ok(format!("refresh:{user_id}")));
        let svc = service(sessions);

        let account = svc.register(register("ada", "correct horse")).await.unwrap();
        assert_eq!(account.role, Role::Member);
        assert_eq!(account.nickname, "ada");

        let result = svc
            .login(LoginRequest { username: "ada".into(), password: "correct horse".into() })
            .await
            .unwrap();
        assert_eq!(result.access_token, format!("access:{}", account.id));
        assert_eq!(result.refresh_token, format!("refresh:{}", account.id));
        assert_eq!(result.expires_in, 900);
        assert!(result.user_info.last_login_time.is_some());
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_look_the_same() {
        let mut sessions = MockSessionStore::new();
        sessions.expect_issue().never();
        let svc = service(sessions);
        svc.register(register("ada", "correct horse")).await.unwrap();

        let wrong = svc
            .login(LoginRequest { username: "ada".into(), password: "nope-nope".into() })
            .await
            .unwrap_err();
        let unknown = svc
            .login(LoginRequest { username: "bob".into(), password: "whatever".into() })
            .await
            .unwrap_err();
        assert_eq!(wrong, unknown);
        assert!(matches!(wrong, DomainError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn registration_rules() {
        let svc = service(MockSessionStore::new());
        assert!(matches!(
            svc.register(register("ada", "short")).await,
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            svc.register(register("  ", "long enough")).await,
            Err(DomainError::Validation(_))
        ));
        svc.register(register("ada", "long enough")).await.unwrap();
        assert!(matches!(
            svc.register(register(" ada ", "long enough")).await,
            Err(DomainError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn refresh_resolves_the_session_owner() {
        let mut sessions = MockSessionStore::new();
        sessions
            .expect_resolve()
            .withf(|token| token == "live")
            .returning(|_| Ok("admin-1".into()));
        sessions
            .expect_resolve()
            .returning(|_| Err(DomainError::Unauthorized("session expired".into())));
        let svc = service(sessions);
        svc.bootstrap_admin("admin-1", "root", "root-password").await.unwrap();

        let refreshed = svc.refresh("live").await.unwrap();
        assert_eq!(refreshed, RefreshResult { data: "access:admin-1".into(), status: 200 });
        assert!(matches!(
            svc.refresh("stale").await,
            Err(DomainError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn logout_revokes_only_when_a_token_is_given() {
        let mut sessions = MockSessionStore::new();
        sessions.expect_revoke().times(1).returning(|_| Ok(()));
        let svc = service(sessions);
        svc.logout(Some("live")).await.unwrap();
        svc.logout(None).await.unwrap();
        svc.logout(Some("")).await.unwrap();
    }

    #[tokio::test]
    async fn bootstrap_is_idempotent_and_grants_admin_codes() {
        let svc = service(MockSessionStore::new());
        let first = svc.bootstrap_admin("1", "root", "root-password").await.unwrap();
        let second = svc.bootstrap_admin("1", "root", "other-password").await.unwrap();
        assert_eq!(first.id, "1");
        assert_eq!(second.password_hash, first.password_hash);

        let principal = first.principal();
        assert!(principal.is_admin());
        assert_eq!(svc.access_codes(&principal), ["AC_100010", "AC_100020", "AC_100030"]);
        let actor = svc.actor(&principal).await.unwrap();
        assert_eq!(actor.profile.name, "root");
    }

    #[tokio::test]
    async fn deleted_accounts_cannot_act() {
        let svc = service(MockSessionStore::new());
        let ghost = Principal {
            user_id: "ghost".into(),
            username: "ghost".into(),
            role: Role::Member,
        };
        assert!(matches!(
            svc.user_info(&ghost).await,
            Err(DomainError::Unauthorized(_))
        ));
    }
}
