use serde::{Deserialize, Serialize};

use nexus_common::{get_current_timestamp, hash_password, verify_password, SessionToken};

use crate::commands::Credentials;
use crate::error::{NexusError, NexusResult};
use crate::store::SharedStore;
use crate::user::{LevelInfo, User, UserRole};

/// The caller of an authenticated request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub role: UserRole,
}

impl AuthenticatedUser {
    pub fn require_moderator(&self) -> NexusResult<()> {
        if self.role.can_moderate() {
            Ok(())
        } else {
            Err(NexusError::Forbidden("moderator role required".into()))
        }
    }

    pub fn require_admin(&self) -> NexusResult<()> {
        if self.role.is_admin() {
            Ok(())
        } else {
            Err(NexusError::Forbidden("admin role required".into()))
        }
    }
}

impl From<&User> for AuthenticatedUser {
    fn from(user: &User) -> Self {
        Self { id: user.id, role: user.role }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AccountSettings {
    pub secret: String,
    pub session_ttl_secs: i64,
    /// Usernames that register straight into the admin role.
    pub admin_usernames: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user: User,
    pub token: String,
}

#[derive(Clone)]
pub struct Accounts {
    store: SharedStore,
    settings: AccountSettings,
}

impl Accounts {
    pub fn new(store: SharedStore, settings: AccountSettings) -> Self {
        Self { store, settings }
    }

    pub async fn register(&self, credentials: &Credentials) -> NexusResult<Session> {
        let role = if self
            .settings
            .admin_usernames
            .iter()
            .any(|name| name.eq_ignore_ascii_case(&credentials.username))
        {
            UserRole::Admin
        } else {
            UserRole::User
        };

        let password_hash = hash_password(&credentials.password);
        let user = self
            .store
            .create_user(&credentials.username, &password_hash, role)
            .await?;
        tracing::info!(user_id = user.id, %role, "[Accounts] registered {}", user.username);
        Ok(self.open_session(user))
    }

    pub async fn login(&self, username: &str, password: &str) -> NexusResult<Session> {
        let user = self
            .store
            .find_user_by_username(username.trim())
            .await?
            .filter(|user| verify_password(password, &user.password_hash))
            .ok_or_else(|| NexusError::Unauthorized("invalid username or password".into()))?;
        Ok(self.open_session(user))
    }

    fn open_session(&self, user: User) -> Session {
        let token = SessionToken::new(user.id, get_current_timestamp()).sign(&self.settings.secret);
        Session { user, token }
    }

    /// Resolves a bearer token to its (still existing) user.
    pub async fn authenticate(&self, token: &str) -> NexusResult<AuthenticatedUser> {
        let session = SessionToken::verify(
            token,
            &self.settings.secret,
            get_current_timestamp(),
            self.settings.session_ttl_secs,
        )
        .map_err(|e| NexusError::Unauthorized(e.to_string()))?;

        let user = self
            .store
            .get_user(session.user_id)
            .await?
            .ok_or_else(|| NexusError::Unauthorized("account no longer exists".into()))?;
        Ok(AuthenticatedUser::from(&user))
    }

    pub async fn get_user(&self, id: i64) -> NexusResult<User> {
        self.store
            .get_user(id)
            .await?
            .ok_or_else(|| NexusError::not_found(format!("user {id}")))
    }

    pub async fn level_info(&self, id: i64) -> NexusResult<LevelInfo> {
        Ok(self.get_user(id).await?.level_info())
    }

    pub async fn set_role(&self, actor: &AuthenticatedUser, id: i64, role: UserRole) -> NexusResult<User> {
        actor.require_admin()?;
        if actor.id == id && role != UserRole::Admin {
            return Err(NexusError::conflict("admins cannot demote themselves"));
        }
        let user = self.store.update_user_role(id, role).await?;
        tracing::info!(user_id = id, %role, by = actor.id, "[Accounts] role changed");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::memory::MemoryStore;

    fn accounts() -> Accounts {
        Accounts::new(
            Arc::new(MemoryStore::new()),
            AccountSettings {
                secret: "test-secret".into(),
                session_ttl_secs: 3600,
                admin_usernames: vec!["Overseer".into()],
            },
        )
    }

    fn credentials(username: &str) -> Credentials {
        Credentials { username: username.into(), password: "s3cret-shadow".into() }
    }

    #[tokio::test]
    async fn register_then_login_and_authenticate() {
        let accounts = accounts();
        let registered = accounts.register(&credentials("nyx")).await.unwrap();
        assert_eq!(registered.user.role, UserRole::User);
        assert_eq!(registered.user.level, 1);

        let session = accounts.login("nyx", "s3cret-shadow").await.unwrap();
        let caller = accounts.authenticate(&session.token).await.unwrap();
        assert_eq!(caller, AuthenticatedUser { id: registered.user.id, role: UserRole::User });
    }

    #[tokio::test]
    async fn wrong_password_and_bad_token_are_unauthorized() {
        let accounts = accounts();
        accounts.register(&credentials("nyx")).await.unwrap();
        assert!(matches!(accounts.login("nyx", "nope-nope-nope").await, Err(NexusError::Unauthorized(_))));
        assert!(matches!(accounts.login("ghost", "s3cret-shadow").await, Err(NexusError::Unauthorized(_))));
        assert!(matches!(accounts.authenticate("1.2.abc").await, Err(NexusError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let accounts = accounts();
        accounts.register(&credentials("nyx")).await.unwrap();
        assert!(matches!(accounts.register(&credentials("nyx")).await, Err(NexusError::Conflict(_))));
    }

    #[tokio::test]
    async fn configured_admins_and_role_changes() {
        let accounts = accounts();
        let admin = accounts.register(&credentials("overseer")).await.unwrap().user;
        assert_eq!(admin.role, UserRole::Admin);
        let member = accounts.register(&credentials("nyx")).await.unwrap().user;

        let admin_caller = AuthenticatedUser::from(&admin);
        let promoted = accounts.set_role(&admin_caller, member.id, UserRole::Moderator).await.unwrap();
        assert_eq!(promoted.role, UserRole::Moderator);

        let moderator = AuthenticatedUser::from(&promoted);
        assert!(matches!(
            accounts.set_role(&moderator, admin.id, UserRole::User).await,
            Err(NexusError::Forbidden(_))
        ));
        assert!(matches!(
            accounts.set_role(&admin_caller, admin.id, UserRole::User).await,
            Err(NexusError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn level_info_for_missing_user() {
        assert!(matches!(accounts().level_info(77).await, Err(NexusError::NotFound(_))));
    }
}
