use std::sync::Arc;

use storage::repository::UserRepository;
use trainer_core::model::{User, UserDirectory, UserDraft, UserId, UserUpdate};

use crate::Clock;
use crate::error::UserServiceError;

/// Accounts, login state and admin checks.
#[derive(Clone)]
pub struct UserService {
    clock: Clock,
    repo: Arc<dyn UserRepository>,
}

impl UserService {
    #[must_use]
    pub fn new(clock: Clock, repo: Arc<dyn UserRepository>) -> Self {
        Self { clock, repo }
    }

    /// All users; a directory holding only the default admin when nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns `UserServiceError` on storage failures.
    pub async fn users(&self) -> Result<UserDirectory, UserServiceError> {
        let users = self.repo.load_users().await?;
        Ok(users.unwrap_or_else(|| UserDirectory::with_default_admin(self.clock.now())))
    }

    /// Persist the default admin unless users exist (or `force` is set).
    /// Returns whether anything was written.
    ///
    /// # Errors
    ///
    /// Returns `UserServiceError` on storage failures.
    pub async fn seed(&self, force: bool) -> Result<bool, UserServiceError> {
        if !force && self.repo.load_users().await?.is_some() {
            return Ok(false);
        }
        let users = UserDirectory::with_default_admin(self.clock.now());
        self.repo.save_users(&users).await?;
        self.repo.set_current_user(None).await?;
        tracing::info!(force, "seeded default admin");
        Ok(true)
    }

    /// Log in by username (ignoring case) and exact password.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCredentials` when no user matches.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, UserServiceError> {
        let users = self.users().await?;
        let Some(user) = users.authenticate(username, password).cloned() else {
            tracing::warn!(username, "login failed");
            return Err(UserServiceError::InvalidCredentials);
        };
        self.repo.set_current_user(Some(user.id())).await?;
        tracing::info!(user = %user.id(), "logged in");
        Ok(user)
    }

    /// # Errors
    ///
    /// Returns `UserServiceError` on storage failures.
    pub async fn logout(&self) -> Result<(), UserServiceError> {
        self.repo.set_current_user(None).await?;
        tracing::info!("logged out");
        Ok(())
    }

    /// The logged-in user, if the stored id still names an account.
    ///
    /// # Errors
    ///
    /// Returns `UserServiceError` on storage failures.
    pub async fn current_user(&self) -> Result<Option<User>, UserServiceError> {
        let Some(id) = self.repo.current_user().await? else {
            return Ok(None);
        };
        let users = self.users().await?;
        Ok(users.get(id).cloned())
    }

    /// The logged-in user, who must be an admin.
    ///
    /// # Errors
    ///
    /// Returns `NotLoggedIn` without a session and `Forbidden` for non-admins.
    pub async fn require_admin(&self) -> Result<User, UserServiceError> {
        let user = self
            .current_user()
            .await?
            .ok_or(UserServiceError::NotLoggedIn)?;
        if !user.is_admin() {
            return Err(UserServiceError::Forbidden);
        }
        Ok(user)
    }

    /// # Errors
    ///
    /// Returns `UserServiceError::User` for invalid or colliding input.
    pub async fn add_user(&self, draft: UserDraft) -> Result<User, UserServiceError> {
        let mut users = self.users().await?;
        let user = users.add(draft, self.clock.now())?.clone();
        self.repo.save_users(&users).await?;
        tracing::info!(user = %user.id(), role = user.role().as_str(), "user added");
        Ok(user)
    }

    /// # Errors
    ///
    /// Returns `UserServiceError::User` for unknown ids, collisions or
    /// demoting the last admin.
    pub async fn update_user(
        &self,
        id: UserId,
        update: UserUpdate,
    ) -> Result<User, UserServiceError> {
        let mut users = self.users().await?;
        let user = users.update(id, update)?.clone();
        self.repo.save_users(&users).await?;
        tracing::info!(user = %id, "user updated");
        Ok(user)
    }

    /// Delete a user. Deleting the logged-in user also logs out.
    ///
    /// # Errors
    ///
    /// Returns `UserServiceError::User` for unknown ids and the last admin.
    pub async fn remove_user(&self, id: UserId) -> Result<User, UserServiceError> {
        let mut users = self.users().await?;
        let removed = users.remove(id)?;
        self.repo.save_users(&users).await?;
        if self.repo.current_user().await? == Some(id) {
            self.repo.set_current_user(None).await?;
        }
        tracing::info!(user = %id, "user removed");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::repository::InMemoryRepository;
    use trainer_core::model::{DEFAULT_ADMIN_USERNAME, Role, UserError};
    use trainer_core::time::fixed_now;

    fn service() -> UserService {
        UserService::new(Clock::fixed(fixed_now()), Arc::new(InMemoryRepository::new()))
    }

    fn draft(username: &str, email: &str) -> UserDraft {
        UserDraft {
            username: username.into(),
            email: email.into(),
            password: "pw".into(),
            role: None,
        }
    }

    #[tokio::test]
    async fn default_admin_can_log_in_ignoring_username_case() {
        let svc = service();
        let user = svc.login("ADMIN", "admin123").await.unwrap();
        assert_eq!(user.username(), DEFAULT_ADMIN_USERNAME);
        assert_eq!(svc.current_user().await.unwrap().unwrap().id(), user.id());
        assert!(svc.require_admin().await.is_ok());

        let err = svc.login("admin", "ADMIN123").await.unwrap_err();
        assert!(matches!(err, UserServiceError::InvalidCredentials));
    }

    #[tokio::test]
    async fn logout_clears_the_session() {
        let svc = service();
        svc.login("admin", "admin123").await.unwrap();
        svc.logout().await.unwrap();
        assert!(svc.current_user().await.unwrap().is_none());
        assert!(matches!(
            svc.require_admin().await.unwrap_err(),
            UserServiceError::NotLoggedIn
        ));
    }

    #[tokio::test]
    async fn regular_users_are_not_admins() {
        let svc = service();
        svc.add_user(draft("casey", "casey@example.com")).await.unwrap();
        let user = svc.login("casey", "pw").await.unwrap();
        assert_eq!(user.role(), Role::User);
        assert!(matches!(
            svc.require_admin().await.unwrap_err(),
            UserServiceError::Forbidden
        ));
    }

    #[tokio::test]
    async fn duplicates_are_rejected_ignoring_case() {
        let svc = service();
        svc.add_user(draft("casey", "casey@example.com")).await.unwrap();

        let err = svc
            .add_user(draft("CASEY", "other@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, UserServiceError::User(UserError::UsernameTaken)));

        let err = svc
            .add_user(draft("robin", "Casey@Example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, UserServiceError::User(UserError::EmailTaken)));
    }

    #[tokio::test]
    async fn update_rejects_collisions_with_other_users() {
        let svc = service();
        let casey = svc.add_user(draft("casey", "casey@example.com")).await.unwrap();

        let err = svc
            .update_user(
                casey.id(),
                UserUpdate {
                    username: Some("Admin".into()),
                    ..UserUpdate::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, UserServiceError::User(UserError::UsernameTaken)));

        let updated = svc
            .update_user(
                casey.id(),
                UserUpdate {
                    email: Some("casey@pmo.example".into()),
                    ..UserUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.email(), "casey@pmo.example");
    }

    #[tokio::test]
    async fn last_admin_cannot_be_removed() {
        let svc = service();
        let admin = svc.login("admin", "admin123").await.unwrap();
        let err = svc.remove_user(admin.id()).await.unwrap_err();
        assert!(matches!(err, UserServiceError::User(UserError::LastAdmin)));
    }

    #[tokio::test]
    async fn removing_the_logged_in_user_logs_out() {
        let svc = service();
        let casey = svc.add_user(draft("casey", "casey@example.com")).await.unwrap();
        svc.login("casey", "pw").await.unwrap();

        svc.remove_user(casey.id()).await.unwrap();
        assert!(svc.current_user().await.unwrap().is_none());
        assert_eq!(svc.users().await.unwrap().len(), 1);
    }
}
