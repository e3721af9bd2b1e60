use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::UserId;

/// Username of the account every fresh installation starts with.
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
const DEFAULT_ADMIN_PASSWORD: &str = "admin123";
const DEFAULT_ADMIN_EMAIL: &str = "admin@example.com";

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UserError {
    #[error("username cannot be empty")]
    EmptyUsername,

    #[error("password cannot be empty")]
    EmptyPassword,

    #[error("invalid email address: {0}")]
    InvalidEmail(String),

    #[error("username already exists")]
    UsernameTaken,

    #[error("email already exists")]
    EmailTaken,

    #[error("cannot remove the last admin user")]
    LastAdmin,

    #[error("user {0} not found")]
    NotFound(UserId),

    #[error("unknown role: {0}")]
    UnknownRole(String),
}

//
// ─── ROLE ──────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    #[must_use]
    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl std::str::FromStr for Role {
    type Err = UserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            other => Err(UserError::UnknownRole(other.to_owned())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── USER ──────────────────────────────────────────────────────────────────────
//

/// A stored account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    id: UserId,
    username: String,
    email: String,
    password: String,
    role: Role,
    created_at: DateTime<Utc>,
}

impl User {
    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn password_matches(&self, password: &str) -> bool {
        self.password == password
    }
}

/// Input for creating a user.
#[derive(Debug, Clone, Default)]
pub struct UserDraft {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Option<Role>,
}

/// Partial update; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

fn normalize_username(raw: &str) -> Result<String, UserError> {
    let username = raw.trim();
    if username.is_empty() {
        return Err(UserError::EmptyUsername);
    }
    Ok(username.to_owned())
}

fn normalize_email(raw: &str) -> Result<String, UserError> {
    let email = raw.trim();
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
    if !valid {
        return Err(UserError::InvalidEmail(email.to_owned()));
    }
    Ok(email.to_owned())
}

fn require_password(raw: &str) -> Result<String, UserError> {
    if raw.is_empty() {
        return Err(UserError::EmptyPassword);
    }
    Ok(raw.to_owned())
}

//
// ─── DIRECTORY ─────────────────────────────────────────────────────────────────
//

/// All known accounts.
///
/// Usernames and emails are unique ignoring case, and at least one admin
/// always remains.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserDirectory {
    users: Vec<User>,
}

impl UserDirectory {
    /// Directory holding only the default admin account.
    #[must_use]
    pub fn with_default_admin(created_at: DateTime<Utc>) -> Self {
        Self {
            users: vec![User {
                id: UserId::new(1),
                username: DEFAULT_ADMIN_USERNAME.to_owned(),
                email: DEFAULT_ADMIN_EMAIL.to_owned(),
                password: DEFAULT_ADMIN_PASSWORD.to_owned(),
                role: Role::Admin,
                created_at,
            }],
        }
    }

    #[must_use]
    pub fn users(&self) -> &[User] {
        &self.users
    }

    #[must_use]
    pub fn get(&self, id: UserId) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Find the user whose username matches ignoring case and whose password
    /// matches exactly.
    #[must_use]
    pub fn authenticate(&self, username: &str, password: &str) -> Option<&User> {
        let username = username.trim().to_lowercase();
        self.users
            .iter()
            .find(|u| u.username.to_lowercase() == username && u.password_matches(password))
    }

    /// Create a user. The role defaults to `Role::User`.
    ///
    /// # Errors
    ///
    /// Returns validation errors for blank/invalid fields and
    /// `UsernameTaken`/`EmailTaken` for case-insensitive collisions.
    pub fn add(&mut self, draft: UserDraft, created_at: DateTime<Utc>) -> Result<&User, UserError> {
        let username = normalize_username(&draft.username)?;
        let email = normalize_email(&draft.email)?;
        let password = require_password(&draft.password)?;
        self.ensure_unique(&username, &email, None)?;

        let user = User {
            id: self.next_id(),
            username,
            email,
            password,
            role: draft.role.unwrap_or_default(),
            created_at,
        };
        self.users.push(user);
        let index = self.users.len() - 1;
        Ok(&self.users[index])
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown ids, collision errors for names/emails
    /// taken by another user, and `LastAdmin` when demoting the only admin.
    pub fn update(&mut self, id: UserId, update: UserUpdate) -> Result<&User, UserError> {
        let index = self.index_of(id)?;

        let username = update.username.as_deref().map(normalize_username).transpose()?;
        let email = update.email.as_deref().map(normalize_email).transpose()?;
        let password = update
            .password
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(require_password)
            .transpose()?;

        let current = &self.users[index];
        self.ensure_unique(
            username.as_deref().unwrap_or(&current.username),
            email.as_deref().unwrap_or(&current.email),
            Some(id),
        )?;
        if current.is_admin() && update.role == Some(Role::User) && self.admin_count() <= 1 {
            return Err(UserError::LastAdmin);
        }

        let user = &mut self.users[index];
        if let Some(username) = username {
            user.username = username;
        }
        if let Some(email) = email {
            user.email = email;
        }
        if let Some(password) = password {
            user.password = password;
        }
        if let Some(role) = update.role {
            user.role = role;
        }
        Ok(&self.users[index])
    }

    /// Delete a user.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for unknown ids and `LastAdmin` for the only admin.
    pub fn remove(&mut self, id: UserId) -> Result<User, UserError> {
        let index = self.index_of(id)?;
        if self.users[index].is_admin() && self.admin_count() <= 1 {
            return Err(UserError::LastAdmin);
        }
        Ok(self.users.remove(index))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    fn admin_count(&self) -> usize {
        self.users.iter().filter(|u| u.is_admin()).count()
    }

    fn index_of(&self, id: UserId) -> Result<usize, UserError> {
        self.users
            .iter()
            .position(|u| u.id == id)
            .ok_or(UserError::NotFound(id))
    }

    fn ensure_unique(
        &self,
        username: &str,
        email: &str,
        except: Option<UserId>,
    ) -> Result<(), UserError> {
        let username = username.to_lowercase();
        let email = email.to_lowercase();
        let others = self.users.iter().filter(|u| Some(u.id) != except);
        for user in others {
            if user.username.to_lowercase() == username {
                return Err(UserError::UsernameTaken);
            }
            if user.email.to_lowercase() == email {
                return Err(UserError::EmailTaken);
            }
        }
        Ok(())
    }

    fn next_id(&self) -> UserId {
        self.users
            .iter()
            .map(|u| u.id)
            .max()
            .map_or_else(|| UserId::new(1), |id| id.next())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn draft(username: &str, email: &str) -> UserDraft {
        UserDraft {
            username: username.into(),
            email: email.into(),
            password: "secret".into(),
            role: None,
        }
    }

    #[test]
    fn default_admin_can_authenticate_case_insensitively() {
        let dir = UserDirectory::with_default_admin(fixed_now());
        let user = dir.authenticate("ADMIN", "admin123").unwrap();
        assert!(user.is_admin());
        assert!(dir.authenticate("admin", "ADMIN123").is_none());
    }

    #[test]
    fn add_defaults_role_and_assigns_next_id() {
        let mut dir = UserDirectory::with_default_admin(fixed_now());
        let user = dir.add(draft("jane", "jane@example.com"), fixed_now()).unwrap();
        assert_eq!(user.role(), Role::User);
        assert_eq!(user.id(), UserId::new(2));
    }

    #[test]
    fn add_rejects_duplicates_ignoring_case() {
        let mut dir = UserDirectory::with_default_admin(fixed_now());
        let err = dir.add(draft("Admin", "other@example.com"), fixed_now()).unwrap_err();
        assert_eq!(err, UserError::UsernameTaken);
        let err = dir.add(draft("other", "ADMIN@example.com"), fixed_now()).unwrap_err();
        assert_eq!(err, UserError::EmailTaken);
    }

    #[test]
    fn add_validates_fields() {
        let mut dir = UserDirectory::with_default_admin(fixed_now());
        assert_eq!(
            dir.add(draft(" ", "a@b.c"), fixed_now()).unwrap_err(),
            UserError::EmptyUsername
        );
        assert!(matches!(
            dir.add(draft("bob", "bob.example.com"), fixed_now()).unwrap_err(),
            UserError::InvalidEmail(_)
        ));
        let mut no_password = draft("bob", "bob@example.com");
        no_password.password.clear();
        assert_eq!(
            dir.add(no_password, fixed_now()).unwrap_err(),
            UserError::EmptyPassword
        );
    }

    #[test]
    fn update_allows_keeping_own_name_but_not_others() {
        let mut dir = UserDirectory::with_default_admin(fixed_now());
        let id = dir.add(draft("jane", "jane@example.com"), fixed_now()).unwrap().id();

        let same = UserUpdate {
            username: Some("JANE".into()),
            ..UserUpdate::default()
        };
        assert_eq!(dir.update(id, same).unwrap().username(), "JANE");

        let clash = UserUpdate {
            email: Some("admin@example.com".into()),
            ..UserUpdate::default()
        };
        assert_eq!(dir.update(id, clash).unwrap_err(), UserError::EmailTaken);
    }

    #[test]
    fn blank_password_update_keeps_existing() {
        let mut dir = UserDirectory::with_default_admin(fixed_now());
        let update = UserUpdate {
            password: Some(String::new()),
            ..UserUpdate::default()
        };
        dir.update(UserId::new(1), update).unwrap();
        assert!(dir.authenticate("admin", "admin123").is_some());
    }

    #[test]
    fn last_admin_is_protected() {
        let mut dir = UserDirectory::with_default_admin(fixed_now());
        assert_eq!(dir.remove(UserId::new(1)).unwrap_err(), UserError::LastAdmin);
        let demote = UserUpdate {
            role: Some(Role::User),
            ..UserUpdate::default()
        };
        assert_eq!(dir.update(UserId::new(1), demote).unwrap_err(), UserError::LastAdmin);

        let mut second = draft("root", "root@example.com");
        second.role = Some(Role::Admin);
        dir.add(second, fixed_now()).unwrap();
        dir.remove(UserId::new(1)).unwrap();
        assert_eq!(dir.len(), 1);
    }

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert!(matches!("guest".parse::<Role>(), Err(UserError::UnknownRole(_))));
    }

    #[test]
    fn directory_serializes_camel_case() {
        let dir = UserDirectory::with_default_admin(fixed_now());
        let json = serde_json::to_string(&dir).unwrap();
        assert!(json.contains("\"createdAt\""));
        assert!(json.contains("\"role\":\"admin\""));
        let back: UserDirectory = serde_json::from_str(&json).unwrap();
        assert_eq!(back, dir);
    }
}
