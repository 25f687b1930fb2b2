//! User identity: registry, login session and current-user resolution.
//!
//! Current user resolution order:
//! 1) CLI --user (explicit)
//! 2) TASKBOARD_USER environment variable
//! 3) Persisted session in .taskboard/session
//!
//! Signup stores an Argon2id PHC hash of the password; login verifies it
//! before recording the session. An explicit user (1 or 2) is honoured only
//! with a verifying password or when it names the logged-in user.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::storage::Storage;

/// Environment variable naming the current user
pub const USER_ENV: &str = "TASKBOARD_USER";

/// Environment variable carrying the password for signup, login or `--user`
pub const PASSWORD_ENV: &str = "TASKBOARD_PASSWORD";

const USERNAME_MAX_LEN: usize = 150;
pub const PASSWORD_MIN_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Stable id, used as the owner id of the user's tasks
    pub id: String,
    pub username: String,
    /// Argon2id hash in PHC string format (`$argon2id$v=19$...`)
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn verify_password(&self, password: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(&self.password_hash) else {
            tracing::warn!(username = %self.username, "stored password hash is malformed");
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserRegistry {
    #[serde(default)]
    pub users: Vec<User>,
}

impl UserRegistry {
    /// Usernames match case-insensitively.
    pub fn find(&self, username: &str) -> Option<&User> {
        self.users
            .iter()
            .find(|user| user.username.eq_ignore_ascii_case(username))
    }
}

#[derive(Debug, Clone)]
pub struct UserStore {
    storage: Storage,
}

impl UserStore {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub fn list(&self) -> Result<Vec<User>> {
        let registry: UserRegistry = self
            .storage
            .read_json_or_default(&self.storage.users_file())?;
        Ok(registry.users)
    }

    pub fn find(&self, username: &str) -> Result<Option<User>> {
        let registry: UserRegistry = self
            .storage
            .read_json_or_default(&self.storage.users_file())?;
        Ok(registry.find(username.trim()).cloned())
    }

    /// Register a new user and start a session for them.
    pub fn signup(&self, username: &str, password: &str) -> Result<User> {
        let username = validate_username(username)?;
        validate_password(&username, password)?;
        let password_hash = hash_password(password)?;
        let path = self.storage.users_file();
        let user = self.storage.update_json(&path, |registry: &mut UserRegistry| {
            if registry.find(&username).is_some() {
                return Err(Error::UserExists(username.clone()));
            }
            let user = User {
                id: Uuid::new_v4().to_string(),
                username: username.clone(),
                password_hash: password_hash.clone(),
                created_at: Utc::now(),
            };
            registry.users.push(user.clone());
            Ok(user)
        })?;
        tracing::info!(username = %user.username, user_id = %user.id, "user registered");
        self.write_session(&user)?;
        Ok(user)
    }

    pub fn login(&self, username: &str, password: &str) -> Result<User> {
        let user = self.authenticate(username, password)?;
        self.write_session(&user)?;
        Ok(user)
    }

    /// Check `password` against the stored hash without touching the session.
    ///
    /// Unknown users and wrong passwords fail the same way.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<User> {
        let trimmed = username.trim();
        match self.find(trimmed)? {
            Some(user) if user.verify_password(password) => Ok(user),
            _ => {
                tracing::warn!(username = %trimmed, "authentication failed");
                Err(Error::InvalidCredentials(trimmed.to_string()))
            }
        }
    }

    /// End the session; returns the username that was logged in, if any.
    pub fn logout(&self) -> Result<Option<String>> {
        let previous = self.session_username()?;
        self.storage.remove_file(&self.storage.session_file())?;
        Ok(previous)
    }

    pub fn session_username(&self) -> Result<Option<String>> {
        self.storage.read_text(&self.storage.session_file())
    }

    fn write_session(&self, user: &User) -> Result<()> {
        self.storage
            .write_text(&self.storage.session_file(), &user.username)?;
        tracing::debug!(username = %user.username, "session started");
        Ok(())
    }
}

/// Resolve the current user from CLI, environment and session.
///
/// `Ok(None)` means nobody is logged in. An explicit name other than the
/// session's needs `password` to verify; otherwise it is
/// [`Error::InvalidCredentials`].
pub fn current_user(
    storage: &Storage,
    cli_user: Option<&str>,
    password: Option<&str>,
) -> Result<Option<User>> {
    let users = UserStore::new(storage.clone());
    let session = users.session_username()?;

    let env_user = std::env::var(USER_ENV).ok();
    if let Some(name) = non_empty(cli_user).or_else(|| non_empty(env_user.as_deref())) {
        if let Some(password) = password {
            return users.authenticate(name, password).map(Some);
        }
        let logged_in = session
            .as_deref()
            .is_some_and(|current| current.eq_ignore_ascii_case(name));
        if !logged_in {
            return Err(Error::InvalidCredentials(name.to_string()));
        }
    }

    let Some(username) = session else {
        return Ok(None);
    };
    users
        .find(&username)?
        .map(Some)
        .ok_or(Error::UserNotFound(username))
}

/// Like [`current_user`], but nobody logged in is [`Error::NotAuthenticated`].
pub fn require_user(
    storage: &Storage,
    cli_user: Option<&str>,
    password: Option<&str>,
) -> Result<User> {
    current_user(storage, cli_user, password)?.ok_or(Error::NotAuthenticated)
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| Error::OperationFailed(format!("password hashing failed: {err}")))
}

fn validate_password(username: &str, password: &str) -> Result<()> {
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(Error::InvalidArgument(format!(
            "password must be at least {PASSWORD_MIN_LEN} characters"
        )));
    }
    if password.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(Error::InvalidArgument(
            "password cannot be entirely numeric".to_string(),
        ));
    }
    if password.eq_ignore_ascii_case(username) {
        return Err(Error::InvalidArgument(
            "password cannot match the username".to_string(),
        ));
    }
    Ok(())
}

fn validate_username(username: &str) -> Result<String> {
    let trimmed = username.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidArgument("username cannot be empty".to_string()));
    }
    if trimmed.chars().count() > USERNAME_MAX_LEN {
        return Err(Error::InvalidArgument(format!(
            "username cannot exceed {USERNAME_MAX_LEN} characters"
        )));
    }
    if !trimmed
        .chars()
        .all(|ch| ch.is_alphanumeric() || matches!(ch, '@' | '.' | '+' | '-' | '_'))
    {
        return Err(Error::InvalidArgument(format!(
            "invalid username '{trimmed}': use letters, digits and @.+-_ only"
        )));
    }
    Ok(trimmed.to_string())
}

fn non_empty(input: Option<&str>) -> Option<&str> {
    input.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    })
}
