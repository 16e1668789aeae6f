//! Session store: registered administrators and the current login.
//!
//! Passwords are compared as plain text against the `registeredUsers`
//! registry; the session token is an opaque `token-<id>` string.

use std::sync::{PoisonError, RwLock};

use crate::error::StorageError;
use crate::models::{Admin, Credential};
use crate::notify::Notice;
use crate::storage::{ADMIN, REGISTERED_USERS, TOKEN};
use crate::Backend;

/// Minimum length of a new password.
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Session {
    admin: Admin,
    token: String,
}

pub struct SessionStore {
    backend: Backend,
    session: RwLock<Option<Session>>,
}

impl SessionStore {
    /// Load the persisted session. Both the identity and the token must be
    /// present; the identity is not re-validated against the registry.
    pub fn restore(backend: Backend) -> Result<Self, StorageError> {
        let admin: Option<Admin> = backend.storage.get(ADMIN)?;
        let token = backend.storage.get_text(TOKEN)?;
        let session = match (admin, token) {
            (Some(admin), Some(token)) => {
                tracing::info!(user_id = %admin.id, "session restored");
                Some(Session { admin, token })
            }
            _ => None,
        };
        Ok(Self {
            backend,
            session: RwLock::new(session),
        })
    }

    pub fn admin(&self) -> Option<Admin> {
        self.read().map(|session| session.admin)
    }

    /// True exactly when an identity is present.
    pub fn is_authenticated(&self) -> bool {
        self.read().is_some()
    }

    pub fn token(&self) -> Option<String> {
        self.read().map(|session| session.token)
    }

    pub async fn login(&self, email: &str, password: &str) -> bool {
        self.backend.latency.wait().await;

        let users = match self.registry() {
            Ok(users) => users,
            Err(e) => return self.fault("Login Failed", "login", e),
        };
        let Some(user) = users.iter().find(|user| user.matches(email, password)) else {
            // Same answer whichever of email or password was wrong
            self.notify(Notice::destructive(
                "Login Failed",
                "Invalid email or password. Please check your credentials.",
            ));
            return false;
        };

        if let Err(e) = self.open_session(user.to_admin()) {
            return self.fault("Login Failed", "login", e);
        }
        tracing::info!(user_id = %user.id, "login succeeded");
        self.notify(Notice::info(
            "Login Successful",
            "Welcome back to the Employee Management System!",
        ));
        true
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> bool {
        self.backend.latency.wait().await;

        let mut users = match self.registry() {
            Ok(users) => users,
            Err(e) => return self.fault("Registration Failed", "register", e),
        };
        if users.iter().any(|user| user.email == email) {
            self.notify(Notice::destructive(
                "Registration Failed",
                "An account with this email already exists.",
            ));
            return false;
        }

        let id = self
            .backend
            .ids
            .mint_unique(|id| users.iter().any(|user| user.id == id));
        let user = Credential {
            id,
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        let admin = user.to_admin();
        users.push(user);

        let persisted = self
            .backend
            .storage
            .put(REGISTERED_USERS, &users)
            .and_then(|_| self.open_session(admin.clone()));
        if let Err(e) = persisted {
            return self.fault("Registration Failed", "register", e);
        }
        tracing::info!(user_id = %admin.id, "administrator registered");
        self.notify(Notice::info(
            "Registration Successful",
            "Welcome to the Employee Management System!",
        ));
        true
    }

    /// Close the session. Safe to call while already logged out.
    pub fn logout(&self) {
        let previous = self.write(None);
        for key in [ADMIN, TOKEN] {
            if let Err(e) = self.backend.storage.remove(key) {
                tracing::error!(key, error = %e, "failed to erase session key");
            }
        }
        if let Some(session) = previous {
            tracing::info!(user_id = %session.admin.id, "logged out");
        }
        self.notify(Notice::info(
            "Logged Out",
            "You have been successfully logged out.",
        ));
    }

    /// Replace name and email of the session identity and of its registry
    /// record. The identity is updated even when no registry record carries
    /// its id.
    pub async fn update_profile(&self, name: &str, email: &str) -> bool {
        self.backend.latency.wait().await;

        let Some(current) = self.read() else {
            return false;
        };

        let mut users = match self.registry() {
            Ok(users) => users,
            Err(e) => return self.fault("Error", "update profile", e),
        };
        match users.iter_mut().find(|user| user.id == current.admin.id) {
            Some(user) => {
                user.name = name.to_string();
                user.email = email.to_string();
                if let Err(e) = self.backend.storage.put(REGISTERED_USERS, &users) {
                    return self.fault("Error", "update profile", e);
                }
            }
            None => {
                tracing::warn!(
                    user_id = %current.admin.id,
                    "session identity has no registry record; updating session only"
                );
            }
        }

        let admin = Admin {
            name: name.to_string(),
            email: email.to_string(),
            ..current.admin
        };
        if let Err(e) = self.backend.storage.put(ADMIN, &admin) {
            return self.fault("Error", "update profile", e);
        }
        self.write(Some(Session {
            admin,
            token: current.token,
        }));
        self.notify(Notice::info(
            "Profile Updated",
            "Your profile has been successfully updated.",
        ));
        true
    }

    /// Replace the registry password of the logged-in administrator.
    pub async fn change_password(&self, current: &str, new: &str, confirm: &str) -> bool {
        if new != confirm {
            self.notify(Notice::destructive("Error", "New passwords do not match"));
            return false;
        }
        if new.chars().count() < MIN_PASSWORD_LEN {
            self.notify(Notice::destructive(
                "Error",
                "Password must be at least 6 characters long",
            ));
            return false;
        }

        self.backend.latency.wait().await;

        let Some(session) = self.read() else {
            self.notify(Notice::destructive("Error", "You must be logged in."));
            return false;
        };
        let mut users = match self.registry() {
            Ok(users) => users,
            Err(e) => return self.fault("Error", "change password", e),
        };
        let Some(user) = users
            .iter_mut()
            .find(|user| user.id == session.admin.id && user.password == current)
        else {
            self.notify(Notice::destructive("Error", "Current password is incorrect"));
            return false;
        };
        user.password = new.to_string();

        if let Err(e) = self.backend.storage.put(REGISTERED_USERS, &users) {
            return self.fault("Error", "change password", e);
        }
        tracing::info!(user_id = %session.admin.id, "password changed");
        self.notify(Notice::info(
            "Password Updated",
            "Your password has been successfully changed.",
        ));
        true
    }

    /// Persist identity and token, then make the session current.
    fn open_session(&self, admin: Admin) -> Result<(), StorageError> {
        let token = admin.session_token();
        let persisted = self
            .backend
            .storage
            .put(ADMIN, &admin)
            .and_then(|_| self.backend.storage.put_text(TOKEN, &token));
        if let Err(e) = persisted {
            // Never leave an identity on disk without its token
            let _ = self.backend.storage.remove(ADMIN);
            return Err(e);
        }
        self.write(Some(Session { admin, token }));
        Ok(())
    }

    fn registry(&self) -> Result<Vec<Credential>, StorageError> {
        Ok(self
            .backend
            .storage
            .get(REGISTERED_USERS)?
            .unwrap_or_default())
    }

    fn read(&self) -> Option<Session> {
        self.session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn write(&self, session: Option<Session>) -> Option<Session> {
        let mut guard = self.session.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, session)
    }

    fn notify(&self, notice: Notice) {
        self.backend.notifier.notify(notice);
    }

    fn fault(&self, title: &str, operation: &str, error: StorageError) -> bool {
        tracing::error!(operation, error = %error, "session operation failed");
        self.notify(Notice::destructive(
            title,
            "Something went wrong. Please try again.",
        ));
        false
    }
}
