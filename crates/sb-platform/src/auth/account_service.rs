//! Account Service
//!
//! Registration, credential login and self-service profile access.

use std::sync::Arc;

use tracing::{info, warn};

use crate::auth::auth_service::AuthService;
use crate::auth::password_service::PasswordService;
use crate::shared::error::{PlatformError, Result};
use crate::user::entity::{ProfileUpdate, Role, User};
use crate::user::repository::UserRepository;

/// Outcome of a successful login
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub token: String,
    pub role: Role,
}

pub struct AccountService {
    user_repo: Arc<dyn UserRepository>,
    password_service: Arc<PasswordService>,
    auth_service: Arc<AuthService>,
    allow_privileged_registration: bool,
}

impl AccountService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        password_service: Arc<PasswordService>,
        auth_service: Arc<AuthService>,
    ) -> Self {
        Self {
            user_repo,
            password_service,
            auth_service,
            allow_privileged_registration: false,
        }
    }

    /// Let self-registration create coordinator, admin and organizer accounts
    pub fn with_privileged_registration(mut self, allow: bool) -> Self {
        self.allow_privileged_registration = allow;
        self
    }

    /// Create an account. `role` defaults to volunteer when absent or blank.
    pub async fn register(&self, username: &str, password: &str, role: Option<&str>) -> Result<User> {
        let username = username.trim();
        if username.is_empty() {
            return Err(PlatformError::validation("Username is required"));
        }
        if password.is_empty() {
            return Err(PlatformError::validation("Password is required"));
        }
        self.password_service.validate_password(password)?;

        let role = match role.map(str::trim).filter(|r| !r.is_empty()) {
            Some(r) => r.parse::<Role>()?,
            None => Role::Volunteer,
        };
        if role.is_elevated() && !self.allow_privileged_registration {
            warn!(username = %username, role = %role, "Rejected privileged self-registration");
            return Err(PlatformError::forbidden(
                "Self-registration is limited to volunteer accounts",
            ));
        }

        if self.user_repo.find_by_username(username).await?.is_some() {
            return Err(PlatformError::conflict("User already exists"));
        }

        let password_hash = self.password_service.hash_password(password)?;
        let user = User::new(username, password_hash, role);
        // The store enforces uniqueness again for concurrent registrations
        self.user_repo.insert(&user).await?;

        info!(user_id = %user.id, username = %user.username, role = %user.role, "User registered");
        Ok(user)
    }

    /// Verify credentials and issue a session token. Unknown usernames and
    /// wrong passwords fail identically.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResult> {
        let Some(user) = self.user_repo.find_by_username(username.trim()).await? else {
            self.password_service.verify_decoy(password);
            return Err(PlatformError::InvalidCredentials);
        };

        let verified = self.password_service
            .verify_password(password, &user.password_hash)
            .unwrap_or_else(|e| {
                warn!(user_id = %user.id, error = %e, "Stored password hash is unusable");
                false
            });
        if !verified {
            info!(user_id = %user.id, "Login failed");
            return Err(PlatformError::InvalidCredentials);
        }

        let token = self.auth_service.generate_token(&user)?;
        info!(user_id = %user.id, role = %user.role, "Login succeeded");

        Ok(LoginResult {
            token,
            role: user.role,
        })
    }

    pub async fn get_profile(&self, user_id: &str) -> Result<User> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| PlatformError::not_found("User", user_id))
    }

    pub async fn update_profile(&self, user_id: &str, update: ProfileUpdate) -> Result<User> {
        let mut user = self.get_profile(user_id).await?;
        user.apply_profile_update(update);

        if !self.user_repo.update(&user).await? {
            return Err(PlatformError::not_found("User", user_id));
        }

        info!(user_id = %user.id, "Profile updated");
        Ok(user)
    }
}
