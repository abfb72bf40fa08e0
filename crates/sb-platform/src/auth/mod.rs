//! Authentication
//!
//! Password hashing, session tokens, registration and login.

pub mod password_service;
pub mod auth_service;
pub mod account_service;
pub mod auth_api;

pub use password_service::{Argon2Config, PasswordPolicy, PasswordService};
pub use auth_service::{extract_bearer_token, AuthService, SessionClaims, TokenConfig};
pub use account_service::{AccountService, LoginResult};
pub use auth_api::{auth_router, AuthState};
