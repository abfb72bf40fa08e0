//! ShiftBoard Platform
//!
//! Volunteer shift coordination:
//! - Accounts with role-based capabilities
//! - Shift lifecycle (apply, approve, deny, assign, cancel, complete)
//! - Participation statistics
//!
//! ## Module Organization (Aggregate-based)
//!
//! Each aggregate contains:
//! - `entity` - Domain entities
//! - `repository` - Data access (MongoDB and in-memory)
//! - `api` - REST endpoints

pub mod user;
pub mod shift;
pub mod statistics;

// Authentication & authorization
pub mod auth;

// Shared infrastructure
pub mod shared;

pub mod seed;
pub mod app;

pub use shared::error::{PlatformError, Result};
pub use shared::indexes::initialize_indexes;

pub use user::entity::{Capability, Role, User};
pub use shift::entity::Shift;

pub use app::{api_router, PlatformServices};
