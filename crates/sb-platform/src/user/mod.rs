//! User Aggregate
//!
//! Accounts, roles and volunteer administration.

pub mod entity;
pub mod repository;
pub mod api;

pub use entity::{Capability, ProfileUpdate, Role, User};
pub use repository::{InMemoryUserRepository, MongoUserRepository, UserRepository};
pub use api::{volunteers_router, UserResponse, UserSummaryResponse, VolunteersState};
