//! Shift Aggregate
//!
//! Shift records, the application/assignment lifecycle and its APIs.

pub mod entity;
pub mod repository;
pub mod service;
pub mod api;
pub mod admin_api;

pub use entity::{Membership, NewShift, Shift};
pub use repository::{InMemoryShiftRepository, MongoShiftRepository, ShiftRepository};
pub use service::{ShiftService, ShiftWithMembers};
pub use api::{shifts_router, ShiftResponse, ShiftsState};
pub use admin_api::{admin_shifts_router, AdminShiftResponse};
