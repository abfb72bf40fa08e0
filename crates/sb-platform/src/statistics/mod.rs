//! Statistics

pub mod aggregator;
pub mod api;

pub use aggregator::{aggregate, Statistics, StatisticsService, VolunteerHours};
pub use api::{statistics_router, StatisticsState};
