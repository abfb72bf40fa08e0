//! Shift Entity
//!
//! A shift carries two membership lists. Per user the state is one of
//! none, applied or assigned:
//!
//! ```text
//!   none --apply--> applied --approve--> assigned
//!   applied --deny--> none
//!   none | applied --assign--> assigned
//!   assigned --cancel--> none
//! ```
//!
//! Completion is a shift-level flag and does not touch membership.
//! Transitions here are pure; persistence and retries live in the service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::{PlatformError, Result};
use crate::shared::ids::IdGenerator;

/// Relationship of one user to one shift
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    None,
    Applied,
    Assigned,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    #[serde(rename = "_id")]
    pub id: String,

    /// Free-form date text, e.g. "2024-10-20"
    pub date: String,

    /// Free-form time range, e.g. "09:00-12:00"
    pub time: String,

    pub location: String,

    /// Task category used for statistics grouping
    pub task: String,

    #[serde(default)]
    pub action: String,

    #[serde(default)]
    pub completed: bool,

    /// Users waiting for approval, in application order
    #[serde(default)]
    pub applied_users: Vec<String>,

    #[serde(default)]
    pub assigned_users: Vec<String>,

    /// Write counter for compare-and-swap updates
    #[serde(default)]
    pub version: i64,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,

    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when publishing a shift
#[derive(Debug, Clone, Default)]
pub struct NewShift {
    pub date: String,
    pub time: String,
    pub location: String,
    pub task: String,
    pub action: Option<String>,
}

impl NewShift {
    pub fn validate(&self) -> Result<()> {
        let required = [&self.date, &self.time, &self.location, &self.task];
        if required.iter().any(|value| value.trim().is_empty()) {
            return Err(PlatformError::validation(
                "All fields (date, time, location, task) are required",
            ));
        }
        Ok(())
    }
}

impl Shift {
    pub fn new(new_shift: NewShift) -> Self {
        let now = Utc::now();
        Self {
            id: IdGenerator::generate(),
            date: new_shift.date.trim().to_string(),
            time: new_shift.time.trim().to_string(),
            location: new_shift.location.trim().to_string(),
            task: new_shift.task.trim().to_string(),
            action: new_shift.action.map(|a| a.trim().to_string()).unwrap_or_default(),
            completed: false,
            applied_users: Vec::new(),
            assigned_users: Vec::new(),
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn membership(&self, user_id: &str) -> Membership {
        if self.is_assigned(user_id) {
            Membership::Assigned
        } else if self.has_applied(user_id) {
            Membership::Applied
        } else {
            Membership::None
        }
    }

    pub fn has_applied(&self, user_id: &str) -> bool {
        self.applied_users.iter().any(|u| u == user_id)
    }

    pub fn is_assigned(&self, user_id: &str) -> bool {
        self.assigned_users.iter().any(|u| u == user_id)
    }

    /// none -> applied
    pub fn apply(&mut self, user_id: &str) -> Result<()> {
        match self.membership(user_id) {
            Membership::Applied => Err(PlatformError::conflict(
                "You have already applied for this shift.",
            )),
            Membership::Assigned => Err(PlatformError::conflict(
                "You are already assigned to this shift.",
            )),
            Membership::None => {
                self.applied_users.push(user_id.to_string());
                Ok(())
            }
        }
    }

    /// applied -> assigned
    pub fn approve(&mut self, user_id: &str) -> Result<()> {
        if !self.has_applied(user_id) {
            return Err(PlatformError::invalid_state("User has not applied for this shift"));
        }
        if self.is_assigned(user_id) {
            return Err(PlatformError::conflict("User is already assigned to this shift"));
        }
        self.applied_users.retain(|u| u != user_id);
        self.assigned_users.push(user_id.to_string());
        Ok(())
    }

    /// applied -> none
    pub fn deny(&mut self, user_id: &str) -> Result<()> {
        if !self.has_applied(user_id) {
            return Err(PlatformError::invalid_state("User has not applied for this shift"));
        }
        self.applied_users.retain(|u| u != user_id);
        Ok(())
    }

    /// none | applied -> assigned; a pending application is consumed
    pub fn assign(&mut self, user_id: &str) -> Result<()> {
        if self.is_assigned(user_id) {
            return Err(PlatformError::conflict("User is already assigned to this shift"));
        }
        self.applied_users.retain(|u| u != user_id);
        self.assigned_users.push(user_id.to_string());
        Ok(())
    }

    /// assigned -> none. Returns false when the user was not assigned.
    pub fn cancel_assignment(&mut self, user_id: &str) -> bool {
        let before = self.assigned_users.len();
        self.assigned_users.retain(|u| u != user_id);
        self.assigned_users.len() != before
    }

    /// Mark the shift done. Returns false when it already was.
    pub fn complete(&mut self) -> bool {
        if self.completed {
            return false;
        }
        self.completed = true;
        true
    }

    /// Task name used for grouping; blank tasks fall into "Other"
    pub fn task_key(&self) -> &str {
        if self.task.is_empty() {
            "Other"
        } else {
            &self.task
        }
    }
}
