//! Shift Lifecycle Service
//!
//! Each lifecycle write is read-modify-write on a single shift guarded by its
//! version. A lost race re-reads the shift and re-runs the transition so
//! guards are always evaluated against the latest record.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::shared::error::{PlatformError, Result};
use crate::shift::entity::{NewShift, Shift};
use crate::shift::repository::ShiftRepository;
use crate::user::entity::User;
use crate::user::repository::UserRepository;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// A shift with its member references resolved to user records
#[derive(Debug, Clone)]
pub struct ShiftWithMembers {
    pub shift: Shift,
    pub applied_users: Vec<User>,
    pub assigned_users: Vec<User>,
}

pub struct ShiftService {
    shift_repo: Arc<dyn ShiftRepository>,
    user_repo: Arc<dyn UserRepository>,
    max_attempts: u32,
}

impl ShiftService {
    pub fn new(shift_repo: Arc<dyn ShiftRepository>, user_repo: Arc<dyn UserRepository>) -> Self {
        Self {
            shift_repo,
            user_repo,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub async fn create(&self, new_shift: NewShift) -> Result<Shift> {
        new_shift.validate()?;
        let shift = Shift::new(new_shift);
        self.shift_repo.insert(&shift).await?;

        info!(shift_id = %shift.id, task = %shift.task, date = %shift.date, "Shift created");
        Ok(shift)
    }

    pub async fn delete(&self, shift_id: &str) -> Result<()> {
        if !self.shift_repo.delete(shift_id).await? {
            return Err(PlatformError::not_found("Shift", shift_id));
        }
        info!(shift_id = %shift_id, "Shift deleted");
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<Shift>> {
        self.shift_repo.find_all().await
    }

    pub async fn list_assigned(&self, user_id: &str) -> Result<Vec<Shift>> {
        self.shift_repo.find_assigned_to(user_id).await
    }

    pub async fn list_completed(&self, user_id: &str) -> Result<Vec<Shift>> {
        self.shift_repo.find_completed_for(user_id).await
    }

    /// All shifts with applicants and assignees resolved. References to
    /// deleted users are skipped.
    pub async fn list_with_members(&self) -> Result<Vec<ShiftWithMembers>> {
        let shifts = self.shift_repo.find_all().await?;

        let mut referenced: Vec<String> = shifts
            .iter()
            .flat_map(|s| s.applied_users.iter().chain(s.assigned_users.iter()))
            .cloned()
            .collect();
        referenced.sort();
        referenced.dedup();

        let users: HashMap<String, User> = self.user_repo
            .find_by_ids(&referenced)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        let resolve = |ids: &[String]| -> Vec<User> {
            ids.iter().filter_map(|id| users.get(id).cloned()).collect()
        };

        Ok(shifts
            .into_iter()
            .map(|shift| ShiftWithMembers {
                applied_users: resolve(&shift.applied_users),
                assigned_users: resolve(&shift.assigned_users),
                shift,
            })
            .collect())
    }

    pub async fn apply(&self, shift_id: &str, user_id: &str) -> Result<Shift> {
        let shift = self.mutate(shift_id, |s| s.apply(user_id).map(|_| true)).await?;
        info!(shift_id = %shift_id, user_id = %user_id, "Application recorded");
        Ok(shift)
    }

    pub async fn approve(&self, shift_id: &str, user_id: &str) -> Result<Shift> {
        let shift = self.mutate(shift_id, |s| s.approve(user_id).map(|_| true)).await?;
        info!(shift_id = %shift_id, user_id = %user_id, "Application approved");
        Ok(shift)
    }

    pub async fn deny(&self, shift_id: &str, user_id: &str) -> Result<Shift> {
        let shift = self.mutate(shift_id, |s| s.deny(user_id).map(|_| true)).await?;
        info!(shift_id = %shift_id, user_id = %user_id, "Application denied");
        Ok(shift)
    }

    /// Assign a user without a prior application. The user must exist.
    pub async fn assign(&self, shift_id: &str, user_id: &str) -> Result<Shift> {
        if self.shift_repo.find_by_id(shift_id).await?.is_none() {
            return Err(PlatformError::not_found("Shift", shift_id));
        }
        if self.user_repo.find_by_id(user_id).await?.is_none() {
            return Err(PlatformError::not_found("User", user_id));
        }

        let shift = self.mutate(shift_id, |s| s.assign(user_id).map(|_| true)).await?;
        info!(shift_id = %shift_id, user_id = %user_id, "User assigned");
        Ok(shift)
    }

    /// Remove the caller from the assignees. Not being assigned is not an error.
    pub async fn cancel_assignment(&self, shift_id: &str, user_id: &str) -> Result<Shift> {
        let shift = self.mutate(shift_id, |s| Ok(s.cancel_assignment(user_id))).await?;
        info!(shift_id = %shift_id, user_id = %user_id, "Assignment cancelled");
        Ok(shift)
    }

    pub async fn complete(&self, shift_id: &str) -> Result<Shift> {
        let shift = self.mutate(shift_id, |s| Ok(s.complete())).await?;
        info!(shift_id = %shift_id, "Shift completed");
        Ok(shift)
    }

    /// Run `transition` against the latest stored shift and persist it with a
    /// version check, retrying on lost races. The transition returns whether
    /// it changed anything; unchanged shifts are not written.
    async fn mutate<F>(&self, shift_id: &str, mut transition: F) -> Result<Shift>
    where
        F: FnMut(&mut Shift) -> Result<bool> + Send,
    {
        for attempt in 1..=self.max_attempts {
            let mut shift = self.shift_repo
                .find_by_id(shift_id)
                .await?
                .ok_or_else(|| PlatformError::not_found("Shift", shift_id))?;

            if !transition(&mut shift)? {
                return Ok(shift);
            }

            let expected_version = shift.version;
            shift.version += 1;
            shift.updated_at = Utc::now();

            if self.shift_repo.replace_if_version(&shift, expected_version).await? {
                return Ok(shift);
            }

            debug!(shift_id = %shift_id, attempt, "Shift version changed during update, retrying");
        }

        warn!(shift_id = %shift_id, attempts = self.max_attempts, "Giving up on contended shift update");
        Err(PlatformError::conflict(
            "Shift was modified concurrently, please retry",
        ))
    }
}
