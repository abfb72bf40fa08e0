//! Development Data Seeder
//!
//! Seeds a bootstrap admin account and a handful of sample shifts when the
//! server runs in dev mode. Existing data is left alone.

use std::sync::Arc;

use tracing::info;

use crate::auth::password_service::PasswordService;
use crate::shared::error::Result;
use crate::shift::entity::{NewShift, Shift};
use crate::shift::repository::ShiftRepository;
use crate::user::entity::{Role, User};
use crate::user::repository::UserRepository;

/// (date, time, location, task)
const SAMPLE_SHIFTS: &[(&str, &str, &str, &str)] = &[
    ("2024-10-20", "09:00-12:00", "Sihlcity", "Cinemasupport"),
    ("2024-10-21", "14:00-18:00", "Frauenbadi", "Bar"),
    ("2024-10-22", "08:00-11:00", "Festivalcentre", "Information Desk"),
    ("2024-10-23", "10:00-14:00", "City Center", "Registration Desk"),
    ("2024-10-24", "15:00-19:00", "Community Hall", "Event Support"),
];

pub struct DevDataSeeder {
    user_repo: Arc<dyn UserRepository>,
    shift_repo: Arc<dyn ShiftRepository>,
    password_service: Arc<PasswordService>,
}

impl DevDataSeeder {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        shift_repo: Arc<dyn ShiftRepository>,
        password_service: Arc<PasswordService>,
    ) -> Self {
        Self { user_repo, shift_repo, password_service }
    }

    /// Seed everything enabled in `config`
    pub async fn seed(&self, config: &sb_config::SeedConfig) -> Result<()> {
        info!("Seeding development data...");

        self.seed_admin(&config.admin_username, &config.admin_password).await?;
        if config.sample_shifts {
            self.seed_sample_shifts().await?;
        }

        info!(admin = %config.admin_username, "Development data seeded");
        Ok(())
    }

    /// Create the admin account unless the username is taken
    pub async fn seed_admin(&self, username: &str, password: &str) -> Result<bool> {
        if self.user_repo.find_by_username(username).await?.is_some() {
            return Ok(false);
        }

        let hash = self.password_service.hash_password(password)?;
        let mut admin = User::new(username, hash, Role::Admin);
        admin.name = "Administrator".to_string();
        self.user_repo.insert(&admin).await?;

        info!(username = %username, "Created bootstrap admin");
        Ok(true)
    }

    /// Insert the sample shifts when no shifts exist yet
    pub async fn seed_sample_shifts(&self) -> Result<usize> {
        if self.shift_repo.count().await? > 0 {
            return Ok(0);
        }

        for (date, time, location, task) in SAMPLE_SHIFTS {
            let shift = Shift::new(NewShift {
                date: date.to_string(),
                time: time.to_string(),
                location: location.to_string(),
                task: task.to_string(),
                action: None,
            });
            self.shift_repo.insert(&shift).await?;
        }

        info!(count = SAMPLE_SHIFTS.len(), "Created sample shifts");
        Ok(SAMPLE_SHIFTS.len())
    }
}
