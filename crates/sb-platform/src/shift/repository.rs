//! Shift Repository
//!
//! Lifecycle writes go through `replace_if_version`, a conditional replace
//! that only lands when the stored version still matches the one read.

use async_trait::async_trait;
use futures::TryStreamExt;
use indexmap::IndexMap;
use mongodb::{bson::doc, Collection, Database};
use parking_lot::RwLock;

use crate::shared::error::Result;
use crate::shift::entity::Shift;

pub const SHIFTS_COLLECTION: &str = "shifts";

/// Storage for shifts
#[async_trait]
pub trait ShiftRepository: Send + Sync {
    async fn insert(&self, shift: &Shift) -> Result<()>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Shift>>;

    /// All shifts in creation order
    async fn find_all(&self) -> Result<Vec<Shift>>;

    /// Shifts listing `user_id` among the assignees
    async fn find_assigned_to(&self, user_id: &str) -> Result<Vec<Shift>>;

    /// Completed shifts listing `user_id` among the assignees
    async fn find_completed_for(&self, user_id: &str) -> Result<Vec<Shift>>;

    /// Store `shift` only if the persisted version equals `expected_version`.
    /// Returns false when another writer got there first or the shift is gone.
    async fn replace_if_version(&self, shift: &Shift, expected_version: i64) -> Result<bool>;

    async fn delete(&self, id: &str) -> Result<bool>;

    async fn count(&self) -> Result<u64>;
}

pub struct MongoShiftRepository {
    collection: Collection<Shift>,
}

impl MongoShiftRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(SHIFTS_COLLECTION),
        }
    }
}

#[async_trait]
impl ShiftRepository for MongoShiftRepository {
    async fn insert(&self, shift: &Shift) -> Result<()> {
        self.collection.insert_one(shift).await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Shift>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn find_all(&self) -> Result<Vec<Shift>> {
        let cursor = self.collection
            .find(doc! {})
            .sort(doc! { "_id": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_assigned_to(&self, user_id: &str) -> Result<Vec<Shift>> {
        let cursor = self.collection
            .find(doc! { "assignedUsers": user_id })
            .sort(doc! { "_id": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_completed_for(&self, user_id: &str) -> Result<Vec<Shift>> {
        let cursor = self.collection
            .find(doc! { "assignedUsers": user_id, "completed": true })
            .sort(doc! { "_id": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn replace_if_version(&self, shift: &Shift, expected_version: i64) -> Result<bool> {
        // Documents written before versioning have no field; treat them as version 0
        let filter = if expected_version == 0 {
            doc! {
                "_id": &shift.id,
                "$or": [
                    { "version": 0_i64 },
                    { "version": { "$exists": false } }
                ]
            }
        } else {
            doc! { "_id": &shift.id, "version": expected_version }
        };

        let result = self.collection.replace_one(filter, shift).await?;
        Ok(result.matched_count == 1)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.collection.count_documents(doc! {}).await?)
    }
}

/// In-memory implementation for tests and the `memory` store backend
#[derive(Default)]
pub struct InMemoryShiftRepository {
    shifts: RwLock<IndexMap<String, Shift>>,
}

impl InMemoryShiftRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn filtered<F>(&self, predicate: F) -> Vec<Shift>
    where
        F: Fn(&Shift) -> bool,
    {
        self.shifts
            .read()
            .values()
            .filter(|s| predicate(s))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ShiftRepository for InMemoryShiftRepository {
    async fn insert(&self, shift: &Shift) -> Result<()> {
        self.shifts.write().insert(shift.id.clone(), shift.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Shift>> {
        Ok(self.shifts.read().get(id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Shift>> {
        Ok(self.shifts.read().values().cloned().collect())
    }

    async fn find_assigned_to(&self, user_id: &str) -> Result<Vec<Shift>> {
        Ok(self.filtered(|s| s.is_assigned(user_id)))
    }

    async fn find_completed_for(&self, user_id: &str) -> Result<Vec<Shift>> {
        Ok(self.filtered(|s| s.completed && s.is_assigned(user_id)))
    }

    async fn replace_if_version(&self, shift: &Shift, expected_version: i64) -> Result<bool> {
        let mut shifts = self.shifts.write();
        match shifts.get_mut(&shift.id) {
            Some(stored) if stored.version == expected_version => {
                *stored = shift.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.shifts.write().shift_remove(id).is_some())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.shifts.read().len() as u64)
    }
}
