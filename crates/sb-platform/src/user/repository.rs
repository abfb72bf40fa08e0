//! User Repository

use async_trait::async_trait;
use futures::TryStreamExt;
use indexmap::IndexMap;
use mongodb::{bson::doc, Collection, Database};
use parking_lot::RwLock;

use crate::shared::error::{is_duplicate_key_error, PlatformError, Result};
use crate::user::entity::{Role, User};

pub const USERS_COLLECTION: &str = "users";

/// Storage for user accounts
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user; a taken username yields `Conflict`
    async fn insert(&self, user: &User) -> Result<()>;

    async fn find_by_id(&self, id: &str) -> Result<Option<User>>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Users with the given ids, in creation order; unknown ids are skipped
    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<User>>;

    /// Users holding `role`, in creation order
    async fn find_by_role(&self, role: Role) -> Result<Vec<User>>;

    /// Replace a stored user; false if it no longer exists
    async fn update(&self, user: &User) -> Result<bool>;

    async fn delete(&self, id: &str) -> Result<bool>;
}

pub struct MongoUserRepository {
    collection: Collection<User>,
}

impl MongoUserRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(USERS_COLLECTION),
        }
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn insert(&self, user: &User) -> Result<()> {
        match self.collection.insert_one(user).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key_error(&e) => {
                Err(PlatformError::conflict("User already exists"))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self.collection.find_one(doc! { "username": username }).await?)
    }

    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let cursor = self.collection
            .find(doc! { "_id": { "$in": ids } })
            .sort(doc! { "_id": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_by_role(&self, role: Role) -> Result<Vec<User>> {
        let cursor = self.collection
            .find(doc! { "role": role.as_str() })
            .sort(doc! { "_id": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn update(&self, user: &User) -> Result<bool> {
        let result = self.collection
            .replace_one(doc! { "_id": &user.id }, user)
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }
}

/// In-memory implementation for tests and the `memory` store backend
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<IndexMap<String, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: &User) -> Result<()> {
        let mut users = self.users.write();
        if users.values().any(|u| u.username == user.username) {
            return Err(PlatformError::conflict("User already exists"));
        }
        users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        Ok(self.users.read().get(id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self.users.read().values().find(|u| u.username == username).cloned())
    }

    async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<User>> {
        Ok(self.users
            .read()
            .values()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn find_by_role(&self, role: Role) -> Result<Vec<User>> {
        Ok(self.users
            .read()
            .values()
            .filter(|u| u.role == role)
            .cloned()
            .collect())
    }

    async fn update(&self, user: &User) -> Result<bool> {
        let mut users = self.users.write();
        match users.get_mut(&user.id) {
            Some(existing) => {
                *existing = user.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.users.write().shift_remove(id).is_some())
    }
}
