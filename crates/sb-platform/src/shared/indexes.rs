//! MongoDB Index Initialization

use mongodb::{bson::doc, options::IndexOptions, Database, IndexModel};
use tracing::info;

use crate::shift::repository::SHIFTS_COLLECTION;
use crate::user::repository::USERS_COLLECTION;

/// Create indexes for all collections; safe to run on every startup
pub async fn initialize_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    info!("Initializing MongoDB indexes...");

    create_user_indexes(db).await?;
    create_shift_indexes(db).await?;

    info!("MongoDB indexes initialized successfully");
    Ok(())
}

async fn create_user_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let collection = db.collection::<mongodb::bson::Document>(USERS_COLLECTION);

    // Login lookup; duplicates surface as write error 11000
    collection.create_index(
        IndexModel::builder()
            .keys(doc! { "username": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build(),
    ).await?;

    collection.create_index(
        IndexModel::builder()
            .keys(doc! { "role": 1 })
            .build(),
    ).await?;

    Ok(())
}

async fn create_shift_indexes(db: &Database) -> Result<(), mongodb::error::Error> {
    let collection = db.collection::<mongodb::bson::Document>(SHIFTS_COLLECTION);

    // Own assigned / completed shifts
    collection.create_index(
        IndexModel::builder()
            .keys(doc! { "assignedUsers": 1, "completed": 1 })
            .build(),
    ).await?;

    Ok(())
}
