//! Record identifiers
//!
//! Users and shifts are addressed by 24-character hex ObjectIds stored as
//! strings in `_id`, so references inside shifts stay plain strings.

use bson::oid::ObjectId;

pub struct IdGenerator;

impl IdGenerator {
    /// Generate a new identifier, e.g. "65f1d2c3a4b5c6d7e8f90123"
    pub fn generate() -> String {
        ObjectId::new().to_hex()
    }
}
