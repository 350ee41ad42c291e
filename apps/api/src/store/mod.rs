//! Application Store: users, master resumes and saved applications.
//!
//! Call sites only see the `ApplicationStore` trait. Backends:
//! - `MemoryStore`: process-local maps, used when no database is configured.
//! - `PgStore`: PostgreSQL, one JSONB document per row.
//!
//! Each `save` / `update_status` call is atomic with respect to other calls on
//! the same key. Concurrent status updates are last-write-wins.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::application::{ApplicationRecord, ApplicationStatus, NewApplication};
use crate::models::resume::ResumeData;
use crate::models::user::{NewUser, User};

pub mod handlers;
pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait ApplicationStore: Send + Sync {
    /// Creates the user when `id` is absent or unknown, otherwise merges the
    /// provided fields into the stored user.
    async fn upsert_user(&self, user: NewUser) -> Result<User, StoreError>;

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, StoreError>;

    /// Replaces the user's master resume, creating the user if needed.
    async fn save_master_resume(
        &self,
        user_id: &str,
        resume: ResumeData,
    ) -> Result<User, StoreError>;

    /// Stores a new application under a freshly generated id.
    async fn save(&self, application: NewApplication) -> Result<ApplicationRecord, StoreError>;

    /// All applications of one user, oldest first.
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<ApplicationRecord>, StoreError>;

    /// Changes only `status` and `updated_at`. `NotFound` when the id is unknown.
    async fn update_status(
        &self,
        application_id: &str,
        status: ApplicationStatus,
    ) -> Result<ApplicationRecord, StoreError>;
}

pub fn new_user_id() -> String {
    format!("user_{}", Uuid::new_v4().simple())
}

pub fn new_application_id() -> String {
    format!("app_{}", Uuid::new_v4().simple())
}

/// Applies the fields present in `update` to `user`.
fn merge_user(user: &mut User, update: NewUser, now: DateTime<Utc>) {
    if let Some(email) = update.email {
        user.email = email;
    }
    if let Some(resume) = update.master_resume {
        user.master_resume = Some(resume);
    }
    user.updated_at = Some(now);
}

fn user_from_new(id: String, new: NewUser, now: DateTime<Utc>) -> User {
    User {
        id,
        email: new.email.unwrap_or_default(),
        master_resume: new.master_resume,
        created_at: Some(now),
        updated_at: None,
    }
}
