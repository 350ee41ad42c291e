use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{
    merge_user, new_application_id, new_user_id, user_from_new, ApplicationStore, StoreError,
};
use crate::models::application::{ApplicationRecord, ApplicationStatus, NewApplication};
use crate::models::resume::ResumeData;
use crate::models::user::{NewUser, User};

/// Process-local store. Contents are lost on restart.
///
/// Key design: `userId → User` and `userId → [ApplicationRecord]` in
/// insertion order. Every operation holds the relevant write lock for its
/// whole read-modify-write.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, User>>,
    applications: RwLock<HashMap<String, Vec<ApplicationRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ApplicationStore for MemoryStore {
    async fn upsert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let now = Utc::now();
        let mut users = self.users.write().await;

        let id = user
            .id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(new_user_id);

        if let Some(existing) = users.get_mut(&id) {
            merge_user(existing, user, now);
            return Ok(existing.clone());
        }

        let created = user_from_new(id.clone(), user, now);
        users.insert(id, created.clone());
        Ok(created)
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(user_id).cloned())
    }

    async fn save_master_resume(
        &self,
        user_id: &str,
        resume: ResumeData,
    ) -> Result<User, StoreError> {
        let now = Utc::now();
        let mut users = self.users.write().await;

        let existed = users.contains_key(user_id);
        let user = users
            .entry(user_id.to_string())
            .or_insert_with(|| User {
                id: user_id.to_string(),
                email: String::new(),
                master_resume: None,
                created_at: Some(now),
                updated_at: None,
            });
        if existed {
            user.updated_at = Some(now);
        }
        user.master_resume = Some(resume);

        Ok(user.clone())
    }

    async fn save(&self, application: NewApplication) -> Result<ApplicationRecord, StoreError> {
        let record = application.into_record(new_application_id(), Utc::now());

        self.applications
            .write()
            .await
            .entry(record.user_id.clone())
            .or_default()
            .push(record.clone());

        Ok(record)
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<ApplicationRecord>, StoreError> {
        Ok(self
            .applications
            .read()
            .await
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn update_status(
        &self,
        application_id: &str,
        status: ApplicationStatus,
    ) -> Result<ApplicationRecord, StoreError> {
        let mut applications = self.applications.write().await;

        let record = applications
            .values_mut()
            .flat_map(|records| records.iter_mut())
            .find(|record| record.id == application_id)
            .ok_or_else(|| StoreError::NotFound(format!("Application {application_id}")))?;

        record.status = status;
        record.updated_at = Some(Utc::now());

        Ok(record.clone())
    }
}
