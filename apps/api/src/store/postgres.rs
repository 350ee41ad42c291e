use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::PgPool;

use super::{
    merge_user, new_application_id, new_user_id, user_from_new, ApplicationStore, StoreError,
};
use crate::models::application::{ApplicationRecord, ApplicationStatus, NewApplication};
use crate::models::resume::ResumeData;
use crate::models::user::{NewUser, User};

/// PostgreSQL-backed store. Each user and application is one JSONB document;
/// `applications.seq` keeps insertion order. Tables are created by
/// `db::ensure_schema`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn write_user(conn: &mut sqlx::PgConnection, user: &User) -> Result<(), StoreError> {
    sqlx::query(
        r#"
        INSERT INTO users (id, document)
        VALUES ($1, $2)
        ON CONFLICT (id) DO UPDATE SET document = EXCLUDED.document
        "#,
    )
    .bind(&user.id)
    .bind(Json(user))
    .execute(conn)
    .await?;
    Ok(())
}

#[async_trait]
impl ApplicationStore for PgStore {
    async fn upsert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let now = Utc::now();
        let id = user
            .id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(new_user_id);

        let mut tx = self.pool.begin().await?;

        let existing: Option<Json<User>> =
            sqlx::query_scalar("SELECT document FROM users WHERE id = $1 FOR UPDATE")
                .bind(&id)
                .fetch_optional(&mut *tx)
                .await?;

        let stored = match existing {
            Some(Json(mut existing)) => {
                merge_user(&mut existing, user, now);
                existing
            }
            None => user_from_new(id, user, now),
        };

        write_user(&mut tx, &stored).await?;
        tx.commit().await?;

        Ok(stored)
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        let user: Option<Json<User>> =
            sqlx::query_scalar("SELECT document FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(user.map(|Json(user)| user))
    }

    async fn save_master_resume(
        &self,
        user_id: &str,
        resume: ResumeData,
    ) -> Result<User, StoreError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let existing: Option<Json<User>> =
            sqlx::query_scalar("SELECT document FROM users WHERE id = $1 FOR UPDATE")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;

        let user = match existing {
            Some(Json(mut user)) => {
                user.master_resume = Some(resume);
                user.updated_at = Some(now);
                user
            }
            None => User {
                id: user_id.to_string(),
                email: String::new(),
                master_resume: Some(resume),
                created_at: Some(now),
                updated_at: None,
            },
        };

        write_user(&mut tx, &user).await?;
        tx.commit().await?;

        Ok(user)
    }

    async fn save(&self, application: NewApplication) -> Result<ApplicationRecord, StoreError> {
        let record = application.into_record(new_application_id(), Utc::now());

        sqlx::query("INSERT INTO applications (id, user_id, document) VALUES ($1, $2, $3)")
            .bind(&record.id)
            .bind(&record.user_id)
            .bind(Json(&record))
            .execute(&self.pool)
            .await?;

        Ok(record)
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<ApplicationRecord>, StoreError> {
        let rows: Vec<Json<ApplicationRecord>> = sqlx::query_scalar(
            "SELECT document FROM applications WHERE user_id = $1 ORDER BY seq",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|Json(record)| record).collect())
    }

    async fn update_status(
        &self,
        application_id: &str,
        status: ApplicationStatus,
    ) -> Result<ApplicationRecord, StoreError> {
        let mut tx = self.pool.begin().await?;

        let existing: Option<Json<ApplicationRecord>> =
            sqlx::query_scalar("SELECT document FROM applications WHERE id = $1 FOR UPDATE")
                .bind(application_id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some(Json(mut record)) = existing else {
            return Err(StoreError::NotFound(format!("Application {application_id}")));
        };

        record.status = status;
        record.updated_at = Some(Utc::now());

        sqlx::query("UPDATE applications SET document = $1 WHERE id = $2")
            .bind(Json(&record))
            .bind(application_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(record)
    }
}
