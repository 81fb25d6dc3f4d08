//! Resident directory repository

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::user::Resident;
use crate::utils::errors::Result;

#[derive(Debug, Clone)]
pub struct ResidentRepository {
    pool: PgPool,
}

impl ResidentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_profile_id(&self, profile_id: Uuid) -> Result<Option<Resident>> {
        let resident = sqlx::query_as::<_, Resident>(
            "SELECT id, username, profile_id FROM residents WHERE profile_id = $1",
        )
        .bind(profile_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(resident)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<Resident>> {
        let resident = sqlx::query_as::<_, Resident>(
            "SELECT id, username, profile_id FROM residents WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(resident)
    }

    /// Mirror a resident from the identity provider
    pub async fn upsert(&self, resident: &Resident) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO residents (id, username, profile_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE SET username = EXCLUDED.username, profile_id = EXCLUDED.profile_id
            "#,
        )
        .bind(resident.id)
        .bind(&resident.username)
        .bind(resident.profile_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
