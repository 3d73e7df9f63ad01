use sqlx::{PgPool, Postgres};
use surat_core::models::{Profile, Role};
use surat_core::AppError;
use uuid::Uuid;

const PROFILE_COLUMNS: &str = "id, user_id, name, full_name, role, created_at, updated_at";

/// Repository for user profiles.
#[derive(Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self), fields(db.table = "profiles", db.operation = "select", db.record_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<Option<Profile>, AppError> {
        let profile = sqlx::query_as::<Postgres, Profile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    /// Look up a profile by the auth provider's subject id.
    #[tracing::instrument(skip(self), fields(db.table = "profiles", db.operation = "select", user_id = %user_id))]
    pub async fn get_by_user_id(&self, user_id: Uuid) -> Result<Option<Profile>, AppError> {
        let profile = sqlx::query_as::<Postgres, Profile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    /// Auto-provision a profile for a first-time authenticated caller.
    ///
    /// Concurrent first requests from the same user race on the unique
    /// `user_id` index; the loser re-reads the winner's row.
    #[tracing::instrument(skip(self), fields(db.table = "profiles", db.operation = "insert", user_id = %user_id))]
    pub async fn create(
        &self,
        user_id: Uuid,
        name: &str,
        role: Role,
    ) -> Result<Profile, AppError> {
        let result = sqlx::query_as::<Postgres, Profile>(&format!(
            r#"
            INSERT INTO profiles (user_id, name, role)
            VALUES ($1, $2, $3)
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(name)
        .bind(role)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(profile) => Ok(profile),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => self
                .get_by_user_id(user_id)
                .await?
                .ok_or_else(|| AppError::Internal("Profile vanished after insert race".to_string())),
            Err(e) => Err(e.into()),
        }
    }

    #[tracing::instrument(skip(self), fields(db.table = "profiles", db.operation = "select"))]
    pub async fn list(&self) -> Result<Vec<Profile>, AppError> {
        let profiles = sqlx::query_as::<Postgres, Profile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles ORDER BY name ASC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(profiles)
    }

    #[tracing::instrument(skip(self), fields(db.table = "profiles", db.operation = "select"))]
    pub async fn list_by_role(&self, role: Role) -> Result<Vec<Profile>, AppError> {
        let profiles = sqlx::query_as::<Postgres, Profile>(&format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE role = $1 ORDER BY name ASC"
        ))
        .bind(role)
        .fetch_all(&self.pool)
        .await?;

        Ok(profiles)
    }

    /// Admin update of a profile's role and names.
    #[tracing::instrument(skip(self), fields(db.table = "profiles", db.operation = "update", db.record_id = %id))]
    pub async fn update(
        &self,
        id: Uuid,
        role: Option<Role>,
        name: Option<String>,
        full_name: Option<String>,
    ) -> Result<Profile, AppError> {
        let profile = sqlx::query_as::<Postgres, Profile>(&format!(
            r#"
            UPDATE profiles
            SET role = COALESCE($2, role),
                name = COALESCE($3, name),
                full_name = COALESCE($4, full_name),
                updated_at = now()
            WHERE id = $1
            RETURNING {PROFILE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(role)
        .bind(&name)
        .bind(&full_name)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", id)))?;

        Ok(profile)
    }
}
