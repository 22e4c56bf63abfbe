//! Database service for taxfile-service.

use crate::models::{
    CreateTaxFile, CreateUser, NewRefundEvent, RefundStatus, RefundWithFile, TaxFileWithRefund,
    User,
};
use chrono::{DateTime, Utc};
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "taxfile-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check database health.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // User Operations
    // -------------------------------------------------------------------------

    /// Create a new user.
    #[instrument(skip(self, input), fields(user_id = %input.user_id))]
    pub async fn create_user(&self, input: &CreateUser) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (user_id, first_name, last_name)
            VALUES ($1, $2, $3)
            RETURNING user_id, first_name, last_name, created_utc, updated_utc
            "#,
        )
        .bind(&input.user_id)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::BadRequest(anyhow::anyhow!(
                    "User with ID {} already exists",
                    input.user_id
                ))
            }
            _ => AppError::DatabaseError(anyhow::anyhow!("Failed to create user: {}", e)),
        })?;

        info!(user_id = %user.user_id, "User created");

        Ok(user)
    }

    /// Check whether a user exists.
    #[instrument(skip(self))]
    pub async fn user_exists(&self, user_id: &str) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM users WHERE user_id = $1)",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to check user existence: {}", e))
        })?;

        Ok(exists)
    }

    /// Get a user by ID.
    #[instrument(skip(self))]
    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, first_name, last_name, created_utc, updated_utc
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get user: {}", e)))?;

        Ok(user)
    }

    /// List all users, most recently created first.
    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, first_name, last_name, created_utc, updated_utc
            FROM users
            ORDER BY created_utc DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list users: {}", e)))?;

        Ok(users)
    }

    // -------------------------------------------------------------------------
    // Tax File Operations
    // -------------------------------------------------------------------------

    /// Create a tax file, and its refund row when an ETA is supplied.
    /// Both inserts commit in one transaction.
    #[instrument(skip(self, input, refund_eta), fields(user_id = %input.user_id, tax_year = input.tax_year))]
    pub async fn create_tax_file(
        &self,
        input: &CreateTaxFile,
        refund_eta: Option<DateTime<Utc>>,
    ) -> Result<Uuid, AppError> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM tax_files WHERE user_id = $1 AND tax_year = $2)",
        )
        .bind(&input.user_id)
        .bind(input.tax_year)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to check tax file existence: {}", e))
        })?;

        if exists {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "Tax file already exists for user {} and year {}",
                input.user_id,
                input.tax_year
            )));
        }

        let file_id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO tax_files (file_id, user_id, tax_year, income, expense, tax_rate, deducted, refund_amount, tax_status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(file_id)
        .bind(&input.user_id)
        .bind(input.tax_year)
        .bind(input.income)
        .bind(input.expense)
        .bind(input.tax_rate)
        .bind(input.deducted)
        .bind(input.refund_amount)
        .bind(input.tax_status.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                // Concurrent creator won the (user_id, tax_year) constraint.
                AppError::Conflict(anyhow::anyhow!(
                    "Tax file already exists for user {} and year {}",
                    input.user_id,
                    input.tax_year
                ))
            }
            _ => AppError::DatabaseError(anyhow::anyhow!("Failed to create tax file: {}", e)),
        })?;

        if let Some(eta) = refund_eta {
            sqlx::query(
                r#"
                INSERT INTO refunds (refund_id, tax_file_id, refund_status, refund_eta)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(file_id)
            .bind(RefundStatus::Pending.as_str())
            .bind(eta)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to create refund: {}", e))
            })?;
        }

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to commit tax file: {}", e))
        })?;

        info!(file_id = %file_id, "Tax file created");

        Ok(file_id)
    }

    /// Fetch one tax file with its refund, if any.
    #[instrument(skip(self))]
    pub async fn get_tax_file_with_refund(
        &self,
        user_id: &str,
        tax_year: i32,
    ) -> Result<Option<TaxFileWithRefund>, AppError> {
        let tax_file = sqlx::query_as::<_, TaxFileWithRefund>(
            r#"
            SELECT tf.file_id, tf.user_id, tf.tax_year, tf.income, tf.expense, tf.tax_rate,
                   tf.deducted, tf.refund_amount, tf.tax_status, tf.created_utc, tf.updated_utc,
                   r.refund_status, r.refund_errors, r.refund_eta
            FROM tax_files tf
            LEFT JOIN refunds r ON r.tax_file_id = tf.file_id
            WHERE tf.user_id = $1 AND tf.tax_year = $2
            "#,
        )
        .bind(user_id)
        .bind(tax_year)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get tax file: {}", e)))?;

        Ok(tax_file)
    }

    /// List a user's tax files with refunds, newest tax year first.
    #[instrument(skip(self))]
    pub async fn list_tax_files_with_refunds(
        &self,
        user_id: &str,
    ) -> Result<Vec<TaxFileWithRefund>, AppError> {
        let tax_files = sqlx::query_as::<_, TaxFileWithRefund>(
            r#"
            SELECT tf.file_id, tf.user_id, tf.tax_year, tf.income, tf.expense, tf.tax_rate,
                   tf.deducted, tf.refund_amount, tf.tax_status, tf.created_utc, tf.updated_utc,
                   r.refund_status, r.refund_errors, r.refund_eta
            FROM tax_files tf
            LEFT JOIN refunds r ON r.tax_file_id = tf.file_id
            WHERE tf.user_id = $1
            ORDER BY tf.tax_year DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list tax files: {}", e)))?;

        Ok(tax_files)
    }

    // -------------------------------------------------------------------------
    // Refund Operations
    // -------------------------------------------------------------------------

    /// Fetch a refund by the owning user and tax year.
    #[instrument(skip(self))]
    pub async fn get_refund_by_user_year(
        &self,
        user_id: &str,
        tax_year: i32,
    ) -> Result<Option<RefundWithFile>, AppError> {
        let refund = sqlx::query_as::<_, RefundWithFile>(
            r#"
            SELECT r.refund_id, r.tax_file_id, tf.user_id, tf.tax_year,
                   r.refund_status, r.refund_errors, r.refund_eta
            FROM refunds r
            JOIN tax_files tf ON tf.file_id = r.tax_file_id
            WHERE tf.user_id = $1 AND tf.tax_year = $2
            "#,
        )
        .bind(user_id)
        .bind(tax_year)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get refund: {}", e)))?;

        Ok(refund)
    }

    /// Fetch a refund by the owning tax file ID.
    #[instrument(skip(self))]
    pub async fn get_refund_by_file_id(
        &self,
        file_id: Uuid,
    ) -> Result<Option<RefundWithFile>, AppError> {
        let refund = sqlx::query_as::<_, RefundWithFile>(
            r#"
            SELECT r.refund_id, r.tax_file_id, tf.user_id, tf.tax_year,
                   r.refund_status, r.refund_errors, r.refund_eta
            FROM refunds r
            JOIN tax_files tf ON tf.file_id = r.tax_file_id
            WHERE r.tax_file_id = $1
            "#,
        )
        .bind(file_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get refund: {}", e)))?;

        Ok(refund)
    }

    /// Apply a processed refund event: update the refund status when the
    /// transition produced one, and append the audit record. Both writes
    /// commit in one transaction; a suppressed transition still appends
    /// the audit record without touching the refund row.
    #[instrument(skip(self, refund_errors, event), fields(refund_id = %event.refund_id, event_type = event.event_type.as_str()))]
    pub async fn apply_refund_event(
        &self,
        new_status: Option<RefundStatus>,
        refund_errors: Option<serde_json::Value>,
        event: &NewRefundEvent,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        if let Some(status) = new_status {
            sqlx::query(
                r#"
                UPDATE refunds
                SET refund_status = $2,
                    refund_errors = COALESCE($3, refund_errors),
                    updated_utc = now()
                WHERE refund_id = $1
                "#,
            )
            .bind(event.refund_id)
            .bind(status.as_str())
            .bind(refund_errors)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to update refund: {}", e))
            })?;
        }

        sqlx::query(
            r#"
            INSERT INTO refund_events (event_id, refund_id, event_type, event_date, error_reasons)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(event.refund_id)
        .bind(event.event_type.as_str())
        .bind(event.event_date)
        .bind(event.error_reasons.clone())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to record refund event: {}", e))
        })?;

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to commit refund event: {}", e))
        })?;

        Ok(())
    }
}
