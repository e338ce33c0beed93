//! PostgreSQL claim repository

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;

use crate::domain::analysis::ParsedFields;
use crate::domain::claim::{Claim, ClaimFilter, ClaimId, ClaimRepository, ClaimStatus, NewClaim};
use crate::domain::DomainError;

const CLAIM_COLUMNS: &str = "id, claimant_name, claim_type, amount, description, document_path, \
     file_name, file_type, file_size, status, created_at, updated_at, ocr_text";

/// PostgreSQL connection pool configuration
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

impl PostgresConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 10,
            connect_timeout_secs: 30,
        }
    }
}

/// Claims stored in a `claims` table, one column per attribute
#[derive(Debug, Clone)]
pub struct PostgresClaimRepository {
    pool: PgPool,
}

impl PostgresClaimRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and make sure the `claims` table exists
    pub async fn connect(config: &PostgresConfig) -> Result<Self, DomainError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect(&config.url)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to connect to PostgreSQL: {}", e)))?;

        let repository = Self::new(pool);
        repository.ensure_table().await?;

        Ok(repository)
    }

    pub async fn ensure_table(&self) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS claims (
                id BIGSERIAL PRIMARY KEY,
                claimant_name TEXT NOT NULL,
                claim_type TEXT NOT NULL,
                amount DOUBLE PRECISION NOT NULL,
                description TEXT,
                document_path TEXT,
                file_name TEXT,
                file_type TEXT,
                file_size BIGINT,
                status TEXT NOT NULL DEFAULT 'Pending',
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                ocr_text TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create claims table: {}", e)))?;

        Ok(())
    }
}

fn row_to_claim(row: &PgRow) -> Result<Claim, DomainError> {
    let status: String = row.try_get("status")?;
    let file_size: Option<i64> = row.try_get("file_size")?;

    Ok(Claim {
        id: ClaimId::new(row.try_get("id")?),
        claimant_name: row.try_get("claimant_name")?,
        claim_type: row.try_get("claim_type")?,
        amount: row.try_get("amount")?,
        description: row.try_get("description")?,
        document_path: row.try_get("document_path")?,
        file_name: row.try_get("file_name")?,
        file_type: row.try_get("file_type")?,
        file_size: file_size.and_then(|s| u64::try_from(s).ok()),
        status: status.parse()?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        ocr_text: row.try_get("ocr_text")?,
    })
}

/// `%term%` with LIKE metacharacters escaped
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn not_found(id: ClaimId) -> DomainError {
    DomainError::not_found(format!("Claim {} not found", id))
}

#[async_trait]
impl ClaimRepository for PostgresClaimRepository {
    async fn create(&self, claim: NewClaim) -> Result<Claim, DomainError> {
        let document = claim.document;
        let query = format!(
            "INSERT INTO claims (claimant_name, claim_type, amount, description, document_path, \
             file_name, file_type, file_size) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {}",
            CLAIM_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(&claim.claimant_name)
            .bind(&claim.claim_type)
            .bind(claim.amount)
            .bind(&claim.description)
            .bind(document.as_ref().map(|d| d.path.clone()))
            .bind(document.as_ref().map(|d| d.file_name.clone()))
            .bind(document.as_ref().map(|d| d.file_type.clone()))
            .bind(document.as_ref().map(|d| d.file_size as i64))
            .fetch_one(&self.pool)
            .await?;

        row_to_claim(&row)
    }

    async fn get(&self, id: ClaimId) -> Result<Option<Claim>, DomainError> {
        let query = format!("SELECT {} FROM claims WHERE id = $1", CLAIM_COLUMNS);

        let row = sqlx::query(&query)
            .bind(id.value())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_claim).transpose()
    }

    async fn list(&self, filter: ClaimFilter) -> Result<Vec<Claim>, DomainError> {
        let query = format!(
            "SELECT {} FROM claims \
             WHERE ($1::text IS NULL OR status = $1) \
             AND ($2::text IS NULL OR claimant_name ILIKE $2) \
             ORDER BY id OFFSET $3 LIMIT $4",
            CLAIM_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(filter.status.map(|s| s.as_str()))
            .bind(filter.claimant_name.as_deref().map(like_pattern))
            .bind(filter.skip as i64)
            .bind(filter.limit as i64)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_claim).collect()
    }

    async fn search_ocr_text(
        &self,
        terms: Vec<String>,
        limit: usize,
    ) -> Result<Vec<Claim>, DomainError> {
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let patterns: Vec<String> = terms.iter().map(|t| like_pattern(t)).collect();
        let query = format!(
            "SELECT {} FROM claims WHERE ocr_text ILIKE ANY($1) ORDER BY id LIMIT $2",
            CLAIM_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(patterns)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_claim).collect()
    }

    async fn update_status(
        &self,
        id: ClaimId,
        status: ClaimStatus,
    ) -> Result<Claim, DomainError> {
        let query = format!(
            "UPDATE claims SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING {}",
            CLAIM_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(id.value())
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => row_to_claim(&row),
            None => Err(not_found(id)),
        }
    }

    async fn delete(&self, id: ClaimId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM claims WHERE id = $1")
            .bind(id.value())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn save_raw_text(&self, id: ClaimId, text: String) -> Result<(), DomainError> {
        let result =
            sqlx::query("UPDATE claims SET ocr_text = $2, updated_at = NOW() WHERE id = $1")
                .bind(id.value())
                .bind(text)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }

        Ok(())
    }

    async fn save_parsed_fields(
        &self,
        id: ClaimId,
        fields: ParsedFields,
    ) -> Result<(), DomainError> {
        let result = sqlx::query(
            "UPDATE claims SET claim_type = COALESCE($2, claim_type), \
             amount = COALESCE($3, amount), updated_at = NOW() WHERE id = $1",
        )
        .bind(id.value())
        .bind(fields.claim_type)
        .bind(fields.amount)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }

        Ok(())
    }

    async fn ping(&self) -> Result<(), DomainError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
