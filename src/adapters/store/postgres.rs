//! Postgres-backed knowledge store and turn recorder.
//!
//! Schema (see `migrations/`): `rules` holds the classification vocabulary
//! (label + rule description), `level_one_questions` holds the canned
//! answers keyed by question label, `conversations` holds recorded turns.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::ports::{CategoryCatalog, KnowledgeStore, StoreError, TurnRecord, TurnRecorder};

fn query_error(error: sqlx::Error) -> StoreError {
    StoreError::Query(error.to_string())
}

/// Knowledge store over a Postgres pool.
pub struct PostgresKnowledgeStore {
    pool: PgPool,
}

impl PostgresKnowledgeStore {
    /// Creates a store over the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl KnowledgeStore for PostgresKnowledgeStore {
    async fn fetch_categories(&self) -> Result<CategoryCatalog, StoreError> {
        let rows = sqlx::query("SELECT label, description FROM rules ORDER BY created_at")
            .fetch_all(&self.pool)
            .await
            .map_err(query_error)?;

        let mut options = Vec::with_capacity(rows.len());
        let mut guide_lines = Vec::with_capacity(rows.len());
        for row in rows {
            let label: String = row.try_get("label").map_err(query_error)?;
            let description: String = row.try_get("description").map_err(query_error)?;
            guide_lines.push(format!("{label}: {description}"));
            options.push(label);
        }

        Ok(CategoryCatalog::new(options, guide_lines.join("\n")))
    }

    async fn fetch_answer(&self, category: &str) -> Result<Option<String>, StoreError> {
        let row = sqlx::query("SELECT answer FROM level_one_questions WHERE question = $1 LIMIT 1")
            .bind(category)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_error)?;

        row.map(|r| r.try_get::<String, _>("answer").map_err(query_error))
            .transpose()
    }
}

/// Turn recorder over a Postgres pool.
pub struct PostgresTurnRecorder {
    pool: PgPool,
}

impl PostgresTurnRecorder {
    /// Creates a recorder over the given pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TurnRecorder for PostgresTurnRecorder {
    async fn record_turn(&self, turn: &TurnRecord) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO conversations (id, sender_id, question, answer, resolved_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(turn.id.as_uuid())
        .bind(turn.sender.as_str())
        .bind(&turn.question)
        .bind(&turn.answer)
        .bind(turn.resolved_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(query_error)?;

        Ok(())
    }
}
