//! PostgreSQL-backed submission store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use formcraft_application::SubmissionRepository;
use formcraft_core::{AppError, AppResult, UserId};
use formcraft_domain::{
    ElementId, FormId, Submission, SubmissionId, SubmissionResponse, SubmissionStatus,
};

/// PostgreSQL implementation of the submission repository port.
#[derive(Clone)]
pub struct PostgresSubmissionRepository {
    pool: PgPool,
}

impl PostgresSubmissionRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SubmissionRow {
    id: Uuid,
    submitted_by: Option<Uuid>,
    submitted_at: DateTime<Utc>,
    status: String,
}

#[derive(Debug, sqlx::FromRow)]
struct ResponseRow {
    submission_id: Uuid,
    element_id: String,
    value: Value,
}

#[async_trait]
impl SubmissionRepository for PostgresSubmissionRepository {
    async fn create_submission(&self, submission: &Submission) -> AppResult<()> {
        let mut transaction = self.pool.begin().await.map_err(|error| {
            AppError::Persistence(format!(
                "failed to start submission transaction for form '{}': {error}",
                submission.form_id()
            ))
        })?;

        sqlx::query(
            r#"
            INSERT INTO form_submissions (id, form_id, submitted_by, submitted_at, status)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(submission.id().as_uuid())
        .bind(submission.form_id().as_uuid())
        .bind(submission.submitted_by().map(|user_id| user_id.as_uuid()))
        .bind(submission.submitted_at())
        .bind(submission.status().as_str())
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Persistence(format!(
                "failed to insert submission '{}': {error}",
                submission.id()
            ))
        })?;

        for response in submission.responses() {
            sqlx::query(
                r#"
                INSERT INTO submission_responses (submission_id, element_id, value)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(response.submission_id.as_uuid())
            .bind(response.element_id.as_str())
            .bind(&response.value)
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Persistence(format!(
                    "failed to insert response to element '{}' of submission '{}': {error}",
                    response.element_id,
                    submission.id()
                ))
            })?;
        }

        transaction.commit().await.map_err(|error| {
            AppError::Persistence(format!(
                "failed to commit submission '{}': {error}",
                submission.id()
            ))
        })?;

        Ok(())
    }

    async fn list_submissions(&self, form_id: FormId) -> AppResult<Vec<Submission>> {
        let submissions = sqlx::query_as::<_, SubmissionRow>(
            r#"
            SELECT id, submitted_by, submitted_at, status
            FROM form_submissions
            WHERE form_id = $1
            ORDER BY submitted_at DESC
            "#,
        )
        .bind(form_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Persistence(format!(
                "failed to list submissions for form '{form_id}': {error}"
            ))
        })?;

        let ids: Vec<Uuid> = submissions.iter().map(|row| row.id).collect();
        let responses = sqlx::query_as::<_, ResponseRow>(
            r#"
            SELECT submission_id, element_id, value
            FROM submission_responses
            WHERE submission_id = ANY($1)
            ORDER BY created_at, id
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Persistence(format!(
                "failed to list responses for form '{form_id}': {error}"
            ))
        })?;

        let mut grouped: HashMap<Uuid, Vec<SubmissionResponse>> = HashMap::new();
        for row in responses {
            grouped
                .entry(row.submission_id)
                .or_default()
                .push(SubmissionResponse {
                    submission_id: SubmissionId::from_uuid(row.submission_id),
                    element_id: ElementId::new(row.element_id),
                    value: row.value,
                });
        }

        submissions
            .into_iter()
            .map(|row| {
                Ok(Submission::from_parts(
                    SubmissionId::from_uuid(row.id),
                    form_id,
                    row.submitted_by.map(UserId::from_uuid),
                    row.submitted_at,
                    row.status.parse::<SubmissionStatus>()?,
                    grouped.remove(&row.id).unwrap_or_default(),
                ))
            })
            .collect()
    }
}
