//! PostgreSQL-backed persistence gateway for form aggregates.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, warn};
use uuid::Uuid;

use formcraft_application::{FormRepository, FormSummary};
use formcraft_core::{AppError, AppResult, UserId};
use formcraft_domain::{Form, FormBranding, FormId, FormParts, FormStatus};

use crate::element_codec::{ElementRow, encode_element};

/// PostgreSQL implementation of the form repository port.
#[derive(Clone)]
pub struct PostgresFormRepository {
    pool: PgPool,
}

impl PostgresFormRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct FormRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    status: String,
    branding: Option<Value>,
    version: i32,
    created_by: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, sqlx::FromRow)]
struct FormSummaryRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    status: String,
    version: i32,
    element_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    published_at: Option<DateTime<Utc>>,
}

impl TryFrom<FormSummaryRow> for FormSummary {
    type Error = AppError;

    fn try_from(row: FormSummaryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: FormId::from_uuid(row.id),
            title: row.title,
            description: row.description,
            status: row.status.parse::<FormStatus>()?,
            version: row.version,
            element_count: usize::try_from(row.element_count).unwrap_or_default(),
            created_at: row.created_at,
            updated_at: row.updated_at,
            published_at: row.published_at,
        })
    }
}

fn persistence_error(operation: &str, error: sqlx::Error) -> AppError {
    AppError::Persistence(format!("failed to {operation}: {error}"))
}

fn decode_branding(form_id: Uuid, raw: Option<Value>) -> Option<FormBranding> {
    let raw = raw.filter(|value| !value.is_null())?;
    match serde_json::from_value::<FormBranding>(raw) {
        Ok(branding) => Some(branding),
        Err(error) => {
            warn!(form_id = %form_id, error = %error, "ignoring unreadable form branding");
            None
        }
    }
}

impl PostgresFormRepository {
    async fn load_form(&self, row: FormRow) -> AppResult<Form> {
        let element_rows = sqlx::query_as::<_, ElementRow>(
            r#"
            SELECT id, type, label, placeholder, required, validation, options, repeatable, position
            FROM form_elements
            WHERE form_id = $1
            ORDER BY position
            "#,
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| persistence_error("load form elements", error))?;

        let elements = element_rows
            .into_iter()
            .map(ElementRow::into_element)
            .collect::<AppResult<Vec<_>>>()?;

        Form::from_parts(FormParts {
            id: Some(FormId::from_uuid(row.id)),
            title: row.title,
            description: row.description,
            status: row.status.parse::<FormStatus>()?,
            branding: decode_branding(row.id, row.branding),
            version: row.version,
            created_by: UserId::from_uuid(row.created_by),
            created_at: row.created_at,
            updated_at: row.updated_at,
            published_at: row.published_at,
            elements,
        })
    }

    async fn upsert_form_row(
        transaction: &mut Transaction<'_, Postgres>,
        form_id: FormId,
        form: &Form,
    ) -> AppResult<()> {
        let branding = form
            .branding()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|error| {
                AppError::Internal(format!("failed to encode branding of form '{form_id}': {error}"))
            })?;

        let result = sqlx::query(
            r#"
            INSERT INTO forms (
                id, title, description, status, branding, version,
                created_by, created_at, updated_at, published_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (id) DO UPDATE
            SET title = EXCLUDED.title,
                description = EXCLUDED.description,
                status = EXCLUDED.status,
                branding = EXCLUDED.branding,
                version = EXCLUDED.version,
                updated_at = EXCLUDED.updated_at,
                published_at = EXCLUDED.published_at
            WHERE forms.created_by = EXCLUDED.created_by
            "#,
        )
        .bind(form_id.as_uuid())
        .bind(form.title())
        .bind(form.description())
        .bind(form.status().as_str())
        .bind(branding)
        .bind(form.version())
        .bind(form.created_by().as_uuid())
        .bind(form.created_at())
        .bind(form.updated_at())
        .bind(form.published_at())
        .execute(&mut **transaction)
        .await
        .map_err(|error| persistence_error("upsert form", error))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "form '{form_id}' does not exist"
            )));
        }

        Ok(())
    }

    async fn replace_elements(
        transaction: &mut Transaction<'_, Postgres>,
        form_id: FormId,
        form: &Form,
    ) -> AppResult<()> {
        sqlx::query("DELETE FROM form_elements WHERE form_id = $1")
            .bind(form_id.as_uuid())
            .execute(&mut **transaction)
            .await
            .map_err(|error| persistence_error("delete form elements", error))?;

        for element in form.elements() {
            let encoded = encode_element(element)?;
            sqlx::query(
                r#"
                INSERT INTO form_elements (
                    form_id, id, type, label, placeholder, required,
                    validation, options, repeatable, position
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                "#,
            )
            .bind(form_id.as_uuid())
            .bind(element.id().as_str())
            .bind(element.element_type().as_str())
            .bind(element.label())
            .bind(element.placeholder())
            .bind(element.required())
            .bind(encoded.validation)
            .bind(encoded.options)
            .bind(element.repeatable())
            .bind(encoded.position)
            .execute(&mut **transaction)
            .await
            .map_err(|error| persistence_error("insert form elements", error))?;
        }

        Ok(())
    }
}

#[async_trait]
impl FormRepository for PostgresFormRepository {
    async fn save_form(&self, form: &Form) -> AppResult<FormId> {
        let form_id = form.id().unwrap_or_default();
        let mut transaction = self
            .pool
            .begin()
            .await
            .map_err(|error| persistence_error("start form save transaction", error))?;

        Self::upsert_form_row(&mut transaction, form_id, form).await?;
        Self::replace_elements(&mut transaction, form_id, form).await?;

        transaction
            .commit()
            .await
            .map_err(|error| persistence_error("commit form save transaction", error))?;

        debug!(form_id = %form_id, elements = form.elements().len(), "form persisted");
        Ok(form_id)
    }

    async fn find_form(&self, form_id: FormId) -> AppResult<Option<Form>> {
        let row = sqlx::query_as::<_, FormRow>(
            r#"
            SELECT id, title, description, status, branding, version,
                   created_by, created_at, updated_at, published_at
            FROM forms
            WHERE id = $1
            "#,
        )
        .bind(form_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| persistence_error("load form", error))?;

        match row {
            Some(row) => self.load_form(row).await.map(Some),
            None => Ok(None),
        }
    }

    async fn find_published_form(&self, form_id: FormId) -> AppResult<Option<Form>> {
        let row = sqlx::query_as::<_, FormRow>(
            r#"
            SELECT id, title, description, status, branding, version,
                   created_by, created_at, updated_at, published_at
            FROM forms
            WHERE id = $1 AND status = 'published'
            "#,
        )
        .bind(form_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| persistence_error("load published form", error))?;

        match row {
            Some(row) => self.load_form(row).await.map(Some),
            None => Ok(None),
        }
    }

    async fn list_forms_by_owner(&self, owner: UserId) -> AppResult<Vec<FormSummary>> {
        let rows = sqlx::query_as::<_, FormSummaryRow>(
            r#"
            SELECT f.id, f.title, f.description, f.status, f.version,
                   COUNT(e.id) AS element_count,
                   f.created_at, f.updated_at, f.published_at
            FROM forms f
            LEFT JOIN form_elements e ON e.form_id = f.id
            WHERE f.created_by = $1
            GROUP BY f.id
            ORDER BY f.updated_at DESC
            "#,
        )
        .bind(owner.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| persistence_error("list forms", error))?;

        rows.into_iter().map(FormSummary::try_from).collect()
    }

    async fn delete_form(&self, owner: UserId, form_id: FormId) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM forms WHERE id = $1 AND created_by = $2")
            .bind(form_id.as_uuid())
            .bind(owner.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|error| persistence_error("delete form", error))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "form '{form_id}' does not exist"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
