//! Project persistence behind an injectable trait.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use time::OffsetDateTime;
use tracing::Instrument;
use uuid::Uuid;

const UNIQUE_VIOLATION: &str = "23505";

#[derive(Clone, Debug)]
pub struct ProjectRecord {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub summary: String,
    pub description: String,
    pub role: String,
    pub stack: Vec<String>,
    pub year: i32,
    pub cover_image: Option<String>,
    pub screenshots: Vec<String>,
    pub repo_url: Option<String>,
    pub demo_url: Option<String>,
    pub featured: bool,
    pub published: bool,
    pub created_at: OffsetDateTime,
}

/// Insert payload with the slug already normalized.
#[derive(Clone, Debug)]
pub struct NewProject {
    pub title: String,
    pub slug: String,
    pub summary: String,
    pub description: String,
    pub role: String,
    pub stack: Vec<String>,
    pub year: i32,
    pub cover_image: Option<String>,
    pub screenshots: Vec<String>,
    pub repo_url: Option<String>,
    pub demo_url: Option<String>,
    pub featured: bool,
    pub published: bool,
}

/// Partial update; `None` keeps the stored value.
#[derive(Clone, Debug, Default)]
pub struct ProjectChanges {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub role: Option<String>,
    pub stack: Option<Vec<String>>,
    pub year: Option<i32>,
    pub cover_image: Option<String>,
    pub screenshots: Option<Vec<String>>,
    pub repo_url: Option<String>,
    pub demo_url: Option<String>,
    pub featured: Option<bool>,
    pub published: Option<bool>,
}

#[derive(Debug, thiserror::Error)]
pub enum ProjectStoreError {
    #[error("Slug already in use")]
    SlugConflict,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Published projects only, newest year first.
    async fn list_published(&self) -> Result<Vec<ProjectRecord>>;
    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<ProjectRecord>>;
    /// All projects, drafts included; the admin view.
    async fn list_all(&self) -> Result<Vec<ProjectRecord>>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ProjectRecord>>;
    async fn insert(&self, project: NewProject) -> Result<ProjectRecord, ProjectStoreError>;
    /// Returns `Ok(None)` when the project does not exist.
    async fn update(
        &self,
        id: Uuid,
        changes: ProjectChanges,
    ) -> Result<Option<ProjectRecord>, ProjectStoreError>;
    /// Returns `true` when a row was actually deleted.
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

pub struct PgProjectStore {
    pool: PgPool,
}

impl PgProjectStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn record_from_row(row: &PgRow) -> ProjectRecord {
        ProjectRecord {
            id: row.get("id"),
            title: row.get("title"),
            slug: row.get("slug"),
            summary: row.get("summary"),
            description: row.get("description"),
            role: row.get("role"),
            stack: row.get("stack"),
            year: row.get("year"),
            cover_image: row.get("cover_image"),
            screenshots: row.get("screenshots"),
            repo_url: row.get("repo_url"),
            demo_url: row.get("demo_url"),
            featured: row.get("featured"),
            published: row.get("published"),
            created_at: row.get("created_at"),
        }
    }
}

const PROJECT_COLUMNS: &str = "id, title, slug, summary, description, role, stack, year, \
     cover_image, screenshots, repo_url, demo_url, featured, published, created_at";

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION)
    )
}

#[async_trait]
impl ProjectStore for PgProjectStore {
    async fn list_published(&self) -> Result<Vec<ProjectRecord>> {
        let query = format!(
            "SELECT {PROJECT_COLUMNS} FROM projects WHERE published ORDER BY year DESC, created_at DESC"
        );
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query.as_str()
        );
        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .instrument(span)
            .await
            .context("failed to list published projects")?;
        Ok(rows.iter().map(Self::record_from_row).collect())
    }

    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<ProjectRecord>> {
        let query = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE published AND slug = $1");
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query.as_str()
        );
        let row = sqlx::query(&query)
            .bind(slug)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup project by slug")?;
        Ok(row.as_ref().map(Self::record_from_row))
    }

    async fn list_all(&self) -> Result<Vec<ProjectRecord>> {
        let query =
            format!("SELECT {PROJECT_COLUMNS} FROM projects ORDER BY year DESC, created_at DESC");
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query.as_str()
        );
        let rows = sqlx::query(&query)
            .fetch_all(&self.pool)
            .instrument(span)
            .await
            .context("failed to list projects")?;
        Ok(rows.iter().map(Self::record_from_row).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ProjectRecord>> {
        let query = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1");
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query.as_str()
        );
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup project by id")?;
        Ok(row.as_ref().map(Self::record_from_row))
    }

    async fn insert(&self, project: NewProject) -> Result<ProjectRecord, ProjectStoreError> {
        let query = format!(
            "INSERT INTO projects (title, slug, summary, description, role, stack, year, \
             cover_image, screenshots, repo_url, demo_url, featured, published) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             RETURNING {PROJECT_COLUMNS}"
        );
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query.as_str()
        );
        let row = sqlx::query(&query)
            .bind(&project.title)
            .bind(&project.slug)
            .bind(&project.summary)
            .bind(&project.description)
            .bind(&project.role)
            .bind(&project.stack)
            .bind(project.year)
            .bind(&project.cover_image)
            .bind(&project.screenshots)
            .bind(&project.repo_url)
            .bind(&project.demo_url)
            .bind(project.featured)
            .bind(project.published)
            .fetch_one(&self.pool)
            .instrument(span)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    ProjectStoreError::SlugConflict
                } else {
                    ProjectStoreError::Other(
                        anyhow::Error::new(err).context("failed to insert project"),
                    )
                }
            })?;
        Ok(Self::record_from_row(&row))
    }

    async fn update(
        &self,
        id: Uuid,
        changes: ProjectChanges,
    ) -> Result<Option<ProjectRecord>, ProjectStoreError> {
        let query = format!(
            "UPDATE projects SET \
             title = COALESCE($2, title), \
             slug = COALESCE($3, slug), \
             summary = COALESCE($4, summary), \
             description = COALESCE($5, description), \
             role = COALESCE($6, role), \
             stack = COALESCE($7, stack), \
             year = COALESCE($8, year), \
             cover_image = COALESCE($9, cover_image), \
             screenshots = COALESCE($10, screenshots), \
             repo_url = COALESCE($11, repo_url), \
             demo_url = COALESCE($12, demo_url), \
             featured = COALESCE($13, featured), \
             published = COALESCE($14, published) \
             WHERE id = $1 \
             RETURNING {PROJECT_COLUMNS}"
        );
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query.as_str()
        );
        let row = sqlx::query(&query)
            .bind(id)
            .bind(&changes.title)
            .bind(&changes.slug)
            .bind(&changes.summary)
            .bind(&changes.description)
            .bind(&changes.role)
            .bind(&changes.stack)
            .bind(changes.year)
            .bind(&changes.cover_image)
            .bind(&changes.screenshots)
            .bind(&changes.repo_url)
            .bind(&changes.demo_url)
            .bind(changes.featured)
            .bind(changes.published)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    ProjectStoreError::SlugConflict
                } else {
                    ProjectStoreError::Other(
                        anyhow::Error::new(err).context("failed to update project"),
                    )
                }
            })?;
        Ok(row.as_ref().map(Self::record_from_row))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let query = "DELETE FROM projects WHERE id = $1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "DELETE",
            db.statement = query
        );
        let result = sqlx::query(query)
            .bind(id)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to delete project")?;
        Ok(result.rows_affected() > 0)
    }
}
