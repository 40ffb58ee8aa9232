//! Request/response types for the project APIs.

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use utoipa::ToSchema;

use super::storage::ProjectRecord;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub title: String,
    pub slug: Option<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub stack: Vec<String>,
    pub year: i32,
    pub cover_image: Option<String>,
    #[serde(default)]
    pub screenshots: Vec<String>,
    pub repo_url: Option<String>,
    pub demo_url: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default = "default_published")]
    pub published: bool,
}

const fn default_published() -> bool {
    true
}

/// Partial update; absent fields keep their stored value. In particular a
/// missing `coverImage` never clears an uploaded cover.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectRequest {
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

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    pub id: String,
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
    pub created_at: String,
}

impl From<ProjectRecord> for ProjectResponse {
    fn from(record: ProjectRecord) -> Self {
        let created_at = record
            .created_at
            .format(&Rfc3339)
            .unwrap_or_else(|_| record.created_at.to_string());
        Self {
            id: record.id.to_string(),
            title: record.title,
            slug: record.slug,
            summary: record.summary,
            description: record.description,
            role: record.role,
            stack: record.stack,
            year: record.year,
            cover_image: record.cover_image,
            screenshots: record.screenshots,
            repo_url: record.repo_url,
            demo_url: record.demo_url,
            featured: record.featured,
            published: record.published,
            created_at,
        }
    }
}
