//! Typed endpoint helpers
//!
//! Thin wrappers that name the endpoints and filters the dashboard needs.

use super::ApiClient;
use crate::error::FetchError;
use crate::models::{CoalitionUser, CursusProject, LocationRecord, ProjectUser};

impl ApiClient {
    /// Projects of a cursus, e.g. `42cursus`
    pub async fn cursus_projects(&self, cursus: &str) -> Result<Vec<CursusProject>, FetchError> {
        let endpoint = format!("/v2/cursus/{cursus}/projects");
        Ok(self.fetch_all(&endpoint, &[]).await?.into_items())
    }

    /// Graded attempts at a project on one campus
    pub async fn project_users(
        &self,
        project: &str,
        campus_id: u32,
    ) -> Result<Vec<ProjectUser>, FetchError> {
        let endpoint = format!("/v2/projects/{project}/projects_users");
        let campus = campus_id.to_string();
        let params = [("filter[campus]", campus.as_str()), ("filter[marked]", "true")];
        Ok(self.fetch_all(&endpoint, &params).await?.into_items())
    }

    /// Members of a coalition
    pub async fn coalition_users(&self, coalition: &str) -> Result<Vec<CoalitionUser>, FetchError> {
        let endpoint = format!("/v2/coalitions/{coalition}/coalitions_users");
        Ok(self.fetch_all(&endpoint, &[]).await?.into_items())
    }

    /// Location history of a user, most recent first
    ///
    /// Elements without the location shape come back as
    /// [`LocationRecord::Invalid`]; only page-level problems are errors.
    pub async fn user_locations(&self, login: &str) -> Result<Vec<LocationRecord>, FetchError> {
        let endpoint = format!("/v2/users/{login}/locations");
        Ok(self
            .fetch_all(&endpoint, &[("sort", "-begin_at")])
            .await?
            .into_items())
    }
}
