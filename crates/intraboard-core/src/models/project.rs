//! Project and project completion records

use serde::{Deserialize, Serialize};

/// Mark from which a completion counts as validated
pub const PASSING_MARK: i64 = 100;

/// Entry of `/v2/cursus/{cursus}/projects`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursusProject {
    #[serde(default)]
    pub id: Option<u64>,
    pub slug: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// User as embedded in a projects_users entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: u64,
    pub login: String,
}

/// Project as embedded in a projects_users entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRef {
    #[serde(default)]
    pub id: Option<u64>,
    pub slug: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Entry of `/v2/projects/{slug}/projects_users`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectUser {
    /// Absent while the team has not been graded
    #[serde(default)]
    pub final_mark: Option<i64>,
    pub user: UserRef,
    pub project: ProjectRef,
    #[serde(default, rename = "validated?")]
    pub validated: Option<bool>,
}

impl ProjectUser {
    /// Final mark, ungraded entries count as zero
    pub fn mark(&self) -> i64 {
        self.final_mark.unwrap_or(0)
    }

    pub fn passed(&self) -> bool {
        self.mark() >= PASSING_MARK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_project_user() {
        let json = r#"{
            "id": 1,
            "final_mark": 125,
            "status": "finished",
            "validated?": true,
            "user": {"id": 7, "login": "jdoe", "url": "https://api.intra.42.fr/v2/users/jdoe"},
            "project": {"id": 1314, "name": "Libft", "slug": "42cursus-libft"}
        }"#;

        let entry: ProjectUser = serde_json::from_str(json).unwrap();
        assert_eq!(entry.mark(), 125);
        assert!(entry.passed());
        assert_eq!(entry.user.login, "jdoe");
        assert_eq!(entry.project.slug, "42cursus-libft");
        assert_eq!(entry.validated, Some(true));
    }

    #[test]
    fn test_ungraded_counts_as_fail() {
        let json = r#"{
            "final_mark": null,
            "user": {"id": 8, "login": "asmith"},
            "project": {"slug": "42cursus-libft"}
        }"#;

        let entry: ProjectUser = serde_json::from_str(json).unwrap();
        assert_eq!(entry.mark(), 0);
        assert!(!entry.passed());
    }
}
