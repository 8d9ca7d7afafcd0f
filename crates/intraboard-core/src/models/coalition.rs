//! Coalition membership records

use serde::{Deserialize, Serialize};

/// One entry of `/v2/coalitions/{slug}/coalitions_users`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoalitionUser {
    #[serde(default)]
    pub id: Option<u64>,
    pub user_id: u64,
    #[serde(default)]
    pub coalition_id: Option<u64>,
    #[serde(default)]
    pub score: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_member() {
        let member: CoalitionUser = serde_json::from_str(r#"{"user_id": 4242}"#).unwrap();
        assert_eq!(member.user_id, 4242);
        assert!(member.score.is_none());
    }
}
