//! Coalition membership lookup for coloring users

use crate::cache::DiskCache;
use crate::settings::{CoalitionColor, CoalitionSpec};
use anyhow::{Context, Result};
use intraboard_core::ApiClient;
use std::collections::HashSet;

/// A configured coalition with its resolved members
#[derive(Debug, Clone)]
pub struct Coalition {
    pub name: String,
    pub color: CoalitionColor,
    members: HashSet<u64>,
}

impl Coalition {
    pub fn new(name: impl Into<String>, color: CoalitionColor, members: HashSet<u64>) -> Self {
        Self {
            name: name.into(),
            color,
            members,
        }
    }

    pub fn contains(&self, user_id: u64) -> bool {
        self.members.contains(&user_id)
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}

/// Ordered coalitions; the first one containing a user wins
#[derive(Debug, Clone)]
pub struct CoalitionIndex {
    coalitions: Vec<Coalition>,
    fallback: CoalitionColor,
}

impl CoalitionIndex {
    pub fn new(fallback: CoalitionColor) -> Self {
        Self {
            coalitions: Vec::new(),
            fallback,
        }
    }

    pub fn push(&mut self, coalition: Coalition) {
        self.coalitions.push(coalition);
    }

    pub fn coalitions(&self) -> &[Coalition] {
        &self.coalitions
    }

    /// Position of the user's coalition in configuration order
    pub fn position_of(&self, user_id: u64) -> Option<usize> {
        self.coalitions.iter().position(|c| c.contains(user_id))
    }

    pub fn classify(&self, user_id: u64) -> Option<&Coalition> {
        self.position_of(user_id).map(|i| &self.coalitions[i])
    }

    pub fn color_of(&self, user_id: u64) -> CoalitionColor {
        self.classify(user_id)
            .map(|c| c.color)
            .unwrap_or(self.fallback)
    }
}

/// Member ids of one coalition slug, served from cache when fresh
pub async fn coalition_member_ids(
    client: &ApiClient,
    cache: &DiskCache,
    slug: &str,
) -> Result<Vec<u64>> {
    let key = format!("coalition-{slug}");
    if let Some(ids) = cache.load::<Vec<u64>>(&key) {
        return Ok(ids);
    }

    let ids: Vec<u64> = client
        .coalition_users(slug)
        .await
        .with_context(|| format!("Failed to fetch members of coalition {slug}"))?
        .into_iter()
        .map(|member| member.user_id)
        .collect();

    if let Err(e) = cache.store(&key, &ids) {
        tracing::warn!("Could not cache coalition {}: {:#}", slug, e);
    }
    Ok(ids)
}

/// Resolve every configured coalition into an index
pub async fn load_index(
    client: &ApiClient,
    cache: &DiskCache,
    specs: &[CoalitionSpec],
    fallback: CoalitionColor,
) -> Result<CoalitionIndex> {
    let mut index = CoalitionIndex::new(fallback);

    for spec in specs {
        let mut members = HashSet::new();
        for slug in &spec.slugs {
            members.extend(coalition_member_ids(client, cache, slug).await?);
        }
        let coalition = Coalition::new(spec.name.clone(), spec.color, members);
        tracing::debug!("Coalition {} has {} members", coalition.name, coalition.member_count());
        index.push(coalition);
    }

    Ok(index)
}
