//! Audit log capability.

use async_trait::async_trait;
use lifeline_common::{ContainerId, EventRecord, LifelineResult};

/// Upper bound on the number of records a query returns.
pub const MAX_QUERY_LIMIT: usize = 100;

/// Recent-events query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditQuery {
    /// Maximum number of records, clamped to [`MAX_QUERY_LIMIT`].
    pub limit: usize,
    /// Only return records for this container.
    pub entity_id: Option<ContainerId>,
}

impl Default for AuditQuery {
    fn default() -> Self {
        Self {
            limit: MAX_QUERY_LIMIT,
            entity_id: None,
        }
    }
}

impl AuditQuery {
    /// The most recent records across all containers.
    #[must_use]
    pub fn recent() -> Self {
        Self::default()
    }

    /// The most recent records of one container.
    #[must_use]
    pub fn for_entity(id: ContainerId) -> Self {
        Self {
            entity_id: Some(id),
            ..Self::default()
        }
    }

    /// Set the limit.
    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// The limit actually applied.
    #[must_use]
    pub fn effective_limit(&self) -> usize {
        self.limit.min(MAX_QUERY_LIMIT)
    }
}

/// Append-only log of classified lifecycle events.
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Append a record.
    async fn append(&self, record: EventRecord) -> LifelineResult<()>;

    /// Query recent records, newest first.
    ///
    /// Records with equal timestamps come back most recently appended first.
    async fn query(&self, query: AuditQuery) -> LifelineResult<Vec<EventRecord>>;

    /// Number of stored records.
    async fn count(&self) -> LifelineResult<usize>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_is_clamped() {
        assert_eq!(AuditQuery::recent().effective_limit(), 100);
        assert_eq!(AuditQuery::recent().with_limit(500).effective_limit(), 100);
        assert_eq!(AuditQuery::recent().with_limit(5).effective_limit(), 5);
    }

    #[test]
    fn entity_filter() {
        let id = ContainerId::new("a").unwrap();
        assert_eq!(AuditQuery::for_entity(id.clone()).entity_id, Some(id));
        assert!(AuditQuery::recent().entity_id.is_none());
    }
}
