use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use crate::error::RetrievalError;
use crate::models::OrganizationRecord;

/// Active root plus all active descendants. The only bind parameter is `$1`, the root id.
///
/// The active status is written in as a quoted literal (`'` doubled).
/// `UNION` drops repeated rows, so a parent cycle in the table cannot make the
/// recursion run forever.
pub fn subtree_query(active_status: &str) -> String {
    let status = format!("'{}'", active_status.replace('\'', "''"));
    format!(
        r#"WITH RECURSIVE org_tree AS (
        SELECT org_id, org_name, org_parent_id
        FROM organization
        WHERE org_id::text = $1 AND org_status::text = {status}
        UNION
        SELECT o.org_id, o.org_name, o.org_parent_id
        FROM organization o
        INNER JOIN org_tree ot ON o.org_parent_id = ot.org_id
        WHERE o.org_status::text = {status}
    )
    SELECT org_id::text AS org_id,
           org_name::text AS org_name,
           org_parent_id::text AS org_parent_id
    FROM org_tree"#
    )
}

/// Source of the flat, unordered rooted closure for an organization id.
///
/// An unknown or inactive root yields an empty set, not an error.
#[async_trait]
pub trait SubtreeSource: Send + Sync {
    async fn fetch_subtree(&self, root_id: &str)
        -> Result<Vec<OrganizationRecord>, RetrievalError>;
}

#[derive(Clone, Debug)]
pub struct RetrieverConfig {
    /// Value of `org_status` that marks a row as active.
    pub active_status: String,
}

pub struct PgSubtreeRetriever {
    pool: PgPool,
    query: String,
}

impl PgSubtreeRetriever {
    pub fn new(pool: PgPool, config: RetrieverConfig) -> Self {
        Self {
            pool,
            query: subtree_query(&config.active_status),
        }
    }
}

#[async_trait]
impl SubtreeSource for PgSubtreeRetriever {
    async fn fetch_subtree(
        &self,
        root_id: &str,
    ) -> Result<Vec<OrganizationRecord>, RetrievalError> {
        // Held for exactly one query; returned to the pool on every exit path.
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(RetrievalError::Connection)?;

        let rows = sqlx::query(&self.query)
            .bind(root_id)
            .fetch_all(&mut *conn)
            .await
            .map_err(RetrievalError::Query)?;

        let records = rows
            .iter()
            .map(OrganizationRecord::from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(RetrievalError::Decode)?;

        tracing::debug!(
            "fetch_subtree: root_id={}, rows={}",
            root_id,
            records.len()
        );

        Ok(records)
    }
}
