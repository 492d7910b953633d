use std::collections::{HashSet, VecDeque};

use async_trait::async_trait;

use crate::db::{RetrieverConfig, SubtreeSource};
use crate::error::RetrievalError;
use crate::models::OrganizationRecord;

/// One row of the `organization` table, held in memory.
#[derive(Debug, Clone)]
pub struct OrganizationRow {
    pub record: OrganizationRecord,
    pub status: String,
}

impl OrganizationRow {
    pub fn new(record: OrganizationRecord, status: impl Into<String>) -> Self {
        Self {
            record,
            status: status.into(),
        }
    }
}

/// In-process `SubtreeSource` with the same closure semantics as [`subtree_query`].
///
/// Stands in for Postgres in the unit and router tests.
///
/// [`subtree_query`]: crate::db::subtree_query
pub struct MemorySubtreeSource {
    rows: Vec<OrganizationRow>,
    config: RetrieverConfig,
}

impl MemorySubtreeSource {
    pub fn new(rows: Vec<OrganizationRow>, config: RetrieverConfig) -> Self {
        Self { rows, config }
    }

    fn is_active(&self, row: &OrganizationRow) -> bool {
        row.status == self.config.active_status
    }
}

#[async_trait]
impl SubtreeSource for MemorySubtreeSource {
    async fn fetch_subtree(
        &self,
        root_id: &str,
    ) -> Result<Vec<OrganizationRecord>, RetrievalError> {
        let mut seen: HashSet<&OrganizationRecord> = HashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::new();

        for row in self.rows.iter().filter(|r| self.is_active(r)) {
            if row.record.id == root_id && seen.insert(&row.record) {
                queue.push_back(row.record.id.as_str());
            }
        }

        // Breadth-first over parent links. Identical rows are kept once, like UNION.
        while let Some(parent_id) = queue.pop_front() {
            for row in self.rows.iter().filter(|r| self.is_active(r)) {
                if row.record.parent_id.as_deref() == Some(parent_id) && seen.insert(&row.record)
                {
                    queue.push_back(row.record.id.as_str());
                }
            }
        }

        let mut out: Vec<OrganizationRecord> = seen.into_iter().cloned().collect();
        // HashSet order is random; keep repeated calls identical.
        out.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(out)
    }
}
