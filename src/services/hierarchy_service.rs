use std::sync::Arc;

use crate::db::SubtreeSource;
use crate::error::{AppError, AppResult};
use crate::models::OrganizationNode;
use crate::services::TreeAssembler;

pub const MISSING_ORGANIZATION_ID: &str = "Missing organization_id parameter";

/// Subtree retrieval followed by tree assembly, one independent run per call.
#[derive(Clone)]
pub struct HierarchyService {
    source: Arc<dyn SubtreeSource>,
    assembler: TreeAssembler,
}

impl HierarchyService {
    pub fn new(source: Arc<dyn SubtreeSource>, assembler: TreeAssembler) -> Self {
        Self { source, assembler }
    }

    pub async fn organization_tree(&self, organization_id: &str) -> AppResult<OrganizationNode> {
        if organization_id.is_empty() {
            return Err(AppError::InvalidInput(MISSING_ORGANIZATION_ID.to_string()));
        }

        let records = self.source.fetch_subtree(organization_id).await?;
        let tree = self.assembler.assemble(&records, organization_id)?;

        tracing::info!(
            "Organization tree built: org_id={}, rows={}, nodes={}",
            organization_id,
            records.len(),
            tree.node_count()
        );

        Ok(tree)
    }

    /// Serialized form of [`organization_tree`](Self::organization_tree).
    pub async fn generate_json_structure(&self, organization_id: &str) -> AppResult<String> {
        let tree = self.organization_tree(organization_id).await?;
        Ok(serde_json::to_string(&tree)?)
    }
}
