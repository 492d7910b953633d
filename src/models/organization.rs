use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Flat organization row as returned by the subtree query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, FromRow)]
pub struct OrganizationRecord {
    #[sqlx(rename = "org_id")]
    pub id: String,
    #[sqlx(rename = "org_name")]
    pub name: String,
    #[sqlx(rename = "org_parent_id")]
    pub parent_id: Option<String>,
}

impl OrganizationRecord {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        parent_id: Option<&str>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            parent_id: parent_id.map(str::to_string),
        }
    }
}

/// Nested organization as rendered to consumers.
///
/// Field names (including `org_childs`) are fixed by existing clients.
/// `org_childs` is left out entirely for leaves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationNode {
    #[serde(rename = "org_id")]
    pub id: String,
    #[serde(rename = "org_name")]
    pub name: String,
    #[serde(rename = "org_childs", default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<OrganizationNode>,
}

impl OrganizationNode {
    pub fn leaf(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// Ids of this node and all its descendants, pre-order.
    pub fn ids(&self) -> Vec<&str> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(node.id.as_str());
            stack.extend(node.children.iter().rev());
        }
        out
    }

    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }
}

// Flatten before dropping so a very deep tree does not recurse in drop glue.
impl Drop for OrganizationNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}
