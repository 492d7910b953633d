//! Flat organization records to nested tree.
//!
//! Records are indexed once per call (`id -> record`, `parent_id -> children`)
//! and the tree is materialized depth-first from the requested root with an
//! explicit stack. The walk keeps the ids on the current path so a corrupted
//! parent chain ends in `CycleDetected`, and depth is capped.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::config::DEFAULT_MAX_DEPTH;
use crate::error::AssembleError;
use crate::models::{OrganizationNode, OrganizationRecord};

/// Lookup structures over one retrieved record set.
pub struct TreeIndex<'a> {
    by_id: HashMap<&'a str, &'a OrganizationRecord>,
    // BTreeMap keeps siblings ordered by id.
    children: HashMap<&'a str, BTreeMap<&'a str, &'a OrganizationRecord>>,
    duplicates: Vec<&'a str>,
}

impl<'a> TreeIndex<'a> {
    /// Later records win on duplicate ids; every duplicate is logged and kept in `duplicates()`.
    pub fn build(records: &'a [OrganizationRecord]) -> Self {
        let mut by_id = HashMap::with_capacity(records.len());
        let mut duplicates = Vec::new();

        for record in records {
            if by_id.insert(record.id.as_str(), record).is_some() {
                tracing::warn!(
                    "Duplicate organization id in subtree, keeping last: org_id={}",
                    record.id
                );
                duplicates.push(record.id.as_str());
            }
        }

        let mut children: HashMap<&str, BTreeMap<&str, &OrganizationRecord>> = HashMap::new();
        for record in by_id.values().copied() {
            if let Some(parent_id) = record.parent_id.as_deref() {
                children
                    .entry(parent_id)
                    .or_default()
                    .insert(record.id.as_str(), record);
            }
        }

        Self {
            by_id,
            children,
            duplicates,
        }
    }

    pub fn duplicates(&self) -> &[&'a str] {
        &self.duplicates
    }

    /// Builds the tree rooted at `root_id`. Records not reachable from the root are skipped.
    pub fn assemble(
        &self,
        root_id: &str,
        max_depth: usize,
    ) -> Result<OrganizationNode, AssembleError> {
        let root = self
            .by_id
            .get(root_id)
            .copied()
            .ok_or_else(|| AssembleError::RootMissing(root_id.to_string()))?;

        if max_depth == 0 {
            return Err(AssembleError::DepthExceeded { limit: max_depth });
        }

        // Explicit stack instead of recursion: one frame per level of the current path.
        let mut path: HashSet<&str> = HashSet::new();
        path.insert(root.id.as_str());
        let mut stack = vec![self.frame(root)];

        while let Some(mut top) = stack.pop() {
            match top.pending.next() {
                Some(child) => {
                    // `top` plus everything under it is stack.len() + 1 levels.
                    if stack.len() + 1 >= max_depth {
                        return Err(AssembleError::DepthExceeded { limit: max_depth });
                    }
                    if !path.insert(child.id.as_str()) {
                        return Err(AssembleError::CycleDetected {
                            id: child.id.clone(),
                        });
                    }
                    stack.push(top);
                    stack.push(self.frame(child));
                }
                None => {
                    path.remove(top.record.id.as_str());
                    let node = OrganizationNode {
                        id: top.record.id.clone(),
                        name: top.record.name.clone(),
                        children: top.children,
                    };
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(node),
                        None => return Ok(node),
                    }
                }
            }
        }

        // The root frame is the last one popped and always returns above.
        Err(AssembleError::RootMissing(root_id.to_string()))
    }

    fn frame(&self, record: &'a OrganizationRecord) -> Frame<'a> {
        let pending: Vec<&'a OrganizationRecord> = self
            .children
            .get(record.id.as_str())
            .map(|kids| kids.values().copied().collect())
            .unwrap_or_default();
        Frame {
            record,
            pending: pending.into_iter(),
            children: Vec::new(),
        }
    }
}

/// A node on the current path: children still to visit and children already built.
struct Frame<'a> {
    record: &'a OrganizationRecord,
    pending: std::vec::IntoIter<&'a OrganizationRecord>,
    children: Vec<OrganizationNode>,
}

/// Pure, stateless assembler; `max_depth` counts levels including the root.
#[derive(Debug, Clone, Copy)]
pub struct TreeAssembler {
    max_depth: usize,
}

impl TreeAssembler {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn assemble(
        &self,
        records: &[OrganizationRecord],
        root_id: &str,
    ) -> Result<OrganizationNode, AssembleError> {
        TreeIndex::build(records).assemble(root_id, self.max_depth)
    }
}

impl Default for TreeAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(id: &str, name: &str, parent: Option<&str>) -> OrganizationRecord {
        OrganizationRecord::new(id, name, parent)
    }

    fn acme() -> Vec<OrganizationRecord> {
        vec![
            rec("D", "Acme-West-1", Some("B")),
            rec("C", "Acme-East", Some("A")),
            rec("A", "Acme", None),
            rec("B", "Acme-West", Some("A")),
        ]
    }

    #[test]
    fn test_acme_example() {
        let tree = TreeAssembler::default().assemble(&acme(), "A").unwrap();

        assert_eq!(tree.id, "A");
        assert_eq!(tree.name, "Acme");
        assert_eq!(tree.children.len(), 2);
        assert_eq!(tree.children[0].id, "B");
        assert_eq!(tree.children[1].id, "C");
        assert_eq!(tree.children[0].children.len(), 1);
        assert_eq!(tree.children[0].children[0].id, "D");
        assert!(tree.children[1].children.is_empty());
        assert!(tree.children[0].children[0].children.is_empty());

        let json = serde_json::to_string(&tree).unwrap();
        assert_eq!(
            json,
            concat!(
                r#"{"org_id":"A","org_name":"Acme","org_childs":["#,
                r#"{"org_id":"B","org_name":"Acme-West","org_childs":[{"org_id":"D","org_name":"Acme-West-1"}]},"#,
                r#"{"org_id":"C","org_name":"Acme-East"}]}"#
            )
        );
    }

    #[test]
    fn test_output_independent_of_input_order() {
        let assembler = TreeAssembler::default();
        let mut reversed = acme();
        reversed.reverse();

        let first = serde_json::to_string(&assembler.assemble(&acme(), "A").unwrap()).unwrap();
        let second = serde_json::to_string(&assembler.assemble(&acme(), "A").unwrap()).unwrap();
        let third = serde_json::to_string(&assembler.assemble(&reversed, "A").unwrap()).unwrap();

        assert_eq!(first, second);
        assert_eq!(first, third);
    }

    #[test]
    fn test_subtree_root_below_top() {
        let tree = TreeAssembler::default().assemble(&acme(), "B").unwrap();
        assert_eq!(tree.ids(), vec!["B", "D"]);
    }

    #[test]
    fn test_reachable_ids_match_input() {
        let records = vec![
            rec("root", "Root", None),
            rec("a", "A", Some("root")),
            rec("b", "B", Some("root")),
            rec("a1", "A1", Some("a")),
            rec("a2", "A2", Some("a")),
            rec("a1x", "A1X", Some("a1")),
            rec("b1", "B1", Some("b")),
        ];
        let tree = TreeAssembler::default().assemble(&records, "root").unwrap();

        let mut ids = tree.ids();
        ids.sort_unstable();
        let mut expected: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        expected.sort_unstable();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_orphans_excluded() {
        let mut records = acme();
        records.push(rec("X", "Stray", Some("missing")));
        records.push(rec("Y", "Stray child", Some("X")));

        let tree = TreeAssembler::default().assemble(&records, "A").unwrap();
        let ids = tree.ids();
        assert!(!ids.contains(&"X"));
        assert!(!ids.contains(&"Y"));
        assert_eq!(ids.len(), 4);
    }

    #[test]
    fn test_root_with_parent_outside_set() {
        let records = vec![rec("B", "Acme-West", Some("A")), rec("D", "Acme-West-1", Some("B"))];
        let tree = TreeAssembler::default().assemble(&records, "B").unwrap();
        assert_eq!(tree.ids(), vec!["B", "D"]);
    }

    #[test]
    fn test_root_missing() {
        let err = TreeAssembler::default().assemble(&acme(), "Z").unwrap_err();
        assert_eq!(err, AssembleError::RootMissing("Z".to_string()));

        let err = TreeAssembler::default().assemble(&[], "A").unwrap_err();
        assert_eq!(err, AssembleError::RootMissing("A".to_string()));
    }

    #[test]
    fn test_two_node_cycle() {
        let records = vec![rec("A", "Alpha", Some("B")), rec("B", "Beta", Some("A"))];
        let err = TreeAssembler::default().assemble(&records, "A").unwrap_err();
        assert_eq!(err, AssembleError::CycleDetected { id: "A".to_string() });
    }

    #[test]
    fn test_self_parent_cycle() {
        let records = vec![rec("A", "Alpha", Some("A"))];
        let err = TreeAssembler::default().assemble(&records, "A").unwrap_err();
        assert_eq!(err, AssembleError::CycleDetected { id: "A".to_string() });
    }

    #[test]
    fn test_depth_limit() {
        let records = vec![
            rec("1", "One", None),
            rec("2", "Two", Some("1")),
            rec("3", "Three", Some("2")),
        ];
        assert!(TreeAssembler::new(3).assemble(&records, "1").is_ok());
        assert_eq!(
            TreeAssembler::new(2).assemble(&records, "1").unwrap_err(),
            AssembleError::DepthExceeded { limit: 2 }
        );
    }

    #[test]
    fn test_deep_chain_reports_depth_instead_of_overflowing() {
        let mut records = vec![rec("n0", "Node 0", None)];
        for i in 1..10_000 {
            records.push(OrganizationRecord::new(
                format!("n{}", i),
                format!("Node {}", i),
                Some(format!("n{}", i - 1).as_str()),
            ));
        }
        let err = TreeAssembler::default().assemble(&records, "n0").unwrap_err();
        assert_eq!(err, AssembleError::DepthExceeded { limit: DEFAULT_MAX_DEPTH });
    }

    #[test]
    fn test_long_chain_with_large_limit_does_not_overflow() {
        let mut records = vec![rec("n0", "Node 0", None)];
        for i in 1..20_000 {
            records.push(OrganizationRecord::new(
                format!("n{}", i),
                format!("Node {}", i),
                Some(format!("n{}", i - 1).as_str()),
            ));
        }

        let tree = TreeAssembler::new(1_000_000).assemble(&records, "n0").unwrap();
        assert_eq!(tree.node_count(), 20_000);
        assert_eq!(tree.ids().last(), Some(&"n19999"));

        let err = TreeAssembler::new(19_999).assemble(&records, "n0").unwrap_err();
        assert_eq!(err, AssembleError::DepthExceeded { limit: 19_999 });
    }

    #[test]
    fn test_cycle_below_root_reported_at_reentry() {
        let records = vec![
            rec("A", "Alpha", None),
            rec("B", "Beta", Some("C")),
            rec("C", "Gamma", Some("B")),
        ];
        // Not reachable from A, so the walk never sees the loop.
        let tree = TreeAssembler::default().assemble(&records, "A").unwrap();
        assert_eq!(tree.ids(), vec!["A"]);

        let err = TreeAssembler::default().assemble(&records, "B").unwrap_err();
        assert_eq!(err, AssembleError::CycleDetected { id: "B".to_string() });
    }

    #[test]
    fn test_zero_depth_limit() {
        let err = TreeAssembler::new(0).assemble(&acme(), "A").unwrap_err();
        assert_eq!(err, AssembleError::DepthExceeded { limit: 0 });
    }

    #[test]
    fn test_duplicate_ids_last_wins_and_reported() {
        let records = vec![
            rec("A", "Acme", None),
            rec("B", "Old name", Some("A")),
            rec("B", "New name", Some("A")),
        ];
        let index = TreeIndex::build(&records);
        assert_eq!(index.duplicates(), &["B"]);

        let tree = index.assemble("A", DEFAULT_MAX_DEPTH).unwrap();
        assert_eq!(tree.children.len(), 1);
        assert_eq!(tree.children[0].name, "New name");
    }
}
