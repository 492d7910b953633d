pub mod hierarchy_service;
pub mod tree_assembler;

pub use hierarchy_service::HierarchyService;
pub use tree_assembler::{TreeAssembler, TreeIndex};
