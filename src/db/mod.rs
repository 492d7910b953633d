pub mod memory;
pub mod pool;
pub mod subtree;

pub use memory::{MemorySubtreeSource, OrganizationRow};
pub use pool::create_pool;
pub use subtree::{subtree_query, PgSubtreeRetriever, RetrieverConfig, SubtreeSource};
