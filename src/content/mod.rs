pub mod memory;
pub mod store;

pub use memory::MemoryContent;
pub use store::JsonContentStore;

use anyhow::Result;

use crate::models::{Category, Point};

/// Read-only access to categories and their points.
///
/// Implementations return points in their stored order. Failures are plain
/// `anyhow` errors; callers decide whether a failure is fatal.
pub trait ContentSource: Send + Sync {
    fn categories(&self) -> Result<Vec<Category>>;

    fn points(&self, category: &Category) -> Result<Vec<Point>>;
}
