use anyhow::{anyhow, Result};

use super::ContentSource;
use crate::models::{Category, Point};

/// Content held in memory, keyed by category file name.
///
/// Categories whose file was never registered behave like a missing file.
#[derive(Debug, Clone, Default)]
pub struct MemoryContent {
    categories: Vec<Category>,
    files: Vec<(String, Vec<Point>)>,
}

impl MemoryContent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: Category, points: Vec<Point>) -> Self {
        self.files.push((category.file.clone(), points));
        self.categories.push(category);
        self
    }

    /// Register a category in the index without any content file behind it.
    pub fn with_missing_file(mut self, category: Category) -> Self {
        self.categories.push(category);
        self
    }
}

impl ContentSource for MemoryContent {
    fn categories(&self) -> Result<Vec<Category>> {
        Ok(self.categories.clone())
    }

    fn points(&self, category: &Category) -> Result<Vec<Point>> {
        self.files
            .iter()
            .find(|(file, _)| *file == category.file)
            .map(|(_, points)| points.clone())
            .ok_or_else(|| anyhow!("no content file {}", category.file))
    }
}
