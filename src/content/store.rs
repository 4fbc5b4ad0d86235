use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use super::ContentSource;
use crate::models::{Category, Point};

pub const CATEGORY_INDEX_FILE: &str = "cat.json";

/// Content read straight from a data directory on every call:
/// `cat.json` plus one JSON array per category.
#[derive(Debug, Clone)]
pub struct JsonContentStore {
    data_dir: PathBuf,
}

impl JsonContentStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn read_array<T: DeserializeOwned>(&self, file: &str) -> Result<Vec<T>> {
        let path = self.data_dir.join(file);
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read content from {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse content in {}", path.display()))
    }
}

impl ContentSource for JsonContentStore {
    fn categories(&self) -> Result<Vec<Category>> {
        // A deployment without an index simply has no categories.
        if !self.data_dir.join(CATEGORY_INDEX_FILE).exists() {
            return Ok(Vec::new());
        }
        self.read_array(CATEGORY_INDEX_FILE)
    }

    fn points(&self, category: &Category) -> Result<Vec<Point>> {
        self.read_array(&category.file)
    }
}
