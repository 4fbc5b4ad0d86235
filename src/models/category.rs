use serde::{Deserialize, Serialize};

/// One entry of `cat.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: i64,
    pub name: String,
    /// Content file name, relative to the data directory.
    pub file: String,
}

impl Category {
    pub fn new(id: i64, name: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            file: file.into(),
        }
    }
}
