use std::collections::HashSet;

use crate::models::PointKey;

/// Keys a session has already been served, in draw order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeenSet {
    order: Vec<PointKey>,
    index: HashSet<PointKey>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &PointKey) -> bool {
        self.index.contains(key)
    }

    /// Append `key`. Returns false if it was already present.
    pub fn record(&mut self, key: PointKey) -> bool {
        if !self.index.insert(key) {
            return false;
        }
        self.order.push(key);
        true
    }

    /// Drop every key in `keys`, keeping the order of the rest.
    /// Returns how many were removed.
    pub fn forget(&mut self, keys: &HashSet<PointKey>) -> usize {
        let before = self.order.len();
        self.order.retain(|key| !keys.contains(key));
        self.index.retain(|key| !keys.contains(key));
        before - self.order.len()
    }

    pub fn keys(&self) -> &[PointKey] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
