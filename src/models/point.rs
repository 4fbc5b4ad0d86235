use std::fmt;

use serde::{Deserialize, Serialize};

use super::Category;

/// A conversation starter as stored in a category's content file.
///
/// `category` and `category_id` are absent in most content files; they are
/// filled in when the point is decorated with the category it was served from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Point {
    pub id: i64,
    pub name: String,
    #[serde(rename = "the-point")]
    pub summary: String,
    pub context: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
}

impl Point {
    pub fn new(
        id: i64,
        name: impl Into<String>,
        summary: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            summary: summary.into(),
            context: context.into(),
            category: None,
            category_id: None,
        }
    }

    /// Tag the point with the category it is being served from, overwriting
    /// any tag the content file carried.
    pub fn decorated(mut self, category: &Category) -> Self {
        self.category = Some(category.name.clone());
        self.category_id = Some(category.id);
        self
    }

    /// History key for this point. A pre-tagged `category_id` wins over the
    /// pool's default category.
    pub fn key(&self, default_category_id: Option<i64>) -> PointKey {
        let category_id = self.category_id.or(default_category_id).unwrap_or(0);
        PointKey::new(category_id, self.id)
    }

    /// Case-insensitive substring match against name, summary and context.
    /// `keywords` must already be lower-cased.
    pub fn matches_any(&self, keywords: &[String]) -> bool {
        let fields = [
            self.name.to_lowercase(),
            self.summary.to_lowercase(),
            self.context.to_lowercase(),
        ];
        keywords
            .iter()
            .any(|keyword| fields.iter().any(|field| field.contains(keyword.as_str())))
    }
}

/// Corpus-wide identity of a point: `categoryId-pointId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PointKey {
    pub category_id: i64,
    pub point_id: i64,
}

impl PointKey {
    pub fn new(category_id: i64, point_id: i64) -> Self {
        Self {
            category_id,
            point_id,
        }
    }
}

impl fmt::Display for PointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.category_id, self.point_id)
    }
}
