pub mod parser;

pub use parser::parse_query;

/// What a client asked for, independent of how the query string spelled it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionIntent {
    RandomAny,
    RandomCategory(i64),
    RandomCategories(Vec<i64>),
    SpecificPoint {
        category_id: i64,
        point_id: i64,
    },
    RandomFromPoints {
        category_id: i64,
        point_ids: Vec<i64>,
    },
    /// Ordered by first appearance in the query. An empty point list means
    /// every point of that category.
    MultiCategoryWithPoints(Vec<(i64, Vec<i64>)>),
    Search {
        /// Raw `|`-separated keyword text, already percent-decoded.
        keywords: String,
        /// `None` searches every category.
        category_ids: Option<Vec<i64>>,
    },
    Invalid,
}

impl SelectionIntent {
    /// Short label used in request logs.
    pub fn kind(&self) -> &'static str {
        match self {
            SelectionIntent::RandomAny => "random-any",
            SelectionIntent::RandomCategory(_) => "random-category",
            SelectionIntent::RandomCategories(_) => "random-categories",
            SelectionIntent::SpecificPoint { .. } => "specific-point",
            SelectionIntent::RandomFromPoints { .. } => "random-from-points",
            SelectionIntent::MultiCategoryWithPoints(_) => "multi-category",
            SelectionIntent::Search { .. } => "search",
            SelectionIntent::Invalid => "invalid",
        }
    }
}
