use serde::{Serialize, Serializer};
use thiserror::Error;

/// Every way a talk request can end without a point.
///
/// The display strings are part of the wire contract: clients match on them.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum TalkError {
    #[error("No categories found")]
    NoCategoriesFound,
    #[error("No points found")]
    NoPointsFound,
    #[error("Category not found")]
    CategoryNotFound,
    #[error("No points found in category")]
    NoPointsInCategory,
    #[error("No matching points found")]
    NoMatchingPoints,
    #[error("Point not found")]
    PointNotFound,
    #[error("Invalid request")]
    InvalidRequest,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl Serialize for TalkError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        ErrorBody {
            error: self.to_string(),
        }
        .serialize(serializer)
    }
}
