pub mod assembler;

pub use assembler::PoolAssembler;

use crate::models::{Category, Point};

/// Ordered candidates for one draw.
///
/// Single-category pools keep points as stored and carry their category as
/// the default for keys and decoration. Cross-category pools hold points that
/// are already decorated and have no default.
#[derive(Debug, Clone)]
pub struct Pool {
    pub points: Vec<Point>,
    pub default_category: Option<Category>,
}

impl Pool {
    pub fn single(category: Category, points: Vec<Point>) -> Self {
        Self {
            points,
            default_category: Some(category),
        }
    }

    pub fn mixed(points: Vec<Point>) -> Self {
        Self {
            points,
            default_category: None,
        }
    }

    pub fn default_category_id(&self) -> Option<i64> {
        self.default_category.as_ref().map(|category| category.id)
    }

    /// Decorate a point drawn from this pool for the response.
    pub fn finish(&self, point: Point) -> Point {
        match &self.default_category {
            Some(category) => point.decorated(category),
            None => point,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// What an intent resolves to.
#[derive(Debug, Clone)]
pub enum Resolution {
    /// Draw from the pool against the session's history.
    Draw(Pool),
    /// Serve this exact point; history is left alone.
    Fixed(Point),
}
