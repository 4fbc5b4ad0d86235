pub mod category;
pub mod point;

pub use category::Category;
pub use point::{Point, PointKey};
