pub mod deck;
pub mod random;

pub use deck::{draw, Draw};
pub use random::{RandomSource, SeededRandom, ThreadRandom};
