//! "Deck of cards" draw: never repeat a point for a session until every point
//! of the current pool has been served once.

use std::collections::HashSet;

use super::RandomSource;
use crate::models::{Point, PointKey};
use crate::session::SeenSet;

#[derive(Debug, Clone)]
pub struct Draw {
    pub point: Point,
    pub key: PointKey,
    /// The pool was exhausted and its keys were cleared from history first.
    pub reshuffled: bool,
}

/// Draw one point from `pool`, preferring points whose key is not in `seen`.
///
/// When every key of the pool is already in `seen`, only this pool's keys are
/// forgotten (keys from other pools stay) and the whole pool is eligible again.
/// The chosen key is appended to `seen`. Returns `None` only for an empty pool.
pub fn draw(
    pool: &[Point],
    default_category_id: Option<i64>,
    seen: &mut SeenSet,
    random: &dyn RandomSource,
) -> Option<Draw> {
    if pool.is_empty() {
        return None;
    }

    let keys: Vec<PointKey> = pool
        .iter()
        .map(|point| point.key(default_category_id))
        .collect();

    let fresh: Vec<usize> = keys
        .iter()
        .enumerate()
        .filter(|(_, key)| !seen.contains(key))
        .map(|(index, _)| index)
        .collect();

    let (candidates, reshuffled) = if fresh.is_empty() {
        let pool_keys: HashSet<PointKey> = keys.iter().copied().collect();
        seen.forget(&pool_keys);
        ((0..pool.len()).collect::<Vec<_>>(), true)
    } else {
        (fresh, false)
    };

    let chosen = candidates[random.pick(candidates.len())];
    let key = keys[chosen];
    seen.record(key);

    Some(Draw {
        point: pool[chosen].clone(),
        key,
        reshuffled,
    })
}
