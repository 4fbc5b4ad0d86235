use std::sync::Arc;

use crate::{
    content::ContentSource,
    error::TalkError,
    intent::parse_query,
    log_debug, log_info,
    models::Point,
    pool::{PoolAssembler, Resolution},
    sampler::{draw, RandomSource, ThreadRandom},
    session::SessionStore,
};

const ENABLE_LOGS: bool = true;

/// Serves one talk request end to end: parse, resolve, draw, decorate.
///
/// Cheap to clone; all state sits behind `Arc`s and the session store.
#[derive(Clone)]
pub struct TalkController {
    content: Arc<dyn ContentSource>,
    sessions: SessionStore,
    random: Arc<dyn RandomSource>,
}

impl TalkController {
    pub fn new(content: Arc<dyn ContentSource>) -> Self {
        Self::with_random(content, Arc::new(ThreadRandom))
    }

    pub fn with_random(content: Arc<dyn ContentSource>, random: Arc<dyn RandomSource>) -> Self {
        Self {
            content,
            sessions: SessionStore::new(),
            random,
        }
    }

    /// Replace the session store, e.g. with one that expires idle sessions.
    pub fn with_sessions(mut self, sessions: SessionStore) -> Self {
        self.sessions = sessions;
        self
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn handle(&self, session_id: &str, raw_query: &str) -> Result<Point, TalkError> {
        let intent = parse_query(raw_query);
        log_debug!(
            "Session {session_id}: {} request for {raw_query:?}",
            intent.kind()
        );

        let assembler = PoolAssembler::new(self.content.as_ref(), self.random.as_ref());
        let pool = match assembler.resolve(&intent)? {
            Resolution::Fixed(point) => return Ok(point),
            Resolution::Draw(pool) => pool,
        };

        let drawn = self
            .sessions
            .with_history(session_id, |seen| {
                draw(
                    &pool.points,
                    pool.default_category_id(),
                    seen,
                    self.random.as_ref(),
                )
            })
            .ok_or(TalkError::NoPointsFound)?;

        if drawn.reshuffled {
            log_info!(
                "Session {session_id}: all {} points shown, reshuffling this pool",
                pool.len()
            );
        }
        log_debug!("Session {session_id}: served {}", drawn.key);

        Ok(pool.finish(drawn.point))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::thread;

    use super::*;
    use crate::{
        content::MemoryContent,
        models::{Category, PointKey},
        sampler::SeededRandom,
    };

    fn controller() -> TalkController {
        let content = MemoryContent::new()
            .with_category(
                Category::new(5, "Tech", "tech.json"),
                vec![
                    Point::new(1, "AI", "Models", "Now"),
                    Point::new(2, "Web", "Browsers", "Then"),
                ],
            )
            .with_category(
                Category::new(7, "Life", "life.json"),
                (1..=10)
                    .map(|id| Point::new(id, format!("life {id}"), "s", "c"))
                    .collect(),
            );
        TalkController::with_random(Arc::new(content), Arc::new(SeededRandom::new(99)))
    }

    fn key(point: &Point) -> String {
        format!("{}-{}", point.category_id.unwrap(), point.id)
    }

    #[test]
    fn serves_decorated_points() {
        let talk = controller();
        let point = talk.handle("s1", "c=5").unwrap();
        assert_eq!(point.category.as_deref(), Some("Tech"));
        assert_eq!(point.category_id, Some(5));
    }

    #[test]
    fn two_point_deck_cycles() {
        let talk = controller();
        let first = key(&talk.handle("s1", "c=5").unwrap());
        let second = key(&talk.handle("s1", "c=5").unwrap());
        assert_ne!(first, second);

        let third = key(&talk.handle("s1", "c=5").unwrap());
        assert!(third == "5-1" || third == "5-2");
        assert_eq!(talk.sessions().snapshot("s1").unwrap().len(), 1);
    }

    #[test]
    fn history_is_shared_across_intents() {
        let talk = controller();
        let first = talk.handle("s1", "c=5").unwrap();
        // the multi-category pool sees the same key as already served
        let second = talk.handle("s1", "mc=yes&&c1=5").unwrap();
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn reshuffle_keeps_other_pools_history() {
        let talk = controller();
        talk.handle("s1", "c=7&&p=3&4").unwrap();
        for _ in 0..3 {
            talk.handle("s1", "c=5").unwrap();
        }

        let seen = talk.sessions().snapshot("s1").unwrap();
        assert_eq!(seen.keys().iter().filter(|k| k.category_id == 7).count(), 1);
        assert_eq!(seen.keys().iter().filter(|k| k.category_id == 5).count(), 1);
    }

    #[test]
    fn specific_point_does_not_touch_history() {
        let talk = controller();
        let point = talk.handle("s1", "c=7&&p=4").unwrap();
        assert_eq!(point.name, "life 4");
        assert!(talk.sessions().snapshot("s1").is_none());
    }

    #[test]
    fn errors_are_returned_as_values() {
        let talk = controller();
        assert_eq!(talk.handle("s1", "bogus").unwrap_err(), TalkError::InvalidRequest);
        assert_eq!(talk.handle("s1", "c=1").unwrap_err(), TalkError::CategoryNotFound);
        assert_eq!(
            talk.handle("s1", "search=zzzznotfound").unwrap_err(),
            TalkError::NoMatchingPoints
        );
    }

    #[test]
    fn sessions_do_not_share_history() {
        let talk = controller();
        talk.handle("a", "c=5").unwrap();
        talk.handle("a", "c=5").unwrap();
        // a fresh session still has a full deck
        let b = talk.handle("b", "c=5").unwrap();
        assert!(b.id == 1 || b.id == 2);
        assert_eq!(talk.sessions().snapshot("b").unwrap().len(), 1);
        assert_eq!(talk.sessions().session_count(), 2);
    }

    #[test]
    fn draws_refresh_an_expiring_session() {
        let ttl = std::time::Duration::from_secs(600);
        let talk = controller().with_sessions(SessionStore::with_idle_ttl(Some(ttl)));
        talk.handle("a", "c=5").unwrap();

        assert_eq!(talk.sessions().idle_ttl(), Some(ttl));
        assert_eq!(talk.sessions().evict_idle(), 0);
        assert_eq!(talk.sessions().snapshot("a").unwrap().len(), 1);
    }

    #[test]
    fn concurrent_requests_for_one_session_deal_whole_rounds() {
        let talk = controller();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let talk = talk.clone();
                thread::spawn(move || {
                    (0..5)
                        .map(|_| talk.handle("shared", "c=7").unwrap())
                        .map(|point| PointKey::new(7, point.id))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut counts: HashMap<PointKey, usize> = HashMap::new();
        for handle in handles {
            for key in handle.join().unwrap() {
                *counts.entry(key).or_default() += 1;
            }
        }

        // 40 serialized draws over 10 points: four full rounds
        assert_eq!(counts.len(), 10);
        assert!(counts.values().all(|&count| count == 4));
    }
}
