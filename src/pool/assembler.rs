use super::{Pool, Resolution};
use crate::{
    content::ContentSource,
    error::TalkError,
    intent::SelectionIntent,
    log_warn,
    models::{Category, Point},
    sampler::RandomSource,
};

const ENABLE_LOGS: bool = true;
const KEYWORD_SEPARATOR: char = '|';

/// Resolves intents into pools using the content source.
///
/// A category whose content cannot be read contributes no points; it only
/// turns into an error when nothing else is left to draw from.
pub struct PoolAssembler<'a> {
    content: &'a dyn ContentSource,
    random: &'a dyn RandomSource,
}

impl<'a> PoolAssembler<'a> {
    pub fn new(content: &'a dyn ContentSource, random: &'a dyn RandomSource) -> Self {
        Self { content, random }
    }

    pub fn resolve(&self, intent: &SelectionIntent) -> Result<Resolution, TalkError> {
        match intent {
            SelectionIntent::RandomAny => self.random_any(),
            SelectionIntent::RandomCategory(category_id) => self.random_category(*category_id),
            SelectionIntent::RandomCategories(category_ids) => {
                let selections: Vec<(i64, &[i64])> =
                    category_ids.iter().map(|id| (*id, &[][..])).collect();
                self.across_categories(&selections)
            }
            SelectionIntent::SpecificPoint {
                category_id,
                point_id,
            } => self.specific_point(*category_id, *point_id),
            SelectionIntent::RandomFromPoints {
                category_id,
                point_ids,
            } => self.from_points(*category_id, point_ids),
            SelectionIntent::MultiCategoryWithPoints(selections) => {
                let selections: Vec<(i64, &[i64])> = selections
                    .iter()
                    .map(|(id, points)| (*id, points.as_slice()))
                    .collect();
                self.across_categories(&selections)
            }
            SelectionIntent::Search {
                keywords,
                category_ids,
            } => self.search(keywords, category_ids.as_deref()),
            SelectionIntent::Invalid => Err(TalkError::InvalidRequest),
        }
    }

    fn categories(&self) -> Vec<Category> {
        self.content.categories().unwrap_or_else(|err| {
            log_warn!("Failed to load category index: {err:#}");
            Vec::new()
        })
    }

    fn points(&self, category: &Category) -> Vec<Point> {
        self.content.points(category).unwrap_or_else(|err| {
            log_warn!("Failed to load points for category {}: {err:#}", category.id);
            Vec::new()
        })
    }

    fn random_any(&self) -> Result<Resolution, TalkError> {
        let categories = self.categories();
        if categories.is_empty() {
            return Err(TalkError::NoCategoriesFound);
        }

        let category = categories[self.random.pick(categories.len())].clone();
        let points = self.points(&category);
        if points.is_empty() {
            return Err(TalkError::NoPointsFound);
        }
        Ok(Resolution::Draw(Pool::single(category, points)))
    }

    fn random_category(&self, category_id: i64) -> Result<Resolution, TalkError> {
        let category = find(&self.categories(), category_id).ok_or(TalkError::CategoryNotFound)?;
        let points = self.points(&category);
        if points.is_empty() {
            return Err(TalkError::NoPointsInCategory);
        }
        Ok(Resolution::Draw(Pool::single(category, points)))
    }

    fn specific_point(&self, category_id: i64, point_id: i64) -> Result<Resolution, TalkError> {
        let category = find(&self.categories(), category_id).ok_or(TalkError::CategoryNotFound)?;
        self.points(&category)
            .into_iter()
            .find(|point| point.id == point_id)
            .map(|point| Resolution::Fixed(point.decorated(&category)))
            .ok_or(TalkError::PointNotFound)
    }

    fn from_points(&self, category_id: i64, point_ids: &[i64]) -> Result<Resolution, TalkError> {
        let category = find(&self.categories(), category_id).ok_or(TalkError::CategoryNotFound)?;
        let points: Vec<Point> = self
            .points(&category)
            .into_iter()
            .filter(|point| point_ids.contains(&point.id))
            .collect();
        if points.is_empty() {
            return Err(TalkError::NoMatchingPoints);
        }
        Ok(Resolution::Draw(Pool::single(category, points)))
    }

    /// Concatenate categories in the order given; an empty subset means all.
    fn across_categories(&self, selections: &[(i64, &[i64])]) -> Result<Resolution, TalkError> {
        let categories = self.categories();
        let mut pooled = Vec::new();

        for (category_id, subset) in selections {
            let Some(category) = find(&categories, *category_id) else {
                continue;
            };
            pooled.extend(
                self.points(&category)
                    .into_iter()
                    .filter(|point| subset.is_empty() || subset.contains(&point.id))
                    .map(|point| point.decorated(&category)),
            );
        }

        if pooled.is_empty() {
            return Err(TalkError::NoPointsFound);
        }
        Ok(Resolution::Draw(Pool::mixed(pooled)))
    }

    fn search(&self, keywords: &str, category_ids: Option<&[i64]>) -> Result<Resolution, TalkError> {
        let keywords = split_keywords(keywords);
        let categories = self.categories();
        let targets: Vec<i64> = match category_ids {
            Some(ids) => ids.to_vec(),
            None => categories.iter().map(|category| category.id).collect(),
        };

        let mut matches = Vec::new();
        if !keywords.is_empty() {
            for category_id in targets {
                let Some(category) = find(&categories, category_id) else {
                    continue;
                };
                matches.extend(
                    self.points(&category)
                        .into_iter()
                        .filter(|point| point.matches_any(&keywords))
                        .map(|point| point.decorated(&category)),
                );
            }
        }

        if matches.is_empty() {
            return Err(TalkError::NoMatchingPoints);
        }
        Ok(Resolution::Draw(Pool::mixed(matches)))
    }
}

fn find(categories: &[Category], id: i64) -> Option<Category> {
    categories.iter().find(|category| category.id == id).cloned()
}

/// Lower-cased, trimmed keywords. Blanks are dropped, so an empty keyword
/// never matches every point: `search=` finds nothing and `search=ai|`
/// searches for `ai` alone.
fn split_keywords(raw: &str) -> Vec<String> {
    raw.split(KEYWORD_SEPARATOR)
        .map(|keyword| keyword.trim().to_lowercase())
        .filter(|keyword| !keyword.is_empty())
        .collect()
}
