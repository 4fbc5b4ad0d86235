//! Parser for the compact query dialect served on the talk endpoint.
//!
//! Fields are separated by `&&`; list values inside a field by `&`:
//!
//! ```text
//! talk
//! c=3            c=1&2&3          c=3&&p=7        c=3&&p=1&4&9
//! mc=yes&&c1=5&&c2=7&2&3
//! search=ai%7Cml&&mc=yes&&c1=3&&c2=4
//! ```
//!
//! Generic `key=value&key=value` decoding would tear `c=1&2&3` apart, so the
//! split happens here. An inner element that carries its own `=` still starts a
//! new field, which keeps `c=3&p=7` working as well.

use std::borrow::Cow;

use super::SelectionIntent;

const FIELD_SEPARATOR: &str = "&&";
const VALUE_SEPARATOR: char = '&';
const KEYWORD_FIELD: &str = "search";

#[derive(Debug)]
struct Field<'a> {
    key: &'a str,
    values: Vec<&'a str>,
}

impl<'a> Field<'a> {
    fn new(key: &'a str, value: &'a str) -> Self {
        let mut field = Self {
            key,
            values: Vec::new(),
        };
        field.push(value);
        field
    }

    fn push(&mut self, value: &'a str) {
        if !value.is_empty() {
            self.values.push(value);
        }
    }

    fn first(&self) -> Option<&'a str> {
        self.values.first().copied()
    }

    fn ids(&self) -> Vec<i64> {
        self.values.iter().map(|value| coerce_id(value)).collect()
    }
}

struct Query<'a> {
    fields: Vec<Field<'a>>,
}

impl<'a> Query<'a> {
    fn parse(raw: &'a str) -> Self {
        let raw = raw.strip_prefix('?').unwrap_or(raw);
        let mut fields = Vec::new();

        for segment in raw.split(FIELD_SEPARATOR).filter(|s| !s.is_empty()) {
            let mut current: Option<Field<'a>> = None;
            for element in segment.split(VALUE_SEPARATOR) {
                if let Some((key, value)) = element.split_once('=') {
                    fields.extend(current.replace(Field::new(key, value)));
                } else if let Some(field) = current.as_mut() {
                    field.push(element);
                } else if !element.is_empty() {
                    // bare flag such as `talk`
                    fields.push(Field {
                        key: element,
                        values: Vec::new(),
                    });
                }
            }
            fields.extend(current);
        }

        Self { fields }
    }

    fn field(&self, key: &str) -> Option<&Field<'a>> {
        self.fields.iter().find(|field| field.key == key)
    }

    fn has(&self, key: &str) -> bool {
        self.field(key).is_some()
    }

    fn is_multi_category(&self) -> bool {
        self.field("mc").and_then(Field::first) == Some("yes")
    }

    /// Fields named `c<digits>` in query order.
    fn numbered_categories(&self) -> impl Iterator<Item = &Field<'a>> {
        self.fields.iter().filter(|field| {
            field
                .key
                .strip_prefix('c')
                .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
        })
    }
}

/// Turn a raw, undecoded query string into exactly one intent.
///
/// Never fails: shapes that match no rule become [`SelectionIntent::Invalid`].
pub fn parse_query(raw: &str) -> SelectionIntent {
    let query = Query::parse(raw);

    if query.has("talk") {
        return SelectionIntent::RandomAny;
    }
    if let Some(search) = query.field(KEYWORD_FIELD) {
        return parse_search(&query, search);
    }
    if query.is_multi_category() {
        return parse_multi_category(&query);
    }
    if let Some(category) = query.field("c") {
        return parse_category(&query, category);
    }

    SelectionIntent::Invalid
}

fn parse_search(query: &Query<'_>, search: &Field<'_>) -> SelectionIntent {
    let keywords = search.first().map(decode_keywords).unwrap_or_default();

    let category_ids = if query.is_multi_category() {
        // c1, c2, ... up to the first gap
        let ids: Vec<i64> = (1..)
            .map_while(|n| query.field(&format!("c{n}")))
            .map(|field| field.first().map(coerce_id).unwrap_or(0))
            .collect();
        (!ids.is_empty()).then_some(ids)
    } else {
        query
            .field("c")
            .map(|field| vec![field.first().map(coerce_id).unwrap_or(0)])
    };

    SelectionIntent::Search {
        keywords,
        category_ids,
    }
}

fn parse_multi_category(query: &Query<'_>) -> SelectionIntent {
    let mut selections: Vec<(i64, Vec<i64>)> = Vec::new();

    for field in query.numbered_categories() {
        let Some((category, points)) = field.values.split_first() else {
            continue;
        };
        let category_id = coerce_id(category);
        let point_ids: Vec<i64> = points.iter().map(|p| coerce_id(p)).collect();

        match selections.iter_mut().find(|(id, _)| *id == category_id) {
            Some(existing) => existing.1 = point_ids,
            None => selections.push((category_id, point_ids)),
        }
    }

    SelectionIntent::MultiCategoryWithPoints(selections)
}

fn parse_category(query: &Query<'_>, category: &Field<'_>) -> SelectionIntent {
    let Some(first) = category.first() else {
        return SelectionIntent::Invalid;
    };
    let category_id = coerce_id(first);

    if let Some(points) = query.field("p") {
        return match points.values.len() {
            0 => SelectionIntent::Invalid,
            1 => SelectionIntent::SpecificPoint {
                category_id,
                point_id: coerce_id(points.values[0]),
            },
            _ => SelectionIntent::RandomFromPoints {
                category_id,
                point_ids: points.ids(),
            },
        };
    }

    if category.values.len() > 1 {
        SelectionIntent::RandomCategories(category.ids())
    } else {
        SelectionIntent::RandomCategory(category_id)
    }
}

/// Leading-integer coercion: `"12abc"` is 12, `"abc"` is 0.
pub fn coerce_id(raw: &str) -> i64 {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let value = digits[..end].parse::<i64>().unwrap_or(0);
    if negative {
        -value
    } else {
        value
    }
}

fn decode_keywords(raw: &str) -> String {
    let spaced: Cow<'_, str> = if raw.contains('+') {
        Cow::Owned(raw.replace('+', " "))
    } else {
        Cow::Borrowed(raw)
    };
    let bytes = urlencoding::decode_binary(spaced.as_bytes());
    String::from_utf8_lossy(&bytes).into_owned()
}
