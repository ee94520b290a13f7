//! # List Query Pipeline
//!
//! Pure filter -> sort over an in-memory collection. Works on anything
//! [`Listable`], so fetched rows and fixtures go through the same path.
//! Returns borrowed views in display order; the input slice is never touched.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{leading_integer, Food, Recipe};

/// Fields the pipeline reads from a record.
pub trait Listable {
    fn title(&self) -> &str;
    fn category(&self) -> &str;
    fn rating(&self) -> Option<f64> {
        None
    }
    fn duration_minutes(&self) -> Option<u32> {
        None
    }
}

impl Listable for Recipe {
    fn title(&self) -> &str {
        &self.title
    }
    fn category(&self) -> &str {
        &self.category
    }
    fn rating(&self) -> Option<f64> {
        self.rating
    }
    fn duration_minutes(&self) -> Option<u32> {
        leading_integer(&self.duration)
    }
}

impl Listable for Food {
    fn title(&self) -> &str {
        &self.name
    }
    fn category(&self) -> &str {
        &self.category
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Popular,
    /// Keeps retrieval order, which is newest-created first.
    Recent,
    /// Shortest duration first.
    Quick,
    Rating,
}

impl FromStr for SortKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "popular" => Ok(SortKey::Popular),
            "recent" => Ok(SortKey::Recent),
            "quick" => Ok(SortKey::Quick),
            "rating" => Ok(SortKey::Rating),
            other => Err(AppError::Validation(format!("unknown sort key '{other}'"))),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SortKey::Popular => "popular",
            SortKey::Recent => "recent",
            SortKey::Quick => "quick",
            SortKey::Rating => "rating",
        };
        f.write_str(s)
    }
}

/// Category selector; `All` disables category filtering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    pub fn matches(&self, category: &str) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(wanted) => wanted == category,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            Ok(CategoryFilter::All)
        } else {
            Ok(CategoryFilter::Only(s.to_string()))
        }
    }
}

impl From<&str> for CategoryFilter {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(filter) => filter,
            Err(never) => match never {},
        }
    }
}

/// User-supplied query state for a list screen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub search_text: String,
    pub category: CategoryFilter,
    pub sort: SortKey,
}

impl ListQuery {
    pub fn new(
        search_text: impl Into<String>,
        category: impl Into<CategoryFilter>,
        sort: SortKey,
    ) -> Self {
        Self {
            search_text: search_text.into(),
            category: category.into(),
            sort,
        }
    }
}

/// Filters by category AND case-insensitive title substring, then applies a
/// stable sort for `query.sort`.
pub fn select<'a, R: Listable>(records: &'a [R], query: &ListQuery) -> Vec<&'a R> {
    let needle = query.search_text.to_lowercase();
    let mut selected: Vec<&R> = records
        .iter()
        .filter(|r| query.category.matches(r.category()))
        .filter(|r| needle.is_empty() || r.title().to_lowercase().contains(&needle))
        .collect();

    // `sort_by` is stable: equal keys keep their filtered order.
    match query.sort {
        SortKey::Popular | SortKey::Rating => {
            selected.sort_by(|a, b| rating_descending(a.rating(), b.rating()))
        }
        SortKey::Recent => {}
        SortKey::Quick => {
            selected.sort_by(|a, b| minutes_ascending(a.duration_minutes(), b.duration_minutes()))
        }
    }
    selected
}

// Missing and NaN ratings go last.
fn rating_descending(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a.filter(|v| !v.is_nan()), b.filter(|v| !v.is_nan())) {
        (Some(a), Some(b)) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

// Unparseable durations count as +infinity.
fn minutes_ascending(a: Option<u32>, b: Option<u32>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe(
        id: &str,
        title: &str,
        category: &str,
        rating: Option<f64>,
        duration: &str,
    ) -> Recipe {
        Recipe {
            id: id.to_string(),
            title: title.to_string(),
            image_url: String::new(),
            duration: duration.to_string(),
            difficulty: None,
            rating,
            category: category.to_string(),
            is_favorited: false,
            created_at: None,
            updated_at: None,
        }
    }

    fn ids(selected: &[&Recipe]) -> Vec<String> {
        selected.iter().map(|r| r.id.clone()).collect()
    }

    #[test]
    fn search_and_category_are_conjunctive() {
        let records = vec![
            recipe("1", "Beef Burger", "Main Course", Some(4.0), "20 mins"),
            recipe("2", "Veggie Burger", "Snacks", Some(4.0), "20 mins"),
        ];
        let query = ListQuery::new("burger", "Main Course", SortKey::Recent);
        assert_eq!(ids(&select(&records, &query)), vec!["1"]);

        let only_search = ListQuery::new("BURGER", "All", SortKey::Recent);
        assert_eq!(ids(&select(&records, &only_search)), vec!["1", "2"]);

        let no_match = ListQuery::new("pizza", "All", SortKey::Recent);
        assert!(select(&records, &no_match).is_empty());
    }

    #[test]
    fn empty_search_matches_everything() {
        let records = vec![
            recipe("1", "Soup", "Soups", None, ""),
            recipe("2", "Salad", "Salads", None, ""),
        ];
        assert_eq!(select(&records, &ListQuery::default()).len(), 2);
    }

    #[test]
    fn rating_sort_is_descending_and_stable() {
        let records = vec![
            recipe("1", "a", "x", Some(4.5), ""),
            recipe("2", "b", "x", Some(4.5), ""),
            recipe("3", "c", "x", Some(4.9), ""),
        ];
        for sort in [SortKey::Rating, SortKey::Popular] {
            let query = ListQuery::new("", "All", sort);
            assert_eq!(ids(&select(&records, &query)), vec!["3", "1", "2"]);
        }
    }

    #[test]
    fn missing_ratings_sort_last() {
        let records = vec![
            recipe("1", "a", "x", None, ""),
            recipe("2", "b", "x", Some(3.0), ""),
            recipe("3", "c", "x", Some(f64::NAN), ""),
            recipe("4", "d", "x", Some(4.0), ""),
        ];
        let query = ListQuery::new("", "All", SortKey::Rating);
        assert_eq!(ids(&select(&records, &query)), vec!["4", "2", "1", "3"]);
    }

    #[test]
    fn quick_sort_is_numeric_not_lexicographic() {
        let records = vec![
            recipe("1", "a", "x", None, "100 mins"),
            recipe("2", "b", "x", None, "25 mins"),
            recipe("3", "c", "x", None, "10 mins"),
        ];
        let query = ListQuery::new("", "All", SortKey::Quick);
        let durations: Vec<&str> = select(&records, &query)
            .iter()
            .map(|r| r.duration.as_str())
            .collect();
        assert_eq!(durations, vec!["10 mins", "25 mins", "100 mins"]);
    }

    #[test]
    fn quick_sort_puts_unparseable_durations_last() {
        let records = vec![
            recipe("1", "a", "x", None, "a while"),
            recipe("2", "b", "x", None, "45 mins"),
            recipe("3", "c", "x", None, ""),
            recipe("4", "d", "x", None, "5 mins"),
        ];
        let query = ListQuery::new("", "All", SortKey::Quick);
        assert_eq!(ids(&select(&records, &query)), vec!["4", "2", "1", "3"]);
    }

    #[test]
    fn recent_passes_filtered_order_through() {
        let records = vec![
            recipe("3", "c", "x", Some(1.0), "90 mins"),
            recipe("1", "a", "x", Some(5.0), "5 mins"),
            recipe("2", "b", "x", Some(3.0), "30 mins"),
        ];
        let query = ListQuery::new("", "All", SortKey::Recent);
        assert_eq!(ids(&select(&records, &query)), vec!["3", "1", "2"]);
    }

    #[test]
    fn select_leaves_input_untouched() {
        let records = vec![
            recipe("1", "Pasta", "Main Course", Some(4.1), "30 mins"),
            recipe("2", "Pizza", "Main Course", Some(4.9), "45 mins"),
            recipe("3", "Cake", "Desserts", Some(4.7), "40 mins"),
        ];
        let before = records.clone();
        for sort in [SortKey::Popular, SortKey::Recent, SortKey::Quick, SortKey::Rating] {
            let _ = select(&records, &ListQuery::new("p", "Main Course", sort));
        }
        assert_eq!(records, before);
    }

    #[test]
    fn foods_are_listable_by_name() {
        let foods = vec![Food {
            id: "f1".into(),
            name: "Avocado".into(),
            category: "Produce".into(),
            image_url: String::new(),
            calories: Some(160.0),
            created_at: None,
            updated_at: None,
        }];
        let query = ListQuery::new("avo", "Produce", SortKey::Quick);
        assert_eq!(select(&foods, &query).len(), 1);
    }

    #[test]
    fn parse_query_parts() {
        assert_eq!("Rating".parse::<SortKey>().unwrap(), SortKey::Rating);
        assert!("newest".parse::<SortKey>().is_err());
        assert_eq!(CategoryFilter::from("All"), CategoryFilter::All);
        assert_eq!(CategoryFilter::from(""), CategoryFilter::All);
        assert_eq!(
            CategoryFilter::from("Desserts"),
            CategoryFilter::Only("Desserts".into())
        );
    }
}
