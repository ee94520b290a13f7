//! # Domain Models
//!
//! Records stored in the remote collections, plus the draft (create) and
//! patch (partial update) payloads that travel the other way.
//! Field names on the wire are camelCase; server timestamps keep the
//! store's snake_case column names.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{AppError, Result};

/// A row type living in a named remote collection.
///
/// Adding a collection means implementing this for a new struct; the gateway
/// code is shared.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Remote collection (table) name.
    const COLLECTION: &'static str;
    /// Create payload, without server-assigned fields.
    type Draft: Serialize + Validate + Send + Sync + 'static;
    /// Partial update payload; absent fields are left untouched remotely.
    type Patch: Serialize + Validate + Send + Sync + 'static;

    fn id(&self) -> &str;
}

/// Client-side schema check run before any write is sent.
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl FromStr for Difficulty {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(AppError::Validation(format!("unknown difficulty '{other}'"))),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        };
        f.write_str(s)
    }
}

/// A recipe row from the `recipes` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RecipeRow")]
pub struct Recipe {
    pub id: String,
    pub title: String,
    pub image_url: String,
    /// Free text such as "30 mins"; see [`Recipe::duration_minutes`].
    pub duration: String,
    pub difficulty: Option<Difficulty>,
    pub rating: Option<f64>,
    pub category: String,
    /// Client-local flag, filled from the saved-recipes list. Never sent.
    #[serde(skip)]
    pub is_favorited: bool,
    #[serde(rename = "created_at", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updated_at", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Recipe as it arrives on the wire. Older rows carry `image` and a numeric
/// `cookTime`, sometimes next to `imageUrl` and `duration`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecipeRow {
    id: String,
    title: String,
    #[serde(default, deserialize_with = "lenient_text")]
    image_url: String,
    #[serde(default, deserialize_with = "lenient_text")]
    image: String,
    #[serde(default, deserialize_with = "lenient_text")]
    duration: String,
    #[serde(default, deserialize_with = "lenient_text")]
    cook_time: String,
    #[serde(default, deserialize_with = "lenient_parse")]
    difficulty: Option<Difficulty>,
    #[serde(default, deserialize_with = "lenient_number")]
    rating: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    category: String,
    #[serde(default, rename = "created_at")]
    created_at: Option<DateTime<Utc>>,
    #[serde(default, rename = "updated_at")]
    updated_at: Option<DateTime<Utc>>,
}

impl From<RecipeRow> for Recipe {
    fn from(row: RecipeRow) -> Self {
        Recipe {
            id: row.id,
            title: row.title,
            image_url: first_non_empty(row.image_url, row.image),
            duration: first_non_empty(row.duration, row.cook_time),
            difficulty: row.difficulty,
            rating: row.rating,
            category: row.category,
            is_favorited: false,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl Recipe {
    /// Numeric minutes parsed from the leading integer of `duration`.
    pub fn duration_minutes(&self) -> Option<u32> {
        leading_integer(&self.duration)
    }
}

impl Record for Recipe {
    const COLLECTION: &'static str = "recipes";
    type Draft = RecipeDraft;
    type Patch = RecipePatch;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDraft {
    pub title: String,
    pub image_url: String,
    pub duration: String,
    pub difficulty: Difficulty,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    pub category: String,
}

impl Validate for RecipeDraft {
    fn validate(&self) -> Result<()> {
        require_non_empty("title", &self.title)?;
        check_image_url(&self.image_url)?;
        check_rating(self.rating)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Validate for RecipePatch {
    fn validate(&self) -> Result<()> {
        if let Some(title) = &self.title {
            require_non_empty("title", title)?;
        }
        if let Some(url) = &self.image_url {
            check_image_url(url)?;
        }
        check_rating(self.rating)
    }
}

/// A row from the `foods` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "FoodRow")]
pub struct Food {
    pub id: String,
    pub name: String,
    pub category: String,
    pub image_url: String,
    pub calories: Option<f64>,
    #[serde(rename = "created_at", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updated_at", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FoodRow {
    id: String,
    name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    category: String,
    #[serde(default, deserialize_with = "lenient_text")]
    image_url: String,
    #[serde(default, deserialize_with = "lenient_text")]
    image: String,
    #[serde(default, deserialize_with = "lenient_number")]
    calories: Option<f64>,
    #[serde(default, rename = "created_at")]
    created_at: Option<DateTime<Utc>>,
    #[serde(default, rename = "updated_at")]
    updated_at: Option<DateTime<Utc>>,
}

impl From<FoodRow> for Food {
    fn from(row: FoodRow) -> Self {
        Food {
            id: row.id,
            name: row.name,
            category: row.category,
            image_url: first_non_empty(row.image_url, row.image),
            calories: row.calories,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl Record for Food {
    const COLLECTION: &'static str = "foods";
    type Draft = FoodDraft;
    type Patch = FoodPatch;

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodDraft {
    pub name: String,
    pub category: String,
    pub image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
}

impl Validate for FoodDraft {
    fn validate(&self) -> Result<()> {
        require_non_empty("name", &self.name)?;
        check_image_url(&self.image_url)?;
        check_calories(self.calories)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories: Option<f64>,
}

impl Validate for FoodPatch {
    fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            require_non_empty("name", name)?;
        }
        if let Some(url) = &self.image_url {
            check_image_url(url)?;
        }
        check_calories(self.calories)
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

// Empty means "no image"; anything else has to be fetchable.
fn check_image_url(url: &str) -> Result<()> {
    if url.is_empty() || url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(AppError::Validation(format!("image url '{url}' is not http(s)")))
    }
}

fn check_rating(rating: Option<f64>) -> Result<()> {
    match rating {
        Some(r) if !r.is_finite() || !(0.0..=5.0).contains(&r) => Err(AppError::Validation(
            format!("rating {r} is outside 0.0..=5.0"),
        )),
        _ => Ok(()),
    }
}

fn check_calories(calories: Option<f64>) -> Result<()> {
    match calories {
        Some(c) if !c.is_finite() || c < 0.0 => {
            Err(AppError::Validation(format!("calories {c} must be non-negative")))
        }
        _ => Ok(()),
    }
}

fn first_non_empty(preferred: String, fallback: String) -> String {
    if preferred.trim().is_empty() {
        fallback
    } else {
        preferred
    }
}

/// Leading run of ASCII digits, e.g. "30 mins" -> 30, "1h30" -> 1.
pub(crate) fn leading_integer(s: &str) -> Option<u32> {
    let trimmed = s.trim_start();
    let end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    trimmed[..end].parse().ok()
}

/// Accepts numbers and numeric strings; anything else becomes `None` instead
/// of failing the whole row.
fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let number = match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(number.filter(|n| n.is_finite()))
}

fn lenient_parse<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => s.parse().ok(),
        _ => None,
    })
}

/// Text column; null becomes empty and a bare number (such as `cookTime`
/// minutes) is kept as its decimal form so the leading-integer parse applies.
fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}
