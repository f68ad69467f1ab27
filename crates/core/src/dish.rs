//! Dish projection and normalization from backend record shapes.
//!
//! The backend is inconsistent about field names (`name` vs `label` vs
//! `title`, `image_url` vs `image`, `difficulty` vs `level`, ...) and
//! about value types (cooking time as a number, a digit string, an
//! ISO-8601 duration or a clock string). [`DishRecord`] accepts every
//! shape seen in the wild and [`DishRecord::into_dish`] projects it to
//! the single [`Dish`] the screens render.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

use crate::types::DishId;

/// Unit appended to every normalized duration string.
pub const DURATION_UNIT: &str = "phút";

static ISO_MINUTES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^PT(\d+)M$").expect("valid regex"));

static CLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2}):(\d{2})").expect("valid regex"));

// ---------------------------------------------------------------------------
// Difficulty
// ---------------------------------------------------------------------------

/// Fixed difficulty scale of a dish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Map a stored difficulty value to the scale.
    ///
    /// Accepts the English names, the Vietnamese labels (with or without
    /// diacritics) and the numeric levels `1..=3`. Anything unrecognized
    /// is `Easy`; difficulty is never inferred from cooking time.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "easy" | "dễ" | "de" | "1" => Difficulty::Easy,
            "medium" | "trung bình" | "trungbinh" | "trung binh" | "tb" | "2" => {
                Difficulty::Medium
            }
            "hard" | "khó" | "kho" | "3" => Difficulty::Hard,
            _ => Difficulty::Easy,
        }
    }

    /// Localized label shown next to the dish.
    pub fn display_label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Dễ",
            Difficulty::Medium => "Trung bình",
            Difficulty::Hard => "Khó",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Dish
// ---------------------------------------------------------------------------

/// A dish as rendered by a list screen.
///
/// `is_favorite` is the only field the local override store ever
/// rewrites; everything else comes straight from the backend record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dish {
    pub id: DishId,
    pub label: String,
    pub image: String,
    /// Human-readable duration, e.g. `"15 phút"`.
    pub duration: String,
    pub difficulty: Difficulty,
    /// Average rating, one decimal.
    pub rating: f64,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
    pub is_favorite: bool,
}

// ---------------------------------------------------------------------------
// DishRecord
// ---------------------------------------------------------------------------

/// Union of every dish shape returned by the backend.
///
/// All fields are optional; precedence between aliases is resolved in
/// [`DishRecord::into_dish`], not by serde. Numeric and boolean fields
/// also accept their string spellings (`"4.5"`, `"true"`); values of any
/// other type read as absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DishRecord {
    pub id: Option<DishId>,
    /// Recommendation payloads carry the id here instead.
    pub dish_id: Option<DishId>,

    pub label: Option<String>,
    pub title: Option<String>,
    pub name: Option<String>,

    pub image: Option<String>,
    pub image_url: Option<String>,
    pub image_b64: Option<String>,
    pub image_mime: Option<String>,

    /// `15`, `"15"`, `"PT15M"`, `"00:15:00"` or an already formatted string.
    pub time: Option<serde_json::Value>,
    #[serde(deserialize_with = "lenient_f64")]
    pub cooking_time: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub prep_time_min: Option<f64>,

    pub ingredients: Option<Vec<String>>,
    pub steps: Option<Vec<String>>,
    pub instructions: Option<Vec<String>>,

    #[serde(deserialize_with = "lenient_f64")]
    pub star: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub rating: Option<f64>,
    #[serde(deserialize_with = "lenient_f64")]
    pub average_rating: Option<f64>,

    #[serde(rename = "isFavorite", deserialize_with = "lenient_bool")]
    pub is_favorite_camel: Option<bool>,
    #[serde(deserialize_with = "lenient_bool")]
    pub is_favorite: Option<bool>,

    pub difficulty: Option<serde_json::Value>,
    pub level: Option<serde_json::Value>,
}

impl DishRecord {
    /// Canonical id of this record, if it carries one.
    pub fn dish_id(&self) -> Option<DishId> {
        self.id
            .as_ref()
            .or(self.dish_id.as_ref())
            .filter(|id| !id.is_blank())
            .cloned()
    }

    /// Project the record to a [`Dish`].
    ///
    /// Returns `None` for records without a usable id; such entries
    /// cannot be favorited or opened and are dropped from lists.
    pub fn into_dish(self) -> Option<Dish> {
        let id = self.dish_id()?;

        let image = self
            .image
            .filter(|s| !s.is_empty())
            .or(self.image_url.filter(|s| !s.is_empty()))
            .or_else(|| match (&self.image_b64, &self.image_mime) {
                (Some(b64), Some(mime)) => Some(format!("data:{mime};base64,{b64}")),
                _ => None,
            })
            .unwrap_or_default();

        let duration = match self.time.as_ref().filter(|v| !v.is_null()) {
            Some(value) => format_duration_value(value),
            None => format_minutes(self.cooking_time.or(self.prep_time_min).unwrap_or(0.0)),
        };

        let difficulty = self
            .difficulty
            .as_ref()
            .and_then(scalar_text)
            .filter(|s| !s.is_empty())
            .or_else(|| self.level.as_ref().and_then(scalar_text))
            .map(|s| Difficulty::parse_lenient(&s))
            .unwrap_or_default();

        let rating = self
            .star
            .or(self.rating)
            .or(self.average_rating)
            .unwrap_or(0.0);

        Some(Dish {
            id,
            label: self
                .label
                .or(self.title)
                .or(self.name)
                .unwrap_or_default(),
            image,
            duration,
            difficulty,
            rating: (rating * 10.0).round() / 10.0,
            ingredients: self.ingredients.unwrap_or_default(),
            steps: self.steps.or(self.instructions).unwrap_or_default(),
            is_favorite: self
                .is_favorite_camel
                .or(self.is_favorite)
                .unwrap_or(false),
        })
    }
}

/// Project a list of raw records one at a time.
///
/// A record that does not parse, or has no id, is dropped on its own;
/// the rest of the list survives.
pub fn normalize_list(records: Vec<serde_json::Value>) -> Vec<Dish> {
    let total = records.len();
    let mut malformed = 0;
    let dishes: Vec<Dish> = records
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<DishRecord>(value) {
            Ok(record) => record.into_dish(),
            Err(e) => {
                malformed += 1;
                tracing::debug!(error = %e, "Dropped malformed dish record");
                None
            }
        })
        .collect();
    if dishes.len() + malformed < total {
        tracing::debug!(
            dropped = total - dishes.len() - malformed,
            "Dropped dish records without an id"
        );
    }
    dishes
}

// ---------------------------------------------------------------------------
// Duration formatting
// ---------------------------------------------------------------------------

/// Format a duration given in minutes, e.g. `15.0` -> `"15 phút"`.
pub fn format_minutes(minutes: f64) -> String {
    if minutes.fract() == 0.0 {
        format!("{} {DURATION_UNIT}", minutes as i64)
    } else {
        format!("{minutes} {DURATION_UNIT}")
    }
}

/// Normalize a free-form duration string.
///
/// * `""` -> `"0 phút"`
/// * `"15"` -> `"15 phút"`
/// * `"PT15M"` -> `"15 phút"`
/// * `"01:30"` / `"01:30:00"` -> `"90 phút"`
/// * anything else is returned unchanged.
pub fn format_duration(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return format_minutes(0.0);
    }
    if raw.chars().all(|c| c.is_ascii_digit()) {
        if let Ok(minutes) = raw.parse::<u64>() {
            return format!("{minutes} {DURATION_UNIT}");
        }
    }
    if let Some(caps) = ISO_MINUTES_RE.captures(raw) {
        if let Ok(minutes) = caps[1].parse::<u64>() {
            return format!("{minutes} {DURATION_UNIT}");
        }
    }
    if let Some(caps) = CLOCK_RE.captures(raw) {
        if let (Ok(hours), Ok(minutes)) = (caps[1].parse::<u64>(), caps[2].parse::<u64>()) {
            return format!("{} {DURATION_UNIT}", hours * 60 + minutes);
        }
    }
    raw.to_string()
}

fn format_duration_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Number(n) => format_minutes(n.as_f64().unwrap_or(0.0)),
        serde_json::Value::String(s) => format_duration(s),
        _ => format_minutes(0.0),
    }
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    })
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Bool(b)) => Some(b),
        Some(serde_json::Value::Number(n)) => n.as_i64().map(|n| n != 0),
        Some(serde_json::Value::String(s)) => match s.trim().to_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    })
}

/// Text of a scalar JSON value (`"medium"`, `2`), `None` for other kinds.
fn scalar_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
