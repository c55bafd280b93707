use std::fmt;
use std::str::FromStr;

use anyhow::{Result, bail};
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::fields;
use crate::table::{Cells, Row, col};

// --- Column names ---

pub mod columns {
    pub const BIRTH_DATE: &str = "生まれた日";
    pub const BIRTH_TIME: &str = "生まれた時間";
    pub const PLACE: &str = "場所";
    pub const WEATHER: &str = "天気";
    pub const WEIGHT: &str = "体重";
    pub const HEIGHT: &str = "身長";
    pub const MESSAGE: &str = "メッセージ";
    pub const DATE: &str = "日付";
    pub const COMMENT: &str = "コメント";
    pub const WEEKDAY: &str = "曜日";
    pub const DESCRIPTION: &str = "できたこと";

    pub const TIMESTAMP: &str = "日付時間";
    pub const DAYS_SINCE_BIRTH: &str = "生後日数";
    pub const MEAL: &str = "食事内容";
    pub const GRAMS: &str = "グラム";
    pub const POTTY: &str = "おしっこ・うんち";
    pub const WALK: &str = "散歩";
    pub const SLEEP: &str = "睡眠";
    pub const MEMO: &str = "MEMO";

    pub const NOTE: &str = "メモ";
}

pub const MAX_MEAL_GRAMS: u16 = 500;
pub const MAX_MILESTONES_PER_SUBMISSION: usize = 5;

// --- Pet name ---

/// A non-empty pet name. Every store call is keyed by one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PetName(String);

impl PetName {
    pub fn parse(name: &str) -> Result<Self> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            bail!("Pet name must not be empty");
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PetName {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

// --- Categories ---

/// Discriminator stored in the `ページ` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Basic,
    Handprint,
    Milestones,
    Birthday,
    Notes,
}

impl Category {
    #[must_use]
    pub fn slug(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Handprint => "handprint",
            Self::Milestones => "milestones",
            Self::Birthday => "birthday",
            Self::Notes => "notes",
        }
    }

    /// The label written to disk.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Basic => "基本事項",
            Self::Handprint => "手形",
            Self::Milestones => "初めてできたこと",
            Self::Birthday => "誕生日メッセージ",
            Self::Notes => "メモ欄",
        }
    }

    /// Whether a pet has at most one row of this category.
    #[must_use]
    pub fn is_single(self) -> bool {
        matches!(self, Self::Basic | Self::Handprint | Self::Birthday)
    }

    /// Accepts either the slug or the stored label.
    #[must_use]
    pub fn from_label(s: &str) -> Option<Self> {
        let s = s.trim();
        [
            Self::Basic,
            Self::Handprint,
            Self::Milestones,
            Self::Birthday,
            Self::Notes,
        ]
        .into_iter()
        .find(|c| c.label() == s || c.slug().eq_ignore_ascii_case(s))
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_label(s).ok_or_else(|| {
            anyhow::anyhow!(
                "Unknown category '{s}'. Must be one of: basic, handprint, milestones, birthday, notes"
            )
        })
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

// --- Image slots ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSlot {
    Photo1,
    Photo2,
    Hand,
    Bday,
}

impl ImageSlot {
    pub const ALL: [ImageSlot; 4] = [Self::Photo1, Self::Photo2, Self::Hand, Self::Bday];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Photo1 => "photo1",
            Self::Photo2 => "photo2",
            Self::Hand => "hand",
            Self::Bday => "bday",
        }
    }
}

impl FromStr for ImageSlot {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|slot| slot.as_str() == lower)
            .ok_or_else(|| {
                anyhow::anyhow!("Invalid image slot '{s}'. Must be one of: photo1, photo2, hand, bday")
            })
    }
}

impl fmt::Display for ImageSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Derived fields ---

/// English weekday name, e.g. `Wednesday`.
#[must_use]
pub fn weekday(date: NaiveDate) -> String {
    let name = match date.weekday() {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    };
    name.to_string()
}

/// Whole days from the birth date to the entry's date. Negative if the entry predates birth.
#[must_use]
pub fn days_since_birth(timestamp: NaiveDateTime, birth_date: Option<NaiveDate>) -> Option<i64> {
    birth_date.map(|birth| (timestamp.date() - birth).num_days())
}

// --- Profile table records ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub birth_date: NaiveDate,
    pub birth_time: NaiveTime,
    #[serde(default)]
    pub place: String,
    #[serde(default)]
    pub weather: String,
    #[serde(default)]
    pub birth_weight: String,
    #[serde(default)]
    pub birth_height: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandprintRecord {
    pub date: NaiveDate,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilestoneRecord {
    pub date: NaiveDate,
    /// Recomputed from `date` whenever the record is saved.
    #[serde(default)]
    pub weekday: String,
    #[serde(default)]
    pub description: String,
}

impl MilestoneRecord {
    #[must_use]
    pub fn new(date: NaiveDate, description: impl Into<String>) -> Self {
        Self {
            date,
            weekday: weekday(date),
            description: description.into(),
        }
    }
}

/// A milestone as submitted; the weekday is derived on save.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MilestoneDraft {
    pub date: NaiveDate,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BirthdayRecord {
    #[serde(default)]
    pub message: String,
}

/// One row of the shared profile table. The variant fixes the category, so a
/// record can never be stored under the wrong `ページ`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "lowercase")]
pub enum ProfileEntry {
    Basic(ProfileRecord),
    Handprint(HandprintRecord),
    #[serde(rename = "milestones")]
    Milestone(MilestoneRecord),
    Birthday(BirthdayRecord),
}

impl ProfileEntry {
    #[must_use]
    pub fn category(&self) -> Category {
        match self {
            Self::Basic(_) => Category::Basic,
            Self::Handprint(_) => Category::Handprint,
            Self::Milestone(_) => Category::Milestones,
            Self::Birthday(_) => Category::Birthday,
        }
    }

    #[must_use]
    pub fn to_row(&self, pet: &PetName) -> Row {
        let row = Row::new()
            .with(col::NAME, pet.as_str())
            .with(col::PAGE, self.category().label());
        match self {
            Self::Basic(r) => row
                .with(columns::BIRTH_DATE, fields::format_date(r.birth_date))
                .with(columns::BIRTH_TIME, fields::format_time(r.birth_time))
                .with(columns::PLACE, r.place.as_str())
                .with(columns::WEATHER, r.weather.as_str())
                .with(columns::WEIGHT, r.birth_weight.as_str())
                .with(columns::HEIGHT, r.birth_height.as_str())
                .with(columns::MESSAGE, r.message.as_str()),
            Self::Handprint(r) => row
                .with(columns::DATE, fields::format_date(r.date))
                .with(columns::COMMENT, r.comment.as_str()),
            Self::Milestone(r) => row
                .with(columns::DATE, fields::format_date(r.date))
                .with(columns::WEEKDAY, r.weekday.as_str())
                .with(columns::DESCRIPTION, r.description.as_str()),
            Self::Birthday(r) => row.with(columns::MESSAGE, r.message.as_str()),
        }
    }

    /// Decode a stored row. Returns `None` for rows of another table or an unknown category.
    #[must_use]
    pub fn from_row(row: &impl Cells) -> Option<Self> {
        let label = row.cell(col::PAGE).unwrap_or_default();
        let Some(category) = Category::from_label(label) else {
            warn!(category = label, "skipping row with unknown category");
            return None;
        };
        let entry = match category {
            Category::Basic => Self::Basic(ProfileRecord {
                birth_date: fields::date_or_today(row, columns::BIRTH_DATE),
                birth_time: fields::time_or_now(row, columns::BIRTH_TIME),
                place: fields::text(row, columns::PLACE),
                weather: fields::text(row, columns::WEATHER),
                birth_weight: fields::text(row, columns::WEIGHT),
                birth_height: fields::text(row, columns::HEIGHT),
                message: fields::text(row, columns::MESSAGE),
            }),
            Category::Handprint => Self::Handprint(HandprintRecord {
                date: fields::date_or_today(row, columns::DATE),
                comment: fields::text(row, columns::COMMENT),
            }),
            Category::Milestones => {
                let date = fields::date_or_today(row, columns::DATE);
                let stored = fields::text(row, columns::WEEKDAY);
                Self::Milestone(MilestoneRecord {
                    date,
                    weekday: if stored.is_empty() { weekday(date) } else { stored },
                    description: fields::text(row, columns::DESCRIPTION),
                })
            }
            Category::Birthday => Self::Birthday(BirthdayRecord {
                message: fields::text(row, columns::MESSAGE),
            }),
            Category::Notes => {
                warn!("note row found in profile table, skipping");
                return None;
            }
        };
        Some(entry)
    }
}

// --- Growth log ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrowthLogEntry {
    pub timestamp: NaiveDateTime,
    pub days_since_birth: Option<i64>,
    #[serde(default)]
    pub meal: String,
    #[serde(default)]
    pub meal_grams: u16,
    #[serde(default)]
    pub potty: String,
    #[serde(default)]
    pub walk: String,
    #[serde(default)]
    pub sleep: String,
    #[serde(default)]
    pub memo: String,
}

/// A growth diary submission; `days_since_birth` is derived on save.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GrowthDraft {
    pub timestamp: NaiveDateTime,
    #[serde(default)]
    pub meal: String,
    #[serde(default)]
    pub meal_grams: u16,
    #[serde(default)]
    pub potty: String,
    #[serde(default)]
    pub walk: String,
    #[serde(default)]
    pub sleep: String,
    #[serde(default)]
    pub memo: String,
}

impl GrowthDraft {
    #[must_use]
    pub fn into_entry(self, birth_date: Option<NaiveDate>) -> GrowthLogEntry {
        GrowthLogEntry {
            days_since_birth: days_since_birth(self.timestamp, birth_date),
            timestamp: self.timestamp,
            meal: self.meal,
            meal_grams: self.meal_grams,
            potty: self.potty,
            walk: self.walk,
            sleep: self.sleep,
            memo: self.memo,
        }
    }
}

pub fn validate_meal_grams(grams: u16) -> Result<()> {
    if grams > MAX_MEAL_GRAMS {
        bail!("Meal amount must be between 0 and {MAX_MEAL_GRAMS} g (got {grams})");
    }
    Ok(())
}

impl GrowthLogEntry {
    #[must_use]
    pub fn to_row(&self, pet: &PetName) -> Row {
        Row::new()
            .with(col::NAME, pet.as_str())
            .with(columns::TIMESTAMP, fields::format_timestamp(self.timestamp))
            .with(
                columns::DAYS_SINCE_BIRTH,
                self.days_since_birth.map(|d| d.to_string()).unwrap_or_default(),
            )
            .with(columns::MEAL, self.meal.as_str())
            .with(columns::GRAMS, self.meal_grams.to_string())
            .with(columns::POTTY, self.potty.as_str())
            .with(columns::WALK, self.walk.as_str())
            .with(columns::SLEEP, self.sleep.as_str())
            .with(columns::MEMO, self.memo.as_str())
    }

    #[must_use]
    pub fn from_row(row: &impl Cells) -> Self {
        let meal_grams = match fields::optional_int(row, columns::GRAMS) {
            Some(g) => u16::try_from(g).unwrap_or_else(|_| {
                warn!(column = columns::GRAMS, value = g, "meal amount out of range, using 0");
                0
            }),
            None => 0,
        };
        Self {
            timestamp: fields::timestamp_or_now(row, columns::TIMESTAMP),
            days_since_birth: fields::optional_int(row, columns::DAYS_SINCE_BIRTH),
            meal: fields::text(row, columns::MEAL),
            meal_grams,
            potty: fields::text(row, columns::POTTY),
            walk: fields::text(row, columns::WALK),
            sleep: fields::text(row, columns::SLEEP),
            memo: fields::text(row, columns::MEMO),
        }
    }

    /// Case-insensitive match against every stored column of the row, pet name
    /// included, as rendered.
    #[must_use]
    pub fn contains_keyword(&self, pet: &PetName, keyword: &str) -> bool {
        let needle = keyword.to_lowercase();
        let haystack = [
            pet.as_str().to_string(),
            fields::format_timestamp(self.timestamp),
            self.days_since_birth.map(|d| d.to_string()).unwrap_or_default(),
            self.meal.clone(),
            self.meal_grams.to_string(),
            self.potty.clone(),
            self.walk.clone(),
            self.sleep.clone(),
            self.memo.clone(),
        ]
        .join(" ")
        .to_lowercase();
        haystack.contains(&needle)
    }
}

// --- Notes ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteEntry {
    pub date: NaiveDate,
    #[serde(default)]
    pub text: String,
}

impl NoteEntry {
    #[must_use]
    pub fn to_row(&self, pet: &PetName) -> Row {
        Row::new()
            .with(col::NAME, pet.as_str())
            .with(col::PAGE, Category::Notes.label())
            .with(columns::DATE, fields::format_date(self.date))
            .with(columns::NOTE, self.text.as_str())
    }

    #[must_use]
    pub fn from_row(row: &impl Cells) -> Self {
        Self {
            date: fields::date_or_today(row, columns::DATE),
            text: fields::text(row, columns::NOTE),
        }
    }
}
