use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
#[cfg(feature = "sqlx")]
use sqlx::{prelude::*, sqlite::SqliteRow};

/// One persisted walk. Stored as text columns, so every numeric field is coerced when read back.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct StepRecord {
    pub id: i64,
    pub month: u32,
    pub day: u32,
    pub steps: u64,
}

/// A record that has not been assigned an id yet.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct NewStepRecord {
    pub month: u32,
    pub day: u32,
    pub steps: u64,
}

impl NewStepRecord {
    pub fn new(month: u32, day: u32, steps: u64) -> Self {
        Self { month, day, steps }
    }

    pub fn for_date(date: NaiveDate, steps: u64) -> Self {
        Self::new(date.month(), date.day(), steps)
    }

    pub fn with_id(self, id: i64) -> StepRecord {
        StepRecord {
            id,
            month: self.month,
            day: self.day,
            steps: self.steps,
        }
    }
}

impl StepRecord {
    pub fn from_text(id: i64, month: Option<&str>, day: Option<&str>, steps: Option<&str>) -> Self {
        Self {
            id,
            month: coerce_field(month),
            day: coerce_field(day),
            steps: coerce_count(steps),
        }
    }

    /// "6/15"
    pub fn date_label(&self) -> String {
        format!("{}/{}", self.month, self.day)
    }

    pub fn steps_label(&self) -> String {
        format!("{} steps", self.steps)
    }
}

/// Parses a stored numeric text and floors it. Anything that is not a finite, non-negative number becomes 0.
pub fn coerce_count(raw: Option<&str>) -> u64 {
    raw.and_then(|text| text.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite() && *value >= 0.0)
        .map(|value| value.floor() as u64)
        .unwrap_or(0)
}

/// Like `coerce_count`, but a value too large for the field becomes 0 rather than wrapping.
pub fn coerce_field(raw: Option<&str>) -> u32 {
    u32::try_from(coerce_count(raw)).unwrap_or(0)
}

#[cfg(feature = "sqlx")]
impl FromRow<'_, SqliteRow> for StepRecord {
    fn from_row(row: &SqliteRow) -> sqlx::Result<Self> {
        // Sqlite is dynamically typed, so read whatever is stored as text and coerce it.
        let text = |column: &str| row.try_get_unchecked::<Option<String>, _>(column).ok().flatten();

        Ok(Self::from_text(
            row.try_get("id")?,
            text("month").as_deref(),
            text("day").as_deref(),
            text("steps").as_deref(),
        ))
    }
}

#[test]
fn coerces_stored_text() {
    assert_eq!(coerce_count(Some("1300")), 1300);
    assert_eq!(coerce_count(Some(" 42 ")), 42);
    assert_eq!(coerce_count(Some("6.9")), 6);
    assert_eq!(coerce_count(Some("abc")), 0);
    assert_eq!(coerce_count(Some("")), 0);
    assert_eq!(coerce_count(Some("-5")), 0);
    assert_eq!(coerce_count(Some("NaN")), 0);
    assert_eq!(coerce_count(None), 0);

    assert_eq!(coerce_field(Some("12")), 12);
    assert_eq!(coerce_field(Some("4294967302")), 0);
    assert_eq!(coerce_field(Some("4294967295")), u32::MAX);

    let oversized = StepRecord::from_text(4, Some("4294967302"), Some("4294967311"), Some("1300.9"));
    assert_eq!((oversized.month, oversized.day, oversized.steps), (0, 0, 1300));

    let record = StepRecord::from_text(3, Some("6"), Some("15"), Some("1300"));
    assert_eq!(record, StepRecord { id: 3, month: 6, day: 15, steps: 1300 });
    assert_eq!(record.date_label(), "6/15");
    assert_eq!(record.steps_label(), "1300 steps");
}

#[test]
fn new_record_for_date() {
    let date = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
    let record = NewStepRecord::for_date(date, 1300).with_id(1);
    assert_eq!((record.month, record.day, record.steps), (6, 15, 1300));
}
