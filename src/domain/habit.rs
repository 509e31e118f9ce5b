use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::{HabitId, UserId};

/// Raised when a stored or submitted enum value is outside its closed set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown {kind}: '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// How often a habit is expected to be completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    /// Elapsed whole days after which a missed period breaks the streak.
    #[must_use]
    pub const fn grace_days(self) -> i64 {
        match self {
            Self::Daily => 1,
            Self::Weekly => 7,
            Self::Monthly => 31,
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            other => Err(UnknownVariant {
                kind: "frequency",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Mindfulness,
    Learning,
    Productivity,
    Health,
    Fitness,
    Career,
    Social,
    Other,
}

impl Category {
    pub const ALL: [Self; 8] = [
        Self::Mindfulness,
        Self::Learning,
        Self::Productivity,
        Self::Health,
        Self::Fitness,
        Self::Career,
        Self::Social,
        Self::Other,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mindfulness => "Mindfulness",
            Self::Learning => "Learning",
            Self::Productivity => "Productivity",
            Self::Health => "Health",
            Self::Fitness => "Fitness",
            Self::Career => "Career",
            Self::Social => "Social",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "category",
                value: s.to_string(),
            })
    }
}

/// A habit as seen by the reset engine and the service layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Habit {
    pub id: HabitId,
    pub owner_id: UserId,
    pub title: String,
    pub description: String,
    pub frequency: Frequency,
    pub category: Category,
    pub time_of_day: Option<String>,
    pub reminder_time: Option<String>,
    pub streak: u32,
    pub completed: bool,
    pub last_completed: Option<DateTime<Utc>>,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Optimistic lock counter, bumped by the store on every committed write.
    pub version: i32,
}

/// Fields accepted when creating a habit.
#[derive(Debug, Clone)]
pub struct NewHabit {
    pub title: String,
    pub description: String,
    pub frequency: Frequency,
    pub category: Category,
    pub time_of_day: Option<String>,
    pub reminder_time: Option<String>,
}

/// Partial update. `completed` goes through the streak rule, never straight to the row.
#[derive(Debug, Clone, Default)]
pub struct HabitPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub frequency: Option<Frequency>,
    pub category: Option<Category>,
    pub time_of_day: Option<String>,
    pub reminder_time: Option<String>,
    pub completed: Option<bool>,
    pub is_archived: Option<bool>,
}

/// Conjunctive list filter.
#[derive(Debug, Clone, Copy, Default)]
pub struct HabitFilter {
    pub include_archived: bool,
    pub category: Option<Category>,
    pub frequency: Option<Frequency>,
    pub completed: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: u64,
    pub limit: u64,
}

impl Page {
    pub const DEFAULT_LIMIT: u64 = 10;
    pub const MAX_LIMIT: u64 = 100;
}

impl Default for Page {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

/// One day of history for a habit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitLog {
    pub id: i32,
    pub habit_id: HabitId,
    pub date: NaiveDate,
    pub completed: bool,
    pub completion_time: Option<NaiveTime>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewHabitLog {
    pub date: NaiveDate,
    pub completed: bool,
    pub completion_time: Option<NaiveTime>,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frequency_parses_only_known_values() {
        assert_eq!("weekly".parse::<Frequency>().unwrap(), Frequency::Weekly);
        let err = "Weekly".parse::<Frequency>().unwrap_err();
        assert_eq!(err.kind, "frequency");
        assert!("yearly".parse::<Frequency>().is_err());
    }

    #[test]
    fn frequency_serde_is_lowercase() {
        assert_eq!(serde_json::to_string(&Frequency::Monthly).unwrap(), "\"monthly\"");
        assert!(serde_json::from_str::<Frequency>("\"fortnightly\"").is_err());
    }

    #[test]
    fn category_round_trips_through_str() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        }
        assert!("Mental Health".parse::<Category>().is_err());
        assert!(serde_json::from_str::<Category>("\"mindfulness\"").is_err());
    }

    #[test]
    fn grace_windows() {
        assert_eq!(Frequency::Daily.grace_days(), 1);
        assert_eq!(Frequency::Weekly.grace_days(), 7);
        assert_eq!(Frequency::Monthly.grace_days(), 31);
    }
}
