//! Challenge types: the static catalog entries and the active and completed instances that are
//! persisted in the key-value store.
//!
//! Stored values use camelCase keys. The keys written by the old browser client (`duration`,
//! `category`, `daysPassed`, `type: "budget"`) are accepted as aliases so an exported
//! local-storage dump can be loaded as-is.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// The label used for the "every category" sentinel.
pub const ALL_CATEGORIES: &str = "All";

/// How a challenge decides success.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeKind {
    /// Succeeds if no expense in the target category occurs during the window.
    #[default]
    CategoryAbstinence,
    /// Succeeds if every day's total in the window stays at or under the daily limit.
    #[serde(alias = "budget")]
    DailyBudget,
}

serde_plain::derive_display_from_serialize!(ChallengeKind);
serde_plain::derive_fromstr_from_deserialize!(ChallengeKind);

/// The category a challenge watches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TargetCategory {
    All,
    Named(String),
}

impl TargetCategory {
    /// Whether an expense in `category` counts against this target.
    pub fn matches(&self, category: &str) -> bool {
        match self {
            TargetCategory::All => true,
            TargetCategory::Named(name) => name == category,
        }
    }
}

impl From<String> for TargetCategory {
    fn from(value: String) -> Self {
        if value == ALL_CATEGORIES {
            TargetCategory::All
        } else {
            TargetCategory::Named(value)
        }
    }
}

impl From<&str> for TargetCategory {
    fn from(value: &str) -> Self {
        TargetCategory::from(value.to_string())
    }
}

impl From<TargetCategory> for String {
    fn from(value: TargetCategory) -> Self {
        match value {
            TargetCategory::All => ALL_CATEGORIES.to_string(),
            TargetCategory::Named(name) => name,
        }
    }
}

impl Display for TargetCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetCategory::All => f.write_str(ALL_CATEGORIES),
            TargetCategory::Named(name) => f.write_str(name),
        }
    }
}

/// A challenge the user can start. These are defined by the application, never by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeDefinition {
    pub(crate) id: String,
    pub(crate) title: String,
    pub(crate) description: String,
    #[serde(alias = "duration")]
    pub(crate) duration_days: u32,
    #[serde(alias = "category")]
    pub(crate) target_category: TargetCategory,
    pub(crate) badge: String,
    pub(crate) points: u32,
    #[serde(default, alias = "type")]
    pub(crate) kind: ChallengeKind,
}

impl ChallengeDefinition {
    /// A challenge that is won by not spending anything in `category` for `duration_days`.
    pub fn abstinence(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        duration_days: u32,
        category: impl Into<TargetCategory>,
        badge: impl Into<String>,
        points: u32,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            duration_days,
            target_category: category.into(),
            badge: badge.into(),
            points,
            kind: ChallengeKind::CategoryAbstinence,
        }
    }

    /// A challenge that is won by keeping every day's spending under the daily limit.
    pub fn daily_budget(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        duration_days: u32,
        badge: impl Into<String>,
        points: u32,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            duration_days,
            target_category: TargetCategory::All,
            badge: badge.into(),
            points,
            kind: ChallengeKind::DailyBudget,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn duration_days(&self) -> u32 {
        self.duration_days
    }

    pub fn target_category(&self) -> &TargetCategory {
        &self.target_category
    }

    pub fn badge(&self) -> &str {
        &self.badge
    }

    pub fn points(&self) -> u32 {
        self.points
    }

    pub fn kind(&self) -> ChallengeKind {
        self.kind
    }
}

/// The built-in challenge catalog.
pub fn catalog() -> Vec<ChallengeDefinition> {
    vec![
        ChallengeDefinition::abstinence(
            "no-eating-out-7",
            "No Eating Out",
            "Avoid restaurant expenses for 7 days",
            7,
            "Food",
            "🍽️",
            100,
        ),
        ChallengeDefinition::abstinence(
            "no-shopping-14",
            "Shopping Freeze",
            "No shopping expenses for 14 days",
            14,
            "Shopping",
            "🛒",
            150,
        ),
        ChallengeDefinition::abstinence(
            "no-entertainment-7",
            "Entertainment Detox",
            "No entertainment expenses for 7 days",
            7,
            "Entertainment",
            "🎬",
            100,
        ),
        ChallengeDefinition::daily_budget(
            "budget-saver",
            "Budget Saver",
            "Keep daily expenses under ₹500 for 7 days",
            7,
            "💰",
            200,
        ),
    ]
}

/// A started challenge that has not been resolved yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveChallenge {
    #[serde(flatten)]
    pub(crate) definition: ChallengeDefinition,
    pub(crate) start_date: NaiveDate,
    #[serde(default, alias = "daysPassed")]
    pub(crate) days_elapsed: u32,
    /// Display flag only. A failed challenge keeps running until its window closes.
    #[serde(default)]
    pub(crate) failed: bool,
}

impl ActiveChallenge {
    /// Starts `definition` on `start_date`.
    pub fn start(definition: ChallengeDefinition, start_date: NaiveDate) -> Self {
        Self {
            definition,
            start_date,
            days_elapsed: 0,
            failed: false,
        }
    }

    pub fn id(&self) -> &str {
        self.definition.id()
    }

    pub fn definition(&self) -> &ChallengeDefinition {
        &self.definition
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn days_elapsed(&self) -> u32 {
        self.days_elapsed
    }

    pub fn failed(&self) -> bool {
        self.failed
    }

    /// Progress through the window as a fraction in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        match self.definition.duration_days {
            0 => 1.0,
            d => (f64::from(self.days_elapsed) / f64::from(d)).min(1.0),
        }
    }
}

/// A challenge whose window ended in success. Never modified once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedChallenge {
    #[serde(flatten)]
    pub(crate) definition: ChallengeDefinition,
    pub(crate) completed_date: NaiveDate,
}

impl CompletedChallenge {
    pub fn new(definition: ChallengeDefinition, completed_date: NaiveDate) -> Self {
        Self {
            definition,
            completed_date,
        }
    }

    pub fn id(&self) -> &str {
        self.definition.id()
    }

    pub fn definition(&self) -> &ChallengeDefinition {
        &self.definition
    }

    pub fn points(&self) -> u32 {
        self.definition.points()
    }

    pub fn completed_date(&self) -> NaiveDate {
        self.completed_date
    }
}
