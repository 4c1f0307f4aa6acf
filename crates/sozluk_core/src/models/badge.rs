//! Badge, award, and contribution models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Text in both site locales.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct LocalizedText {
    pub en: String,
    pub tr: String,
}

/// Threshold a user must reach to earn a badge.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum BadgeRequirement {
    MinPoints(u64),
    CountWord(u64),
    CountMeaning(u64),
    CountPronunciation(u64),
    CountMeaningAttribute(u64),
    CountRelatedWord(u64),
}

/// Badge definition managed by administrators.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Badge {
    pub slug: String,
    pub name: LocalizedText,
    pub description: LocalizedText,
    pub icon: String,
    pub requirement: BadgeRequirement,
    pub category: String,
}

/// Partial badge update; the slug is immutable.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateBadgeRequest {
    pub name: Option<LocalizedText>,
    pub description: Option<LocalizedText>,
    pub icon: Option<String>,
    pub requirement: Option<BadgeRequirement>,
    pub category: Option<String>,
}

impl Badge {
    pub(crate) fn apply_update(&mut self, update: UpdateBadgeRequest) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(icon) = update.icon {
            self.icon = icon;
        }
        if let Some(requirement) = update.requirement {
            self.requirement = requirement;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
    }
}

/// How an award came to exist.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AwardSource {
    Threshold,
    Manual,
}

/// A badge held by a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserBadge {
    pub user_id: String,
    pub badge_slug: String,
    pub awarded_at: DateTime<Utc>,
    pub source: AwardSource,
}

/// Moderated contribution kinds that earn points.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContributionAction {
    CreateWord,
    CreateMeaning,
    CreatePronunciation,
    CreateMeaningAttribute,
    CreateRelatedWord,
}

/// An approved contribution, reported once per moderation decision.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContributionEvent {
    pub id: String,
    pub user_id: String,
    pub action: ContributionAction,
}

/// Running per-user totals that badge requirements are checked against.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct UserStats {
    pub points: u64,
    pub words: u64,
    pub meanings: u64,
    pub pronunciations: u64,
    pub meaning_attributes: u64,
    pub related_words: u64,
}

/// Result of recording a contribution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AwardOutcome {
    pub points_awarded: u64,
    pub stats: UserStats,
    pub new_badges: Vec<String>,
    /// `true` when the event id had already been applied.
    pub replayed: bool,
}
