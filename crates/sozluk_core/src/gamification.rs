//! Point table and badge threshold evaluation.
//!
//! Everything here is pure; persistence of stats and awards lives in
//! [`crate::db::gamification`].

use crate::models::badge::{Badge, BadgeRequirement, ContributionAction, UserStats};
use std::collections::HashSet;

impl ContributionAction {
    /// Fixed point value awarded for one approved contribution.
    pub const fn points(self) -> u64 {
        match self {
            ContributionAction::CreateWord => 10,
            ContributionAction::CreateMeaning => 5,
            ContributionAction::CreatePronunciation => 5,
            ContributionAction::CreateMeaningAttribute => 2,
            ContributionAction::CreateRelatedWord => 3,
        }
    }
}

impl UserStats {
    /// Add one contribution of `action` to the totals.
    ///
    /// # Returns
    /// Points awarded for the action.
    pub fn record(&mut self, action: ContributionAction) -> u64 {
        let points = action.points();
        self.points = self.points.saturating_add(points);
        let counter = match action {
            ContributionAction::CreateWord => &mut self.words,
            ContributionAction::CreateMeaning => &mut self.meanings,
            ContributionAction::CreatePronunciation => &mut self.pronunciations,
            ContributionAction::CreateMeaningAttribute => &mut self.meaning_attributes,
            ContributionAction::CreateRelatedWord => &mut self.related_words,
        };
        *counter = counter.saturating_add(1);
        points
    }
}

impl BadgeRequirement {
    /// Whether `stats` meets this threshold.
    pub fn is_satisfied(&self, stats: &UserStats) -> bool {
        match *self {
            BadgeRequirement::MinPoints(min) => stats.points >= min,
            BadgeRequirement::CountWord(min) => stats.words >= min,
            BadgeRequirement::CountMeaning(min) => stats.meanings >= min,
            BadgeRequirement::CountPronunciation(min) => stats.pronunciations >= min,
            BadgeRequirement::CountMeaningAttribute(min) => stats.meaning_attributes >= min,
            BadgeRequirement::CountRelatedWord(min) => stats.related_words >= min,
        }
    }
}

/// Badges whose thresholds `stats` meets and the user does not hold yet.
///
/// # Arguments
/// - `badges`: All badge definitions.
/// - `stats`: The user's current totals.
/// - `held`: Slugs already awarded to the user.
///
/// # Returns
/// Slugs to award, in definition order.
pub fn newly_earned<'a>(
    badges: &'a [Badge],
    stats: &UserStats,
    held: &HashSet<String>,
) -> Vec<&'a str> {
    badges
        .iter()
        .filter(|badge| !held.contains(&badge.slug))
        .filter(|badge| badge.requirement.is_satisfied(stats))
        .map(|badge| badge.slug.as_str())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::badge::LocalizedText;

    fn badge(slug: &str, requirement: BadgeRequirement) -> Badge {
        Badge {
            slug: slug.to_string(),
            name: LocalizedText::default(),
            description: LocalizedText::default(),
            icon: String::new(),
            requirement,
            category: "test".to_string(),
        }
    }

    #[test]
    fn point_table_is_fixed() {
        assert_eq!(ContributionAction::CreateWord.points(), 10);
        assert_eq!(ContributionAction::CreateMeaningAttribute.points(), 2);
        assert_eq!(ContributionAction::CreateMeaning.points(), 5);
        assert_eq!(ContributionAction::CreatePronunciation.points(), 5);
        assert_eq!(ContributionAction::CreateRelatedWord.points(), 3);
    }

    #[test]
    fn record_updates_points_and_matching_counter() {
        let mut stats = UserStats::default();
        assert_eq!(stats.record(ContributionAction::CreateWord), 10);
        assert_eq!(stats.record(ContributionAction::CreatePronunciation), 5);
        assert_eq!(stats.points, 15);
        assert_eq!(stats.words, 1);
        assert_eq!(stats.pronunciations, 1);
        assert_eq!(stats.meanings, 0);
    }

    #[test]
    fn newly_earned_skips_held_and_unmet_badges() {
        let badges = vec![
            badge("ten-points", BadgeRequirement::MinPoints(10)),
            badge("first-word", BadgeRequirement::CountWord(1)),
            badge("voice", BadgeRequirement::CountPronunciation(3)),
        ];
        let mut stats = UserStats::default();
        stats.record(ContributionAction::CreateWord);

        let held: HashSet<String> = ["first-word".to_string()].into_iter().collect();
        assert_eq!(newly_earned(&badges, &stats, &held), vec!["ten-points"]);
    }
}
