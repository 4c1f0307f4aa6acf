//! Badge definitions, user awards, and contribution totals backed by redb.

use super::tables::{APPLIED_CONTRIBUTIONS, BADGES, USER_BADGES, USER_STATS};
use super::time_util::to_millis;
use crate::error::AppError;
use crate::gamification::newly_earned;
use crate::models::badge::*;
use chrono::Utc;
use redb::{ReadableDatabase, ReadableTable};
use std::collections::HashSet;
use std::sync::Arc;

type BadgesTable<'txn> = redb::Table<'txn, &'static str, &'static [u8]>;
type AwardsTable<'txn> = redb::Table<'txn, (&'static str, &'static str), &'static [u8]>;

fn validate_slug(slug: &str) -> Result<(), AppError> {
    let valid = !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "Badge slug '{}' must be non-empty lowercase ascii, digits, '-' or '_'",
            slug
        )))
    }
}

fn load_badges<T>(table: &T) -> Result<Vec<Badge>, AppError>
where
    T: ReadableTable<&'static str, &'static [u8]>,
{
    let mut badges = Vec::new();
    for entry in table.iter()? {
        let (_, value) = entry?;
        badges.push(serde_json::from_slice(value.value())?);
    }
    Ok(badges)
}

fn load_user_awards<T>(table: &T, user_id: &str) -> Result<Vec<UserBadge>, AppError>
where
    T: ReadableTable<(&'static str, &'static str), &'static [u8]>,
{
    let mut awards = Vec::new();
    for entry in table.range((user_id, "")..)? {
        let (key, value) = entry?;
        if key.value().0 != user_id {
            break;
        }
        awards.push(serde_json::from_slice(value.value())?);
    }
    Ok(awards)
}

fn load_stats<T>(table: &T, user_id: &str) -> Result<UserStats, AppError>
where
    T: ReadableTable<&'static str, &'static [u8]>,
{
    match table.get(user_id)? {
        Some(value) => Ok(bincode::deserialize(value.value())?),
        None => Ok(UserStats::default()),
    }
}

fn insert_award(
    awards: &mut AwardsTable<'_>,
    user_id: &str,
    slug: &str,
    source: AwardSource,
) -> Result<UserBadge, AppError> {
    let award = UserBadge {
        user_id: user_id.to_string(),
        badge_slug: slug.to_string(),
        awarded_at: Utc::now(),
        source,
    };
    let encoded = serde_json::to_vec(&award)?;
    awards.insert((user_id, slug), encoded.as_slice())?;
    Ok(award)
}

fn ensure_badge_exists(badges: &BadgesTable<'_>, slug: &str) -> Result<(), AppError> {
    if badges.get(slug)?.is_none() {
        return Err(AppError::NotFound);
    }
    Ok(())
}

/// Accessor for badge, award, and stats tables.
pub struct GamificationDb {
    db: Arc<redb::Database>,
}

impl GamificationDb {
    /// Initialize gamification tables if they do not exist yet.
    ///
    /// # Errors
    /// Returns an error when redb transaction/table initialization fails.
    pub fn new(db: Arc<redb::Database>) -> Result<Self, AppError> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(BADGES)?;
        write_txn.open_table(USER_BADGES)?;
        write_txn.open_table(USER_STATS)?;
        write_txn.open_table(APPLIED_CONTRIBUTIONS)?;
        write_txn.commit()?;
        Ok(Self { db })
    }

    /// List all badge definitions ordered by slug.
    ///
    /// # Errors
    /// Returns an error when storage access or decoding fails.
    pub fn list_badges(&self) -> Result<Vec<Badge>, AppError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(BADGES)?;
        load_badges(&table)
    }

    /// Insert a new badge definition.
    ///
    /// # Errors
    /// Returns [`AppError::Conflict`] when the slug exists, or
    /// [`AppError::BadRequest`] for an invalid slug.
    pub fn create_badge(&self, badge: &Badge) -> Result<(), AppError> {
        validate_slug(&badge.slug)?;
        let encoded = serde_json::to_vec(badge)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(BADGES)?;
            if table.get(badge.slug.as_str())?.is_some() {
                return Err(AppError::Conflict(format!(
                    "Badge '{}' already exists",
                    badge.slug
                )));
            }
            table.insert(badge.slug.as_str(), encoded.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Apply a partial update to a badge.
    ///
    /// # Returns
    /// `Ok(Some(badge))` when updated, `Ok(None)` when the slug is unknown.
    ///
    /// # Errors
    /// Returns an error when storage access or serialization fails.
    pub fn update_badge(
        &self,
        slug: &str,
        update: UpdateBadgeRequest,
    ) -> Result<Option<Badge>, AppError> {
        let write_txn = self.db.begin_write()?;
        let updated = {
            let mut table = write_txn.open_table(BADGES)?;
            let Some(guard) = table.get(slug)? else {
                return Ok(None);
            };
            let mut badge: Badge = serde_json::from_slice(guard.value())?;
            drop(guard);
            badge.apply_update(update);
            let encoded = serde_json::to_vec(&badge)?;
            table.insert(slug, encoded.as_slice())?;
            badge
        };
        write_txn.commit()?;
        Ok(Some(updated))
    }

    /// Delete a badge and every award that references it.
    ///
    /// # Returns
    /// `true` when the badge existed.
    ///
    /// # Errors
    /// Returns an error when storage access fails.
    pub fn delete_badge(&self, slug: &str) -> Result<bool, AppError> {
        let write_txn = self.db.begin_write()?;
        let existed = {
            let mut badges = write_txn.open_table(BADGES)?;
            let existed = badges.remove(slug)?.is_some();
            if existed {
                let mut awards = write_txn.open_table(USER_BADGES)?;
                let mut holders = Vec::new();
                for entry in awards.iter()? {
                    let (key, _) = entry?;
                    let (user_id, badge_slug) = key.value();
                    if badge_slug == slug {
                        holders.push(user_id.to_string());
                    }
                }
                for user_id in &holders {
                    awards.remove((user_id.as_str(), slug))?;
                }
            }
            existed
        };
        write_txn.commit()?;
        Ok(existed)
    }

    /// Manually award a badge, bypassing its threshold.
    ///
    /// # Errors
    /// Returns [`AppError::NotFound`] for an unknown badge and
    /// [`AppError::Conflict`] when the user already holds it.
    pub fn assign_badge(&self, user_id: &str, slug: &str) -> Result<UserBadge, AppError> {
        if user_id.trim().is_empty() {
            return Err(AppError::BadRequest("User id must not be empty".to_string()));
        }
        let write_txn = self.db.begin_write()?;
        let award = {
            let badges = write_txn.open_table(BADGES)?;
            ensure_badge_exists(&badges, slug)?;
            let mut awards = write_txn.open_table(USER_BADGES)?;
            if awards.get((user_id, slug))?.is_some() {
                return Err(AppError::Conflict(format!(
                    "User '{}' already holds badge '{}'",
                    user_id, slug
                )));
            }
            insert_award(&mut awards, user_id, slug, AwardSource::Manual)?
        };
        write_txn.commit()?;
        Ok(award)
    }

    /// Remove a badge from a user.
    ///
    /// # Returns
    /// `true` when the user held the badge.
    ///
    /// # Errors
    /// Returns an error when storage access fails.
    pub fn revoke_badge(&self, user_id: &str, slug: &str) -> Result<bool, AppError> {
        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut awards = write_txn.open_table(USER_BADGES)?;
            let removed = awards.remove((user_id, slug))?.is_some();
            removed
        };
        write_txn.commit()?;
        Ok(removed)
    }

    /// List the badges a user holds, ordered by slug.
    ///
    /// # Errors
    /// Returns an error when storage access or decoding fails.
    pub fn user_badges(&self, user_id: &str) -> Result<Vec<UserBadge>, AppError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USER_BADGES)?;
        load_user_awards(&table, user_id)
    }

    /// Current totals for a user; unknown users have all-zero stats.
    ///
    /// # Errors
    /// Returns an error when storage access or decoding fails.
    pub fn user_stats(&self, user_id: &str) -> Result<UserStats, AppError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(USER_STATS)?;
        load_stats(&table, user_id)
    }

    /// Apply an approved contribution: add points, bump counters, and award
    /// every badge whose threshold is now met.
    ///
    /// Automatic awards skip badges the user already holds. An event id that
    /// was applied before changes nothing and reports `replayed`.
    ///
    /// # Errors
    /// Returns [`AppError::BadRequest`] for blank ids, or a storage error.
    pub fn record_contribution(&self, event: &ContributionEvent) -> Result<AwardOutcome, AppError> {
        if event.id.trim().is_empty() || event.user_id.trim().is_empty() {
            return Err(AppError::BadRequest(
                "Contribution id and user id must not be empty".to_string(),
            ));
        }
        let user_id = event.user_id.as_str();
        let write_txn = self.db.begin_write()?;
        let outcome = {
            let mut applied = write_txn.open_table(APPLIED_CONTRIBUTIONS)?;
            let mut stats_table = write_txn.open_table(USER_STATS)?;
            let mut stats = load_stats(&stats_table, user_id)?;

            if applied.get(event.id.as_str())?.is_some() {
                tracing::debug!("Contribution {} already applied; skipping", event.id);
                return Ok(AwardOutcome {
                    points_awarded: 0,
                    stats,
                    new_badges: Vec::new(),
                    replayed: true,
                });
            }

            let points_awarded = stats.record(event.action);
            let encoded = bincode::serialize(&stats)?;
            stats_table.insert(user_id, encoded.as_slice())?;
            applied.insert(event.id.as_str(), to_millis(Utc::now()))?;

            let badges_table = write_txn.open_table(BADGES)?;
            let badges = load_badges(&badges_table)?;
            let mut awards = write_txn.open_table(USER_BADGES)?;
            let held: HashSet<String> = load_user_awards(&awards, user_id)?
                .into_iter()
                .map(|award| award.badge_slug)
                .collect();

            let mut new_badges = Vec::new();
            for slug in newly_earned(&badges, &stats, &held) {
                insert_award(&mut awards, user_id, slug, AwardSource::Threshold)?;
                new_badges.push(slug.to_string());
            }
            if !new_badges.is_empty() {
                tracing::info!("User {} earned badges {:?}", user_id, new_badges);
            }

            AwardOutcome {
                points_awarded,
                stats,
                new_badges,
                replayed: false,
            }
        };
        write_txn.commit()?;
        Ok(outcome)
    }
}
