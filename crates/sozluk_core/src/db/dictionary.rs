//! Generation-scoped dictionary storage backed by redb.
//!
//! Each ingest run writes into a fresh generation. Readers only ever see the
//! active generation, and [`DictionaryDb::commit_generation`] switches it in
//! the same transaction that records the new data version.

use super::tables::*;
use super::version::read_marker;
use crate::{error::AppError, models::word::WordRecord, text::fold_turkish};
use redb::{ReadableDatabase, ReadableTable};
use std::collections::{BinaryHeap, HashSet};
use std::sync::Arc;

type WordsTable<'txn> = redb::Table<'txn, (u64, &'static str), &'static [u8]>;
type IndexTable<'txn> = redb::Table<'txn, (u64, &'static str, &'static str), ()>;

/// Word suggestion candidate: `(folded key, display name)`.
pub type Candidate = (String, String);

fn purge_generation_in(
    words: &mut WordsTable<'_>,
    index: &mut IndexTable<'_>,
    generation: u64,
) -> Result<usize, AppError> {
    let upper = generation.saturating_add(1);

    let mut names = Vec::new();
    for entry in words.range((generation, "")..(upper, ""))? {
        let (key, _) = entry?;
        names.push(key.value().1.to_string());
    }
    for name in &names {
        words.remove((generation, name.as_str()))?;
    }

    let mut keys = Vec::new();
    for entry in index.range((generation, "", "")..(upper, "", ""))? {
        let (key, _) = entry?;
        let (_, folded, name) = key.value();
        keys.push((folded.to_string(), name.to_string()));
    }
    for (folded, name) in &keys {
        index.remove((generation, folded.as_str(), name.as_str()))?;
    }

    Ok(names.len())
}

fn first_generation_from(words: &WordsTable<'_>, from: u64) -> Result<Option<u64>, AppError> {
    let mut iter = words.range((from, "")..)?;
    match iter.next() {
        Some(entry) => {
            let (key, _) = entry?;
            Ok(Some(key.value().0))
        }
        None => Ok(None),
    }
}

fn decode_word(bytes: &[u8]) -> Result<WordRecord, AppError> {
    Ok(bincode::deserialize(bytes)?)
}

/// Accessor for the word and autocomplete tables.
pub struct DictionaryDb {
    db: Arc<redb::Database>,
}

impl DictionaryDb {
    /// Initialize dictionary tables if they do not exist yet.
    ///
    /// # Errors
    /// Returns an error when redb transaction/table initialization fails.
    pub fn new(db: Arc<redb::Database>) -> Result<Self, AppError> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(WORDS)?;
        write_txn.open_table(WORDS_BY_KEY)?;
        write_txn.open_table(SYNC_META)?;
        write_txn.commit()?;
        Ok(Self { db })
    }

    /// Generation readers currently see, if any data was committed.
    ///
    /// # Errors
    /// Returns an error when storage access fails.
    pub fn active_generation(&self) -> Result<Option<u64>, AppError> {
        let read_txn = self.db.begin_read()?;
        let meta = read_txn.open_table(SYNC_META)?;
        read_marker(&meta, META_ACTIVE_GENERATION)
    }

    /// Reserve a new, empty generation for an ingest run.
    ///
    /// # Returns
    /// The generation number to pass to [`Self::write_batch`].
    ///
    /// # Errors
    /// Returns an error when storage access fails.
    pub fn begin_generation(&self) -> Result<u64, AppError> {
        let write_txn = self.db.begin_write()?;
        let generation = {
            let mut meta = write_txn.open_table(SYNC_META)?;
            let last = read_marker(&meta, META_LAST_GENERATION)?.unwrap_or(0);
            let active = read_marker(&meta, META_ACTIVE_GENERATION)?.unwrap_or(0);
            let next = last.max(active) + 1;
            meta.insert(META_LAST_GENERATION, next)?;
            next
        };
        write_txn.commit()?;
        Ok(generation)
    }

    /// Write one parsed data file into `generation`.
    ///
    /// A name seen twice keeps the last record.
    ///
    /// # Returns
    /// Number of records written.
    ///
    /// # Errors
    /// Returns an error when `generation` is the active one, or when
    /// serialization or storage fails.
    pub fn write_batch(&self, generation: u64, records: &[WordRecord]) -> Result<usize, AppError> {
        let write_txn = self.db.begin_write()?;
        {
            let meta = write_txn.open_table(SYNC_META)?;
            if read_marker(&meta, META_ACTIVE_GENERATION)? == Some(generation) {
                return Err(AppError::StorageMessage(format!(
                    "Generation {} is active and cannot be written",
                    generation
                )));
            }
        }
        {
            let mut words = write_txn.open_table(WORDS)?;
            let mut index = write_txn.open_table(WORDS_BY_KEY)?;
            for record in records {
                let encoded = bincode::serialize(record)?;
                let folded = record.search_key();
                words.insert((generation, record.name.as_str()), encoded.as_slice())?;
                index.insert((generation, folded.as_str(), record.name.as_str()), ())?;
            }
        }
        write_txn.commit()?;
        Ok(records.len())
    }

    /// Make `generation` the active data set and record `version`.
    ///
    /// The version marker, the autocomplete version tag, and the generation
    /// pointer change together; the superseded generation is purged in the
    /// same transaction.
    ///
    /// # Returns
    /// The generation that was replaced, if any.
    ///
    /// # Errors
    /// Returns an error when storage access fails; nothing changes in that case.
    pub fn commit_generation(&self, generation: u64, version: u64) -> Result<Option<u64>, AppError> {
        let write_txn = self.db.begin_write()?;
        let previous = {
            let mut meta = write_txn.open_table(SYNC_META)?;
            let previous = read_marker(&meta, META_ACTIVE_GENERATION)?;
            meta.insert(META_ACTIVE_GENERATION, generation)?;
            meta.insert(META_DATA_VERSION, version)?;
            meta.insert(META_AUTOCOMPLETE_VERSION, version)?;
            previous
        };
        if let Some(previous) = previous.filter(|previous| *previous != generation) {
            let mut words = write_txn.open_table(WORDS)?;
            let mut index = write_txn.open_table(WORDS_BY_KEY)?;
            let removed = purge_generation_in(&mut words, &mut index, previous)?;
            tracing::debug!(
                "Purged {} words from superseded generation {}",
                removed,
                previous
            );
        }
        write_txn.commit()?;
        Ok(previous)
    }

    /// Drop every row written to an uncommitted `generation`.
    ///
    /// # Returns
    /// Number of word rows removed.
    ///
    /// # Errors
    /// Returns an error when `generation` is active or storage access fails.
    pub fn discard_generation(&self, generation: u64) -> Result<usize, AppError> {
        let write_txn = self.db.begin_write()?;
        let removed = {
            let meta = write_txn.open_table(SYNC_META)?;
            if read_marker(&meta, META_ACTIVE_GENERATION)? == Some(generation) {
                return Err(AppError::StorageMessage(format!(
                    "Refusing to discard active generation {}",
                    generation
                )));
            }
            let mut words = write_txn.open_table(WORDS)?;
            let mut index = write_txn.open_table(WORDS_BY_KEY)?;
            purge_generation_in(&mut words, &mut index, generation)?
        };
        write_txn.commit()?;
        Ok(removed)
    }

    /// Remove rows from every generation except the active one.
    ///
    /// Interrupted ingest runs leave such rows behind; this runs on open.
    ///
    /// # Returns
    /// Number of word rows removed.
    ///
    /// # Errors
    /// Returns an error when storage access fails.
    pub fn purge_inactive(&self) -> Result<usize, AppError> {
        let write_txn = self.db.begin_write()?;
        let removed = {
            let meta = write_txn.open_table(SYNC_META)?;
            let active = read_marker(&meta, META_ACTIVE_GENERATION)?;
            let mut words = write_txn.open_table(WORDS)?;
            let mut index = write_txn.open_table(WORDS_BY_KEY)?;
            let mut removed = 0;
            let mut cursor = 0;
            while let Some(generation) = first_generation_from(&words, cursor)? {
                if Some(generation) != active {
                    removed += purge_generation_in(&mut words, &mut index, generation)?;
                }
                match generation.checked_add(1) {
                    Some(next) => cursor = next,
                    None => break,
                }
            }
            removed
        };
        write_txn.commit()?;
        Ok(removed)
    }

    /// Delete all dictionary data and reset the version markers.
    ///
    /// The generation counter survives so numbers are never reused.
    ///
    /// # Errors
    /// Returns an error when storage access fails.
    pub fn clear(&self) -> Result<(), AppError> {
        let write_txn = self.db.begin_write()?;
        write_txn.delete_table(WORDS)?;
        write_txn.delete_table(WORDS_BY_KEY)?;
        write_txn.open_table(WORDS)?;
        write_txn.open_table(WORDS_BY_KEY)?;
        {
            let mut meta = write_txn.open_table(SYNC_META)?;
            meta.remove(META_ACTIVE_GENERATION)?;
            meta.remove(META_DATA_VERSION)?;
            meta.remove(META_AUTOCOMPLETE_VERSION)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Fetch an entry from the active generation.
    ///
    /// An exact name match wins; otherwise the first entry whose folded key
    /// equals the folded `name` is returned.
    ///
    /// # Returns
    /// `Ok(None)` when nothing matches or no data was committed.
    ///
    /// # Errors
    /// Returns an error when storage access or deserialization fails.
    pub fn get(&self, name: &str) -> Result<Option<WordRecord>, AppError> {
        let read_txn = self.db.begin_read()?;
        let meta = read_txn.open_table(SYNC_META)?;
        let Some(generation) = read_marker(&meta, META_ACTIVE_GENERATION)? else {
            return Ok(None);
        };
        let words = read_txn.open_table(WORDS)?;
        let trimmed = name.trim();
        if let Some(value) = words.get((generation, trimmed))? {
            return Ok(Some(decode_word(value.value())?));
        }

        let folded = fold_turkish(trimmed);
        if folded.is_empty() {
            return Ok(None);
        }
        let index = read_txn.open_table(WORDS_BY_KEY)?;
        let mut iter = index.range((generation, folded.as_str(), "")..)?;
        let Some(entry) = iter.next() else {
            return Ok(None);
        };
        let (key, _) = entry?;
        let (key_generation, key_folded, key_name) = key.value();
        if key_generation != generation || key_folded != folded {
            return Ok(None);
        }
        match words.get((generation, key_name))? {
            Some(value) => Ok(Some(decode_word(value.value())?)),
            None => Ok(None),
        }
    }

    /// Count entries in the active generation.
    ///
    /// # Errors
    /// Returns an error when storage access fails.
    pub fn word_count(&self) -> Result<u64, AppError> {
        let read_txn = self.db.begin_read()?;
        let meta = read_txn.open_table(SYNC_META)?;
        let Some(generation) = read_marker(&meta, META_ACTIVE_GENERATION)? else {
            return Ok(0);
        };
        let words = read_txn.open_table(WORDS)?;
        let mut count = 0;
        for entry in words.range((generation, "")..(generation.saturating_add(1), ""))? {
            entry?;
            count += 1;
        }
        Ok(count)
    }

    /// The `limit` best index entries whose folded key starts with `folded_prefix`.
    ///
    /// Seeks straight to the prefix and walks the whole matching range,
    /// keeping a bounded max-heap on `(key length, key, name)` so short words
    /// win even when thousands of longer keys sort before them.
    /// Results come back in ranked order.
    ///
    /// # Errors
    /// Returns an error when storage access fails.
    pub fn prefix_candidates(
        &self,
        folded_prefix: &str,
        limit: usize,
    ) -> Result<Vec<Candidate>, AppError> {
        let read_txn = self.db.begin_read()?;
        let meta = read_txn.open_table(SYNC_META)?;
        let Some(generation) = read_marker(&meta, META_ACTIVE_GENERATION)? else {
            return Ok(Vec::new());
        };
        if limit == 0 {
            return Ok(Vec::new());
        }
        let index = read_txn.open_table(WORDS_BY_KEY)?;
        let mut best: BinaryHeap<(usize, String, String)> = BinaryHeap::with_capacity(limit + 1);
        for entry in index.range((generation, folded_prefix, "")..)? {
            let (key, _) = entry?;
            let (key_generation, folded, name) = key.value();
            if key_generation != generation || !folded.starts_with(folded_prefix) {
                break;
            }
            let length = folded.chars().count();
            if best.len() == limit {
                let beats_worst = best.peek().is_some_and(|(worst_len, worst_key, worst_name)| {
                    (length, folded, name) < (*worst_len, worst_key.as_str(), worst_name.as_str())
                });
                if !beats_worst {
                    continue;
                }
                best.pop();
            }
            best.push((length, folded.to_string(), name.to_string()));
        }
        Ok(best
            .into_sorted_vec()
            .into_iter()
            .map(|(_, folded, name)| (folded, name))
            .collect())
    }

    /// Index entries whose folded key contains `folded_needle` past position 0.
    ///
    /// Walks the word-name index of the active generation, skipping names in
    /// `exclude`, until `limit` matches are found or `scan_cap` index entries
    /// have been inspected.
    ///
    /// # Errors
    /// Returns an error when storage access fails.
    pub fn substring_candidates(
        &self,
        folded_needle: &str,
        exclude: &HashSet<String>,
        limit: usize,
        scan_cap: usize,
    ) -> Result<Vec<Candidate>, AppError> {
        let read_txn = self.db.begin_read()?;
        let meta = read_txn.open_table(SYNC_META)?;
        let Some(generation) = read_marker(&meta, META_ACTIVE_GENERATION)? else {
            return Ok(Vec::new());
        };
        let index = read_txn.open_table(WORDS_BY_KEY)?;
        let mut candidates = Vec::new();
        if limit == 0 {
            return Ok(candidates);
        }
        let upper = generation.saturating_add(1);
        for entry in index
            .range((generation, "", "")..(upper, "", ""))?
            .take(scan_cap)
        {
            let (key, _) = entry?;
            let (_, folded, name) = key.value();
            if folded.starts_with(folded_needle) || !folded.contains(folded_needle) {
                continue;
            }
            if exclude.contains(name) {
                continue;
            }
            candidates.push((folded.to_string(), name.to_string()));
            if candidates.len() >= limit {
                break;
            }
        }
        Ok(candidates)
    }
}
