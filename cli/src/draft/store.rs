//! The active-draft store.
//!
//! [`DraftStore`] keeps at most one draft per user at the canonical key
//! `activeWorkoutDraft:<user>`. Any other key that starts with that string is
//! treated as a duplicate or legacy copy of the same draft and is deleted the
//! next time the store looks at the user's keys.
//!
//! Reads are not pure: [`DraftStore::read`] deletes duplicates and corrupt
//! entries and writes a repaired draft back to the canonical key.
//!
//! The store assumes a single thread of control over the storage region. Two
//! processes interleaving read-then-write against the same region can leave
//! more than one entry behind; the next read reconciles them.

use tracing::{debug, info, warn};

use crate::draft::clock::{Clock, SystemClock};
use crate::draft::error::DraftError;
use crate::draft::types::{to_iso, valid_day_index, Draft, DraftPayload, StoredRecord};
use crate::storage::{KeyValueStore, StorageError};

/// Prefix shared by every draft key.
pub const DRAFT_KEY_PREFIX: &str = "activeWorkoutDraft:";

/// Default age after which a draft counts as stale.
pub const DEFAULT_STALE_AFTER_DAYS: u32 = 7;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Canonical storage key for `user_id`, or `None` for an empty id.
#[must_use]
pub fn key_for(user_id: &str) -> Option<String> {
    if user_id.is_empty() {
        None
    } else {
        Some(format!("{DRAFT_KEY_PREFIX}{user_id}"))
    }
}

/// Whether `draft` exists and is for the given workout.
#[must_use]
#[allow(dead_code)]
pub fn matches(draft: Option<&Draft>, program_id: &str, day_index: u32) -> bool {
    draft.is_some_and(|d| d.matches(program_id, day_index))
}

/// Outcome of [`DraftStore::check_conflict`].
#[derive(Debug, Clone, PartialEq)]
pub struct ConflictCheck {
    /// A draft for a different workout is in the way.
    pub conflict: bool,
    /// The user's current draft, if any.
    pub existing_draft: Option<Draft>,
}

/// Mediates every access to draft keys in a storage region.
#[derive(Debug)]
pub struct DraftStore<S, C = SystemClock> {
    storage: S,
    clock: C,
    diagnostics: bool,
}

impl<S: KeyValueStore> DraftStore<S> {
    /// Creates a store over `storage` using wall-clock time.
    pub const fn with_storage(storage: S) -> Self {
        Self::new(storage, SystemClock)
    }
}

impl<S: KeyValueStore, C: Clock> DraftStore<S, C> {
    /// Creates a store over `storage` that reads time from `clock`.
    pub const fn new(storage: S, clock: C) -> Self {
        Self {
            storage,
            clock,
            diagnostics: false,
        }
    }

    /// Reports canonicalization and conflict events at `info` instead of `debug`.
    #[must_use]
    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = enabled;
        self
    }

    /// The underlying storage region.
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// The clock used for timestamps.
    #[allow(dead_code)]
    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Returns the user's draft, or `None` if there is none.
    ///
    /// Every failure is logged and reported as `None`. Use [`load`](Self::load)
    /// to tell "no draft" apart from a storage failure.
    pub fn read(&self, user_id: &str) -> Option<Draft> {
        match self.load(user_id) {
            Ok(draft) => draft,
            Err(DraftError::MissingUserId) => None,
            Err(e) => {
                warn!(user_id, error = %e, "Could not read workout draft");
                None
            }
        }
    }

    /// Loads and canonicalizes the user's draft.
    ///
    /// Scans every key under the user's prefix, deletes entries that do not
    /// parse, picks the most recently updated entry, deletes the others,
    /// repairs timestamps and writes the result back to the canonical key
    /// when it was repaired or found elsewhere.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::MissingUserId`] for an empty id, or
    /// [`DraftError::Storage`] if the region's keys cannot be enumerated.
    pub fn load(&self, user_id: &str) -> Result<Option<Draft>, DraftError> {
        let canonical_key = key_for(user_id).ok_or(DraftError::MissingUserId)?;
        let candidate_keys = self.family_keys(&canonical_key)?;
        if candidate_keys.is_empty() {
            return Ok(None);
        }

        let mut entries: Vec<(String, StoredRecord)> = Vec::with_capacity(candidate_keys.len());
        for key in &candidate_keys {
            match self.storage.get(key) {
                Ok(Some(raw)) => {
                    if let Some(record) = StoredRecord::parse(&raw) {
                        entries.push((key.clone(), record));
                    } else {
                        debug!(key = %key, "Removing corrupt draft entry");
                        self.remove_logged(key);
                    }
                }
                Ok(None) => {}
                Err(e) => warn!(key = %key, error = %e, "Skipping unreadable draft entry"),
            }
        }

        let Some(selected) = newest(&entries) else {
            return Ok(None);
        };
        let (source_key, record) = entries.swap_remove(selected);

        let (draft, repaired) = record.into_draft(user_id, self.clock.now_millis());
        let mut written_back = source_key == canonical_key;
        if repaired || !written_back {
            match self.persist(&canonical_key, &draft) {
                Ok(()) => written_back = true,
                Err(e) => warn!(user_id, error = %e, "Could not write back canonical draft"),
            }
        }

        // The selected entry is only reaped once a copy sits at the canonical key.
        let mut removed_keys = Vec::new();
        let reap_source = written_back.then_some(&source_key);
        for key in entries.iter().map(|(key, _)| key).chain(reap_source) {
            if key != &canonical_key && self.remove_logged(key) {
                removed_keys.push(key.as_str());
            }
        }

        if candidate_keys.len() > 1 {
            self.report(
                "Draft canonicalization",
                user_id,
                &canonical_key,
                &removed_keys,
                Some(&source_key),
            );
        }

        Ok(Some(draft))
    }

    /// Stores `payload` as the user's draft and reports whether it was saved.
    ///
    /// Every failure is logged and reported as `false`. Use
    /// [`save`](Self::save) to learn why a write failed.
    #[allow(dead_code)]
    pub fn write(&self, user_id: &str, payload: DraftPayload) -> bool {
        match self.save(user_id, payload) {
            Ok(_) => true,
            Err(e) => {
                warn!(user_id, error = %e, "Could not save workout draft");
                false
            }
        }
    }

    /// Stores `payload` as the user's draft at the canonical key.
    ///
    /// `createdAt` and a valid `dayIndex` are carried over from the draft
    /// already at the canonical key. An invalid `dayIndex` in the payload is
    /// replaced by the previous one; without a previous one nothing is
    /// written. Every other key under the user's prefix is deleted.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::MissingUserId`], [`DraftError::InvalidDayIndex`]
    /// when no usable day index exists, or [`DraftError::Storage`] if the
    /// region rejects the write or the cleanup.
    pub fn save(&self, user_id: &str, payload: DraftPayload) -> Result<Draft, DraftError> {
        let canonical_key = key_for(user_id).ok_or(DraftError::MissingUserId)?;
        let now = self.clock.now_millis();

        let existing = match self.storage.get(&canonical_key) {
            Ok(raw) => raw.as_deref().and_then(StoredRecord::parse),
            Err(e) => {
                debug!(user_id, error = %e, "Ignoring unreadable existing draft");
                None
            }
        };
        let created_at = existing
            .as_ref()
            .and_then(StoredRecord::created_at)
            .unwrap_or(now);
        let fallback_day = existing.as_ref().and_then(StoredRecord::day_index);

        let day_index = match payload.day_index.as_ref().and_then(valid_day_index) {
            Some(day) => day,
            None => {
                let requested = payload
                    .day_index
                    .as_ref()
                    .map_or_else(|| "(missing)".to_string(), ToString::to_string);
                match fallback_day {
                    Some(day) => {
                        debug!(user_id, requested = %requested, repaired = day, "Repairing draft day index");
                        day
                    }
                    None => return Err(DraftError::InvalidDayIndex(requested)),
                }
            }
        };

        let updated_at_iso = to_iso(now)
            .ok_or_else(|| DraftError::Serialization(format!("timestamp {now} out of range")))?;
        let draft = payload.into_draft(user_id, day_index, created_at, now, updated_at_iso);

        self.persist(&canonical_key, &draft)?;

        let mut removed_keys = Vec::new();
        for key in self.family_keys(&canonical_key)? {
            if key != canonical_key {
                self.storage.remove(&key)?;
                removed_keys.push(key);
            }
        }

        if !removed_keys.is_empty() {
            let removed: Vec<&str> = removed_keys.iter().map(String::as_str).collect();
            self.report("Draft write cleanup", user_id, &canonical_key, &removed, None);
        }

        Ok(draft)
    }

    /// Removes the user's canonical draft. No-op for an empty id.
    pub fn clear(&self, user_id: &str) {
        if let Some(key) = key_for(user_id) {
            self.remove_logged(&key);
        }
    }

    /// Whether `draft` was last updated more than `threshold_days` ago.
    pub fn is_stale(&self, draft: Option<&Draft>, threshold_days: u32) -> bool {
        draft.is_some_and(|d| {
            self.clock.now_millis().saturating_sub(d.updated_at)
                > i64::from(threshold_days) * MILLIS_PER_DAY
        })
    }

    /// "today", "yesterday" or "N days ago"; empty without a draft.
    pub fn age_description(&self, draft: Option<&Draft>) -> String {
        let Some(draft) = draft else {
            return String::new();
        };

        let age = self.clock.now_millis().saturating_sub(draft.updated_at).max(0);
        match age / MILLIS_PER_DAY {
            0 => "today".to_string(),
            1 => "yesterday".to_string(),
            days => format!("{days} days ago"),
        }
    }

    /// Checks whether starting `(program_id, day_index)` would replace a
    /// draft for a different workout.
    ///
    /// Never writes a new draft; the caller decides whether to overwrite.
    pub fn check_conflict(&self, user_id: &str, program_id: &str, day_index: u32) -> ConflictCheck {
        let Some(existing) = self.read(user_id) else {
            return ConflictCheck {
                conflict: false,
                existing_draft: None,
            };
        };

        if existing.matches(program_id, day_index) {
            return ConflictCheck {
                conflict: false,
                existing_draft: Some(existing),
            };
        }

        if self.diagnostics {
            info!(
                user_id,
                existing_program = existing.program_id.as_deref().unwrap_or_default(),
                existing_day = existing.day_index,
                attempted_program = program_id,
                attempted_day = day_index,
                "Existing draft is for a different workout"
            );
        } else {
            debug!(user_id, attempted_program = program_id, attempted_day = day_index, "Draft conflict");
        }

        ConflictCheck {
            conflict: true,
            existing_draft: Some(existing),
        }
    }

    fn family_keys(&self, canonical_key: &str) -> Result<Vec<String>, StorageError> {
        Ok(self
            .storage
            .keys()?
            .into_iter()
            .filter(|key| key.starts_with(canonical_key))
            .collect())
    }

    fn persist(&self, key: &str, draft: &Draft) -> Result<(), DraftError> {
        let json = serde_json::to_string(draft)?;
        self.storage.set(key, &json)?;
        Ok(())
    }

    /// Removes `key`, logging failures. Returns whether the removal succeeded.
    fn remove_logged(&self, key: &str) -> bool {
        match self.storage.remove(key) {
            Ok(()) => true,
            Err(e) => {
                warn!(key, error = %e, "Could not remove draft entry");
                false
            }
        }
    }

    fn report(
        &self,
        event: &str,
        user_id: &str,
        canonical_key: &str,
        removed_keys: &[&str],
        selected_from: Option<&str>,
    ) {
        if self.diagnostics {
            info!(user_id, canonical_key, ?removed_keys, ?selected_from, "{event}");
        } else {
            debug!(user_id, canonical_key, ?removed_keys, ?selected_from, "{event}");
        }
    }
}

/// Index of the most recently updated entry; ties keep the earliest.
fn newest(entries: &[(String, StoredRecord)]) -> Option<usize> {
    let mut best: Option<(usize, i64)> = None;
    for (index, (_, record)) in entries.iter().enumerate() {
        let recency = record.recency();
        if best.map_or(true, |(_, top)| recency > top) {
            best = Some((index, recency));
        }
    }
    best.map(|(index, _)| index)
}
