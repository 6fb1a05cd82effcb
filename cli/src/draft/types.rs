//! Workout draft data types.
//!
//! A [`Draft`] is the normalized record handed to callers. Stored entries are
//! read through [`StoredRecord`], which tolerates missing or mistyped fields
//! so that damaged entries can be repaired instead of discarded.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Schema version written into every draft.
pub const DRAFT_VERSION: u32 = 1;

/// Fields owned by the store; payload values under these names are ignored.
const MANAGED_FIELDS: [&str; 5] = ["userId", "version", "createdAt", "updatedAt", "updatedAtISO"];

/// An in-progress workout session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    /// Owner of the draft.
    pub user_id: String,

    /// Program the workout belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program_id: Option<String>,

    /// Day within the program.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_index: Option<u32>,

    /// Display name of the program.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program_name: Option<String>,

    /// Display name of the day.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_name: Option<String>,

    /// Schema version.
    pub version: u32,

    /// First write, epoch milliseconds. Never changes afterwards.
    pub created_at: i64,

    /// Latest write, epoch milliseconds.
    pub updated_at: i64,

    /// `updated_at` rendered as an ISO-8601 string.
    #[serde(rename = "updatedAtISO")]
    pub updated_at_iso: String,

    /// Caller-owned fields (sets logged, timer state, ...), kept as-is.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Draft {
    /// Whether this draft is for the given workout.
    #[must_use]
    pub fn matches(&self, program_id: &str, day_index: u32) -> bool {
        self.program_id.as_deref() == Some(program_id) && self.day_index == Some(day_index)
    }

    /// Human-readable "program — day" label.
    #[must_use]
    pub fn label(&self) -> String {
        let program = self
            .program_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or("Workout");
        let day = match self.day_name.as_deref().filter(|name| !name.is_empty()) {
            Some(name) => name.to_string(),
            None => format!("Day {}", u64::from(self.day_index.unwrap_or(0)) + 1),
        };
        format!("{program} — {day}")
    }
}

/// What a caller asks to store as the active draft.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftPayload {
    /// Program the workout belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program_id: Option<String>,

    /// Requested day index. Kept raw so invalid input can be repaired or rejected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_index: Option<Value>,

    /// Display name of the program.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program_name: Option<String>,

    /// Display name of the day.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_name: Option<String>,

    /// Caller-owned fields.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl DraftPayload {
    /// Creates a payload for the given workout.
    #[must_use]
    pub fn new(program_id: impl Into<String>, day_index: impl Into<Value>) -> Self {
        Self {
            program_id: Some(program_id.into()),
            day_index: Some(day_index.into()),
            ..Self::default()
        }
    }

    /// Sets the program display name.
    #[must_use]
    pub fn with_program_name(mut self, name: impl Into<String>) -> Self {
        self.program_name = Some(name.into());
        self
    }

    /// Sets the day display name.
    #[must_use]
    pub fn with_day_name(mut self, name: impl Into<String>) -> Self {
        self.day_name = Some(name.into());
        self
    }

    /// Adds a caller-owned field.
    #[must_use]
    #[allow(dead_code)]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Merges every entry of a JSON object into the caller-owned fields.
    #[must_use]
    pub fn with_fields(mut self, fields: Map<String, Value>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Builds the stored draft. `day_index` has already been validated.
    pub(crate) fn into_draft(
        self,
        user_id: &str,
        day_index: u32,
        created_at: i64,
        updated_at: i64,
        updated_at_iso: String,
    ) -> Draft {
        let mut fields = self.fields;
        for key in MANAGED_FIELDS {
            fields.remove(key);
        }

        Draft {
            user_id: user_id.to_string(),
            program_id: self.program_id,
            day_index: Some(day_index),
            program_name: self.program_name,
            day_name: self.day_name,
            version: DRAFT_VERSION,
            created_at,
            updated_at,
            updated_at_iso,
            fields,
        }
    }
}

/// A stored entry as found in the storage region, before repair.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord(Map<String, Value>);

impl StoredRecord {
    /// Parses a stored value. Anything but a JSON object is corrupt.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => Some(Self(map)),
            _ => None,
        }
    }

    /// `createdAt`, if it is a number.
    #[must_use]
    pub fn created_at(&self) -> Option<i64> {
        self.0.get("createdAt").and_then(millis)
    }

    /// `updatedAt`, if it is a number.
    #[must_use]
    pub fn updated_at(&self) -> Option<i64> {
        self.0.get("updatedAt").and_then(millis)
    }

    /// `dayIndex`, if it is a usable day index.
    #[must_use]
    pub fn day_index(&self) -> Option<u32> {
        self.0.get("dayIndex").and_then(valid_day_index)
    }

    /// Best guess at when this entry was last written, for picking the newest
    /// of several duplicates: `updatedAt`, then `updatedAtISO`, then
    /// `workoutStartTimeISO`, then 0.
    #[must_use]
    pub fn recency(&self) -> i64 {
        self.updated_at()
            .or_else(|| self.iso_field("updatedAtISO"))
            .or_else(|| self.iso_field("workoutStartTimeISO"))
            .unwrap_or(0)
    }

    fn iso_field(&self, key: &str) -> Option<i64> {
        self.0.get(key).and_then(Value::as_str).and_then(parse_iso)
    }

    /// Normalizes the entry into a [`Draft`] for `user_id`.
    ///
    /// Returns the draft and whether anything had to be repaired: a missing
    /// or non-numeric `createdAt` or `updatedAt` becomes `now`, and
    /// `updatedAtISO` is recomputed when it disagrees with `updatedAt`.
    #[must_use]
    pub fn into_draft(self, user_id: &str, now: i64) -> (Draft, bool) {
        let mut repaired = false;

        let created_at = self.created_at().unwrap_or_else(|| {
            repaired = true;
            now
        });

        let updated = self
            .updated_at()
            .and_then(|t| to_iso(t).map(|iso| (t, iso)));
        let (updated_at, expected_iso) = match updated {
            Some(pair) => pair,
            None => {
                repaired = true;
                (now, to_iso(now).unwrap_or_default())
            }
        };

        let day_index = self.day_index();
        let mut fields = self.0;

        let stored_iso = fields.remove("updatedAtISO");
        if stored_iso.as_ref().and_then(Value::as_str) != Some(expected_iso.as_str()) {
            repaired = true;
        }

        let owner = match fields.remove("userId") {
            Some(Value::String(id)) if !id.is_empty() => id,
            _ => {
                repaired = true;
                user_id.to_string()
            }
        };

        let version = fields
            .remove("version")
            .and_then(|v| v.as_u64())
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(DRAFT_VERSION);

        fields.remove("createdAt");
        fields.remove("updatedAt");
        fields.remove("dayIndex");

        let draft = Draft {
            user_id: owner,
            program_id: take_string(&mut fields, "programId"),
            day_index,
            program_name: take_string(&mut fields, "programName"),
            day_name: take_string(&mut fields, "dayName"),
            version,
            created_at,
            updated_at,
            updated_at_iso: expected_iso,
            fields,
        };

        (draft, repaired)
    }
}

/// Removes `key` from `fields` if it holds a string; other values stay put.
fn take_string(fields: &mut Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key) {
        Some(Value::String(_)) => match fields.remove(key) {
            Some(Value::String(s)) => Some(s),
            _ => None,
        },
        _ => None,
    }
}

/// Reads a JSON number as epoch milliseconds, truncating fractions.
fn millis(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.is_finite())
            .map(|f| f.trunc() as i64)
    })
}

/// Accepts non-negative integral JSON numbers that fit a `u32`.
#[must_use]
pub fn valid_day_index(value: &Value) -> Option<u32> {
    if let Some(n) = value.as_u64() {
        return u32::try_from(n).ok();
    }
    value
        .as_f64()
        .filter(|f| f.is_finite() && f.fract() == 0.0 && *f >= 0.0 && *f <= f64::from(u32::MAX))
        .map(|f| f as u32)
}

/// Renders epoch milliseconds like JavaScript's `toISOString`.
#[must_use]
pub fn to_iso(millis: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp_millis(millis).map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Parses an RFC 3339 timestamp into epoch milliseconds.
#[must_use]
pub fn parse_iso(raw: &str) -> Option<i64> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|t| t.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: &Value) -> StoredRecord {
        StoredRecord::parse(&value.to_string()).unwrap()
    }

    #[test]
    fn iso_matches_javascript_format() {
        assert_eq!(to_iso(0).unwrap(), "1970-01-01T00:00:00.000Z");
        assert_eq!(
            to_iso(1_700_000_000_123).unwrap(),
            "2023-11-14T22:13:20.123Z"
        );
    }

    #[test]
    fn parse_iso_reads_offsets() {
        assert_eq!(parse_iso("1970-01-01T00:00:01.500Z"), Some(1_500));
        assert_eq!(parse_iso("1970-01-01T01:00:00+01:00"), Some(0));
        assert_eq!(parse_iso("yesterday"), None);
    }

    #[test]
    fn day_index_validation() {
        assert_eq!(valid_day_index(&json!(0)), Some(0));
        assert_eq!(valid_day_index(&json!(4)), Some(4));
        assert_eq!(valid_day_index(&json!(2.0)), Some(2));
        assert_eq!(valid_day_index(&json!(-1)), None);
        assert_eq!(valid_day_index(&json!(1.5)), None);
        assert_eq!(valid_day_index(&json!("3")), None);
        assert_eq!(valid_day_index(&Value::Null), None);
    }

    #[test]
    fn non_objects_are_corrupt() {
        assert!(StoredRecord::parse("{ nope").is_none());
        assert!(StoredRecord::parse("[1, 2]").is_none());
        assert!(StoredRecord::parse("\"text\"").is_none());
        assert!(StoredRecord::parse("{}").is_some());
    }

    #[test]
    fn recency_falls_back_through_fields() {
        assert_eq!(record(&json!({"updatedAt": 200})).recency(), 200);
        assert_eq!(
            record(&json!({"updatedAt": "soon", "updatedAtISO": "1970-01-01T00:00:00.300Z"}))
                .recency(),
            300
        );
        assert_eq!(
            record(&json!({"workoutStartTimeISO": "1970-01-01T00:00:00.400Z"})).recency(),
            400
        );
        assert_eq!(record(&json!({"updatedAtISO": "garbage"})).recency(), 0);
    }

    #[test]
    fn well_formed_record_needs_no_repair() {
        let stored = json!({
            "userId": "u1",
            "programId": "P1",
            "dayIndex": 2,
            "version": 1,
            "createdAt": 1_000,
            "updatedAt": 2_000,
            "updatedAtISO": "1970-01-01T00:00:02.000Z",
            "sets": [{"reps": 5, "weight": 100}]
        });

        let (draft, repaired) = record(&stored).into_draft("u1", 9_999);

        assert!(!repaired);
        assert_eq!(draft.created_at, 1_000);
        assert_eq!(draft.updated_at, 2_000);
        assert_eq!(draft.day_index, Some(2));
        assert_eq!(draft.fields.get("sets"), stored.get("sets"));
        assert_eq!(serde_json::to_value(&draft).unwrap(), stored);
    }

    #[test]
    fn missing_timestamps_are_repaired_to_now() {
        let (draft, repaired) =
            record(&json!({"userId": "u1", "createdAt": "then"})).into_draft("u1", 5_000);

        assert!(repaired);
        assert_eq!(draft.created_at, 5_000);
        assert_eq!(draft.updated_at, 5_000);
        assert_eq!(draft.updated_at_iso, to_iso(5_000).unwrap());
    }

    #[test]
    fn mismatched_iso_is_recomputed() {
        let (draft, repaired) = record(&json!({
            "userId": "u1",
            "createdAt": 1,
            "updatedAt": 2_000,
            "updatedAtISO": "2001-01-01T00:00:00.000Z"
        }))
        .into_draft("u1", 5_000);

        assert!(repaired);
        assert_eq!(draft.updated_at, 2_000);
        assert_eq!(draft.updated_at_iso, "1970-01-01T00:00:02.000Z");
    }

    #[test]
    fn mistyped_display_fields_stay_in_passthrough() {
        let (draft, _) =
            record(&json!({"programId": 42, "dayIndex": -3})).into_draft("u1", 0);

        assert_eq!(draft.program_id, None);
        assert_eq!(draft.fields.get("programId"), Some(&json!(42)));
        assert_eq!(draft.day_index, None);
        assert!(!draft.fields.contains_key("dayIndex"));
    }

    #[test]
    fn payload_cannot_override_managed_fields() {
        let draft = DraftPayload::new("P1", 0)
            .with_field("createdAt", 1)
            .with_field("userId", "someone-else")
            .with_field("timer", json!({"running": true}))
            .into_draft("u1", 0, 10, 20, to_iso(20).unwrap());

        assert_eq!(draft.user_id, "u1");
        assert_eq!(draft.created_at, 10);
        assert!(!draft.fields.contains_key("createdAt"));
        assert_eq!(draft.fields.get("timer"), Some(&json!({"running": true})));
    }

    #[test]
    fn label_uses_names_or_defaults() {
        let mut draft = DraftPayload::new("P1", 2).into_draft("u1", 2, 0, 0, to_iso(0).unwrap());
        assert_eq!(draft.label(), "Workout — Day 3");

        draft.program_name = Some("5x5".to_string());
        draft.day_name = Some("Heavy".to_string());
        assert_eq!(draft.label(), "5x5 — Heavy");
    }

    #[test]
    fn matches_compares_program_and_day() {
        let draft = DraftPayload::new("P1", 0).into_draft("u1", 0, 0, 0, to_iso(0).unwrap());

        assert!(draft.matches("P1", 0));
        assert!(!draft.matches("P2", 0));
        assert!(!draft.matches("P1", 1));
    }
}
