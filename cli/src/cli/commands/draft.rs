//! Draft command handlers for the liftlog CLI.
//!
//! This module implements the draft management commands:
//! - [`handle_show`] - Show the active draft (`liftlog draft show`)
//! - [`handle_save`] - Save the active draft (`liftlog draft save`)
//! - [`handle_check`] - Report draft conflicts (`liftlog draft check`)
//! - [`handle_clear`] - Discard the active draft (`liftlog draft clear`)
//!
//! Every handler goes through [`DraftStore`]; nothing here touches draft keys
//! directly.

use serde_json::Value;

use crate::config::{load_config, LiftlogConfig};
use crate::draft::{Clock, DraftPayload, DraftStore};
use crate::error::{AppError, Result};
use crate::storage::{FileStore, KeyValueStore};

/// Arguments of `liftlog draft save`.
#[derive(Debug, Clone, Default)]
pub struct SaveRequest {
    pub program_id: String,
    pub day_index: i64,
    pub program_name: Option<String>,
    pub day_name: Option<String>,
    pub data: Option<String>,
    pub force: bool,
}

/// Opens the draft store described by the configuration.
pub fn open_store(config: &LiftlogConfig) -> Result<DraftStore<FileStore>> {
    let quota = Some(config.storage.quota_bytes);
    let storage = match config.storage.file_override() {
        Some(path) => FileStore::at(path, quota),
        None => FileStore::new(quota)?,
    };
    Ok(DraftStore::with_storage(storage).with_diagnostics(config.drafts.diagnostics))
}

fn require_user(user: Option<String>) -> Result<String> {
    user.filter(|u| !u.trim().is_empty())
        .ok_or_else(|| AppError::InvalidInput("a user id is required (--user or LIFTLOG_USER)".to_string()))
}

/// Handles the `liftlog draft show` command.
///
/// # Errors
///
/// Returns an error if no user is given, the configuration cannot be read,
/// or the storage region cannot be reached.
pub fn handle_show(user: Option<String>) -> Result<()> {
    let user = require_user(user)?;
    let config = load_config()?;
    let store = open_store(&config)?;
    show(&store, &user, config.drafts.stale_after_days)
}

fn show<S: KeyValueStore, C: Clock>(
    store: &DraftStore<S, C>,
    user: &str,
    stale_after_days: u32,
) -> Result<()> {
    let Some(draft) = store.load(user)? else {
        println!("No active draft.");
        println!("\nStart one with: liftlog draft save --program <id> --day <n>");
        return Ok(());
    };

    println!("Active draft: {}", draft.label());
    println!("  Updated: {} ({})", draft.updated_at_iso, store.age_description(Some(&draft)));
    if store.is_stale(Some(&draft), stale_after_days) {
        println!("  This draft is older than {stale_after_days} day(s); consider clearing it.");
    }
    println!();
    println!("{}", serde_json::to_string_pretty(&draft)?);

    Ok(())
}

/// Handles the `liftlog draft save` command.
///
/// # Errors
///
/// Returns an error if the input is invalid, a draft for a different workout
/// exists and `force` is not set, or the draft cannot be stored.
pub fn handle_save(user: Option<String>, request: SaveRequest) -> Result<()> {
    let user = require_user(user)?;
    let config = load_config()?;
    let store = open_store(&config)?;
    save(&store, &user, request)
}

fn save<S: KeyValueStore, C: Clock>(
    store: &DraftStore<S, C>,
    user: &str,
    request: SaveRequest,
) -> Result<()> {
    let mut payload = DraftPayload::new(request.program_id.clone(), request.day_index);
    if let Some(name) = request.program_name {
        payload = payload.with_program_name(name);
    }
    if let Some(name) = request.day_name {
        payload = payload.with_day_name(name);
    }
    if let Some(raw) = request.data {
        match serde_json::from_str::<Value>(&raw)? {
            Value::Object(fields) => payload = payload.with_fields(fields),
            _ => {
                return Err(AppError::InvalidInput(
                    "--data must be a JSON object".to_string(),
                ))
            }
        }
    }

    // An invalid day is replaced by the stored draft's day, so the conflict
    // check runs against the identity that would actually be written.
    let effective_day = match u32::try_from(request.day_index) {
        Ok(day) => Some(day),
        Err(_) => {
            let fallback = store.read(user).and_then(|d| d.day_index);
            if let Some(day) = fallback {
                payload.day_index = Some(Value::from(day));
            }
            fallback
        }
    };

    if let Some(day) = effective_day {
        let check = store.check_conflict(user, &request.program_id, day);
        if check.conflict {
            if !request.force {
                let existing = check
                    .existing_draft
                    .map(|d| d.label())
                    .unwrap_or_default();
                return Err(AppError::DraftConflict { existing });
            }
            store.clear(user);
        }
    }

    let draft = store.save(user, payload)?;
    println!("Saved draft: {}", draft.label());

    Ok(())
}

/// Handles the `liftlog draft check` command.
///
/// # Errors
///
/// Returns an error if the input is invalid or the configuration cannot be read.
pub fn handle_check(user: Option<String>, program_id: &str, day_index: i64) -> Result<()> {
    let user = require_user(user)?;
    let day = u32::try_from(day_index)
        .map_err(|_| AppError::InvalidInput(format!("day must be a non-negative integer, got {day_index}")))?;
    let config = load_config()?;
    let store = open_store(&config)?;

    let check = store.check_conflict(&user, program_id, day);
    match (check.conflict, check.existing_draft) {
        (_, None) => println!("No active draft. Ready to start."),
        (false, Some(draft)) => println!("Draft matches: resume {}.", draft.label()),
        (true, Some(draft)) => {
            println!(
                "Conflict: a draft for {} ({}) is in progress.",
                draft.label(),
                store.age_description(Some(&draft))
            );
            println!("\nClear it with: liftlog draft clear");
        }
    }

    Ok(())
}

/// Handles the `liftlog draft clear` command.
///
/// # Errors
///
/// Returns an error if no user is given or the configuration cannot be read.
pub fn handle_clear(user: Option<String>) -> Result<()> {
    let user = require_user(user)?;
    let config = load_config()?;
    let store = open_store(&config)?;

    store.clear(&user);
    println!("Draft cleared.");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::clock::ManualClock;
    use crate::draft::DraftError;
    use crate::storage::MemoryStore;

    fn create_test_store() -> DraftStore<MemoryStore, ManualClock> {
        DraftStore::new(MemoryStore::new(), ManualClock::at(1_700_000_000_000))
    }

    fn request(program: &str, day: i64) -> SaveRequest {
        SaveRequest {
            program_id: program.to_string(),
            day_index: day,
            ..SaveRequest::default()
        }
    }

    #[test]
    fn require_user_rejects_blank() {
        assert!(require_user(None).is_err());
        assert!(require_user(Some("  ".to_string())).is_err());
        assert_eq!(require_user(Some("u1".to_string())).unwrap(), "u1");
    }

    #[test]
    fn save_stores_extra_data() {
        let store = create_test_store();
        let mut req = request("P1", 1);
        req.data = Some(r#"{"sets":[{"weight":80,"reps":8}]}"#.to_string());

        save(&store, "u1", req).unwrap();

        let draft = store.read("u1").unwrap();
        assert_eq!(draft.day_index, Some(1));
        assert!(draft.fields.contains_key("sets"));
    }

    #[test]
    fn save_rejects_non_object_data() {
        let store = create_test_store();
        let mut req = request("P1", 1);
        req.data = Some("[1,2,3]".to_string());

        assert!(matches!(save(&store, "u1", req), Err(AppError::InvalidInput(_))));
        assert!(store.read("u1").is_none());
    }

    #[test]
    fn save_refuses_conflicting_workout_without_force() {
        let store = create_test_store();
        save(&store, "u1", request("P1", 0)).unwrap();

        let err = save(&store, "u1", request("P2", 0)).unwrap_err();
        assert!(matches!(err, AppError::DraftConflict { .. }));
        assert_eq!(store.read("u1").unwrap().program_id.as_deref(), Some("P1"));
    }

    #[test]
    fn forced_save_replaces_conflicting_draft() {
        let store = create_test_store();
        save(&store, "u1", request("P1", 0)).unwrap();
        store.clock().advance(5_000);

        let mut req = request("P2", 0);
        req.force = true;
        save(&store, "u1", req).unwrap();

        let draft = store.read("u1").unwrap();
        assert_eq!(draft.program_id.as_deref(), Some("P2"));
        assert_eq!(draft.created_at, draft.updated_at);
    }

    #[test]
    fn save_same_workout_updates_in_place() {
        let store = create_test_store();
        save(&store, "u1", request("P1", 2)).unwrap();
        store.clock().advance(1_000);
        save(&store, "u1", request("P1", 2)).unwrap();

        let draft = store.read("u1").unwrap();
        assert_eq!(draft.updated_at - draft.created_at, 1_000);
    }

    #[test]
    fn save_invalid_day_repairs_from_existing() {
        let store = create_test_store();
        save(&store, "u1", request("P1", 4)).unwrap();
        save(&store, "u1", request("P1", -1)).unwrap();

        assert_eq!(store.read("u1").unwrap().day_index, Some(4));
    }

    #[test]
    fn save_invalid_day_still_refuses_other_program() {
        let store = create_test_store();
        save(&store, "u1", request("P1", 4)).unwrap();

        let err = save(&store, "u1", request("P2", -1)).unwrap_err();

        assert!(matches!(err, AppError::DraftConflict { .. }));
        let draft = store.read("u1").unwrap();
        assert_eq!(draft.program_id.as_deref(), Some("P1"));
        assert_eq!(draft.day_index, Some(4));
    }

    #[test]
    fn forced_save_with_invalid_day_keeps_previous_day() {
        let store = create_test_store();
        save(&store, "u1", request("P1", 4)).unwrap();

        let mut req = request("P2", -1);
        req.force = true;
        save(&store, "u1", req).unwrap();

        let draft = store.read("u1").unwrap();
        assert_eq!(draft.program_id.as_deref(), Some("P2"));
        assert_eq!(draft.day_index, Some(4));
    }

    #[test]
    fn save_invalid_day_without_draft_is_rejected() {
        let store = create_test_store();

        let err = save(&store, "u1", request("P1", -1)).unwrap_err();

        assert!(matches!(err, AppError::Draft(DraftError::InvalidDayIndex(_))));
        assert!(store.read("u1").is_none());
    }

    #[test]
    fn show_handles_missing_and_present_drafts() {
        let store = create_test_store();
        show(&store, "u1", 7).unwrap();

        save(&store, "u1", request("P1", 0)).unwrap();
        show(&store, "u1", 7).unwrap();
    }
}
