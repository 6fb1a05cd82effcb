//! Active workout draft management.
//!
//! This module keeps exactly one resumable in-progress workout per user:
//! - [`DraftStore`] - Reads, writes, repairs and canonicalizes drafts
//! - [`Draft`] / [`DraftPayload`] - Stored record and caller input
//! - [`Clock`] - Time source for draft timestamps

pub mod clock;
pub mod error;
pub mod store;
pub mod types;

#[allow(unused_imports)]
pub use clock::{Clock, SystemClock};
pub use error::DraftError;
#[allow(unused_imports)]
pub use store::{key_for, matches, ConflictCheck, DraftStore, DEFAULT_STALE_AFTER_DAYS};
#[allow(unused_imports)]
pub use types::{Draft, DraftPayload};
