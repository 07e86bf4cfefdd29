//! Record identifier generation.

use std::sync::{Mutex, OnceLock};
use uuid::{ContextV7, Timestamp, Uuid};

static CONTEXT: OnceLock<Mutex<ContextV7>> = OnceLock::new();

/// Returns a fresh UUIDv7 for a new row.
///
/// The millisecond timestamp prefix makes ids sort consistently with
/// creation order, so primary-key order doubles as chronological order
/// without a separate timestamp column. A shared [`ContextV7`] keeps ids
/// generated within the same millisecond ordered as well.
#[must_use]
pub fn new_record_id() -> Uuid {
    let context = CONTEXT
        .get_or_init(|| Mutex::new(ContextV7::new()))
        .lock()
        .unwrap();
    Uuid::new_v7(Timestamp::now(&*context))
}
