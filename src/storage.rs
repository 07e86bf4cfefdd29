//! Object-storage key layout for uploaded event assets.
//!
//! The key shape is a string contract shared with the upload handler and the
//! CDN path resolver: `<year>/<month>/<eventId>/<category>/<millis>-<8hex><ext>`.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rand::Rng;

pub const DEFAULT_ASSET_CATEGORY: &str = "poster";

/// Destination for one uploaded asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPaths {
    /// Full object key, `{folder_path}/{unique file name}`.
    pub key: String,
    /// Deterministic prefix shared by all assets of one event/category.
    pub folder_path: String,
}

/// Composes the storage destination for an event asset.
///
/// The folder path is fully determined by the inputs; the file name carries
/// the current epoch milliseconds plus a random hex suffix so concurrent
/// uploads for the same event and category in the same millisecond cannot
/// collide.
///
/// `event_date` is not validated. An unparseable date yields literal `NaN`
/// year and month segments; callers are expected to validate the date before
/// asking for a key.
#[must_use]
pub fn event_asset_paths(
    event_id: &str,
    original_file_name: &str,
    event_date: &str,
    category: &str,
) -> AssetPaths {
    let (year, month) = match parse_year_month(event_date) {
        Some((y, m)) => (format!("{y:04}"), format!("{m:02}")),
        None => ("NaN".to_string(), "NaN".to_string()),
    };

    let folder_path = format!("{year}/{month}/{event_id}/{category}");

    let extension = file_extension(original_file_name);
    let suffix: u32 = rand::rng().random();
    let file_name = format!("{}-{suffix:08x}{extension}", Utc::now().timestamp_millis());

    AssetPaths {
        key: format!("{folder_path}/{file_name}"),
        folder_path,
    }
}

/// Extension including the leading dot, or empty if the name has none.
fn file_extension(name: &str) -> &str {
    name.rfind('.').map_or("", |idx| &name[idx..])
}

fn parse_year_month(event_date: &str) -> Option<(i32, u32)> {
    if let Ok(date) = NaiveDate::parse_from_str(event_date, "%Y-%m-%d") {
        return Some((date.year(), date.month()));
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(event_date) {
        return Some((datetime.year(), datetime.month()));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folder_path_is_deterministic() {
        let paths = event_asset_paths("E1", "poster.png", "2024-03-15", "banner");
        assert_eq!(paths.folder_path, "2024/03/E1/banner");
        assert!(paths.key.starts_with("2024/03/E1/banner/"));
    }

    #[test]
    fn key_matches_contract_shape() {
        let paths = event_asset_paths("E1", "poster.png", "2024-03-15", "banner");
        let file_name = paths.key.rsplit('/').next().unwrap();

        let (millis, rest) = file_name.split_once('-').unwrap();
        assert!(millis.chars().all(|c| c.is_ascii_digit()));

        let suffix = rest.strip_suffix(".png").unwrap();
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn identical_inputs_produce_distinct_keys() {
        let a = event_asset_paths("E1", "poster.png", "2024-03-15", "poster");
        let b = event_asset_paths("E1", "poster.png", "2024-03-15", "poster");
        assert_eq!(a.folder_path, b.folder_path);
        assert_ne!(a.key, b.key);
    }

    #[test]
    fn extension_less_names_get_no_extension() {
        let paths = event_asset_paths("E1", "README", "2024-03-15", "poster");
        assert!(!paths.key.contains('.'));
    }

    #[test]
    fn rfc3339_event_dates_are_accepted() {
        let paths = event_asset_paths("E1", "a.jpg", "2023-11-02T09:30:00Z", "poster");
        assert_eq!(paths.folder_path, "2023/11/E1/poster");
    }

    #[test]
    fn malformed_event_date_yields_nan_segments() {
        let paths = event_asset_paths("E1", "a.jpg", "not-a-date", "poster");
        assert_eq!(paths.folder_path, "NaN/NaN/E1/poster");
        assert!(paths.key.starts_with("NaN/NaN/E1/poster/"));
    }
}
