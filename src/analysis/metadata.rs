//! Run metadata encoded in folder names.

use crate::models::RunMetadata;
use regex::Regex;
use std::sync::LazyLock;

static ISLET_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"H\d+").unwrap());
static GLUCOSE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"G\d+").unwrap());
static CAPILLARY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)_capilares").unwrap());

/// Extract islet, glucose level and capillary count from a folder name.
///
/// Each field is searched independently; the first match wins.
pub fn extract_metadata(folder: &str) -> RunMetadata {
    let islet = ISLET_RE.find(folder).map(|m| m.as_str().to_string());
    let glucose = GLUCOSE_RE.find(folder).map(|m| m.as_str().to_string());
    let capillaries = CAPILLARY_RE
        .captures(folder)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<i64>().ok());

    RunMetadata {
        folder: folder.to_string(),
        islet,
        glucose,
        capillaries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_folder_name() {
        let meta = extract_metadata("H51_G6_10_capilares");
        assert_eq!(meta.folder, "H51_G6_10_capilares");
        assert_eq!(meta.islet.as_deref(), Some("H51"));
        assert_eq!(meta.glucose.as_deref(), Some("G6"));
        assert_eq!(meta.capillaries, Some(10));
    }

    #[test]
    fn test_fields_are_independent() {
        let meta = extract_metadata("run_G11");
        assert_eq!(meta.islet, None);
        assert_eq!(meta.glucose.as_deref(), Some("G11"));
        assert_eq!(meta.capillaries, None);

        let meta = extract_metadata("H52_5_capilares");
        assert_eq!(meta.islet.as_deref(), Some("H52"));
        assert_eq!(meta.glucose, None);
        assert_eq!(meta.capillaries, Some(5));
    }

    #[test]
    fn test_first_match_wins() {
        let meta = extract_metadata("H51_H52_G6_G7");
        assert_eq!(meta.islet.as_deref(), Some("H51"));
        assert_eq!(meta.glucose.as_deref(), Some("G6"));
    }

    #[test]
    fn test_capillaries_take_all_leading_digits() {
        let meta = extract_metadata("H51_G6_120_capilares_v2");
        assert_eq!(meta.capillaries, Some(120));
    }

    #[test]
    fn test_capillary_overflow_is_null() {
        let meta = extract_metadata("H51_99999999999999999999999_capilares");
        assert_eq!(meta.capillaries, None);
    }

    #[test]
    fn test_no_metadata() {
        let meta = extract_metadata("results");
        assert_eq!(meta.islet, None);
        assert_eq!(meta.glucose, None);
        assert_eq!(meta.capillaries, None);
    }
}
