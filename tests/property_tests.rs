//! Property tests for the normalizer and the date resolver.

use chrono::{Datelike, NaiveDate};
use metanorm::dates;
use metanorm::normalize::normalize_name;
use proptest::prelude::*;

/// Spellings of the same name that must normalize identically.
fn umlaut_variants(base: &str) -> (String, String) {
    let with_umlauts = base
        .replace("oe", "ö")
        .replace("ae", "ä")
        .replace("ue", "ü")
        .replace("ss", "ß");
    (base.to_string(), with_umlauts)
}

proptest! {
    #[test]
    fn normalize_is_idempotent(input in "\\PC*") {
        let once = normalize_name(&input);
        prop_assert_eq!(normalize_name(&once), once);
    }

    #[test]
    fn normalize_ignores_case_and_outer_whitespace(input in "[a-zA-ZäöüÄÖÜß ]{0,40}") {
        let padded = format!("  {}  ", input.to_uppercase());
        prop_assert_eq!(normalize_name(&padded), normalize_name(&input));
    }

    #[test]
    fn normalize_folds_umlauts_to_digraphs(base in "[a-z]{0,6}(oe|ae|ue|ss)[a-z]{0,6}") {
        let (digraph, umlauted) = umlaut_variants(&base);
        prop_assert_eq!(normalize_name(&digraph), normalize_name(&umlauted));
    }

    #[test]
    fn year_month_end_matches_calendar(year in 1583i32..3000, month in 1u32..13) {
        let raw = format!("{year:04}-{month:02}");
        let resolved = dates::resolve_granular(&raw, true).expect("valid year-month");

        // chrono is the oracle for the last day of the month
        let expected_day = {
            let first_next = if month == 12 {
                NaiveDate::from_ymd_opt(year + 1, 1, 1)
            } else {
                NaiveDate::from_ymd_opt(year, month + 1, 1)
            }
            .unwrap();
            first_next.pred_opt().unwrap().day()
        };
        prop_assert_eq!(resolved, format!("{year:04}-{month:02}-{expected_day:02}"));

        let parsed = NaiveDate::parse_from_str(
            &dates::resolve_granular(&raw, true).unwrap(),
            "%Y-%m-%d",
        );
        prop_assert!(parsed.is_ok());
    }

    #[test]
    fn year_month_start_is_first_day(year in 1583i32..3000, month in 1u32..13) {
        let raw = format!("{year:04}-{month:02}");
        prop_assert_eq!(
            dates::resolve_granular(&raw, false),
            Some(format!("{year:04}-{month:02}-01"))
        );
    }

    #[test]
    fn out_of_range_month_always_rejected(year in 1000i32..3000, month in 13u32..100) {
        let raw = format!("{year:04}-{month:02}");
        prop_assert_eq!(dates::resolve_granular(&raw, false), None);
        prop_assert_eq!(dates::resolve_granular(&raw, true), None);
    }

    #[test]
    fn full_dates_pass_through_unchanged(year in 1583i32..3000, month in 1u32..13, day in 1u32..29) {
        let raw = format!("{year:04}-{month:02}-{day:02}");
        prop_assert_eq!(dates::resolve_granular(&raw, true), Some(raw.clone()));
        prop_assert_eq!(dates::resolve_granular(&raw, false), Some(raw));
    }
}
