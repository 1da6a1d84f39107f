//! Integration tests for the coordination rules the service is built around:
//! - Download token validity windows and the per-user storage cap
//! - Rewind-on-resume and finish semantics for video progress
//! - Scraper ordering (first full match wins)
//! - Request name normalization and dedup-by-vote

use assert_matches::assert_matches;
use chrono::{DateTime, Duration, Utc};

// ============================================================================
// Download token lifecycle
// ============================================================================

const TOKEN_HOLDING_PERIOD_SECS: i64 = 3 * 60 * 60;
const MAX_STORED_TOKENS: usize = 10;

/// Validity predicate: a token is usable strictly inside its holding period
fn token_is_valid(issued_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now - issued_at < Duration::seconds(TOKEN_HOLDING_PERIOD_SECS)
}

/// Eviction rule: issuing beyond the cap deletes the oldest tokens first
fn evict_beyond_cap(mut issued_at_desc: Vec<i64>) -> Vec<i64> {
    issued_at_desc.sort_by(|a, b| b.cmp(a));
    issued_at_desc.truncate(MAX_STORED_TOKENS);
    issued_at_desc
}

mod token_validity {
    use super::*;

    #[test]
    fn test_fresh_token_is_valid() {
        let now = Utc::now();
        assert!(token_is_valid(now - Duration::minutes(1), now));
    }

    #[test]
    fn test_token_valid_until_holding_period() {
        let now = Utc::now();
        assert!(token_is_valid(
            now - Duration::seconds(TOKEN_HOLDING_PERIOD_SECS - 1),
            now
        ));
    }

    #[test]
    fn test_token_invalid_at_and_after_boundary() {
        let now = Utc::now();
        assert!(!token_is_valid(
            now - Duration::seconds(TOKEN_HOLDING_PERIOD_SECS),
            now
        ));
        assert!(!token_is_valid(now - Duration::days(2), now));
    }

    #[test]
    fn test_expiry_command_matches_validity_predicate() {
        // Whatever the validity predicate rejects, the expiry command may
        // delete; whatever it accepts must survive a sweep.
        let now = Utc::now();
        let ages_secs = [0, 60, TOKEN_HOLDING_PERIOD_SECS - 1, TOKEN_HOLDING_PERIOD_SECS, 999_999];

        for age in ages_secs {
            let issued = now - Duration::seconds(age);
            let survives_sweep = age < TOKEN_HOLDING_PERIOD_SECS;
            assert_eq!(token_is_valid(issued, now), survives_sweep, "age {}", age);
        }
    }
}

mod token_storage_cap {
    use super::*;

    #[test]
    fn test_under_cap_keeps_everything() {
        let kept = evict_beyond_cap(vec![5, 4, 3, 2, 1]);
        assert_eq!(kept.len(), 5);
    }

    #[test]
    fn test_over_cap_drops_oldest() {
        let issued: Vec<i64> = (0..15).collect();
        let kept = evict_beyond_cap(issued);

        assert_eq!(kept.len(), MAX_STORED_TOKENS);
        // Newest survive
        assert!(kept.contains(&14));
        assert!(kept.contains(&5));
        // Oldest are gone
        assert!(!kept.contains(&4));
        assert!(!kept.contains(&0));
    }

    #[test]
    fn test_exactly_at_cap() {
        let issued: Vec<i64> = (0..MAX_STORED_TOKENS as i64).collect();
        let kept = evict_beyond_cap(issued);
        assert_eq!(kept.len(), MAX_STORED_TOKENS);
    }
}

// ============================================================================
// Video progress: rewind-on-resume and finish
// ============================================================================

const REWIND_SECS: f64 = 30.0;
const FINISHED_WINDOW_SECS: f64 = 60.0;

fn resume_offset(stored: Option<f64>) -> f64 {
    stored.map(|o| (o - REWIND_SECS).max(0.0)).unwrap_or(0.0)
}

#[derive(Debug, PartialEq)]
enum ProgressOutcome {
    Stored(f64),
    Finished,
}

fn record_progress(offset: f64, duration: Option<f64>) -> ProgressOutcome {
    let offset = offset.max(0.0);
    match duration {
        Some(d) if d > 0.0 && offset >= (d - FINISHED_WINDOW_SECS).max(0.0) => {
            ProgressOutcome::Finished
        }
        _ => ProgressOutcome::Stored(offset),
    }
}

mod progress_rules {
    use super::*;

    #[test]
    fn test_resume_rewinds_by_window() {
        assert_eq!(resume_offset(Some(600.0)), 570.0);
    }

    #[test]
    fn test_resume_floors_at_zero() {
        assert_eq!(resume_offset(Some(12.0)), 0.0);
        assert_eq!(resume_offset(None), 0.0);
    }

    #[test]
    fn test_mid_playback_is_stored() {
        assert_matches!(record_progress(300.0, Some(3600.0)), ProgressOutcome::Stored(o) if o == 300.0);
    }

    #[test]
    fn test_unknown_duration_never_auto_finishes() {
        assert_matches!(record_progress(1e9, None), ProgressOutcome::Stored(_));
    }

    #[test]
    fn test_final_minute_finishes() {
        assert_eq!(
            record_progress(3550.0, Some(3600.0)),
            ProgressOutcome::Finished
        );
        assert_eq!(
            record_progress(3600.0, Some(3600.0)),
            ProgressOutcome::Finished
        );
    }

    #[test]
    fn test_short_file_always_finishes() {
        // Shorter than the finished window: any offset counts as done.
        assert_eq!(record_progress(0.0, Some(45.0)), ProgressOutcome::Finished);
    }

    #[test]
    fn test_negative_offset_clamped() {
        assert_matches!(record_progress(-5.0, None), ProgressOutcome::Stored(o) if o == 0.0);
    }
}

// ============================================================================
// Scraper ordering
// ============================================================================

mod scraper_ordering {
    /// A scraper yields (season, episode) or nothing; matching walks the
    /// ordered list and stops at the first full hit.
    fn first_match(
        results: &[Option<(i32, i32)>],
    ) -> Option<(usize, (i32, i32))> {
        results
            .iter()
            .enumerate()
            .find_map(|(i, r)| r.map(|hit| (i, hit)))
    }

    #[test]
    fn test_first_full_match_wins() {
        let results = [None, Some((6, 12)), Some((1, 2))];
        assert_eq!(first_match(&results), Some((1, (6, 12))));
    }

    #[test]
    fn test_partial_matches_fall_through() {
        let results = [None, None, Some((3, 4))];
        assert_eq!(first_match(&results), Some((2, (3, 4))));
    }

    #[test]
    fn test_no_match_is_not_an_error() {
        let results: [Option<(i32, i32)>; 3] = [None, None, None];
        assert_eq!(first_match(&results), None);
    }
}

// ============================================================================
// Request normalization
// ============================================================================

mod request_dedup {
    fn normalize(name: &str) -> String {
        name.split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }

    #[test]
    fn test_whitespace_and_case_collapse() {
        assert_eq!(normalize("  The   Matrix "), normalize("the matrix"));
        assert_eq!(normalize("THE\tMATRIX"), "the matrix");
    }

    #[test]
    fn test_distinct_titles_stay_distinct() {
        assert_ne!(normalize("Heat (1995)"), normalize("Heat (2013)"));
    }

    #[test]
    fn test_duplicate_open_request_becomes_vote() {
        // Rule: a create against an existing open normalized name must not
        // produce a second row; it attaches a vote instead.
        let open_requests = vec![normalize("The Matrix")];
        let incoming = normalize("  the   MATRIX ");

        let creates_new_row = !open_requests.contains(&incoming);
        assert!(!creates_new_row);
    }
}
