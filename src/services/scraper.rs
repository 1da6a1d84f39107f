//! Filename scrapers
//!
//! A scraper is a named triple of regexes: one for the show name, one for
//! the season number, one for the episode number. Scrapers are applied in
//! priority order against a raw filename and matching stops at the first
//! scraper that yields both a season and an episode.
//!
//! Parses filenames like:
//! - "Chicago.Fire.S14E08.1080p.WEB.h264-ETHEL.mkv"
//! - "corner_gas_612_super_sensitive.avi"
//! - "The Daily Show 2026x01 Stephen J Dubner.mp4"

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::db::ScraperRecord;

/// Extracted show information from a filename
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrapeResult {
    pub show_name: Option<String>,
    pub season: Option<i32>,
    pub episode: Option<i32>,
    /// Which scraper matched, when one did
    pub scraper: Option<String>,
}

/// A compiled scraper definition
#[derive(Debug)]
pub struct CompiledScraper {
    pub name: String,
    name_regex: Regex,
    season_regex: Regex,
    episode_regex: Regex,
}

impl CompiledScraper {
    /// Compile a stored definition; invalid patterns are rejected
    pub fn from_record(record: &ScraperRecord) -> Result<Self, regex::Error> {
        Ok(Self {
            name: record.name.clone(),
            name_regex: Regex::new(&record.name_regex)?,
            season_regex: Regex::new(&record.season_regex)?,
            episode_regex: Regex::new(&record.episode_regex)?,
        })
    }

    fn new(name: &str, name_re: &str, season_re: &str, episode_re: &str) -> Self {
        Self {
            name: name.to_string(),
            name_regex: Regex::new(name_re).expect("invalid built-in scraper pattern"),
            season_regex: Regex::new(season_re).expect("invalid built-in scraper pattern"),
            episode_regex: Regex::new(episode_re).expect("invalid built-in scraper pattern"),
        }
    }

    /// Apply this scraper to a filename
    pub fn apply(&self, filename: &str) -> ScrapeResult {
        let show_name = self
            .name_regex
            .captures(filename)
            .and_then(|c| c.get(1))
            .map(|m| clean_show_name(m.as_str()));

        let season = self
            .season_regex
            .captures(filename)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<i32>().ok());

        let episode = self
            .episode_regex
            .captures(filename)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<i32>().ok());

        ScrapeResult {
            show_name,
            season,
            episode,
            scraper: Some(self.name.clone()),
        }
    }
}

/// Built-in scraper set used when no definitions are stored
static DEFAULT_SCRAPERS: Lazy<Vec<CompiledScraper>> = Lazy::new(|| {
    vec![
        // Scene style: Show.Name.S01E02...
        CompiledScraper::new(
            "sxxexx",
            r"(?i)^(.*?)[. _-]*[Ss]\d{1,2}[Ee]\d{1,3}",
            r"(?i)[Ss](\d{1,2})[Ee]\d{1,3}",
            r"(?i)[Ss]\d{1,2}[Ee](\d{1,3})",
        ),
        // 1x02 style
        CompiledScraper::new(
            "nxnn",
            r"(?i)^(.*?)[. _-]*\d{1,2}x\d{2,3}",
            r"(?i)(\d{1,2})x\d{2,3}",
            r"(?i)\d{1,2}x(\d{2,3})",
        ),
        // Bare 612 style: show_name_612_title
        CompiledScraper::new(
            "compact",
            r"(?i)^(.*?)[. _-]+\d{3,4}[. _-]",
            r"(?i)[. _-](\d{1,2})\d{2}[. _-]",
            r"(?i)[. _-]\d{1,2}(\d{2})[. _-]",
        ),
    ]
});

/// Apply scrapers in order, stopping at the first that yields both a season
/// and an episode. An empty scraper list falls back to the built-in set.
pub fn scrape_filename(filename: &str, scrapers: &[CompiledScraper]) -> ScrapeResult {
    let scrapers: &[CompiledScraper] = if scrapers.is_empty() {
        &DEFAULT_SCRAPERS
    } else {
        scrapers
    };

    for scraper in scrapers {
        let result = scraper.apply(filename);
        if result.season.is_some() && result.episode.is_some() {
            debug!(
                filename = filename,
                scraper = %scraper.name,
                season = ?result.season,
                episode = ?result.episode,
                "Scraper matched filename"
            );
            return result;
        }
    }

    // No scraper matched; the caller falls back to the raw name.
    ScrapeResult {
        show_name: Some(clean_show_name(filename)),
        ..Default::default()
    }
}

/// Clean up a show name fragment: separators to spaces, strip the
/// extension, collapse whitespace, title-case words.
pub fn clean_show_name(raw: &str) -> String {
    static EXTENSION_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"(?i)\.(mkv|mp4|avi|m4v|mpg|wmv|flv|ts)$").unwrap());
    static SPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

    let stripped = EXTENSION_RE.replace(raw.trim(), "");
    let spaced = stripped.replace(['.', '_', '-'], " ");
    let collapsed = SPACE_RE.replace_all(spaced.trim(), " ");

    collapsed
        .split(' ')
        .map(title_case_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Display name for a scraped episode, e.g. "Corner Gas (S6, E12)"
pub fn episode_display_name(show_name: &str, season: i32, episode: i32) -> String {
    format!("{} (S{}, E{})", show_name, season, episode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scene_style_filename() {
        let result = scrape_filename("Chicago.Fire.S14E08.1080p.WEB.h264-ETHEL.mkv", &[]);
        assert_eq!(result.show_name.as_deref(), Some("Chicago Fire"));
        assert_eq!(result.season, Some(14));
        assert_eq!(result.episode, Some(8));
        assert_eq!(result.scraper.as_deref(), Some("sxxexx"));
    }

    #[test]
    fn test_nxnn_style_filename() {
        let result = scrape_filename("The Daily Show 4x12 Stephen J Dubner.mp4", &[]);
        assert_eq!(result.show_name.as_deref(), Some("The Daily Show"));
        assert_eq!(result.season, Some(4));
        assert_eq!(result.episode, Some(12));
        assert_eq!(result.scraper.as_deref(), Some("nxnn"));
    }

    #[test]
    fn test_compact_style_filename() {
        let result = scrape_filename("corner_gas_612_super_sensitive.avi", &[]);
        assert_eq!(result.show_name.as_deref(), Some("Corner Gas"));
        assert_eq!(result.season, Some(6));
        assert_eq!(result.episode, Some(12));
    }

    #[test]
    fn test_first_match_wins() {
        // Both sxxexx and nxnn could plausibly fire here; ordering says
        // sxxexx is consulted first and ends the walk.
        let result = scrape_filename("Show.S02E03.also.2x03.mkv", &[]);
        assert_eq!(result.scraper.as_deref(), Some("sxxexx"));
        assert_eq!(result.season, Some(2));
        assert_eq!(result.episode, Some(3));
    }

    #[test]
    fn test_unmatched_filename_is_not_an_error() {
        let result = scrape_filename("some_home_video.mkv", &[]);
        assert_eq!(result.season, None);
        assert_eq!(result.episode, None);
        assert_eq!(result.scraper, None);
        assert_eq!(result.show_name.as_deref(), Some("Some Home Video"));
    }

    #[test]
    fn test_zero_padded_numbers() {
        let result = scrape_filename("Show.Name.S01E02.mkv", &[]);
        assert_eq!(result.season, Some(1));
        assert_eq!(result.episode, Some(2));
    }

    #[test]
    fn test_clean_show_name() {
        assert_eq!(clean_show_name("the.office_us"), "The Office Us");
        assert_eq!(clean_show_name("  spaced   out  "), "Spaced Out");
        assert_eq!(clean_show_name("movie.mkv"), "Movie");
    }

    #[test]
    fn test_episode_display_name() {
        assert_eq!(
            episode_display_name("Corner Gas", 6, 12),
            "Corner Gas (S6, E12)"
        );
    }

    #[test]
    fn test_stored_definition_compiles_and_applies() {
        let record = ScraperRecord {
            id: uuid::Uuid::new_v4(),
            name: "custom".to_string(),
            name_regex: r"^(.*?) - ".to_string(),
            season_regex: r"Series (\d+)".to_string(),
            episode_regex: r"Part (\d+)".to_string(),
            priority: 0,
            created_at: chrono::Utc::now(),
        };
        let compiled = CompiledScraper::from_record(&record).unwrap();
        let result = scrape_filename("My Show - Series 3 Part 4.mkv", &[compiled]);
        assert_eq!(result.show_name.as_deref(), Some("My Show"));
        assert_eq!(result.season, Some(3));
        assert_eq!(result.episode, Some(4));
        assert_eq!(result.scraper.as_deref(), Some("custom"));
    }

    #[test]
    fn test_invalid_stored_pattern_rejected() {
        let record = ScraperRecord {
            id: uuid::Uuid::new_v4(),
            name: "broken".to_string(),
            name_regex: r"([unclosed".to_string(),
            season_regex: r"(\d+)".to_string(),
            episode_regex: r"(\d+)".to_string(),
            priority: 0,
            created_at: chrono::Utc::now(),
        };
        assert!(CompiledScraper::from_record(&record).is_err());
    }
}
