//! Poster metadata population
//!
//! Given a catalog entry, query the metadata provider and cache plot,
//! release date, rating, external ids, artwork URL, and the genre/cast
//! associations. Re-running overwrites; provider failures are logged and
//! treated as "no data available".

use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::db::{
    Database, MediaFileRecord, MovieRecord, PosterOwner, TvShowRecord, UpdateMediaFile,
    UpsertPoster,
};
use crate::services::scraper::{episode_display_name, scrape_filename, CompiledScraper};
use crate::services::tmdb::TmdbClient;

/// Number of cast members cached per poster
const CAST_LIMIT: usize = 10;

/// Counts of poster rows touched by a population sweep
#[derive(Debug, Default, Clone, Copy)]
pub struct PopulateSummary {
    pub movies: usize,
    pub tv_shows: usize,
    pub episodes: usize,
    pub failures: usize,
}

#[derive(Clone)]
pub struct MetadataService {
    db: Database,
    tmdb: Arc<TmdbClient>,
}

impl MetadataService {
    pub fn new(db: Database, tmdb: Arc<TmdbClient>) -> Self {
        Self { db, tmdb }
    }

    pub fn is_configured(&self) -> bool {
        self.tmdb.has_api_key()
    }

    /// Populate (or overwrite) the poster for a movie
    pub async fn populate_movie(&self, movie: &MovieRecord) -> Result<()> {
        let (title, year) = split_trailing_year(&movie.name);

        let results = self.tmdb.search_movies(&title, year).await?;
        let Some(hit) = results.into_iter().next() else {
            info!(movie = %movie.name, "No provider match for movie");
            return Ok(());
        };

        let details = self.tmdb.get_movie(hit.id).await?;
        let credits = self.tmdb.get_movie_credits(hit.id).await?;

        let poster = self
            .db
            .posters()
            .upsert(
                PosterOwner::Movie(movie.id),
                UpsertPoster {
                    plot: details.overview.clone(),
                    extended_plot: details.tagline.clone(),
                    release_date: parse_date(details.release_date.as_deref()),
                    rating: details.vote_average.and_then(|v| Decimal::try_from(v).ok()),
                    rated: None,
                    imdb_id: details.imdb_id.clone(),
                    tmdb_id: Some(details.id),
                    episode_name: None,
                    image_url: self.tmdb.poster_url(details.poster_path.as_deref()),
                },
            )
            .await?;

        let posters = self.db.posters();
        posters.set_genres(poster.id, &details.genre_names()).await?;
        posters.set_actors(poster.id, &credits.top_cast(CAST_LIMIT)).await?;
        posters.set_writers(poster.id, &credits.writers()).await?;
        posters.set_directors(poster.id, &credits.directors()).await?;

        info!(movie = %movie.name, tmdb_id = details.id, "Populated movie poster");
        Ok(())
    }

    /// Populate (or overwrite) the poster for a TV show
    pub async fn populate_tv(&self, tv: &TvShowRecord) -> Result<()> {
        let results = self.tmdb.search_tv(tv.search_term()).await?;
        let Some(hit) = results.into_iter().next() else {
            info!(tv = %tv.name, "No provider match for TV show");
            return Ok(());
        };

        let details = self.tmdb.get_tv(hit.id).await?;
        let credits = self.tmdb.get_tv_credits(hit.id).await?;

        let poster = self
            .db
            .posters()
            .upsert(
                PosterOwner::Tv(tv.id),
                UpsertPoster {
                    plot: details.overview.clone(),
                    extended_plot: None,
                    release_date: parse_date(details.first_air_date.as_deref()),
                    rating: details.vote_average.and_then(|v| Decimal::try_from(v).ok()),
                    rated: None,
                    imdb_id: None,
                    tmdb_id: Some(details.id),
                    episode_name: None,
                    image_url: self.tmdb.poster_url(details.poster_path.as_deref()),
                },
            )
            .await?;

        let posters = self.db.posters();
        posters.set_genres(poster.id, &details.genre_names()).await?;
        posters.set_actors(poster.id, &credits.top_cast(CAST_LIMIT)).await?;
        posters.set_writers(poster.id, &credits.writers()).await?;
        posters.set_directors(poster.id, &credits.directors()).await?;

        info!(tv = %tv.name, tmdb_id = details.id, "Populated TV poster");
        Ok(())
    }

    /// Populate the poster for one episode file.
    ///
    /// Requires the owning show's poster to carry a provider id already;
    /// the sweep populates shows before episodes for that reason.
    pub async fn populate_episode(&self, file: &MediaFileRecord) -> Result<()> {
        let (Some(season), Some(episode)) = (file.season, file.episode) else {
            return Err(anyhow!("File has no season/episode"));
        };

        let path = self
            .db
            .media_paths()
            .get_by_id(file.media_path_id)
            .await?
            .ok_or_else(|| anyhow!("Media path not found"))?;

        let tv_id = path.tv_id.ok_or_else(|| anyhow!("File does not belong to a TV show"))?;

        let show_poster = self
            .db
            .posters()
            .get_for(PosterOwner::Tv(tv_id))
            .await?
            .and_then(|p| p.tmdb_id)
            .ok_or_else(|| anyhow!("Show has no provider id yet"))?;

        let details = self.tmdb.get_episode(show_poster, season, episode).await?;

        self.db
            .posters()
            .upsert(
                PosterOwner::MediaFile(file.id),
                UpsertPoster {
                    plot: details.overview.clone(),
                    extended_plot: None,
                    release_date: parse_date(details.air_date.as_deref()),
                    rating: details.vote_average.and_then(|v| Decimal::try_from(v).ok()),
                    rated: None,
                    imdb_id: None,
                    tmdb_id: Some(details.id),
                    episode_name: details.name.clone(),
                    image_url: self.tmdb.poster_url(details.still_path.as_deref()),
                },
            )
            .await?;

        info!(file = %file.filename, "Populated episode poster");
        Ok(())
    }

    /// Run stored scrapers over TV files that still lack season/episode.
    ///
    /// A path's default scraper, when set, is consulted before the shared
    /// ordered list. Returns how many files were matched.
    pub async fn scrape_unmatched(&self) -> Result<usize> {
        let definitions = self.db.scrapers().list_ordered().await?;
        let shared: Vec<CompiledScraper> = definitions
            .iter()
            .filter_map(|d| match CompiledScraper::from_record(d) {
                Ok(c) => Some(c),
                Err(e) => {
                    warn!(scraper = %d.name, error = %e, "Skipping invalid scraper pattern");
                    None
                }
            })
            .collect();

        let mut matched = 0;

        for file in self.db.media_files().list_unmatched_tv().await? {
            let path = match self.db.media_paths().get_by_id(file.media_path_id).await? {
                Some(p) => p,
                None => continue,
            };

            let mut result = None;
            if let Some(scraper_id) = path.default_scraper_id
                && let Some(preferred) = self.db.scrapers().get_by_id(scraper_id).await?
                && let Ok(compiled) = CompiledScraper::from_record(&preferred)
            {
                let r = compiled.apply(&file.filename);
                if r.season.is_some() && r.episode.is_some() {
                    result = Some(r);
                }
            }

            let result = result.unwrap_or_else(|| scrape_filename(&file.filename, &shared));
            let (Some(season), Some(episode)) = (result.season, result.episode) else {
                continue;
            };

            let show_name = match path.tv_id {
                Some(tv_id) => self
                    .db
                    .tv_shows()
                    .get_by_id(tv_id)
                    .await?
                    .map(|t| t.name)
                    .unwrap_or_else(|| file.display_name.clone()),
                None => result.show_name.unwrap_or_else(|| file.display_name.clone()),
            };

            self.db
                .media_files()
                .update(
                    file.id,
                    UpdateMediaFile {
                        season: Some(season),
                        episode: Some(episode),
                        display_name: Some(episode_display_name(&show_name, season, episode)),
                        ..Default::default()
                    },
                )
                .await?;
            matched += 1;
        }

        if matched > 0 {
            info!(matched = matched, "Scraped season/episode for unmatched files");
        }

        Ok(matched)
    }

    /// Populate every catalog entry missing poster data.
    ///
    /// Scrapes unmatched files first so fresh episodes are eligible.
    /// One failure never aborts the sweep; the entry is retried on the
    /// next run.
    pub async fn populate_missing(&self) -> Result<PopulateSummary> {
        if let Err(e) = self.scrape_unmatched().await {
            warn!(error = %e, "Scrape pass failed; continuing with poster population");
        }

        if !self.is_configured() {
            warn!("TMDB API key not configured; skipping poster population");
            return Ok(PopulateSummary::default());
        }

        let mut summary = PopulateSummary::default();

        for movie in self.db.movies().list_missing_posters().await? {
            match self.populate_movie(&movie).await {
                Ok(()) => summary.movies += 1,
                Err(e) => {
                    warn!(movie = %movie.name, error = %e, "Movie poster population failed");
                    summary.failures += 1;
                }
            }
        }

        for tv in self.db.tv_shows().list_missing_posters().await? {
            match self.populate_tv(&tv).await {
                Ok(()) => summary.tv_shows += 1,
                Err(e) => {
                    warn!(tv = %tv.name, error = %e, "TV poster population failed");
                    summary.failures += 1;
                }
            }
        }

        for file in self.db.media_files().list_missing_posters().await? {
            match self.populate_episode(&file).await {
                Ok(()) => summary.episodes += 1,
                Err(e) => {
                    warn!(file = %file.filename, error = %e, "Episode poster population failed");
                    summary.failures += 1;
                }
            }
        }

        info!(
            movies = summary.movies,
            tv_shows = summary.tv_shows,
            episodes = summary.episodes,
            failures = summary.failures,
            "Poster population sweep finished"
        );

        Ok(summary)
    }
}

/// Split a trailing parenthesized year off a movie name: "Heat (1995)"
fn split_trailing_year(name: &str) -> (String, Option<i32>) {
    static YEAR_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^(.*?)\s*\((19\d{2}|20\d{2})\)\s*$").unwrap());

    match YEAR_RE.captures(name) {
        Some(caps) => {
            let title = caps.get(1).map(|m| m.as_str().to_string()).unwrap_or_default();
            let year = caps.get(2).and_then(|m| m.as_str().parse().ok());
            (title, year)
        }
        None => (name.to_string(), None),
    }
}

fn parse_date(s: Option<&str>) -> Option<NaiveDate> {
    s.and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_trailing_year() {
        assert_eq!(split_trailing_year("Heat (1995)"), ("Heat".to_string(), Some(1995)));
        assert_eq!(split_trailing_year("Heat"), ("Heat".to_string(), None));
        assert_eq!(
            split_trailing_year("2001 A Space Odyssey (1968)"),
            ("2001 A Space Odyssey".to_string(), Some(1968))
        );
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date(Some("2023-05-15")),
            NaiveDate::from_ymd_opt(2023, 5, 15)
        );
        assert_eq!(parse_date(Some("not-a-date")), None);
        assert_eq!(parse_date(None), None);
    }
}
