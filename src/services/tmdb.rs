//! TMDB (The Movie Database) API client for movie and TV metadata
//!
//! Base URL: https://api.themoviedb.org/3
//!
//! Rate limiting: TMDB allows ~40 requests per 10 seconds.
//! This client uses rate limiting and retry logic to handle this gracefully.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::rate_limiter::{retry_async, RateLimitedClient, RetryConfig};

/// TMDB API client with rate limiting and retry logic
pub struct TmdbClient {
    client: Arc<RateLimitedClient>,
    base_url: String,
    api_key: String,
    retry_config: RetryConfig,
}

/// Movie search result from TMDB
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbMovieSearchResult {
    pub page: i32,
    pub results: Vec<TmdbMovie>,
    pub total_pages: i32,
    pub total_results: i32,
}

/// Movie details from TMDB
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbMovie {
    pub id: i32,
    pub title: String,
    pub original_title: Option<String>,
    pub overview: Option<String>,
    pub tagline: Option<String>,
    pub release_date: Option<String>,
    pub runtime: Option<i32>,
    pub poster_path: Option<String>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<i32>,
    pub genres: Option<Vec<TmdbGenre>>,
    /// IMDB ID (only in movie details, not search)
    pub imdb_id: Option<String>,
}

/// TV search result from TMDB
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbTvSearchResult {
    pub page: i32,
    pub results: Vec<TmdbTvShow>,
    pub total_pages: i32,
    pub total_results: i32,
}

/// TV show details from TMDB
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbTvShow {
    pub id: i32,
    pub name: String,
    pub original_name: Option<String>,
    pub overview: Option<String>,
    pub first_air_date: Option<String>,
    pub poster_path: Option<String>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<i32>,
    pub genres: Option<Vec<TmdbGenre>>,
}

/// Episode details from TMDB
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbEpisode {
    pub id: i32,
    pub name: Option<String>,
    pub overview: Option<String>,
    pub air_date: Option<String>,
    pub season_number: i32,
    pub episode_number: i32,
    pub still_path: Option<String>,
    pub vote_average: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbGenre {
    pub id: i32,
    pub name: String,
}

/// Credits from TMDB (shared shape for movies and TV)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbCredits {
    pub id: i32,
    pub cast: Vec<TmdbCastMember>,
    pub crew: Vec<TmdbCrewMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbCastMember {
    pub id: i32,
    pub name: String,
    pub character: Option<String>,
    pub order: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbCrewMember {
    pub id: i32,
    pub name: String,
    pub job: String,
    pub department: String,
}

impl TmdbClient {
    /// Create a new TMDB client with the given API key
    pub fn new(api_key: String) -> Self {
        Self {
            client: Arc::new(RateLimitedClient::for_tmdb()),
            base_url: "https://api.themoviedb.org/3".to_string(),
            api_key,
            retry_config: RetryConfig {
                max_retries: 3,
                initial_interval: Duration::from_millis(500),
                max_interval: Duration::from_secs(10),
                multiplier: 2.0,
            },
        }
    }

    /// Check if the client has a valid API key configured
    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Get the image base URL for poster images
    pub fn image_url(&self, path: &str, size: &str) -> String {
        format!("https://image.tmdb.org/t/p/{}{}", size, path)
    }

    /// Get full poster URL (w500 size - good for display)
    pub fn poster_url(&self, path: Option<&str>) -> Option<String> {
        path.map(|p| self.image_url(p, "w500"))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: String,
        extra_query: Vec<(&'static str, String)>,
        operation_name: &str,
    ) -> Result<T> {
        if !self.has_api_key() {
            anyhow::bail!("TMDB API key not configured");
        }

        let client = self.client.clone();
        let api_key = self.api_key.clone();
        let retry_config = self.retry_config.clone();

        retry_async(
            || {
                let url = url.clone();
                let client = client.clone();
                let key = api_key.clone();
                let extra = extra_query.clone();
                async move {
                    let mut query: Vec<(&str, String)> = vec![("api_key", key)];
                    query.extend(extra);

                    let response = client.get_with_query(&url, &query).await?;

                    if response.status().as_u16() == 429 {
                        warn!("TMDB rate limit hit, will retry");
                        anyhow::bail!("Rate limited (429)");
                    }

                    if response.status().as_u16() == 401 {
                        anyhow::bail!("TMDB API key is invalid");
                    }

                    if response.status().as_u16() == 404 {
                        anyhow::bail!("Not found on TMDB");
                    }

                    if !response.status().is_success() {
                        anyhow::bail!("TMDB request failed with status: {}", response.status());
                    }

                    response
                        .json::<T>()
                        .await
                        .context("Failed to parse TMDB response")
                }
            },
            &retry_config,
            operation_name,
        )
        .await
    }

    /// Search for movies by name
    pub async fn search_movies(&self, query: &str, year: Option<i32>) -> Result<Vec<TmdbMovie>> {
        info!(
            "Searching TMDB for movie '{}'{}",
            query,
            year.map(|y| format!(" ({})", y)).unwrap_or_default()
        );

        let mut params = vec![
            ("query", query.to_string()),
            ("include_adult", "false".to_string()),
        ];
        if let Some(y) = year {
            params.push(("year", y.to_string()));
        }

        let result: TmdbMovieSearchResult = self
            .get_json(
                format!("{}/search/movie", self.base_url),
                params,
                "tmdb_search_movies",
            )
            .await?;

        debug!(count = result.results.len(), "TMDB movie search returned results");
        Ok(result.results)
    }

    /// Get movie details by TMDB ID
    pub async fn get_movie(&self, tmdb_id: i32) -> Result<TmdbMovie> {
        debug!("Fetching movie details from TMDB (ID: {})", tmdb_id);

        self.get_json(
            format!("{}/movie/{}", self.base_url, tmdb_id),
            vec![],
            "tmdb_get_movie",
        )
        .await
    }

    /// Get movie credits (cast and crew)
    pub async fn get_movie_credits(&self, tmdb_id: i32) -> Result<TmdbCredits> {
        self.get_json(
            format!("{}/movie/{}/credits", self.base_url, tmdb_id),
            vec![],
            "tmdb_get_movie_credits",
        )
        .await
    }

    /// Search for TV shows by name
    pub async fn search_tv(&self, query: &str) -> Result<Vec<TmdbTvShow>> {
        info!("Searching TMDB for TV show '{}'", query);

        let result: TmdbTvSearchResult = self
            .get_json(
                format!("{}/search/tv", self.base_url),
                vec![("query", query.to_string())],
                "tmdb_search_tv",
            )
            .await?;

        debug!(count = result.results.len(), "TMDB TV search returned results");
        Ok(result.results)
    }

    /// Get TV show details by TMDB ID
    pub async fn get_tv(&self, tmdb_id: i32) -> Result<TmdbTvShow> {
        debug!("Fetching TV details from TMDB (ID: {})", tmdb_id);

        self.get_json(
            format!("{}/tv/{}", self.base_url, tmdb_id),
            vec![],
            "tmdb_get_tv",
        )
        .await
    }

    /// Get TV show credits (cast and crew)
    pub async fn get_tv_credits(&self, tmdb_id: i32) -> Result<TmdbCredits> {
        self.get_json(
            format!("{}/tv/{}/credits", self.base_url, tmdb_id),
            vec![],
            "tmdb_get_tv_credits",
        )
        .await
    }

    /// Get a single episode's details
    pub async fn get_episode(
        &self,
        tv_tmdb_id: i32,
        season: i32,
        episode: i32,
    ) -> Result<TmdbEpisode> {
        debug!(
            "Fetching episode S{:02}E{:02} for TMDB TV {}",
            season, episode, tv_tmdb_id
        );

        self.get_json(
            format!(
                "{}/tv/{}/season/{}/episode/{}",
                self.base_url, tv_tmdb_id, season, episode
            ),
            vec![],
            "tmdb_get_episode",
        )
        .await
    }
}

impl TmdbMovie {
    /// Get the release year from the release_date
    pub fn year(&self) -> Option<i32> {
        self.release_date
            .as_ref()
            .and_then(|d| d.split('-').next().and_then(|y| y.parse().ok()))
    }

    /// Get genre names from genre list (if available from details endpoint)
    pub fn genre_names(&self) -> Vec<String> {
        self.genres
            .as_ref()
            .map(|g| g.iter().map(|genre| genre.name.clone()).collect())
            .unwrap_or_default()
    }
}

impl TmdbTvShow {
    /// Get the first-aired year
    pub fn year(&self) -> Option<i32> {
        self.first_air_date
            .as_ref()
            .and_then(|d| d.split('-').next().and_then(|y| y.parse().ok()))
    }

    /// Get genre names from genre list (if available from details endpoint)
    pub fn genre_names(&self) -> Vec<String> {
        self.genres
            .as_ref()
            .map(|g| g.iter().map(|genre| genre.name.clone()).collect())
            .unwrap_or_default()
    }
}

impl TmdbCredits {
    /// Get director names from crew
    pub fn directors(&self) -> Vec<String> {
        self.crew
            .iter()
            .filter(|c| c.job == "Director")
            .map(|c| c.name.clone())
            .collect()
    }

    /// Get writer names from crew
    pub fn writers(&self) -> Vec<String> {
        self.crew
            .iter()
            .filter(|c| c.department == "Writing")
            .map(|c| c.name.clone())
            .collect()
    }

    /// Get top billed cast names
    pub fn top_cast(&self, limit: usize) -> Vec<String> {
        let mut cast = self.cast.clone();
        cast.sort_by(|a, b| a.order.cmp(&b.order));
        cast.into_iter().take(limit).map(|c| c.name).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_url() {
        let client = TmdbClient::new("test_key".to_string());
        assert_eq!(
            client.image_url("/abc123.jpg", "w500"),
            "https://image.tmdb.org/t/p/w500/abc123.jpg"
        );
    }

    #[test]
    fn test_movie_year_parsing() {
        let movie = TmdbMovie {
            id: 1,
            title: "Test".to_string(),
            original_title: None,
            overview: None,
            tagline: None,
            release_date: Some("2023-05-15".to_string()),
            runtime: None,
            poster_path: None,
            vote_average: None,
            vote_count: None,
            genres: None,
            imdb_id: None,
        };
        assert_eq!(movie.year(), Some(2023));
    }

    #[test]
    fn test_credits_split_crew() {
        let credits = TmdbCredits {
            id: 1,
            cast: vec![
                TmdbCastMember {
                    id: 10,
                    name: "Second Billed".to_string(),
                    character: None,
                    order: Some(1),
                },
                TmdbCastMember {
                    id: 11,
                    name: "First Billed".to_string(),
                    character: None,
                    order: Some(0),
                },
            ],
            crew: vec![
                TmdbCrewMember {
                    id: 20,
                    name: "A Director".to_string(),
                    job: "Director".to_string(),
                    department: "Directing".to_string(),
                },
                TmdbCrewMember {
                    id: 21,
                    name: "A Writer".to_string(),
                    job: "Screenplay".to_string(),
                    department: "Writing".to_string(),
                },
            ],
        };

        assert_eq!(credits.directors(), vec!["A Director"]);
        assert_eq!(credits.writers(), vec!["A Writer"]);
        assert_eq!(credits.top_cast(1), vec!["First Billed"]);
    }
}
