//! Development fixtures
//!
//! Inserts a staff user, the stock scraper definitions, and a small
//! catalog so a fresh environment has something to click on. Safe to run
//! repeatedly: existing rows are left alone.

use anyhow::Result;
use tracing::info;

use crate::db::{
    CreateMediaFile, CreateMediaPath, CreateMovie, CreateScraper, CreateTvShow, Database, PathKind,
};
use crate::services::AuthService;

pub async fn seed_data(db: &Database, auth: &AuthService) -> Result<()> {
    // Staff user
    if db.users().get_by_username("admin").await?.is_none() {
        let password =
            std::env::var("SEED_ADMIN_PASSWORD").unwrap_or_else(|_| "admin".to_string());
        auth.create_user("admin", Some("admin@localhost"), &password, true)
            .await?;
        info!("Seeded staff user 'admin'");
    }

    // Stock scraper definitions
    if db.scrapers().list_ordered().await?.is_empty() {
        let stock = [
            (
                "sxxexx",
                r"(?i)^(.*?)[. _-]*[Ss]\d{1,2}[Ee]\d{1,3}",
                r"(?i)[Ss](\d{1,2})[Ee]\d{1,3}",
                r"(?i)[Ss]\d{1,2}[Ee](\d{1,3})",
            ),
            (
                "nxnn",
                r"(?i)^(.*?)[. _-]*\d{1,2}x\d{2,3}",
                r"(?i)(\d{1,2})x\d{2,3}",
                r"(?i)\d{1,2}x(\d{2,3})",
            ),
            (
                "compact",
                r"(?i)^(.*?)[. _-]+\d{3,4}[. _-]",
                r"(?i)[. _-](\d{1,2})\d{2}[. _-]",
                r"(?i)[. _-]\d{1,2}(\d{2})[. _-]",
            ),
        ];

        for (priority, (name, name_re, season_re, episode_re)) in stock.iter().enumerate() {
            db.scrapers()
                .create(CreateScraper {
                    name: name.to_string(),
                    name_regex: name_re.to_string(),
                    season_regex: season_re.to_string(),
                    episode_regex: episode_re.to_string(),
                    priority: priority as i32,
                })
                .await?;
        }
        info!("Seeded stock scraper definitions");
    }

    // Demo catalog
    if db.tv_shows().count().await? == 0 {
        let show = db
            .tv_shows()
            .create(CreateTvShow {
                name: "Corner Gas".to_string(),
                search_terms: None,
            })
            .await?;

        let path = db
            .media_paths()
            .create(CreateMediaPath {
                tv_id: Some(show.id),
                movie_id: None,
                local_path: "/srv/media/tv/Corner Gas".to_string(),
                remote_path: "/media/tv/Corner Gas".to_string(),
                kind: PathKind::Tv,
                skip: false,
                default_scraper_id: None,
            })
            .await?;

        db.media_files()
            .create(CreateMediaFile {
                media_path_id: path.id,
                filename: "corner.gas.s01e01.mkv".to_string(),
                display_name: "Corner Gas (S1, E1)".to_string(),
                season: Some(1),
                episode: Some(1),
                size: Some(734_003_200),
                is_movie: false,
            })
            .await?;

        info!("Seeded demo TV show");
    }

    if db.movies().count().await? == 0 {
        let movie = db
            .movies()
            .create(CreateMovie {
                name: "Heat (1995)".to_string(),
            })
            .await?;

        let path = db
            .media_paths()
            .create(CreateMediaPath {
                tv_id: None,
                movie_id: Some(movie.id),
                local_path: "/srv/media/movies/Heat (1995)".to_string(),
                remote_path: "/media/movies/Heat (1995)".to_string(),
                kind: PathKind::Movie,
                skip: false,
                default_scraper_id: None,
            })
            .await?;

        db.media_files()
            .create(CreateMediaFile {
                media_path_id: path.id,
                filename: "heat.1995.1080p.mkv".to_string(),
                display_name: "Heat (1995)".to_string(),
                season: None,
                episode: None,
                size: Some(4_294_967_296),
                is_movie: true,
            })
            .await?;

        info!("Seeded demo movie");
    }

    Ok(())
}
