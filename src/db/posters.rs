//! Poster metadata database repository
//!
//! A poster row caches provider metadata for a show, a movie, or a single
//! episode file. Genres, actors, writers, and directors are name tables
//! joined many-to-many; repopulating a poster replaces its associations.

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

/// What a poster row describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PosterOwner {
    Tv(Uuid),
    Movie(Uuid),
    MediaFile(Uuid),
}

impl PosterOwner {
    fn column(&self) -> &'static str {
        match self {
            PosterOwner::Tv(_) => "tv_id",
            PosterOwner::Movie(_) => "movie_id",
            PosterOwner::MediaFile(_) => "media_file_id",
        }
    }

    fn id(&self) -> Uuid {
        match self {
            PosterOwner::Tv(id) | PosterOwner::Movie(id) | PosterOwner::MediaFile(id) => *id,
        }
    }
}

/// Poster record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PosterRecord {
    pub id: Uuid,
    pub tv_id: Option<Uuid>,
    pub movie_id: Option<Uuid>,
    pub media_file_id: Option<Uuid>,
    pub plot: Option<String>,
    pub extended_plot: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub rating: Option<Decimal>,
    pub rated: Option<String>,
    pub imdb_id: Option<String>,
    pub tmdb_id: Option<i32>,
    pub episode_name: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for upserting poster metadata
#[derive(Debug, Default, Clone)]
pub struct UpsertPoster {
    pub plot: Option<String>,
    pub extended_plot: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub rating: Option<Decimal>,
    pub rated: Option<String>,
    pub imdb_id: Option<String>,
    pub tmdb_id: Option<i32>,
    pub episode_name: Option<String>,
    pub image_url: Option<String>,
}

/// A named row (genre, actor, writer, director)
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct NamedRecord {
    pub id: Uuid,
    pub name: String,
}

pub struct PosterRepository {
    pool: PgPool,
}

const POSTER_COLUMNS: &str = "id, tv_id, movie_id, media_file_id, plot, extended_plot, \
     release_date, rating, rated, imdb_id, tmdb_id, episode_name, image_url, \
     created_at, updated_at";

impl PosterRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get the poster for an owner, if one exists
    pub async fn get_for(&self, owner: PosterOwner) -> Result<Option<PosterRecord>> {
        let query = format!(
            "SELECT {POSTER_COLUMNS} FROM posters WHERE {} = $1",
            owner.column()
        );

        let record = sqlx::query_as::<_, PosterRecord>(&query)
            .bind(owner.id())
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    /// Create or overwrite the poster for an owner
    pub async fn upsert(&self, owner: PosterOwner, input: UpsertPoster) -> Result<PosterRecord> {
        let column = owner.column();
        let query = format!(
            r#"
            INSERT INTO posters ({column}, plot, extended_plot, release_date, rating,
                                 rated, imdb_id, tmdb_id, episode_name, image_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT ({column}) DO UPDATE SET
                plot = EXCLUDED.plot,
                extended_plot = EXCLUDED.extended_plot,
                release_date = EXCLUDED.release_date,
                rating = EXCLUDED.rating,
                rated = EXCLUDED.rated,
                imdb_id = EXCLUDED.imdb_id,
                tmdb_id = EXCLUDED.tmdb_id,
                episode_name = EXCLUDED.episode_name,
                image_url = EXCLUDED.image_url,
                updated_at = NOW()
            RETURNING {POSTER_COLUMNS}
            "#,
        );

        let record = sqlx::query_as::<_, PosterRecord>(&query)
            .bind(owner.id())
            .bind(&input.plot)
            .bind(&input.extended_plot)
            .bind(input.release_date)
            .bind(input.rating)
            .bind(&input.rated)
            .bind(&input.imdb_id)
            .bind(input.tmdb_id)
            .bind(&input.episode_name)
            .bind(&input.image_url)
            .fetch_one(&self.pool)
            .await?;

        Ok(record)
    }

    // ========================================================================
    // Name tables and associations
    // ========================================================================

    /// Get or create a named row, case-insensitively
    async fn upsert_named(&self, table: &str, name: &str) -> Result<NamedRecord> {
        let name = name.trim();

        let select = format!("SELECT id, name FROM {table} WHERE LOWER(name) = LOWER($1)");
        if let Some(existing) = sqlx::query_as::<_, NamedRecord>(&select)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?
        {
            return Ok(existing);
        }

        let insert = format!(
            r#"
            INSERT INTO {table} (name) VALUES ($1)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id, name
            "#,
        );
        let record = sqlx::query_as::<_, NamedRecord>(&insert)
            .bind(name)
            .fetch_one(&self.pool)
            .await?;

        Ok(record)
    }

    async fn replace_associations(
        &self,
        join_table: &str,
        name_table: &str,
        fk_column: &str,
        poster_id: Uuid,
        names: &[String],
    ) -> Result<()> {
        let delete = format!("DELETE FROM {join_table} WHERE poster_id = $1");
        sqlx::query(&delete).bind(poster_id).execute(&self.pool).await?;

        for name in names {
            if name.trim().is_empty() {
                continue;
            }
            let named = self.upsert_named(name_table, name).await?;
            let insert = format!(
                "INSERT INTO {join_table} (poster_id, {fk_column}) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            );
            sqlx::query(&insert)
                .bind(poster_id)
                .bind(named.id)
                .execute(&self.pool)
                .await?;
        }

        Ok(())
    }

    /// Replace the genre set on a poster
    pub async fn set_genres(&self, poster_id: Uuid, names: &[String]) -> Result<()> {
        self.replace_associations("poster_genres", "genres", "genre_id", poster_id, names)
            .await
    }

    /// Replace the actor set on a poster
    pub async fn set_actors(&self, poster_id: Uuid, names: &[String]) -> Result<()> {
        self.replace_associations("poster_actors", "actors", "actor_id", poster_id, names)
            .await
    }

    /// Replace the writer set on a poster
    pub async fn set_writers(&self, poster_id: Uuid, names: &[String]) -> Result<()> {
        self.replace_associations("poster_writers", "writers", "writer_id", poster_id, names)
            .await
    }

    /// Replace the director set on a poster
    pub async fn set_directors(&self, poster_id: Uuid, names: &[String]) -> Result<()> {
        self.replace_associations("poster_directors", "directors", "director_id", poster_id, names)
            .await
    }

    /// Genres attached to a poster, ordered case-insensitively
    pub async fn genres_for(&self, poster_id: Uuid) -> Result<Vec<NamedRecord>> {
        let records = sqlx::query_as::<_, NamedRecord>(
            r#"
            SELECT g.id, g.name
            FROM genres g
            JOIN poster_genres pg ON pg.genre_id = g.id
            WHERE pg.poster_id = $1
            ORDER BY LOWER(g.name)
            "#,
        )
        .bind(poster_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Actors attached to a poster
    pub async fn actors_for(&self, poster_id: Uuid) -> Result<Vec<NamedRecord>> {
        let records = sqlx::query_as::<_, NamedRecord>(
            r#"
            SELECT a.id, a.name
            FROM actors a
            JOIN poster_actors pa ON pa.actor_id = a.id
            WHERE pa.poster_id = $1
            ORDER BY LOWER(a.name)
            "#,
        )
        .bind(poster_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Writers attached to a poster
    pub async fn writers_for(&self, poster_id: Uuid) -> Result<Vec<NamedRecord>> {
        let records = sqlx::query_as::<_, NamedRecord>(
            r#"
            SELECT w.id, w.name
            FROM writers w
            JOIN poster_writers pw ON pw.writer_id = w.id
            WHERE pw.poster_id = $1
            ORDER BY LOWER(w.name)
            "#,
        )
        .bind(poster_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Directors attached to a poster
    pub async fn directors_for(&self, poster_id: Uuid) -> Result<Vec<NamedRecord>> {
        let records = sqlx::query_as::<_, NamedRecord>(
            r#"
            SELECT d.id, d.name
            FROM directors d
            JOIN poster_directors pd ON pd.director_id = d.id
            WHERE pd.poster_id = $1
            ORDER BY LOWER(d.name)
            "#,
        )
        .bind(poster_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Genres present anywhere in the catalog
    pub async fn list_catalog_genres(&self) -> Result<Vec<NamedRecord>> {
        let records = sqlx::query_as::<_, NamedRecord>(
            r#"
            SELECT g.id, g.name
            FROM genres g
            WHERE EXISTS (SELECT 1 FROM poster_genres pg WHERE pg.genre_id = g.id)
            ORDER BY LOWER(g.name)
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}
