//! Domain services and external integrations

pub mod auth;
pub mod email;
pub mod metadata;
pub mod progress;
pub mod rate_limiter;
pub mod scraper;
pub mod tmdb;
pub mod tokens;
pub mod waiter;

pub use auth::{AuthConfig, AuthService, AuthTokens, AuthenticatedUser, LoginResult};
pub use email::EmailService;
pub use metadata::{MetadataService, PopulateSummary};
pub use progress::ProgressService;
pub use scraper::{scrape_filename, CompiledScraper, ScrapeResult};
pub use tmdb::TmdbClient;
pub use tokens::{IssuedToken, TokenPayload, TokenService};
pub use waiter::WaiterService;
