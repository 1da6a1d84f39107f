//! Authentication service for user management and JWT handling
//!
//! Provides:
//! - Login with username/email and password
//! - Password hashing with bcrypt
//! - JWT access/refresh token generation and validation
//! - Password reset tokens delivered by email

use anyhow::{anyhow, Result};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::db::{CreateUser, Database, UpdateUser, UserRecord};
use crate::services::email::EmailService;

// ============================================================================
// JWT Claims
// ============================================================================

/// Claims structure for access tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// User ID (subject)
    pub sub: String,
    /// Username
    pub username: String,
    /// Staff flag
    pub is_staff: bool,
    /// Token type
    pub token_type: String,
    /// Expiration timestamp
    pub exp: i64,
    /// Issued at timestamp
    pub iat: i64,
}

/// Claims structure for refresh tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshTokenClaims {
    /// User ID (subject)
    pub sub: String,
    /// Token type
    pub token_type: String,
    /// Unique token ID (for revocation)
    pub jti: String,
    /// Expiration timestamp
    pub exp: i64,
    /// Issued at timestamp
    pub iat: i64,
}

// ============================================================================
// Auth Types
// ============================================================================

/// Token pair returned after successful authentication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthTokens {
    /// Short-lived access token
    pub access_token: String,
    /// Long-lived refresh token
    pub refresh_token: String,
    /// Access token expiration in seconds
    pub expires_in: i64,
    /// Token type (always "Bearer")
    pub token_type: String,
}

/// Identity extracted from a validated access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub username: String,
    pub is_staff: bool,
}

/// Login result
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub user: AuthenticatedUser,
    pub tokens: AuthTokens,
}

// ============================================================================
// Configuration
// ============================================================================

/// Auth service configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// JWT signing secret
    pub jwt_secret: String,
    /// Access token lifetime in seconds (default: 15 minutes)
    pub access_token_lifetime: i64,
    /// Refresh token lifetime in seconds (default: 7 days)
    pub refresh_token_lifetime: i64,
    /// Password reset token lifetime in seconds (default: 1 hour)
    pub reset_token_lifetime: i64,
    /// Bcrypt cost factor
    pub bcrypt_cost: u32,
}

impl AuthConfig {
    pub fn new(jwt_secret: String) -> Self {
        Self {
            jwt_secret,
            access_token_lifetime: 15 * 60,
            refresh_token_lifetime: 7 * 24 * 60 * 60,
            reset_token_lifetime: 60 * 60,
            bcrypt_cost: DEFAULT_COST,
        }
    }
}

// ============================================================================
// Auth Service
// ============================================================================

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: Database,
    email: EmailService,
    config: AuthConfig,
}

impl AuthService {
    /// Create a new auth service
    pub fn new(db: Database, email: EmailService, config: AuthConfig) -> Self {
        Self { db, email, config }
    }

    // ========================================================================
    // User management
    // ========================================================================

    /// Create a user (staff action; there is no open registration)
    pub async fn create_user(
        &self,
        username: &str,
        email: Option<&str>,
        password: &str,
        is_staff: bool,
    ) -> Result<UserRecord> {
        let users = self.db.users();

        if users.get_by_username(username).await?.is_some() {
            return Err(anyhow!("Username already taken"));
        }
        if let Some(e) = email
            && users.get_by_email(e).await?.is_some()
        {
            return Err(anyhow!("Email already registered"));
        }

        let password_hash = self.hash_password(password)?;

        users
            .create(CreateUser {
                username: username.to_string(),
                email: email.map(|e| e.to_string()),
                password_hash,
                is_staff,
            })
            .await
    }

    // ========================================================================
    // Login
    // ========================================================================

    /// Login with username/email and password
    pub async fn login(&self, username_or_email: &str, password: &str) -> Result<LoginResult> {
        let users = self.db.users();

        let user = match users.get_by_username(username_or_email).await? {
            Some(u) => Some(u),
            None => users.get_by_email(username_or_email).await?,
        };

        let user = match user {
            Some(u) => u,
            None => return Err(anyhow!("Invalid username or password")),
        };

        if !user.is_active {
            return Err(anyhow!("Account is disabled"));
        }

        if !self.verify_password(password, &user.password_hash)? {
            return Err(anyhow!("Invalid username or password"));
        }

        let tokens = self.generate_tokens(&user).await?;
        users.update_last_login(user.id).await?;

        Ok(LoginResult {
            user: user_identity(&user),
            tokens,
        })
    }

    /// Verify a user's credentials without issuing tokens (legacy Basic auth)
    pub async fn verify_basic(&self, username: &str, password: &str) -> Result<Option<UserRecord>> {
        let user = match self.db.users().get_by_username(username).await? {
            Some(u) if u.is_active => u,
            _ => return Ok(None),
        };

        if self.verify_password(password, &user.password_hash)? {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    // ========================================================================
    // Token Management
    // ========================================================================

    /// Refresh access token using refresh token (rotation: old token dies)
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<AuthTokens> {
        let claims = self.decode_refresh_token(refresh_token)?;
        let token_hash = hash_token(refresh_token);

        let users = self.db.users();

        let stored_token = users
            .get_refresh_token_by_hash(&token_hash)
            .await?
            .ok_or_else(|| anyhow!("Invalid refresh token"))?;

        let user_id: Uuid = claims.sub.parse()?;
        let user = users
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| anyhow!("User not found"))?;

        if !user.is_active {
            return Err(anyhow!("Account is disabled"));
        }

        users.update_refresh_token_used(stored_token.id).await?;
        let new_tokens = self.generate_tokens(&user).await?;
        users.delete_refresh_token(stored_token.id).await?;

        Ok(new_tokens)
    }

    /// Validate access token and return the caller's identity
    pub fn validate_access_token(&self, token: &str) -> Result<AuthenticatedUser> {
        let claims = self.decode_access_token(token)?;

        Ok(AuthenticatedUser {
            id: claims.sub.parse()?,
            username: claims.username,
            is_staff: claims.is_staff,
        })
    }

    /// Logout - invalidate refresh token
    pub async fn logout(&self, refresh_token: &str) -> Result<()> {
        let token_hash = hash_token(refresh_token);
        let users = self.db.users();

        if let Some(stored_token) = users.get_refresh_token_by_hash(&token_hash).await? {
            users.delete_refresh_token(stored_token.id).await?;
        }

        Ok(())
    }

    // ========================================================================
    // Password Management
    // ========================================================================

    /// Change user password
    pub async fn change_password(
        &self,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> Result<()> {
        let users = self.db.users();

        let user = users
            .get_by_id(user_id)
            .await?
            .ok_or_else(|| anyhow!("User not found"))?;

        if !self.verify_password(current_password, &user.password_hash)? {
            return Err(anyhow!("Current password is incorrect"));
        }

        let new_hash = self.hash_password(new_password)?;

        users
            .update(
                user_id,
                UpdateUser {
                    password_hash: Some(new_hash),
                    ..Default::default()
                },
            )
            .await?;

        // Force re-login everywhere.
        users.delete_user_refresh_tokens(user_id).await?;

        Ok(())
    }

    /// Start a password reset: store a hashed token and email the raw one.
    ///
    /// Always succeeds from the caller's perspective so the endpoint does
    /// not reveal which emails exist.
    pub async fn request_password_reset(&self, email: &str) -> Result<()> {
        let users = self.db.users();

        let Some(user) = users.get_by_email(email).await? else {
            tracing::info!("Password reset requested for unknown email");
            return Ok(());
        };

        let raw_token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(48)
            .map(char::from)
            .collect();

        let expires_at = Utc::now() + Duration::seconds(self.config.reset_token_lifetime);
        users
            .create_password_reset_token(user.id, &hash_token(&raw_token), expires_at)
            .await?;

        self.email.send_password_reset_email(email, &raw_token).await?;

        Ok(())
    }

    /// Complete a password reset with the emailed token
    pub async fn confirm_password_reset(&self, raw_token: &str, new_password: &str) -> Result<()> {
        let users = self.db.users();

        let stored = users
            .get_password_reset_token(&hash_token(raw_token))
            .await?
            .ok_or_else(|| anyhow!("Invalid or expired reset token"))?;

        let new_hash = self.hash_password(new_password)?;

        users
            .update(
                stored.user_id,
                UpdateUser {
                    password_hash: Some(new_hash),
                    ..Default::default()
                },
            )
            .await?;

        users.mark_password_reset_token_used(stored.id).await?;
        users.delete_user_refresh_tokens(stored.user_id).await?;

        Ok(())
    }

    // ========================================================================
    // Helper Methods
    // ========================================================================

    /// Hash a password with bcrypt
    fn hash_password(&self, password: &str) -> Result<String> {
        hash(password, self.config.bcrypt_cost)
            .map_err(|e| anyhow!("Failed to hash password: {}", e))
    }

    /// Verify a password against a hash
    fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        verify(password, hash).map_err(|e| anyhow!("Failed to verify password: {}", e))
    }

    /// Generate access and refresh tokens for a user
    async fn generate_tokens(&self, user: &UserRecord) -> Result<AuthTokens> {
        let now = Utc::now();
        let access_exp = now + Duration::seconds(self.config.access_token_lifetime);
        let refresh_exp = now + Duration::seconds(self.config.refresh_token_lifetime);

        let access_claims = AccessTokenClaims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            is_staff: user.is_staff,
            token_type: "access".to_string(),
            exp: access_exp.timestamp(),
            iat: now.timestamp(),
        };

        let access_token = encode(
            &Header::new(Algorithm::HS256),
            &access_claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| anyhow!("Failed to create access token: {}", e))?;

        let refresh_claims = RefreshTokenClaims {
            sub: user.id.to_string(),
            token_type: "refresh".to_string(),
            jti: Uuid::new_v4().to_string(),
            exp: refresh_exp.timestamp(),
            iat: now.timestamp(),
        };

        let refresh_token = encode(
            &Header::new(Algorithm::HS256),
            &refresh_claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_bytes()),
        )
        .map_err(|e| anyhow!("Failed to create refresh token: {}", e))?;

        self.db
            .users()
            .create_refresh_token(user.id, &hash_token(&refresh_token), refresh_exp)
            .await?;

        Ok(AuthTokens {
            access_token,
            refresh_token,
            expires_in: self.config.access_token_lifetime,
            token_type: "Bearer".to_string(),
        })
    }

    /// Decode and validate access token
    fn decode_access_token(&self, token: &str) -> Result<AccessTokenClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        let token_data = decode::<AccessTokenClaims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| anyhow!("Invalid access token: {}", e))?;

        if token_data.claims.token_type != "access" {
            return Err(anyhow!("Invalid token type"));
        }

        Ok(token_data.claims)
    }

    /// Decode and validate refresh token
    fn decode_refresh_token(&self, token: &str) -> Result<RefreshTokenClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        let token_data = decode::<RefreshTokenClaims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| anyhow!("Invalid refresh token: {}", e))?;

        if token_data.claims.token_type != "refresh" {
            return Err(anyhow!("Invalid token type"));
        }

        Ok(token_data.claims)
    }

    /// Clean up expired refresh tokens
    pub async fn cleanup_expired_tokens(&self) -> Result<u64> {
        self.db.users().cleanup_expired_refresh_tokens().await
    }
}

/// Hash a token for storage (SHA-256, hex)
fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn user_identity(user: &UserRecord) -> AuthenticatedUser {
    AuthenticatedUser {
        id: user.id,
        username: user.username.clone(),
        is_staff: user.is_staff,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_token_is_stable_and_hex() {
        let a = hash_token("some-refresh-token");
        let b = hash_token("some-refresh-token");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_hash_token_differs_per_input() {
        assert_ne!(hash_token("one"), hash_token("two"));
    }
}
