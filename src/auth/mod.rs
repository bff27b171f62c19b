use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use argon2::password_hash::{SaltString, rand_core::OsRng};
use chrono::{Duration, Utc};
use cookie::{Cookie, SameSite};

use crate::{
    config::AuthConfig,
    error::{AppError, Result},
};

pub mod session;

use session::{Session, SessionStore};

pub const SESSION_COOKIE: &str = "session";

/// The single admin password plus the sessions it has opened.
pub struct AuthService {
    password_hash: String,
    session_duration_hours: i64,
    session_store: SessionStore,
}

impl AuthService {
    /// Uses the configured Argon2 hash when present, otherwise hashes the
    /// plain password once at startup.
    pub fn new(config: &AuthConfig) -> Result<Self> {
        let password_hash = match (&config.admin_password_hash, &config.admin_password) {
            (Some(hash), _) => {
                PasswordHash::new(hash)
                    .map_err(|e| AppError::Internal(format!("Invalid password hash: {}", e)))?;
                hash.clone()
            }
            (None, Some(password)) => Self::hash_password(password)?,
            (None, None) => {
                return Err(AppError::Internal(
                    "No admin password configured (set auth.admin_password or auth.admin_password_hash)"
                        .to_string(),
                ))
            }
        };

        Ok(Self {
            password_hash,
            session_duration_hours: config.session_duration_hours,
            session_store: SessionStore::new(),
        })
    }

    pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::Internal(format!("Invalid password hash: {}", e)))?;

        let argon2 = Argon2::default();

        Ok(argon2.verify_password(password.as_bytes(), &parsed_hash).is_ok())
    }

    pub fn hash_password(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        Ok(password_hash.to_string())
    }

    /// Checks the admin password and opens a session. Returns the raw token
    /// for the cookie.
    pub async fn login(&self, password: &str) -> Result<(Session, String)> {
        if !Self::verify_password(password, &self.password_hash)? {
            tracing::warn!("Failed admin login attempt");
            return Err(AppError::Unauthorized);
        }

        self.session_store.cleanup_expired().await;

        let token = generate_token();
        let expires_at = Utc::now() + Duration::hours(self.session_duration_hours);
        let session = self.session_store.create(&token, expires_at).await;

        tracing::info!("Admin session {} opened", session.id);
        Ok((session, token))
    }

    pub async fn validate_session(&self, token: &str) -> Option<Session> {
        self.session_store.find_by_token(token).await
    }

    pub async fn invalidate_session(&self, token: &str) {
        self.session_store.delete_by_token(token).await
    }

    pub fn create_session_cookie(&self, token: &str, secure: bool) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, token.to_string()))
            .path("/")
            .same_site(SameSite::Lax)
            .http_only(true)
            .secure(secure)
            .max_age(cookie::time::Duration::hours(self.session_duration_hours))
            .build()
    }

    pub fn create_logout_cookie() -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, ""))
            .path("/")
            .same_site(SameSite::Lax)
            .http_only(true)
            .max_age(cookie::time::Duration::seconds(0))
            .build()
    }
}

fn generate_token() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
