use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::Duration;
use notifyhub_config::{AuthConfig, MAX_TOKEN_TTL_MINUTES};
use notifyhub_database::{CreateUserRequest, Preferences, User, UserError, UserRepository};
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info};

pub mod token;
pub mod validation;

pub use token::{Claims, IssuedToken, TokenIssuer};
pub use validation::{validate_email, validate_password};

#[derive(Clone)]
pub struct Authenticator {
    users: UserRepository,
    tokens: TokenIssuer,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("user already exists")]
    UserExists,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("invalid token")]
    InvalidToken,
    #[error("token expired")]
    TokenExpired,
    #[error("{0}")]
    Validation(String),
    #[error("password hashing failed: {0}")]
    PasswordHash(#[from] argon2::password_hash::Error),
    #[error("token encoding failed: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error("user store error: {0}")]
    Store(UserError),
}

impl From<UserError> for AuthError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::EmailAlreadyExists => AuthError::UserExists,
            other => AuthError::Store(other),
        }
    }
}

impl Authenticator {
    pub fn new(pool: SqlitePool, config: &AuthConfig) -> Self {
        let ttl_minutes = config.token_ttl_minutes.min(MAX_TOKEN_TTL_MINUTES) as i64;
        let tokens = TokenIssuer::new(
            &config.secret,
            config.issuer.clone(),
            Duration::minutes(ttl_minutes),
        );

        Self::with_issuer(UserRepository::new(pool), tokens)
    }

    pub fn with_issuer(users: UserRepository, tokens: TokenIssuer) -> Self {
        Self { users, tokens }
    }

    pub fn users(&self) -> &UserRepository {
        &self.users
    }

    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    /// Register a new subscriber with a hashed password.
    pub async fn subscribe(
        &self,
        email: &str,
        password: &str,
        preferences: Preferences,
    ) -> Result<User, AuthError> {
        validate_email(email)?;
        validate_password(password)?;

        let password_hash = hash_password(password)?;
        let user = self
            .users
            .create(&CreateUserRequest {
                email: email.to_owned(),
                password_hash,
                preferences,
            })
            .await?;

        info!(user_id = user.id, public_id = %user.public_id, "subscriber registered");
        Ok(user)
    }

    /// Check a password and issue an access token for the account.
    pub async fn login(&self, email: &str, password: &str) -> Result<IssuedToken, AuthError> {
        let Some(user) = self.users.find_by_email(email).await? else {
            debug!("login attempt for unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        let stored_hash = PasswordHash::new(&user.password_hash)?;
        Argon2::default()
            .verify_password(password.as_bytes(), &stored_hash)
            .map_err(|_| AuthError::InvalidCredentials)?;

        self.tokens.issue(&user.email)
    }

    /// Resolve a bearer token to the user it was issued for.
    pub async fn authenticate_token(&self, token: &str) -> Result<User, AuthError> {
        let claims = self.tokens.validate(token)?;

        self.users
            .find_by_email(&claims.sub)
            .await?
            .ok_or(AuthError::InvalidToken)
    }
}

fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}
