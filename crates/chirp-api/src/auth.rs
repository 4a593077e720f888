use std::sync::Arc;

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use chirp_db::Database;
use chirp_types::api::{
    AuthResponse, Claims, FieldError, LoginRequest, PublicUser, RegisterRequest, VerifyResponse,
};

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub auth: AuthConfig,
}

/// Token-signing secret plus password hashing cost parameters. Built once
/// at startup and shared through AppState.
pub struct AuthConfig {
    jwt_secret: String,
    token_hours: i64,
    hasher: Argon2<'static>,
}

impl AuthConfig {
    pub fn new(
        jwt_secret: String,
        token_hours: i64,
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> anyhow::Result<Self> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| anyhow::anyhow!("Invalid Argon2 parameters: {}", e))?;

        Ok(Self {
            jwt_secret,
            token_hours,
            hasher: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Default cost parameters and a 24-hour token lifetime.
    pub fn dev(jwt_secret: &str) -> Self {
        Self {
            jwt_secret: jwt_secret.to_string(),
            token_hours: 24,
            hasher: Argon2::default(),
        }
    }

    /// Hash a password with a fresh random salt, yielding a PHC string.
    pub fn hash_password(&self, password: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .hasher
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Password hashing failed: {}", e))?;
        Ok(hash.to_string())
    }

    /// Verify a password against a stored PHC string.
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> anyhow::Result<bool> {
        let parsed = PasswordHash::new(stored_hash)
            .map_err(|e| anyhow::anyhow!("Stored hash is not a valid PHC string: {}", e))?;
        Ok(self
            .hasher
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    /// Sign a fresh self-contained token for this identity.
    pub fn issue_token(&self, user_id: i64, username: &str) -> anyhow::Result<String> {
        let now = chrono::Utc::now();
        let claims = Claims {
            sub: user_id,
            username: username.to_string(),
            iat: now.timestamp() as usize,
            exp: (now + chrono::Duration::hours(self.token_hours)).timestamp() as usize,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )?;

        Ok(token)
    }

    /// Validate signature and expiry, returning the embedded claims.
    pub fn decode_token(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(data.claims)
    }
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut errors = Vec::new();
    if req.username.chars().count() < 3 {
        errors.push(FieldError {
            field: "username".to_string(),
            message: "Username must be at least 3 characters".to_string(),
        });
    }
    if req.password.chars().count() < 6 {
        errors.push(FieldError {
            field: "password".to_string(),
            message: "Password must be at least 6 characters".to_string(),
        });
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    if state.db.get_user_by_username(&req.username)?.is_some() {
        return Err(ApiError::Conflict("Username already exists"));
    }

    let password_hash = state.auth.hash_password(&req.password)?;
    let user_id = state.db.create_user(&req.username, &password_hash)?;
    let token = state.auth.issue_token(user_id, &req.username)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            message: "User created successfully".to_string(),
            token,
            user: PublicUser {
                id: user_id,
                username: req.username,
            },
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut errors = Vec::new();
    if req.username.is_empty() {
        errors.push(FieldError {
            field: "username".to_string(),
            message: "Username is required".to_string(),
        });
    }
    if req.password.is_empty() {
        errors.push(FieldError {
            field: "password".to_string(),
            message: "Password is required".to_string(),
        });
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    // Unknown username and wrong password take the same exit, so the
    // response never reveals which of the two was wrong.
    let user = state
        .db
        .get_user_by_username(&req.username)?
        .ok_or(ApiError::Unauthorized("Invalid credentials"))?;

    if !state.auth.verify_password(&req.password, &user.password)? {
        return Err(ApiError::Unauthorized("Invalid credentials"));
    }

    let token = state.auth.issue_token(user.id, &user.username)?;

    Ok(Json(AuthResponse {
        success: true,
        message: "Login successful".to_string(),
        token,
        user: PublicUser {
            id: user.id,
            username: user.username,
        },
    }))
}

/// The middleware already validated the token; echo the claims back.
pub async fn verify(Extension(claims): Extension<Claims>) -> impl IntoResponse {
    Json(VerifyResponse {
        success: true,
        user: PublicUser {
            id: claims.sub,
            username: claims.username,
        },
    })
}
