use anyhow::{Context, Result};

/// Runtime configuration, read once at startup from the environment
/// (a .env file is honored if present).
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: String,
    pub jwt_secret: String,
    pub token_hours: i64,
    pub argon2_memory_kib: u32,
    pub argon2_iterations: u32,
    pub argon2_parallelism: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: env_or("CHIRP_HOST", "0.0.0.0"),
            port: env_or("CHIRP_PORT", "8000")
                .parse()
                .context("CHIRP_PORT must be a port number")?,
            db_path: env_or("CHIRP_DB_PATH", "chirp.db"),
            jwt_secret: env_or("CHIRP_JWT_SECRET", "dev-secret-change-me"),
            token_hours: env_or("CHIRP_TOKEN_HOURS", "24")
                .parse()
                .context("CHIRP_TOKEN_HOURS must be an integer")?,
            // Argon2id cost parameters; defaults match the crate's own.
            argon2_memory_kib: env_or("CHIRP_ARGON2_MEMORY_KIB", "19456")
                .parse()
                .context("CHIRP_ARGON2_MEMORY_KIB must be an integer")?,
            argon2_iterations: env_or("CHIRP_ARGON2_ITERATIONS", "2")
                .parse()
                .context("CHIRP_ARGON2_ITERATIONS must be an integer")?,
            argon2_parallelism: env_or("CHIRP_ARGON2_PARALLELISM", "1")
                .parse()
                .context("CHIRP_ARGON2_PARALLELISM must be an integer")?,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
