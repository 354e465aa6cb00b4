//! Engine configuration management

use std::env;

use anyhow::{Context, Result};

/// Engine configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Database path or URL (SQLite)
    /// Use DATABASE_PATH or DATABASE_URL with sqlite:// prefix
    pub database_url: String,

    /// Bcrypt cost factor for the password write transform
    pub bcrypt_cost: u32,

    /// Page size applied when a query omits one
    pub default_page_size: i64,

    /// Upper bound on client-requested page sizes
    pub max_page_size: i64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        // Prefer DATABASE_PATH, fall back to DATABASE_URL
        let database_url = env::var("DATABASE_PATH")
            .or_else(|_| env::var("DATABASE_URL"))
            .unwrap_or_else(|_| "./data/archivist.db".to_string());

        Ok(Self {
            database_url,

            bcrypt_cost: env::var("BCRYPT_COST")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(bcrypt::DEFAULT_COST),

            default_page_size: env::var("DEFAULT_PAGE_SIZE")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("Invalid DEFAULT_PAGE_SIZE")?,

            max_page_size: env::var("MAX_PAGE_SIZE")
                .unwrap_or_else(|_| "100".to_string())
                .parse()
                .context("Invalid MAX_PAGE_SIZE")?,
        })
    }
}
