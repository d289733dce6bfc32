//! Application configuration management.
//!
//! This module handles loading configuration from environment
//! variables. It uses the `envy` crate to automatically deserialize
//! environment variables into a type-safe struct.

use serde::Deserialize;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `DATABASE_URL` (required): PostgreSQL connection string
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 3000
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,

    #[serde(default = "default_port")]
    pub server_port: u16,
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Loads a `.env` file first if one exists, then deserializes the
    /// environment into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if required variables are missing (e.g.
    /// DATABASE_URL) or cannot be parsed into the expected types.
    pub fn from_env() -> Result<Self, envy::Error> {
        // Try to load .env file if it exists (does nothing if not found)
        dotenvy::dotenv().ok();

        envy::from_env::<Config>()
    }
}
