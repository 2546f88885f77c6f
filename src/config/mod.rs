/// Database connection and table creation
pub mod database;

/// Application settings from `lakein.toml` and the environment
pub mod settings;
