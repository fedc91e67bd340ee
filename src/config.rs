use serde::Deserialize;

/// Application settings, read from Rocket's figment (`Rocket.toml`,
/// `ROCKET_*` variables, or a plain `DATABASE_PATH`).
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_database_path")]
    pub database_path: String,
    /// Maximum number of messages shown on the home timeline.
    #[serde(default = "default_timeline_limit")]
    pub timeline_limit: u32,
}

fn default_database_path() -> String {
    "data/warbler.db".to_string()
}

fn default_timeline_limit() -> u32 {
    100
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_path: default_database_path(),
            timeline_limit: default_timeline_limit(),
        }
    }
}
