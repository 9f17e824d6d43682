use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8000/api/evaluate";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);
pub const DEFAULT_SCORE_ANIMATION: Duration = Duration::from_millis(900);

/// On-disk config shape. All fields optional; durations are humantime
/// strings ("20s", "900ms").
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ConfigFile {
    pub endpoint: Option<String>,
    pub timeout: Option<String>,
    pub score_animation: Option<String>,
}

/// Resolved configuration used by the rest of the app.
#[derive(Debug, Clone)]
pub struct Config {
    pub endpoint: String,
    pub timeout: Duration,
    pub score_animation: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            score_animation: DEFAULT_SCORE_ANIMATION,
        }
    }
}
