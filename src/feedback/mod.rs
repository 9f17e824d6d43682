//! The one piece of persisted local state: whether the user dismissed the
//! feedback prompt shown on the result screen.

use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackFlag {
    pub version: u32,
    #[serde(default)]
    pub dismissed_at: Option<DateTime<Utc>>,
}

impl Default for FeedbackFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedbackFlag {
    pub fn new() -> Self {
        Self {
            version: 1,
            dismissed_at: None,
        }
    }

    pub fn is_dismissed(&self) -> bool {
        self.dismissed_at.is_some()
    }

    pub fn dismiss(&mut self) {
        self.dismissed_at = Some(Utc::now());
    }
}

/// Get the default flag file path (~/.config/stemfit/feedback.json)
pub fn get_feedback_path() -> PathBuf {
    crate::config::get_config_dir().join("feedback.json")
}

/// Load the flag from a JSON file. A missing file means the prompt has
/// never been dismissed.
pub fn load_feedback_flag(path: &Path) -> Result<FeedbackFlag> {
    if !path.exists() {
        return Ok(FeedbackFlag::new());
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open feedback flag file at {}", path.display()))?;

    let flag: FeedbackFlag =
        serde_json::from_reader(file).context("Failed to load feedback flag")?;

    if flag.version != 1 {
        anyhow::bail!("Unsupported feedback flag version: {}", flag.version);
    }

    Ok(flag)
}

/// Save the flag atomically so the file is never left half-written.
pub fn save_feedback_flag(path: &Path, flag: &FeedbackFlag) -> Result<()> {
    crate::config::ensure_config_dir()?;

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, flag).context("Failed to serialize feedback flag")?;

    file.commit().context("Failed to save feedback flag")?;

    Ok(())
}
