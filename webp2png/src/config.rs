use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::image::PngCompression;

/// What to do when the decoder reports a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Log the status and still download whatever the surface holds
    #[default]
    DownloadAnyway,
    /// Stop before serializing the surface
    Abort,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    pub surface_id: String,
    pub default_output_name: String,
    // Without the leading dot, matched case-insensitively
    pub accepted_extension: String,
    pub png_compression: PngCompression,
    pub failure_policy: FailurePolicy,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            surface_id: "output_canvas".to_string(),
            default_output_name: "download.png".to_string(),
            accepted_extension: "webp".to_string(),
            png_compression: PngCompression::Default,
            failure_policy: FailurePolicy::DownloadAnyway,
        }
    }
}

impl ConvertConfig {
    pub fn load() -> Option<Self> {
        let config_path = Self::config_path()?;

        fs::read_to_string(&config_path)
            .ok()
            .and_then(|contents| serde_json::from_str(&contents).ok())
    }

    pub fn save(&self) -> Option<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path).ok()
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        serde_json::from_str(&contents).map_err(|e| std::io::Error::from(e).into())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::from)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn config_path() -> Option<PathBuf> {
        let home = std::env::home_dir()?;
        Some(home.join(".config").join("webp2png").join("config.json"))
    }

    /// Does `path` carry the accepted extension?
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.accepted_extension))
    }
}
