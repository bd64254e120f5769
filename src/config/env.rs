//! Environment variable handling and .env file loading

use crate::error::{AppError, Result};
use std::path::Path;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load `.env` from the current directory; returns whether a file was found
    pub fn load_env_file() -> Result<bool> {
        Self::load_env_file_from(Path::new(".env"))
    }

    /// Load a specific env file; a missing file is not an error
    pub fn load_env_file_from(path: &Path) -> Result<bool> {
        if !path.exists() {
            return Ok(false);
        }

        dotenv::from_path(path)
            .map_err(|e| AppError::config(format!("Failed to load {}: {}", path.display(), e)))?;
        Ok(true)
    }

    /// Validate an environment variable's format before it is merged
    pub fn validate_env_var(key: &str, value: &str) -> Result<()> {
        match key {
            "TARGET_URLS" => {
                for url in value.split(',').map(str::trim).filter(|u| !u.is_empty()) {
                    url::Url::parse(url)
                        .map_err(|e| AppError::config(format!("Invalid TARGET_URLS entry '{}': {}", url, e)))?;
                }
            }
            "TEST_COUNT" => {
                let count: u32 = value.parse()
                    .map_err(|e| AppError::config(format!("Invalid TEST_COUNT value '{}': {}", value, e)))?;
                if count == 0 || count > 1000 {
                    return Err(AppError::config(format!("TEST_COUNT must be between 1 and 1000, got: {}", count)));
                }
            }
            "TIMEOUT_MS" => {
                let timeout: u64 = value.parse()
                    .map_err(|e| AppError::config(format!("Invalid TIMEOUT_MS value '{}': {}", value, e)))?;
                if timeout == 0 || timeout > 300_000 {
                    return Err(AppError::config(format!("TIMEOUT_MS must be between 1 and 300000, got: {}", timeout)));
                }
            }
            "RETRIES" => {
                let retries: u32 = value.parse()
                    .map_err(|e| AppError::config(format!("Invalid RETRIES value '{}': {}", value, e)))?;
                if retries > 10 {
                    return Err(AppError::config(format!("RETRIES cannot exceed 10, got: {}", retries)));
                }
            }
            "INTERVAL_MS" => {
                let interval: u64 = value.parse()
                    .map_err(|e| AppError::config(format!("Invalid INTERVAL_MS value '{}': {}", value, e)))?;
                if interval > 60_000 {
                    return Err(AppError::config(format!("INTERVAL_MS cannot exceed 60000, got: {}", interval)));
                }
            }
            "ENABLE_COLOR" => {
                value.parse::<bool>()
                    .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", value, e)))?;
            }
            _ => {}
        }

        Ok(())
    }
}
