use serde::Deserialize;

use crate::pool::DEFAULT_MAX_SIZE;

/// Top-level configuration settings for the application.
///
/// Includes settings for the message pool and for logging.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Settings {
    pub pool: PoolSettings,
    pub logging: LoggingSettings,
}

/// Configuration settings for the message pool.
///
/// `max_size` bounds how many released messages are kept for reuse.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct PoolSettings {
    pub max_size: usize,
}

/// Configuration settings for logging.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    pub level: String,
}

/// Partial configuration settings loaded from files or environment.
///
/// Allows partial specification of settings. Missing values can be filled using defaults.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub pool: Option<PartialPoolSettings>,
    pub logging: Option<PartialLoggingSettings>,
}

/// Partial pool settings.
#[derive(Debug, Deserialize)]
pub struct PartialPoolSettings {
    pub max_size: Option<usize>,
}

/// Partial logging settings.
#[derive(Debug, Deserialize)]
pub struct PartialLoggingSettings {
    pub level: Option<String>,
}

/// Provides default values for `Settings`.
///
/// Ensures the application has sensible defaults if no configuration is provided.
impl Default for Settings {
    fn default() -> Self {
        Self {
            pool: PoolSettings {
                max_size: DEFAULT_MAX_SIZE,
            },
            logging: LoggingSettings {
                level: "info".to_string(),
            },
        }
    }
}

impl PartialSettings {
    /// Merge with `defaults`, preferring any value that was provided.
    pub fn merge(self, defaults: Settings) -> Settings {
        Settings {
            pool: PoolSettings {
                max_size: self
                    .pool
                    .and_then(|p| p.max_size)
                    .unwrap_or(defaults.pool.max_size),
            },
            logging: LoggingSettings {
                level: self
                    .logging
                    .and_then(|l| l.level)
                    .unwrap_or(defaults.logging.level),
            },
        }
    }
}
