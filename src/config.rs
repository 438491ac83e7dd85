//! Formatter configuration.
//!
//! Settings come from built-in defaults, then an optional `.sutrafmt.json`
//! found by walking up from the file being formatted, then command-line
//! flags. Unknown keys in the file are rejected so that typos do not go
//! unnoticed.
//!
//! ```json
//! { "width": 100, "blank_lines": 1 }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{err_msg, FormatError, DEFAULT_WIDTH};

/// File name looked up by [`FormatConfig::discover`].
pub const CONFIG_FILE_NAME: &str = ".sutrafmt.json";

/// Layout settings for one formatting run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormatConfig {
    /// Page width in columns.
    pub width: usize,
    /// Empty lines between top-level forms.
    pub blank_lines: usize,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            blank_lines: 0,
        }
    }
}

impl FormatConfig {
    pub fn with_width(width: usize) -> Self {
        Self {
            width,
            ..Default::default()
        }
    }

    /// Parses and validates a JSON configuration.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use sutra_fmt::config::FormatConfig;
    /// let config = FormatConfig::from_json(r#"{ "width": 60 }"#).unwrap();
    /// assert_eq!(config.width, 60);
    /// assert_eq!(config.blank_lines, 0);
    /// assert!(FormatConfig::from_json(r#"{ "widht": 60 }"#).is_err());
    /// ```
    pub fn from_json(text: &str) -> Result<Self, FormatError> {
        let config: FormatConfig = serde_json::from_str(text).map_err(|e| FormatError::Config {
            message: format!("invalid configuration: {}", e),
            ctx: crate::ErrorContext::none(),
            source: Some(Box::new(e)),
        })?;
        config.validate()
    }

    /// Reads the configuration file at `path`.
    pub fn load(path: &Path) -> Result<Self, FormatError> {
        let text = std::fs::read_to_string(path).map_err(|e| FormatError::io(path.display(), e))?;
        Self::from_json(&text).map_err(|e| match e {
            FormatError::Config { message, ctx, source } => FormatError::Config {
                message: format!("{}: {}", path.display(), message),
                ctx,
                source,
            },
            other => other,
        })
    }

    /// Nearest `.sutrafmt.json` in `start` or one of its ancestors.
    pub fn find(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .find(|candidate| candidate.is_file())
    }

    /// Loads the nearest configuration file, or the defaults if there is none.
    pub fn discover(start: &Path) -> Result<Self, FormatError> {
        match Self::find(start) {
            Some(path) => {
                debug!(path = %path.display(), "using configuration file");
                Self::load(&path)
            }
            None => Ok(Self::default()),
        }
    }

    fn validate(self) -> Result<Self, FormatError> {
        if self.width == 0 {
            return Err(err_msg!(Config, "width must be at least 1"));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::ErrorType;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("sutra-fmt-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(dir.join("nested/deeper")).unwrap();
        dir
    }

    #[test]
    fn defaults() {
        assert_eq!(
            FormatConfig::default(),
            FormatConfig {
                width: 80,
                blank_lines: 0
            }
        );
        assert_eq!(FormatConfig::from_json("{}").unwrap(), FormatConfig::default());
    }

    #[test]
    fn zero_width_is_rejected() {
        let err = FormatConfig::from_json(r#"{ "width": 0 }"#).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Config);
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = FormatConfig::from_json("{ width: ").unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Config);
    }

    #[test]
    fn discovery_walks_up() {
        let dir = scratch_dir("discover");
        std::fs::write(dir.join(CONFIG_FILE_NAME), r#"{ "blank_lines": 1 }"#).unwrap();
        let config = FormatConfig::discover(&dir.join("nested/deeper")).unwrap();
        assert_eq!(config.blank_lines, 1);
        assert_eq!(config.width, DEFAULT_WIDTH);
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn invalid_file_names_the_path() {
        let dir = scratch_dir("invalid");
        let path = dir.join(CONFIG_FILE_NAME);
        std::fs::write(&path, r#"{ "width": "wide" }"#).unwrap();
        let err = FormatConfig::load(&path).unwrap_err();
        assert!(err.message().contains(CONFIG_FILE_NAME));
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
