use serde::{Deserialize, Serialize};

use super::defaults::{default_batch_size, default_fence_languages, enabled};
use crate::error::{SuggestError, SuggestResult};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Upper bound of the visible batch; values below 1 are rejected
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    pub extraction: ExtractionSettings,
    pub apply: ApplySettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractionSettings {
    /// Strip `12:` / `12 |` prefixes the model copies into hunk bodies
    #[serde(default = "enabled")]
    pub strip_line_numbers: bool,
    #[serde(default = "default_fence_languages")]
    pub fence_languages: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ApplySettings {
    /// Refuse to apply a delete/replace whose lines changed since proposal
    #[serde(default = "enabled")]
    pub verify_original_text: bool,
    /// Announce edits dropped by conflicts as a queue event
    #[serde(default = "enabled")]
    pub report_conflicts: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            extraction: ExtractionSettings::default(),
            apply: ApplySettings::default(),
        }
    }
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            strip_line_numbers: true,
            fence_languages: default_fence_languages(),
        }
    }
}

impl Default for ApplySettings {
    fn default() -> Self {
        Self {
            verify_original_text: true,
            report_conflicts: true,
        }
    }
}

impl Settings {
    /// Parse settings from TOML, filling unspecified fields with defaults
    pub fn from_toml_str(source: &str) -> SuggestResult<Self> {
        let settings: Settings =
            toml::from_str(source).map_err(|err| SuggestError::config(err.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> SuggestResult<()> {
        if self.batch_size == 0 {
            return Err(SuggestError::config("batch_size must be at least 1"));
        }
        if self.extraction.fence_languages.is_empty() {
            return Err(SuggestError::config(
                "extraction.fence_languages must name at least one language",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let settings = Settings::from_toml_str("").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.batch_size, 5);
        assert!(settings.apply.verify_original_text);
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let settings = Settings::from_toml_str(
            r#"
            batch_size = 3

            [apply]
            report_conflicts = false
            "#,
        )
        .unwrap();
        assert_eq!(settings.batch_size, 3);
        assert!(!settings.apply.report_conflicts);
        assert!(settings.apply.verify_original_text);
        assert_eq!(settings.extraction.fence_languages, vec!["diff"]);
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let err = Settings::from_toml_str("batch_size = 0").unwrap_err();
        assert!(matches!(err, SuggestError::Config { .. }));
    }

    #[test]
    fn malformed_toml_is_a_config_error() {
        let err = Settings::from_toml_str("batch_size = \"five\"").unwrap_err();
        assert!(err.to_string().starts_with("Invalid configuration"));
    }
}
