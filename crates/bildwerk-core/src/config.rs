// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BildwerkError, Result};

/// Settings shared by every tool. All fields fall back to their defaults when
/// missing from the JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// JPEG quality used whenever an image is re-encoded (1-100).
    pub jpeg_quality: u8,
    /// Resolution recorded for every page of an assembled PDF.
    pub pdf_dpi: f32,
    /// Zero padding of extracted file names (`0001.jpg` for 4).
    pub sequence_digits: usize,
    /// Title embedded in assembled PDFs. Defaults to the folder name.
    pub pdf_title: Option<String>,
    /// External program used to unpack MOBI files into a directory tree.
    /// When unset the built-in record reader is used.
    pub mobi_unpacker: Option<String>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: 85,
            pdf_dpi: 100.0,
            sequence_digits: 4,
            pdf_title: None,
            mobi_unpacker: None,
        }
    }
}

impl BatchConfig {
    /// Read a JSON config file and validate it.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            BildwerkError::Config(format!("cannot read {}: {}", path.display(), err))
        })?;
        let config: BatchConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise return the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(BildwerkError::Config(format!(
                "jpeg_quality must be between 1 and 100, got {}",
                self.jpeg_quality
            )));
        }
        if !(self.pdf_dpi.is_finite() && self.pdf_dpi > 0.0) {
            return Err(BildwerkError::Config(format!(
                "pdf_dpi must be positive, got {}",
                self.pdf_dpi
            )));
        }
        if self.sequence_digits == 0 {
            return Err(BildwerkError::Config("sequence_digits must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_tool_behaviour() {
        let config = BatchConfig::default();
        assert_eq!(config.jpeg_quality, 85);
        assert_eq!(config.pdf_dpi, 100.0);
        assert_eq!(config.sequence_digits, 4);
        assert!(config.mobi_unpacker.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bildwerk.json");
        std::fs::write(&path, r#"{ "jpeg_quality": 70, "mobi_unpacker": "kindleunpack" }"#).unwrap();

        let config = BatchConfig::load(Some(&path)).unwrap();
        assert_eq!(config.jpeg_quality, 70);
        assert_eq!(config.mobi_unpacker.as_deref(), Some("kindleunpack"));
        assert_eq!(config.pdf_dpi, 100.0);
    }

    #[test]
    fn missing_path_means_defaults() {
        assert_eq!(BatchConfig::load(None).unwrap(), BatchConfig::default());
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let config = BatchConfig {
            jpeg_quality: 0,
            ..BatchConfig::default()
        };
        assert!(matches!(config.validate(), Err(BildwerkError::Config(_))));

        let config = BatchConfig {
            pdf_dpi: -1.0,
            ..BatchConfig::default()
        };
        assert!(config.validate().is_err());

        let config = BatchConfig {
            sequence_digits: 0,
            ..BatchConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            BatchConfig::from_file(&path),
            Err(BildwerkError::Serialization(_))
        ));

        let missing = dir.path().join("absent.json");
        assert!(matches!(BatchConfig::from_file(&missing), Err(BildwerkError::Config(_))));
    }
}
