//! Engine configuration

use crate::Result;
use serde::{Deserialize, Serialize};

/// Regular and bold font file names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontFiles {
    pub regular: String,
    #[serde(default)]
    pub bold: Option<String>,
}

impl FontFiles {
    pub fn new(regular: &str, bold: Option<&str>) -> Self {
        Self {
            regular: regular.to_string(),
            bold: bold.map(str::to_string),
        }
    }
}

/// Fonts for Latin text and for the complex script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FontConfig {
    pub latin: FontFiles,
    pub script: FontFiles,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            latin: FontFiles::new("NotoSerif-Regular.ttf", Some("NotoSerif-Bold.ttf")),
            script: FontFiles::new(
                "NotoSansTamil-Regular.ttf",
                Some("NotoSansTamil-Bold.ttf"),
            ),
        }
    }
}

/// Header text used when church metadata leaves a field out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetadataDefaults {
    pub diocese: String,
    /// Suffix appended to a pastorate name in the header
    pub pastorate_suffix: String,
}

impl Default for MetadataDefaults {
    fn default() -> Self {
        Self {
            diocese: "Tirunelveli Diocese".to_string(),
            pastorate_suffix: "Pastorate".to_string(),
        }
    }
}

/// Report engine configuration
///
/// Every key is optional in JSON; missing keys take the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReportConfig {
    pub fonts: FontConfig,
    /// Serving path of font files, relative to the application root
    pub asset_dir: String,
    /// Bitmap resolution over page resolution for rasterized text
    pub supersample: f32,
    /// Bound on cached raster runs; unbounded when absent
    pub cache_capacity: Option<usize>,
    pub families_per_page: usize,
    pub max_members_per_family: usize,
    /// Log draws that reach outside the page
    pub debug_bounds: bool,
    pub defaults: MetadataDefaults,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            fonts: FontConfig::default(),
            asset_dir: "assets/fonts".to_string(),
            supersample: tamil_text::DEFAULT_SUPERSAMPLE,
            cache_capacity: None,
            families_per_page: 2,
            max_members_per_family: 10,
            debug_bounds: false,
            defaults: MetadataDefaults::default(),
        }
    }
}

impl ReportConfig {
    /// Parse configuration from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.normalized())
    }

    /// Replace unusable values with defaults
    pub fn normalized(mut self) -> Self {
        if self.families_per_page == 0 {
            log::warn!("familiesPerPage must be at least 1, using 1");
            self.families_per_page = 1;
        }
        if !(self.supersample.is_finite() && self.supersample > 0.0) {
            log::warn!(
                "invalid supersample {}, using {}",
                self.supersample,
                tamil_text::DEFAULT_SUPERSAMPLE
            );
            self.supersample = tamil_text::DEFAULT_SUPERSAMPLE;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_json_is_default() {
        let config = ReportConfig::from_json("{}").unwrap();
        assert_eq!(config, ReportConfig::default());
        assert_eq!(config.families_per_page, 2);
        assert_eq!(config.max_members_per_family, 10);
        assert_eq!(config.defaults.diocese, "Tirunelveli Diocese");
        assert_eq!(config.cache_capacity, None);
        assert!((config.supersample - 300.0 / 72.0).abs() < 1e-6);
    }

    #[test]
    fn test_partial_json() {
        let config = ReportConfig::from_json(
            r#"{
                "fonts": { "script": { "regular": "Latha.ttf" } },
                "familiesPerPage": 3,
                "cacheCapacity": 256,
                "defaults": { "diocese": "Madurai-Ramnad Diocese" }
            }"#,
        )
        .unwrap();

        assert_eq!(config.fonts.script, FontFiles::new("Latha.ttf", None));
        assert_eq!(config.fonts.latin, FontConfig::default().latin);
        assert_eq!(config.families_per_page, 3);
        assert_eq!(config.cache_capacity, Some(256));
        assert_eq!(config.defaults.diocese, "Madurai-Ramnad Diocese");
        assert_eq!(config.defaults.pastorate_suffix, "Pastorate");
    }

    #[test]
    fn test_normalized() {
        let config = ReportConfig::from_json(r#"{ "familiesPerPage": 0, "supersample": -1 }"#)
            .unwrap();
        assert_eq!(config.families_per_page, 1);
        assert!(config.supersample > 0.0);
    }
}
