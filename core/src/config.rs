use crate::error::ReportError;
use crate::ident::DEVICE_FILE_PREFIX;
use serde::{Deserialize, Serialize};

/// Everything the assembler needs to know that is not in the snapshot.
///
/// Deserializes with `#[serde(default)]`, so a config file only has to name
/// the settings it changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReportConfig {
    pub title: String,
    pub tagline: String,
    pub menu_file_name: String,
    pub index_style: IndexStyle,
    pub timeline_label: TimelineLabel,
    pub chart_mode: ChartMode,
    pub logos: Vec<LogoAsset>,
    pub table_enhancement: Option<TableEnhancement>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum IndexStyle {
    #[default]
    Table,
    Links,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimelineLabel {
    #[default]
    Mac,
    Composite,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ChartMode {
    #[default]
    Markers,
    LinesAndMarkers,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogoAsset {
    pub src: String,
    pub alt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableEnhancement {
    pub stylesheets: Vec<String>,
    pub scripts: Vec<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: "NetProbe".to_string(),
            tagline: "Devices seen on the network and their protocol activity".to_string(),
            menu_file_name: "menu.html".to_string(),
            index_style: IndexStyle::default(),
            timeline_label: TimelineLabel::default(),
            chart_mode: ChartMode::default(),
            logos: vec![
                LogoAsset {
                    src: "images/lab-logo.png".to_string(),
                    alt: "Laboratory logo".to_string(),
                },
                LogoAsset {
                    src: "images/netprobe-logo.webp".to_string(),
                    alt: "NetProbe logo".to_string(),
                },
            ],
            table_enhancement: Some(TableEnhancement::default()),
        }
    }
}

impl Default for TableEnhancement {
    fn default() -> Self {
        Self {
            stylesheets: vec![
                "https://cdn.datatables.net/1.13.5/css/jquery.dataTables.min.css".to_string(),
            ],
            scripts: vec![
                "https://code.jquery.com/jquery-3.6.0.min.js".to_string(),
                "https://cdn.datatables.net/1.13.5/js/jquery.dataTables.min.js".to_string(),
            ],
        }
    }
}

impl ReportConfig {
    pub fn validate(&self) -> Result<(), ReportError> {
        let name = self.menu_file_name.trim();
        if name.is_empty() {
            return Err(ReportError::InvalidConfig(
                "menu_file_name must not be empty".to_string(),
            ));
        }
        if name.contains(&['/', '\\'][..]) || name == "." || name == ".." {
            return Err(ReportError::InvalidConfig(format!(
                "menu_file_name '{name}' must be a plain file name"
            )));
        }
        if name.starts_with(DEVICE_FILE_PREFIX) {
            return Err(ReportError::InvalidConfig(format!(
                "menu_file_name '{name}' would collide with device pages"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let config = ReportConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.menu_file_name, "menu.html");
        assert_eq!(config.index_style, IndexStyle::Table);
    }

    #[test]
    fn rejects_menu_names_outside_the_output_directory() {
        for bad in ["", "../menu.html", "sub/menu.html", "..", "device_menu.html"] {
            let config = ReportConfig {
                menu_file_name: bad.to_string(),
                ..ReportConfig::default()
            };
            let err = config.validate().expect_err("should be rejected");
            assert_eq!(err.step(), "config", "{bad}");
        }
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config: ReportConfig =
            serde_json::from_str(r#"{"index_style": "links", "logos": []}"#)
                .expect("partial config parses");
        assert_eq!(config.index_style, IndexStyle::Links);
        assert!(config.logos.is_empty());
        assert_eq!(config.menu_file_name, "menu.html");
        assert_eq!(config.chart_mode, ChartMode::Markers);
    }
}
