use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ModelMindError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project configuration
    pub project: ProjectConfig,

    /// File discovery settings
    pub scan: ScanConfig,

    /// Mind-map export settings
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Project display name, used as the title of the sheet's root topic
    pub name: String,

    /// Root of the source tree to scan
    pub source_root: PathBuf,
}

/// How a directory is turned into a module key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GroupBy {
    /// Final path component only; same-named directories overwrite each other
    #[default]
    LastSegment,

    /// Path relative to the scan root
    RelativePath,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Stem searched for in file names
    pub name_stem: String,

    /// Glob prefix placed before the stem
    pub prefix: String,

    /// Glob suffix placed after the stem
    pub suffix: String,

    /// Match file names case-insensitively
    pub case_insensitive: bool,

    /// Visit directory entries in file-name order
    pub sorted: bool,

    /// Module grouping key
    pub group_by: GroupBy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Output document path (defaults to `<project name>.xmind.json`)
    pub output: Option<PathBuf>,

    /// Title of the single sheet written on export
    pub sheet_title: String,

    /// Label of the topic that holds all modules
    pub root_label: String,

    /// Attach each class's base expression as the topic note
    pub base_notes: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            name_stem: "models".to_string(),
            prefix: "*".to_string(),
            suffix: ".py".to_string(),
            case_insensitive: false,
            sorted: false,
            group_by: GroupBy::LastSegment,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output: None,
            sheet_title: "Canvas".to_string(),
            root_label: "models".to_string(),
            base_notes: false,
        }
    }
}

impl ScanConfig {
    /// The shell-style glob matched against file names
    pub fn pattern(&self) -> String {
        format!("{}{}{}", self.prefix, self.name_stem, self.suffix)
    }
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| ModelMindError::Config(e.to_string()))?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ModelMindError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration with fallback to default
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => {
                if p.as_ref().exists() {
                    Self::load(p)
                } else {
                    Ok(Self::default())
                }
            }
            None => {
                let candidates = ["modelmind.toml", ".modelmind.toml"];

                for candidate in &candidates {
                    if Path::new(candidate).exists() {
                        return Self::load(candidate);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    /// Check the settings a run cannot start without
    pub fn validate(&self) -> Result<()> {
        if self.project.source_root.as_os_str().is_empty() || !self.project.source_root.exists() {
            return Err(ModelMindError::Config(format!(
                "source root '{}' does not exist, set project.source_root first",
                self.project.source_root.display()
            )));
        }

        if self.project.name.trim().is_empty() {
            return Err(ModelMindError::Config(
                "project name is empty, set project.name first".to_string(),
            ));
        }

        Ok(())
    }

    /// Where the exported document is written
    pub fn output_path(&self) -> PathBuf {
        self.export
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}.xmind.json", self.project.name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_pattern() {
        let config = Config::default();
        assert_eq!(config.scan.pattern(), "*models.py");
        assert_eq!(config.export.root_label, "models");
        assert!(!config.export.base_notes);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
[project]
name = "shop"
source_root = "/srv/shop"

[scan]
sorted = true
group_by = "relative-path"
"#,
        )
        .unwrap();

        assert_eq!(config.project.name, "shop");
        assert!(config.scan.sorted);
        assert_eq!(config.scan.group_by, GroupBy::RelativePath);
        assert_eq!(config.scan.suffix, ".py");
        assert_eq!(config.export.sheet_title, "Canvas");
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("modelmind.toml");

        let mut config = Config::default();
        config.project.name = "blog".to_string();
        config.export.base_notes = true;
        config.save(&path).unwrap();

        let loaded = Config::load_or_default(Some(&path)).unwrap();
        assert_eq!(loaded.project.name, "blog");
        assert!(loaded.export.base_notes);
    }

    #[test]
    fn test_validate_rejects_missing_root() {
        let mut config = Config::default();
        config.project.name = "blog".to_string();
        config.project.source_root = PathBuf::from("/definitely/not/here");

        assert!(matches!(config.validate(), Err(ModelMindError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_empty_name() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.project.source_root = dir.path().to_path_buf();

        assert!(matches!(config.validate(), Err(ModelMindError::Config(_))));

        config.project.name = "blog".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_output_path_defaults_to_project_name() {
        let mut config = Config::default();
        config.project.name = "blog".to_string();
        assert_eq!(config.output_path(), PathBuf::from("blog.xmind.json"));

        config.export.output = Some(PathBuf::from("out/map.json"));
        assert_eq!(config.output_path(), PathBuf::from("out/map.json"));
    }
}
