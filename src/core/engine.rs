// src/core/engine.rs
use std::path::{Path, PathBuf};
use anyhow::Result;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::ModelMindError;
use super::{
    ExportSummary, Exporter, FileScanner, MindMapDocument, ModelAggregator, ModelMap,
    TreeBuilder, Workbook,
};

/// Command-line overrides for a single run
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub source: Option<PathBuf>,
    pub name: Option<String>,
    pub output: Option<PathBuf>,
    pub sorted: bool,
    pub base_notes: bool,
}

/// Main orchestration engine: discovery, extraction, aggregation and export
pub struct Engine {
    config: Config,
}

impl Engine {
    /// Create a new engine from a configuration file, falling back to defaults
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let config = Config::load_or_default(config_path)?;

        debug!("Loaded configuration: {:?}", config);

        Ok(Self::with_config(config))
    }

    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    fn apply(&mut self, options: RunOptions) {
        if let Some(source) = options.source {
            self.config.project.source_root = source;
        }
        if let Some(name) = options.name {
            self.config.project.name = name;
        }
        if let Some(output) = options.output {
            self.config.export.output = Some(output);
        }
        self.config.scan.sorted |= options.sorted;
        self.config.export.base_notes |= options.base_notes;
    }

    /// Run discovery and aggregation over the configured source root
    pub fn collect(&self) -> Result<ModelMap> {
        let scanner = FileScanner::from_config(&self.config.scan)?;
        let root = &self.config.project.source_root;

        info!("🔍 Scanning {} for '{}'", root.display(), scanner.pattern());
        let matches = scanner.discover(root);

        let aggregator = ModelAggregator::new()?;
        let mut models = aggregator.aggregate(&matches)?;
        if self.config.scan.sorted {
            models.sort_modules();
        }

        info!(
            "Found {} class(es) in {} module(s)",
            models.class_count(),
            models.len()
        );
        Ok(models)
    }

    /// Write a default configuration file
    pub fn init(&self, path: Option<PathBuf>, force: bool) -> Result<()> {
        let target_dir = match path {
            Some(path) => path,
            None => std::env::current_dir()?,
        };
        let config_path = target_dir.join("modelmind.toml");

        if config_path.exists() && !force {
            return Err(ModelMindError::Config(format!(
                "{} already exists, use --force to overwrite",
                config_path.display()
            ))
            .into());
        }

        std::fs::create_dir_all(&target_dir)?;
        Config::default().save(&config_path)?;
        info!("✅ Wrote {}", config_path.display());
        Ok(())
    }

    /// Print the model outline without touching any document
    pub fn scan(&mut self, source: Option<PathBuf>, json: bool) -> Result<String> {
        self.apply(RunOptions {
            source,
            ..RunOptions::default()
        });

        let root = &self.config.project.source_root;
        if root.as_os_str().is_empty() || !root.exists() {
            return Err(ModelMindError::Config(format!(
                "source root '{}' does not exist, set project.source_root first",
                root.display()
            ))
            .into());
        }

        let models = self.collect()?;
        let rendered = if json {
            serde_json::to_string_pretty(&models)?
        } else {
            TreeBuilder::new(&self.config.export.root_label)
                .base_notes(self.config.export.base_notes)
                .build(&models)
                .render_text()
        };

        Ok(rendered)
    }

    /// Run the whole pipeline and persist the mind map.
    ///
    /// Configuration is validated before the output document is opened, so a
    /// rejected run leaves any previous document untouched.
    pub fn export(&mut self, options: RunOptions) -> Result<ExportSummary> {
        self.apply(options);
        self.config.validate()?;

        let models = self.collect()?;

        let output = self.config.output_path();
        let mut workbook = Workbook::load_or_create(&output)?;
        let sheet = workbook.reset(&self.config.export.sheet_title, &self.config.project.name)?;

        let builder = TreeBuilder::new(&self.config.export.root_label)
            .base_notes(self.config.export.base_notes);
        let summary = Exporter::new(builder).export(&mut workbook, sheet, &models)?;

        info!(
            "🎉 Exported {} module(s) and {} class(es) to {}",
            summary.modules,
            summary.classes,
            workbook.path().display()
        );
        Ok(summary)
    }
}
