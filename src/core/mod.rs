// src/core/mod.rs
mod engine;
mod scanner;
mod extractor;
mod aggregator;
mod outline;
mod document;
mod exporter;

pub use scanner::{FileScanner, MatchSet};
pub use extractor::{ClassExtractor, ClassRecord};
pub use aggregator::{ModelAggregator, ModelMap};
pub use outline::{OutlineNode, TreeBuilder};
pub use document::{MindMapDocument, Workbook};
pub use exporter::{ExportSummary, Exporter};

// Export the main engine
pub use engine::{Engine, RunOptions};
