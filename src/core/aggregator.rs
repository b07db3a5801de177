use std::path::Path;
use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::debug;

use crate::error::Result;
use super::{ClassExtractor, ClassRecord, MatchSet};

/// Module name to class declarations, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelMap {
    modules: Vec<(String, Vec<ClassRecord>)>,
}

impl ModelMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append records to a module, creating it (possibly empty) on first use
    pub fn extend(&mut self, module: &str, records: Vec<ClassRecord>) {
        match self.modules.iter_mut().find(|(name, _)| name == module) {
            Some((_, existing)) => existing.extend(records),
            None => self.modules.push((module.to_string(), records)),
        }
    }

    #[cfg(test)]
    pub fn get(&self, module: &str) -> Option<&[ClassRecord]> {
        self.modules
            .iter()
            .find(|(name, _)| name == module)
            .map(|(_, records)| records.as_slice())
    }

    #[cfg(test)]
    pub fn contains(&self, module: &str) -> bool {
        self.get(module).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ClassRecord])> {
        self.modules
            .iter()
            .map(|(name, records)| (name.as_str(), records.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Total number of class records across all modules
    pub fn class_count(&self) -> usize {
        self.modules.iter().map(|(_, records)| records.len()).sum()
    }

    /// Order modules by name
    pub fn sort_modules(&mut self) {
        self.modules.sort_by(|a, b| a.0.cmp(&b.0));
    }
}

impl Serialize for ModelMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.modules.len()))?;
        for (name, records) in &self.modules {
            map.serialize_entry(name, records)?;
        }
        map.end()
    }
}

/// Reads each matched file and groups its class records by module
pub struct ModelAggregator {
    extractor: ClassExtractor,
}

impl ModelAggregator {
    pub fn new() -> Result<Self> {
        Ok(Self {
            extractor: ClassExtractor::new()?,
        })
    }

    pub fn aggregate(&self, matches: &MatchSet) -> Result<ModelMap> {
        let mut models = ModelMap::new();

        for (module, path) in matches.iter() {
            if !path.exists() {
                debug!("Skipping module '{}': {} no longer exists", module, path.display());
                continue;
            }

            let records = self.read_records(path)?;
            debug!("Module '{}': {} class(es) in {}", module, records.len(), path.display());
            models.extend(module, records);
        }

        Ok(models)
    }

    fn read_records(&self, path: &Path) -> Result<Vec<ClassRecord>> {
        let bytes = std::fs::read(path)?;
        let source = String::from_utf8_lossy(&bytes);
        Ok(self.extractor.extract(&source))
    }
}
