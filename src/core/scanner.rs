use std::path::{Path, PathBuf};
use ignore::overrides::{Override, OverrideBuilder};
use serde::Serialize;
use tracing::{debug, trace, warn};
use walkdir::WalkDir;

use crate::config::{GroupBy, ScanConfig};
use crate::error::{ModelMindError, Result};

/// Matched file per module, in first-discovery order.
///
/// A later match for a module that is already present replaces the stored
/// path but keeps the module's original position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchSet {
    entries: Vec<(String, PathBuf)>,
}

impl MatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a match, returning the path it replaced
    pub fn insert(&mut self, module: impl Into<String>, path: impl Into<PathBuf>) -> Option<PathBuf> {
        let module = module.into();
        let path = path.into();

        match self.entries.iter_mut().find(|(name, _)| *name == module) {
            Some((_, existing)) => Some(std::mem::replace(existing, path)),
            None => {
                self.entries.push((module, path));
                None
            }
        }
    }

    #[cfg(test)]
    pub fn get(&self, module: &str) -> Option<&Path> {
        self.entries
            .iter()
            .find(|(name, _)| name == module)
            .map(|(_, path)| path.as_path())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.entries.iter().map(|(name, path)| (name.as_str(), path.as_path()))
    }

    #[cfg(test)]
    pub fn modules(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Recursively finds the files whose names match a `prefix + stem + suffix` glob
pub struct FileScanner {
    pattern: String,
    matcher: Override,
    sorted: bool,
    group_by: GroupBy,
}

impl FileScanner {
    #[cfg(test)]
    pub fn new(name_stem: &str, prefix: &str, suffix: &str) -> Result<Self> {
        Self::with_pattern(format!("{}{}{}", prefix, name_stem, suffix), false)
    }

    pub fn from_config(config: &ScanConfig) -> Result<Self> {
        Ok(Self::with_pattern(config.pattern(), config.case_insensitive)?
            .sorted(config.sorted)
            .group_by(config.group_by))
    }

    fn with_pattern(pattern: String, case_insensitive: bool) -> Result<Self> {
        // Leading `#` and `!` carry comment and negation meaning in the glob dialect
        if pattern.starts_with('#') || pattern.starts_with('!') {
            return Err(ModelMindError::Config(format!(
                "file name pattern '{}' must not start with '#' or '!'",
                pattern
            )));
        }

        let mut builder = OverrideBuilder::new(".");
        builder.case_insensitive(case_insensitive)?;
        builder.add(&pattern)?;
        let matcher = builder.build()?;

        Ok(Self {
            pattern,
            matcher,
            sorted: false,
            group_by: GroupBy::LastSegment,
        })
    }

    /// Visit directory entries in file-name order instead of listing order
    pub fn sorted(mut self, sorted: bool) -> Self {
        self.sorted = sorted;
        self
    }

    pub fn group_by(mut self, group_by: GroupBy) -> Self {
        self.group_by = group_by;
        self
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Whether a bare file name matches the glob
    pub fn matches(&self, file_name: &str) -> bool {
        self.matcher.matched(Path::new(file_name), false).is_whitelist()
    }

    /// Walk `root` and record the matched file of every directory
    pub fn discover<P: AsRef<Path>>(&self, root: P) -> MatchSet {
        let root = root.as_ref();
        let mut matches = MatchSet::new();

        debug!("Discovering '{}' under {}", self.pattern, root.display());

        let mut walker = WalkDir::new(root);
        if self.sorted {
            walker = walker.sort_by_file_name();
        }

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            // Symlinked files count as files; symlinked directories do not
            let file_type = entry.file_type();
            if file_type.is_dir() || (file_type.is_symlink() && entry.path().is_dir()) {
                continue;
            }

            let Some(file_name) = entry.file_name().to_str() else {
                continue;
            };
            if !self.matches(file_name) {
                continue;
            }

            let dir = entry.path().parent().unwrap_or(root);
            let module = self.module_name(root, dir);
            trace!("Matched {} for module '{}'", entry.path().display(), module);

            if let Some(previous) = matches.insert(module.clone(), entry.path()) {
                debug!(
                    "Module '{}' now maps to {} (replaced {})",
                    module,
                    entry.path().display(),
                    previous.display()
                );
            }
        }

        debug!("Discovered {} module(s)", matches.len());
        matches
    }

    fn module_name(&self, root: &Path, dir: &Path) -> String {
        match self.group_by {
            GroupBy::LastSegment => dir
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| dir.to_string_lossy().to_string()),
            GroupBy::RelativePath => {
                let relative = dir.strip_prefix(root).unwrap_or(dir);
                if relative.as_os_str().is_empty() {
                    ".".to_string()
                } else {
                    relative
                        .components()
                        .map(|c| c.as_os_str().to_string_lossy())
                        .collect::<Vec<_>>()
                        .join("/")
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use assert_fs::TempDir;

    fn scanner() -> FileScanner {
        FileScanner::new("models", "*", ".py").unwrap().sorted(true)
    }

    #[test]
    fn test_glob_matches_file_names() {
        let scanner = scanner();
        assert!(scanner.matches("models.py"));
        assert!(scanner.matches("user_models.py"));
        assert!(!scanner.matches("models.pyc"));
        assert!(!scanner.matches("views.py"));
        assert!(!scanner.matches("Models.py"));

        let exact = FileScanner::new("models", "", ".py").unwrap();
        assert!(exact.matches("models.py"));
        assert!(!exact.matches("user_models.py"));
    }

    #[test]
    fn test_case_insensitive_matching() {
        let mut config = ScanConfig::default();
        config.case_insensitive = true;
        let scanner = FileScanner::from_config(&config).unwrap();
        assert!(scanner.matches("Models.PY"));
    }

    #[test]
    fn test_discover_keys_directories_with_matches() {
        let temp = TempDir::new().unwrap();
        temp.child("app1/models.py").write_str("").unwrap();
        temp.child("app2/models.py").write_str("").unwrap();
        temp.child("app2/views.py").write_str("").unwrap();
        temp.child("app3/admin.py").write_str("").unwrap();

        let matches = scanner().discover(temp.path());

        let mut modules: Vec<_> = matches.modules().collect();
        modules.sort();
        assert_eq!(modules, vec!["app1", "app2"]);
        assert_eq!(matches.get("app1"), Some(temp.child("app1/models.py").path()));
        assert_eq!(matches.get("app2"), Some(temp.child("app2/models.py").path()));
    }

    #[test]
    fn test_last_match_in_directory_wins() {
        let temp = TempDir::new().unwrap();
        temp.child("shop/a_models.py").write_str("").unwrap();
        temp.child("shop/b_models.py").write_str("").unwrap();

        let matches = scanner().discover(temp.path());

        assert_eq!(matches.len(), 1);
        assert_eq!(matches.get("shop"), Some(temp.child("shop/b_models.py").path()));
    }

    #[test]
    fn test_same_named_directories_collide() {
        let temp = TempDir::new().unwrap();
        temp.child("a/utils/models.py").write_str("").unwrap();
        temp.child("b/utils/models.py").write_str("").unwrap();

        let matches = scanner().discover(temp.path());

        assert_eq!(matches.len(), 1);
        assert_eq!(matches.get("utils"), Some(temp.child("b/utils/models.py").path()));
    }

    #[test]
    fn test_relative_path_grouping_keeps_both() {
        let temp = TempDir::new().unwrap();
        temp.child("a/utils/models.py").write_str("").unwrap();
        temp.child("b/utils/models.py").write_str("").unwrap();
        temp.child("models.py").write_str("").unwrap();

        let matches = scanner().group_by(GroupBy::RelativePath).discover(temp.path());

        let modules: Vec<_> = matches.modules().collect();
        assert_eq!(modules, vec!["a/utils", "b/utils", "."]);
    }

    #[test]
    fn test_rejects_comment_and_negation_patterns() {
        assert!(matches!(
            FileScanner::new("models", "#", ".py"),
            Err(ModelMindError::Config(_))
        ));

        let mut config = ScanConfig::default();
        config.prefix = "!".to_string();
        assert!(matches!(
            FileScanner::from_config(&config),
            Err(ModelMindError::Config(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_files_are_discovered() {
        use std::os::unix::fs::symlink;

        let temp = TempDir::new().unwrap();
        temp.child("real/models.py").write_str("class User(Base):\n").unwrap();
        temp.child("app").create_dir_all().unwrap();
        symlink(
            temp.child("real/models.py").path(),
            temp.child("app/models.py").path(),
        )
        .unwrap();
        temp.child("broken").create_dir_all().unwrap();
        symlink(temp.child("gone.py").path(), temp.child("broken/models.py").path()).unwrap();
        temp.child("linked").create_dir_all().unwrap();
        symlink(temp.child("real").path(), temp.child("linked/dir_models.py").path()).unwrap();

        let matches = scanner().discover(temp.path());

        let modules: Vec<_> = matches.modules().collect();
        assert_eq!(modules, vec!["app", "broken", "real"]);
        assert_eq!(matches.get("app"), Some(temp.child("app/models.py").path()));
    }

    #[test]
    fn test_missing_root_is_empty() {
        let temp = TempDir::new().unwrap();
        let matches = scanner().discover(temp.path().join("nope"));
        assert!(matches.is_empty());
    }

    #[test]
    fn test_insert_overwrites_in_place() {
        let mut matches = MatchSet::new();
        assert!(matches.insert("a", "a/models.py").is_none());
        assert!(matches.insert("b", "b/models.py").is_none());
        assert_eq!(matches.insert("a", "x/a/models.py"), Some(PathBuf::from("a/models.py")));

        let entries: Vec<_> = matches.iter().collect();
        assert_eq!(
            entries,
            vec![("a", Path::new("x/a/models.py")), ("b", Path::new("b/models.py"))]
        );
    }
}
