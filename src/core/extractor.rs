use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A top-level class declaration: its name and the raw text between the parentheses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRecord {
    pub name: String,
    pub base: String,
}

impl ClassRecord {
    pub fn new(name: impl Into<String>, base: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base: base.into(),
        }
    }
}

/// Finds `class Name(Base):` lines that start at column zero
pub struct ClassExtractor {
    declaration_regex: Regex,
}

impl ClassExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            declaration_regex: Regex::new(r"(?m)^class (\w+)\(([^:\n]+)\):")?,
        })
    }

    /// Extract every declaration in top-to-bottom order
    pub fn extract(&self, text: &str) -> Vec<ClassRecord> {
        self.declaration_regex
            .captures_iter(text)
            .map(|caps| ClassRecord::new(&caps[1], &caps[2]))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_top_level_classes() {
        let extractor = ClassExtractor::new().unwrap();
        let source = r#"from django.db import models


class User(models.Model):
    name = models.CharField(max_length=64)


class Profile(User):
    bio = models.TextField()
"#;

        let records = extractor.extract(source);
        assert_eq!(
            records,
            vec![
                ClassRecord::new("User", "models.Model"),
                ClassRecord::new("Profile", "User"),
            ]
        );
    }

    #[test]
    fn test_indented_classes_are_ignored() {
        let extractor = ClassExtractor::new().unwrap();
        let source = "class Order(models.Model):\n    class Meta(object):\n        ordering = ['-id']\n";

        let records = extractor.extract(source);
        assert_eq!(records, vec![ClassRecord::new("Order", "models.Model")]);
    }

    #[test]
    fn test_base_expression_is_kept_verbatim() {
        let extractor = ClassExtractor::new().unwrap();
        let source = "class Mixed(TimestampMixin, models.Model):\nclass Meta(metaclass=abc.ABCMeta):\n";

        let records = extractor.extract(source);
        assert_eq!(records[0].base, "TimestampMixin, models.Model");
        assert_eq!(records[1].base, "metaclass=abc.ABCMeta");
    }

    #[test]
    fn test_lines_that_do_not_match() {
        let extractor = ClassExtractor::new().unwrap();
        let source = "class Plain:\nclass Empty():\n# class Commented(Base):\nclassy = 1\n";

        assert!(extractor.extract(source).is_empty());
        assert!(extractor.extract("").is_empty());
    }

    #[test]
    fn test_crlf_line_endings() {
        let extractor = ClassExtractor::new().unwrap();
        let source = "class A(Base):\r\n    pass\r\nclass B(A):\r\n";

        let names: Vec<_> = extractor.extract(source).into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["A", "B"]);
    }
}
