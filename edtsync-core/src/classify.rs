//! Title-prefix classification.
//!
//! Timetable exports encode the kind of a session in the first two letters of
//! its title ("CM" for a lecture, "TP" for a lab, ...). The classifier maps
//! that prefix to a [`Category`] and the [`Palette`] maps the category to the
//! color label understood by the remote calendar.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::event::Category;

/// Number of leading title characters inspected by the classifier.
pub const PREFIX_LEN: usize = 2;

pub const DEFAULT_CATEGORY: &str = "default";
pub const DEFAULT_COLOR: &str = "1";

/// One row of the prefix table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub prefix: String,
    pub name: String,
    /// Remote color label (a Google Calendar `colorId`).
    pub color: String,
}

impl CategoryRule {
    pub fn new(prefix: &str, name: &str, color: &str) -> Self {
        CategoryRule {
            prefix: prefix.to_string(),
            name: name.to_string(),
            color: color.to_string(),
        }
    }
}

/// The stock prefix table.
pub fn default_rules() -> Vec<CategoryRule> {
    vec![
        CategoryRule::new("CM", "lecture", "6"),
        CategoryRule::new("TP", "lab", "2"),
        CategoryRule::new("TD", "tutorial", "5"),
        CategoryRule::new("DS", "exam", "9"),
    ]
}

#[derive(Debug, Clone)]
pub struct Classifier {
    table: HashMap<String, Category>,
    default: Category,
}

impl Default for Classifier {
    fn default() -> Self {
        Classifier::new(&default_rules(), DEFAULT_CATEGORY)
    }
}

impl Classifier {
    pub fn new(rules: &[CategoryRule], default_category: &str) -> Self {
        let table = rules
            .iter()
            .map(|rule| (rule.prefix.clone(), Category::new(&rule.name)))
            .collect();

        Classifier {
            table,
            default: Category::new(default_category),
        }
    }

    /// Classify a title by its first two characters (case-sensitive, untrimmed).
    pub fn classify(&self, title: &str) -> Category {
        let prefix: String = title.chars().take(PREFIX_LEN).collect();

        self.table
            .get(&prefix)
            .cloned()
            .unwrap_or_else(|| self.default.clone())
    }
}

/// Category → remote color label.
#[derive(Debug, Clone)]
pub struct Palette {
    colors: HashMap<Category, String>,
    default_color: Option<String>,
}

impl Default for Palette {
    fn default() -> Self {
        Palette::new(&default_rules(), Some(DEFAULT_COLOR))
    }
}

impl Palette {
    pub fn new(rules: &[CategoryRule], default_color: Option<&str>) -> Self {
        let colors = rules
            .iter()
            .map(|rule| (Category::new(&rule.name), rule.color.clone()))
            .collect();

        Palette {
            colors,
            default_color: default_color.map(str::to_string),
        }
    }

    pub fn color_for(&self, category: &Category) -> Option<&str> {
        self.colors
            .get(category)
            .or(self.default_color.as_ref())
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_prefixes() {
        let classifier = Classifier::default();

        assert_eq!(classifier.classify("CM Algorithms").as_str(), "lecture");
        assert_eq!(classifier.classify("TP Réseaux").as_str(), "lab");
        assert_eq!(classifier.classify("TD Probabilités").as_str(), "tutorial");
        assert_eq!(classifier.classify("DS Final").as_str(), "exam");
    }

    #[test]
    fn test_same_prefix_same_category() {
        let classifier = Classifier::default();

        assert_eq!(
            classifier.classify("CM Algorithms"),
            classifier.classify("CM Databases")
        );
    }

    #[test]
    fn test_unknown_prefix_maps_to_default() {
        let classifier = Classifier::default();

        assert_eq!(classifier.classify("XY Something").as_str(), DEFAULT_CATEGORY);
        assert_eq!(classifier.classify("").as_str(), DEFAULT_CATEGORY);
        assert_eq!(classifier.classify("C").as_str(), DEFAULT_CATEGORY);
    }

    #[test]
    fn test_prefix_is_case_sensitive_and_untrimmed() {
        let classifier = Classifier::default();

        assert_eq!(classifier.classify("cm Algorithms").as_str(), DEFAULT_CATEGORY);
        assert_eq!(classifier.classify(" CM Algorithms").as_str(), DEFAULT_CATEGORY);
    }

    #[test]
    fn test_classify_is_deterministic() {
        let classifier = Classifier::default();

        for title in ["CM Algorithms", "XY Something", "é", "DS"] {
            assert_eq!(classifier.classify(title), classifier.classify(title));
        }
    }

    #[test]
    fn test_multibyte_titles_do_not_panic() {
        let classifier = Classifier::new(&[CategoryRule::new("Ép", "epreuve", "11")], "other");

        assert_eq!(classifier.classify("Épreuve orale").as_str(), "epreuve");
        assert_eq!(classifier.classify("日本語").as_str(), "other");
    }

    #[test]
    fn test_palette_falls_back_to_default_color() {
        let palette = Palette::default();

        assert_eq!(palette.color_for(&Category::new("exam")), Some("9"));
        assert_eq!(palette.color_for(&Category::new("default")), Some("1"));

        let bare = Palette::new(&default_rules(), None);
        assert_eq!(bare.color_for(&Category::new("unknown")), None);
    }
}
