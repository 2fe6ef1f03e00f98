//! Keyword scoring for compatible entries
//!
//! Each category owns a list of keyword substrings. An entry's score for a
//! category is how many distinct keywords show up anywhere in its text blob.
//! The highest score wins, ties go to whichever category was declared first,
//! and nothing matching at all lands in `OTHER_CATEGORY`.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::models::Item;

/// Where entries go when no keyword matches
pub const OTHER_CATEGORY: &str = "Other";

/// One row of the keyword table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl CategoryRule {
    pub fn new<I, S>(name: impl Into<String>, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }
}

/// Ordered category table; order is the tie-break
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordTable {
    rules: Vec<CategoryRule>,
}

impl KeywordTable {
    /// Build a table, normalizing keywords on the way in
    ///
    /// Keywords are lowercased; blanks and repeats within a category are
    /// dropped so they can't inflate a score. Surrounding spaces are kept,
    /// so `" ore "` only matches the whole word. Rules without a name are
    /// skipped.
    pub fn new(rules: Vec<CategoryRule>) -> Self {
        let rules = rules
            .into_iter()
            .filter_map(|rule| {
                let name = rule.name.trim().to_string();
                if name.is_empty() {
                    tracing::warn!("Skipping keyword category with an empty name");
                    return None;
                }

                let mut seen = HashSet::new();
                let keywords = rule
                    .keywords
                    .iter()
                    .map(|k| k.to_lowercase())
                    .filter(|k| !k.trim().is_empty() && seen.insert(k.clone()))
                    .collect();

                Some(CategoryRule { name, keywords })
            })
            .collect();

        Self { rules }
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    /// Pick the category for an entry
    pub fn categorize(&self, item: &Item) -> &str {
        self.categorize_text(&item.classification_text())
    }

    /// Pick the category for an arbitrary blob of text
    pub fn categorize_text(&self, text: &str) -> &str {
        let text = text.to_lowercase();

        let mut best = OTHER_CATEGORY;
        let mut max_matches = 0;

        for rule in &self.rules {
            let matches = Self::count_matches(rule, &text);
            // Strictly greater, so earlier categories keep ties
            if matches > max_matches {
                max_matches = matches;
                best = rule.name.as_str();
            }
        }

        best
    }

    fn count_matches(rule: &CategoryRule, text: &str) -> usize {
        rule.keywords
            .iter()
            .filter(|keyword| text.contains(keyword.as_str()))
            .count()
    }
}

impl Default for KeywordTable {
    fn default() -> Self {
        Self::new(default_categories())
    }
}

/// The built-in table
///
/// Matching is plain substring, so short keywords like "ore" or "api" are
/// greedy. Override in the config file if they misfire; padding with
/// spaces (`" ore "`) limits a keyword to whole words.
pub fn default_categories() -> Vec<CategoryRule> {
    vec![
        CategoryRule::new(
            "Exploration",
            ["exploration", "adventure", "dungeon", "structure", "tower", "quest"],
        ),
        CategoryRule::new(
            "Mobs/Creatures",
            ["mob", "creature", "animal", "enemy", "spawn", "entity", "boss"],
        ),
        CategoryRule::new(
            "Building",
            ["building", "construction", "architect", "blueprint"],
        ),
        CategoryRule::new(
            "Decoration",
            ["decoration", "decorative", "furniture", "decor", "aesthetic", "prop"],
        ),
        CategoryRule::new(
            "World Generation",
            ["worldgen", "generation", "terrain", "ore", "cave", "biome"],
        ),
        CategoryRule::new("Tools", ["tool", "utility", "equipment", "weapon"]),
        CategoryRule::new(
            "Food/Farming",
            ["food", "farming", "agriculture", "cooking", "crop", "harvest"],
        ),
        CategoryRule::new(
            "Transportation",
            ["transport", "vehicle", "travel", "movement", "horse", "boat"],
        ),
        CategoryRule::new(
            "Storage",
            ["storage", "inventory", "chest", "container", "backpack"],
        ),
        CategoryRule::new(
            "Optimization",
            ["optimization", "performance", "fps", "lag", "memory"],
        ),
        CategoryRule::new("Library", ["library", "api", "core", "framework", "loader"]),
        CategoryRule::new(
            "Quality of Life",
            [
                "qol",
                "quality of life",
                "convenience",
                "gui",
                "hud",
                "interface",
                "tooltip",
                "waila",
            ],
        ),
        CategoryRule::new(
            "Audio/Visual",
            ["visual", "audio", "sound", "shader", "graphics", "particle", "effect"],
        ),
        CategoryRule::new(
            "Nature",
            ["tree", "plant", "flower", "nature", "forest", "garden"],
        ),
    ]
}
