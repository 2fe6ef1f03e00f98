use serde::{Deserialize, Serialize};

use crate::{config::AssetRules, Error, Result};

/// Content type assumed when the source doesn't say
pub const DEFAULT_CONTENT_TYPE: &str = "mod";

/// A favorites entry exactly as a source handed it to us
///
/// Every field is optional here; `into_item` decides what's required.
/// Both the JSON export names and the longer descriptive names are accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, alias = "link", skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(
        default,
        alias = "compatible_versions",
        skip_serializing_if = "Option::is_none"
    )]
    pub game_versions: Option<Vec<String>>,

    #[serde(default, alias = "content_type", skip_serializing_if = "Option::is_none")]
    pub mod_type: Option<String>,

    #[serde(default, alias = "declared_tags", skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
}

impl RawRecord {
    /// Normalize into an `Item`, filling defaults for everything optional
    ///
    /// Site-relative links get resolved against `base_url` so the report
    /// always carries something clickable.
    pub fn into_item(self, base_url: &str) -> Result<Item> {
        let name = required(self.name, "name")?;
        let link = required(self.url, "link")?;

        Ok(Item {
            name,
            link: resolve_link(&link, base_url),
            description: self
                .description
                .map(|d| d.trim().to_string())
                .unwrap_or_default(),
            compatible_versions: clean_labels(self.game_versions),
            content_type: self
                .mod_type
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
            declared_tags: clean_labels(self.categories),
        })
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(Error::MissingField { field })
}

fn clean_labels(labels: Option<Vec<String>>) -> Vec<String> {
    labels
        .unwrap_or_default()
        .into_iter()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect()
}

/// Turn a possibly site-relative link into an absolute URL
pub fn resolve_link(link: &str, base_url: &str) -> String {
    if link.starts_with("http://") || link.starts_with("https://") {
        link.to_string()
    } else if let Some(rest) = link.strip_prefix("//") {
        format!("https://{}", rest)
    } else {
        let base = base_url.trim_end_matches('/');
        let path = link.trim_start_matches('/');
        format!("{}/{}", base, path)
    }
}

/// One normalized catalog entry
///
/// Built once from a `RawRecord` and never mutated afterwards - the
/// classifier only ever reads from it. `name` and `link` are guaranteed
/// non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    name: String,
    link: String,
    description: String,
    compatible_versions: Vec<String>,
    content_type: String,
    declared_tags: Vec<String>,
}

impl Item {
    /// Build an item directly from its two required fields
    pub fn new(name: impl Into<String>, link: impl Into<String>) -> Result<Self> {
        RawRecord {
            name: Some(name.into()),
            url: Some(link.into()),
            ..Default::default()
        }
        .into_item("")
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into().trim().to_string();
        self
    }

    pub fn with_versions<I, S>(mut self, versions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.compatible_versions =
            clean_labels(Some(versions.into_iter().map(Into::into).collect()));
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        let content_type = content_type.into().trim().to_string();
        if !content_type.is_empty() {
            self.content_type = content_type;
        }
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.declared_tags = clean_labels(Some(tags.into_iter().map(Into::into).collect()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn link(&self) -> &str {
        &self.link
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn compatible_versions(&self) -> &[String] {
        &self.compatible_versions
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn declared_tags(&self) -> &[String] {
        &self.declared_tags
    }

    /// No version labels at all - unknown, which is not the same as incompatible
    pub fn has_declared_versions(&self) -> bool {
        !self.compatible_versions.is_empty()
    }

    /// True if any declared version label contains `target`
    ///
    /// Substring on purpose: "1.20.1-forge" counts for "1.20.1".
    pub fn is_target_version_compatible(&self, target: &str) -> bool {
        self.compatible_versions.iter().any(|v| v.contains(target))
    }

    /// Resource packs and friends: matched by type tag OR by a phrase in the name
    ///
    /// The name check catches entries whose type tag never made it out of the
    /// markup.
    pub fn is_asset_only(&self, rules: &AssetRules) -> bool {
        let content_type = self.content_type.to_lowercase();
        if rules
            .content_types
            .iter()
            .any(|t| t.trim().to_lowercase() == content_type)
        {
            return true;
        }

        let name = self.name.to_lowercase();
        rules
            .name_phrases
            .iter()
            .map(|p| p.trim().to_lowercase())
            .any(|p| !p.is_empty() && name.contains(&p))
    }

    /// Case-insensitive key used for every name ordering in the report
    pub fn sort_key(&self) -> String {
        self.name.to_lowercase()
    }

    /// Lowercased name + description + tags, the text keywords are matched against
    pub fn classification_text(&self) -> String {
        let mut parts = Vec::with_capacity(2 + self.declared_tags.len());
        parts.push(self.name.as_str());
        parts.push(self.description.as_str());
        parts.extend(self.declared_tags.iter().map(String::as_str));
        parts.join(" ").to_lowercase()
    }
}

/// Decorative run information that ends up in the report header
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modpack_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forge_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

impl RunMetadata {
    /// True when no field was supplied, e.g. `"metadata": {}`
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.modpack_version.is_none()
            && self.forge_version.is_none()
            && self.last_updated.is_none()
    }
}

/// The favorites JSON document: run metadata plus the raw entries
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoritesDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<RunMetadata>,
    #[serde(default)]
    pub favorites: Vec<RawRecord>,
}
