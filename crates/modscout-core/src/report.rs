use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{
    classify::KeywordTable,
    config::{Config, TargetConfig},
    models::{Item, RunMetadata},
    partition::{Bucket, Partition},
};

/// Compatible entries sharing a category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryGroup {
    pub label: String,
    pub items: Vec<Item>,
}

/// Bucket counts for the closing section
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub compatible: usize,
    pub asset_reference: usize,
    pub incompatible: usize,
    pub unknown_version: usize,
    pub total: usize,
    /// Records dropped before classification ever saw them
    pub skipped: usize,
}

/// Fully partitioned, categorized and ordered favorites
///
/// Everything in here is already in render order: category groups by
/// label, entries by case-insensitive name. Renderers just walk it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub metadata: Option<RunMetadata>,
    pub target: TargetConfig,
    pub compatible: Vec<CategoryGroup>,
    pub asset_reference: Vec<Item>,
    pub incompatible: Vec<Item>,
    pub unknown_version: Vec<Item>,
    pub summary: Summary,
}

impl Report {
    /// Partition, categorize and order a batch of entries
    pub fn build(items: Vec<Item>, config: &Config, metadata: Option<RunMetadata>) -> Self {
        let partition = Partition::split(items, &config.target.game_version, &config.assets);
        Self::from_partition(partition, &config.keyword_table(), &config.target, metadata)
    }

    pub fn from_partition(
        partition: Partition,
        table: &KeywordTable,
        target: &TargetConfig,
        metadata: Option<RunMetadata>,
    ) -> Self {
        for bucket in Bucket::all() {
            tracing::debug!("{}: {} entries", bucket, partition.bucket(bucket).len());
        }

        let summary = Summary {
            compatible: partition.compatible.len(),
            asset_reference: partition.asset_reference.len(),
            incompatible: partition.incompatible.len(),
            unknown_version: partition.unknown_version.len(),
            total: partition.total(),
            skipped: 0,
        };

        // BTreeMap keeps the labels sorted for us
        let mut groups: BTreeMap<String, Vec<Item>> = BTreeMap::new();
        for item in partition.compatible {
            let label = table.categorize(&item).to_string();
            tracing::debug!("{} -> {}", item.name(), label);
            groups.entry(label).or_default().push(item);
        }

        let compatible = groups
            .into_iter()
            .map(|(label, items)| CategoryGroup {
                label,
                items: sorted_by_name(items),
            })
            .collect();

        Self {
            metadata,
            target: target.clone(),
            compatible,
            asset_reference: sorted_by_name(partition.asset_reference),
            incompatible: sorted_by_name(partition.incompatible),
            unknown_version: sorted_by_name(partition.unknown_version),
            summary,
        }
    }

    /// Record how many input records were dropped during loading
    pub fn with_skipped(mut self, skipped: usize) -> Self {
        self.summary.skipped = skipped;
        self
    }

    /// Category labels in render order
    pub fn category_labels(&self) -> Vec<&str> {
        self.compatible.iter().map(|g| g.label.as_str()).collect()
    }

    /// Which category a compatible entry ended up in
    pub fn category_of(&self, name: &str) -> Option<&str> {
        self.compatible
            .iter()
            .find(|g| g.items.iter().any(|i| i.name() == name))
            .map(|g| g.label.as_str())
    }
}

// Stable, so duplicate names keep their input order
fn sorted_by_name(mut items: Vec<Item>) -> Vec<Item> {
    items.sort_by_cached_key(Item::sort_key);
    items
}
