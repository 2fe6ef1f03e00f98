use serde::{Deserialize, Serialize};

use crate::{config::AssetRules, models::Item};

/// The four mutually exclusive report buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Bucket {
    AssetReference,
    UnknownVersion,
    Compatible,
    Incompatible,
}

impl Bucket {
    /// Decide the bucket for one entry
    ///
    /// Order matters: asset-only entries never get a version check, and an
    /// entry with no versions at all is unknown rather than incompatible.
    pub fn of(item: &Item, target_version: &str, rules: &AssetRules) -> Self {
        if item.is_asset_only(rules) {
            Bucket::AssetReference
        } else if !item.has_declared_versions() {
            Bucket::UnknownVersion
        } else if item.is_target_version_compatible(target_version) {
            Bucket::Compatible
        } else {
            Bucket::Incompatible
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Bucket::AssetReference => "Asset Reference",
            Bucket::UnknownVersion => "Unknown Version",
            Bucket::Compatible => "Compatible",
            Bucket::Incompatible => "Incompatible",
        }
    }

    pub fn all() -> [Bucket; 4] {
        [
            Bucket::AssetReference,
            Bucket::UnknownVersion,
            Bucket::Compatible,
            Bucket::Incompatible,
        ]
    }
}

impl std::fmt::Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Entries split by bucket, input order preserved inside each
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub asset_reference: Vec<Item>,
    pub unknown_version: Vec<Item>,
    pub compatible: Vec<Item>,
    pub incompatible: Vec<Item>,
}

impl Partition {
    pub fn split<I>(items: I, target_version: &str, rules: &AssetRules) -> Self
    where
        I: IntoIterator<Item = Item>,
    {
        let mut partition = Self::default();
        for item in items {
            let bucket = Bucket::of(&item, target_version, rules);
            partition.bucket_mut(bucket).push(item);
        }
        partition
    }

    pub fn bucket(&self, bucket: Bucket) -> &[Item] {
        match bucket {
            Bucket::AssetReference => &self.asset_reference,
            Bucket::UnknownVersion => &self.unknown_version,
            Bucket::Compatible => &self.compatible,
            Bucket::Incompatible => &self.incompatible,
        }
    }

    fn bucket_mut(&mut self, bucket: Bucket) -> &mut Vec<Item> {
        match bucket {
            Bucket::AssetReference => &mut self.asset_reference,
            Bucket::UnknownVersion => &mut self.unknown_version,
            Bucket::Compatible => &mut self.compatible,
            Bucket::Incompatible => &mut self.incompatible,
        }
    }

    pub fn total(&self) -> usize {
        Bucket::all().iter().map(|b| self.bucket(*b).len()).sum()
    }
}
