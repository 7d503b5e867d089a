// twrpgen/src/rules.rs
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::defs;

/// Partition classification tables driving the fstab transform.
///
/// Defaults come from the built-in tables in [`defs`]; a TOML rules file can
/// replace them wholesale for devices with exotic partition layouts, without
/// touching the transform logic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PartitionRules {
    /// Identifiers TWRP recognizes. Source lines whose identifier is not
    /// listed here are dropped silently.
    pub allowed: Vec<String>,
    /// Identifiers that also get a synthetic `_image` row.
    pub image_entries: Vec<String>,
    /// Identifier -> flag clause, written verbatim into the flags column.
    /// Missing entries mean an empty flags field, not an error.
    pub flags: HashMap<String, String>,
}

impl Default for PartitionRules {
    fn default() -> Self {
        Self {
            allowed: defs::ALLOWED_PARTITIONS.iter().map(|s| s.to_string()).collect(),
            image_entries: defs::IMAGE_ENTRY_PARTITIONS.iter().map(|s| s.to_string()).collect(),
            flags: defs::PARTITION_FLAGS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl PartitionRules {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read rules file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse rules file {}", path.display()))
    }

    /// Load `path` if given, otherwise the built-in tables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize rules")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write rules file {}", path.display()))?;
        log::info!("Wrote partition rules to {}", path.display());
        Ok(())
    }

    pub fn is_allowed(&self, id: &str) -> bool {
        self.allowed.iter().any(|p| p == id)
    }

    pub fn needs_image_entry(&self, id: &str) -> bool {
        self.image_entries.iter().any(|p| p == id)
    }

    /// Flag clause for `id`, empty when the table has no entry.
    pub fn flags_for(&self, id: &str) -> &str {
        self.flags.get(id).map(String::as_str).unwrap_or("")
    }
}
