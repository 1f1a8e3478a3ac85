//! Intent catalog file (`bothub.yml`)
//!
//! ```yaml
//! intents:
//!   credentials:
//!     on_complete: set_credentials
//!     slots:
//!       - id: app_id
//!         question: Please tell me your app ID
//!       - id: plan
//!         question: Which plan?
//!         options: [free, pro]
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::application::errors::ConfigError;
use crate::domain::entities::{Intent, IntentCatalog, Slot};

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    intents: Option<serde_yaml::Mapping>,
}

#[derive(Debug, Deserialize)]
struct IntentEntry {
    on_complete: Option<String>,
    #[serde(default)]
    slots: Vec<Slot>,
}

/// Reads a catalog file. A missing file is an empty catalog.
pub fn load_catalog(path: impl AsRef<Path>) -> Result<IntentCatalog, ConfigError> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::warn!("Intent catalog {} not found, no intents available", path.display());
        return Ok(IntentCatalog::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Parse(format!("Failed to read {}: {}", path.display(), e)))?;
    parse_catalog(&content)
}

/// Parses catalog YAML, keeping intents in file order
pub fn parse_catalog(content: &str) -> Result<IntentCatalog, ConfigError> {
    let file: CatalogFile = serde_yaml::from_str(content)
        .map_err(|e| ConfigError::Parse(format!("Failed to parse intents: {}", e)))?;

    let mut intents = Vec::new();
    for (key, value) in file.intents.unwrap_or_default() {
        let id = key
            .as_str()
            .ok_or_else(|| ConfigError::InvalidValue(format!("intent id must be a string: {:?}", key)))?
            .to_string();
        let entry: IntentEntry = serde_yaml::from_value(value)
            .map_err(|e| ConfigError::Parse(format!("Invalid intent {}: {}", id, e)))?;

        {
            let mut seen = HashSet::new();
            if let Some(dup) = entry.slots.iter().find(|slot| !seen.insert(slot.id.as_str())) {
                return Err(ConfigError::InvalidValue(format!(
                    "intent {} declares slot {} twice",
                    id, dup.id
                )));
            }
        }

        let on_complete = entry
            .on_complete
            .unwrap_or_else(|| format!("set_{}", id));
        intents.push(Intent {
            id,
            completion_handler_name: Some(on_complete),
            slots: entry.slots,
        });
    }

    tracing::debug!("Loaded {} intents", intents.len());
    Ok(IntentCatalog::new(intents))
}
